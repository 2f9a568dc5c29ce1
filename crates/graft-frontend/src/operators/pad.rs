//! Pad, PadV2 and MirrorPad translators.

use crate::Result;
use crate::builder::IrBuilder;
use crate::checks::{default_op_checks, unsupported_complex};
use crate::complex;
use crate::helpers::{mirror_pad_mode, pad_bounds};
use crate::node_view::NodeView;
use crate::output::NodeOutput;
use crate::translator::Translator;
use graft_ir::{IrValueId, Op, PadMode, TensorValue};
use tracing::trace;

/// Constant-mode padding.
///
/// `Pad` fills with zero of the data element type; `PadV2` takes the fill
/// value as its third input. Complex data is padded in packed form with the
/// packing axis left untouched.
pub struct PadOp {
    name: &'static str,
    explicit_fill: bool,
}

impl PadOp {
    /// Create a Pad translator (fill with zero).
    pub fn pad() -> Self {
        Self {
            name: "Pad",
            explicit_fill: false,
        }
    }

    /// Create a PadV2 translator (fill from the third input).
    pub fn pad_v2() -> Self {
        Self {
            name: "PadV2",
            explicit_fill: true,
        }
    }
}

impl Translator for PadOp {
    fn name(&self) -> &str {
        self.name
    }

    fn translate(&self, node: &dyn NodeView, builder: &mut IrBuilder<'_>) -> Result<Vec<NodeOutput>> {
        let min_inputs = if self.explicit_fill { 3 } else { 2 };
        default_op_checks(node, min_inputs, &[self.name], true)?;

        let data = node.input(0)?;
        let paddings = plain_input(node, 1, "paddings")?;
        let fill = if self.explicit_fill {
            plain_input(node, 2, "constant_values")?
        } else {
            let packed = match data {
                NodeOutput::Plain(v) => v,
                NodeOutput::Complex(c) => c.packed,
            };
            let dtype = builder.dtype(packed)?;
            builder.constant(TensorValue::zero(dtype))?
        };

        Ok(vec![constant_pad(builder, data, paddings, fill)?])
    }
}

/// Shared base of Pad and PadV2: unwrap, pad in constant mode, re-wrap.
fn constant_pad(
    builder: &mut IrBuilder<'_>,
    data: NodeOutput,
    paddings: IrValueId,
    fill: IrValueId,
) -> Result<NodeOutput> {
    match data {
        NodeOutput::Plain(data) => {
            let bounds = pad_bounds(builder, paddings, false)?;
            let padded = builder.op(
                Op::Pad {
                    mode: PadMode::Constant,
                },
                &[data, bounds.begin, bounds.end, fill],
            )?;
            Ok(NodeOutput::Plain(padded))
        }
        NodeOutput::Complex(data) => {
            trace!(node = builder.node_name(), "padding packed complex value");
            let bounds = pad_bounds(builder, paddings, true)?;
            let padded = builder.op(
                Op::Pad {
                    mode: PadMode::Constant,
                },
                &[data.packed, bounds.begin, bounds.end, fill],
            )?;
            complex::mark(builder, padded, data.part_type)
        }
    }
}

/// Reflect or symmetric padding (`mode` attribute). Real input only.
pub struct MirrorPadOp;

impl Translator for MirrorPadOp {
    fn name(&self) -> &str {
        "MirrorPad"
    }

    fn translate(&self, node: &dyn NodeView, builder: &mut IrBuilder<'_>) -> Result<Vec<NodeOutput>> {
        default_op_checks(node, 2, &["MirrorPad", "MIRROR_PAD"], false)?;
        let mode: String = node.attribute("mode")?;
        let mode = mirror_pad_mode(node, &mode)?;

        let data = node.input(0)?.value();
        let paddings = node.input(1)?.value();
        let bounds = pad_bounds(builder, paddings, false)?;
        let padded = builder.op(Op::Pad { mode }, &[data, bounds.begin, bounds.end])?;
        Ok(vec![NodeOutput::Plain(padded)])
    }
}

fn plain_input(node: &dyn NodeView, index: usize, what: &str) -> Result<IrValueId> {
    match node.input(index)? {
        NodeOutput::Plain(value) => Ok(value),
        NodeOutput::Complex(_) => Err(unsupported_complex(node, format!("{} cannot be complex", what))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_view::SourceNodeView;
    use graft_graph::{AttributeValue, Node};
    use graft_ir::{ElementType, IrGraph, TensorShape, evaluate};
    use std::collections::HashMap;

    fn node(op_type: &str, mode: Option<&str>) -> Node {
        let mut node = Node::new(op_type);
        node.name = "pad".to_string();
        if let Some(mode) = mode {
            node.attributes
                .insert("mode".to_string(), AttributeValue::String(mode.to_string()));
        }
        node
    }

    fn setup() -> (IrGraph, IrValueId, IrValueId) {
        let mut graph = IrGraph::new();
        let x = graph
            .add_parameter("x", ElementType::F32, TensorShape::Static(vec![3]))
            .unwrap();
        let paddings = graph
            .add_constant("p", TensorValue::from_i32(vec![2, 2], vec![1, 2]))
            .unwrap();
        (graph, x, paddings)
    }

    fn run(graph: &IrGraph, out: IrValueId) -> Vec<f32> {
        let feeds = HashMap::from([(
            "x".to_string(),
            TensorValue::from_f32(vec![1.0, 2.0, 3.0], vec![3]),
        )]);
        evaluate(graph, &feeds, &[out]).unwrap()[0]
            .as_f32()
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_pad_zero_fill() {
        let (mut graph, x, paddings) = setup();
        let n = node("Pad", None);
        let view = SourceNodeView::new(&n, vec![NodeOutput::Plain(x), NodeOutput::Plain(paddings)]);
        let mut builder = IrBuilder::new(&mut graph, "pad", "Pad");
        let out = PadOp::pad().translate(&view, &mut builder).unwrap()[0].value();
        assert_eq!(graph.shape(out).unwrap(), &TensorShape::Static(vec![7]));
        assert_eq!(run(&graph, out), vec![0.0, 0.0, 1.0, 2.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_pad_v2_explicit_fill() {
        let (mut graph, x, paddings) = setup();
        let fill = graph
            .add_constant("fill", TensorValue::from_f32(vec![9.0], vec![]))
            .unwrap();
        let n = node("PadV2", None);
        let inputs = vec![
            NodeOutput::Plain(x),
            NodeOutput::Plain(paddings),
            NodeOutput::Plain(fill),
        ];
        let view = SourceNodeView::new(&n, inputs);
        let mut builder = IrBuilder::new(&mut graph, "pad", "PadV2");
        let out = PadOp::pad_v2().translate(&view, &mut builder).unwrap()[0].value();
        assert_eq!(run(&graph, out), vec![9.0, 9.0, 1.0, 2.0, 3.0, 9.0, 9.0]);
    }

    #[test]
    fn test_mirror_pad_modes() {
        for (mode, expected) in [
            ("REFLECT", vec![3.0, 2.0, 1.0, 2.0, 3.0, 2.0, 1.0]),
            ("symmetric", vec![2.0, 1.0, 1.0, 2.0, 3.0, 3.0, 2.0]),
        ] {
            let (mut graph, x, paddings) = setup();
            let n = node("MIRROR_PAD", Some(mode));
            let view = SourceNodeView::new(&n, vec![NodeOutput::Plain(x), NodeOutput::Plain(paddings)]);
            let mut builder = IrBuilder::new(&mut graph, "pad", "MIRROR_PAD");
            let out = MirrorPadOp.translate(&view, &mut builder).unwrap()[0].value();
            assert_eq!(run(&graph, out), expected, "mode {}", mode);
        }
    }

    #[test]
    fn test_mirror_pad_errors() {
        let (mut graph, x, paddings) = setup();
        let inputs = vec![NodeOutput::Plain(x), NodeOutput::Plain(paddings)];

        let missing = node("MirrorPad", None);
        let view = SourceNodeView::new(&missing, inputs.clone());
        let mut builder = IrBuilder::new(&mut graph, "pad", "MirrorPad");
        assert!(matches!(
            MirrorPadOp.translate(&view, &mut builder),
            Err(crate::Error::MissingAttribute { ref attribute, .. }) if attribute == "mode"
        ));

        let bad = node("MirrorPad", Some("WRAP"));
        let view = SourceNodeView::new(&bad, inputs);
        assert!(matches!(
            MirrorPadOp.translate(&view, &mut builder),
            Err(crate::Error::UnsupportedAttributeValue { ref value, .. }) if value == "WRAP"
        ));
    }
}
