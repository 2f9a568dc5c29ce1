//! Select and SelectV2 translators.

use crate::Result;
use crate::builder::IrBuilder;
use crate::checks::{default_op_checks, unsupported_complex};
use crate::complex::{self, Marking, Planes};
use crate::helpers::align_condition;
use crate::node_view::NodeView;
use crate::output::NodeOutput;
use crate::translator::Translator;
use graft_ir::{IrValueId, Op};
use tracing::trace;

/// Picks from `x` where the condition holds and from `y` elsewhere.
///
/// `SelectV2` inputs already broadcast NumPy-style. Legacy `Select` also
/// accepts a 1-D condition matching the leading dimension of `x`, or a scalar,
/// so its condition is reshaped first. Complex `x` and `y` are selected plane
/// by plane.
pub struct SelectOp {
    name: &'static str,
    align: bool,
}

impl SelectOp {
    /// Create a legacy Select translator.
    pub fn select() -> Self {
        Self {
            name: "Select",
            align: true,
        }
    }

    /// Create a SelectV2 translator.
    pub fn select_v2() -> Self {
        Self {
            name: "SelectV2",
            align: false,
        }
    }

    fn condition(&self, builder: &mut IrBuilder<'_>, condition: IrValueId, x: IrValueId) -> Result<IrValueId> {
        if self.align {
            align_condition(builder, condition, x)
        } else {
            Ok(condition)
        }
    }
}

impl Translator for SelectOp {
    fn name(&self) -> &str {
        self.name
    }

    fn translate(&self, node: &dyn NodeView, builder: &mut IrBuilder<'_>) -> Result<Vec<NodeOutput>> {
        default_op_checks(node, 3, &[self.name], true)?;
        let condition = match node.input(0)? {
            NodeOutput::Plain(value) => value,
            NodeOutput::Complex(_) => {
                return Err(unsupported_complex(node, "condition cannot be complex"));
            }
        };
        let branches = [node.input(1)?, node.input(2)?];

        let output = match complex::classify_all(node, &branches)? {
            Marking::Real(v) => {
                let condition = self.condition(builder, condition, v[0])?;
                NodeOutput::Plain(builder.op(Op::Select, &[condition, v[0], v[1]])?)
            }
            Marking::Complex(v) => {
                trace!(node = node.name(), "selecting per plane");
                let x = complex::split(builder, &v[0])?;
                let y = complex::split(builder, &v[1])?;
                let condition = self.condition(builder, condition, x.real)?;
                let real = builder.op(Op::Select, &[condition, x.real, y.real])?;
                let imag = builder.op(Op::Select, &[condition, x.imag, y.imag])?;
                complex::pack_and_mark(builder, Planes { real, imag }, v[0].part_type)?
            }
        };
        Ok(vec![output])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_view::SourceNodeView;
    use graft_graph::Node;
    use graft_ir::{ElementType, IrGraph, TensorShape, TensorValue, evaluate};
    use std::collections::HashMap;

    fn node(op_type: &str) -> Node {
        let mut node = Node::new(op_type);
        node.name = "select".to_string();
        node
    }

    #[test]
    fn test_legacy_select_leading_dim_condition() {
        let mut graph = IrGraph::new();
        let cond = graph
            .add_constant("c", TensorValue::from_bool(vec![true, false], vec![2]))
            .unwrap();
        let x = graph
            .add_constant("x", TensorValue::from_f32(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]))
            .unwrap();
        let y = graph
            .add_constant("y", TensorValue::from_f32(vec![-1.0, -2.0, -3.0, -4.0], vec![2, 2]))
            .unwrap();

        let n = node("Select");
        let inputs = vec![NodeOutput::Plain(cond), NodeOutput::Plain(x), NodeOutput::Plain(y)];
        let view = SourceNodeView::new(&n, inputs);
        let mut builder = IrBuilder::new(&mut graph, "select", "Select");
        let out = SelectOp::select().translate(&view, &mut builder).unwrap();

        let result = evaluate(&graph, &HashMap::new(), &[out[0].value()]).unwrap();
        assert_eq!(result[0].as_f32(), Some(&[1.0, 2.0, -3.0, -4.0][..]));
    }

    #[test]
    fn test_select_v2_complex_per_plane() {
        let mut graph = IrGraph::new();
        let cond = graph
            .add_parameter("c", ElementType::Bool, TensorShape::Static(vec![2]))
            .unwrap();
        let marked = |graph: &mut IrGraph, name: &str, values: Vec<f32>| {
            let packed = graph
                .add_constant(name, TensorValue::from_f32(values, vec![2, 2]))
                .unwrap();
            let marker = graph
                .add_op(
                    format!("{}/mark", name),
                    Op::ComplexMark {
                        part_type: ElementType::F32,
                    },
                    &[packed],
                )
                .unwrap();
            NodeOutput::classify(graph, marker).unwrap()
        };
        let x = marked(&mut graph, "x", vec![1.0, 10.0, 2.0, 20.0]);
        let y = marked(&mut graph, "y", vec![3.0, 30.0, 4.0, 40.0]);

        let n = node("SelectV2");
        let view = SourceNodeView::new(&n, vec![NodeOutput::Plain(cond), x, y]);
        let mut builder = IrBuilder::new(&mut graph, "select", "SelectV2");
        let out = SelectOp::select_v2().translate(&view, &mut builder).unwrap();
        let packed = out[0].as_complex().unwrap().packed;

        let feeds = HashMap::from([(
            "c".to_string(),
            TensorValue::from_bool(vec![false, true], vec![2]),
        )]);
        let result = evaluate(&graph, &feeds, &[packed]).unwrap();
        assert_eq!(result[0].as_f32(), Some(&[3.0, 30.0, 2.0, 20.0][..]));
    }

    #[test]
    fn test_select_rejects_wrong_alias() {
        let mut graph = IrGraph::new();
        let n = node("SelectV2");
        let view = SourceNodeView::new(&n, vec![]);
        let mut builder = IrBuilder::new(&mut graph, "select", "SelectV2");
        assert!(matches!(
            SelectOp::select().translate(&view, &mut builder),
            Err(crate::Error::UnsupportedOp { .. })
        ));
    }
}
