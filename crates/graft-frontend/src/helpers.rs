//! Shape and padding helpers shared by translators.

use crate::builder::IrBuilder;
use crate::node_view::NodeView;
use crate::{Error, Result};
use graft_ir::{ElementType, IrValueId, Op, PadMode};

/// Begin and end padding vectors, one entry per data dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadBounds {
    pub begin: IrValueId,
    pub end: IrValueId,
}

/// Split TensorFlow paddings of shape `[N, 2]` into begin and end vectors.
///
/// Row `i` of `paddings` is `[begin_i, end_i]`. The values are converted to
/// i64 and split with a scalar gather along axis 1. For complex data a `0` is
/// appended to both vectors so the packing axis stays untouched.
pub fn pad_bounds(builder: &mut IrBuilder<'_>, paddings: IrValueId, is_complex: bool) -> Result<PadBounds> {
    let paddings = builder.op(
        Op::Convert {
            to: ElementType::I64,
        },
        &[paddings],
    )?;
    let zero = builder.scalar_i64(0)?;
    let one = builder.scalar_i64(1)?;
    let mut begin = builder.op(Op::Gather { axis: 1 }, &[paddings, zero])?;
    let mut end = builder.op(Op::Gather { axis: 1 }, &[paddings, one])?;

    if is_complex {
        let packing_axis = builder.const_i64(&[0])?;
        begin = builder.op(Op::Concat { axis: 0 }, &[begin, packing_axis])?;
        end = builder.op(Op::Concat { axis: 0 }, &[end, packing_axis])?;
    }

    Ok(PadBounds { begin, end })
}

/// Map a MirrorPad `mode` attribute (case-insensitive) onto the IR.
pub fn mirror_pad_mode(node: &dyn NodeView, mode: &str) -> Result<PadMode> {
    match mode.to_ascii_uppercase().as_str() {
        "REFLECT" => Ok(PadMode::Reflect),
        "SYMMETRIC" => Ok(PadMode::Symmetric),
        _ => Err(Error::UnsupportedAttributeValue {
            node: node.name().to_string(),
            op_type: node.op_type().to_string(),
            attribute: "mode".to_string(),
            value: mode.to_string(),
        }),
    }
}

/// Rank of `value` as a 1-element i64 tensor, computed in the graph.
pub fn rank_of(builder: &mut IrBuilder<'_>, value: IrValueId) -> Result<IrValueId> {
    let shape = shape_of(builder, value)?;
    shape_of(builder, shape)
}

fn shape_of(builder: &mut IrBuilder<'_>, value: IrValueId) -> Result<IrValueId> {
    builder.op(
        Op::ShapeOf {
            output_type: ElementType::I64,
        },
        &[value],
    )
}

/// Reshape a legacy `Select` condition so it broadcasts against `x`.
///
/// The condition may have the same shape as `x`, be 1-D matching the leading
/// dimension of `x`, or be a scalar. In every case the new shape is the
/// condition's shape followed by `rank(x) - rank(cond)` ones. `x` must be a
/// plain value (the real plane for complex input).
pub fn align_condition(builder: &mut IrBuilder<'_>, condition: IrValueId, x: IrValueId) -> Result<IrValueId> {
    let cond_shape = shape_of(builder, condition)?;
    let cond_rank = shape_of(builder, cond_shape)?;
    let x_rank = rank_of(builder, x)?;
    let missing = builder.op(Op::Subtract, &[x_rank, cond_rank])?;

    let one = builder.scalar_i64(1)?;
    let ones = builder.op(Op::Broadcast, &[one, missing])?;
    let new_shape = builder.op(Op::Concat { axis: 0 }, &[cond_shape, ones])?;
    builder.op(Op::Reshape { special_zero: false }, &[condition, new_shape])
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_ir::{IrGraph, TensorShape, TensorValue, evaluate};
    use std::collections::HashMap;

    #[test]
    fn test_pad_bounds_real() {
        let mut graph = IrGraph::new();
        let paddings = graph
            .add_constant("p", TensorValue::from_i32(vec![1, 2, 3, 4], vec![2, 2]))
            .unwrap();
        let mut builder = IrBuilder::new(&mut graph, "pad", "Pad");
        let bounds = pad_bounds(&mut builder, paddings, false).unwrap();

        let begin = builder.graph().constant(bounds.begin).unwrap();
        let end = builder.graph().constant(bounds.end).unwrap();
        assert_eq!(begin.as_i64(), Some(&[1, 3][..]));
        assert_eq!(end.as_i64(), Some(&[2, 4][..]));
    }

    #[test]
    fn test_pad_bounds_complex_appends_zero() {
        let mut graph = IrGraph::new();
        let paddings = graph
            .add_parameter("p", ElementType::I64, TensorShape::Static(vec![1, 2]))
            .unwrap();
        let mut builder = IrBuilder::new(&mut graph, "pad", "Pad");
        let bounds = pad_bounds(&mut builder, paddings, true).unwrap();
        assert_eq!(
            builder.shape(bounds.begin).unwrap(),
            TensorShape::Static(vec![2])
        );

        let feeds = HashMap::from([("p".to_string(), TensorValue::from_i64(vec![1, 1], vec![1, 2]))]);
        let out = evaluate(&graph, &feeds, &[bounds.begin, bounds.end]).unwrap();
        assert_eq!(out[0].as_i64(), Some(&[1, 0][..]));
        assert_eq!(out[1].as_i64(), Some(&[1, 0][..]));
    }

    #[test]
    fn test_align_condition_shapes() {
        let cases: [(Vec<usize>, Vec<usize>); 3] = [
            (vec![2, 3], vec![2, 3]),
            (vec![2], vec![2, 1]),
            (vec![], vec![1, 1]),
        ];
        for (cond_shape, expected) in cases {
            let mut graph = IrGraph::new();
            let len = cond_shape.iter().product();
            let cond = graph
                .add_constant("c", TensorValue::from_bool(vec![true; len], cond_shape))
                .unwrap();
            let x = graph
                .add_parameter("x", ElementType::F32, TensorShape::Static(vec![2, 3]))
                .unwrap();
            let mut builder = IrBuilder::new(&mut graph, "select", "Select");
            let aligned = align_condition(&mut builder, cond, x).unwrap();
            assert_eq!(
                builder.shape(aligned).unwrap(),
                TensorShape::Static(expected)
            );
        }
    }
}
