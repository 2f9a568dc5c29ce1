//! ScatterNd translator.

use crate::Result;
use crate::builder::IrBuilder;
use crate::checks::{default_op_checks, unsupported_complex};
use crate::complex;
use crate::node_view::NodeView;
use crate::output::NodeOutput;
use crate::translator::Translator;
use graft_ir::{ElementType, Op, TensorValue};

/// Scatters `updates` into a zero tensor of the given shape.
///
/// Inputs are `(indices, updates, shape)`. Complex updates are scattered in
/// packed form: the target shape gains the trailing `2` and the result is
/// marked with the updates' part type.
pub struct ScatterNdOp;

impl Translator for ScatterNdOp {
    fn name(&self) -> &str {
        "ScatterNd"
    }

    fn translate(&self, node: &dyn NodeView, builder: &mut IrBuilder<'_>) -> Result<Vec<NodeOutput>> {
        default_op_checks(node, 3, &["ScatterNd", "SCATTER_ND"], true)?;
        let indices = node.input(0)?;
        let shape = node.input(2)?;
        if indices.is_complex() || shape.is_complex() {
            return Err(unsupported_complex(node, "only updates may be complex"));
        }
        let updates = node.input(1)?;

        let (data, part_type) = match updates {
            NodeOutput::Plain(value) => (value, None),
            NodeOutput::Complex(value) => (value.packed, Some(value.part_type)),
        };

        let dtype = builder.dtype(data)?;
        let zero = builder.constant(TensorValue::zero(dtype))?;
        let mut target = builder.op(
            Op::Convert {
                to: ElementType::I64,
            },
            &[shape.value()],
        )?;
        if part_type.is_some() {
            let packing_axis = builder.const_i64(&[2])?;
            target = builder.op(Op::Concat { axis: 0 }, &[target, packing_axis])?;
        }
        let zeros = builder.op(Op::Broadcast, &[zero, target])?;
        let scattered = builder.op(Op::ScatterNdUpdate, &[zeros, indices.value(), data])?;

        let output = match part_type {
            Some(part_type) => complex::mark(builder, scattered, part_type)?,
            None => NodeOutput::Plain(scattered),
        };
        Ok(vec![output])
    }
}
