//! AddN translator.

use crate::Result;
use crate::builder::IrBuilder;
use crate::checks::default_op_checks;
use crate::complex;
use crate::node_view::NodeView;
use crate::output::NodeOutput;
use crate::translator::Translator;
use graft_ir::Op;

/// Sums any number of same-shaped tensors.
///
/// The inputs are folded left to right with binary `Add`, so `n` inputs give
/// `n - 1` adds. Complex inputs are summed plane by plane.
pub struct AddNOp;

impl Translator for AddNOp {
    fn name(&self) -> &str {
        "AddN"
    }

    fn translate(&self, node: &dyn NodeView, builder: &mut IrBuilder<'_>) -> Result<Vec<NodeOutput>> {
        default_op_checks(node, 1, &["AddN", "ADD_N"], true)?;
        let inputs = node.inputs()?;

        let output = complex::map_planes(node, builder, &inputs, |b, values| {
            let mut sum = values[0];
            for &value in &values[1..] {
                sum = b.op(Op::Add, &[sum, value])?;
            }
            Ok(sum)
        })?;
        Ok(vec![output])
    }
}
