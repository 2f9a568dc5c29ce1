//! Binary elementwise translator family.
//!
//! Covers: Add, AddV2, Sub, Mul

use crate::Result;
use crate::builder::IrBuilder;
use crate::checks::default_op_checks;
use crate::complex::{self, Marking};
use crate::node_view::NodeView;
use crate::output::NodeOutput;
use crate::translator::Translator;
use graft_ir::Op;

/// How the two complex operands are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComplexRule {
    /// Apply the op to each plane independently.
    PerPlane,
    /// `(a + bi)(c + di) = (ac - bd) + (ad + bc)i`
    Product,
}

/// Binary elementwise translator family.
///
/// Both operands broadcast NumPy-style. Complex operands must both be marked
/// with the same part type.
pub struct BinaryElementwiseOp {
    name: &'static str,
    aliases: &'static [&'static str],
    op: Op,
    complex_rule: ComplexRule,
}

impl BinaryElementwiseOp {
    /// Create an Add translator (also accepts AddV2).
    pub fn add() -> Self {
        Self {
            name: "Add",
            aliases: &["Add", "AddV2"],
            op: Op::Add,
            complex_rule: ComplexRule::PerPlane,
        }
    }

    /// Create a Sub translator.
    pub fn sub() -> Self {
        Self {
            name: "Sub",
            aliases: &["Sub"],
            op: Op::Subtract,
            complex_rule: ComplexRule::PerPlane,
        }
    }

    /// Create a Mul translator.
    pub fn mul() -> Self {
        Self {
            name: "Mul",
            aliases: &["Mul"],
            op: Op::Multiply,
            complex_rule: ComplexRule::Product,
        }
    }
}

impl Translator for BinaryElementwiseOp {
    fn name(&self) -> &str {
        self.name
    }

    fn translate(&self, node: &dyn NodeView, builder: &mut IrBuilder<'_>) -> Result<Vec<NodeOutput>> {
        default_op_checks(node, 2, self.aliases, true)?;
        let inputs = [node.input(0)?, node.input(1)?];

        let output = match self.complex_rule {
            ComplexRule::PerPlane => complex::map_planes(node, builder, &inputs, |b, v| {
                b.op(self.op.clone(), &[v[0], v[1]])
            })?,
            ComplexRule::Product => match complex::classify_all(node, &inputs)? {
                Marking::Real(v) => NodeOutput::Plain(builder.op(self.op.clone(), &[v[0], v[1]])?),
                Marking::Complex(v) => {
                    let lhs = complex::split(builder, &v[0])?;
                    let rhs = complex::split(builder, &v[1])?;
                    let planes = complex::product(builder, lhs, rhs)?;
                    complex::pack_and_mark(builder, planes, v[0].part_type)?
                }
            },
        };
        Ok(vec![output])
    }
}
