//! Translators that build complex values or project them back to real ones.

use crate::builder::IrBuilder;
use crate::checks::default_op_checks;
use crate::complex::{self, Planes};
use crate::node_view::NodeView;
use crate::output::{ComplexValue, NodeOutput};
use crate::translator::Translator;
use crate::{Error, Result};
use graft_ir::{ElementType, Op, TensorValue};

/// Builds a complex value from a real and an imaginary tensor.
///
/// Both inputs must share a float element type, which becomes the part type,
/// and the same shape.
pub struct ComplexOp;

impl Translator for ComplexOp {
    fn name(&self) -> &str {
        "Complex"
    }

    fn translate(&self, node: &dyn NodeView, builder: &mut IrBuilder<'_>) -> Result<Vec<NodeOutput>> {
        default_op_checks(node, 2, &["Complex"], false)?;
        let real = node.input(0)?.value();
        let imag = node.input(1)?.value();

        let part_type = builder.dtype(real)?;
        if !part_type.is_float() {
            return Err(Error::UnsupportedAttributeValue {
                node: node.name().to_string(),
                op_type: node.op_type().to_string(),
                attribute: "T".to_string(),
                value: format!("{:?}", part_type),
            });
        }

        Ok(vec![complex::pack_and_mark(builder, Planes { real, imag }, part_type)?])
    }
}

/// Projects a complex value onto its real or imaginary plane.
///
/// Real input has a zero imaginary plane, so `Real` passes it through and
/// `Imag` yields zeros of the same shape.
pub struct PartOp {
    name: &'static str,
    imaginary: bool,
}

impl PartOp {
    /// Create a Real translator.
    pub fn real() -> Self {
        Self {
            name: "Real",
            imaginary: false,
        }
    }

    /// Create an Imag translator.
    pub fn imag() -> Self {
        Self {
            name: "Imag",
            imaginary: true,
        }
    }
}

impl Translator for PartOp {
    fn name(&self) -> &str {
        self.name
    }

    fn translate(&self, node: &dyn NodeView, builder: &mut IrBuilder<'_>) -> Result<Vec<NodeOutput>> {
        default_op_checks(node, 1, &[self.name], true)?;
        let output = match node.input(0)? {
            NodeOutput::Complex(value) => {
                let planes = complex::split(builder, &value)?;
                if self.imaginary { planes.imag } else { planes.real }
            }
            NodeOutput::Plain(value) if self.imaginary => {
                let dtype = builder.dtype(value)?;
                let zero = builder.constant(TensorValue::zero(dtype))?;
                let shape = builder.op(
                    Op::ShapeOf {
                        output_type: ElementType::I64,
                    },
                    &[value],
                )?;
                builder.op(Op::Broadcast, &[zero, shape])?
            }
            NodeOutput::Plain(value) => value,
        };
        Ok(vec![NodeOutput::Plain(output)])
    }
}

/// Magnitude of a complex value, `sqrt(re^2 + im^2)`.
pub struct ComplexAbsOp;

impl Translator for ComplexAbsOp {
    fn name(&self) -> &str {
        "ComplexAbs"
    }

    fn translate(&self, node: &dyn NodeView, builder: &mut IrBuilder<'_>) -> Result<Vec<NodeOutput>> {
        default_op_checks(node, 1, &["ComplexAbs"], true)?;
        let value = match node.input(0)? {
            NodeOutput::Complex(value) => value,
            NodeOutput::Plain(value) => {
                return Err(Error::UnsupportedAttributeValue {
                    node: node.name().to_string(),
                    op_type: node.op_type().to_string(),
                    attribute: "T".to_string(),
                    value: format!("{:?}", builder.dtype(value)?),
                });
            }
        };
        Ok(vec![NodeOutput::Plain(magnitude(builder, &value)?)])
    }
}

fn magnitude(builder: &mut IrBuilder<'_>, value: &ComplexValue) -> Result<graft_ir::IrValueId> {
    let planes = complex::split(builder, value)?;
    let re2 = builder.op(Op::Multiply, &[planes.real, planes.real])?;
    let im2 = builder.op(Op::Multiply, &[planes.imag, planes.imag])?;
    let sum = builder.op(Op::Add, &[re2, im2])?;
    builder.op(Op::Sqrt, &[sum])
}
