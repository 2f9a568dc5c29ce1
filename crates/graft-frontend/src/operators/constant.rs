//! Const and Identity translators.

use crate::builder::IrBuilder;
use crate::checks::default_op_checks;
use crate::complex;
use crate::node_view::NodeView;
use crate::output::NodeOutput;
use crate::translator::Translator;
use crate::{Error, Result};
use graft_graph::TensorLiteral;
use graft_ir::{ElementType, TensorValue};

/// Embeds the `value` tensor attribute as an IR constant.
///
/// Complex literals become a packed constant behind a marker.
pub struct ConstOp;

impl Translator for ConstOp {
    fn name(&self) -> &str {
        "Const"
    }

    fn translate(&self, node: &dyn NodeView, builder: &mut IrBuilder<'_>) -> Result<Vec<NodeOutput>> {
        default_op_checks(node, 0, &["Const"], true)?;
        let literal: TensorLiteral = node.attribute("value")?;

        let shape_error = |source| Error::ShapeMismatch {
            node: node.name().to_string(),
            op_type: node.op_type().to_string(),
            source,
        };
        let value = TensorValue::from_literal(&literal).map_err(shape_error)?;
        let constant = builder.constant(value)?;

        let output = match literal.dtype.complex_part_type() {
            Some(part) => {
                let part_type = ElementType::from_data_type(part).map_err(shape_error)?;
                complex::mark(builder, constant, part_type)?
            }
            None => NodeOutput::Plain(constant),
        };
        Ok(vec![output])
    }
}

/// Passes its input through unchanged, marker included.
pub struct IdentityOp;

impl Translator for IdentityOp {
    fn name(&self) -> &str {
        "Identity"
    }

    fn translate(&self, node: &dyn NodeView, _builder: &mut IrBuilder<'_>) -> Result<Vec<NodeOutput>> {
        default_op_checks(node, 1, &["Identity"], true)?;
        Ok(vec![node.input(0)?])
    }
}
