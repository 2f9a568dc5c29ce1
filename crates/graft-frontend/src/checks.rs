//! Contract checks shared by all translators.

use crate::node_view::NodeView;
use crate::{Error, Result};

/// Validate the basic contract of a node before translating it.
///
/// Checks, in order, that the op type is one of `supported_ops`, that at least
/// `min_inputs` inputs are present, and (unless `allow_complex`) that no input
/// is a complex value.
pub fn default_op_checks(
    node: &dyn NodeView,
    min_inputs: usize,
    supported_ops: &[&str],
    allow_complex: bool,
) -> Result<()> {
    if !supported_ops.contains(&node.op_type()) {
        return Err(Error::UnsupportedOp {
            node: node.name().to_string(),
            op_type: node.op_type().to_string(),
            expected: supported_ops.join(", "),
        });
    }

    if node.input_count() < min_inputs {
        return Err(Error::ArityError {
            node: node.name().to_string(),
            op_type: node.op_type().to_string(),
            expected: min_inputs,
            actual: node.input_count(),
        });
    }

    if !allow_complex {
        for index in 0..node.input_count() {
            if node.input(index)?.is_complex() {
                return Err(unsupported_complex(
                    node,
                    format!("input {} is complex", index),
                ));
            }
        }
    }

    Ok(())
}

/// `UnsupportedComplexInput` for `node`.
pub fn unsupported_complex(node: &dyn NodeView, reason: impl Into<String>) -> Error {
    Error::UnsupportedComplexInput {
        node: node.name().to_string(),
        op_type: node.op_type().to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_view::SourceNodeView;
    use crate::output::{ComplexValue, NodeOutput};
    use graft_graph::Node;
    use graft_ir::{ElementType, IrValueId};

    fn node(op_type: &str) -> Node {
        let mut node = Node::new(op_type);
        node.name = "n".to_string();
        node
    }

    fn complex(id: usize) -> NodeOutput {
        NodeOutput::Complex(ComplexValue {
            marker: IrValueId(id),
            packed: IrValueId(id - 1),
            part_type: ElementType::F32,
        })
    }

    #[test]
    fn test_unsupported_op() {
        let n = node("Conv2D");
        let view = SourceNodeView::new(&n, vec![]);
        let err = default_op_checks(&view, 0, &["AddN", "ADD_N"], true).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOp { .. }));
        assert!(err.to_string().contains("AddN, ADD_N"));
    }

    #[test]
    fn test_arity() {
        let n = node("Pad");
        let view = SourceNodeView::new(&n, vec![NodeOutput::Plain(IrValueId(0))]);
        assert!(matches!(
            default_op_checks(&view, 2, &["Pad"], true),
            Err(Error::ArityError {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_complex_gate() {
        let n = node("Sum");
        let view = SourceNodeView::new(&n, vec![complex(1), NodeOutput::Plain(IrValueId(2))]);
        assert!(matches!(
            default_op_checks(&view, 2, &["Sum"], false),
            Err(Error::UnsupportedComplexInput { .. })
        ));
        assert!(default_op_checks(&view, 2, &["Sum"], true).is_ok());
    }
}
