//! Translator trait for per-op translation.

use crate::Result;
use crate::builder::IrBuilder;
use crate::node_view::NodeView;
use crate::output::NodeOutput;

/// Trait for translating one source op into IR.
///
/// Translators are stateless: the output depends only on the node view and
/// the IR built so far. They start with [`default_op_checks`] and fail fast on
/// the first violated contract.
///
/// # Example
///
/// ```ignore
/// struct IdentityOp;
///
/// impl Translator for IdentityOp {
///     fn name(&self) -> &str {
///         "Identity"
///     }
///
///     fn translate(&self, node: &dyn NodeView, _builder: &mut IrBuilder<'_>) -> Result<Vec<NodeOutput>> {
///         default_op_checks(node, 1, &["Identity"], true)?;
///         Ok(vec![node.input(0)?])
///     }
/// }
/// ```
///
/// [`default_op_checks`]: crate::checks::default_op_checks
pub trait Translator: Send + Sync {
    /// Get the translator name (usually the primary op type).
    fn name(&self) -> &str;

    /// Translate `node`, returning one output per source output.
    fn translate(&self, node: &dyn NodeView, builder: &mut IrBuilder<'_>) -> Result<Vec<NodeOutput>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockOp;

    impl Translator for MockOp {
        fn name(&self) -> &str {
            "Mock"
        }

        fn translate(&self, node: &dyn NodeView, _builder: &mut IrBuilder<'_>) -> Result<Vec<NodeOutput>> {
            Ok(vec![node.input(0)?])
        }
    }

    #[test]
    fn test_translator_trait_object() {
        let op: Box<dyn Translator> = Box::new(MockOp);
        assert_eq!(op.name(), "Mock");
    }
}
