//! Complex-aware translation of TensorFlow operations into the graft IR.
//!
//! The frontend walks a source [`graft_graph::Graph`] in topological order and
//! hands every node to the translator registered for its op type. Translators
//! build IR subgraphs through an [`IrBuilder`] and return one [`NodeOutput`]
//! per source output.
//!
//! # Complex values
//!
//! The IR has no complex element type. A complex tensor travels as a packed real
//! tensor with a trailing dimension of 2 behind an `Op::ComplexMark` node.
//! Translators see inputs already classified as [`NodeOutput::Plain`] or
//! [`NodeOutput::Complex`] and either reject complex input up front or run the
//! split / per-plane / re-pack algorithm from the [`complex`] module.
//!
//! # Translator families
//!
//! - **Binary elementwise**: Add, AddV2, Sub, Mul
//! - **Reduction**: Sum, Mean, Min, Max, Prod, All, Any, EuclideanNorm
//!
//! # Individual translators
//!
//! - AddN
//! - Pad, PadV2, MirrorPad
//! - ScatterNd
//! - Select, SelectV2
//! - Complex, Real, Imag, ComplexAbs
//! - Const, Identity

pub mod builder;
pub mod checks;
pub mod complex;
pub mod driver;
pub mod families;
pub mod helpers;
pub mod node_view;
pub mod operators;
pub mod output;
pub mod registry;
pub mod translator;

pub use builder::IrBuilder;
pub use checks::default_op_checks;
pub use driver::{FailurePolicy, GraphTranslator, TranslatedModel, TranslationFailure, TranslationOptions};
pub use families::{BinaryElementwiseOp, ReduceKind, ReductionOp};
pub use node_view::{NodeView, SourceNodeView};
pub use output::{ComplexValue, NodeOutput};
pub use registry::TranslatorRegistry;
pub use translator::Translator;

/// Result type for translation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while translating source nodes.
///
/// Every node-level variant names the offending node and its op type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{node} ({op_type}): unsupported op type, expected one of [{expected}]")]
    UnsupportedOp {
        node: String,
        op_type: String,
        expected: String,
    },

    #[error("{node} ({op_type}): expected at least {expected} inputs, got {actual}")]
    ArityError {
        node: String,
        op_type: String,
        expected: usize,
        actual: usize,
    },

    #[error("{node} ({op_type}): unsupported complex input: {reason}")]
    UnsupportedComplexInput {
        node: String,
        op_type: String,
        reason: String,
    },

    #[error("{node} ({op_type}): missing attribute '{attribute}'")]
    MissingAttribute {
        node: String,
        op_type: String,
        attribute: String,
    },

    #[error("{node} ({op_type}): unsupported value for attribute '{attribute}': {value}")]
    UnsupportedAttributeValue {
        node: String,
        op_type: String,
        attribute: String,
        value: String,
    },

    #[error("{node} ({op_type}): {source}")]
    ShapeMismatch {
        node: String,
        op_type: String,
        #[source]
        source: graft_ir::Error,
    },

    #[error("Invalid graph: {0}")]
    InvalidGraph(#[from] graft_graph::GraphError),
}

impl Error {
    /// Name of the source node the error is about, if any.
    pub fn node(&self) -> Option<&str> {
        match self {
            Error::UnsupportedOp { node, .. }
            | Error::ArityError { node, .. }
            | Error::UnsupportedComplexInput { node, .. }
            | Error::MissingAttribute { node, .. }
            | Error::UnsupportedAttributeValue { node, .. }
            | Error::ShapeMismatch { node, .. } => Some(node),
            Error::InvalidGraph(_) => None,
        }
    }
}
