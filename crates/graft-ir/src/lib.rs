//! Target intermediate representation for graft.
//!
//! This crate provides the fixed op library that translated graphs are built from:
//! - Arena IR graph (`IrGraph`, `IrNode`, `IrValue`) addressed by stable handles
//! - Typed operations (`Op`) with per-op type and shape inference
//! - Small-constant folding while the graph is being built
//! - A reference evaluator for checking translated subgraphs numerically
//!
//! Complex numbers have no native element type here. A complex tensor is a
//! real tensor whose trailing dimension is 2 (index 0 real, index 1
//! imaginary), sitting behind an [`Op::ComplexMark`] node.

pub mod broadcast;
pub mod eval;
pub mod infer;
pub mod ir;
mod kernels;
pub mod op;
pub mod types;

// Re-export commonly used types
pub use broadcast::{broadcast_dims, broadcast_shape};
pub use eval::evaluate;
pub use ir::{FoldOptions, IrGraph, IrNode, IrNodeId, IrValue, IrValueId};
pub use op::{Op, PadMode, ReduceKind};
pub use types::{Dim, ElementType, TensorData, TensorShape, TensorValue};

/// Result type using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by IR construction, validation and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid graph structure: {0}")]
    InvalidGraph(String),

    #[error("Shape error: {0}")]
    Shape(String),

    #[error("Type error: {0}")]
    Type(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),
}
