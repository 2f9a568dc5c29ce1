//! Translator families.
//!
//! A family implements the shared translation once and is parameterized by
//! the op it emits and the aliases it accepts.

pub mod binary_elementwise;
pub mod reduction;

pub use binary_elementwise::BinaryElementwiseOp;
pub use reduction::{ReduceKind, ReductionOp};
