//! Individual translators that don't fit into families.

pub mod add_n;
pub mod complex;
pub mod constant;
pub mod pad;
pub mod scatter_nd;
pub mod select;

pub use add_n::AddNOp;
pub use complex::{ComplexAbsOp, ComplexOp, PartOp};
pub use constant::{ConstOp, IdentityOp};
pub use pad::{MirrorPadOp, PadOp};
pub use scatter_nd::ScatterNdOp;
pub use select::SelectOp;
