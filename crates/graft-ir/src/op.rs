//! The IR op library.

use crate::types::{ElementType, TensorShape, TensorValue};

/// An IR operation. Every node produces exactly one output value.
///
/// Input order is fixed per op and noted on each variant. Axes may be negative
/// and count from the back.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Graph input fed at evaluation time.
    Parameter {
        name: String,
        dtype: ElementType,
        shape: TensorShape,
    },

    /// Compile-time constant.
    Constant(TensorValue),

    /// Element type conversion. Inputs: `(data)`.
    Convert { to: ElementType },

    /// Elementwise `a + b` with NumPy broadcasting.
    Add,

    /// Elementwise `a - b` with NumPy broadcasting.
    Subtract,

    /// Elementwise `a * b` with NumPy broadcasting.
    Multiply,

    /// Elementwise `a < b`, producing bool.
    Less,

    /// Elementwise square root (float only).
    Sqrt,

    /// Elementwise cosine (float only).
    Cos,

    /// Elementwise sine (float only).
    Sin,

    /// Elementwise `atan2(y, x)`. Inputs: `(y, x)`.
    Atan2,

    /// Take elements along `axis`. Inputs: `(data, indices)`.
    ///
    /// A scalar index drops the axis; negative indices count from the back.
    Gather { axis: i64 },

    /// Concatenate all inputs along `axis`.
    Concat { axis: i64 },

    /// Pad with per-axis begin/end counts. Inputs: `(data, begin, end[, value])`.
    ///
    /// `value` is only accepted in constant mode and defaults to zero.
    Pad { mode: PadMode },

    /// Reduce over a set of axes. Inputs: `(data, axes)`.
    Reduce { kind: ReduceKind, keep_dims: bool },

    /// Bidirectional broadcast to a target shape. Inputs: `(data, target_shape)`.
    Broadcast,

    /// Copy of `data` with slices replaced. Inputs: `(data, indices, updates)`.
    ScatterNdUpdate,

    /// Elementwise choice. Inputs: `(condition, then, else)`; all broadcast.
    Select,

    /// Reshape. Inputs: `(data, shape)`. `-1` infers one dimension; with
    /// `special_zero` a `0` copies the input dimension at the same position.
    Reshape { special_zero: bool },

    /// Remove size-1 axes (all of them when `axes` is empty).
    Squeeze { axes: Vec<i64> },

    /// Insert size-1 axes; positions refer to the output rank.
    Unsqueeze { axes: Vec<i64> },

    /// Shape of the input as a 1-D integer tensor.
    ShapeOf { output_type: ElementType },

    /// Marks its packed input (trailing dimension 2) as complex with the given part type.
    ComplexMark { part_type: ElementType },
}

impl Op {
    /// Short name used for node naming and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Op::Parameter { .. } => "Parameter",
            Op::Constant(_) => "Constant",
            Op::Convert { .. } => "Convert",
            Op::Add => "Add",
            Op::Subtract => "Subtract",
            Op::Multiply => "Multiply",
            Op::Less => "Less",
            Op::Sqrt => "Sqrt",
            Op::Cos => "Cos",
            Op::Sin => "Sin",
            Op::Atan2 => "Atan2",
            Op::Gather { .. } => "Gather",
            Op::Concat { .. } => "Concat",
            Op::Pad { .. } => "Pad",
            Op::Reduce { kind, .. } => kind.name(),
            Op::Broadcast => "Broadcast",
            Op::ScatterNdUpdate => "ScatterNdUpdate",
            Op::Select => "Select",
            Op::Reshape { .. } => "Reshape",
            Op::Squeeze { .. } => "Squeeze",
            Op::Unsqueeze { .. } => "Unsqueeze",
            Op::ShapeOf { .. } => "ShapeOf",
            Op::ComplexMark { .. } => "ComplexMark",
        }
    }

    /// Whether this is the complex marker.
    pub fn is_complex_mark(&self) -> bool {
        matches!(self, Op::ComplexMark { .. })
    }
}

/// Padding modes of [`Op::Pad`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadMode {
    /// Fill with a constant value.
    Constant,

    /// Repeat the border element.
    Edge,

    /// Mirror without repeating the border element.
    Reflect,

    /// Mirror including the border element.
    Symmetric,
}

/// Reductions of [`Op::Reduce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReduceKind {
    Sum,
    Mean,
    Min,
    Max,
    Prod,
    LogicalAnd,
    LogicalOr,
    L2,
}

impl ReduceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ReduceKind::Sum => "ReduceSum",
            ReduceKind::Mean => "ReduceMean",
            ReduceKind::Min => "ReduceMin",
            ReduceKind::Max => "ReduceMax",
            ReduceKind::Prod => "ReduceProd",
            ReduceKind::LogicalAnd => "ReduceLogicalAnd",
            ReduceKind::LogicalOr => "ReduceLogicalOr",
            ReduceKind::L2 => "ReduceL2",
        }
    }

    /// Whether the reduction works on bool input (the others need numbers).
    pub fn is_logical(&self) -> bool {
        matches!(self, ReduceKind::LogicalAnd | ReduceKind::LogicalOr)
    }
}
