//! Core types for element types, tensor shapes and compile-time values.

use crate::{Error, Result};
use graft_graph::{DataType, TensorLiteral};

/// Element types the target IR supports natively.
///
/// Complex numbers are not among them: the frontend represents them as a
/// packed real tensor with a trailing dimension of 2 behind a complex marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    F32,
    F64,
    I32,
    I64,
    Bool,
}

impl ElementType {
    /// Whether this is a floating-point type.
    pub fn is_float(&self) -> bool {
        matches!(self, ElementType::F32 | ElementType::F64)
    }

    /// Whether this is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(self, ElementType::I32 | ElementType::I64)
    }

    /// Whether arithmetic is defined on this type.
    pub fn is_numeric(&self) -> bool {
        self.is_float() || self.is_integer()
    }

    /// Map a source data type onto the IR.
    ///
    /// Complex types have no native IR counterpart and are rejected here.
    pub fn from_data_type(dtype: DataType) -> Result<Self> {
        match dtype {
            DataType::F32 => Ok(ElementType::F32),
            DataType::F64 => Ok(ElementType::F64),
            DataType::I32 => Ok(ElementType::I32),
            DataType::I64 => Ok(ElementType::I64),
            DataType::Bool => Ok(ElementType::Bool),
            DataType::Complex64 | DataType::Complex128 => Err(Error::Unsupported(format!(
                "{:?} has no native element type in the IR",
                dtype
            ))),
        }
    }
}

/// A single dimension in a partially known shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dim {
    /// Known at compile time.
    Fixed(usize),

    /// Only known at run time.
    Any,
}

impl Dim {
    /// Get the fixed value if available.
    pub fn as_fixed(&self) -> Option<usize> {
        match self {
            Dim::Fixed(n) => Some(*n),
            Dim::Any => None,
        }
    }
}

/// Tensor shape with support for static, partially dynamic and unranked shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TensorShape {
    /// All dimensions are known at compile time.
    Static(Vec<usize>),

    /// Rank is known; some dimensions are only known at run time.
    Dynamic(Vec<Dim>),

    /// Rank is unknown.
    Unknown,
}

impl TensorShape {
    /// Scalar shape.
    pub fn scalar() -> Self {
        TensorShape::Static(vec![])
    }

    /// Check if the shape is fully static.
    pub fn is_static(&self) -> bool {
        matches!(self, TensorShape::Static(_))
    }

    /// Get static dimensions if available.
    pub fn as_static(&self) -> Option<&[usize]> {
        match self {
            TensorShape::Static(dims) => Some(dims),
            _ => None,
        }
    }

    /// Number of dimensions, if known.
    pub fn rank(&self) -> Option<usize> {
        match self {
            TensorShape::Static(dims) => Some(dims.len()),
            TensorShape::Dynamic(dims) => Some(dims.len()),
            TensorShape::Unknown => None,
        }
    }

    /// Per-dimension view (`None` for unknown rank, `None` entries for dynamic dims).
    pub fn dims(&self) -> Option<Vec<Option<usize>>> {
        match self {
            TensorShape::Static(dims) => Some(dims.iter().map(|&d| Some(d)).collect()),
            TensorShape::Dynamic(dims) => Some(dims.iter().map(Dim::as_fixed).collect()),
            TensorShape::Unknown => None,
        }
    }

    /// Build a shape from a per-dimension view, collapsing to `Static` when possible.
    pub fn from_dims(dims: Option<Vec<Option<usize>>>) -> Self {
        match dims {
            None => TensorShape::Unknown,
            Some(dims) => {
                if dims.iter().all(Option::is_some) {
                    TensorShape::Static(dims.into_iter().flatten().collect())
                } else {
                    TensorShape::Dynamic(
                        dims.into_iter()
                            .map(|d| d.map_or(Dim::Any, Dim::Fixed))
                            .collect(),
                    )
                }
            }
        }
    }

    /// Known size of the last dimension.
    pub fn last_dim(&self) -> Option<usize> {
        self.dims().and_then(|dims| dims.last().copied().flatten())
    }

    /// Number of elements, if the shape is static.
    pub fn element_count(&self) -> Option<usize> {
        self.as_static().map(|dims| dims.iter().product())
    }
}

impl From<&graft_graph::TensorShape> for TensorShape {
    fn from(shape: &graft_graph::TensorShape) -> Self {
        match shape {
            graft_graph::TensorShape::Static(dims) => TensorShape::Static(dims.clone()),
            graft_graph::TensorShape::Dynamic(dims) => TensorShape::from_dims(Some(
                dims.iter()
                    .map(|d| match d {
                        graft_graph::Dimension::Static(n) => Some(*n),
                        graft_graph::Dimension::Named(_) => None,
                    })
                    .collect(),
            )),
            graft_graph::TensorShape::Unknown => TensorShape::Unknown,
        }
    }
}

/// Raw tensor data.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    F32(Vec<f32>),
    F64(Vec<f64>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    Bool(Vec<bool>),
}

impl TensorData {
    /// Get the number of elements in this tensor data.
    pub fn len(&self) -> usize {
        match self {
            TensorData::F32(v) => v.len(),
            TensorData::F64(v) => v.len(),
            TensorData::I32(v) => v.len(),
            TensorData::I64(v) => v.len(),
            TensorData::Bool(v) => v.len(),
        }
    }

    /// Check if this tensor data is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Try to get as f32 slice.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            TensorData::F32(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as f64 slice.
    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            TensorData::F64(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as i32 slice.
    pub fn as_i32(&self) -> Option<&[i32]> {
        match self {
            TensorData::I32(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as i64 slice.
    pub fn as_i64(&self) -> Option<&[i64]> {
        match self {
            TensorData::I64(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as bool slice.
    pub fn as_bool(&self) -> Option<&[bool]> {
        match self {
            TensorData::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Get the data type of this tensor data.
    pub fn dtype(&self) -> ElementType {
        match self {
            TensorData::F32(_) => ElementType::F32,
            TensorData::F64(_) => ElementType::F64,
            TensorData::I32(_) => ElementType::I32,
            TensorData::I64(_) => ElementType::I64,
            TensorData::Bool(_) => ElementType::Bool,
        }
    }
}

/// A tensor value known at compile time, or produced by the reference evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorValue {
    /// The raw tensor data.
    pub data: TensorData,

    /// The shape of the tensor (dimensions).
    pub shape: Vec<usize>,

    /// The data type of the tensor.
    pub dtype: ElementType,
}

impl TensorValue {
    /// Create a new TensorValue with data and shape.
    ///
    /// # Panics
    ///
    /// Panics if the data length doesn't match the shape product.
    pub fn new(data: TensorData, shape: Vec<usize>) -> Self {
        let expected_len: usize = shape.iter().product();
        assert_eq!(
            data.len(),
            expected_len,
            "Data length {} doesn't match shape {:?} (product = {})",
            data.len(),
            shape,
            expected_len
        );
        let dtype = data.dtype();
        Self { data, shape, dtype }
    }

    /// Fallible variant of [`TensorValue::new`].
    pub fn try_new(data: TensorData, shape: Vec<usize>) -> Result<Self> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(Error::Shape(format!(
                "Data length {} doesn't match shape {:?}",
                data.len(),
                shape
            )));
        }
        let dtype = data.dtype();
        Ok(Self { data, shape, dtype })
    }

    /// Create an f32 tensor.
    pub fn from_f32(values: Vec<f32>, shape: Vec<usize>) -> Self {
        Self::new(TensorData::F32(values), shape)
    }

    /// Create an f64 tensor.
    pub fn from_f64(values: Vec<f64>, shape: Vec<usize>) -> Self {
        Self::new(TensorData::F64(values), shape)
    }

    /// Create an i32 tensor.
    pub fn from_i32(values: Vec<i32>, shape: Vec<usize>) -> Self {
        Self::new(TensorData::I32(values), shape)
    }

    /// Create an i64 tensor.
    pub fn from_i64(values: Vec<i64>, shape: Vec<usize>) -> Self {
        Self::new(TensorData::I64(values), shape)
    }

    /// Create a bool tensor.
    pub fn from_bool(values: Vec<bool>, shape: Vec<usize>) -> Self {
        Self::new(TensorData::Bool(values), shape)
    }

    /// Scalar zero of the given type.
    pub fn zero(dtype: ElementType) -> Self {
        let data = match dtype {
            ElementType::F32 => TensorData::F32(vec![0.0]),
            ElementType::F64 => TensorData::F64(vec![0.0]),
            ElementType::I32 => TensorData::I32(vec![0]),
            ElementType::I64 => TensorData::I64(vec![0]),
            ElementType::Bool => TensorData::Bool(vec![false]),
        };
        Self::new(data, vec![])
    }

    /// Get the number of elements in this tensor value.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if this tensor value is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Try to get as f32 slice.
    pub fn as_f32(&self) -> Option<&[f32]> {
        self.data.as_f32()
    }

    /// Try to get as f64 slice.
    pub fn as_f64(&self) -> Option<&[f64]> {
        self.data.as_f64()
    }

    /// Try to get as i32 slice.
    pub fn as_i32(&self) -> Option<&[i32]> {
        self.data.as_i32()
    }

    /// Try to get as i64 slice.
    pub fn as_i64(&self) -> Option<&[i64]> {
        self.data.as_i64()
    }

    /// Try to get as bool slice.
    pub fn as_bool(&self) -> Option<&[bool]> {
        self.data.as_bool()
    }

    /// Integer contents widened to i64 (for indices, axes and shapes).
    pub fn to_i64_vec(&self) -> Result<Vec<i64>> {
        match &self.data {
            TensorData::I64(v) => Ok(v.clone()),
            TensorData::I32(v) => Ok(v.iter().map(|&x| x as i64).collect()),
            _ => Err(Error::Type(format!(
                "Expected an integer tensor, got {:?}",
                self.dtype
            ))),
        }
    }

    /// Create a new TensorValue with a different shape (data unchanged).
    pub fn reshape(&self, new_shape: Vec<usize>) -> Result<Self> {
        Self::try_new(self.data.clone(), new_shape)
    }

    /// Cast this value to a different type.
    ///
    /// Integer and bool sources are widened to i64, float sources to f64, and
    /// then narrowed to the target, so every supported pair is handled exactly
    /// the way a single `as` cast would be.
    pub fn cast(&self, target: ElementType) -> TensorValue {
        if self.dtype == target {
            return self.clone();
        }

        let data = match &self.data {
            TensorData::F32(v) => cast_from_f64(v.iter().map(|&x| x as f64), target),
            TensorData::F64(v) => cast_from_f64(v.iter().copied(), target),
            TensorData::I32(v) => cast_from_i64(v.iter().map(|&x| x as i64), target),
            TensorData::I64(v) => cast_from_i64(v.iter().copied(), target),
            TensorData::Bool(v) => cast_from_i64(v.iter().map(|&x| x as i64), target),
        };

        TensorValue::new(data, self.shape.clone())
    }

    /// Parse a tensor literal from a source graph.
    ///
    /// Complex literals are returned in packed form: an f32/f64 tensor with a
    /// trailing dimension of 2 holding `(real, imaginary)` pairs.
    pub fn from_literal(literal: &TensorLiteral) -> Result<Self> {
        literal
            .validate()
            .map_err(|e| Error::InvalidGraph(e.to_string()))?;
        let bytes = &literal.raw;
        let mut shape = literal.dims.clone();

        let data = match literal.dtype {
            DataType::F32 | DataType::Complex64 => TensorData::F32(
                bytes
                    .chunks_exact(4)
                    .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            DataType::F64 | DataType::Complex128 => TensorData::F64(
                bytes
                    .chunks_exact(8)
                    .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                    .collect(),
            ),
            DataType::I32 => TensorData::I32(
                bytes
                    .chunks_exact(4)
                    .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            DataType::I64 => TensorData::I64(
                bytes
                    .chunks_exact(8)
                    .map(|c| i64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                    .collect(),
            ),
            DataType::Bool => TensorData::Bool(bytes.iter().map(|&b| b != 0).collect()),
        };

        if literal.dtype.is_complex() {
            shape.push(2);
        }

        Self::try_new(data, shape)
    }
}

fn cast_from_f64(values: impl Iterator<Item = f64>, target: ElementType) -> TensorData {
    match target {
        ElementType::F32 => TensorData::F32(values.map(|x| x as f32).collect()),
        ElementType::F64 => TensorData::F64(values.collect()),
        ElementType::I32 => TensorData::I32(values.map(|x| x as i32).collect()),
        ElementType::I64 => TensorData::I64(values.map(|x| x as i64).collect()),
        ElementType::Bool => TensorData::Bool(values.map(|x| x != 0.0).collect()),
    }
}

fn cast_from_i64(values: impl Iterator<Item = i64>, target: ElementType) -> TensorData {
    match target {
        ElementType::F32 => TensorData::F32(values.map(|x| x as f32).collect()),
        ElementType::F64 => TensorData::F64(values.map(|x| x as f64).collect()),
        ElementType::I32 => TensorData::I32(values.map(|x| x as i32).collect()),
        ElementType::I64 => TensorData::I64(values.collect()),
        ElementType::Bool => TensorData::Bool(values.map(|x| x != 0).collect()),
    }
}
