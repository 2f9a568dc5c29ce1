//! Output type and shape inference for IR ops.
//!
//! Inference is where IR validation happens: wrong input counts, element types
//! and (where known) shape conflicts are rejected before a node is created.

use crate::broadcast::broadcast_dims;
use crate::op::{Op, PadMode};
use crate::types::{ElementType, TensorShape, TensorValue};
use crate::{Error, Result};

/// What inference knows about one input.
#[derive(Debug, Clone, Copy)]
pub struct InputInfo<'a> {
    pub dtype: ElementType,
    pub shape: &'a TensorShape,
    /// Compile-time value, if the input is constant.
    pub value: Option<&'a TensorValue>,
}

type Dims = Vec<Option<usize>>;

/// Infer the output element type and shape of `op` applied to `inputs`.
pub fn infer(op: &Op, inputs: &[InputInfo<'_>]) -> Result<(ElementType, TensorShape)> {
    match op {
        Op::Parameter { dtype, shape, .. } => {
            expect_arity(op, inputs, 0)?;
            Ok((*dtype, shape.clone()))
        }
        Op::Constant(value) => {
            expect_arity(op, inputs, 0)?;
            Ok((value.dtype, TensorShape::Static(value.shape.clone())))
        }
        Op::Convert { to } => {
            expect_arity(op, inputs, 1)?;
            Ok((*to, inputs[0].shape.clone()))
        }
        Op::Add | Op::Subtract | Op::Multiply => {
            expect_arity(op, inputs, 2)?;
            let dtype = same_type(op, inputs)?;
            require(op, dtype.is_numeric(), "needs numeric inputs", dtype)?;
            Ok((dtype, broadcast_all(inputs)?))
        }
        Op::Less => {
            expect_arity(op, inputs, 2)?;
            let dtype = same_type(op, inputs)?;
            require(op, dtype.is_numeric(), "needs numeric inputs", dtype)?;
            Ok((ElementType::Bool, broadcast_all(inputs)?))
        }
        Op::Sqrt | Op::Cos | Op::Sin => {
            expect_arity(op, inputs, 1)?;
            let dtype = inputs[0].dtype;
            require(op, dtype.is_float(), "needs a float input", dtype)?;
            Ok((dtype, inputs[0].shape.clone()))
        }
        Op::Atan2 => {
            expect_arity(op, inputs, 2)?;
            let dtype = same_type(op, inputs)?;
            require(op, dtype.is_float(), "needs float inputs", dtype)?;
            Ok((dtype, broadcast_all(inputs)?))
        }
        Op::Gather { axis } => infer_gather(op, *axis, inputs),
        Op::Concat { axis } => infer_concat(op, *axis, inputs),
        Op::Pad { mode } => infer_pad(op, *mode, inputs),
        Op::Reduce { kind, keep_dims } => {
            expect_arity(op, inputs, 2)?;
            let dtype = inputs[0].dtype;
            if kind.is_logical() {
                require(op, dtype == ElementType::Bool, "needs a bool input", dtype)?;
            } else {
                require(op, dtype.is_numeric(), "needs a numeric input", dtype)?;
            }
            integer_vector(op, &inputs[1], "axes", true)?;
            let dims = match (inputs[0].shape.dims(), inputs[1].value) {
                (Some(dims), Some(axes)) => {
                    let axes = normalize_axes(&axes.to_i64_vec()?, dims.len())?;
                    Some(reduce_dims(&dims, &axes, *keep_dims, Some(1)))
                }
                (Some(dims), None) if *keep_dims => Some(vec![None; dims.len()]),
                _ => None,
            };
            Ok((dtype, TensorShape::from_dims(dims)))
        }
        Op::Broadcast => {
            expect_arity(op, inputs, 2)?;
            integer_vector(op, &inputs[1], "target shape", false)?;
            let dims = match (inputs[0].shape.dims(), inputs[1].value) {
                (Some(data), Some(target)) => {
                    let target = target
                        .to_i64_vec()?
                        .into_iter()
                        .map(|d| to_dim(d).map(Some))
                        .collect::<Result<Dims>>()?;
                    Some(broadcast_dims(&data, &target)?)
                }
                (Some(data), None) => inputs[1]
                    .shape
                    .dims()
                    .and_then(|d| d.first().copied().flatten())
                    .map(|len| vec![None; len.max(data.len())]),
                _ => None,
            };
            Ok((inputs[0].dtype, TensorShape::from_dims(dims)))
        }
        Op::ScatterNdUpdate => infer_scatter(op, inputs),
        Op::Select => {
            expect_arity(op, inputs, 3)?;
            let cond = inputs[0].dtype;
            require(op, cond == ElementType::Bool, "needs a bool condition", cond)?;
            let dtype = same_type(op, &inputs[1..])?;
            Ok((dtype, broadcast_all(inputs)?))
        }
        Op::Reshape { special_zero } => {
            expect_arity(op, inputs, 2)?;
            integer_vector(op, &inputs[1], "shape", false)?;
            let dims = match inputs[1].value {
                Some(target) => {
                    let data = inputs[0].shape.dims();
                    Some(resolve_reshape(data.as_deref(), &target.to_i64_vec()?, *special_zero)?)
                }
                None => inputs[1]
                    .shape
                    .dims()
                    .and_then(|d| d.first().copied().flatten())
                    .map(|len| vec![None; len]),
            };
            Ok((inputs[0].dtype, TensorShape::from_dims(dims)))
        }
        Op::Squeeze { axes } => {
            expect_arity(op, inputs, 1)?;
            let dims = match inputs[0].shape.dims() {
                Some(dims) => squeeze_dims(&dims, axes)?,
                None => None,
            };
            Ok((inputs[0].dtype, TensorShape::from_dims(dims)))
        }
        Op::Unsqueeze { axes } => {
            expect_arity(op, inputs, 1)?;
            let dims = match inputs[0].shape.dims() {
                Some(dims) => Some(unsqueeze_dims(&dims, axes, Some(1))?),
                None => None,
            };
            Ok((inputs[0].dtype, TensorShape::from_dims(dims)))
        }
        Op::ShapeOf { output_type } => {
            expect_arity(op, inputs, 1)?;
            require(
                op,
                output_type.is_integer(),
                "needs an integer output type",
                *output_type,
            )?;
            Ok((
                *output_type,
                TensorShape::from_dims(Some(vec![inputs[0].shape.rank()])),
            ))
        }
        Op::ComplexMark { part_type } => {
            expect_arity(op, inputs, 1)?;
            let dtype = inputs[0].dtype;
            if dtype != *part_type {
                return Err(Error::Type(format!(
                    "ComplexMark with part type {:?} wraps a {:?} value",
                    part_type, dtype
                )));
            }
            require(op, dtype.is_float(), "needs a float part type", dtype)?;
            if let Some(dims) = inputs[0].shape.dims() {
                match dims.last() {
                    None => {
                        return Err(Error::Shape(
                            "ComplexMark cannot wrap a scalar".to_string(),
                        ));
                    }
                    Some(Some(n)) if *n != 2 => {
                        return Err(Error::Shape(format!(
                            "ComplexMark needs a trailing dimension of 2, got {}",
                            n
                        )));
                    }
                    _ => {}
                }
            }
            Ok((dtype, inputs[0].shape.clone()))
        }
    }
}

fn infer_gather(op: &Op, axis: i64, inputs: &[InputInfo<'_>]) -> Result<(ElementType, TensorShape)> {
    expect_arity(op, inputs, 2)?;
    let idx = inputs[1].dtype;
    require(op, idx.is_integer(), "needs integer indices", idx)?;

    let dims = match (inputs[0].shape.dims(), inputs[1].shape.dims()) {
        (Some(data), Some(indices)) => {
            let axis = normalize_axis(axis, data.len())?;
            if let (Some(dim), Some(values)) = (data[axis], inputs[1].value) {
                for index in values.to_i64_vec()? {
                    normalize_index(index, dim)?;
                }
            }
            let mut out = data[..axis].to_vec();
            out.extend(indices);
            out.extend_from_slice(&data[axis + 1..]);
            Some(out)
        }
        _ => None,
    };
    Ok((inputs[0].dtype, TensorShape::from_dims(dims)))
}

fn infer_concat(op: &Op, axis: i64, inputs: &[InputInfo<'_>]) -> Result<(ElementType, TensorShape)> {
    if inputs.is_empty() {
        return Err(Error::InvalidGraph("Concat needs at least one input".to_string()));
    }
    let dtype = same_type(op, inputs)?;

    let mut result: Option<Dims> = None;
    let mut axis_index = None;
    for input in inputs {
        let Some(dims) = input.shape.dims() else {
            continue;
        };
        let a = normalize_axis(axis, dims.len())?;
        axis_index = Some(a);
        result = Some(match result {
            None => dims,
            Some(acc) => {
                if acc.len() != dims.len() {
                    return Err(Error::Shape(format!(
                        "Concat inputs have different ranks ({} vs {})",
                        acc.len(),
                        dims.len()
                    )));
                }
                acc.iter()
                    .zip(&dims)
                    .enumerate()
                    .map(|(i, (&x, &y))| {
                        if i == a {
                            return Ok(x.zip(y).map(|(x, y)| x + y));
                        }
                        match (x, y) {
                            (Some(x), Some(y)) if x != y => Err(Error::Shape(format!(
                                "Concat inputs differ at dimension {i} ({x} vs {y})"
                            ))),
                            (Some(x), _) | (_, Some(x)) => Ok(Some(x)),
                            (None, None) => Ok(None),
                        }
                    })
                    .collect::<Result<Dims>>()?
            }
        });
    }

    // An input of unknown rank leaves the concatenated length unknown.
    if let (Some(dims), Some(a)) = (result.as_mut(), axis_index)
        && inputs.iter().any(|i| i.shape.rank().is_none())
    {
        dims[a] = None;
    }
    Ok((dtype, TensorShape::from_dims(result)))
}

fn infer_pad(op: &Op, mode: PadMode, inputs: &[InputInfo<'_>]) -> Result<(ElementType, TensorShape)> {
    match (mode, inputs.len()) {
        (_, 3) | (PadMode::Constant, 4) => {}
        _ => {
            return Err(Error::InvalidGraph(format!(
                "Pad in {:?} mode got {} inputs",
                mode,
                inputs.len()
            )));
        }
    }
    let dtype = inputs[0].dtype;
    integer_vector(op, &inputs[1], "pads_begin", false)?;
    integer_vector(op, &inputs[2], "pads_end", false)?;
    if let Some(value) = inputs.get(3) {
        if value.dtype != dtype {
            return Err(Error::Type(format!(
                "Pad value is {:?} but data is {:?}",
                value.dtype, dtype
            )));
        }
        if value.shape.rank().is_some_and(|r| r != 0) {
            return Err(Error::Shape("Pad value must be a scalar".to_string()));
        }
    }

    let Some(data) = inputs[0].shape.dims() else {
        return Ok((dtype, TensorShape::Unknown));
    };
    for bound in &inputs[1..3] {
        if let Some(Some(len)) = bound.shape.dims().map(|d| d.first().copied().flatten())
            && len != data.len()
        {
            return Err(Error::Shape(format!(
                "Pad bounds have length {} but data has rank {}",
                len,
                data.len()
            )));
        }
    }

    let begin = inputs[1].value.map(TensorValue::to_i64_vec).transpose()?;
    let end = inputs[2].value.map(TensorValue::to_i64_vec).transpose()?;
    let dims = data
        .iter()
        .enumerate()
        .map(|(i, &dim)| match (dim, &begin, &end) {
            (Some(dim), Some(b), Some(e)) => padded_dim(dim, b[i], e[i]).map(Some),
            _ => Ok(None),
        })
        .collect::<Result<Dims>>()?;
    Ok((dtype, TensorShape::from_dims(Some(dims))))
}

fn infer_scatter(op: &Op, inputs: &[InputInfo<'_>]) -> Result<(ElementType, TensorShape)> {
    expect_arity(op, inputs, 3)?;
    let idx = inputs[1].dtype;
    require(op, idx.is_integer(), "needs integer indices", idx)?;
    if inputs[2].dtype != inputs[0].dtype {
        return Err(Error::Type(format!(
            "ScatterNdUpdate updates are {:?} but data is {:?}",
            inputs[2].dtype, inputs[0].dtype
        )));
    }

    if let (Some(data), Some(indices), Some(updates)) = (
        inputs[0].shape.as_static(),
        inputs[1].shape.as_static(),
        inputs[2].shape.as_static(),
    ) {
        let expected = scatter_updates_shape(data, indices)?;
        if expected != updates {
            return Err(Error::Shape(format!(
                "ScatterNdUpdate expects updates of shape {:?}, got {:?}",
                expected, updates
            )));
        }
    }
    Ok((inputs[0].dtype, inputs[0].shape.clone()))
}

// ── Shared shape rules (also used by the kernels) ──

/// Resolve a possibly negative axis against `rank`.
pub(crate) fn normalize_axis(axis: i64, rank: usize) -> Result<usize> {
    let r = rank as i64;
    let a = if axis < 0 { axis + r } else { axis };
    if a < 0 || a >= r {
        return Err(Error::Shape(format!(
            "Axis {} is out of range for rank {}",
            axis, rank
        )));
    }
    Ok(a as usize)
}

/// Resolve, sort and deduplicate a list of axes.
pub(crate) fn normalize_axes(axes: &[i64], rank: usize) -> Result<Vec<usize>> {
    let mut out = axes
        .iter()
        .map(|&a| normalize_axis(a, rank))
        .collect::<Result<Vec<_>>>()?;
    out.sort_unstable();
    out.dedup();
    Ok(out)
}

/// Resolve a possibly negative index into a dimension of size `dim`.
pub(crate) fn normalize_index(index: i64, dim: usize) -> Result<usize> {
    let d = dim as i64;
    let i = if index < 0 { index + d } else { index };
    if i < 0 || i >= d {
        return Err(Error::Shape(format!(
            "Index {} is out of bounds for dimension of size {}",
            index, dim
        )));
    }
    Ok(i as usize)
}

pub(crate) fn padded_dim(dim: usize, begin: i64, end: i64) -> Result<usize> {
    let padded = dim as i64 + begin + end;
    if padded < 0 {
        return Err(Error::Shape(format!(
            "Padding ({}, {}) removes more than the {} available elements",
            begin, end, dim
        )));
    }
    Ok(padded as usize)
}

pub(crate) fn reduce_dims<T: Copy>(dims: &[T], axes: &[usize], keep_dims: bool, one: T) -> Vec<T> {
    dims.iter()
        .enumerate()
        .filter_map(|(i, &d)| match (axes.contains(&i), keep_dims) {
            (false, _) => Some(d),
            (true, true) => Some(one),
            (true, false) => None,
        })
        .collect()
}

/// Expected `updates` shape: `indices[..-1] ++ data[k..]`, with `k = indices[-1]`.
pub(crate) fn scatter_updates_shape(data: &[usize], indices: &[usize]) -> Result<Vec<usize>> {
    let Some((&k, batch)) = indices.split_last() else {
        return Err(Error::Shape(
            "ScatterNdUpdate indices must have rank >= 1".to_string(),
        ));
    };
    if k > data.len() {
        return Err(Error::Shape(format!(
            "ScatterNdUpdate index depth {} exceeds data rank {}",
            k,
            data.len()
        )));
    }
    let mut shape = batch.to_vec();
    shape.extend_from_slice(&data[k..]);
    Ok(shape)
}

/// Output dims of a reshape; `data` is `None` when the input rank is unknown.
pub(crate) fn resolve_reshape(data: Option<&[Option<usize>]>, target: &[i64], special_zero: bool) -> Result<Dims> {
    let mut dims: Dims = Vec::with_capacity(target.len());
    let mut infer_at = None;
    for (i, &t) in target.iter().enumerate() {
        match t {
            -1 => {
                if infer_at.replace(i).is_some() {
                    return Err(Error::Shape(
                        "Reshape target may contain at most one -1".to_string(),
                    ));
                }
                dims.push(None);
            }
            0 if special_zero => {
                let copied = data.and_then(|d| d.get(i).copied()).flatten();
                if data.is_some_and(|d| i >= d.len()) {
                    return Err(Error::Shape(format!(
                        "Reshape copies dimension {} that the input does not have",
                        i
                    )));
                }
                dims.push(copied);
            }
            t => dims.push(Some(to_dim(t)?)),
        }
    }

    let total = data.and_then(|d| d.iter().copied().product::<Option<usize>>());
    if let Some(total) = total {
        let known: Option<usize> = dims
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != infer_at)
            .map(|(_, d)| *d)
            .product();
        match (infer_at, known) {
            (Some(at), Some(known)) => {
                if known == 0 || total % known != 0 {
                    return Err(Error::Shape(format!(
                        "Cannot infer reshape dimension: {} elements into {:?}",
                        total, target
                    )));
                }
                dims[at] = Some(total / known);
            }
            (None, Some(known)) if known != total => {
                return Err(Error::Shape(format!(
                    "Cannot reshape {} elements into {:?}",
                    total, target
                )));
            }
            _ => {}
        }
    }
    Ok(dims)
}

/// Remove size-1 axes; `None` result when empty `axes` meets a run-time dimension.
pub(crate) fn squeeze_dims(dims: &[Option<usize>], axes: &[i64]) -> Result<Option<Dims>> {
    if axes.is_empty() {
        if dims.iter().any(Option::is_none) {
            return Ok(None);
        }
        return Ok(Some(dims.iter().copied().filter(|d| *d != Some(1)).collect()));
    }
    let axes = normalize_axes(axes, dims.len())?;
    for &a in &axes {
        if let Some(d) = dims[a]
            && d != 1
        {
            return Err(Error::Shape(format!(
                "Cannot squeeze axis {} of size {}",
                a, d
            )));
        }
    }
    Ok(Some(
        dims.iter()
            .enumerate()
            .filter(|(i, _)| !axes.contains(i))
            .map(|(_, d)| *d)
            .collect(),
    ))
}

/// Insert size-1 axes at positions of the output rank.
pub(crate) fn unsqueeze_dims<T: Copy>(dims: &[T], axes: &[i64], one: T) -> Result<Vec<T>> {
    let out_rank = dims.len() + axes.len();
    let axes = normalize_axes(axes, out_rank)?;
    if axes.len() != out_rank - dims.len() {
        return Err(Error::Shape("Unsqueeze axes must be unique".to_string()));
    }
    let mut source = dims.iter();
    let mut out = Vec::with_capacity(out_rank);
    for i in 0..out_rank {
        if axes.contains(&i) {
            out.push(one);
        } else if let Some(&d) = source.next() {
            out.push(d);
        }
    }
    Ok(out)
}

fn to_dim(value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::Shape(format!("Invalid dimension {}", value)))
}

// ── Validation helpers ──

fn expect_arity(op: &Op, inputs: &[InputInfo<'_>], expected: usize) -> Result<()> {
    if inputs.len() != expected {
        return Err(Error::InvalidGraph(format!(
            "{} expects {} inputs, got {}",
            op.name(),
            expected,
            inputs.len()
        )));
    }
    Ok(())
}

fn require(op: &Op, ok: bool, what: &str, dtype: ElementType) -> Result<()> {
    if !ok {
        return Err(Error::Type(format!("{} {}, got {:?}", op.name(), what, dtype)));
    }
    Ok(())
}

fn same_type(op: &Op, inputs: &[InputInfo<'_>]) -> Result<ElementType> {
    let first = inputs[0].dtype;
    if let Some(other) = inputs.iter().find(|i| i.dtype != first) {
        return Err(Error::Type(format!(
            "{} inputs must share an element type ({:?} vs {:?})",
            op.name(),
            first,
            other.dtype
        )));
    }
    Ok(first)
}

/// Integer tensor of rank 1 (or a scalar, when `allow_scalar`).
fn integer_vector(op: &Op, input: &InputInfo<'_>, what: &str, allow_scalar: bool) -> Result<()> {
    require(op, input.dtype.is_integer(), &format!("needs integer {}", what), input.dtype)?;
    match input.shape.rank() {
        Some(1) | None => Ok(()),
        Some(0) if allow_scalar => Ok(()),
        Some(r) => Err(Error::Shape(format!(
            "{} {} must be 1-D, got rank {}",
            op.name(),
            what,
            r
        ))),
    }
}

fn broadcast_all(inputs: &[InputInfo<'_>]) -> Result<TensorShape> {
    let mut acc: Option<Dims> = Some(Vec::new());
    for input in inputs {
        acc = match (acc, input.shape.dims()) {
            (Some(a), Some(b)) => Some(broadcast_dims(&a, &b)?),
            _ => None,
        };
    }
    Ok(TensorShape::from_dims(acc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::ReduceKind;

    fn info<'a>(dtype: ElementType, shape: &'a TensorShape) -> InputInfo<'a> {
        InputInfo {
            dtype,
            shape,
            value: None,
        }
    }

    fn constant(value: &TensorValue) -> (TensorShape, ElementType) {
        (TensorShape::Static(value.shape.clone()), value.dtype)
    }

    #[test]
    fn test_binary_broadcast() {
        let a = TensorShape::Static(vec![2, 3]);
        let b = TensorShape::Static(vec![3]);
        let (dtype, shape) = infer(
            &Op::Add,
            &[info(ElementType::F32, &a), info(ElementType::F32, &b)],
        )
        .unwrap();
        assert_eq!(dtype, ElementType::F32);
        assert_eq!(shape, TensorShape::Static(vec![2, 3]));
    }

    #[test]
    fn test_binary_type_mismatch() {
        let a = TensorShape::Static(vec![3]);
        let result = infer(
            &Op::Add,
            &[info(ElementType::F32, &a), info(ElementType::I64, &a)],
        );
        assert!(matches!(result, Err(Error::Type(_))));
    }

    #[test]
    fn test_gather_scalar_index_drops_axis() {
        let data = TensorShape::Static(vec![4, 2]);
        let idx = TensorShape::scalar();
        let (_, shape) = infer(
            &Op::Gather { axis: -1 },
            &[info(ElementType::F32, &data), info(ElementType::I64, &idx)],
        )
        .unwrap();
        assert_eq!(shape, TensorShape::Static(vec![4]));
    }

    #[test]
    fn test_pad_with_constant_bounds() {
        let data = TensorShape::Static(vec![3]);
        let begin = TensorValue::from_i64(vec![1], vec![1]);
        let end = TensorValue::from_i64(vec![2], vec![1]);
        let (bs, bt) = constant(&begin);
        let (es, et) = constant(&end);
        let (_, shape) = infer(
            &Op::Pad {
                mode: PadMode::Constant,
            },
            &[
                info(ElementType::F32, &data),
                InputInfo {
                    dtype: bt,
                    shape: &bs,
                    value: Some(&begin),
                },
                InputInfo {
                    dtype: et,
                    shape: &es,
                    value: Some(&end),
                },
            ],
        )
        .unwrap();
        assert_eq!(shape, TensorShape::Static(vec![6]));
    }

    #[test]
    fn test_pad_bounds_length_must_match_rank() {
        let data = TensorShape::Static(vec![3, 2]);
        let bounds = TensorShape::Static(vec![1]);
        let result = infer(
            &Op::Pad {
                mode: PadMode::Reflect,
            },
            &[
                info(ElementType::F32, &data),
                info(ElementType::I64, &bounds),
                info(ElementType::I64, &bounds),
            ],
        );
        assert!(matches!(result, Err(Error::Shape(_))));
    }

    #[test]
    fn test_reduce_without_constant_axes() {
        let data = TensorShape::Static(vec![2, 3]);
        let axes = TensorShape::Static(vec![1]);
        let op = Op::Reduce {
            kind: ReduceKind::Sum,
            keep_dims: true,
        };
        let (_, shape) = infer(
            &op,
            &[info(ElementType::F32, &data), info(ElementType::I64, &axes)],
        )
        .unwrap();
        assert_eq!(shape.rank(), Some(2));
        assert!(!shape.is_static());
    }

    #[test]
    fn test_reshape_rules() {
        let data = [Some(2), Some(3), Some(4)];
        assert_eq!(
            resolve_reshape(Some(&data[..]), &[0, -1], true).unwrap(),
            vec![Some(2), Some(12)]
        );
        assert_eq!(
            resolve_reshape(Some(&data[..]), &[6, 1, 4], false).unwrap(),
            vec![Some(6), Some(1), Some(4)]
        );
        assert!(resolve_reshape(Some(&data[..]), &[5, -1], false).is_err());
    }

    #[test]
    fn test_squeeze_and_unsqueeze_dims() {
        assert_eq!(
            squeeze_dims(&[Some(1), Some(3), Some(1)], &[]).unwrap(),
            Some(vec![Some(3)])
        );
        assert!(squeeze_dims(&[Some(2)], &[0]).is_err());
        assert_eq!(unsqueeze_dims(&[3usize], &[-1], 1).unwrap(), vec![3, 1]);
        assert_eq!(unsqueeze_dims(&[3usize, 4], &[0, 2], 1).unwrap(), vec![1, 3, 1, 4]);
        assert!(unsqueeze_dims(&[3usize], &[0, 0], 1).is_err());
    }

    #[test]
    fn test_complex_mark_needs_trailing_two() {
        let packed = TensorShape::Static(vec![3, 2]);
        let flat = TensorShape::Static(vec![3]);
        let op = Op::ComplexMark {
            part_type: ElementType::F32,
        };
        assert!(infer(&op, &[info(ElementType::F32, &packed)]).is_ok());
        assert!(infer(&op, &[info(ElementType::F32, &flat)]).is_err());
        assert!(infer(&op, &[info(ElementType::F64, &packed)]).is_err());
    }

    #[test]
    fn test_scatter_updates_shape() {
        assert_eq!(scatter_updates_shape(&[4, 3], &[2, 1]).unwrap(), vec![2, 3]);
        assert_eq!(scatter_updates_shape(&[4, 3], &[2, 2]).unwrap(), vec![2]);
        assert!(scatter_updates_shape(&[4], &[1, 2]).is_err());
    }
}
