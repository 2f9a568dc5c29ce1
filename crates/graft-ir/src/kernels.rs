//! Reference kernels shared by constant folding and the evaluator.
//!
//! Layout ops are written once over `&[T]` and dispatched per element type
//! with the `with_*` macros below.

use crate::broadcast::broadcast_shape;
use crate::infer::{
    normalize_axes, normalize_axis, normalize_index, padded_dim, reduce_dims, resolve_reshape,
    scatter_updates_shape, squeeze_dims, unsqueeze_dims,
};
use crate::op::{Op, PadMode, ReduceKind};
use crate::types::{ElementType, TensorData, TensorValue};
use crate::{Error, Result};
use std::ops::{Add, Mul, Sub};

/// Same-typed slices of `inputs`, or a type error.
fn slices_of<'a, T>(
    inputs: &[&'a TensorValue],
    get: fn(&'a TensorData) -> Option<&'a [T]>,
) -> Result<Vec<&'a [T]>> {
    inputs
        .iter()
        .map(|v| {
            get(&v.data).ok_or_else(|| {
                Error::Evaluation(format!("Unexpected element type {:?}", v.dtype))
            })
        })
        .collect()
}

/// Dispatch over every element type.
macro_rules! with_any {
    ($dtype:expr, $inputs:expr, |$s:ident| $body:expr) => {
        match $dtype {
            ElementType::F32 => {
                let $s = slices_of($inputs, TensorData::as_f32)?;
                TensorData::F32($body)
            }
            ElementType::F64 => {
                let $s = slices_of($inputs, TensorData::as_f64)?;
                TensorData::F64($body)
            }
            ElementType::I32 => {
                let $s = slices_of($inputs, TensorData::as_i32)?;
                TensorData::I32($body)
            }
            ElementType::I64 => {
                let $s = slices_of($inputs, TensorData::as_i64)?;
                TensorData::I64($body)
            }
            ElementType::Bool => {
                let $s = slices_of($inputs, TensorData::as_bool)?;
                TensorData::Bool($body)
            }
        }
    };
}

/// Dispatch over numeric element types.
macro_rules! with_numeric {
    ($dtype:expr, $inputs:expr, |$s:ident| $body:expr) => {
        match $dtype {
            ElementType::F32 => {
                let $s = slices_of($inputs, TensorData::as_f32)?;
                TensorData::F32($body)
            }
            ElementType::F64 => {
                let $s = slices_of($inputs, TensorData::as_f64)?;
                TensorData::F64($body)
            }
            ElementType::I32 => {
                let $s = slices_of($inputs, TensorData::as_i32)?;
                TensorData::I32($body)
            }
            ElementType::I64 => {
                let $s = slices_of($inputs, TensorData::as_i64)?;
                TensorData::I64($body)
            }
            ElementType::Bool => {
                return Err(Error::Evaluation("Arithmetic on bool tensors".to_string()));
            }
        }
    };
}

/// Dispatch over float element types.
macro_rules! with_float {
    ($dtype:expr, $inputs:expr, |$s:ident| $body:expr) => {
        match $dtype {
            ElementType::F32 => {
                let $s = slices_of($inputs, TensorData::as_f32)?;
                TensorData::F32($body)
            }
            ElementType::F64 => {
                let $s = slices_of($inputs, TensorData::as_f64)?;
                TensorData::F64($body)
            }
            other => {
                return Err(Error::Evaluation(format!(
                    "Float op applied to {:?} tensor",
                    other
                )));
            }
        }
    };
}

/// Arithmetic needed by the reductions.
trait Numeric: Copy + PartialOrd + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> {
    const ZERO: Self;
    const ONE: Self;
    fn div_count(self, n: usize) -> Self;
    fn sqrt(self) -> Self;
}

macro_rules! impl_numeric_float {
    ($t:ty) => {
        impl Numeric for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            fn div_count(self, n: usize) -> Self {
                self / n as $t
            }
            fn sqrt(self) -> Self {
                <$t>::sqrt(self)
            }
        }
    };
}

macro_rules! impl_numeric_int {
    ($t:ty) => {
        impl Numeric for $t {
            const ZERO: Self = 0;
            const ONE: Self = 1;
            fn div_count(self, n: usize) -> Self {
                if n == 0 { 0 } else { self / n as $t }
            }
            fn sqrt(self) -> Self {
                (self as f64).sqrt() as $t
            }
        }
    };
}

impl_numeric_float!(f32);
impl_numeric_float!(f64);
impl_numeric_int!(i32);
impl_numeric_int!(i64);

/// Compute the output of `op` from concrete input values.
pub(crate) fn compute(op: &Op, inputs: &[&TensorValue]) -> Result<TensorValue> {
    match op {
        Op::Parameter { name, .. } => Err(Error::Evaluation(format!(
            "Parameter '{}' has no value without a feed",
            name
        ))),
        Op::Constant(value) => Ok(value.clone()),
        Op::Convert { to } => Ok(inputs[0].cast(*to)),
        Op::ComplexMark { .. } => Ok(inputs[0].clone()),
        Op::Add => binary(inputs, Arith::Add),
        Op::Subtract => binary(inputs, Arith::Sub),
        Op::Multiply => binary(inputs, Arith::Mul),
        Op::Less => less(inputs[0], inputs[1]),
        Op::Sqrt => unary_float(inputs[0], f32::sqrt, f64::sqrt),
        Op::Cos => unary_float(inputs[0], f32::cos, f64::cos),
        Op::Sin => unary_float(inputs[0], f32::sin, f64::sin),
        Op::Atan2 => {
            let shape = broadcast_shape(&inputs[0].shape, &inputs[1].shape)?;
            let ma = broadcast_index_map(&inputs[0].shape, &shape);
            let mb = broadcast_index_map(&inputs[1].shape, &shape);
            let data = with_float!(inputs[0].dtype, inputs, |s| ma
                .iter()
                .zip(&mb)
                .map(|(&i, &j)| s[0][i].atan2(s[1][j]))
                .collect());
            TensorValue::try_new(data, shape)
        }
        Op::Gather { axis } => {
            let data = inputs[0];
            let axis = normalize_axis(*axis, data.ndim())?;
            let indices = inputs[1].to_i64_vec()?;
            let dim = data.shape[axis];
            let indices = indices
                .iter()
                .map(|&i| normalize_index(i, dim))
                .collect::<Result<Vec<_>>>()?;
            let mut shape = data.shape[..axis].to_vec();
            shape.extend_from_slice(&inputs[1].shape);
            shape.extend_from_slice(&data.shape[axis + 1..]);
            let out = with_any!(data.dtype, &[data], |s| gather(
                s[0],
                &data.shape,
                &indices,
                axis
            ));
            TensorValue::try_new(out, shape)
        }
        Op::Concat { axis } => {
            let axis = normalize_axis(*axis, inputs[0].ndim())?;
            let shapes: Vec<&[usize]> = inputs.iter().map(|v| v.shape.as_slice()).collect();
            for other in &shapes[1..] {
                let compatible = other.len() == shapes[0].len()
                    && (0..other.len()).all(|i| i == axis || other[i] == shapes[0][i]);
                if !compatible {
                    return Err(Error::Shape(format!(
                        "Cannot concatenate {:?} and {:?} along axis {}",
                        shapes[0], other, axis
                    )));
                }
            }
            let mut shape = inputs[0].shape.clone();
            shape[axis] = shapes.iter().map(|s| s[axis]).sum();
            let out = with_any!(inputs[0].dtype, inputs, |s| concat(&s, &shapes, axis));
            TensorValue::try_new(out, shape)
        }
        Op::Pad { mode } => {
            let data = inputs[0];
            let begin = inputs[1].to_i64_vec()?;
            let end = inputs[2].to_i64_vec()?;
            if begin.len() != data.ndim() || end.len() != data.ndim() {
                return Err(Error::Shape(format!(
                    "Pad bounds of length {}/{} for data of rank {}",
                    begin.len(),
                    end.len(),
                    data.ndim()
                )));
            }
            let zero = TensorValue::zero(data.dtype);
            let fill = inputs.get(3).copied().unwrap_or(&zero);
            let shape = data
                .shape
                .iter()
                .zip(begin.iter().zip(&end))
                .map(|(&d, (&b, &e))| padded_dim(d, b, e))
                .collect::<Result<Vec<_>>>()?;
            let plan = pad_plan(&data.shape, &shape, &begin, *mode)?;
            let out = with_any!(data.dtype, &[data, fill], |s| plan
                .iter()
                .map(|src| src.map_or(s[1][0], |i| s[0][i]))
                .collect());
            TensorValue::try_new(out, shape)
        }
        Op::Reduce { kind, keep_dims } => reduce(inputs[0], inputs[1], *kind, *keep_dims),
        Op::Broadcast => {
            let target = inputs[1]
                .to_i64_vec()?
                .into_iter()
                .map(|d| {
                    usize::try_from(d)
                        .map_err(|_| Error::Shape(format!("Invalid broadcast dimension {}", d)))
                })
                .collect::<Result<Vec<_>>>()?;
            let shape = broadcast_shape(&inputs[0].shape, &target)?;
            let map = broadcast_index_map(&inputs[0].shape, &shape);
            let out = with_any!(inputs[0].dtype, &[inputs[0]], |s| take(s[0], &map));
            TensorValue::try_new(out, shape)
        }
        Op::ScatterNdUpdate => {
            let (data, indices, updates) = (inputs[0], inputs[1], inputs[2]);
            let expected = scatter_updates_shape(&data.shape, &indices.shape)?;
            if expected != updates.shape {
                return Err(Error::Shape(format!(
                    "ScatterNdUpdate expects updates of shape {:?}, got {:?}",
                    expected, updates.shape
                )));
            }
            let offsets = scatter_offsets(&data.shape, &indices.to_i64_vec()?, &indices.shape)?;
            let out = with_any!(data.dtype, &[data, updates], |s| scatter(
                s[0], s[1], &offsets
            ));
            TensorValue::try_new(out, data.shape.clone())
        }
        Op::Select => {
            let cond = inputs[0]
                .as_bool()
                .ok_or_else(|| Error::Evaluation("Select condition must be bool".to_string()))?;
            let shape = broadcast_shape(
                &broadcast_shape(&inputs[0].shape, &inputs[1].shape)?,
                &inputs[2].shape,
            )?;
            let mc = broadcast_index_map(&inputs[0].shape, &shape);
            let ma = broadcast_index_map(&inputs[1].shape, &shape);
            let mb = broadcast_index_map(&inputs[2].shape, &shape);
            let out = with_any!(inputs[1].dtype, &inputs[1..], |s| (0..mc.len())
                .map(|k| if cond[mc[k]] { s[0][ma[k]] } else { s[1][mb[k]] })
                .collect());
            TensorValue::try_new(out, shape)
        }
        Op::Reshape { special_zero } => {
            let data = inputs[0];
            let dims: Vec<_> = data.shape.iter().map(|&d| Some(d)).collect();
            let shape = resolve_reshape(Some(dims.as_slice()), &inputs[1].to_i64_vec()?, *special_zero)?
                .into_iter()
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| Error::Shape("Reshape left a dimension unresolved".to_string()))?;
            data.reshape(shape)
        }
        Op::Squeeze { axes } => {
            let dims: Vec<_> = inputs[0].shape.iter().map(|&d| Some(d)).collect();
            let shape = squeeze_dims(&dims, axes)?
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .collect();
            inputs[0].reshape(shape)
        }
        Op::Unsqueeze { axes } => inputs[0].reshape(unsqueeze_dims(&inputs[0].shape, axes, 1)?),
        Op::ShapeOf { output_type } => {
            let dims: Vec<i64> = inputs[0].shape.iter().map(|&d| d as i64).collect();
            let rank = dims.len();
            Ok(TensorValue::from_i64(dims, vec![rank]).cast(*output_type))
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Arith {
    Add,
    Sub,
    Mul,
}

impl Arith {
    fn apply<T: Numeric>(self, a: T, b: T) -> T {
        match self {
            Arith::Add => a + b,
            Arith::Sub => a - b,
            Arith::Mul => a * b,
        }
    }
}

fn binary(inputs: &[&TensorValue], arith: Arith) -> Result<TensorValue> {
    let (a, b) = (inputs[0], inputs[1]);
    let shape = broadcast_shape(&a.shape, &b.shape)?;
    let ma = broadcast_index_map(&a.shape, &shape);
    let mb = broadcast_index_map(&b.shape, &shape);
    let data = with_numeric!(a.dtype, inputs, |s| ma
        .iter()
        .zip(&mb)
        .map(|(&i, &j)| arith.apply(s[0][i], s[1][j]))
        .collect());
    TensorValue::try_new(data, shape)
}

fn less(a: &TensorValue, b: &TensorValue) -> Result<TensorValue> {
    let shape = broadcast_shape(&a.shape, &b.shape)?;
    let ma = broadcast_index_map(&a.shape, &shape);
    let mb = broadcast_index_map(&b.shape, &shape);
    let inputs = [a, b];
    let out = match a.dtype {
        ElementType::F32 => compare(&slices_of(&inputs, TensorData::as_f32)?, &ma, &mb),
        ElementType::F64 => compare(&slices_of(&inputs, TensorData::as_f64)?, &ma, &mb),
        ElementType::I32 => compare(&slices_of(&inputs, TensorData::as_i32)?, &ma, &mb),
        ElementType::I64 => compare(&slices_of(&inputs, TensorData::as_i64)?, &ma, &mb),
        ElementType::Bool => {
            return Err(Error::Evaluation("Less on bool tensors".to_string()));
        }
    };
    TensorValue::try_new(TensorData::Bool(out), shape)
}

fn compare<T: PartialOrd>(s: &[&[T]], ma: &[usize], mb: &[usize]) -> Vec<bool> {
    ma.iter().zip(mb).map(|(&i, &j)| s[0][i] < s[1][j]).collect()
}

fn unary_float(v: &TensorValue, on_f32: fn(f32) -> f32, on_f64: fn(f64) -> f64) -> Result<TensorValue> {
    let data = match &v.data {
        TensorData::F32(x) => TensorData::F32(x.iter().map(|&e| on_f32(e)).collect()),
        TensorData::F64(x) => TensorData::F64(x.iter().map(|&e| on_f64(e)).collect()),
        _ => {
            return Err(Error::Evaluation(format!(
                "Float op applied to {:?} tensor",
                v.dtype
            )));
        }
    };
    TensorValue::try_new(data, v.shape.clone())
}

fn reduce(
    data: &TensorValue,
    axes: &TensorValue,
    kind: ReduceKind,
    keep_dims: bool,
) -> Result<TensorValue> {
    let axes = normalize_axes(&axes.to_i64_vec()?, data.ndim())?;
    let shape = reduce_dims(&data.shape, &axes, keep_dims, 1);
    let buckets = reduce_buckets(&data.shape, &axes);

    let out = match (kind, &data.data) {
        (ReduceKind::LogicalAnd, TensorData::Bool(v)) => {
            TensorData::Bool(buckets.iter().map(|b| b.iter().all(|&i| v[i])).collect())
        }
        (ReduceKind::LogicalOr, TensorData::Bool(v)) => {
            TensorData::Bool(buckets.iter().map(|b| b.iter().any(|&i| v[i])).collect())
        }
        (kind, _) if kind.is_logical() => {
            return Err(Error::Evaluation(format!(
                "{} needs a bool tensor, got {:?}",
                kind.name(),
                data.dtype
            )));
        }
        _ => with_numeric!(data.dtype, &[data], |s| fold_buckets(s[0], &buckets, kind)?),
    };
    TensorValue::try_new(out, shape)
}

/// Source indices feeding each output element of a reduction, in row-major order.
fn reduce_buckets(shape: &[usize], axes: &[usize]) -> Vec<Vec<usize>> {
    let kept: Vec<usize> = shape
        .iter()
        .enumerate()
        .map(|(i, &d)| if axes.contains(&i) { 1 } else { d })
        .collect();
    let kept_strides = strides(&kept);
    let mut buckets = vec![Vec::new(); kept.iter().product()];

    let total: usize = shape.iter().product();
    let mut coord = vec![0usize; shape.len()];
    for flat in 0..total {
        let out: usize = coord
            .iter()
            .enumerate()
            .filter(|(i, _)| !axes.contains(i))
            .map(|(i, &c)| c * kept_strides[i])
            .sum();
        buckets[out].push(flat);
        advance(&mut coord, shape);
    }
    buckets
}

fn fold_buckets<T: Numeric>(v: &[T], buckets: &[Vec<usize>], kind: ReduceKind) -> Result<Vec<T>> {
    buckets
        .iter()
        .map(|bucket| {
            let mut it = bucket.iter().map(|&i| v[i]);
            Ok(match kind {
                ReduceKind::Sum => it.fold(T::ZERO, |acc, x| acc + x),
                ReduceKind::Mean => it.fold(T::ZERO, |acc, x| acc + x).div_count(bucket.len()),
                ReduceKind::Prod => it.fold(T::ONE, |acc, x| acc * x),
                ReduceKind::L2 => it.fold(T::ZERO, |acc, x| acc + x * x).sqrt(),
                ReduceKind::Min | ReduceKind::Max => {
                    let first = it.next().ok_or_else(|| {
                        Error::Evaluation(format!("{} over an empty axis", kind.name()))
                    })?;
                    it.fold(first, |acc, x| {
                        let better = match kind {
                            ReduceKind::Min => x < acc,
                            _ => x > acc,
                        };
                        if better { x } else { acc }
                    })
                }
                ReduceKind::LogicalAnd | ReduceKind::LogicalOr => {
                    return Err(Error::Evaluation(format!(
                        "{} on a numeric tensor",
                        kind.name()
                    )));
                }
            })
        })
        .collect()
}

fn gather<T: Copy>(data: &[T], shape: &[usize], indices: &[usize], axis: usize) -> Vec<T> {
    let outer: usize = shape[..axis].iter().product();
    let dim = shape[axis];
    let inner: usize = shape[axis + 1..].iter().product();
    let mut out = Vec::with_capacity(outer * indices.len() * inner);
    for o in 0..outer {
        for &i in indices {
            let base = (o * dim + i) * inner;
            out.extend_from_slice(&data[base..base + inner]);
        }
    }
    out
}

fn concat<T: Copy>(parts: &[&[T]], shapes: &[&[usize]], axis: usize) -> Vec<T> {
    let outer: usize = shapes[0][..axis].iter().product();
    let mut out = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
    for o in 0..outer {
        for (part, shape) in parts.iter().zip(shapes) {
            let chunk: usize = shape[axis..].iter().product();
            out.extend_from_slice(&part[o * chunk..(o + 1) * chunk]);
        }
    }
    out
}

/// For every padded output element, the source index or `None` for the fill value.
fn pad_plan(
    input: &[usize],
    output: &[usize],
    begin: &[i64],
    mode: PadMode,
) -> Result<Vec<Option<usize>>> {
    let in_strides = strides(input);
    let total: usize = output.iter().product();
    let mut plan = Vec::with_capacity(total);
    let mut coord = vec![0usize; output.len()];

    for _ in 0..total {
        let mut src = Some(0usize);
        for axis in 0..output.len() {
            let n = input[axis] as i64;
            let c = coord[axis] as i64 - begin[axis];
            let mapped = if (0..n).contains(&c) {
                Some(c)
            } else {
                match mode {
                    PadMode::Constant => None,
                    PadMode::Edge => Some(c.max(0).min(n - 1)),
                    PadMode::Reflect => Some(if c < 0 { -c } else { 2 * (n - 1) - c }),
                    PadMode::Symmetric => Some(if c < 0 { -c - 1 } else { 2 * n - 1 - c }),
                }
            };
            match mapped {
                None => {
                    src = None;
                    break;
                }
                Some(m) if (0..n).contains(&m) => {
                    if let Some(s) = src.as_mut() {
                        *s += m as usize * in_strides[axis];
                    }
                }
                Some(_) => {
                    return Err(Error::Shape(format!(
                        "{:?} padding reaches past a dimension of size {} on axis {}",
                        mode, n, axis
                    )));
                }
            }
        }
        plan.push(src);
        advance(&mut coord, output);
    }
    Ok(plan)
}

/// Flat offset of every update slice in the data tensor.
fn scatter_offsets(shape: &[usize], indices: &[i64], index_shape: &[usize]) -> Result<Vec<usize>> {
    let Some((&depth, batch)) = index_shape.split_last() else {
        return Err(Error::Shape(
            "ScatterNdUpdate indices must have rank >= 1".to_string(),
        ));
    };
    let data_strides = strides(shape);
    let rows: usize = batch.iter().product();
    (0..rows)
        .map(|r| {
            (0..depth).try_fold(0usize, |offset, j| {
                let index = normalize_index(indices[r * depth + j], shape[j])?;
                Ok(offset + index * data_strides[j])
            })
        })
        .collect()
}

fn scatter<T: Copy>(data: &[T], updates: &[T], offsets: &[usize]) -> Vec<T> {
    let mut out = data.to_vec();
    if offsets.is_empty() {
        return out;
    }
    let slice = updates.len() / offsets.len();
    for (r, &offset) in offsets.iter().enumerate() {
        out[offset..offset + slice].copy_from_slice(&updates[r * slice..(r + 1) * slice]);
    }
    out
}

fn take<T: Copy>(data: &[T], map: &[usize]) -> Vec<T> {
    map.iter().map(|&i| data[i]).collect()
}

fn strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Step a row-major coordinate forward by one element.
fn advance(coord: &mut [usize], shape: &[usize]) {
    for axis in (0..shape.len()).rev() {
        coord[axis] += 1;
        if coord[axis] < shape[axis] {
            return;
        }
        coord[axis] = 0;
    }
}

/// For each element of the broadcast shape `to`, the flat index it reads in `from`.
fn broadcast_index_map(from: &[usize], to: &[usize]) -> Vec<usize> {
    let total: usize = to.iter().product();
    let offset = to.len() - from.len();
    let from_strides = strides(from);
    let mut map = Vec::with_capacity(total);
    let mut coord = vec![0usize; to.len()];

    for _ in 0..total {
        let src = from
            .iter()
            .enumerate()
            .filter(|(_, d)| **d != 1)
            .map(|(i, _)| coord[i + offset] * from_strides[i])
            .sum();
        map.push(src);
        advance(&mut coord, to);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i64s(values: &[i64]) -> TensorValue {
        TensorValue::from_i64(values.to_vec(), vec![values.len()])
    }

    #[test]
    fn test_add_broadcasts() {
        let a = TensorValue::from_f32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
        let b = TensorValue::from_f32(vec![10.0, 20.0, 30.0], vec![3]);
        let out = compute(&Op::Add, &[&a, &b]).unwrap();
        assert_eq!(out.shape, vec![2, 3]);
        assert_eq!(
            out.as_f32(),
            Some(&[11.0, 22.0, 33.0, 14.0, 25.0, 36.0][..])
        );
    }

    #[test]
    fn test_gather_last_axis() {
        let packed = TensorValue::from_f32(vec![1.0, 10.0, 2.0, 20.0], vec![2, 2]);
        let index = TensorValue::from_i64(vec![1], vec![]);
        let out = compute(&Op::Gather { axis: -1 }, &[&packed, &index]).unwrap();
        assert_eq!(out.shape, vec![2]);
        assert_eq!(out.as_f32(), Some(&[10.0, 20.0][..]));
    }

    #[test]
    fn test_concat_last_axis() {
        let re = TensorValue::from_f32(vec![1.0, 2.0], vec![2, 1]);
        let im = TensorValue::from_f32(vec![10.0, 20.0], vec![2, 1]);
        let out = compute(&Op::Concat { axis: -1 }, &[&re, &im]).unwrap();
        assert_eq!(out.shape, vec![2, 2]);
        assert_eq!(out.as_f32(), Some(&[1.0, 10.0, 2.0, 20.0][..]));
    }

    #[test]
    fn test_pad_modes() {
        let data = TensorValue::from_i32(vec![1, 2, 3], vec![3]);
        let begin = i64s(&[2]);
        let end = i64s(&[2]);
        let run = |mode| {
            compute(&Op::Pad { mode }, &[&data, &begin, &end])
                .unwrap()
                .as_i32()
                .unwrap()
                .to_vec()
        };
        assert_eq!(run(PadMode::Constant), vec![0, 0, 1, 2, 3, 0, 0]);
        assert_eq!(run(PadMode::Edge), vec![1, 1, 1, 2, 3, 3, 3]);
        assert_eq!(run(PadMode::Reflect), vec![3, 2, 1, 2, 3, 2, 1]);
        assert_eq!(run(PadMode::Symmetric), vec![2, 1, 1, 2, 3, 3, 2]);
    }

    #[test]
    fn test_pad_with_fill_value() {
        let data = TensorValue::from_f32(vec![1.0], vec![1]);
        let fill = TensorValue::from_f32(vec![7.0], vec![]);
        let out = compute(
            &Op::Pad {
                mode: PadMode::Constant,
            },
            &[&data, &i64s(&[1]), &i64s(&[0]), &fill],
        )
        .unwrap();
        assert_eq!(out.as_f32(), Some(&[7.0, 1.0][..]));
    }

    #[test]
    fn test_reflect_pad_too_wide() {
        let data = TensorValue::from_i32(vec![1, 2], vec![2]);
        let result = compute(
            &Op::Pad {
                mode: PadMode::Reflect,
            },
            &[&data, &i64s(&[2]), &i64s(&[0])],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_reduce_kinds() {
        let data = TensorValue::from_f32(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        let axes = i64s(&[1]);
        let run = |kind, keep_dims| {
            compute(&Op::Reduce { kind, keep_dims }, &[&data, &axes]).unwrap()
        };
        assert_eq!(run(ReduceKind::Sum, false).as_f32(), Some(&[3.0, 7.0][..]));
        assert_eq!(run(ReduceKind::Prod, false).as_f32(), Some(&[2.0, 12.0][..]));
        assert_eq!(run(ReduceKind::Max, false).as_f32(), Some(&[2.0, 4.0][..]));
        assert_eq!(run(ReduceKind::Mean, true).shape, vec![2, 1]);
        assert_eq!(run(ReduceKind::Mean, true).as_f32(), Some(&[1.5, 3.5][..]));
    }

    #[test]
    fn test_reduce_logical() {
        let data = TensorValue::from_bool(vec![true, false, true, true], vec![2, 2]);
        let axes = TensorValue::from_i64(vec![-1], vec![]);
        let all = compute(
            &Op::Reduce {
                kind: ReduceKind::LogicalAnd,
                keep_dims: false,
            },
            &[&data, &axes],
        )
        .unwrap();
        assert_eq!(all.as_bool(), Some(&[false, true][..]));
    }

    #[test]
    fn test_scatter_nd_update() {
        let data = TensorValue::from_f32(vec![0.0; 4], vec![4]);
        let indices = TensorValue::from_i64(vec![1, 3], vec![2, 1]);
        let updates = TensorValue::from_f32(vec![5.0, 6.0], vec![2]);
        let out = compute(&Op::ScatterNdUpdate, &[&data, &indices, &updates]).unwrap();
        assert_eq!(out.as_f32(), Some(&[0.0, 5.0, 0.0, 6.0][..]));
    }

    #[test]
    fn test_select_broadcasts_condition() {
        let cond = TensorValue::from_bool(vec![true, false], vec![2, 1]);
        let a = TensorValue::from_i64(vec![1, 2, 3, 4], vec![2, 2]);
        let b = TensorValue::from_i64(vec![-1], vec![]);
        let out = compute(&Op::Select, &[&cond, &a, &b]).unwrap();
        assert_eq!(out.as_i64(), Some(&[1, 2, -1, -1][..]));
    }

    #[test]
    fn test_broadcast_scalar_to_shape() {
        let zero = TensorValue::from_f32(vec![0.0], vec![]);
        let out = compute(&Op::Broadcast, &[&zero, &i64s(&[2, 3])]).unwrap();
        assert_eq!(out.shape, vec![2, 3]);
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn test_shape_of() {
        let data = TensorValue::from_f32(vec![0.0; 6], vec![2, 3]);
        let out = compute(
            &Op::ShapeOf {
                output_type: ElementType::I32,
            },
            &[&data],
        )
        .unwrap();
        assert_eq!(out.as_i32(), Some(&[2, 3][..]));
    }
}
