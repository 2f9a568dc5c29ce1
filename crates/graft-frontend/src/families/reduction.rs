//! Reduction translator family.
//!
//! Covers: Sum, Mean, Min, Max, Prod, All, Any, EuclideanNorm

use crate::Result;
use crate::builder::IrBuilder;
use crate::checks::{default_op_checks, unsupported_complex};
use crate::complex::{self, Planes};
use crate::node_view::NodeView;
use crate::output::{ComplexValue, NodeOutput};
use crate::translator::Translator;
use graft_ir::{IrValueId, Op, ReduceKind as IrReduceKind};
use std::ops::Range;
use tracing::{debug, trace};

/// TensorFlow reduction ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReduceKind {
    Sum,
    Mean,
    Min,
    Max,
    Prod,
    All,
    Any,
    EuclideanNorm,
}

impl ReduceKind {
    /// Every reduction, in registration order.
    pub const ALL: [ReduceKind; 8] = [
        ReduceKind::Sum,
        ReduceKind::Mean,
        ReduceKind::Min,
        ReduceKind::Max,
        ReduceKind::Prod,
        ReduceKind::All,
        ReduceKind::Any,
        ReduceKind::EuclideanNorm,
    ];

    /// Source op types translated by this reduction.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            ReduceKind::Sum => &["Sum"],
            ReduceKind::Mean => &["Mean"],
            ReduceKind::Min => &["Min"],
            ReduceKind::Max => &["Max"],
            ReduceKind::Prod => &["Prod"],
            ReduceKind::All => &["All"],
            ReduceKind::Any => &["Any"],
            ReduceKind::EuclideanNorm => &["EuclideanNorm"],
        }
    }

    /// The IR reduction emitted for real input.
    pub fn ir_kind(self) -> IrReduceKind {
        match self {
            ReduceKind::Sum => IrReduceKind::Sum,
            ReduceKind::Mean => IrReduceKind::Mean,
            ReduceKind::Min => IrReduceKind::Min,
            ReduceKind::Max => IrReduceKind::Max,
            ReduceKind::Prod => IrReduceKind::Prod,
            ReduceKind::All => IrReduceKind::LogicalAnd,
            ReduceKind::Any => IrReduceKind::LogicalOr,
            ReduceKind::EuclideanNorm => IrReduceKind::L2,
        }
    }

    /// Only the product has a complex translation.
    pub fn allows_complex(self) -> bool {
        matches!(self, ReduceKind::Prod)
    }
}

/// Reduction translator family.
///
/// Inputs are `(data, axes)`. The `keep_dims` attribute defaults to false.
pub struct ReductionOp {
    kind: ReduceKind,
}

impl ReductionOp {
    pub fn new(kind: ReduceKind) -> Self {
        Self { kind }
    }
}

impl Translator for ReductionOp {
    fn name(&self) -> &str {
        self.kind.aliases()[0]
    }

    fn translate(&self, node: &dyn NodeView, builder: &mut IrBuilder<'_>) -> Result<Vec<NodeOutput>> {
        default_op_checks(node, 2, self.kind.aliases(), self.kind.allows_complex())?;
        let keep_dims = node.attribute_or("keep_dims", false)?;

        let axes = node.input(1)?;
        if axes.is_complex() {
            return Err(unsupported_complex(node, "reduction axes cannot be complex"));
        }
        let axes = axes.value();

        let output = match node.input(0)? {
            NodeOutput::Plain(data) => NodeOutput::Plain(builder.op(
                Op::Reduce {
                    kind: self.kind.ir_kind(),
                    keep_dims,
                },
                &[data, axes],
            )?),
            NodeOutput::Complex(data) => complex_prod(builder, &data, axes, keep_dims)?,
        };
        Ok(vec![output])
    }
}

/// Complex product over `axes`.
///
/// With constant axes and static reduced dims the product is exact: each
/// reduced axis is halved repeatedly, the lower half multiplied by the upper
/// half and an odd tail carried to the next round. Otherwise it falls back
/// to the polar form `prod(|z|) * (cos(sum(arg z)) + i sin(sum(arg z)))`,
/// which rounds and overflows once `|z|` products leave the float range.
fn complex_prod(
    builder: &mut IrBuilder<'_>,
    data: &ComplexValue,
    axes: IrValueId,
    keep_dims: bool,
) -> Result<NodeOutput> {
    let planes = complex::split(builder, data)?;
    let planes = match static_extents(builder, planes.real, axes)? {
        Some(extents) => {
            trace!(node = builder.node_name(), axes = extents.len(), "exact complex product");
            exact_prod(builder, planes, &extents, keep_dims)?
        }
        None => {
            debug!(node = builder.node_name(), "complex product in polar form");
            polar_prod(builder, planes, axes, keep_dims)?
        }
    };
    complex::pack_and_mark(builder, planes, data.part_type)
}

/// Reduced axes of `plane` with their lengths, sorted by axis.
///
/// `None` when the axes or any reduced length are only known at run time,
/// when an axis is out of range or repeated (left for `Reduce` to report),
/// or when a reduced axis is empty.
fn static_extents(
    builder: &IrBuilder<'_>,
    plane: IrValueId,
    axes: IrValueId,
) -> Result<Option<Vec<(usize, usize)>>> {
    let Some(axes) = builder.graph().constant(axes) else {
        return Ok(None);
    };
    let Ok(axes) = axes.to_i64_vec() else {
        return Ok(None);
    };
    let Some(dims) = builder.shape(plane)?.dims() else {
        return Ok(None);
    };

    let rank = dims.len() as i64;
    let mut extents = Vec::with_capacity(axes.len());
    for axis in axes {
        if axis < -rank || axis >= rank {
            return Ok(None);
        }
        let axis = (if axis < 0 { axis + rank } else { axis }) as usize;
        match dims[axis] {
            Some(len) if len > 0 => extents.push((axis, len)),
            _ => return Ok(None),
        }
    }

    extents.sort_unstable();
    let count = extents.len();
    extents.dedup_by_key(|(axis, _)| *axis);
    if extents.len() != count {
        return Ok(None);
    }
    Ok(Some(extents))
}

fn exact_prod(
    builder: &mut IrBuilder<'_>,
    mut planes: Planes,
    extents: &[(usize, usize)],
    keep_dims: bool,
) -> Result<Planes> {
    for &(axis, len) in extents {
        let mut len = len;
        while len > 1 {
            let half = len / 2;
            let lower = gather_planes(builder, planes, axis, 0..half)?;
            let upper = gather_planes(builder, planes, axis, half..2 * half)?;
            let folded = complex::product(builder, lower, upper)?;

            planes = if len % 2 == 1 {
                let tail = gather_planes(builder, planes, axis, len - 1..len)?;
                let axis = axis as i64;
                Planes {
                    real: builder.op(Op::Concat { axis }, &[folded.real, tail.real])?,
                    imag: builder.op(Op::Concat { axis }, &[folded.imag, tail.imag])?,
                }
            } else {
                folded
            };
            len = half + len % 2;
        }
    }

    if keep_dims || extents.is_empty() {
        return Ok(planes);
    }
    let axes: Vec<i64> = extents.iter().map(|&(axis, _)| axis as i64).collect();
    Ok(Planes {
        real: builder.op(Op::Squeeze { axes: axes.clone() }, &[planes.real])?,
        imag: builder.op(Op::Squeeze { axes }, &[planes.imag])?,
    })
}

fn gather_planes(
    builder: &mut IrBuilder<'_>,
    planes: Planes,
    axis: usize,
    range: Range<usize>,
) -> Result<Planes> {
    let indices: Vec<i64> = range.map(|i| i as i64).collect();
    let indices = builder.const_i64(&indices)?;
    let axis = axis as i64;
    Ok(Planes {
        real: builder.op(Op::Gather { axis }, &[planes.real, indices])?,
        imag: builder.op(Op::Gather { axis }, &[planes.imag, indices])?,
    })
}

fn polar_prod(
    builder: &mut IrBuilder<'_>,
    planes: Planes,
    axes: IrValueId,
    keep_dims: bool,
) -> Result<Planes> {
    let re2 = builder.op(Op::Multiply, &[planes.real, planes.real])?;
    let im2 = builder.op(Op::Multiply, &[planes.imag, planes.imag])?;
    let norm2 = builder.op(Op::Add, &[re2, im2])?;
    let magnitude = builder.op(Op::Sqrt, &[norm2])?;
    let angle = builder.op(Op::Atan2, &[planes.imag, planes.real])?;

    let magnitude = builder.op(
        Op::Reduce {
            kind: IrReduceKind::Prod,
            keep_dims,
        },
        &[magnitude, axes],
    )?;
    let angle = builder.op(
        Op::Reduce {
            kind: IrReduceKind::Sum,
            keep_dims,
        },
        &[angle, axes],
    )?;

    let cos = builder.op(Op::Cos, &[angle])?;
    let sin = builder.op(Op::Sin, &[angle])?;
    Ok(Planes {
        real: builder.op(Op::Multiply, &[magnitude, cos])?,
        imag: builder.op(Op::Multiply, &[magnitude, sin])?,
    })
}
