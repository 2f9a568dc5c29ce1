//! Complex marker propagation.
//!
//! A translator that accepts complex input follows the same steps:
//! 1. Classify its inputs; with no complex input it translates the plain way
//!    and never builds a marker.
//! 2. Otherwise every complex-capable input must be marked. Each packed value
//!    is split into a real and an imaginary plane by gathering index 0 and 1
//!    on the last axis.
//! 3. The scalar op runs once per plane.
//! 4. The planes are unsqueezed on the last axis, concatenated back into a
//!    packed tensor and wrapped in a fresh marker with the remembered part type.
//!
//! [`map_planes`] runs the whole sequence for ops that act on each plane
//! independently.

use crate::builder::IrBuilder;
use crate::checks::unsupported_complex;
use crate::node_view::NodeView;
use crate::output::{ComplexValue, NodeOutput};
use crate::Result;
use graft_ir::{ElementType, IrValueId, Op};
use tracing::trace;

/// Real and imaginary planes of a complex value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Planes {
    pub real: IrValueId,
    pub imag: IrValueId,
}

/// How a set of inputs is marked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marking {
    /// No input is complex.
    Real(Vec<IrValueId>),

    /// Every input is complex, all with the same part type.
    Complex(Vec<ComplexValue>),
}

/// Classify `inputs` as all real or all complex.
///
/// A mix of plain and complex values, or complex values with different part
/// types, fails with `UnsupportedComplexInput`.
pub fn classify_all(node: &dyn NodeView, inputs: &[NodeOutput]) -> Result<Marking> {
    let complex: Vec<ComplexValue> = inputs.iter().filter_map(|i| i.as_complex().copied()).collect();

    if complex.is_empty() {
        return Ok(Marking::Real(inputs.iter().map(NodeOutput::value).collect()));
    }

    if complex.len() != inputs.len() {
        return Err(unsupported_complex(
            node,
            format!(
                "{} of {} inputs are complex; all or none must be",
                complex.len(),
                inputs.len()
            ),
        ));
    }

    let part_type = complex[0].part_type;
    if let Some(other) = complex.iter().find(|c| c.part_type != part_type) {
        return Err(unsupported_complex(
            node,
            format!(
                "complex inputs mix {:?} and {:?} parts",
                part_type, other.part_type
            ),
        ));
    }

    Ok(Marking::Complex(complex))
}

/// Split a packed value into its planes.
pub fn split(builder: &mut IrBuilder<'_>, value: &ComplexValue) -> Result<Planes> {
    let zero = builder.scalar_i64(0)?;
    let one = builder.scalar_i64(1)?;
    let real = builder.op(Op::Gather { axis: -1 }, &[value.packed, zero])?;
    let imag = builder.op(Op::Gather { axis: -1 }, &[value.packed, one])?;
    Ok(Planes { real, imag })
}

/// Pack two planes into one tensor with a trailing dimension of 2.
pub fn pack(builder: &mut IrBuilder<'_>, planes: Planes) -> Result<IrValueId> {
    let real = builder.op(Op::Unsqueeze { axes: vec![-1] }, &[planes.real])?;
    let imag = builder.op(Op::Unsqueeze { axes: vec![-1] }, &[planes.imag])?;
    builder.op(Op::Concat { axis: -1 }, &[real, imag])
}

/// Wrap a packed value in a complex marker.
pub fn mark(builder: &mut IrBuilder<'_>, packed: IrValueId, part_type: ElementType) -> Result<NodeOutput> {
    let marker = builder.op(Op::ComplexMark { part_type }, &[packed])?;
    Ok(NodeOutput::Complex(ComplexValue {
        marker,
        packed,
        part_type,
    }))
}

/// Pack planes and wrap the result in a marker.
pub fn pack_and_mark(
    builder: &mut IrBuilder<'_>,
    planes: Planes,
    part_type: ElementType,
) -> Result<NodeOutput> {
    let packed = pack(builder, planes)?;
    mark(builder, packed, part_type)
}

/// `(a + bi)(c + di) = (ac - bd) + (ad + bc)i`, plane by plane.
pub fn product(builder: &mut IrBuilder<'_>, lhs: Planes, rhs: Planes) -> Result<Planes> {
    let ac = builder.op(Op::Multiply, &[lhs.real, rhs.real])?;
    let bd = builder.op(Op::Multiply, &[lhs.imag, rhs.imag])?;
    let ad = builder.op(Op::Multiply, &[lhs.real, rhs.imag])?;
    let bc = builder.op(Op::Multiply, &[lhs.imag, rhs.real])?;
    Ok(Planes {
        real: builder.op(Op::Subtract, &[ac, bd])?,
        imag: builder.op(Op::Add, &[ad, bc])?,
    })
}

/// Apply `op` to plain inputs, or to each plane of complex inputs.
///
/// `op` receives the IR values to combine (the plain inputs, or all real
/// planes, or all imaginary planes) and returns the combined value.
pub fn map_planes<F>(
    node: &dyn NodeView,
    builder: &mut IrBuilder<'_>,
    inputs: &[NodeOutput],
    mut op: F,
) -> Result<NodeOutput>
where
    F: FnMut(&mut IrBuilder<'_>, &[IrValueId]) -> Result<IrValueId>,
{
    match classify_all(node, inputs)? {
        Marking::Real(values) => Ok(NodeOutput::Plain(op(builder, &values)?)),
        Marking::Complex(values) => {
            trace!(node = node.name(), inputs = values.len(), "translating per plane");
            let part_type = values[0].part_type;
            let planes = values
                .iter()
                .map(|v| split(builder, v))
                .collect::<Result<Vec<_>>>()?;
            let reals: Vec<_> = planes.iter().map(|p| p.real).collect();
            let imags: Vec<_> = planes.iter().map(|p| p.imag).collect();
            let real = op(builder, &reals)?;
            let imag = op(builder, &imags)?;
            pack_and_mark(builder, Planes { real, imag }, part_type)
        }
    }
}
