//! Translator inputs and outputs: plain IR values or marked complex values.

use graft_ir::{ElementType, IrGraph, IrValueId, Op};

/// A complex value: a packed tensor behind a complex marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexValue {
    /// Output of the `ComplexMark` node.
    pub marker: IrValueId,

    /// The packed real tensor (trailing dimension 2: real, imaginary).
    pub packed: IrValueId,

    /// Element type of the real and imaginary parts.
    pub part_type: ElementType,
}

/// One input or output of a translated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOutput {
    /// An ordinary IR value.
    Plain(IrValueId),

    /// A complex value in packed form.
    Complex(ComplexValue),
}

impl NodeOutput {
    /// Classify a value by looking at its producer.
    pub fn classify(graph: &IrGraph, value: IrValueId) -> graft_ir::Result<Self> {
        let producer = graph.producer(value)?;
        Ok(match &producer.op {
            Op::ComplexMark { part_type } => NodeOutput::Complex(ComplexValue {
                marker: value,
                packed: producer.inputs[0],
                part_type: *part_type,
            }),
            _ => NodeOutput::Plain(value),
        })
    }

    /// The value downstream consumers receive (the marker for complex values).
    pub fn value(&self) -> IrValueId {
        match self {
            NodeOutput::Plain(value) => *value,
            NodeOutput::Complex(complex) => complex.marker,
        }
    }

    /// Whether this is a complex value.
    pub fn is_complex(&self) -> bool {
        matches!(self, NodeOutput::Complex(_))
    }

    /// The complex view, if any.
    pub fn as_complex(&self) -> Option<&ComplexValue> {
        match self {
            NodeOutput::Complex(complex) => Some(complex),
            NodeOutput::Plain(_) => None,
        }
    }
}
