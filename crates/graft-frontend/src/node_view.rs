//! Read-only view of one source node, as seen by a translator.

use crate::output::NodeOutput;
use crate::{Error, Result};
use graft_graph::{AttributeValue, Node};

/// Read-only access to a source node.
///
/// Inputs are already resolved to IR values and classified as plain or
/// complex. Typed attribute access lives on `dyn NodeView` (see
/// [`attribute`](#method.attribute)).
pub trait NodeView {
    /// Source op type (e.g. `"AddN"`).
    fn op_type(&self) -> &str;

    /// Source node name.
    fn name(&self) -> &str;

    /// Number of data inputs.
    fn input_count(&self) -> usize;

    /// Input `index`, or `ArityError` when out of range.
    fn input(&self, index: usize) -> Result<NodeOutput>;

    /// Untyped attribute lookup.
    fn raw_attribute(&self, name: &str) -> Option<&AttributeValue>;
}

impl dyn NodeView + '_ {
    /// Get a required attribute.
    ///
    /// Fails with `MissingAttribute` when absent and with
    /// `UnsupportedAttributeValue` when it has the wrong kind.
    pub fn attribute<T>(&self, name: &str) -> Result<T>
    where
        T: TryFrom<AttributeValue>,
        T::Error: std::fmt::Display,
    {
        let value = self
            .raw_attribute(name)
            .ok_or_else(|| Error::MissingAttribute {
                node: self.name().to_string(),
                op_type: self.op_type().to_string(),
                attribute: name.to_string(),
            })?;

        T::try_from(value.clone()).map_err(|actual| Error::UnsupportedAttributeValue {
            node: self.name().to_string(),
            op_type: self.op_type().to_string(),
            attribute: name.to_string(),
            value: format!("expected {}, got {}", std::any::type_name::<T>(), actual),
        })
    }

    /// Get an optional attribute, falling back to `default` when absent.
    pub fn attribute_or<T>(&self, name: &str, default: T) -> Result<T>
    where
        T: TryFrom<AttributeValue>,
        T::Error: std::fmt::Display,
    {
        if self.raw_attribute(name).is_none() {
            return Ok(default);
        }
        self.attribute(name)
    }

    /// All inputs, in order.
    pub fn inputs(&self) -> Result<Vec<NodeOutput>> {
        (0..self.input_count()).map(|i| self.input(i)).collect()
    }
}

/// [`NodeView`] over a [`graft_graph::Node`] with inputs resolved by the driver.
pub struct SourceNodeView<'a> {
    node: &'a Node,
    inputs: Vec<NodeOutput>,
}

impl<'a> SourceNodeView<'a> {
    /// Create a view; `inputs` must follow the node's data input order.
    pub fn new(node: &'a Node, inputs: Vec<NodeOutput>) -> Self {
        Self { node, inputs }
    }
}

impl NodeView for SourceNodeView<'_> {
    fn op_type(&self) -> &str {
        &self.node.op_type
    }

    fn name(&self) -> &str {
        &self.node.name
    }

    fn input_count(&self) -> usize {
        self.inputs.len()
    }

    fn input(&self, index: usize) -> Result<NodeOutput> {
        self.inputs
            .get(index)
            .copied()
            .ok_or_else(|| Error::ArityError {
                node: self.node.name.clone(),
                op_type: self.node.op_type.clone(),
                expected: index + 1,
                actual: self.inputs.len(),
            })
    }

    fn raw_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.node.attributes.get(name)
    }
}
