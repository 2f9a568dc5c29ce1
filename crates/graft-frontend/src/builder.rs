//! Scoped IR construction for one source node.

use crate::{Error, Result};
use graft_ir::{ElementType, IrGraph, IrValueId, Op, TensorShape, TensorValue};

/// Adds IR nodes on behalf of one source node.
///
/// Helper nodes are named `"{node}/{Op}_{k}"`. The driver renames the node
/// producing each final output to the source node's name afterwards. IR
/// validation errors come back as [`Error::ShapeMismatch`] naming the node.
pub struct IrBuilder<'g> {
    graph: &'g mut IrGraph,
    node: String,
    op_type: String,
    counter: usize,
}

impl<'g> IrBuilder<'g> {
    /// Create a builder for the source node `node` of type `op_type`.
    pub fn new(graph: &'g mut IrGraph, node: impl Into<String>, op_type: impl Into<String>) -> Self {
        Self {
            graph,
            node: node.into(),
            op_type: op_type.into(),
            counter: 0,
        }
    }

    /// Name of the source node being translated.
    pub fn node_name(&self) -> &str {
        &self.node
    }

    /// Read access to the graph under construction.
    pub fn graph(&self) -> &IrGraph {
        self.graph
    }

    /// Add an op and return its output.
    pub fn op(&mut self, op: Op, inputs: &[IrValueId]) -> Result<IrValueId> {
        let name = format!("{}/{}_{}", self.node, op.name(), self.counter);
        self.counter += 1;
        self.graph.add_op(name, op, inputs).map_err(|e| self.shape_error(e))
    }

    /// Add a constant.
    pub fn constant(&mut self, value: TensorValue) -> Result<IrValueId> {
        self.op(Op::Constant(value), &[])
    }

    /// 1-D i64 constant.
    pub fn const_i64(&mut self, values: &[i64]) -> Result<IrValueId> {
        self.constant(TensorValue::from_i64(values.to_vec(), vec![values.len()]))
    }

    /// Scalar i64 constant.
    pub fn scalar_i64(&mut self, value: i64) -> Result<IrValueId> {
        self.constant(TensorValue::from_i64(vec![value], vec![]))
    }

    /// Element type of a value.
    pub fn dtype(&self, value: IrValueId) -> Result<ElementType> {
        self.graph.dtype(value).map_err(|e| self.shape_error(e))
    }

    /// Shape of a value.
    pub fn shape(&self, value: IrValueId) -> Result<TensorShape> {
        self.graph
            .shape(value)
            .cloned()
            .map_err(|e| self.shape_error(e))
    }

    fn shape_error(&self, source: graft_ir::Error) -> Error {
        Error::ShapeMismatch {
            node: self.node.clone(),
            op_type: self.op_type.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_names_and_errors() {
        let mut graph = IrGraph::new();
        let x = graph
            .add_parameter("x", ElementType::F32, TensorShape::Static(vec![3]))
            .unwrap();

        let mut builder = IrBuilder::new(&mut graph, "pad", "Pad");
        let zero = builder.scalar_i64(0).unwrap();
        let y = builder.op(Op::Add, &[x, x]).unwrap();
        assert_eq!(builder.shape(y).unwrap(), TensorShape::Static(vec![3]));

        let err = builder.op(Op::Add, &[x, zero]).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch { ref node, .. } if node == "pad"
        ));

        assert!(graph.find_node_by_name("pad/Constant_0").is_ok());
        assert!(graph.find_node_by_name("pad/Add_1").is_ok());
    }
}
