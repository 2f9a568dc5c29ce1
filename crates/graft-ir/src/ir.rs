//! Arena IR graph.
//!
//! The IR is a directed graph where:
//! - **Nodes** (`IrNode`) are ops; each produces exactly one value
//! - **Values** (`IrValue`) live in a side-table and are addressed by `IrValueId`
//!
//! Every node is validated and typed when it is added. When all inputs of a
//! node carry compile-time values and the result is small enough, the result is
//! folded and stored on the output value; the node itself stays in the graph
//! so the translated structure remains inspectable.

use crate::infer::{InputInfo, infer};
use crate::kernels::compute;
use crate::op::Op;
use crate::types::{ElementType, TensorShape, TensorValue};
use crate::{Error, Result};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use petgraph::visit::Topo;
use tracing::trace;

use std::collections::HashMap;

/// Type alias for IR node identifiers (backed by petgraph NodeIndex).
pub type IrNodeId = NodeIndex;

/// Handle to the output value of a node.
///
/// This is an index into the value side-table of the owning `IrGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IrValueId(pub usize);

impl IrValueId {
    /// Get the underlying index.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Settings for folding constants while nodes are added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldOptions {
    /// Fold nodes whose inputs are all compile-time values.
    pub enabled: bool,

    /// Largest result (in elements) that is folded.
    pub max_elements: usize,
}

impl Default for FoldOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            max_elements: 4096,
        }
    }
}

// ──────────────────────────────── IrGraph ────────────────────────────────

/// Intermediate representation graph.
///
/// Nodes are ops; values are stored in a side-table. petgraph edges exist
/// solely for topological ordering.
#[derive(Debug)]
pub struct IrGraph {
    /// The graph structure.
    graph: StableGraph<IrNode, ()>,

    /// Value metadata side-table.
    values: Vec<IrValue>,

    /// Lookup table: value ID -> consuming node IDs.
    value_consumers: HashMap<IrValueId, Vec<IrNodeId>>,

    /// Graph parameter values, in creation order.
    pub parameters: Vec<IrValueId>,

    /// Graph output values.
    pub outputs: Vec<IrValueId>,

    fold: FoldOptions,
}

impl IrGraph {
    /// Create a new empty IR graph with default folding.
    pub fn new() -> Self {
        Self::with_fold_options(FoldOptions::default())
    }

    /// Create a new empty IR graph with the given folding settings.
    pub fn with_fold_options(fold: FoldOptions) -> Self {
        Self {
            graph: StableGraph::new(),
            values: Vec::new(),
            value_consumers: HashMap::new(),
            parameters: Vec::new(),
            outputs: Vec::new(),
            fold,
        }
    }

    /// Current folding settings.
    pub fn fold_options(&self) -> FoldOptions {
        self.fold
    }

    // ── Node access ──

    /// Get an immutable reference to a node.
    pub fn node(&self, id: IrNodeId) -> Result<&IrNode> {
        self.graph
            .node_weight(id)
            .ok_or_else(|| Error::InvalidGraph(format!("Node {:?} not found", id)))
    }

    /// Iterate over all nodes in the graph.
    pub fn nodes(&self) -> impl Iterator<Item = (IrNodeId, &IrNode)> {
        self.graph
            .node_indices()
            .filter_map(|id| self.graph.node_weight(id).map(|node| (id, node)))
    }

    /// Get the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of nodes running the given op (by [`Op::name`]).
    pub fn count_ops(&self, name: &str) -> usize {
        self.nodes().filter(|(_, node)| node.op.name() == name).count()
    }

    /// Find a node by its name.
    ///
    /// # Errors
    ///
    /// Returns an error if no node with the given name exists.
    pub fn find_node_by_name(&self, name: &str) -> Result<IrNodeId> {
        self.nodes()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
            .ok_or_else(|| Error::InvalidGraph(format!("Node '{}' not found", name)))
    }

    // ── Value access ──

    /// Get the number of values in the graph.
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Get an immutable reference to a value.
    pub fn value(&self, id: IrValueId) -> Result<&IrValue> {
        self.values
            .get(id.index())
            .ok_or_else(|| Error::InvalidGraph(format!("Value {:?} not found", id)))
    }

    /// Element type of a value.
    pub fn dtype(&self, id: IrValueId) -> Result<ElementType> {
        Ok(self.value(id)?.dtype)
    }

    /// Shape of a value.
    pub fn shape(&self, id: IrValueId) -> Result<&TensorShape> {
        Ok(&self.value(id)?.shape)
    }

    /// Compile-time contents of a value, if known.
    pub fn constant(&self, id: IrValueId) -> Option<&TensorValue> {
        self.values.get(id.index()).and_then(|v| v.constant.as_ref())
    }

    /// Get the node that produces a value.
    pub fn producer(&self, id: IrValueId) -> Result<&IrNode> {
        self.node(self.value(id)?.producer)
    }

    /// Get the nodes that consume a value.
    pub fn consumers(&self, id: IrValueId) -> Vec<IrNodeId> {
        self.value_consumers.get(&id).cloned().unwrap_or_default()
    }

    // ── Graph mutation ──

    /// Add a parameter (graph input) and return its value.
    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        dtype: ElementType,
        shape: TensorShape,
    ) -> Result<IrValueId> {
        let name = name.into();
        let op = Op::Parameter {
            name: name.clone(),
            dtype,
            shape,
        };
        let id = self.add_op(name, op, &[])?;
        self.parameters.push(id);
        Ok(id)
    }

    /// Add a constant and return its value.
    pub fn add_constant(&mut self, name: impl Into<String>, value: TensorValue) -> Result<IrValueId> {
        self.add_op(name, Op::Constant(value), &[])
    }

    /// Add an op node and return its output value.
    ///
    /// Validates input count, element types and known shapes, infers the
    /// output type and shape, and folds the result when possible.
    pub fn add_op(&mut self, name: impl Into<String>, op: Op, inputs: &[IrValueId]) -> Result<IrValueId> {
        let name = name.into();
        for &input in inputs {
            self.value(input)?;
        }

        if op.is_complex_mark()
            && let Some(&input) = inputs.first()
            && self.producer(input)?.op.is_complex_mark()
        {
            return Err(Error::InvalidGraph(format!(
                "'{}' would mark an already marked complex value",
                name
            )));
        }

        let infos: Vec<InputInfo<'_>> = inputs
            .iter()
            .map(|&id| {
                let value = &self.values[id.index()];
                InputInfo {
                    dtype: value.dtype,
                    shape: &value.shape,
                    value: value.constant.as_ref(),
                }
            })
            .collect();
        let (dtype, mut shape) = infer(&op, &infos)?;

        let constant = match &op {
            Op::Constant(value) => Some(value.clone()),
            Op::Parameter { .. } => None,
            _ => self.try_fold(&op, inputs, &shape)?,
        };
        if let Some(value) = &constant {
            shape = TensorShape::Static(value.shape.clone());
            trace!(node = %name, op = op.name(), "folded to constant");
        }

        let id = IrValueId(self.values.len());
        let node_id = self.graph.add_node(IrNode {
            name,
            op,
            inputs: inputs.to_vec(),
            output: id,
        });
        self.values.push(IrValue {
            dtype,
            shape,
            producer: node_id,
            constant,
        });

        for &input in inputs {
            self.value_consumers.entry(input).or_default().push(node_id);
            let producer = self.values[input.index()].producer;
            self.graph.add_edge(producer, node_id, ());
        }

        Ok(id)
    }

    fn try_fold(&self, op: &Op, inputs: &[IrValueId], shape: &TensorShape) -> Result<Option<TensorValue>> {
        if !self.fold.enabled {
            return Ok(None);
        }
        if shape.element_count().is_none_or(|n| n > self.fold.max_elements) {
            return Ok(None);
        }
        // The shape of a statically shaped value is known without its contents.
        if let Op::ShapeOf { output_type } = op
            && let Some(dims) = self.values[inputs[0].index()].shape.as_static()
        {
            let dims: Vec<i64> = dims.iter().map(|&d| d as i64).collect();
            let rank = dims.len();
            return Ok(Some(TensorValue::from_i64(dims, vec![rank]).cast(*output_type)));
        }
        let Some(values) = inputs
            .iter()
            .map(|&id| self.constant(id))
            .collect::<Option<Vec<_>>>()
        else {
            return Ok(None);
        };
        compute(op, &values).map(Some)
    }

    /// Give the node producing `value` a new name.
    pub fn rename_producer(&mut self, value: IrValueId, name: impl Into<String>) -> Result<()> {
        let node_id = self.value(value)?.producer;
        let node = self
            .graph
            .node_weight_mut(node_id)
            .ok_or_else(|| Error::InvalidGraph(format!("Node {:?} not found", node_id)))?;
        node.name = name.into();
        Ok(())
    }

    /// Mark a value as a graph output.
    pub fn add_output(&mut self, value: IrValueId) -> Result<()> {
        self.value(value)?;
        self.outputs.push(value);
        Ok(())
    }

    // ── Graph queries ──

    /// Get the topological order of nodes in the graph.
    ///
    /// Returns nodes in an order such that all inputs to a node are produced
    /// before the node itself.
    pub fn topological_order(&self) -> Vec<IrNodeId> {
        let mut topo = Topo::new(&self.graph);
        let mut order = Vec::new();

        while let Some(id) = topo.next(&self.graph) {
            order.push(id);
        }

        order
    }
}

impl Default for IrGraph {
    fn default() -> Self {
        Self::new()
    }
}

// ──────────────────────────────── IrNode ─────────────────────────────────

/// A node in the IR graph.
#[derive(Debug, Clone)]
pub struct IrNode {
    /// Node name. Helper nodes get derived names; the final node of a
    /// translation carries the source node's name.
    pub name: String,

    /// The operation.
    pub op: Op,

    /// Input values, in the order the op defines.
    pub inputs: Vec<IrValueId>,

    /// The single output value.
    pub output: IrValueId,
}

// ──────────────────────────────── IrValue ────────────────────────────────

/// A value flowing between nodes.
#[derive(Debug, Clone)]
pub struct IrValue {
    /// Element type.
    pub dtype: ElementType,

    /// Shape, as far as it is known.
    pub shape: TensorShape,

    /// The node that produces this value.
    pub producer: IrNodeId,

    /// Compile-time contents (constants and folded results).
    pub constant: Option<TensorValue>,
}
