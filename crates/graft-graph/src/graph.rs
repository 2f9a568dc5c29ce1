//! Graph representation for source models.
//!
//! This module defines the structured graph representation handed to the
//! translation frontend, independent of any serialized schema.

use crate::{GraphError, Result};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use std::collections::HashMap;

/// Unique identifier for a node in the graph.
pub type NodeId = usize;

/// Internal graph representation of a source model.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// All nodes (operations) in the graph, in importer order.
    pub nodes: Vec<Node>,

    /// Declared graph inputs (placeholders).
    pub inputs: Vec<TensorInfo>,

    /// Tensor references that form the graph outputs (e.g. `"logits"` or `"split:1"`).
    pub outputs: Vec<String>,

    /// Graph metadata.
    pub metadata: GraphMetadata,
}

/// Metadata about the graph.
#[derive(Debug, Clone, Default)]
pub struct GraphMetadata {
    /// Graph name.
    pub name: String,

    /// Producer name.
    pub producer_name: String,

    /// Producer version.
    pub producer_version: i64,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    /// Declare a graph input.
    pub fn add_input(&mut self, info: TensorInfo) {
        self.inputs.push(info);
    }

    /// Look up a node by name.
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Look up a declared graph input by name.
    pub fn input_by_name(&self, name: &str) -> Option<&TensorInfo> {
        self.inputs.iter().find(|info| info.name == name)
    }

    /// Validate graph structure.
    ///
    /// Checks that node and input names are unique and that every data input,
    /// control input and graph output refers to something that exists.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<&str, ()> = HashMap::new();
        for name in self
            .inputs
            .iter()
            .map(|i| i.name.as_str())
            .chain(self.nodes.iter().map(|n| n.name.as_str()))
        {
            if name.is_empty() {
                return Err(GraphError::InvalidGraph(
                    "Nodes and inputs must have non-empty names".to_string(),
                ));
            }
            if seen.insert(name, ()).is_some() {
                return Err(GraphError::InvalidGraph(format!(
                    "Duplicate node or input name: {}",
                    name
                )));
            }
        }

        for node in &self.nodes {
            for input in &node.inputs {
                let reference = TensorRef::parse(input);
                if !seen.contains_key(reference.node.as_str()) {
                    return Err(GraphError::MissingTensor(format!(
                        "{} (referenced by node '{}')",
                        input, node.name
                    )));
                }
            }
        }

        for output in &self.outputs {
            let reference = TensorRef::parse(output);
            if reference.is_control || !seen.contains_key(reference.node.as_str()) {
                return Err(GraphError::MissingTensor(format!(
                    "{} (graph output)",
                    output
                )));
            }
        }

        Ok(())
    }

    /// Compute an order in which every node comes after all of its producers.
    ///
    /// Control inputs (`^name`) take part in the ordering even though they carry
    /// no data.
    pub fn topological_order(&self) -> Result<Vec<NodeId>> {
        let mut dag: DiGraph<NodeId, ()> = DiGraph::with_capacity(self.nodes.len(), 0);
        let indices: Vec<_> = (0..self.nodes.len()).map(|id| dag.add_node(id)).collect();
        let by_name: HashMap<&str, NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(id, node)| (node.name.as_str(), id))
            .collect();

        for (consumer, node) in self.nodes.iter().enumerate() {
            for input in &node.inputs {
                let reference = TensorRef::parse(input);
                if let Some(&producer) = by_name.get(reference.node.as_str()) {
                    dag.add_edge(indices[producer], indices[consumer], ());
                }
            }
        }

        toposort(&dag, None)
            .map(|order| order.into_iter().map(|idx| dag[idx]).collect())
            .map_err(|cycle| GraphError::Cycle(self.nodes[dag[cycle.node_id()]].name.clone()))
    }
}

/// A node (operation) in the graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node name, unique within the graph.
    pub name: String,

    /// Operation type (e.g., "AddN", "Pad", "Select").
    pub op_type: String,

    /// Input tensor references (`"producer"`, `"producer:1"` or `"^control"`).
    pub inputs: Vec<String>,

    /// Node attributes.
    pub attributes: HashMap<String, AttributeValue>,
}

impl Node {
    /// Create a new node.
    pub fn new(op_type: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            op_type: op_type.into(),
            inputs: Vec::new(),
            attributes: HashMap::new(),
        }
    }

    /// Data inputs of the node, skipping control dependencies.
    pub fn data_inputs(&self) -> impl Iterator<Item = TensorRef> + '_ {
        self.inputs
            .iter()
            .map(|input| TensorRef::parse(input))
            .filter(|reference| !reference.is_control)
    }

    /// Get an attribute value.
    pub fn attr<T>(&self, name: &str) -> Result<T>
    where
        T: TryFrom<AttributeValue>,
        T::Error: std::fmt::Display,
    {
        let value = self
            .attributes
            .get(name)
            .ok_or_else(|| GraphError::MissingAttribute(name.to_string()))?;

        T::try_from(value.clone()).map_err(|e| GraphError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            actual: format!("{}", e),
        })
    }

    /// Check if an attribute exists.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Name under which output `index` of this node is referenced.
    pub fn output_name(&self, index: usize) -> String {
        if index == 0 {
            self.name.clone()
        } else {
            format!("{}:{}", self.name, index)
        }
    }
}

/// A parsed reference to a tensor produced by a node or a graph input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TensorRef {
    /// Producing node (or graph input) name.
    pub node: String,

    /// Output slot of the producer.
    pub index: usize,

    /// Whether this is a control dependency (`^name`).
    pub is_control: bool,
}

impl TensorRef {
    /// Parse `"name"`, `"name:3"` or `"^name"`.
    ///
    /// A suffix after the last `:` that is not a number is kept as part of the name.
    pub fn parse(reference: &str) -> Self {
        if let Some(name) = reference.strip_prefix('^') {
            return Self {
                node: name.to_string(),
                index: 0,
                is_control: true,
            };
        }

        if let Some((name, index)) = reference.rsplit_once(':')
            && let Ok(index) = index.parse::<usize>()
        {
            return Self {
                node: name.to_string(),
                index,
                is_control: false,
            };
        }

        Self {
            node: reference.to_string(),
            index: 0,
            is_control: false,
        }
    }

    /// Canonical key used to register the tensor (`"name:0"` collapses to `"name"`).
    pub fn key(&self) -> String {
        if self.index == 0 {
            self.node.clone()
        } else {
            format!("{}:{}", self.node, self.index)
        }
    }
}

/// Attribute value types.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Float(f32),
    Int(i64),
    Bool(bool),
    String(String),
    Type(DataType),
    Tensor(TensorLiteral),
    Floats(Vec<f32>),
    Ints(Vec<i64>),
    Strings(Vec<String>),
}

impl AttributeValue {
    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            AttributeValue::Float(_) => "float",
            AttributeValue::Int(_) => "int",
            AttributeValue::Bool(_) => "bool",
            AttributeValue::String(_) => "string",
            AttributeValue::Type(_) => "type",
            AttributeValue::Tensor(_) => "tensor",
            AttributeValue::Floats(_) => "list(float)",
            AttributeValue::Ints(_) => "list(int)",
            AttributeValue::Strings(_) => "list(string)",
        }
    }
}

macro_rules! impl_try_from_attribute {
    ($target:ty, $variant:ident) => {
        impl TryFrom<AttributeValue> for $target {
            type Error = String;

            fn try_from(value: AttributeValue) -> std::result::Result<Self, Self::Error> {
                match value {
                    AttributeValue::$variant(v) => Ok(v),
                    other => Err(other.kind().to_string()),
                }
            }
        }
    };
}

impl_try_from_attribute!(f32, Float);
impl_try_from_attribute!(i64, Int);
impl_try_from_attribute!(String, String);
impl_try_from_attribute!(DataType, Type);
impl_try_from_attribute!(TensorLiteral, Tensor);
impl_try_from_attribute!(Vec<f32>, Floats);
impl_try_from_attribute!(Vec<i64>, Ints);
impl_try_from_attribute!(Vec<String>, Strings);

impl TryFrom<AttributeValue> for bool {
    type Error = String;

    fn try_from(value: AttributeValue) -> std::result::Result<Self, Self::Error> {
        // Some exporters write boolean attributes as 0/1 integers.
        match value {
            AttributeValue::Bool(v) => Ok(v),
            AttributeValue::Int(v) => Ok(v != 0),
            other => Err(other.kind().to_string()),
        }
    }
}

/// Information about a declared graph input.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorInfo {
    /// Tensor name.
    pub name: String,

    /// Data type.
    pub dtype: DataType,

    /// Tensor shape.
    pub shape: TensorShape,
}

impl TensorInfo {
    /// Create a new tensor description.
    pub fn new(name: impl Into<String>, dtype: DataType, shape: TensorShape) -> Self {
        Self {
            name: name.into(),
            dtype,
            shape,
        }
    }
}

/// Data types that can appear in a source graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    F32,
    F64,
    I32,
    I64,
    Bool,
    /// Complex number with two f32 parts.
    Complex64,
    /// Complex number with two f64 parts.
    Complex128,
}

impl DataType {
    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            DataType::Bool => 1,
            DataType::F32 | DataType::I32 => 4,
            DataType::F64 | DataType::I64 | DataType::Complex64 => 8,
            DataType::Complex128 => 16,
        }
    }

    /// Whether this is a complex type.
    pub fn is_complex(&self) -> bool {
        matches!(self, DataType::Complex64 | DataType::Complex128)
    }

    /// Type of the real and imaginary parts of a complex type.
    pub fn complex_part_type(&self) -> Option<DataType> {
        match self {
            DataType::Complex64 => Some(DataType::F32),
            DataType::Complex128 => Some(DataType::F64),
            _ => None,
        }
    }
}

/// Tensor shape representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TensorShape {
    /// Static shape (all dimensions known).
    Static(Vec<usize>),

    /// Known rank with some symbolic dimensions.
    Dynamic(Vec<Dimension>),

    /// Unknown rank.
    Unknown,
}

impl TensorShape {
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

    /// Number of dimensions.
    pub fn ndim(&self) -> Option<usize> {
        match self {
            TensorShape::Static(dims) => Some(dims.len()),
            TensorShape::Dynamic(dims) => Some(dims.len()),
            TensorShape::Unknown => None,
        }
    }
}

/// A single dimension in a tensor shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Static dimension with known size.
    Static(usize),

    /// Named symbolic dimension (e.g., "batch").
    Named(String),
}

/// A constant tensor embedded in an attribute (e.g. the `value` of `Const`).
///
/// Elements are stored little-endian in `raw`. Complex elements are stored as
/// interleaved `(real, imaginary)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorLiteral {
    /// Element type.
    pub dtype: DataType,

    /// Dimensions.
    pub dims: Vec<usize>,

    /// Raw little-endian bytes.
    pub raw: Vec<u8>,
}

impl TensorLiteral {
    /// Number of elements described by `dims`.
    pub fn element_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// Build an f32 literal.
    pub fn from_f32(values: &[f32], dims: Vec<usize>) -> Self {
        Self {
            dtype: DataType::F32,
            dims,
            raw: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    /// Build an f64 literal.
    pub fn from_f64(values: &[f64], dims: Vec<usize>) -> Self {
        Self {
            dtype: DataType::F64,
            dims,
            raw: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    /// Build an i32 literal.
    pub fn from_i32(values: &[i32], dims: Vec<usize>) -> Self {
        Self {
            dtype: DataType::I32,
            dims,
            raw: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    /// Build an i64 literal.
    pub fn from_i64(values: &[i64], dims: Vec<usize>) -> Self {
        Self {
            dtype: DataType::I64,
            dims,
            raw: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    /// Build a bool literal.
    pub fn from_bool(values: &[bool], dims: Vec<usize>) -> Self {
        Self {
            dtype: DataType::Bool,
            dims,
            raw: values.iter().map(|&v| v as u8).collect(),
        }
    }

    /// Build a complex64 literal from `(real, imaginary)` pairs.
    pub fn from_complex64(values: &[(f32, f32)], dims: Vec<usize>) -> Self {
        Self {
            dtype: DataType::Complex64,
            dims,
            raw: values
                .iter()
                .flat_map(|(re, im)| re.to_le_bytes().into_iter().chain(im.to_le_bytes()))
                .collect(),
        }
    }

    /// Check that the byte length matches dtype and dims.
    pub fn validate(&self) -> Result<()> {
        let expected = self.element_count() * self.dtype.size();
        if self.raw.len() != expected {
            return Err(GraphError::InvalidGraph(format!(
                "Tensor literal of type {:?} and dims {:?} needs {} bytes, got {}",
                self.dtype,
                self.dims,
                expected,
                self.raw.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, op_type: &str, inputs: &[&str]) -> Node {
        let mut node = Node::new(op_type);
        node.name = name.to_string();
        node.inputs = inputs.iter().map(|s| s.to_string()).collect();
        node
    }

    #[test]
    fn test_tensor_ref_parse() {
        assert_eq!(
            TensorRef::parse("split:1"),
            TensorRef {
                node: "split".to_string(),
                index: 1,
                is_control: false
            }
        );
        assert_eq!(TensorRef::parse("x").key(), "x");
        assert_eq!(TensorRef::parse("x:0").key(), "x");
        assert!(TensorRef::parse("^init").is_control);
        // Non-numeric suffix stays in the name
        assert_eq!(TensorRef::parse("scope:inner").node, "scope:inner");
    }

    #[test]
    fn test_node_attributes() {
        let mut n = Node::new("Sum");
        n.attributes
            .insert("keep_dims".to_string(), AttributeValue::Bool(true));
        n.attributes
            .insert("mode".to_string(), AttributeValue::String("REFLECT".into()));

        let keep_dims: bool = n.attr("keep_dims").unwrap();
        assert!(keep_dims);
        assert!(n.attr::<i64>("mode").is_err());
        assert!(matches!(
            n.attr::<String>("missing"),
            Err(GraphError::MissingAttribute(_))
        ));
    }

    #[test]
    fn test_bool_from_int_attribute() {
        let value: bool = AttributeValue::Int(1).try_into().unwrap();
        assert!(value);
    }

    #[test]
    fn test_validate_missing_input() {
        let mut graph = Graph::new();
        graph.add_node(node("a", "Identity", &["nowhere"]));
        assert!(matches!(
            graph.validate(),
            Err(GraphError::MissingTensor(_))
        ));
    }

    #[test]
    fn test_validate_duplicate_name() {
        let mut graph = Graph::new();
        graph.add_input(TensorInfo::new("x", DataType::F32, TensorShape::Unknown));
        graph.add_node(node("x", "Identity", &["x"]));
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_topological_order_out_of_order_nodes() {
        let mut graph = Graph::new();
        graph.add_input(TensorInfo::new("x", DataType::F32, TensorShape::Unknown));
        graph.add_node(node("c", "Identity", &["b"]));
        graph.add_node(node("b", "Identity", &["a", "^a"]));
        graph.add_node(node("a", "Identity", &["x"]));
        graph.outputs = vec!["c".to_string()];
        graph.validate().unwrap();

        let order = graph.topological_order().unwrap();
        let names: Vec<_> = order.iter().map(|&i| graph.nodes[i].name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_topological_order_cycle() {
        let mut graph = Graph::new();
        graph.add_node(node("a", "Identity", &["b"]));
        graph.add_node(node("b", "Identity", &["a"]));
        assert!(matches!(
            graph.topological_order(),
            Err(GraphError::Cycle(_))
        ));
    }

    #[test]
    fn test_literal_validate() {
        let literal = TensorLiteral::from_complex64(&[(1.0, 2.0), (3.0, 4.0)], vec![2]);
        assert_eq!(literal.raw.len(), 16);
        literal.validate().unwrap();

        let broken = TensorLiteral {
            dtype: DataType::I64,
            dims: vec![3],
            raw: vec![0; 8],
        };
        assert!(broken.validate().is_err());
    }
}
