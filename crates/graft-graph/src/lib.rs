//! Source graph model for graft.
//!
//! This crate holds the structured, in-memory form of a TensorFlow-style
//! computation graph as handed over by an importer: nodes with an op type,
//! named inputs and typed attributes, plus the declared graph inputs.
//! Parsing serialized models is the importer's job and lives outside this crate.
//!
//! # Example
//!
//! ```
//! use graft_graph::{AttributeValue, DataType, Graph, Node, TensorInfo, TensorShape};
//!
//! let mut graph = Graph::new();
//! graph.add_input(TensorInfo::new("x", DataType::F32, TensorShape::Static(vec![3])));
//!
//! let mut node = Node::new("Sum");
//! node.name = "total".to_string();
//! node.inputs = vec!["x".to_string(), "axes".to_string()];
//! node.attributes.insert("keep_dims".to_string(), AttributeValue::Bool(false));
//! graph.add_node(node);
//!
//! assert_eq!(graph.nodes.len(), 1);
//! ```

pub mod graph;

pub use graph::{
    AttributeValue, DataType, Dimension, Graph, GraphMetadata, Node, NodeId, TensorInfo,
    TensorLiteral, TensorRef, TensorShape,
};

use thiserror::Error;

/// Errors raised while inspecting or validating a source graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Invalid graph structure: {0}")]
    InvalidGraph(String),

    #[error("Missing tensor: {0}")]
    MissingTensor(String),

    #[error("Missing attribute: {0}")]
    MissingAttribute(String),

    #[error("Type mismatch for attribute '{name}': expected {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Graph contains a cycle through node '{0}'")]
    Cycle(String),
}

/// Result type for source graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
