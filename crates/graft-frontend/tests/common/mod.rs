//! Common test utilities for translator tests.
//!
//! Graph builders for small TensorFlow-style graphs plus helpers to translate
//! them with the default registry and evaluate the resulting IR.

#![allow(dead_code)]

use graft_frontend::{GraphTranslator, NodeOutput, TranslatedModel, TranslationOptions, TranslatorRegistry};
use graft_graph::{AttributeValue, DataType, Graph, Node, TensorInfo, TensorLiteral, TensorShape};
use graft_ir::{TensorValue, evaluate};
use std::collections::HashMap;

/// Install a test subscriber once. Later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Declare a statically shaped graph input.
pub fn input(name: &str, dtype: DataType, shape: &[usize]) -> TensorInfo {
    TensorInfo::new(name, dtype, TensorShape::Static(shape.to_vec()))
}

/// Create a node reading the given tensors.
pub fn make_node(name: &str, op_type: &str, inputs: &[&str]) -> Node {
    let mut node = Node::new(op_type);
    node.name = name.to_string();
    node.inputs = inputs.iter().map(|s| s.to_string()).collect();
    node
}

/// Create a `Const` node holding `literal`.
pub fn const_node(name: &str, literal: TensorLiteral) -> Node {
    let mut node = make_node(name, "Const", &[]);
    node.attributes
        .insert("value".to_string(), AttributeValue::Tensor(literal));
    node
}

/// Assemble a graph from inputs, nodes and output names.
///
/// Graph structure:
/// - Inputs: as declared
/// - Nodes: added in the given order (translation order is topological)
/// - Outputs: the named tensors
pub fn make_graph(name: &str, inputs: Vec<TensorInfo>, nodes: Vec<Node>, outputs: &[&str]) -> Graph {
    let mut graph = Graph::new();
    for info in inputs {
        graph.add_input(info);
    }
    for node in nodes {
        graph.add_node(node);
    }
    graph.outputs = outputs.iter().map(|s| s.to_string()).collect();

    graph.metadata.name = format!("test_{}_graph", name.to_lowercase());
    graph.metadata.producer_name = "graft_test".to_string();
    graph
}

/// Translate with the default registry and options.
pub fn translate(graph: &Graph) -> TranslatedModel {
    init_tracing();
    let registry = TranslatorRegistry::with_defaults();
    GraphTranslator::new(&registry, TranslationOptions::default())
        .translate(graph)
        .expect("translation should succeed")
}

/// Translate and return the error.
pub fn translate_err(graph: &Graph) -> graft_frontend::Error {
    init_tracing();
    let registry = TranslatorRegistry::with_defaults();
    match GraphTranslator::new(&registry, TranslationOptions::default()).translate(graph) {
        Ok(_) => panic!("translation should fail"),
        Err(e) => e,
    }
}

/// Evaluate every graph output. Complex outputs yield their packed tensor.
pub fn run(model: &TranslatedModel, feeds: &[(&str, TensorValue)]) -> Vec<TensorValue> {
    let feeds: HashMap<String, TensorValue> = feeds
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    let values: Vec<_> = model
        .outputs
        .iter()
        .map(|(_, output)| match output {
            NodeOutput::Plain(value) => *value,
            NodeOutput::Complex(value) => value.packed,
        })
        .collect();
    evaluate(&model.ir, &feeds, &values).expect("evaluation should succeed")
}

/// Assert that two f32 vectors are approximately equal element-wise.
pub fn assert_vec_approx_eq(actual: &[f32], expected: &[f32], epsilon: f32) {
    assert_eq!(actual.len(), expected.len(), "Vector lengths differ");
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        let diff = (a - e).abs();
        assert!(
            diff < epsilon,
            "Element {} differs: {} vs {} (diff: {})",
            i,
            a,
            e,
            diff
        );
    }
}
