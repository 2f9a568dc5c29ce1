//! End-to-end checks of IR construction, folding and evaluation.

use graft_ir::{
    ElementType, Error, FoldOptions, IrGraph, Op, PadMode, ReduceKind, TensorShape, TensorValue,
    evaluate,
};
use std::collections::HashMap;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .with_test_writer()
        .try_init();
}

#[test]
fn test_packed_complex_pipeline() {
    init_tracing();
    let mut graph = IrGraph::new();
    let packed = graph
        .add_parameter("z", ElementType::F32, TensorShape::Static(vec![2, 2]))
        .unwrap();
    let marker = graph
        .add_op(
            "z/complex",
            Op::ComplexMark {
                part_type: ElementType::F32,
            },
            &[packed],
        )
        .unwrap();

    // Re-marking a marker is rejected.
    assert!(matches!(
        graph.add_op(
            "again",
            Op::ComplexMark {
                part_type: ElementType::F32
            },
            &[marker]
        ),
        Err(Error::InvalidGraph(_))
    ));

    let zero = graph
        .add_constant("zero", TensorValue::from_i64(vec![0], vec![]))
        .unwrap();
    let begin = graph
        .add_constant("begin", TensorValue::from_i64(vec![1, 0], vec![2]))
        .unwrap();
    let end = graph
        .add_constant("end", TensorValue::from_i64(vec![0, 0], vec![2]))
        .unwrap();
    let fill = graph
        .add_constant("fill", TensorValue::from_f32(vec![0.0], vec![]))
        .unwrap();
    let padded = graph
        .add_op(
            "pad",
            Op::Pad {
                mode: PadMode::Constant,
            },
            &[packed, begin, end, fill],
        )
        .unwrap();
    let real = graph
        .add_op("real", Op::Gather { axis: -1 }, &[padded, zero])
        .unwrap();
    let axes = graph
        .add_constant("axes", TensorValue::from_i64(vec![0], vec![1]))
        .unwrap();
    let total = graph
        .add_op(
            "total",
            Op::Reduce {
                kind: ReduceKind::Sum,
                keep_dims: false,
            },
            &[real, axes],
        )
        .unwrap();

    assert_eq!(graph.shape(padded).unwrap(), &TensorShape::Static(vec![3, 2]));
    assert_eq!(graph.shape(total).unwrap(), &TensorShape::scalar());
    graph.add_output(total).unwrap();

    let feeds = HashMap::from([(
        "z".to_string(),
        TensorValue::from_f32(vec![1.0, 10.0, 2.0, 20.0], vec![2, 2]),
    )]);
    let out = evaluate(&graph, &feeds, &graph.outputs).unwrap();
    assert_eq!(out[0].as_f32(), Some(&[3.0][..]));
}

#[test]
fn test_fold_limit() {
    let mut graph = IrGraph::with_fold_options(FoldOptions {
        enabled: true,
        max_elements: 2,
    });
    let small = graph
        .add_constant("small", TensorValue::from_f32(vec![1.0, 2.0], vec![2]))
        .unwrap();
    let large = graph
        .add_constant("large", TensorValue::from_f32(vec![1.0, 2.0, 3.0], vec![3]))
        .unwrap();
    let small_sum = graph.add_op("small_sum", Op::Add, &[small, small]).unwrap();
    let large_sum = graph.add_op("large_sum", Op::Add, &[large, large]).unwrap();

    assert!(graph.constant(small_sum).is_some());
    assert!(graph.constant(large_sum).is_none());

    let out = evaluate(&graph, &HashMap::new(), &[large_sum]).unwrap();
    assert_eq!(out[0].as_f32(), Some(&[2.0, 4.0, 6.0][..]));
}

#[test]
fn test_missing_feed() {
    let mut graph = IrGraph::new();
    let x = graph
        .add_parameter("x", ElementType::F32, TensorShape::Static(vec![1]))
        .unwrap();
    let y = graph.add_op("y", Op::Sqrt, &[x]).unwrap();
    assert!(matches!(
        evaluate(&graph, &HashMap::new(), &[y]),
        Err(Error::Evaluation(_))
    ));
}

#[test]
fn test_topological_order_respects_edges() {
    let mut graph = IrGraph::new();
    let x = graph
        .add_parameter("x", ElementType::F32, TensorShape::Static(vec![2]))
        .unwrap();
    let a = graph.add_op("a", Op::Cos, &[x]).unwrap();
    let b = graph.add_op("b", Op::Sin, &[x]).unwrap();
    graph.add_op("c", Op::Atan2, &[a, b]).unwrap();

    let names: Vec<String> = graph
        .topological_order()
        .into_iter()
        .map(|id| graph.node(id).unwrap().name.clone())
        .collect();
    let position = |name: &str| names.iter().position(|n| n == name).unwrap();
    assert!(position("x") < position("a"));
    assert!(position("x") < position("b"));
    assert!(position("a") < position("c"));
    assert!(position("b") < position("c"));
    assert_eq!(graph.consumers(x).len(), 2);
}
