//! AddN translation through the whole driver.

mod common;

use common::*;
use graft_frontend::Error;
use graft_graph::DataType;
use graft_ir::{ElementType, Op, TensorShape, TensorValue};

// ================================================================================
// Real inputs
// ================================================================================

#[test]
fn test_add_n_two_inputs_is_one_add() {
    let graph = make_graph(
        "AddN",
        vec![input("a", DataType::F32, &[3]), input("b", DataType::F32, &[3])],
        vec![make_node("sum", "AddN", &["a", "b"])],
        &["sum"],
    );
    let model = translate(&graph);

    assert_eq!(model.ir.count_ops("Add"), 1);
    assert_eq!(model.ir.count_ops("ComplexMark"), 0);
    let sum = model.ir.find_node_by_name("sum").unwrap();
    assert_eq!(model.ir.node(sum).unwrap().op, Op::Add);

    let out = run(
        &model,
        &[
            ("a", TensorValue::from_f32(vec![1.0, 2.0, 3.0], vec![3])),
            ("b", TensorValue::from_f32(vec![4.0, 5.0, 6.0], vec![3])),
        ],
    );
    assert_eq!(out[0].as_f32(), Some(&[5.0, 7.0, 9.0][..]));
}

#[test]
fn test_add_n_alias_and_many_inputs() {
    let graph = make_graph(
        "ADD_N",
        vec![input("a", DataType::I64, &[2])],
        vec![make_node("sum", "ADD_N", &["a", "a", "a", "a"])],
        &["sum"],
    );
    let model = translate(&graph);
    assert_eq!(model.ir.count_ops("Add"), 3);

    let out = run(&model, &[("a", TensorValue::from_i64(vec![2, -3], vec![2]))]);
    assert_eq!(out[0].as_i64(), Some(&[8, -12][..]));
}

// ================================================================================
// Complex inputs
// ================================================================================

#[test]
fn test_complex_add_n_per_plane() {
    let graph = make_graph(
        "ComplexAddN",
        vec![
            input("x", DataType::Complex64, &[2]),
            input("y", DataType::Complex64, &[2]),
        ],
        vec![make_node("sum", "AddN", &["x", "y"])],
        &["sum"],
    );
    let model = translate(&graph);

    let sum = model.output("sum").unwrap();
    let value = sum.as_complex().copied().unwrap();
    assert_eq!(value.part_type, ElementType::F32);
    assert_eq!(model.ir.shape(value.packed).unwrap(), &TensorShape::Static(vec![2, 2]));
    assert_eq!(
        model.ir.node(model.ir.find_node_by_name("sum").unwrap()).unwrap().op,
        Op::ComplexMark {
            part_type: ElementType::F32
        }
    );

    let out = run(
        &model,
        &[
            ("x", TensorValue::from_f32(vec![1.0, 10.0, 2.0, 20.0], vec![2, 2])),
            ("y", TensorValue::from_f32(vec![3.0, 30.0, 4.0, 40.0], vec![2, 2])),
        ],
    );
    assert_eq!(out[0].as_f32(), Some(&[4.0, 40.0, 6.0, 60.0][..]));
}

#[test]
fn test_complex_add_n_matches_sequential_addition() {
    let graph = make_graph(
        "ComplexAddN3",
        vec![
            input("x", DataType::Complex64, &[1]),
            input("y", DataType::Complex64, &[1]),
            input("z", DataType::Complex64, &[1]),
        ],
        vec![
            make_node("sum", "AddN", &["x", "y", "z"]),
            make_node("xy", "AddV2", &["x", "y"]),
            make_node("xyz", "Add", &["xy", "z"]),
        ],
        &["sum", "xyz"],
    );
    let model = translate(&graph);
    let out = run(
        &model,
        &[
            ("x", TensorValue::from_f32(vec![0.5, -1.0], vec![1, 2])),
            ("y", TensorValue::from_f32(vec![1.25, 2.0], vec![1, 2])),
            ("z", TensorValue::from_f32(vec![-3.0, 0.75], vec![1, 2])),
        ],
    );
    assert_eq!(out[0], out[1]);
    assert_vec_approx_eq(out[0].as_f32().unwrap(), &[-1.25, 1.75], 1e-6);
}

#[test]
fn test_add_n_mixed_marking_fails() {
    let graph = make_graph(
        "MixedAddN",
        vec![input("x", DataType::Complex64, &[2]), input("r", DataType::F32, &[2, 2])],
        vec![make_node("sum", "AddN", &["x", "r"])],
        &["sum"],
    );
    let err = translate_err(&graph);
    assert!(matches!(err, Error::UnsupportedComplexInput { ref node, .. } if node == "sum"));
}
