//! Reference evaluator.
//!
//! Interprets an `IrGraph` on concrete inputs so translated subgraphs can be
//! checked numerically. It is a correctness oracle for tests, not an execution
//! backend: every kernel works on plain vectors in row-major order.

use crate::ir::{IrGraph, IrValueId};
use crate::kernels::compute;
use crate::op::Op;
use crate::types::{ElementType, TensorShape, TensorValue};
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Evaluate `outputs` of `graph`, feeding parameters by name.
///
/// Only the nodes the requested outputs depend on are run, so parameters that
/// do not contribute need no feed. Values folded at build time are reused.
pub fn evaluate(
    graph: &IrGraph,
    feeds: &HashMap<String, TensorValue>,
    outputs: &[IrValueId],
) -> Result<Vec<TensorValue>> {
    let needed = ancestors(graph, outputs)?;
    let mut computed: HashMap<IrValueId, TensorValue> = HashMap::new();

    for node_id in graph.topological_order() {
        let node = graph.node(node_id)?;
        if !needed.contains(&node.output) {
            continue;
        }

        let value = if let Some(folded) = graph.constant(node.output) {
            folded.clone()
        } else if let Op::Parameter { name, dtype, shape } = &node.op {
            let fed = feeds
                .get(name)
                .ok_or_else(|| Error::Evaluation(format!("No feed for parameter '{}'", name)))?;
            check_feed(name, fed, *dtype, shape)?;
            fed.clone()
        } else {
            let inputs = node
                .inputs
                .iter()
                .map(|id| {
                    computed.get(id).ok_or_else(|| {
                        Error::Evaluation(format!("Value {:?} used before it was computed", id))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            compute(&node.op, &inputs)?
        };

        trace!(node = %node.name, op = node.op.name(), shape = ?value.shape, "evaluated");
        computed.insert(node.output, value);
    }

    outputs
        .iter()
        .map(|id| {
            computed
                .get(id)
                .cloned()
                .ok_or_else(|| Error::Evaluation(format!("Output {:?} was not computed", id)))
        })
        .collect()
}

/// Values that `outputs` transitively depend on (including themselves).
fn ancestors(graph: &IrGraph, outputs: &[IrValueId]) -> Result<HashSet<IrValueId>> {
    let mut seen = HashSet::new();
    let mut stack: Vec<IrValueId> = outputs.to_vec();
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        // Folded values need none of their inputs.
        if graph.constant(id).is_some() {
            continue;
        }
        stack.extend(graph.producer(id)?.inputs.iter().copied());
    }
    Ok(seen)
}

fn check_feed(
    name: &str,
    fed: &TensorValue,
    dtype: ElementType,
    shape: &TensorShape,
) -> Result<()> {
    if fed.dtype != dtype {
        return Err(Error::Evaluation(format!(
            "Feed for '{}' is {:?}, parameter is {:?}",
            name, fed.dtype, dtype
        )));
    }
    if let Some(dims) = shape.dims() {
        let fits = dims.len() == fed.shape.len()
            && dims
                .iter()
                .zip(&fed.shape)
                .all(|(want, &got)| want.is_none_or(|w| w == got));
        if !fits {
            return Err(Error::Evaluation(format!(
                "Feed for '{}' has shape {:?}, parameter expects {:?}",
                name, fed.shape, shape
            )));
        }
    }
    Ok(())
}
