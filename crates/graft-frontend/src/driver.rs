//! Whole-graph translation.
//!
//! The driver declares the graph inputs as IR parameters, visits the source
//! nodes in topological order, resolves each node's inputs from the values
//! produced so far and dispatches it to the translator registered for its op
//! type.

use crate::builder::IrBuilder;
use crate::node_view::SourceNodeView;
use crate::output::NodeOutput;
use crate::registry::TranslatorRegistry;
use crate::{Error, Result};
use graft_graph::{GraphError, Node, TensorInfo, TensorRef};
use graft_ir::{ElementType, FoldOptions, IrGraph, Op, TensorShape};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// What to do when a node fails to translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failure and return its error.
    #[default]
    Abort,

    /// Record the failure and keep translating. Nodes that depend on a failed
    /// node fail in turn.
    Skip,
}

/// Options for [`GraphTranslator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationOptions {
    pub failure_policy: FailurePolicy,

    /// Fold nodes whose inputs are compile-time values while translating.
    pub fold_constants: bool,

    /// Largest folded result, in elements.
    pub max_fold_elements: usize,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        let fold = FoldOptions::default();
        Self {
            failure_policy: FailurePolicy::default(),
            fold_constants: fold.enabled,
            max_fold_elements: fold.max_elements,
        }
    }
}

impl TranslationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_constant_folding(mut self, enabled: bool) -> Self {
        self.fold_constants = enabled;
        self
    }

    pub fn with_max_fold_elements(mut self, max_elements: usize) -> Self {
        self.max_fold_elements = max_elements;
        self
    }

    fn fold_options(&self) -> FoldOptions {
        FoldOptions {
            enabled: self.fold_constants,
            max_elements: self.max_fold_elements,
        }
    }
}

/// A node that could not be translated under [`FailurePolicy::Skip`].
#[derive(Debug)]
pub struct TranslationFailure {
    pub node: String,
    pub op_type: String,
    pub error: Error,
}

/// Result of translating a source graph.
#[derive(Debug)]
pub struct TranslatedModel {
    /// The IR graph. Its `outputs` list the values of the graph outputs.
    pub ir: IrGraph,

    /// Graph outputs by source tensor name, in declaration order.
    pub outputs: Vec<(String, NodeOutput)>,

    /// Nodes skipped under [`FailurePolicy::Skip`].
    pub failures: Vec<TranslationFailure>,
}

impl TranslatedModel {
    /// Look up a graph output by its source tensor name.
    pub fn output(&self, name: &str) -> Option<NodeOutput> {
        let key = TensorRef::parse(name).key();
        self.outputs
            .iter()
            .find(|(n, _)| TensorRef::parse(n).key() == key)
            .map(|(_, output)| *output)
    }

    /// Whether every node translated.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Translates source graphs with the translators of a registry.
pub struct GraphTranslator<'r> {
    registry: &'r TranslatorRegistry,
    options: TranslationOptions,
}

impl<'r> GraphTranslator<'r> {
    pub fn new(registry: &'r TranslatorRegistry, options: TranslationOptions) -> Self {
        Self { registry, options }
    }

    /// Translate `graph` into a new IR graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGraph`] if the graph references unknown tensors
    /// or has a cycle. Under [`FailurePolicy::Abort`] the first node failure is
    /// returned as well.
    #[tracing::instrument(skip_all, fields(num_nodes = graph.nodes.len(), num_inputs = graph.inputs.len()))]
    pub fn translate(&self, graph: &graft_graph::Graph) -> Result<TranslatedModel> {
        graph.validate()?;
        let order = graph.topological_order()?;

        let mut ir = IrGraph::with_fold_options(self.options.fold_options());
        let mut tensors: HashMap<String, NodeOutput> = HashMap::new();
        let mut failures = Vec::new();

        for info in &graph.inputs {
            let output = declare_input(&mut ir, info)?;
            tensors.insert(info.name.clone(), output);
        }

        for node_id in order {
            let node = &graph.nodes[node_id];
            let _span = tracing::debug_span!("node", name = %node.name, op_type = %node.op_type).entered();

            match self.translate_node(&mut ir, &tensors, node) {
                Ok(outputs) => {
                    for (index, output) in outputs.into_iter().enumerate() {
                        tensors.insert(node.output_name(index), output);
                    }
                }
                Err(error) => match self.options.failure_policy {
                    FailurePolicy::Abort => return Err(error),
                    FailurePolicy::Skip => {
                        warn!(node = %node.name, op_type = %node.op_type, %error, "skipping node");
                        failures.push(TranslationFailure {
                            node: node.name.clone(),
                            op_type: node.op_type.clone(),
                            error,
                        });
                    }
                },
            }
        }

        let mut outputs = Vec::with_capacity(graph.outputs.len());
        for name in &graph.outputs {
            match tensors.get(&TensorRef::parse(name).key()) {
                Some(&output) => {
                    ir.add_output(output.value()).map_err(|source| Error::ShapeMismatch {
                        node: name.clone(),
                        op_type: "Output".to_string(),
                        source,
                    })?;
                    outputs.push((name.clone(), output));
                }
                None if self.options.failure_policy == FailurePolicy::Skip => {
                    warn!(output = %name, "graph output was not produced");
                }
                None => {
                    return Err(Error::InvalidGraph(GraphError::MissingTensor(format!(
                        "{} (graph output)",
                        name
                    ))));
                }
            }
        }

        info!(
            ir_nodes = ir.node_count(),
            outputs = outputs.len(),
            failures = failures.len(),
            "translated graph"
        );

        Ok(TranslatedModel {
            ir,
            outputs,
            failures,
        })
    }

    fn translate_node(
        &self,
        ir: &mut IrGraph,
        tensors: &HashMap<String, NodeOutput>,
        node: &Node,
    ) -> Result<Vec<NodeOutput>> {
        let inputs = node
            .data_inputs()
            .map(|reference| {
                tensors.get(&reference.key()).copied().ok_or_else(|| {
                    Error::InvalidGraph(GraphError::MissingTensor(format!(
                        "{} (referenced by node '{}')",
                        reference.key(),
                        node.name
                    )))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let Some(translator) = self.registry.get(&node.op_type) else {
            let mut known: Vec<&str> = self.registry.op_types().collect();
            known.sort_unstable();
            return Err(Error::UnsupportedOp {
                node: node.name.clone(),
                op_type: node.op_type.clone(),
                expected: known.join(", "),
            });
        };

        let start = ir.value_count();
        let view = SourceNodeView::new(node, inputs);
        let mut builder = IrBuilder::new(ir, node.name.as_str(), node.op_type.as_str());
        let outputs = translator.translate(&view, &mut builder)?;

        // Values created by this translation take the source output names.
        // Pass-through outputs keep the name of their original producer.
        for (index, output) in outputs.iter().enumerate() {
            let value = output.value();
            if value.index() >= start {
                ir.rename_producer(value, node.output_name(index))
                    .map_err(|source| Error::ShapeMismatch {
                        node: node.name.clone(),
                        op_type: node.op_type.clone(),
                        source,
                    })?;
            }
        }
        debug!(outputs = outputs.len(), ir_values = ir.value_count() - start, "translated node");
        Ok(outputs)
    }
}

/// Declare a graph input as an IR parameter.
///
/// Complex inputs become a packed parameter with a trailing dimension of 2
/// behind a marker.
fn declare_input(ir: &mut IrGraph, info: &TensorInfo) -> Result<NodeOutput> {
    let ir_error = |source| Error::ShapeMismatch {
        node: info.name.clone(),
        op_type: "Placeholder".to_string(),
        source,
    };
    let shape = TensorShape::from(&info.shape);

    let Some(part) = info.dtype.complex_part_type() else {
        let dtype = ElementType::from_data_type(info.dtype).map_err(ir_error)?;
        let value = ir.add_parameter(&info.name, dtype, shape).map_err(ir_error)?;
        return Ok(NodeOutput::Plain(value));
    };

    let part_type = ElementType::from_data_type(part).map_err(ir_error)?;
    let packed_shape = TensorShape::from_dims(shape.dims().map(|mut dims| {
        dims.push(Some(2));
        dims
    }));
    let packed = ir
        .add_parameter(&info.name, part_type, packed_shape)
        .map_err(ir_error)?;
    let marker = ir
        .add_op(format!("{}/complex", info.name), Op::ComplexMark { part_type }, &[packed])
        .map_err(ir_error)?;
    debug!(input = %info.name, ?part_type, "declared complex input");
    NodeOutput::classify(ir, marker).map_err(ir_error)
}
