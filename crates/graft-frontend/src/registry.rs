//! Translator registry for dynamic dispatch.

use crate::families::{BinaryElementwiseOp, ReduceKind, ReductionOp};
use crate::operators::{
    AddNOp, ComplexAbsOp, ComplexOp, ConstOp, IdentityOp, MirrorPadOp, PadOp, PartOp, ScatterNdOp,
    SelectOp,
};
use crate::translator::Translator;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of translators keyed by op type.
///
/// Several aliases may share one translator instance. The registry is built
/// once and only read afterwards, so a single registry can serve translations
/// on several threads.
///
/// # Example
///
/// ```
/// use graft_frontend::{TranslatorRegistry, operators::IdentityOp};
///
/// let mut registry = TranslatorRegistry::with_defaults();
/// registry.register("StopGradient", IdentityOp);
/// assert!(registry.contains("AddN"));
/// assert!(registry.contains("StopGradient"));
/// ```
#[derive(Clone, Default)]
pub struct TranslatorRegistry {
    /// Map from op type to translator.
    translators: HashMap<String, Arc<dyn Translator>>,
}

impl TranslatorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in translator.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        // AddN
        registry.register_aliases(&["AddN", "ADD_N"], AddNOp);

        // Padding
        registry.register("Pad", PadOp::pad());
        registry.register("PadV2", PadOp::pad_v2());
        registry.register_aliases(&["MirrorPad", "MIRROR_PAD"], MirrorPadOp);

        // Reductions
        for kind in ReduceKind::ALL {
            registry.register_aliases(kind.aliases(), ReductionOp::new(kind));
        }

        // Scatter and select
        registry.register_aliases(&["ScatterNd", "SCATTER_ND"], ScatterNdOp);
        registry.register("Select", SelectOp::select());
        registry.register("SelectV2", SelectOp::select_v2());

        // Binary elementwise
        registry.register_aliases(&["Add", "AddV2"], BinaryElementwiseOp::add());
        registry.register("Sub", BinaryElementwiseOp::sub());
        registry.register("Mul", BinaryElementwiseOp::mul());

        // Complex construction and projection
        registry.register("Complex", ComplexOp);
        registry.register("Real", PartOp::real());
        registry.register("Imag", PartOp::imag());
        registry.register("ComplexAbs", ComplexAbsOp);

        // Constants and pass-through
        registry.register("Const", ConstOp);
        registry.register("Identity", IdentityOp);

        registry
    }

    /// Register a translator under one op type.
    ///
    /// Returns `self` for method chaining. A later registration for the same
    /// op type replaces the earlier one.
    pub fn register<T>(&mut self, op_type: &str, translator: T) -> &mut Self
    where
        T: Translator + 'static,
    {
        self.translators
            .insert(op_type.to_string(), Arc::new(translator));
        self
    }

    /// Register one translator instance under several op types.
    pub fn register_aliases<T>(&mut self, op_types: &[&str], translator: T) -> &mut Self
    where
        T: Translator + 'static,
    {
        let shared: Arc<dyn Translator> = Arc::new(translator);
        for op_type in op_types {
            self.translators
                .insert(op_type.to_string(), Arc::clone(&shared));
        }
        self
    }

    /// Look up a translator by op type.
    pub fn get(&self, op_type: &str) -> Option<&dyn Translator> {
        self.translators.get(op_type).map(|t| t.as_ref())
    }

    /// Check if an op type is registered.
    pub fn contains(&self, op_type: &str) -> bool {
        self.translators.contains_key(op_type)
    }

    /// Get the number of registered op types.
    pub fn len(&self) -> usize {
        self.translators.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.translators.is_empty()
    }

    /// Iterate over all registered op types.
    pub fn op_types(&self) -> impl Iterator<Item = &str> {
        self.translators.keys().map(|s| s.as_str())
    }
}
