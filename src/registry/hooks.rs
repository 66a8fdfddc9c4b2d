use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::node::{AsAny, Node};
use crate::core::ValidationError;

type NormalizeFn = Arc<dyn Fn(&mut dyn Any) + Send + Sync>;
type ValidateFn = Arc<dyn Fn(&dyn Any) -> Vec<ValidationError> + Send + Sync>;

fn type_of(node: &dyn Node) -> TypeId {
    Any::type_id(AsAny::as_any(node))
}

/// Normalization hooks keyed by the concrete node type they apply to.
///
/// ```rust
/// use fiskal::registry::Normalizer;
/// use fiskal::tax::Identity;
///
/// let n = Normalizer::new().with(|id: &mut Identity| id.code = id.code.as_str().trim().into());
/// assert!(n.handles::<Identity>());
/// ```
#[derive(Clone, Default)]
pub struct Normalizer {
    hooks: HashMap<TypeId, Vec<NormalizeFn>>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook for nodes of type `T`. Hooks for the same type run in
    /// registration order.
    pub fn with<T: Any>(mut self, hook: impl Fn(&mut T) + Send + Sync + 'static) -> Self {
        let f: NormalizeFn = Arc::new(move |any: &mut dyn Any| {
            if let Some(t) = any.downcast_mut::<T>() {
                hook(t);
            }
        });
        self.hooks.entry(TypeId::of::<T>()).or_default().push(f);
        self
    }

    pub fn handles<T: Any>(&self) -> bool {
        self.hooks.contains_key(&TypeId::of::<T>())
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run the hooks registered for the node's concrete type. Other types
    /// pass through untouched.
    pub(crate) fn run(&self, node: &mut dyn Node) {
        let Some(hooks) = self.hooks.get(&type_of(node)) else {
            return;
        };
        for hook in hooks {
            hook(AsAny::as_any_mut(node));
        }
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("types", &self.hooks.len())
            .finish()
    }
}

/// Validation hooks keyed by the concrete node type they apply to. Each
/// hook returns the errors it found, with fields relative to the node.
#[derive(Clone, Default)]
pub struct Validator {
    hooks: HashMap<TypeId, Vec<ValidateFn>>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Any>(
        mut self,
        hook: impl Fn(&T) -> Vec<ValidationError> + Send + Sync + 'static,
    ) -> Self {
        let f: ValidateFn = Arc::new(move |any: &dyn Any| match any.downcast_ref::<T>() {
            Some(t) => hook(t),
            None => Vec::new(),
        });
        self.hooks.entry(TypeId::of::<T>()).or_default().push(f);
        self
    }

    pub fn handles<T: Any>(&self) -> bool {
        self.hooks.contains_key(&TypeId::of::<T>())
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub(crate) fn run(&self, node: &dyn Node) -> Vec<ValidationError> {
        let Some(hooks) = self.hooks.get(&type_of(node)) else {
            return Vec::new();
        };
        hooks
            .iter()
            .flat_map(|hook| hook(AsAny::as_any(node)))
            .collect()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("types", &self.hooks.len())
            .finish()
    }
}
