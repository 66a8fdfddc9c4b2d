use std::any::Any;

use super::Registry;
use crate::core::{Code, FiskalError, Key, ValidationError};
use crate::tax::{AddonDef, CategoryDef, ExtensionDef, Extensions, ScenarioSummary, RegimeDef};

/// Access to a value as [`Any`], implemented for every `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A value in a document tree that regime and addon hooks can act on.
///
/// Every method has a default, so leaf types only override what they use.
/// The registry walks children first, then runs the node's own
/// [`normalize`](Node::normalize) followed by the regime's and addons'
/// hooks for the node's type.
pub trait Node: AsAny {
    /// Built-in cleanup that does not depend on any regime hook.
    fn normalize(&mut self, _ctx: &Context<'_>) {}

    /// Built-in checks. Fields are relative to the node.
    fn validate(&self, _ctx: &Context<'_>) -> Vec<ValidationError> {
        Vec::new()
    }

    /// Extensions carried by the node, checked against the active
    /// definitions and matched by scenarios.
    fn extensions(&self) -> Option<&Extensions> {
        None
    }

    /// Visit child nodes with the field name they live under.
    fn for_each_child(&self, _f: &mut dyn FnMut(&str, &dyn Node)) {}

    fn for_each_child_mut(&mut self, _f: &mut dyn FnMut(&str, &mut dyn Node)) {}
}

/// The root of a document tree.
pub trait Document: Node {
    /// Country code of the regime the document is issued under.
    fn regime(&self) -> &Code;

    /// Addon keys in declaration order.
    fn addons(&self) -> &[Key];

    /// Replace the addon list, used to store the expanded dependency list.
    fn set_addons(&mut self, addons: Vec<Key>);

    /// Schema identifier used to select scenario and correction sets,
    /// e.g. `bill/invoice`.
    fn schema(&self) -> &str;

    /// Document type matched by scenarios.
    fn scenario_type(&self) -> Key {
        Key::EMPTY
    }

    fn tags(&self) -> &[Key] {
        &[]
    }

    /// Add the notes and extensions of the matching scenarios.
    fn apply_scenarios(&mut self, _summary: ScenarioSummary) {}

    /// Resolve rates and compute totals.
    fn calculate(&mut self, _ctx: &Context<'_>) -> Result<(), FiskalError> {
        Ok(())
    }
}

/// The definitions active for one document.
#[derive(Debug, Clone)]
pub struct Context<'a> {
    pub registry: &'a Registry,
    pub regime: &'a RegimeDef,
    /// Addons with dependencies expanded, in the order they run.
    pub addons: Vec<&'a AddonDef>,
}

impl<'a> Context<'a> {
    pub fn new(registry: &'a Registry, regime: &'a RegimeDef) -> Self {
        Self {
            registry,
            regime,
            addons: Vec::new(),
        }
    }

    pub fn category_def(&self, code: &Code) -> Option<&'a CategoryDef> {
        self.regime.category_def(code)
    }

    /// The definition of an extension key from the regime or any active addon.
    pub fn extension_def(&self, key: &Key) -> Option<&'a ExtensionDef> {
        self.regime
            .extension_def(key)
            .or_else(|| self.addons.iter().find_map(|a| a.extension_def(key)))
    }

    pub fn has_addon(&self, key: &Key) -> bool {
        self.addons.iter().any(|a| &a.key == key)
    }
}
