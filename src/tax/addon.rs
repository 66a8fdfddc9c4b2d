use serde::{Deserialize, Serialize};

use super::{CorrectionSet, ExtensionDef, ScenarioSet};
use crate::core::Key;
use crate::registry::{Normalizer, Validator};

/// An optional bundle of extensions, scenarios and hooks layered over a
/// regime, usually for a document format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddonDef {
    pub key: Key,
    /// Addons that must run before this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<Key>,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenarios: Vec<ScenarioSet>,
    #[serde(default, skip_serializing_if = "CorrectionSet::is_empty")]
    pub corrections: CorrectionSet,
    #[serde(skip)]
    pub normalizer: Normalizer,
    #[serde(skip)]
    pub validator: Validator,
}

impl AddonDef {
    pub fn new(key: Key, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_requires(mut self, key: Key) -> Self {
        self.requires.push(key);
        self
    }

    pub fn with_extension(mut self, ext: ExtensionDef) -> Self {
        self.extensions.push(ext);
        self
    }

    pub fn with_scenarios(mut self, set: ScenarioSet) -> Self {
        self.scenarios.push(set);
        self
    }

    pub fn with_corrections(mut self, corrections: CorrectionSet) -> Self {
        self.corrections = corrections;
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn extension_def(&self, key: &Key) -> Option<&ExtensionDef> {
        self.extensions.iter().find(|e| &e.key == key)
    }

    pub fn scenario_set(&self, schema: &str) -> Option<&ScenarioSet> {
        self.scenarios.iter().find(|s| s.applies_to(schema))
    }
}
