use serde::{Deserialize, Serialize};

use crate::core::{Key, append_unique_keys};

/// What a corrective document (credit note, amendment) needs for a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionDefinition {
    pub schema: String,
    /// Document types that may be issued as corrections.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<Key>,
    /// Extension keys that describe the correction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<Key>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reason_required: bool,
}

/// Correction definitions of a regime or addon, one per schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrectionSet(Vec<CorrectionDefinition>);

impl CorrectionSet {
    pub fn new(defs: Vec<CorrectionDefinition>) -> Self {
        Self(defs)
    }

    /// The definition for `schema`, matched by suffix.
    pub fn def(&self, schema: &str) -> Option<&CorrectionDefinition> {
        self.0.iter().find(|cd| schema.ends_with(&cd.schema))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CorrectionDefinition> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl CorrectionDefinition {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            ..Default::default()
        }
    }

    /// Combine two definitions for the same schema. Lists are joined without
    /// duplicates and a reason is required if either requires one. A
    /// definition for another schema is ignored.
    pub fn merge(&self, other: &CorrectionDefinition) -> CorrectionDefinition {
        if self.schema != other.schema {
            return self.clone();
        }
        CorrectionDefinition {
            schema: self.schema.clone(),
            types: append_unique_keys(self.types.clone(), &other.types),
            extensions: append_unique_keys(self.extensions.clone(), &other.extensions),
            reason_required: self.reason_required || other.reason_required,
        }
    }

    pub fn has_type(&self, t: &Key) -> bool {
        t.is_in(&self.types)
    }

    pub fn has_extension(&self, key: &Key) -> bool {
        key.is_in(&self.extensions)
    }
}
