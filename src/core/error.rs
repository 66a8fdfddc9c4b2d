use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use crate::num::ParseError;

/// Errors raised while parsing, resolving or validating tax data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FiskalError {
    /// A decimal amount or percentage string could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// No regime has been registered for the country code.
    #[error("regime '{0}' not registered")]
    RegimeNotFound(String),

    /// No addon has been registered for the key.
    #[error("addon '{0}' not registered")]
    AddonNotFound(String),

    /// The tax category is not defined by the active regime.
    #[error("category '{category}' not defined in regime '{regime}'")]
    UnknownCategory { regime: String, category: String },

    /// The tax key is not declared by the category.
    #[error("key '{key}' not defined in category '{category}'")]
    UnknownKey { category: String, key: String },

    /// The rate is not defined for the key inside the category.
    #[error("rate '{rate}' not defined for key '{key}' in category '{category}'")]
    UnknownRate {
        category: String,
        key: String,
        rate: String,
    },

    /// The rate exists but has no value in force on the date.
    #[error("rate value unavailable for '{rate}' in '{category}' on '{date}'")]
    NoRateOnDate {
        category: String,
        rate: String,
        date: NaiveDate,
    },

    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// Conversion to or from another numeric representation failed.
    #[error("conversion error: {0}")]
    Conversion(String),
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Path to the invalid field (e.g. "lines[0].taxes[1].rate").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Rule identifier if applicable (e.g. "BR-O-02").
    pub rule: Option<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule ID.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error with a rule ID.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }

    /// Attach the error to a parent path.
    pub fn prefixed(mut self, path: &str) -> Self {
        self.field = join_path(path, &self.field);
        self
    }
}

/// Join a parent path with a child field. Index segments (`[0]`) attach
/// without a dot.
pub(crate) fn join_path(parent: &str, child: &str) -> String {
    match (parent.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (_, true) => parent.to_string(),
        _ if child.starts_with('[') => format!("{parent}{child}"),
        _ => format!("{parent}.{child}"),
    }
}

/// Every validation failure found in a document, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        self.0.extend(errors);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Re-root every error below `path`.
    pub fn prefixed(self, path: &str) -> Self {
        Self(self.0.into_iter().map(|e| e.prefixed(path)).collect())
    }

    /// True if any error is attached to exactly `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Messages grouped by field path.
    pub fn by_field(&self) -> BTreeMap<String, Vec<String>> {
        let mut tree: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for e in &self.0 {
            tree.entry(e.field.clone())
                .or_default()
                .push(e.message.clone());
        }
        tree
    }

    /// `Ok(())` when empty, otherwise [`FiskalError::Validation`].
    pub fn into_result(self) -> Result<(), FiskalError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(FiskalError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = self
            .0
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&msg)
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
