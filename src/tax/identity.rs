use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Code, ValidationError, countries};
use crate::registry::{Context, Node};

/// A tax identity: the country that issued it and the code within that
/// country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub country: Code,
    #[serde(default, skip_serializing_if = "Code::is_empty")]
    pub code: Code,
}

impl Identity {
    pub fn new(country: Code, code: Code) -> Self {
        Self { country, code }
    }

    /// Upper-case the code, drop separators and a leading copy of the
    /// country prefix: `es-b 123.456` under `ES` becomes `B123456`.
    pub fn normalize_code(&mut self) {
        let mut code: String = self
            .code
            .as_str()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let country = self.country.as_str().to_ascii_uppercase();
        if !country.is_empty() && code.len() > country.len() && code.starts_with(&country) {
            code.drain(..country.len());
        }
        self.country = Code::new(country);
        self.code = Code::new(code);
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.country, self.code)
    }
}

impl Node for Identity {
    fn normalize(&mut self, _ctx: &Context<'_>) {
        self.normalize_code();
    }

    fn validate(&self, _ctx: &Context<'_>) -> Vec<ValidationError> {
        let mut errs = Vec::new();
        if self.country.is_empty() {
            errs.push(ValidationError::new("country", "cannot be blank"));
        } else if !countries::is_tax_country(self.country.as_str()) {
            errs.push(ValidationError::new("country", "must be a valid value"));
        }
        if !self.code.is_empty() && !self.code.is_valid() {
            errs.push(ValidationError::new("code", "must be upper-case letters and digits"));
        }
        errs
    }
}
