use serde::{Deserialize, Serialize};

use super::{CategoryDef, CorrectionSet, ExtensionDef, ScenarioSet};
use crate::core::{Code, Key, currencies};
use crate::num::Rounding;
use crate::registry::{Normalizer, Validator};

/// Everything the crate knows about the taxes of one country.
///
/// Definitions are plain data and (de)serialize to JSON or YAML; the
/// normalizer and validator hooks are attached in code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegimeDef {
    pub country: Code,
    /// Other codes the regime is found under, e.g. `EL` for Greece.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alt_country_codes: Vec<Code>,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub time_zone: String,
    pub currency: Code,
    /// Applied when a tax amount is reduced to the currency's precision.
    #[serde(default)]
    pub rounding: Rounding,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenarios: Vec<ScenarioSet>,
    #[serde(default, skip_serializing_if = "CorrectionSet::is_empty")]
    pub corrections: CorrectionSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryDef>,
    #[serde(skip)]
    pub normalizer: Normalizer,
    #[serde(skip)]
    pub validator: Validator,
}

impl RegimeDef {
    pub fn new(country: Code, currency: Code, name: impl Into<String>) -> Self {
        Self {
            country,
            currency,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_alt_country_code(mut self, code: Code) -> Self {
        self.alt_country_codes.push(code);
        self
    }

    pub fn with_time_zone(mut self, tz: impl Into<String>) -> Self {
        self.time_zone = tz.into();
        self
    }

    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_category(mut self, category: CategoryDef) -> Self {
        self.categories.push(category);
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

    /// The country code the regime is registered under.
    pub fn code(&self) -> &Code {
        &self.country
    }

    pub fn category_def(&self, code: &Code) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| &c.code == code)
    }

    pub fn extension_def(&self, key: &Key) -> Option<&ExtensionDef> {
        self.extensions.iter().find(|e| &e.key == key)
    }

    /// The scenario set for a schema, matched by suffix.
    pub fn scenario_set(&self, schema: &str) -> Option<&ScenarioSet> {
        self.scenarios.iter().find(|s| s.applies_to(schema))
    }

    /// Decimal places of the regime currency, two if the currency is unknown.
    pub fn currency_exp(&self) -> u32 {
        currencies::minor_units(self.currency.as_str()).unwrap_or(2)
    }

    /// True if `code` names this regime directly or through an alternative.
    pub fn answers_to(&self, code: &Code) -> bool {
        &self.country == code || self.alt_country_codes.contains(code)
    }
}
