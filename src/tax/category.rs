use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Extensions, RateDef, RateValueDef};
use crate::core::{Code, FiskalError, Key};

/// A tax key accepted by a category, such as `standard`, `zero` or `exempt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDef {
    pub key: Key,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
    /// Combos using the key never carry a percentage.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_percent: bool,
}

impl KeyDef {
    pub fn new(key: Key, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            desc: String::new(),
            no_percent: false,
        }
    }

    pub fn no_percent(mut self) -> Self {
        self.no_percent = true;
        self
    }
}

/// A tax category such as VAT or a withholding tax, with the keys and rates
/// it supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub code: Code,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Withheld by the buyer and subtracted from the payable amount.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retained: bool,
    /// Reported but not added to the totals.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub informative: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<KeyDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rates: Vec<RateDef>,
    /// Extension keys that combos of this category may use.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<Key>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub ext: Extensions,
}

impl CategoryDef {
    pub fn new(code: Code, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            title: String::new(),
            description: String::new(),
            retained: false,
            informative: false,
            keys: Vec::new(),
            rates: Vec::new(),
            extensions: Vec::new(),
            ext: Extensions::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn retained(mut self) -> Self {
        self.retained = true;
        self
    }

    pub fn with_key(mut self, key: KeyDef) -> Self {
        self.keys.push(key);
        self
    }

    pub fn with_rate(mut self, rate: RateDef) -> Self {
        self.rates.push(rate);
        self
    }

    pub fn key_def(&self, key: &Key) -> Option<&KeyDef> {
        self.keys.iter().find(|k| &k.key == key)
    }

    /// The rate for the key. An exact rate match wins; otherwise the first
    /// rate matching the leading part of the requested one (`general` for
    /// `general+eqs`).
    pub fn rate_def(&self, key: &Key, rate: &Key) -> Option<&RateDef> {
        let candidates = || self.rates.iter().filter(|r| r.has_key(key));
        candidates()
            .find(|r| &r.rate == rate)
            .or_else(|| candidates().find(|r| rate.has_prefix(&r.rate)))
    }

    /// Resolve the value for a key and rate on a date. Every miss is an
    /// error; nothing defaults to zero.
    pub fn resolve(
        &self,
        key: &Key,
        rate: &Key,
        date: NaiveDate,
        ext: &Extensions,
    ) -> Result<&RateValueDef, FiskalError> {
        if !self.keys.is_empty() && self.key_def(key).is_none() {
            return Err(FiskalError::UnknownKey {
                category: self.code.to_string(),
                key: key.to_string(),
            });
        }
        let rate_def = self
            .rate_def(key, rate)
            .ok_or_else(|| FiskalError::UnknownRate {
                category: self.code.to_string(),
                key: key.to_string(),
                rate: rate.to_string(),
            })?;
        rate_def
            .value(date, ext)
            .ok_or_else(|| FiskalError::NoRateOnDate {
                category: self.code.to_string(),
                rate: rate.to_string(),
                date,
            })
    }
}
