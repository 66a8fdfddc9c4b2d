use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Extensions;
use crate::core::Key;
use crate::num::Percentage;

/// A percentage in force from a date onwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateValueDef {
    /// First day the value applies. `None` applies from the beginning of time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<NaiveDate>,
    pub percent: Percentage,
    /// Additional percentage charged on top, e.g. the Spanish equivalence surcharge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharge: Option<Percentage>,
    /// Only applies when the document context contains these extensions.
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub ext: Extensions,
    /// The rate no longer exists from `since` onwards.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

impl RateValueDef {
    pub fn new(since: NaiveDate, percent: Percentage) -> Self {
        Self {
            since: Some(since),
            percent,
            surcharge: None,
            ext: Extensions::new(),
            disabled: false,
        }
    }

    /// A value without a start date.
    pub fn always(percent: Percentage) -> Self {
        Self {
            since: None,
            ..Self::new(NaiveDate::MIN, percent)
        }
    }

    /// A marker that ends the rate on `since`.
    pub fn disabled_since(since: NaiveDate) -> Self {
        Self {
            disabled: true,
            ..Self::new(since, Percentage::zero())
        }
    }

    pub fn with_surcharge(mut self, surcharge: Percentage) -> Self {
        self.surcharge = Some(surcharge);
        self
    }

    pub fn with_ext(mut self, ext: Extensions) -> Self {
        self.ext = ext;
        self
    }

    fn applies_on(&self, date: NaiveDate) -> bool {
        self.since.is_none_or(|since| since <= date)
    }
}

/// A named rate within a category, such as `general` or `reduced`, with its
/// history of values.
///
/// Values are declared newest first. Lookup picks the value with the latest
/// `since` that is not after the requested date; a value whose extension
/// conditions match the document takes precedence over unconditional ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateDef {
    pub rate: Key,
    /// Tax keys the rate may be used with. Empty means only the empty key.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<Key>,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<RateValueDef>,
}

impl RateDef {
    pub fn new(rate: Key, name: impl Into<String>) -> Self {
        Self {
            rate,
            keys: Vec::new(),
            name: name.into(),
            description: String::new(),
            values: Vec::new(),
        }
    }

    pub fn with_keys(mut self, keys: &[Key]) -> Self {
        self.keys = keys.to_vec();
        self
    }

    pub fn with_value(mut self, value: RateValueDef) -> Self {
        self.values.push(value);
        self
    }

    /// True if the rate can be used with the tax key.
    pub fn has_key(&self, key: &Key) -> bool {
        if self.keys.is_empty() && key.is_empty() {
            return true;
        }
        self.keys.contains(key)
    }

    /// The value in force on `date` for a node carrying `ext`. `None` when
    /// the date precedes every value or the winning value is disabled.
    pub fn value(&self, date: NaiveDate, ext: &Extensions) -> Option<&RateValueDef> {
        let conditional = self
            .values
            .iter()
            .filter(|v| !v.ext.is_empty() && ext.contains(&v.ext));
        let general = self.values.iter().filter(|v| v.ext.is_empty());
        latest_on(conditional, date)
            .or_else(|| latest_on(general, date))
            .filter(|v| !v.disabled)
    }
}

/// The value with the greatest `since <= date`; the last declared wins ties.
fn latest_on<'a>(
    values: impl Iterator<Item = &'a RateValueDef>,
    date: NaiveDate,
) -> Option<&'a RateValueDef> {
    let mut best: Option<&RateValueDef> = None;
    for v in values.filter(|v| v.applies_on(date)) {
        match best {
            Some(b) if b.since > v.since => {}
            _ => best = Some(v),
        }
    }
    best
}
