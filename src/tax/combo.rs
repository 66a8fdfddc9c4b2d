use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    CATEGORY_VAT, CategoryDef, Extensions, KEY_EXEMPT, KEY_EXPORT, KEY_INTRA_COMMUNITY,
    KEY_REVERSE_CHARGE, KEY_STANDARD, KEY_ZERO, RATE_GENERAL, RegimeDef,
};
use crate::core::{Code, FiskalError, Key, ValidationError, countries};
use crate::num::Percentage;
use crate::registry::{Context, Node};

/// The tax applied to a line or charge: a category, a tax key and
/// optionally a rate whose percentage is resolved on the document date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combo {
    /// Country whose regime defines the category, when it is not the
    /// document's own.
    #[serde(default, skip_serializing_if = "Code::is_empty")]
    pub country: Code,
    #[serde(rename = "cat")]
    pub category: Code,
    #[serde(default, skip_serializing_if = "Key::is_empty")]
    pub key: Key,
    #[serde(default, skip_serializing_if = "Key::is_empty")]
    pub rate: Key,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharge: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub ext: Extensions,

    #[serde(skip)]
    retained: bool,
    #[serde(skip)]
    informative: bool,
}

/// The first combo in `list` for the category.
pub fn combo_for<'a>(list: &'a [Combo], category: &Code) -> Option<&'a Combo> {
    list.iter().find(|c| &c.category == category)
}

impl Combo {
    pub fn new(category: Code) -> Self {
        Self {
            category,
            ..Default::default()
        }
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.key = key;
        self
    }

    pub fn with_rate(mut self, rate: Key) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_percent(mut self, percent: Percentage) -> Self {
        self.percent = Some(percent);
        self
    }

    pub fn with_surcharge(mut self, surcharge: Percentage) -> Self {
        self.surcharge = Some(surcharge);
        self
    }

    pub fn with_country(mut self, country: Code) -> Self {
        self.country = country;
        self
    }

    pub fn with_ext(mut self, key: Key, value: impl Into<super::ExtValue>) -> Self {
        self.ext.set(key, value);
        self
    }

    /// Copied from the category by [`calculate`](Self::calculate).
    pub fn is_retained(&self) -> bool {
        self.retained
    }

    pub fn is_informative(&self) -> bool {
        self.informative
    }

    /// The regime that defines the combo's category.
    fn regime<'a>(&self, ctx: &Context<'a>) -> Option<&'a RegimeDef> {
        if self.country.is_empty() || ctx.regime.answers_to(&self.country) {
            Some(ctx.regime)
        } else {
            ctx.registry.regime_def(&self.country)
        }
    }

    /// Map the older VAT rate keys onto tax keys: a `zero` or `exempt`
    /// rate becomes the key, `standard` becomes the `general` rate.
    fn normalize_vat_rate(&mut self) {
        let rate = self.rate.as_str();
        match rate {
            "zero" => {
                self.key = KEY_ZERO;
                self.rate = Key::EMPTY;
                self.percent.get_or_insert(Percentage::new(0, 2));
            }
            "exempt" => {
                self.key = KEY_EXEMPT;
                self.rate = Key::EMPTY;
            }
            "exempt+reverse-charge" => {
                self.key = KEY_REVERSE_CHARGE;
                self.rate = Key::EMPTY;
                self.percent = None;
            }
            "exempt+export" => {
                self.key = KEY_EXPORT;
                self.rate = Key::EMPTY;
            }
            "exempt+eea" | "exempt+export+eea" => {
                self.key = KEY_INTRA_COMMUNITY;
                self.rate = Key::EMPTY;
            }
            "standard" => self.rate = RATE_GENERAL,
            _ => {
                if let Some(rest) = rate.strip_prefix("standard+") {
                    self.rate = RATE_GENERAL.with(&Key::new(rest));
                }
            }
        }
        if self.key.is_empty() && self.percent.is_some_and(|p| p.is_zero()) {
            self.key = KEY_ZERO;
        }
    }

    /// Resolve the category, key and percentage for the document date.
    ///
    /// A country equal to the document's is dropped. A rate without values
    /// keeps whatever percent was set by hand.
    pub fn calculate(&mut self, ctx: &Context<'_>, date: NaiveDate) -> Result<(), FiskalError> {
        let regime = if self.country.is_empty() || ctx.regime.answers_to(&self.country) {
            self.country = Code::EMPTY;
            ctx.regime
        } else {
            ctx.registry.regime_def_for(&self.country)?
        };
        let cat = regime
            .category_def(&self.category)
            .ok_or_else(|| FiskalError::UnknownCategory {
                regime: regime.country.to_string(),
                category: self.category.to_string(),
            })?;
        self.apply_category(cat);

        if !cat.keys.is_empty() && self.key.is_empty() {
            self.key = KEY_STANDARD;
        }
        if !cat.keys.is_empty() {
            let key_def = cat.key_def(&self.key).ok_or_else(|| FiskalError::UnknownKey {
                category: cat.code.to_string(),
                key: self.key.to_string(),
            })?;
            if key_def.no_percent {
                self.percent = None;
                self.surcharge = None;
                return Ok(());
            }
        }
        self.prepare_rate(cat, date)
    }

    /// Copy the category flags that totals depend on.
    pub(crate) fn apply_category(&mut self, cat: &CategoryDef) {
        self.retained = cat.retained;
        self.informative = cat.informative;
    }

    fn prepare_rate(&mut self, cat: &CategoryDef, date: NaiveDate) -> Result<(), FiskalError> {
        if self.rate.is_empty() {
            return Ok(());
        }
        let rate_def = cat
            .rate_def(&self.key, &self.rate)
            .ok_or_else(|| FiskalError::UnknownRate {
                category: cat.code.to_string(),
                key: self.key.to_string(),
                rate: self.rate.to_string(),
            })?;
        if rate_def.values.is_empty() {
            return Ok(());
        }
        let value = cat.resolve(&self.key, &self.rate, date, &self.ext)?;
        self.percent = Some(value.percent);
        self.surcharge = value.surcharge;
        Ok(())
    }

    /// A calculation error as a validation error on the combo field it
    /// concerns.
    pub fn field_error(err: &FiskalError) -> ValidationError {
        let field = match err {
            FiskalError::RegimeNotFound(_) => "country",
            FiskalError::UnknownCategory { .. } => "cat",
            FiskalError::UnknownKey { .. } => "key",
            FiskalError::UnknownRate { .. } => "rate",
            FiskalError::NoRateOnDate { .. } => "percent",
            _ => "",
        };
        ValidationError::new(field, err.to_string())
    }
}

impl Node for Combo {
    fn normalize(&mut self, _ctx: &Context<'_>) {
        if self.category == CATEGORY_VAT {
            self.normalize_vat_rate();
        }
        self.ext.clean();
    }

    fn validate(&self, ctx: &Context<'_>) -> Vec<ValidationError> {
        let mut errs = Vec::new();
        if !self.country.is_empty() && !countries::is_tax_country(self.country.as_str()) {
            errs.push(ValidationError::new("country", "must be a valid value"));
        }
        if self.surcharge.is_some() && self.percent.is_none() {
            errs.push(ValidationError::new("surcharge", "required with percent"));
        }
        if self.category.is_empty() {
            errs.push(ValidationError::new("cat", "cannot be blank"));
            return errs;
        }
        let Some(cat) = self.regime(ctx).and_then(|r| r.category_def(&self.category)) else {
            errs.push(ValidationError::new("cat", "must be a valid value"));
            return errs;
        };

        let mut no_percent = false;
        if !cat.keys.is_empty() {
            match cat.key_def(&self.key) {
                Some(kd) => no_percent = kd.no_percent,
                None => errs.push(ValidationError::new("key", "must be a valid value")),
            }
        }
        if !self.rate.is_empty() && cat.rate_def(&self.key, &self.rate).is_none() {
            errs.push(ValidationError::new("rate", "must be a valid value"));
        }
        match (&self.percent, no_percent) {
            (Some(_), true) => errs.push(ValidationError::new("percent", "must be blank")),
            (None, false) => errs.push(ValidationError::new("percent", "cannot be blank")),
            _ => {}
        }
        errs
    }

    fn extensions(&self) -> Option<&Extensions> {
        Some(&self.ext)
    }
}
