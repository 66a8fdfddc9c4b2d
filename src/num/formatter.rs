use serde::{Deserialize, Serialize};

use super::{Amount, Percentage};

/// Template used when none is set: number followed by unit.
pub const DEFAULT_TEMPLATE: &str = "%n%u";

/// Digits used when rendering numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumeralSystem {
    /// `0123456789`
    #[default]
    Western,
    /// Eastern Arabic digits, `٠١٢٣٤٥٦٧٨٩`.
    Arabic,
}

/// Locale rules for presenting amounts to people.
///
/// Templates use `%n` for the number and `%u` for the unit.
///
/// ```rust
/// use fiskal::num::{Amount, Formatter};
///
/// let f = Formatter::new(",", ".").with_unit("€").with_template("%n %u");
/// assert_eq!(f.format_amount(Amount::new(123456789, 2)), "1.234.567,89 €");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formatter {
    pub decimal_mark: String,
    pub thousands_separator: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template: String,
    /// Used instead of `template` for negative numbers, e.g. `(%n)%u`.
    /// Without it the number is prefixed with `-`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub negative_template: String,
    #[serde(default)]
    pub numeral_system: NumeralSystem,
}

impl Formatter {
    pub fn new(decimal_mark: impl Into<String>, thousands_separator: impl Into<String>) -> Self {
        Self {
            decimal_mark: decimal_mark.into(),
            thousands_separator: thousands_separator.into(),
            ..Default::default()
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn without_unit(mut self) -> Self {
        self.unit.clear();
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_negative_template(mut self, template: impl Into<String>) -> Self {
        self.negative_template = template.into();
        self
    }

    pub fn with_numeral_system(mut self, system: NumeralSystem) -> Self {
        self.numeral_system = system;
        self
    }

    pub fn format_amount(&self, amount: Amount) -> String {
        self.format_with_unit(amount)
    }

    /// Format the human value of a percentage with a `%` unit and the
    /// default template.
    pub fn format_percentage(&self, percent: Percentage) -> String {
        self.clone()
            .with_unit("%")
            .with_template("")
            .format_with_unit(percent.amount())
    }

    fn format_with_unit(&self, amount: Amount) -> String {
        let mut number = self.format_number(amount);
        let mut template = if self.template.is_empty() {
            DEFAULT_TEMPLATE
        } else {
            self.template.as_str()
        };
        if amount.is_negative() {
            if self.negative_template.is_empty() {
                number.insert(0, '-');
            } else {
                template = self.negative_template.as_str();
            }
        }
        template
            .replacen("%u", &self.unit, 1)
            .replacen("%n", &number, 1)
            .trim()
            .to_string()
    }

    /// Digits of the absolute value with separators applied.
    fn format_number(&self, amount: Amount) -> String {
        let text = amount.to_string();
        let text = text.trim_start_matches('-');
        let (major, minor) = match text.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (text, None),
        };

        let mut out = String::with_capacity(text.len() + major.len() / 3);
        for (i, c) in major.chars().enumerate() {
            if i > 0 && (major.len() - i) % 3 == 0 {
                out.push_str(&self.thousands_separator);
            }
            out.push(c);
        }
        if let Some(minor) = minor {
            out.push_str(&self.decimal_mark);
            out.push_str(minor);
        }

        match self.numeral_system {
            NumeralSystem::Western => out,
            NumeralSystem::Arabic => out.chars().map(to_arabic_digit).collect(),
        }
    }
}

fn to_arabic_digit(c: char) -> char {
    match c.to_digit(10) {
        Some(d) => char::from_u32(0x0660 + d).unwrap_or(c),
        None => c,
    }
}
