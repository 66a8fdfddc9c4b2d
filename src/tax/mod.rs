//! Tax categories, time-versioned rates and the definitions that regimes and
//! addons are made of.
//!
//! Resolution is a two step lookup: a [`CategoryDef`] finds the [`RateDef`]
//! for a tax key and rate key, then the rate picks the [`RateValueDef`] in
//! force on the document date.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use fiskal::core::{Code, Key};
//! use fiskal::tax::{CategoryDef, Extensions, KeyDef, RateDef, RateValueDef};
//!
//! let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
//! let vat = CategoryDef::new(Code::from("VAT"), "VAT")
//!     .with_key(KeyDef::new(Key::from("standard"), "Standard"))
//!     .with_rate(
//!         RateDef::new(Key::from("general"), "General")
//!             .with_keys(&[Key::from("standard")])
//!             .with_value(RateValueDef::new(d(2012, 9, 1), "21%".parse().unwrap()))
//!             .with_value(RateValueDef::new(d(1995, 1, 1), "16%".parse().unwrap())),
//!     );
//!
//! let value = vat
//!     .resolve(&Key::from("standard"), &Key::from("general"), d(2012, 8, 31), &Extensions::new())
//!     .unwrap();
//! assert_eq!(value.percent.to_string(), "16%");
//! ```

mod addon;
mod category;
mod combo;
mod correction;
mod extensions;
mod identity;
mod rate;
mod regime;
mod scenario;
mod totals;

pub use addon::AddonDef;
pub use category::{CategoryDef, KeyDef};
pub use combo::{Combo, combo_for};
pub use correction::{CorrectionDefinition, CorrectionSet};
pub use extensions::{CodeDef, ExtValue, ExtensionDef, Extensions};
pub use identity::Identity;
pub use rate::{RateDef, RateValueDef};
pub use regime::RegimeDef;
pub use scenario::{Scenario, ScenarioSet, ScenarioSummary};
pub use totals::{
    CalculatorKind, CategoryTotal, RateTotal, RateTotalSurcharge, TaxableLine, Total,
    TotalCalculator,
};

use crate::core::{Code, Key};

pub const CATEGORY_VAT: Code = Code::from_static("VAT");
pub const CATEGORY_GST: Code = Code::from_static("GST");

pub const KEY_STANDARD: Key = Key::from_static("standard");
pub const KEY_ZERO: Key = Key::from_static("zero");
pub const KEY_EXEMPT: Key = Key::from_static("exempt");
pub const KEY_REVERSE_CHARGE: Key = Key::from_static("reverse-charge");
pub const KEY_INTRA_COMMUNITY: Key = Key::from_static("intra-community");
pub const KEY_EXPORT: Key = Key::from_static("export");
pub const KEY_OUTSIDE_SCOPE: Key = Key::from_static("outside-scope");

pub const RATE_GENERAL: Key = Key::from_static("general");
pub const RATE_INTERMEDIATE: Key = Key::from_static("intermediate");
pub const RATE_REDUCED: Key = Key::from_static("reduced");
pub const RATE_SUPER_REDUCED: Key = Key::from_static("super-reduced");
pub const RATE_SPECIAL: Key = Key::from_static("special");

/// Tax keys most VAT categories declare.
pub fn vat_keys() -> Vec<KeyDef> {
    vec![
        KeyDef::new(KEY_STANDARD, "Standard"),
        KeyDef::new(KEY_ZERO, "Zero"),
        KeyDef::new(KEY_EXEMPT, "Exempt").no_percent(),
        KeyDef::new(KEY_REVERSE_CHARGE, "Reverse Charge").no_percent(),
        KeyDef::new(KEY_INTRA_COMMUNITY, "Intra-Community").no_percent(),
        KeyDef::new(KEY_EXPORT, "Export").no_percent(),
        KeyDef::new(KEY_OUTSIDE_SCOPE, "Outside Scope").no_percent(),
    ]
}
