//! # fiskal
//!
//! Exact money arithmetic and time-versioned tax rates for invoicing across
//! tax regimes.
//!
//! Amounts are fixed-point integers with a decimal exponent, never floating
//! point. Tax rates are looked up by category, key and rate on the document
//! date, so an invoice dated 2020-08-01 in Germany gets the temporary 16%
//! while one dated 2021-01-01 gets 19%. Country rules plug into a shared
//! core through a [`registry`] of regime and addon definitions.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use fiskal::core::Code;
//! use fiskal::num::{Amount, Percentage};
//! use fiskal::registry::Registry;
//! use fiskal::tax::{CATEGORY_VAT, Combo, RATE_GENERAL};
//!
//! let price: Amount = "12.50".parse().unwrap();
//! let pct: Percentage = "21%".parse().unwrap();
//! assert_eq!(price.multiply(Amount::new(3, 0)).to_string(), "37.50");
//! assert_eq!(pct.of(price.upscale(2)).to_string(), "2.6250");
//!
//! let registry = Registry::bundled();
//! let ctx = registry.context(&Code::from("DE"), &[]).unwrap();
//! let mut combo = Combo::new(CATEGORY_VAT).with_rate(RATE_GENERAL);
//! combo.calculate(&ctx, NaiveDate::from_ymd_opt(2020, 8, 1).unwrap()).unwrap();
//! assert_eq!(combo.percent.unwrap().to_string(), "16%");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `bill` | Invoice document model, builders, totals calculation |
//! | `regimes` | Bundled regime definitions (DE, ES) |
//! | `addons` | Bundled addon definitions (EN 16931) |
//! | `all` (default) | Everything |

pub mod core;
pub mod num;
pub mod registry;
pub mod tax;

#[cfg(feature = "bill")]
pub mod bill;

#[cfg(feature = "regimes")]
pub mod regimes;

#[cfg(feature = "addons")]
pub mod addons;

pub use crate::core::FiskalError;
pub use crate::num::{Amount, Percentage, Rounding};
