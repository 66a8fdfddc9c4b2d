//! Fixed-point decimal numbers.
//!
//! [`Amount`] stores an integer `value` and a decimal exponent `exp`, so
//! `Amount::new(1243, 2)` is `12.43`. Arithmetic keeps the receiver's
//! exponent and truncates the other operand into it. [`Percentage`] wraps an
//! amount stored as a fraction (`16%` is `0.16`).
//!
//! ```rust
//! use fiskal::num::{Amount, Percentage};
//!
//! let price: Amount = "100.00".parse().unwrap();
//! let vat: Percentage = "19%".parse().unwrap();
//! assert_eq!(vat.of(price).to_string(), "19.00");
//! assert_eq!(vat.factor().to_string(), "1.19");
//! ```

mod amount;
mod decimal;
mod formatter;
mod percentage;
mod rounding;

pub use amount::Amount;
pub use formatter::{Formatter, NumeralSystem};
pub use percentage::Percentage;
pub use rounding::Rounding;

use thiserror::Error;

/// Errors returned when parsing an amount or percentage from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The input contained no digits.
    #[error("empty amount")]
    Empty,

    /// More than one `.` separator.
    #[error("amount must contain 0 or 1 decimal separators: '{0}'")]
    MultipleSeparators(String),

    /// The integer part is missing or contains a non-digit.
    #[error("invalid major number '{0}'")]
    InvalidMajor(String),

    /// The fractional part is missing or contains a non-digit.
    #[error("invalid decimal number '{0}'")]
    InvalidMinor(String),

    /// The digits do not fit into a 64-bit value.
    #[error("amount out of range '{0}'")]
    Overflow(String),
}

/// `10^exp` as an `i128`, or `None` beyond `10^38`.
pub(crate) fn pow10(exp: u32) -> Option<i128> {
    10i128.checked_pow(exp)
}
