//! Conversions between [`Amount`] and [`rust_decimal::Decimal`].
//!
//! Both are scaled integers, so conversion is exact whenever the value fits
//! the target: `Decimal` supports at most 28 decimal places, `Amount` at
//! most a 64-bit mantissa.

use rust_decimal::Decimal;

use super::Amount;
use crate::core::FiskalError;

impl TryFrom<Decimal> for Amount {
    type Error = FiskalError;

    fn try_from(d: Decimal) -> Result<Self, Self::Error> {
        let value = i64::try_from(d.mantissa())
            .map_err(|_| FiskalError::Conversion(format!("decimal {d} exceeds amount range")))?;
        Ok(Amount::new(value, d.scale()))
    }
}

impl TryFrom<Amount> for Decimal {
    type Error = FiskalError;

    fn try_from(a: Amount) -> Result<Self, Self::Error> {
        Decimal::try_from_i128_with_scale(i128::from(a.value()), a.exp())
            .map_err(|e| FiskalError::Conversion(format!("amount {a}: {e}")))
    }
}
