use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{ParseError, Percentage, Rounding, pow10};

/// A decimal quantity stored as `value × 10^-exp`.
///
/// Amounts never lose precision silently through floating point. Binary
/// operations take the exponent of the receiver and truncate the other
/// operand to it, so the caller always decides the precision of a result:
///
/// ```rust
/// use fiskal::num::Amount;
///
/// let a = Amount::new(200, 2); // 2.00
/// let b = Amount::new(1005, 3); // 1.005
/// assert_eq!((a + b).to_string(), "3.00");
/// assert_eq!((b + a).to_string(), "3.005");
/// ```
///
/// Equality and ordering are numeric: `Amount::new(100, 2) == Amount::new(1, 0)`.
/// Operations that overflow `i64` panic like the std integer operators; use
/// the `checked_*` variants to handle that case.
#[derive(Debug, Clone, Copy, Default)]
pub struct Amount {
    value: i64,
    exp: u32,
}

impl Amount {
    pub const fn new(value: i64, exp: u32) -> Self {
        Self { value, exp }
    }

    /// Zero with the given number of decimal places.
    pub const fn zero(exp: u32) -> Self {
        Self { value: 0, exp }
    }

    pub const fn value(&self) -> i64 {
        self.value
    }

    pub const fn exp(&self) -> u32 {
        self.exp
    }

    pub const fn is_zero(&self) -> bool {
        self.value == 0
    }

    pub const fn is_negative(&self) -> bool {
        self.value < 0
    }

    pub const fn is_positive(&self) -> bool {
        self.value > 0
    }

    pub fn add(self, other: Amount) -> Amount {
        self.checked_add(other)
            .unwrap_or_else(|| overflow("add"))
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        let other = other.checked_rescale(self.exp)?;
        Some(Amount::new(self.value.checked_add(other.value)?, self.exp))
    }

    pub fn subtract(self, other: Amount) -> Amount {
        self.checked_subtract(other)
            .unwrap_or_else(|| overflow("subtract"))
    }

    pub fn checked_subtract(self, other: Amount) -> Option<Amount> {
        let other = other.checked_rescale(self.exp)?;
        Some(Amount::new(self.value.checked_sub(other.value)?, self.exp))
    }

    /// `self × other`, keeping `self`'s exponent. The product is truncated.
    pub fn multiply(self, other: Amount) -> Amount {
        self.checked_multiply(other)
            .unwrap_or_else(|| overflow("multiply"))
    }

    pub fn checked_multiply(self, other: Amount) -> Option<Amount> {
        let product = self.value as i128 * other.value as i128;
        // |product| < 10^38, so a larger divisor always yields zero
        let v = match pow10(other.exp) {
            Some(p) => product / p,
            None => 0,
        };
        Some(Amount::new(i64::try_from(v).ok()?, self.exp))
    }

    /// `self ÷ other`, keeping `self`'s exponent. The quotient is truncated.
    ///
    /// # Panics
    ///
    /// Panics if `other` is zero or the result overflows.
    pub fn divide(self, other: Amount) -> Amount {
        if other.is_zero() {
            panic!("attempt to divide by zero");
        }
        self.checked_divide(other)
            .unwrap_or_else(|| overflow("divide"))
    }

    /// Returns `None` on division by zero or overflow.
    pub fn checked_divide(self, other: Amount) -> Option<Amount> {
        if other.is_zero() {
            return None;
        }
        let n = (self.value as i128).checked_mul(pow10(other.exp)?)?;
        let v = n / other.value as i128;
        Some(Amount::new(i64::try_from(v).ok()?, self.exp))
    }

    /// Divide into `parts` equal shares, returning one share and the last
    /// share, which also carries the remainder: `10.00` in 11 parts is
    /// ten shares of `0.90` plus one of `1.00`.
    pub fn split(self, parts: u32) -> (Amount, Amount) {
        let share = self.divide(Amount::new(i64::from(parts), 0));
        let others = share.multiply(Amount::new(i64::from(parts) - 1, 0));
        (share, self.subtract(others))
    }

    /// Change the exponent. Scaling down truncates towards zero.
    pub fn rescale(self, exp: u32) -> Amount {
        self.checked_rescale(exp)
            .unwrap_or_else(|| overflow("rescale"))
    }

    pub fn checked_rescale(self, exp: u32) -> Option<Amount> {
        match exp.cmp(&self.exp) {
            Ordering::Equal => Some(self),
            Ordering::Greater => {
                if self.value == 0 {
                    return Some(Amount::zero(exp));
                }
                let v = (self.value as i128).checked_mul(pow10(exp - self.exp)?)?;
                Some(Amount::new(i64::try_from(v).ok()?, exp))
            }
            Ordering::Less => {
                let v = match pow10(self.exp - exp) {
                    Some(p) => self.value as i128 / p,
                    None => 0,
                };
                // |v| <= |self.value|
                Some(Amount::new(v as i64, exp))
            }
        }
    }

    /// Reduce to `exp` decimal places using `rule`. Increasing the exponent
    /// is exact and ignores the rule.
    pub fn round(self, exp: u32, rule: Rounding) -> Amount {
        self.checked_round(exp, rule)
            .unwrap_or_else(|| overflow("round"))
    }

    pub fn checked_round(self, exp: u32, rule: Rounding) -> Option<Amount> {
        if exp >= self.exp {
            return self.checked_rescale(exp);
        }
        if let Ok(d) = Decimal::try_from_i128_with_scale(i128::from(self.value), self.exp) {
            let mut r = d.round_dp_with_strategy(exp, rule.strategy());
            r.rescale(exp);
            return Some(Amount::new(i64::try_from(r.mantissa()).ok()?, exp));
        }
        let Some(p) = pow10(self.exp - exp) else {
            return Some(Amount::zero(exp));
        };
        let q = rule.apply(i128::from(self.value), p);
        Some(Amount::new(i64::try_from(q).ok()?, exp))
    }

    /// Rescale to the other amount's exponent, but only if it is higher.
    pub fn match_precision(self, other: Amount) -> Amount {
        self.checked_match_precision(other)
            .unwrap_or_else(|| overflow("rescale"))
    }

    pub fn checked_match_precision(self, other: Amount) -> Option<Amount> {
        if other.exp > self.exp {
            self.checked_rescale(other.exp)
        } else {
            Some(self)
        }
    }

    /// Add `accuracy` decimal places.
    pub fn upscale(self, accuracy: u32) -> Amount {
        self.rescale(self.exp + accuracy)
    }

    /// Drop up to `accuracy` decimal places, stopping at zero.
    pub fn downscale(self, accuracy: u32) -> Amount {
        self.rescale(self.exp.saturating_sub(accuracy))
    }

    /// Take out a percentage that was previously applied to this amount.
    pub fn remove(self, percent: Percentage) -> Amount {
        self.subtract(percent.from(self))
    }

    pub fn checked_remove(self, percent: Percentage) -> Option<Amount> {
        self.checked_subtract(percent.checked_from(self)?)
    }

    /// Same value with the sign flipped.
    pub fn invert(self) -> Amount {
        Amount::new(-self.value, self.exp)
    }

    pub fn abs(self) -> Amount {
        Amount::new(self.value.abs(), self.exp)
    }

    /// Numeric comparison across exponents.
    pub fn compare(&self, other: &Amount) -> Ordering {
        match self.exp.cmp(&other.exp) {
            Ordering::Equal => self.value.cmp(&other.value),
            Ordering::Less => cmp_upscaled(self.value, other.exp - self.exp, other.value),
            Ordering::Greater => {
                cmp_upscaled(other.value, self.exp - other.exp, self.value).reverse()
            }
        }
    }

    /// The same number with trailing zero decimals removed.
    pub fn normalize(self) -> Amount {
        let mut a = self;
        while a.exp > 0 && a.value % 10 == 0 {
            a.value /= 10;
            a.exp -= 1;
        }
        if a.value == 0 {
            a.exp = 0;
        }
        a
    }

    /// Text without trailing zeros or a dangling `.`: `123.000` is `123`.
    pub fn minimal_string(&self) -> String {
        self.normalize().to_string()
    }

    /// Approximate floating point value. Only for display or statistics.
    pub fn to_f64(&self) -> f64 {
        self.value as f64 / 10f64.powi(self.exp as i32)
    }

    /// Sum using the exponent of the first amount; zero if empty.
    pub fn sum<I>(amounts: I) -> Amount
    where
        I: IntoIterator<Item = Amount>,
    {
        let mut iter = amounts.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first, Amount::add),
            None => Amount::default(),
        }
    }
}

/// Compare `small × 10^shift` with `big`, without overflowing.
fn cmp_upscaled(small: i64, shift: u32, big: i64) -> Ordering {
    let scaled = pow10(shift).and_then(|p| (small as i128).checked_mul(p));
    match scaled {
        Some(v) => v.cmp(&(big as i128)),
        None if small == 0 => 0.cmp(&big),
        // beyond i128 the magnitude exceeds any i64
        None => small.cmp(&0),
    }
}

#[track_caller]
fn overflow(op: &str) -> ! {
    panic!("attempt to {op} amount with overflow")
}

/// Write `value × 10^-exp` with exactly `exp` decimals.
pub(crate) fn write_decimal(f: &mut fmt::Formatter<'_>, value: i128, exp: u32) -> fmt::Result {
    if value < 0 {
        f.write_str("-")?;
    }
    let digits = value.unsigned_abs().to_string();
    let exp = exp as usize;
    if exp == 0 {
        return f.write_str(&digits);
    }
    if digits.len() <= exp {
        f.write_str("0.")?;
        for _ in digits.len()..exp {
            f.write_str("0")?;
        }
        f.write_str(&digits)
    } else {
        let (major, minor) = digits.split_at(digits.len() - exp);
        write!(f, "{major}.{minor}")
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_decimal(f, self.value as i128, self.exp)
    }
}

impl FromStr for Amount {
    type Err = ParseError;

    /// Parse a plain decimal: optional `-`, digits, optional `.` and digits.
    /// The number of fraction digits becomes the exponent.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let mut parts = body.split('.');
        let major = parts.next().unwrap_or_default();
        let minor = parts.next();
        if parts.next().is_some() {
            return Err(ParseError::MultipleSeparators(s.to_string()));
        }
        if !is_digits(major) {
            return Err(ParseError::InvalidMajor(s.to_string()));
        }
        if let Some(minor) = minor {
            if !is_digits(minor) {
                return Err(ParseError::InvalidMinor(s.to_string()));
            }
        }

        let exp = u32::try_from(minor.map_or(0, str::len))
            .map_err(|_| ParseError::Overflow(s.to_string()))?;
        let mut v: i128 = 0;
        for b in major.bytes().chain(minor.unwrap_or_default().bytes()) {
            v = v
                .checked_mul(10)
                .and_then(|v| v.checked_add(i128::from(b - b'0')))
                .ok_or_else(|| ParseError::Overflow(s.to_string()))?;
        }
        if negative {
            v = -v;
        }
        let value = i64::try_from(v).map_err(|_| ParseError::Overflow(s.to_string()))?;
        Ok(Amount::new(value, exp))
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Amount {}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for Amount {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let n = self.normalize();
        n.value.hash(state);
        n.exp.hash(state);
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount::add(self, rhs)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        self.subtract(rhs)
    }
}

impl Mul for Amount {
    type Output = Amount;

    fn mul(self, rhs: Amount) -> Amount {
        self.multiply(rhs)
    }
}

impl Div for Amount {
    type Output = Amount;

    fn div(self, rhs: Amount) -> Amount {
        self.divide(rhs)
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        self.invert()
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = Amount::add(*self, rhs);
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        *self = self.subtract(rhs);
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        Amount::sum(iter)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        Amount::sum(iter.copied())
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::new(value, 0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        v.parse()
            .map_err(|e| E::custom(format!("decoding string `{v}`: {e}")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount::new(v, 0))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        i64::try_from(v)
            .map(|v| Amount::new(v, 0))
            .map_err(|_| E::custom(format!("amount out of range '{v}'")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::default())
    }
}
