use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::amount::write_decimal;
use super::{Amount, ParseError, pow10};

/// A ratio stored as a fraction of one.
///
/// `Percentage::new(160, 3)` is `0.160`, displayed as `16.0%`. The number of
/// decimals in the text form is always the fraction's exponent minus two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentage {
    amount: Amount,
}

impl Percentage {
    /// Build from the fraction's value and exponent.
    pub const fn new(value: i64, exp: u32) -> Self {
        Self {
            amount: Amount::new(value, exp),
        }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Wrap an amount that is already a fraction (`0.16`).
    pub const fn from_fraction(amount: Amount) -> Self {
        Self { amount }
    }

    /// Build from the human value: an amount of `16.0` gives `16.0%`.
    pub fn from_amount(amount: Amount) -> Self {
        Self::new(amount.value(), amount.exp() + 2)
    }

    /// The human value: `16.0%` gives an amount of `16.0`.
    pub fn amount(&self) -> Amount {
        let exp = self.amount.exp();
        if exp >= 2 {
            Amount::new(self.amount.value(), exp - 2)
        } else {
            Amount::new(self.amount.rescale(2).value(), 0)
        }
    }

    /// The underlying fraction.
    pub fn base(&self) -> Amount {
        self.amount
    }

    pub fn value(&self) -> i64 {
        self.amount.value()
    }

    pub fn exp(&self) -> u32 {
        self.amount.exp()
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.amount.is_negative()
    }

    pub fn is_positive(&self) -> bool {
        self.amount.is_positive()
    }

    /// The share of `amount` this percentage represents, at `amount`'s exponent.
    pub fn of(&self, amount: Amount) -> Amount {
        amount.multiply(self.amount)
    }

    pub fn checked_of(&self, amount: Amount) -> Option<Amount> {
        amount.checked_multiply(self.amount)
    }

    /// The tax component of a total that already includes this percentage:
    /// for `16%`, `116.00` gives `16.00`.
    pub fn from(&self, amount: Amount) -> Amount {
        let net = amount.divide(self.factor());
        amount.subtract(net)
    }

    /// Returns `None` on overflow or for `-100%`.
    pub fn checked_from(&self, amount: Amount) -> Option<Amount> {
        let net = amount.checked_divide(self.checked_factor()?)?;
        amount.checked_subtract(net)
    }

    /// `1 + rate`, at the percentage's exponent.
    pub fn factor(&self) -> Amount {
        let exp = self.amount.exp();
        Amount::new(1, 0).rescale(exp).add(self.amount)
    }

    pub fn checked_factor(&self) -> Option<Amount> {
        let exp = self.amount.exp();
        Amount::new(1, 0).checked_rescale(exp)?.checked_add(self.amount)
    }

    pub fn rescale(&self, exp: u32) -> Percentage {
        Percentage::from_fraction(self.amount.rescale(exp))
    }

    pub fn invert(&self) -> Percentage {
        Percentage::from_fraction(self.amount.invert())
    }

    pub fn compare(&self, other: &Percentage) -> Ordering {
        self.amount.compare(&other.amount)
    }

    /// Text without the `%` symbol: `16.00`.
    pub fn string_without_symbol(&self) -> String {
        Human(self).to_string()
    }
}

/// The human number of a percentage, before the `%`.
struct Human<'a>(&'a Percentage);

impl fmt::Display for Human<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.0.amount;
        let value = i128::from(a.value());
        match a.exp() {
            exp if exp >= 2 => write_decimal(f, value, exp - 2),
            exp => {
                let shift = pow10(2 - exp).unwrap_or(100);
                write_decimal(f, value * shift, 0)
            }
        }
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", Human(self))
    }
}

impl FromStr for Percentage {
    type Err = ParseError;

    /// `"16%"` and `"16.0%"` are human values; `"0.16"` is a fraction.
    /// The empty string is zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Percentage::zero());
        }
        match s.strip_suffix('%') {
            Some(human) => Ok(Percentage::from_amount(human.parse()?)),
            None => Ok(Percentage::from_fraction(s.parse()?)),
        }
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PercentageVisitor)
    }
}

struct PercentageVisitor;

impl<'de> Visitor<'de> for PercentageVisitor {
    type Value = Percentage;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a percentage string like \"16%\" or a fraction")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Percentage, E> {
        v.parse()
            .map_err(|e| E::custom(format!("decoding string `{v}`: {e}")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Percentage, E> {
        Ok(Percentage::new(v, 0))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Percentage, E> {
        i64::try_from(v)
            .map(|v| Percentage::new(v, 0))
            .map_err(|_| E::custom(format!("percentage out of range '{v}'")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Percentage, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Percentage, E> {
        Ok(Percentage::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basics() {
        let p = Percentage::new(1600, 4);
        assert_eq!(p.value(), 1600);
        assert_eq!(p, Percentage::new(16, 2));
        assert_eq!(p.to_string(), "16.00%");
        assert_eq!(p.string_without_symbol(), "16.00");
    }

    #[test]
    fn parse() {
        let p: Percentage = "".parse().unwrap();
        assert!(p.is_zero());

        let p: Percentage = "16.0%".parse().unwrap();
        assert_eq!((p.value(), p.exp()), (160, 3));

        let p: Percentage = "0.160".parse().unwrap();
        assert_eq!((p.value(), p.exp()), (160, 3));

        let err = "bad".parse::<Percentage>().unwrap_err();
        assert_eq!(err.to_string(), "invalid major number 'bad'");
        assert!("1.2.3%".parse::<Percentage>().is_err());
    }

    #[test]
    fn display() {
        assert_eq!(Percentage::new(200, 1).to_string(), "2000%");
        assert_eq!(Percentage::new(5, 0).to_string(), "500%");
        assert_eq!(Percentage::new(160, 3).to_string(), "16.0%");
        assert_eq!(Percentage::new(-21, 2).to_string(), "-21%");
        assert_eq!(Percentage::new(5, 3).to_string(), "0.5%");
    }

    #[test]
    fn of_and_from() {
        let p = Percentage::new(170, 3);
        assert_eq!(p.of(Amount::new(10000, 2)).to_string(), "17.00");

        let p = Percentage::new(160, 3);
        assert_eq!(p.from(Amount::new(11600, 2)).to_string(), "16.00");
        assert_eq!(p.factor().to_string(), "1.160");
        assert_eq!(p.checked_from(Amount::new(11600, 2)), Some(Amount::new(1600, 2)));
        assert_eq!(Percentage::new(-1, 0).checked_from(Amount::new(100, 2)), None);
        assert_eq!(Percentage::new(1, 19).checked_factor(), None);
        assert_eq!(Percentage::new(2, 0).checked_of(Amount::new(i64::MAX, 0)), None);
    }

    #[test]
    fn rescale_and_invert() {
        let p = Percentage::new(160, 3);
        assert_eq!(p.rescale(4).to_string(), "16.00%");
        assert_eq!(Percentage::new(20, 3).rescale(2).to_string(), "2%");
        assert_eq!(p.invert().to_string(), "-16.0%");
    }

    #[test]
    fn sign_checks() {
        assert!(Percentage::new(0, 0).is_zero());
        assert!(!Percentage::new(160, 0).is_zero());
        assert!(Percentage::new(-160, 0).is_negative());
        assert!(!Percentage::new(0, 0).is_negative());
        assert!(Percentage::new(160, 0).is_positive());
        assert!(!Percentage::new(-160, 0).is_positive());
    }

    #[test]
    fn amount_round_trip() {
        let human = Amount::new(160, 1);
        let p = Percentage::from_amount(human);
        assert_eq!(p, Percentage::new(160, 3));
        assert_eq!(p.amount().to_string(), "16.0");
        assert_eq!(Percentage::new(2, 1).amount().to_string(), "20");
    }

    #[test]
    fn json_encoding() {
        let json = serde_json::to_string(&Percentage::new(160, 3)).unwrap();
        assert_eq!(json, r#""16.0%""#);

        let p: Percentage = serde_json::from_str(r#""16.0%""#).unwrap();
        assert_eq!(p.compare(&Percentage::new(160, 3)), Ordering::Equal);
        let p: Percentage = serde_json::from_str("0.10").unwrap();
        assert_eq!(p, Percentage::new(10, 2));
        let p: Percentage = serde_json::from_str("null").unwrap();
        assert!(p.is_zero());
        let p: Option<Percentage> = serde_json::from_str("null").unwrap();
        assert!(p.is_none());

        let err = serde_json::from_str::<Percentage>(r#""bad""#).unwrap_err();
        assert!(err.to_string().contains("invalid major number 'bad'"));
    }
}
