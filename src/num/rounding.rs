use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

/// How an amount is reduced to fewer decimal places.
///
/// Arithmetic on [`Amount`](super::Amount) always truncates; a rule is only
/// applied through [`Amount::round`](super::Amount::round).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Drop the extra digits (towards zero).
    Truncate,
    /// Half away from zero: `1.25` becomes `1.3`, `-1.25` becomes `-1.3`.
    #[default]
    HalfUp,
    /// Half to the nearest even digit: `1.25` becomes `1.2`, `1.35` becomes `1.4`.
    HalfEven,
}

impl Rounding {
    /// The equivalent `rust_decimal` strategy.
    pub fn strategy(self) -> RoundingStrategy {
        match self {
            Rounding::Truncate => RoundingStrategy::ToZero,
            Rounding::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Rounding::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }

    /// Divide `value` by `divisor` (a power of ten) applying the rule. Only
    /// used beyond the 28 decimal places a `Decimal` holds.
    pub(crate) fn apply(self, value: i128, divisor: i128) -> i128 {
        let q = value / divisor;
        let r = (value % divisor).abs();
        let step = value.signum();
        match self {
            Rounding::Truncate => q,
            Rounding::HalfUp if r * 2 >= divisor => q + step,
            Rounding::HalfEven if r * 2 > divisor || (r * 2 == divisor && q % 2 != 0) => q + step,
            _ => q,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_rules() {
        assert_eq!(Rounding::Truncate.apply(129, 10), 12);
        assert_eq!(Rounding::HalfUp.apply(125, 10), 13);
        assert_eq!(Rounding::HalfUp.apply(124, 10), 12);
        assert_eq!(Rounding::HalfUp.apply(-125, 10), -13);
        assert_eq!(Rounding::HalfEven.apply(125, 10), 12);
        assert_eq!(Rounding::HalfEven.apply(126, 10), 13);
        assert_eq!(Rounding::HalfEven.apply(-135, 10), -14);
        assert_eq!(Rounding::HalfEven.apply(-125, 10), -12);
    }

    #[test]
    fn integer_path_agrees_with_decimal() {
        use rust_decimal::Decimal;
        for rule in [Rounding::Truncate, Rounding::HalfUp, Rounding::HalfEven] {
            for v in [-1351i64, -1250, -1249, 0, 5, 1249, 1250, 1251, 1350, 99_999] {
                let d = Decimal::new(v, 2).round_dp_with_strategy(0, rule.strategy());
                assert_eq!(rule.apply(i128::from(v), 100), d.mantissa(), "{rule:?} {v}");
            }
        }
    }

    #[test]
    fn serde_names() {
        assert_eq!(serde_json::to_string(&Rounding::HalfEven).unwrap(), r#""half_even""#);
        let r: Rounding = serde_json::from_str(r#""truncate""#).unwrap();
        assert_eq!(r, Rounding::Truncate);
    }
}
