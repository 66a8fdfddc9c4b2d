use serde::{Deserialize, Serialize};

use super::{Combo, Extensions, combo_for};
use crate::core::{Code, FiskalError, Key, ValidationError, ValidationErrors};
use crate::num::{Amount, Percentage, Rounding};

/// Extra decimal places kept while summing, before the final reduction to
/// the currency precision.
const WORKING_PRECISION: u32 = 2;

/// Field reported when a sum leaves the amount range.
const TOTALS_FIELD: &str = "totals.taxes";

/// Anything that carries a taxable amount and the combos applied to it.
pub trait TaxableLine {
    fn taxes(&self) -> &[Combo];
    fn total(&self) -> Amount;
}

/// Where tax amounts are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculatorKind {
    /// Sum the bases per rate, then apply the percentage once.
    #[default]
    Total,
    /// Apply the percentage to each line, then sum the tax amounts.
    Line,
}

/// Groups line bases by category and rate and applies the percentages.
///
/// Combos must already be calculated so that percentages and the retained
/// flag are known.
#[derive(Debug, Clone, Default)]
pub struct TotalCalculator {
    /// Decimal places of the document currency.
    pub currency_exp: u32,
    pub rounding: Rounding,
    /// Category whose tax is already included in line prices.
    pub includes: Option<Code>,
    pub kind: CalculatorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTotalSurcharge {
    pub percent: Percentage,
    pub amount: Amount,
}

/// Base and tax for one key, rate and percentage within a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTotal {
    #[serde(default, skip_serializing_if = "Key::is_empty")]
    pub key: Key,
    #[serde(default, skip_serializing_if = "Key::is_empty")]
    pub rate: Key,
    #[serde(default, skip_serializing_if = "Code::is_empty")]
    pub country: Code,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub ext: Extensions,
    pub base: Amount,
    /// `None` for exempt keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharge: Option<RateTotalSurcharge>,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub code: Code,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retained: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub informative: bool,
    pub rates: Vec<RateTotal>,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharge: Option<Amount>,
}

/// Tax totals of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Total {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryTotal>,
    /// Taxes added minus taxes retained. Informative categories are left out.
    pub sum: Amount,
}

impl RateTotal {
    fn matches(&self, c: &Combo) -> bool {
        self.key == c.key
            && self.rate == c.rate
            && self.country == c.country
            && self.ext == c.ext
            && self.percent == c.percent
    }
}

impl CategoryTotal {
    /// The tax amount including any surcharge.
    pub fn total(&self) -> Amount {
        match self.surcharge {
            Some(s) => self.amount.add(s),
            None => self.amount,
        }
    }

    pub fn checked_total(&self) -> Option<Amount> {
        match self.surcharge {
            Some(s) => self.amount.checked_add(s),
            None => Some(self.amount),
        }
    }
}

impl Total {
    pub fn category(&self, code: &Code) -> Option<&CategoryTotal> {
        self.categories.iter().find(|ct| &ct.code == code)
    }

    /// Sum of the retained categories, surcharges included. `None` if the
    /// sum overflows.
    pub fn retained(&self) -> Option<Amount> {
        self.categories
            .iter()
            .filter(|ct| ct.retained && !ct.informative)
            .try_fold(Amount::zero(self.sum.exp()), |acc, ct| {
                acc.checked_add(ct.checked_total()?)
            })
    }

    fn rate_total_for(&mut self, c: &Combo, zero: Amount) -> &mut RateTotal {
        let ci = match self.categories.iter().position(|ct| ct.code == c.category) {
            Some(i) => i,
            None => {
                self.categories.push(CategoryTotal {
                    code: c.category.clone(),
                    retained: c.is_retained(),
                    informative: c.is_informative(),
                    rates: Vec::new(),
                    amount: zero,
                    surcharge: None,
                });
                self.categories.len() - 1
            }
        };
        let rates = &mut self.categories[ci].rates;
        let ri = match rates.iter().position(|rt| rt.matches(c)) {
            Some(i) => i,
            None => {
                rates.push(RateTotal {
                    key: c.key.clone(),
                    rate: c.rate.clone(),
                    country: c.country.clone(),
                    ext: c.ext.clone(),
                    base: zero,
                    percent: c.percent,
                    surcharge: c.surcharge.map(|percent| RateTotalSurcharge {
                        percent,
                        amount: zero,
                    }),
                    amount: zero,
                });
                rates.len() - 1
            }
        };
        &mut rates[ri]
    }
}

impl TotalCalculator {
    pub fn new(currency_exp: u32, rounding: Rounding) -> Self {
        Self {
            currency_exp,
            rounding,
            ..Default::default()
        }
    }

    pub fn with_includes(mut self, category: Code) -> Self {
        self.includes = Some(category);
        self
    }

    pub fn with_kind(mut self, kind: CalculatorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn calculate<L: TaxableLine>(&self, lines: &[L]) -> Result<Total, FiskalError> {
        let work = self.currency_exp + WORKING_PRECISION;
        let zero = Amount::zero(work);
        let mut total = Total {
            categories: Vec::new(),
            sum: zero,
        };

        for line in lines {
            let taxes = line.taxes();
            let amount = in_range(line.total().checked_match_precision(zero))?;
            let base = self.net_base(amount, taxes)?;
            for c in taxes {
                let rt = total.rate_total_for(c, zero);
                rt.base = in_range(rt.base.checked_add(base))?;
                if self.kind == CalculatorKind::Line {
                    if let Some(p) = c.percent {
                        rt.amount = in_range(rt.amount.checked_add(in_range(p.checked_of(base))?))?;
                    }
                    if let Some(s) = rt.surcharge.as_mut() {
                        s.amount = in_range(s.amount.checked_add(in_range(s.percent.checked_of(base))?))?;
                    }
                }
            }
        }

        self.finish(&mut total, zero)?;
        Ok(total)
    }

    /// The line base with any included tax taken out.
    fn net_base(&self, amount: Amount, taxes: &[Combo]) -> Result<Amount, FiskalError> {
        let Some(code) = &self.includes else {
            return Ok(amount);
        };
        let Some(c) = combo_for(taxes, code) else {
            return Ok(amount);
        };
        if c.is_retained() {
            let err = ValidationError::new(
                "tax.prices_include",
                format!("cannot include retained category '{code}'"),
            );
            return Err(FiskalError::Validation(ValidationErrors::from(vec![err])));
        }
        match c.percent {
            Some(p) => in_range(amount.checked_remove(p)),
            None => Ok(amount),
        }
    }

    fn finish(&self, total: &mut Total, zero: Amount) -> Result<(), FiskalError> {
        let exp = self.currency_exp;
        let rule = self.rounding;
        let round = |a: Amount| in_range(a.checked_round(exp, rule));
        let mut sum = zero;
        for ct in &mut total.categories {
            let mut amount = zero;
            let mut surcharge: Option<Amount> = None;
            for rt in &mut ct.rates {
                let Some(p) = rt.percent else {
                    rt.amount = Amount::zero(exp);
                    rt.base = round(rt.base)?;
                    continue;
                };
                if self.kind == CalculatorKind::Total {
                    rt.amount = in_range(p.checked_of(rt.base))?;
                    if let Some(s) = rt.surcharge.as_mut() {
                        s.amount = in_range(s.percent.checked_of(rt.base))?;
                    }
                }
                amount = in_range(amount.checked_add(rt.amount))?;
                if let Some(s) = rt.surcharge.as_mut() {
                    surcharge = Some(in_range(surcharge.unwrap_or(zero).checked_add(s.amount))?);
                    s.amount = round(s.amount)?;
                }
                rt.base = round(rt.base)?;
                rt.amount = round(rt.amount)?;
            }

            let with_surcharge = match surcharge {
                Some(s) => in_range(amount.checked_add(s))?,
                None => amount,
            };
            if !ct.informative {
                sum = in_range(if ct.retained {
                    sum.checked_subtract(with_surcharge)
                } else {
                    sum.checked_add(with_surcharge)
                })?;
            }
            ct.amount = round(amount)?;
            ct.surcharge = surcharge.map(round).transpose()?;
        }
        total.sum = round(sum)?;
        Ok(())
    }
}

fn in_range(amount: Option<Amount>) -> Result<Amount, FiskalError> {
    amount.ok_or_else(|| {
        let err = ValidationError::new(TOTALS_FIELD, "amount out of range");
        FiskalError::Validation(ValidationErrors::from(vec![err]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::{CATEGORY_VAT, CategoryDef, KEY_EXEMPT, KEY_STANDARD};

    struct TestLine {
        total: Amount,
        taxes: Vec<Combo>,
    }

    impl TaxableLine for TestLine {
        fn taxes(&self) -> &[Combo] {
            &self.taxes
        }

        fn total(&self) -> Amount {
            self.total
        }
    }

    fn pct(s: &str) -> Percentage {
        s.parse().unwrap()
    }

    fn amt(s: &str) -> Amount {
        s.parse().unwrap()
    }

    fn vat(percent: &str) -> Combo {
        Combo::new(CATEGORY_VAT)
            .with_key(KEY_STANDARD)
            .with_percent(pct(percent))
    }

    fn irpf(percent: &str) -> Combo {
        let mut c = Combo::new(Code::from("IRPF")).with_percent(pct(percent));
        c.apply_category(&CategoryDef::new(Code::from("IRPF"), "IRPF").retained());
        c
    }

    fn line(total: &str, taxes: Vec<Combo>) -> TestLine {
        TestLine {
            total: amt(total),
            taxes,
        }
    }

    #[test]
    fn groups_by_category_and_percent() {
        let lines = [
            line("100.00", vec![vat("21%")]),
            line("50.00", vec![vat("10%")]),
            line("200.00", vec![vat("21%")]),
        ];
        let t = TotalCalculator::new(2, Rounding::HalfUp).calculate(&lines).unwrap();
        let ct = t.category(&CATEGORY_VAT).unwrap();
        assert_eq!(ct.rates.len(), 2);
        assert_eq!(ct.rates[0].base.to_string(), "300.00");
        assert_eq!(ct.rates[0].amount.to_string(), "63.00");
        assert_eq!(ct.rates[1].amount.to_string(), "5.00");
        assert_eq!(ct.amount.to_string(), "68.00");
        assert_eq!(t.sum.to_string(), "68.00");
    }

    #[test]
    fn retained_categories_are_subtracted() {
        let lines = [line("1000.00", vec![vat("21%"), irpf("15%")])];
        let t = TotalCalculator::new(2, Rounding::HalfUp).calculate(&lines).unwrap();
        assert_eq!(t.sum.to_string(), "60.00");
        assert_eq!(t.retained().unwrap().to_string(), "150.00");
        assert!(t.category(&Code::from("IRPF")).unwrap().retained);
    }

    #[test]
    fn exempt_combos_only_carry_a_base() {
        let exempt = Combo::new(CATEGORY_VAT).with_key(KEY_EXEMPT);
        let lines = [line("80.00", vec![exempt]), line("20.00", vec![vat("21%")])];
        let t = TotalCalculator::new(2, Rounding::HalfUp).calculate(&lines).unwrap();
        let ct = t.category(&CATEGORY_VAT).unwrap();
        assert_eq!(ct.rates[0].key, KEY_EXEMPT);
        assert_eq!(ct.rates[0].base.to_string(), "80.00");
        assert!(ct.rates[0].amount.is_zero());
        assert_eq!(t.sum.to_string(), "4.20");
    }

    #[test]
    fn rounding_rule_applies_on_reduction() {
        // 0.125 of tax on a 1.25 base at 10%
        let lines = [line("1.25", vec![vat("10%")])];
        let up = TotalCalculator::new(2, Rounding::HalfUp).calculate(&lines).unwrap();
        assert_eq!(up.sum.to_string(), "0.13");
        let even = TotalCalculator::new(2, Rounding::HalfEven).calculate(&lines).unwrap();
        assert_eq!(even.sum.to_string(), "0.12");
        let trunc = TotalCalculator::new(2, Rounding::Truncate).calculate(&lines).unwrap();
        assert_eq!(trunc.sum.to_string(), "0.12");
    }

    #[test]
    fn line_calculator_keeps_working_precision() {
        let lines: Vec<_> = (0..3).map(|_| line("0.05", vec![vat("10%")])).collect();
        let total = TotalCalculator::new(2, Rounding::HalfUp).calculate(&lines).unwrap();
        assert_eq!(total.sum.to_string(), "0.02");
        let by_line = TotalCalculator::new(2, Rounding::HalfUp)
            .with_kind(CalculatorKind::Line)
            .calculate(&lines)
            .unwrap();
        assert_eq!(by_line.sum.to_string(), "0.02");
        assert_eq!(by_line.categories[0].rates[0].base.to_string(), "0.15");
    }

    #[test]
    fn included_tax_is_backed_out() {
        let lines = [line("121.00", vec![vat("21%")])];
        let t = TotalCalculator::new(2, Rounding::HalfUp)
            .with_includes(CATEGORY_VAT)
            .calculate(&lines)
            .unwrap();
        let rt = &t.categories[0].rates[0];
        assert_eq!(rt.base.to_string(), "100.00");
        assert_eq!(rt.amount.to_string(), "21.00");
    }

    #[test]
    fn including_a_retained_category_fails() {
        let lines = [line("100.00", vec![irpf("15%")])];
        let err = TotalCalculator::new(2, Rounding::HalfUp)
            .with_includes(Code::from("IRPF"))
            .calculate(&lines)
            .unwrap_err();
        match err {
            FiskalError::Validation(errs) => assert!(errs.has_field("tax.prices_include")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sums_beyond_the_amount_range_fail() {
        // each base fits at working precision, their sum does not
        let big = "500000000000000.00";
        let lines = [line(big, vec![vat("21%")]), line(big, vec![vat("21%")])];
        let err = TotalCalculator::new(2, Rounding::HalfUp).calculate(&lines).unwrap_err();
        match err {
            FiskalError::Validation(errs) => assert!(errs.has_field("totals.taxes")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn surcharge_is_added_to_sum() {
        let c = vat("21%").with_surcharge(pct("5.2%"));
        let lines = [line("100.00", vec![c])];
        let t = TotalCalculator::new(2, Rounding::HalfUp).calculate(&lines).unwrap();
        let ct = &t.categories[0];
        assert_eq!(ct.surcharge.unwrap().to_string(), "5.20");
        assert_eq!(ct.total().to_string(), "26.20");
        assert_eq!(t.sum.to_string(), "26.20");
        let rt = &ct.rates[0];
        let s = rt.surcharge.as_ref().unwrap();
        insta::assert_snapshot!(
            format!("{} {} {} +{} {}", rt.key, rt.base, rt.amount, s.percent, s.amount),
            @"standard 100.00 21.00 +5.2% 5.20"
        );
    }
}
