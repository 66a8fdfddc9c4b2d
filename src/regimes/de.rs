//! Germany: Umsatzsteuer with its standard and reduced rate history.

use super::date;
use crate::bill::SCHEMA_INVOICE;
use crate::core::{Code, Key};
use crate::num::{Percentage, Rounding};
use crate::tax::{
    CATEGORY_VAT, CategoryDef, CorrectionDefinition, CorrectionSet, KEY_EXEMPT, KEY_STANDARD,
    KEY_ZERO, KeyDef, RATE_GENERAL, RATE_REDUCED, RateDef, RateValueDef, RegimeDef,
};

pub fn new() -> RegimeDef {
    RegimeDef::new(Code::from_static("DE"), Code::from_static("EUR"), "Germany")
        .with_time_zone("Europe/Berlin")
        .with_rounding(Rounding::HalfUp)
        .with_category(vat())
        .with_corrections(CorrectionSet::new(vec![CorrectionDefinition {
            types: vec![Key::from_static("credit-note"), Key::from_static("corrective")],
            ..CorrectionDefinition::new(SCHEMA_INVOICE)
        }]))
}

fn vat() -> CategoryDef {
    let standard = [KEY_STANDARD];
    let mut cat = CategoryDef::new(CATEGORY_VAT, "USt").with_title("Umsatzsteuer");
    cat.description = "German value added tax.".into();
    cat.with_key(KeyDef::new(KEY_STANDARD, "Standard"))
        .with_key(KeyDef::new(KEY_ZERO, "Zero"))
        .with_key(KeyDef::new(KEY_EXEMPT, "Exempt").no_percent())
        .with_rate(
            RateDef::new(RATE_GENERAL, "Regelsteuersatz")
                .with_keys(&standard)
                .with_value(RateValueDef::new(date(2021, 1, 1), Percentage::new(19, 2)))
                // Temporary reduction from July to December 2020.
                .with_value(RateValueDef::new(date(2020, 7, 1), Percentage::new(16, 2)))
                .with_value(RateValueDef::new(date(2007, 1, 1), Percentage::new(19, 2)))
                .with_value(RateValueDef::new(date(1993, 1, 1), Percentage::new(16, 2))),
        )
        .with_rate(
            RateDef::new(RATE_REDUCED, "Ermäßigter Steuersatz")
                .with_keys(&standard)
                .with_value(RateValueDef::new(date(2021, 1, 1), Percentage::new(7, 2)))
                .with_value(RateValueDef::new(date(2020, 7, 1), Percentage::new(5, 2)))
                .with_value(RateValueDef::new(date(1983, 7, 1), Percentage::new(7, 2))),
        )
        .with_rate(
            RateDef::new(Key::from_static("zero"), "Nullsatz")
                .with_keys(&[KEY_ZERO])
                .with_value(RateValueDef::always(Percentage::new(0, 2))),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::Extensions;

    fn rate_on(rate: &Key, y: i32, m: u32, d: u32) -> String {
        vat()
            .resolve(&KEY_STANDARD, rate, date(y, m, d), &Extensions::new())
            .map(|v| v.percent.to_string())
            .unwrap_or_else(|e| e.to_string())
    }

    #[test]
    fn standard_rate_history() {
        assert_eq!(rate_on(&RATE_GENERAL, 2006, 12, 31), "16%");
        assert_eq!(rate_on(&RATE_GENERAL, 2019, 3, 1), "19%");
        assert_eq!(rate_on(&RATE_GENERAL, 2020, 7, 1), "16%");
        assert_eq!(rate_on(&RATE_GENERAL, 2020, 12, 31), "16%");
        assert_eq!(rate_on(&RATE_GENERAL, 2021, 1, 1), "19%");
        assert!(rate_on(&RATE_GENERAL, 1992, 1, 1).contains("unavailable"));
    }

    #[test]
    fn reduced_rate_history() {
        assert_eq!(rate_on(&RATE_REDUCED, 2020, 6, 30), "7%");
        assert_eq!(rate_on(&RATE_REDUCED, 2020, 8, 1), "5%");
        assert_eq!(rate_on(&RATE_REDUCED, 2024, 1, 1), "7%");
    }

    #[test]
    fn registers_cleanly() {
        let reg = crate::registry::Registry::builder().register_regime_def(new()).build();
        let de = reg.regime_def(&Code::from("DE")).unwrap();
        assert_eq!(de.currency_exp(), 2);
        assert!(de.category_def(&CATEGORY_VAT).is_some());
    }
}
