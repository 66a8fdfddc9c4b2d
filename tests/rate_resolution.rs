//! Rate lookups against the bundled regimes.
//!
//! Run with: `cargo test --features regimes --test rate_resolution`

#![cfg(feature = "regimes")]

use chrono::NaiveDate;
use fiskal::FiskalError;
use fiskal::core::{Code, Key};
use fiskal::num::Percentage;
use fiskal::registry::Registry;
use fiskal::regimes::es;
use fiskal::tax::{
    CATEGORY_VAT, Combo, Extensions, KEY_STANDARD, RATE_GENERAL, RATE_REDUCED, RateDef,
    RateValueDef,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn percent_on(registry: &Registry, country: &str, combo: Combo, on: NaiveDate) -> Result<String, FiskalError> {
    let ctx = registry.context(&Code::from(country), &[])?;
    let mut combo = combo;
    combo.calculate(&ctx, on)?;
    Ok(combo.percent.map(|p| p.to_string()).unwrap_or_default())
}

#[test]
fn german_rates_follow_the_calendar() {
    let reg = Registry::bundled();
    let general = || Combo::new(CATEGORY_VAT).with_rate(RATE_GENERAL);
    let reduced = || Combo::new(CATEGORY_VAT).with_rate(RATE_REDUCED);

    let cases = [
        (date(2006, 12, 31), "16%", "7%"),
        (date(2007, 1, 1), "19%", "7%"),
        (date(2020, 6, 30), "19%", "7%"),
        (date(2020, 7, 1), "16%", "5%"),
        (date(2020, 12, 31), "16%", "5%"),
        (date(2021, 1, 1), "19%", "7%"),
        (date(2026, 10, 17), "19%", "7%"),
    ];
    for (on, std_rate, red_rate) in cases {
        assert_eq!(percent_on(&reg, "DE", general(), on).unwrap(), std_rate, "general on {on}");
        assert_eq!(percent_on(&reg, "DE", reduced(), on).unwrap(), red_rate, "reduced on {on}");
    }
}

#[test]
fn date_before_first_value_is_an_error() {
    let reg = Registry::bundled();
    let err = percent_on(&reg, "ES", Combo::new(CATEGORY_VAT).with_rate(RATE_GENERAL), date(1990, 1, 1))
        .unwrap_err();
    assert!(matches!(err, FiskalError::NoRateOnDate { ref rate, .. } if rate == "general"));
    assert_eq!(
        err.to_string(),
        "rate value unavailable for 'general' in 'VAT' on '1990-01-01'"
    );
}

#[test]
fn unknown_identifiers() {
    let reg = Registry::bundled();
    let on = date(2024, 1, 1);
    let err = percent_on(&reg, "ES", Combo::new(Code::from("XYZ")), on).unwrap_err();
    assert!(matches!(err, FiskalError::UnknownCategory { .. }));

    let err = percent_on(&reg, "ES", Combo::new(CATEGORY_VAT).with_key(Key::from("luxury")), on)
        .unwrap_err();
    assert!(matches!(err, FiskalError::UnknownKey { .. }));

    let err = percent_on(&reg, "ES", Combo::new(CATEGORY_VAT).with_rate(Key::from("luxury")), on)
        .unwrap_err();
    assert!(matches!(err, FiskalError::UnknownRate { .. }));

    let err = percent_on(&reg, "XX", Combo::new(CATEGORY_VAT), on).unwrap_err();
    assert!(matches!(err, FiskalError::RegimeNotFound(_)));
}

#[test]
fn foreign_country_combo_uses_that_regime() {
    let reg = Registry::bundled();
    let combo = Combo::new(CATEGORY_VAT)
        .with_rate(RATE_GENERAL)
        .with_country(Code::from("DE"));
    assert_eq!(percent_on(&reg, "ES", combo, date(2020, 8, 1)).unwrap(), "16%");

    let same = Combo::new(CATEGORY_VAT)
        .with_rate(RATE_GENERAL)
        .with_country(Code::from("ES"));
    let ctx = reg.context(&Code::from("ES"), &[]).unwrap();
    let mut same = same;
    same.calculate(&ctx, date(2024, 1, 1)).unwrap();
    assert!(same.country.is_empty());
}

#[test]
fn exempt_keys_clear_the_percent() {
    let reg = Registry::bundled();
    let combo = Combo::new(CATEGORY_VAT)
        .with_key(Key::from("exempt"))
        .with_percent(Percentage::new(21, 2));
    assert_eq!(percent_on(&reg, "ES", combo, date(2024, 1, 1)).unwrap(), "");
}

#[test]
fn manual_percent_without_rate_is_kept() {
    let reg = Registry::bundled();
    let combo = Combo::new(es::CATEGORY_IGIC).with_percent(Percentage::new(95, 3));
    assert_eq!(percent_on(&reg, "ES", combo, date(2024, 1, 1)).unwrap(), "9.5%");
}

#[test]
fn conditional_values_win_on_matching_extensions() {
    let zone = Key::from("es-zone");
    let rate = RateDef::new(RATE_GENERAL, "General")
        .with_keys(&[KEY_STANDARD])
        .with_value(RateValueDef::new(date(2012, 9, 1), Percentage::new(21, 2)))
        .with_value(
            RateValueDef::new(date(2019, 1, 1), Percentage::new(7, 2))
                .with_ext(Extensions::new().with(zone.clone(), "IC")),
        );

    let canary = Extensions::new().with(zone.clone(), "IC");
    let mainland = Extensions::new().with(zone, "M");
    assert_eq!(rate.value(date(2020, 1, 1), &canary).unwrap().percent.to_string(), "7%");
    assert_eq!(rate.value(date(2018, 1, 1), &canary).unwrap().percent.to_string(), "21%");
    assert_eq!(rate.value(date(2020, 1, 1), &mainland).unwrap().percent.to_string(), "21%");
    assert_eq!(rate.value(date(2020, 1, 1), &Extensions::new()).unwrap().percent.to_string(), "21%");
}

#[test]
fn disabled_rate_stops_resolving() {
    let rate = RateDef::new(RATE_REDUCED, "Reduced")
        .with_value(RateValueDef::disabled_since(date(2023, 1, 1)))
        .with_value(RateValueDef::new(date(2010, 1, 1), Percentage::new(10, 2)));
    assert!(rate.value(date(2022, 12, 31), &Extensions::new()).is_some());
    assert!(rate.value(date(2023, 1, 1), &Extensions::new()).is_none());
}

#[test]
fn regime_definitions_serialize() {
    let reg = Registry::bundled();
    let de = reg.regime_def(&Code::from("DE")).unwrap();
    let json = serde_json::to_value(de).unwrap();
    assert_eq!(json["country"], "DE");
    assert_eq!(json["currency"], "EUR");
    assert_eq!(json["rounding"], "half_up");
    let rates = &json["categories"][0]["rates"][0]["values"];
    assert_eq!(rates[0]["since"], "2021-01-01");
    assert_eq!(rates[0]["percent"], "19%");
}
