//! End-to-end invoice processing with the bundled regimes and addons.
//!
//! Run with: `cargo test --features all --test bill_tests`

#![cfg(feature = "addons")]

use chrono::NaiveDate;
use fiskal::FiskalError;
use fiskal::addons::eu_en16931::{self, EXT_TAX_CATEGORY};
use fiskal::bill::{Invoice, InvoiceBuilder, InvoiceType, LineBuilder, PartyBuilder, Totals};
use fiskal::core::{Code, Key};
use fiskal::num::Amount;
use fiskal::registry::Registry;
use fiskal::regimes::es;
use fiskal::tax::{CATEGORY_VAT, Combo, KEY_REVERSE_CHARGE, RATE_GENERAL, RATE_REDUCED};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn amt(s: &str) -> Amount {
    s.parse().unwrap()
}

fn vat(rate: Key) -> Combo {
    Combo::new(CATEGORY_VAT).with_rate(rate)
}

fn spanish_invoice() -> InvoiceBuilder {
    InvoiceBuilder::new("ES", "SAMPLE-001", date(2024, 2, 13))
        .supplier(PartyBuilder::new("Provide One S.L.").tax_id("ES", "B98602642").build())
        .customer(PartyBuilder::new("Sample Consumer").tax_id("ES", "54387763P").build())
}

fn render(t: &Totals) -> String {
    let mut out = Vec::new();
    for ct in &t.taxes.categories {
        for rt in &ct.rates {
            let pct = rt.percent.map(|p| p.to_string()).unwrap_or_else(|| "-".into());
            out.push(format!("{} {} {} {} {}", ct.code, rt.key, pct, rt.base, rt.amount));
        }
    }
    out.push(format!(
        "sum {} tax {} with_tax {} payable {}",
        t.sum, t.tax, t.total_with_tax, t.payable
    ));
    out.join("\n")
}

#[test]
fn freelancer_invoice_with_irpf() {
    let inv = spanish_invoice()
        .add_line(
            LineBuilder::new("Development services", amt("20"), amt("90.00"))
                .unit("h")
                .tax(vat(RATE_GENERAL))
                .tax(Combo::new(es::CATEGORY_IRPF).with_rate(es::RATE_PRO))
                .build(),
        )
        .add_line(
            LineBuilder::new("Printed manual", amt("2"), amt("12.35"))
                .tax(vat(RATE_REDUCED))
                .build(),
        )
        .build(&Registry::bundled())
        .unwrap();

    insta::assert_snapshot!(render(inv.totals.as_ref().unwrap()), @r"
    VAT standard 21% 1800.00 378.00
    VAT standard 10% 24.70 2.47
    IRPF  15% 1800.00 270.00
    sum 1824.70 tax 380.47 with_tax 2205.17 payable 1935.17
    ");
}

#[test]
fn equivalence_surcharge_is_added_to_tax() {
    let inv = spanish_invoice()
        .add_line(
            LineBuilder::new("Goods for resale", amt("10"), amt("10.00"))
                .tax(vat(RATE_GENERAL.with(&es::RATE_EQUIVALENCE)))
                .build(),
        )
        .build(&Registry::bundled())
        .unwrap();
    let t = inv.totals.unwrap();
    let vat = t.taxes.category(&CATEGORY_VAT).unwrap();
    assert_eq!(vat.amount.to_string(), "21.00");
    assert_eq!(vat.surcharge.unwrap().to_string(), "5.20");
    assert_eq!(t.tax.to_string(), "26.20");
    assert_eq!(t.payable.to_string(), "126.20");
}

#[test]
fn en16931_sets_tax_category_codes() {
    let inv = spanish_invoice()
        .addon(eu_en16931::KEY)
        .add_line(
            LineBuilder::new("Standard", amt("1"), amt("10.00"))
                .tax(vat(Key::from("standard")))
                .build(),
        )
        .add_line(
            LineBuilder::new("Zero", amt("1"), amt("10.00"))
                .tax(vat(Key::from("zero")))
                .build(),
        )
        .add_line(
            LineBuilder::new("Exempt", amt("1"), amt("10.00"))
                .tax(vat(Key::from("exempt")))
                .build(),
        )
        .build(&Registry::bundled())
        .unwrap();

    let codes: Vec<String> = inv
        .lines
        .iter()
        .map(|l| l.taxes[0].ext.get(&EXT_TAX_CATEGORY).unwrap().to_string())
        .collect();
    assert_eq!(codes, ["S", "Z", "E"]);
    assert_eq!(inv.lines[0].taxes[0].rate, RATE_GENERAL);
    assert_eq!(inv.lines[1].taxes[0].percent.unwrap().to_string(), "0%");
    assert!(inv.lines[2].taxes[0].percent.is_none());
}

#[test]
fn reverse_charge_scenario_and_rules() {
    let build = |customer_id: bool| {
        let customer = match customer_id {
            true => PartyBuilder::new("EU Customer").tax_id("PT", "545259045"),
            false => PartyBuilder::new("EU Customer"),
        };
        InvoiceBuilder::new("ES", "RC-1", date(2024, 2, 13))
            .supplier(PartyBuilder::new("Provide One S.L.").tax_id("ES", "B98602642").build())
            .customer(customer.build())
            .addon(eu_en16931::KEY)
            .tag("reverse-charge")
            .add_line(
                LineBuilder::new("Consulting", amt("1"), amt("500.00"))
                    .tax(Combo::new(CATEGORY_VAT).with_key(KEY_REVERSE_CHARGE))
                    .build(),
            )
            .build(&Registry::bundled())
    };

    let inv = build(true).unwrap();
    let notes: Vec<(String, String, String)> = inv
        .notes
        .iter()
        .map(|n| (n.src.to_string(), n.code.clone(), n.text.clone()))
        .collect();
    let expected = vec![
        (
            "es".to_string(),
            String::new(),
            "Reverse Charge / Inversión del sujeto pasivo.".to_string(),
        ),
        (eu_en16931::KEY.to_string(), "AE".to_string(), "Reverse charge".to_string()),
    ];
    assert_eq!(notes, expected);
    let t = inv.totals.unwrap();
    assert_eq!(t.tax.to_string(), "0.00");
    assert_eq!(t.payable.to_string(), "500.00");

    let FiskalError::Validation(errs) = build(false).unwrap_err() else {
        panic!("expected validation errors");
    };
    let rules: Vec<_> = errs.iter().filter_map(|e| e.rule.as_deref()).collect();
    assert_eq!(rules, ["BR-AE-02"]);
}

#[test]
fn undefined_extension_is_rejected() {
    let err = spanish_invoice()
        .add_line(
            LineBuilder::new("Item", amt("1"), amt("1.00"))
                .tax(vat(RATE_GENERAL).with_ext(Key::from("es-zone"), "IC"))
                .build(),
        )
        .build(&Registry::bundled())
        .unwrap_err();
    let FiskalError::Validation(errs) = err else {
        panic!("expected validation errors");
    };
    assert!(errs.has_field("lines[0].taxes[0].ext.es-zone"));
}

#[test]
fn invalid_extension_code_is_rejected() {
    let err = spanish_invoice()
        .addon(eu_en16931::KEY)
        .add_line(
            LineBuilder::new("Item", amt("1"), amt("1.00"))
                .tax(vat(RATE_GENERAL).with_ext(EXT_TAX_CATEGORY, "XX"))
                .build(),
        )
        .build(&Registry::bundled())
        .unwrap_err();
    let FiskalError::Validation(errs) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(
        errs.by_field()["lines[0].taxes[0].ext.untdid-tax-category"],
        ["code 'XX' invalid"]
    );
}

#[test]
fn german_invoice_during_temporary_reduction() {
    let registry = Registry::bundled();
    let build = |on: NaiveDate| {
        InvoiceBuilder::new("DE", "RE-2020-07", on)
            .kind(InvoiceType::Standard)
            .supplier(PartyBuilder::new("ACME GmbH").tax_id("DE", "DE123456789").build())
            .add_line(
                LineBuilder::new("Beratung", amt("10"), amt("150.00"))
                    .tax(vat(RATE_GENERAL))
                    .build(),
            )
            .add_line(
                LineBuilder::new("Fachbuch", amt("1"), amt("39.90"))
                    .tax(vat(RATE_REDUCED))
                    .build(),
            )
            .build(&registry)
            .unwrap()
    };

    let summer = build(date(2020, 8, 15)).totals.unwrap();
    // 5% of 39.90 is 1.995, rounded half up.
    assert_eq!(summer.tax.to_string(), "242.00");
    assert_eq!(summer.payable.to_string(), "1781.90");

    let winter = build(date(2021, 2, 1)).totals.unwrap();
    assert_eq!(winter.tax.to_string(), "287.79");
    assert_eq!(winter.payable.to_string(), "1827.69");
}

#[test]
fn processed_invoice_survives_json() {
    let registry = Registry::bundled();
    let inv = spanish_invoice()
        .addon(eu_en16931::KEY)
        .add_line(
            LineBuilder::new("Item", amt("3"), amt("33.33"))
                .tax(vat(RATE_GENERAL))
                .build(),
        )
        .build(&registry)
        .unwrap();

    let json = serde_json::to_string_pretty(&inv).unwrap();
    let mut back: Invoice = serde_json::from_str(&json).unwrap();
    assert_eq!(back, inv);

    registry.process(&mut back).unwrap();
    assert_eq!(back.totals, inv.totals);
    assert_eq!(back.supplier.tax_id.unwrap().country, Code::from("ES"));
}
