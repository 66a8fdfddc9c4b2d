//! EN 16931: the European semantic model for electronic invoices.
//!
//! Every VAT-like combo gets a UNTDID 5305 tax category code derived from
//! its tax key, which the format converters need for BT-151 and BT-118.

use crate::bill::{Invoice, SCHEMA_INVOICE};
use crate::core::{Code, Key, Note, ValidationError};
use crate::registry::{Normalizer, Validator};
use crate::tax::{
    AddonDef, CATEGORY_GST, CATEGORY_VAT, Combo, ExtensionDef, KEY_EXEMPT, KEY_EXPORT,
    KEY_INTRA_COMMUNITY, KEY_OUTSIDE_SCOPE, KEY_REVERSE_CHARGE, KEY_STANDARD, KEY_ZERO, Scenario,
    ScenarioSet,
};

pub const KEY: Key = Key::from_static("eu-en16931-v2017");

/// UNTDID 5305 duty or tax category code.
pub const EXT_TAX_CATEGORY: Key = Key::from_static("untdid-tax-category");

pub const TAX_CATEGORY_STANDARD: Code = Code::from_static("S");
pub const TAX_CATEGORY_ZERO: Code = Code::from_static("Z");
pub const TAX_CATEGORY_EXEMPT: Code = Code::from_static("E");
pub const TAX_CATEGORY_REVERSE_CHARGE: Code = Code::from_static("AE");
pub const TAX_CATEGORY_INTRA_COMMUNITY: Code = Code::from_static("K");
pub const TAX_CATEGORY_EXPORT: Code = Code::from_static("G");
pub const TAX_CATEGORY_OUTSIDE_SCOPE: Code = Code::from_static("O");
pub const TAX_CATEGORY_IGIC: Code = Code::from_static("L");
pub const TAX_CATEGORY_IPSI: Code = Code::from_static("M");

pub fn new() -> AddonDef {
    AddonDef::new(KEY, "EN 16931-1:2017")
        .with_extension(tax_category_def())
        .with_scenarios(
            ScenarioSet::new(SCHEMA_INVOICE).with(Scenario {
                name: "reverse charge".into(),
                ext_key: EXT_TAX_CATEGORY,
                ext_value: TAX_CATEGORY_REVERSE_CHARGE.into(),
                note: Some(
                    Note::new(Key::from_static("legal"), "Reverse charge").with_src(KEY),
                ),
                ..Default::default()
            }),
        )
        .with_normalizer(Normalizer::new().with(normalize_combo))
        .with_validator(
            Validator::new()
                .with(validate_combo)
                .with(validate_invoice),
        )
}

fn tax_category_def() -> ExtensionDef {
    ExtensionDef::new(EXT_TAX_CATEGORY, "UNTDID 5305 Tax Category")
        .with_code(TAX_CATEGORY_STANDARD, "Standard rate")
        .with_code(TAX_CATEGORY_ZERO, "Zero rated goods")
        .with_code(TAX_CATEGORY_EXEMPT, "Exempt from tax")
        .with_code(TAX_CATEGORY_REVERSE_CHARGE, "VAT Reverse Charge")
        .with_code(TAX_CATEGORY_INTRA_COMMUNITY, "VAT exempt for EEA intra-community supply")
        .with_code(TAX_CATEGORY_EXPORT, "Free export item, tax not charged")
        .with_code(TAX_CATEGORY_OUTSIDE_SCOPE, "Services outside scope of tax")
        .with_code(TAX_CATEGORY_IGIC, "Canary Islands general indirect tax")
        .with_code(TAX_CATEGORY_IPSI, "Tax for production, services and importation in Ceuta and Melilla")
}

fn handles(combo: &Combo) -> bool {
    combo.category == CATEGORY_VAT || combo.category == CATEGORY_GST
}

/// The category code implied by the combo's tax key.
pub fn tax_category_for(combo: &Combo) -> Option<Code> {
    match combo.category.as_str() {
        "IGIC" => return Some(TAX_CATEGORY_IGIC),
        "IPSI" => return Some(TAX_CATEGORY_IPSI),
        _ if !handles(combo) => return None,
        _ => {}
    }
    let key = &combo.key;
    let code = if key.is_empty() || *key == KEY_STANDARD {
        match combo.percent {
            Some(p) if p.is_zero() => TAX_CATEGORY_ZERO,
            _ => TAX_CATEGORY_STANDARD,
        }
    } else if *key == KEY_ZERO {
        TAX_CATEGORY_ZERO
    } else if *key == KEY_EXEMPT {
        TAX_CATEGORY_EXEMPT
    } else if *key == KEY_REVERSE_CHARGE {
        TAX_CATEGORY_REVERSE_CHARGE
    } else if *key == KEY_INTRA_COMMUNITY {
        TAX_CATEGORY_INTRA_COMMUNITY
    } else if *key == KEY_EXPORT {
        TAX_CATEGORY_EXPORT
    } else if *key == KEY_OUTSIDE_SCOPE {
        TAX_CATEGORY_OUTSIDE_SCOPE
    } else {
        return None;
    };
    Some(code)
}

/// Set the category code unless one was given explicitly.
fn normalize_combo(combo: &mut Combo) {
    if combo.ext.get(&EXT_TAX_CATEGORY).is_some() {
        return;
    }
    if let Some(code) = tax_category_for(combo) {
        combo.ext.set(EXT_TAX_CATEGORY, code);
    }
}

fn validate_combo(combo: &Combo) -> Vec<ValidationError> {
    let field = format!("ext.{EXT_TAX_CATEGORY}");
    let Some(code) = combo.ext.get(&EXT_TAX_CATEGORY).map(|v| v.code()) else {
        if tax_category_for(combo).is_some() || handles(combo) {
            return vec![ValidationError::with_rule(
                field,
                "line VAT category code (BT-151) is required",
                "BR-CO-04",
            )];
        }
        return Vec::new();
    };
    let zero = combo.percent.is_none_or(|p| p.is_zero());
    if code == TAX_CATEGORY_STANDARD && zero {
        return vec![ValidationError::with_rule(
            "percent",
            "standard rate (S) category must have a non-zero rate",
            "BR-S-05",
        )];
    }
    if code == TAX_CATEGORY_ZERO && !zero {
        return vec![ValidationError::with_rule(
            "percent",
            "zero-rated (Z) category must have rate 0",
            "BR-Z-05",
        )];
    }
    Vec::new()
}

fn validate_invoice(inv: &Invoice) -> Vec<ValidationError> {
    let reverse_charge = inv
        .lines
        .iter()
        .flat_map(|l| &l.taxes)
        .any(|c| c.ext.get(&EXT_TAX_CATEGORY).is_some_and(|v| v.code() == TAX_CATEGORY_REVERSE_CHARGE));
    let customer_id = inv.customer.as_ref().and_then(|c| c.tax_id.as_ref());
    if reverse_charge && customer_id.is_none_or(|id| id.code.is_empty()) {
        return vec![ValidationError::with_rule(
            "customer.tax_id",
            "reverse charge: customer must have a VAT ID (BT-48)",
            "BR-AE-02",
        )];
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::Percentage;

    fn vat(key: Key) -> Combo {
        Combo::new(CATEGORY_VAT).with_key(key)
    }

    #[test]
    fn category_from_key() {
        assert_eq!(tax_category_for(&vat(Key::EMPTY)), Some(TAX_CATEGORY_STANDARD));
        assert_eq!(
            tax_category_for(&vat(Key::EMPTY).with_percent(Percentage::new(0, 2))),
            Some(TAX_CATEGORY_ZERO)
        );
        assert_eq!(tax_category_for(&vat(KEY_REVERSE_CHARGE)), Some(TAX_CATEGORY_REVERSE_CHARGE));
        assert_eq!(tax_category_for(&vat(KEY_INTRA_COMMUNITY)), Some(TAX_CATEGORY_INTRA_COMMUNITY));
        assert_eq!(tax_category_for(&vat(Key::from("unknown"))), None);
        assert_eq!(tax_category_for(&Combo::new(Code::from("IRPF"))), None);
        assert_eq!(tax_category_for(&Combo::new(Code::from("IGIC"))), Some(TAX_CATEGORY_IGIC));
    }

    #[test]
    fn explicit_code_is_kept() {
        let mut c = vat(KEY_STANDARD).with_ext(EXT_TAX_CATEGORY, "E");
        normalize_combo(&mut c);
        assert_eq!(c.ext.get(&EXT_TAX_CATEGORY).unwrap(), &"E");
    }

    #[test]
    fn combo_rules() {
        let mut c = vat(KEY_STANDARD);
        normalize_combo(&mut c);
        let errs = validate_combo(&c);
        assert_eq!(errs[0].rule.as_deref(), Some("BR-S-05"));

        let c = vat(KEY_STANDARD).with_percent(Percentage::new(21, 2));
        let errs = validate_combo(&c);
        assert_eq!(errs[0].field, "ext.untdid-tax-category");
        assert_eq!(errs[0].rule.as_deref(), Some("BR-CO-04"));

        let c = vat(KEY_ZERO)
            .with_percent(Percentage::new(5, 2))
            .with_ext(EXT_TAX_CATEGORY, "Z");
        assert_eq!(validate_combo(&c)[0].rule.as_deref(), Some("BR-Z-05"));

        assert!(validate_combo(&Combo::new(Code::from("IRPF"))).is_empty());
    }
}
