//! Spain: IVA with equivalence surcharges, the Canary Islands IGIC and the
//! retained IRPF.

use super::date;
use crate::bill::SCHEMA_INVOICE;
use crate::core::{Code, Key, Note, ValidationError};
use crate::num::{Percentage, Rounding};
use crate::registry::{Normalizer, Validator};
use crate::tax::{
    CATEGORY_VAT, CategoryDef, CorrectionDefinition, CorrectionSet, Identity, KEY_STANDARD,
    RATE_GENERAL, RATE_REDUCED, RATE_SUPER_REDUCED, RateDef, RateValueDef, RegimeDef, Scenario,
    ScenarioSet, vat_keys,
};

pub const CATEGORY_IGIC: Code = Code::from_static("IGIC");
pub const CATEGORY_IRPF: Code = Code::from_static("IRPF");

/// Equivalence surcharge, added to a VAT rate key: `general+eqs`.
pub const RATE_EQUIVALENCE: Key = Key::from_static("eqs");

pub const RATE_PRO: Key = Key::from_static("pro");
pub const RATE_PRO_START: Key = Key::from_static("pro-start");
pub const RATE_CAPITAL: Key = Key::from_static("capital");
pub const RATE_MODULES: Key = Key::from_static("modules");

pub const TAG_SIMPLIFIED_SCHEME: Key = Key::from_static("simplified-scheme");
pub const TAG_TRAVEL_AGENCY: Key = Key::from_static("travel-agency");
pub const TAG_CASH_BASIS: Key = Key::from_static("cash-basis");

const CHECK_LETTERS: &str = "TRWAGMYFPDXBNJZSQVHLCKE";
const FOREIGNER_LETTERS: &str = "XYZ";
const OTHER_LETTERS: &str = "KLM";
const ORG_LETTERS: &str = "ABCDEFGHJNPQRSUVW";
const ORG_CHECK_LETTERS: &str = "JABCDEFGHI";

pub fn new() -> RegimeDef {
    RegimeDef::new(Code::from_static("ES"), Code::from_static("EUR"), "Spain")
        .with_time_zone("Europe/Madrid")
        .with_rounding(Rounding::HalfUp)
        .with_category(vat())
        .with_category(igic())
        .with_category(irpf())
        .with_scenarios(scenarios())
        .with_corrections(CorrectionSet::new(vec![CorrectionDefinition {
            types: vec![Key::from_static("credit-note"), Key::from_static("corrective")],
            reason_required: true,
            ..CorrectionDefinition::new(SCHEMA_INVOICE)
        }]))
        .with_normalizer(Normalizer::new().with(normalize_identity))
        .with_validator(Validator::new().with(validate_identity))
}

fn pct(value: i64, exp: u32) -> Percentage {
    Percentage::new(value, exp)
}

fn rate(rate: Key, name: &str, values: Vec<RateValueDef>) -> RateDef {
    values
        .into_iter()
        .fold(RateDef::new(rate, name).with_keys(&[KEY_STANDARD]), RateDef::with_value)
}

fn vat() -> CategoryDef {
    let cat = vat_keys()
        .into_iter()
        .fold(CategoryDef::new(CATEGORY_VAT, "IVA"), CategoryDef::with_key)
        .with_title("Impuesto sobre el Valor Añadido");
    let eqs = |r: Key| r.with(&RATE_EQUIVALENCE);
    cat.with_rate(rate(
        RATE_GENERAL,
        "Tipo General",
        vec![
            RateValueDef::new(date(2012, 9, 1), pct(21, 2)),
            RateValueDef::new(date(2010, 7, 1), pct(18, 2)),
            RateValueDef::new(date(1995, 1, 1), pct(16, 2)),
            RateValueDef::new(date(1993, 1, 1), pct(15, 2)),
        ],
    ))
    .with_rate(rate(
        eqs(RATE_GENERAL),
        "Tipo General + Recargo de Equivalencia",
        vec![
            RateValueDef::new(date(2012, 9, 1), pct(21, 2)).with_surcharge(pct(52, 3)),
            RateValueDef::new(date(2010, 7, 1), pct(18, 2)).with_surcharge(pct(40, 3)),
        ],
    ))
    .with_rate(rate(
        RATE_REDUCED,
        "Tipo Reducido",
        vec![
            RateValueDef::new(date(2012, 9, 1), pct(10, 2)),
            RateValueDef::new(date(2010, 7, 1), pct(8, 2)),
            RateValueDef::new(date(1995, 1, 1), pct(7, 2)),
            RateValueDef::new(date(1993, 1, 1), pct(6, 2)),
        ],
    ))
    .with_rate(rate(
        eqs(RATE_REDUCED),
        "Tipo Reducido + Recargo de Equivalencia",
        vec![
            RateValueDef::new(date(2012, 9, 1), pct(10, 2)).with_surcharge(pct(14, 3)),
            RateValueDef::new(date(2010, 7, 1), pct(8, 2)).with_surcharge(pct(10, 3)),
        ],
    ))
    .with_rate(rate(
        RATE_SUPER_REDUCED,
        "Tipo Superreducido",
        vec![
            RateValueDef::new(date(1995, 1, 1), pct(4, 2)),
            RateValueDef::new(date(1993, 1, 1), pct(3, 2)),
        ],
    ))
    .with_rate(rate(
        eqs(RATE_SUPER_REDUCED),
        "Tipo Superreducido + Recargo de Equivalencia",
        vec![RateValueDef::new(date(1995, 1, 1), pct(4, 2)).with_surcharge(pct(5, 3))],
    ))
}

/// Canary Islands. Only the common rates are listed; others go in the
/// combo percent directly.
fn igic() -> CategoryDef {
    vat_keys()
        .into_iter()
        .fold(CategoryDef::new(CATEGORY_IGIC, "IGIC"), CategoryDef::with_key)
        .with_title("Impuesto General Indirecto Canario")
        .with_rate(rate(RATE_GENERAL, "Tipo General", vec![RateValueDef::always(pct(7, 2))]))
        .with_rate(rate(RATE_REDUCED, "Tipo Reducido", vec![RateValueDef::always(pct(3, 2))]))
}

fn irpf() -> CategoryDef {
    let r = |key: Key, name: &str, values: Vec<RateValueDef>| {
        values.into_iter().fold(RateDef::new(key, name), RateDef::with_value)
    };
    CategoryDef::new(CATEGORY_IRPF, "IRPF")
        .with_title("Impuesto sobre la renta de las personas físicas")
        .retained()
        .with_rate(r(
            RATE_PRO,
            "Profesionales",
            vec![
                RateValueDef::new(date(2015, 7, 12), pct(15, 2)),
                RateValueDef::new(date(2015, 1, 1), pct(19, 2)),
                RateValueDef::new(date(2012, 9, 1), pct(21, 2)),
                RateValueDef::new(date(2007, 1, 1), pct(15, 2)),
            ],
        ))
        .with_rate(r(
            RATE_PRO_START,
            "Profesionales Inicio",
            vec![RateValueDef::new(date(2007, 1, 1), pct(7, 2))],
        ))
        .with_rate(r(
            RATE_CAPITAL,
            "Alquileres o Intereses de Capital",
            vec![RateValueDef::new(date(2007, 1, 1), pct(19, 2))],
        ))
        .with_rate(r(
            RATE_MODULES,
            "Tipo Módulos",
            vec![RateValueDef::new(date(2007, 1, 1), pct(1, 2))],
        ))
}

fn scenarios() -> ScenarioSet {
    let legal = |tag: Key, text: &str| Scenario {
        tags: vec![tag],
        note: Some(Note::new(Key::from_static("legal"), text).with_src(Key::from_static("es"))),
        ..Default::default()
    };
    ScenarioSet::new(SCHEMA_INVOICE)
        .with(legal(
            Key::from_static("reverse-charge"),
            "Reverse Charge / Inversión del sujeto pasivo.",
        ))
        .with(legal(
            TAG_SIMPLIFIED_SCHEME,
            "Factura expedida por contibuyente en régimen simplificado.",
        ))
        .with(legal(
            Key::from_static("self-billed"),
            "Facturación por el destinatario.",
        ))
        .with(legal(TAG_TRAVEL_AGENCY, "Régimen especial de las agencias de viajes."))
        .with(legal(TAG_CASH_BASIS, "Régimen especial del criterio de caja."))
}

/// The kinds of Spanish tax identity code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    /// DNI: eight digits and a check letter.
    National,
    /// NIE: X, Y or Z, seven digits and a check letter.
    Foreigner,
    /// CIF: an organisation letter, seven digits and a check character.
    Org,
    /// K, L or M codes issued to special cases.
    Other,
}

/// Classify a Spanish identity by the shape of its code. The check
/// character is not verified.
pub fn identity_kind(id: &Identity) -> Option<IdentityKind> {
    if id.country != "ES" || id.code.is_empty() {
        return None;
    }
    let code = id.code.as_str().as_bytes();
    if code.len() != 9 {
        return None;
    }
    let (first, middle, last) = (code[0] as char, &code[1..8], code[8] as char);
    if !middle.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let letter_check = CHECK_LETTERS.contains(last);
    let org_check = last.is_ascii_digit() || ORG_CHECK_LETTERS.contains(last);
    match first {
        c if c.is_ascii_digit() && letter_check && &code[..8] != b"00000000" => {
            Some(IdentityKind::National)
        }
        c if FOREIGNER_LETTERS.contains(c) && letter_check => Some(IdentityKind::Foreigner),
        c if ORG_LETTERS.contains(c) && org_check => Some(IdentityKind::Org),
        c if OTHER_LETTERS.contains(c) && org_check => Some(IdentityKind::Other),
        _ => None,
    }
}

/// Codes that start with a digit lost their leading zeros somewhere.
fn normalize_identity(id: &mut Identity) {
    if id.country != "ES" {
        return;
    }
    let code = id.code.as_str();
    if code.starts_with(|c: char| c.is_ascii_digit()) && code.len() < 9 {
        id.code = Code::new(format!("{code:0>9}"));
    }
}

fn validate_identity(id: &Identity) -> Vec<ValidationError> {
    if id.country != "ES" || id.code.is_empty() || identity_kind(id).is_some() {
        return Vec::new();
    }
    vec![ValidationError::new("code", "invalid format")]
}
