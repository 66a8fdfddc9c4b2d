//! Consistency checks run when a definition is registered.

use std::collections::HashSet;

use crate::core::{countries, currencies};
use crate::tax::{AddonDef, CategoryDef, ExtensionDef, RateDef, RegimeDef};

pub(crate) fn check_regime(def: &RegimeDef) -> Result<(), String> {
    if def.country.is_empty() {
        return Err("country code missing".into());
    }
    if !countries::is_tax_country(def.country.as_str()) {
        return Err(format!("unknown country '{}'", def.country));
    }
    for alt in &def.alt_country_codes {
        if !countries::is_tax_country(alt.as_str()) {
            return Err(format!("unknown alternative country '{alt}'"));
        }
    }
    if !currencies::is_known_currency(def.currency.as_str()) {
        return Err(format!("unknown currency '{}'", def.currency));
    }
    check_extension_keys(&def.extensions)?;

    let mut codes = HashSet::new();
    for cat in &def.categories {
        if cat.code.is_empty() {
            return Err("category without code".into());
        }
        if !codes.insert(&cat.code) {
            return Err(format!("duplicate category '{}'", cat.code));
        }
        check_category(cat).map_err(|e| format!("category '{}': {e}", cat.code))?;
    }
    Ok(())
}

pub(crate) fn check_addon(def: &AddonDef) -> Result<(), String> {
    if def.key.is_empty() {
        return Err("key missing".into());
    }
    if !def.key.is_valid() {
        return Err(format!("invalid key '{}'", def.key));
    }
    check_extension_keys(&def.extensions)
}

fn check_extension_keys(exts: &[ExtensionDef]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for ext in exts {
        if !seen.insert(&ext.key) {
            return Err(format!("duplicate extension '{}'", ext.key));
        }
    }
    Ok(())
}

fn check_category(cat: &CategoryDef) -> Result<(), String> {
    let mut keys = HashSet::new();
    for kd in &cat.keys {
        if !keys.insert(&kd.key) {
            return Err(format!("duplicate key '{}'", kd.key));
        }
    }
    for rate in &cat.rates {
        if let Some(k) = rate.keys.iter().find(|k| cat.key_def(k).is_none()) {
            return Err(format!("rate '{}' uses undeclared key '{k}'", rate.rate));
        }
        check_value_order(rate).map_err(|e| format!("rate '{}': {e}", rate.rate))?;
    }
    Ok(())
}

/// Unconditional values must be declared newest first.
fn check_value_order(rate: &RateDef) -> Result<(), String> {
    let mut prev = None;
    for v in rate.values.iter().filter(|v| v.ext.is_empty()) {
        if let Some(p) = prev {
            if v.since > p {
                return Err("values must be ordered by date, newest first".into());
            }
        }
        prev = Some(v.since);
    }
    Ok(())
}
