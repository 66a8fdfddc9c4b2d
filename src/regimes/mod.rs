//! Bundled regime definitions.
//!
//! Each module exposes `new()` returning the [`RegimeDef`](crate::tax::RegimeDef)
//! for its country. [`RegistryBuilder::with_bundled`](crate::registry::RegistryBuilder::with_bundled)
//! registers all of them.

use chrono::NaiveDate;

pub mod de;
pub mod es;

/// Date literal for definition tables.
///
/// # Panics
///
/// On an impossible date. Definition tables are static data, like the
/// consistency checks run at registration.
pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(y, m, d) {
        Some(date) => date,
        None => panic!("invalid date {y}-{m}-{d} in definition table"),
    }
}
