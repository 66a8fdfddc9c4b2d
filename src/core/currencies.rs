//! ISO 4217 currencies and their minor units.
//!
//! The minor units decide the precision that tax totals are rounded to.

/// Check whether `code` is a known ISO 4217 currency code.
pub fn is_known_currency(code: &str) -> bool {
    find(code).is_some()
}

/// Number of decimal places used by the currency, e.g. 2 for EUR, 0 for JPY.
pub fn minor_units(code: &str) -> Option<u32> {
    find(code).map(|(_, units)| units)
}

fn find(code: &str) -> Option<(&'static str, u32)> {
    CURRENCIES
        .binary_search_by(|(c, _)| (*c).cmp(code))
        .ok()
        .map(|i| CURRENCIES[i])
}

/// Sorted by code for binary search.
static CURRENCIES: &[(&str, u32)] = &[
    ("AED", 2), // UAE Dirham
    ("AMD", 2), // Armenian Dram
    ("ARS", 2), // Argentine Peso
    ("AUD", 2), // Australian Dollar
    ("BGN", 2), // Bulgarian Lev
    ("BHD", 3), // Bahraini Dinar
    ("BRL", 2), // Brazilian Real
    ("CAD", 2), // Canadian Dollar
    ("CHF", 2), // Swiss Franc
    ("CLF", 4), // Chilean Unidad de Fomento
    ("CLP", 0), // Chilean Peso
    ("CNY", 2), // Chinese Yuan
    ("COP", 2), // Colombian Peso
    ("CZK", 2), // Czech Koruna
    ("DKK", 2), // Danish Krone
    ("EGP", 2), // Egyptian Pound
    ("EUR", 2), // Euro
    ("GBP", 2), // Pound Sterling
    ("GEL", 2), // Georgian Lari
    ("HKD", 2), // Hong Kong Dollar
    ("HUF", 2), // Hungarian Forint
    ("IDR", 2), // Indonesian Rupiah
    ("ILS", 2), // Israeli Shekel
    ("INR", 2), // Indian Rupee
    ("IQD", 3), // Iraqi Dinar
    ("ISK", 0), // Icelandic Krona
    ("JOD", 3), // Jordanian Dinar
    ("JPY", 0), // Japanese Yen
    ("KES", 2), // Kenyan Shilling
    ("KRW", 0), // South Korean Won
    ("KWD", 3), // Kuwaiti Dinar
    ("KZT", 2), // Kazakhstani Tenge
    ("MXN", 2), // Mexican Peso
    ("MYR", 2), // Malaysian Ringgit
    ("NGN", 2), // Nigerian Naira
    ("NOK", 2), // Norwegian Krone
    ("NZD", 2), // New Zealand Dollar
    ("OMR", 3), // Omani Rial
    ("PAB", 2), // Panamanian Balboa
    ("PEN", 2), // Peruvian Sol
    ("PHP", 2), // Philippine Peso
    ("PLN", 2), // Polish Zloty
    ("PYG", 0), // Paraguayan Guarani
    ("RON", 2), // Romanian Leu
    ("RUB", 2), // Russian Ruble
    ("SAR", 2), // Saudi Riyal
    ("SEK", 2), // Swedish Krona
    ("SGD", 2), // Singapore Dollar
    ("THB", 2), // Thai Baht
    ("TND", 3), // Tunisian Dinar
    ("TRY", 2), // Turkish Lira
    ("TWD", 2), // New Taiwan Dollar
    ("UAH", 2), // Ukrainian Hryvnia
    ("USD", 2), // US Dollar
    ("UYU", 2), // Uruguayan Peso
    ("VND", 0), // Vietnamese Dong
    ("XAF", 0), // Central African CFA Franc
    ("XOF", 0), // West African CFA Franc
    ("ZAR", 2), // South African Rand
];
