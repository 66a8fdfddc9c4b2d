//! Key and code identifiers.
//!
//! A [`Key`] is a lower-case identifier such as `standard` or
//! `general+eqs`, where `+` joins sub-keys. A [`Code`] is an upper-case
//! identifier taken from an external list, such as a country (`ES`) or a
//! tax category (`VAT`).

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Lower-case identifier, optionally composed of `+`-joined parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(Cow<'static, str>);

/// Upper-case identifier from an external code list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code(Cow<'static, str>);

impl Key {
    /// The empty key.
    pub const EMPTY: Key = Key(Cow::Borrowed(""));

    pub fn new(key: impl Into<String>) -> Self {
        Self(Cow::Owned(key.into()))
    }

    /// Build a key from a static string, usable in constants.
    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Join another key as a sub-key: `general` with `eqs` is `general+eqs`.
    pub fn with(&self, other: &Key) -> Key {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        Key::new(format!("{}+{}", self.0, other.0))
    }

    /// True if `other` is one of the `+`-separated parts of this key.
    pub fn has(&self, other: &Key) -> bool {
        !other.is_empty() && self.0.split('+').any(|part| part == other.as_str())
    }

    /// True if the first `+`-separated part of this key is `prefix`.
    pub fn has_prefix(&self, prefix: &Key) -> bool {
        self.0.split('+').next() == Some(prefix.as_str())
    }

    /// True if the key is one of `keys`.
    pub fn is_in(&self, keys: &[Key]) -> bool {
        keys.contains(self)
    }

    /// Check the key format: lower-case alphanumeric parts joined by
    /// `-`, `.` or `+`.
    pub fn is_valid(&self) -> bool {
        is_valid_identifier(&self.0, |c| c.is_ascii_lowercase() || c.is_ascii_digit(), "-.+")
    }
}

impl Code {
    /// The empty code.
    pub const EMPTY: Code = Code(Cow::Borrowed(""));

    pub fn new(code: impl Into<String>) -> Self {
        Self(Cow::Owned(code.into()))
    }

    /// Build a code from a static string, usable in constants.
    pub const fn from_static(code: &'static str) -> Self {
        Self(Cow::Borrowed(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check the code format: upper-case alphanumeric parts joined by
    /// `-`, `.`, `/` or `_`.
    pub fn is_valid(&self) -> bool {
        is_valid_identifier(&self.0, |c| c.is_ascii_uppercase() || c.is_ascii_digit(), "-./_")
    }
}

fn is_valid_identifier(s: &str, allowed: impl Fn(char) -> bool, separators: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let mut prev_sep = true;
    for c in s.chars() {
        if separators.contains(c) {
            if prev_sep {
                return false;
            }
            prev_sep = true;
        } else if allowed(c) {
            prev_sep = false;
        } else {
            return false;
        }
    }
    !prev_sep
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::new(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::new(s)
    }
}

impl From<&str> for Code {
    fn from(s: &str) -> Self {
        Code::new(s)
    }
}

impl From<String> for Code {
    fn from(s: String) -> Self {
        Code::new(s)
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<str> for Code {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Code {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Append keys to a list, skipping those already present.
pub fn append_unique_keys(mut list: Vec<Key>, keys: &[Key]) -> Vec<Key> {
    for k in keys {
        if !list.contains(k) {
            list.push(k.clone());
        }
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_composition() {
        let k = Key::from("general").with(&Key::from("eqs"));
        assert_eq!(k, "general+eqs");
        assert!(k.has(&Key::from("eqs")));
        assert!(k.has(&Key::from("general")));
        assert!(!k.has(&Key::from("gen")));
        assert!(k.has_prefix(&Key::from("general")));
        assert!(!k.has_prefix(&Key::from("eqs")));
        assert!(!k.has_prefix(&Key::from("gen")));
        assert!(!Key::from("generalissimo").has_prefix(&Key::from("general")));
        assert_eq!(Key::EMPTY.with(&Key::from("zero")), "zero");
    }

    #[test]
    fn key_format() {
        assert!(Key::from("standard").is_valid());
        assert!(Key::from("reverse-charge").is_valid());
        assert!(Key::from("general+eqs").is_valid());
        assert!(!Key::from("").is_valid());
        assert!(!Key::from("Standard").is_valid());
        assert!(!Key::from("a--b").is_valid());
        assert!(!Key::from("trailing-").is_valid());
    }

    #[test]
    fn code_format() {
        assert!(Code::from("VAT").is_valid());
        assert!(Code::from("ES").is_valid());
        assert!(Code::from("S-1").is_valid());
        assert!(!Code::from("vat").is_valid());
        assert!(!Code::from("").is_valid());
    }

    #[test]
    fn unique_append_keeps_order() {
        let list = append_unique_keys(vec![Key::from("a")], &[Key::from("b"), Key::from("a")]);
        assert_eq!(list, vec![Key::from("a"), Key::from("b")]);
    }

    #[test]
    fn serde_as_plain_string() {
        let k: Key = serde_json::from_str("\"reduced\"").unwrap();
        assert_eq!(k, "reduced");
        assert_eq!(serde_json::to_string(&Code::from("IRPF")).unwrap(), "\"IRPF\"");
    }
}
