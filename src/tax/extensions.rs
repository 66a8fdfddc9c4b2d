use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Code, Key, ValidationError};

/// The value of an extension: usually a [`Code`], sometimes a [`Key`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtValue(String);

impl ExtValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The value as a code, or the empty code if it is not one.
    pub fn code(&self) -> Code {
        let c = Code::new(self.0.clone());
        if c.is_valid() { c } else { Code::EMPTY }
    }

    /// The value as a key, or the empty key if it is not one.
    pub fn key(&self) -> Key {
        let k = Key::new(self.0.clone());
        if k.is_valid() { k } else { Key::EMPTY }
    }
}

impl fmt::Display for ExtValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExtValue {
    fn from(s: &str) -> Self {
        ExtValue::new(s)
    }
}

impl From<Code> for ExtValue {
    fn from(c: Code) -> Self {
        ExtValue::new(c.as_str())
    }
}

impl From<Key> for ExtValue {
    fn from(k: Key) -> Self {
        ExtValue::new(k.as_str())
    }
}

impl PartialEq<&str> for ExtValue {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Jurisdiction or format specific codes attached to a document node.
///
/// Setting a key that is already present overwrites its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extensions(BTreeMap<Key, ExtValue>);

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, key: Key, value: impl Into<ExtValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: Key, value: impl Into<ExtValue>) {
        self.0.insert(key, value.into());
    }

    pub fn get(&self, key: &Key) -> Option<&ExtValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &Key) -> Option<ExtValue> {
        self.0.remove(key)
    }

    /// True if every key is present.
    pub fn has(&self, keys: &[Key]) -> bool {
        keys.iter().all(|k| self.0.contains_key(k))
    }

    /// True if every entry of `other` is present here with the same value.
    pub fn contains(&self, other: &Extensions) -> bool {
        other.0.iter().all(|(k, v)| self.0.get(k) == Some(v))
    }

    /// Copy every entry of `other` into this map. Shared keys take `other`'s
    /// value; nothing is ever removed.
    pub fn merge(&mut self, other: &Extensions) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Drop entries with empty values.
    pub fn clean(&mut self) {
        self.0.retain(|_, v| !v.is_empty());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &ExtValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.0.keys()
    }
}

impl FromIterator<(Key, ExtValue)> for Extensions {
    fn from_iter<I: IntoIterator<Item = (Key, ExtValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One allowed value of an extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDef {
    pub code: Code,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
}

impl CodeDef {
    pub fn new(code: Code, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            desc: String::new(),
        }
    }
}

/// Declares an extension key and, optionally, the codes it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDef {
    pub key: Key,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
    /// Empty means any value is accepted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub codes: Vec<CodeDef>,
}

impl ExtensionDef {
    pub fn new(key: Key, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            desc: String::new(),
            codes: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: Code, name: impl Into<String>) -> Self {
        self.codes.push(CodeDef::new(code, name));
        self
    }

    pub fn code_def(&self, code: &Code) -> Option<&CodeDef> {
        self.codes.iter().find(|c| &c.code == code)
    }

    pub fn has_code(&self, code: &Code) -> bool {
        self.code_def(code).is_some()
    }

    /// Check a value against the declared codes.
    pub fn check(&self, value: &ExtValue) -> Option<ValidationError> {
        if !self.codes.is_empty() && !self.has_code(&value.code()) {
            return Some(ValidationError::new(
                self.key.as_str(),
                format!("code '{value}' invalid"),
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const K1: Key = Key::from_static("es-tbai-product");
    const K2: Key = Key::from_static("untdid-tax-category");

    #[test]
    fn set_overwrites() {
        let mut ext = Extensions::new();
        ext.set(K1, "goods");
        ext.set(K1, "services");
        assert_eq!(ext.len(), 1);
        assert_eq!(ext.get(&K1).unwrap(), &"services");
    }

    #[test]
    fn contains_and_has() {
        let ext = Extensions::new().with(K1, "goods").with(K2, "S");
        let sub = Extensions::new().with(K2, "S");
        assert!(ext.contains(&sub));
        assert!(ext.contains(&Extensions::new()));
        assert!(!sub.contains(&ext));
        assert!(!ext.contains(&Extensions::new().with(K2, "Z")));
        assert!(ext.has(&[K1, K2]));
        assert!(!sub.has(&[K1]));
    }

    #[test]
    fn merge_is_additive() {
        let mut ext = Extensions::new().with(K1, "goods");
        ext.merge(&Extensions::new().with(K2, "S"));
        assert!(ext.has(&[K1, K2]));
        ext.merge(&Extensions::new());
        assert_eq!(ext.len(), 2);
    }

    #[test]
    fn clean_drops_empty_values() {
        let mut ext = Extensions::new().with(K1, "").with(K2, "S");
        ext.clean();
        assert_eq!(ext, Extensions::new().with(K2, "S"));
    }

    #[test]
    fn value_as_code_or_key() {
        assert_eq!(ExtValue::from("S").code(), "S");
        assert!(ExtValue::from("goods").code().is_empty());
        assert_eq!(ExtValue::from("goods").key(), "goods");
    }

    #[test]
    fn definition_checks_codes() {
        let def = ExtensionDef::new(K2, "Tax category")
            .with_code(Code::from_static("S"), "Standard")
            .with_code(Code::from_static("Z"), "Zero");
        assert!(def.check(&ExtValue::from("S")).is_none());
        let err = def.check(&ExtValue::from("X")).unwrap();
        assert_eq!(err.to_string(), "untdid-tax-category: code 'X' invalid");

        let open = ExtensionDef::new(K1, "Anything");
        assert!(open.check(&ExtValue::from("whatever")).is_none());
    }

    #[test]
    fn json_is_a_plain_map() {
        let ext = Extensions::new().with(K2, "S");
        assert_eq!(
            serde_json::to_string(&ext).unwrap(),
            r#"{"untdid-tax-category":"S"}"#
        );
    }
}
