use serde::{Deserialize, Serialize};

use super::Key;

/// Free text attached to a document, optionally classified by key and code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default, skip_serializing_if = "Key::is_empty")]
    pub key: Key,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
    /// Where the note came from, e.g. the addon that added it.
    #[serde(default, skip_serializing_if = "Key::is_empty")]
    pub src: Key,
    pub text: String,
}

impl Note {
    pub fn new(key: Key, text: impl Into<String>) -> Self {
        Self {
            key,
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_src(mut self, src: Key) -> Self {
        self.src = src;
        self
    }

    /// Two notes describe the same thing when key, code and source match;
    /// the text may differ.
    pub fn same_as(&self, other: &Note) -> bool {
        self.key == other.key && self.code == other.code && self.src == other.src
    }
}
