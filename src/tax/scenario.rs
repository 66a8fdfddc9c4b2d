use serde::{Deserialize, Serialize};

use super::{ExtValue, Extensions};
use crate::core::{Key, Note};

/// Scenarios that apply to one document schema, e.g. `bill/invoice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub schema: String,
    pub list: Vec<Scenario>,
}

/// A combination of document type, tags and extensions that triggers
/// notes or extra extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Document types the scenario applies to; empty matches any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<Key>,
    /// Every tag must be present on the document.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Key>,
    /// An extension key some node of the document must carry.
    #[serde(default, skip_serializing_if = "Key::is_empty")]
    pub ext_key: Key,
    /// Required value of `ext_key`; empty accepts any value.
    #[serde(default, skip_serializing_if = "ExtValue::is_empty")]
    pub ext_value: ExtValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<Note>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub ext: Extensions,
}

/// What the matching scenarios ask the document to add.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioSummary {
    pub notes: Vec<Note>,
    pub ext: Extensions,
}

impl ScenarioSet {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            list: Vec::new(),
        }
    }

    pub fn with(mut self, scenario: Scenario) -> Self {
        self.list.push(scenario);
        self
    }

    /// True if the set covers `schema`, matched by suffix so
    /// `https://example.com/bill/invoice` uses a `bill/invoice` set.
    pub fn applies_to(&self, schema: &str) -> bool {
        schema.ends_with(&self.schema)
    }

    /// Collect the outputs of every matching scenario into `summary`.
    pub fn summarize(
        &self,
        doc_type: &Key,
        tags: &[Key],
        exts: &[Extensions],
        summary: &mut ScenarioSummary,
    ) {
        for s in self.list.iter().filter(|s| s.matches(doc_type, tags, exts)) {
            if let Some(note) = &s.note {
                summary.add_note(note.clone().with_code(s.ext_value.as_str()));
            }
            summary.ext.merge(&s.ext);
        }
    }

    pub fn summary_for(&self, doc_type: &Key, tags: &[Key], exts: &[Extensions]) -> ScenarioSummary {
        let mut summary = ScenarioSummary::default();
        self.summarize(doc_type, tags, exts, &mut summary);
        summary
    }
}

impl Scenario {
    pub fn matches(&self, doc_type: &Key, tags: &[Key], exts: &[Extensions]) -> bool {
        if !self.types.is_empty() && !doc_type.is_in(&self.types) {
            return false;
        }
        if !self.tags.iter().all(|t| t.is_in(tags)) {
            return false;
        }
        if self.ext_key.is_empty() {
            return true;
        }
        exts.iter().any(|ext| match ext.get(&self.ext_key) {
            Some(v) => self.ext_value.is_empty() || v == &self.ext_value,
            None => false,
        })
    }
}

impl ScenarioSummary {
    /// Add a note, replacing an earlier one that is the same note.
    pub fn add_note(&mut self, note: Note) {
        match self.notes.iter_mut().find(|n| n.same_as(&note)) {
            Some(existing) => *existing = note,
            None => self.notes.push(note),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVOICE: Key = Key::from_static("standard");
    const CREDIT_NOTE: Key = Key::from_static("credit-note");
    const REVERSE_CHARGE: Key = Key::from_static("reverse-charge");
    const CAT: Key = Key::from_static("untdid-tax-category");

    fn set() -> ScenarioSet {
        ScenarioSet::new("bill/invoice")
            .with(Scenario {
                tags: vec![REVERSE_CHARGE],
                note: Some(Note::new(Key::from("legal"), "Reverse charge")),
                ..Default::default()
            })
            .with(Scenario {
                types: vec![CREDIT_NOTE],
                ext: Extensions::new().with(Key::from("untdid-document-type"), "381"),
                ..Default::default()
            })
            .with(Scenario {
                ext_key: CAT,
                ext_value: ExtValue::from("AE"),
                note: Some(Note::new(Key::from("legal"), "Autoliquidation")),
                ..Default::default()
            })
    }

    #[test]
    fn matches_by_tag_and_type() {
        let s = set().summary_for(&INVOICE, &[REVERSE_CHARGE], &[]);
        assert_eq!(s.notes.len(), 1);
        assert!(s.ext.is_empty());

        let s = set().summary_for(&CREDIT_NOTE, &[], &[]);
        assert!(s.notes.is_empty());
        assert_eq!(s.ext.get(&Key::from("untdid-document-type")).unwrap(), &"381");
    }

    #[test]
    fn matches_by_extension_value_and_codes_note() {
        let exts = [Extensions::new(), Extensions::new().with(CAT, "AE")];
        let s = set().summary_for(&INVOICE, &[], &exts);
        assert_eq!(s.notes.len(), 1);
        assert_eq!(s.notes[0].code, "AE");

        let exts = [Extensions::new().with(CAT, "S")];
        assert!(set().summary_for(&INVOICE, &[], &exts).notes.is_empty());
    }

    #[test]
    fn same_note_is_replaced() {
        let mut summary = ScenarioSummary::default();
        summary.add_note(Note::new(Key::from("legal"), "first"));
        summary.add_note(Note::new(Key::from("legal"), "second"));
        summary.add_note(Note::new(Key::from("general"), "other"));
        assert_eq!(summary.notes.len(), 2);
        assert_eq!(summary.notes[0].text, "second");
    }

    #[test]
    fn schema_suffix() {
        assert!(set().applies_to("https://gobl.org/draft-0/bill/invoice"));
        assert!(!set().applies_to("bill/payment"));
    }
}
