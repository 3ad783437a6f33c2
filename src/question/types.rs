//! Core question type definitions.
//!
//! Defines [`Section`] (the category partition), [`SectionSchema`] (required
//! fields and flatten order as static data), and [`Question`] (a structured
//! record before persistence). All per-section behavior — validation,
//! collection routing, flatten templates — dispatches through
//! [`Section::schema`] instead of scattering section checks across modules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The exam sections kikitori stores, one collection each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Section 2 — listening comprehension: introduction, conversation, question.
    Dialogue,
    /// Section 3 — phrase matching: situation, question.
    PhraseMatch,
}

/// Per-section schema: which fields a valid question must carry and in which
/// order they flatten into searchable text.
///
/// The flatten order is part of the persisted contract — stored documents were
/// embedded from text built in this order, so it must stay stable for new
/// embeddings to remain comparable to old ones.
#[derive(Debug)]
pub struct SectionSchema {
    /// Collection (table) name holding this section's documents.
    pub collection: &'static str,
    /// Fields that must be present and non-empty for a question to be stored.
    pub required_fields: &'static [&'static str],
    /// Field order for the flattened searchable text.
    pub flatten_order: &'static [&'static str],
}

const DIALOGUE_SCHEMA: SectionSchema = SectionSchema {
    collection: "section2_questions",
    required_fields: &["Introduction", "Conversation", "Question"],
    flatten_order: &["Introduction", "Conversation", "Question"],
};

const PHRASE_MATCH_SCHEMA: SectionSchema = SectionSchema {
    collection: "section3_questions",
    required_fields: &["Situation", "Question"],
    flatten_order: &["Situation", "Question"],
};

impl Section {
    /// All supported sections, in collection order.
    pub const ALL: [Section; 2] = [Section::Dialogue, Section::PhraseMatch];

    /// The section number used in document IDs and stored metadata.
    pub fn number(&self) -> u8 {
        match self {
            Self::Dialogue => 2,
            Self::PhraseMatch => 3,
        }
    }

    pub fn from_number(n: u8) -> Result<Self, UnsupportedSection> {
        match n {
            2 => Ok(Self::Dialogue),
            3 => Ok(Self::PhraseMatch),
            other => Err(UnsupportedSection(other.to_string())),
        }
    }

    /// Static schema for this section.
    pub fn schema(&self) -> &'static SectionSchema {
        match self {
            Self::Dialogue => &DIALOGUE_SCHEMA,
            Self::PhraseMatch => &PHRASE_MATCH_SCHEMA,
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "section{}", self.number())
    }
}

impl std::str::FromStr for Section {
    type Err = UnsupportedSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2" | "section2" | "dialogue" => Ok(Self::Dialogue),
            "3" | "section3" | "phrase_match" => Ok(Self::PhraseMatch),
            other => Err(UnsupportedSection(other.to_string())),
        }
    }
}

/// Fatal error for a section the store has no schema for.
///
/// This is the one caller-must-handle error in the store's taxonomy, and it is
/// raised uniformly: every string-to-[`Section`] boundary (CLI arguments,
/// stored section numbers) goes through the same conversion, so add, search,
/// get and delete all reject an unknown section the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported section: {0} (supported: 2, 3)")]
pub struct UnsupportedSection(pub String);

/// A structured quiz question before persistence.
///
/// Fields are an open map validated against the section schema rather than
/// fixed struct fields — the required set is per-section, not per-item.
/// Questions are transient: they persist only as a document's metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub section: Section,
    /// Named text fields, e.g. `Introduction`, `Conversation`, `Question`.
    pub fields: BTreeMap<String, String>,
    /// Ordered answer options, if present (`A)` through `D)`).
    pub options: Option<Vec<String>>,
}

impl Question {
    pub fn new(section: Section) -> Self {
        Self {
            section,
            fields: BTreeMap::new(),
            options: None,
        }
    }

    /// Builder-style field setter, used by tests and ad hoc construction.
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Schema-required fields that are missing or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.section
            .schema()
            .required_fields
            .iter()
            .filter(|name| self.field(name).map_or(true, str::is_empty))
            .copied()
            .collect()
    }

    /// A question is valid iff every required field is present and non-empty.
    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty()
    }
}
