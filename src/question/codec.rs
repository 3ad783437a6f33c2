//! Document codec — flattening for embedding, serialization for storage.
//!
//! A stored document carries two renditions of the same question. The
//! flattened text is lossy and exists only to be embedded and ranked; the
//! serialized JSON (`full_structure`) is the authoritative state and must
//! round-trip back to the original [`Question`] exactly.

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::question::types::{Question, Section};

/// Flatten a question into searchable text for embedding.
///
/// Labeled lines in the section schema's fixed order. The order is a
/// persisted contract (see [`SectionSchema`](crate::question::types::SectionSchema));
/// answer options deliberately stay out, ranking keys on the scenario text.
pub fn flatten(question: &Question) -> String {
    question
        .section
        .schema()
        .flatten_order
        .iter()
        .map(|label| format!("{label}: {}", question.field(label).unwrap_or_default()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize a question to its lossless JSON metadata form.
///
/// Fields become string entries (sorted key order, so output is
/// deterministic); options become an `Options` array when present. The
/// section is not part of the JSON — it travels in the document's own
/// `section` column.
pub fn serialize(question: &Question) -> Result<String> {
    let mut object = Map::new();
    for (name, value) in &question.fields {
        object.insert(name.clone(), Value::String(value.clone()));
    }
    if let Some(options) = &question.options {
        object.insert(
            "Options".to_string(),
            Value::Array(options.iter().cloned().map(Value::String).collect()),
        );
    }
    serde_json::to_string(&Value::Object(object)).context("failed to serialize question")
}

/// Inverse of [`serialize`]: rebuild a question from stored metadata.
pub fn deserialize(section: Section, json: &str) -> Result<Question> {
    let value: Value =
        serde_json::from_str(json).context("failed to parse question metadata")?;
    let object = value
        .as_object()
        .context("question metadata is not a JSON object")?;

    let mut question = Question::new(section);
    for (name, value) in object {
        if name == "Options" {
            let options = value
                .as_array()
                .context("Options metadata is not an array")?
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(str::to_string)
                        .context("option is not a string")
                })
                .collect::<Result<Vec<_>>>()?;
            question.options = Some(options);
        } else {
            let text = value
                .as_str()
                .with_context(|| format!("field {name} is not a string"))?;
            question.fields.insert(name.clone(), text.to_string());
        }
    }
    Ok(question)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question::new(Section::Dialogue)
            .with_field("Introduction", "電話で話しています")
            .with_field("Conversation", "もしもし、田中です")
            .with_field("Question", "誰が話していますか")
            .with_options(vec!["田中".into(), "鈴木".into(), "佐藤".into(), "山田".into()])
    }

    #[test]
    fn round_trip_is_exact() {
        let q = sample();
        let json = serialize(&q).unwrap();
        let back = deserialize(Section::Dialogue, &json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn round_trip_without_options() {
        let q = Question::new(Section::PhraseMatch)
            .with_field("Situation", "先生に質問があります")
            .with_field("Question", "なんと言いますか");
        let back = deserialize(Section::PhraseMatch, &serialize(&q).unwrap()).unwrap();
        assert_eq!(back, q);
        assert!(back.options.is_none());
    }

    #[test]
    fn flatten_uses_schema_order() {
        let text = flatten(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Introduction: "));
        assert!(lines[1].starts_with("Conversation: "));
        assert!(lines[2].starts_with("Question: "));
    }

    #[test]
    fn flatten_excludes_options() {
        assert!(!flatten(&sample()).contains("田中"));
    }

    #[test]
    fn flatten_tolerates_missing_fields() {
        let q = Question::new(Section::PhraseMatch).with_field("Question", "どうしますか");
        assert_eq!(flatten(&q), "Situation: \nQuestion: どうしますか");
    }

    #[test]
    fn serialized_output_is_deterministic() {
        let a = serialize(&sample()).unwrap();
        let b = serialize(&sample()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn deserialize_rejects_non_object() {
        assert!(deserialize(Section::Dialogue, "[1,2]").is_err());
        assert!(deserialize(Section::Dialogue, "not json").is_err());
    }
}
