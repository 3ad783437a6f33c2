//! Ingestion pipeline — parsing delimited question files and driving batched,
//! idempotent insertion.
//!
//! The file format is plain text with `<question>` / `</question>` blocks;
//! recognized labels consume the following line as the field value. Parsing is
//! lenient by design: malformed input degrades to dropped records, never to a
//! whole-file error. Idempotence is layered — a fully ingested file is skipped
//! wholesale, and the collection's per-id dedup gate catches anything finer.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::question::store::{AddOutcome, QuestionVectorStore};
use crate::question::types::{Question, Section};

const RECORD_OPEN: &str = "<question>";
const RECORD_CLOSE: &str = "</question>";
const FIELD_LABELS: [&str; 4] = ["Introduction:", "Conversation:", "Situation:", "Question:"];
const OPTION_PREFIXES: [&str; 4] = ["A)", "B)", "C)", "D)"];

/// Counts reported from ingesting one file.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct IngestOutcome {
    /// Records parsed out of the file.
    pub parsed: usize,
    pub added: usize,
    pub skipped_invalid: usize,
    pub skipped_duplicate: usize,
    /// True when the whole file was skipped as already ingested.
    pub skipped_file: bool,
}

impl IngestOutcome {
    fn from_add(parsed: usize, add: AddOutcome) -> Self {
        Self {
            parsed,
            added: add.added,
            skipped_invalid: add.skipped_invalid,
            skipped_duplicate: add.skipped_duplicate,
            skipped_file: false,
        }
    }
}

/// Parse `<question>`-delimited records out of a text file's contents.
///
/// A record-open marker starts a fresh record (discarding any in-progress
/// one); a close marker commits it. Field labels take the next line as their
/// value; `Options:` takes up to four following `A)`–`D)` lines. Lines outside
/// a record, unrecognized lines inside one, and unclosed trailing records are
/// all silently dropped.
pub fn parse_questions(input: &str, section: Section) -> Vec<Question> {
    let lines: Vec<&str> = input.lines().map(str::trim).collect();
    let mut questions = Vec::new();
    let mut current: Option<Question> = None;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if line.starts_with(RECORD_OPEN) {
            current = Some(Question::new(section));
        } else if line.starts_with(RECORD_CLOSE) {
            if let Some(question) = current.take() {
                if !question.fields.is_empty() || question.options.is_some() {
                    questions.push(question);
                }
            }
        } else if let Some(question) = current.as_mut() {
            if let Some(label) = FIELD_LABELS.iter().find(|l| line.starts_with(**l)) {
                i += 1;
                if let Some(value) = lines.get(i) {
                    question
                        .fields
                        .insert(label.trim_end_matches(':').to_string(), (*value).to_string());
                }
            } else if line.starts_with("Options:") {
                let mut options = Vec::new();
                while options.len() < OPTION_PREFIXES.len() {
                    let Some(&next) = lines.get(i + 1) else { break };
                    let Some(prefix) = OPTION_PREFIXES.iter().find(|p| next.starts_with(**p))
                    else {
                        break;
                    };
                    options.push(next[prefix.len()..].trim().to_string());
                    i += 1;
                }
                question.options = Some(options);
            }
        }

        i += 1;
    }

    questions
}

/// Derive the source id from a question file name: the stem up to `_section`.
/// `abc123_section2.txt` → `abc123`.
pub fn source_id_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.find("_section") {
        Some(pos) => stem[..pos].to_string(),
        None => stem,
    }
}

/// Ingest one question file into the store.
///
/// If every document the file would produce is already present (counted per
/// source id), the file is skipped wholesale. Otherwise the parsed records go
/// through [`QuestionVectorStore::add_questions`], whose per-id dedup still
/// applies underneath.
pub fn ingest_file(
    store: &mut QuestionVectorStore,
    path: &Path,
    section: Section,
) -> Result<IngestOutcome> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question file {}", path.display()))?;
    let source_id = source_id_from_path(path);

    let questions = parse_questions(&contents, section);
    if questions.is_empty() {
        warn!(path = %path.display(), "no questions parsed from file");
        return Ok(IngestOutcome::default());
    }

    if store.count_from_source(section, &source_id)? >= questions.len() {
        info!(path = %path.display(), source = %source_id, "already ingested, skipping file");
        return Ok(IngestOutcome {
            parsed: questions.len(),
            skipped_file: true,
            ..IngestOutcome::default()
        });
    }

    let add = store.add_questions(section, &questions, &source_id)?;
    Ok(IngestOutcome::from_add(questions.len(), add))
}

/// Ingest every `*_section2.txt` / `*_section3.txt` file in a directory.
///
/// Per-file failures (unreadable file, storage error) are logged and skipped;
/// the pipeline always continues to the next file.
pub fn ingest_dir(
    store: &mut QuestionVectorStore,
    dir: &Path,
) -> Result<Vec<(PathBuf, Section, IngestOutcome)>> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read questions directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    let mut reports = Vec::new();
    for path in entries {
        let Some(section) = section_for_file(&path) else {
            continue;
        };
        match ingest_file(store, &path, section) {
            Ok(outcome) => reports.push((path, section, outcome)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping file");
            }
        }
    }
    Ok(reports)
}

/// Which section a question file belongs to, judged by its name suffix.
fn section_for_file(path: &Path) -> Option<Section> {
    let name = path.file_name()?.to_str()?;
    if name.ends_with("_section2.txt") {
        Some(Section::Dialogue)
    } else if name.ends_with("_section3.txt") {
        Some(Section::PhraseMatch)
    } else {
        None
    }
}
