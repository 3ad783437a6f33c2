//! Write path — validation, flattening, embedding, and deduplicated storage.
//!
//! [`QuestionVectorStore`] is the single entry point. It owns the database
//! connection, the embedder, and one [`Collection`] per section, all built at
//! open time from explicit configuration. Writes validate against the section
//! schema before anything is flattened or embedded, then pass through the
//! collection's id-membership dedup gate.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::db;
use crate::embedding::{EmbeddingProvider, LossyEmbedder};
use crate::question::codec;
use crate::question::collection::{Collection, NewDocument, UpsertOutcome};
use crate::question::document_id;
use crate::question::types::{Question, Section};

/// Counts reported from a batch add. Partial failure is reported here, never
/// raised.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddOutcome {
    /// Documents newly stored.
    pub added: usize,
    /// Records rejected by schema validation before embedding.
    pub skipped_invalid: usize,
    /// Records whose id already existed; existing payloads untouched.
    pub skipped_duplicate: usize,
}

impl std::fmt::Display for AddOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} added, {} invalid, {} duplicate",
            self.added, self.skipped_invalid, self.skipped_duplicate
        )
    }
}

/// The question vector store: one collection per [`Section`], shared
/// connection, shared embedder.
pub struct QuestionVectorStore {
    conn: rusqlite::Connection,
    embedder: LossyEmbedder,
    collections: HashMap<Section, Collection>,
}

impl QuestionVectorStore {
    /// Open (or create) the store at `db_path` with the given provider.
    pub fn open(db_path: impl AsRef<Path>, provider: Box<dyn EmbeddingProvider>) -> Result<Self> {
        let conn = db::open_database(db_path)?;
        Self::with_connection(conn, provider)
    }

    /// Open an in-memory store (tests, throwaway experiments).
    pub fn open_in_memory(provider: Box<dyn EmbeddingProvider>) -> Result<Self> {
        let conn = db::open_memory_database()?;
        Self::with_connection(conn, provider)
    }

    fn with_connection(
        conn: rusqlite::Connection,
        provider: Box<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let embedder = LossyEmbedder::new(provider);
        let mut collections = HashMap::new();
        for section in Section::ALL {
            let collection =
                Collection::get_or_create(&conn, section.schema().collection, embedder.dimensions())?;
            collections.insert(section, collection);
        }
        Ok(Self {
            conn,
            embedder,
            collections,
        })
    }

    fn collection(&self, section: Section) -> &Collection {
        // Every section got a collection at open
        &self.collections[&section]
    }

    pub(crate) fn collection_for(&self, section: Section) -> &Collection {
        self.collection(section)
    }

    /// Add a batch of questions from one source file.
    ///
    /// Per record, in order: schema validation (invalid records are skipped
    /// with a warning and never reach the embedder), id derivation from
    /// `(source_id, section, ordinal)`, duplicate check by indexed id lookup.
    /// Surviving records are flattened and embedded in a single batch, then
    /// inserted one by one through the collection's dedup gate.
    pub fn add_questions(
        &mut self,
        section: Section,
        questions: &[Question],
        source_id: &str,
    ) -> Result<AddOutcome> {
        let mut outcome = AddOutcome::default();
        let collection = self.collections[&section].clone();

        // (ordinal, id, flattened text, metadata JSON)
        let mut pending: Vec<(usize, String, String, String)> = Vec::new();

        for (ordinal, question) in questions.iter().enumerate() {
            let missing = question.missing_fields();
            if !missing.is_empty() {
                warn!(
                    section = %section,
                    source = source_id,
                    ordinal,
                    missing = ?missing,
                    "skipping malformed question"
                );
                outcome.skipped_invalid += 1;
                continue;
            }

            let id = document_id(source_id, section, ordinal);
            if collection.get(&self.conn, &id)?.is_some() {
                outcome.skipped_duplicate += 1;
                continue;
            }

            let text = codec::flatten(question);
            let metadata = codec::serialize(question)?;
            pending.push((ordinal, id, text, metadata));
        }

        if pending.is_empty() {
            info!(section = %section, source = source_id, %outcome, "nothing new to index");
            return Ok(outcome);
        }

        let texts: Vec<&str> = pending.iter().map(|(_, _, text, _)| text.as_str()).collect();
        let embeddings = self.embedder.embed_batch_lossy(&texts);

        for ((ordinal, id, text, metadata), embedding) in pending.iter().zip(&embeddings) {
            let upserted = collection.upsert_if_absent(
                &mut self.conn,
                &NewDocument {
                    id,
                    embedding,
                    document: text,
                    full_structure: metadata,
                    source_file: source_id,
                    section: i64::from(section.number()),
                    position: *ordinal as i64,
                },
            )?;
            match upserted {
                UpsertOutcome::Inserted => outcome.added += 1,
                UpsertOutcome::Skipped => outcome.skipped_duplicate += 1,
            }
        }

        info!(section = %section, source = source_id, %outcome, "indexed batch");
        Ok(outcome)
    }

    /// Fetch a question by document id, decoded from its lossless metadata.
    pub fn get_question(&self, section: Section, id: &str) -> Result<Option<Question>> {
        let Some(doc) = self.collection(section).get(&self.conn, id)? else {
            return Ok(None);
        };
        let question = codec::deserialize(section, &doc.full_structure)
            .with_context(|| format!("corrupt metadata for document {id}"))?;
        Ok(Some(question))
    }

    /// Delete a question by document id. Returns whether it existed.
    pub fn delete_question(&mut self, section: Section, id: &str) -> Result<bool> {
        self.collections[&section]
            .clone()
            .delete(&mut self.conn, id)
    }

    /// Number of documents stored for a section.
    pub fn count(&self, section: Section) -> Result<usize> {
        self.collection(section).len(&self.conn)
    }

    /// Number of documents stored for a section from one source file.
    pub fn count_from_source(&self, section: Section, source_id: &str) -> Result<usize> {
        self.collection(section).count_from_source(&self.conn, source_id)
    }

    /// Distinct source files indexed for a section.
    pub fn source_files(&self, section: Section) -> Result<Vec<String>> {
        self.collection(section).source_files(&self.conn)
    }

    pub(crate) fn connection(&self) -> &rusqlite::Connection {
        &self.conn
    }

    pub(crate) fn embedder(&self) -> &LossyEmbedder {
        &self.embedder
    }
}
