//! Read path — best-effort similarity search.
//!
//! Search supplies optional few-shot context to a question generator, so it
//! never raises: every failure mode collapses into [`SearchOutcome::Degraded`],
//! which callers may collapse further into an empty list. The typed variant
//! exists so callers that *do* care can tell "no matches" from "lookup broke".

use serde::Serialize;
use tracing::warn;

use crate::question::codec;
use crate::question::store::QuestionVectorStore;
use crate::question::types::{Question, Section};

/// One ranked search hit.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredQuestion {
    pub id: String,
    #[serde(flatten)]
    pub question: SerializedQuestion,
    /// Distance to the query embedding; smaller is more similar.
    pub distance: f64,
}

/// Serializable view of a question for hit output.
#[derive(Debug, Clone, Serialize)]
pub struct SerializedQuestion {
    pub fields: std::collections::BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl ScoredQuestion {
    pub fn new(id: String, question: Question, distance: f64) -> Self {
        Self {
            id,
            question: SerializedQuestion {
                fields: question.fields,
                options: question.options,
            },
            distance,
        }
    }

    /// Rebuild the structured question for the given section.
    pub fn into_question(self, section: Section) -> Question {
        Question {
            section,
            fields: self.question.fields,
            options: self.question.options,
        }
    }
}

/// Result of a search call.
#[derive(Debug)]
pub enum SearchOutcome {
    /// Ranked hits, ascending distance. May legitimately be empty.
    Ranked(Vec<ScoredQuestion>),
    /// The lookup itself failed (embedding or store error). Carries the reason
    /// so callers can log it; collapses to no hits for callers that only want
    /// context.
    Degraded(String),
}

impl SearchOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    /// Collapse to a plain hit list: degraded lookups become empty.
    pub fn into_results(self) -> Vec<ScoredQuestion> {
        match self {
            Self::Ranked(hits) => hits,
            Self::Degraded(reason) => {
                warn!(%reason, "search degraded to empty results");
                Vec::new()
            }
        }
    }
}

impl QuestionVectorStore {
    /// Find the `k` stored questions nearest to `query` in one section.
    ///
    /// Embeds the query, runs KNN against the section's collection, and
    /// decodes each hit back to its structured form. Rows with corrupt
    /// metadata are skipped with a warning rather than failing the search.
    pub fn search(&self, section: Section, query: &str, k: usize) -> SearchOutcome {
        let embedding = match self.embedder().embed(query) {
            Ok(embedding) => embedding,
            Err(err) => return SearchOutcome::Degraded(format!("query embedding failed: {err}")),
        };

        let neighbors = match self
            .collection_for(section)
            .query(self.connection(), &embedding, k)
        {
            Ok(neighbors) => neighbors,
            Err(err) => return SearchOutcome::Degraded(format!("vector query failed: {err}")),
        };

        let mut hits = Vec::with_capacity(neighbors.len());
        for (doc, distance) in neighbors {
            match codec::deserialize(section, &doc.full_structure) {
                Ok(question) => hits.push(ScoredQuestion::new(doc.id, question, distance)),
                Err(err) => {
                    warn!(id = %doc.id, error = %err, "skipping hit with corrupt metadata");
                }
            }
        }
        SearchOutcome::Ranked(hits)
    }
}
