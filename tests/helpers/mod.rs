#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use kikitori::embedding::EmbeddingProvider;
use kikitori::question::store::QuestionVectorStore;
use kikitori::question::types::{Question, Section};

/// Embedding dimensionality used by the test providers. Small on purpose.
pub const TEST_DIM: usize = 32;

/// Deterministic text-shaped provider: each byte of the input bumps one
/// dimension, then the vector is L2-normalized. Identical texts embed
/// identically (distance 0); different texts almost surely differ.
pub struct HashProvider;

impl EmbeddingProvider for HashProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; TEST_DIM];
        for byte in text.bytes() {
            v[byte as usize % TEST_DIM] += 1.0;
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        TEST_DIM
    }
}

/// Provider that always fails, for degraded-path tests.
pub struct FailingProvider;

impl EmbeddingProvider for FailingProvider {
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        anyhow::bail!("embedding model is down")
    }

    fn dimensions(&self) -> usize {
        TEST_DIM
    }
}

/// Wraps [`HashProvider`] and counts every text that reaches the model,
/// so tests can assert what was (not) embedded.
pub struct CountingProvider {
    pub calls: Arc<AtomicUsize>,
}

impl CountingProvider {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Self { calls: Arc::clone(&calls) }, calls)
    }
}

impl EmbeddingProvider for CountingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        HashProvider.embed(text)
    }

    fn dimensions(&self) -> usize {
        TEST_DIM
    }
}

/// Fresh in-memory store over the hash provider.
pub fn test_store() -> QuestionVectorStore {
    QuestionVectorStore::open_in_memory(Box::new(HashProvider)).unwrap()
}

/// Fresh in-memory store over an arbitrary provider.
pub fn store_with(provider: Box<dyn EmbeddingProvider>) -> QuestionVectorStore {
    QuestionVectorStore::open_in_memory(provider).unwrap()
}

pub fn dialogue_question(intro: &str, conversation: &str, prompt: &str) -> Question {
    Question::new(Section::Dialogue)
        .with_field("Introduction", intro)
        .with_field("Conversation", conversation)
        .with_field("Question", prompt)
        .with_options(vec!["一".into(), "二".into(), "三".into(), "四".into()])
}

pub fn phrase_question(situation: &str, prompt: &str) -> Question {
    Question::new(Section::PhraseMatch)
        .with_field("Situation", situation)
        .with_field("Question", prompt)
        .with_options(vec!["はい".into(), "いいえ".into()])
}

/// Render questions back into the ingestion file format.
pub fn render_question_file(questions: &[Question]) -> String {
    let mut out = String::new();
    for q in questions {
        out.push_str("<question>\n");
        for label in q.section.schema().flatten_order {
            if let Some(value) = q.field(label) {
                out.push_str(label);
                out.push_str(":\n");
                out.push_str(value);
                out.push('\n');
            }
        }
        if let Some(options) = &q.options {
            out.push_str("Options:\n");
            for (letter, option) in ["A", "B", "C", "D"].iter().zip(options) {
                out.push_str(&format!("{letter}) {option}\n"));
            }
        }
        out.push_str("</question>\n");
    }
    out
}
