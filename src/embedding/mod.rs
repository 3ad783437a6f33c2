//! Text-to-vector embedding pipeline.
//!
//! Provides the [`EmbeddingProvider`] trait, a local implementation backed by
//! multilingual-e5-base (768 dimensions, L2-normalized), and the
//! [`LossyEmbedder`] wrapper that substitutes zero vectors on provider failure
//! so ingestion never blocks on a broken model.

pub mod local;

use anyhow::Result;

/// Number of dimensions in the embedding vectors (multilingual-e5-base).
pub const EMBEDDING_DIM: usize = 768;

/// Trait for embedding text into vectors.
///
/// Implementations produce L2-normalized vectors of exactly
/// [`dimensions`](EmbeddingProvider::dimensions) length, one per input, in
/// input order. All methods are synchronous.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of text strings. Implementations may override for batched inference.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Return the number of dimensions this provider produces.
    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Create an embedding provider from config.
///
/// Currently only `"local"` is supported (ONNX Runtime + multilingual-e5-base).
/// Returns an error if model files are not found — run `kikitori model download` first.
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "local" => {
            let provider = local::LocalEmbeddingProvider::new(config)?;
            Ok(Box::new(provider))
        }
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: local"),
    }
}

/// Wraps a provider with the store's availability-over-correctness policy:
/// a failed embedding call yields zero vectors instead of an error.
///
/// Zero vectors carry no similarity signal — documents stored through a failed
/// batch will rank arbitrarily — but indexing completes and the documents stay
/// recoverable from their metadata. Known weakness, accepted deliberately.
pub struct LossyEmbedder {
    provider: Box<dyn EmbeddingProvider>,
}

impl LossyEmbedder {
    pub fn new(provider: Box<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    pub fn dimensions(&self) -> usize {
        self.provider.dimensions()
    }

    /// Embed a batch, substituting zero vectors for the whole batch on failure.
    ///
    /// Always returns exactly `texts.len()` vectors in input order.
    pub fn embed_batch_lossy(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        if texts.is_empty() {
            return Vec::new();
        }
        match self.provider.embed_batch(texts) {
            Ok(vectors) => vectors,
            Err(err) => {
                tracing::warn!(
                    batch = texts.len(),
                    error = %err,
                    "embedding failed, storing zero vectors"
                );
                vec![vec![0.0; self.provider.dimensions()]; texts.len()]
            }
        }
    }

    /// Embed a single text, propagating failure.
    ///
    /// Used on the query path, where a zero vector would silently return
    /// arbitrary neighbors — the caller degrades explicitly instead.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.provider.embed(text)
    }
}
