//! Kikitori — a question vector store for retrieval-grounded quiz generation.
//!
//! Kikitori indexes structured listening-comprehension quiz questions into a
//! persistent, similarity-searchable store. Question generators query it for
//! the nearest existing questions to a topic and feed them back as few-shot
//! context, so generated questions stay stylistically close to real past
//! material.
//!
//! Questions are partitioned into one collection per **section**:
//!
//! | Section | Shape | Collection |
//! |---------|-------|------------|
//! | **Dialogue** (2) | introduction + conversation + question | `section2_questions` |
//! | **PhraseMatch** (3) | situation + question | `section3_questions` |
//!
//! # Architecture
//!
//! - **Storage**: SQLite with [sqlite-vec](https://github.com/asg017/sqlite-vec)
//!   for vector KNN; one table pair per collection, created lazily
//! - **Embeddings**: local ONNX Runtime with multilingual-e5-base (768
//!   dimensions, L2-normalized)
//! - **Ingestion**: lenient line-oriented parser for `<question>`-delimited
//!   text files, idempotent at both file and document granularity
//! - **Identity**: document IDs are derived from `(source file, section,
//!   ordinal)`, so re-indexing the same material is always a no-op
//!
//! # Modules
//!
//! - [`config`] — configuration loading from a TOML file and environment variables
//! - [`db`] — SQLite bootstrap: sqlite-vec registration, WAL, lazy collection schema
//! - [`embedding`] — text-to-vector embedding pipeline via ONNX Runtime
//! - [`question`] — the store itself: types, codec, collections, search, ingestion

pub mod cli;
pub mod config;
pub mod db;
pub mod embedding;
pub mod question;
