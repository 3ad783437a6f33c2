//! SQL DDL for collection table pairs.
//!
//! Each collection is a main table holding the recoverable document state and
//! a vec0 virtual table holding the embedding, joined by `id`. All DDL uses
//! `IF NOT EXISTS`, so creating a collection that already exists is a no-op
//! and never touches existing rows — the get-or-create contract.

use rusqlite::Connection;

/// Create the table pair for a collection if it does not already exist.
///
/// `name` must come from the closed set of section collection names; it is
/// interpolated into DDL, never from user input. `dim` is fixed by the
/// embedding provider at construction time and baked into the vec0 column.
pub fn create_collection(conn: &Connection, name: &str, dim: usize) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        r#"
CREATE TABLE IF NOT EXISTS "{name}" (
    id TEXT PRIMARY KEY,
    document TEXT NOT NULL,
    full_structure TEXT NOT NULL,
    source_file TEXT NOT NULL,
    section INTEGER NOT NULL,
    position INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS "idx_{name}_source" ON "{name}"(source_file);
"#
    ))?;

    // vec0 tables use sqlite-vec syntax and must be created separately
    conn.execute_batch(&format!(
        r#"CREATE VIRTUAL TABLE IF NOT EXISTS "{name}_vec" USING vec0(
    id TEXT PRIMARY KEY,
    embedding FLOAT[{dim}]
);"#
    ))?;

    Ok(())
}
