pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use sqlite_vec::sqlite3_vec_init;
use std::path::Path;
use std::sync::Once;

static SQLITE_VEC_INIT: Once = Once::new();

/// Register the sqlite-vec extension globally. Safe to call multiple times.
pub fn load_sqlite_vec() {
    SQLITE_VEC_INIT.call_once(|| unsafe {
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite3_vec_init as *const (),
        )));
    });
}

/// Open (or create) the question database at the given path, with the vector
/// extension loaded.
///
/// Collection tables are not created here — each collection creates its own
/// table pair on first access (see [`schema::create_collection`]).
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    load_sqlite_vec();

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    // WAL for better concurrent read performance
    conn.pragma_update(None, "journal_mode", "WAL")?;

    tracing::info!(path = %path.display(), "database opened");
    Ok(conn)
}

/// Open an in-memory database (used by tests and throwaway stores).
pub fn open_memory_database() -> Result<Connection> {
    load_sqlite_vec();
    Connection::open_in_memory().context("failed to open in-memory database")
}
