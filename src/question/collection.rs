//! A collection — one named, persistent partition of the store.
//!
//! Each collection owns a table pair (`"{name}"` + `"{name}_vec"`) and its own
//! identifier space. [`Collection::get_or_create`] is the only way to obtain a
//! handle, so the tables always exist by the time any operation runs.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db;
use crate::question::embedding_to_bytes;

/// Outcome of [`Collection::upsert_if_absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The id was new; the document is now stored.
    Inserted,
    /// The id already existed; nothing was written. The existing payload wins.
    Skipped,
}

/// A document about to be persisted.
#[derive(Debug)]
pub struct NewDocument<'a> {
    pub id: &'a str,
    pub embedding: &'a [f32],
    /// Flattened searchable text, rebuildable from `full_structure`.
    pub document: &'a str,
    /// Lossless JSON of the original question — the authoritative state.
    pub full_structure: &'a str,
    pub source_file: &'a str,
    pub section: i64,
    pub position: i64,
}

/// A document as read back from a collection.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: String,
    pub document: String,
    pub full_structure: String,
    pub source_file: String,
    pub section: i64,
    pub position: i64,
    pub created_at: String,
}

/// Handle to one collection. Cheap to construct; all operations borrow the
/// store's connection.
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    dim: usize,
}

impl Collection {
    /// Idempotently create the collection's tables and return a handle.
    ///
    /// An existing collection keeps its documents and its embedding
    /// dimensionality untouched.
    pub fn get_or_create(conn: &Connection, name: &str, dim: usize) -> Result<Self> {
        db::schema::create_collection(conn, name, dim)
            .with_context(|| format!("failed to create collection {name}"))?;
        Ok(Self {
            name: name.to_string(),
            dim,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a document unless its id is already present.
    ///
    /// The id-membership check and both inserts run in one transaction, so the
    /// check-then-insert is atomic on the owning connection. Dedup is purely
    /// by primary key: identical content under two ids stays two documents.
    pub fn upsert_if_absent(
        &self,
        conn: &mut Connection,
        doc: &NewDocument<'_>,
    ) -> Result<UpsertOutcome> {
        anyhow::ensure!(
            doc.embedding.len() == self.dim,
            "embedding has {} dimensions, collection {} expects {}",
            doc.embedding.len(),
            self.name,
            self.dim
        );

        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(
            &format!(r#"SELECT COUNT(*) > 0 FROM "{}" WHERE id = ?1"#, self.name),
            params![doc.id],
            |row| row.get(0),
        )?;
        if exists {
            return Ok(UpsertOutcome::Skipped);
        }

        let now = chrono::Utc::now().to_rfc3339();
        tx.execute(
            &format!(
                r#"INSERT INTO "{}" (id, document, full_structure, source_file, section, position, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
                self.name
            ),
            params![
                doc.id,
                doc.document,
                doc.full_structure,
                doc.source_file,
                doc.section,
                doc.position,
                now,
            ],
        )?;
        tx.execute(
            &format!(r#"INSERT INTO "{}_vec" (id, embedding) VALUES (?1, ?2)"#, self.name),
            params![doc.id, embedding_to_bytes(doc.embedding)],
        )?;

        tx.commit()?;
        Ok(UpsertOutcome::Inserted)
    }

    /// Fetch a document by id.
    pub fn get(&self, conn: &Connection, id: &str) -> Result<Option<StoredDocument>> {
        let doc = conn
            .query_row(
                &format!(
                    r#"SELECT id, document, full_structure, source_file, section, position, created_at
                     FROM "{}" WHERE id = ?1"#,
                    self.name
                ),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(doc)
    }

    /// Delete a document from both tables. Returns whether anything existed.
    pub fn delete(&self, conn: &mut Connection, id: &str) -> Result<bool> {
        let tx = conn.transaction()?;
        let rows = tx.execute(
            &format!(r#"DELETE FROM "{}" WHERE id = ?1"#, self.name),
            params![id],
        )?;
        tx.execute(
            &format!(r#"DELETE FROM "{}_vec" WHERE id = ?1"#, self.name),
            params![id],
        )?;
        tx.commit()?;
        Ok(rows > 0)
    }

    /// K-nearest-neighbor query, ascending distance.
    ///
    /// Ties break by main-table rowid, i.e. insertion order — the underlying
    /// index leaves tie order unspecified, so we impose a deterministic one.
    pub fn query(
        &self,
        conn: &Connection,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<(StoredDocument, f64)>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut stmt = conn.prepare(&format!(
            r#"SELECT id, distance FROM "{}_vec" WHERE embedding MATCH ?1 ORDER BY distance LIMIT {k}"#,
            self.name
        ))?;
        let neighbors: Vec<(String, f64)> = stmt
            .query_map(params![embedding_to_bytes(embedding)], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if neighbors.is_empty() {
            return Ok(Vec::new());
        }

        // Hydrate the full documents, carrying rowid for the tie-break.
        let placeholders: Vec<String> = (1..=neighbors.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            r#"SELECT rowid, id, document, full_structure, source_file, section, position, created_at
             FROM "{}" WHERE id IN ({})"#,
            self.name,
            placeholders.join(", ")
        );
        let mut stmt = conn.prepare(&sql)?;
        let bind: Vec<&dyn rusqlite::types::ToSql> = neighbors
            .iter()
            .map(|(id, _)| id as &dyn rusqlite::types::ToSql)
            .collect();

        let mut by_id = std::collections::HashMap::new();
        let rows = stmt.query_map(bind.as_slice(), |row| {
            let rowid: i64 = row.get(0)?;
            Ok((
                rowid,
                StoredDocument {
                    id: row.get(1)?,
                    document: row.get(2)?,
                    full_structure: row.get(3)?,
                    source_file: row.get(4)?,
                    section: row.get(5)?,
                    position: row.get(6)?,
                    created_at: row.get(7)?,
                },
            ))
        })?;
        for row in rows {
            let (rowid, doc) = row?;
            by_id.insert(doc.id.clone(), (rowid, doc));
        }

        let mut results: Vec<(i64, StoredDocument, f64)> = neighbors
            .into_iter()
            .filter_map(|(id, distance)| {
                by_id
                    .remove(&id)
                    .map(|(rowid, doc)| (rowid, doc, distance))
            })
            .collect();
        results.sort_by(|a, b| {
            a.2.partial_cmp(&b.2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        Ok(results.into_iter().map(|(_, doc, d)| (doc, d)).collect())
    }

    /// Number of documents in the collection.
    pub fn len(&self, conn: &Connection) -> Result<usize> {
        let count: i64 = conn.query_row(
            &format!(r#"SELECT COUNT(*) FROM "{}""#, self.name),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn is_empty(&self, conn: &Connection) -> Result<bool> {
        Ok(self.len(conn)? == 0)
    }

    /// Number of documents that came from the given source file.
    pub fn count_from_source(&self, conn: &Connection, source_id: &str) -> Result<usize> {
        let count: i64 = conn.query_row(
            &format!(
                r#"SELECT COUNT(*) FROM "{}" WHERE source_file = ?1"#,
                self.name
            ),
            params![source_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Distinct source files represented in the collection, sorted.
    pub fn source_files(&self, conn: &Connection) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(&format!(
            r#"SELECT DISTINCT source_file FROM "{}" ORDER BY source_file"#,
            self.name
        ))?;
        let files = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(files)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredDocument> {
        Ok(StoredDocument {
            id: row.get(0)?,
            document: row.get(1)?,
            full_structure: row.get(2)?,
            source_file: row.get(3)?,
            section: row.get(4)?,
            position: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}
