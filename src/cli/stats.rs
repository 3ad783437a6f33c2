use anyhow::Result;

use crate::config::KikitoriConfig;
use crate::embedding::EMBEDDING_DIM;
use crate::question::collection::Collection;
use crate::question::types::Section;

/// Print a summary of indexed questions per section.
pub fn stats(config: &KikitoriConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path)?;

    println!("Question Store Contents");
    println!("{}", "=".repeat(40));

    for section in Section::ALL {
        let collection =
            Collection::get_or_create(&conn, section.schema().collection, EMBEDDING_DIM)?;
        let count = collection.len(&conn)?;
        let files = collection.source_files(&conn)?;

        println!("\n{section} ({}):", collection.name());
        if count == 0 {
            println!("  no questions indexed");
            continue;
        }
        println!("  {count} question(s) from {} file(s)", files.len());
        for file in files {
            println!("    - {file}");
        }
    }

    if let Ok(meta) = std::fs::metadata(&db_path) {
        println!("\nDatabase size: {} bytes", meta.len());
    }
    Ok(())
}
