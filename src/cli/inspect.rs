use anyhow::Result;

use crate::config::KikitoriConfig;
use crate::embedding::EMBEDDING_DIM;
use crate::question::codec;
use crate::question::collection::Collection;
use crate::question::types::Section;

/// Print a single stored question by document id.
///
/// Reads the collection directly — no embedding provider needed.
pub fn get(config: &KikitoriConfig, section: Section, id: &str) -> Result<()> {
    let conn = crate::db::open_database(config.resolved_db_path())?;
    let collection = Collection::get_or_create(&conn, section.schema().collection, EMBEDDING_DIM)?;

    match collection.get(&conn, id)? {
        None => println!("No question with id {id} in {section}"),
        Some(doc) => {
            let question = codec::deserialize(section, &doc.full_structure)?;
            println!("{id} [{section}] from {}", doc.source_file);
            for (name, value) in &question.fields {
                println!("  {name}: {value}");
            }
            if let Some(options) = &question.options {
                for (letter, option) in ["A", "B", "C", "D"].iter().zip(options) {
                    println!("  {letter}) {option}");
                }
            }
        }
    }
    Ok(())
}

/// Delete a stored question by document id.
pub fn delete(config: &KikitoriConfig, section: Section, id: &str) -> Result<()> {
    let mut conn = crate::db::open_database(config.resolved_db_path())?;
    let collection = Collection::get_or_create(&conn, section.schema().collection, EMBEDDING_DIM)?;

    if collection.delete(&mut conn, id)? {
        println!("Deleted {id} from {section}");
    } else {
        println!("No question with id {id} in {section}");
    }
    Ok(())
}
