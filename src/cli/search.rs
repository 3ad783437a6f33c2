use anyhow::Result;

use crate::config::KikitoriConfig;
use crate::question::search::SearchOutcome;
use crate::question::types::Section;

/// Run an interactive search from the terminal.
pub fn search(config: &KikitoriConfig, section: Section, query: &str, k: Option<usize>) -> Result<()> {
    let store = super::open_store(config)?;
    let k = k.unwrap_or(config.retrieval.default_results);

    match store.search(section, query, k) {
        SearchOutcome::Degraded(reason) => {
            println!("Search degraded, no results: {reason}");
        }
        SearchOutcome::Ranked(hits) if hits.is_empty() => {
            println!("No similar questions found.");
        }
        SearchOutcome::Ranked(hits) => {
            println!("Found {} similar question(s) in {section}:\n", hits.len());
            for (i, hit) in hits.iter().enumerate() {
                println!("  {}. {} (distance: {:.4})", i + 1, hit.id, hit.distance);
                for label in section.schema().flatten_order {
                    if let Some(value) = hit.question.fields.get(*label) {
                        println!("     {label}: {value}");
                    }
                }
                if let Some(options) = &hit.question.options {
                    for (letter, option) in ["A", "B", "C", "D"].iter().zip(options) {
                        println!("     {letter}) {option}");
                    }
                }
                println!();
            }
        }
    }

    Ok(())
}
