use anyhow::Result;
use std::path::Path;

use crate::config::KikitoriConfig;
use crate::question::ingest;

/// Index every question file found in a directory.
pub fn index(config: &KikitoriConfig, dir: Option<&Path>) -> Result<()> {
    let questions_dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => config.resolved_questions_dir(),
    };

    let mut store = super::open_store(config)?;
    let reports = ingest::ingest_dir(&mut store, &questions_dir)?;

    if reports.is_empty() {
        println!("No question files found in {}", questions_dir.display());
        return Ok(());
    }

    let mut total_added = 0;
    for (path, section, outcome) in &reports {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        if outcome.skipped_file {
            println!("  {name} [{section}]: already ingested, skipped");
        } else {
            println!(
                "  {name} [{section}]: {} added, {} invalid, {} duplicate",
                outcome.added, outcome.skipped_invalid, outcome.skipped_duplicate
            );
        }
        total_added += outcome.added;
    }

    println!(
        "\nIndexed {} new question(s) from {} file(s).",
        total_added,
        reports.len()
    );
    Ok(())
}
