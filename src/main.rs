use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kikitori::cli;
use kikitori::config::KikitoriConfig;
use kikitori::question::types::Section;

#[derive(Parser)]
#[command(name = "kikitori", version, about = "Question vector store for retrieval-grounded quiz generation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index question files from a directory into the store
    Index {
        /// Directory of *_section2.txt / *_section3.txt files (default: configured questions dir)
        dir: Option<PathBuf>,
    },
    /// Search a section for questions similar to a query
    Search {
        /// Section: 2 (dialogue) or 3 (phrase matching)
        section: Section,
        /// Query text (topic, phrase, or full question)
        query: String,
        /// Number of results
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Show one stored question by document id
    Get {
        section: Section,
        id: String,
    },
    /// Delete a stored question by document id
    Delete {
        section: Section,
        id: String,
    },
    /// Summarize indexed questions per section
    Stats,
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.kikitori/models/
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = KikitoriConfig::load()?;

    // Log to stderr so stdout stays clean for command output.
    let filter = EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Index { dir } => cli::index::index(&config, dir.as_deref())?,
        Command::Search { section, query, k } => {
            cli::search::search(&config, section, &query, k)?;
        }
        Command::Get { section, id } => cli::inspect::get(&config, section, &id)?,
        Command::Delete { section, id } => cli::inspect::delete(&config, section, &id)?,
        Command::Stats => cli::stats::stats(&config)?,
        Command::Model { action } => match action {
            ModelAction::Download => cli::model_download(&config.embedding).await?,
        },
    }

    Ok(())
}
