pub mod index;
pub mod inspect;
pub mod search;
pub mod stats;

use anyhow::{Context, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use crate::config::KikitoriConfig;
use crate::question::store::QuestionVectorStore;

const MODEL_URL: &str =
    "https://huggingface.co/intfloat/multilingual-e5-base/resolve/main/onnx/model.onnx";
const TOKENIZER_URL: &str =
    "https://huggingface.co/intfloat/multilingual-e5-base/resolve/main/tokenizer.json";

/// Open the configured store with a real embedding provider.
pub fn open_store(config: &KikitoriConfig) -> Result<QuestionVectorStore> {
    let provider = crate::embedding::create_provider(&config.embedding)?;
    QuestionVectorStore::open(config.resolved_db_path(), provider)
}

/// Download the ONNX embedding model and tokenizer to the cache directory.
pub async fn model_download(config: &crate::config::EmbeddingConfig) -> Result<()> {
    let cache_dir = crate::config::expand_tilde(&config.cache_dir);
    std::fs::create_dir_all(&cache_dir)
        .with_context(|| format!("failed to create cache dir: {}", cache_dir.display()))?;

    let model_path = cache_dir.join("model.onnx");
    let tokenizer_path = cache_dir.join("tokenizer.json");

    if model_path.exists() {
        println!("Model already exists at {}", model_path.display());
    } else {
        println!("Downloading model.onnx (~1.1GB)...");
        download_file(MODEL_URL, &model_path).await?;
        println!("Model saved to {}", model_path.display());
    }

    if tokenizer_path.exists() {
        println!("Tokenizer already exists at {}", tokenizer_path.display());
    } else {
        println!("Downloading tokenizer.json...");
        download_file(TOKENIZER_URL, &tokenizer_path).await?;
        println!("Tokenizer saved to {}", tokenizer_path.display());
    }

    println!("Model download complete. Ready for indexing.");
    Ok(())
}

/// Download a file from a URL to disk, chunk by chunk, with a progress bar.
/// The model is over a gigabyte, so the body is never held in memory whole.
/// Uses atomic write (tmp + rename).
async fn download_file(url: &str, dest: &PathBuf) -> Result<()> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("HTTP request failed for {url}"))?;

    anyhow::ensure!(
        response.status().is_success(),
        "download failed with HTTP {}",
        response.status()
    );

    let pb = match response.content_length() {
        Some(size) => {
            let pb = ProgressBar::new(size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  {bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})")
                    .expect("valid template")
                    .progress_chars("##-"),
            );
            pb
        }
        None => ProgressBar::new_spinner(),
    };

    let tmp_path = dest.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp_path)
        .await
        .with_context(|| format!("failed to create temp file: {}", tmp_path.display()))?;

    let mut stream = response.bytes_stream();
    write_stream_to_file(&mut stream, &mut file, &pb).await?;

    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp_path, dest)
        .await
        .context("failed to rename temp file")?;

    pb.finish_and_clear();
    Ok(())
}

/// Copy a byte stream to a file chunk by chunk, ticking the bar per chunk.
async fn write_stream_to_file<S, B, E>(
    stream: &mut S,
    file: &mut tokio::fs::File,
    pb: &ProgressBar,
) -> Result<()>
where
    S: futures_util::Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("error reading response")?;
        file.write_all(chunk.as_ref())
            .await
            .context("error writing to file")?;
        pb.inc(chunk.as_ref().len() as u64);
    }
    Ok(())
}
