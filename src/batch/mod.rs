use crate::{
    config::BatchConfig,
    ledger::Ledger,
    media::{MediaDownloader, PostRef},
};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// Reads the `column` values of a tab-separated table, in row order.
pub fn read_links(path: &Path, column: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Failed to open input table {}", path.display()))?;

    let index = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .iter()
        .position(|header| header.trim() == column)
        .with_context(|| format!("Column '{}' not found in {}", column, path.display()))?;

    let mut links = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("Malformed row {} in {}", row + 1, path.display()))?;
        let link = record
            .get(index)
            .with_context(|| format!("Row {} has no '{}' value", row + 1, column))?;
        links.push(link.trim().to_string());
    }

    Ok(links)
}

pub struct BatchRunner {
    config: BatchConfig,
    downloader: MediaDownloader,
}

impl BatchRunner {
    pub fn new(config: BatchConfig, downloader: MediaDownloader) -> Self {
        Self { config, downloader }
    }

    /// Downloads media for every post in the input table that has no files in
    /// the output directory yet. Returns the number of files written.
    pub async fn run(&self) -> Result<usize> {
        let output_dir = &self.config.output_dir;
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        let mut ledger = Ledger::scan(output_dir)?;
        info!(
            "Found {} files in {}",
            ledger.files_seen(),
            output_dir.display()
        );

        let links = read_links(&self.config.input_file, &self.config.links_column)?;

        info!("Starting to download media for {} links...", links.len());
        let mut download_count = 0;
        for url in &links {
            let post = PostRef::classify(url);

            if !post.is_known() {
                info!("[URL: {}] Unknown post type. Skipping download.", url);
                continue;
            }

            if ledger.contains(&post.post_id) {
                debug!(
                    "[URL: {}] {} already exists in {}. Skipping download.",
                    url,
                    post.post_id,
                    output_dir.display()
                );
                continue;
            }

            let count = self.downloader.download(&post).await;
            if count > 0 {
                ledger.insert(&post.post_id);
            }
            download_count += count;
        }

        info!(
            "Completed. Downloaded {} media files to {}.",
            download_count,
            output_dir.display()
        );
        Ok(download_count)
    }
}
