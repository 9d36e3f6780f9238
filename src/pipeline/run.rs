// src/pipeline/run.rs

//! End-to-end pipeline: fetch -> filter -> attachments -> classify -> persist.

use std::fmt;

use crate::error::Result;
use crate::models::{ClassifiedPost, Config, RawThread};
use crate::services::{ContentClassifier, InsightSummarizer};
use crate::storage::LocalStorage;

use super::attachments::{AttachmentProcessor, AttachmentStats};
use super::classify::classify_threads;
use super::fetch::{ThreadInput, run_fetch};
use super::insights::run_insights;

/// Counts reported when a run finishes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub threads_processed: usize,
    pub files_downloaded: usize,
    pub files_skipped: usize,
    pub transcripts_created: usize,
    pub posts_classified: usize,
    pub posts_skipped: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} threads, {} files downloaded ({} skipped), {} transcripts, {} posts classified ({} skipped)",
            self.threads_processed,
            self.files_downloaded,
            self.files_skipped,
            self.transcripts_created,
            self.posts_classified,
            self.posts_skipped
        )
    }
}

impl RunSummary {
    fn absorb(&mut self, stats: &AttachmentStats) {
        self.files_downloaded += stats.files_saved;
        self.files_skipped += stats.files_skipped;
        self.transcripts_created += stats.transcripts_created;
    }
}

/// Acquire and filter threads, persist them, then process their attachments
/// and persist the manifest.
pub async fn run_extract(
    config: &Config,
    storage: &LocalStorage,
    input: ThreadInput<'_>,
    processor: &AttachmentProcessor,
) -> Result<(Vec<RawThread>, AttachmentStats)> {
    let threads = run_fetch(config, storage, input).await?;

    let threads_path = storage.save_threads(&threads).await?;
    log::info!("Saved {} threads to {}", threads.len(), threads_path.display());

    log::info!("Extracting attachments...");
    let (manifest, stats) = processor.run(&threads).await?;
    let manifest_path = storage.save_manifest(&manifest).await?;
    log::info!(
        "Saved manifest for {} threads to {}",
        manifest.len(),
        manifest_path.display()
    );

    Ok((threads, stats))
}

/// Classify threads and persist the posts. Returns the posts and how many
/// threads were excluded.
pub async fn run_process(
    config: &Config,
    storage: &LocalStorage,
    threads: &[RawThread],
) -> Result<(Vec<ClassifiedPost>, usize)> {
    log::info!("Classifying {} threads...", threads.len());
    let classifier = ContentClassifier::new(config.classifier.clone());
    let (posts, skipped) = classify_threads(&classifier, &config.ed.web_url, threads);

    let posts_path = storage.save_posts(&posts).await?;
    log::info!("Saved {} posts to {}", posts.len(), posts_path.display());

    Ok((posts, skipped))
}

/// Run the full pipeline.
///
/// Only fatal errors (auth, config, artifact I/O) abort; per-attachment and
/// per-thread failures are logged and reflected in the summary.
pub async fn run_pipeline(
    config: &Config,
    storage: &LocalStorage,
    input: ThreadInput<'_>,
    processor: &AttachmentProcessor,
    summarizer: Option<&dyn InsightSummarizer>,
) -> Result<RunSummary> {
    let total_steps = if summarizer.is_some() { 3 } else { 2 };

    log::info!("[1/{total_steps}] Fetch - Collecting threads and attachments");
    let (threads, stats) = run_extract(config, storage, input, processor).await?;

    log::info!("[2/{total_steps}] Process - Classifying posts");
    let (posts, skipped) = run_process(config, storage, &threads).await?;

    if let Some(summarizer) = summarizer {
        log::info!("[3/{total_steps}] Insights - Summarizing posts");
        let insights = run_insights(summarizer, &posts).await;
        let path = storage.save_insights(&insights).await?;
        log::info!("Saved insights to {}", path.display());
    }

    let mut summary = RunSummary {
        threads_processed: threads.len(),
        posts_classified: posts.len(),
        posts_skipped: skipped,
        ..RunSummary::default()
    };
    summary.absorb(&stats);

    log::info!("Pipeline complete: {summary}");
    Ok(summary)
}
