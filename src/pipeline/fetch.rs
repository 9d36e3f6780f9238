// src/pipeline/fetch.rs

//! Thread acquisition stage: live fetch or local replay, then filtering.

use std::path::PathBuf;

use crate::error::Result;
use crate::models::{Config, RawThread};
use crate::services::{ThreadFetcher, ThreadSource, filter_threads};
use crate::storage::LocalStorage;

/// Where threads come from.
pub enum ThreadInput<'a> {
    /// Paginate a remote source.
    Live(&'a dyn ThreadSource),
    /// Replay a previously saved JSON array.
    Replay(PathBuf),
}

/// Acquire all threads and keep the ones matching the configured phrase.
pub async fn run_fetch(
    config: &Config,
    storage: &LocalStorage,
    input: ThreadInput<'_>,
) -> Result<Vec<RawThread>> {
    let all_threads = match input {
        ThreadInput::Live(source) => {
            log::info!("Fetching all threads from course {}...", config.ed.course_id);
            let threads = ThreadFetcher::new(source)
                .fetch(config.ed.batch_size)
                .await
                .inspect_err(|e| {
                    if e.is_fatal() {
                        log::error!("Aborting run: {e}");
                    }
                })?;
            log::info!("Total threads fetched: {}", threads.len());
            threads
        }
        ThreadInput::Replay(path) => {
            log::info!("Loading threads from local file: {}", path.display());
            let threads = storage.load_threads(&path).await?;
            log::info!("Total threads loaded: {}", threads.len());
            threads
        }
    };

    let filtered = filter_threads(all_threads, &config.filter.phrase, config.filter.include_body);
    log::info!(
        "Threads matching '{}': {}",
        config.filter.phrase,
        filtered.len()
    );
    Ok(filtered)
}
