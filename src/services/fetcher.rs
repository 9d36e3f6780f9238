// src/services/fetcher.rs

//! Paginated thread fetching.
//!
//! Pages are requested newest first with increasing offsets until the source
//! returns an empty or short page.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::RawThread;

/// One page of threads from the remote source.
#[derive(Debug, Default)]
pub struct ThreadPage {
    pub threads: Vec<RawThread>,
    /// Records the source returned, including any that failed to decode
    pub raw_count: usize,
}

impl ThreadPage {
    pub fn new(threads: Vec<RawThread>) -> Self {
        let raw_count = threads.len();
        Self { threads, raw_count }
    }
}

/// A paginated, newest-first thread listing.
#[async_trait]
pub trait ThreadSource: Send + Sync {
    /// Verify credentials. Failure is fatal to the run.
    async fn login(&self) -> Result<()>;

    /// List up to `limit` threads starting at `offset`.
    async fn list_threads(&self, limit: usize, offset: usize) -> Result<ThreadPage>;
}

/// Accumulates every thread a source can list.
pub struct ThreadFetcher<'a> {
    source: &'a dyn ThreadSource,
}

impl<'a> ThreadFetcher<'a> {
    pub fn new(source: &'a dyn ThreadSource) -> Self {
        Self { source }
    }

    /// Fetch all threads, `batch_size` per request.
    pub async fn fetch(&self, batch_size: usize) -> Result<Vec<RawThread>> {
        let batch_size = batch_size.max(1);
        self.source.login().await?;

        let mut all_threads = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.source.list_threads(batch_size, offset).await?;
            if page.raw_count == 0 {
                break;
            }

            all_threads.extend(page.threads);
            log::info!("Fetched {} threads so far...", all_threads.len());

            if page.raw_count < batch_size {
                break;
            }
            offset += batch_size;
        }

        Ok(all_threads)
    }
}

/// Keep threads whose title (and optionally body) contains `phrase`.
pub fn filter_threads(threads: Vec<RawThread>, phrase: &str, include_body: bool) -> Vec<RawThread> {
    threads
        .into_iter()
        .filter(|t| t.matches(phrase, include_body))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::AppError;

    /// In-memory source that records the offsets it was asked for.
    struct FakeSource {
        total: usize,
        reject_login: bool,
        calls: Mutex<Vec<(usize, usize)>>,
    }

    impl FakeSource {
        fn new(total: usize) -> Self {
            Self {
                total,
                reject_login: false,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ThreadSource for FakeSource {
        async fn login(&self) -> Result<()> {
            if self.reject_login {
                return Err(AppError::auth("bad token"));
            }
            Ok(())
        }

        async fn list_threads(&self, limit: usize, offset: usize) -> Result<ThreadPage> {
            self.calls.lock().unwrap().push((limit, offset));
            let end = (offset + limit).min(self.total);
            let threads = (offset.min(end)..end)
                .map(|i| RawThread {
                    id: Some(i as u64),
                    number: Some(i as u64),
                    title: format!("thread {i}"),
                    ..RawThread::default()
                })
                .collect();
            Ok(ThreadPage::new(threads))
        }
    }

    #[tokio::test]
    async fn test_short_page_stops_without_extra_request() {
        let source = FakeSource::new(150);
        let threads = ThreadFetcher::new(&source).fetch(100).await.unwrap();

        assert_eq!(threads.len(), 150);
        assert_eq!(*source.calls.lock().unwrap(), vec![(100, 0), (100, 100)]);
    }

    #[tokio::test]
    async fn test_exact_multiple_needs_empty_page() {
        let source = FakeSource::new(200);
        let threads = ThreadFetcher::new(&source).fetch(100).await.unwrap();

        assert_eq!(threads.len(), 200);
        assert_eq!(source.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_source() {
        let source = FakeSource::new(0);
        let threads = ThreadFetcher::new(&source).fetch(100).await.unwrap();
        assert!(threads.is_empty());
        assert_eq!(source.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_login_failure_is_fatal() {
        let mut source = FakeSource::new(10);
        source.reject_login = true;

        let err = ThreadFetcher::new(&source).fetch(100).await.unwrap_err();
        assert!(err.is_fatal());
        assert!(source.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_filter_threads() {
        let threads = vec![
            RawThread {
                title: "Special Participation A - HW2".to_string(),
                ..RawThread::default()
            },
            RawThread {
                title: "Lecture question".to_string(),
                content: "special participation a".to_string(),
                ..RawThread::default()
            },
        ];
        assert_eq!(filter_threads(threads.clone(), "special participation a", false).len(), 1);
        assert_eq!(filter_threads(threads, "SPECIAL participation A", true).len(), 2);
    }
}
