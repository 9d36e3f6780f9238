// src/services/downloader.rs

//! Attachment downloader.

use std::path::{Path, PathBuf};

use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{AttachmentReference, Outcome};

/// Whether attachments are fetched or only stubbed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// Fetch bytes over HTTP.
    Fetch,
    /// Write an empty placeholder without touching the network.
    Placeholder,
}

impl DownloadMode {
    pub fn from_no_download(no_download: bool) -> Self {
        if no_download { Self::Placeholder } else { Self::Fetch }
    }
}

/// Writes attachments into a thread's directory.
#[derive(Clone)]
pub struct AttachmentDownloader {
    client: Client,
    mode: DownloadMode,
}

impl AttachmentDownloader {
    /// `client` should carry the per-file timeout.
    pub fn new(client: Client, mode: DownloadMode) -> Self {
        Self { client, mode }
    }

    pub fn mode(&self) -> DownloadMode {
        self.mode
    }

    /// Store `reference` as `dest_dir/file_name`.
    ///
    /// Transport and status failures are logged and reported as skipped.
    pub async fn download(
        &self,
        reference: &AttachmentReference,
        dest_dir: &Path,
        file_name: &str,
    ) -> Outcome<PathBuf> {
        let path = dest_dir.join(file_name);
        let result = match self.mode {
            DownloadMode::Fetch => {
                log::info!("  Downloading: {file_name}");
                self.fetch_to(&reference.url, &path).await
            }
            DownloadMode::Placeholder => Self::placeholder(&path).await,
        };

        match result {
            Ok(()) => Outcome::Done(path),
            Err(e) => {
                log::warn!("  Skipping {} ({}): {}", file_name, reference.url, e);
                Outcome::skipped(e.to_string())
            }
        }
    }

    async fn fetch_to(&self, url: &str, path: &Path) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::download(url, e))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::download(url, e))?;

        tokio::fs::write(path, &bytes).await?;
        Ok(())
    }

    async fn placeholder(path: &Path) -> Result<()> {
        tokio::fs::write(path, b"").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn reference(url: &str) -> AttachmentReference {
        AttachmentReference {
            url: url.to_string(),
            filename: "notes.pdf".to_string(),
            position: 0,
            context: String::new(),
        }
    }

    #[tokio::test]
    async fn test_placeholder_never_touches_network() {
        let tmp = TempDir::new().unwrap();
        let downloader = AttachmentDownloader::new(Client::new(), DownloadMode::Placeholder);

        // Unroutable URL: a network attempt would fail the outcome.
        let outcome = downloader
            .download(&reference("http://127.0.0.1:9/never"), tmp.path(), "notes.pdf")
            .await;

        let path = outcome.done().unwrap();
        assert_eq!(path, tmp.path().join("notes.pdf"));
        assert_eq!(std::fs::read(&path).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let downloader = AttachmentDownloader::new(Client::new(), DownloadMode::Fetch);

        let outcome = downloader
            .download(&reference("http://127.0.0.1:9/never"), tmp.path(), "notes.pdf")
            .await;

        assert!(!outcome.is_done());
        assert!(!tmp.path().join("notes.pdf").exists());
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(DownloadMode::from_no_download(true), DownloadMode::Placeholder);
        assert_eq!(DownloadMode::from_no_download(false), DownloadMode::Fetch);
    }
}
