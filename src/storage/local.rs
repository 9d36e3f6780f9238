//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── threads.json              # Filtered raw threads
//! ├── posts_processed.json      # Classified posts
//! ├── insights.json             # Summaries by homework and model
//! └── files/
//!     ├── manifest.json         # Attachments per thread number
//!     └── thread_{number}/
//!         ├── {attachment}
//!         └── {attachment stem}.txt
//! ```
//!
//! Every key comes from `PathsConfig`; absolute keys bypass the root.

use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{ClassifiedPost, Insights, Manifest, PathsConfig, RawThread};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    paths: PathsConfig,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, paths: PathsConfig) -> Self {
        Self {
            root_dir: root_dir.into(),
            paths,
        }
    }

    /// Get the full path for a relative key.
    pub fn path(&self, key: impl AsRef<Path>) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Root of the per-thread attachment directories.
    pub fn files_dir(&self) -> PathBuf {
        self.path(&self.paths.files_dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.files_dir().join(&self.paths.manifest_file)
    }

    /// Write `value` as pretty-printed JSON, replacing `path` atomically.
    /// Non-ASCII text is kept as is.
    pub async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staging = path.with_extension("json.partial");
        tokio::fs::write(&staging, &bytes).await?;
        tokio::fs::rename(&staging, path).await?;
        Ok(())
    }

    /// Read a JSON artifact; `None` when the file does not exist.
    pub async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    pub async fn save_threads(&self, threads: &[RawThread]) -> Result<PathBuf> {
        let path = self.path(&self.paths.threads_file);
        self.write_json(&path, threads).await?;
        Ok(path)
    }

    /// Load threads from a JSON array, dropping records that fail to decode.
    pub async fn load_threads(&self, path: &Path) -> Result<Vec<RawThread>> {
        let values: Vec<Value> = self.read_json(path).await?.ok_or_else(|| {
            AppError::config(format!("threads file not found at {}", path.display()))
        })?;
        Ok(RawThread::decode_all(values))
    }

    pub async fn save_manifest(&self, manifest: &Manifest) -> Result<PathBuf> {
        let path = self.manifest_path();
        self.write_json(&path, manifest).await?;
        Ok(path)
    }

    pub async fn save_posts(&self, posts: &[ClassifiedPost]) -> Result<PathBuf> {
        let path = self.path(&self.paths.posts_file);
        self.write_json(&path, posts).await?;
        Ok(path)
    }

    pub async fn load_posts(&self, path: &Path) -> Result<Vec<ClassifiedPost>> {
        self.read_json(path).await?.ok_or_else(|| {
            AppError::config(format!("posts file not found at {}", path.display()))
        })
    }

    pub async fn save_insights(&self, insights: &Insights) -> Result<PathBuf> {
        let path = self.path(&self.paths.insights_file);
        self.write_json(&path, insights).await?;
        Ok(path)
    }
}
