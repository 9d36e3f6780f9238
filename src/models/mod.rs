// src/models/mod.rs

//! Domain models for the digest application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod attachment;
mod config;
mod insights;
mod outcome;
mod post;
mod thread;

// Re-export all public types
pub use attachment::{AttachmentRecord, AttachmentReference, Manifest, ManifestEntry};
pub use config::{
    ClassifierConfig, Config, DownloadConfig, EdConfig, FilterConfig, InsightsConfig,
    KeywordRule, PathsConfig,
};
pub use insights::{InsightEntry, Insights};
pub use outcome::Outcome;
pub use post::{Bucket, ClassifiedPost, Metrics, UserLite};
pub use thread::{RawThread, ThreadUser};
