//! Service layer for the digest application.
//!
//! This module contains the business logic for:
//! - Thread listing (`ThreadFetcher`, `EdClient`)
//! - Attachment handling (`AttachmentScanner`, `AttachmentDownloader`, `Transcriber`)
//! - Content classification (`ContentClassifier`)
//! - Insight summaries (`InsightSummarizer`)

pub mod classifier;
mod downloader;
mod ed;
mod fetcher;
pub mod insights;
mod scanner;
mod transcriber;

pub use classifier::ContentClassifier;
pub use downloader::{AttachmentDownloader, DownloadMode};
pub use ed::{EdClient, TOKEN_ENV};
pub use fetcher::{ThreadFetcher, ThreadPage, ThreadSource, filter_threads};
pub use insights::{InsightSummarizer, OpenAiSummarizer};
pub use scanner::{AttachmentScanner, CONTEXT_CHARS};
#[cfg(feature = "pdf")]
pub use transcriber::PdfRenderer;
pub use transcriber::{PageRenderer, Transcriber, format_pages, is_transcribable};
