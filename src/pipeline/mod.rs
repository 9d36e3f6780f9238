//! Pipeline entry points.
//!
//! - `run_fetch`: Acquire threads (live or replay) and filter them
//! - `run_extract`: Persist threads, process attachments, persist the manifest
//! - `run_process`: Classify threads into posts
//! - `run_insights`: Summarize posts per homework and model
//! - `run_pipeline`: All of the above in order

pub mod attachments;
pub mod classify;
pub mod fetch;
pub mod insights;
pub mod run;

pub use attachments::{AttachmentProcessor, AttachmentStats, ManifestBuilder};
pub use classify::{build_ed_url, classify_thread, classify_threads};
pub use fetch::{ThreadInput, run_fetch};
pub use insights::run_insights;
pub use run::{RunSummary, run_extract, run_pipeline, run_process};
