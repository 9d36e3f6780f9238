//! Storage for pipeline artifacts.
//!
//! All artifacts are UTF-8 JSON written atomically under a single root
//! directory; attachments live in per-thread directories beneath it.

pub mod local;

// Re-export for convenience
pub use local::LocalStorage;
