//! Attachment references and manifest records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A file embedded in a thread body via inline markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentReference {
    pub url: String,
    pub filename: String,
    /// Byte offset of the markup in the thread content
    pub position: usize,
    /// Tag-free text surrounding the markup
    pub context: String,
}

/// A processed attachment as recorded in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentRecord {
    pub original_filename: String,
    pub saved_path: String,
    pub source_url: String,
    pub position: usize,
    pub context: String,
    /// Set only when a non-empty transcript was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<String>,
}

/// Attachments that survived processing for one thread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    pub thread_id: Option<u64>,
    pub thread_title: String,
    pub attachments: Vec<AttachmentRecord>,
}

/// Manifest keyed by thread number.
///
/// Integer keys serialize as JSON object keys (strings) and iterate in
/// numeric order.
pub type Manifest = BTreeMap<u64, ManifestEntry>;
