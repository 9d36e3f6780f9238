//! Insight report structures.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-text blurb for one group of posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightEntry {
    pub summary: String,
    pub post_count: usize,
}

/// Insights grouped by homework and by model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insights {
    pub homework: BTreeMap<String, InsightEntry>,
    pub models: BTreeMap<String, InsightEntry>,
    pub generated_at: DateTime<Utc>,
}
