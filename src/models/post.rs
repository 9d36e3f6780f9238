//! Classified post output structures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordinal label assigned by thresholding a numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Low,
    Medium,
    High,
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Bucket::Low => "low",
            Bucket::Medium => "medium",
            Bucket::High => "high",
        };
        f.write_str(s)
    }
}

/// Heuristic classification of a thread's text. Every field always has a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub homework_id: String,
    pub model_name: String,
    pub primary_focus: String,
    pub depth_bucket: Bucket,
    pub actionability_bucket: Bucket,
    pub word_count: usize,
}

/// Author fields carried into the processed output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLite {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub course_role: Option<String>,
}

/// A thread together with its metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedPost {
    pub id: u64,
    pub number: Option<u64>,
    pub course_id: Option<u64>,
    pub title: String,
    pub document: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub created_at: Option<String>,
    pub reply_count: Option<u64>,
    pub view_count: Option<u64>,
    pub user: UserLite,
    pub ed_url: Option<String>,
    pub metrics: Metrics,
}
