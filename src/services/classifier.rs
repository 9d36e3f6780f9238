// src/services/classifier.rs

//! Keyword-based content classifier.
//!
//! Every metric is a total, deterministic function of the input text.
//! Unresolved cases map to fixed fallback labels rather than errors.

use regex::Regex;

use crate::models::{Bucket, ClassifierConfig, Metrics};

pub const UNKNOWN_HOMEWORK: &str = "Unknown";
pub const UNKNOWN_MODEL: &str = "Unknown / Multiple";
pub const MIXED_FOCUS: &str = "mixed/other";

const HOMEWORK_PATTERN: &str = r"(?i)\b(?:hw|homework)\s*0*([0-9]+)\b";

/// Derives `Metrics` from a thread's title and body.
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    config: ClassifierConfig,
    homework: Regex,
}

impl ContentClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            homework: Regex::new(HOMEWORK_PATTERN).expect("homework pattern is valid"),
        }
    }

    /// Classify a thread. `body` is the plain-text body; the title only
    /// contributes to the combined-text metrics.
    pub fn classify(&self, title: &str, body: &str) -> Metrics {
        let combined = format!("{title}\n{body}");
        let combined_lower = combined.to_lowercase();
        let (depth_bucket, word_count) = self.depth(body);

        Metrics {
            homework_id: self.homework_id(&combined),
            model_name: self.model_name(&combined_lower),
            primary_focus: self.primary_focus(&combined_lower),
            depth_bucket,
            actionability_bucket: self.actionability(&combined_lower),
            word_count,
        }
    }

    /// `HW{n}` from the first homework mention, leading zeros stripped.
    pub fn homework_id(&self, text: &str) -> String {
        let Some(caps) = self.homework.captures(text) else {
            return UNKNOWN_HOMEWORK.to_string();
        };
        let digits = caps[1].trim_start_matches('0');
        format!("HW{}", if digits.is_empty() { "0" } else { digits })
    }

    /// The single model label whose phrases appear, or the ambiguity label
    /// when none or several do.
    pub fn model_name(&self, text_lower: &str) -> String {
        let mut hits = self
            .config
            .models
            .iter()
            .filter(|rule| rule.hits(text_lower))
            .map(|rule| rule.label.as_str());

        match (hits.next(), hits.next()) {
            (Some(label), None) => label.to_string(),
            _ => UNKNOWN_MODEL.to_string(),
        }
    }

    /// Label with the most distinct phrase hits; ties go to the earliest
    /// label in table order.
    pub fn primary_focus(&self, text_lower: &str) -> String {
        let mut best: Option<(&str, usize)> = None;
        for rule in &self.config.focus {
            let score = rule.presence_count(text_lower);
            if score > 0 && best.is_none_or(|(_, top)| score > top) {
                best = Some((&rule.label, score));
            }
        }

        best.map_or_else(|| MIXED_FOCUS.to_string(), |(label, _)| label.to_string())
    }

    /// Depth bucket and whitespace word count of the body.
    pub fn depth(&self, body: &str) -> (Bucket, usize) {
        let word_count = body.split_whitespace().count();
        let body_lower = body.to_lowercase();

        let mut score = word_count;
        if self
            .config
            .depth_terms
            .iter()
            .any(|term| body_lower.contains(term.as_str()))
        {
            score += self.config.depth_bonus;
        }

        let bucket = if score < self.config.depth_medium_at {
            Bucket::Low
        } else if score < self.config.depth_high_at {
            Bucket::Medium
        } else {
            Bucket::High
        };
        (bucket, word_count)
    }

    /// Bucket by the number of distinct actionability phrases present.
    pub fn actionability(&self, text_lower: &str) -> Bucket {
        let hits = self
            .config
            .actionability_phrases
            .iter()
            .filter(|phrase| text_lower.contains(phrase.as_str()))
            .count();

        match hits {
            0 => Bucket::Low,
            n if n < self.config.actionability_high_at => Bucket::Medium,
            _ => Bucket::High,
        }
    }
}
