// src/services/insights.rs

//! Free-text insight summaries over groups of classified posts.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{ClassifiedPost, InsightsConfig};
use crate::services::classifier::{UNKNOWN_HOMEWORK, UNKNOWN_MODEL};
use crate::utils::endpoint;
use crate::utils::text::truncate_chars;

/// Environment variable holding the summarization API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Model label excluded from per-model insights alongside the ambiguity label.
const UNSPECIFIED_MODEL: &str = "LLM (unspecified)";

/// Produces a short blurb from a system and a user prompt.
#[async_trait]
pub trait InsightSummarizer: Send + Sync {
    async fn summarize(&self, system: &str, prompt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Summarizer backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiSummarizer {
    client: Client,
    config: InsightsConfig,
    api_key: String,
}

impl OpenAiSummarizer {
    pub fn new(client: Client, config: InsightsConfig, api_key: impl Into<String>) -> Self {
        Self {
            client,
            config,
            api_key: api_key.into(),
        }
    }

    /// Build a summarizer if the API key is present in the environment.
    pub fn from_env(client: Client, config: &InsightsConfig) -> Option<Self> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(|key| Self::new(client, config.clone(), key))
    }
}

#[async_trait]
impl InsightSummarizer for OpenAiSummarizer {
    async fn summarize(&self, system: &str, prompt: &str) -> Result<String> {
        let url = endpoint(&self.config.api_base, "chat/completions")?;
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response: ChatResponse = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::summarize("empty completion"))
    }
}

/// Posts grouped by homework id, unknown ids excluded.
pub fn group_by_homework(posts: &[ClassifiedPost]) -> BTreeMap<String, Vec<&ClassifiedPost>> {
    let mut groups: BTreeMap<String, Vec<&ClassifiedPost>> = BTreeMap::new();
    for post in posts {
        if post.metrics.homework_id != UNKNOWN_HOMEWORK {
            groups
                .entry(post.metrics.homework_id.clone())
                .or_default()
                .push(post);
        }
    }
    groups
}

/// Posts grouped by model label, ambiguous and unspecified labels excluded.
pub fn group_by_model(posts: &[ClassifiedPost]) -> BTreeMap<String, Vec<&ClassifiedPost>> {
    let mut groups: BTreeMap<String, Vec<&ClassifiedPost>> = BTreeMap::new();
    for post in posts {
        let model = post.metrics.model_name.as_str();
        if model != UNKNOWN_MODEL && model != UNSPECIFIED_MODEL {
            groups.entry(model.to_string()).or_default().push(post);
        }
    }
    groups
}

pub const HOMEWORK_SYSTEM_PROMPT: &str =
    "You are a helpful teaching assistant analyzing student homework feedback.";
pub const MODEL_SYSTEM_PROMPT: &str =
    "You are a helpful teaching assistant analyzing LLM model performance on homework.";

/// Prompt asking for a summary of one homework's posts.
pub fn homework_prompt(hw_id: &str, posts: &[&ClassifiedPost]) -> String {
    let lines: Vec<String> = posts
        .iter()
        .map(|p| {
            format!(
                "- Model: {}, Focus: {}, Depth: {}, Title: {}",
                p.metrics.model_name,
                p.metrics.primary_focus,
                p.metrics.depth_bucket,
                truncate_chars(&p.title, 100)
            )
        })
        .collect();

    format!(
        "Based on these student posts about {hw_id}, provide a 2-3 sentence insight summary about:\n\
         1. Which problems or topics seemed easiest/hardest\n\
         2. Common themes or approaches students took\n\
         3. Overall trends in model performance\n\n\
         Posts summary:\n{}\n\n\
         Total posts analyzed: {}\n\n\
         Provide a concise, informative summary (2-3 sentences max):",
        lines.join("\n"),
        posts.len()
    )
}

/// Prompt asking for a summary of one model's evaluations.
pub fn model_prompt(model: &str, posts: &[&ClassifiedPost]) -> String {
    let lines: Vec<String> = posts
        .iter()
        .map(|p| {
            format!(
                "- HW: {}, Focus: {}, Depth: {}, Actionability: {}",
                p.metrics.homework_id,
                p.metrics.primary_focus,
                p.metrics.depth_bucket,
                p.metrics.actionability_bucket
            )
        })
        .collect();

    format!(
        "Based on these student evaluations of {model}, provide a 2-3 sentence insight summary about:\n\
         1. What {model} excels at (conceptual vs. mathematical reasoning, etc.)\n\
         2. Common strengths or weaknesses observed\n\
         3. Overall student sentiment and usefulness\n\n\
         Posts summary:\n{}\n\n\
         Total posts analyzed: {}\n\n\
         Provide a concise, informative summary (2-3 sentences max):",
        lines.join("\n"),
        posts.len()
    )
}

pub fn homework_fallback(count: usize) -> String {
    format!("Analysis of {count} student submissions using various LLMs.")
}

pub fn model_fallback(count: usize) -> String {
    format!("Analysis of {count} student evaluations of this model.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bucket, Metrics, UserLite};

    fn post(id: u64, hw: &str, model: &str) -> ClassifiedPost {
        ClassifiedPost {
            id,
            number: Some(id),
            course_id: Some(1),
            title: format!("Post {id}"),
            document: String::new(),
            category: None,
            subcategory: None,
            kind: None,
            created_at: None,
            reply_count: None,
            view_count: None,
            user: UserLite::default(),
            ed_url: None,
            metrics: Metrics {
                homework_id: hw.to_string(),
                model_name: model.to_string(),
                primary_focus: "mixed/other".to_string(),
                depth_bucket: Bucket::Low,
                actionability_bucket: Bucket::Medium,
                word_count: 0,
            },
        }
    }

    #[test]
    fn test_grouping_excludes_unresolved_labels() {
        let posts = vec![
            post(1, "HW2", "Claude"),
            post(2, "Unknown", "Unknown / Multiple"),
            post(3, "HW2", "LLM (unspecified)"),
            post(4, "HW10", "Claude"),
        ];

        let hw = group_by_homework(&posts);
        assert_eq!(hw.keys().collect::<Vec<_>>(), vec!["HW10", "HW2"]);
        assert_eq!(hw["HW2"].len(), 2);

        let models = group_by_model(&posts);
        assert_eq!(models.keys().collect::<Vec<_>>(), vec!["Claude"]);
        assert_eq!(models["Claude"].len(), 2);
    }

    #[test]
    fn test_prompts_list_every_post() {
        let posts = vec![post(1, "HW2", "Claude"), post(2, "HW2", "Kimi")];
        let refs: Vec<&ClassifiedPost> = posts.iter().collect();

        let prompt = homework_prompt("HW2", &refs);
        assert!(prompt.contains("- Model: Claude, Focus: mixed/other, Depth: low, Title: Post 1"));
        assert!(prompt.contains("Total posts analyzed: 2"));

        let prompt = model_prompt("Claude", &refs[..1]);
        assert!(prompt.contains("- HW: HW2, Focus: mixed/other, Depth: low, Actionability: medium"));
        assert!(prompt.contains("What Claude excels at"));
    }
}
