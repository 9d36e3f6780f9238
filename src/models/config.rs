//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Ed API connection settings
    #[serde(default)]
    pub ed: EdConfig,

    /// Thread filtering rules
    #[serde(default)]
    pub filter: FilterConfig,

    /// Attachment download behavior
    #[serde(default)]
    pub download: DownloadConfig,

    /// Output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Keyword tables used by the content classifier
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Summarization service settings
    #[serde(default)]
    pub insights: InsightsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.ed.user_agent.trim().is_empty() {
            return Err(AppError::validation("ed.user_agent is empty"));
        }
        if self.ed.batch_size == 0 || self.ed.batch_size > 100 {
            return Err(AppError::validation("ed.batch_size must be within 1..=100"));
        }
        if self.ed.timeout_secs == 0 {
            return Err(AppError::validation("ed.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.ed.base_url)?;
        if self.download.timeout_secs == 0 {
            return Err(AppError::validation("download.timeout_secs must be > 0"));
        }
        if self.download.max_concurrent == 0 {
            return Err(AppError::validation("download.max_concurrent must be > 0"));
        }
        if self.filter.phrase.trim().is_empty() {
            return Err(AppError::validation("filter.phrase is empty"));
        }
        self.classifier.validate()
    }
}

/// Ed API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdConfig {
    /// API root, must end with a slash
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Web root used to build thread links
    #[serde(default = "defaults::web_url")]
    pub web_url: String,

    /// Course to list threads from
    #[serde(default = "defaults::course_id")]
    pub course_id: u64,

    /// Threads requested per page (the API caps this at 100)
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// User-Agent header for API requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::api_timeout")]
    pub timeout_secs: u64,
}

impl Default for EdConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            web_url: defaults::web_url(),
            course_id: defaults::course_id(),
            batch_size: defaults::batch_size(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::api_timeout(),
        }
    }
}

/// Thread filtering rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Case-insensitive phrase a thread must contain
    #[serde(default = "defaults::filter_phrase")]
    pub phrase: String,

    /// Also match against the thread body, not only the title
    #[serde(default)]
    pub include_body: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            phrase: defaults::filter_phrase(),
            include_body: false,
        }
    }
}

/// Attachment download behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Per-file transfer timeout in seconds
    #[serde(default = "defaults::download_timeout")]
    pub timeout_secs: u64,

    /// Downloads in flight per thread
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::download_timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Output locations. Relative paths resolve against the storage root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::threads_file")]
    pub threads_file: String,

    /// Root of the per-thread attachment directories
    #[serde(default = "defaults::files_dir")]
    pub files_dir: String,

    /// Manifest file name, placed inside `files_dir`
    #[serde(default = "defaults::manifest_file")]
    pub manifest_file: String,

    #[serde(default = "defaults::posts_file")]
    pub posts_file: String,

    #[serde(default = "defaults::insights_file")]
    pub insights_file: String,

    /// Prefix for the relative paths recorded in the manifest
    #[serde(default = "defaults::saved_path_prefix")]
    pub saved_path_prefix: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            threads_file: defaults::threads_file(),
            files_dir: defaults::files_dir(),
            manifest_file: defaults::manifest_file(),
            posts_file: defaults::posts_file(),
            insights_file: defaults::insights_file(),
            saved_path_prefix: defaults::saved_path_prefix(),
        }
    }
}

/// A label together with the phrases that vote for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeywordRule {
    pub label: String,
    pub phrases: Vec<String>,
}

impl KeywordRule {
    pub fn new(label: &str, phrases: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            phrases: phrases.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    /// Number of distinct phrases present in already case-folded text.
    pub fn presence_count(&self, text_lower: &str) -> usize {
        self.phrases
            .iter()
            .filter(|p| text_lower.contains(p.as_str()))
            .count()
    }

    /// Whether any phrase is present in already case-folded text.
    pub fn hits(&self, text_lower: &str) -> bool {
        self.phrases.iter().any(|p| text_lower.contains(p.as_str()))
    }
}

/// Keyword tables and thresholds for the content classifier.
///
/// Phrases are matched as substrings of case-folded text, so they must be
/// lowercase. Table order is significant: `focus` is listed in tie-break
/// priority order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "defaults::model_rules")]
    pub models: Vec<KeywordRule>,

    #[serde(default = "defaults::focus_rules")]
    pub focus: Vec<KeywordRule>,

    #[serde(default = "defaults::depth_terms")]
    pub depth_terms: Vec<String>,

    #[serde(default = "defaults::depth_bonus")]
    pub depth_bonus: usize,

    #[serde(default = "defaults::depth_medium_at")]
    pub depth_medium_at: usize,

    #[serde(default = "defaults::depth_high_at")]
    pub depth_high_at: usize,

    #[serde(default = "defaults::actionability_phrases")]
    pub actionability_phrases: Vec<String>,

    #[serde(default = "defaults::actionability_high_at")]
    pub actionability_high_at: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            models: defaults::model_rules(),
            focus: defaults::focus_rules(),
            depth_terms: defaults::depth_terms(),
            depth_bonus: defaults::depth_bonus(),
            depth_medium_at: defaults::depth_medium_at(),
            depth_high_at: defaults::depth_high_at(),
            actionability_phrases: defaults::actionability_phrases(),
            actionability_high_at: defaults::actionability_high_at(),
        }
    }
}

impl ClassifierConfig {
    fn validate(&self) -> Result<()> {
        if self.focus.is_empty() {
            return Err(AppError::validation("classifier.focus has no labels"));
        }
        if self.depth_medium_at > self.depth_high_at {
            return Err(AppError::validation(
                "classifier.depth_medium_at must not exceed depth_high_at",
            ));
        }
        if self.actionability_high_at < 2 {
            return Err(AppError::validation(
                "classifier.actionability_high_at must be >= 2",
            ));
        }

        let phrases = self
            .models
            .iter()
            .chain(&self.focus)
            .flat_map(|rule| rule.phrases.iter())
            .chain(&self.depth_terms)
            .chain(&self.actionability_phrases);
        for phrase in phrases {
            if phrase.is_empty() || *phrase != phrase.to_lowercase() {
                return Err(AppError::validation(format!(
                    "classifier phrase {phrase:?} must be non-empty lowercase"
                )));
            }
        }
        Ok(())
    }
}

/// Summarization service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// OpenAI-compatible API root, must end with a slash
    #[serde(default = "defaults::insights_api_base")]
    pub api_base: String,

    #[serde(default = "defaults::insights_model")]
    pub model: String,

    #[serde(default = "defaults::insights_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "defaults::insights_temperature")]
    pub temperature: f32,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::insights_api_base(),
            model: defaults::insights_model(),
            max_tokens: defaults::insights_max_tokens(),
            temperature: defaults::insights_temperature(),
        }
    }
}

mod defaults {
    use super::KeywordRule;

    // Ed defaults
    pub fn base_url() -> String {
        "https://us.edstem.org/api/".into()
    }
    pub fn web_url() -> String {
        "https://edstem.org/us".into()
    }
    pub fn course_id() -> u64 {
        84647
    }
    pub fn batch_size() -> usize {
        100
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; thread-digest/0.1)".into()
    }
    pub fn api_timeout() -> u64 {
        30
    }

    // Filter defaults
    pub fn filter_phrase() -> String {
        "special participation a".into()
    }

    // Download defaults
    pub fn download_timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        1
    }

    // Path defaults
    pub fn threads_file() -> String {
        "threads.json".into()
    }
    pub fn files_dir() -> String {
        "files".into()
    }
    pub fn manifest_file() -> String {
        "manifest.json".into()
    }
    pub fn posts_file() -> String {
        "posts_processed.json".into()
    }
    pub fn insights_file() -> String {
        "insights.json".into()
    }
    pub fn saved_path_prefix() -> String {
        "files".into()
    }

    // Classifier defaults
    pub fn model_rules() -> Vec<KeywordRule> {
        vec![
            KeywordRule::new("Kimi", &["kimi"]),
            KeywordRule::new("Claude", &["claude"]),
            KeywordRule::new("ChatGPT 5.1", &["5.1 thinking", "gpt 5.1"]),
            KeywordRule::new("GPT-5", &["gpt5", "gpt 5"]),
            KeywordRule::new("ChatGPT (other)", &["chatgpt"]),
            KeywordRule::new("DeepSeek", &["deepseek"]),
            KeywordRule::new("LLaMA", &["llama"]),
            KeywordRule::new("LLM (unspecified)", &["llm", "language model"]),
        ]
    }

    pub fn focus_rules() -> Vec<KeywordRule> {
        vec![
            KeywordRule::new(
                "model_performance",
                &[
                    "hallucination",
                    "hallucinate",
                    "correct",
                    "incorrect",
                    "mistake",
                    "error",
                    "accuracy",
                    "reasoning",
                    "solve",
                    "solution",
                ],
            ),
            KeywordRule::new(
                "assignment_feedback",
                &[
                    "assignment",
                    "question wording",
                    "ambiguous",
                    "clarity of the question",
                    "problem statement",
                ],
            ),
            KeywordRule::new(
                "prompting_strategy",
                &[
                    "prompt",
                    "system prompt",
                    "zero-shot",
                    "few-shot",
                    "chain-of-thought",
                    "cot",
                    "step by step",
                    "turn-by-turn",
                ],
            ),
            KeywordRule::new(
                "meta_reflection",
                &[
                    "reflection",
                    "reflect",
                    "experience",
                    "takeaway",
                    "take-away",
                    "lesson",
                    "learned",
                    "meta",
                ],
            ),
        ]
    }

    pub fn depth_terms() -> Vec<String> {
        [
            "analysis",
            "reasoning",
            "derivation",
            "step by step",
            "carefully",
            "detailed",
            "intuition",
            "discussion",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn depth_bonus() -> usize {
        150
    }
    pub fn depth_medium_at() -> usize {
        200
    }
    pub fn depth_high_at() -> usize {
        600
    }

    pub fn actionability_phrases() -> Vec<String> {
        [
            "should",
            "recommend",
            "suggest",
            "could",
            "would",
            "might be better",
            "improve",
            "change",
            "consider",
            "it would help",
            "we could",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn actionability_high_at() -> usize {
        4
    }

    // Insights defaults
    pub fn insights_api_base() -> String {
        "https://api.openai.com/v1/".into()
    }
    pub fn insights_model() -> String {
        "gpt-4o".into()
    }
    pub fn insights_max_tokens() -> u32 {
        150
    }
    pub fn insights_temperature() -> f32 {
        0.7
    }
}
