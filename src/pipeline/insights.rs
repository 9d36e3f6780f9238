// src/pipeline/insights.rs

//! Insight generation stage.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::models::{ClassifiedPost, InsightEntry, Insights};
use crate::services::InsightSummarizer;
use crate::services::insights::{
    HOMEWORK_SYSTEM_PROMPT, MODEL_SYSTEM_PROMPT, group_by_homework, group_by_model,
    homework_fallback, homework_prompt, model_fallback, model_prompt,
};

/// Summarize posts per homework and per model.
///
/// A failed summary is replaced by a fallback sentence; it never aborts.
pub async fn run_insights(summarizer: &dyn InsightSummarizer, posts: &[ClassifiedPost]) -> Insights {
    let hw_groups = group_by_homework(posts);
    let model_groups = group_by_model(posts);

    log::info!("Generating insights for {} homework assignments...", hw_groups.len());
    let mut homework = BTreeMap::new();
    for (hw_id, group) in &hw_groups {
        log::info!("  {}: {} posts", hw_id, group.len());
        let summary = summarizer
            .summarize(HOMEWORK_SYSTEM_PROMPT, &homework_prompt(hw_id, group))
            .await
            .unwrap_or_else(|e| {
                log::warn!("Error generating insight for {hw_id}: {e}");
                homework_fallback(group.len())
            });
        homework.insert(
            hw_id.clone(),
            InsightEntry {
                summary,
                post_count: group.len(),
            },
        );
    }

    log::info!("Generating insights for {} models...", model_groups.len());
    let mut models = BTreeMap::new();
    for (model, group) in &model_groups {
        log::info!("  {}: {} posts", model, group.len());
        let summary = summarizer
            .summarize(MODEL_SYSTEM_PROMPT, &model_prompt(model, group))
            .await
            .unwrap_or_else(|e| {
                log::warn!("Error generating insight for {model}: {e}");
                model_fallback(group.len())
            });
        models.insert(
            model.clone(),
            InsightEntry {
                summary,
                post_count: group.len(),
            },
        );
    }

    Insights {
        homework,
        models,
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::{Bucket, Metrics, UserLite};

    /// Fails for homework prompts, answers model prompts.
    struct PickySummarizer;

    #[async_trait]
    impl InsightSummarizer for PickySummarizer {
        async fn summarize(&self, system: &str, _prompt: &str) -> Result<String> {
            if system == HOMEWORK_SYSTEM_PROMPT {
                Err(AppError::summarize("rate limited"))
            } else {
                Ok("Strong at derivations.".to_string())
            }
        }
    }

    fn post(id: u64, hw: &str, model: &str) -> ClassifiedPost {
        ClassifiedPost {
            id,
            number: Some(id),
            course_id: None,
            title: String::new(),
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
                primary_focus: "model_performance".to_string(),
                depth_bucket: Bucket::High,
                actionability_bucket: Bucket::Low,
                word_count: 700,
            },
        }
    }

    #[tokio::test]
    async fn test_failures_fall_back_per_group() {
        let posts = vec![post(1, "HW1", "Claude"), post(2, "HW1", "Unknown / Multiple")];
        let insights = run_insights(&PickySummarizer, &posts).await;

        assert_eq!(
            insights.homework["HW1"],
            InsightEntry {
                summary: "Analysis of 2 student submissions using various LLMs.".to_string(),
                post_count: 2,
            }
        );
        assert_eq!(insights.models["Claude"].summary, "Strong at derivations.");
        assert_eq!(insights.models.len(), 1);
    }
}
