// src/pipeline/classify.rs

//! Thread classification stage.

use crate::error::{AppError, Result};
use crate::models::{ClassifiedPost, Outcome, RawThread, UserLite};
use crate::services::ContentClassifier;

/// Thread link, present only when both ids are known and non-zero.
pub fn build_ed_url(web_url: &str, course_id: Option<u64>, thread_id: Option<u64>) -> Option<String> {
    match (course_id, thread_id) {
        (Some(course), Some(thread)) if course != 0 && thread != 0 => Some(format!(
            "{}/courses/{course}/discussion/{thread}",
            web_url.trim_end_matches('/')
        )),
        _ => None,
    }
}

/// Classify one thread into a post record.
pub fn classify_thread(
    classifier: &ContentClassifier,
    web_url: &str,
    raw: &RawThread,
) -> Result<ClassifiedPost> {
    let id = raw
        .id
        .ok_or_else(|| AppError::malformed(raw.label(), "missing id"))?;

    let title = raw.title.trim().to_string();
    let document = raw.document.trim().to_string();
    let metrics = classifier.classify(&title, &document);

    let user = raw
        .user
        .as_ref()
        .map(|u| UserLite {
            id: u.id,
            name: u.name.clone(),
            course_role: u.course_role.clone(),
        })
        .unwrap_or_default();

    Ok(ClassifiedPost {
        id,
        number: raw.number,
        course_id: raw.course_id,
        title,
        document,
        category: raw.category.clone(),
        subcategory: raw.subcategory.clone(),
        kind: raw.kind.clone(),
        created_at: raw.created_at.clone(),
        reply_count: raw.reply_count,
        view_count: raw.view_count,
        user,
        ed_url: build_ed_url(web_url, raw.course_id, raw.id),
        metrics,
    })
}

/// Classify every thread, excluding (and logging) the ones that fail.
pub fn classify_threads(
    classifier: &ContentClassifier,
    web_url: &str,
    threads: &[RawThread],
) -> (Vec<ClassifiedPost>, usize) {
    let mut posts = Vec::with_capacity(threads.len());
    let mut skipped = 0;

    for raw in threads {
        match Outcome::from(classify_thread(classifier, web_url, raw)) {
            Outcome::Done(post) => posts.push(post),
            Outcome::Skipped { reason } => {
                skipped += 1;
                log::warn!("Failed to process thread {}: {}", raw.label(), reason);
            }
        }
    }

    (posts, skipped)
}
