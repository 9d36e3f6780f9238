//! Discussion thread data structure.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Author of a thread as reported by the remote source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ThreadUser {
    #[serde(default)]
    pub id: Option<u64>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, alias = "role")]
    pub course_role: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A discussion thread fetched from the remote course forum.
///
/// Fields the pipeline does not interpret are kept in `extra` so the
/// persisted `threads.json` mirrors the remote record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawThread {
    #[serde(default)]
    pub id: Option<u64>,

    /// Course-local thread number, used to key attachments
    #[serde(default)]
    pub number: Option<u64>,

    #[serde(default)]
    pub course_id: Option<u64>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,

    /// Raw body markup, scanned for inline attachments
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,

    /// Plain-text rendering of the body
    #[serde(default, deserialize_with = "null_as_empty")]
    pub document: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub subcategory: Option<String>,

    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub user: Option<ThreadUser>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub reply_count: Option<u64>,

    #[serde(default)]
    pub view_count: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Remote text fields may be `null`; treat that like a missing field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawThread {
    /// Decode a list of JSON records, dropping the ones that do not fit.
    pub fn decode_all(values: Vec<Value>) -> Vec<RawThread> {
        values
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| {
                let id = value.get("id").cloned();
                match serde_json::from_value::<RawThread>(value) {
                    Ok(thread) => Some(thread),
                    Err(e) => {
                        log::warn!("Dropping malformed thread record #{i} (id={id:?}): {e}");
                        None
                    }
                }
            })
            .collect()
    }

    /// Case-insensitive phrase match against the title and, optionally, the body.
    pub fn matches(&self, phrase: &str, include_body: bool) -> bool {
        let phrase = phrase.to_lowercase();
        self.title.to_lowercase().contains(&phrase)
            || (include_body && self.content.to_lowercase().contains(&phrase))
    }

    /// Short label for log lines.
    pub fn label(&self) -> String {
        match (self.number, self.id) {
            (Some(number), _) => format!("#{number}"),
            (None, Some(id)) => format!("id={id}"),
            (None, None) => "#unknown".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn thread(title: &str, content: &str) -> RawThread {
        RawThread {
            id: Some(1),
            number: Some(7),
            title: title.to_string(),
            content: content.to_string(),
            ..RawThread::default()
        }
    }

    #[test]
    fn test_matches_title_case_insensitive() {
        let t = thread("Special Participation A: HW3", "");
        assert!(t.matches("special participation a", false));
    }

    #[test]
    fn test_matches_body_only_when_enabled() {
        let t = thread("HW3 notes", "<p>special participation A post</p>");
        assert!(!t.matches("special participation a", false));
        assert!(t.matches("special participation a", true));
    }

    #[test]
    fn test_round_trip_keeps_unknown_fields() {
        let value = json!({
            "id": 5,
            "number": 12,
            "title": "t",
            "is_pinned": true,
            "user": {"id": 3, "name": "Ana", "course_role": "student", "avatar": null}
        });
        let thread: RawThread = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(thread.extra.get("is_pinned"), Some(&json!(true)));

        let back = serde_json::to_value(&thread).unwrap();
        assert_eq!(back["is_pinned"], json!(true));
        assert_eq!(back["user"]["avatar"], Value::Null);
        assert_eq!(back["number"], json!(12));
    }

    #[test]
    fn test_decode_all_drops_malformed_records() {
        let values = vec![
            json!({"id": 1, "title": "ok"}),
            json!({"id": "not-a-number", "title": "bad"}),
            json!({"title": "no id"}),
        ];
        let threads = RawThread::decode_all(values);
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[1].id, None);
    }

    #[test]
    fn test_decode_all_accepts_null_text_fields() {
        let values = vec![json!({
            "id": 1,
            "number": 2,
            "title": null,
            "document": null,
            "content": "<p>body</p>",
        })];
        let threads = RawThread::decode_all(values);
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].title, "");
        assert_eq!(threads[0].document, "");
        assert_eq!(threads[0].content, "<p>body</p>");
    }

    #[test]
    fn test_label_prefers_number() {
        assert_eq!(thread("", "").label(), "#7");
        assert_eq!(RawThread::default().label(), "#unknown");
    }
}
