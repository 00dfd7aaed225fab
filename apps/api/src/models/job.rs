use serde::{Deserialize, Serialize};

/// A job posting as handed to the rewrite engine. Produced by the job
/// fetcher, editable by the user before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Truncates to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("résumé", 2), "ré");
    }

    #[test]
    fn test_posting_defaults_optional_fields() {
        let posting: JobPosting =
            serde_json::from_str(r#"{"title":"SRE","company":"Acme","description":"Run things"}"#)
                .unwrap();
        assert_eq!(posting.link, "");
        assert!(posting.summary.is_none());
    }
}
