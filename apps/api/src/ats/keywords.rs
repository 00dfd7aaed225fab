//! Keyword overlap between a résumé and a job description.
//!
//! The scorer only relies on the 0.5 / 0.3 match-rate thresholds, so the
//! extraction strategy sits behind a trait and can be swapped.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

static CAPITALIZED_PHRASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b").expect("valid capitalized phrase regex")
});
static ACRONYM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{2,}\b").expect("valid acronym regex"));

pub trait KeywordMatcher: Send + Sync {
    /// Fraction (0.0 – 1.0) of the job description's keywords found in the résumé.
    fn match_rate(&self, resume: &str, job_description: &str) -> f64;
}

/// Treats runs of Capitalised Words and ALL-CAPS acronyms in the job
/// description as keywords and checks each for verbatim presence in the résumé.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalizedPhraseMatcher;

impl CapitalizedPhraseMatcher {
    pub fn extract_keywords(job_description: &str) -> BTreeSet<String> {
        CAPITALIZED_PHRASE_RE
            .find_iter(job_description)
            .chain(ACRONYM_RE.find_iter(job_description))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

impl KeywordMatcher for CapitalizedPhraseMatcher {
    fn match_rate(&self, resume: &str, job_description: &str) -> f64 {
        let keywords = Self::extract_keywords(job_description);
        let matched = keywords.iter().filter(|k| resume.contains(k.as_str())).count();
        matched as f64 / keywords.len().max(1) as f64
    }
}
