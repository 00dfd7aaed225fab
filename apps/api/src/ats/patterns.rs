//! Regex library shared by the scorer, the gap detector and the exporter.
//!
//! Every pattern is compiled once. A pattern that fails to match never errors;
//! callers treat absence as a lower score or a reported gap.

use once_cell::sync::Lazy;
use regex::Regex;

pub static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex")
});

/// North-American digit groups: `(555) 123-4567`, `555.123.4567`, `5551234567`.
pub static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").expect("valid phone regex")
});

pub static LINKEDIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)linkedin\.com/in/[\w-]+").expect("valid linkedin regex")
});

/// "City, ST": a capitalised word, a comma, then a two-letter uppercase code.
pub static LOCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][a-z]+,\s*[A-Z]{2}\b").expect("valid location regex")
});

/// Quantified outcomes: `40%`, `$50`, `10+`.
pub static METRIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+%|\$\d+|\d+\+").expect("valid metric regex"));

pub static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-*][ \t]+\S").expect("valid bullet regex"));

pub static INDENTED_BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]+[-*][ \t]+\S").expect("valid indented bullet regex"));

/// Verbs an ATS reviewer expects at the head of achievement bullets.
pub const ACTION_VERBS: &[&str] = &[
    "Led",
    "Developed",
    "Managed",
    "Implemented",
    "Achieved",
    "Increased",
    "Reduced",
    "Created",
    "Designed",
    "Improved",
    "Streamlined",
    "Optimized",
];

static ACTION_VERB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b(?:{})\b", ACTION_VERBS.join("|"))).expect("valid action verb regex")
});

pub fn has_email(text: &str) -> bool {
    EMAIL_RE.is_match(text)
}

pub fn has_phone(text: &str) -> bool {
    PHONE_RE.is_match(text)
}

pub fn has_linkedin(text: &str) -> bool {
    LINKEDIN_RE.is_match(text)
}

pub fn has_location(text: &str) -> bool {
    LOCATION_RE.is_match(text)
}

pub fn count_metrics(text: &str) -> usize {
    METRIC_RE.find_iter(text).count()
}

pub fn has_bullets(text: &str) -> bool {
    BULLET_RE.is_match(text)
}

pub fn has_indented_bullets(text: &str) -> bool {
    INDENTED_BULLET_RE.is_match(text)
}

/// Number of distinct verbs from [`ACTION_VERBS`] used anywhere in the text.
/// Matching is case-sensitive: a capitalised verb signals a bullet opener.
pub fn count_distinct_action_verbs(text: &str) -> usize {
    let mut seen: Vec<&str> = ACTION_VERB_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}
