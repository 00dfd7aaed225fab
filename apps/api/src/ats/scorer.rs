//! ATS rubric scorer. Deterministic and additive, with no external calls.
//!
//! Every criterion is computed independently and contributes points plus, when
//! it is failed or only partially met, one recommendation. Recommendations are
//! emitted in rubric order so identical input always yields an identical report.
//!
//! The raw rubric sums to more than 100; the reported score is capped at 100.
//! Formatting checks (criteria 11 – 18) only award points to a document that
//! has at least one `##` section header. Unstructured text still gets their
//! recommendations, at zero points.

use serde::{Deserialize, Serialize};

use crate::ats::headers::{has_section, section_headers, Section};
use crate::ats::keywords::{CapitalizedPhraseMatcher, KeywordMatcher};
use crate::ats::patterns;

pub const MAX_SCORE: u32 = 100;
pub const PASS_THRESHOLD: u32 = 70;
/// Score at which the improvement step stops offering another pass.
pub const TARGET_SCORE: u32 = 90;

const MAX_CHARACTERS: usize = 10_000;
const MAX_PIPES: usize = 10;
const MIN_SECTION_HEADERS: usize = 4;
const MAX_LINE_CHARS: usize = 120;
const MAX_LONG_LINES: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Report types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 90 => Grade::A,
            s if s >= 80 => Grade::B,
            s if s >= 70 => Grade::C,
            s if s >= 60 => Grade::D,
            _ => Grade::F,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Warning,
}

impl Severity {
    fn marker(self) -> &'static str {
        match self {
            Severity::Critical => "❌",
            Severity::Warning => "⚠️",
        }
    }
}

/// Outcome of scoring one résumé. Never mutated; rescored after every rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub score: u32,
    pub grade: Grade,
    pub passed: bool,
    pub recommendations: Vec<String>,
}

impl ScoreReport {
    fn from_points(points: u32, recommendations: Vec<String>) -> Self {
        let score = points.min(MAX_SCORE);
        ScoreReport {
            score,
            grade: Grade::from_score(score),
            passed: score >= PASS_THRESHOLD,
            recommendations,
        }
    }

    pub fn meets_target(&self) -> bool {
        self.score >= TARGET_SCORE
    }
}

/// Result of a single rubric line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CriterionResult {
    pub name: &'static str,
    pub awarded: u32,
    pub recommendation: Option<String>,
}

impl CriterionResult {
    fn pass(name: &'static str, awarded: u32) -> Self {
        Self {
            name,
            awarded,
            recommendation: None,
        }
    }

    fn flag(name: &'static str, awarded: u32, severity: Severity, message: &str) -> Self {
        Self {
            name,
            awarded,
            recommendation: Some(format!("{} {}", severity.marker(), message)),
        }
    }

    fn check(
        name: &'static str,
        ok: bool,
        points: u32,
        severity: Severity,
        message: &str,
    ) -> Self {
        if ok {
            Self::pass(name, points)
        } else {
            Self::flag(name, 0, severity, message)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────────────────

/// Scores a résumé with the default capitalised-phrase keyword matcher.
pub fn score(resume: &str, job_description: Option<&str>) -> ScoreReport {
    score_with(resume, job_description, &CapitalizedPhraseMatcher)
}

pub fn score_with(
    resume: &str,
    job_description: Option<&str>,
    matcher: &dyn KeywordMatcher,
) -> ScoreReport {
    let results = evaluate(resume, job_description, matcher);
    let points = results.iter().map(|r| r.awarded).sum();
    let recommendations = results
        .into_iter()
        .filter_map(|r| r.recommendation)
        .collect();
    ScoreReport::from_points(points, recommendations)
}

// ────────────────────────────────────────────────────────────────────────────
// Rubric
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn evaluate(
    resume: &str,
    job_description: Option<&str>,
    matcher: &dyn KeywordMatcher,
) -> Vec<CriterionResult> {
    use Severity::{Critical, Warning};

    let mut results = vec![
        CriterionResult::check(
            "summary_section",
            has_section(resume, Section::ProfessionalSummary),
            5,
            Critical,
            "Missing 'Professional Summary' section",
        ),
        CriterionResult::check(
            "skills_section",
            has_section(resume, Section::Skills),
            5,
            Critical,
            "Missing 'Skills' or 'Core Competencies' section",
        ),
        CriterionResult::check(
            "experience_section",
            has_section(resume, Section::WorkExperience),
            5,
            Critical,
            "Missing 'Work Experience' section",
        ),
        CriterionResult::check(
            "education_section",
            has_section(resume, Section::Education),
            5,
            Critical,
            "Missing 'Education' section",
        ),
        CriterionResult::check(
            "email",
            patterns::has_email(resume),
            7,
            Critical,
            "No email address found",
        ),
        CriterionResult::check(
            "phone",
            patterns::has_phone(resume),
            7,
            Warning,
            "No phone number found or incorrect format",
        ),
        CriterionResult::check(
            "linkedin",
            patterns::has_linkedin(resume),
            6,
            Warning,
            "No LinkedIn profile found",
        ),
        achievements(resume),
        action_verbs(resume),
        keyword_overlap(resume, job_description, matcher),
    ];

    results.extend(formatting(resume));
    results
}

fn achievements(resume: &str) -> CriterionResult {
    const NAME: &str = "quantifiable_achievements";
    match patterns::count_metrics(resume) {
        n if n >= 5 => CriterionResult::pass(NAME, 15),
        n if n >= 3 => CriterionResult::flag(
            NAME,
            10,
            Severity::Warning,
            "Add more quantifiable achievements (numbers, percentages)",
        ),
        _ => CriterionResult::flag(
            NAME,
            5,
            Severity::Critical,
            "Very few quantifiable achievements found",
        ),
    }
}

fn action_verbs(resume: &str) -> CriterionResult {
    const NAME: &str = "action_verbs";
    match patterns::count_distinct_action_verbs(resume) {
        n if n >= 5 => CriterionResult::pass(NAME, 10),
        n if n >= 3 => CriterionResult::flag(
            NAME,
            7,
            Severity::Warning,
            "Use a wider range of action verbs (Led, Developed, Managed, etc.)",
        ),
        _ => CriterionResult::flag(
            NAME,
            3,
            Severity::Warning,
            "Use more action verbs (Led, Developed, Managed, etc.)",
        ),
    }
}

fn keyword_overlap(
    resume: &str,
    job_description: Option<&str>,
    matcher: &dyn KeywordMatcher,
) -> CriterionResult {
    const NAME: &str = "keyword_overlap";
    let Some(jd) = job_description.filter(|jd| !jd.trim().is_empty()) else {
        // Nothing to compare against: flat partial credit, nothing actionable.
        return CriterionResult::pass(NAME, 10);
    };

    let rate = matcher.match_rate(resume, jd);
    if rate >= 0.5 {
        CriterionResult::pass(NAME, 20)
    } else if rate >= 0.3 {
        CriterionResult::flag(
            NAME,
            15,
            Severity::Warning,
            "Include more keywords from job description",
        )
    } else {
        CriterionResult::flag(
            NAME,
            5,
            Severity::Critical,
            "Low keyword match with job description",
        )
    }
}

fn formatting(resume: &str) -> Vec<CriterionResult> {
    use Severity::{Critical, Warning};

    let headers = section_headers(resume);

    let long_lines = resume
        .lines()
        .filter(|line| {
            line.chars().count() > MAX_LINE_CHARS && !line.trim_start().starts_with("http")
        })
        .count();

    let headers_well_cased = headers
        .iter()
        .all(|h| is_title_case(h.text) || is_all_caps(h.text));

    let rows = vec![
        CriterionResult::check(
            "length",
            resume.chars().count() < MAX_CHARACTERS,
            5,
            Warning,
            "CV might be too long (keep under 2 pages)",
        ),
        CriterionResult::check(
            "no_tables",
            resume.matches('|').count() < MAX_PIPES,
            5,
            Warning,
            "Possible table formatting detected (not ATS-friendly)",
        ),
        CriterionResult::check(
            "ascii_only",
            resume.is_ascii(),
            5,
            Warning,
            "Special characters detected (may cause ATS issues)",
        ),
        CriterionResult::check(
            "section_header_count",
            headers.len() >= MIN_SECTION_HEADERS,
            5,
            Critical,
            "Missing proper section headers (use ## for sections)",
        ),
        CriterionResult::check(
            "bullets",
            patterns::has_bullets(resume),
            5,
            Warning,
            "No bullet points found (use - for lists)",
        ),
        CriterionResult::check(
            "indentation",
            !patterns::has_indented_bullets(resume),
            5,
            Warning,
            "Inconsistent indentation detected",
        ),
        CriterionResult::check(
            "header_case",
            headers_well_cased,
            5,
            Warning,
            "Section headers should use Title Case",
        ),
        CriterionResult::check(
            "line_length",
            long_lines < MAX_LONG_LINES,
            5,
            Warning,
            "Some lines are too long (keep under 120 characters)",
        ),
    ];

    if !headers.is_empty() {
        return rows;
    }

    // Without sections there is no layout to credit, but concrete problems
    // such as tables or special characters are still reported.
    let mut results = vec![CriterionResult::flag(
        "structure",
        0,
        Critical,
        "No section structure detected; formatting earns no credit without ## sections",
    )];
    results.extend(rows.into_iter().map(|row| CriterionResult { awarded: 0, ..row }));
    results
}

/// Every cased run starts with an uppercase letter followed only by lowercase.
/// `Work Experience` and `Skills & Tools` qualify; `AWS Projects` does not.
pub(crate) fn is_title_case(text: &str) -> bool {
    let mut previous_cased = false;
    let mut any_cased = false;
    for c in text.chars() {
        if c.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            any_cased = true;
        } else if c.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            any_cased = true;
        } else {
            previous_cased = false;
        }
    }
    any_cased
}

pub(crate) fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
