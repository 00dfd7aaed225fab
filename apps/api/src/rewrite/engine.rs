//! Rewrite engine. Every résumé, cover-letter and assessment generation
//! goes through here.
//!
//! Each operation builds one constraint-laden instruction document and sends
//! it through the injected `CompletionService`, wrapped in the retry policy.
//! The engine cannot enforce the constraints itself; callers re-score and
//! re-check gaps on whatever comes back.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::ats::scorer::{ScoreReport, TARGET_SCORE};
use crate::llm_client::prompts::{
    fill_template, section_header_rules, DATE_PRESERVATION_RULES, FACTUAL_ACCURACY_RULES,
    MARKDOWN_FORMAT_RULES,
};
use crate::llm_client::retry::{RetryError, RetryPolicy};
use crate::llm_client::{CompletionError, CompletionService};
use crate::models::job::{truncate_chars, JobPosting};
use crate::models::resume::AdditionalInfo;
use crate::rewrite::prompts::{
    ADDITIONAL_INFO_TEMPLATE, ASSESS_PROMPT_TEMPLATE, COVER_LETTER_PROMPT_TEMPLATE,
    IMPROVE_PROMPT_TEMPLATE, ROLE_SUMMARY_TEMPLATE, TAILOR_PROMPT_TEMPLATE,
};

/// Job description characters sent with a tailoring request.
pub const TAILOR_JD_MAX_CHARS: usize = 2000;
/// Job description characters sent with a cover letter request.
pub const COVER_LETTER_JD_MAX_CHARS: usize = 1500;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error(
        "The AI service is temporarily unavailable (rate limited after {attempts} attempts). \
         Please try again in a few minutes."
    )]
    QuotaExceeded { attempts: u32 },

    #[error(
        "The AI safety filters blocked the response. This can happen with very long CVs or job \
         descriptions. Try shortening your CV or job description, or try again in a moment."
    )]
    SafetyBlocked,

    #[error(
        "The response was blocked due to potential copyright issues. Please ensure your CV and \
         job description don't contain copyrighted material."
    )]
    RecitationBlocked,

    #[error(
        "The AI model couldn't generate a response (finish_reason: {}). Please try again.",
        .finish_reason.as_deref().unwrap_or("none")
    )]
    EmptyResponse { finish_reason: Option<String> },

    #[error("Error generating {operation}: {source}")]
    Service {
        operation: &'static str,
        source: CompletionError,
    },
}

impl RewriteError {
    fn from_completion(operation: &'static str, error: CompletionError, attempts: u32) -> Self {
        match error {
            CompletionError::RateLimited(_) => RewriteError::QuotaExceeded { attempts },
            CompletionError::SafetyBlocked => RewriteError::SafetyBlocked,
            CompletionError::RecitationBlocked => RewriteError::RecitationBlocked,
            CompletionError::EmptyResponse { finish_reason } => {
                RewriteError::EmptyResponse { finish_reason }
            }
            source => RewriteError::Service { operation, source },
        }
    }

    fn from_retry(operation: &'static str, error: RetryError) -> Self {
        match error {
            RetryError::Exhausted { attempts, last } => {
                Self::from_completion(operation, last, attempts)
            }
            RetryError::Aborted(e) => Self::from_completion(operation, e, 1),
        }
    }
}

pub struct RewriteEngine {
    completion: Arc<dyn CompletionService>,
    retry: RetryPolicy,
}

impl RewriteEngine {
    pub fn new(completion: Arc<dyn CompletionService>, retry: RetryPolicy) -> Self {
        Self { completion, retry }
    }

    /// Rewrites `resume` against `job_description`, folding in any
    /// user-supplied answers to gap prompts.
    pub async fn tailor(
        &self,
        resume: &str,
        job_description: &str,
        additional_info: Option<&AdditionalInfo>,
    ) -> Result<String, RewriteError> {
        let prompt = build_tailor_prompt(resume, job_description, additional_info);
        let text = self.complete("tailored CV", prompt).await?;
        Ok(strip_markdown_fences(&text).to_string())
    }

    /// One rewrite pass aimed at the outstanding recommendations in `report`.
    pub async fn improve(&self, resume: &str, report: &ScoreReport) -> Result<String, RewriteError> {
        let prompt = build_improve_prompt(resume, report);
        let text = self.complete("improved CV", prompt).await?;
        Ok(strip_markdown_fences(&text).to_string())
    }

    pub async fn generate_cover_letter(
        &self,
        resume: &str,
        job: &JobPosting,
    ) -> Result<String, RewriteError> {
        let prompt = build_cover_letter_prompt(resume, job);
        let text = self.complete("cover letter", prompt).await?;
        Ok(text.trim().to_string())
    }

    /// Short coach-style review: three strengths, three areas to improve.
    pub async fn assess(&self, resume: &str) -> Result<String, RewriteError> {
        let prompt = fill_template(ASSESS_PROMPT_TEMPLATE, &[("cv_text", resume)]);
        let text = self.complete("CV assessment", prompt).await?;
        Ok(text.trim().to_string())
    }

    async fn complete(&self, operation: &'static str, prompt: String) -> Result<String, RewriteError> {
        let completion: &dyn CompletionService = self.completion.as_ref();
        let prompt: &str = &prompt;

        match self.retry.run(move || completion.complete(prompt)).await {
            Ok(text) => {
                info!("Generated {operation} ({} chars)", text.len());
                Ok(text)
            }
            Err(e) => {
                let error = RewriteError::from_retry(operation, e);
                warn!("Failed to generate {operation}: {error}");
                Err(error)
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt builders
// ────────────────────────────────────────────────────────────────────────────

/// Fills a rewrite template: the shared rule fragments plus `values`, all in
/// one pass so user text is never scanned for placeholders.
fn fill_with_rules(template: &str, values: &[(&str, &str)]) -> String {
    let section_headers = section_header_rules();
    let mut all = vec![
        ("date_rules", DATE_PRESERVATION_RULES),
        ("factual_rules", FACTUAL_ACCURACY_RULES),
        ("section_headers", section_headers.as_str()),
        ("format_rules", MARKDOWN_FORMAT_RULES),
    ];
    all.extend_from_slice(values);
    fill_template(template, &all)
}

fn format_additional_info(info: Option<&AdditionalInfo>) -> String {
    let Some(info) = info.filter(|i| !i.is_empty()) else {
        return String::new();
    };
    let entries = info
        .entries()
        .map(|(element, value)| format!("- {}: {}", element.label(), value))
        .collect::<Vec<_>>()
        .join("\n");
    fill_template(ADDITIONAL_INFO_TEMPLATE, &[("entries", entries.as_str())])
}

pub(crate) fn build_tailor_prompt(
    resume: &str,
    job_description: &str,
    additional_info: Option<&AdditionalInfo>,
) -> String {
    let additional_info = format_additional_info(additional_info);
    fill_with_rules(
        TAILOR_PROMPT_TEMPLATE,
        &[
            ("cv_text", resume),
            (
                "job_description",
                truncate_chars(job_description, TAILOR_JD_MAX_CHARS),
            ),
            ("additional_info", additional_info.as_str()),
        ],
    )
}

pub(crate) fn build_improve_prompt(resume: &str, report: &ScoreReport) -> String {
    let recommendations = if report.recommendations.is_empty() {
        "- No specific issues reported; tighten formatting and keyword coverage.".to_string()
    } else {
        report
            .recommendations
            .iter()
            .map(|r| format!("- {r}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let score = report.score.to_string();
    let target = TARGET_SCORE.to_string();
    fill_with_rules(
        IMPROVE_PROMPT_TEMPLATE,
        &[
            ("score", score.as_str()),
            ("target", target.as_str()),
            ("recommendations", recommendations.as_str()),
            ("cv_text", resume),
        ],
    )
}

pub(crate) fn build_cover_letter_prompt(resume: &str, job: &JobPosting) -> String {
    let mut description = truncate_chars(&job.description, COVER_LETTER_JD_MAX_CHARS).to_string();
    if description.len() < job.description.len() {
        description.push_str("...");
    }

    let summary = job
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| fill_template(ROLE_SUMMARY_TEMPLATE, &[("summary", s)]))
        .unwrap_or_default();

    fill_template(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("title", job.title.as_str()),
            ("company", job.company.as_str()),
            ("summary", summary.as_str()),
            ("description", description.as_str()),
            ("cv_text", resume),
        ],
    )
}

/// Models occasionally wrap Markdown output in a fenced block.
fn strip_markdown_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("markdown", "md", ...) on the opening fence.
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use crate::ats::gaps::GapElement;
    use crate::ats::scorer::Grade;

    /// Replays scripted results and records every prompt it receives.
    struct ScriptedCompletion {
        results: Mutex<VecDeque<Result<String, CompletionError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedCompletion {
        fn new(results: Vec<Result<String, CompletionError>>) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(CompletionError::EmptyResponse { finish_reason: None }))
        }
    }

    fn engine(service: &Arc<ScriptedCompletion>) -> RewriteEngine {
        RewriteEngine::new(service.clone(), RetryPolicy::default())
    }

    fn rate_limited() -> Result<String, CompletionError> {
        Err(CompletionError::RateLimited("quota".to_string()))
    }

    fn report(score: u32, recommendations: &[&str]) -> ScoreReport {
        ScoreReport {
            score,
            grade: Grade::from_score(score),
            passed: score >= 70,
            recommendations: recommendations.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_tailor_succeeds_after_two_rate_limits() {
        let service = ScriptedCompletion::new(vec![
            rate_limited(),
            rate_limited(),
            Ok("## Skills\n- Rust".to_string()),
        ]);
        let start = Instant::now();

        let tailored = engine(&service)
            .tailor("## Skills\n- rust", "Rust engineer", None)
            .await
            .unwrap();

        assert_eq!(tailored, "## Skills\n- Rust");
        assert_eq!(service.calls(), 3);
        // Two backoff delays: 4s + 8s.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(12) && elapsed < Duration::from_secs(13));
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_rate_limit_is_quota_exceeded() {
        let service = ScriptedCompletion::new(vec![rate_limited(), rate_limited(), rate_limited()]);

        let err = engine(&service).assess("cv").await.unwrap_err();

        assert!(matches!(err, RewriteError::QuotaExceeded { attempts: 3 }));
        assert_eq!(service.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_safety_block_is_not_retried() {
        let service = ScriptedCompletion::new(vec![Err(CompletionError::SafetyBlocked)]);
        let start = Instant::now();

        let err = engine(&service).tailor("cv", "jd", None).await.unwrap_err();

        assert!(matches!(err, RewriteError::SafetyBlocked));
        assert_eq!(service.calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recitation_and_empty_are_distinct() {
        let service = ScriptedCompletion::new(vec![
            Err(CompletionError::RecitationBlocked),
            Err(CompletionError::EmptyResponse {
                finish_reason: Some("MAX_TOKENS".to_string()),
            }),
        ]);
        let engine = engine(&service);

        let first = engine.assess("cv").await.unwrap_err();
        let second = engine.assess("cv").await.unwrap_err();

        assert!(matches!(first, RewriteError::RecitationBlocked));
        match second {
            RewriteError::EmptyResponse { finish_reason } => {
                assert_eq!(finish_reason.as_deref(), Some("MAX_TOKENS"))
            }
            other => panic!("expected EmptyResponse, got {other:?}"),
        }
        assert_eq!(service.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_failures_are_wrapped_with_operation() {
        let service = ScriptedCompletion::new(vec![Err(CompletionError::Api {
            status: 401,
            message: "bad key".to_string(),
        })]);

        let err = engine(&service).improve("cv", &report(50, &[])).await.unwrap_err();

        assert!(err.to_string().contains("improved CV"));
        assert!(err.to_string().contains("bad key"));
        assert!(matches!(err, RewriteError::Service { operation: "improved CV", .. }));
    }

    #[tokio::test]
    async fn test_tailor_prompt_carries_additional_info_and_rules() {
        let service = ScriptedCompletion::new(vec![Ok("```markdown\n## Skills\n- Go\n```".to_string())]);
        let info: AdditionalInfo = [
            (GapElement::Phone, "(555) 123-4567".to_string()),
            (GapElement::Skills, "Kubernetes".to_string()),
        ]
        .into_iter()
        .collect();

        let tailored = engine(&service)
            .tailor("## Skills\n- Go", "Platform role", Some(&info))
            .await
            .unwrap();

        assert_eq!(tailored, "## Skills\n- Go");
        let prompt = service.last_prompt();
        assert!(prompt.contains("- Phone: (555) 123-4567"));
        assert!(prompt.contains("- Additional Skills: Kubernetes"));
        assert!(prompt.contains("PRESERVE all dates exactly"));
        assert!(prompt.contains("DO NOT CREATE ONE"));
        assert!(prompt.contains("## Core Competencies"));
        assert!(prompt.contains("Platform role"));
    }

    #[test]
    fn test_tailor_prompt_truncates_job_description() {
        let jd = "x".repeat(TAILOR_JD_MAX_CHARS + 500);
        let prompt = build_tailor_prompt("cv", &jd, None);
        assert!(prompt.contains(&"x".repeat(TAILOR_JD_MAX_CHARS)));
        assert!(!prompt.contains(&"x".repeat(TAILOR_JD_MAX_CHARS + 1)));
        assert!(!prompt.contains("ADDITIONAL INFORMATION"));
    }

    #[test]
    fn test_placeholders_in_user_text_stay_literal() {
        let info: AdditionalInfo = [(GapElement::Skills, "see {job_description}".to_string())]
            .into_iter()
            .collect();
        let prompt = build_tailor_prompt(
            "SECRET RESUME BODY",
            "Paste your {cv_text} here",
            Some(&info),
        );

        assert_eq!(prompt.matches("SECRET RESUME BODY").count(), 1);
        assert!(prompt.contains("Paste your {cv_text} here"));
        assert!(prompt.contains("see {job_description}"));

        let job = JobPosting {
            title: "{company}".to_string(),
            company: "Acme".to_string(),
            description: "{cv_text}".to_string(),
            link: String::new(),
            summary: None,
        };
        let letter = build_cover_letter_prompt("SECRET RESUME BODY", &job);
        assert_eq!(letter.matches("SECRET RESUME BODY").count(), 1);
        assert!(letter.contains("\"{company}\" at \"Acme\""));
    }

    #[test]
    fn test_improve_prompt_lists_recommendations() {
        let prompt = build_improve_prompt(
            "cv body",
            &report(62, &["❌ Missing phone number", "⚠️ Add more bullet points"]),
        );
        assert!(prompt.contains("scored 62/100"));
        assert!(prompt.contains("score of 90+"));
        assert!(prompt.contains("- ❌ Missing phone number\n- ⚠️ Add more bullet points"));
        assert!(prompt.ends_with("cv body"));
    }

    #[test]
    fn test_cover_letter_prompt() {
        let job = JobPosting {
            title: "Data Engineer".to_string(),
            company: "Acme".to_string(),
            description: "d".repeat(COVER_LETTER_JD_MAX_CHARS + 10),
            link: String::new(),
            summary: Some("Owns the warehouse".to_string()),
        };
        let prompt = build_cover_letter_prompt("cv", &job);
        assert!(prompt.contains("\"Data Engineer\" at \"Acme\""));
        assert!(prompt.contains("Owns the warehouse"));
        assert!(prompt.contains(&format!("{}...", "d".repeat(COVER_LETTER_JD_MAX_CHARS))));

        let short = JobPosting {
            description: "Short".to_string(),
            summary: None,
            ..job
        };
        let prompt = build_cover_letter_prompt("cv", &short);
        assert!(prompt.contains("Short"));
        assert!(!prompt.contains("Short..."));
        assert!(!prompt.contains("Additional summary"));
    }

    #[test]
    fn test_strip_markdown_fences() {
        assert_eq!(strip_markdown_fences("```md\n## A\n```"), "## A");
        assert_eq!(strip_markdown_fences("```\n## A\n```\n"), "## A");
        assert_eq!(strip_markdown_fences("  ## A  "), "## A");
    }
}
