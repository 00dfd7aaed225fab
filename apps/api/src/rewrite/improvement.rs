//! Single-step improvement: at most one rewrite per call, always re-scored.
//! The caller decides whether to run another step.

use serde::Serialize;
use tracing::info;

use crate::ats::keywords::KeywordMatcher;
use crate::ats::scorer::{score_with, ScoreReport};
use crate::rewrite::engine::{RewriteEngine, RewriteError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ImprovementOutcome {
    /// The résumé already scores at or above the target; nothing was sent.
    AlreadyMeetsTarget { report: ScoreReport },
    Improved {
        resume: String,
        previous: ScoreReport,
        report: ScoreReport,
    },
}

pub async fn improve_once(
    engine: &RewriteEngine,
    matcher: &dyn KeywordMatcher,
    resume: &str,
    job_description: Option<&str>,
    report: ScoreReport,
) -> Result<ImprovementOutcome, RewriteError> {
    if report.meets_target() {
        return Ok(ImprovementOutcome::AlreadyMeetsTarget { report });
    }

    let improved = engine.improve(resume, &report).await?;
    let new_report = score_with(&improved, job_description, matcher);
    info!(
        "Improvement step: {} -> {} ({:?})",
        report.score, new_report.score, new_report.grade
    );

    Ok(ImprovementOutcome::Improved {
        resume: improved,
        previous: report,
        report: new_report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::ats::keywords::CapitalizedPhraseMatcher;
    use crate::ats::scorer::score;
    use crate::llm_client::retry::RetryPolicy;
    use crate::llm_client::{CompletionError, CompletionService};

    const STRONG: &str = "# Jane Doe
jane.doe@example.com | (555) 123-4567 | linkedin.com/in/janedoe | Austin, TX

## Professional Summary
Backend engineer with eight years building payment and logistics platforms.

## Skills
- Rust, Go, PostgreSQL, Kubernetes

## Work Experience
### Senior Engineer | Acme | 2019 - Present
- Led migration that reduced latency 40%
- Developed billing service handling $2M monthly with 99% uptime
- Managed team of 5+ engineers and improved delivery 30%
- Implemented tracing that cut incident time 50%
- Designed and Created caching layer, Optimized queries 25%

## Education
BSc Computer Science, 2015
";

    struct FixedCompletion {
        text: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionService for FixedCompletion {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.clone())
        }
    }

    fn setup(text: &str) -> (Arc<FixedCompletion>, RewriteEngine) {
        let service = Arc::new(FixedCompletion {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        });
        let engine = RewriteEngine::new(service.clone(), RetryPolicy::default());
        (service, engine)
    }

    #[tokio::test]
    async fn test_meeting_target_skips_completion() {
        let (service, engine) = setup("unused");
        let report = score(STRONG, None);
        assert!(report.meets_target(), "fixture scored {}", report.score);

        let outcome = improve_once(&engine, &CapitalizedPhraseMatcher, STRONG, None, report.clone())
            .await
            .unwrap();

        assert_eq!(outcome, ImprovementOutcome::AlreadyMeetsTarget { report });
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_improved_text_is_rescored() {
        let (service, engine) = setup(STRONG);
        let weak = "Jane Doe\nI write software.";
        let report = score(weak, None);

        let outcome = improve_once(&engine, &CapitalizedPhraseMatcher, weak, None, report.clone())
            .await
            .unwrap();

        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        match outcome {
            ImprovementOutcome::Improved {
                resume,
                previous,
                report: new_report,
            } => {
                assert_eq!(resume, STRONG.trim());
                assert_eq!(previous, report);
                assert_eq!(new_report, score(&resume, None));
                assert!(new_report.score > previous.score);
            }
            other => panic!("expected Improved, got {other:?}"),
        }
    }
}
