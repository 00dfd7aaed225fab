/// Completion client, the single point of entry for generative-text calls.
///
/// ARCHITECTURAL RULE: No other module may call the Generative Language API
/// directly. Everything goes through `CompletionService`, injected as
/// `Arc<dyn CompletionService>` so tests can substitute a fake.
///
/// Model: gemini-flash-latest (hardcoded, not configurable)
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
pub mod retry;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for every completion.
pub const MODEL: &str = "gemini-flash-latest";
const MAX_OUTPUT_TOKENS: u32 = 8192;
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Résumés routinely mention employers, conflicts and health-care work; the
/// default thresholds block too much professional content.
const HARM_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Response blocked by content-safety filters")]
    SafetyBlocked,

    #[error("Response blocked for reciting existing material")]
    RecitationBlocked,

    #[error("Empty response (finish_reason: {})", .finish_reason.as_deref().unwrap_or("none"))]
    EmptyResponse { finish_reason: Option<String> },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl CompletionError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, CompletionError::RateLimited(_))
    }
}

/// An opaque, non-deterministic, rate-limited text generator.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    safety_settings: Vec<SafetySetting<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SafetySetting<'a> {
    category: &'a str,
    threshold: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    status: String,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if any are non-blank.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Turns a response without usable text into the matching failure class.
    pub fn into_completion(self) -> Result<String, CompletionError> {
        if let Some(text) = self.text() {
            return Ok(text);
        }

        if self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_ref())
            .is_some()
        {
            return Err(CompletionError::SafetyBlocked);
        }

        let finish_reason = self.candidates.into_iter().next().and_then(|c| c.finish_reason);
        match finish_reason.as_deref() {
            Some("SAFETY" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII") => {
                Err(CompletionError::SafetyBlocked)
            }
            Some("RECITATION") => Err(CompletionError::RecitationBlocked),
            _ => Err(CompletionError::EmptyResponse { finish_reason }),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini client
// ────────────────────────────────────────────────────────────────────────────

/// `CompletionService` backed by the Generative Language `generateContent` API.
/// Makes exactly one request per call; retrying is the caller's policy.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, api_key })
    }

    fn endpoint() -> String {
        format!("{GEMINI_API_BASE}/{MODEL}:generateContent")
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            safety_settings: HARM_CATEGORIES
                .iter()
                .copied()
                .map(|category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .client
            .post(Self::endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_failure(status, body));
        }

        let parsed: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Completion succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        parsed.into_completion()
    }
}

fn classify_http_failure(status: StatusCode, body: String) -> CompletionError {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(&body).ok();
    let exhausted = parsed
        .as_ref()
        .map(|e| e.error.status == "RESOURCE_EXHAUSTED")
        .unwrap_or(false);
    let message = parsed.map(|e| e.error.message).unwrap_or(body);

    if status == StatusCode::TOO_MANY_REQUESTS || exhausted {
        warn!("Completion API rate limited ({status}): {message}");
        return CompletionError::RateLimited(message);
    }

    CompletionError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_text_response() {
        let response = parse(
            r###"{"candidates":[{"content":{"parts":[{"text":"## Skills"},{"text":"\n- Rust"}]},"finishReason":"STOP"}],
                "usageMetadata":{"promptTokenCount":10,"candidatesTokenCount":4}}"###,
        );
        assert_eq!(response.into_completion().unwrap(), "## Skills\n- Rust");
    }

    #[test]
    fn test_safety_finish_reason() {
        let response = parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert!(matches!(
            response.into_completion(),
            Err(CompletionError::SafetyBlocked)
        ));
    }

    #[test]
    fn test_prompt_block_is_safety() {
        let response = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        assert!(matches!(
            response.into_completion(),
            Err(CompletionError::SafetyBlocked)
        ));
    }

    #[test]
    fn test_recitation_finish_reason() {
        let response = parse(r#"{"candidates":[{"content":{"parts":[]},"finishReason":"RECITATION"}]}"#);
        assert!(matches!(
            response.into_completion(),
            Err(CompletionError::RecitationBlocked)
        ));
    }

    #[test]
    fn test_blank_text_is_empty_response() {
        let response =
            parse(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]},"finishReason":"MAX_TOKENS"}]}"#);
        match response.into_completion() {
            Err(CompletionError::EmptyResponse { finish_reason }) => {
                assert_eq!(finish_reason.as_deref(), Some("MAX_TOKENS"));
            }
            other => panic!("expected EmptyResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_no_candidates_is_empty_response() {
        let response = parse("{}");
        assert!(matches!(
            response.into_completion(),
            Err(CompletionError::EmptyResponse { finish_reason: None })
        ));
    }

    #[test]
    fn test_http_429_is_rate_limited() {
        let err = classify_http_failure(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#
                .to_string(),
        );
        assert!(err.is_rate_limited());
        assert!(err.to_string().contains("Quota exceeded"));
    }

    #[test]
    fn test_http_400_is_api_error() {
        let err = classify_http_failure(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#
                .to_string(),
        );
        match err {
            CompletionError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_error_body_kept_verbatim() {
        let err = classify_http_failure(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert!(matches!(err, CompletionError::Api { status: 502, ref message } if message == "upstream down"));
    }
}
