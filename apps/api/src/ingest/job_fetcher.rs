//! Generic job-page fetcher. No site-specific parsing: the page title becomes
//! the job title and the visible text becomes the description.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::job::{truncate_chars, JobPosting};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";
const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const MAX_DESCRIPTION_CHARS: usize = 10_000;
const UNKNOWN_TITLE: &str = "Unknown Job";
const UNKNOWN_COMPANY: &str = "Unknown Company";

static SCRIPT_STYLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("valid script/style regex")
});
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("valid title regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(u16),
}

#[derive(Clone)]
pub struct JobFetcher {
    client: Client,
}

impl JobFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// Fetches and extracts a posting. Any failure is logged and yields `None`.
    pub async fn fetch(&self, url: &str) -> Option<JobPosting> {
        info!("Fetching job details from {url}");
        match self.fetch_html(url).await {
            Ok(html) => Some(parse_job_page(&html, url)),
            Err(e) => {
                warn!("Error fetching job from {url}: {e}");
                None
            }
        }
    }

    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

pub fn parse_job_page(html: &str, url: &str) -> JobPosting {
    let title = TITLE_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| collapse_whitespace(&decode_entities(m.as_str())))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let without_code = SCRIPT_STYLE_RE.replace_all(html, " ");
    let text = decode_entities(&TAG_RE.replace_all(&without_code, "\n"));

    // One chunk per line, and runs of double spaces split a line into chunks.
    let description = text
        .lines()
        .flat_map(|line| line.trim().split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    JobPosting {
        title,
        company: UNKNOWN_COMPANY.to_string(),
        description: truncate_chars(&description, MAX_DESCRIPTION_CHARS).to_string(),
        link: url.to_string(),
        summary: None,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
