//! Canonical section-header recognition.
//!
//! The single place that decides what counts as a section header and which
//! canonical section it names. The scorer, the gap detector and the DOCX
//! exporter all go through here so a header recognised by one is recognised
//! by all of them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Level of a top-level résumé section (`## Skills`). Level 1 is the name line,
/// level 3 is a role or sub-heading.
pub const SECTION_LEVEL: usize = 2;

static HEADER_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}(#{1,6})[ \t]+(\S.*?)[ \t]*$").expect("valid header line regex")
});

static SUMMARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:professional\s+)?summary\b").expect("valid summary regex")
});
static SKILLS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:skills|core\s+competencies|technical\s+skills)\b")
        .expect("valid skills regex")
});
static EXPERIENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:work|professional)\s+experience\b").expect("valid experience regex")
});
static EDUCATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^education\b").expect("valid education regex"));
static CERTIFICATIONS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^certifications?\b").expect("valid certifications regex"));
static PROJECTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^projects?\b").expect("valid projects regex"));

/// The closed set of section names an ATS is expected to recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    ProfessionalSummary,
    Skills,
    WorkExperience,
    Education,
    Certifications,
    Projects,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::ProfessionalSummary,
        Section::Skills,
        Section::WorkExperience,
        Section::Education,
        Section::Certifications,
        Section::Projects,
    ];

    /// The preferred spelling used in generated résumés.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Section::ProfessionalSummary => "Professional Summary",
            Section::Skills => "Core Competencies",
            Section::WorkExperience => "Work Experience",
            Section::Education => "Education",
            Section::Certifications => "Certifications",
            Section::Projects => "Projects",
        }
    }

    /// Accepted header spellings, as listed in rewrite instructions.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Section::ProfessionalSummary => &["Professional Summary", "Summary"],
            Section::Skills => &["Core Competencies", "Skills", "Technical Skills"],
            Section::WorkExperience => &["Work Experience", "Professional Experience"],
            Section::Education => &["Education"],
            Section::Certifications => &["Certifications"],
            Section::Projects => &["Projects"],
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Section::ProfessionalSummary => &*SUMMARY_RE,
            Section::Skills => &*SKILLS_RE,
            Section::WorkExperience => &*EXPERIENCE_RE,
            Section::Education => &*EDUCATION_RE,
            Section::Certifications => &*CERTIFICATIONS_RE,
            Section::Projects => &*PROJECTS_RE,
        }
    }

    /// Maps raw header text onto a canonical section, case-insensitively.
    /// Emphasis markers and a trailing colon are ignored (`**Skills:**`).
    pub fn classify(header_text: &str) -> Option<Section> {
        let cleaned = header_text
            .trim()
            .trim_matches('*')
            .trim_end_matches(':')
            .trim();
        Section::ALL
            .into_iter()
            .find(|section| section.pattern().is_match(cleaned))
    }
}

/// A Markdown ATX header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<'a> {
    pub level: usize,
    pub text: &'a str,
    pub line_index: usize,
}

impl Header<'_> {
    pub fn section(&self) -> Option<Section> {
        Section::classify(self.text)
    }
}

pub fn parse_header_line(line: &str) -> Option<(usize, &str)> {
    let caps = HEADER_LINE_RE.captures(line)?;
    let level = caps.get(1)?.as_str().len();
    let text = caps.get(2)?.as_str();
    Some((level, text))
}

/// All header lines of any level, in document order.
pub fn parse_headers(text: &str) -> Vec<Header<'_>> {
    text.lines()
        .enumerate()
        .filter_map(|(line_index, line)| {
            parse_header_line(line).map(|(level, text)| Header {
                level,
                text,
                line_index,
            })
        })
        .collect()
}

/// Top-level section headers only (`## ...`).
pub fn section_headers(text: &str) -> Vec<Header<'_>> {
    parse_headers(text)
        .into_iter()
        .filter(|h| h.level == SECTION_LEVEL)
        .collect()
}

/// True when a `##` or `###` header names the given section.
pub fn has_section(text: &str, section: Section) -> bool {
    parse_headers(text)
        .iter()
        .any(|h| h.level >= SECTION_LEVEL && h.section() == Some(section))
}

/// Trimmed text between the section's header and the next `##`/`###` header.
/// `None` when the section is absent.
pub fn section_body(text: &str, section: Section) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let header = parse_headers(text)
        .into_iter()
        .find(|h| h.level >= SECTION_LEVEL && h.section() == Some(section))?;

    let body: Vec<&str> = lines[header.line_index + 1..]
        .iter()
        .take_while(|line| {
            !matches!(parse_header_line(line), Some((level, _)) if level >= SECTION_LEVEL)
        })
        .copied()
        .collect();

    Some(body.join("\n").trim().to_string())
}
