//! Gap detection: which résumé elements are missing or too thin to tailor well.
//!
//! Pure and tolerant: any text is accepted, absence of a pattern is a gap,
//! never an error. The tags double as keys for user-supplied additional info.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ats::headers::{has_section, section_body, Section};
use crate::ats::patterns;

const MIN_SUMMARY_CHARS: usize = 50;
const MIN_METRICS: usize = 3;

/// Checklist elements, declared in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapElement {
    Phone,
    Linkedin,
    Location,
    Summary,
    Skills,
    WorkExperience,
    Education,
    Achievements,
}

impl GapElement {
    /// What the user is asked for when the element is missing.
    pub fn prompt(self) -> &'static str {
        match self {
            GapElement::Phone => "Phone Number (e.g., (555) 123-4567)",
            GapElement::Linkedin => {
                "LinkedIn Profile URL (e.g., https://linkedin.com/in/yourname)"
            }
            GapElement::Location => "Location (e.g., New York, NY or London, UK)",
            GapElement::Summary => "Professional Summary (Brief overview of your career and goals)",
            GapElement::Skills => {
                "Key Skills (Comma-separated, e.g., Python, Project Management, Communication)"
            }
            GapElement::WorkExperience => {
                "Work Experience (e.g., Job Title | Company | Dates | Key Responsibilities)"
            }
            GapElement::Education => "Education (e.g., Degree | University | Year)",
            GapElement::Achievements => {
                "Key Achievements (Include numbers/metrics, e.g., 'Increased sales by 30%')"
            }
        }
    }

    /// Label used when the user's answer is handed to the rewrite engine.
    pub fn label(self) -> &'static str {
        match self {
            GapElement::Phone => "Phone",
            GapElement::Linkedin => "LinkedIn",
            GapElement::Location => "Location",
            GapElement::Summary => "Professional Summary",
            GapElement::Skills => "Additional Skills",
            GapElement::WorkExperience => "Work Experience",
            GapElement::Education => "Education",
            GapElement::Achievements => "Key Achievements",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapReport {
    pub has_gaps: bool,
    pub missing_elements: Vec<GapElement>,
    pub prompts: BTreeMap<GapElement, String>,
}

impl GapReport {
    fn from_missing(missing_elements: Vec<GapElement>) -> Self {
        let prompts = missing_elements
            .iter()
            .map(|&e| (e, e.prompt().to_string()))
            .collect();
        GapReport {
            has_gaps: !missing_elements.is_empty(),
            missing_elements,
            prompts,
        }
    }
}

pub fn detect_gaps(resume: &str) -> GapReport {
    let summary_is_substantial = section_body(resume, Section::ProfessionalSummary)
        .map(|body| body.chars().count() >= MIN_SUMMARY_CHARS)
        .unwrap_or(false);

    let checks = [
        (GapElement::Phone, patterns::has_phone(resume)),
        (GapElement::Linkedin, patterns::has_linkedin(resume)),
        (GapElement::Location, patterns::has_location(resume)),
        (GapElement::Summary, summary_is_substantial),
        (GapElement::Skills, has_section(resume, Section::Skills)),
        (
            GapElement::WorkExperience,
            has_section(resume, Section::WorkExperience),
        ),
        (GapElement::Education, has_section(resume, Section::Education)),
        (
            GapElement::Achievements,
            patterns::count_metrics(resume) >= MIN_METRICS,
        ),
    ];

    let missing = checks
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(element, _)| element)
        .collect();

    GapReport::from_missing(missing)
}
