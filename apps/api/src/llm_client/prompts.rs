// Shared prompt fragments and prompt-building utilities.
// Each module that needs completion calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments.

use crate::ats::headers::Section;

/// Dates must survive every rewrite untouched.
pub const DATE_PRESERVATION_RULES: &str = "\
**CRITICAL INSTRUCTION ON DATES:**
You must PRESERVE all dates exactly as they appear in the original CV.
- Do NOT change \"Jan 2020\" to \"January 2020\".
- Do NOT change \"2020 - Present\" to \"2020 - 2023\".
- Keep the exact date strings for every work experience and education entry.";

/// Zero-fabrication rules shared by tailoring and improvement.
pub const FACTUAL_ACCURACY_RULES: &str = "\
**CRITICAL RULES ON FACTUAL ACCURACY (ZERO HALLUCINATION):**
1. **DO NOT INVENT INFORMATION:** You must NOT add any Education, Work Experience, Job Titles, Degrees, Institutions or Companies that are not explicitly present in the original CV.
2. **MISSING SECTIONS:** If the original CV does not have an Education section, DO NOT CREATE ONE. It is better to have a missing section than a fake one.
3. **ONLY TAILOR EXISTING CONTENT:** You can rephrase responsibilities to match keywords, but you cannot invent new responsibilities or skills that the candidate clearly does not possess based on the text.";

/// Output format the scorer and the document converter understand.
pub const MARKDOWN_FORMAT_RULES: &str = "\
**FORMAT:** Return ONLY the content of the CV, formatted in clean Markdown.
- Use `##` for section headers (e.g., ## Professional Summary) in Title Case.
- Use `###` for sub-headers (e.g., ### Software Engineer | Google).
- Use `**bold**` for key terms (job titles, company names, key achievements).
- Use `*italic*` sparingly for less emphatic emphasis if needed.
- Use `-` for bullet points, with no indentation before the marker.
- Keep lines under 120 characters.
- DO NOT use tables, pipes for layout, text boxes, images or special characters.";

/// Bulleted list of the accepted section headers, built from the same
/// synonym table the scorer matches against.
pub fn section_header_rules() -> String {
    let mut rules = String::from("Use ONLY these exact section headers:\n");
    for section in Section::ALL {
        let canonical = section.canonical_name();
        let synonyms = std::iter::once(canonical)
            .chain(section.synonyms().iter().copied().filter(|s| *s != canonical))
            .map(|s| format!("## {s}"))
            .collect::<Vec<_>>()
            .join(" or ");
        rules.push_str("- ");
        rules.push_str(&synonyms);
        match section {
            Section::Education => rules.push_str(" (ONLY IF present in original CV)"),
            Section::Certifications | Section::Projects => rules.push_str(" (if applicable)"),
            _ => {}
        }
        rules.push('\n');
    }
    rules.push_str("DO NOT use creative headers like \"Career Journey\" or \"My Expertise\".");
    rules
}

/// Fills `{name}` placeholders in a single pass. Inserted values are never
/// rescanned, so user text that itself contains `{cv_text}` stays literal.
/// Unknown placeholders and stray braces are kept as-is.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let substitution = tail.find('}').and_then(|close| {
            let key = &tail[1..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });
        match substitution {
            Some((value, close)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
