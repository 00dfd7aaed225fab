use crate::ats::headers::parse_headers;

const FALLBACK_NAME: &str = "Candidate";
const FALLBACK_TITLE: &str = "Job";

/// `First_Last_Job_Title_CV`: the first two words of the résumé's `# Name`
/// line (letters only) and the job title with every non-alphanumeric
/// character replaced by `_`.
pub fn download_basename(resume: &str, job_title: &str) -> String {
    format!("{}_{}_CV", candidate_name(resume), safe_title(job_title))
}

fn candidate_name(resume: &str) -> String {
    let name = parse_headers(resume)
        .into_iter()
        .find(|h| h.level == 1)
        .map(|h| {
            let letters: String = h
                .text
                .chars()
                .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
                .collect();
            letters.split_whitespace().take(2).collect::<Vec<_>>().join("_")
        })
        .unwrap_or_default();

    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}

fn safe_title(job_title: &str) -> String {
    let replaced: String = job_title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let trimmed = replaced.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename_from_name_and_title() {
        let resume = "# Jane Q. Doe-Smith\njane@example.com\n## Skills";
        assert_eq!(
            download_basename(resume, "Senior Engineer (Rust)"),
            "Jane_Q_Senior_Engineer__Rust_CV"
        );
    }

    #[test]
    fn test_missing_name_and_title_fall_back() {
        assert_eq!(download_basename("## Skills\n- Go", "  "), "Candidate_Job_CV");
        assert_eq!(download_basename("# 123", "SRE"), "Candidate_SRE_CV");
    }
}
