//! Line-level change set between two versions of a résumé, for display.

use serde::{Deserialize, Serialize};
use similar::{Algorithm, ChangeTag, TextDiff};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub kind: ChangeKind,
    pub text: String,
}

/// Full line diff (Myers). Unchanged and added lines appear in `new`'s order;
/// there are no hunk headers or file markers to filter.
pub fn diff_lines(old: &str, new: &str) -> Vec<DiffLine> {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_lines(old, new);

    diff.iter_all_changes()
        .map(|change| DiffLine {
            kind: match change.tag() {
                ChangeTag::Insert => ChangeKind::Added,
                ChangeTag::Delete => ChangeKind::Removed,
                ChangeTag::Equal => ChangeKind::Unchanged,
            },
            text: change
                .value()
                .trim_end_matches(|c: char| c == '\n' || c == '\r')
                .to_string(),
        })
        .collect()
}
