use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ats::gaps::GapElement;

/// User-supplied answers to gap prompts, keyed by gap tag. Passed to the
/// rewrite engine verbatim; blank answers are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdditionalInfo(BTreeMap<GapElement, String>);

impl AdditionalInfo {
    /// Non-blank answers in gap-check order.
    pub fn entries(&self) -> impl Iterator<Item = (GapElement, &str)> {
        self.0
            .iter()
            .map(|(element, value)| (*element, value.trim()))
            .filter(|(_, value)| !value.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}

impl FromIterator<(GapElement, String)> for AdditionalInfo {
    fn from_iter<I: IntoIterator<Item = (GapElement, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
