//! Deterministic résumé analysis: rubric scoring and gap detection, sharing
//! one header utility and one pattern library.

pub mod gaps;
pub mod handlers;
pub mod headers;
pub mod keywords;
pub mod patterns;
pub mod scorer;
