//! Destination filename resolution.
//!
//! Pure name computation; the filesystem is never consulted or mutated here.
//! Callers pass the destination directory's current entry listing.

use chrono::{DateTime, Local};
use localmedia_core::derivative::split_stem_ext;

/// Build the candidate name for an incoming file, applying the optional
/// date-prefix transform (`<formatted-date>-<original>`). The pattern is a
/// chrono strftime string, e.g. `%Y-%m-%d`.
pub fn candidate_name(original: &str, date_prefix: Option<&str>) -> String {
    candidate_name_at(original, date_prefix, Local::now())
}

/// [`candidate_name`] with an explicit timestamp.
pub fn candidate_name_at(
    original: &str,
    date_prefix: Option<&str>,
    now: DateTime<Local>,
) -> String {
    match date_prefix {
        Some(pattern) => format!("{}-{}", now.format(pattern), original),
        None => original.to_string(),
    }
}

/// Resolve a naming collision against the destination's current entries.
///
/// When the candidate is already present, the directory's entry count is
/// appended to the stem (`a.png` in a 3-entry directory becomes `a3.png`).
/// This is a single pass: the disambiguated name is not checked again for a
/// second collision. With no collision the candidate is returned unchanged.
pub fn resolve_collision(candidate: &str, existing: &[String]) -> String {
    if !existing.iter().any(|name| name == candidate) {
        return candidate.to_string();
    }
    let (stem, ext) = split_stem_ext(candidate);
    format!("{}{}{}", stem, existing.len(), ext)
}
