//! Path normalization and segment matching.
//!
//! # Responsibilities
//! - Normalize incoming paths (collapse duplicate slashes, drop query)
//! - Match prefixes on whole segments
//! - Remove a leading segment run when building the forward path
//!
//! # Design Decisions
//! - All matching operates on segment lists, never raw substrings.
//!   Substring removal corrupts forward paths when the prefix token
//!   recurs later in the path (e.g. "/api/reports/api/1").
//! - Matching is case-sensitive
//! - No regex to guarantee O(n) matching

/// Normalize a raw request path.
///
/// Collapses duplicate slashes and strips any query or fragment part.
/// The result always starts with '/' and has no trailing slash except
/// for the root path itself.
pub fn normalize_path(raw: &str) -> String {
    let path = raw.split(['?', '#']).next().unwrap_or(raw);

    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

/// Split a normalized path into its segments.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// True when `prefix` is a leading segment run of `path_segments`.
///
/// An empty prefix matches every path (wildcard rule).
pub fn is_segment_prefix(prefix: &[String], path_segments: &[&str]) -> bool {
    if prefix.len() > path_segments.len() {
        return false;
    }
    prefix
        .iter()
        .zip(path_segments)
        .all(|(want, have)| want == have)
}

/// Remove a leading segment run from a normalized path.
///
/// Returns the path unchanged when it does not start with the given
/// segments. Only the leading run is removed; later occurrences of the
/// same tokens are preserved.
pub fn strip_leading_segments(path: &str, strip: &[String]) -> String {
    let segs = segments(path);
    if strip.is_empty() || !is_segment_prefix(strip, &segs) {
        return path.to_string();
    }
    let rest = &segs[strip.len()..];
    if rest.is_empty() {
        return "/".to_string();
    }
    let mut forward = String::with_capacity(path.len());
    for segment in rest {
        forward.push('/');
        forward.push_str(segment);
    }
    forward
}
