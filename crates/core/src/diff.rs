//! Line-based unified diffs between version contents.

use similar::TextDiff;

/// Unified diff of `old` against `new` with `"{name} v{n}"` headers
///
/// Returns an empty string when the contents are identical, so callers can
/// distinguish "no differences" without parsing hunks.
pub fn unified(name: &str, v1: i64, v2: i64, old: &str, new: &str) -> String {
    if old == new {
        return String::new();
    }

    let diff = TextDiff::from_lines(old, new);
    diff.unified_diff()
        .context_radius(3)
        .header(&format!("{} v{}", name, v1), &format!("{} v{}", name, v2))
        .to_string()
}
