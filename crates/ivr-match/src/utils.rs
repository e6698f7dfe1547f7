//! Utility functions for field-name handling.

/// Normalizes a field name for comparison by lowercasing and replacing
/// separators with spaces.
pub fn normalize_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['_', '-', '.', '/', '\\'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
