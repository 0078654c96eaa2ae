//! Field id construction.
//!
//! Ids are lower-cased, whitespace runs become `_`, and nested keys are
//! joined with `.`: `{"Customer": {"Postal Code": ..}}` yields
//! `customer.postal_code`.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

pub const PATH_SEPARATOR: char = '.';

/// Replaces every whitespace run with `_` and lower-cases the result.
pub fn normalize(label: &str) -> String {
    WHITESPACE.replace_all(label, "_").to_lowercase()
}

/// Normal form of a single path segment. Dots inside a key would otherwise
/// read as an extra nesting level.
pub fn normalize_segment(key: &str) -> String {
    normalize(key).replace(PATH_SEPARATOR, "_")
}

/// Dotted id of `current_key` below `parent`. An empty key has no id.
pub fn element_key(parent: Option<&str>, current_key: &str) -> String {
    if current_key.is_empty() {
        return String::new();
    }

    match parent {
        Some(parent) => format!("{}{}{}", parent, PATH_SEPARATOR, normalize_segment(current_key)),
        None => normalize_segment(current_key),
    }
}

/// Splits an id back into the segments `element_key` joined.
pub fn split_path(id: &str) -> Vec<&str> {
    id.split(PATH_SEPARATOR).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace_runs() {
        assert_eq!(normalize("Order Id"), "order_id");
        assert_eq!(normalize("Order \t  Id"), "order_id");
        assert_eq!(normalize("already_normal"), "already_normal");
        assert_eq!(normalize("Line\nBreak"), "line_break");
    }

    #[test]
    fn test_element_key_builds_dotted_paths() {
        assert_eq!(element_key(None, "Customer"), "customer");
        assert_eq!(element_key(Some("customer"), "Postal Code"), "customer.postal_code");
        assert_eq!(element_key(Some("a.b"), "C"), "a.b.c");
    }

    #[test]
    fn test_element_key_empty_key() {
        assert_eq!(element_key(None, ""), "");
        assert_eq!(element_key(Some("customer"), ""), "");
    }

    #[test]
    fn test_dots_inside_keys_do_not_add_levels() {
        assert_eq!(element_key(None, "v1.2 Score"), "v1_2_score");
        assert_eq!(split_path(&element_key(Some("stats"), "p.95")), vec!["stats", "p_95"]);
    }
}
