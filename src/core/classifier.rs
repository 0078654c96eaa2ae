//! Field type classification. Declared tags are trusted as given; sampled
//! values are tested in order: number, boolean, date/time, URL, then text.

use crate::domain::model::{AnnotatedFieldSpec, SemanticType};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static INTEGER_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+$").expect("integer pattern is valid"));

static HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\S+$").expect("url pattern is valid"));

// ISO 8601 with an offset written without a colon, e.g. `+0100`.
const OFFSET_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// A value to classify, tagged with how its type is known.
#[derive(Debug, Clone, Copy)]
pub enum FieldSample<'a> {
    /// Sniff the type from the sample value.
    Heuristic(&'a Value),
    /// Trust the declared type tag.
    Annotated(&'a AnnotatedFieldSpec),
}

pub fn classify(sample: FieldSample<'_>) -> SemanticType {
    match sample {
        FieldSample::Heuristic(value) => sniff(value),
        FieldSample::Annotated(spec) => spec
            .field_type
            .as_deref()
            .map(SemanticType::from_tag)
            .unwrap_or(SemanticType::Text),
    }
}

fn sniff(value: &Value) -> SemanticType {
    match value {
        // JSON floats count as numbers; float-looking strings do not.
        Value::Number(_) => SemanticType::Number,
        Value::Bool(_) => SemanticType::Boolean,
        Value::String(s) if INTEGER_LITERAL.is_match(s) => SemanticType::Number,
        Value::String(s) if parse_date_time(s).is_some() => SemanticType::YearMonthDayHour,
        Value::String(s) if HTTP_URL.is_match(s) => SemanticType::Url,
        _ => SemanticType::Text,
    }
}

/// Parses the date/time notations found in JSON APIs, normalized to UTC.
/// Values without an offset are read as UTC.
pub fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_DATE_TIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}
