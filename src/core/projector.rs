use crate::core::classifier::parse_date_time;
use crate::core::keys::{normalize_segment, split_path};
use crate::domain::model::{FieldDescriptor, Row, RowValue, SchemaMode, SemanticType};
use crate::domain::options::{ConnectorOptions, MissingFieldPolicy};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Outcome of walking a field id through a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    Found(&'a Value),
    /// A segment held an explicit `null`.
    NullLeaf,
    /// A segment matched nothing; carries the deepest node reached.
    NotFound(&'a Value),
}

/// Walks `path` through `record`. Each segment is looked up as an exact
/// key first, then against the normalized form of every key, so ids built
/// from `"Postal Code"` still find their value. Numeric segments index
/// arrays.
///
/// Under [`MissingFieldPolicy::Null`] the first unmatched segment ends the
/// walk. Under [`MissingFieldPolicy::Container`] an unmatched segment is
/// skipped and the walk goes on from the same node, so `customer.city`
/// still finds a top-level `city`.
pub fn resolve_path<'a>(
    path: &[&str],
    record: &'a Value,
    missing_fields: MissingFieldPolicy,
) -> Resolved<'a> {
    let mut node = record;
    let mut missed = false;

    for segment in path {
        let next = match node {
            Value::Object(map) => match map.get(*segment) {
                Some(value) => Some(value),
                None => map
                    .iter()
                    .find(|(key, _)| normalize_segment(key) == *segment)
                    .map(|(_, value)| value),
            },
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };

        match next {
            Some(Value::Null) => return Resolved::NullLeaf,
            Some(value) => node = value,
            None if missing_fields == MissingFieldPolicy::Container => missed = true,
            None => return Resolved::NotFound(node),
        }
    }

    if missed {
        Resolved::NotFound(node)
    } else {
        Resolved::Found(node)
    }
}

/// Reformats a date to the sortable `YYYYMMDDHH` form in UTC. Integers are
/// read as epoch milliseconds. Returns `None` when `value` is not a date.
pub fn convert_date(value: &Value) -> Option<String> {
    let parsed: DateTime<Utc> = match value {
        Value::String(s) => parse_date_time(s)?,
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?)?,
        _ => return None,
    };
    Some(parsed.format("%Y%m%d%H").to_string())
}

/// Coerces a resolved value to an output-safe scalar.
pub fn validate_value(field: &FieldDescriptor, value: &Value) -> RowValue {
    if field.semantic_type == SemanticType::YearMonthDayHour {
        if let Some(converted) = convert_date(value) {
            return RowValue::Text(converted);
        }
    }

    match value {
        Value::String(s) => RowValue::Text(s.clone()),
        Value::Number(n) => RowValue::Number(n.clone()),
        Value::Bool(b) => RowValue::Bool(*b),
        Value::Array(_) | Value::Object(_) => RowValue::Text(value.to_string()),
        Value::Null => RowValue::Null,
    }
}

/// Projects records into rows aligned with a fixed field list.
pub struct Projector<'f> {
    fields: &'f [FieldDescriptor],
    paths: Vec<Vec<&'f str>>,
    mode: SchemaMode,
    missing_fields: MissingFieldPolicy,
}

impl<'f> Projector<'f> {
    pub fn new(fields: &'f [FieldDescriptor], options: &ConnectorOptions) -> Self {
        Self {
            fields,
            paths: fields.iter().map(|f| split_path(&f.id)).collect(),
            mode: options.schema_mode,
            missing_fields: options.missing_fields,
        }
    }

    pub fn project(&self, records: &[Value]) -> Vec<Row> {
        records.iter().map(|record| self.project_record(record)).collect()
    }

    pub fn project_record(&self, record: &Value) -> Row {
        let values = self
            .fields
            .iter()
            .zip(&self.paths)
            .map(|(field, path)| {
                if record.is_null() {
                    return validate_value(field, &Value::String(String::new()));
                }
                self.project_field(field, path, record)
            })
            .collect();
        Row { values }
    }

    fn project_field(&self, field: &FieldDescriptor, path: &[&str], record: &Value) -> RowValue {
        let resolved = match resolve_path(path, record, self.missing_fields) {
            Resolved::Found(entry) if self.mode == SchemaMode::Annotated => annotated_value(entry),
            other => other,
        };

        match resolved {
            Resolved::Found(value) => validate_value(field, value),
            Resolved::NullLeaf => RowValue::empty(),
            Resolved::NotFound(node) => match self.missing_fields {
                MissingFieldPolicy::Null => {
                    tracing::debug!("Field '{}' not present in record", field.id);
                    RowValue::Null
                }
                MissingFieldPolicy::Container => validate_value(field, node),
            },
        }
    }
}

/// The `value` member of an annotated entry.
fn annotated_value(entry: &Value) -> Resolved<'_> {
    match entry.get("value") {
        Some(Value::Null) => Resolved::NullLeaf,
        Some(value) => Resolved::Found(value),
        None => Resolved::NotFound(entry),
    }
}

/// One row per record, values in the order of `fields`.
pub fn project(records: &[Value], fields: &[FieldDescriptor], options: &ConnectorOptions) -> Vec<Row> {
    Projector::new(fields, options).project(records)
}
