//! Public entry points: schema discovery and row projection.
//!
//! Both calls take the whole fetched document and an explicit
//! [`ConnectorOptions`]. A bare object document is treated as a
//! one-record array.

use crate::core::projector::Projector;
use crate::core::schema::build_schema;
use crate::domain::model::{FieldDescriptor, Projection, Schema};
use crate::domain::options::ConnectorOptions;
use crate::utils::error::{ConnectorError, Result};
use serde_json::Value;
use std::borrow::Cow;

/// Records of a document: its elements when it is an array, otherwise the
/// document itself as a single record.
pub fn as_records(document: &Value) -> Cow<'_, [Value]> {
    match document {
        Value::Array(items) => Cow::Borrowed(items.as_slice()),
        other => Cow::Owned(vec![other.clone()]),
    }
}

/// Every field the document exposes under `options.schema_mode`.
pub fn describe_schema(document: &Value, options: &ConnectorOptions) -> Result<Schema> {
    let schema = build_schema(document, options)?;
    tracing::info!("Described {} fields ({} mode)", schema.len(), schema.mode);
    Ok(schema)
}

/// Rows for `requested_ids`, in request order. The schema is derived from
/// the document again, as the host does not hand it back between calls.
pub fn project_rows(
    document: &Value,
    requested_ids: &[String],
    options: &ConnectorOptions,
) -> Result<Projection> {
    let schema = build_schema(document, options)?;
    project_with_schema(document, &schema, requested_ids, options)
}

/// Rows for `requested_ids` against a schema described earlier.
///
/// Fails with [`ConnectorError::ModeMismatch`] when `schema` was built in a
/// different mode than `options` asks for, and with
/// [`ConnectorError::UnknownField`] for ids the schema does not contain.
pub fn project_with_schema(
    document: &Value,
    schema: &Schema,
    requested_ids: &[String],
    options: &ConnectorOptions,
) -> Result<Projection> {
    if schema.mode != options.schema_mode {
        return Err(ConnectorError::ModeMismatch {
            described: schema.mode.to_string(),
            requested: options.schema_mode.to_string(),
        });
    }

    let fields = select_fields(schema, requested_ids)?;
    let records = as_records(document);
    let rows = Projector::new(&fields, options).project(&records);

    tracing::info!("Projected {} rows x {} fields", rows.len(), fields.len());
    Ok(Projection { fields, rows })
}

/// Descriptors for `requested_ids` in request order; all fields when the
/// request is empty.
pub fn select_fields(schema: &Schema, requested_ids: &[String]) -> Result<Vec<FieldDescriptor>> {
    if requested_ids.is_empty() {
        return Ok(schema.fields.clone());
    }

    requested_ids
        .iter()
        .map(|id| {
            schema
                .get(id)
                .cloned()
                .ok_or_else(|| ConnectorError::UnknownField { id: id.clone() })
        })
        .collect()
}
