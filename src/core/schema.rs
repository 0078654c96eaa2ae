use crate::core::classifier::{classify, FieldSample};
use crate::core::keys::element_key;
use crate::domain::model::{AnnotatedFieldSpec, FieldDescriptor, Schema, SchemaMode};
use crate::domain::options::ConnectorOptions;
use crate::domain::ports::FieldSink;
use crate::utils::error::{ConnectorError, Result};
use serde::Deserialize;
use serde_json::{map, Map, Value};

/// Pending object on the traversal stack.
struct Frame<'a> {
    id: Option<String>,
    name: Option<String>,
    depth: usize,
    entries: map::Iter<'a>,
}

/// Returns the record a schema is derived from: the document itself when
/// it is an object, its first element when it is an array.
pub fn sample_record(document: &Value) -> Result<&Map<String, Value>> {
    let first = match document {
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    match first {
        Some(Value::Object(record)) => Ok(record),
        _ => Err(ConnectorError::InvalidRootShape),
    }
}

/// Derives fields by sniffing the sample's values.
///
/// With inline nesting, objects are flattened into dotted ids down to
/// `max_depth`; deeper objects become a single text column. Otherwise only
/// top-level keys become columns.
pub fn build_heuristic(
    sample: &Map<String, Value>,
    options: &ConnectorOptions,
    sink: &mut impl FieldSink,
) -> Result<()> {
    let mut stack = vec![Frame {
        id: None,
        name: None,
        depth: 0,
        entries: sample.iter(),
    }];

    loop {
        let Some(frame) = stack.last_mut() else {
            break;
        };
        let Some((key, value)) = frame.entries.next() else {
            stack.pop();
            continue;
        };

        let id = element_key(frame.id.as_deref(), key);
        if id.is_empty() {
            tracing::debug!("Skipping empty key below '{}'", frame.id.as_deref().unwrap_or("<root>"));
            continue;
        }
        let name = match frame.name.as_deref() {
            Some(parent) => format!("{}.{}", parent, key),
            None => key.clone(),
        };
        let depth = frame.depth;

        match value {
            Value::Object(child) if options.is_inline() => {
                if depth + 1 < options.max_depth {
                    stack.push(Frame {
                        id: Some(id),
                        name: Some(name),
                        depth: depth + 1,
                        entries: child.iter(),
                    });
                    continue;
                }
                tracing::warn!(
                    "'{}' is nested deeper than {} levels; keeping it as one column",
                    id,
                    options.max_depth
                );
                sink.append(heuristic_field(id, name, value));
            }
            _ => sink.append(heuristic_field(id, name, value)),
        }
    }

    Ok(())
}

fn heuristic_field(id: String, name: String, value: &Value) -> FieldDescriptor {
    let semantic_type = classify(FieldSample::Heuristic(value));
    tracing::debug!("Field '{}' sniffed as {}", id, semantic_type);
    FieldDescriptor::new(id, name, String::new(), semantic_type, None)
}

/// Derives fields from the declared metadata of an annotated record. Each
/// entry is one field; the payload is not traversed.
pub fn build_annotated(sample: &Map<String, Value>, sink: &mut impl FieldSink) -> Result<()> {
    for (key, entry) in sample {
        let id = element_key(None, key);
        if id.is_empty() {
            return Err(ConnectorError::UnidentifiableField {
                field: key.clone(),
                reason: "annotated field names cannot be empty".to_string(),
            });
        }

        let spec = annotated_spec(key, entry)?;
        let semantic_type = classify(FieldSample::Annotated(&spec));
        tracing::debug!("Field '{}' declared as {}", id, semantic_type);

        let field = FieldDescriptor::new(
            id,
            spec.name.clone().unwrap_or_else(|| key.clone()),
            spec.description.clone().unwrap_or_default(),
            semantic_type,
            spec.aggregation.as_deref(),
        );
        sink.append(field);
    }

    Ok(())
}

/// Parses one entry of an annotated record.
pub fn annotated_spec(key: &str, entry: &Value) -> Result<AnnotatedFieldSpec> {
    if !entry.is_object() {
        return Err(ConnectorError::UnidentifiableField {
            field: key.to_string(),
            reason: format!("expected a field annotation object, found {}", json_kind(entry)),
        });
    }
    AnnotatedFieldSpec::deserialize(entry).map_err(|e| ConnectorError::UnidentifiableField {
        field: key.to_string(),
        reason: e.to_string(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Builds the schema of `document` under the mode named in `options`.
pub fn build_schema(document: &Value, options: &ConnectorOptions) -> Result<Schema> {
    let sample = sample_record(document)?;
    let mut schema = Schema::new(options.schema_mode);

    match options.schema_mode {
        SchemaMode::Heuristic => build_heuristic(sample, options, &mut schema)?,
        SchemaMode::Annotated => build_annotated(sample, &mut schema)?,
    }

    let metrics = schema.fields.iter().filter(|f| f.is_metric).count();
    tracing::debug!(
        "Built {} schema: {} metrics, {} dimensions",
        schema.mode,
        metrics,
        schema.len() - metrics
    );
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Aggregation, SemanticType};
    use crate::domain::options::NestedData;
    use serde_json::json;

    fn heuristic_schema(document: Value, options: ConnectorOptions) -> Schema {
        build_schema(&document, &options).unwrap()
    }

    #[test]
    fn test_inline_flattens_nested_objects() {
        let schema = heuristic_schema(
            json!({ "Order Id": 1, "Customer": { "Name": "Ada", "City": "London" } }),
            ConnectorOptions::heuristic(),
        );

        assert_eq!(schema.ids(), vec!["order_id", "customer.name", "customer.city"]);
        assert_eq!(schema.fields[0].name, "Order Id");
        assert_eq!(schema.fields[1].name, "Customer.Name");
        assert!(schema.fields[0].is_metric);
        assert_eq!(schema.fields[0].aggregation, Some(Aggregation::Sum));
        assert!(!schema.fields[1].is_metric);
        assert_eq!(schema.fields[1].aggregation, None);
    }

    #[test]
    fn test_dotted_keys_stay_one_segment() {
        let document = json!([{ "p.95": 1, "Stats": { "v1.2 Rate": "7" } }]);
        let options = ConnectorOptions::heuristic();
        let schema = heuristic_schema(document.clone(), options);

        assert_eq!(schema.ids(), vec!["p_95", "stats.v1_2_rate"]);
        assert_eq!(schema.fields[0].name, "p.95");

        let rows = crate::core::projector::project(
            std::slice::from_ref(&document[0]),
            &schema.fields,
            &options,
        );
        assert_eq!(serde_json::to_value(&rows[0].values).unwrap(), json!([1, "7"]));
    }

    #[test]
    fn test_inline_null_leaf_keeps_its_path() {
        let schema = heuristic_schema(
            json!({ "customer": { "city": null, "tags": ["a"] } }),
            ConnectorOptions::heuristic(),
        );
        assert_eq!(schema.ids(), vec!["customer.city", "customer.tags"]);
        assert!(schema.fields.iter().all(|f| f.semantic_type == SemanticType::Text));
    }

    #[test]
    fn test_object_mode_types_each_key_by_its_own_value() {
        let schema = heuristic_schema(
            json!({ "id": 7, "customer": { "name": "Ada" }, "site": "https://a.io" }),
            ConnectorOptions::heuristic().with_nested_data(NestedData::Object),
        );

        assert_eq!(schema.ids(), vec!["id", "customer", "site"]);
        assert_eq!(schema.fields[0].semantic_type, SemanticType::Number);
        assert_eq!(schema.fields[1].semantic_type, SemanticType::Text);
        assert_eq!(schema.fields[2].semantic_type, SemanticType::Url);
    }

    #[test]
    fn test_first_array_element_is_the_sample() {
        let schema = heuristic_schema(
            json!([{ "a": 1 }, { "a": "x", "b": true }]),
            ConnectorOptions::heuristic(),
        );
        assert_eq!(schema.ids(), vec!["a"]);
        assert_eq!(schema.fields[0].semantic_type, SemanticType::Number);
    }

    #[test]
    fn test_colliding_keys_last_write_wins() {
        let schema = heuristic_schema(
            json!({ "Order Id": "A-1", "order  id": 5 }),
            ConnectorOptions::heuristic(),
        );
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.fields[0].id, "order_id");
        assert_eq!(schema.fields[0].name, "order  id");
        assert_eq!(schema.fields[0].semantic_type, SemanticType::Number);
    }

    #[test]
    fn test_depth_guard_keeps_deep_objects_as_text() {
        let schema = heuristic_schema(
            json!({ "a": { "b": { "c": { "d": 1 } } } }),
            ConnectorOptions::heuristic().with_max_depth(2),
        );
        assert_eq!(schema.ids(), vec!["a.b"]);
        assert_eq!(schema.fields[0].semantic_type, SemanticType::Text);
    }

    #[test]
    fn test_empty_keys_are_skipped() {
        let schema = heuristic_schema(json!({ "": 1, "b": 2 }), ConnectorOptions::heuristic());
        assert_eq!(schema.ids(), vec!["b"]);
    }

    #[test]
    fn test_invalid_root_shapes() {
        for document in [json!(null), json!(3), json!("text"), json!([]), json!([1, 2]), json!([null])] {
            let err = build_schema(&document, &ConnectorOptions::heuristic()).unwrap_err();
            assert!(matches!(err, ConnectorError::InvalidRootShape), "{:?}", document);
        }
    }

    #[test]
    fn test_annotated_entries_become_fields() {
        let schema = build_schema(
            &json!({
                "revenue": { "name": "Revenue", "description": "", "type": "NUMBER", "aggregation": "NONE", "value": 42 },
                "Unit Price": { "type": "NUMBER", "aggregation": "AVG", "value": "n/a" },
                "country": { "name": "Country", "description": "ISO name", "type": "COUNTRY", "aggregation": "SUM", "value": "NZ" }
            }),
            &ConnectorOptions::annotated(),
        )
        .unwrap();

        assert_eq!(schema.mode, SchemaMode::Annotated);
        assert_eq!(schema.ids(), vec!["revenue", "unit_price", "country"]);

        let revenue = &schema.fields[0];
        assert_eq!(revenue.name, "Revenue");
        assert_eq!(revenue.semantic_type, SemanticType::Number);
        assert_eq!(revenue.aggregation, Some(Aggregation::Sum));

        let price = &schema.fields[1];
        assert_eq!(price.name, "Unit Price");
        assert_eq!(price.aggregation, Some(Aggregation::Avg));

        let country = &schema.fields[2];
        assert_eq!(country.description, "ISO name");
        assert_eq!(country.semantic_type, SemanticType::Country);
        assert_eq!(country.aggregation, None);
        assert!(!country.is_metric);
    }

    #[test]
    fn test_annotated_mode_does_not_traverse_payload() {
        let schema = build_schema(
            &json!({ "address": { "type": "TEXT", "value": { "city": "Oslo" } } }),
            &ConnectorOptions::annotated(),
        )
        .unwrap();
        assert_eq!(schema.ids(), vec!["address"]);
    }

    #[test]
    fn test_annotated_entry_must_be_an_object() {
        let err = build_schema(&json!({ "revenue": 42 }), &ConnectorOptions::annotated()).unwrap_err();
        match err {
            ConnectorError::UnidentifiableField { field, .. } => assert_eq!(field, "revenue"),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = build_schema(
            &json!({ "revenue": { "type": 5 } }),
            &ConnectorOptions::annotated(),
        )
        .unwrap_err();
        assert!(matches!(err, ConnectorError::UnidentifiableField { .. }));
    }
}
