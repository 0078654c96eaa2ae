//! Schema inference and row projection for JSON endpoints.
//!
//! A fetched document (an object or an array of objects) is turned into an
//! ordered set of [`FieldDescriptor`]s, either by sniffing the values of the
//! first record or from per-field annotations carried in the payload, and
//! each record is then projected onto a chosen subset of those fields.
//!
//! ```
//! use json_tabular::{describe_schema, project_rows, ConnectorOptions};
//! use serde_json::json;
//!
//! let document = json!({ "Order Id": 1, "Customer": { "Name": "Ada" } });
//! let options = ConnectorOptions::heuristic();
//!
//! let schema = describe_schema(&document, &options).unwrap();
//! assert_eq!(schema.ids(), vec!["order_id", "customer.name"]);
//!
//! let projection = project_rows(&document, &["customer.name".to_string()], &options).unwrap();
//! assert_eq!(projection.rows[0].values[0].to_cell(), "Ada");
//! ```

pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use crate::core::connector::{describe_schema, project_rows, project_with_schema};
pub use crate::core::{engine::ConnectorEngine, fetch::HttpSource, pipeline::ConnectorPipeline};
pub use domain::model::{
    Aggregation, AnnotatedFieldSpec, FieldDescriptor, Projection, Row, RowValue, Schema,
    SchemaMode, SemanticType,
};
pub use domain::options::{ConnectorOptions, MissingFieldPolicy, NestedData};
pub use utils::error::{ConnectorError, Result};
