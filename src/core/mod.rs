pub mod classifier;
pub mod connector;
pub mod engine;
pub mod fetch;
pub mod keys;
pub mod pipeline;
pub mod projector;
pub mod schema;

pub use crate::domain::model::{FieldDescriptor, Projection, Row, RowValue, Schema, TransformResult};
pub use crate::domain::ports::{ConfigProvider, DocumentSource, FieldSink, Pipeline, Storage};
pub use crate::utils::error::Result;
