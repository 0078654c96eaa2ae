use crate::domain::model::{FieldDescriptor, Schema, TransformResult};
use crate::domain::options::{ConnectorOptions, DEFAULT_ARCHIVE_NAME};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn output_path(&self) -> &str;
    /// Field ids to project, in output order. Empty selects every field.
    fn requested_fields(&self) -> &[String];
    fn options(&self) -> ConnectorOptions;

    fn archive_name(&self) -> &str {
        DEFAULT_ARCHIVE_NAME
    }
}

/// Fetch-and-parse collaborator.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self) -> Result<serde_json::Value>;
}

/// Host-side schema builder.
pub trait FieldSink {
    fn append_metric(&mut self, field: FieldDescriptor);
    fn append_dimension(&mut self, field: FieldDescriptor);

    fn append(&mut self, field: FieldDescriptor) {
        if field.is_metric {
            self.append_metric(field);
        } else {
            self.append_dimension(field);
        }
    }
}

impl FieldSink for Schema {
    fn append_metric(&mut self, field: FieldDescriptor) {
        self.insert(field);
    }

    fn append_dimension(&mut self, field: FieldDescriptor) {
        self.insert(field);
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<serde_json::Value>;
    async fn transform(&self, document: serde_json::Value) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
