use crate::core::connector::{describe_schema, project_with_schema};
use crate::core::fetch::HttpSource;
use crate::domain::model::{Projection, TransformResult};
use crate::domain::ports::{ConfigProvider, DocumentSource, Pipeline, Storage};
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub struct ConnectorPipeline<S: Storage, C: ConfigProvider, D: DocumentSource = HttpSource> {
    storage: S,
    config: C,
    source: D,
}

impl<S: Storage, C: ConfigProvider> ConnectorPipeline<S, C, HttpSource> {
    /// Fetches from the configured endpoint.
    pub fn new(storage: S, config: C) -> Self {
        let source = HttpSource::new(config.api_endpoint());
        Self {
            storage,
            config,
            source,
        }
    }
}

impl<S: Storage, C: ConfigProvider, D: DocumentSource> ConnectorPipeline<S, C, D> {
    pub fn with_source(storage: S, config: C, source: D) -> Self {
        Self {
            storage,
            config,
            source,
        }
    }
}

/// Header of field ids followed by one line per row.
pub fn to_csv(projection: &Projection) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(projection.fields.iter().map(|f| f.id.as_str()))?;
    for row in &projection.rows {
        writer.write_record(row.values.iter().map(|v| v.to_cell()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, D: DocumentSource> Pipeline for ConnectorPipeline<S, C, D> {
    async fn extract(&self) -> Result<serde_json::Value> {
        self.source.fetch().await
    }

    async fn transform(&self, document: serde_json::Value) -> Result<TransformResult> {
        let options = self.config.options();
        let schema = describe_schema(&document, &options)?;
        let projection =
            project_with_schema(&document, &schema, self.config.requested_fields(), &options)?;
        let csv_output = to_csv(&projection)?;

        Ok(TransformResult {
            schema,
            projection,
            csv_output,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let archive_name = self.config.archive_name();
        let output_path = format!("{}/{}", self.config.output_path(), archive_name);

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>("schema.json", FileOptions::default())?;
            zip.write_all(serde_json::to_string_pretty(&result.schema)?.as_bytes())?;

            zip.start_file::<_, ()>("rows.csv", FileOptions::default())?;
            zip.write_all(result.csv_output.as_bytes())?;

            zip.start_file::<_, ()>("rows.json", FileOptions::default())?;
            zip.write_all(serde_json::to_string_pretty(&result.projection)?.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(archive_name, &zip_data).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::options::ConnectorOptions;
    use crate::utils::error::ConnectorError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                ConnectorError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        requested: Vec<String>,
        options: ConnectorOptions,
    }

    impl MockConfig {
        fn new(requested: &[&str], options: ConnectorOptions) -> Self {
            Self {
                requested: requested.iter().map(|s| s.to_string()).collect(),
                options,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn api_endpoint(&self) -> &str {
            "http://test.com"
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn requested_fields(&self) -> &[String] {
            &self.requested
        }

        fn options(&self) -> ConnectorOptions {
            self.options
        }
    }

    struct StaticSource(serde_json::Value);

    #[async_trait]
    impl DocumentSource for StaticSource {
        async fn fetch(&self) -> Result<serde_json::Value> {
            Ok(self.0.clone())
        }
    }

    fn orders() -> serde_json::Value {
        json!([
            { "Order Id": 1, "Customer": { "Name": "Ada", "City": "London" }, "Placed": "2021-03-05T14:30:00Z" },
            { "Order Id": 2, "Customer": { "Name": "Bo, Jr.", "City": null }, "Placed": "2021-03-06T09:00:00Z" }
        ])
    }

    #[tokio::test]
    async fn test_transform_builds_schema_rows_and_csv() {
        let pipeline = ConnectorPipeline::with_source(
            MockStorage::new(),
            MockConfig::new(&["order_id", "customer.city", "placed"], ConnectorOptions::heuristic()),
            StaticSource(orders()),
        );

        let document = pipeline.extract().await.unwrap();
        let result = pipeline.transform(document).await.unwrap();

        assert_eq!(result.schema.ids(), vec!["order_id", "customer.name", "customer.city", "placed"]);
        assert_eq!(result.projection.rows.len(), 2);
        assert_eq!(
            serde_json::to_value(&result.projection.rows[1].values).unwrap(),
            json!([2, "", "2021030609"])
        );

        let csv_lines: Vec<&str> = result.csv_output.lines().collect();
        assert_eq!(csv_lines[0], "order_id,customer.city,placed");
        assert_eq!(csv_lines[1], "1,London,2021030514");
        assert_eq!(csv_lines[2], "2,,2021030609");
    }

    #[tokio::test]
    async fn test_csv_quotes_embedded_delimiters() {
        let pipeline = ConnectorPipeline::with_source(
            MockStorage::new(),
            MockConfig::new(&["customer.name"], ConnectorOptions::heuristic()),
            StaticSource(orders()),
        );

        let result = pipeline.transform(orders()).await.unwrap();
        assert_eq!(result.csv_output.lines().nth(2), Some("\"Bo, Jr.\""));
    }

    #[tokio::test]
    async fn test_transform_propagates_schema_errors() {
        let pipeline = ConnectorPipeline::with_source(
            MockStorage::new(),
            MockConfig::new(&[], ConnectorOptions::heuristic()),
            StaticSource(json!([])),
        );

        let err = pipeline.transform(json!([])).await.unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidRootShape));
    }

    #[tokio::test]
    async fn test_load_writes_archive() {
        let storage = MockStorage::new();
        let pipeline = ConnectorPipeline::with_source(
            storage.clone(),
            MockConfig::new(&[], ConnectorOptions::heuristic()),
            StaticSource(orders()),
        );

        let result = pipeline.transform(orders()).await.unwrap();
        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "test_output/connector_output.zip");

        let zip_bytes = storage.get_file("connector_output.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();

        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();
        assert_eq!(file_names, vec!["rows.csv", "rows.json", "schema.json"]);

        let mut schema_json = String::new();
        archive
            .by_name("schema.json")
            .unwrap()
            .read_to_string(&mut schema_json)
            .unwrap();
        let schema: serde_json::Value = serde_json::from_str(&schema_json).unwrap();
        assert_eq!(schema["mode"], "heuristic");
        assert_eq!(schema["fields"][0]["id"], "order_id");
        assert_eq!(schema["fields"][0]["semantic_type"], "NUMBER");
        assert_eq!(schema["fields"][0]["aggregation"], "SUM");
    }
}
