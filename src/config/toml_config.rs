use crate::domain::model::SchemaMode;
use crate::domain::options::{
    ConnectorOptions, MissingFieldPolicy, NestedData, DEFAULT_ARCHIVE_NAME, DEFAULT_MAX_DEPTH,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ConnectorError, Result};
use crate::utils::validation::{
    validate_field_ids, validate_path, validate_positive_number, validate_required_field,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub connector: ConnectorInfo,
    pub source: SourceConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub fields: FieldsConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub mode: Option<SchemaMode>,
    pub nested_data: Option<NestedData>,
    pub missing_fields: Option<MissingFieldPolicy>,
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldsConfig {
    #[serde(default)]
    pub requested: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub archive_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub log_format: Option<String>,
    pub verbose: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ConnectorError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ConnectorError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn timeout_seconds(&self) -> Option<u64> {
        self.source.timeout_seconds
    }

    pub fn headers(&self) -> HashMap<String, String> {
        self.source.headers.clone().unwrap_or_default()
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .is_some_and(|format| format.eq_ignore_ascii_case("json"))
    }

    pub fn verbose(&self) -> bool {
        self.monitoring.as_ref().and_then(|m| m.verbose).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn requested_fields(&self) -> &[String] {
        &self.fields.requested
    }

    fn options(&self) -> ConnectorOptions {
        ConnectorOptions {
            schema_mode: self.schema.mode.unwrap_or_default(),
            nested_data: self.schema.nested_data.unwrap_or_default(),
            missing_fields: self.schema.missing_fields.unwrap_or_default(),
            max_depth: self.schema.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        }
    }

    fn archive_name(&self) -> &str {
        self.load.archive_name.as_deref().unwrap_or(DEFAULT_ARCHIVE_NAME)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_required_field("connector.name", &self.connector.name)?;
        validate_url("source.endpoint", &self.source.endpoint)?;
        validate_path("load.output_path", &self.load.output_path)?;
        validate_path("load.archive_name", self.archive_name())?;
        if let Some(max_depth) = self.schema.max_depth {
            validate_positive_number("schema.max_depth", max_depth, 1)?;
        }
        validate_field_ids("fields.requested", &self.fields.requested)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[connector]
name = "orders"

[source]
endpoint = "https://api.example.com/orders"
timeout_seconds = 10

[schema]
mode = "annotated"
nested_data = "object"
missing_fields = "container"

[fields]
requested = ["order_id", "customer.city"]

[load]
output_path = "./test-output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.connector.name, "orders");
        assert_eq!(config.api_endpoint(), "https://api.example.com/orders");
        assert_eq!(config.requested_fields(), ["order_id", "customer.city"]);
        assert_eq!(config.archive_name(), DEFAULT_ARCHIVE_NAME);
        assert_eq!(config.timeout_seconds(), Some(10));

        let options = config.options();
        assert_eq!(options.schema_mode, SchemaMode::Annotated);
        assert_eq!(options.nested_data, NestedData::Object);
        assert_eq!(options.missing_fields, MissingFieldPolicy::Container);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_schema_section_is_optional() {
        let toml_content = r#"
[connector]
name = "minimal"

[source]
endpoint = "https://api.example.com"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.options(), ConnectorOptions::default());
        assert!(config.requested_fields().is_empty());
        assert!(!config.json_logs());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("JSON_TABULAR_TEST_ENDPOINT", "https://test.api.com");

        let toml_content = r#"
[connector]
name = "test"

[source]
endpoint = "${JSON_TABULAR_TEST_ENDPOINT}"
headers = { "Authorization" = "Bearer ${JSON_TABULAR_UNSET_TOKEN}" }

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.endpoint, "https://test.api.com");
        assert_eq!(
            config.headers().get("Authorization").map(String::as_str),
            Some("Bearer ${JSON_TABULAR_UNSET_TOKEN}")
        );

        std::env::remove_var("JSON_TABULAR_TEST_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[connector]
name = "test"

[source]
endpoint = "invalid-url"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[connector]
name = "test"

[source]
endpoint = "https://api.example.com"

[schema]
max_depth = 0

[load]
output_path = "./output"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_schema_mode_is_a_parse_error() {
        let toml_content = r#"
[connector]
name = "test"

[source]
endpoint = "https://api.example.com"

[schema]
mode = "guess"

[load]
output_path = "./output"
"#;
        assert!(matches!(
            TomlConfig::from_toml_str(toml_content),
            Err(ConnectorError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[connector]
name = "file-test"

[source]
endpoint = "https://api.example.com"

[load]
output_path = "./output"
archive_name = "orders.zip"

[monitoring]
log_format = "JSON"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.connector.name, "file-test");
        assert_eq!(config.archive_name(), "orders.zip");
        assert!(config.json_logs());
    }
}
