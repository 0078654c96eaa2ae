#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::SchemaMode;
#[cfg(feature = "cli")]
use crate::domain::options::{
    ConnectorOptions, MissingFieldPolicy, NestedData, DEFAULT_ARCHIVE_NAME, DEFAULT_MAX_DEPTH,
};
#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_field_ids, validate_path, validate_positive_number, validate_url, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "json-tabular")]
#[command(about = "Infer a tabular schema from a JSON endpoint and export its rows")]
pub struct CliConfig {
    #[arg(long, default_value = "https://jsonplaceholder.typicode.com/users")]
    pub api_endpoint: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_ARCHIVE_NAME)]
    pub archive_name: String,

    /// Field ids to export, in order. Defaults to every field.
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Read per-field type metadata from the payload instead of sniffing values
    #[arg(long)]
    pub annotated: bool,

    /// How nested objects become columns: `inline` or `object`
    #[arg(long, default_value = "inline")]
    pub nested_data: NestedData,

    /// Project unmatched field ids as the nearest enclosing value instead of null
    #[arg(long)]
    pub legacy_missing_fields: bool,

    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Print the schema as JSON and exit
    #[arg(long)]
    pub schema_only: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn requested_fields(&self) -> &[String] {
        &self.fields
    }

    fn options(&self) -> ConnectorOptions {
        let missing_fields = if self.legacy_missing_fields {
            MissingFieldPolicy::Container
        } else {
            MissingFieldPolicy::Null
        };
        ConnectorOptions {
            schema_mode: SchemaMode::from_annotated_flag(self.annotated),
            nested_data: self.nested_data,
            missing_fields,
            max_depth: self.max_depth,
        }
    }

    fn archive_name(&self) -> &str {
        &self.archive_name
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_endpoint", &self.api_endpoint)?;
        validate_path("output_path", &self.output_path)?;
        validate_path("archive_name", &self.archive_name)?;
        validate_positive_number("max_depth", self.max_depth, 1)?;
        validate_field_ids("fields", &self.fields)?;
        Ok(())
    }
}
