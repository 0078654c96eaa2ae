use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("\"{url}\" returned an error: {message}")]
    FetchError { url: String, message: String },

    #[error("\"{url}\" returned no content")]
    EmptyResponse { url: String },

    #[error("Invalid JSON format: {message}")]
    InvalidJson { message: String },

    #[error("Invalid JSON format: the document root must be an object or an array of objects")]
    InvalidRootShape,

    #[error("Unable to identify the data format of field '{field}': {reason}")]
    UnidentifiableField { field: String, reason: String },

    #[error("Schema was described in {described} mode but rows were requested in {requested} mode")]
    ModeMismatch { described: String, requested: String },

    #[error("Requested field '{id}' is not part of the schema")]
    UnknownField { id: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Schema,
    Configuration,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ConnectorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::FetchError { .. } | Self::EmptyResponse { .. } => {
                ErrorCategory::Network
            }
            Self::SerializationError(_) | Self::InvalidJson { .. } | Self::CsvError(_) => {
                ErrorCategory::Data
            }
            Self::InvalidRootShape
            | Self::UnidentifiableField { .. }
            | Self::ModeMismatch { .. }
            | Self::UnknownField { .. } => ErrorCategory::Schema,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::ZipError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // a remote endpoint may recover on its own
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Schema => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(e) => format!("Could not reach the data source: {}", e),
            Self::InvalidRootShape => "Invalid JSON format".to_string(),
            Self::UnidentifiableField { .. } => {
                "Unable to identify the data format of one of your fields.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ApiError(_) | Self::FetchError { .. } => {
                "Check that the URL is reachable and returns HTTP 200"
            }
            Self::EmptyResponse { .. } => "Make sure the endpoint returns a non-empty JSON body",
            Self::InvalidJson { .. } | Self::SerializationError(_) => {
                "Validate the response body with a JSON linter"
            }
            Self::InvalidRootShape => {
                "The endpoint must return an object or an array whose first element is an object"
            }
            Self::UnidentifiableField { .. } => {
                "In annotated mode every entry needs an object with at least a `type` key"
            }
            Self::ModeMismatch { .. } => {
                "Describe the schema and request rows with the same schema mode"
            }
            Self::UnknownField { .. } => "Run with --schema-only to list the available field ids",
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => "Review the configuration values",
            Self::CsvError(_) | Self::IoError(_) | Self::ZipError(_) => {
                "Check that the output path exists and is writable"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ConnectorError>;
