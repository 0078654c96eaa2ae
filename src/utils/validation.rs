use crate::utils::error::{ConnectorError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ConnectorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ConnectorError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ConnectorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ConnectorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ConnectorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ConnectorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// Requested ids must be dotted paths without empty segments.
pub fn validate_field_ids(field_name: &str, ids: &[String]) -> Result<()> {
    for id in ids {
        if id.trim().is_empty() || id.split('.').any(|segment| segment.is_empty()) {
            return Err(ConnectorError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: id.clone(),
                reason: "Field ids are dot-separated paths without empty segments".to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_required_field(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConnectorError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("url", "https://example.com").is_ok());
        assert!(validate_url("url", "http://example.com").is_ok());
        assert!(validate_url("url", "").is_err());
        assert!(validate_url("url", "invalid-url").is_err());
        assert!(validate_url("url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("max_depth", 5, 1).is_ok());
        assert!(validate_positive_number("max_depth", 0, 1).is_err());
    }

    #[test]
    fn test_validate_field_ids() {
        let ids = vec!["order_id".to_string(), "customer.city".to_string()];
        assert!(validate_field_ids("fields", &ids).is_ok());

        for bad in ["", "customer.", ".city", "a..b"] {
            assert!(validate_field_ids("fields", &[bad.to_string()]).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_validate_required_field() {
        assert!(validate_required_field("connector.name", "orders").is_ok());
        assert!(matches!(
            validate_required_field("connector.name", "  "),
            Err(ConnectorError::MissingConfigError { .. })
        ));
    }
}
