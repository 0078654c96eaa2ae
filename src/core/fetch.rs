use crate::domain::ports::DocumentSource;
use crate::utils::error::{ConnectorError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// Fetches a JSON document with a single GET request.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
    headers: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self) -> Result<serde_json::Value> {
        validate_url("url", &self.url)?;

        let mut request = self.client.get(&self.url);
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("Making API request to: {}", self.url);
        let response = request.send().await.map_err(|e| ConnectorError::FetchError {
            url: self.url.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(ConnectorError::FetchError {
                url: self.url.clone(),
                message: format!("HTTP status {}", response.status()),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(ConnectorError::EmptyResponse {
                url: self.url.clone(),
            });
        }

        let document: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ConnectorError::InvalidJson {
                message: e.to_string(),
            })?;
        if document.is_null() {
            return Err(ConnectorError::EmptyResponse {
                url: self.url.clone(),
            });
        }

        tracing::debug!("Fetched {} bytes from {}", body.len(), self.url);
        Ok(document)
    }
}
