//! HTTP transport backed by reqwest

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::ConnectionConfig;
use crate::error::{AdapterError, AdapterResult};
use crate::transport::{EndpointKind, Transport};

/// Transport that performs authenticated HTTP calls against a deployment
pub struct HttpTransport {
    client: Client,
    config: ConnectionConfig,
}

impl HttpTransport {
    /// Create a transport for the given connection.
    pub fn new(config: ConnectionConfig) -> AdapterResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("crmlink/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AdapterError::Connection(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn map_send_error(error: reqwest::Error) -> AdapterError {
        if error.is_timeout() {
            AdapterError::Timeout(format!("request timed out: {}", error))
        } else {
            AdapterError::Connection(error.to_string())
        }
    }

    async fn decode_response(response: reqwest::Response) -> AdapterResult<Value> {
        let status = response.status();
        let text = response.text().await.map_err(Self::map_send_error)?;

        if !status.is_success() {
            return Err(AdapterError::from_status(status.as_u16(), text.trim()));
        }

        let body: Value = serde_json::from_str(&text).map_err(|e| {
            AdapterError::Connection(format!("server returned invalid JSON: {}", e))
        })?;

        // A 200 with a populated errors array is still a failed request.
        if let Some(errors) = body.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                return Err(AdapterError::from_graphql_errors(errors));
            }
        }

        Ok(body)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        kind: EndpointKind,
        path_or_query: &str,
        variables: Option<Value>,
    ) -> AdapterResult<Value> {
        let response = match kind {
            EndpointKind::Metadata | EndpointKind::Graphql => {
                let url = match kind {
                    EndpointKind::Metadata => self.config.metadata_url(),
                    _ => self.config.graphql_url(),
                };
                debug!("POST {} ({} byte query)", url, path_or_query.len());
                let body = json!({
                    "query": path_or_query,
                    "variables": variables.unwrap_or_else(|| json!({})),
                });
                self.client
                    .post(&url)
                    .bearer_auth(&self.config.api_key)
                    .json(&body)
                    .send()
                    .await
                    .map_err(Self::map_send_error)?
            }
            EndpointKind::Rest => {
                let url = self.config.rest_url(path_or_query);
                debug!("GET {}", url);
                self.client
                    .get(&url)
                    .bearer_auth(&self.config.api_key)
                    .send()
                    .await
                    .map_err(Self::map_send_error)?
            }
        };

        Self::decode_response(response).await
    }
}
