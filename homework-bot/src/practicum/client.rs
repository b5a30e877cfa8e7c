//! HTTP client for the Practicum homework status endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::config::Config;
use crate::utils::http_client;
use crate::{Error, Result};

/// Source of homework status responses.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Fetch the raw response for homeworks updated since `from_date`
    /// (Unix seconds).
    async fn homework_statuses(&self, from_date: i64) -> Result<Value>;
}

/// Client for the Practicum `homework_statuses` endpoint.
pub struct PracticumClient {
    client: Client,
    endpoint: Url,
    authorization: String,
}

impl PracticumClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = http_client::build_client(config.request_timeout)?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client that reuses an existing `reqwest::Client`.
    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            authorization: format!("OAuth {}", config.credentials.practicum_token),
        }
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn homework_statuses(&self, from_date: i64) -> Result<Value> {
        debug!(endpoint = %self.endpoint, from_date, "Requesting homework statuses");

        let response = self
            .client
            .get(self.endpoint.clone())
            .header(header::AUTHORIZATION, &self.authorization)
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| {
                let reason = http_client::describe_error(e);
                error!(endpoint = %self.endpoint, error = %reason, "Homework API request failed");
                Error::Transport(reason)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            error!(endpoint = %self.endpoint, status = status.as_u16(), "Homework API returned an unexpected status");
            return Err(Error::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            let reason = http_client::describe_error(e);
            error!(endpoint = %self.endpoint, error = %reason, "Failed to read homework API response");
            Error::Transport(reason)
        })?;

        serde_json::from_slice(&body)
            .map_err(|e| Error::shape(format!("response body is not valid JSON: {e}")))
    }
}
