//! API client for communicating with the insights server

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// Error body returned by the SEO routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

/// Non-success response from the server
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{kind} ({status}): {message}")]
    Service {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("API error ({status}): {body}")]
    Http { status: u16, body: String },
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Service { status, .. } | ApiError::Http { status, .. } => *status,
        }
    }
}

/// API client for the insights server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(parsed) => ApiError::Service {
                    status: status.as_u16(),
                    kind: parsed.kind,
                    message: parsed.error,
                },
                Err(_) => ApiError::Http {
                    status: status.as_u16(),
                    body,
                },
            };
            return Err(error.into());
        }

        response.json().await.context("Failed to parse response")
    }
}
