//! Thin JSON-over-HTTP client used by the backend adapters

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use url::Url;

/// JSON client bound to one base URL
#[derive(Debug, Clone)]
pub struct JsonClient {
    client: Client,
    base_url: Url,
}

impl JsonClient {
    /// Create a new client with the given request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Reuse an existing connection pool for another base URL
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.post_with_auth(path, body, None).await
    }

    /// POST with an optional bearer token
    pub async fn post_with_auth<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let mut request = self.client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.context("Failed to send request")?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }
}

/// `Url::join` drops the last segment unless the base ends with a slash
fn parse_base_url(base_url: &str) -> Result<Url> {
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };
    Url::parse(&normalized).context("Invalid API URL")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Echo {
        ok: bool,
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let client = JsonClient::new("http://backend:8080/api/v1", Duration::from_secs(1)).unwrap();
        let joined = client.base_url().join("predict").unwrap();
        assert_eq!(joined.as_str(), "http://backend:8080/api/v1/predict");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(JsonClient::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_post_decodes_success_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/echo")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let client = JsonClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let echo: Echo = client.post("echo", &serde_json::json!({})).await.unwrap();

        assert!(echo.ok);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/echo")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let client = JsonClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let err = client
            .post::<Echo, _>("echo", &serde_json::json!({}))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("503"));
    }
}
