//! Search API client.
//!
//! Uses app-only authentication: the client id/secret pair is exchanged for a
//! bearer token on first use, and the token is reused until the API rejects it.

use super::{EventSource, SearchQuery, SourceError, SourceItem};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Search API configuration.
#[derive(Debug, Clone)]
pub struct TwitterConfig {
    /// API base URL, without trailing slash
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl TwitterConfig {
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Token exchange endpoint.
    pub fn token_url(&self) -> String {
        format!("{}/oauth2/token", self.base_url)
    }

    /// Search endpoint.
    pub fn search_url(&self) -> String {
        format!("{}/1.1/search/tweets.json", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token_type: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    statuses: Vec<SourceItem>,
}

/// HTTP client for keyword search.
pub struct TwitterClient {
    config: TwitterConfig,
    client: reqwest::Client,
    token: Mutex<Option<String>>,
}

impl TwitterClient {
    /// Create a new client. No request is made until the first search.
    pub fn new(config: TwitterConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SourceError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            token: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &TwitterConfig {
        &self.config
    }

    /// Return the cached bearer token, fetching one if needed.
    async fn bearer_token(&self) -> Result<String, SourceError> {
        let mut token = self.token.lock().await;
        if let Some(ref t) = *token {
            return Ok(t.clone());
        }

        let fetched = self.fetch_token().await?;
        *token = Some(fetched.clone());
        Ok(fetched)
    }

    async fn fetch_token(&self) -> Result<String, SourceError> {
        tracing::debug!(url = %self.config.token_url(), "Requesting bearer token");

        let response = self
            .client
            .post(self.config.token_url())
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SourceError::Auth(format!(
                "Token exchange failed ({}): {}",
                status.as_u16(),
                message
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        if !body.token_type.eq_ignore_ascii_case("bearer") {
            return Err(SourceError::Auth(format!(
                "Unexpected token type '{}'",
                body.token_type
            )));
        }

        Ok(body.access_token)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }
}

#[async_trait::async_trait]
impl EventSource for TwitterClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SourceItem>, SourceError> {
        let token = self.bearer_token().await?;
        let count = query.count.to_string();

        let response = self
            .client
            .get(self.config.search_url())
            .bearer_auth(token)
            .query(&[
                ("q", query.keyword.as_str()),
                ("result_type", query.result_type.as_str()),
                ("count", count.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.invalidate_token().await;
            return Err(SourceError::Auth("Bearer token rejected".to_string()));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SourceError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        Ok(body.statuses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twitter_config_urls() {
        let config = TwitterConfig::new("http://127.0.0.1:9000/", "id", "secret");
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.token_url(), "http://127.0.0.1:9000/oauth2/token");
        assert_eq!(
            config.search_url(),
            "http://127.0.0.1:9000/1.1/search/tweets.json"
        );
    }

    #[test]
    fn test_search_response_tolerates_extra_fields() {
        let json = r#"{
            "statuses": [
                {"id_str": "1", "created_at": "Wed Aug 27 13:08:45 +0000 2008", "text": "hi"}
            ],
            "search_metadata": {"count": 1}
        }"#;
        let body: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.statuses.len(), 1);
        assert_eq!(body.statuses[0].id_str.as_deref(), Some("1"));
    }

    #[test]
    fn test_search_response_without_statuses() {
        let body: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(body.statuses.is_empty());
    }
}
