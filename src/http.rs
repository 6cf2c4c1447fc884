// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Default user agent; the source site rejects obviously scripted clients
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Settings for the single HTTP session shared by a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// HTTP client abstraction for testability
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetch the entire response body as bytes, failing on non-2xx responses
    async fn get_bytes(&self, url: &str) -> Result<Bytes, FetchError>;

    /// Fetch a page and decode it as text
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let bytes = self.get_bytes(url).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Default HTTP client implementation using reqwest
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a new ReqwestClient with default settings
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a client with the given user agent and timeout
    pub fn from_settings(settings: &HttpSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get_bytes(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticClient(&'static [u8]);

    #[async_trait]
    impl HttpClient for StaticClient {
        async fn get_bytes(&self, _url: &str) -> Result<Bytes, FetchError> {
            Ok(Bytes::from_static(self.0))
        }
    }

    #[test]
    fn reqwest_client_can_be_created() {
        let _client = ReqwestClient::new();
        let _client_default = ReqwestClient::default();
    }

    #[test]
    fn reqwest_client_can_be_built_from_settings() {
        let client = ReqwestClient::from_settings(&HttpSettings::default());
        assert!(client.is_ok());
    }

    #[test]
    fn default_settings_use_browser_user_agent() {
        let settings = HttpSettings::default();
        assert!(settings.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(settings.timeout_secs, 10);
    }

    #[tokio::test]
    async fn get_text_decodes_lossily() {
        let client = StaticClient(b"caf\xc3\xa9 \xff");
        let text = client.get_text("https://example.com").await.unwrap();
        assert_eq!(text, "café \u{fffd}");
    }
}
