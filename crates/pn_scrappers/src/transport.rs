use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pn_core::config::ScrapingSettings;
use pn_core::{Error, FetchError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, StatusCode};
use url::Url;

/// A single GET returning the response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// Direct HTTP transport with browser-like headers.
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(settings: &ScrapingSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("sv-SE,sv;q=0.9,en;q=0.8"));

        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            timeout: settings.timeout(),
        })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else if err.is_connect() {
            FetchError::Blocked(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Statuses that mean the site refuses us rather than failing.
fn is_block_status(status: StatusCode) -> bool {
    status == StatusCode::FORBIDDEN || status == StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        if is_block_status(status) {
            return Err(FetchError::Blocked(format!("HTTP {} from {}", status, url)));
        }
        if !status.is_success() {
            return Err(FetchError::Transport(format!("HTTP {} from {}", status, url)));
        }
        response.text().await.map_err(|e| self.classify(e))
    }
}

/// Routes requests through a URL-rewriting relay (`<relay>?url=<target>`).
pub struct RelayTransport {
    inner: Arc<dyn Transport>,
    relay: Url,
}

impl RelayTransport {
    pub fn new(inner: Arc<dyn Transport>, relay: &str) -> Result<Self> {
        let relay = Url::parse(relay)
            .map_err(|e| Error::Config(format!("Invalid relay URL {}: {}", relay, e)))?;
        Ok(Self { inner, relay })
    }

    pub fn relay_url(&self, target: &str) -> String {
        let mut url = self.relay.clone();
        url.query_pairs_mut().append_pair("url", target);
        url.into()
    }
}

#[async_trait]
impl Transport for RelayTransport {
    async fn get(&self, url: &str) -> std::result::Result<String, FetchError> {
        self.inner.get(&self.relay_url(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pn_core::config::DEFAULT_RELAY_URL;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn get(&self, url: &str) -> std::result::Result<String, FetchError> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok("<html></html>".to_string())
        }
    }

    #[test]
    fn test_relay_url_encodes_target() {
        let relay = RelayTransport::new(Arc::new(Recorder::default()), DEFAULT_RELAY_URL).unwrap();
        assert_eq!(
            relay.relay_url("https://news.cision.com/ListItems?i=04004003&pageIx=1"),
            "https://api.allorigins.win/raw?url=https%3A%2F%2Fnews.cision.com%2FListItems%3Fi%3D04004003%26pageIx%3D1"
        );
    }

    #[tokio::test]
    async fn test_relay_forwards_rewritten_url() {
        let recorder = Arc::new(Recorder::default());
        let relay = RelayTransport::new(recorder.clone(), DEFAULT_RELAY_URL).unwrap();
        relay.get("https://www.di.se/").await.unwrap();
        let urls = recorder.urls.lock().unwrap();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].starts_with("https://api.allorigins.win/raw?url="));
    }

    #[test]
    fn test_block_statuses() {
        assert!(is_block_status(StatusCode::FORBIDDEN));
        assert!(is_block_status(StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS));
        assert!(!is_block_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_block_status(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_reqwest_transport_builds() {
        assert!(ReqwestTransport::new(&ScrapingSettings::default()).is_ok());
    }
}
