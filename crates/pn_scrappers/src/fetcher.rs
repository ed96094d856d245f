//! Rate-limited, retrying page fetcher.
//!
//! Every primary attempt waits until `min_interval` has passed since the
//! previous one. Failures are retried after a fixed delay up to
//! `max_retries` times. A `Blocked` failure short-circuits the retry loop:
//! the relay transport gets exactly one try, and if it fails too the fetch
//! fails as `Blocked`.

use std::sync::Arc;
use std::time::Duration;

use pn_core::config::ScrapingSettings;
use pn_core::{FetchError, Result};
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::transport::{RelayTransport, ReqwestTransport, Transport};

pub struct Fetcher {
    primary: Arc<dyn Transport>,
    relay: Option<Arc<dyn Transport>>,
    min_interval: Duration,
    max_retries: u32,
    retry_delay: Duration,
    timeout: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Fetcher {
    pub fn new(
        primary: Arc<dyn Transport>,
        relay: Option<Arc<dyn Transport>>,
        settings: &ScrapingSettings,
    ) -> Self {
        Self {
            primary,
            relay,
            min_interval: settings.rate_limit_delay(),
            max_retries: settings.max_retries,
            retry_delay: settings.retry_delay(),
            timeout: settings.timeout(),
            last_request: Mutex::new(None),
        }
    }

    /// Direct reqwest transport, plus the configured relay if any.
    pub fn from_settings(settings: &ScrapingSettings) -> Result<Self> {
        let primary: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(settings)?);
        let relay = match &settings.relay_url {
            Some(relay_url) => {
                let relay: Arc<dyn Transport> =
                    Arc::new(RelayTransport::new(primary.clone(), relay_url)?);
                Some(relay)
            }
            None => None,
        };
        Ok(Self::new(primary, relay, settings))
    }

    pub async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        let attempts = self.max_retries + 1;
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.wait_turn().await;
            debug!(url, attempt, "Fetching");

            let err = match self.attempt(self.primary.as_ref(), url).await {
                Ok(body) => return Ok(body),
                Err(err) => err,
            };

            if err.is_blocked() {
                return self.via_relay(url, err).await;
            }
            if attempt >= attempts {
                warn!(url, attempts = attempt, error = %err, "Giving up");
                return Err(FetchError::Exhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }
            warn!(url, attempt, error = %err, retry_in = ?self.retry_delay, "Fetch failed, retrying");
            sleep(self.retry_delay).await;
        }
    }

    async fn attempt(
        &self,
        transport: &dyn Transport,
        url: &str,
    ) -> std::result::Result<String, FetchError> {
        match timeout(self.timeout, transport.get(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        }
    }

    async fn via_relay(&self, url: &str, cause: FetchError) -> std::result::Result<String, FetchError> {
        let Some(relay) = &self.relay else {
            return Err(cause);
        };
        info!(url, cause = %cause, "Direct request blocked, trying relay");
        self.attempt(relay.as_ref(), url).await.map_err(|relay_err| {
            warn!(url, error = %relay_err, "Relay failed");
            FetchError::Blocked(format!("{}; relay failed: {}", cause, relay_err))
        })
    }

    /// Sleeps until `min_interval` has elapsed since the previous request.
    async fn wait_turn(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
