//! Shared HTTP client policy.
//!
//! All network traffic goes through one client pair: an API client that
//! follows redirects and a download client that never does. Both verify
//! TLS against the bundled roots, send a fixed browser-like user agent,
//! and retry transient 5xx responses with exponential backoff.

use std::sync::OnceLock;
use std::time::Duration;

use log::warn;
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};

use crate::backend::error::Result;

/// User agent sent on every request. Some release hosts refuse requests
/// without a browser-like agent.
pub const USER_AGENT: &str = "Mozilla/5.0";

/// Statuses retried by [`HttpClient`] before giving the response back.
const RETRY_STATUSES: [StatusCode; 4] = [
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Total attempts for a retryable status.
const MAX_ATTEMPTS: u32 = 5;

/// Timeout applied to download requests.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

static SHARED: OnceLock<HttpClient> = OnceLock::new();

pub struct HttpClient {
    api: Client,
    download: Client,
}

impl HttpClient {
    fn new() -> reqwest::Result<Self> {
        let api = Client::builder()
            .use_rustls_tls()
            .user_agent(USER_AGENT)
            .build()?;
        let download = Client::builder()
            .use_rustls_tls()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .timeout(DOWNLOAD_TIMEOUT)
            .build()?;
        Ok(Self { api, download })
    }

    /// The process-wide client instance. Every component shares its
    /// connection pools.
    pub fn shared() -> &'static HttpClient {
        SHARED.get_or_init(|| Self::new().expect("Failed to create HTTP client"))
    }

    /// GET with the redirect-following API client.
    pub async fn get_api(&self, url: &str, headers: HeaderMap) -> Result<Response> {
        self.get_with_retry(&self.api, url, headers).await
    }

    /// GET with the download client: no redirect following, 60s timeout.
    pub async fn get_download(&self, url: &str, headers: HeaderMap) -> Result<Response> {
        self.get_with_retry(&self.download, url, headers).await
    }

    /// Issue a GET, retrying 500/502/503/504 up to [`MAX_ATTEMPTS`] times
    /// with backoff doubling from one second. Any other status is returned
    /// untouched; status checking belongs to the caller. Connection-level
    /// errors are not retried.
    async fn get_with_retry(
        &self,
        client: &Client,
        url: &str,
        headers: HeaderMap,
    ) -> Result<Response> {
        let mut backoff = Duration::from_secs(1);
        let mut attempt = 1;

        loop {
            let response = client.get(url).headers(headers.clone()).send().await?;
            if !RETRY_STATUSES.contains(&response.status()) || attempt >= MAX_ATTEMPTS {
                return Ok(response);
            }

            warn!(
                "HTTP {} from {url}, retrying ({attempt}/{})",
                response.status(),
                MAX_ATTEMPTS - 1
            );
            tokio::time::sleep(backoff).await;
            backoff *= 2;
            attempt += 1;
        }
    }
}
