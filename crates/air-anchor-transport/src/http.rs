//! Low-level HTTP client for the ledger's REST API.
//!
//! One method per endpoint. Bodies travel as raw bytes or text; decoding the
//! state envelope happens in the client crate.

use reqwest::{Client, Method, Response, StatusCode};
use std::time::Duration;

use crate::endpoint::normalize_base_url;
use crate::error::{Result, TransportError};
use crate::retry::RetryConfig;

/// Content type of a submitted batch list.
pub const BATCH_CONTENT_TYPE: &str = "application/octet-stream";

/// HTTP client for one ledger REST endpoint.
///
/// Cheap to clone; clones share the underlying connection pool, so it can be
/// used from any number of concurrent tasks.
#[derive(Debug, Clone)]
pub struct LedgerHttp {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl LedgerHttp {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            client,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Batches ──────────────────────────────────────────────────────────

    /// `POST /batches` with an encoded batch list. Returns the response text.
    pub async fn post_batches(&self, body: Vec<u8>, retry: &RetryConfig) -> Result<String> {
        let url = format!("{}/batches", self.base_url);
        retry
            .run("batch submission", || {
                let req = self
                    .client
                    .request(Method::POST, &url)
                    .header(reqwest::header::CONTENT_TYPE, BATCH_CONTENT_TYPE)
                    .body(body.clone());
                self.send(req)
            })
            .await
    }

    // ── State ────────────────────────────────────────────────────────────

    /// `GET /state/{address}`. Returns the raw envelope text.
    pub async fn get_state(&self, address: &str, retry: &RetryConfig) -> Result<String> {
        let url = format!("{}/state/{}", self.base_url, address);
        self.get(&url, retry).await
    }

    /// `GET /state?address={prefix}`. Returns the raw envelope text.
    pub async fn get_state_prefix(&self, prefix: &str, retry: &RetryConfig) -> Result<String> {
        let url = format!("{}/state?address={}", self.base_url, prefix);
        self.get(&url, retry).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get(&self, url: &str, retry: &RetryConfig) -> Result<String> {
        retry
            .run("state query", || self.send(self.client.request(Method::GET, url)))
            .await
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<String> {
        let resp = req
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, self.timeout))?;
        read_success(resp, self.timeout).await
    }
}

/// Map a response to its body text or a typed error.
///
/// 2xx is success, 404 is [`TransportError::NotFound`], anything else is
/// [`TransportError::Remote`].
pub(crate) async fn read_success(resp: Response, timeout: Duration) -> Result<String> {
    let status = resp.status();
    let url = resp.url().to_string();

    if status.is_success() {
        return resp
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(e, timeout));
    }

    if status == StatusCode::NOT_FOUND {
        return Err(TransportError::NotFound(url));
    }

    let body = resp.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), %url, "request failed");
    Err(TransportError::Remote {
        status: status.as_u16(),
        reason: reason_for(status, &body),
    })
}

pub(crate) fn reason_for(status: StatusCode, body: &str) -> String {
    match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None => body.trim().to_string(),
    }
}
