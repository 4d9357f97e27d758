//! Certificate authority client.

use air_anchor_core::CertificateRequest;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::endpoint::normalize_base_url;
use crate::error::{Result, TransportError};
use crate::http::reason_for;

/// Client for the certificate authority's signing endpoint.
#[derive(Debug, Clone)]
pub struct CertificateAuthority {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl CertificateAuthority {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            client,
            timeout,
        })
    }

    /// `POST {ca}/api/v1/sign` with the certificate request as JSON.
    ///
    /// Returns the authority's countersignature document. Anything but a 200
    /// is [`TransportError::Remote`].
    pub async fn sign(&self, request: &CertificateRequest) -> Result<serde_json::Value> {
        let url = format!("{}/api/v1/sign", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, self.timeout))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "certificate authority refused request");
            return Err(TransportError::Remote {
                status: status.as_u16(),
                reason: reason_for(status, &body),
            });
        }

        resp.json()
            .await
            .map_err(|e| TransportError::Encoding(e.to_string()))
    }
}
