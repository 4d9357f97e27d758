//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use air_anchor_core::Family;
use air_anchor_transport::{BrokerConfig, RetryConfig};

use crate::error::{AnchorError, Result};

/// Configuration for an [`AnchorClient`](crate::AnchorClient).
///
/// Submissions go through the broker when one is configured and straight to
/// the ledger otherwise. Queries always need a ledger URL.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Ledger REST base URL. A missing scheme means `http://`.
    pub ledger_url: Option<String>,
    /// Broker to relay submissions through.
    pub broker: Option<BrokerConfig>,
    /// Certificate authority base URL.
    pub ca_url: Option<String>,
    /// Hex private key file. `None` generates an ephemeral identity.
    pub key_path: Option<PathBuf>,
    /// Subject placed in certificate requests.
    pub distinguished_name: String,
    /// Transaction family written to.
    pub family: Family,
    /// Deadline for every HTTP request.
    pub request_timeout: Duration,
    /// Deadline for a single broker publish.
    pub publish_timeout: Duration,
    /// Retry policy for state queries.
    pub query_retry: RetryConfig,
    /// Retry policy for batch submissions.
    pub submit_retry: RetryConfig,
    /// Surface decode failures in `show`/`list` instead of reporting not found.
    pub strict_decode: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ledger_url: None,
            broker: None,
            ca_url: None,
            key_path: None,
            distinguished_name: "DRON".into(),
            family: Family::default(),
            request_timeout: Duration::from_secs(10),
            publish_timeout: Duration::from_secs(5),
            query_retry: RetryConfig::idempotent(),
            submit_retry: RetryConfig::none(),
            strict_decode: false,
        }
    }
}

impl ClientConfig {
    /// A client that submits and queries over the ledger REST API.
    pub fn rest(ledger_url: impl Into<String>) -> Self {
        Self {
            ledger_url: Some(ledger_url.into()),
            ..Default::default()
        }
    }

    /// A client that submits through a broker queue.
    pub fn queue(broker: BrokerConfig) -> Self {
        Self {
            broker: Some(broker),
            ..Default::default()
        }
    }

    pub fn with_ledger_url(mut self, url: impl Into<String>) -> Self {
        self.ledger_url = Some(url.into());
        self
    }

    pub fn with_ca_url(mut self, url: impl Into<String>) -> Self {
        self.ca_url = Some(url.into());
        self
    }

    pub fn with_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_path = Some(path.into());
        self
    }

    pub fn with_distinguished_name(mut self, name: impl Into<String>) -> Self {
        self.distinguished_name = name.into();
        self
    }

    pub fn with_family(mut self, family: Family) -> Self {
        self.family = family;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_publish_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout = timeout;
        self
    }

    pub fn with_query_retry(mut self, retry: RetryConfig) -> Self {
        self.query_retry = retry;
        self
    }

    pub fn with_submit_retry(mut self, retry: RetryConfig) -> Self {
        self.submit_retry = retry;
        self
    }

    pub fn with_strict_decode(mut self, strict: bool) -> Self {
        self.strict_decode = strict;
        self
    }

    /// Check that the configuration names somewhere to submit to.
    pub fn validate(&self) -> Result<()> {
        if self.ledger_url.is_none() && self.broker.is_none() {
            return Err(AnchorError::Config(
                "either a ledger url or a broker is required".into(),
            ));
        }
        if self.distinguished_name.is_empty() {
            return Err(AnchorError::Config("distinguished name is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.distinguished_name, "DRON");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.publish_timeout, Duration::from_secs(5));
        assert_eq!(config.submit_retry.max_retries, 0);
        assert_eq!(config.query_retry.max_retries, 3);
        assert!(!config.strict_decode);
        assert_eq!(config.family.name(), "AirAnchor");
    }

    #[test]
    fn test_validate_requires_destination() {
        assert!(ClientConfig::default().validate().is_err());
        assert!(ClientConfig::rest("localhost:8008").validate().is_ok());
        assert!(ClientConfig::queue(BrokerConfig::default()).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_subject() {
        let config = ClientConfig::rest("localhost:8008").with_distinguished_name("");
        assert!(matches!(config.validate(), Err(AnchorError::Config(_))));
    }
}
