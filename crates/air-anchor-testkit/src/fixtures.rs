//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;
use std::time::Duration;

use air_anchor::{AnchorClient, ClientConfig, Result};
use air_anchor_core::{
    wrap, Batch, CertificateRequest, Family, LocationPayload, SigningIdentity, TransactionRequest,
};
use air_anchor_transport::{LedgerHttp, MemoryBroker, QueueTransport, RestTransport, RetryConfig};

/// Distinguished name used by fixtures.
pub const TEST_SUBJECT: &str = "DRON";

/// A test fixture holding one signing identity.
pub struct TestFixture {
    pub identity: SigningIdentity,
}

impl TestFixture {
    /// Create a new test fixture with a random identity.
    pub fn new() -> Self {
        Self {
            identity: SigningIdentity::generate(),
        }
    }

    /// Create with a deterministic identity. `seed` must be a valid
    /// secp256k1 scalar (non-zero, below the group order).
    pub fn with_seed(seed: [u8; 32]) -> Self {
        let identity = SigningIdentity::from_bytes(&seed)
            .unwrap_or_else(|_| panic!("fixture seed {} is not a valid key", hex::encode(seed)));
        Self { identity }
    }

    pub fn public_key_hex(&self) -> String {
        self.identity.public_key_hex()
    }

    /// A signed certificate request for [`TEST_SUBJECT`].
    pub fn certificate_request(&self) -> CertificateRequest {
        CertificateRequest::create(&self.identity, TEST_SUBJECT)
            .unwrap_or_else(|e| panic!("certificate request: {e}"))
    }

    /// A signed transaction request carrying `data`.
    pub fn transaction_request(&self, data: &str) -> TransactionRequest {
        TransactionRequest::create(&self.identity, self.certificate_request(), data)
            .unwrap_or_else(|e| panic!("transaction request: {e}"))
    }

    /// A location payload, CBOR encoded, without a countersignature.
    pub fn location_payload(&self, data: &str) -> Vec<u8> {
        LocationPayload::new(self.certificate_request(), None, data)
            .to_cbor()
            .unwrap_or_else(|e| panic!("location payload: {e}"))
    }

    /// A signed single-transaction batch over `payload`.
    pub fn batch(&self, payload: &[u8]) -> Batch {
        wrap(&self.identity, payload, Family::air_anchor())
            .unwrap_or_else(|e| panic!("batch: {e}"))
    }

    /// A client that submits to `ledger_url` and queries it, never retrying.
    pub fn rest_client(&self, config: ClientConfig) -> Result<AnchorClient> {
        let url = config.ledger_url.clone().unwrap_or_default();
        let http = LedgerHttp::new(&url, config.request_timeout)?;
        let transport = RestTransport::new(http).with_retry(config.submit_retry.clone());
        AnchorClient::with_transport(self.identity.clone(), Arc::new(transport), &config)
    }

    /// A client that publishes to `broker` on `queue`.
    pub fn queue_client(
        &self,
        broker: &Arc<MemoryBroker>,
        queue: &str,
        config: ClientConfig,
    ) -> Result<AnchorClient> {
        let transport = QueueTransport::new(broker.channel(), queue, config.publish_timeout);
        AnchorClient::with_transport(self.identity.clone(), Arc::new(transport), &config)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Client configuration pointed at `ledger_url` with fast, jitter-free retries.
pub fn fast_config(ledger_url: &str) -> ClientConfig {
    ClientConfig::rest(ledger_url)
        .with_request_timeout(Duration::from_secs(5))
        .with_query_retry(
            RetryConfig::idempotent()
                .with_initial_delay(Duration::from_millis(5))
                .with_jitter(false),
        )
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0x11u8; 32];
            seed[0] = i as u8 + 1;
            TestFixture::with_seed(seed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_requests_verify() {
        let fixture = TestFixture::new();
        fixture.certificate_request().verify().unwrap();
        fixture.transaction_request("hello").verify().unwrap();
    }

    #[test]
    fn test_fixture_batch_verifies() {
        let fixture = TestFixture::with_seed([0x42; 32]);
        let batch = fixture.batch(&fixture.location_payload("0xabc"));
        batch.verify().unwrap();
        assert_eq!(batch.header.signer_public_key, fixture.public_key_hex());
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_fixtures(3);

        let pks: Vec<_> = parties.iter().map(|p| p.public_key_hex()).collect();
        assert_ne!(pks[0], pks[1]);
        assert_ne!(pks[1], pks[2]);
        assert_ne!(pks[0], pks[2]);
    }
}
