//! The Air Anchor client: one identity, one submission transport, and an
//! optional query client, passed around explicitly.

use std::sync::Arc;

use ciborium::value::Value;

use air_anchor_core::{
    payload_address, wrap, Address, Batch, CertificateRequest, Family, LocationPayload,
    SigningIdentity, TransactionRequest,
};
use air_anchor_transport::{
    CertificateAuthority, LedgerHttp, RestTransport, SubmissionTransport, TransportKind,
};

use crate::config::ClientConfig;
use crate::error::{AnchorError, Result};
use crate::query::QueryClient;

/// How far a successful submission is known to have travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryGuarantee {
    /// The ledger accepted the batch.
    LedgerAccepted,
    /// Only the broker accepted the request; the ledger may never see it.
    BrokerAccepted,
}

/// The outcome of a successful `location` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Text returned by the transport.
    pub text: String,
    pub guarantee: DeliveryGuarantee,
    /// State address written. Only known on the ledger path.
    pub address: Option<Address>,
}

/// Signs and submits location records, and reads them back.
///
/// Safe to share between tasks behind an `Arc`.
pub struct AnchorClient {
    identity: SigningIdentity,
    transport: Arc<dyn SubmissionTransport>,
    ca: Option<CertificateAuthority>,
    query: Option<QueryClient>,
    family: Family,
    distinguished_name: String,
}

impl AnchorClient {
    /// Build a client from configuration.
    ///
    /// Loads the identity from `key_path` or generates one. Submissions go
    /// through the broker when one is configured, otherwise to the ledger.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let identity = SigningIdentity::load_or_generate(config.key_path.as_deref())?;

        let transport: Arc<dyn SubmissionTransport> = match &config.broker {
            Some(broker) => queue_transport(broker, &config).await?,
            None => {
                let url = config.ledger_url.as_deref().ok_or_else(|| {
                    AnchorError::Config("a ledger url is required for REST submission".into())
                })?;
                let http = LedgerHttp::new(url, config.request_timeout)?;
                Arc::new(RestTransport::new(http).with_retry(config.submit_retry.clone()))
            }
        };

        Self::with_transport(identity, transport, &config)
    }

    /// Build a client around an existing transport.
    ///
    /// The certificate authority and query client still come from `config`.
    pub fn with_transport(
        identity: SigningIdentity,
        transport: Arc<dyn SubmissionTransport>,
        config: &ClientConfig,
    ) -> Result<Self> {
        let ca = config
            .ca_url
            .as_deref()
            .map(|url| CertificateAuthority::new(url, config.request_timeout))
            .transpose()?;

        let query = config
            .ledger_url
            .as_deref()
            .map(|url| -> Result<QueryClient> {
                let http = LedgerHttp::new(url, config.request_timeout)?;
                Ok(QueryClient::new(http, config.family.clone())
                    .with_retry(config.query_retry.clone())
                    .with_strict_decode(config.strict_decode))
            })
            .transpose()?;

        tracing::debug!(
            public_key = %identity.public_key_hex(),
            transport = ?transport.kind(),
            "client ready"
        );

        Ok(Self {
            identity,
            transport,
            ca,
            query,
            family: config.family.clone(),
            distinguished_name: config.distinguished_name.clone(),
        })
    }

    pub fn identity(&self) -> &SigningIdentity {
        &self.identity
    }

    pub fn public_key_hex(&self) -> String {
        self.identity.public_key_hex()
    }

    pub fn transport_kind(&self) -> TransportKind {
        self.transport.kind()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────────────────────

    /// Anchor `data` on the ledger.
    ///
    /// On the ledger path a [`LocationPayload`] is wrapped into a signed batch
    /// and posted; the confirmation carries the address written. On the queue
    /// path a signed [`TransactionRequest`] is published and the confirmation
    /// only means the broker accepted it.
    pub async fn location(&self, data: &str) -> Result<Confirmation> {
        let csr = CertificateRequest::create(&self.identity, &self.distinguished_name)?;

        match self.transport.kind() {
            TransportKind::Rest => {
                let ca_signature = match &self.ca {
                    Some(ca) => Some(ca.sign(&csr).await?),
                    None => None,
                };
                let payload = LocationPayload::new(csr, ca_signature, data).to_cbor()?;
                let address = payload_address(&self.identity, &payload, &self.family)?;
                let batch = wrap(&self.identity, &payload, &self.family)?;

                let text = self.transport.submit(&batch.to_batch_list_bytes()).await?;
                tracing::info!(%address, batch = %batch.id(), "location anchored");

                Ok(Confirmation {
                    text,
                    guarantee: DeliveryGuarantee::LedgerAccepted,
                    address: Some(address),
                })
            }
            TransportKind::Queue => {
                let request = TransactionRequest::create(&self.identity, csr, data)?;
                let text = self.transport.submit(&request.to_bytes()?).await?;

                Ok(Confirmation {
                    text,
                    guarantee: DeliveryGuarantee::BrokerAccepted,
                    address: None,
                })
            }
        }
    }

    /// Build, without submitting, the batch `location` would post for `data`.
    /// No countersignature is requested.
    pub fn build_batch(&self, data: &str) -> Result<Batch> {
        let csr = CertificateRequest::create(&self.identity, &self.distinguished_name)?;
        let payload = LocationPayload::new(csr, None, data).to_cbor()?;
        Ok(wrap(&self.identity, &payload, &self.family)?)
    }

    /// Build, without submitting, the request `location` would publish.
    pub fn build_transaction_request(&self, data: &str) -> Result<TransactionRequest> {
        let csr = CertificateRequest::create(&self.identity, &self.distinguished_name)?;
        Ok(TransactionRequest::create(&self.identity, csr, data)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn query(&self) -> Result<&QueryClient> {
        self.query
            .as_ref()
            .ok_or_else(|| AnchorError::Config("queries need a ledger url".into()))
    }

    /// See [`QueryClient::show`].
    pub async fn show(&self, key: &str, hash: &str) -> Result<Value> {
        self.query()?.show(key, hash).await
    }

    /// See [`QueryClient::list`].
    pub async fn list(&self, key: &str) -> Result<Vec<Value>> {
        self.query()?.list(key).await
    }
}

#[cfg(feature = "amqp")]
async fn queue_transport(
    broker: &air_anchor_transport::BrokerConfig,
    config: &ClientConfig,
) -> Result<Arc<dyn SubmissionTransport>> {
    use air_anchor_transport::{amqp::AmqpChannel, QueueTransport};

    let channel = AmqpChannel::connect(broker).await?;
    Ok(Arc::new(QueueTransport::new(
        channel,
        broker.queue.clone(),
        config.publish_timeout,
    )))
}

#[cfg(not(feature = "amqp"))]
async fn queue_transport(
    _broker: &air_anchor_transport::BrokerConfig,
    _config: &ClientConfig,
) -> Result<Arc<dyn SubmissionTransport>> {
    Err(AnchorError::Config(
        "broker submission needs the `amqp` feature; use AnchorClient::with_transport".into(),
    ))
}
