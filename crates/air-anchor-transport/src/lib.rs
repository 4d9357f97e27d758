//! # Air Anchor Transport
//!
//! Network seams for Air Anchor: the ledger REST API, the certificate
//! authority, and the broker queue that relays requests to a gateway.
//!
//! ## Delivery guarantees
//!
//! | Transport | Payload | Success means |
//! |-----------|---------|---------------|
//! | [`RestTransport`] | encoded batch list | the ledger accepted the batch |
//! | [`QueueTransport`] | encoded transaction request | the broker accepted the message |
//!
//! A queue submission is never acknowledged by the ledger. Callers that need
//! to know a record landed must query for it.
//!
//! ## Features
//!
//! - `amqp`: [`amqp::AmqpChannel`], a [`QueueChannel`] over a real AMQP broker.

#[cfg(feature = "amqp")]
pub mod amqp;
pub mod ca;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod retry;
pub mod transport;

pub use ca::CertificateAuthority;
pub use endpoint::normalize_base_url;
pub use error::{Result, TransportError};
pub use http::LedgerHttp;
pub use retry::RetryConfig;
pub use transport::{
    memory::MemoryBroker, memory::MemoryChannel, memory::Outage, memory::PublishedMessage,
    BrokerConfig, QueueChannel, QueueTransport, RestTransport, SubmissionTransport, TransportKind,
};
