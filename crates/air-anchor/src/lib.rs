//! # Air Anchor
//!
//! Client for anchoring location records on a ledger.
//!
//! ## Overview
//!
//! - **Submission**: [`AnchorClient::location`] signs a certificate request,
//!   wraps the data, and hands it to the configured transport.
//! - **Queries**: [`AnchorClient::show`] and [`AnchorClient::list`] read state
//!   back by deterministic address.
//! - **Load generation**: [`Workload`] drives rate-gated submissions from a
//!   pool of workers sharing one client.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use air_anchor::{AnchorClient, ClientConfig};
//!
//! async fn example() -> air_anchor::Result<()> {
//!     let config = ClientConfig::rest("localhost:8008").with_key_path("priv.key");
//!     let client = AnchorClient::connect(config).await?;
//!
//!     let confirmation = client.location("0xfeed").await?;
//!     println!("anchored at {:?}", confirmation.address);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `air_anchor::core` - identities, addresses, requests, batches
//! - `air_anchor::transport` - REST, certificate authority, and queue transports

pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod workload;

// Re-export component crates
pub use air_anchor_core as core;
pub use air_anchor_transport as transport;

pub use client::{AnchorClient, Confirmation, DeliveryGuarantee};
pub use config::ClientConfig;
pub use error::{AnchorError, Result};
pub use query::QueryClient;
pub use workload::{AdmissionGate, RateGate, Workload, WorkloadConfig, WorkloadReport};

pub use air_anchor_core::{Address, Family, SigningIdentity};
pub use air_anchor_transport::{BrokerConfig, RetryConfig, TransportKind};
