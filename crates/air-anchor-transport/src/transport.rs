//! Submission transports.
//!
//! Two variants deliver an encoded payload:
//!
//! - [`RestTransport`] posts an encoded batch list straight to the ledger.
//!   Success means the ledger accepted the batch.
//! - [`QueueTransport`] publishes an encoded transaction request to a durable
//!   broker queue for a gateway to assemble into batches. Success only means
//!   the broker accepted the message; nothing reports whether the ledger
//!   later commits it.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::error::{Result, TransportError};
use crate::http::LedgerHttp;
use crate::retry::RetryConfig;

/// Which variant a transport is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Direct batch submission to the ledger REST API.
    Rest,
    /// Relay through a broker queue to a gateway.
    Queue,
}

/// A way of delivering an encoded submission.
///
/// Implementations must be safe to call concurrently from many tasks.
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    /// Deliver `payload` and return the confirmation text.
    async fn submit(&self, payload: &[u8]) -> Result<String>;

    /// The variant of this transport.
    fn kind(&self) -> TransportKind;
}

// ─────────────────────────────────────────────────────────────────────────────
// REST
// ─────────────────────────────────────────────────────────────────────────────

/// Submits encoded batch lists to `POST /batches`.
#[derive(Debug, Clone)]
pub struct RestTransport {
    http: LedgerHttp,
    retry: RetryConfig,
}

impl RestTransport {
    /// Create a transport that never retries submissions.
    pub fn new(http: LedgerHttp) -> Self {
        Self {
            http,
            retry: RetryConfig::none(),
        }
    }

    /// Retry failed submissions with this policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn http(&self) -> &LedgerHttp {
        &self.http
    }
}

#[async_trait]
impl SubmissionTransport for RestTransport {
    async fn submit(&self, payload: &[u8]) -> Result<String> {
        let text = self.http.post_batches(payload.to_vec(), &self.retry).await?;
        tracing::info!(
            ledger = self.http.base_url(),
            bytes = payload.len(),
            "batch accepted by ledger"
        );
        Ok(text)
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Rest
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Queue
// ─────────────────────────────────────────────────────────────────────────────

/// Broker connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    /// Durable queue the gateway consumes.
    pub queue: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5672,
            queue: "gateway_queue".into(),
        }
    }
}

impl BrokerConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = queue.into();
        self
    }

    /// AMQP URI for this broker with the default vhost.
    pub fn amqp_uri(&self) -> String {
        format!("amqp://{}:{}/%2f", self.host, self.port)
    }
}

/// A broker channel.
///
/// Methods take `&mut self`: a channel is a single stateful resource and
/// [`QueueTransport`] serializes access to it.
#[async_trait]
pub trait QueueChannel: Send {
    /// Declare `queue` as durable. Idempotent.
    async fn declare_durable(&mut self, queue: &str) -> Result<()>;

    /// Publish one message to `queue`.
    async fn publish(&mut self, queue: &str, payload: &[u8], persistent: bool) -> Result<()>;
}

struct ChannelState<C> {
    channel: C,
    declared: bool,
}

/// Publishes encoded transaction requests to a durable queue.
///
/// One publish is in flight at a time; concurrent callers wait their turn.
/// The publish timeout bounds each call, including the wait.
pub struct QueueTransport<C> {
    state: Mutex<ChannelState<C>>,
    queue: String,
    publish_timeout: Duration,
}

impl<C: QueueChannel> QueueTransport<C> {
    pub fn new(channel: C, queue: impl Into<String>, publish_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(ChannelState {
                channel,
                declared: false,
            }),
            queue: queue.into(),
            publish_timeout,
        }
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }
}

#[async_trait]
impl<C: QueueChannel> SubmissionTransport for QueueTransport<C> {
    async fn submit(&self, payload: &[u8]) -> Result<String> {
        let publish = async {
            let mut state = self.state.lock().await;
            if !state.declared {
                state.channel.declare_durable(&self.queue).await?;
                state.declared = true;
            }
            state.channel.publish(&self.queue, payload, true).await
        };

        tokio::time::timeout(self.publish_timeout, publish)
            .await
            .map_err(|_| TransportError::Timeout(self.publish_timeout))??;

        tracing::info!(queue = %self.queue, bytes = payload.len(), "request accepted by broker");
        Ok(format!("queued {} bytes on {}", payload.len(), self.queue))
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Queue
    }
}

/// An in-memory broker for tests.
///
/// Records every publish. Can be switched into an outage where publishes fail
/// or hang.
pub mod memory {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// A message as the broker stored it.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PublishedMessage {
        pub queue: String,
        pub payload: Vec<u8>,
        pub persistent: bool,
    }

    /// Failure mode the broker simulates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum Outage {
        #[default]
        None,
        /// Publishes fail immediately.
        Refuse,
        /// Publishes never complete.
        Hang,
    }

    /// Shared broker state.
    #[derive(Default)]
    pub struct MemoryBroker {
        durable: RwLock<HashSet<String>>,
        messages: RwLock<Vec<PublishedMessage>>,
        outage: RwLock<Outage>,
    }

    impl MemoryBroker {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Open a channel on this broker.
        pub fn channel(self: &Arc<Self>) -> MemoryChannel {
            MemoryChannel {
                broker: Arc::clone(self),
            }
        }

        pub async fn set_outage(&self, outage: Outage) {
            *self.outage.write().await = outage;
        }

        /// Everything published so far, in order.
        pub async fn published(&self) -> Vec<PublishedMessage> {
            self.messages.read().await.clone()
        }

        pub async fn is_durable(&self, queue: &str) -> bool {
            self.durable.read().await.contains(queue)
        }
    }

    /// A channel on a [`MemoryBroker`].
    pub struct MemoryChannel {
        broker: Arc<MemoryBroker>,
    }

    #[async_trait]
    impl QueueChannel for MemoryChannel {
        async fn declare_durable(&mut self, queue: &str) -> Result<()> {
            self.broker.durable.write().await.insert(queue.to_string());
            Ok(())
        }

        async fn publish(&mut self, queue: &str, payload: &[u8], persistent: bool) -> Result<()> {
            let outage = *self.broker.outage.read().await;
            match outage {
                Outage::None => {}
                Outage::Refuse => return Err(TransportError::Broker("broker unreachable".into())),
                Outage::Hang => std::future::pending::<()>().await,
            }

            self.broker.messages.write().await.push(PublishedMessage {
                queue: queue.to_string(),
                payload: payload.to_vec(),
                persistent,
            });
            Ok(())
        }
    }
}
