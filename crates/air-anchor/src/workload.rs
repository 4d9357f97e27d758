//! Rate-gated load generation.
//!
//! A fixed pool of worker tasks shares one [`AnchorClient`]. Before each
//! submission a worker waits on an [`AdmissionGate`]. Failures are counted
//! and logged, never retried.

use async_trait::async_trait;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::client::AnchorClient;

/// Admission control in front of every submission.
#[async_trait]
pub trait AdmissionGate: Send + Sync {
    /// Return once the caller may proceed.
    async fn admit(&self);
}

/// A gate that admits at most one caller per fixed interval.
///
/// Callers queue behind each other; none are rejected.
pub struct RateGate {
    period: Duration,
    next: Mutex<Option<Instant>>,
}

impl RateGate {
    /// Admit up to `rate` callers per second.
    pub fn per_second(rate: u32) -> Self {
        Self {
            period: Duration::from_secs(1) / rate.max(1),
            next: Mutex::new(None),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[async_trait]
impl AdmissionGate for RateGate {
    async fn admit(&self) {
        let slot = {
            let mut next = self.next.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(at) if at > now => at,
                _ => now,
            };
            *next = Some(slot + self.period);
            slot
        };
        tokio::time::sleep_until(slot).await;
    }
}

/// Workload settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadConfig {
    /// Concurrent worker tasks.
    pub workers: usize,
    /// Total submissions across all workers.
    pub requests: u64,
    /// Admissions per second for the default gate.
    pub rate_per_second: u32,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            requests: 1000,
            rate_per_second: 40,
        }
    }
}

impl WorkloadConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_requests(mut self, requests: u64) -> Self {
        self.requests = requests;
        self
    }

    pub fn with_rate(mut self, rate_per_second: u32) -> Self {
        self.rate_per_second = rate_per_second;
        self
    }
}

/// What a workload run achieved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkloadReport {
    pub submitted: u64,
    pub failed: u64,
}

/// Drives random location submissions through a shared client.
pub struct Workload {
    client: Arc<AnchorClient>,
    gate: Arc<dyn AdmissionGate>,
    config: WorkloadConfig,
}

impl Workload {
    /// A workload gated by a [`RateGate`] at the configured rate.
    pub fn new(client: Arc<AnchorClient>, config: WorkloadConfig) -> Self {
        let gate = Arc::new(RateGate::per_second(config.rate_per_second));
        Self {
            client,
            gate,
            config,
        }
    }

    /// Replace the admission gate.
    pub fn with_gate(mut self, gate: Arc<dyn AdmissionGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Run until `requests` submissions have been attempted.
    pub async fn run(&self) -> WorkloadReport {
        let issued = Arc::new(AtomicU64::new(0));
        let submitted = Arc::new(AtomicU64::new(0));
        let failed = Arc::new(AtomicU64::new(0));

        let mut workers = tokio::task::JoinSet::new();
        for worker in 0..self.config.workers.max(1) {
            let client = Arc::clone(&self.client);
            let gate = Arc::clone(&self.gate);
            let issued = Arc::clone(&issued);
            let submitted = Arc::clone(&submitted);
            let failed = Arc::clone(&failed);
            let total = self.config.requests;

            workers.spawn(async move {
                while issued.fetch_add(1, Ordering::SeqCst) < total {
                    gate.admit().await;
                    match client.location(&random_data()).await {
                        Ok(_) => {
                            let n = submitted.fetch_add(1, Ordering::SeqCst) + 1;
                            tracing::debug!(worker, count = n, "submission sent");
                        }
                        Err(e) => {
                            failed.fetch_add(1, Ordering::SeqCst);
                            tracing::warn!(worker, error = %e, "submission failed");
                        }
                    }
                }
            });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "workload worker aborted");
            }
        }

        let report = WorkloadReport {
            submitted: submitted.load(Ordering::SeqCst),
            failed: failed.load(Ordering::SeqCst),
        };
        tracing::info!(submitted = report.submitted, failed = report.failed, "workload finished");
        report
    }
}

/// A random 256-bit value as `0x`-prefixed hex without leading zeros.
pub fn random_data() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    let hex = hex::encode(bytes);
    let digits = hex.trim_start_matches('0');
    if digits.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{digits}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use air_anchor_core::SigningIdentity;
    use air_anchor_transport::{MemoryBroker, Outage, QueueTransport};
    use std::sync::atomic::AtomicUsize;

    struct CountingGate(AtomicUsize);

    #[async_trait]
    impl AdmissionGate for CountingGate {
        async fn admit(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn client(broker: &Arc<MemoryBroker>) -> Arc<AnchorClient> {
        let transport = Arc::new(QueueTransport::new(
            broker.channel(),
            "gateway_queue",
            Duration::from_millis(200),
        ));
        Arc::new(
            AnchorClient::with_transport(
                SigningIdentity::generate(),
                transport,
                &ClientConfig::default(),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_random_data_shape() {
        let a = random_data();
        assert!(a.starts_with("0x"));
        assert!(a.len() <= 66);
        assert!(a[2..].bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(a, random_data());
    }

    #[test]
    fn test_rate_gate_period() {
        assert_eq!(RateGate::per_second(40).period(), Duration::from_millis(25));
        assert_eq!(RateGate::per_second(0).period(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_gate_spaces_admissions() {
        let gate = RateGate::per_second(10);
        let start = Instant::now();
        for _ in 0..5 {
            gate.admit().await;
        }
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_workload_submits_every_request() {
        let broker = MemoryBroker::new();
        let gate = Arc::new(CountingGate(AtomicUsize::new(0)));
        let workload = Workload::new(
            client(&broker),
            WorkloadConfig::default().with_workers(4).with_requests(20),
        )
        .with_gate(gate.clone());

        let report = workload.run().await;

        assert_eq!(report, WorkloadReport { submitted: 20, failed: 0 });
        assert_eq!(gate.0.load(Ordering::SeqCst), 20);
        assert_eq!(broker.published().await.len(), 20);
    }

    #[tokio::test]
    async fn test_workload_counts_failures() {
        let broker = MemoryBroker::new();
        broker.set_outage(Outage::Refuse).await;
        let workload = Workload::new(
            client(&broker),
            WorkloadConfig::default().with_workers(2).with_requests(6),
        )
        .with_gate(Arc::new(CountingGate(AtomicUsize::new(0))));

        let report = workload.run().await;
        assert_eq!(report, WorkloadReport { submitted: 0, failed: 6 });
    }
}
