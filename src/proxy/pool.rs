//! Worker pool that checks a batch of proxies and ranks the working ones

use crate::proxy::checker::{CheckerConfig, ConfigError, HttpProbe, Probe};
use crate::proxy::models::{Endpoint, ProbeOutcome, ProbeResult, RunReport};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, info_span, Instrument};

/// Result of trying to take work from a [`WorkQueue`]
#[derive(Debug, PartialEq, Eq)]
pub enum Claim {
    Endpoint(Endpoint),
    /// Nothing left; the worker should exit
    Drained,
}

/// Queue of pending endpoints, seeded once and only ever drained.
///
/// Each seeded endpoint is handed out by exactly one `claim` call.
#[derive(Debug)]
pub struct WorkQueue {
    pending: Mutex<VecDeque<Endpoint>>,
}

impl WorkQueue {
    pub fn new(endpoints: impl IntoIterator<Item = Endpoint>) -> Self {
        Self {
            pending: Mutex::new(endpoints.into_iter().collect()),
        }
    }

    /// Take the next endpoint without waiting for more work to arrive
    pub fn claim(&self) -> Claim {
        // A poisoned lock only means another worker panicked mid-claim; the
        // deque itself is still consistent.
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match pending.pop_front() {
            Some(endpoint) => Claim::Endpoint(endpoint),
            None => Claim::Drained,
        }
    }

    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fixed-size pool of workers sharing one [`WorkQueue`]
pub struct ProxyPool<P: Probe = HttpProbe> {
    probe: Arc<P>,
    workers: usize,
    timeout: Duration,
}

impl ProxyPool<HttpProbe> {
    /// Create a pool that probes over HTTP as described by `config`
    pub fn http(config: CheckerConfig) -> Result<Self, ConfigError> {
        let probe = HttpProbe::from_config(&config);
        Self::new(config, probe)
    }
}

impl<P: Probe> ProxyPool<P> {
    pub fn new(config: CheckerConfig, probe: P) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            probe: Arc::new(probe),
            workers: config.concurrency,
            timeout: config.timeout,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check every endpoint and return the working ones, fastest first.
    ///
    /// Equal response times keep the order in which they were collected.
    pub async fn run(&self, endpoints: Vec<Endpoint>) -> Vec<ProbeResult> {
        let total = endpoints.len();
        let workers = self.workers.min(total);
        let span = info_span!("pool", total, workers);

        async move {
            let queue = Arc::new(WorkQueue::new(endpoints));
            let (tx, mut rx) = mpsc::unbounded_channel();
            let mut tasks = JoinSet::new();

            for id in 0..workers {
                let queue = Arc::clone(&queue);
                let probe = Arc::clone(&self.probe);
                let results = tx.clone();
                let timeout = self.timeout;
                tasks.spawn(
                    worker(queue, probe, timeout, results)
                        .instrument(info_span!("worker", id)),
                );
            }
            drop(tx);

            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(claimed) => debug!(claimed, "worker finished"),
                    Err(e) => error!(error = %e, "worker terminated abnormally"),
                }
            }

            let mut results = Vec::new();
            while let Some(result) = rx.recv().await {
                results.push(result);
            }
            results.sort_by_key(|r| r.elapsed);

            info!(working = results.len(), "run complete");
            results
        }
        .instrument(span)
        .await
    }

    /// Run the pool and wrap the outcome with run-level totals and wall time
    pub async fn run_report(&self, endpoints: Vec<Endpoint>) -> RunReport {
        let total = endpoints.len();
        let start = Instant::now();
        let results = self.run(endpoints).await;
        RunReport::new(total, start.elapsed(), results)
    }
}

/// Claim and probe endpoints until the queue is drained.
/// Returns how many endpoints this worker handled.
async fn worker<P: Probe>(
    queue: Arc<WorkQueue>,
    probe: Arc<P>,
    timeout: Duration,
    results: mpsc::UnboundedSender<ProbeResult>,
) -> usize {
    let mut claimed = 0;

    while let Claim::Endpoint(endpoint) = queue.claim() {
        claimed += 1;

        let outcome = tokio::time::timeout(timeout, probe.probe(&endpoint, timeout))
            .await
            .unwrap_or(ProbeOutcome::Failure);

        match outcome {
            ProbeOutcome::Success(elapsed) => {
                debug!(%endpoint, ?elapsed, "working");
                // The receiver lives until every worker has been joined
                let _ = results.send(ProbeResult::new(endpoint, elapsed));
            }
            ProbeOutcome::Failure => debug!(%endpoint, "failed"),
        }
    }

    claimed
}
