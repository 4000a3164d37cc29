//! Proxy checker module for probing a single proxy

use crate::proxy::models::{Endpoint, ProbeOutcome};
use crate::Result;
use futures::future::BoxFuture;
use reqwest::{Client, Proxy as ReqwestProxy, Url};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, trace};

/// Default timeout for proxy checks in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of concurrent workers
pub const DEFAULT_CONCURRENCY: usize = 50;

/// Default URL to test proxies against
pub const DEFAULT_TEST_URL: &str = "http://www.google.com";

/// Status code a proxied response must carry to count as working
pub const DEFAULT_EXPECTED_STATUS: u16 = 200;

/// Invalid checker settings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("worker count must be at least 1")]
    ZeroWorkers,

    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("invalid test URL {url:?}: {reason}")]
    InvalidTestUrl { url: String, reason: String },

    #[error("invalid expected status code {0}")]
    InvalidStatus(u16),
}

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Timeout for each proxy check
    pub timeout: Duration,
    /// Number of concurrent workers
    pub concurrency: usize,
    /// URL to test proxies against
    pub test_url: String,
    /// Status code that marks a proxy as working
    pub expected_status: u16,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            test_url: DEFAULT_TEST_URL.to_string(),
            expected_status: DEFAULT_EXPECTED_STATUS,
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_test_url(mut self, url: String) -> Self {
        self.test_url = url;
        self
    }

    pub fn with_expected_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    /// Check that the settings describe a runnable checker
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Url::parse(&self.test_url).map_err(|e| ConfigError::InvalidTestUrl {
            url: self.test_url.clone(),
            reason: e.to_string(),
        })?;
        if !(100..=999).contains(&self.expected_status) {
            return Err(ConfigError::InvalidStatus(self.expected_status));
        }
        Ok(())
    }
}

/// A single reachability check through one proxy.
///
/// Implementations must not fail: every problem is reported as
/// [`ProbeOutcome::Failure`].
pub trait Probe: Send + Sync + 'static {
    fn probe<'a>(
        &'a self,
        endpoint: &'a Endpoint,
        timeout: Duration,
    ) -> BoxFuture<'a, ProbeOutcome>;
}

/// Probe that fetches the test URL through the proxy over plain HTTP proxying
#[derive(Debug, Clone)]
pub struct HttpProbe {
    test_url: String,
    expected_status: u16,
}

impl HttpProbe {
    pub fn new(test_url: impl Into<String>, expected_status: u16) -> Self {
        Self {
            test_url: test_url.into(),
            expected_status,
        }
    }

    pub fn from_config(config: &CheckerConfig) -> Self {
        Self::new(config.test_url.clone(), config.expected_status)
    }

    /// Check a single proxy
    pub async fn check(&self, endpoint: &Endpoint, timeout: Duration) -> ProbeOutcome {
        let client = match self.create_client(endpoint, timeout) {
            Ok(client) => client,
            Err(e) => {
                debug!(%endpoint, error = %e, "could not build proxied client");
                return ProbeOutcome::Failure;
            }
        };

        let start = Instant::now();
        match tokio::time::timeout(timeout, client.get(&self.test_url).send()).await {
            Ok(Ok(response)) => {
                let elapsed = start.elapsed();
                let status = response.status();
                if status.as_u16() == self.expected_status {
                    trace!(%endpoint, ?elapsed, "proxy is working");
                    ProbeOutcome::Success(elapsed)
                } else {
                    trace!(%endpoint, %status, "unexpected status");
                    ProbeOutcome::Failure
                }
            }
            Ok(Err(e)) => {
                trace!(%endpoint, error = %e, "request failed");
                ProbeOutcome::Failure
            }
            Err(_) => {
                trace!(%endpoint, ?timeout, "request timed out");
                ProbeOutcome::Failure
            }
        }
    }

    /// Create a reqwest client that sends all traffic through the proxy
    fn create_client(&self, endpoint: &Endpoint, timeout: Duration) -> Result<Client> {
        let proxy = ReqwestProxy::all(endpoint.proxy_url())?;

        let client = Client::builder()
            .proxy(proxy)
            .timeout(timeout)
            .build()?;

        Ok(client)
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new(DEFAULT_TEST_URL, DEFAULT_EXPECTED_STATUS)
    }
}

impl Probe for HttpProbe {
    fn probe<'a>(
        &'a self,
        endpoint: &'a Endpoint,
        timeout: Duration,
    ) -> BoxFuture<'a, ProbeOutcome> {
        Box::pin(self.check(endpoint, timeout))
    }
}
