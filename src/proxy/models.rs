//! Proxy data models

use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// A candidate proxy in `host:port` form.
///
/// The value is opaque; the only guarantee is that it is non-empty once
/// surrounding whitespace is removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    /// Create an endpoint from raw input, returning `None` for blank input
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the proxy URL string used for HTTP-scheme forwarding
    pub fn proxy_url(&self) -> String {
        format!("http://{}", self.0)
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success(Duration),
    Failure,
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success(_))
    }

    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            ProbeOutcome::Success(elapsed) => Some(*elapsed),
            ProbeOutcome::Failure => None,
        }
    }
}

/// A working proxy together with its measured response time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub endpoint: Endpoint,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl ProbeResult {
    pub fn new(endpoint: Endpoint, elapsed: Duration) -> Self {
        Self { endpoint, elapsed }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Summary of one checking run, as handed to the output side
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Number of candidates that were checked
    pub total: usize,
    /// Number of candidates that passed
    pub working: usize,
    /// Wall time of the whole run
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    /// Working proxies, fastest first
    pub results: Vec<ProbeResult>,
}

impl RunReport {
    pub fn new(total: usize, elapsed: Duration, results: Vec<ProbeResult>) -> Self {
        Self {
            total,
            working: results.len(),
            elapsed,
            results,
        }
    }

    /// The fastest working proxy, if any
    pub fn best(&self) -> Option<&ProbeResult> {
        self.results.first()
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_whitespace() {
        let endpoint = Endpoint::new("  10.0.0.1:8080\t").unwrap();
        assert_eq!(endpoint.as_str(), "10.0.0.1:8080");
        assert_eq!(endpoint.to_string(), "10.0.0.1:8080");
    }

    #[test]
    fn test_endpoint_rejects_blank() {
        assert!(Endpoint::new("").is_none());
        assert!(Endpoint::new("   \r").is_none());
    }

    #[test]
    fn test_endpoint_proxy_url() {
        let endpoint = Endpoint::new("127.0.0.1:3128").unwrap();
        assert_eq!(endpoint.proxy_url(), "http://127.0.0.1:3128");
    }

    #[test]
    fn test_probe_outcome() {
        let ok = ProbeOutcome::Success(Duration::from_millis(250));
        assert!(ok.is_success());
        assert_eq!(ok.elapsed(), Some(Duration::from_millis(250)));

        assert!(!ProbeOutcome::Failure.is_success());
        assert_eq!(ProbeOutcome::Failure.elapsed(), None);
    }

    #[test]
    fn test_run_report() {
        let results = vec![
            ProbeResult::new(Endpoint::new("a:1").unwrap(), Duration::from_millis(200)),
            ProbeResult::new(Endpoint::new("b:2").unwrap(), Duration::from_millis(500)),
        ];
        let report = RunReport::new(3, Duration::from_secs(2), results);
        assert_eq!(report.total, 3);
        assert_eq!(report.working, 2);
        assert_eq!(report.best().unwrap().endpoint.as_str(), "a:1");

        let empty = RunReport::new(3, Duration::from_secs(2), Vec::new());
        assert!(empty.best().is_none());
    }

    #[test]
    fn test_run_report_json() {
        let results = vec![ProbeResult::new(
            Endpoint::new("a:1").unwrap(),
            Duration::from_millis(1500),
        )];
        let report = RunReport::new(1, Duration::from_millis(2500), results);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total"], 1);
        assert_eq!(json["working"], 1);
        assert_eq!(json["elapsed_secs"], 2.5);
        assert_eq!(json["results"][0]["endpoint"], "a:1");
        assert_eq!(json["results"][0]["elapsed_secs"], 1.5);
    }
}
