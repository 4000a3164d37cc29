//! Proxy Ranker - HTTP proxy checker
//!
//! Checks a list of HTTP proxies with a fixed-size worker pool and ranks
//! the working ones by response time.

pub mod logging;
pub mod proxy;

pub use proxy::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;
