//! Proxy module for checking and ranking proxies
//!
//! This module provides functionality for:
//! - Loading candidate proxies from plain-text lists
//! - Probing a proxy with a single request through it
//! - Checking a batch with a fixed-size worker pool and ranking by speed
//! - Saving the ranked working proxies

pub mod checker;
pub mod models;
pub mod parser;
pub mod pool;

pub use checker::{CheckerConfig, ConfigError, HttpProbe, Probe};
pub use models::{Endpoint, ProbeOutcome, ProbeResult, RunReport};
pub use parser::EndpointParser;
pub use pool::{Claim, ProxyPool, WorkQueue};
