//! Reading candidate proxy lists and writing ranked results

use crate::proxy::models::{Endpoint, ProbeResult, RunReport};
use crate::Result;
use anyhow::Context;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Parser for proxy list files
pub struct EndpointParser;

impl EndpointParser {
    /// Parse a single line, skipping blanks and `#` comments
    pub fn parse_line(line: &str) -> Option<Endpoint> {
        let endpoint = Endpoint::new(line)?;
        if endpoint.as_str().starts_with('#') {
            return None;
        }
        Some(endpoint)
    }

    /// Parse proxies from a string (one per line).
    ///
    /// Repeated entries are dropped, keeping the first occurrence.
    pub fn parse_string(content: &str) -> Vec<Endpoint> {
        let mut seen = HashSet::new();
        content
            .lines()
            .filter_map(Self::parse_line)
            .filter(|endpoint| seen.insert(endpoint.clone()))
            .collect()
    }

    /// Parse proxies from a file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<Endpoint>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read proxy list {}", path.display()))?;
        let endpoints = Self::parse_string(&content);
        debug!(path = %path.display(), count = endpoints.len(), "loaded proxy list");
        Ok(endpoints)
    }

    /// Like [`parse_file`](Self::parse_file), but a missing file yields `None`
    /// instead of an error
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Option<Vec<Endpoint>>> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(Self::parse_string(&content))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "proxy list not found");
                Ok(None)
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("failed to read proxy list {}", path.display()))),
        }
    }

    /// Save working proxies in ranked order, one per line
    pub fn save_results<P: AsRef<Path>>(results: &[ProbeResult], path: P) -> Result<()> {
        let path = path.as_ref();
        let content: String = results
            .iter()
            .map(|r| format!("{}\n", r.endpoint))
            .collect();

        fs::write(path, content)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        Ok(())
    }

    /// Save the full run report as pretty-printed JSON
    pub fn save_report<P: AsRef<Path>>(report: &RunReport, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_line() {
        let endpoint = EndpointParser::parse_line("  192.168.1.1:8080  ").unwrap();
        assert_eq!(endpoint.as_str(), "192.168.1.1:8080");
    }

    #[test]
    fn test_parse_empty_line() {
        assert!(EndpointParser::parse_line("").is_none());
        assert!(EndpointParser::parse_line("   ").is_none());
    }

    #[test]
    fn test_parse_comment_line() {
        assert!(EndpointParser::parse_line("# This is a comment").is_none());
        assert!(EndpointParser::parse_line("   # indented").is_none());
    }

    #[test]
    fn test_parse_string() {
        let content = r#"
192.168.1.1:8080

192.168.1.2:3128
# This is a comment
proxy.example.com:80
192.168.1.1:8080
"#;
        let endpoints = EndpointParser::parse_string(content);
        let raw: Vec<&str> = endpoints.iter().map(Endpoint::as_str).collect();
        assert_eq!(
            raw,
            vec!["192.168.1.1:8080", "192.168.1.2:3128", "proxy.example.com:80"]
        );
    }

    #[test]
    fn test_parse_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = EndpointParser::parse_file(dir.path().join("nope.txt")).unwrap_err();
        assert!(err.to_string().contains("nope.txt"));
    }

    #[test]
    fn test_load_file_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = EndpointParser::load_file(dir.path().join("proxies.txt")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_file_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxies.txt");
        fs::write(&path, "1.1.1.1:80\n\n# skip\n").unwrap();

        let loaded = EndpointParser::load_file(&path).unwrap().unwrap();
        assert_eq!(loaded, vec![Endpoint::new("1.1.1.1:80").unwrap()]);
    }

    #[test]
    fn test_load_file_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(EndpointParser::load_file(dir.path()).is_err());
    }

    #[test]
    fn test_parse_file_windows_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxies.txt");
        fs::write(&path, "1.1.1.1:80\r\n\r\n2.2.2.2:8080\r\n").unwrap();

        let endpoints = EndpointParser::parse_file(&path).unwrap();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[1].as_str(), "2.2.2.2:8080");
    }

    #[test]
    fn test_save_results_in_ranked_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checked.txt");
        let results = vec![
            ProbeResult::new(Endpoint::new("fast:1").unwrap(), Duration::from_millis(100)),
            ProbeResult::new(Endpoint::new("slow:2").unwrap(), Duration::from_millis(900)),
        ];

        EndpointParser::save_results(&results, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "fast:1\nslow:2\n");
    }

    #[test]
    fn test_save_results_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checked.txt");
        EndpointParser::save_results(&[], &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_save_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = RunReport::new(
            2,
            Duration::from_secs(1),
            vec![ProbeResult::new(
                Endpoint::new("a:1").unwrap(),
                Duration::from_millis(250),
            )],
        );

        EndpointParser::save_report(&report, &path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["working"], 1);
        assert_eq!(json["results"][0]["endpoint"], "a:1");
        assert_eq!(json["results"][0]["elapsed_secs"], 0.25);
    }
}
