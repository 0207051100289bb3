//! Audit settings.
//!
//! Defaults suit a single-host audit on the local machine. A JSON file may
//! override any subset of fields, and a few environment variables override
//! the file:
//! - `SEO_AUDIT_WORKERS`
//! - `SEO_AUDIT_PROBE_TIMEOUT_SECS`
//! - `SEO_AUDIT_DOH_URL`

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{AuditError, Result};
use crate::service::http::DEFAULT_USER_AGENT;

pub const MIN_PROBE_TIMEOUT_SECS: u64 = 6;
pub const MAX_PROBE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DOH_URL: &str = "https://cloudflare-dns.com/dns-query";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Upper bound on concurrent extraction and rule workers.
    pub workers: usize,
    pub probe_timeout_secs: u64,
    pub user_agent: String,
    /// DNS-over-HTTPS JSON endpoint used for SPF and DMARC lookups.
    pub dns_over_https_url: String,
    pub keyword_limit: usize,
    pub phrase_limit: usize,
    /// Fetch sitemap URLs for orphan detection when the caller supplies none.
    pub fetch_sitemap: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            probe_timeout_secs: 8,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            dns_over_https_url: DEFAULT_DOH_URL.to_string(),
            keyword_limit: 10,
            phrase_limit: 10,
            fetch_sitemap: true,
        }
    }
}

impl AuditConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AuditError::config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: AuditConfig = serde_json::from_str(&raw)
            .map_err(|e| AuditError::config(format!("cannot parse {}: {}", path.display(), e)))?;
        tracing::debug!("Loaded audit config from {}", path.display());
        Ok(config)
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup("SEO_AUDIT_WORKERS") {
            self.workers = value
                .trim()
                .parse()
                .map_err(|_| AuditError::config(format!("SEO_AUDIT_WORKERS is not a number: {}", value)))?;
        }
        if let Some(value) = lookup("SEO_AUDIT_PROBE_TIMEOUT_SECS") {
            self.probe_timeout_secs = value.trim().parse().map_err(|_| {
                AuditError::config(format!("SEO_AUDIT_PROBE_TIMEOUT_SECS is not a number: {}", value))
            })?;
        }
        if let Some(value) = lookup("SEO_AUDIT_DOH_URL") {
            self.dns_over_https_url = value.trim().to_string();
        }
        Ok(self)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }

    /// Per-probe timeout, kept within 6 to 10 seconds.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(
            self.probe_timeout_secs
                .clamp(MIN_PROBE_TIMEOUT_SECS, MAX_PROBE_TIMEOUT_SECS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AuditConfig::default();
        assert!(config.workers >= 1);
        assert_eq!(config.probe_timeout(), Duration::from_secs(8));
        assert_eq!(config.keyword_limit, 10);
        assert!(config.fetch_sitemap);
    }

    #[test]
    fn test_probe_timeout_is_clamped() {
        let mut config = AuditConfig {
            probe_timeout_secs: 1,
            ..Default::default()
        };
        assert_eq!(config.probe_timeout(), Duration::from_secs(6));
        config.probe_timeout_secs = 60;
        assert_eq!(config.probe_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_from_file_fills_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"workers": 3, "fetch_sitemap": false}}"#).unwrap();

        let config = AuditConfig::from_file(file.path()).unwrap();
        assert_eq!(config.workers, 3);
        assert!(!config.fetch_sitemap);
        assert_eq!(config.dns_over_https_url, DEFAULT_DOH_URL);
    }

    #[test]
    fn test_from_file_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = AuditConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, AuditError::ConfigError(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AuditConfig::from_file(dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SEO_AUDIT_WORKERS", "2"),
            ("SEO_AUDIT_DOH_URL", "http://127.0.0.1:9/dns-query"),
        ]);
        let config = AuditConfig::default()
            .with_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.dns_over_https_url, "http://127.0.0.1:9/dns-query");
        assert_eq!(config.probe_timeout_secs, 8);

        let bad: HashMap<&str, &str> = HashMap::from([("SEO_AUDIT_WORKERS", "many")]);
        assert!(AuditConfig::default()
            .with_overrides(|k| bad.get(k).map(|v| v.to_string()))
            .is_err());
    }
}
