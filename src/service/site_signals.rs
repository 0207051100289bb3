//! Site-wide probes: robots.txt, sitemap, llms.txt, HTTPS redirect, server IP
//! and SPF/DMARC TXT records.
//!
//! Every probe is bounded by the configured timeout and degrades to an
//! absence value on failure. Nothing here returns an error to the audit.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use url::Url;

use crate::config::AuditConfig;
use crate::domain::models::{ResourceStatus, SiteSignals};
use crate::error::AuditError;
use crate::extractor::sitemap::{parse_sitemap, sitemaps_from_robots, SITE_MAP_PATH};
use crate::service::http::{create_client, ClientType};

const ROBOTS_PATH: &str = "robots.txt";
const LLMS_PATH: &str = "llms.txt";
const MAX_CHILD_SITEMAPS: usize = 10;
const TXT_RECORD_TYPE: u16 = 16;

/// Source of site-wide signals. The audit runner only sees this trait so
/// tests can stand in for the network.
#[async_trait]
pub trait SiteSignalSource: Send + Sync {
    async fn collect(&self, root: &Url) -> SiteSignals;

    /// Page URLs listed in the site's sitemap(s).
    async fn sitemap_urls(&self, root: &Url) -> Vec<String>;
}

pub struct SiteSignalCollector {
    client: Client,
    no_redirect: Client,
    doh_url: String,
    timeout: Duration,
}

impl SiteSignalCollector {
    pub fn new(config: &AuditConfig) -> crate::error::Result<Self> {
        let timeout = config.probe_timeout();
        let build = |client_type| {
            create_client(client_type, timeout, &config.user_agent)
                .map_err(|e| AuditError::network(format!("{:#}", e)))
        };
        Ok(Self {
            client: build(ClientType::Standard)?,
            no_redirect: build(ClientType::NoRedirect)?,
            doh_url: config.dns_over_https_url.clone(),
            timeout,
        })
    }

    /// Run `probe` under the probe timeout. Errors and timeouts become `None`.
    async fn bounded<T>(&self, label: &str, root: &Url, probe: impl Future<Output = Result<T>>) -> Option<T> {
        match tokio::time::timeout(self.timeout, probe).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                tracing::warn!("[PROBE] {} failed for {}: {:#}", label, root, e);
                None
            }
            Err(_) => {
                tracing::warn!("[PROBE] {} timed out for {} after {:?}", label, root, self.timeout);
                None
            }
        }
    }

    async fn fetch_resource(&self, url: Url) -> Result<(ResourceStatus, Option<String>)> {
        tracing::trace!("[PROBE] Fetching: {}", url);
        let response = self.client.get(url.clone()).send().await?;

        let status = match response.status() {
            StatusCode::OK => ResourceStatus::Found(url.to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ResourceStatus::Unauthorized(url.to_string())
            }
            StatusCode::NOT_FOUND => ResourceStatus::NotFound,
            other => {
                tracing::debug!("[PROBE] Unexpected status {} for: {}", other, url);
                ResourceStatus::NotFound
            }
        };
        let body = match status {
            ResourceStatus::Found(_) => Some(response.text().await?),
            _ => None,
        };
        Ok((status, body))
    }

    async fn check_resource(&self, root: &Url, path: &str) -> Result<(ResourceStatus, Option<String>)> {
        let url = root.join(path)?;
        self.fetch_resource(url).await
    }

    /// Whether plain HTTP on the root answers with a redirect to HTTPS.
    async fn check_https_redirect(&self, root: &Url) -> Result<bool> {
        let mut http_root = root.clone();
        if http_root.scheme() == "https" {
            http_root
                .set_scheme("http")
                .map_err(|_| anyhow::anyhow!("cannot downgrade {} to http", root))?;
            // An explicit https port would not answer plain HTTP.
            if http_root.port() == Some(443) {
                let _ = http_root.set_port(None);
            }
        }

        let response = self.no_redirect.get(http_root.clone()).send().await?;
        if !response.status().is_redirection() {
            tracing::debug!("[PROBE] {} answered {} without redirecting", http_root, response.status());
            return Ok(false);
        }
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let target = http_root.join(location)?;
        Ok(target.scheme() == "https")
    }

    async fn resolve_ip(&self, root: &Url) -> Result<String> {
        let host = root.host_str().context("URL has no host")?;
        let port = root.port_or_known_default().unwrap_or(80);
        let mut addrs = tokio::net::lookup_host((host, port)).await?;
        addrs
            .next()
            .map(|addr| addr.ip().to_string())
            .context("no addresses returned")
    }

    async fn txt_records(&self, name: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .get(&self.doh_url)
            .query(&[("name", name), ("type", "TXT")])
            .header(reqwest::header::ACCEPT, "application/dns-json")
            .send()
            .await?
            .error_for_status()?;
        let body: DohResponse = response
            .json()
            .await
            .with_context(|| format!("unparsable DNS answer for {}", name))?;
        Ok(body
            .answer
            .into_iter()
            .filter(|a| a.record_type == TXT_RECORD_TYPE)
            .map(|a| unquote_txt(&a.data))
            .collect())
    }

    async fn find_txt(&self, name: &str, prefix: &str) -> Result<Option<String>> {
        let records = self.txt_records(name).await?;
        Ok(records
            .into_iter()
            .find(|r| r.to_ascii_lowercase().starts_with(&prefix.to_ascii_lowercase())))
    }

    /// Sitemap locations declared in robots.txt, else `/sitemap.xml`.
    async fn sitemap_candidates(&self, root: &Url) -> Vec<Url> {
        let robots = self
            .bounded("robots.txt", root, self.check_resource(root, ROBOTS_PATH))
            .await
            .and_then(|(_, body)| body);
        let declared: Vec<Url> = robots
            .as_deref()
            .map(sitemaps_from_robots)
            .unwrap_or_default()
            .iter()
            .filter_map(|s| root.join(s).ok())
            .collect();
        if !declared.is_empty() {
            return declared;
        }
        root.join(SITE_MAP_PATH).into_iter().collect()
    }
}

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(rename = "type")]
    record_type: u16,
    data: String,
}

/// TXT data arrives as one or more quoted strings; join them unquoted.
fn unquote_txt(data: &str) -> String {
    let trimmed = data.trim();
    if !trimmed.starts_with('"') {
        return trimmed.to_string();
    }
    trimmed
        .split('"')
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, part)| part)
        .collect()
}

/// True when the `*` group of a robots.txt body disallows the whole site.
pub fn robots_disallows_all(robots_txt: &str) -> bool {
    let mut in_wildcard_group = false;
    let mut last_was_agent = false;
    for line in robots_txt.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        match key.as_str() {
            "user-agent" => {
                // Consecutive user-agent lines share one group.
                if !last_was_agent {
                    in_wildcard_group = false;
                }
                in_wildcard_group |= value == "*";
                last_was_agent = true;
            }
            "disallow" => {
                if in_wildcard_group && value == "/" {
                    return true;
                }
                last_was_agent = false;
            }
            _ => last_was_agent = false,
        }
    }
    false
}

fn email_domain(root: &Url) -> Option<String> {
    let host = root.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

#[async_trait]
impl SiteSignalSource for SiteSignalCollector {
    async fn collect(&self, root: &Url) -> SiteSignals {
        tracing::info!("[PROBE] Collecting site signals for {}", root);
        let domain = email_domain(root).unwrap_or_default();
        let dmarc_name = format!("_dmarc.{}", domain);

        let (robots, sitemap, llms, https_redirect, server_ip, spf, dmarc) = tokio::join!(
            self.bounded("robots.txt", root, self.check_resource(root, ROBOTS_PATH)),
            self.bounded("sitemap.xml", root, self.check_resource(root, SITE_MAP_PATH)),
            self.bounded("llms.txt", root, self.check_resource(root, LLMS_PATH)),
            self.bounded("https redirect", root, self.check_https_redirect(root)),
            self.bounded("server ip", root, self.resolve_ip(root)),
            self.bounded("spf", root, self.find_txt(&domain, "v=spf1")),
            self.bounded("dmarc", root, self.find_txt(&dmarc_name, "v=DMARC1")),
        );

        let (robots_status, robots_body) = robots.unwrap_or((ResourceStatus::NotFound, None));
        let declared_sitemap = robots_body
            .as_deref()
            .map(sitemaps_from_robots)
            .and_then(|s| s.into_iter().next());
        let sitemap_url = declared_sitemap.or_else(|| match sitemap {
            Some((ResourceStatus::Found(url), _)) => Some(url),
            _ => None,
        });
        let spf_record = spf.flatten();
        let dmarc_record = dmarc.flatten();

        let signals = SiteSignals {
            robots_txt_present: robots_status.exists(),
            robots_txt_url: match &robots_status {
                ResourceStatus::Found(url) | ResourceStatus::Unauthorized(url) => Some(url.clone()),
                ResourceStatus::NotFound => None,
            },
            robots_disallow_all: robots_body.as_deref().map(robots_disallows_all).unwrap_or(false),
            sitemap_url,
            llms_txt_present: llms.map(|(status, _)| status.exists()).unwrap_or(false),
            https_redirect_ok: https_redirect,
            server_ip,
            spf_present: spf_record.is_some(),
            spf_record,
            dmarc_present: dmarc_record.is_some(),
            dmarc_record,
        };
        tracing::debug!("[PROBE] Site signals for {}: {:?}", root, signals);
        signals
    }

    async fn sitemap_urls(&self, root: &Url) -> Vec<String> {
        let mut pending = self.sitemap_candidates(root).await;
        let mut fetched = 0usize;
        let mut seen_sitemaps = HashSet::new();
        let mut seen_pages = HashSet::new();
        let mut pages = Vec::new();

        while let Some(sitemap_url) = pending.pop() {
            if fetched >= MAX_CHILD_SITEMAPS || !seen_sitemaps.insert(sitemap_url.clone()) {
                continue;
            }
            fetched += 1;
            let Some((_, Some(body))) = self
                .bounded("sitemap", root, self.fetch_resource(sitemap_url.clone()))
                .await
            else {
                continue;
            };

            let document = parse_sitemap(&body);
            if document.is_index {
                tracing::debug!(
                    "[PROBE] Sitemap index {} lists {} sitemaps",
                    sitemap_url,
                    document.locations.len()
                );
                pending.extend(document.locations.iter().rev().filter_map(|l| Url::parse(l).ok()));
                continue;
            }
            for location in document.locations {
                if seen_pages.insert(location.clone()) {
                    pages.push(location);
                }
            }
        }
        tracing::info!("[PROBE] {} sitemap URLs found for {}", pages.len(), root);
        pages
    }
}
