//! End-to-end audit: extraction, site probes, rule phases, scoring and the
//! KPI report.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

use crate::config::AuditConfig;
use crate::domain::models::{
    AssetRecord, AssetTotals, DiscoveredUrl, DiscoverySource, Issue, LinkEdge, PageSignals,
    PageTelemetry, RawPage, SiteSignals,
};
use crate::domain::{CategoryPenalties, CategoryScores};
use crate::error::{AuditError, Result};
use crate::extractor::page_extractor::PageSignalExtractor;
use crate::service::kpi::report::KpiReport;
use crate::service::kpi::{build_kpi_report_with_limits, AuditRecord, TermLimits};
use crate::service::rules::{Evaluation, RulesEngine};
use crate::service::scoring::{
    calculate_category_scores, calculate_overall_score, score_to_grade, Grade,
};
use crate::service::site_signals::{SiteSignalCollector, SiteSignalSource};

/// Crawl artifacts for one audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditInput {
    pub audit_id: String,
    pub root_url: String,
    pub pages: Vec<RawPage>,
    #[serde(default)]
    pub links: Vec<LinkEdge>,
    #[serde(default)]
    pub assets: Vec<AssetRecord>,
    #[serde(default)]
    pub discovered: Vec<DiscoveredUrl>,
    /// Security headers and lab metrics keyed by page URL.
    #[serde(default)]
    pub telemetry: HashMap<String, PageTelemetry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditOutcome {
    pub audit_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub pages: Vec<PageSignals>,
    pub site: SiteSignals,
    pub issues: Vec<Issue>,
    pub penalties: CategoryPenalties,
    pub scores: CategoryScores,
    pub overall_score: u8,
    pub grade: Grade,
    pub report: KpiReport,
}

pub struct AuditRunner {
    config: AuditConfig,
    engine: RulesEngine,
    source: Arc<dyn SiteSignalSource>,
}

impl AuditRunner {
    pub fn new(config: AuditConfig) -> Result<Self> {
        let collector = SiteSignalCollector::new(&config)?;
        Ok(Self::with_source(config, Arc::new(collector)))
    }

    pub fn with_source(config: AuditConfig, source: Arc<dyn SiteSignalSource>) -> Self {
        Self {
            engine: RulesEngine::new(config.worker_count()),
            config,
            source,
        }
    }

    pub async fn run(&self, input: AuditInput) -> Result<AuditOutcome> {
        let started_at = Utc::now();
        let timer = std::time::Instant::now();
        let root = Url::parse(&input.root_url)
            .map_err(|e| AuditError::invalid_url(format!("{}: {}", input.root_url, e)))?;
        tracing::info!(
            "[AUDIT] Starting audit {} for {} ({} pages)",
            input.audit_id,
            root,
            input.pages.len()
        );

        let AuditInput {
            audit_id,
            root_url,
            pages: raw_pages,
            links,
            assets,
            mut discovered,
            mut telemetry,
        } = input;

        let wants_sitemap = self.config.fetch_sitemap
            && !discovered.iter().any(|d| d.source == DiscoverySource::Sitemap);
        let (mut pages, site, sitemap_urls) = tokio::join!(
            self.extract_pages(raw_pages),
            self.source.collect(&root),
            async {
                match wants_sitemap {
                    true => self.source.sitemap_urls(&root).await,
                    false => Vec::new(),
                }
            }
        );
        discovered.extend(sitemap_urls.into_iter().map(DiscoveredUrl::sitemap));

        for page in pages.iter_mut() {
            let entry = telemetry
                .remove(&page.url)
                .or_else(|| telemetry.remove(&page.final_url));
            if let Some(entry) = entry {
                page.attach_telemetry(entry);
            }
            page.assets = AssetTotals::for_page(&assets, &page.url, &page.final_url);
        }
        tracing::debug!(
            "[AUDIT] {} of {} pages carry telemetry",
            pages.iter().filter(|p| p.has_telemetry()).count(),
            pages.len()
        );

        let engine = self.engine.clone();
        let (pages, links, evaluation) = tokio::task::spawn_blocking(move || {
            let mut evaluation = engine.evaluate_collection(&pages, &links, &discovered);
            evaluation.merge(engine.evaluate_telemetry(&pages));
            (pages, links, evaluation)
        })
        .await
        .map_err(|e| AuditError::WorkerError(format!("rule evaluation failed: {}", e)))?;

        let Evaluation { issues, penalties } = evaluation;
        let scores = calculate_category_scores(&penalties);
        let overall_score = calculate_overall_score(&scores);
        let grade = score_to_grade(i32::from(overall_score));

        let record = AuditRecord {
            id: audit_id.clone(),
            root_url,
            category_scores: scores,
        };
        let limits = TermLimits {
            keywords: self.config.keyword_limit,
            phrases: self.config.phrase_limit,
        };
        let report = build_kpi_report_with_limits(&record, &pages, &issues, &links, &assets, &site, limits);

        tracing::info!(
            "[AUDIT] Audit {} completed in {}ms: score {} ({}), {} issues",
            audit_id,
            timer.elapsed().as_millis(),
            overall_score,
            grade,
            issues.len()
        );

        Ok(AuditOutcome {
            audit_id,
            started_at,
            finished_at: Utc::now(),
            pages,
            site,
            issues,
            penalties,
            scores,
            overall_score,
            grade,
            report,
        })
    }

    /// Extract signals on the blocking pool, at most `workers` pages at once.
    /// A page whose extraction panics is dropped. Output keeps input order.
    async fn extract_pages(&self, raw_pages: Vec<RawPage>) -> Vec<PageSignals> {
        let mut extracted: Vec<(usize, PageSignals)> = stream::iter(raw_pages.into_iter().enumerate())
            .map(|(index, raw)| async move {
                let url = raw.url.clone();
                let result = tokio::task::spawn_blocking(move || PageSignalExtractor::extract(&raw)).await;
                (index, url, result)
            })
            .buffer_unordered(self.config.worker_count())
            .filter_map(|(index, url, result)| async move {
                match result {
                    Ok(signals) => Some((index, signals)),
                    Err(e) => {
                        tracing::warn!("[AUDIT] Extraction failed for {}: {}", url, e);
                        None
                    }
                }
            })
            .collect()
            .await;
        extracted.sort_by_key(|(index, _)| *index);
        extracted.into_iter().map(|(_, signals)| signals).collect()
    }
}
