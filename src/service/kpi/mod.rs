//! Assembles the KPI report from scored audit output.
//!
//! Nothing here scores or fetches: the builder only selects, converts and
//! arranges data that earlier stages produced.

pub mod report;

use serde::{Deserialize, Serialize};

use crate::domain::models::{
    normalize_url, AssetRecord, AssetTotals, Issue, LabMetrics, LinkEdge, LinkType, PageSignals,
    SiteSignals,
};
use crate::domain::{Category, CategoryScores};
use crate::service::rules::catalog::LOCAL_SCHEMA_TYPES;
use crate::service::scoring::{calculate_overall_score, score_to_grade};
use crate::service::text_analyzer::{top_keywords, top_phrases};
use report::*;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const TOP_ISSUES: usize = 5;
const FRIENDLY_LINKS_THRESHOLD: f64 = 30.0;

/// Identity and scores of the audit being reported on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: String,
    pub root_url: String,
    pub category_scores: CategoryScores,
}

/// How many keyword and phrase entries each list carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermLimits {
    pub keywords: usize,
    pub phrases: usize,
}

impl Default for TermLimits {
    fn default() -> Self {
        Self {
            keywords: 10,
            phrases: 10,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Bytes to megabytes, two decimals. Unknown stays unknown.
pub fn bytes_to_mb(bytes: Option<u64>) -> Option<f64> {
    bytes.map(|b| match b {
        0 => 0.0,
        b => round2(b as f64 / BYTES_PER_MB),
    })
}

/// Milliseconds to seconds, two decimals.
pub fn ms_to_seconds(ms: Option<f64>) -> Option<f64> {
    ms.map(|v| round2(v / 1000.0))
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(part as f64 * 100.0 / total as f64)
}

/// The page matching the audit root, else the first page.
pub fn select_homepage<'a>(root_url: &str, pages: &'a [PageSignals]) -> Option<&'a PageSignals> {
    let root = normalize_url(root_url);
    pages
        .iter()
        .find(|p| normalize_url(&p.url) == root || p.normalized_url == root)
        .or_else(|| pages.first())
}

pub fn build_kpi_report(
    audit: &AuditRecord,
    pages: &[PageSignals],
    issues: &[Issue],
    links: &[LinkEdge],
    assets: &[AssetRecord],
    site: &SiteSignals,
) -> KpiReport {
    build_kpi_report_with_limits(audit, pages, issues, links, assets, site, TermLimits::default())
}

pub fn build_kpi_report_with_limits(
    audit: &AuditRecord,
    pages: &[PageSignals],
    issues: &[Issue],
    links: &[LinkEdge],
    assets: &[AssetRecord],
    site: &SiteSignals,
    limits: TermLimits,
) -> KpiReport {
    let homepage = select_homepage(&audit.root_url, pages);
    if homepage.is_none() {
        tracing::debug!("Building report for audit {} without pages", audit.id);
    }

    KpiReport {
        audit: AuditSection {
            id: audit.id.clone(),
            root_url: audit.root_url.clone(),
            homepage_url: homepage.map(|p| p.url.clone()),
        },
        overview: overview(&audit.category_scores, issues, pages.len()),
        on_page: homepage.map(|p| on_page(p, limits)).unwrap_or_default(),
        links: link_structure(links),
        technical: technical(homepage, site),
        performance: homepage.map(|p| performance(p, assets)).unwrap_or_default(),
        usability: homepage
            .map(|p| UsabilitySection {
                has_viewport: p.has_viewport,
                has_favicon: p.has_favicon,
                iframe_count: p.iframe_count,
            })
            .unwrap_or_default(),
        social: homepage
            .map(|p| SocialSection {
                has_open_graph: p.has_open_graph,
                has_twitter_card: p.has_twitter_card,
                profiles: p.social_links.clone(),
                profile_count: p.social_links.count(),
            })
            .unwrap_or_default(),
        local: local(pages),
        tech_email: TechEmailSection {
            server_ip: site.server_ip.clone(),
            spf_present: site.spf_present,
            spf_record: site.spf_record.clone(),
            dmarc_present: site.dmarc_present,
            dmarc_record: site.dmarc_record.clone(),
        },
        issues: issues.to_vec(),
    }
}

fn overview(scores: &CategoryScores, issues: &[Issue], pages_analyzed: usize) -> OverviewSection {
    let overall_score = calculate_overall_score(scores);

    let mut ranked: Vec<&Issue> = issues.iter().collect();
    ranked.sort_by(|a, b| b.penalty.cmp(&a.penalty));

    OverviewSection {
        overall_score,
        grade: score_to_grade(i32::from(overall_score)),
        categories: Category::ALL
            .iter()
            .map(|c| {
                let score = scores.get(*c);
                CategoryGrade {
                    category: *c,
                    score,
                    grade: score.map(|s| score_to_grade(i32::from(s))),
                }
            })
            .collect(),
        issue_counts: ImpactCounts::tally(issues),
        top_issues: ranked.into_iter().take(TOP_ISSUES).map(IssueSummary::from).collect(),
        pages_analyzed,
    }
}

fn terms(ranked: Vec<(String, usize)>) -> Vec<TermCount> {
    ranked
        .into_iter()
        .map(|(term, count)| TermCount { term, count })
        .collect()
}

fn on_page(page: &PageSignals, limits: TermLimits) -> OnPageSection {
    let text = [
        page.title.as_deref(),
        page.meta_description.as_deref(),
        page.h1_text.as_deref(),
        Some(page.content_excerpt.as_str()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    OnPageSection {
        title: page.title.clone(),
        title_length: page.title_length,
        meta_description: page.meta_description.clone(),
        meta_description_length: page.meta_description_length,
        h1_text: page.h1_text.clone(),
        headings: page.headings,
        word_count: page.word_count,
        images_total: page.images_total,
        images_missing_alt: page.images_missing_alt,
        keywords: terms(top_keywords(&text, limits.keywords)),
        two_word_phrases: terms(top_phrases(&text, limits.phrases, 2)),
        three_word_phrases: terms(top_phrases(&text, limits.phrases, 3)),
    }
}

fn link_structure(links: &[LinkEdge]) -> LinksSection {
    let total = links.len();
    let internal: Vec<&LinkEdge> = links
        .iter()
        .filter(|l| l.link_type == LinkType::Internal)
        .collect();
    let external = total - internal.len();
    let nofollow = links.iter().filter(|l| l.rel_nofollow).count();
    let with_query = internal.iter().filter(|l| l.to_url.contains('?')).count();
    let query_string_percent = percent(with_query, internal.len());

    LinksSection {
        total_links: total,
        internal_links: internal.len(),
        external_links: external,
        external_percent: percent(external, total),
        nofollow_links: nofollow,
        nofollow_percent: percent(nofollow, total),
        broken_links: links.iter().filter(|l| l.is_broken).count(),
        redirect_chains: links.iter().filter(|l| l.redirect_hops >= 2).count(),
        query_string_percent,
        friendly_links_issue: query_string_percent > FRIENDLY_LINKS_THRESHOLD,
    }
}

fn technical(homepage: Option<&PageSignals>, site: &SiteSignals) -> TechnicalSection {
    let mut section = TechnicalSection {
        https_redirect_ok: site.https_redirect_ok,
        robots_txt_present: site.robots_txt_present,
        robots_txt_url: site.robots_txt_url.clone(),
        robots_disallow_all: site.robots_disallow_all,
        sitemap_url: site.sitemap_url.clone(),
        llms_txt_present: site.llms_txt_present,
        ..Default::default()
    };
    if let Some(page) = homepage {
        section.status_code = Some(page.status_code);
        section.https = page.is_https();
        section.canonical_url = page.canonical_url.clone();
        section.robots_meta = page.robots_meta.clone();
        section.x_robots_tag = page.x_robots_tag.clone();
        section.noindex = page.is_noindex();
        section.lang = page.lang.clone();
        section.has_hreflang = page.has_hreflang;
        section.charset = page.charset.clone();
        section.schema_types = page.schema_types.clone();
        section.uses_flash = page.uses_flash;
        section.analytics_tool = page.analytics_tool.clone();
        section.server = page.server.clone();
        section.powered_by = page.powered_by.clone();
        section.security_headers = page.security_headers.clone();
    }
    section
}

fn lab_seconds(metrics: &LabMetrics) -> LabSeconds {
    LabSeconds {
        performance_score: metrics.performance_score,
        first_contentful_paint_s: ms_to_seconds(metrics.first_contentful_paint_ms),
        largest_contentful_paint_s: ms_to_seconds(metrics.largest_contentful_paint_ms),
        total_blocking_time_s: ms_to_seconds(metrics.total_blocking_time_ms),
        speed_index_s: ms_to_seconds(metrics.speed_index_ms),
        time_to_interactive_s: ms_to_seconds(metrics.time_to_interactive_ms),
        cumulative_layout_shift: metrics.cumulative_layout_shift,
    }
}

fn performance(page: &PageSignals, assets: &[AssetRecord]) -> PerformanceSection {
    let totals = AssetTotals::for_page(assets, &page.url, &page.final_url).or(page.assets);
    let mb = |bytes: u64| bytes_to_mb(Some(bytes)).unwrap_or_default();

    PerformanceSection {
        html_size_mb: bytes_to_mb(Some(page.html_size_bytes)),
        assets: totals.map(|t| AssetSizesMb {
            css_mb: mb(t.css_bytes),
            js_mb: mb(t.js_bytes),
            img_mb: mb(t.img_bytes),
            font_mb: mb(t.font_bytes),
            other_mb: mb(t.other_bytes),
            total_mb: mb(t.total_bytes()),
            large_image_count: t.large_image_count,
        }),
        mobile: page
            .performance
            .as_ref()
            .and_then(|p| p.mobile.as_ref())
            .map(lab_seconds),
        desktop: page
            .performance
            .as_ref()
            .and_then(|p| p.desktop.as_ref())
            .map(lab_seconds),
    }
}

/// Business schema found anywhere on the site, in first-seen order.
fn local(pages: &[PageSignals]) -> LocalSection {
    let mut found: Vec<String> = Vec::new();
    for schema in pages.iter().flat_map(|p| p.schema_types.iter()) {
        if LOCAL_SCHEMA_TYPES.contains(&schema.as_str()) && !found.contains(schema) {
            found.push(schema.clone());
        }
    }
    LocalSection {
        has_business_schema: !found.is_empty(),
        business_schema_types: found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AssetType, PerformanceMetrics};
    use crate::domain::CategoryPenalties;
    use crate::service::rules::RulesEngine;
    use crate::service::scoring::{calculate_category_scores, Grade};

    fn audit(scores: CategoryScores) -> AuditRecord {
        AuditRecord {
            id: "audit-1".into(),
            root_url: "https://example.com".into(),
            category_scores: scores,
        }
    }

    fn edge(to: &str, link_type: LinkType) -> LinkEdge {
        LinkEdge {
            from_url: "https://example.com/".into(),
            to_url: to.into(),
            link_type,
            rel_nofollow: false,
            is_broken: false,
            status_code: Some(200),
            redirect_hops: 0,
        }
    }

    #[test]
    fn test_bytes_to_mb() {
        assert_eq!(bytes_to_mb(Some(0)), Some(0.0));
        assert_eq!(bytes_to_mb(None), None);
        assert_eq!(bytes_to_mb(Some(1_048_576)), Some(1.0));
        assert_eq!(bytes_to_mb(Some(1_572_864)), Some(1.5));
        assert_eq!(bytes_to_mb(Some(48_000)), Some(0.05));
    }

    #[test]
    fn test_ms_to_seconds() {
        assert_eq!(ms_to_seconds(Some(2345.0)), Some(2.35));
        assert_eq!(ms_to_seconds(Some(0.0)), Some(0.0));
        assert_eq!(ms_to_seconds(None), None);
    }

    #[test]
    fn test_homepage_prefers_root_match() {
        let mut about = PageSignals::default_test_instance();
        about.url = "https://example.com/about".into();
        about.normalized_url = "https://example.com/about".into();
        let home = PageSignals::default_test_instance();

        let pages = vec![about.clone(), home];
        let selected = select_homepage("https://EXAMPLE.com/", &pages).unwrap();
        assert_eq!(selected.url, "https://example.com/");

        let only_about = vec![about];
        let selected = select_homepage("https://example.com/", &only_about).unwrap();
        assert_eq!(selected.url, "https://example.com/about");

        assert!(select_homepage("https://example.com/", &[]).is_none());
    }

    #[test]
    fn test_empty_audit_yields_empty_sections() {
        let report = build_kpi_report(
            &audit(CategoryScores::new()),
            &[],
            &[],
            &[],
            &[],
            &SiteSignals::default(),
        );

        assert_eq!(report.overview.overall_score, 70);
        assert_eq!(report.overview.grade, Grade::C);
        assert_eq!(report.overview.pages_analyzed, 0);
        assert!(report.audit.homepage_url.is_none());
        assert!(report.on_page.keywords.is_empty());
        assert_eq!(report.performance.html_size_mb, None);
        assert_eq!(report.links.external_percent, 0.0);
        assert!(!report.local.has_business_schema);
    }

    #[test]
    fn test_link_ratios_and_friendly_links() {
        let mut nofollow = edge("https://other.com/", LinkType::External);
        nofollow.rel_nofollow = true;
        let links = vec![
            edge("https://example.com/a?id=1", LinkType::Internal),
            edge("https://example.com/b?id=2", LinkType::Internal),
            edge("https://example.com/c", LinkType::Internal),
            nofollow,
        ];

        let section = link_structure(&links);
        assert_eq!(section.total_links, 4);
        assert_eq!(section.internal_links, 3);
        assert_eq!(section.external_percent, 25.0);
        assert_eq!(section.nofollow_percent, 25.0);
        assert_eq!(section.query_string_percent, 66.7);
        assert!(section.friendly_links_issue);

        let clean = link_structure(&[edge("https://example.com/c", LinkType::Internal)]);
        assert!(!clean.friendly_links_issue);
    }

    #[test]
    fn test_report_from_scored_audit() {
        let mut page = PageSignals::default_test_instance();
        page.title = None;
        page.title_length = 0;
        page.content_excerpt = "Durable widgets for every home. Durable widgets ship free.".into();
        page.performance = Some(PerformanceMetrics {
            mobile: Some(LabMetrics {
                largest_contentful_paint_ms: Some(3210.0),
                ..Default::default()
            }),
            desktop: None,
        });

        let engine = RulesEngine::new(1);
        let evaluation = engine.evaluate_collection(std::slice::from_ref(&page), &[], &[]);
        let mut penalties = CategoryPenalties::new();
        penalties.merge(&evaluation.penalties);
        let scores = calculate_category_scores(&penalties);

        let assets = vec![AssetRecord {
            url: "https://example.com/app.js".into(),
            asset_type: AssetType::Js,
            size_bytes: 524_288,
            page_url: page.url.clone(),
        }];
        let site = SiteSignals {
            spf_present: true,
            spf_record: Some("v=spf1 -all".into()),
            ..Default::default()
        };

        let report = build_kpi_report(
            &audit(scores),
            std::slice::from_ref(&page),
            &evaluation.issues,
            &[],
            &assets,
            &site,
        );

        assert_eq!(report.audit.homepage_url.as_deref(), Some("https://example.com/"));
        assert_eq!(report.overview.top_issues[0].code, "ONPAGE_TITLE_MISSING");
        assert_eq!(report.overview.issue_counts.high, 1);
        assert_eq!(report.overview.issue_counts.total, evaluation.issues.len());
        let onpage = report
            .overview
            .categories
            .iter()
            .find(|c| c.category == Category::Onpage)
            .unwrap();
        assert_eq!(onpage.score, Some(85));
        assert_eq!(onpage.grade, Some(Grade::B));

        assert_eq!(report.on_page.keywords[0].term, "widgets");
        assert_eq!(report.on_page.two_word_phrases[0].term, "durable widgets");
        assert_eq!(report.performance.assets.unwrap().js_mb, 0.5);
        assert_eq!(
            report.performance.mobile.unwrap().largest_contentful_paint_s,
            Some(3.21)
        );
        assert!(report.local.has_business_schema);
        assert_eq!(report.tech_email.spf_record.as_deref(), Some("v=spf1 -all"));
        assert_eq!(report.issues.len(), evaluation.issues.len());
    }

    #[test]
    fn test_report_json_shape() {
        let report = build_kpi_report(
            &audit(CategoryScores::new()),
            &[PageSignals::default_test_instance()],
            &[],
            &[],
            &[],
            &SiteSignals::default(),
        );
        let json = serde_json::to_value(&report).unwrap();
        for key in [
            "audit", "overview", "on_page", "links", "technical", "performance", "usability",
            "social", "local", "tech_email", "issues",
        ] {
            assert!(json.get(key).is_some(), "missing section {}", key);
        }
        assert_eq!(json["overview"]["categories"][0]["category"], "onpage");
        assert_eq!(json["performance"]["html_size_mb"], 0.05);
    }
}
