//! Serialized shape of the KPI report. Field names are a stable contract with
//! report rendering and export.

use serde::{Deserialize, Serialize};

use crate::domain::models::{HeadingCounts, Impact, Issue, SecurityHeaders, SocialLinks};
use crate::domain::Category;
use crate::service::scoring::Grade;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiReport {
    pub audit: AuditSection,
    pub overview: OverviewSection,
    pub on_page: OnPageSection,
    pub links: LinksSection,
    pub technical: TechnicalSection,
    pub performance: PerformanceSection,
    pub usability: UsabilitySection,
    pub social: SocialSection,
    pub local: LocalSection,
    pub tech_email: TechEmailSection,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSection {
    pub id: String,
    pub root_url: String,
    pub homepage_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewSection {
    pub overall_score: u8,
    pub grade: Grade,
    pub categories: Vec<CategoryGrade>,
    pub issue_counts: ImpactCounts,
    pub top_issues: Vec<IssueSummary>,
    pub pages_analyzed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGrade {
    pub category: Category,
    pub score: Option<u8>,
    pub grade: Option<Grade>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

impl ImpactCounts {
    pub(crate) fn tally(issues: &[Issue]) -> Self {
        let mut counts = Self::default();
        for issue in issues {
            match issue.impact {
                Impact::High => counts.high += 1,
                Impact::Medium => counts.medium += 1,
                Impact::Low => counts.low += 1,
            }
            counts.total += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub code: String,
    pub title: String,
    pub category: Category,
    pub impact: Impact,
    pub penalty: u32,
    pub affected_count: usize,
}

impl From<&Issue> for IssueSummary {
    fn from(issue: &Issue) -> Self {
        Self {
            code: issue.code.clone(),
            title: issue.title.clone(),
            category: issue.category,
            impact: issue.impact,
            penalty: issue.penalty,
            affected_count: issue.affected_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnPageSection {
    pub title: Option<String>,
    pub title_length: usize,
    pub meta_description: Option<String>,
    pub meta_description_length: usize,
    pub h1_text: Option<String>,
    pub headings: HeadingCounts,
    pub word_count: u32,
    pub images_total: u32,
    pub images_missing_alt: u32,
    pub keywords: Vec<TermCount>,
    pub two_word_phrases: Vec<TermCount>,
    pub three_word_phrases: Vec<TermCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinksSection {
    pub total_links: usize,
    pub internal_links: usize,
    pub external_links: usize,
    pub external_percent: f64,
    pub nofollow_links: usize,
    pub nofollow_percent: f64,
    pub broken_links: usize,
    pub redirect_chains: usize,
    pub query_string_percent: f64,
    pub friendly_links_issue: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSection {
    pub status_code: Option<u16>,
    pub https: bool,
    pub https_redirect_ok: Option<bool>,
    pub canonical_url: Option<String>,
    pub robots_meta: Option<String>,
    pub x_robots_tag: Option<String>,
    pub noindex: bool,
    pub lang: Option<String>,
    pub has_hreflang: bool,
    pub charset: Option<String>,
    pub schema_types: Vec<String>,
    pub uses_flash: bool,
    pub analytics_tool: Option<String>,
    pub robots_txt_present: bool,
    pub robots_txt_url: Option<String>,
    pub robots_disallow_all: bool,
    pub sitemap_url: Option<String>,
    pub llms_txt_present: bool,
    pub server: Option<String>,
    pub powered_by: Option<String>,
    pub security_headers: Option<SecurityHeaders>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetSizesMb {
    pub css_mb: f64,
    pub js_mb: f64,
    pub img_mb: f64,
    pub font_mb: f64,
    pub other_mb: f64,
    pub total_mb: f64,
    pub large_image_count: u32,
}

/// Lab metrics with timings in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LabSeconds {
    pub performance_score: Option<f64>,
    pub first_contentful_paint_s: Option<f64>,
    pub largest_contentful_paint_s: Option<f64>,
    pub total_blocking_time_s: Option<f64>,
    pub speed_index_s: Option<f64>,
    pub time_to_interactive_s: Option<f64>,
    pub cumulative_layout_shift: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSection {
    pub html_size_mb: Option<f64>,
    pub assets: Option<AssetSizesMb>,
    pub mobile: Option<LabSeconds>,
    pub desktop: Option<LabSeconds>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsabilitySection {
    pub has_viewport: bool,
    pub has_favicon: bool,
    pub iframe_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSection {
    pub has_open_graph: bool,
    pub has_twitter_card: bool,
    pub profiles: SocialLinks,
    pub profile_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSection {
    pub has_business_schema: bool,
    pub business_schema_types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechEmailSection {
    pub server_ip: Option<String>,
    pub spf_present: bool,
    pub spf_record: Option<String>,
    pub dmarc_present: bool,
    pub dmarc_record: Option<String>,
}
