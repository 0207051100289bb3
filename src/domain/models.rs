//! Audit domain entities: crawl inputs, extracted page signals, issues and
//! site-wide signals.

use serde::{Deserialize, Serialize};
use url::Url;

use super::category::Category;

// ====== Enums ======

/// Outcome of probing a well-known site resource (robots.txt, llms.txt, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceStatus {
    Found(String),
    Unauthorized(String),
    NotFound,
}

impl ResourceStatus {
    pub fn exists(&self) -> bool {
        matches!(
            self,
            ResourceStatus::Found(_) | ResourceStatus::Unauthorized(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Low => "low",
            Impact::Medium => "medium",
            Impact::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Easy,
    Medium,
    Hard,
}

impl Effort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effort::Easy => "easy",
            Effort::Medium => "medium",
            Effort::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Internal,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Css,
    Js,
    Img,
    Font,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoverySource {
    Sitemap,
    Crawl,
    Manual,
}

// ====== Crawl inputs ======

/// Subset of response headers the extractor looks at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseHeaders {
    pub content_type: Option<String>,
    pub x_robots_tag: Option<String>,
    pub server: Option<String>,
    pub x_powered_by: Option<String>,
}

/// One fetched page as handed over by the crawler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPage {
    pub url: String,
    pub final_url: String,
    pub normalized_url: String,
    pub status_code: u16,
    pub html: String,
    #[serde(default)]
    pub headers: ResponseHeaders,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkEdge {
    pub from_url: String,
    pub to_url: String,
    pub link_type: LinkType,
    #[serde(default)]
    pub rel_nofollow: bool,
    #[serde(default)]
    pub is_broken: bool,
    pub status_code: Option<u16>,
    #[serde(default)]
    pub redirect_hops: u32,
}

impl LinkEdge {
    /// `from → to` label used in issue samples.
    pub fn label(&self) -> String {
        format!("{} → {}", self.from_url, self.to_url)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub url: String,
    pub asset_type: AssetType,
    pub size_bytes: u64,
    pub page_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredUrl {
    pub url: String,
    pub source: DiscoverySource,
}

impl DiscoveredUrl {
    pub fn sitemap(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: DiscoverySource::Sitemap,
        }
    }
}

// ====== Page signals ======

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCounts {
    pub h1: u32,
    pub h2: u32,
    pub h3: u32,
    pub h4: u32,
    pub h5: u32,
    pub h6: u32,
}

impl HeadingCounts {
    pub(crate) fn bump(&mut self, level: u8) {
        match level {
            1 => self.h1 += 1,
            2 => self.h2 += 1,
            3 => self.h3 += 1,
            4 => self.h4 += 1,
            5 => self.h5 += 1,
            6 => self.h6 += 1,
            _ => {}
        }
    }
}

/// First profile link found per platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub youtube: Option<String>,
}

impl SocialLinks {
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn count(&self) -> usize {
        [
            &self.facebook,
            &self.twitter,
            &self.instagram,
            &self.linkedin,
            &self.youtube,
        ]
        .iter()
        .filter(|l| l.is_some())
        .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityHeaders {
    pub strict_transport_security: Option<String>,
    pub x_frame_options: Option<String>,
    pub x_content_type_options: Option<String>,
    pub content_security_policy: Option<String>,
    pub referrer_policy: Option<String>,
    pub permissions_policy: Option<String>,
}

impl SecurityHeaders {
    /// Build from raw `(name, value)` header pairs; names match
    /// case-insensitively and the first occurrence wins.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut headers = Self::default();
        for (name, value) in pairs {
            let slot = match name.trim().to_ascii_lowercase().as_str() {
                "strict-transport-security" => &mut headers.strict_transport_security,
                "x-frame-options" => &mut headers.x_frame_options,
                "x-content-type-options" => &mut headers.x_content_type_options,
                "content-security-policy" => &mut headers.content_security_policy,
                "referrer-policy" => &mut headers.referrer_policy,
                "permissions-policy" => &mut headers.permissions_policy,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.trim().to_string());
            }
        }
        headers
    }
}

/// Lighthouse-style opportunity scores in `[0, 1]`; 1 means nothing to gain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Opportunities {
    pub unused_javascript: Option<f64>,
    pub unused_css: Option<f64>,
    pub render_blocking: Option<f64>,
}

/// Lab data for one form factor. Timings are milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LabMetrics {
    pub performance_score: Option<f64>,
    pub first_contentful_paint_ms: Option<f64>,
    pub largest_contentful_paint_ms: Option<f64>,
    pub total_blocking_time_ms: Option<f64>,
    pub speed_index_ms: Option<f64>,
    pub time_to_interactive_ms: Option<f64>,
    pub cumulative_layout_shift: Option<f64>,
    #[serde(default)]
    pub opportunities: Opportunities,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub mobile: Option<LabMetrics>,
    pub desktop: Option<LabMetrics>,
}

/// Image assets above this size count as oversized.
pub const LARGE_IMAGE_BYTES: u64 = 200 * 1024;

/// Asset bytes by type for a single page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTotals {
    pub css_bytes: u64,
    pub js_bytes: u64,
    pub img_bytes: u64,
    pub font_bytes: u64,
    pub other_bytes: u64,
    pub large_image_count: u32,
}

impl AssetTotals {
    /// Sum the records belonging to `page_url`. `None` when the page owns no
    /// asset records at all, which is different from owning zero bytes.
    pub fn from_records(records: &[AssetRecord], page_url: &str) -> Option<Self> {
        let mut totals = Self::default();
        let mut seen = false;
        for record in records.iter().filter(|r| r.page_url == page_url) {
            seen = true;
            match record.asset_type {
                AssetType::Css => totals.css_bytes += record.size_bytes,
                AssetType::Js => totals.js_bytes += record.size_bytes,
                AssetType::Img => {
                    totals.img_bytes += record.size_bytes;
                    if record.size_bytes > LARGE_IMAGE_BYTES {
                        totals.large_image_count += 1;
                    }
                }
                AssetType::Font => totals.font_bytes += record.size_bytes,
                AssetType::Other => totals.other_bytes += record.size_bytes,
            }
        }
        seen.then_some(totals)
    }

    /// Totals for a page keyed by its URL, falling back to the URL it
    /// redirected to.
    pub fn for_page(records: &[AssetRecord], url: &str, final_url: &str) -> Option<Self> {
        Self::from_records(records, url).or_else(|| match final_url {
            "" => None,
            f if f == url => None,
            f => Self::from_records(records, f),
        })
    }

    pub fn total_bytes(&self) -> u64 {
        self.css_bytes + self.js_bytes + self.img_bytes + self.font_bytes + self.other_bytes
    }
}

/// Out-of-band data attached to a page after extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageTelemetry {
    pub security_headers: Option<SecurityHeaders>,
    pub performance: Option<PerformanceMetrics>,
}

/// Flat record of SEO-relevant facts about one crawled URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSignals {
    pub url: String,
    pub normalized_url: String,
    pub final_url: String,
    pub status_code: u16,
    pub title: Option<String>,
    pub title_length: usize,
    pub meta_description: Option<String>,
    pub meta_description_length: usize,
    pub canonical_url: Option<String>,
    pub robots_meta: Option<String>,
    pub x_robots_tag: Option<String>,
    pub headings: HeadingCounts,
    pub h1_text: Option<String>,
    pub lang: Option<String>,
    pub has_hreflang: bool,
    pub has_viewport: bool,
    pub has_favicon: bool,
    pub analytics_tool: Option<String>,
    pub iframe_count: u32,
    pub uses_flash: bool,
    pub social_links: SocialLinks,
    pub charset: Option<String>,
    pub content_excerpt: String,
    pub word_count: u32,
    pub images_total: u32,
    pub images_missing_alt: u32,
    pub internal_links: u32,
    pub external_links: u32,
    pub has_open_graph: bool,
    pub has_twitter_card: bool,
    pub schema_types: Vec<String>,
    pub html_size_bytes: u64,
    pub server: Option<String>,
    pub powered_by: Option<String>,
    pub security_headers: Option<SecurityHeaders>,
    pub performance: Option<PerformanceMetrics>,
    pub assets: Option<AssetTotals>,
}

impl PageSignals {
    pub fn attach_telemetry(&mut self, telemetry: PageTelemetry) {
        if telemetry.security_headers.is_some() {
            self.security_headers = telemetry.security_headers;
        }
        if telemetry.performance.is_some() {
            self.performance = telemetry.performance;
        }
    }

    pub fn has_telemetry(&self) -> bool {
        self.security_headers.is_some() || self.performance.is_some() || self.assets.is_some()
    }

    pub fn is_noindex(&self) -> bool {
        [&self.robots_meta, &self.x_robots_tag]
            .iter()
            .filter_map(|v| v.as_deref())
            .any(|v| v.to_ascii_lowercase().contains("noindex"))
    }

    pub fn is_https(&self) -> bool {
        Url::parse(&self.url)
            .map(|u| u.scheme() == "https")
            .unwrap_or(false)
    }

    /// Helper for testing: a page that triggers no page-level rule.
    #[cfg(test)]
    pub fn default_test_instance() -> Self {
        Self {
            url: "https://example.com/".into(),
            normalized_url: "https://example.com/".into(),
            final_url: "https://example.com/".into(),
            status_code: 200,
            title: Some("Example Widgets and Gadgets for Every Home".into()),
            title_length: 42,
            meta_description: Some(
                "Shop durable widgets and gadgets for every room of your home, with free shipping."
                    .into(),
            ),
            meta_description_length: 81,
            canonical_url: Some("https://example.com/".into()),
            headings: HeadingCounts { h1: 1, h2: 3, ..Default::default() },
            h1_text: Some("Widgets for every home".into()),
            lang: Some("en".into()),
            has_viewport: true,
            has_favicon: true,
            analytics_tool: Some("Google Analytics".into()),
            social_links: SocialLinks {
                facebook: Some("https://facebook.com/example".into()),
                ..Default::default()
            },
            charset: Some("utf-8".into()),
            word_count: 650,
            images_total: 4,
            internal_links: 12,
            external_links: 3,
            has_open_graph: true,
            has_twitter_card: true,
            schema_types: vec!["Organization".into(), "WebSite".into()],
            html_size_bytes: 48_000,
            ..Default::default()
        }
    }
}

// ====== Issues ======

/// A triggered rule instance with remediation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub code: String,
    pub category: Category,
    pub title: String,
    pub description: String,
    pub impact: Impact,
    pub effort: Effort,
    pub penalty: u32,
    pub affected_count: usize,
    pub sample_urls: Vec<String>,
    pub recommendation: String,
    pub fix_steps: Vec<String>,
}

// ====== Site-wide signals ======

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSignals {
    pub robots_txt_present: bool,
    pub robots_txt_url: Option<String>,
    pub robots_disallow_all: bool,
    pub sitemap_url: Option<String>,
    pub llms_txt_present: bool,
    /// `None` when the probe could not complete.
    pub https_redirect_ok: Option<bool>,
    pub server_ip: Option<String>,
    pub spf_present: bool,
    pub spf_record: Option<String>,
    pub dmarc_present: bool,
    pub dmarc_record: Option<String>,
}

/// Normalized form used to compare URLs across crawl and sitemap sources:
/// no fragment, lowercase host, no trailing slash except for the root path.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut url) = Url::parse(trimmed) else {
        return trimmed.trim_end_matches('/').to_string();
    };
    url.set_fragment(None);
    let mut out = url.to_string();
    if url.path() != "/" && url.query().is_none() && out.ends_with('/') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_status_exists() {
        assert!(ResourceStatus::Found("url".into()).exists());
        assert!(ResourceStatus::Unauthorized("url".into()).exists());
        assert!(!ResourceStatus::NotFound.exists());
    }

    #[test]
    fn test_asset_totals_distinguish_unknown_from_zero() {
        let records = vec![
            AssetRecord {
                url: "https://example.com/a.css".into(),
                asset_type: AssetType::Css,
                size_bytes: 1200,
                page_url: "https://example.com/".into(),
            },
            AssetRecord {
                url: "https://example.com/hero.jpg".into(),
                asset_type: AssetType::Img,
                size_bytes: 300 * 1024,
                page_url: "https://example.com/".into(),
            },
            AssetRecord {
                url: "https://example.com/icon.png".into(),
                asset_type: AssetType::Img,
                size_bytes: 4 * 1024,
                page_url: "https://example.com/".into(),
            },
        ];

        let totals = AssetTotals::from_records(&records, "https://example.com/").unwrap();
        assert_eq!(totals.css_bytes, 1200);
        assert_eq!(totals.js_bytes, 0);
        assert_eq!(totals.large_image_count, 1);
        assert_eq!(totals.total_bytes(), 1200 + 304 * 1024);

        assert!(AssetTotals::from_records(&records, "https://example.com/other").is_none());
    }

    #[test]
    fn test_asset_totals_fall_back_to_final_url() {
        let records = vec![AssetRecord {
            url: "https://example.com/hero.jpg".into(),
            asset_type: AssetType::Img,
            size_bytes: 300 * 1024,
            page_url: "https://example.com/pricing".into(),
        }];

        let totals =
            AssetTotals::for_page(&records, "https://example.com/old-pricing", "https://example.com/pricing")
                .unwrap();
        assert_eq!(totals.large_image_count, 1);
        assert!(AssetTotals::for_page(&records, "https://example.com/old-pricing", "").is_none());
        assert!(AssetTotals::for_page(&records, "https://example.com/x", "https://example.com/x").is_none());
    }

    #[test]
    fn test_security_headers_from_pairs() {
        let headers = SecurityHeaders::from_pairs([
            ("Strict-Transport-Security", "max-age=63072000"),
            ("X-Frame-Options", "DENY"),
            ("x-frame-options", "SAMEORIGIN"),
            ("Server", "nginx"),
        ]);
        assert_eq!(headers.strict_transport_security.as_deref(), Some("max-age=63072000"));
        assert_eq!(headers.x_frame_options.as_deref(), Some("DENY"));
        assert!(headers.content_security_policy.is_none());
    }

    #[test]
    fn test_noindex_from_meta_or_header() {
        let mut page = PageSignals::default_test_instance();
        assert!(!page.is_noindex());
        page.x_robots_tag = Some("NOINDEX, nofollow".into());
        assert!(page.is_noindex());
        page.x_robots_tag = None;
        page.robots_meta = Some("noindex".into());
        assert!(page.is_noindex());
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("https://Example.com/about/#team"), "https://example.com/about");
        assert_eq!(normalize_url("https://example.com"), "https://example.com/");
        assert_eq!(normalize_url("https://example.com/?q=1"), "https://example.com/?q=1");
    }
}
