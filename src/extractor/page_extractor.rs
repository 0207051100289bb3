use scraper::{Html, Selector};
use std::sync::OnceLock;
use url::Url;

use crate::domain::models::{HeadingCounts, PageSignals, RawPage, SocialLinks};

/// Maximum number of characters kept from the collapsed body text.
pub const CONTENT_EXCERPT_CHARS: usize = 2000;

/// Checked in order; the first signature found in the page wins.
const ANALYTICS_SIGNATURES: &[(&str, &str)] = &[
    ("googletagmanager.com/gtm.js", "Google Tag Manager"),
    ("googletagmanager.com/ns.html", "Google Tag Manager"),
    ("googletagmanager.com/gtag/js", "Google Analytics"),
    ("google-analytics.com", "Google Analytics"),
    ("connect.facebook.net", "Facebook Pixel"),
    ("fbq(", "Facebook Pixel"),
];

const FACEBOOK_DOMAINS: &[&str] = &["facebook.com", "fb.com"];
const TWITTER_DOMAINS: &[&str] = &["twitter.com", "://x.com", "://www.x.com"];
const INSTAGRAM_DOMAINS: &[&str] = &["instagram.com"];
const LINKEDIN_DOMAINS: &[&str] = &["linkedin.com"];
const YOUTUBE_DOMAINS: &[&str] = &["youtube.com", "youtu.be"];

fn selector(cell: &'static OnceLock<Selector>, css: &str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).unwrap())
}

/// Parses one fetched page into [`PageSignals`].
///
/// html5ever recovers from any markup it is given, so extraction has no
/// failure path: missing or ambiguous signals come back as `None`, `0` or
/// `false`.
pub struct PageSignalExtractor;

impl PageSignalExtractor {
    pub fn extract(page: &RawPage) -> PageSignals {
        let document = Html::parse_document(&page.html);
        let page_host = Url::parse(&page.final_url)
            .or_else(|_| Url::parse(&page.url))
            .ok()
            .and_then(|u| u.host_str().map(strip_www));

        let (body_text, word_count) = Self::extract_body_text(&document);
        let (images_total, images_missing_alt) = Self::count_images(&document);
        let anchors = Self::scan_anchors(&document, page_host.as_deref());
        let meta = Self::scan_meta(&document);
        let links = Self::scan_link_tags(&document);
        let title = Self::extract_title(&document);
        let meta_description = meta.description.filter(|d| !d.is_empty());

        PageSignals {
            url: page.url.clone(),
            normalized_url: page.normalized_url.clone(),
            final_url: page.final_url.clone(),
            status_code: page.status_code,
            title_length: title.as_deref().map(|t| t.chars().count()).unwrap_or(0),
            title,
            meta_description_length: meta_description
                .as_deref()
                .map(|d| d.chars().count())
                .unwrap_or(0),
            meta_description,
            canonical_url: links.canonical,
            robots_meta: meta.robots,
            x_robots_tag: page.headers.x_robots_tag.clone(),
            headings: Self::count_headings(&document),
            h1_text: Self::extract_first_h1(&document),
            lang: Self::extract_lang(&document),
            has_hreflang: links.has_hreflang,
            has_viewport: meta.has_viewport,
            has_favicon: links.has_favicon,
            analytics_tool: detect_analytics(&page.html),
            iframe_count: Self::count_iframes(&document),
            uses_flash: Self::detect_flash(&document),
            social_links: anchors.social,
            charset: meta
                .charset
                .or_else(|| page.headers.content_type.as_deref().and_then(charset_from_content_type)),
            content_excerpt: body_text.chars().take(CONTENT_EXCERPT_CHARS).collect(),
            word_count,
            images_total,
            images_missing_alt,
            internal_links: anchors.internal,
            external_links: anchors.external,
            has_open_graph: meta.has_open_graph,
            has_twitter_card: meta.has_twitter_card,
            schema_types: Self::extract_schema_types(&document),
            html_size_bytes: page.html.len() as u64,
            server: page.headers.server.clone(),
            powered_by: page.headers.x_powered_by.clone(),
            security_headers: None,
            performance: None,
            assets: None,
        }
    }

    pub fn extract_title(html: &Html) -> Option<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        html.select(selector(&SELECTOR, "title"))
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn extract_first_h1(html: &Html) -> Option<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        html.select(selector(&SELECTOR, "h1"))
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
            .filter(|s| !s.is_empty())
    }

    fn extract_lang(html: &Html) -> Option<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        html.select(selector(&SELECTOR, "html"))
            .next()
            .and_then(|el| el.value().attr("lang"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn count_headings(html: &Html) -> HeadingCounts {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let mut counts = HeadingCounts::default();
        for element in html.select(selector(&SELECTOR, "h1, h2, h3, h4, h5, h6")) {
            if let Ok(level) = element.value().name().trim_start_matches('h').parse::<u8>() {
                counts.bump(level);
            }
        }
        counts
    }

    fn count_iframes(html: &Html) -> u32 {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        html.select(selector(&SELECTOR, "iframe")).count() as u32
    }

    /// Visible body text collapsed to single spaces, plus its word count.
    fn extract_body_text(html: &Html) -> (String, u32) {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let Some(body) = html.select(selector(&SELECTOR, "body")).next() else {
            return (String::new(), 0);
        };

        let mut raw = String::new();
        for node in body.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .map(|e| matches!(e.name(), "script" | "style" | "noscript" | "template"))
                    .unwrap_or(false)
            });
            if !hidden {
                raw.push_str(text);
                raw.push(' ');
            }
        }

        let collapsed = collapse_whitespace(&raw);
        let words = collapsed.split_whitespace().count() as u32;
        (collapsed, words)
    }

    fn count_images(html: &Html) -> (u32, u32) {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let mut total = 0;
        let mut missing_alt = 0;
        for img in html.select(selector(&SELECTOR, "img")) {
            total += 1;
            if img.value().attr("alt").map(|a| a.trim().is_empty()).unwrap_or(true) {
                missing_alt += 1;
            }
        }
        (total, missing_alt)
    }

    fn scan_anchors(html: &Html, page_host: Option<&str>) -> AnchorScan {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let mut scan = AnchorScan::default();

        for element in html.select(selector(&SELECTOR, "a[href]")) {
            let Some(href) = element.value().attr("href").map(str::trim) else {
                continue;
            };
            if href.is_empty() || href.starts_with('#') {
                continue;
            }

            if is_internal_href(href, page_host) {
                scan.internal += 1;
            } else {
                scan.external += 1;
            }
            scan.record_social(href);
        }
        scan
    }

    fn scan_meta(html: &Html) -> MetaScan {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let mut scan = MetaScan::default();

        for element in html.select(selector(&SELECTOR, "meta")) {
            let el = element.value();
            if scan.charset.is_none() {
                if let Some(charset) = el.attr("charset").map(str::trim).filter(|c| !c.is_empty()) {
                    scan.charset = Some(charset.to_string());
                }
            }

            let name = el.attr("name").map(|n| n.trim().to_ascii_lowercase());
            let property = el.attr("property").map(|p| p.trim().to_ascii_lowercase());
            let content = el.attr("content").map(|c| c.trim().to_string());

            match name.as_deref() {
                Some("description") if scan.description.is_none() => scan.description = content.clone(),
                Some("robots") if scan.robots.is_none() => scan.robots = content.clone(),
                Some("viewport") => scan.has_viewport = true,
                Some(n) if n.starts_with("twitter:") => scan.has_twitter_card = true,
                _ => {}
            }

            if let Some(p) = property.as_deref() {
                if p.starts_with("og:") {
                    scan.has_open_graph = true;
                } else if p.starts_with("twitter:") {
                    scan.has_twitter_card = true;
                }
            }
        }
        scan
    }

    fn scan_link_tags(html: &Html) -> LinkTagScan {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let mut scan = LinkTagScan::default();

        for element in html.select(selector(&SELECTOR, "link[rel]")) {
            let el = element.value();
            let rel = el.attr("rel").unwrap_or("").to_ascii_lowercase();
            let rels: Vec<&str> = rel.split_whitespace().collect();

            if rels.contains(&"canonical") && scan.canonical.is_none() {
                scan.canonical = el
                    .attr("href")
                    .map(|h| h.trim().to_string())
                    .filter(|h| !h.is_empty());
            }
            if rels.contains(&"alternate") && el.attr("hreflang").is_some() {
                scan.has_hreflang = true;
            }
            if rels.iter().any(|r| r.contains("icon")) {
                scan.has_favicon = true;
            }
        }
        scan
    }

    fn detect_flash(html: &Html) -> bool {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        html.select(selector(&SELECTOR, "object, embed")).any(|element| {
            let el = element.value();
            let flash_type = el
                .attr("type")
                .map(|t| t.to_ascii_lowercase().contains("shockwave-flash"))
                .unwrap_or(false);
            let swf_source = ["data", "src"]
                .iter()
                .filter_map(|attr| el.attr(attr))
                .any(|src| src.to_ascii_lowercase().split(['?', '#']).next().unwrap_or("").ends_with(".swf"));
            flash_type || swf_source
        })
    }

    /// `@type` values from every JSON-LD block. A block that fails to parse
    /// is skipped on its own.
    pub fn extract_schema_types(html: &Html) -> Vec<String> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let mut types: Vec<String> = Vec::new();

        for script in html.select(selector(&SELECTOR, r#"script[type="application/ld+json"]"#)) {
            let raw = script.text().collect::<String>();
            let value: serde_json::Value = match serde_json::from_str(raw.trim()) {
                Ok(v) => v,
                Err(e) => {
                    tracing::debug!("Skipping unparsable JSON-LD block: {}", e);
                    continue;
                }
            };

            let roots: Vec<&serde_json::Value> = match &value {
                serde_json::Value::Array(items) => items.iter().collect(),
                other => vec![other],
            };
            for root in roots {
                collect_types(root, &mut types);
                if let Some(graph) = root.get("@graph").and_then(|g| g.as_array()) {
                    for item in graph {
                        collect_types(item, &mut types);
                    }
                }
            }
        }
        types
    }
}

#[derive(Default)]
struct AnchorScan {
    internal: u32,
    external: u32,
    social: SocialLinks,
}

impl AnchorScan {
    fn record_social(&mut self, href: &str) {
        let lower = href.to_ascii_lowercase();
        let platforms: [(&mut Option<String>, &[&str]); 5] = [
            (&mut self.social.facebook, FACEBOOK_DOMAINS),
            (&mut self.social.twitter, TWITTER_DOMAINS),
            (&mut self.social.instagram, INSTAGRAM_DOMAINS),
            (&mut self.social.linkedin, LINKEDIN_DOMAINS),
            (&mut self.social.youtube, YOUTUBE_DOMAINS),
        ];
        for (slot, domains) in platforms {
            if slot.is_none() && domains.iter().any(|d| lower.contains(d)) {
                *slot = Some(href.to_string());
            }
        }
    }
}

#[derive(Default)]
struct MetaScan {
    description: Option<String>,
    robots: Option<String>,
    charset: Option<String>,
    has_viewport: bool,
    has_open_graph: bool,
    has_twitter_card: bool,
}

#[derive(Default)]
struct LinkTagScan {
    canonical: Option<String>,
    has_hreflang: bool,
    has_favicon: bool,
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_www(host: &str) -> String {
    let lower = host.to_ascii_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

/// Relative and host-less hrefs are internal; otherwise the www-stripped
/// host must match the page host.
fn is_internal_href(href: &str, page_host: Option<&str>) -> bool {
    let candidate = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };
    match Url::parse(&candidate).ok().and_then(|u| u.host_str().map(strip_www)) {
        None => true,
        Some(host) => Some(host.as_str()) == page_host,
    }
}

fn detect_analytics(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    ANALYTICS_SIGNATURES
        .iter()
        .find(|(signature, _)| lower.contains(&signature.to_ascii_lowercase()))
        .map(|(_, tool)| tool.to_string())
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        regex::Regex::new(r#"(?i)charset\s*=\s*["']?([^;"'\s]+)"#).unwrap()
    });
    pattern
        .captures(content_type)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn collect_types(node: &serde_json::Value, types: &mut Vec<String>) {
    let mut push = |t: &str| {
        if !t.is_empty() && !types.iter().any(|existing| existing == t) {
            types.push(t.to_string());
        }
    };
    match node.get("@type") {
        Some(serde_json::Value::String(t)) => push(t),
        Some(serde_json::Value::Array(items)) => {
            for t in items.iter().filter_map(|i| i.as_str()) {
                push(t);
            }
        }
        _ => {}
    }
}
