//! The rule catalog: issue metadata plus the predicates that trigger it.
//!
//! Page rules carry a fixed penalty and a predicate over [`PageSignals`].
//! Collection and telemetry issues are synthesized by the engine; their
//! metadata lives here too so every issue code is declared in one place.

use crate::domain::models::{Effort, Impact, PageSignals};
use crate::domain::Category;

/// Static description of an issue kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueTemplate {
    pub code: &'static str,
    pub category: Category,
    pub title: &'static str,
    pub description: &'static str,
    pub impact: Impact,
    pub effort: Effort,
}

/// A page-level rule.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub template: IssueTemplate,
    pub penalty: u32,
    pub predicate: fn(&PageSignals) -> bool,
}

pub const TITLE_MIN_CHARS: usize = 30;
pub const TITLE_MAX_CHARS: usize = 60;
pub const META_DESCRIPTION_MIN_CHARS: usize = 70;
pub const META_DESCRIPTION_MAX_CHARS: usize = 160;
pub const THIN_CONTENT_WORDS: u32 = 300;
pub const MAX_EXTERNAL_LINKS: u32 = 100;
pub const MAX_HTML_BYTES: u64 = 500 * 1024;

pub const LOCAL_SCHEMA_TYPES: &[&str] = &["LocalBusiness", "Organization"];

const fn template(
    code: &'static str,
    category: Category,
    title: &'static str,
    description: &'static str,
    impact: Impact,
    effort: Effort,
) -> IssueTemplate {
    IssueTemplate {
        code,
        category,
        title,
        description,
        impact,
        effort,
    }
}

const fn rule(template: IssueTemplate, penalty: u32, predicate: fn(&PageSignals) -> bool) -> Rule {
    Rule {
        template,
        penalty,
        predicate,
    }
}

pub(crate) fn is_thin(word_count: u32) -> bool {
    word_count > 0 && word_count < THIN_CONTENT_WORDS
}

pub static PAGE_RULES: &[Rule] = &[
    // ---- on-page ----
    rule(
        template(
            "ONPAGE_TITLE_MISSING",
            Category::Onpage,
            "Missing title tag",
            "The page has no title or the title is empty.",
            Impact::High,
            Effort::Easy,
        ),
        15,
        |p| p.title.as_deref().map(|t| t.trim().is_empty()).unwrap_or(true),
    ),
    rule(
        template(
            "ONPAGE_TITLE_TOO_SHORT",
            Category::Onpage,
            "Title too short",
            "The title is shorter than 30 characters.",
            Impact::Low,
            Effort::Easy,
        ),
        5,
        |p| p.title_length > 0 && p.title_length < TITLE_MIN_CHARS,
    ),
    rule(
        template(
            "ONPAGE_TITLE_TOO_LONG",
            Category::Onpage,
            "Title too long",
            "The title is longer than 60 characters and will be truncated in results.",
            Impact::Low,
            Effort::Easy,
        ),
        5,
        |p| p.title_length > TITLE_MAX_CHARS,
    ),
    rule(
        template(
            "ONPAGE_META_DESCRIPTION_MISSING",
            Category::Onpage,
            "Missing meta description",
            "The page has no meta description.",
            Impact::Medium,
            Effort::Easy,
        ),
        10,
        |p| p.meta_description.as_deref().map(|d| d.trim().is_empty()).unwrap_or(true),
    ),
    rule(
        template(
            "ONPAGE_META_DESCRIPTION_TOO_SHORT",
            Category::Onpage,
            "Meta description too short",
            "The meta description is shorter than 70 characters.",
            Impact::Low,
            Effort::Easy,
        ),
        3,
        |p| p.meta_description_length > 0 && p.meta_description_length < META_DESCRIPTION_MIN_CHARS,
    ),
    rule(
        template(
            "ONPAGE_META_DESCRIPTION_TOO_LONG",
            Category::Onpage,
            "Meta description too long",
            "The meta description is longer than 160 characters.",
            Impact::Low,
            Effort::Easy,
        ),
        3,
        |p| p.meta_description_length > META_DESCRIPTION_MAX_CHARS,
    ),
    rule(
        template(
            "ONPAGE_H1_MISSING",
            Category::Onpage,
            "Missing H1 heading",
            "The page has no H1 heading.",
            Impact::High,
            Effort::Easy,
        ),
        10,
        |p| p.headings.h1 == 0,
    ),
    rule(
        template(
            "ONPAGE_H1_MULTIPLE",
            Category::Onpage,
            "Multiple H1 headings",
            "The page has more than one H1 heading.",
            Impact::Low,
            Effort::Easy,
        ),
        5,
        |p| p.headings.h1 > 1,
    ),
    rule(
        template(
            "ONPAGE_LOW_WORD_COUNT",
            Category::Onpage,
            "Low word count",
            "The page has fewer than 300 words of visible text.",
            Impact::Medium,
            Effort::Medium,
        ),
        8,
        |p| is_thin(p.word_count),
    ),
    rule(
        template(
            "ONPAGE_IMAGES_MISSING_ALT",
            Category::Onpage,
            "Images missing alt text",
            "One or more images have no alt attribute.",
            Impact::Medium,
            Effort::Easy,
        ),
        5,
        |p| p.images_missing_alt > 0,
    ),
    // ---- technical ----
    rule(
        template(
            "TECHNICAL_HTTPS_NOT_ENFORCED",
            Category::Technical,
            "HTTPS not enforced",
            "The page is served over plain HTTP.",
            Impact::High,
            Effort::Medium,
        ),
        15,
        |p| !p.is_https(),
    ),
    rule(
        template(
            "TECHNICAL_HTTP_ERROR_STATUS",
            Category::Technical,
            "HTTP error status",
            "The page responded with a 4xx or 5xx status code.",
            Impact::High,
            Effort::Medium,
        ),
        20,
        |p| p.status_code >= 400,
    ),
    rule(
        template(
            "TECHNICAL_NOINDEX",
            Category::Technical,
            "Page blocked from indexing",
            "A robots meta tag or X-Robots-Tag header contains noindex.",
            Impact::High,
            Effort::Easy,
        ),
        10,
        |p| p.is_noindex(),
    ),
    rule(
        template(
            "TECHNICAL_CANONICAL_MISSING",
            Category::Technical,
            "Missing canonical URL",
            "The page does not declare a canonical URL.",
            Impact::Medium,
            Effort::Easy,
        ),
        5,
        |p| p.canonical_url.is_none(),
    ),
    rule(
        template(
            "TECHNICAL_LANG_MISSING",
            Category::Technical,
            "Missing language attribute",
            "The html element has no lang attribute.",
            Impact::Low,
            Effort::Easy,
        ),
        3,
        |p| p.lang.is_none(),
    ),
    rule(
        template(
            "TECHNICAL_CHARSET_MISSING",
            Category::Technical,
            "Missing character set",
            "No character encoding is declared in the markup or the Content-Type header.",
            Impact::Low,
            Effort::Easy,
        ),
        2,
        |p| p.charset.is_none(),
    ),
    rule(
        template(
            "TECHNICAL_STRUCTURED_DATA_MISSING",
            Category::Technical,
            "No structured data",
            "The page has no schema.org JSON-LD markup.",
            Impact::Low,
            Effort::Medium,
        ),
        5,
        |p| p.schema_types.is_empty(),
    ),
    rule(
        template(
            "TECHNICAL_FLASH_USED",
            Category::Technical,
            "Flash content",
            "The page embeds Flash content, which browsers no longer run.",
            Impact::Medium,
            Effort::Hard,
        ),
        10,
        |p| p.uses_flash,
    ),
    rule(
        template(
            "TECHNICAL_HTML_TOO_LARGE",
            Category::Technical,
            "Large HTML document",
            "The HTML document is larger than 500 KB.",
            Impact::Low,
            Effort::Medium,
        ),
        5,
        |p| p.html_size_bytes > MAX_HTML_BYTES,
    ),
    rule(
        template(
            "TECHNICAL_ANALYTICS_MISSING",
            Category::Technical,
            "No analytics detected",
            "No known analytics or tag manager snippet was found.",
            Impact::Low,
            Effort::Easy,
        ),
        2,
        |p| p.analytics_tool.is_none(),
    ),
    // ---- usability ----
    rule(
        template(
            "USABILITY_VIEWPORT_MISSING",
            Category::Usability,
            "Missing viewport meta tag",
            "Without a viewport declaration the page does not adapt to mobile screens.",
            Impact::High,
            Effort::Easy,
        ),
        10,
        |p| !p.has_viewport,
    ),
    rule(
        template(
            "USABILITY_FAVICON_MISSING",
            Category::Usability,
            "Missing favicon",
            "The page does not reference a favicon.",
            Impact::Low,
            Effort::Easy,
        ),
        3,
        |p| !p.has_favicon,
    ),
    rule(
        template(
            "USABILITY_IFRAMES_USED",
            Category::Usability,
            "Iframes in use",
            "Content inside iframes is not attributed to the page.",
            Impact::Low,
            Effort::Medium,
        ),
        3,
        |p| p.iframe_count > 0,
    ),
    // ---- social ----
    rule(
        template(
            "SOCIAL_OPEN_GRAPH_MISSING",
            Category::Social,
            "Missing Open Graph tags",
            "The page has no og: meta tags for social sharing previews.",
            Impact::Medium,
            Effort::Easy,
        ),
        5,
        |p| !p.has_open_graph,
    ),
    rule(
        template(
            "SOCIAL_TWITTER_CARD_MISSING",
            Category::Social,
            "Missing Twitter card",
            "The page has no twitter: meta tags.",
            Impact::Low,
            Effort::Easy,
        ),
        3,
        |p| !p.has_twitter_card,
    ),
    rule(
        template(
            "SOCIAL_PROFILES_MISSING",
            Category::Social,
            "No social profile links",
            "The page links to none of the major social platforms.",
            Impact::Low,
            Effort::Easy,
        ),
        2,
        |p| p.social_links.is_empty(),
    ),
    // ---- links ----
    rule(
        template(
            "LINKS_NO_INTERNAL_LINKS",
            Category::Links,
            "No internal links",
            "The page does not link to any other page on the site.",
            Impact::Medium,
            Effort::Medium,
        ),
        5,
        |p| p.internal_links == 0,
    ),
    rule(
        template(
            "LINKS_TOO_MANY_EXTERNAL",
            Category::Links,
            "Too many external links",
            "The page has more than 100 external links.",
            Impact::Low,
            Effort::Medium,
        ),
        3,
        |p| p.external_links > MAX_EXTERNAL_LINKS,
    ),
    // ---- local ----
    rule(
        template(
            "LOCAL_BUSINESS_SCHEMA_MISSING",
            Category::Local,
            "No business schema",
            "No LocalBusiness or Organization structured data was found.",
            Impact::Low,
            Effort::Medium,
        ),
        3,
        |p| !p.schema_types.iter().any(|t| LOCAL_SCHEMA_TYPES.contains(&t.as_str())),
    ),
];

// ---- collection-level issues ----

pub const BROKEN_INTERNAL_LINKS: IssueTemplate = template(
    "LINKS_BROKEN_INTERNAL",
    Category::Links,
    "Broken internal links",
    "Internal links point to pages that return an error.",
    Impact::High,
    Effort::Medium,
);

pub const REDIRECT_CHAINS: IssueTemplate = template(
    "TECHNICAL_REDIRECT_CHAINS",
    Category::Technical,
    "Redirect chains",
    "Links pass through two or more redirects before reaching their target.",
    Impact::Medium,
    Effort::Medium,
);

pub const DUPLICATE_TITLES: IssueTemplate = template(
    "ONPAGE_DUPLICATE_TITLES",
    Category::Onpage,
    "Duplicate titles",
    "Several pages share the same title.",
    Impact::Medium,
    Effort::Easy,
);

pub const DUPLICATE_META_DESCRIPTIONS: IssueTemplate = template(
    "ONPAGE_DUPLICATE_META_DESCRIPTIONS",
    Category::Onpage,
    "Duplicate meta descriptions",
    "Several pages share the same meta description.",
    Impact::Low,
    Effort::Easy,
);

pub const THIN_CONTENT: IssueTemplate = template(
    "ONPAGE_THIN_CONTENT",
    Category::Onpage,
    "Thin content across the site",
    "Pages with fewer than 300 words were found across the site.",
    Impact::Medium,
    Effort::Hard,
);

pub const ORPHAN_PAGES: IssueTemplate = template(
    "LINKS_ORPHAN_PAGES",
    Category::Links,
    "Orphan pages",
    "Pages listed in the sitemap were not reached by crawling internal links.",
    Impact::Medium,
    Effort::Medium,
);

// ---- performance and security issues ----

pub const MOBILE_LCP_SLOW: IssueTemplate = template(
    "PERFORMANCE_MOBILE_LCP_SLOW",
    Category::Performance,
    "Slow mobile LCP",
    "Largest Contentful Paint on mobile exceeds 4 seconds.",
    Impact::High,
    Effort::Hard,
);

pub const DESKTOP_LCP_SLOW: IssueTemplate = template(
    "PERFORMANCE_DESKTOP_LCP_SLOW",
    Category::Performance,
    "Slow desktop LCP",
    "Largest Contentful Paint on desktop exceeds 2.5 seconds.",
    Impact::Medium,
    Effort::Hard,
);

pub const MOBILE_TBT_HIGH: IssueTemplate = template(
    "PERFORMANCE_MOBILE_TBT_HIGH",
    Category::Performance,
    "High mobile blocking time",
    "Total Blocking Time on mobile exceeds 600 ms.",
    Impact::Medium,
    Effort::Hard,
);

pub const PAGE_WEIGHT_HEAVY: IssueTemplate = template(
    "PERFORMANCE_PAGE_WEIGHT_HEAVY",
    Category::Performance,
    "Heavy page weight",
    "The page loads more than 5 MB of assets.",
    Impact::Medium,
    Effort::Medium,
);

pub const LARGE_IMAGES: IssueTemplate = template(
    "PERFORMANCE_LARGE_IMAGES",
    Category::Performance,
    "Oversized images",
    "Images larger than 200 KB slow down page rendering.",
    Impact::Medium,
    Effort::Easy,
);

pub const UNUSED_JAVASCRIPT: IssueTemplate = template(
    "PERFORMANCE_UNUSED_JAVASCRIPT",
    Category::Performance,
    "Unused JavaScript",
    "The page ships JavaScript that is never executed.",
    Impact::Medium,
    Effort::Medium,
);

pub const UNUSED_CSS: IssueTemplate = template(
    "PERFORMANCE_UNUSED_CSS",
    Category::Performance,
    "Unused CSS",
    "The page ships CSS rules that never apply.",
    Impact::Low,
    Effort::Medium,
);

pub const RENDER_BLOCKING: IssueTemplate = template(
    "PERFORMANCE_RENDER_BLOCKING",
    Category::Performance,
    "Render-blocking resources",
    "Scripts or stylesheets delay the first paint.",
    Impact::High,
    Effort::Medium,
);

pub const HSTS_MISSING: IssueTemplate = template(
    "SECURITY_HSTS_MISSING",
    Category::Security,
    "Missing HSTS header",
    "The Strict-Transport-Security header is not set.",
    Impact::Medium,
    Effort::Easy,
);

pub const X_FRAME_OPTIONS_MISSING: IssueTemplate = template(
    "SECURITY_X_FRAME_OPTIONS_MISSING",
    Category::Security,
    "Missing X-Frame-Options header",
    "The page can be framed by other sites.",
    Impact::Medium,
    Effort::Easy,
);

pub const X_CONTENT_TYPE_OPTIONS_MISSING: IssueTemplate = template(
    "SECURITY_X_CONTENT_TYPE_OPTIONS_MISSING",
    Category::Security,
    "Missing X-Content-Type-Options header",
    "Browsers may MIME-sniff responses.",
    Impact::Low,
    Effort::Easy,
);

pub const CSP_MISSING: IssueTemplate = template(
    "SECURITY_CSP_MISSING",
    Category::Security,
    "Missing Content-Security-Policy header",
    "No Content-Security-Policy restricts where scripts may load from.",
    Impact::Medium,
    Effort::Medium,
);

/// Every synthesized issue kind, for catalog-wide checks.
pub const SYNTHETIC_TEMPLATES: &[IssueTemplate] = &[
    BROKEN_INTERNAL_LINKS,
    REDIRECT_CHAINS,
    DUPLICATE_TITLES,
    DUPLICATE_META_DESCRIPTIONS,
    THIN_CONTENT,
    ORPHAN_PAGES,
    MOBILE_LCP_SLOW,
    DESKTOP_LCP_SLOW,
    MOBILE_TBT_HIGH,
    PAGE_WEIGHT_HEAVY,
    LARGE_IMAGES,
    UNUSED_JAVASCRIPT,
    UNUSED_CSS,
    RENDER_BLOCKING,
    HSTS_MISSING,
    X_FRAME_OPTIONS_MISSING,
    X_CONTENT_TYPE_OPTIONS_MISSING,
    CSP_MISSING,
];

pub fn all_templates() -> impl Iterator<Item = &'static IssueTemplate> {
    PAGE_RULES
        .iter()
        .map(|r| &r.template)
        .chain(SYNTHETIC_TEMPLATES.iter())
}
