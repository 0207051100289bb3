//! Recommendation text and fix steps per issue code.

pub struct Remediation {
    pub recommendation: &'static str,
    pub fix_steps: &'static [&'static str],
}

const fn fix(recommendation: &'static str, fix_steps: &'static [&'static str]) -> Remediation {
    Remediation {
        recommendation,
        fix_steps,
    }
}

const GENERIC: Remediation = fix(
    "Review the affected pages and resolve the reported problem.",
    &["Open the affected URLs", "Fix the reported problem", "Re-run the audit"],
);

/// Look up remediation for `code`. Unknown codes get a generic entry.
pub fn lookup(code: &str) -> &'static Remediation {
    find(code).unwrap_or(&GENERIC)
}

static REMEDIATIONS: &[(&str, Remediation)] = &[
    (
        "ONPAGE_TITLE_MISSING",
        fix(
            "Add a unique, descriptive <title> to every page.",
            &[
                "Add a <title> element inside <head>",
                "Describe the page content in 30 to 60 characters",
                "Put the primary keyword near the start",
            ],
        ),
    ),
    (
        "ONPAGE_TITLE_TOO_SHORT",
        fix(
            "Expand the title so it describes the page.",
            &[
                "Lengthen the title to at least 30 characters",
                "Include the primary keyword and the brand name",
            ],
        ),
    ),
    (
        "ONPAGE_TITLE_TOO_LONG",
        fix(
            "Shorten the title so it is not truncated in search results.",
            &[
                "Keep the title under 60 characters",
                "Move secondary words to the meta description",
            ],
        ),
    ),
    (
        "ONPAGE_META_DESCRIPTION_MISSING",
        fix(
            "Write a meta description that summarizes the page.",
            &[
                "Add <meta name=\"description\" content=\"...\"> inside <head>",
                "Aim for 70 to 160 characters",
                "End with a clear call to action",
            ],
        ),
    ),
    (
        "ONPAGE_META_DESCRIPTION_TOO_SHORT",
        fix(
            "Expand the meta description.",
            &["Lengthen the description to at least 70 characters"],
        ),
    ),
    (
        "ONPAGE_META_DESCRIPTION_TOO_LONG",
        fix(
            "Shorten the meta description.",
            &["Keep the description under 160 characters"],
        ),
    ),
    (
        "ONPAGE_H1_MISSING",
        fix(
            "Give every page one H1 heading.",
            &[
                "Add an <h1> describing the main topic",
                "Keep it close to the title wording",
            ],
        ),
    ),
    (
        "ONPAGE_H1_MULTIPLE",
        fix(
            "Use a single H1 per page.",
            &[
                "Keep the most important heading as <h1>",
                "Demote the others to <h2> or lower",
            ],
        ),
    ),
    (
        "ONPAGE_LOW_WORD_COUNT",
        fix(
            "Add more useful content to the page.",
            &[
                "Expand the copy to at least 300 words",
                "Answer the questions visitors arrive with",
            ],
        ),
    ),
    (
        "ONPAGE_IMAGES_MISSING_ALT",
        fix(
            "Describe every meaningful image with alt text.",
            &[
                "Add an alt attribute to each <img>",
                "Use alt=\"\" only for decorative images",
            ],
        ),
    ),
    (
        "ONPAGE_DUPLICATE_TITLES",
        fix(
            "Make every page title unique.",
            &[
                "List the pages sharing a title",
                "Rewrite each title around that page's own topic",
            ],
        ),
    ),
    (
        "ONPAGE_DUPLICATE_META_DESCRIPTIONS",
        fix(
            "Write a distinct meta description for each page.",
            &[
                "List the pages sharing a description",
                "Summarize each page in its own words",
            ],
        ),
    ),
    (
        "ONPAGE_THIN_CONTENT",
        fix(
            "Expand, merge or remove thin pages.",
            &[
                "Review each page with fewer than 300 words",
                "Expand valuable pages and merge overlapping ones",
                "Noindex or remove pages with no search value",
            ],
        ),
    ),
    (
        "TECHNICAL_HTTPS_NOT_ENFORCED",
        fix(
            "Serve every page over HTTPS.",
            &[
                "Install a TLS certificate",
                "Redirect all HTTP requests to HTTPS with a 301",
                "Update internal links to https:// URLs",
            ],
        ),
    ),
    (
        "TECHNICAL_HTTP_ERROR_STATUS",
        fix(
            "Fix or redirect pages returning error status codes.",
            &[
                "Restore the page or 301-redirect it to a relevant one",
                "Remove internal links pointing to it",
            ],
        ),
    ),
    (
        "TECHNICAL_NOINDEX",
        fix(
            "Remove noindex from pages that should appear in search.",
            &[
                "Check the robots meta tag and the X-Robots-Tag header",
                "Drop noindex unless the page is meant to stay hidden",
            ],
        ),
    ),
    (
        "TECHNICAL_CANONICAL_MISSING",
        fix(
            "Declare a canonical URL.",
            &["Add <link rel=\"canonical\" href=\"...\"> pointing to the preferred URL"],
        ),
    ),
    (
        "TECHNICAL_LANG_MISSING",
        fix(
            "Declare the page language.",
            &["Add a lang attribute to the <html> element, e.g. lang=\"en\""],
        ),
    ),
    (
        "TECHNICAL_CHARSET_MISSING",
        fix(
            "Declare the character encoding.",
            &["Add <meta charset=\"utf-8\"> as the first element in <head>"],
        ),
    ),
    (
        "TECHNICAL_STRUCTURED_DATA_MISSING",
        fix(
            "Add schema.org structured data.",
            &[
                "Pick the schema type that fits the page",
                "Embed it as an application/ld+json script",
                "Validate it with a structured data testing tool",
            ],
        ),
    ),
    (
        "TECHNICAL_FLASH_USED",
        fix(
            "Replace Flash content.",
            &["Rebuild the content with HTML5 video, canvas or SVG"],
        ),
    ),
    (
        "TECHNICAL_HTML_TOO_LARGE",
        fix(
            "Reduce the HTML document size.",
            &[
                "Move inline scripts and styles to external files",
                "Paginate or lazy-load long lists",
            ],
        ),
    ),
    (
        "TECHNICAL_ANALYTICS_MISSING",
        fix(
            "Install an analytics tool.",
            &["Add Google Analytics, Google Tag Manager or an equivalent snippet"],
        ),
    ),
    (
        "TECHNICAL_REDIRECT_CHAINS",
        fix(
            "Collapse redirect chains into a single hop.",
            &[
                "Point each redirect straight at the final URL",
                "Update internal links to the final URL",
            ],
        ),
    ),
    (
        "USABILITY_VIEWPORT_MISSING",
        fix(
            "Make the page mobile friendly.",
            &["Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"],
        ),
    ),
    (
        "USABILITY_FAVICON_MISSING",
        fix(
            "Add a favicon.",
            &["Add <link rel=\"icon\" href=\"/favicon.ico\"> to <head>"],
        ),
    ),
    (
        "USABILITY_IFRAMES_USED",
        fix(
            "Avoid placing important content inside iframes.",
            &["Inline the framed content where it matters for search"],
        ),
    ),
    (
        "SOCIAL_OPEN_GRAPH_MISSING",
        fix(
            "Add Open Graph tags for link previews.",
            &["Add og:title, og:description, og:image and og:url meta tags"],
        ),
    ),
    (
        "SOCIAL_TWITTER_CARD_MISSING",
        fix(
            "Add Twitter card tags.",
            &["Add twitter:card, twitter:title and twitter:image meta tags"],
        ),
    ),
    (
        "SOCIAL_PROFILES_MISSING",
        fix(
            "Link to your social media profiles.",
            &["Add profile links to the header or footer"],
        ),
    ),
    (
        "LINKS_NO_INTERNAL_LINKS",
        fix(
            "Link the page to related pages on the site.",
            &["Add contextual links to relevant internal pages"],
        ),
    ),
    (
        "LINKS_TOO_MANY_EXTERNAL",
        fix(
            "Reduce the number of outbound links.",
            &["Keep only external links that help the reader"],
        ),
    ),
    (
        "LINKS_BROKEN_INTERNAL",
        fix(
            "Fix broken internal links.",
            &[
                "Update each link to a working URL",
                "Redirect removed pages to their replacement",
            ],
        ),
    ),
    (
        "LINKS_ORPHAN_PAGES",
        fix(
            "Link to orphan pages from the rest of the site.",
            &[
                "Add links from relevant pages or navigation",
                "Remove pages from the sitemap if they are obsolete",
            ],
        ),
    ),
    (
        "LOCAL_BUSINESS_SCHEMA_MISSING",
        fix(
            "Describe your business with structured data.",
            &["Add LocalBusiness or Organization JSON-LD with name, address and phone"],
        ),
    ),
    (
        "PERFORMANCE_MOBILE_LCP_SLOW",
        fix(
            "Speed up the largest element on mobile.",
            &[
                "Compress and resize the hero image",
                "Preload the LCP resource",
                "Reduce server response time",
            ],
        ),
    ),
    (
        "PERFORMANCE_DESKTOP_LCP_SLOW",
        fix(
            "Speed up the largest element on desktop.",
            &["Preload the LCP resource", "Serve images in modern formats"],
        ),
    ),
    (
        "PERFORMANCE_MOBILE_TBT_HIGH",
        fix(
            "Reduce main-thread work on mobile.",
            &[
                "Split long JavaScript tasks",
                "Defer non-critical scripts",
            ],
        ),
    ),
    (
        "PERFORMANCE_PAGE_WEIGHT_HEAVY",
        fix(
            "Reduce total page weight.",
            &[
                "Compress images and serve WebP or AVIF",
                "Minify and compress CSS and JavaScript",
            ],
        ),
    ),
    (
        "PERFORMANCE_LARGE_IMAGES",
        fix(
            "Compress oversized images.",
            &[
                "Resize images to their display size",
                "Keep each image under 200 KB",
            ],
        ),
    ),
    (
        "PERFORMANCE_UNUSED_JAVASCRIPT",
        fix(
            "Remove unused JavaScript.",
            &["Code-split bundles and drop unused dependencies"],
        ),
    ),
    (
        "PERFORMANCE_UNUSED_CSS",
        fix(
            "Remove unused CSS.",
            &["Purge unused selectors and inline critical CSS"],
        ),
    ),
    (
        "PERFORMANCE_RENDER_BLOCKING",
        fix(
            "Eliminate render-blocking resources.",
            &[
                "Add defer or async to scripts",
                "Inline critical CSS and load the rest asynchronously",
            ],
        ),
    ),
    (
        "SECURITY_HSTS_MISSING",
        fix(
            "Enable HTTP Strict Transport Security.",
            &["Send Strict-Transport-Security: max-age=31536000; includeSubDomains"],
        ),
    ),
    (
        "SECURITY_X_FRAME_OPTIONS_MISSING",
        fix(
            "Prevent clickjacking.",
            &["Send X-Frame-Options: SAMEORIGIN"],
        ),
    ),
    (
        "SECURITY_X_CONTENT_TYPE_OPTIONS_MISSING",
        fix(
            "Disable MIME sniffing.",
            &["Send X-Content-Type-Options: nosniff"],
        ),
    ),
    (
        "SECURITY_CSP_MISSING",
        fix(
            "Add a Content-Security-Policy.",
            &[
                "Start with a report-only policy",
                "Tighten script-src and style-src once reports are clean",
            ],
        ),
    ),
];

fn find(code: &str) -> Option<&'static Remediation> {
    REMEDIATIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, remediation)| remediation)
}
