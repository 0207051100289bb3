//! Performance and security checks fed by lab metrics, asset sizes and
//! response headers.

use crate::domain::models::{LabMetrics, Opportunities, PageSignals};
use crate::domain::Category;

use super::catalog::{self, IssueTemplate};
use super::{build_issue, Evaluation};

const MOBILE_LCP_LIMIT_MS: f64 = 4000.0;
const DESKTOP_LCP_LIMIT_MS: f64 = 2500.0;
const MOBILE_TBT_LIMIT_MS: f64 = 600.0;
const PAGE_WEIGHT_LIMIT_BYTES: u64 = 5 * 1024 * 1024;

/// Checks for one page. Absent data never raises an issue.
pub fn evaluate(page: &PageSignals) -> Evaluation {
    let mut evaluation = Evaluation::new();
    if page.performance.is_some() || page.assets.is_some() {
        evaluation.penalties.mark_evaluated(Category::Performance);
    }
    if page.security_headers.is_some() {
        evaluation.penalties.mark_evaluated(Category::Security);
    }
    let mut raise = |template: &IssueTemplate, penalty: u32| {
        evaluation.push(build_issue(template, penalty, 1, vec![page.url.clone()]));
    };

    let mobile = page.performance.as_ref().and_then(|p| p.mobile.as_ref());
    let desktop = page.performance.as_ref().and_then(|p| p.desktop.as_ref());

    if exceeds(mobile.and_then(|m| m.largest_contentful_paint_ms), MOBILE_LCP_LIMIT_MS) {
        raise(&catalog::MOBILE_LCP_SLOW, 15);
    }
    if exceeds(desktop.and_then(|d| d.largest_contentful_paint_ms), DESKTOP_LCP_LIMIT_MS) {
        raise(&catalog::DESKTOP_LCP_SLOW, 10);
    }
    if exceeds(mobile.and_then(|m| m.total_blocking_time_ms), MOBILE_TBT_LIMIT_MS) {
        raise(&catalog::MOBILE_TBT_HIGH, 10);
    }

    if let Some(assets) = page.assets.as_ref() {
        if assets.total_bytes() > PAGE_WEIGHT_LIMIT_BYTES {
            raise(&catalog::PAGE_WEIGHT_HEAVY, 10);
        }
        if assets.large_image_count > 0 {
            raise(
                &catalog::LARGE_IMAGES,
                assets.large_image_count.saturating_mul(2).min(15),
            );
        }
    }

    let opportunity = |pick: fn(&Opportunities) -> Option<f64>| {
        mobile
            .and_then(|m: &LabMetrics| pick(&m.opportunities))
            .or_else(|| desktop.and_then(|d| pick(&d.opportunities)))
    };
    if below_full_score(opportunity(|o| o.unused_javascript)) {
        raise(&catalog::UNUSED_JAVASCRIPT, 10);
    }
    if below_full_score(opportunity(|o| o.unused_css)) {
        raise(&catalog::UNUSED_CSS, 8);
    }
    if below_full_score(opportunity(|o| o.render_blocking)) {
        raise(&catalog::RENDER_BLOCKING, 12);
    }

    if let Some(headers) = page.security_headers.as_ref() {
        if headers.strict_transport_security.is_none() {
            raise(&catalog::HSTS_MISSING, 10);
        }
        if headers.x_frame_options.is_none() {
            raise(&catalog::X_FRAME_OPTIONS_MISSING, 8);
        }
        if headers.x_content_type_options.is_none() {
            raise(&catalog::X_CONTENT_TYPE_OPTIONS_MISSING, 5);
        }
        if headers.content_security_policy.is_none() {
            raise(&catalog::CSP_MISSING, 10);
        }
    }

    evaluation
}

fn exceeds(value: Option<f64>, limit: f64) -> bool {
    value.map(|v| v > limit).unwrap_or(false)
}

fn below_full_score(score: Option<f64>) -> bool {
    score.map(|s| s < 1.0).unwrap_or(false)
}
