//! Rule evaluation over extracted page signals.
//!
//! Three passes feed the same [`Evaluation`] shape:
//! page rules ([`RulesEngine::evaluate`]), site-wide collection checks
//! ([`RulesEngine::evaluate_collection`]) and telemetry checks
//! ([`RulesEngine::evaluate_telemetry`]).

pub mod catalog;
pub mod collection;
pub mod remediation;
pub mod telemetry;

use serde::{Deserialize, Serialize};

use crate::domain::models::{DiscoveredUrl, Issue, LinkEdge, PageSignals};
use crate::domain::CategoryPenalties;
use catalog::{IssueTemplate, PAGE_RULES};

/// Issues raised by one pass and the penalty they add per category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub issues: Vec<Issue>,
    pub penalties: CategoryPenalties,
}

impl Evaluation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.penalties.add(issue.category, issue.penalty);
        self.issues.push(issue);
    }

    /// Append another pass, summing penalties.
    pub fn merge(&mut self, other: Evaluation) {
        self.penalties.merge(&other.penalties);
        self.issues.extend(other.issues);
    }
}

/// Build an issue from catalog metadata plus its remediation text.
pub(crate) fn build_issue(
    template: &IssueTemplate,
    penalty: u32,
    affected_count: usize,
    sample_urls: Vec<String>,
) -> Issue {
    let remediation = remediation::lookup(template.code);
    Issue {
        code: template.code.to_string(),
        category: template.category,
        title: template.title.to_string(),
        description: template.description.to_string(),
        impact: template.impact,
        effort: template.effort,
        penalty,
        affected_count,
        sample_urls,
        recommendation: remediation.recommendation.to_string(),
        fix_steps: remediation.fix_steps.iter().map(|s| s.to_string()).collect(),
    }
}

#[derive(Debug, Clone)]
pub struct RulesEngine {
    workers: usize,
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

impl RulesEngine {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Run every page rule against one page. No rule short-circuits another.
    pub fn evaluate(&self, page: &PageSignals) -> Evaluation {
        let mut evaluation = Evaluation::new();
        for rule in PAGE_RULES {
            evaluation.penalties.mark_evaluated(rule.template.category);
            if (rule.predicate)(page) {
                evaluation.push(build_issue(
                    &rule.template,
                    rule.penalty,
                    1,
                    vec![page.url.clone()],
                ));
            }
        }
        evaluation
    }

    /// Page rules for every page, split across scoped worker threads.
    /// Worker results are merged in chunk order so output follows page order.
    pub fn evaluate_pages(&self, pages: &[PageSignals]) -> Evaluation {
        if pages.is_empty() {
            return Evaluation::new();
        }
        let chunk_size = pages.len().div_ceil(self.workers);
        if chunk_size == pages.len() {
            return self.evaluate_chunk(pages);
        }

        let partials: Vec<Evaluation> = std::thread::scope(|scope| {
            let handles: Vec<_> = pages
                .chunks(chunk_size)
                .map(|chunk| scope.spawn(move || self.evaluate_chunk(chunk)))
                .collect();
            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(partial) => partial,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });

        let mut evaluation = Evaluation::new();
        for partial in partials {
            evaluation.merge(partial);
        }
        evaluation
    }

    fn evaluate_chunk(&self, pages: &[PageSignals]) -> Evaluation {
        let mut evaluation = Evaluation::new();
        for page in pages {
            evaluation.merge(self.evaluate(page));
        }
        evaluation
    }

    /// Page rules for every page followed by the site-wide checks.
    pub fn evaluate_collection(
        &self,
        pages: &[PageSignals],
        links: &[LinkEdge],
        discovered: &[DiscoveredUrl],
    ) -> Evaluation {
        let mut evaluation = self.evaluate_pages(pages);
        evaluation.merge(collection::evaluate(pages, links, discovered));
        tracing::debug!(
            "Collection pass over {} pages raised {} issues",
            pages.len(),
            evaluation.issues.len()
        );
        evaluation
    }

    /// Performance and security checks for pages that carry telemetry.
    /// Performance and security stay unevaluated when no page has data for
    /// them.
    pub fn evaluate_telemetry(&self, pages: &[PageSignals]) -> Evaluation {
        let mut evaluation = Evaluation::new();
        for page in pages.iter().filter(|p| p.has_telemetry()) {
            evaluation.merge(telemetry::evaluate(page));
        }
        evaluation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    fn codes(evaluation: &Evaluation) -> Vec<&str> {
        evaluation.issues.iter().map(|i| i.code.as_str()).collect()
    }

    fn minimal_page() -> PageSignals {
        PageSignals {
            url: "http://example.com/".into(),
            normalized_url: "http://example.com/".into(),
            final_url: "http://example.com/".into(),
            title: None,
            title_length: 0,
            meta_description: None,
            meta_description_length: 0,
            headings: Default::default(),
            h1_text: None,
            ..PageSignals::default_test_instance()
        }
    }

    #[test]
    fn minimal_page_fires_exactly_four_rules() {
        let evaluation = RulesEngine::new(1).evaluate(&minimal_page());

        let mut fired = codes(&evaluation);
        fired.sort();
        assert_eq!(
            fired,
            vec![
                "ONPAGE_H1_MISSING",
                "ONPAGE_META_DESCRIPTION_MISSING",
                "ONPAGE_TITLE_MISSING",
                "TECHNICAL_HTTPS_NOT_ENFORCED",
            ]
        );
        assert_eq!(evaluation.penalties.get(Category::Onpage), 35);
        assert_eq!(evaluation.penalties.get(Category::Technical), 15);
        assert_eq!(evaluation.penalties.total(), 50);
    }

    #[test]
    fn page_issues_carry_page_url_and_remediation() {
        let evaluation = RulesEngine::new(1).evaluate(&minimal_page());
        for issue in &evaluation.issues {
            assert_eq!(issue.affected_count, 1);
            assert_eq!(issue.sample_urls, vec!["http://example.com/".to_string()]);
            assert!(!issue.recommendation.is_empty());
            assert!(!issue.fix_steps.is_empty());
        }
    }

    #[test]
    fn evaluation_is_idempotent() {
        let engine = RulesEngine::new(1);
        let page = minimal_page();
        assert_eq!(engine.evaluate(&page), engine.evaluate(&page));
    }

    #[test]
    fn every_rule_is_evaluated_without_short_circuit() {
        let mut page = minimal_page();
        page.status_code = 500;
        page.has_viewport = false;
        page.images_missing_alt = 2;

        let evaluation = RulesEngine::new(1).evaluate(&page);
        let fired = codes(&evaluation);
        assert!(fired.contains(&"TECHNICAL_HTTP_ERROR_STATUS"));
        assert!(fired.contains(&"USABILITY_VIEWPORT_MISSING"));
        assert!(fired.contains(&"ONPAGE_IMAGES_MISSING_ALT"));
        assert_eq!(evaluation.penalties.get(Category::Technical), 35);
    }

    #[test]
    fn parallel_pages_match_sequential_order() {
        let pages: Vec<PageSignals> = (0..23)
            .map(|i| {
                let mut page = minimal_page();
                page.url = format!("http://example.com/page-{}", i);
                page
            })
            .collect();

        let sequential = RulesEngine::new(1).evaluate_pages(&pages);
        let parallel = RulesEngine::new(4).evaluate_pages(&pages);
        assert_eq!(sequential, parallel);
        assert_eq!(parallel.issues.len(), 23 * 4);
        assert_eq!(parallel.issues[0].sample_urls[0], "http://example.com/page-0");
        assert_eq!(parallel.issues[91].sample_urls[0], "http://example.com/page-22");
    }

    #[test]
    fn telemetry_pass_skips_pages_without_data() {
        let engine = RulesEngine::new(2);
        let evaluation = engine.evaluate_telemetry(&[PageSignals::default_test_instance()]);
        assert!(evaluation.issues.is_empty());
        assert_eq!(evaluation.penalties.total(), 0);
        assert!(!evaluation.penalties.is_evaluated(Category::Performance));
        assert!(!evaluation.penalties.is_evaluated(Category::Security));
    }

    #[test]
    fn page_rules_mark_their_categories_evaluated() {
        let evaluation = RulesEngine::new(1).evaluate(&PageSignals::default_test_instance());
        assert!(evaluation.issues.is_empty());
        for category in [
            Category::Onpage,
            Category::Technical,
            Category::Links,
            Category::Social,
            Category::Usability,
            Category::Local,
        ] {
            assert!(evaluation.penalties.is_evaluated(category), "{} not evaluated", category);
        }
        assert!(!evaluation.penalties.is_evaluated(Category::Performance));
        assert!(!evaluation.penalties.is_evaluated(Category::Security));
    }

    #[test]
    fn audit_without_telemetry_leaves_performance_and_security_unscored() {
        use crate::service::scoring::{calculate_category_scores, calculate_overall_score};

        let engine = RulesEngine::new(1);
        let pages = vec![PageSignals::default_test_instance()];
        let mut evaluation = engine.evaluate_collection(&pages, &[], &[]);
        evaluation.merge(engine.evaluate_telemetry(&pages));

        let scores = calculate_category_scores(&evaluation.penalties);
        assert_eq!(scores.get(Category::Performance), None);
        assert_eq!(scores.get(Category::Security), None);
        assert_eq!(scores.get(Category::Onpage), Some(100));
        // 0.75 * 100 + 0.25 * 70 = 92.5
        assert_eq!(calculate_overall_score(&scores), 93);
    }

    #[test]
    fn merge_sums_penalties() {
        let engine = RulesEngine::new(1);
        let mut a = engine.evaluate(&minimal_page());
        let b = engine.evaluate(&minimal_page());
        a.merge(b);
        assert_eq!(a.issues.len(), 8);
        assert_eq!(a.penalties.get(Category::Onpage), 70);
    }
}
