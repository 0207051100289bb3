//! Site-wide checks that need every page and link at once.

use std::collections::{HashMap, HashSet};

use crate::domain::models::{normalize_url, DiscoveredUrl, DiscoverySource, LinkEdge, LinkType, PageSignals};

use super::catalog::{self, is_thin, IssueTemplate};
use super::{build_issue, Evaluation};

const BROKEN_LINK_SAMPLES: usize = 20;
const DEFAULT_SAMPLES: usize = 10;

const CHECKS: [&IssueTemplate; 6] = [
    &catalog::BROKEN_INTERNAL_LINKS,
    &catalog::REDIRECT_CHAINS,
    &catalog::DUPLICATE_TITLES,
    &catalog::DUPLICATE_META_DESCRIPTIONS,
    &catalog::THIN_CONTENT,
    &catalog::ORPHAN_PAGES,
];

pub fn evaluate(pages: &[PageSignals], links: &[LinkEdge], discovered: &[DiscoveredUrl]) -> Evaluation {
    let mut evaluation = Evaluation::new();
    for template in CHECKS {
        evaluation.penalties.mark_evaluated(template.category);
    }

    let broken: Vec<&LinkEdge> = links
        .iter()
        .filter(|l| l.link_type == LinkType::Internal && l.is_broken)
        .collect();
    if !broken.is_empty() {
        let n = broken.len();
        evaluation.push(build_issue(
            &catalog::BROKEN_INTERNAL_LINKS,
            scaled(n, 2, 20),
            n,
            broken.iter().take(BROKEN_LINK_SAMPLES).map(|l| l.label()).collect(),
        ));
    }

    let chains: Vec<&LinkEdge> = links.iter().filter(|l| l.redirect_hops >= 2).collect();
    if !chains.is_empty() {
        let n = chains.len();
        evaluation.push(build_issue(
            &catalog::REDIRECT_CHAINS,
            scaled(n, 1, 15),
            n,
            chains.iter().take(DEFAULT_SAMPLES).map(|l| l.label()).collect(),
        ));
    }

    let title_groups = duplicate_groups(pages, |p| p.title.as_deref());
    if !title_groups.is_empty() {
        evaluation.push(build_issue(
            &catalog::DUPLICATE_TITLES,
            scaled(title_groups.len(), 3, 15),
            title_groups.iter().map(Vec::len).sum(),
            title_groups.concat().into_iter().take(DEFAULT_SAMPLES).collect(),
        ));
    }

    let meta_groups = duplicate_groups(pages, |p| p.meta_description.as_deref());
    if !meta_groups.is_empty() {
        evaluation.push(build_issue(
            &catalog::DUPLICATE_META_DESCRIPTIONS,
            scaled(meta_groups.len(), 2, 10),
            meta_groups.iter().map(Vec::len).sum(),
            meta_groups.concat().into_iter().take(DEFAULT_SAMPLES).collect(),
        ));
    }

    // Also raised per page as ONPAGE_LOW_WORD_COUNT; both penalties apply.
    let thin: Vec<&PageSignals> = pages.iter().filter(|p| is_thin(p.word_count)).collect();
    if !thin.is_empty() {
        let n = thin.len();
        evaluation.push(build_issue(
            &catalog::THIN_CONTENT,
            scaled(n, 2, 20),
            n,
            thin.iter().take(DEFAULT_SAMPLES).map(|p| p.url.clone()).collect(),
        ));
    }

    let orphans = orphan_urls(pages, discovered);
    if !orphans.is_empty() {
        let n = orphans.len();
        evaluation.push(build_issue(
            &catalog::ORPHAN_PAGES,
            scaled(n, 2, 15),
            n,
            orphans.into_iter().take(DEFAULT_SAMPLES).collect(),
        ));
    }

    evaluation
}

fn scaled(count: usize, per_item: u32, cap: u32) -> u32 {
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    count.saturating_mul(per_item).min(cap)
}

/// Page URLs grouped by identical non-empty field value, keeping only groups
/// with more than one member. Groups follow first-seen order.
fn duplicate_groups<'a>(
    pages: &'a [PageSignals],
    field: impl Fn(&'a PageSignals) -> Option<&'a str>,
) -> Vec<Vec<String>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<String>> = Vec::new();
    for page in pages {
        let Some(value) = field(page).filter(|v| !v.is_empty()) else {
            continue;
        };
        let slot = *index.entry(value).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(page.url.clone());
    }
    groups.retain(|g| g.len() > 1);
    groups
}

/// Sitemap URLs that no crawled page answers for.
fn orphan_urls(pages: &[PageSignals], discovered: &[DiscoveredUrl]) -> Vec<String> {
    let crawled: HashSet<String> = pages
        .iter()
        .flat_map(|p| [&p.url, &p.normalized_url, &p.final_url])
        .filter(|u| !u.is_empty())
        .map(|u| normalize_url(u))
        .collect();

    let mut seen = HashSet::new();
    discovered
        .iter()
        .filter(|d| d.source == DiscoverySource::Sitemap)
        .map(|d| normalize_url(&d.url))
        .filter(|u| !crawled.contains(u) && seen.insert(u.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    fn page(url: &str) -> PageSignals {
        PageSignals {
            url: url.into(),
            normalized_url: normalize_url(url),
            final_url: url.into(),
            ..PageSignals::default_test_instance()
        }
    }

    fn link(from: &str, to: &str) -> LinkEdge {
        LinkEdge {
            from_url: from.into(),
            to_url: to.into(),
            link_type: LinkType::Internal,
            rel_nofollow: false,
            is_broken: false,
            status_code: Some(200),
            redirect_hops: 0,
        }
    }

    fn find<'a>(evaluation: &'a Evaluation, code: &str) -> Option<&'a crate::domain::models::Issue> {
        evaluation.issues.iter().find(|i| i.code == code)
    }

    #[test]
    fn clean_site_raises_nothing() {
        let mut a = page("https://example.com/");
        let mut b = page("https://example.com/about");
        a.title = Some("Home of example widgets and gadgets".into());
        b.title = Some("About the example widget company".into());
        b.meta_description = Some("Who we are and why we build widgets for every home in the country.".into());
        let links = vec![link("https://example.com/", "https://example.com/about")];
        let discovered = vec![DiscoveredUrl::sitemap("https://example.com/about/")];

        let evaluation = evaluate(&[a, b], &links, &discovered);
        assert!(evaluation.issues.is_empty(), "{:?}", evaluation.issues);
    }

    #[test]
    fn duplicate_titles_form_one_issue() {
        let mut a = page("https://example.com/a");
        let mut b = page("https://example.com/b");
        a.title = Some("Same".into());
        b.title = Some("Same".into());
        b.meta_description = Some("A different description for the second page of the site.".into());

        let evaluation = evaluate(&[a, b], &[], &[]);
        let dupes: Vec<_> = evaluation
            .issues
            .iter()
            .filter(|i| i.code == "ONPAGE_DUPLICATE_TITLES")
            .collect();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].affected_count, 2);
        assert_eq!(dupes[0].penalty, 3);
        assert_eq!(
            dupes[0].sample_urls,
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }

    #[test]
    fn duplicate_penalty_scales_by_group_and_caps() {
        let pages: Vec<PageSignals> = (0..14)
            .map(|i| {
                let mut p = page(&format!("https://example.com/{}", i));
                p.title = Some(format!("Group {}", i / 2));
                p.meta_description = Some(format!("Unique description number {} for this page.", i));
                p
            })
            .collect();

        let evaluation = evaluate(&pages, &[], &[]);
        let issue = find(&evaluation, "ONPAGE_DUPLICATE_TITLES").unwrap();
        assert_eq!(issue.penalty, 15, "7 groups x 3 capped at 15");
        assert_eq!(issue.affected_count, 14);
        assert_eq!(issue.sample_urls.len(), 10);
        assert!(find(&evaluation, "ONPAGE_DUPLICATE_META_DESCRIPTIONS").is_none());
    }

    #[test]
    fn duplicate_matching_is_exact() {
        let mut a = page("https://example.com/a");
        let mut b = page("https://example.com/b");
        a.title = Some("Widgets".into());
        b.title = Some("widgets".into());
        b.meta_description = Some("Another description that differs from the first one.".into());

        let evaluation = evaluate(&[a, b], &[], &[]);
        assert!(find(&evaluation, "ONPAGE_DUPLICATE_TITLES").is_none());
    }

    #[test]
    fn duplicate_matching_keeps_internal_whitespace() {
        let mut a = page("https://example.com/a");
        let mut b = page("https://example.com/b");
        a.title = Some("Acme  Widgets".into());
        b.title = Some("Acme Widgets".into());
        b.meta_description = Some("Another description that differs from the first one.".into());

        let evaluation = evaluate(&[a, b], &[], &[]);
        assert!(find(&evaluation, "ONPAGE_DUPLICATE_TITLES").is_none());
    }

    #[test]
    fn broken_links_and_redirect_chains() {
        let mut broken = link("https://example.com/", "https://example.com/gone");
        broken.is_broken = true;
        broken.status_code = Some(404);
        let mut external_broken = link("https://example.com/", "https://other.com/gone");
        external_broken.link_type = LinkType::External;
        external_broken.is_broken = true;
        let mut chain = link("https://example.com/", "https://example.com/old");
        chain.redirect_hops = 3;
        let mut single_hop = link("https://example.com/", "https://example.com/moved");
        single_hop.redirect_hops = 1;

        let evaluation = evaluate(
            &[page("https://example.com/")],
            &[broken, external_broken, chain, single_hop],
            &[],
        );

        let issue = find(&evaluation, "LINKS_BROKEN_INTERNAL").unwrap();
        assert_eq!(issue.affected_count, 1);
        assert_eq!(issue.penalty, 2);
        assert_eq!(issue.sample_urls, vec!["https://example.com/ → https://example.com/gone"]);

        let issue = find(&evaluation, "TECHNICAL_REDIRECT_CHAINS").unwrap();
        assert_eq!(issue.affected_count, 1);
        assert_eq!(issue.penalty, 1);
        assert_eq!(evaluation.penalties.get(Category::Links), 2);
        assert_eq!(evaluation.penalties.get(Category::Technical), 1);
    }

    #[test]
    fn broken_link_penalty_caps_at_twenty() {
        let links: Vec<LinkEdge> = (0..30)
            .map(|i| {
                let mut l = link("https://example.com/", &format!("https://example.com/missing-{}", i));
                l.is_broken = true;
                l
            })
            .collect();
        let evaluation = evaluate(&[], &links, &[]);
        let issue = find(&evaluation, "LINKS_BROKEN_INTERNAL").unwrap();
        assert_eq!(issue.penalty, 20);
        assert_eq!(issue.affected_count, 30);
        assert_eq!(issue.sample_urls.len(), 20);
    }

    #[test]
    fn thin_content_counts_pages_with_some_text() {
        let mut thin = page("https://example.com/thin");
        thin.word_count = 120;
        let mut empty = page("https://example.com/empty");
        empty.word_count = 0;
        empty.title = Some("Empty page".into());
        thin.meta_description = Some("Thin page description that is long enough to be distinct.".into());

        let evaluation = evaluate(&[thin, empty], &[], &[]);
        let issue = find(&evaluation, "ONPAGE_THIN_CONTENT").unwrap();
        assert_eq!(issue.affected_count, 1);
        assert_eq!(issue.penalty, 2);
        assert_eq!(issue.sample_urls, vec!["https://example.com/thin"]);
    }

    #[test]
    fn orphans_compare_normalized_forms() {
        let mut home = page("https://example.com/");
        home.final_url = "https://example.com/".into();
        let mut redirected = page("https://example.com/old-pricing");
        redirected.final_url = "https://example.com/pricing".into();
        redirected.title = Some("Pricing plans for example widgets".into());
        redirected.meta_description = Some("Compare plans and pick the widget subscription that suits you.".into());

        let discovered = vec![
            DiscoveredUrl::sitemap("https://EXAMPLE.com/"),
            DiscoveredUrl::sitemap("https://example.com/pricing/"),
            DiscoveredUrl::sitemap("https://example.com/hidden"),
            DiscoveredUrl::sitemap("https://example.com/hidden#top"),
            DiscoveredUrl {
                url: "https://example.com/crawl-only".into(),
                source: DiscoverySource::Crawl,
            },
        ];

        let evaluation = evaluate(&[home, redirected], &[], &discovered);
        let issue = find(&evaluation, "LINKS_ORPHAN_PAGES").unwrap();
        assert_eq!(issue.sample_urls, vec!["https://example.com/hidden"]);
        assert_eq!(issue.affected_count, 1);
        assert_eq!(issue.penalty, 2);
    }
}
