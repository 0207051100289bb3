// benches/rules_benchmarks.rs
use criterion::{criterion_group, criterion_main, Criterion};
use std::{hint::black_box, time::Duration};

use seo_auditor::{
    domain::models::{DiscoveredUrl, LinkEdge, LinkType, PageSignals, RawPage, ResponseHeaders},
    extractor::PageSignalExtractor,
    service::{kpi::build_kpi_report, AuditRecord, RulesEngine},
    service::scoring::calculate_category_scores,
};

fn sample_html(i: usize) -> String {
    format!(
        r#"<html lang="en"><head>
            <meta charset="utf-8">
            <title>Product {i} | Example widgets and gadgets for the home</title>
            <meta name="description" content="Product {i} is a durable widget built for every room of the house.">
            <meta name="viewport" content="width=device-width">
            <link rel="canonical" href="https://example.com/products/{i}">
            <script type="application/ld+json">{{"@type": "Product", "name": "Widget {i}"}}</script>
        </head><body>
            <h1>Widget {i}</h1>
            <p>{body}</p>
            <a href="/products/{next}">Next</a>
            <a href="https://partner.example.net/">Partner</a>
            <img src="/img/{i}.jpg">
        </body></html>"#,
        i = i,
        next = i + 1,
        body = "durable widget for every home ".repeat(40),
    )
}

fn sample_pages(count: usize) -> Vec<PageSignals> {
    (0..count)
        .map(|i| {
            let url = format!("https://example.com/products/{}", i);
            PageSignalExtractor::extract(&RawPage {
                url: url.clone(),
                final_url: url.clone(),
                normalized_url: url,
                status_code: 200,
                html: sample_html(i),
                headers: ResponseHeaders::default(),
            })
        })
        .collect()
}

fn sample_links(count: usize) -> Vec<LinkEdge> {
    (0..count)
        .map(|i| LinkEdge {
            from_url: format!("https://example.com/products/{}", i),
            to_url: format!("https://example.com/products/{}", i + 1),
            link_type: LinkType::Internal,
            rel_nofollow: false,
            is_broken: i % 50 == 0,
            status_code: Some(200),
            redirect_hops: (i % 7) as u32,
        })
        .collect()
}

fn bench_extraction(c: &mut Criterion) {
    let html = sample_html(1);
    let raw = RawPage {
        url: "https://example.com/products/1".into(),
        final_url: "https://example.com/products/1".into(),
        normalized_url: "https://example.com/products/1".into(),
        status_code: 200,
        html,
        headers: ResponseHeaders::default(),
    };

    c.bench_function("extract_page_signals", |b| {
        b.iter(|| black_box(PageSignalExtractor::extract(black_box(&raw))));
    });
}

fn bench_collection(c: &mut Criterion) {
    let pages = sample_pages(500);
    let links = sample_links(500);
    let discovered: Vec<DiscoveredUrl> = (0..600)
        .map(|i| DiscoveredUrl::sitemap(format!("https://example.com/products/{}", i)))
        .collect();

    let sequential = RulesEngine::new(1);
    c.bench_function("evaluate_collection_500_sequential", |b| {
        b.iter(|| black_box(sequential.evaluate_collection(&pages, &links, &discovered)));
    });

    let parallel = RulesEngine::default();
    c.bench_function("evaluate_collection_500_parallel", |b| {
        b.iter(|| black_box(parallel.evaluate_collection(&pages, &links, &discovered)));
    });
}

fn bench_report(c: &mut Criterion) {
    let pages = sample_pages(200);
    let links = sample_links(200);
    let evaluation = RulesEngine::default().evaluate_collection(&pages, &links, &[]);
    let audit = AuditRecord {
        id: "bench".into(),
        root_url: "https://example.com/products/0".into(),
        category_scores: calculate_category_scores(&evaluation.penalties),
    };

    c.bench_function("build_kpi_report_200", |b| {
        b.iter(|| {
            black_box(build_kpi_report(
                &audit,
                &pages,
                &evaluation.issues,
                &links,
                &[],
                &Default::default(),
            ))
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(20)
        .measurement_time(Duration::from_secs(10));
    targets = bench_extraction, bench_collection, bench_report
}

criterion_main!(benches);
