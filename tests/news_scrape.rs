// tests/news_scrape.rs
//
// News fetcher: results-page scraping, filtering and the extractor seam.

mod support;

use naughty_or_nice::analyze::{self, SourceDetails};
use naughty_or_nice::fetch::news::{NewsFetcher, NewsSnippet, ResultExtractor, SnippetKind};
use naughty_or_nice::fetch::SourceFetcher;
use support::*;

#[tokio::test]
async fn results_page_yields_filtered_snippets() {
    let t = FakeTransport::new().route(NEWS_SEARCH, ok(fixture("ddg_results.html")));
    let cfg = test_config();

    let r = NewsFetcher::new(&cfg.news, t.clone()).fetch("Jane Doe").await;

    assert!(r.found);
    assert_eq!(r.origin.as_deref(), Some("ddg-html-v1"));
    assert_eq!(t.urls(), vec![format!("{NEWS_SEARCH}?q=%22Jane%20Doe%22")]);

    // two bodies survive; "Short one." is too short
    // one title survives; "Talk" is too short and the third is a duplicate
    let kinds: Vec<SnippetKind> = r.items.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![SnippetKind::Body, SnippetKind::Body, SnippetKind::Title]);
    assert_eq!(
        r.items[0].text,
        "Jane Doe was honored on Friday with a great volunteer & mentoring award."
    );
    assert_eq!(
        r.items[1].text,
        "Jane Doe's conference talk on \"safe systems\" drew a full room."
    );

    // great + honored + volunteer + award, then award in the title
    let scored = analyze::news::analyze(&r.items);
    assert_eq!(scored.score(), Some(70));
    assert_eq!(
        scored.details(),
        Some(&SourceDetails::News {
            positive: 5,
            negative: 0,
            total_articles: 3,
        })
    );
}

#[tokio::test]
async fn result_count_is_capped() {
    let t = FakeTransport::new().route(NEWS_SEARCH, ok(fixture("ddg_results.html")));
    let mut cfg = test_config();
    cfg.news.max_results = 2;

    let r = NewsFetcher::new(&cfg.news, t.clone()).fetch("jane").await;

    assert_eq!(r.items.len(), 2);
}

#[tokio::test]
async fn changed_markup_degrades_to_not_found() {
    let t = FakeTransport::new().route(
        NEWS_SEARCH,
        ok(r#"<html><body><article class="card">Jane Doe did a thing worth reading about</article></body></html>"#),
    );
    let cfg = test_config();

    let r = NewsFetcher::new(&cfg.news, t.clone()).fetch("jane").await;

    assert!(!r.found);
    assert!(r.items.is_empty());
}

#[tokio::test]
async fn http_error_is_not_found() {
    let t = FakeTransport::new().route(NEWS_SEARCH, status(429));
    let cfg = test_config();

    assert!(!NewsFetcher::new(&cfg.news, t.clone()).fetch("jane").await.found);
}

struct FixedExtractor;

impl ResultExtractor for FixedExtractor {
    fn version(&self) -> &'static str {
        "fixed-v1"
    }

    fn extract(&self, _html: &str) -> Vec<NewsSnippet> {
        vec![NewsSnippet {
            text: "Jane Doe accused in lawsuit over unpaid invoices".into(),
            kind: SnippetKind::Body,
        }]
    }
}

#[tokio::test]
async fn extractor_can_be_swapped_without_touching_the_analyzer() {
    let t = FakeTransport::new().route(NEWS_SEARCH, ok("{}"));
    let cfg = test_config();

    let r = NewsFetcher::new(&cfg.news, t.clone())
        .with_extractor(Box::new(FixedExtractor))
        .fetch("jane")
        .await;

    assert_eq!(r.origin.as_deref(), Some("fixed-v1"));
    // accused + lawsuit
    assert_eq!(analyze::news::analyze(&r.items).score(), Some(42));
}
