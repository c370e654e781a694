// tests/twitter_fallback.rs
//
// Twitter fallback chain against a scripted transport:
// mirrors in listed order → search API → static cache → not found.

mod support;

use naughty_or_nice::analyze::{self, SourceDetails};
use naughty_or_nice::fetch::twitter::{TwitterFetcher, ORIGIN_CACHE, ORIGIN_SEARCH_API};
use naughty_or_nice::fetch::twitter_cache::StaticCache;
use naughty_or_nice::fetch::SourceFetcher;
use support::*;

fn rss(base: &str, path: &str) -> String {
    format!("{base}/{path}")
}

fn fetcher(cfg: &naughty_or_nice::config::AppConfig, t: &std::sync::Arc<FakeTransport>) -> TwitterFetcher {
    TwitterFetcher::new(&cfg.twitter, t.clone()).with_cache(StaticCache::empty())
}

const USER_LOOKUP: &str = r#"{"data":{"id":"1","name":"Jane Doe","username":"jane","description":"Rustacean","profile_image_url":"https://pbs.test/jane.jpg","public_metrics":{"followers_count":1200,"following_count":80,"tweet_count":5000}}}"#;
const RECENT_SEARCH: &str = r#"{"data":[{"id":"101","text":"Thanks for the warm welcome!","created_at":"2024-10-01T12:00:00.000Z"},{"id":"102","text":"What an awful commute","created_at":"2024-10-02T08:00:00.000Z"}],"meta":{"result_count":2}}"#;

#[tokio::test]
async fn later_mirror_wins_after_earlier_ones_fail_in_order() {
    let t = FakeTransport::new()
        .route(MIRROR_1, status(503))
        .route(MIRROR_2, ok(fixture("mirror_feed.xml")));
    let cfg = test_config();

    let r = fetcher(&cfg, &t).fetch("jane").await;

    assert!(r.found);
    assert_eq!(r.origin.as_deref(), Some(MIRROR_2));
    assert_eq!(r.items.len(), 3);
    assert_eq!(
        t.urls(),
        vec![rss(MIRROR_1, "jane/rss"), rss(MIRROR_2, "jane/rss")],
        "mirror 3 must not be contacted once mirror 2 succeeds"
    );

    let profile = r.profile.as_ref().expect("profile from channel");
    assert_eq!(profile.display_name.as_deref(), Some("Jane Doe"));
    assert_eq!(profile.avatar_url.as_deref(), Some("https://m2.test/pic/jane.jpg"));

    let scored = analyze::twitter::analyze(&r.items, r.origin.as_deref());
    assert_eq!(scored.score(), Some(60));
    match scored.details() {
        Some(SourceDetails::Twitter { origin, positive_percent, negative_percent, .. }) => {
            assert_eq!(origin.as_deref(), Some(MIRROR_2));
            assert_eq!((*positive_percent, *negative_percent), (75, 25));
        }
        other => panic!("unexpected details: {other:?}"),
    }
}

#[tokio::test]
async fn timeout_and_empty_feed_both_advance_to_next_mirror() {
    let t = FakeTransport::new()
        .route(MIRROR_1, timeout())
        .route(MIRROR_2, ok(fixture("empty_feed.xml")))
        .route(MIRROR_3, ok(fixture("mirror_feed.xml")));
    let cfg = test_config();

    let r = fetcher(&cfg, &t).fetch("jane").await;

    assert_eq!(r.origin.as_deref(), Some(MIRROR_3));
    assert_eq!(t.urls().len(), 3);
    assert!(t.urls()[0].starts_with(MIRROR_1));
    assert!(t.urls()[1].starts_with(MIRROR_2));
    assert!(t.urls()[2].starts_with(MIRROR_3));
}

#[tokio::test]
async fn html_error_page_with_200_is_not_a_feed() {
    let t = FakeTransport::new()
        .route(MIRROR_1, ok("<html><body>Instance has been rate limited.</body></html>"))
        .route(MIRROR_2, ok(fixture("mirror_feed.xml")));
    let cfg = test_config();

    let r = fetcher(&cfg, &t).fetch("jane").await;
    assert_eq!(r.origin.as_deref(), Some(MIRROR_2));
}

#[tokio::test]
async fn one_redirect_hop_is_followed() {
    let t = FakeTransport::new()
        .route("https://m1.test/jane/rss", redirect("/mirror/jane/rss"))
        .route("https://m1.test/mirror/jane/rss", ok(fixture("mirror_feed.xml")));
    let cfg = test_config();

    let r = fetcher(&cfg, &t).fetch("jane").await;

    assert!(r.found);
    assert_eq!(r.origin.as_deref(), Some(MIRROR_1));
    assert_eq!(
        t.urls(),
        vec![
            "https://m1.test/jane/rss".to_string(),
            "https://m1.test/mirror/jane/rss".to_string()
        ]
    );
    let mirror_agent = t.requests()[1]
        .headers
        .iter()
        .any(|(k, v)| k == "User-Agent" && v.starts_with("Mozilla/5.0"));
    assert!(mirror_agent, "redirected request keeps the mirror user agent");
}

#[tokio::test]
async fn second_redirect_fails_that_mirror() {
    let t = FakeTransport::new()
        .route("https://m1.test/jane/rss", redirect("/hop1"))
        .route("https://m1.test/hop1", redirect("/hop2"))
        .route("https://m1.test/hop2", ok(fixture("mirror_feed.xml")))
        .route(MIRROR_2, ok(fixture("mirror_feed.xml")));
    let cfg = test_config();

    let r = fetcher(&cfg, &t).fetch("jane").await;

    assert_eq!(r.origin.as_deref(), Some(MIRROR_2));
    assert_eq!(t.count_prefix("https://m1.test/hop2"), 0);
    assert_eq!(t.count_prefix("https://m1.test/hop1"), 1);
}

#[tokio::test]
async fn search_api_follows_exhausted_mirrors() {
    let t = FakeTransport::new()
        .route(MIRROR_1, status(500))
        .route(MIRROR_2, status(502))
        .route(MIRROR_3, status(404))
        .route(&format!("{SEARCH_API}/users/by/username/jane"), ok(USER_LOOKUP))
        .route(&format!("{SEARCH_API}/tweets/search/recent"), ok(RECENT_SEARCH));
    let mut cfg = test_config();
    cfg.twitter.bearer_token = Some("bearer-xyz".into());

    let r = fetcher(&cfg, &t).fetch("jane").await;

    assert!(r.found);
    assert_eq!(r.origin.as_deref(), Some(ORIGIN_SEARCH_API));
    assert_eq!(r.items.len(), 2);
    assert_eq!(r.items[0].text, "Thanks for the warm welcome!");
    assert!(r.items[0].published_at > 0);

    let profile = r.profile.expect("profile from user lookup");
    assert_eq!(profile.followers, Some(1200));
    assert_eq!(profile.following, Some(80));
    assert_eq!(profile.bio.as_deref(), Some("Rustacean"));

    let urls = t.urls();
    assert_eq!(urls.len(), 5);
    assert!(urls[..3].iter().all(|u| u.ends_with("/jane/rss")));
    assert!(urls[4].contains("query=from%3Ajane"));
    assert!(urls[4].contains("max_results=20"));
    let authorized = t.requests()[3..]
        .iter()
        .all(|r| r.headers.iter().any(|(k, v)| k == "Authorization" && v == "Bearer bearer-xyz"));
    assert!(authorized);
}

#[tokio::test]
async fn cache_serves_known_handles_after_search_failure() {
    let t = FakeTransport::new()
        .route(MIRROR_1, status(500))
        .route(MIRROR_2, status(500))
        .route(MIRROR_3, status(500))
        .route(SEARCH_API, status(401));
    let mut cfg = test_config();
    cfg.twitter.bearer_token = Some("expired".into());
    let cache = StaticCache::from_json(
        r#"{"Jane": {"name": "Jane (cached)", "tweets": ["Happy to help anytime", "   "]}}"#,
    )
    .unwrap();

    let r = TwitterFetcher::new(&cfg.twitter, t.clone())
        .with_cache(cache)
        .fetch("JANE")
        .await;

    assert!(r.found);
    assert_eq!(r.origin.as_deref(), Some(ORIGIN_CACHE));
    assert_eq!(r.items.len(), 1);
    assert_eq!(
        r.profile.and_then(|p| p.display_name).as_deref(),
        Some("Jane (cached)")
    );
    assert_eq!(t.count_prefix(SEARCH_API), 1, "lookup failed, search not attempted");
}

#[tokio::test]
async fn without_bearer_token_search_api_is_skipped() {
    let t = FakeTransport::new();
    let cfg = test_config();

    let r = fetcher(&cfg, &t).fetch("jane").await;

    assert!(!r.found);
    assert!(r.items.is_empty());
    assert!(r.origin.is_none());
    assert_eq!(t.count_prefix(SEARCH_API), 0);
    assert_eq!(t.urls().len(), 3, "each mirror attempted exactly once");
}

#[tokio::test]
async fn embedded_cache_covers_well_known_accounts() {
    let t = FakeTransport::new();
    let cfg = test_config();

    let r = TwitterFetcher::new(&cfg.twitter, t.clone()).fetch("rustlang").await;

    assert!(r.found);
    assert_eq!(r.origin.as_deref(), Some(ORIGIN_CACHE));
    assert!(!r.items.is_empty());
}
