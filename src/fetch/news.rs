// src/fetch/news.rs
//! News fetcher: keyword web search, scraped from an HTML results page.
//!
//! Scraping lives behind [`ResultExtractor`] so a structured search API can
//! replace it without touching the analyzer. The shipped extractor matches two
//! snippet shapes by regex; when the markup changes it finds nothing and the
//! source reports not found.

use anyhow::{bail, Result};
use async_trait::async_trait;
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use super::{encode_component, FetchResult, HttpRequest, HttpTransport, SourceFetcher};
use crate::analyze::Source;
use crate::config::NewsConfig;
use crate::identity::anon_hash;
use crate::text::{collapse_ws, decode_basic_entities, strip_tags};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetKind {
    /// Body text under a result.
    Body,
    /// The result's link title.
    Title,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsSnippet {
    pub text: String,
    pub kind: SnippetKind,
}

/// Turns a results page into raw snippets. Implementations must not panic on
/// unexpected markup; an empty vector is the failure signal.
pub trait ResultExtractor: Send + Sync {
    /// Identifies the markup contract this extractor understands.
    fn version(&self) -> &'static str;
    fn extract(&self, html: &str) -> Vec<NewsSnippet>;
}

/// DuckDuckGo HTML endpoint, contract `ddg-html-v1`:
/// - body snippets: `<a class="result__snippet" ...>TEXT</a>` (capture `text`)
/// - link titles:   `<a class="result__a" ...>TEXT</a>` (capture `text`)
pub struct DuckDuckGoHtml;

static RE_SNIPPET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a[^>]*class="result__snippet"[^>]*>(?P<text>.*?)</a>"#)
        .expect("snippet regex")
});
static RE_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a[^>]*class="result__a"[^>]*>(?P<text>.*?)</a>"#).expect("title regex")
});

impl ResultExtractor for DuckDuckGoHtml {
    fn version(&self) -> &'static str {
        "ddg-html-v1"
    }

    fn extract(&self, html: &str) -> Vec<NewsSnippet> {
        let grab = |re: &Regex, kind: SnippetKind| -> Vec<NewsSnippet> {
            re.captures_iter(html)
                .filter_map(|c| c.name("text"))
                .map(|m| NewsSnippet {
                    text: collapse_ws(&decode_basic_entities(&strip_tags(m.as_str()))),
                    kind,
                })
                .collect()
        };
        let mut out = grab(&RE_SNIPPET, SnippetKind::Body);
        out.extend(grab(&RE_TITLE, SnippetKind::Title));
        out
    }
}

pub struct NewsFetcher {
    transport: Arc<dyn HttpTransport>,
    search_url: String,
    max_results: usize,
    min_len: usize,
    extractor: Box<dyn ResultExtractor>,
}

impl NewsFetcher {
    pub fn new(cfg: &NewsConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            search_url: cfg.search_url.clone(),
            max_results: cfg.max_results,
            min_len: cfg.min_snippet_len,
            extractor: Box::new(DuckDuckGoHtml),
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn ResultExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Drop short fragments and exact duplicates, then cap.
    fn filter(&self, raw: Vec<NewsSnippet>) -> Vec<NewsSnippet> {
        let mut seen = HashSet::new();
        raw.into_iter()
            .filter(|s| s.text.chars().count() >= self.min_len)
            .filter(|s| seen.insert(s.text.clone()))
            .take(self.max_results)
            .collect()
    }

    async fn try_fetch(&self, keyword: &str) -> Result<Vec<NewsSnippet>> {
        let query = encode_component(&format!("\"{keyword}\""));
        let sep = if self.search_url.contains('?') { '&' } else { '?' };
        let url = format!("{}{}q={}", self.search_url, sep, query);
        let resp = self.transport.send(HttpRequest::get(url)).await?;
        if !resp.is_success() {
            bail!("search page returned status {}", resp.status);
        }
        Ok(self.filter(self.extractor.extract(&resp.body)))
    }
}

#[async_trait]
impl SourceFetcher for NewsFetcher {
    type Item = NewsSnippet;
    type Profile = ();

    fn source(&self) -> Source {
        Source::News
    }

    async fn fetch(&self, keyword: &str) -> FetchResult<NewsSnippet> {
        let id = anon_hash(keyword);
        counter!("fetch_attempts_total", "source" => "news").increment(1);

        match self.try_fetch(keyword).await {
            Ok(snippets) if !snippets.is_empty() => {
                info!(
                    target: "fetch",
                    %id,
                    items = snippets.len(),
                    extractor = self.extractor.version(),
                    "news snippets extracted"
                );
                FetchResult::found(snippets, self.extractor.version())
            }
            Ok(_) => {
                info!(target: "fetch", %id, extractor = self.extractor.version(), "no news snippets");
                counter!("fetch_not_found_total", "source" => "news").increment(1);
                FetchResult::not_found()
            }
            Err(e) => {
                warn!(target: "fetch", %id, error = %e, "news search failed");
                counter!("fetch_not_found_total", "source" => "news").increment(1);
                FetchResult::not_found()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<div class="result results_links results_links_deep web-result">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="https://example.com/a">Jane Doe wins community <b>award</b> for volunteer work</a>
  </h2>
  <a class="result__snippet" href="https://example.com/a">Local developer &amp; mentor Jane Doe was honored on Friday for years of volunteer teaching.</a>
</div>
<div class="result">
  <a rel="nofollow" class="result__a" href="https://example.com/b">Short</a>
  <a class="result__snippet" href="https://example.com/b">Jane Doe&#x27;s talk on &quot;safe systems&quot; drew a full room.</a>
</div>"#;

    #[test]
    fn extracts_both_shapes_and_decodes_entities() {
        let out = DuckDuckGoHtml.extract(PAGE);
        let bodies: Vec<_> = out.iter().filter(|s| s.kind == SnippetKind::Body).collect();
        let titles: Vec<_> = out.iter().filter(|s| s.kind == SnippetKind::Title).collect();
        assert_eq!(bodies.len(), 2);
        assert_eq!(titles.len(), 2);
        assert!(bodies[0].text.starts_with("Local developer & mentor"));
        assert_eq!(bodies[1].text, "Jane Doe's talk on \"safe systems\" drew a full room.");
        assert_eq!(titles[0].text, "Jane Doe wins community award for volunteer work");
    }

    #[test]
    fn unknown_markup_yields_nothing() {
        assert!(DuckDuckGoHtml
            .extract("<html><div class=\"new-layout\">x</div></html>")
            .is_empty());
    }
}
