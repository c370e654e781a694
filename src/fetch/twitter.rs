// src/fetch/twitter.rs
//! Twitter fetcher. Fallback order is fixed:
//! free mirror RSS (in listed order) → authenticated search API → static cache → not found.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use once_cell::sync::OnceCell;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, info, warn};

use super::twitter_cache::StaticCache;
use super::{encode_component, FetchResult, HttpRequest, HttpResponse, HttpTransport, SourceFetcher};
use crate::analyze::Source;
use crate::config::TwitterConfig;
use crate::identity::anon_hash;
use crate::text::normalize_text;

/// Browser-like agent; several mirrors reject obvious bots.
pub const MIRROR_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub const ORIGIN_SEARCH_API: &str = "search-api";
pub const ORIGIN_CACHE: &str = "cache";

#[derive(Debug, Clone, PartialEq)]
pub struct Tweet {
    pub text: String,
    /// Unix seconds, 0 when unknown.
    pub published_at: u64,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TwitterProfile {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
}

pub struct TwitterFetcher {
    transport: Arc<dyn HttpTransport>,
    mirrors: Vec<String>,
    mirror_timeout: Duration,
    max_results: usize,
    search_base: String,
    bearer_token: Option<String>,
    search: OnceCell<Option<SearchApi>>,
    cache: StaticCache,
}

/// Authenticated client for the v2 search API, built on first use.
struct SearchApi {
    base: String,
    bearer: String,
}

impl TwitterFetcher {
    pub fn new(cfg: &TwitterConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            mirrors: cfg
                .mirrors
                .iter()
                .map(|m| m.trim_end_matches('/').to_string())
                .collect(),
            mirror_timeout: Duration::from_secs(cfg.mirror_timeout_secs),
            max_results: cfg.max_results.max(1),
            search_base: cfg.search_api_base.trim_end_matches('/').to_string(),
            bearer_token: cfg.bearer_token.clone(),
            search: OnceCell::new(),
            cache: StaticCache::embedded(),
        }
    }

    pub fn with_cache(mut self, cache: StaticCache) -> Self {
        self.cache = cache;
        self
    }

    fn search_api(&self) -> Option<&SearchApi> {
        self.search
            .get_or_init(|| {
                let bearer = self.bearer_token.clone()?;
                info!(target: "fetch", "twitter search api client initialized");
                Some(SearchApi {
                    base: self.search_base.clone(),
                    bearer,
                })
            })
            .as_ref()
    }

    /// GET with the mirror agent and timeout, following at most one redirect hop.
    async fn get_mirror_url(&self, url: &str) -> Result<HttpResponse> {
        let first = self.transport.send(self.mirror_request(url)).await?;
        if !first.is_redirect() {
            return Ok(first);
        }
        let location = first.location.as_deref().unwrap_or_default();
        let next = reqwest::Url::parse(url)
            .and_then(|base| base.join(location))
            .with_context(|| format!("bad redirect location {location:?}"))?;
        debug!(target: "fetch", from = url, to = %next, "following mirror redirect");
        self.transport.send(self.mirror_request(next.as_str())).await
    }

    fn mirror_request(&self, url: &str) -> HttpRequest {
        HttpRequest::get(url)
            .header("User-Agent", MIRROR_USER_AGENT)
            .header("Accept", "application/rss+xml, application/xml;q=0.9, */*;q=0.8")
            .timeout(self.mirror_timeout)
    }

    async fn try_mirror(&self, base: &str, handle: &str) -> Result<ParsedFeed> {
        let url = format!("{}/{}/rss", base, encode_component(handle));
        let resp = self.get_mirror_url(&url).await?;
        if resp.status != 200 {
            bail!("mirror returned status {}", resp.status);
        }
        let mut feed = parse_feed(&resp.body)?;
        if feed.tweets.is_empty() {
            bail!("feed has no extractable items");
        }
        feed.tweets.truncate(self.max_results);
        Ok(feed)
    }

    async fn try_search_api(&self, api: &SearchApi, handle: &str) -> Result<ParsedFeed> {
        #[derive(Deserialize)]
        struct UserResp {
            data: Option<ApiUser>,
        }
        #[derive(Deserialize)]
        struct ApiUser {
            name: Option<String>,
            description: Option<String>,
            profile_image_url: Option<String>,
            public_metrics: Option<PublicMetrics>,
        }
        #[derive(Deserialize)]
        struct PublicMetrics {
            followers_count: Option<u64>,
            following_count: Option<u64>,
        }
        #[derive(Deserialize)]
        struct SearchResp {
            #[serde(default)]
            data: Vec<ApiTweet>,
        }
        #[derive(Deserialize)]
        struct ApiTweet {
            id: String,
            text: String,
            created_at: Option<String>,
        }

        let user_url = format!(
            "{}/users/by/username/{}?user.fields=description,profile_image_url,public_metrics",
            api.base,
            encode_component(handle)
        );
        let resp = self
            .transport
            .send(HttpRequest::get(user_url).bearer(&api.bearer))
            .await?;
        if !resp.is_success() {
            bail!("user lookup returned status {}", resp.status);
        }
        let user = resp
            .json::<UserResp>()?
            .data
            .ok_or_else(|| anyhow!("user lookup returned no data"))?;

        let search_url = format!(
            "{}/tweets/search/recent?query={}&max_results={}&tweet.fields=created_at",
            api.base,
            encode_component(&format!("from:{handle}")),
            self.max_results.clamp(10, 100)
        );
        let resp = self
            .transport
            .send(HttpRequest::get(search_url).bearer(&api.bearer))
            .await?;
        if !resp.is_success() {
            bail!("recent search returned status {}", resp.status);
        }
        let found = resp.json::<SearchResp>()?;

        let tweets: Vec<Tweet> = found
            .data
            .into_iter()
            .filter_map(|t| {
                let text = normalize_text(&t.text);
                (!text.is_empty()).then(|| Tweet {
                    text,
                    published_at: t.created_at.as_deref().map(parse_rfc3339_to_unix).unwrap_or(0),
                    url: Some(format!("https://twitter.com/{handle}/status/{}", t.id)),
                })
            })
            .take(self.max_results)
            .collect();
        if tweets.is_empty() {
            bail!("recent search returned no tweets");
        }

        let metrics = user.public_metrics;
        Ok(ParsedFeed {
            tweets,
            profile: TwitterProfile {
                display_name: user.name,
                avatar_url: user.profile_image_url,
                bio: user.description.filter(|d| !d.trim().is_empty()),
                followers: metrics.as_ref().and_then(|m| m.followers_count),
                following: metrics.as_ref().and_then(|m| m.following_count),
            },
        })
    }

    fn from_cache(&self, handle: &str) -> Option<ParsedFeed> {
        let acct = self.cache.lookup(handle)?;
        let tweets: Vec<Tweet> = acct
            .tweets
            .iter()
            .map(|t| Tweet {
                text: normalize_text(t),
                published_at: 0,
                url: None,
            })
            .filter(|t| !t.text.is_empty())
            .collect();
        (!tweets.is_empty()).then(|| ParsedFeed {
            tweets,
            profile: TwitterProfile {
                display_name: Some(acct.name.clone()),
                avatar_url: acct.avatar_url.clone(),
                bio: acct.bio.clone(),
                followers: None,
                following: None,
            },
        })
    }
}

#[async_trait]
impl SourceFetcher for TwitterFetcher {
    type Item = Tweet;
    type Profile = TwitterProfile;

    fn source(&self) -> Source {
        Source::Twitter
    }

    async fn fetch(&self, handle: &str) -> FetchResult<Tweet, TwitterProfile> {
        let id = anon_hash(handle);
        counter!("fetch_attempts_total", "source" => "twitter").increment(1);

        for mirror in &self.mirrors {
            info!(target: "fetch", %id, %mirror, "trying twitter mirror");
            match self.try_mirror(mirror, handle).await {
                Ok(feed) => {
                    info!(target: "fetch", %id, %mirror, items = feed.tweets.len(), "mirror ok");
                    return FetchResult::found(feed.tweets, mirror.as_str())
                        .with_profile(Some(feed.profile));
                }
                Err(e) => {
                    warn!(target: "fetch", %id, %mirror, error = %e, "mirror failed");
                    counter!("mirror_failures_total").increment(1);
                }
            }
        }

        match self.search_api() {
            Some(api) => match self.try_search_api(api, handle).await {
                Ok(feed) => {
                    info!(target: "fetch", %id, items = feed.tweets.len(), "twitter search api ok");
                    return FetchResult::found(feed.tweets, ORIGIN_SEARCH_API)
                        .with_profile(Some(feed.profile));
                }
                Err(e) => warn!(target: "fetch", %id, error = %e, "twitter search api failed"),
            },
            None => debug!(target: "fetch", "twitter search api not configured"),
        }

        if let Some(feed) = self.from_cache(handle) {
            info!(target: "fetch", %id, items = feed.tweets.len(), "serving twitter items from cache");
            return FetchResult::found(feed.tweets, ORIGIN_CACHE).with_profile(Some(feed.profile));
        }

        counter!("fetch_not_found_total", "source" => "twitter").increment(1);
        info!(target: "fetch", %id, "twitter: not found on any path");
        FetchResult::not_found()
    }
}

// ------------------------------------------------------------
// Mirror feed parsing
// ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    image: Option<Image>,
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Image {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

#[derive(Debug)]
pub(crate) struct ParsedFeed {
    pub tweets: Vec<Tweet>,
    pub profile: TwitterProfile,
}

/// Parse a mirror RSS document. Item text comes from `<title>`, falling back
/// to the HTML `<description>`.
pub(crate) fn parse_feed(xml: &str) -> Result<ParsedFeed> {
    let clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&clean).context("parsing mirror rss")?;

    let tweets = rss
        .channel
        .item
        .into_iter()
        .filter_map(|it| {
            let raw = it
                .title
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .or(it.description.as_deref())?;
            let text = normalize_text(raw);
            if text.is_empty() {
                return None;
            }
            Some(Tweet {
                text,
                published_at: it.pub_date.as_deref().map(parse_rfc2822_to_unix).unwrap_or(0),
                url: it.link,
            })
        })
        .collect();

    Ok(ParsedFeed {
        tweets,
        profile: TwitterProfile {
            display_name: rss.channel.title.as_deref().and_then(display_name_from_title),
            avatar_url: rss.channel.image.and_then(|i| i.url),
            ..TwitterProfile::default()
        },
    })
}

/// Mirror channel titles look like `"Jane Doe / @jane"`.
fn display_name_from_title(title: &str) -> Option<String> {
    let name = title.split(" / @").next().unwrap_or(title).trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn parse_rfc2822_to_unix(ts: &str) -> u64 {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
        .unwrap_or(0)
}

fn parse_rfc3339_to_unix(ts: &str) -> u64 {
    OffsetDateTime::parse(ts.trim(), &Rfc3339)
        .ok()
        .map(|dt| dt.unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
        .unwrap_or(0)
}

/// HTML entities that are not defined in XML and would break the parser.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&hellip;", "...")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
