// src/pipeline.rs
//! Orchestrator: fetch → analyze per source, then aggregate.
//!
//! The four fetches run concurrently on the request's task. None of them can
//! fail the request; a source that errors is simply reported as not found.
//! The primary profile is assembled on the side and never feeds the score.

use metrics::{counter, histogram};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::aggregate::{aggregate, AggregateResult, WeightTable, WEIGHTS};
use crate::analyze::{self, Source, SourceResult};
use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::fetch::credentials::CredentialCache;
use crate::fetch::github::{GitHubEvent, GitHubFetcher, GitHubProfile};
use crate::fetch::news::{NewsFetcher, NewsSnippet};
use crate::fetch::reddit::{RedditComment, RedditFetcher};
use crate::fetch::twitter::{Tweet, TwitterFetcher, TwitterProfile};
use crate::fetch::twitter_cache::StaticCache;
use crate::fetch::{FetchResult, HttpTransport, SourceFetcher};
use crate::identity::{anon_hash, normalize_identifier, ProfileOrigin, UserProfile};

/// Upper bound on raw texts handed to the assistant.
pub const MAX_CONTEXT_ENTRIES: usize = 40;

/// Legacy single-source payload: the twitter analysis only.
#[derive(Debug, Clone, Serialize)]
pub struct SingleReport {
    pub user: UserProfile,
    pub analysis: SourceResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiReport {
    pub user: UserProfile,
    #[serde(flatten)]
    pub aggregate: AggregateResult,
    pub weights: BTreeMap<Source, f64>,
}

pub struct Pipeline {
    twitter: TwitterFetcher,
    reddit: RedditFetcher,
    news: NewsFetcher,
    github: GitHubFetcher,
    weights: WeightTable,
}

/// Raw output of one concurrent round of fetches.
struct Fetched {
    twitter: FetchResult<Tweet, TwitterProfile>,
    reddit: FetchResult<RedditComment>,
    news: FetchResult<NewsSnippet>,
    github: FetchResult<GitHubEvent, GitHubProfile>,
}

impl Pipeline {
    pub fn new(cfg: &AppConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let credentials = Arc::new(CredentialCache::new(cfg.reddit.token_margin_secs));
        Self {
            twitter: TwitterFetcher::new(&cfg.twitter, transport.clone()),
            reddit: RedditFetcher::new(&cfg.reddit, transport.clone(), credentials),
            news: NewsFetcher::new(&cfg.news, transport.clone()),
            github: GitHubFetcher::new(&cfg.github, transport),
            weights: WEIGHTS,
        }
    }

    /// Replace the embedded last-resort twitter cache.
    pub fn with_twitter_cache(mut self, cache: StaticCache) -> Self {
        self.twitter = self.twitter.with_cache(cache);
        self
    }

    /// Twitter only, in the legacy `{user, analysis}` shape.
    pub async fn analyze_single(&self, raw: &str) -> Result<SingleReport, PipelineError> {
        let identifier = normalize_identifier(raw).ok_or(PipelineError::MissingIdentifier)?;
        let started = Instant::now();
        let id = anon_hash(&identifier);
        counter!("pipeline_runs_total", "mode" => "single").increment(1);

        let fetched = self.twitter.fetch(&identifier).await;
        let analysis = analyze_twitter(&fetched);
        let user = fetched
            .profile
            .as_ref()
            .filter(|_| fetched.found)
            .map(|p| profile_from_twitter(&identifier, p))
            .unwrap_or_else(|| UserProfile::placeholder(&identifier));

        let elapsed = started.elapsed().as_millis() as f64;
        histogram!("pipeline_ms", "mode" => "single").record(elapsed);
        info!(target: "pipeline", %id, found = analysis.found(), score = ?analysis.score(), ms = elapsed, "single analysis done");
        Ok(SingleReport { user, analysis })
    }

    /// All four sources, weighted into one verdict.
    pub async fn analyze_all(&self, raw: &str) -> Result<MultiReport, PipelineError> {
        let identifier = normalize_identifier(raw).ok_or(PipelineError::MissingIdentifier)?;
        let started = Instant::now();
        let id = anon_hash(&identifier);
        counter!("pipeline_runs_total", "mode" => "all").increment(1);

        let fetched = self.fetch_all(&identifier).await;

        let mut results = BTreeMap::new();
        results.insert(Source::Twitter, analyze_twitter(&fetched.twitter));
        results.insert(Source::Reddit, analyze_or_missing(&fetched.reddit, analyze::reddit::analyze));
        results.insert(Source::News, analyze_or_missing(&fetched.news, analyze::news::analyze));
        results.insert(
            Source::GitHub,
            analyze::github::analyze(fetched.github.profile.as_ref(), &fetched.github.items),
        );
        for (source, r) in &results {
            debug!(target: "pipeline", %id, %source, found = r.found(), score = ?r.score(), "source analyzed");
        }

        let aggregate = aggregate(&results, &self.weights);
        let user = primary_profile(&identifier, &fetched);

        let elapsed = started.elapsed().as_millis() as f64;
        histogram!("pipeline_ms", "mode" => "all").record(elapsed);
        info!(
            target: "pipeline",
            %id,
            final_score = aggregate.final_score,
            sources_found = aggregate.sources_found,
            ms = elapsed,
            "multi-source analysis done"
        );

        Ok(MultiReport {
            user,
            aggregate,
            weights: self.weights.as_map(),
        })
    }

    /// Raw item texts from every source, interleaved so no single source
    /// crowds out the others, capped at [`MAX_CONTEXT_ENTRIES`].
    pub async fn collect_context(&self, raw: &str) -> Result<Vec<String>, PipelineError> {
        let identifier = normalize_identifier(raw).ok_or(PipelineError::MissingIdentifier)?;
        let fetched = self.fetch_all(&identifier).await;

        let mut lanes: Vec<std::vec::IntoIter<String>> = vec![
            labeled(Source::Twitter, fetched.twitter.items.iter().map(|t| t.text.as_str())),
            labeled(Source::Reddit, fetched.reddit.items.iter().map(|c| c.text.as_str())),
            labeled(Source::News, fetched.news.items.iter().map(|s| s.text.as_str())),
            fetched
                .github
                .items
                .iter()
                .map(|e| format!("[{}] {}", Source::GitHub, e.summary()))
                .collect::<Vec<_>>()
                .into_iter(),
        ];

        let mut out = Vec::new();
        while out.len() < MAX_CONTEXT_ENTRIES {
            let before = out.len();
            for lane in lanes.iter_mut() {
                if out.len() == MAX_CONTEXT_ENTRIES {
                    break;
                }
                if let Some(line) = lane.next() {
                    out.push(line);
                }
            }
            if out.len() == before {
                break;
            }
        }
        debug!(target: "pipeline", id = %anon_hash(&identifier), entries = out.len(), "context collected");
        Ok(out)
    }

    async fn fetch_all(&self, identifier: &str) -> Fetched {
        let (twitter, reddit, news, github) = tokio::join!(
            self.twitter.fetch(identifier),
            self.reddit.fetch(identifier),
            self.news.fetch(identifier),
            self.github.fetch(identifier),
        );
        for (source, found) in [
            (self.twitter.source(), twitter.found),
            (self.reddit.source(), reddit.found),
            (self.news.source(), news.found),
            (self.github.source(), github.found),
        ] {
            debug!(target: "pipeline", %source, found, "fetch finished");
        }
        Fetched {
            twitter,
            reddit,
            news,
            github,
        }
    }
}

fn analyze_twitter(f: &FetchResult<Tweet, TwitterProfile>) -> SourceResult {
    if f.found {
        analyze::twitter::analyze(&f.items, f.origin.as_deref())
    } else {
        SourceResult::not_found()
    }
}

fn analyze_or_missing<I, P>(f: &FetchResult<I, P>, analyze: fn(&[I]) -> SourceResult) -> SourceResult {
    if f.found {
        analyze(&f.items)
    } else {
        SourceResult::not_found()
    }
}

fn labeled<'a>(source: Source, texts: impl Iterator<Item = &'a str>) -> std::vec::IntoIter<String> {
    texts
        .filter(|t| !t.trim().is_empty())
        .map(|t| format!("[{source}] {t}"))
        .collect::<Vec<_>>()
        .into_iter()
}

/// Twitter profile, else GitHub profile, else a placeholder.
fn primary_profile(identifier: &str, fetched: &Fetched) -> UserProfile {
    if fetched.twitter.found {
        if let Some(p) = &fetched.twitter.profile {
            return profile_from_twitter(identifier, p);
        }
    }
    if let Some(p) = &fetched.github.profile {
        return profile_from_github(identifier, p);
    }
    UserProfile::placeholder(identifier)
}

fn non_blank(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn profile_from_twitter(identifier: &str, p: &TwitterProfile) -> UserProfile {
    UserProfile {
        username: identifier.to_string(),
        display_name: non_blank(&p.display_name).unwrap_or_else(|| identifier.to_string()),
        avatar_url: non_blank(&p.avatar_url),
        bio: non_blank(&p.bio),
        followers: p.followers,
        following: p.following,
        origin: ProfileOrigin::Twitter,
    }
}

fn profile_from_github(identifier: &str, p: &GitHubProfile) -> UserProfile {
    UserProfile {
        username: identifier.to_string(),
        display_name: non_blank(&p.name).unwrap_or_else(|| p.login.clone()),
        avatar_url: non_blank(&p.avatar_url),
        bio: non_blank(&p.bio),
        followers: Some(p.followers),
        following: Some(p.following),
        origin: ProfileOrigin::GitHub,
    }
}
