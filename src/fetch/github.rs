// src/fetch/github.rs
//! GitHub fetcher: public profile plus one page of recent public events.
//! A missing profile is not found; failed events still return the profile
//! with an empty event list.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::{encode_component, FetchResult, HttpRequest, HttpTransport, SourceFetcher};
use crate::analyze::Source;
use crate::config::GitHubConfig;
use crate::identity::anon_hash;

pub const ORIGIN_REST: &str = "rest";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitHubProfile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub blog: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Push,
    PullRequest,
    Issue,
    Other,
}

impl EventKind {
    fn from_api(t: &str) -> Self {
        match t {
            "PushEvent" => EventKind::Push,
            "PullRequestEvent" => EventKind::PullRequest,
            "IssuesEvent" => EventKind::Issue,
            _ => EventKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubEvent {
    pub kind: EventKind,
    pub repo: Option<String>,
}

impl GitHubEvent {
    /// One-line description, used as context text.
    pub fn summary(&self) -> String {
        let what = match self.kind {
            EventKind::Push => "pushed to",
            EventKind::PullRequest => "opened a pull request on",
            EventKind::Issue => "opened an issue on",
            EventKind::Other => "was active on",
        };
        format!("{what} {}", self.repo.as_deref().unwrap_or("a repository"))
    }
}

#[derive(Deserialize)]
struct ApiEvent {
    #[serde(rename = "type")]
    kind: String,
    repo: Option<ApiRepo>,
}

#[derive(Deserialize)]
struct ApiRepo {
    name: String,
}

pub struct GitHubFetcher {
    transport: Arc<dyn HttpTransport>,
    api_base: String,
    token: Option<String>,
    per_page: usize,
}

impl GitHubFetcher {
    pub fn new(cfg: &GitHubConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            token: cfg.token.clone(),
            per_page: cfg.events_per_page.clamp(1, 100),
        }
    }

    fn request(&self, url: String) -> HttpRequest {
        let req = HttpRequest::get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        match &self.token {
            Some(t) => req.bearer(t),
            None => req,
        }
    }

    async fn profile(&self, login: &str) -> Result<Option<GitHubProfile>> {
        let url = format!("{}/users/{}", self.api_base, encode_component(login));
        let resp = self.transport.send(self.request(url)).await?;
        match resp.status {
            404 => Ok(None),
            s if (200..300).contains(&s) => Ok(Some(resp.json().context("github profile")?)),
            s => bail!("profile lookup returned status {s}"),
        }
    }

    async fn events(&self, login: &str) -> Result<Vec<GitHubEvent>> {
        let url = format!(
            "{}/users/{}/events/public?per_page={}",
            self.api_base,
            encode_component(login),
            self.per_page
        );
        let resp = self.transport.send(self.request(url)).await?;
        if !resp.is_success() {
            bail!("events returned status {}", resp.status);
        }
        let raw: Vec<ApiEvent> = resp.json().context("github events")?;
        Ok(raw
            .into_iter()
            .map(|e| GitHubEvent {
                kind: EventKind::from_api(&e.kind),
                repo: e.repo.map(|r| r.name),
            })
            .collect())
    }
}

#[async_trait]
impl SourceFetcher for GitHubFetcher {
    type Item = GitHubEvent;
    type Profile = GitHubProfile;

    fn source(&self) -> Source {
        Source::GitHub
    }

    async fn fetch(&self, login: &str) -> FetchResult<GitHubEvent, GitHubProfile> {
        let id = anon_hash(login);
        counter!("fetch_attempts_total", "source" => "github").increment(1);

        let profile = match self.profile(login).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                info!(target: "fetch", %id, "github profile not found");
                counter!("fetch_not_found_total", "source" => "github").increment(1);
                return FetchResult::not_found();
            }
            Err(e) => {
                warn!(target: "fetch", %id, error = %e, "github profile failed");
                counter!("fetch_not_found_total", "source" => "github").increment(1);
                return FetchResult::not_found();
            }
        };

        let events = self.events(login).await.unwrap_or_else(|e| {
            warn!(target: "fetch", %id, error = %e, "github events failed, continuing with profile");
            Vec::new()
        });
        info!(target: "fetch", %id, events = events.len(), "github profile fetched");
        FetchResult::found(events, ORIGIN_REST).with_profile(Some(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kinds_map_from_api_names() {
        assert_eq!(EventKind::from_api("PushEvent"), EventKind::Push);
        assert_eq!(EventKind::from_api("PullRequestEvent"), EventKind::PullRequest);
        assert_eq!(EventKind::from_api("IssuesEvent"), EventKind::Issue);
        assert_eq!(EventKind::from_api("WatchEvent"), EventKind::Other);
    }

    #[test]
    fn profile_tolerates_missing_counts() {
        let p: GitHubProfile =
            serde_json::from_str(r#"{"login":"jane","name":null,"bio":null,"blog":""}"#).unwrap();
        assert_eq!(p.public_repos, 0);
        assert_eq!(p.blog.as_deref(), Some(""));
    }
}
