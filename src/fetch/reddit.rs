// src/fetch/reddit.rs
//! Reddit fetcher: client-credential bearer token (cached in an injected
//! [`CredentialCache`]) then one page of the user's recent public comments.
//! Private, suspended or unknown users come back as not found.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::credentials::{CredentialCache, IssuedToken};
use super::{encode_component, FetchResult, HttpRequest, HttpTransport, SourceFetcher};
use crate::analyze::Source;
use crate::config::RedditConfig;
use crate::identity::anon_hash;
use crate::text::collapse_ws;

pub const ORIGIN_OAUTH: &str = "oauth";

#[derive(Debug, Clone, PartialEq)]
pub struct RedditComment {
    pub text: String,
    /// Net community approval (upvotes minus downvotes).
    pub score: i64,
    pub subreddit: Option<String>,
    pub permalink: Option<String>,
}

pub struct RedditFetcher {
    transport: Arc<dyn HttpTransport>,
    token_url: String,
    api_base: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    limit: usize,
    credentials: Arc<CredentialCache>,
}

#[derive(Deserialize)]
struct TokenResp {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Deserialize)]
struct Child {
    data: CommentData,
}

#[derive(Deserialize)]
struct CommentData {
    #[serde(default)]
    body: String,
    #[serde(default)]
    score: i64,
    subreddit: Option<String>,
    permalink: Option<String>,
}

impl RedditFetcher {
    pub fn new(
        cfg: &RedditConfig,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<CredentialCache>,
    ) -> Self {
        Self {
            transport,
            token_url: cfg.token_url.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
            limit: cfg.comment_limit.clamp(1, 100),
            credentials,
        }
    }

    async fn request_token(&self, client_id: &str, client_secret: &str) -> Result<IssuedToken> {
        let req = HttpRequest::post(&self.token_url)
            .basic_auth(client_id, client_secret)
            .form(&[("grant_type", "client_credentials")]);
        let resp = self.transport.send(req).await?;
        if !resp.is_success() {
            bail!("token endpoint returned status {}", resp.status);
        }
        let tok: TokenResp = resp.json().context("token response")?;
        Ok(IssuedToken {
            access_token: tok.access_token,
            expires_in: tok.expires_in,
        })
    }

    async fn try_fetch(&self, username: &str) -> Result<Option<Vec<RedditComment>>> {
        let (Some(id), Some(secret)) = (self.client_id.as_deref(), self.client_secret.as_deref())
        else {
            bail!("reddit client credentials not configured");
        };

        let token = self
            .credentials
            .get_or_refresh(Utc::now(), || self.request_token(id, secret))
            .await?;

        let url = format!(
            "{}/user/{}/comments?limit={}&raw_json=1",
            self.api_base,
            encode_component(username),
            self.limit
        );
        let resp = self.transport.send(HttpRequest::get(url).bearer(&token)).await?;
        if !resp.is_success() {
            info!(target: "fetch", status = resp.status, "reddit profile unavailable");
            return Ok(None);
        }

        let listing: Listing = resp.json().context("comment listing")?;
        let comments = listing
            .data
            .children
            .into_iter()
            .filter_map(|c| {
                let text = collapse_ws(&c.data.body);
                (!text.is_empty()).then(|| RedditComment {
                    text,
                    score: c.data.score,
                    subreddit: c.data.subreddit,
                    permalink: c.data.permalink,
                })
            })
            .collect();
        Ok(Some(comments))
    }
}

#[async_trait]
impl SourceFetcher for RedditFetcher {
    type Item = RedditComment;
    type Profile = ();

    fn source(&self) -> Source {
        Source::Reddit
    }

    async fn fetch(&self, username: &str) -> FetchResult<RedditComment> {
        let id = anon_hash(username);
        counter!("fetch_attempts_total", "source" => "reddit").increment(1);

        match self.try_fetch(username).await {
            Ok(Some(comments)) => {
                info!(target: "fetch", %id, items = comments.len(), "reddit comments fetched");
                FetchResult::found(comments, ORIGIN_OAUTH)
            }
            Ok(None) => {
                counter!("fetch_not_found_total", "source" => "reddit").increment(1);
                FetchResult::not_found()
            }
            Err(e) => {
                warn!(target: "fetch", %id, error = %e, "reddit fetch failed");
                counter!("fetch_not_found_total", "source" => "reddit").increment(1);
                FetchResult::not_found()
            }
        }
    }
}
