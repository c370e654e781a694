// src/config.rs
//! Runtime configuration.
//!
//! Load order: built-in defaults → TOML file → environment overrides.
//! The TOML file is taken from `$APP_CONFIG_PATH`, else `config/app.toml`
//! if it exists. Credentials are normally supplied through the environment
//! (or `.env`, loaded by the binary).

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "APP_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";

pub const DEFAULT_USER_AGENT: &str =
    "naughty-or-nice/0.1 (+https://github.com/naughty-or-nice/naughty-or-nice)";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub user_agent: String,
    pub twitter: TwitterConfig,
    pub reddit: RedditConfig,
    pub news: NewsConfig,
    pub github: GitHubConfig,
    pub assistant: AssistantConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            twitter: TwitterConfig::default(),
            reddit: RedditConfig::default(),
            news: NewsConfig::default(),
            github: GitHubConfig::default(),
            assistant: AssistantConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    /// Mirror base URLs, tried in this order.
    pub mirrors: Vec<String>,
    pub mirror_timeout_secs: u64,
    pub search_api_base: String,
    pub bearer_token: Option<String>,
    pub max_results: usize,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            mirrors: vec![
                "https://nitter.net".into(),
                "https://nitter.poast.org".into(),
                "https://nitter.privacydev.net".into(),
                "https://xcancel.com".into(),
            ],
            mirror_timeout_secs: 8,
            search_api_base: "https://api.twitter.com/2".into(),
            bearer_token: None,
            max_results: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub token_url: String,
    pub api_base: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub comment_limit: usize,
    /// Subtracted from the server-declared token lifetime.
    pub token_margin_secs: i64,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            token_url: "https://www.reddit.com/api/v1/access_token".into(),
            api_base: "https://oauth.reddit.com".into(),
            client_id: None,
            client_secret: None,
            comment_limit: 25,
            token_margin_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub search_url: String,
    pub max_results: usize,
    pub min_snippet_len: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            search_url: "https://html.duckduckgo.com/html/".into(),
            max_results: 15,
            min_snippet_len: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub events_per_page: usize,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".into(),
            token: None,
            events_per_page: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".into(),
            model: "gpt-4o-mini".into(),
            api_key: None,
            max_tokens: 400,
        }
    }
}

impl AppConfig {
    /// Defaults, then the config file (if any), then the process environment.
    pub fn load() -> Result<Self> {
        let mut cfg = match config_path()? {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing config toml")
    }

    /// Overlay values from an environment lookup. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("NITTER_MIRRORS") {
            let mirrors: Vec<String> = v
                .split(',')
                .map(|m| m.trim().trim_end_matches('/').to_string())
                .filter(|m| !m.is_empty())
                .collect();
            if !mirrors.is_empty() {
                self.twitter.mirrors = mirrors;
            }
        }
        if let Some(secs) = get("MIRROR_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.twitter.mirror_timeout_secs = secs;
        }
        if let Some(v) = get("TWITTER_BEARER_TOKEN") {
            self.twitter.bearer_token = Some(v);
        }
        if let Some(v) = get("REDDIT_CLIENT_ID") {
            self.reddit.client_id = Some(v);
        }
        if let Some(v) = get("REDDIT_CLIENT_SECRET") {
            self.reddit.client_secret = Some(v);
        }
        if let Some(v) = get("GITHUB_TOKEN") {
            self.github.token = Some(v);
        }
        if let Some(v) = get("OPENAI_API_KEY") {
            self.assistant.api_key = Some(v);
        }
        if let Some(v) = get("OPENAI_MODEL") {
            self.assistant.model = v;
        }
    }
}

fn config_path() -> Result<Option<PathBuf>> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(Some(pb));
        }
        return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_PATH);
    Ok(default.exists().then_some(default))
}
