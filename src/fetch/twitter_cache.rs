// src/fetch/twitter_cache.rs
//! Last-resort stand-in for a handful of well-known accounts, used only after
//! every mirror and the search API have failed.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

static EMBEDDED: Lazy<Arc<HashMap<String, CachedAccount>>> = Lazy::new(|| {
    let raw = include_str!("../../data/twitter_cache.json");
    match parse_accounts(raw) {
        Ok(map) => Arc::new(map),
        Err(e) => {
            tracing::warn!(target: "fetch", error = %e, "embedded twitter cache unreadable");
            Arc::new(HashMap::new())
        }
    }
});

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CachedAccount {
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    pub tweets: Vec<String>,
}

/// Read-only handle → account map. Keys are matched case-insensitively.
#[derive(Debug, Clone)]
pub struct StaticCache {
    accounts: Arc<HashMap<String, CachedAccount>>,
}

impl StaticCache {
    pub fn embedded() -> Self {
        Self {
            accounts: EMBEDDED.clone(),
        }
    }

    pub fn empty() -> Self {
        Self {
            accounts: Arc::new(HashMap::new()),
        }
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        Ok(Self {
            accounts: Arc::new(parse_accounts(raw)?),
        })
    }

    pub fn lookup(&self, handle: &str) -> Option<&CachedAccount> {
        self.accounts.get(&handle.to_ascii_lowercase())
    }
}

fn parse_accounts(raw: &str) -> anyhow::Result<HashMap<String, CachedAccount>> {
    let parsed: HashMap<String, CachedAccount> = serde_json::from_str(raw)?;
    Ok(parsed
        .into_iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v))
        .collect())
}
