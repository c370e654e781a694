// src/fetch/credentials.rs
//! Bearer-token cache for client-credential grants.
//!
//! A token is reused until `issued_at + lifetime - margin`; after that the
//! next caller refreshes it. Concurrent callers may both refresh, which only
//! costs an extra round trip: the last writer wins and both tokens are valid.
//! There is no invalidation on request errors; expiry is the only eviction.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use std::future::Future;
use std::sync::RwLock;
use tracing::info;

/// What a token endpoint hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    /// Server-declared lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CredentialCache {
    slot: RwLock<Option<CachedToken>>,
    margin: Duration,
}

impl CredentialCache {
    pub fn new(margin_secs: i64) -> Self {
        Self {
            slot: RwLock::new(None),
            margin: Duration::try_seconds(margin_secs.max(0)).unwrap_or_default(),
        }
    }

    /// The cached token if it is still valid at `now`.
    pub fn current(&self, now: DateTime<Utc>) -> Option<String> {
        let guard = self.slot.read().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .filter(|c| now < c.expires_at)
            .map(|c| c.token.clone())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let guard = self.slot.read().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(|c| c.expires_at)
    }

    /// Return the cached token, or run `refresh` and cache its result.
    /// A failed refresh leaves the slot untouched.
    pub async fn get_or_refresh<F, Fut>(&self, now: DateTime<Utc>, refresh: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IssuedToken>>,
    {
        if let Some(token) = self.current(now) {
            return Ok(token);
        }

        let issued = refresh().await?;
        let expires_at = Duration::try_seconds(issued.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .and_then(|t| t.checked_sub_signed(self.margin))
            .ok_or_else(|| anyhow!("token lifetime out of range: {}", issued.expires_in))?;
        {
            let mut guard = self.slot.write().unwrap_or_else(|e| e.into_inner());
            *guard = Some(CachedToken {
                token: issued.access_token.clone(),
                expires_at,
            });
        }
        counter!("credential_refresh_total").increment(1);
        info!(target: "fetch", %expires_at, "bearer token (re)acquired");
        Ok(issued.access_token)
    }
}
