// src/identity.rs
//! The identifier shared by all four sources, and the display profile built
//! around it. The same string is used as a Twitter handle, a Reddit username,
//! a news search keyword and a GitHub login.

use serde::Serialize;

use crate::fetch::encode_component;

/// Trim whitespace and a single leading `@`. Returns `None` if nothing is left.
pub fn normalize_identifier(raw: &str) -> Option<String> {
    let t = raw.trim();
    let t = t.strip_prefix('@').unwrap_or(t).trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Short, stable, non-reversible id for log lines.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileOrigin {
    Twitter,
    #[serde(rename = "github")]
    GitHub,
    Placeholder,
}

/// Display-only profile. Never feeds into scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub origin: ProfileOrigin,
}

impl UserProfile {
    /// Built from the identifier alone, used when no source has a profile.
    pub fn placeholder(identifier: &str) -> Self {
        Self {
            username: identifier.to_string(),
            display_name: identifier.to_string(),
            avatar_url: Some(format!(
                "https://api.dicebear.com/7.x/identicon/svg?seed={}",
                encode_component(identifier)
            )),
            bio: None,
            followers: None,
            following: None,
            origin: ProfileOrigin::Placeholder,
        }
    }
}
