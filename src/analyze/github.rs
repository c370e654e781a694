// src/analyze/github.rs
//! GitHub analyzer. No keyword lists: the score is 50 plus a non-negative
//! signal derived from profile counts and recent public activity.
//!
//! A missing profile is scored as neutral (50) and still counts as found, so
//! "no account" weighs in the aggregate as neutral evidence.

use super::{SourceDetails, SourceResult, NEUTRAL_SCORE};
use crate::fetch::github::{EventKind, GitHubEvent, GitHubProfile};

pub const REPO_CAP: u64 = 30;
pub const REPOS_PER_POINT: u64 = 3;
pub const FOLLOWERS_PER_POINT: u64 = 10;
pub const FOLLOWER_POINTS_CAP: u64 = 10;

pub const BIO_POINTS: i64 = 3;
pub const NAME_POINTS: i64 = 2;
pub const BLOG_POINTS: i64 = 2;

pub const PUSH_WEIGHT: i64 = 1;
/// Cross-repository collaboration counts the most.
pub const PULL_REQUEST_WEIGHT: i64 = 3;
pub const ISSUE_WEIGHT: i64 = 2;

pub fn analyze(profile: Option<&GitHubProfile>, events: &[GitHubEvent]) -> SourceResult {
    let Some(p) = profile else {
        return SourceResult::scored(
            NEUTRAL_SCORE as i64,
            SourceDetails::GitHub {
                profile_found: false,
                signal: 0,
                public_repos: 0,
                followers: 0,
                pushes: 0,
                pull_requests: 0,
                issues: 0,
            },
        );
    };

    let count = |k: EventKind| events.iter().filter(|e| e.kind == k).count();
    let pushes = count(EventKind::Push);
    let pull_requests = count(EventKind::PullRequest);
    let issues = count(EventKind::Issue);

    let signal = profile_signal(p)
        + pushes as i64 * PUSH_WEIGHT
        + pull_requests as i64 * PULL_REQUEST_WEIGHT
        + issues as i64 * ISSUE_WEIGHT;

    SourceResult::scored(
        NEUTRAL_SCORE as i64 + signal,
        SourceDetails::GitHub {
            profile_found: true,
            signal,
            public_repos: p.public_repos,
            followers: p.followers,
            pushes,
            pull_requests,
            issues,
        },
    )
}

fn profile_signal(p: &GitHubProfile) -> i64 {
    let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

    let repos = (p.public_repos.min(REPO_CAP) / REPOS_PER_POINT) as i64;
    let followers = (p.followers / FOLLOWERS_PER_POINT).min(FOLLOWER_POINTS_CAP) as i64;
    let mut completeness = 0;
    if filled(&p.bio) {
        completeness += BIO_POINTS;
    }
    if filled(&p.name) {
        completeness += NAME_POINTS;
    }
    if filled(&p.blog) {
        completeness += BLOG_POINTS;
    }
    repos + followers + completeness
}
