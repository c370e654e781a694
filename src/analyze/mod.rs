// src/analyze/mod.rs
//! Per-source analyzers: pure functions mapping fetched items to a bounded
//! `SourceResult`. Nothing in here performs I/O or keeps state between calls.

pub mod github;
pub mod lexicon;
pub mod news;
pub mod reddit;
pub mod twitter;

use serde::{Serialize, Serializer};
use std::fmt;

/// Neutral score used whenever there is no evidence either way.
pub const NEUTRAL_SCORE: u8 = 50;

/// The four independent sources feeding the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Twitter,
    Reddit,
    News,
    #[serde(rename = "github")]
    GitHub,
}

impl Source {
    pub const ALL: [Source; 4] = [Source::Twitter, Source::Reddit, Source::News, Source::GitHub];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Twitter => "twitter",
            Source::Reddit => "reddit",
            Source::News => "news",
            Source::GitHub => "github",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Nice,
    Naughty,
}

impl Verdict {
    /// The single verdict rule: NICE at 50 and above.
    pub fn from_score(score: u8) -> Self {
        if score >= NEUTRAL_SCORE {
            Verdict::Nice
        } else {
            Verdict::Naughty
        }
    }
}

/// Clamp an unbounded signed score into `[0, 100]`.
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

/// Source-specific supporting counts carried next to the score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SourceDetails {
    #[serde(rename_all = "camelCase")]
    Twitter {
        positive: usize,
        negative: usize,
        total_tweets: usize,
        positive_percent: u8,
        negative_percent: u8,
        nice_examples: Vec<String>,
        naughty_examples: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        origin: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Reddit {
        positive: usize,
        negative: usize,
        total_comments: usize,
    },
    #[serde(rename_all = "camelCase")]
    News {
        positive: usize,
        negative: usize,
        total_articles: usize,
    },
    #[serde(rename_all = "camelCase")]
    GitHub {
        profile_found: bool,
        signal: i64,
        public_repos: u64,
        followers: u64,
        pushes: usize,
        pull_requests: usize,
        issues: usize,
    },
}

/// Outcome of analyzing one source.
///
/// The verdict is never stored; it is derived from the score when read or
/// serialized, so a found result always satisfies `verdict == (score >= 50)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceResult {
    score: Option<u8>,
    details: Option<SourceDetails>,
}

impl SourceResult {
    /// A found result. The score is clamped before it is stored.
    pub fn scored(raw: i64, details: SourceDetails) -> Self {
        Self {
            score: Some(clamp_score(raw)),
            details: Some(details),
        }
    }

    pub fn not_found() -> Self {
        Self {
            score: None,
            details: None,
        }
    }

    pub fn found(&self) -> bool {
        self.score.is_some()
    }

    pub fn score(&self) -> Option<u8> {
        self.score
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.score.map(Verdict::from_score)
    }

    pub fn details(&self) -> Option<&SourceDetails> {
        self.details.as_ref()
    }
}

impl Serialize for SourceResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            found: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            score: Option<u8>,
            #[serde(skip_serializing_if = "Option::is_none")]
            verdict: Option<Verdict>,
            #[serde(flatten)]
            details: Option<&'a SourceDetails>,
        }
        Wire {
            found: self.found(),
            score: self.score,
            verdict: self.verdict(),
            details: self.details.as_ref(),
        }
        .serialize(serializer)
    }
}

/// Positive/negative phrase hits accumulated over a batch of texts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordTally {
    pub positive: usize,
    pub negative: usize,
}

impl KeywordTally {
    pub fn net(&self) -> i64 {
        self.positive as i64 - self.negative as i64
    }

    pub fn add(&mut self, other: KeywordTally) {
        self.positive += other.positive;
        self.negative += other.negative;
    }
}

/// Count how many phrases of `list` occur in `lowered`. Each phrase counts once.
pub fn count_phrases(lowered: &str, list: &[&str]) -> usize {
    list.iter().filter(|p| lowered.contains(*p)).count()
}

/// Scan one text against a positive and a negative list (case-insensitive containment).
pub fn tally_text(text: &str, positive: &[&str], negative: &[&str]) -> KeywordTally {
    let lowered = text.to_lowercase();
    KeywordTally {
        positive: count_phrases(&lowered, positive),
        negative: count_phrases(&lowered, negative),
    }
}

/// Shared-list tally, used by the text-based analyzers.
pub fn tally_shared(text: &str) -> KeywordTally {
    tally_text(text, lexicon::POSITIVE, lexicon::NEGATIVE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_boundary_is_fifty() {
        assert_eq!(Verdict::from_score(50), Verdict::Nice);
        assert_eq!(Verdict::from_score(49), Verdict::Naughty);
        assert_eq!(Verdict::from_score(100), Verdict::Nice);
        assert_eq!(Verdict::from_score(0), Verdict::Naughty);
    }

    #[test]
    fn scored_clamps_and_derives_verdict() {
        let d = SourceDetails::News {
            positive: 0,
            negative: 0,
            total_articles: 0,
        };
        let hi = SourceResult::scored(250, d.clone());
        assert_eq!(hi.score(), Some(100));
        assert_eq!(hi.verdict(), Some(Verdict::Nice));

        let lo = SourceResult::scored(-40, d);
        assert_eq!(lo.score(), Some(0));
        assert_eq!(lo.verdict(), Some(Verdict::Naughty));
    }

    #[test]
    fn not_found_has_no_score_or_verdict() {
        let r = SourceResult::not_found();
        assert!(!r.found());
        assert!(r.score().is_none());
        assert!(r.verdict().is_none());
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v, serde_json::json!({ "found": false }));
    }

    #[test]
    fn serialized_result_flattens_details() {
        let r = SourceResult::scored(
            47,
            SourceDetails::Reddit {
                positive: 2,
                negative: 3,
                total_comments: 2,
            },
        );
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["found"], true);
        assert_eq!(v["score"], 47);
        assert_eq!(v["verdict"], "NAUGHTY");
        assert_eq!(v["totalComments"], 2);
    }

    #[test]
    fn phrase_counting_is_case_insensitive_and_once_per_phrase() {
        let t = tally_text("LOVE love Love and hate", &["love"], &["hate", "dislike"]);
        assert_eq!(t, KeywordTally { positive: 1, negative: 1 });
    }
}
