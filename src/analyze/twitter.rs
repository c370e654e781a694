// src/analyze/twitter.rs
//! Twitter analyzer: shared keyword lists, 5 points per net hit, plus up to
//! three example tweets per polarity.

use super::{tally_shared, KeywordTally, SourceDetails, SourceResult, NEUTRAL_SCORE};
use crate::fetch::twitter::Tweet;

pub const POINTS_PER_HIT: i64 = 5;
pub const MAX_EXAMPLES: usize = 3;

pub fn analyze(tweets: &[Tweet], origin: Option<&str>) -> SourceResult {
    let mut total = KeywordTally::default();
    let mut nice = Vec::new();
    let mut naughty = Vec::new();

    for t in tweets {
        let hit = tally_shared(&t.text);
        if hit.positive > hit.negative && nice.len() < MAX_EXAMPLES {
            nice.push(t.text.clone());
        } else if hit.negative > hit.positive && naughty.len() < MAX_EXAMPLES {
            naughty.push(t.text.clone());
        }
        total.add(hit);
    }

    let (positive_percent, negative_percent) = percentages(&total);
    SourceResult::scored(
        NEUTRAL_SCORE as i64 + total.net() * POINTS_PER_HIT,
        SourceDetails::Twitter {
            positive: total.positive,
            negative: total.negative,
            total_tweets: tweets.len(),
            positive_percent,
            negative_percent,
            nice_examples: nice,
            naughty_examples: naughty,
            origin: origin.map(str::to_string),
        },
    )
}

/// Share of positive/negative hits, rounded; `(0, 0)` with no hits.
fn percentages(t: &KeywordTally) -> (u8, u8) {
    let hits = t.positive + t.negative;
    if hits == 0 {
        return (0, 0);
    }
    let pct = |n: usize| ((n as f64 * 100.0) / hits as f64).round() as u8;
    (pct(t.positive), pct(t.negative))
}
