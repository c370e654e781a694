// src/analyze/news.rs
//! News analyzer: each snippet is scored against the shared lists and the
//! news-specific lists. 4 points per net hit.

use super::lexicon::{NEWS_NEGATIVE, NEWS_POSITIVE};
use super::{tally_shared, tally_text, KeywordTally, SourceDetails, SourceResult, NEUTRAL_SCORE};
use crate::fetch::news::NewsSnippet;

pub const POINTS_PER_HIT: i64 = 4;

pub fn analyze(snippets: &[NewsSnippet]) -> SourceResult {
    let mut total = KeywordTally::default();
    for s in snippets {
        total.add(tally_shared(&s.text));
        total.add(tally_text(&s.text, NEWS_POSITIVE, NEWS_NEGATIVE));
    }

    SourceResult::scored(
        NEUTRAL_SCORE as i64 + total.net() * POINTS_PER_HIT,
        SourceDetails::News {
            positive: total.positive,
            negative: total.negative,
            total_articles: snippets.len(),
        },
    )
}
