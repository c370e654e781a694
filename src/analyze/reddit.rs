// src/analyze/reddit.rs
//! Reddit analyzer: shared keyword lists plus community approval.
//! A downvoted comment adds 2 to the negative side, a well-upvoted one adds 1
//! to the positive side. 3 points per net hit.

use super::{tally_shared, KeywordTally, SourceDetails, SourceResult, NEUTRAL_SCORE};
use crate::fetch::reddit::RedditComment;

pub const POINTS_PER_HIT: i64 = 3;
/// Comments scoring strictly above this count as community-approved.
pub const HIGH_APPROVAL: i64 = 10;
pub const DOWNVOTE_PENALTY: usize = 2;
pub const UPVOTE_BONUS: usize = 1;

pub fn analyze(comments: &[RedditComment]) -> SourceResult {
    let mut total = KeywordTally::default();
    for c in comments {
        total.add(tally_shared(&c.text));
        if c.score < 0 {
            total.negative += DOWNVOTE_PENALTY;
        } else if c.score > HIGH_APPROVAL {
            total.positive += UPVOTE_BONUS;
        }
    }

    SourceResult::scored(
        NEUTRAL_SCORE as i64 + total.net() * POINTS_PER_HIT,
        SourceDetails::Reddit {
            positive: total.positive,
            negative: total.negative,
            total_comments: comments.len(),
        },
    )
}
