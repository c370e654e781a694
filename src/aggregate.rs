// src/aggregate.rs
//! # Weighted aggregation
//!
//! Combines whichever per-source results are present into one score.
//!
//! - Not-found entries are skipped entirely: they are excluded from both the
//!   weighted sum and the weight total, so a missing source never drags the
//!   result toward zero or toward 50.
//! - The average is normalized by the weights of the sources actually present,
//!   not by the nominal table total.
//! - With nothing present the score is 50 (unknown), which reads as NICE.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyze::{Source, SourceResult, Verdict, NEUTRAL_SCORE};

/// Process-wide source weights in `[0, 1]`. They need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightTable {
    twitter: f64,
    reddit: f64,
    news: f64,
    github: f64,
}

pub const WEIGHTS: WeightTable = WeightTable {
    twitter: 0.40,
    reddit: 0.25,
    news: 0.20,
    github: 0.15,
};

impl Default for WeightTable {
    fn default() -> Self {
        WEIGHTS
    }
}

impl WeightTable {
    pub fn weight_for(&self, source: Source) -> f64 {
        match source {
            Source::Twitter => self.twitter,
            Source::Reddit => self.reddit,
            Source::News => self.news,
            Source::GitHub => self.github,
        }
    }

    pub fn as_map(&self) -> BTreeMap<Source, f64> {
        Source::ALL.iter().map(|s| (*s, self.weight_for(*s))).collect()
    }
}

/// A found source's result joined with its display weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedResult {
    #[serde(flatten)]
    pub result: SourceResult,
    pub weight_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub final_score: u8,
    pub verdict: Verdict,
    pub breakdown: BTreeMap<Source, WeightedResult>,
    pub sources_found: usize,
}

/// Weighted mean over found sources, normalized by their weights only.
pub fn aggregate(results: &BTreeMap<Source, SourceResult>, table: &WeightTable) -> AggregateResult {
    let mut weighted_sum = 0.0f64;
    let mut total_weight = 0.0f64;
    let mut breakdown = BTreeMap::new();

    for (source, result) in results {
        let Some(score) = result.score() else {
            continue;
        };
        let w = table.weight_for(*source);
        weighted_sum += f64::from(score) * w;
        total_weight += w;
        breakdown.insert(
            *source,
            WeightedResult {
                result: result.clone(),
                weight_percent: (w * 100.0).round() as u8,
            },
        );
    }

    let final_score = if total_weight > 0.0 {
        (weighted_sum / total_weight).round().clamp(0.0, 100.0) as u8
    } else {
        NEUTRAL_SCORE
    };

    AggregateResult {
        final_score,
        verdict: Verdict::from_score(final_score),
        sources_found: breakdown.len(),
        breakdown,
    }
}
