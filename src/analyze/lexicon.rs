// src/analyze/lexicon.rs
//! Fixed phrase lists. All entries are lower-case and matched by substring
//! containment against lower-cased text, so stems like "congrat" also cover
//! "congrats" and "congratulations".

/// Shared negative phrases (all text-based sources).
pub const NEGATIVE: &[&str] = &[
    "hate",
    "stupid",
    "idiot",
    "dumb",
    "terrible",
    "awful",
    "worst",
    "disgusting",
    "pathetic",
    "horrible",
    "loser",
    "trash",
    "garbage",
    "scam",
    "liar",
    "racist",
    "toxic",
    "shut up",
    "sucks",
    "kill",
    "moron",
    "clown",
    "fraud",
    "hypocrite",
    "screw you",
];

/// Shared positive phrases (all text-based sources).
pub const POSITIVE: &[&str] = &[
    "love",
    "thank",
    "great",
    "awesome",
    "amazing",
    "helpful",
    "happy",
    "congrat",
    "appreciate",
    "wonderful",
    "excellent",
    "grateful",
    "brilliant",
    "inspiring",
    "proud",
    "welcome",
    "glad",
    "beautiful",
    "respect",
    "generous",
    "well done",
    "good job",
    "cheers",
    "fantastic",
    "support",
];

/// News-only negative phrases layered on top of [`NEGATIVE`].
pub const NEWS_NEGATIVE: &[&str] = &[
    "arrest",
    "lawsuit",
    "sued",
    "scandal",
    "charged with",
    "convicted",
    "indicted",
    "controvers",
    "accused",
    "allegation",
    "investigation",
    "banned",
    "fined",
    "backlash",
    "misconduct",
];

/// News-only positive phrases layered on top of [`POSITIVE`].
pub const NEWS_POSITIVE: &[&str] = &[
    "award",
    "honored",
    "honoured",
    "charity",
    "donat",
    "volunteer",
    "philanthrop",
    "hero",
    "rescue",
    "achievement",
    "recogni",
    "praised",
    "innovat",
    "milestone",
    "celebrat",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_are_lowercase_and_nonempty() {
        for list in [NEGATIVE, POSITIVE, NEWS_NEGATIVE, NEWS_POSITIVE] {
            assert!(!list.is_empty());
            for p in list {
                assert!(!p.is_empty());
                assert_eq!(*p, p.to_lowercase(), "phrase must be lower-case: {p}");
            }
        }
    }

    #[test]
    fn shared_lists_do_not_overlap() {
        for p in POSITIVE {
            assert!(!NEGATIVE.contains(p), "{p} is in both shared lists");
        }
    }
}
