//! Similarity scoring between recommendation records and library candidates.
//!
//! Two bounded signals per field: token-set overlap (robust to word
//! reordering and punctuation drift) and a character-level alignment ratio
//! (rewards near-identical strings, penalizes large length differences).

use crate::models::{CandidateTrack, SourceTrack};
use crate::normalize::{normalize, tokenize};

/// Signal weights within a single field score.
const TOKEN_WEIGHT: f64 = 0.6;
const SEQUENCE_WEIGHT: f64 = 0.4;

/// Field weights for the overall score. Title is the most specific
/// discriminator; album naming varies most across catalogs (compilations,
/// reissues, deluxe editions) so it carries the least weight.
const TITLE_WEIGHT: f64 = 0.5;
const ARTIST_WEIGHT: f64 = 0.35;
const ALBUM_WEIGHT: f64 = 0.15;

/// Jaccard similarity over normalized word sets.
/// 0.0 when either side has no tokens.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();

    intersection as f64 / union as f64
}

/// Character-level alignment ratio between the normalized strings, in [0,1].
pub fn sequence_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&normalize(a), &normalize(b))
}

/// Combined similarity for one metadata field.
pub fn field_similarity(a: &str, b: &str) -> f64 {
    TOKEN_WEIGHT * jaccard_similarity(a, b) + SEQUENCE_WEIGHT * sequence_similarity(a, b)
}

/// Overall match score between a source record and a catalog candidate.
///
/// The artist sub-score is the best field similarity over every artist
/// credit the candidate exposes, so a track filed under a different credit
/// than the source's attribution still scores well. Pure and deterministic;
/// always within [0,1].
pub fn score_track(source: &SourceTrack, candidate: &CandidateTrack) -> f64 {
    let title = field_similarity(&source.title, &candidate.title);
    let artist = candidate
        .artist_credits()
        .map(|credit| field_similarity(&source.artist, credit))
        .fold(0.0_f64, f64::max);
    let album = field_similarity(&source.album, &candidate.album);

    TITLE_WEIGHT * title + ARTIST_WEIGHT * artist + ALBUM_WEIGHT * album
}
