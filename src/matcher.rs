//! Two-phase catalog search and the threshold decision.
//!
//! Phase 1 searches the catalog by track title. Only when that search finds
//! nothing acceptable does phase 2 widen to every track of every album
//! matching the source album name. Records are processed one at a time, in
//! feed order, with blocking catalog calls.

use anyhow::Result;
use tracing::info;

use crate::catalog::MediaCatalog;
use crate::models::{CandidateTrack, MatchResult, MatchedTrack, Reconciliation, SourceTrack};
use crate::progress;
use crate::scoring::score_track;

/// Minimum overall score to accept a candidate, unless overridden in config.
pub const DEFAULT_THRESHOLD: f64 = 0.72;

/// Outcome of the threshold decision for one record.
#[derive(Debug)]
pub enum Decision {
    Matched(MatchedTrack),
    Unmatched(SourceTrack),
}

/// Find the best-scoring catalog candidate for one source record.
///
/// Replacement is strictly-greater only, so the first candidate in the
/// catalog's enumeration order wins ties. The returned result carries the
/// running best even when it is below threshold; accepting or rejecting it
/// is `decide`'s job. A failing catalog call aborts the whole run.
pub fn find_best_match(
    catalog: &dyn MediaCatalog,
    source: &SourceTrack,
    threshold: f64,
) -> Result<MatchResult> {
    let mut best: Option<CandidateTrack> = None;
    let mut best_score = 0.0_f64;

    for candidate in catalog.search_tracks(&source.title)? {
        let score = score_track(source, &candidate);
        if score > best_score {
            best_score = score;
            best = Some(candidate);
        }
    }

    // Widen to album-scoped search only when the direct search came up short.
    if best.is_none() || best_score < threshold {
        for album_id in catalog.search_albums(&source.album)? {
            for candidate in catalog.album_tracks(&album_id)? {
                let score = score_track(source, &candidate);
                if score > best_score {
                    best_score = score;
                    best = Some(candidate);
                }
            }
        }
    }

    Ok(MatchResult {
        source: source.clone(),
        best,
        score: best_score,
    })
}

/// Accept or reject the best candidate. The threshold comparison is
/// inclusive: a candidate scoring exactly the threshold is accepted.
pub fn decide(result: MatchResult, threshold: f64) -> Decision {
    match result.best {
        Some(candidate) if result.score >= threshold => Decision::Matched(MatchedTrack {
            source: result.source,
            item_id: candidate.item_id,
            score: result.score,
        }),
        _ => Decision::Unmatched(result.source),
    }
}

/// Match every source record against the catalog and partition the outcomes.
///
/// Each record's outcome is logged individually; an unmatched record is a
/// normal outcome, not an error. The caller decides what an entirely empty
/// matched set means for the run.
pub fn reconcile(
    catalog: &dyn MediaCatalog,
    sources: Vec<SourceTrack>,
    threshold: f64,
) -> Result<Reconciliation> {
    let pb = progress::create_progress_bar(sources.len() as u64, "Matching tracks");
    let mut outcome = Reconciliation::default();

    for source in sources {
        let result = find_best_match(catalog, &source, threshold)?;
        match decide(result, threshold) {
            Decision::Matched(track) => {
                info!(
                    artist = %track.source.artist,
                    title = %track.source.title,
                    item_id = %track.item_id,
                    score = track.score,
                    "matched"
                );
                outcome.matched.push(track);
            }
            Decision::Unmatched(source) => {
                info!(artist = %source.artist, title = %source.title, "unmatched");
                outcome.unmatched.push(source);
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message(format!(
        "Matched {}/{} tracks",
        outcome.matched.len(),
        outcome.total()
    ));
    Ok(outcome)
}
