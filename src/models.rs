//! Core data models for playlist reconciliation.

/// One recommended track from the feed, as loose free-text metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceTrack {
    pub artist: String,
    pub title: String,
    pub album: String,
}

/// One track-like entity returned by a catalog search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateTrack {
    /// Opaque catalog identifier (Plex rating key).
    pub item_id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Original-artist credit some catalogs expose for compilation and
    /// collaboration entries (Plex `originalTitle`).
    pub original_artist: String,
}

impl CandidateTrack {
    /// Every artist credit worth comparing against the source attribution.
    /// Catalogs file collaboration and remix credits inconsistently, so the
    /// scorer takes the best match over all of them.
    pub fn artist_credits(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.artist.as_str()).chain(
            (!self.original_artist.is_empty()).then_some(self.original_artist.as_str()),
        )
    }
}

/// Best candidate found for one source record, before the threshold decision.
#[derive(Clone, Debug)]
pub struct MatchResult {
    pub source: SourceTrack,
    pub best: Option<CandidateTrack>,
    pub score: f64,
}

/// One accepted match carrying the resolved library identifier.
#[derive(Clone, Debug)]
pub struct MatchedTrack {
    pub source: SourceTrack,
    pub item_id: String,
    pub score: f64,
}

/// Partition of all source records after a full reconciliation pass.
/// Every record lands in exactly one side, in input order.
#[derive(Debug, Default)]
pub struct Reconciliation {
    pub matched: Vec<MatchedTrack>,
    pub unmatched: Vec<SourceTrack>,
}

impl Reconciliation {
    pub fn total(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }

    /// Match rate as a percentage.
    pub fn match_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            100.0 * self.matched.len() as f64 / self.total() as f64
        }
    }

    /// Resolved library identifiers in the order they were matched.
    pub fn matched_ids(&self) -> Vec<String> {
        self.matched.iter().map(|m| m.item_id.clone()).collect()
    }
}
