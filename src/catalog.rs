//! Collaborator interfaces for the target catalog and the playlist sink.

use anyhow::Result;

use crate::models::CandidateTrack;

/// Read-only search interface of the target media catalog.
///
/// All three calls are idempotent and may return nothing. Result order is
/// the catalog's own relevance ranking; the matcher keeps the first of any
/// equally-scored candidates, so that ordering is significant.
pub trait MediaCatalog {
    /// Full-text track search.
    fn search_tracks(&self, query: &str) -> Result<Vec<CandidateTrack>>;

    /// Full-text album search, returning album identifiers.
    fn search_albums(&self, query: &str) -> Result<Vec<String>>;

    /// Every track of one album.
    fn album_tracks(&self, album_id: &str) -> Result<Vec<CandidateTrack>>;
}

/// Downstream consumer of the matched identifiers.
pub trait PlaylistSink {
    /// Create a playlist holding the given items, in order.
    fn create_playlist(&self, name: &str, item_ids: &[String]) -> Result<()>;
}
