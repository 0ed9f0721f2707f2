//! ListenBrainz Weekly Exploration to Plex playlist reconciliation.

pub mod catalog;
pub mod config;
pub mod listenbrainz;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod plex;
pub mod progress;
pub mod scoring;

/// User-Agent sent with every recommendation feed request.
pub const USER_AGENT: &str = concat!("explore-sync/", env!("CARGO_PKG_VERSION"));
