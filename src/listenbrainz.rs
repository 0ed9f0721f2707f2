//! ListenBrainz recommendation feed client.
//!
//! Weekly Exploration playlists arrive as JSPF documents wrapped in the
//! ListenBrainz playlist API. The created-for listing carries every playlist
//! generated for the user; weekly explorations are recognized by their
//! algorithm source patch and ranked by the ISO week parsed from the title.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::SourceTrack;

const JSPF_PLAYLIST_EXT: &str = "https://musicbrainz.org/doc/jspf#playlist";
const WEEKLY_EXPLORATION_PATCH: &str = "weekly-exploration";

/// Playlist titles look like "Weekly Exploration for user, week of 2026-01-26 Mon".
static WEEK_OF: Lazy<Regex> = Lazy::new(|| Regex::new(r"week of (\d{4}-\d{2}-\d{2})").unwrap());

/// ISO-week key of a weekly playlist, used for ranking and naming.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

impl WeekKey {
    /// Parse the "week of YYYY-MM-DD" marker out of a playlist title.
    pub fn from_title(title: &str) -> Option<Self> {
        let captures = WEEK_OF.captures(title)?;
        let date = NaiveDate::parse_from_str(&captures[1], "%Y-%m-%d").ok()?;
        let iso = date.iso_week();
        Some(Self {
            year: iso.year(),
            week: iso.week(),
        })
    }
}

/// One Weekly Exploration playlist from the created-for listing.
#[derive(Clone, Debug)]
pub struct WeeklyPlaylist {
    pub mbid: String,
    pub title: String,
    pub week: WeekKey,
}

pub struct ListenBrainzClient {
    agent: ureq::Agent,
    api_url: String,
    token: String,
    username: String,
}

impl ListenBrainzClient {
    pub fn new(api_url: &str, username: &str, token: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(20))
            .build();
        Self {
            agent,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            username: username.to_string(),
        }
    }

    fn get_json(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.api_url, path);
        let response = self
            .agent
            .get(&url)
            .set("Authorization", &format!("Token {}", self.token))
            .set("User-Agent", crate::USER_AGENT)
            .call()
            .with_context(|| format!("ListenBrainz request failed: {path}"))?;
        response
            .into_json()
            .with_context(|| format!("ListenBrainz response was not valid JSON: {path}"))
    }

    /// Weekly Exploration playlists created for the user, newest week first.
    /// Playlists without a parsable week marker are ignored.
    pub fn weekly_explorations(&self) -> Result<Vec<WeeklyPlaylist>> {
        let payload =
            self.get_json(&format!("/1/user/{}/playlists/createdfor", self.username))?;
        let mut weekly: Vec<WeeklyPlaylist> = array(payload.get("playlists"))
            .iter()
            .filter_map(weekly_from_entry)
            .collect();
        weekly.sort_by(|a, b| b.week.cmp(&a.week));
        Ok(weekly)
    }

    /// Title and source records of one playlist, in feed order.
    pub fn playlist_tracks(&self, mbid: &str) -> Result<(String, Vec<SourceTrack>)> {
        let payload = self.get_json(&format!("/1/playlist/{mbid}"))?;
        let playlist = payload
            .get("playlist")
            .ok_or_else(|| anyhow!("playlist response missing 'playlist' object: {mbid}"))?;
        let title = playlist
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok((title, tracks_from_playlist(playlist)))
    }
}

fn array(value: Option<&Value>) -> &[Value] {
    value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Recognize one created-for entry as a Weekly Exploration playlist.
fn weekly_from_entry(entry: &Value) -> Option<WeeklyPlaylist> {
    let playlist = entry.get("playlist")?;
    let patch = playlist
        .get("extension")?
        .get(JSPF_PLAYLIST_EXT)?
        .get("additional_metadata")?
        .get("algorithm_metadata")?
        .get("source_patch")?
        .as_str()?;
    if patch != WEEKLY_EXPLORATION_PATCH {
        return None;
    }

    // The identifier is a URL whose last segment is the playlist mbid.
    let mbid = playlist
        .get("identifier")?
        .as_str()?
        .rsplit('/')
        .next()?
        .to_string();
    if mbid.is_empty() {
        return None;
    }

    let title = str_field(playlist, "title").to_string();
    let week = WeekKey::from_title(&title)?;
    Some(WeeklyPlaylist { mbid, title, week })
}

/// Map the JSPF track list to source records: creator is the primary artist
/// credit, album the release title.
fn tracks_from_playlist(playlist: &Value) -> Vec<SourceTrack> {
    array(playlist.get("track"))
        .iter()
        .map(|track| SourceTrack {
            artist: str_field(track, "creator").to_string(),
            title: str_field(track, "title").to_string(),
            album: str_field(track, "album").to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_week_key_from_title() {
        let key = WeekKey::from_title("Weekly Exploration for crog, week of 2026-01-26 Mon")
            .unwrap();
        assert_eq!(key, WeekKey { year: 2026, week: 5 });
    }

    #[test]
    fn test_week_key_crosses_iso_year_boundary() {
        // 2025-12-29 is the Monday of ISO week 1 of 2026.
        let key = WeekKey::from_title("week of 2025-12-29").unwrap();
        assert_eq!(key, WeekKey { year: 2026, week: 1 });
    }

    #[test]
    fn test_week_key_missing_marker() {
        assert!(WeekKey::from_title("Daily Jams for crog").is_none());
        assert!(WeekKey::from_title("week of someday").is_none());
    }

    #[test]
    fn test_week_key_ordering() {
        assert!(WeekKey { year: 2026, week: 5 } > WeekKey { year: 2026, week: 4 });
        assert!(WeekKey { year: 2026, week: 1 } > WeekKey { year: 2025, week: 52 });
    }

    fn created_for_entry(patch: &str, mbid: &str, title: &str) -> Value {
        json!({
            "playlist": {
                "identifier": format!("https://listenbrainz.org/playlist/{mbid}"),
                "title": title,
                "extension": {
                    JSPF_PLAYLIST_EXT: {
                        "additional_metadata": {
                            "algorithm_metadata": { "source_patch": patch }
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_weekly_from_entry_recognizes_source_patch() {
        let weekly = created_for_entry(
            "weekly-exploration",
            "abc-123",
            "Weekly Exploration for crog, week of 2026-01-26 Mon",
        );
        let parsed = weekly_from_entry(&weekly).unwrap();
        assert_eq!(parsed.mbid, "abc-123");
        assert_eq!(parsed.week, WeekKey { year: 2026, week: 5 });

        let daily = created_for_entry("daily-jams", "def-456", "Daily Jams, week of 2026-01-26");
        assert!(weekly_from_entry(&daily).is_none());
    }

    #[test]
    fn test_weekly_from_entry_requires_week_marker() {
        let entry = created_for_entry("weekly-exploration", "abc-123", "Weekly Exploration");
        assert!(weekly_from_entry(&entry).is_none());
    }

    #[test]
    fn test_tracks_from_playlist() {
        let playlist = json!({
            "title": "Weekly Exploration for crog, week of 2026-01-26 Mon",
            "track": [
                {
                    "creator": "Sigur Rós",
                    "title": "Svefn-g-englar",
                    "album": "Ágætis byrjun"
                },
                { "creator": "Radiohead", "title": "Kid A" }
            ]
        });

        let tracks = tracks_from_playlist(&playlist);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].artist, "Sigur Rós");
        assert_eq!(tracks[0].album, "Ágætis byrjun");
        // Missing album stays empty rather than failing the record.
        assert_eq!(tracks[1].album, "");
    }
}
