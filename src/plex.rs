//! Plex Media Server catalog client.
//!
//! All requests carry the server token and ask for JSON payloads; bodies sit
//! under a `MediaContainer` envelope. Search is scoped to one music library
//! section, resolved once at connect time.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;

use crate::catalog::{MediaCatalog, PlaylistSink};
use crate::config::PlexSettings;
use crate::models::CandidateTrack;

/// Plex search type codes for section search.
const TYPE_ALBUM: &str = "9";
const TYPE_TRACK: &str = "10";

pub struct PlexCatalog {
    agent: ureq::Agent,
    base_url: String,
    token: String,
    machine_id: String,
    section_key: String,
}

impl PlexCatalog {
    /// Connect to the server: resolves the machine identifier (needed for
    /// playlist URIs) and the configured library's section key up front.
    pub fn connect(settings: &PlexSettings) -> Result<Self> {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(30))
            .build();
        let mut catalog = Self {
            agent,
            base_url: settings.url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            machine_id: String::new(),
            section_key: String::new(),
        };
        catalog.machine_id = catalog.fetch_machine_id()?;
        catalog.section_key = catalog.find_section(&settings.library)?;
        Ok(catalog)
    }

    fn api_url(&self, path: &str, params: &[(&str, &str)]) -> String {
        if params.is_empty() {
            return format!("{}{}", self.base_url, path);
        }
        let query: Vec<String> = params
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect();
        format!("{}{}?{}", self.base_url, path, query.join("&"))
    }

    fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = self.api_url(path, params);
        let response = self
            .agent
            .get(&url)
            .set("X-Plex-Token", &self.token)
            .set("Accept", "application/json")
            .call()
            .with_context(|| format!("Plex request failed: {path}"))?;
        response
            .into_json()
            .with_context(|| format!("Plex response was not valid JSON: {path}"))
    }

    fn fetch_machine_id(&self) -> Result<String> {
        let payload = self.get_json("/identity", &[])?;
        payload
            .get("MediaContainer")
            .and_then(|container| container.get("machineIdentifier"))
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .ok_or_else(|| anyhow!("Plex identity response missing machineIdentifier"))
    }

    /// Resolve a library name to its section key, case-insensitively.
    fn find_section(&self, library: &str) -> Result<String> {
        let payload = self.get_json("/library/sections", &[])?;
        for directory in container_entries(&payload, "Directory") {
            let title = directory.get("title").and_then(Value::as_str).unwrap_or_default();
            if title.eq_ignore_ascii_case(library) {
                if let Some(key) = string_attr(directory, "key") {
                    return Ok(key);
                }
            }
        }
        bail!("Plex library not found: {library}")
    }

    fn section_search(&self, kind: &str, query: &str) -> Result<Value> {
        self.get_json(
            &format!("/library/sections/{}/search", self.section_key),
            &[("type", kind), ("query", query)],
        )
    }
}

/// Entries under `MediaContainer.<field>`; a single object flattens to a
/// one-element list, anything missing to an empty one.
fn container_entries<'a>(payload: &'a Value, field: &str) -> Vec<&'a Value> {
    match payload.get("MediaContainer").and_then(|container| container.get(field)) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(item @ Value::Object(_)) => vec![item],
        _ => Vec::new(),
    }
}

/// Plex serializes some attributes as either strings or numbers.
fn string_attr(item: &Value, key: &str) -> Option<String> {
    match item.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_track(item: &Value) -> Option<CandidateTrack> {
    let item_id = string_attr(item, "ratingKey")?;
    let text = |key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Some(CandidateTrack {
        item_id,
        title: text("title"),
        artist: text("grandparentTitle"),
        album: text("parentTitle"),
        original_artist: text("originalTitle"),
    })
}

impl MediaCatalog for PlexCatalog {
    fn search_tracks(&self, query: &str) -> Result<Vec<CandidateTrack>> {
        let payload = self.section_search(TYPE_TRACK, query)?;
        Ok(container_entries(&payload, "Metadata")
            .into_iter()
            .filter_map(parse_track)
            .collect())
    }

    fn search_albums(&self, query: &str) -> Result<Vec<String>> {
        let payload = self.section_search(TYPE_ALBUM, query)?;
        Ok(container_entries(&payload, "Metadata")
            .into_iter()
            .filter_map(|item| string_attr(item, "ratingKey"))
            .collect())
    }

    fn album_tracks(&self, album_id: &str) -> Result<Vec<CandidateTrack>> {
        let payload = self.get_json(&format!("/library/metadata/{album_id}/children"), &[])?;
        Ok(container_entries(&payload, "Metadata")
            .into_iter()
            .filter_map(parse_track)
            .collect())
    }
}

impl PlaylistSink for PlexCatalog {
    fn create_playlist(&self, name: &str, item_ids: &[String]) -> Result<()> {
        if item_ids.is_empty() {
            bail!("refusing to create empty playlist '{name}'");
        }
        let uri = format!(
            "server://{}/com.plexapp.plugins.library/library/metadata/{}",
            self.machine_id,
            item_ids.join(",")
        );
        let url = self.api_url(
            "/playlists",
            &[("type", "audio"), ("title", name), ("smart", "0"), ("uri", &uri)],
        );
        self.agent
            .post(&url)
            .set("X-Plex-Token", &self.token)
            .set("Accept", "application/json")
            .call()
            .with_context(|| format!("Plex playlist creation failed: {name}"))?;
        Ok(())
    }
}
