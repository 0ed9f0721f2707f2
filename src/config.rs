//! Run configuration loaded from YAML files.
//!
//! One YAML file per deployment; a run may process several. Key names mirror
//! the deployed config format (`plex-url`, `pl-name`, `weekly-exploration`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::matcher::DEFAULT_THRESHOLD;

fn default_api_url() -> String {
    "https://api.listenbrainz.org".to_string()
}

fn default_playlist_prefix() -> String {
    "ListenBrainz Weekly Explore".to_string()
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub listenbrainz: ListenBrainzSettings,
    #[serde(default)]
    pub plex: PlexSettings,
    #[serde(default)]
    pub recommender: RecommenderSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListenBrainzSettings {
    pub username: String,
    pub user_token: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Weekly Exploration feed toggle.
    #[serde(rename = "weekly-exploration", default = "default_true")]
    pub weekly_exploration: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlexSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "plex-url", default)]
    pub url: String,
    #[serde(rename = "plex-token", default)]
    pub token: String,
    #[serde(rename = "plex-library", default)]
    pub library: String,
    #[serde(rename = "pl-name", default = "default_playlist_prefix")]
    pub playlist_prefix: String,
    /// Minimum overall match score to accept a library candidate.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for PlexSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            token: String::new(),
            library: String::new(),
            playlist_prefix: default_playlist_prefix(),
            threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecommenderSettings {
    #[serde(default = "default_true")]
    pub dry_run: bool,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self { dry_run: true }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .with_context(|| format!("failed to read config file {}", path.display()))?
            .try_deserialize()
            .with_context(|| format!("invalid config file {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Both the Plex target and the weekly feed must be switched on for a
    /// config to produce playlists.
    pub fn sync_enabled(&self) -> bool {
        self.plex.enabled && self.listenbrainz.weekly_exploration
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.plex.threshold) {
            bail!(
                "plex.threshold must be within [0.0, 1.0], got {}",
                self.plex.threshold
            );
        }
        if self.listenbrainz.username.is_empty() || self.listenbrainz.user_token.is_empty() {
            bail!("listenbrainz.username and listenbrainz.user_token are required");
        }
        if self.plex.enabled
            && (self.plex.url.is_empty()
                || self.plex.token.is_empty()
                || self.plex.library.is_empty())
        {
            bail!("plex config incomplete: plex-url, plex-token and plex-library are required");
        }
        Ok(())
    }
}

/// Config files for one run: the explicit paths when given, otherwise every
/// `*.yml`/`*.yaml` in the first populated config directory.
pub fn discover_config_files(explicit: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }

    for dir in [Path::new("/config"), Path::new("config")] {
        if !dir.is_dir() {
            continue;
        }
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("failed to list config directory {}", dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("yml" | "yaml")
                )
            })
            .collect();
        if !files.is_empty() {
            files.sort();
            return Ok(files);
        }
    }

    bail!("no config files found (looked in /config and ./config)")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Settings {
        config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    const FULL: &str = r#"
listenbrainz:
  username: crog
  user_token: secret
  weekly-exploration: true
plex:
  enabled: true
  plex-url: http://plex.local:32400
  plex-token: tok
  plex-library: Music
  pl-name: Weekly Explore
  threshold: 0.8
recommender:
  dry_run: false
"#;

    #[test]
    fn test_parse_full_config() {
        let settings = parse(FULL);
        assert_eq!(settings.listenbrainz.username, "crog");
        assert_eq!(settings.plex.url, "http://plex.local:32400");
        assert_eq!(settings.plex.library, "Music");
        assert_eq!(settings.plex.playlist_prefix, "Weekly Explore");
        assert!((settings.plex.threshold - 0.8).abs() < 1e-9);
        assert!(!settings.recommender.dry_run);
        assert!(settings.sync_enabled());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_defaults_applied() {
        let settings = parse("listenbrainz:\n  username: crog\n  user_token: secret\n");
        assert_eq!(settings.listenbrainz.api_url, "https://api.listenbrainz.org");
        assert!(settings.listenbrainz.weekly_exploration);
        assert!(!settings.plex.enabled);
        assert_eq!(settings.plex.playlist_prefix, "ListenBrainz Weekly Explore");
        assert!((settings.plex.threshold - DEFAULT_THRESHOLD).abs() < 1e-9);
        assert!(settings.recommender.dry_run);
        assert!(!settings.sync_enabled());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let yaml = "listenbrainz:\n  username: crog\n  user_token: secret\nplex:\n  threshold: 1.5\n";
        assert!(parse(yaml).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_incomplete_plex() {
        let yaml = "listenbrainz:\n  username: crog\n  user_token: secret\nplex:\n  enabled: true\n  plex-url: http://plex.local:32400\n";
        let err = parse(yaml).validate().unwrap_err();
        assert!(err.to_string().contains("plex config incomplete"));
    }

    #[test]
    fn test_validate_requires_listenbrainz_credentials() {
        let yaml = "listenbrainz:\n  username: crog\n  user_token: \"\"\n";
        assert!(parse(yaml).validate().is_err());
    }

    #[test]
    fn test_discover_prefers_explicit_paths() {
        let explicit = vec![PathBuf::from("a.yml"), PathBuf::from("b.yaml")];
        assert_eq!(discover_config_files(&explicit).unwrap(), explicit);
    }
}
