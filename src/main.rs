use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use explore_sync::catalog::PlaylistSink;
use explore_sync::config::{self, Settings};
use explore_sync::listenbrainz::{ListenBrainzClient, WeekKey};
use explore_sync::matcher;
use explore_sync::plex::PlexCatalog;
use explore_sync::progress;

#[derive(Parser)]
#[command(name = "explore-sync")]
#[command(about = "Sync ListenBrainz Weekly Exploration playlists into a Plex music library")]
struct Args {
    /// Config files to process; defaults to every YAML file in /config or ./config
    config: Vec<PathBuf>,

    /// Hide progress bars for tail-friendly output
    #[arg(long)]
    log_only: bool,

    /// Resolve matches but skip playlist creation, regardless of config
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    progress::set_log_only(args.log_only);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config_files = config::discover_config_files(&args.config)?;
    info!("processing {} config file(s)", config_files.len());

    for path in &config_files {
        info!(config = %path.display(), "loading config");
        let settings = Settings::load(path)?;
        run(&settings, &args)?;
    }

    Ok(())
}

fn run(settings: &Settings, args: &Args) -> Result<()> {
    if !settings.sync_enabled() {
        info!("plex sync or weekly-exploration feed disabled, skipping");
        return Ok(());
    }

    let lb = &settings.listenbrainz;
    let feed = ListenBrainzClient::new(&lb.api_url, &lb.username, &lb.user_token);

    let weekly = feed.weekly_explorations()?;
    if weekly.is_empty() {
        warn!("no Weekly Exploration playlists available");
        return Ok(());
    }

    // The newest entry is the week still in progress; reconcile the most
    // recent completed week.
    let Some(previous) = weekly.get(1) else {
        warn!("no completed week available yet (need two Weekly Exploration playlists)");
        return Ok(());
    };
    info!(title = %previous.title, "using Weekly Exploration playlist");

    let (playlist_title, records) = feed.playlist_tracks(&previous.mbid)?;
    info!("fetched {} recommended track(s)", records.len());

    let week = WeekKey::from_title(&playlist_title).unwrap_or(previous.week);
    let name = format!(
        "{} W{:02} {}",
        settings.plex.playlist_prefix, week.week, week.year
    );

    let catalog = PlexCatalog::connect(&settings.plex)?;
    let outcome = matcher::reconcile(&catalog, records, settings.plex.threshold)?;

    info!(
        "reconciliation complete: {}/{} matched ({:.1}%)",
        outcome.matched.len(),
        outcome.total(),
        outcome.match_rate()
    );

    if outcome.matched.is_empty() {
        bail!("no recommended tracks matched the library; refusing to create an empty playlist");
    }

    if args.dry_run || settings.recommender.dry_run {
        info!(playlist = %name, tracks = outcome.matched.len(), "dry run, playlist not created");
        return Ok(());
    }

    catalog.create_playlist(&name, &outcome.matched_ids())?;
    info!(playlist = %name, tracks = outcome.matched.len(), "playlist created");
    Ok(())
}
