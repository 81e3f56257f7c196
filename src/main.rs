use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use camterm::cli::{self, Cli, Commands};
use camterm::core::config::ArcadeConfig;
use camterm::core::engine::EngineOptions;
use camterm::core::feed::LandmarkFeed;
use camterm::games;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ArcadeConfig::load(cli.config.as_deref())?;

    let Commands::Play { game, feed, fps, seed } = cli.command else {
        cli::print_games();
        return Ok(());
    };
    if let Some(fps) = fps {
        config.fps = fps;
    }
    if seed.is_some() {
        config.seed = seed;
    }
    init_logging(&config)?;

    // 1. Look up the game before touching the camera
    let registry =
        games::get_game(&game).ok_or_else(|| anyhow!("unknown game '{game}', run `camterm list` to see them all"))?;

    // 2. Open the feed while the console can still show errors
    let spec = feed.spec();
    let source = LandmarkFeed::open(&spec, config.mirror, config.max_failed_reads).await?;
    info!(game = registry.info.id, feed = %spec.describe(), fps = config.fps, seed = ?config.seed, "launching");

    // 3. Take over the terminal and play
    let options = EngineOptions { info: registry.info.clone(), config, feed: source, feed_label: spec.describe() };
    let terminal = ratatui::init();
    let result = (registry.initializer)(options, terminal).await;
    ratatui::restore();

    if let Err(e) = &result {
        tracing::error!(error = ?e, "session failed");
    }
    result
}

/// Logs go to a file so they never draw over the TUI.
fn init_logging(config: &ArcadeConfig) -> Result<()> {
    let path = config.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false).with_writer(Mutex::new(file)).init();
    Ok(())
}
