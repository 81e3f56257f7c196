use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::feed::FeedSpec;
use crate::games::get_all_games;

#[derive(Parser, Debug)]
#[command(name = "camterm")]
#[command(about = "Camera-controlled arcade games for the terminal")]
#[command(version)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, env = "CAMTERM_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available games
    List,
    /// Play a game
    Play {
        /// Game id, see `camterm list`
        game: String,

        #[command(flatten)]
        feed: FeedArgs,

        /// Ticks per second
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=240))]
        fps: Option<u32>,

        /// Seed for reproducible sessions
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Landmark source. Without any of these the pointer emulator stands in for the camera.
#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
#[group(multiple = false)]
pub struct FeedArgs {
    /// Replay detections from a newline-delimited JSON file
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Read detections from standard input
    #[arg(long)]
    pub stdin: bool,

    /// Spawn a detector and read detections from its stdout
    #[arg(long, value_name = "CMD")]
    pub detector: Option<String>,
}

impl FeedArgs {
    pub fn spec(&self) -> FeedSpec {
        if let Some(path) = &self.replay {
            FeedSpec::Replay(path.clone())
        } else if self.stdin {
            FeedSpec::Stdin
        } else if let Some(cmd) = &self.detector {
            FeedSpec::Detector(cmd.clone())
        } else {
            FeedSpec::Emulated
        }
    }
}

pub fn print_games() {
    println!("Available games:");
    println!();
    for game in get_all_games() {
        println!("  {:<10} {}", game.info.id, game.info.name);
        println!("  {:<10} {}", "", game.info.description);
    }
    println!();
    println!("Run one with: camterm play <GAME>");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_defaults_to_the_emulator() {
        let cli = Cli::try_parse_from(["camterm", "play", "snake"]).unwrap();
        match cli.command {
            Commands::Play { game, feed, fps, seed } => {
                assert_eq!(game, "snake");
                assert_eq!(feed.spec(), FeedSpec::Emulated);
                assert_eq!((fps, seed), (None, None));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn feed_sources_are_exclusive() {
        assert!(Cli::try_parse_from(["camterm", "play", "pong", "--stdin", "--replay", "f.jsonl"]).is_err());
        let cli = Cli::try_parse_from(["camterm", "play", "pong", "--detector", "python3 detect.py"]).unwrap();
        let Commands::Play { feed, .. } = cli.command else {
            panic!("expected play");
        };
        assert_eq!(feed.spec(), FeedSpec::Detector("python3 detect.py".to_string()));
    }

    #[test]
    fn global_config_and_overrides() {
        let cli =
            Cli::try_parse_from(["camterm", "play", "maze", "--fps", "30", "--seed", "7", "--config", "c.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        let Commands::Play { fps, seed, .. } = cli.command else {
            panic!("expected play");
        };
        assert_eq!((fps, seed), (Some(30), Some(7)));
        assert!(Cli::try_parse_from(["camterm", "play", "maze", "--fps", "0"]).is_err());
    }
}
