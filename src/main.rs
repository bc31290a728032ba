use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use neon_snake::game::{GameConfig, GameEngine, GameMode, GameStatus};
use neon_snake::leaderboard::FileLeaderboard;
use neon_snake::logging;
use neon_snake::modes::{HumanMode, WatchMode};
use neon_snake::persistence::load_state;
use neon_snake::session::GameSession;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "neon_snake")]
#[command(version, about = "Snake with wrap-around and walled modes")]
struct Cli {
    /// Play yourself or watch the autopilot
    #[arg(long, default_value = "play")]
    mode: Mode,

    /// Board edges: wrap around, or walls that end the game (1.5x score)
    #[arg(long, default_value = "pass-through")]
    game_mode: Topology,

    /// Name to record on the leaderboard; anonymous games are not ranked
    #[arg(long)]
    player: Option<String>,

    /// Seed for food placement, for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file overriding scoring and speed settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Leaderboard file
    #[arg(long, default_value = "leaderboard.json")]
    leaderboard: PathBuf,

    /// Save an unfinished game here on quit
    #[arg(long)]
    save: Option<PathBuf>,

    /// Resume a game saved with --save
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Play snake with keyboard controls
    Play,
    /// Watch the autopilot play
    Watch,
}

#[derive(Clone, Copy, ValueEnum)]
enum Topology {
    PassThrough,
    Walls,
}

impl From<Topology> for GameMode {
    fn from(topology: Topology) -> Self {
        match topology {
            Topology::PassThrough => GameMode::PassThrough,
            Topology::Walls => GameMode::Walls,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.log_file.as_deref())?;

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let engine = match cli.seed {
        Some(seed) => GameEngine::seeded(config, seed),
        None => GameEngine::new(config),
    };

    let resumed = match &cli.resume {
        Some(path) => Some(load_state(path)?),
        None => None,
    };
    let game_mode = resumed
        .as_ref()
        .map(|state| state.mode)
        .unwrap_or_else(|| cli.game_mode.into());

    let mut session = GameSession::new(engine, game_mode);
    session.set_player(cli.player.clone());
    if let Some(mut state) = resumed {
        // Never drop the player straight back into a moving game
        if state.status == GameStatus::Playing {
            state.status = GameStatus::Paused;
        }
        session.restore(state)?;
    }

    info!(mode = game_mode.as_str(), seed = ?cli.seed, "starting");

    let scores = FileLeaderboard::new(&cli.leaderboard);
    match cli.mode {
        Mode::Play => {
            let mut human_mode = HumanMode::new(session, scores).with_save_path(cli.save.clone());
            human_mode.run().await?;
        }
        Mode::Watch => {
            let leaderboard = scores.load().unwrap_or_else(|e| {
                warn!(error = %e, "could not read leaderboard");
                Default::default()
            });
            let mut watch_mode = WatchMode::new(session, leaderboard);
            watch_mode.run().await.context("Watch mode failed")?;
        }
    }

    Ok(())
}
