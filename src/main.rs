use std::io;
use std::path::PathBuf;

use anyhow::Context;
use armada::{
    init_logging, player_cli, simulate, ui, GameConfig, HistoryStore, JsonFileHistoryStore,
    MatchEngine, MemoryHistoryStore, Mode, RandomPlayer,
};
use clap::{Parser, Subcommand};
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a match against the computer in the terminal.
    Play {
        #[arg(long, value_enum, default_value_t = Mode::Classic)]
        mode: Mode,
        #[arg(long, help = "Custom game configuration (JSON), overrides --mode")]
        config: Option<PathBuf>,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, default_value = ".armada", help = "Directory holding match history")]
        history_dir: PathBuf,
    },
    /// Show the recent match history for a mode.
    History {
        #[arg(long, value_enum, default_value_t = Mode::Classic)]
        mode: Mode,
        #[arg(long, default_value = ".armada")]
        history_dir: PathBuf,
    },
    /// Let both fleets be placed and fired at random and print a JSON summary.
    Sim {
        #[arg(long, value_enum, default_value_t = Mode::Classic)]
        mode: Mode,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

fn load_config(mode: Mode, path: Option<&PathBuf>) -> anyhow::Result<GameConfig> {
    match path {
        Some(path) => GameConfig::from_path(path),
        None => Ok(mode.config()),
    }
}

fn build_engine<S: HistoryStore>(
    config: GameConfig,
    store: S,
    seed: Option<u64>,
) -> anyhow::Result<MatchEngine<S>> {
    let engine = match seed {
        Some(s) => {
            info!("using fixed seed {} (game will be reproducible)", s);
            MatchEngine::with_seed(config, store, s)
        }
        None => MatchEngine::new(config, store),
    };
    engine.context("invalid game configuration")
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            mode,
            config,
            seed,
            history_dir,
        } => {
            let config = load_config(mode, config.as_ref())?;
            let store = JsonFileHistoryStore::new(history_dir);
            let mut engine = build_engine(config, store, seed)?;
            let stdin = io::stdin();
            player_cli::run_session(&mut engine, stdin.lock(), &mut io::stdout())?;
        }
        Commands::History { mode, history_dir } => {
            let store = JsonFileHistoryStore::new(history_dir);
            let entries = store.load(&mode.config().history_key)?;
            print!("{}", ui::render_history(&entries));
        }
        Commands::Sim { mode, seed } => {
            let mut engine = build_engine(mode.config(), MemoryHistoryStore::new(), seed)?;
            let mut rng = match seed {
                Some(s) => SmallRng::seed_from_u64(s.wrapping_add(1)),
                None => SmallRng::from_rng(&mut rand::rng()),
            };
            let summary = simulate(&mut engine, &mut RandomPlayer::new(), &mut rng)?;
            println!("{}", serde_json::to_string(&summary)?);
        }
    }
    Ok(())
}
