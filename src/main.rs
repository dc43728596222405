//! Cardclash - Main Binary
//!
//! Self-play games, catalog inspection and tournaments from the command line

use anyhow::{bail, Context};
use cardclash::{
    game::{
        CharacterController, GameConfig, GameLoop, GameSnapshot, RandomController, VerbosityLevel,
        ZeroController,
    },
    loader::{Catalog, GameInitializer},
    tournament::{self, TournamentSettings},
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Controller type for AI agents
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ControllerType {
    /// Always chooses the first legal option
    Zero,
    /// Makes random choices
    Random,
}

impl From<ControllerType> for tournament::ControllerType {
    fn from(kind: ControllerType) -> Self {
        match kind {
            ControllerType::Zero => tournament::ControllerType::Zero,
            ControllerType::Random => tournament::ControllerType::Random,
        }
    }
}

/// Verbosity level (accepts names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

#[derive(Parser)]
#[command(name = "clash")]
#[command(about = "Cardclash - turn-based card game resolution engine", long_about = None)]
struct Cli {
    /// JSON game config (health, resources, hand size, ...)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Template directory (default: built-in standard catalog)
    #[arg(long, global = true, value_name = "DIR")]
    templates: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game between AI controllers
    Play {
        /// One controller per character (2 or 3)
        #[arg(long, value_enum, value_delimiter = ',', default_value = "random,random")]
        controllers: Vec<ControllerType>,

        /// Random seed for deterministic games
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value_t = 500)]
        max_turns: u32,

        /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,

        /// Print the first character's final snapshot as JSON
        #[arg(long)]
        snapshot: bool,
    },

    /// List the templates in the catalog
    Catalog,

    /// Run many games in parallel and report win rates
    Tourney {
        #[arg(long, short = 'g', default_value_t = 1000)]
        games: usize,

        #[arg(long, value_enum, value_delimiter = ',', default_value = "random,random")]
        controllers: Vec<ControllerType>,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value_t = 500)]
        max_turns: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GameConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    let catalog = Arc::new(load_catalog(cli.templates.as_deref()).await?);

    match cli.command {
        Commands::Play {
            controllers,
            seed,
            max_turns,
            verbosity,
            snapshot,
        } => run_play(config, catalog, &controllers, seed, max_turns, verbosity.0, snapshot)?,
        Commands::Catalog => print_catalog(&catalog),
        Commands::Tourney {
            games,
            controllers,
            seed,
            max_turns,
        } => {
            let settings = TournamentSettings {
                games,
                seats: controllers.into_iter().map(Into::into).collect(),
                seed,
                max_turns,
                config,
            };
            // rayon blocks; keep it off the async workers
            tokio::task::spawn_blocking(move || tournament::run_and_print(catalog, &settings)).await??;
        }
    }

    Ok(())
}

async fn load_catalog(dir: Option<&Path>) -> anyhow::Result<Catalog> {
    match dir {
        Some(dir) => Catalog::load_from_dir_async(dir)
            .await
            .with_context(|| format!("loading templates from {}", dir.display())),
        None => Ok(Catalog::standard()?),
    }
}

fn run_play(
    config: GameConfig,
    catalog: Arc<Catalog>,
    kinds: &[ControllerType],
    seed: Option<u64>,
    max_turns: u32,
    verbosity: VerbosityLevel,
    snapshot: bool,
) -> anyhow::Result<()> {
    if kinds.len() < 2 {
        bail!("a game needs at least 2 controllers");
    }
    let seed = seed.unwrap_or(config.seed);
    let config = GameConfig { seed, ..config };

    let names = (1..=kinds.len()).map(|i| format!("Player {i}"));
    let (mut game, ids) = GameInitializer::new(config, catalog).with_characters(names).init()?;
    game.logger.set_verbosity(verbosity);

    let mut controllers: Vec<Box<dyn CharacterController>> = kinds
        .iter()
        .zip(&ids)
        .enumerate()
        .map(|(seat, (kind, &id))| -> Box<dyn CharacterController> {
            match kind {
                ControllerType::Zero => Box::new(ZeroController::new(id)),
                ControllerType::Random => Box::new(RandomController::with_seed(id, seed.wrapping_add(seat as u64 + 1))),
            }
        })
        .collect();
    let mut refs: Vec<&mut dyn CharacterController> = controllers
        .iter_mut()
        .map(|c| -> &mut dyn CharacterController { c.as_mut() })
        .collect();

    let result = GameLoop::new(&mut game)
        .with_verbosity(verbosity)
        .with_max_turns(max_turns)
        .run_game(&mut refs)?;

    println!("\n=== Game Over ===");
    match result.winner {
        Some(id) => println!("Winner: {}", game.character(id)?.name),
        None => println!("No winner ({:?})", result.end_reason),
    }
    println!("Turns played: {}", result.turns_played);
    for c in &game.characters {
        println!("  {}: {} hp", c.name, c.health);
    }

    if snapshot {
        println!("{}", GameSnapshot::for_viewer(&game, ids[0])?.to_json()?);
    }
    Ok(())
}

fn print_catalog(catalog: &Catalog) {
    for t in catalog.all_templates() {
        let free = if t.is_free { ", free" } else { "" };
        println!(
            "{:>2}  {:<20} [{}{}] ticks {}  targets {}..={} {:?}",
            t.id, t.name, t.resolution_timing, free, t.max_tick_count, t.targeting.count_min, t.targeting.count_max,
            t.targeting.target_type
        );
        for line in t.description.lines() {
            println!("      {line}");
        }
    }
}
