//! Tournament mode: many seeded self-play games run in parallel
//!
//! Games share nothing but the catalog, so rayon can run them on any
//! thread. Each game's seed is derived from the tournament seed and the
//! game index, which makes a whole tournament reproducible.

use crate::core::CharacterId;
use crate::game::{
    CharacterController, GameConfig, GameEndReason, GameLoop, RandomController, VerbosityLevel,
    ZeroController,
};
use crate::loader::{Catalog, GameInitializer};
use crate::{GameError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Controller type for tournament games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerType {
    Zero,
    Random,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentSettings {
    pub games: usize,
    /// One controller per seat
    pub seats: Vec<ControllerType>,
    pub seed: u64,
    pub max_turns: u32,
    pub config: GameConfig,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        TournamentSettings {
            games: 100,
            seats: vec![ControllerType::Random, ControllerType::Random],
            seed: 42,
            max_turns: 500,
            config: GameConfig::default(),
        }
    }
}

/// Aggregated outcome of a tournament
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentReport {
    /// Wins per seat
    pub seat_wins: Vec<usize>,
    pub draws: usize,
    pub turn_limits: usize,
    /// Games aborted by an engine error
    pub failures: usize,
    pub total_turns: u64,
}

impl TournamentReport {
    fn empty(seats: usize) -> Self {
        TournamentReport {
            seat_wins: vec![0; seats],
            ..TournamentReport::default()
        }
    }

    fn merge(mut self, other: TournamentReport) -> Self {
        for (mine, theirs) in self.seat_wins.iter_mut().zip(other.seat_wins) {
            *mine += theirs;
        }
        self.draws += other.draws;
        self.turn_limits += other.turn_limits;
        self.failures += other.failures;
        self.total_turns += other.total_turns;
        self
    }

    pub fn games_played(&self) -> usize {
        self.seat_wins.iter().sum::<usize>() + self.draws + self.turn_limits
    }

    pub fn print_summary(&self, elapsed: Duration) {
        let total = self.games_played();
        println!("=== Tournament Complete ===");
        println!("Total games played: {total}");
        println!("Elapsed time: {:.2}s", elapsed.as_secs_f64());
        if total == 0 {
            return;
        }
        println!("Games per second: {:.2}", total as f64 / elapsed.as_secs_f64());
        println!("Average turns: {:.1}\n", self.total_turns as f64 / total as f64);

        let pct = |n: usize| 100.0 * n as f64 / total as f64;
        for (seat, wins) in self.seat_wins.iter().enumerate() {
            println!("P{} wins: {} ({:.1}%)", seat + 1, wins, pct(*wins));
        }
        println!("Draws: {} ({:.1}%)", self.draws, pct(self.draws));
        println!("Turn limits: {} ({:.1}%)", self.turn_limits, pct(self.turn_limits));
        if self.failures > 0 {
            println!("Failed games: {}", self.failures);
        }
    }
}

/// Per-game seed: tournament seed mixed with the game index
fn game_seed(seed: u64, game_idx: usize) -> u64 {
    seed.wrapping_add((game_idx as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn make_controller(kind: ControllerType, id: CharacterId, seed: u64) -> Box<dyn CharacterController> {
    match kind {
        ControllerType::Zero => Box::new(ZeroController::new(id)),
        ControllerType::Random => Box::new(RandomController::with_seed(id, seed)),
    }
}

/// Play one silent game and report it as a single-game tournament
fn play_one(catalog: &Arc<Catalog>, settings: &TournamentSettings, game_idx: usize) -> Result<TournamentReport> {
    let seed = game_seed(settings.seed, game_idx);
    let config = GameConfig {
        seed,
        ..settings.config.clone()
    };
    let names = (1..=settings.seats.len()).map(|i| format!("P{i}"));
    let (mut game, ids) = GameInitializer::new(config, Arc::clone(catalog))
        .with_characters(names)
        .init()?;

    let mut controllers: Vec<Box<dyn CharacterController>> = settings
        .seats
        .iter()
        .zip(&ids)
        .enumerate()
        .map(|(seat, (&kind, &id))| make_controller(kind, id, seed.wrapping_add(seat as u64 + 1)))
        .collect();
    let mut refs: Vec<&mut dyn CharacterController> = controllers
        .iter_mut()
        .map(|c| -> &mut dyn CharacterController { c.as_mut() })
        .collect();

    let result = GameLoop::new(&mut game)
        .with_verbosity(VerbosityLevel::Silent)
        .with_max_turns(settings.max_turns)
        .run_game(&mut refs)?;

    let mut report = TournamentReport::empty(settings.seats.len());
    report.total_turns = result.turns_played as u64;
    match result.end_reason {
        GameEndReason::LastStanding(winner) => {
            let seat = ids
                .iter()
                .position(|&id| id == winner)
                .ok_or(GameError::EntityNotFound(winner.as_u32()))?;
            report.seat_wins[seat] += 1;
        }
        GameEndReason::Draw => report.draws += 1,
        GameEndReason::TurnLimit => report.turn_limits += 1,
    }
    Ok(report)
}

/// Run every game of the tournament in parallel
pub fn run_tourney(catalog: Arc<Catalog>, settings: &TournamentSettings) -> Result<TournamentReport> {
    if settings.seats.len() < 2 || settings.seats.len() > settings.config.max_players {
        return Err(GameError::InvalidAction(format!(
            "a tournament needs 2..={} seats, got {}",
            settings.config.max_players,
            settings.seats.len()
        )));
    }

    let seats = settings.seats.len();
    let report = (0..settings.games)
        .into_par_iter()
        .map(|game_idx| match play_one(&catalog, settings, game_idx) {
            Ok(report) => report,
            Err(e) => {
                eprintln!("Warning: Game {game_idx} failed: {e}");
                TournamentReport {
                    failures: 1,
                    ..TournamentReport::empty(seats)
                }
            }
        })
        .reduce(|| TournamentReport::empty(seats), TournamentReport::merge);
    Ok(report)
}

/// Run a tournament and print its summary
pub fn run_and_print(catalog: Arc<Catalog>, settings: &TournamentSettings) -> Result<TournamentReport> {
    println!("=== Cardclash - Tournament Mode ===\n");
    println!("Running {} games, seats: {:?}, seed {}\n", settings.games, settings.seats, settings.seed);
    let start = Instant::now();
    let report = run_tourney(catalog, settings)?;
    report.print_summary(start.elapsed());
    Ok(report)
}
