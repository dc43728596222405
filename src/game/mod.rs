//! Game state, turn resolution and the game loop

pub mod behavior;
pub mod causality;
pub mod config;
pub mod controller;
pub mod engine;
pub mod game_loop;
pub mod initiative;
pub mod logger;
pub mod random_controller;
pub mod snapshot;
pub mod state;
pub mod zero_controller;

pub use behavior::{Declaration, EffectContext};
pub use causality::FailedAction;
pub use config::GameConfig;
pub use controller::{CharacterController, GameStateView};
pub use engine::{DeclareOutcome, DeclareRequest, PassOutcome};
pub use game_loop::{GameEndReason, GameLoop, GameResult};
pub use initiative::Initiative;
pub use logger::{GameLogger, LogEntry, OutputMode, VerbosityLevel};
pub use random_controller::RandomController;
pub use snapshot::{ActionView, CardView, CharacterView, GameSnapshot};
pub use state::GameState;
pub use zero_controller::ZeroController;
