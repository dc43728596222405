//! Cardclash - turn-based card game resolution engine
//!
//! Characters declare cards as actions, react to each other's actions, and
//! the engine resolves the resulting causality forest tick by tick.

pub mod core;
pub mod error;
pub mod events;
pub mod game;
pub mod loader;
pub mod tournament;
pub mod zones;

pub use error::{GameError, Rejection, RejectionReason, Result};
