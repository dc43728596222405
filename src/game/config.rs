//! Game setup parameters

use crate::core::{DEFAULT_ACTIONS, DEFAULT_REACTIONS};
use crate::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const STARTING_HEALTH: u32 = 100;
pub const STARTING_HAND_SIZE: usize = 5;
pub const CARDS_PER_TEMPLATE: usize = 2;
pub const MAX_PLAYERS: usize = 3;

/// Tunable rules of a game
///
/// Missing fields in a JSON config fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub starting_health: u32,
    pub default_actions: u32,
    pub default_reactions: u32,
    pub starting_hand_size: usize,
    pub cards_per_template: usize,
    pub max_players: usize,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            starting_health: STARTING_HEALTH,
            default_actions: DEFAULT_ACTIONS,
            default_reactions: DEFAULT_REACTIONS,
            starting_hand_size: STARTING_HAND_SIZE,
            cards_per_template: CARDS_PER_TEMPLATE,
            max_players: MAX_PLAYERS,
            seed: 0,
        }
    }
}

impl GameConfig {
    pub fn with_seed(seed: u64) -> Self {
        GameConfig {
            seed,
            ..GameConfig::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| GameError::SerializationError(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.starting_health, 100);
        assert_eq!(config.default_actions, 2);
        assert_eq!(config.default_reactions, 2);
        assert_eq!(config.starting_hand_size, 5);
        assert_eq!(config.max_players, 3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(r#"{"starting_health": 20, "seed": 9}"#).unwrap();
        assert_eq!(config.starting_health, 20);
        assert_eq!(config.seed, 9);
        assert_eq!(config.cards_per_template, 2);
    }

    #[test]
    fn test_bad_json_is_serialization_error() {
        let err = GameConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, GameError::SerializationError(_)));
    }
}
