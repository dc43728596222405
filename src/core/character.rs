//! Character (player) representation

use crate::core::{CharacterName, EntityId, GameEntity};
use serde::{Deserialize, Serialize};

pub type CharacterId = EntityId<Character>;

/// Actions granted at the start of each round
pub const DEFAULT_ACTIONS: u32 = 2;

/// Reactions granted at the start of each round
pub const DEFAULT_REACTIONS: u32 = 2;

/// Represents a character in the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// Unique ID for this character
    pub id: CharacterId,

    /// Character name
    pub name: CharacterName,

    /// Current health; 0 means dead
    pub health: u32,

    /// Health the character started with
    pub max_health: u32,

    /// Main-turn actions left this round
    pub actions_remaining: u32,

    /// Reactions left this round
    pub reactions_remaining: u32,
}

impl Character {
    pub fn new(id: CharacterId, name: impl Into<CharacterName>, starting_health: u32) -> Self {
        Character {
            id,
            name: name.into(),
            health: starting_health,
            max_health: starting_health,
            actions_remaining: DEFAULT_ACTIONS,
            reactions_remaining: DEFAULT_REACTIONS,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_damaged(&self) -> bool {
        self.health < self.max_health
    }

    /// Apply damage, never dropping below zero. Returns the damage actually taken.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.health);
        self.health -= taken;
        taken
    }

    /// Free actions are always affordable; otherwise a reaction costs a
    /// reaction point and a main action costs an action point.
    pub fn can_afford(&self, is_free: bool, is_reaction: bool) -> bool {
        if is_free {
            return true;
        }
        if is_reaction {
            self.reactions_remaining > 0
        } else {
            self.actions_remaining > 0
        }
    }

    /// Spend the resource for an action. Returns true when the last point
    /// of that resource was spent (free actions spend nothing).
    pub fn spend_resource(&mut self, is_free: bool, is_reaction: bool) -> bool {
        if is_free {
            return false;
        }
        let counter = if is_reaction {
            &mut self.reactions_remaining
        } else {
            &mut self.actions_remaining
        };
        if *counter == 0 {
            return false;
        }
        *counter -= 1;
        *counter == 0
    }

    pub fn reset_turn_resources(&mut self, actions: u32, reactions: u32) {
        self.actions_remaining = actions;
        self.reactions_remaining = reactions;
    }
}

impl GameEntity<Character> for Character {
    fn id(&self) -> CharacterId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}
