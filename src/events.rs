//! Structured log of everything that changed during a command
//!
//! The transport layer broadcasts state after each command; the event log
//! lets it also say *what happened* (which actions resolved, which failed,
//! which cards moved). Marks work like choice points: take a mark before a
//! command and read everything logged after it.

use crate::core::{ActionId, ActionPhase, CardId, CharacterId};
use crate::zones::Location;
use serde::{Deserialize, Serialize};

/// Atomic game events, in the order they happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// An action was accepted
    ActionDeclared {
        action_id: ActionId,
        source: CharacterId,
        card_id: CardId,
        trigger: Option<ActionId>,
    },

    /// A character waived its reaction window on an action
    ReactionPassed { action_id: ActionId, character: CharacterId },

    /// An action changed phase
    PhaseChanged {
        action_id: ActionId,
        from: ActionPhase,
        to: ActionPhase,
    },

    /// An action's tick effect ran
    ActionTicked { action_id: ActionId, ticks_left: u32 },

    /// An action resolved because its tick condition no longer held
    ActionFizzled { action_id: ActionId },

    /// A card moved between locations
    CardMoved {
        card_id: CardId,
        owner: CharacterId,
        from: Location,
        to: Location,
    },

    /// A character lost health
    DamageDealt { target: CharacterId, amount: u32 },

    /// A character's health reached zero
    CharacterDied { character: CharacterId },

    /// Initiative moved to another character
    InitiativeAdvanced {
        from: Option<CharacterId>,
        to: CharacterId,
        reaction_phase: bool,
    },

    /// Every living character got its round resources back
    ResourcesReset,
}

/// Append-only event log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    /// Events (most recent at end)
    events: Vec<GameEvent>,

    /// Is logging enabled? (disabled for benchmarks)
    enabled: bool,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog {
            events: Vec::new(),
            enabled: true,
        }
    }

    /// Create a disabled log (for benchmarking)
    pub fn disabled() -> Self {
        EventLog {
            events: Vec::new(),
            enabled: false,
        }
    }

    pub fn log(&mut self, event: GameEvent) {
        if self.enabled {
            self.events.push(event);
        }
    }

    /// Position to read from later with [`EventLog::since`]
    pub fn mark(&self) -> usize {
        self.events.len()
    }

    /// Everything logged after `mark`
    pub fn since(&self, mark: usize) -> &[GameEvent] {
        self.events.get(mark..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Drop everything logged after `mark`
    pub fn truncate(&mut self, mark: usize) {
        self.events.truncate(mark);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
