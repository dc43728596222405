//! Initiative: whose action or reaction window it is

use crate::core::CharacterId;
use crate::events::GameEvent;
use crate::game::GameState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiative {
    /// Character holding the window
    pub current: Option<CharacterId>,

    /// Character whose main turn resumes once the current cascade drains
    pub stashed: Option<CharacterId>,
}

impl GameState {
    pub fn current_character(&self) -> Option<CharacterId> {
        self.initiative.current
    }

    /// Give the first window of the game to the first living character
    pub fn set_initial_character(&mut self) -> Option<CharacterId> {
        if self.initiative.current.is_none() {
            let first = self.living_characters().next().map(|c| c.id);
            self.initiative.current = first;
        }
        self.initiative.current
    }

    fn can_take_window(&self, id: CharacterId, is_reaction_phase: bool) -> bool {
        match self.character(id) {
            Ok(c) if c.is_alive() => {
                if is_reaction_phase {
                    c.reactions_remaining > 0
                } else {
                    c.actions_remaining > 0
                }
            }
            _ => false,
        }
    }

    /// Scan forward from just after `from`, wrapping, ending on `from` itself
    fn scan_for_eligible(&self, from: Option<CharacterId>, is_reaction_phase: bool) -> Option<CharacterId> {
        let n = self.characters.len();
        let start = from
            .and_then(|id| self.characters.iter().position(|c| c.id == id))
            .map(|idx| idx + 1)
            .unwrap_or(0);

        (0..n)
            .map(|i| self.characters[(start + i) % n].id)
            .find(|&id| self.can_take_window(id, is_reaction_phase))
    }

    /// Hand initiative to the next character with the relevant resource left
    ///
    /// Exhausting the action phase starts a new round: every living
    /// character gets its resources back and the first eligible character
    /// in id order takes the window. Reaction windows never reset anything.
    /// Returns `None` when nobody can act.
    pub fn advance_initiative(&mut self, is_reaction_phase: bool) -> Option<CharacterId> {
        let from = self.initiative.current;

        let next = match self.scan_for_eligible(from, is_reaction_phase) {
            Some(next) => Some(next),
            None if !is_reaction_phase => {
                self.reset_round();
                self.living_characters()
                    .find(|c| c.actions_remaining > 0)
                    .map(|c| c.id)
            }
            None => None,
        };

        if let Some(to) = next {
            self.initiative.current = Some(to);
            self.events.log(GameEvent::InitiativeAdvanced {
                from,
                to,
                reaction_phase: is_reaction_phase,
            });
            if let Ok(c) = self.character(to) {
                let line = format!("Initiative passes to {}", c.name);
                self.logger.verbose(&line);
            }
        }
        next
    }

    /// Restore round resources for every living character
    pub fn reset_round(&mut self) {
        let (actions, reactions) = (self.config.default_actions, self.config.default_reactions);
        for character in self.characters.iter_mut().filter(|c| c.is_alive()) {
            character.reset_turn_resources(actions, reactions);
        }
        self.events.log(GameEvent::ResourcesReset);
        self.logger.verbose("New round: resources reset");
    }

    /// Remember whose main turn to come back to after a cascade
    pub(crate) fn stash_main_turn(&mut self) {
        self.initiative.stashed = self.initiative.current;
    }

    /// Return the main-turn window after a cascade fully drained
    ///
    /// The stashed character keeps the window if it is still alive with
    /// actions left; otherwise initiative advances from it.
    pub(crate) fn restore_main_turn(&mut self) {
        let Some(stashed) = self.initiative.stashed.take() else {
            return;
        };
        self.initiative.current = Some(stashed);
        if !self.can_take_window(stashed, false) {
            self.advance_initiative(false);
        }
    }
}
