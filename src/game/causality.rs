//! Causality resolver
//!
//! Actions live in an arena (`GameState::actions`) indexed by `ActionId`, so
//! id order is declaration order. Each action holds its trigger's id and the
//! ids of its direct reactions, which makes the causality forest explicit.

use crate::core::{Action, ActionId, ActionPhase, CardId, CharacterId, ResolutionTiming};
use crate::events::GameEvent;
use crate::game::GameState;
use crate::{GameError, Result};
use std::collections::VecDeque;

/// One action caught by a failure cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedAction {
    pub action: ActionId,
    pub card: CardId,
    pub owner: CharacterId,
}

impl GameState {
    /// Actions that are neither resolved nor failed, oldest first
    pub fn pending_actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(|a| !a.is_terminal())
    }

    /// Whether an action's relation to its trigger lets it proceed now
    ///
    /// `before` reactions may go while the trigger is pending; `after`
    /// reactions wait for the trigger to resolve.
    fn trigger_permits(&self, action: &Action) -> bool {
        let Some(trigger) = action.trigger else {
            return true;
        };
        match self.action(trigger) {
            Ok(t) => match action.resolution_timing {
                ResolutionTiming::Before => true,
                ResolutionTiming::After => t.phase == ActionPhase::Resolved,
            },
            Err(_) => false,
        }
    }

    /// Structurally eligible to tick: past its reaction window (a pass
    /// needs none) and allowed to proceed relative to its trigger
    pub fn is_tick_candidate(&self, action: &Action) -> bool {
        let window_closed = match action.phase {
            ActionPhase::ReactedTo | ActionPhase::Started => true,
            ActionPhase::Declared => action.is_pass(),
            ActionPhase::Resolved | ActionPhase::Failed => false,
        };
        window_closed && self.trigger_permits(action)
    }

    pub fn can_tick(&self, action: &Action) -> bool {
        action.tick_condition.check(self, action)
    }

    /// The next action to tick, if any
    ///
    /// Candidates are taken oldest first. The first one that can tick is
    /// preempted by its oldest tickable `before` reaction, which is in turn
    /// preempted by its own, so the deepest such reaction goes first.
    pub fn next_tickable(&self) -> Option<ActionId> {
        self.actions
            .iter()
            .filter(|a| self.is_tick_candidate(a) && self.can_tick(a))
            .map(|a| self.first_to_resolve(a))
            .next()
    }

    fn first_to_resolve(&self, action: &Action) -> ActionId {
        let preempting = action
            .reactions
            .iter()
            .filter_map(|&id| self.action(id).ok())
            .find(|r| {
                r.resolution_timing == ResolutionTiming::Before
                    && self.is_tick_candidate(r)
                    && self.can_tick(r)
            });

        match preempting {
            Some(reaction) => self.first_to_resolve(reaction),
            None => action.id,
        }
    }

    /// Oldest candidate whose tick condition no longer holds
    pub(crate) fn next_fizzled(&self) -> Option<ActionId> {
        self.actions
            .iter()
            .find(|a| self.is_tick_candidate(a) && !self.can_tick(a))
            .map(|a| a.id)
    }

    /// Oldest action whose reaction window is still open
    pub fn next_trigger(&self) -> Option<ActionId> {
        self.actions
            .iter()
            .find(|a| a.phase == ActionPhase::Declared && !a.is_pass())
            .map(|a| a.id)
    }

    /// Whether `character` has nothing more to do in `trigger`'s window
    pub fn is_settled(&self, character: CharacterId, trigger: &Action) -> bool {
        let Ok(c) = self.character(character) else {
            return true;
        };
        !c.is_alive()
            || c.id == trigger.source
            || c.reactions_remaining == 0
            || trigger.waived_by.contains(&character)
            || trigger
                .reactions
                .iter()
                .filter_map(|&id| self.action(id).ok())
                .any(|r| r.source == character)
    }

    /// First living character, after the trigger's source in id order,
    /// that may still respond to `trigger`
    pub fn next_reactor(&self, trigger: ActionId) -> Option<CharacterId> {
        let t = self.action(trigger).ok()?;
        if t.phase != ActionPhase::Declared {
            return None;
        }
        let n = self.characters.len();
        let start = self
            .characters
            .iter()
            .position(|c| c.id == t.source)
            .map(|i| i + 1)
            .unwrap_or(0);
        (0..n)
            .map(|i| self.characters[(start + i) % n].id)
            .find(|&id| !self.is_settled(id, t))
    }

    /// Close every reaction window whose characters have all responded or
    /// can no longer respond
    pub fn refresh_reaction_windows(&mut self) -> Result<()> {
        let closable: Vec<ActionId> = self
            .actions
            .iter()
            .filter(|a| a.phase == ActionPhase::Declared && !a.is_pass())
            .filter(|a| self.characters.iter().all(|c| self.is_settled(c.id, a)))
            .map(|a| a.id)
            .collect();

        for id in closable {
            self.set_phase(id, ActionPhase::ReactedTo)?;
        }
        Ok(())
    }

    /// Fail `root` and every non-terminal action that depends on it
    ///
    /// Already terminal reactions, and everything below them, are left
    /// alone. Returns the failed actions so their cards can be discarded.
    pub fn fail_recursively(&mut self, root: ActionId) -> Result<Vec<FailedAction>> {
        let mut chain = Vec::new();
        let mut queue = VecDeque::from([root]);

        while let Some(id) = queue.pop_front() {
            let action = self.action(id)?;
            if action.is_terminal() {
                continue;
            }
            chain.push(FailedAction {
                action: id,
                card: action.card,
                owner: action.source,
            });
            queue.extend(action.reactions.iter().copied());
        }

        for failed in &chain {
            self.set_phase(failed.action, ActionPhase::Failed)?;
        }
        Ok(chain)
    }

    /// Move an action along its state machine, recording the change
    pub(crate) fn set_phase(&mut self, id: ActionId, to: ActionPhase) -> Result<()> {
        let action = self.action_mut(id)?;
        let from = action.phase;
        if from == to {
            return Ok(());
        }
        if from.is_terminal() {
            return Err(GameError::InvariantViolation(format!(
                "action {id} is already {from}, cannot become {to}"
            )));
        }
        action.phase = to;
        self.events.log(GameEvent::PhaseChanged {
            action_id: id,
            from,
            to,
        });
        Ok(())
    }
}
