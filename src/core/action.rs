//! Declared actions and their phase state machine

use crate::core::{
    CardId, CharacterId, Declarability, EntityId, ResolutionTiming, Template, TemplateId,
    TickCondition, TickEffect,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

pub type ActionId = EntityId<Action>;

/// Phase of an action
///
/// `Declared -> ReactedTo -> (Started) -> Resolved | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPhase {
    /// Reaction window still open
    Declared,
    /// Every living character responded or is ineligible
    ReactedTo,
    /// Ticked at least once without finishing
    Started,
    Resolved,
    Failed,
}

impl ActionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionPhase::Resolved | ActionPhase::Failed)
    }
}

impl fmt::Display for ActionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionPhase::Declared => "declared",
            ActionPhase::ReactedTo => "reacted_to",
            ActionPhase::Started => "started",
            ActionPhase::Resolved => "resolved",
            ActionPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Something an action points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionTarget {
    Character(CharacterId),
    Card(CardId),
}

/// One declaration of a card's use
///
/// Rule parameters are copied from the template when the action is created,
/// so catalog edits never affect actions already in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub source: CharacterId,
    pub card: CardId,
    pub template: TemplateId,

    /// The action this one reacts to (None for root actions)
    pub trigger: Option<ActionId>,

    /// Direct reactions, oldest first
    pub reactions: SmallVec<[ActionId; 4]>,

    pub phase: ActionPhase,
    pub resolution_timing: ResolutionTiming,
    pub is_free: bool,

    /// Remaining ticks, doubling as effect magnitude
    pub max_tick_count: u32,

    pub declarability: Declarability,
    pub tick_condition: TickCondition,
    pub tick_effect: TickEffect,

    pub targets: SmallVec<[ActionTarget; 2]>,

    /// Characters that explicitly passed on this action's reaction window
    pub waived_by: SmallVec<[CharacterId; 2]>,
}

impl Action {
    /// Build a `Declared` action from a template
    pub fn from_template(
        id: ActionId,
        template: &Template,
        source: CharacterId,
        card: CardId,
        trigger: Option<ActionId>,
        targets: SmallVec<[ActionTarget; 2]>,
    ) -> Self {
        Action {
            id,
            source,
            card,
            template: template.id,
            trigger,
            reactions: SmallVec::new(),
            phase: ActionPhase::Declared,
            resolution_timing: template.resolution_timing,
            is_free: template.is_free,
            max_tick_count: template.max_tick_count,
            declarability: template.declarability,
            tick_condition: template.tick_condition,
            tick_effect: template.tick_effect,
            targets,
            waived_by: SmallVec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn is_reaction(&self) -> bool {
        self.trigger.is_some()
    }

    /// The always-available no-op card needs no reaction window
    pub fn is_pass(&self) -> bool {
        self.tick_effect == TickEffect::Pass
    }

    pub fn character_targets(&self) -> impl Iterator<Item = CharacterId> + '_ {
        self.targets.iter().filter_map(|t| match t {
            ActionTarget::Character(id) => Some(*id),
            ActionTarget::Card(_) => None,
        })
    }

    pub fn card_targets(&self) -> impl Iterator<Item = CardId> + '_ {
        self.targets.iter().filter_map(|t| match t {
            ActionTarget::Card(id) => Some(*id),
            ActionTarget::Character(_) => None,
        })
    }

    pub fn targets_character(&self, character: CharacterId) -> bool {
        self.targets.contains(&ActionTarget::Character(character))
    }
}
