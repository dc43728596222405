//! Per-character state snapshots for broadcast
//!
//! A snapshot is what one character is allowed to see: its own hand in
//! full, only counts for everyone else, and card detail only for actions
//! it sourced.

use crate::core::{
    ActionId, ActionPhase, ActionTarget, CardId, CharacterId, ResolutionTiming, TargetingParams,
    TemplateId,
};
use crate::game::GameState;
use crate::zones::Location;
use crate::{GameError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub id: CardId,
    pub template: TemplateId,
    pub name: String,
    pub description: String,
    pub location: Location,
    pub targeting: TargetingParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterView {
    pub id: CharacterId,
    pub name: String,
    pub health: u32,
    pub max_health: u32,
    pub is_alive: bool,
    pub is_current: bool,
    pub actions_remaining: u32,
    pub reactions_remaining: u32,
    pub hand_count: usize,
    pub deck_count: usize,
    pub discard_count: usize,
    pub table_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionView {
    pub id: ActionId,
    pub source: CharacterId,
    pub trigger: Option<ActionId>,
    pub phase: ActionPhase,
    pub resolution_timing: ResolutionTiming,
    pub targets: Vec<ActionTarget>,
    pub ticks_left: u32,
    /// Only present for the viewer's own actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<CardView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub viewer: CharacterId,
    pub current_character: Option<CharacterId>,
    pub is_over: bool,
    pub characters: Vec<CharacterView>,
    pub hand: Vec<CardView>,
    /// Non-terminal actions, oldest first
    pub actions: Vec<ActionView>,
}

impl GameState {
    fn card_view(&self, id: CardId) -> Result<CardView> {
        let card = self.card(id)?;
        let template = self.template(card.template)?;
        Ok(CardView {
            id,
            template: card.template,
            name: card.name.to_string(),
            description: template.description.clone(),
            location: card.location,
            targeting: card.targeting,
        })
    }
}

impl GameSnapshot {
    pub fn for_viewer(game: &GameState, viewer: CharacterId) -> Result<Self> {
        game.character(viewer)?;

        let characters = game
            .characters
            .iter()
            .map(|c| {
                let count = |loc: Location| game.ledger.count(c.id, loc);
                CharacterView {
                    id: c.id,
                    name: c.name.to_string(),
                    health: c.health,
                    max_health: c.max_health,
                    is_alive: c.is_alive(),
                    is_current: game.current_character() == Some(c.id),
                    actions_remaining: c.actions_remaining,
                    reactions_remaining: c.reactions_remaining,
                    hand_count: count(Location::Hand),
                    deck_count: count(Location::Deck),
                    discard_count: count(Location::Discard),
                    table_count: count(Location::Table),
                }
            })
            .collect();

        let hand = game
            .cards_in(viewer, Location::Hand)
            .iter()
            .map(|&id| game.card_view(id))
            .collect::<Result<Vec<_>>>()?;

        let actions = game
            .pending_actions()
            .map(|a| -> Result<ActionView> {
                let card = if a.source == viewer {
                    Some(game.card_view(a.card)?)
                } else {
                    None
                };
                Ok(ActionView {
                    id: a.id,
                    source: a.source,
                    trigger: a.trigger,
                    phase: a.phase,
                    resolution_timing: a.resolution_timing,
                    targets: a.targets.to_vec(),
                    ticks_left: a.max_tick_count,
                    card,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(GameSnapshot {
            viewer,
            current_character: game.current_character(),
            is_over: game.is_over(),
            characters,
            hand,
            actions,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| GameError::SerializationError(e.to_string()))
    }
}
