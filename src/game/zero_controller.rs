//! Zero controller for testing and automation
//!
//! Always takes the first option offered and never passes a reaction
//! window it could use. Games driven by it are fully deterministic.

use crate::core::{ActionId, CharacterId};
use crate::game::controller::{CharacterController, GameStateView};
use crate::game::DeclareRequest;

pub struct ZeroController {
    character_id: CharacterId,
}

impl ZeroController {
    pub fn new(character_id: CharacterId) -> Self {
        ZeroController { character_id }
    }
}

impl CharacterController for ZeroController {
    fn character_id(&self) -> CharacterId {
        self.character_id
    }

    fn choose_action(&mut self, _view: &GameStateView, options: &[DeclareRequest]) -> Option<DeclareRequest> {
        options.first().cloned()
    }

    fn choose_reaction(
        &mut self,
        _view: &GameStateView,
        _trigger: ActionId,
        options: &[DeclareRequest],
    ) -> Option<DeclareRequest> {
        options.first().cloned()
    }
}
