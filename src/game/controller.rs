//! Character controller trait and game state view
//!
//! The game loop calls a controller whenever its character holds a main
//! turn or a reaction window. Controllers only see a read-only view.

use crate::core::{ActionId, CardId, CharacterId};
use crate::game::{DeclareRequest, GameSnapshot, GameState};
use crate::zones::Location;
use crate::Result;

/// Read-only view of game state for controllers
pub struct GameStateView<'a> {
    game: &'a GameState,
    character_id: CharacterId,
}

impl<'a> GameStateView<'a> {
    pub fn new(game: &'a GameState, character_id: CharacterId) -> Self {
        GameStateView { game, character_id }
    }

    pub fn character_id(&self) -> CharacterId {
        self.character_id
    }

    /// Cards in this character's hand
    pub fn hand(&self) -> &[CardId] {
        self.game.cards_in(self.character_id, Location::Hand)
    }

    /// Living characters other than this one
    pub fn opponents(&self) -> impl Iterator<Item = CharacterId> + '_ {
        self.game
            .living_characters()
            .map(|c| c.id)
            .filter(move |&id| id != self.character_id)
    }

    /// Whether `trigger` would hit this character
    pub fn is_targeted_by(&self, trigger: ActionId) -> bool {
        self.game
            .action(trigger)
            .map(|a| a.targets_character(self.character_id))
            .unwrap_or(false)
    }

    pub fn snapshot(&self) -> Result<GameSnapshot> {
        GameSnapshot::for_viewer(self.game, self.character_id)
    }
}

/// Character controller trait
///
/// Implement this to plug AI or a UI into the game loop.
pub trait CharacterController {
    fn character_id(&self) -> CharacterId;

    /// Pick a main-turn declaration, or `None` to yield the turn
    fn choose_action(&mut self, view: &GameStateView, options: &[DeclareRequest]) -> Option<DeclareRequest>;

    /// Pick a reaction to `trigger`, or `None` to pass
    fn choose_reaction(
        &mut self,
        view: &GameStateView,
        trigger: ActionId,
        options: &[DeclareRequest],
    ) -> Option<DeclareRequest>;

    /// Called when the game ends
    fn on_game_end(&mut self, _view: &GameStateView, _won: bool) {}
}
