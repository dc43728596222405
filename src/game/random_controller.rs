//! Random controller: baseline opponent for self-play

use crate::core::{ActionId, ActionTarget, CharacterId};
use crate::game::controller::{CharacterController, GameStateView};
use crate::game::DeclareRequest;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// A controller that makes uniform random choices
pub struct RandomController {
    character_id: CharacterId,
    rng: ChaCha12Rng,
}

impl RandomController {
    pub fn new(character_id: CharacterId) -> Self {
        RandomController {
            character_id,
            rng: ChaCha12Rng::from_entropy(),
        }
    }

    /// Seeded for reproducible games
    pub fn with_seed(character_id: CharacterId, seed: u64) -> Self {
        RandomController {
            character_id,
            rng: ChaCha12Rng::seed_from_u64(seed),
        }
    }
}

impl CharacterController for RandomController {
    fn character_id(&self) -> CharacterId {
        self.character_id
    }

    /// Uniform over the options that only hit opponents, if there are any
    fn choose_action(&mut self, view: &GameStateView, options: &[DeclareRequest]) -> Option<DeclareRequest> {
        let opponents: Vec<CharacterId> = view.opponents().collect();
        let aimed: Vec<&DeclareRequest> = options
            .iter()
            .filter(|req| {
                req.targets.iter().all(|t| match t {
                    ActionTarget::Character(id) => opponents.contains(id),
                    ActionTarget::Card(_) => true,
                })
            })
            .collect();
        let pool: Vec<&DeclareRequest> = if aimed.is_empty() {
            options.iter().collect()
        } else {
            aimed
        };
        if pool.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..pool.len());
        Some(pool[index].clone())
    }

    /// Passing is one more option, unless the trigger hits this character
    fn choose_reaction(
        &mut self,
        view: &GameStateView,
        trigger: ActionId,
        options: &[DeclareRequest],
    ) -> Option<DeclareRequest> {
        if view.is_targeted_by(trigger) && !options.is_empty() {
            let index = self.rng.gen_range(0..options.len());
            return Some(options[index].clone());
        }
        let index = self.rng.gen_range(0..=options.len());
        options.get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CardId;
    use crate::game::{GameConfig, GameState};
    use crate::loader::Catalog;
    use crate::zones::Location;
    use std::sync::Arc;

    fn two_player_game() -> (GameState, CharacterId, CharacterId) {
        let mut game = GameState::new(GameConfig::default(), Arc::new(Catalog::standard().unwrap()));
        let p1 = game.add_character("P1").unwrap();
        let p2 = game.add_character("P2").unwrap();
        game.set_initial_character();
        (game, p1, p2)
    }

    #[test]
    fn test_prefers_options_aimed_at_opponents() {
        let (game, p1, p2) = two_player_game();
        let view = GameStateView::new(&game, p1);
        assert_eq!(view.opponents().collect::<Vec<_>>(), vec![p2]);

        let at_self = DeclareRequest::new(p1, CardId::new(90)).targeting(p1);
        let at_p2 = DeclareRequest::new(p1, CardId::new(90)).targeting(p2);
        let options = vec![at_self.clone(), at_p2.clone()];
        for seed in 0..32 {
            let mut controller = RandomController::with_seed(p1, seed);
            assert_eq!(controller.choose_action(&view, &options), Some(at_p2.clone()));
        }

        // Nothing aimed at an opponent: fall back to any option
        let mut controller = RandomController::with_seed(p1, 1);
        assert_eq!(controller.choose_action(&view, &[at_self.clone()]), Some(at_self));
    }

    #[test]
    fn test_never_passes_when_targeted() {
        let (mut game, p1, p2) = two_player_game();
        let shot = game.catalog.find_by_name("Quick Shot").unwrap().id;
        let shield = game.catalog.find_by_name("Deflection Shield").unwrap().id;
        let shot = game.deal_card(p1, shot, Location::Hand).unwrap();
        game.deal_card(p2, shield, Location::Hand).unwrap();
        let root = game
            .declare_action(DeclareRequest::new(p1, shot).targeting(p2))
            .unwrap()
            .action_id()
            .unwrap();

        let options: Vec<_> = game
            .legal_declarations(p2)
            .into_iter()
            .filter(|req| req.trigger == Some(root))
            .collect();
        assert_eq!(options.len(), 1);

        let targeted = GameStateView::new(&game, p2);
        assert_eq!(targeted.hand().len(), 1);
        assert_eq!(targeted.snapshot().unwrap().hand.len(), 1);
        assert!(targeted.is_targeted_by(root));
        assert!(!GameStateView::new(&game, p1).is_targeted_by(root));
        for seed in 0..32 {
            let mut controller = RandomController::with_seed(p2, seed);
            assert_eq!(controller.choose_reaction(&targeted, root, &options), Some(options[0].clone()));
        }
    }

    #[test]
    fn test_seeded_choices_repeat() {
        let game = GameState::new(GameConfig::default(), Arc::new(Catalog::new()));
        let me = CharacterId::new(0);
        let view = GameStateView::new(&game, me);
        let options: Vec<_> = (0..5).map(|i| DeclareRequest::new(me, CardId::new(i))).collect();

        let mut a = RandomController::with_seed(me, 7);
        let mut b = RandomController::with_seed(me, 7);
        for _ in 0..20 {
            let picked = a.choose_action(&view, &options);
            assert!(picked.is_some());
            assert_eq!(picked, b.choose_action(&view, &options));
        }
        assert_eq!(a.choose_action(&view, &[]), None);
    }
}
