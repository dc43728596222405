//! Game loop: drive reaction windows and main turns with controllers

use crate::core::{ActionId, ActionPhase, CharacterId};
use crate::game::controller::{CharacterController, GameStateView};
use crate::game::{DeclareOutcome, DeclareRequest, GameState, PassOutcome, VerbosityLevel};
use crate::zones::Location;
use crate::{GameError, Result};

/// Result of running a game to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    /// Last character standing (None on a draw or turn limit)
    pub winner: Option<CharacterId>,
    /// Main turns started, counting each hand-over of the main window
    pub turns_played: u32,
    pub end_reason: GameEndReason,
}

/// Reason the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEndReason {
    /// Every other character died
    LastStanding(CharacterId),
    /// Nobody is left alive
    Draw,
    /// Game reached the maximum turn count
    TurnLimit,
}

/// Game loop manager
pub struct GameLoop<'a> {
    pub game: &'a mut GameState,
    max_turns: u32,
    turns_elapsed: u32,
    /// Holder of the last main window seen, to count turns
    last_main: Option<CharacterId>,
    pub verbosity: VerbosityLevel,
}

impl<'a> GameLoop<'a> {
    pub fn new(game: &'a mut GameState) -> Self {
        let verbosity = game.logger.verbosity();
        GameLoop {
            game,
            max_turns: 500,
            turns_elapsed: 0,
            last_main: None,
            verbosity,
        }
    }

    /// Set maximum turns before stopping with [`GameEndReason::TurnLimit`]
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set verbosity on both the loop and the game's logger
    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.verbosity = verbosity;
        self.game.logger.set_verbosity(verbosity);
        self
    }

    pub fn turns_elapsed(&self) -> u32 {
        self.turns_elapsed
    }

    /// Run until one character is left, nobody is, or the turn limit hits
    ///
    /// Every living character needs a controller.
    pub fn run_game(&mut self, controllers: &mut [&mut dyn CharacterController]) -> Result<GameResult> {
        for c in &self.game.characters {
            if !controllers.iter().any(|ctl| ctl.character_id() == c.id) {
                return Err(GameError::InvalidAction(format!("no controller for {}", c.name)));
            }
        }
        self.game.set_initial_character();

        loop {
            if let Some(result) = self.step(controllers)? {
                self.notify_game_end(controllers, result.winner);
                let line = match result.end_reason {
                    GameEndReason::LastStanding(id) => {
                        format!("{} wins after {} turns", self.game.character(id)?.name, result.turns_played)
                    }
                    GameEndReason::Draw => "Game ends in a draw".to_string(),
                    GameEndReason::TurnLimit => format!("Turn limit reached ({})", self.max_turns),
                };
                self.game.logger.minimal(&line);
                return Ok(result);
            }
        }
    }

    /// Make one decision; returns the result once the game has ended
    pub fn step(&mut self, controllers: &mut [&mut dyn CharacterController]) -> Result<Option<GameResult>> {
        if let Some(result) = self.check_end() {
            return Ok(Some(result));
        }

        if let Some(trigger) = self.game.next_trigger() {
            self.run_reaction_window(controllers, trigger)?;
            return Ok(None);
        }

        if self.game.pending_actions().next().is_some() {
            // No window open, so the forest must drain
            self.drain()?;
            return Ok(None);
        }

        self.run_main_window(controllers)?;
        Ok(None)
    }

    fn drain(&mut self) -> Result<()> {
        let before = self.pending_fingerprint();
        self.game.settle()?;
        if self.pending_fingerprint() == before {
            return Err(GameError::InvariantViolation(
                "pending actions cannot make progress".to_string(),
            ));
        }
        Ok(())
    }

    fn pending_fingerprint(&self) -> Vec<(ActionId, ActionPhase, u32)> {
        self.game
            .pending_actions()
            .map(|a| (a.id, a.phase, a.max_tick_count))
            .collect()
    }

    fn check_end(&self) -> Option<GameResult> {
        let end_reason = if self.game.is_over() {
            match self.game.winner() {
                Some(id) => GameEndReason::LastStanding(id),
                None => GameEndReason::Draw,
            }
        } else if self.turns_elapsed > self.max_turns {
            GameEndReason::TurnLimit
        } else {
            return None;
        };
        Some(GameResult {
            winner: self.game.winner(),
            turns_played: self.turns_elapsed.min(self.max_turns),
            end_reason,
        })
    }

    fn run_reaction_window(
        &mut self,
        controllers: &mut [&mut dyn CharacterController],
        trigger: ActionId,
    ) -> Result<()> {
        let Some(reactor) = self.game.next_reactor(trigger) else {
            // Everyone settled since the last command
            return self.drain();
        };

        let options: Vec<DeclareRequest> = self
            .game
            .legal_declarations(reactor)
            .into_iter()
            .filter(|req| req.trigger == Some(trigger))
            .collect();

        let choice = {
            let controller = find_controller(controllers, reactor)?;
            let view = GameStateView::new(self.game, reactor);
            controller.choose_reaction(&view, trigger, &options)
        };

        if let Some(req) = choice {
            if let DeclareOutcome::Declared(_) = self.game.declare_action(req)? {
                return Ok(());
            }
        }
        match self.game.pass_reaction(reactor, trigger)? {
            PassOutcome::Passed => Ok(()),
            PassOutcome::Rejected(r) => Err(GameError::InvariantViolation(format!(
                "reactor {reactor} could not pass: {r}"
            ))),
        }
    }

    fn run_main_window(&mut self, controllers: &mut [&mut dyn CharacterController]) -> Result<()> {
        let current = match self.game.current_character() {
            Some(id) if self.can_act(id) => id,
            _ => {
                self.game.advance_initiative(false);
                return Ok(());
            }
        };

        if self.last_main != Some(current) {
            self.last_main = Some(current);
            self.turns_elapsed += 1;
            let line = format!("Turn {}: {}", self.turns_elapsed, self.game.character(current)?.name);
            self.game.logger.normal(&line);
        }

        if self.game.cards_in(current, Location::Hand).is_empty() {
            self.game.draw(current, 1)?;
        }

        let options = self.main_options(current);
        let choice = {
            let controller = find_controller(controllers, current)?;
            let view = GameStateView::new(self.game, current);
            controller.choose_action(&view, &options)
        };

        if let Some(req) = choice {
            if let DeclareOutcome::Declared(_) = self.game.declare_action(req)? {
                return Ok(());
            }
        }
        self.game.yield_turn(current)
    }

    fn can_act(&self, id: CharacterId) -> bool {
        self.game
            .character(id)
            .map(|c| c.is_alive() && c.actions_remaining > 0)
            .unwrap_or(false)
    }

    /// Root declarations that spend an action
    ///
    /// Free cards never end a turn on their own, so they are left out.
    fn main_options(&self, character: CharacterId) -> Vec<DeclareRequest> {
        self.game
            .legal_declarations(character)
            .into_iter()
            .filter(|req| req.trigger.is_none())
            .filter(|req| {
                self.game
                    .card(req.card)
                    .and_then(|card| self.game.template(card.template))
                    .map(|t| !t.is_free && !t.is_pass())
                    .unwrap_or(false)
            })
            .collect()
    }

    fn notify_game_end(&self, controllers: &mut [&mut dyn CharacterController], winner: Option<CharacterId>) {
        for controller in controllers.iter_mut() {
            let id = controller.character_id();
            let view = GameStateView::new(self.game, id);
            controller.on_game_end(&view, winner == Some(id));
        }
    }
}

fn find_controller<'c, 'd>(
    controllers: &'c mut [&'d mut dyn CharacterController],
    id: CharacterId,
) -> Result<&'c mut (dyn CharacterController + 'd)> {
    controllers
        .iter_mut()
        .find(|c| c.character_id() == id)
        .map(|c| &mut **c)
        .ok_or(GameError::EntityNotFound(id.as_u32()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, RandomController, ZeroController};
    use crate::loader::{Catalog, GameInitializer};
    use std::sync::Arc;

    fn setup(seed: u64) -> (GameState, Vec<CharacterId>) {
        let config = GameConfig::with_seed(seed);
        let catalog = Arc::new(Catalog::standard().unwrap());
        GameInitializer::new(config, catalog)
            .with_characters(["P1", "P2"])
            .init()
            .unwrap()
    }

    #[test]
    fn test_zero_controllers_finish() {
        let (mut game, ids) = setup(1);
        let mut c1 = ZeroController::new(ids[0]);
        let mut c2 = ZeroController::new(ids[1]);
        let result = GameLoop::new(&mut game)
            .with_verbosity(VerbosityLevel::Silent)
            .run_game(&mut [&mut c1, &mut c2])
            .unwrap();

        assert!(result.turns_played > 0);
        match result.end_reason {
            GameEndReason::LastStanding(id) => {
                assert_eq!(result.winner, Some(id));
                assert!(game.is_over());
            }
            other => assert_eq!(other, GameEndReason::TurnLimit),
        }
    }

    #[test]
    fn test_random_controllers_keep_cards_accounted() {
        let (mut game, ids) = setup(42);
        let total = game.cards.len();
        let mut c1 = RandomController::with_seed(ids[0], 1);
        let mut c2 = RandomController::with_seed(ids[1], 2);
        GameLoop::new(&mut game)
            .with_verbosity(VerbosityLevel::Silent)
            .with_max_turns(50)
            .run_game(&mut [&mut c1, &mut c2])
            .unwrap();

        let counted: usize = ids
            .iter()
            .flat_map(|&id| Location::ALL.into_iter().map(move |loc| (id, loc)))
            .map(|(id, loc)| game.cards_in(id, loc).len())
            .sum();
        assert_eq!(counted, total);
    }

    #[test]
    fn test_loop_drain_hands_back_the_main_turn() {
        let mut game = GameState::new(GameConfig::default(), Arc::new(Catalog::standard().unwrap()));
        let p1 = game.add_character("P1").unwrap();
        let p2 = game.add_character("P2").unwrap();
        game.set_initial_character();
        let template = game.catalog.find_by_name("Quick Shot").unwrap().id;
        let shot = game.deal_card(p1, template, Location::Hand).unwrap();
        game.declare_action(DeclareRequest::new(p1, shot).targeting(p2)).unwrap();
        assert_eq!(game.initiative.stashed, Some(p1));

        // P2 runs dry without any command settling the window
        game.character_mut(p2).unwrap().reactions_remaining = 0;

        let mut c1 = ZeroController::new(p1);
        let mut c2 = ZeroController::new(p2);
        let stepped = GameLoop::new(&mut game)
            .with_verbosity(VerbosityLevel::Silent)
            .step(&mut [&mut c1, &mut c2])
            .unwrap();

        assert_eq!(stepped, None);
        assert!(game.pending_actions().next().is_none());
        assert_eq!(game.character(p2).unwrap().health, 99);
        assert_eq!(game.initiative.stashed, None);
        assert_eq!(game.current_character(), Some(p1));
    }

    #[test]
    fn test_missing_controller() {
        let (mut game, ids) = setup(3);
        let mut c1 = ZeroController::new(ids[0]);
        let err = GameLoop::new(&mut game).run_game(&mut [&mut c1]).unwrap_err();
        assert!(matches!(err, GameError::InvalidAction(_)));
    }
}
