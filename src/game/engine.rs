//! Turn-resolution engine: declaring actions and draining the causality forest
//!
//! Every command runs as one transaction. Validation never mutates; once a
//! declaration is accepted, any error further down the pipeline (which can
//! only be an invariant violation) rolls the whole command back.

macro_rules! log_if_verbose {
    ($game:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $game.logger.verbose(&format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$game;
        }
    };
}

use crate::core::{
    Action, ActionId, ActionPhase, ActionTarget, CardId, CharacterId, TargetCondition, TargetType,
};
use crate::error::{Rejection, RejectionReason};
use crate::events::GameEvent;
use crate::game::behavior::{Declaration, EffectContext};
use crate::game::GameState;
use crate::zones::Location;
use crate::{GameError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A player's request to use a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclareRequest {
    pub source: CharacterId,
    pub card: CardId,
    pub targets: SmallVec<[ActionTarget; 2]>,
    pub trigger: Option<ActionId>,
}

impl DeclareRequest {
    pub fn new(source: CharacterId, card: CardId) -> Self {
        DeclareRequest {
            source,
            card,
            targets: SmallVec::new(),
            trigger: None,
        }
    }

    pub fn targeting(mut self, character: CharacterId) -> Self {
        self.targets.push(ActionTarget::Character(character));
        self
    }

    pub fn targeting_card(mut self, card: CardId) -> Self {
        self.targets.push(ActionTarget::Card(card));
        self
    }

    pub fn reacting_to(mut self, trigger: ActionId) -> Self {
        self.trigger = Some(trigger);
        self
    }
}

/// Result of [`GameState::declare_action`]: exactly one of the two
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclareOutcome {
    Declared(ActionId),
    Rejected(Rejection),
}

impl DeclareOutcome {
    pub fn is_declared(&self) -> bool {
        matches!(self, DeclareOutcome::Declared(_))
    }

    pub fn action_id(&self) -> Option<ActionId> {
        match self {
            DeclareOutcome::Declared(id) => Some(*id),
            DeclareOutcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            DeclareOutcome::Declared(_) => None,
            DeclareOutcome::Rejected(r) => Some(r),
        }
    }
}

/// Result of [`GameState::pass_reaction`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Passed,
    Rejected(Rejection),
}

impl GameState {
    /// Check a declaration, stopping at the first failed rule
    ///
    /// Order: source, card, trigger, cost, declarability, targets.
    pub fn validate_declaration(&self, req: &DeclareRequest) -> std::result::Result<(), RejectionReason> {
        let source = self
            .character(req.source)
            .map_err(|_| RejectionReason::SourceNotFound)?;
        if !source.is_alive() {
            return Err(RejectionReason::SourceNotAlive);
        }

        let card = match self.card(req.card) {
            Ok(card) if card.owner == req.source => card,
            _ => return Err(RejectionReason::CardNotFound),
        };
        if card.location != Location::Hand {
            return Err(RejectionReason::CardNotInHand);
        }

        if let Some(trigger) = req.trigger {
            match self.action(trigger) {
                Ok(t) if !t.is_terminal() => {}
                _ => return Err(RejectionReason::TriggerNotPending),
            }
        }

        let template = self
            .template(card.template)
            .map_err(|_| RejectionReason::CardNotFound)?;
        if !source.can_afford(template.is_free, req.trigger.is_some()) {
            return Err(RejectionReason::CannotAfford);
        }

        let decl = Declaration {
            source: req.source,
            card: req.card,
            trigger: req.trigger,
            targets: &req.targets,
        };
        if !template.declarability.check(self, &decl) {
            return Err(RejectionReason::NotDeclarable);
        }

        self.validate_targets(req)
    }

    fn validate_targets(&self, req: &DeclareRequest) -> std::result::Result<(), RejectionReason> {
        let params = self
            .card(req.card)
            .map_err(|_| RejectionReason::CardNotFound)?
            .targeting;
        let invalid = |msg: String| -> std::result::Result<(), RejectionReason> {
            Err(RejectionReason::InvalidTargets(msg))
        };

        let count = req.targets.len() as u32;
        if count < params.count_min || count > params.count_max {
            return invalid(format!(
                "expected {}..={} targets, got {count}",
                params.count_min, params.count_max
            ));
        }
        for (i, target) in req.targets.iter().enumerate() {
            if req.targets[..i].contains(target) {
                return invalid("duplicate target".to_string());
            }
        }

        for target in &req.targets {
            match (params.target_type, *target) {
                (TargetType::NextDraw, _) => {
                    return invalid("next_draw cards take no explicit targets".to_string())
                }
                (TargetType::Card, ActionTarget::Card(card)) => {
                    if !self.cards.contains(card) {
                        return invalid(format!("card {card} does not exist"));
                    }
                }
                (TargetType::Card, ActionTarget::Character(_)) => {
                    return invalid("expected card targets".to_string())
                }
                (_, ActionTarget::Card(_)) => {
                    return invalid("expected character targets".to_string())
                }
                (kind, ActionTarget::Character(id)) => {
                    let character = match self.character(id) {
                        Ok(c) => c,
                        Err(_) => return invalid(format!("character {id} does not exist")),
                    };
                    match kind {
                        TargetType::Enemy if id == req.source => {
                            return invalid("cannot target yourself".to_string())
                        }
                        TargetType::Myself if id != req.source => {
                            return invalid("can only target yourself".to_string())
                        }
                        _ => {}
                    }
                    if params.condition == TargetCondition::IsAlive && !character.is_alive() {
                        return invalid(format!("{} is not alive", character.name));
                    }
                }
            }
        }
        Ok(())
    }

    /// Declare a card's use
    ///
    /// On acceptance the card goes to the table, the resource is spent,
    /// initiative advances if that was the last one, and the forest is
    /// drained once no reaction window remains open.
    pub fn declare_action(&mut self, req: DeclareRequest) -> Result<DeclareOutcome> {
        if let Err(reason) = self.validate_declaration(&req) {
            self.logger.verbose(&format!("Declaration rejected: {reason}"));
            return Ok(DeclareOutcome::Rejected(Rejection::new(reason)));
        }

        let id = self.transaction(|game| game.commit_declaration(req))?;
        Ok(DeclareOutcome::Declared(id))
    }

    fn commit_declaration(&mut self, req: DeclareRequest) -> Result<ActionId> {
        let template = self.template(self.card(req.card)?.template)?.clone();
        let is_reaction = req.trigger.is_some();
        let id = ActionId::new(self.actions.len() as u32);

        let action = Action::from_template(
            id,
            &template,
            req.source,
            req.card,
            req.trigger,
            req.targets,
        );
        self.actions.push(action);
        if let Some(trigger) = req.trigger {
            self.action_mut(trigger)?.reactions.push(id);
        }

        self.move_card(req.card, Location::Table)?;
        self.events.log(GameEvent::ActionDeclared {
            action_id: id,
            source: req.source,
            card_id: req.card,
            trigger: req.trigger,
        });

        let source = self.character_mut(req.source)?;
        let spent_last = source.spend_resource(template.is_free, is_reaction);
        let line = match req.trigger {
            Some(t) => format!("{} reacts to action {t} with {}", source.name, template.name),
            None => format!("{} declares {}", source.name, template.name),
        };
        self.logger.normal(&line);

        if spent_last {
            self.advance_initiative(is_reaction);
        }
        if !is_reaction {
            self.stash_main_turn();
        }

        self.settle()?;
        Ok(id)
    }

    /// Explicitly give up the chance to react to `trigger`
    pub fn pass_reaction(&mut self, character: CharacterId, trigger: ActionId) -> Result<PassOutcome> {
        let reason = match (self.character(character), self.action(trigger)) {
            (Err(_), _) => Some(RejectionReason::SourceNotFound),
            (Ok(c), _) if !c.is_alive() => Some(RejectionReason::SourceNotAlive),
            (Ok(_), Ok(t)) if t.phase != ActionPhase::Declared || t.is_pass() => {
                Some(RejectionReason::TriggerNotPending)
            }
            (Ok(_), Err(_)) => Some(RejectionReason::TriggerNotPending),
            (Ok(_), Ok(t)) => {
                let responded = t.source == character
                    || t.waived_by.contains(&character)
                    || t.reactions
                        .iter()
                        .filter_map(|&r| self.action(r).ok())
                        .any(|r| r.source == character);
                responded.then_some(RejectionReason::AlreadyResponded)
            }
        };
        if let Some(reason) = reason {
            return Ok(PassOutcome::Rejected(Rejection::new(reason)));
        }

        self.transaction(|game| {
            game.action_mut(trigger)?.waived_by.push(character);
            game.events.log(GameEvent::ReactionPassed {
                action_id: trigger,
                character,
            });
            log_if_verbose!(game, "{} passes on action {trigger}", game.character(character)?.name);
            game.settle()
        })?;
        Ok(PassOutcome::Passed)
    }

    /// Give up the rest of the main turn
    pub fn yield_turn(&mut self, character: CharacterId) -> Result<()> {
        if self.current_character() != Some(character) {
            return Err(GameError::InvalidAction(format!(
                "character {character} does not hold the initiative"
            )));
        }
        if self.pending_actions().next().is_some() {
            return Err(GameError::InvalidAction(
                "cannot yield while actions are resolving".to_string(),
            ));
        }

        self.transaction(|game| {
            let c = game.character_mut(character)?;
            c.actions_remaining = 0;
            let line = format!("{} yields the turn", c.name);
            game.logger.normal(&line);
            game.advance_initiative(false);
            Ok(())
        })
    }

    /// Close finished reaction windows, drain if nothing is left to react
    /// to, and hand the main turn back once the forest is empty
    pub(crate) fn settle(&mut self) -> Result<()> {
        self.refresh_reaction_windows()?;

        let nobody_can_react = self.living_characters().all(|c| c.reactions_remaining == 0);
        if self.next_trigger().is_none() || nobody_can_react {
            self.process_actions()?;
        }

        if self.pending_actions().next().is_none() {
            self.restore_main_turn();
        }
        Ok(())
    }

    /// Drain the causality forest; returns the number of ticks applied
    pub fn process_actions(&mut self) -> Result<usize> {
        let mut ticks = 0;
        loop {
            self.refresh_reaction_windows()?;

            if let Some(id) = self.next_tickable() {
                self.tick_action(id)?;
                ticks += 1;
                continue;
            }

            if self.next_trigger().is_none() {
                if let Some(id) = self.next_fizzled() {
                    self.events.log(GameEvent::ActionFizzled { action_id: id });
                    log_if_verbose!(self, "Action {id} fizzles");
                    self.resolve_action(id)?;
                    continue;
                }
            }
            break;
        }
        Ok(ticks)
    }

    fn tick_action(&mut self, id: ActionId) -> Result<()> {
        let effect = self.action(id)?.tick_effect;
        let mut ctx = EffectContext::new();
        effect.apply(self, id, &mut ctx)?;

        let action = self.action_mut(id)?;
        if action.max_tick_count > 0 {
            action.max_tick_count = if effect.consumes_budget() {
                0
            } else {
                action.max_tick_count - 1
            };
        }
        let ticks_left = action.max_tick_count;
        self.events.log(GameEvent::ActionTicked {
            action_id: id,
            ticks_left,
        });
        log_if_verbose!(self, "Action {id} ticks ({effect}), {ticks_left} left");

        if !ctx.failed().contains(&id) {
            let action = self.action(id)?;
            let finished = !self.can_tick(action) || action.max_tick_count == 0 || action.is_pass();
            if finished {
                self.resolve_action(id)?;
            } else {
                self.set_phase(id, ActionPhase::Started)?;
            }
        }

        for &failed in ctx.failed() {
            self.fail_and_discard(failed)?;
        }
        Ok(())
    }

    fn resolve_action(&mut self, id: ActionId) -> Result<()> {
        self.set_phase(id, ActionPhase::Resolved)?;
        let card = self.action(id)?.card;
        if self.card(card)?.location == Location::Table {
            self.move_card(card, Location::Discard)?;
        }
        let line = format!("{} resolves", self.card(card)?.name);
        self.logger.normal(&line);
        Ok(())
    }

    /// Cascade a failure and discard every affected card still on the table
    fn fail_and_discard(&mut self, root: ActionId) -> Result<()> {
        for failed in self.fail_recursively(root)? {
            if self.card(failed.card)?.location == Location::Table {
                self.move_card(failed.card, Location::Discard)?;
            }
            let line = format!("{} fails", self.card(failed.card)?.name);
            self.logger.normal(&line);
        }
        Ok(())
    }

    /// Every declaration `character` could make right now
    ///
    /// Considers each card in hand as a main action and as a reaction to
    /// each open window, with no target or a single target.
    pub fn legal_declarations(&self, character: CharacterId) -> Vec<DeclareRequest> {
        let mut triggers: Vec<Option<ActionId>> = vec![None];
        triggers.extend(
            self.actions
                .iter()
                .filter(|a| a.phase == ActionPhase::Declared && !a.is_pass())
                .map(|a| Some(a.id)),
        );

        let mut legal = Vec::new();
        for &card_id in self.cards_in(character, Location::Hand) {
            let Ok(card) = self.card(card_id) else {
                continue;
            };
            let mut target_options: Vec<Option<ActionTarget>> = Vec::new();
            if card.targeting.count_min == 0 {
                target_options.push(None);
            }
            if card.targeting.count_max >= 1 {
                match card.targeting.target_type {
                    TargetType::Card => target_options.extend(
                        self.characters
                            .iter()
                            .flat_map(|c| self.cards_in(c.id, Location::Table))
                            .map(|&id| Some(ActionTarget::Card(id))),
                    ),
                    TargetType::NextDraw => {}
                    _ => target_options.extend(
                        self.characters
                            .iter()
                            .map(|c| Some(ActionTarget::Character(c.id))),
                    ),
                }
            }

            for &trigger in &triggers {
                for target in &target_options {
                    let mut req = DeclareRequest::new(character, card_id);
                    req.trigger = trigger;
                    req.targets.extend(target.iter().copied());
                    if self.validate_declaration(&req).is_ok() {
                        legal.push(req);
                    }
                }
            }
        }
        legal
    }
}
