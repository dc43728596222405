//! Behavior implementations
//!
//! Every behavior receives the game explicitly plus the action (or the
//! declaration being validated). Checks are pure; effects mutate the game
//! and report trigger failures through [`EffectContext`] so the engine can
//! cascade them once the ticking action has settled.

use crate::core::{
    Action, ActionId, ActionPhase, ActionTarget, CardId, CharacterId, Declarability,
    ResolutionTiming, TickCondition, TickEffect,
};
use crate::game::GameState;
use crate::zones::Location;
use crate::Result;
use smallvec::{smallvec, SmallVec};

/// A declaration under validation (no `Action` exists yet)
#[derive(Debug, Clone, Copy)]
pub struct Declaration<'a> {
    pub source: CharacterId,
    pub card: CardId,
    pub trigger: Option<ActionId>,
    pub targets: &'a [ActionTarget],
}

/// Side channel for effects that fail other actions
#[derive(Debug, Default)]
pub struct EffectContext {
    failed: SmallVec<[ActionId; 2]>,
}

impl EffectContext {
    pub fn new() -> Self {
        EffectContext::default()
    }

    /// Mark an action failed; the cascade runs after the tick completes
    pub fn fail(&mut self, action: ActionId) {
        if !self.failed.contains(&action) {
            self.failed.push(action);
        }
    }

    pub fn failed(&self) -> &[ActionId] {
        &self.failed
    }
}

impl Declarability {
    pub fn check(&self, game: &GameState, decl: &Declaration<'_>) -> bool {
        match self {
            Declarability::Always => true,
            Declarability::IfTargetIsDamaged => decl.targets.iter().any(|t| match t {
                ActionTarget::Character(id) => {
                    game.character(*id).map(|c| c.is_damaged()).unwrap_or(false)
                }
                ActionTarget::Card(_) => false,
            }),
            Declarability::IfTriggerTargetsSelf => trigger_of(game, decl.trigger)
                .map(|t| t.targets_character(decl.source))
                .unwrap_or(false),
            Declarability::IfTriggerIsAfterTiming => trigger_of(game, decl.trigger)
                .map(|t| t.resolution_timing == ResolutionTiming::After)
                .unwrap_or(false),
            Declarability::IfSelfHealthBelowQuarter => game
                .character(decl.source)
                .map(|c| u64::from(c.health) * 4 < u64::from(c.max_health))
                .unwrap_or(false),
        }
    }
}

fn trigger_of(game: &GameState, trigger: Option<ActionId>) -> Option<&Action> {
    trigger.and_then(|id| game.action(id).ok())
}

/// Not terminal, and an `after` reaction's trigger has resolved
fn default_tick_condition(game: &GameState, action: &Action) -> bool {
    if action.is_terminal() {
        return false;
    }
    match (action.trigger, action.resolution_timing) {
        (Some(trigger), ResolutionTiming::After) => game
            .action(trigger)
            .map(|t| t.phase == ActionPhase::Resolved)
            .unwrap_or(false),
        _ => true,
    }
}

impl TickCondition {
    pub fn check(&self, game: &GameState, action: &Action) -> bool {
        if !default_tick_condition(game, action) {
            return false;
        }
        match self {
            TickCondition::Default => true,
            TickCondition::IfTargetStillAlive => action.character_targets().all(|id| game.is_alive(id)),
            TickCondition::IfTriggerPending => trigger_of(game, action.trigger)
                .map(|t| !t.is_terminal())
                .unwrap_or(false),
        }
    }
}

impl TickEffect {
    /// Apply one tick of this effect for `action_id`
    pub fn apply(&self, game: &mut GameState, action_id: ActionId, ctx: &mut EffectContext) -> Result<()> {
        let action = game.action(action_id)?;
        let (source, magnitude, trigger) = (action.source, action.max_tick_count, action.trigger);
        let targets: SmallVec<[CharacterId; 2]> = action.character_targets().collect();

        match self {
            TickEffect::Noop | TickEffect::Pass => {}
            TickEffect::DamageTargets => {
                for target in targets {
                    game.deal_damage(target, magnitude)?;
                }
            }
            TickEffect::DamageTargetsAndSource => {
                for target in targets {
                    game.deal_damage(target, magnitude)?;
                }
                game.deal_damage(source, 1)?;
            }
            TickEffect::RedirectTriggerToItsSource => {
                if let Some(trigger) = trigger {
                    let t = game.action_mut(trigger)?;
                    t.targets = smallvec![ActionTarget::Character(t.source)];
                }
            }
            TickEffect::DamageTriggerSource => {
                if let Some(trigger) = trigger {
                    let trigger_source = game.action(trigger)?.source;
                    game.deal_damage(trigger_source, magnitude)?;
                }
            }
            TickEffect::ReturnTriggerCardToHand => {
                if let Some(trigger) = trigger {
                    let card = game.action(trigger)?.card;
                    if game.card(card)?.location == Location::Table {
                        game.move_card(card, Location::Hand)?;
                    }
                    ctx.fail(trigger);
                }
            }
            TickEffect::ChangeTriggerTimingToBefore => {
                if let Some(trigger) = trigger {
                    game.action_mut(trigger)?.resolution_timing = ResolutionTiming::Before;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;
    use crate::loader::Catalog;
    use std::sync::Arc;

    struct Fixture {
        game: GameState,
        p1: CharacterId,
        p2: CharacterId,
    }

    fn fixture() -> Fixture {
        let mut game = GameState::new(GameConfig::default(), Arc::new(Catalog::standard().unwrap()));
        let p1 = game.add_character("P1").unwrap();
        let p2 = game.add_character("P2").unwrap();
        Fixture { game, p1, p2 }
    }

    /// Put an action straight into the arena, card on the table
    fn push_action(
        game: &mut GameState,
        template_name: &str,
        source: CharacterId,
        trigger: Option<ActionId>,
        targets: &[ActionTarget],
    ) -> ActionId {
        let template = game.catalog.find_by_name(template_name).unwrap().clone();
        let card = game.deal_card(source, template.id, Location::Table).unwrap();
        let id = ActionId::new(game.actions.len() as u32);
        let action = Action::from_template(id, &template, source, card, trigger, targets.iter().copied().collect());
        game.actions.push(action);
        if let Some(t) = trigger {
            game.actions[t.index()].reactions.push(id);
        }
        id
    }

    #[test]
    fn test_after_reaction_waits_for_resolved_trigger() {
        let Fixture { mut game, p1, p2 } = fixture();
        let root = push_action(&mut game, "Quick Shot", p1, None, &[ActionTarget::Character(p2)]);
        let reaction = push_action(&mut game, "Pass", p2, Some(root), &[]);
        game.actions[reaction.index()].resolution_timing = ResolutionTiming::After;

        for phase in [ActionPhase::Declared, ActionPhase::ReactedTo, ActionPhase::Started] {
            game.actions[root.index()].phase = phase;
            let r = &game.actions[reaction.index()];
            assert!(!r.tick_condition.check(&game, r));
        }

        game.actions[root.index()].phase = ActionPhase::Resolved;
        let r = &game.actions[reaction.index()];
        assert!(r.tick_condition.check(&game, r));
    }

    #[test]
    fn test_terminal_actions_never_tick() {
        let Fixture { mut game, p1, p2 } = fixture();
        let root = push_action(&mut game, "Quick Shot", p1, None, &[ActionTarget::Character(p2)]);
        let a = &game.actions[root.index()];
        assert!(a.tick_condition.check(&game, a));

        game.actions[root.index()].phase = ActionPhase::Failed;
        let a = &game.actions[root.index()];
        assert!(!a.tick_condition.check(&game, a));
    }

    #[test]
    fn test_target_still_alive() {
        let Fixture { mut game, p1, p2 } = fixture();
        let root = push_action(&mut game, "Heavy Blast", p1, None, &[ActionTarget::Character(p2)]);
        game.deal_damage(p2, 100).unwrap();
        let a = &game.actions[root.index()];
        assert!(!a.tick_condition.check(&game, a));
    }

    #[test]
    fn test_declarability_checks() {
        let Fixture { mut game, p1, p2 } = fixture();
        let root = push_action(&mut game, "Quick Shot", p1, None, &[ActionTarget::Character(p2)]);
        let card = CardId::new(999);
        let at_p2 = [ActionTarget::Character(p2)];

        let decl = Declaration { source: p1, card, trigger: None, targets: &at_p2 };
        assert!(!Declarability::IfTargetIsDamaged.check(&game, &decl));
        game.deal_damage(p2, 1).unwrap();
        assert!(Declarability::IfTargetIsDamaged.check(&game, &decl));

        let reacting = Declaration { source: p2, card, trigger: Some(root), targets: &[] };
        assert!(Declarability::IfTriggerTargetsSelf.check(&game, &reacting));
        assert!(!Declarability::IfTriggerIsAfterTiming.check(&game, &reacting));
        let bystander = Declaration { source: p1, ..reacting };
        assert!(!Declarability::IfTriggerTargetsSelf.check(&game, &bystander));

        assert!(!Declarability::IfSelfHealthBelowQuarter.check(&game, &reacting));
        game.deal_damage(p2, 75).unwrap();
        assert!(Declarability::IfSelfHealthBelowQuarter.check(&game, &reacting));
    }

    #[test]
    fn test_health_quarter_with_huge_max_health() {
        let config = GameConfig {
            starting_health: u32::MAX,
            ..GameConfig::default()
        };
        let mut game = GameState::new(config, Arc::new(Catalog::standard().unwrap()));
        let p1 = game.add_character("P1").unwrap();
        let decl = Declaration { source: p1, card: CardId::new(999), trigger: None, targets: &[] };
        assert!(!Declarability::IfSelfHealthBelowQuarter.check(&game, &decl));

        game.character_mut(p1).unwrap().health = u32::MAX / 2;
        assert!(!Declarability::IfSelfHealthBelowQuarter.check(&game, &decl));
        game.character_mut(p1).unwrap().health = u32::MAX / 4;
        assert!(Declarability::IfSelfHealthBelowQuarter.check(&game, &decl));
    }

    #[test]
    fn test_damage_effects_use_magnitude() {
        let Fixture { mut game, p1, p2 } = fixture();
        let blow = push_action(&mut game, "Sacrificial Blow", p1, None, &[ActionTarget::Character(p2)]);
        let mut ctx = EffectContext::new();

        TickEffect::DamageTargetsAndSource.apply(&mut game, blow, &mut ctx).unwrap();
        assert_eq!(game.character(p2).unwrap().health, 96);
        assert_eq!(game.character(p1).unwrap().health, 99);

        let retort = push_action(&mut game, "Retort", p2, Some(blow), &[]);
        TickEffect::DamageTriggerSource.apply(&mut game, retort, &mut ctx).unwrap();
        assert_eq!(game.character(p1).unwrap().health, 97);
        assert!(ctx.failed().is_empty());
    }

    #[test]
    fn test_trigger_manipulating_effects() {
        let Fixture { mut game, p1, p2 } = fixture();
        let root = push_action(&mut game, "Quick Shot", p1, None, &[ActionTarget::Character(p2)]);
        game.actions[root.index()].resolution_timing = ResolutionTiming::After;
        let mut ctx = EffectContext::new();

        let shield = push_action(&mut game, "Deflection Shield", p2, Some(root), &[]);
        TickEffect::RedirectTriggerToItsSource.apply(&mut game, shield, &mut ctx).unwrap();
        assert!(game.actions[root.index()].targets_character(p1));
        assert!(!game.actions[root.index()].targets_character(p2));

        let shift = push_action(&mut game, "Timing Shift", p2, Some(root), &[]);
        TickEffect::ChangeTriggerTimingToBefore.apply(&mut game, shift, &mut ctx).unwrap();
        assert_eq!(game.actions[root.index()].resolution_timing, ResolutionTiming::Before);

        let ret = push_action(&mut game, "Emergency Return", p2, Some(root), &[]);
        TickEffect::ReturnTriggerCardToHand.apply(&mut game, ret, &mut ctx).unwrap();
        let card = game.actions[root.index()].card;
        assert_eq!(game.card(card).unwrap().location, Location::Hand);
        assert_eq!(ctx.failed(), &[root]);
        // The failure itself is applied by the engine
        assert_eq!(game.actions[root.index()].phase, ActionPhase::Declared);
    }
}
