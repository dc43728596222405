//! End-to-end resolution scenarios driven through the public command API
//!
//! Each test declares real cards from the standard catalog (or a small
//! custom one) and checks health, card locations, phases and the event
//! trail after the forest has drained.

use cardclash::core::{ActionId, ActionPhase, CardId, CharacterId};
use cardclash::events::GameEvent;
use cardclash::game::{DeclareRequest, GameConfig, GameState, PassOutcome};
use cardclash::loader::{Catalog, TemplateLoader, STANDARD_TEMPLATES};
use cardclash::zones::Location;
use similar_asserts::assert_eq;
use std::sync::Arc;

fn setup_with(catalog: Catalog) -> (GameState, CharacterId, CharacterId) {
    let mut game = GameState::new(GameConfig::default(), Arc::new(catalog));
    let p1 = game.add_character("P1").unwrap();
    let p2 = game.add_character("P2").unwrap();
    game.set_initial_character();
    (game, p1, p2)
}

/// Reacts to anything; 1 damage to the trigger's source
const JAB: &str = "Name:Jab
Timing:before
TickEffect:deal_damage_to_trigger_source_from_max_tick_count
MaxTicks:1
TargetMax:0
";

/// Like Retort, but only once its trigger has resolved
const RIPOSTE: &str = "Name:Riposte
Description:Reaction\\nAfter an action resolves, deal 2 damage to its source.
Timing:after
TickEffect:deal_damage_to_trigger_source_from_max_tick_count
MaxTicks:2
TargetMax:0
";

/// The standard catalog plus extra template sources
fn catalog_with(extra: &[&str]) -> Catalog {
    let templates = STANDARD_TEMPLATES
        .iter()
        .map(|(_, src)| *src)
        .chain(extra.iter().copied())
        .map(|src| TemplateLoader::parse(src).unwrap());
    Catalog::from_templates(templates).unwrap()
}

fn setup() -> (GameState, CharacterId, CharacterId) {
    setup_with(Catalog::standard().unwrap())
}

fn give(game: &mut GameState, owner: CharacterId, name: &str) -> CardId {
    let template = game.catalog.find_by_name(name).unwrap().id;
    game.deal_card(owner, template, Location::Hand).unwrap()
}

fn declare(game: &mut GameState, req: DeclareRequest) -> ActionId {
    let outcome = game.declare_action(req).unwrap();
    match outcome.action_id() {
        Some(id) => id,
        None => panic!("declaration rejected: {}", outcome.rejection().unwrap()),
    }
}

fn health(game: &GameState, id: CharacterId) -> u32 {
    game.character(id).unwrap().health
}

fn phase(game: &GameState, id: ActionId) -> ActionPhase {
    game.action(id).unwrap().phase
}

/// Ids of actions in the order they ticked since `mark`
fn tick_order(game: &GameState, mark: usize) -> Vec<ActionId> {
    game.events
        .since(mark)
        .iter()
        .filter_map(|e| match e {
            GameEvent::ActionTicked { action_id, .. } => Some(*action_id),
            _ => None,
        })
        .collect()
}

#[test]
fn test_quick_shot_resolves_after_pass() {
    let (mut game, p1, p2) = setup();
    let shot = give(&mut game, p1, "Quick Shot");

    let root = declare(&mut game, DeclareRequest::new(p1, shot).targeting(p2));
    assert_eq!(phase(&game, root), ActionPhase::Declared);
    assert_eq!(game.character(p1).unwrap().actions_remaining, 1);

    let mark = game.events.mark();
    assert_eq!(game.pass_reaction(p2, root).unwrap(), PassOutcome::Passed);

    assert_eq!(health(&game, p2), 99);
    assert_eq!(phase(&game, root), ActionPhase::Resolved);
    assert_eq!(game.card(shot).unwrap().location, Location::Discard);
    assert_eq!(game.cards_in(p1, Location::Discard), &[shot]);
    assert!(game.cards_in(p1, Location::Table).is_empty());
    assert_eq!(tick_order(&game, mark), vec![root]);
    assert_eq!(game.current_character(), Some(p1));
}

#[test]
fn test_emergency_return_fails_the_trigger() {
    let (mut game, p1, p2) = setup();
    let blast = give(&mut game, p1, "Heavy Blast");
    let ret = give(&mut game, p2, "Emergency Return");
    game.deal_damage(p2, 80).unwrap();

    let root = declare(&mut game, DeclareRequest::new(p1, blast).targeting(p2));
    let reaction = declare(&mut game, DeclareRequest::new(p2, ret).reacting_to(root));

    // Free: no reaction spent
    assert_eq!(game.character(p2).unwrap().reactions_remaining, 2);
    assert_eq!(phase(&game, root), ActionPhase::ReactedTo);
    assert_eq!(game.next_reactor(reaction), Some(p1));

    game.pass_reaction(p1, reaction).unwrap();

    assert_eq!(phase(&game, reaction), ActionPhase::Resolved);
    assert_eq!(phase(&game, root), ActionPhase::Failed);
    assert_eq!(health(&game, p2), 20);
    assert_eq!(game.card(blast).unwrap().location, Location::Hand);
    assert_eq!(game.cards_in(p1, Location::Hand), &[blast]);
    assert_eq!(game.card(ret).unwrap().location, Location::Discard);
    assert!(game.pending_actions().next().is_none());
    assert_eq!(game.current_character(), Some(p1));
}

#[test]
fn test_emergency_return_needs_low_health() {
    let (mut game, p1, p2) = setup();
    let blast = give(&mut game, p1, "Heavy Blast");
    let ret = give(&mut game, p2, "Emergency Return");
    game.deal_damage(p2, 75).unwrap();

    let root = declare(&mut game, DeclareRequest::new(p1, blast).targeting(p2));
    let outcome = game
        .declare_action(DeclareRequest::new(p2, ret).reacting_to(root))
        .unwrap();
    assert!(!outcome.is_declared());
    assert_eq!(
        outcome.rejection().unwrap().message(),
        "Action cannot be declared at this time (preconditions failed)."
    );
}

#[test]
fn test_deflection_shield_redirects() {
    let (mut game, p1, p2) = setup();
    let shot = give(&mut game, p1, "Quick Shot");
    let shield = give(&mut game, p2, "Deflection Shield");

    let root = declare(&mut game, DeclareRequest::new(p1, shot).targeting(p2));
    let reaction = declare(&mut game, DeclareRequest::new(p2, shield).reacting_to(root));
    let mark = game.events.mark();
    game.pass_reaction(p1, reaction).unwrap();

    assert_eq!(tick_order(&game, mark), vec![reaction, root]);
    assert_eq!(health(&game, p1), 99);
    assert_eq!(health(&game, p2), 100);
    assert_eq!(game.character(p2).unwrap().reactions_remaining, 1);
}

#[test]
fn test_nested_before_reactions_resolve_innermost_first() {
    let (mut game, p1, p2) = setup_with(catalog_with(&[JAB]));
    let blast = give(&mut game, p1, "Heavy Blast");
    let jab_b = give(&mut game, p2, "Jab");
    let jab_c = give(&mut game, p1, "Jab");

    let a = declare(&mut game, DeclareRequest::new(p1, blast).targeting(p2));
    let b = declare(&mut game, DeclareRequest::new(p2, jab_b).reacting_to(a));
    let mark = game.events.mark();
    let c = declare(&mut game, DeclareRequest::new(p1, jab_c).reacting_to(b));

    // P2 still holds a reaction, so C's window is open
    assert_eq!(phase(&game, c), ActionPhase::Declared);
    assert!(tick_order(&game, mark).is_empty());
    game.pass_reaction(p2, c).unwrap();

    assert_eq!(tick_order(&game, mark), vec![c, b, a]);
    // C: 1 to P2; B: 1 to P1; A: 3 to P2
    assert_eq!(health(&game, p1), 99);
    assert_eq!(health(&game, p2), 96);
    for id in [a, b, c] {
        assert_eq!(phase(&game, id), ActionPhase::Resolved);
    }
}

#[test]
fn test_after_reaction_waits_for_trigger() {
    let (mut game, p1, p2) = setup_with(catalog_with(&[RIPOSTE]));
    let shot = give(&mut game, p1, "Quick Shot");
    let riposte = give(&mut game, p2, "Riposte");

    let root = declare(&mut game, DeclareRequest::new(p1, shot).targeting(p2));
    let reaction = declare(&mut game, DeclareRequest::new(p2, riposte).reacting_to(root));
    let mark = game.events.mark();
    game.pass_reaction(p1, reaction).unwrap();

    assert_eq!(tick_order(&game, mark), vec![root, reaction]);
    assert_eq!(health(&game, p2), 99);
    assert_eq!(health(&game, p1), 98);
}

#[test]
fn test_retort_kills_source_before_its_blow_lands() {
    let (mut game, p1, p2) = setup();
    let blow = give(&mut game, p1, "Sacrificial Blow");
    let retort = give(&mut game, p2, "Retort");
    game.deal_damage(p1, 99).unwrap();

    let root = declare(&mut game, DeclareRequest::new(p1, blow).targeting(p2));
    let reaction = declare(&mut game, DeclareRequest::new(p2, retort).reacting_to(root));
    let mark = game.events.mark();
    game.pass_reaction(p1, reaction).unwrap();

    // The blow still lands: its tick condition only looks at the target
    assert_eq!(tick_order(&game, mark), vec![reaction, root]);
    assert_eq!(health(&game, p1), 0);
    assert_eq!(health(&game, p2), 96);
    assert!(game.is_over());
    assert_eq!(game.winner(), Some(p2));
    assert!(game.pending_actions().next().is_none());
    assert!(game.cards_in(p1, Location::Table).is_empty());
    assert!(game.cards_in(p2, Location::Table).is_empty());
    assert_eq!(game.current_character(), Some(p2));
}

#[test]
fn test_declared_pass_resolves_without_a_window() {
    let (mut game, p1, p2) = setup();
    let shot = give(&mut game, p1, "Quick Shot");
    let pass = give(&mut game, p2, "Pass");

    let root = declare(&mut game, DeclareRequest::new(p1, shot).targeting(p2));
    let reaction = declare(&mut game, DeclareRequest::new(p2, pass).reacting_to(root));

    assert_eq!(phase(&game, reaction), ActionPhase::Resolved);
    assert_eq!(phase(&game, root), ActionPhase::Resolved);
    assert_eq!(health(&game, p2), 99);
    assert_eq!(game.card(pass).unwrap().location, Location::Discard);
}
