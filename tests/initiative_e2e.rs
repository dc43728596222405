//! Initiative across main turns, reaction windows and round resets

use cardclash::core::{CardId, CharacterId};
use cardclash::events::GameEvent;
use cardclash::game::{DeclareRequest, GameConfig, GameState};
use cardclash::loader::Catalog;
use cardclash::zones::Location;
use cardclash::GameError;
use std::sync::Arc;

fn setup(players: usize) -> (GameState, Vec<CharacterId>) {
    let mut game = GameState::new(GameConfig::default(), Arc::new(Catalog::standard().unwrap()));
    let ids = (0..players)
        .map(|i| game.add_character(format!("P{}", i + 1)).unwrap())
        .collect();
    game.set_initial_character();
    (game, ids)
}

fn give(game: &mut GameState, owner: CharacterId, name: &str) -> CardId {
    let template = game.catalog.find_by_name(name).unwrap().id;
    game.deal_card(owner, template, Location::Hand).unwrap()
}

/// Declare a shot and let everybody else pass
fn shoot(game: &mut GameState, from: CharacterId, at: CharacterId) {
    let card = give(game, from, "Quick Shot");
    let id = game
        .declare_action(DeclareRequest::new(from, card).targeting(at))
        .unwrap()
        .action_id()
        .unwrap();
    while let Some(reactor) = game.next_reactor(id) {
        game.pass_reaction(reactor, id).unwrap();
    }
}

#[test]
fn test_turn_passes_after_last_action() {
    let (mut game, ids) = setup(2);
    let (p1, p2) = (ids[0], ids[1]);

    shoot(&mut game, p1, p2);
    assert_eq!(game.current_character(), Some(p1));
    shoot(&mut game, p1, p2);
    assert_eq!(game.current_character(), Some(p2));
    assert_eq!(game.character(p2).unwrap().health, 98);
}

#[test]
fn test_round_resets_when_everyone_is_out_of_actions() {
    let (mut game, ids) = setup(2);
    let (p1, p2) = (ids[0], ids[1]);

    shoot(&mut game, p1, p2);
    shoot(&mut game, p1, p2);
    shoot(&mut game, p2, p1);

    let mark = game.events.mark();
    shoot(&mut game, p2, p1);
    assert!(game.events.since(mark).contains(&GameEvent::ResourcesReset));
    assert_eq!(game.current_character(), Some(p1));
    for id in [p1, p2] {
        let c = game.character(id).unwrap();
        assert_eq!((c.actions_remaining, c.reactions_remaining), (2, 2));
    }
}

#[test]
fn test_reactors_are_asked_in_seat_order_after_the_source() {
    let (mut game, ids) = setup(3);
    game.yield_turn(ids[0]).unwrap();
    assert_eq!(game.current_character(), Some(ids[1]));

    let card = give(&mut game, ids[1], "Quick Shot");
    let id = game
        .declare_action(DeclareRequest::new(ids[1], card).targeting(ids[0]))
        .unwrap()
        .action_id()
        .unwrap();

    assert_eq!(game.next_reactor(id), Some(ids[2]));
    game.pass_reaction(ids[2], id).unwrap();
    assert_eq!(game.next_reactor(id), Some(ids[0]));
    game.pass_reaction(ids[0], id).unwrap();
    assert_eq!(game.next_reactor(id), None);
    assert_eq!(game.character(ids[0]).unwrap().health, 99);
}

#[test]
fn test_dead_characters_never_get_the_window() {
    let (mut game, ids) = setup(3);
    game.deal_damage(ids[1], 100).unwrap();

    game.yield_turn(ids[0]).unwrap();
    assert_eq!(game.current_character(), Some(ids[2]));

    let card = give(&mut game, ids[2], "Quick Shot");
    let id = game
        .declare_action(DeclareRequest::new(ids[2], card).targeting(ids[0]))
        .unwrap()
        .action_id()
        .unwrap();
    assert_eq!(game.next_reactor(id), Some(ids[0]));
}

#[test]
fn test_yield_is_refused_mid_cascade() {
    let (mut game, ids) = setup(2);
    let card = give(&mut game, ids[0], "Quick Shot");
    game.declare_action(DeclareRequest::new(ids[0], card).targeting(ids[1]))
        .unwrap();

    let err = game.yield_turn(ids[0]).unwrap_err();
    assert!(matches!(err, GameError::InvalidAction(_)));
}

#[test]
fn test_no_reactions_left_drains_immediately() {
    let (mut game, ids) = setup(2);
    game.character_mut(ids[1]).unwrap().reactions_remaining = 0;

    let card = give(&mut game, ids[0], "Heavy Blast");
    game.declare_action(DeclareRequest::new(ids[0], card).targeting(ids[1]))
        .unwrap();

    assert_eq!(game.character(ids[1]).unwrap().health, 97);
    assert!(game.pending_actions().next().is_none());
    assert_eq!(game.current_character(), Some(ids[0]));
}
