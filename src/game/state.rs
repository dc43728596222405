//! Main game state structure

use crate::core::{
    Action, ActionId, Card, CardId, Character, CharacterId, CharacterName, EntityId, EntityStore,
    Template, TemplateId,
};
use crate::events::{EventLog, GameEvent};
use crate::game::{GameConfig, GameLogger, Initiative};
use crate::loader::Catalog;
use crate::zones::{CardLedger, Location};
use crate::{GameError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Complete state of one game
///
/// Everything a command touches lives here, so a command can be made
/// all-or-nothing by snapshotting this struct (see [`GameState::transaction`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Templates cards are dealt from (shared, read-only)
    pub catalog: Arc<Catalog>,

    /// All characters, in id order (the stable initiative order)
    pub characters: Vec<Character>,

    /// All card instances
    pub cards: EntityStore<Card>,

    /// Which bucket and position every card occupies
    pub ledger: CardLedger,

    /// Every action ever declared, indexed by `ActionId` (oldest first)
    pub actions: Vec<Action>,

    /// Whose window it is
    pub initiative: Initiative,

    /// Current RNG state (serializable for deterministic replay)
    pub rng: ChaCha12Rng,

    /// Unified entity ID generator for characters and cards
    next_entity_id: u32,

    /// Structured record of state changes
    pub events: EventLog,

    /// Centralized logger for game output
    #[serde(skip)]
    pub logger: GameLogger,

    pub config: GameConfig,
}

impl GameState {
    /// Create an empty game (no characters, no cards)
    pub fn new(config: GameConfig, catalog: Arc<Catalog>) -> Self {
        GameState {
            catalog,
            characters: Vec::new(),
            cards: EntityStore::new(),
            ledger: CardLedger::new(),
            actions: Vec::new(),
            initiative: Initiative::default(),
            rng: ChaCha12Rng::seed_from_u64(config.seed),
            next_entity_id: 0,
            events: EventLog::new(),
            logger: GameLogger::new(),
            config,
        }
    }

    /// Get next entity ID (unified across characters and cards)
    pub fn next_id<T>(&mut self) -> EntityId<T> {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    /// Add a character with configured health and resources
    pub fn add_character(&mut self, name: impl Into<CharacterName>) -> Result<CharacterId> {
        if self.characters.len() >= self.config.max_players {
            return Err(GameError::InvalidAction(format!(
                "game is full ({} players)",
                self.config.max_players
            )));
        }
        let id = self.next_id();
        let mut character = Character::new(id, name, self.config.starting_health);
        character.reset_turn_resources(self.config.default_actions, self.config.default_reactions);
        self.characters.push(character);
        self.ledger.add_owner(id);
        Ok(id)
    }

    pub fn character(&self, id: CharacterId) -> Result<&Character> {
        self.characters
            .iter()
            .find(|c| c.id == id)
            .ok_or(GameError::EntityNotFound(id.as_u32()))
    }

    pub fn character_mut(&mut self, id: CharacterId) -> Result<&mut Character> {
        self.characters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(GameError::EntityNotFound(id.as_u32()))
    }

    pub fn living_characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter().filter(|c| c.is_alive())
    }

    pub fn is_alive(&self, id: CharacterId) -> bool {
        self.character(id).map(|c| c.is_alive()).unwrap_or(false)
    }

    pub fn card(&self, id: CardId) -> Result<&Card> {
        self.cards.get(id)
    }

    pub fn action(&self, id: ActionId) -> Result<&Action> {
        self.actions
            .get(id.index())
            .ok_or(GameError::EntityNotFound(id.as_u32()))
    }

    pub fn action_mut(&mut self, id: ActionId) -> Result<&mut Action> {
        self.actions
            .get_mut(id.index())
            .ok_or(GameError::EntityNotFound(id.as_u32()))
    }

    pub fn template(&self, id: TemplateId) -> Result<&Template> {
        self.catalog.find_template(id)
    }

    /// Create a card from a template and place it at the end of a bucket
    pub fn deal_card(
        &mut self,
        owner: CharacterId,
        template: TemplateId,
        location: Location,
    ) -> Result<CardId> {
        let card_id = self.next_id();
        let card = Card::new(card_id, self.catalog.find_template(template)?, owner, location);
        self.ledger.place(owner, location, card_id)?;
        self.cards.insert(card_id, card);
        Ok(card_id)
    }

    /// Move a card to another location of its owner
    ///
    /// Appends to the destination and closes the gap in the source.
    pub fn move_card(&mut self, card_id: CardId, to: Location) -> Result<usize> {
        let card = self.cards.get(card_id)?;
        let (owner, from) = (card.owner, card.location);
        let position = self.ledger.transfer(owner, card_id, from, to)?;
        self.cards.get_mut(card_id)?.location = to;

        self.events.log(GameEvent::CardMoved {
            card_id,
            owner,
            from,
            to,
        });
        Ok(position)
    }

    /// Shuffle one of a character's buckets using the game's RNG
    pub fn shuffle(&mut self, owner: CharacterId, location: Location) -> Result<()> {
        self.ledger.shuffle(owner, location, &mut self.rng)
    }

    /// Put the whole discard pile back into the deck and shuffle it
    pub fn reshuffle_discard_into_deck(&mut self, owner: CharacterId) -> Result<()> {
        let discard = self.ledger.cards(owner, Location::Discard).to_vec();
        self.ledger
            .transfer_many(owner, &discard, Location::Discard, Location::Deck)?;
        for &card_id in &discard {
            self.cards.get_mut(card_id)?.location = Location::Deck;
        }
        self.shuffle(owner, Location::Deck)
    }

    /// Draw cards from the top of the deck into the hand
    ///
    /// An empty deck is refilled from the discard pile first. Returns the
    /// cards drawn, which is fewer than `count` when both run out.
    pub fn draw(&mut self, owner: CharacterId, count: usize) -> Result<Vec<CardId>> {
        let mut drawn = Vec::with_capacity(count);
        for _ in 0..count {
            if self.ledger.count(owner, Location::Deck) == 0 {
                self.reshuffle_discard_into_deck(owner)?;
            }
            let Some(card_id) = self.ledger.cards(owner, Location::Deck).first().copied() else {
                break;
            };
            self.move_card(card_id, Location::Hand)?;
            drawn.push(card_id);
        }
        Ok(drawn)
    }

    /// Cards in one of a character's buckets, in position order
    pub fn cards_in(&self, owner: CharacterId, location: Location) -> &[CardId] {
        self.ledger.cards(owner, location)
    }

    /// Apply damage and record it; returns the damage actually taken
    pub fn deal_damage(&mut self, target: CharacterId, amount: u32) -> Result<u32> {
        let character = self.character_mut(target)?;
        let was_alive = character.is_alive();
        let taken = character.take_damage(amount);
        let died = was_alive && !character.is_alive();
        let name = character.name.clone();

        if taken > 0 {
            self.events.log(GameEvent::DamageDealt {
                target,
                amount: taken,
            });
            self.logger
                .normal(&format!("{name} takes {taken} damage"));
        }
        if died {
            self.events.log(GameEvent::CharacterDied { character: target });
            self.logger.normal(&format!("{name} dies"));
        }
        Ok(taken)
    }

    /// Run a command all-or-nothing
    ///
    /// On error every change made by `f` is discarded. The event log and
    /// logger only grow, so they stay out of the snapshot: events from the
    /// failed command are cut off, printed lines are kept.
    pub fn transaction<T>(&mut self, f: impl FnOnce(&mut GameState) -> Result<T>) -> Result<T> {
        let events = std::mem::take(&mut self.events);
        let logger = std::mem::take(&mut self.logger);
        let snapshot = self.clone();
        self.events = events;
        self.logger = logger;

        let mark = self.events.mark();
        match f(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                let mut events = std::mem::take(&mut self.events);
                let logger = std::mem::take(&mut self.logger);
                events.truncate(mark);
                *self = snapshot;
                self.events = events;
                self.logger = logger;
                Err(e)
            }
        }
    }

    /// True when at most one character remains alive
    pub fn is_over(&self) -> bool {
        self.living_characters().count() <= 1
    }

    /// The last character standing, once the game is over
    pub fn winner(&self) -> Option<CharacterId> {
        let mut living = self.living_characters();
        match (living.next(), living.next()) {
            (Some(c), None) => Some(c.id),
            _ => None,
        }
    }
}
