//! Card locations (deck, hand, discard, table) and the ledger that keeps them
//!
//! Each character owns one bucket per location. A card's position is its
//! index in the bucket, so positions are always 0-indexed and contiguous and
//! no two cards can share an (owner, location, position) triple.

use crate::core::{CardId, CharacterId};
use crate::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a card can be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Deck,
    Hand,
    Discard,
    Table,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Location::Deck => "deck",
            Location::Hand => "hand",
            Location::Discard => "discard",
            Location::Table => "table",
        };
        f.write_str(s)
    }
}

/// An ordered bucket of cards for one (owner, location)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardZone {
    /// Location of this bucket
    pub location: Location,

    /// Owner of this bucket
    pub owner: CharacterId,

    /// Cards in position order (index == position, index 0 is the deck top)
    pub cards: Vec<CardId>,
}

impl CardZone {
    pub fn new(location: Location, owner: CharacterId) -> Self {
        CardZone {
            location,
            owner,
            cards: Vec::new(),
        }
    }

    /// Append after the current last position
    pub fn add(&mut self, card_id: CardId) -> usize {
        self.cards.push(card_id);
        self.cards.len() - 1
    }

    /// Remove a card, closing the gap it leaves
    pub fn remove(&mut self, card_id: CardId) -> bool {
        if let Some(pos) = self.position(card_id) {
            self.cards.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn position(&self, card_id: CardId) -> Option<usize> {
        self.cards.iter().position(|&id| id == card_id)
    }

    pub fn contains(&self, card_id: CardId) -> bool {
        self.cards.contains(&card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Assign a uniformly random permutation of positions
    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        use rand::seq::SliceRandom;
        self.cards.shuffle(rng);
    }
}

/// All buckets for one character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterZones {
    pub deck: CardZone,
    pub hand: CardZone,
    pub discard: CardZone,
    pub table: CardZone,
}

impl CharacterZones {
    pub fn new(owner: CharacterId) -> Self {
        CharacterZones {
            deck: CardZone::new(Location::Deck, owner),
            hand: CardZone::new(Location::Hand, owner),
            discard: CardZone::new(Location::Discard, owner),
            table: CardZone::new(Location::Table, owner),
        }
    }

    pub fn get_zone(&self, location: Location) -> &CardZone {
        match location {
            Location::Deck => &self.deck,
            Location::Hand => &self.hand,
            Location::Discard => &self.discard,
            Location::Table => &self.table,
        }
    }

    pub fn get_zone_mut(&mut self, location: Location) -> &mut CardZone {
        match location {
            Location::Deck => &mut self.deck,
            Location::Hand => &mut self.hand,
            Location::Discard => &mut self.discard,
            Location::Table => &mut self.table,
        }
    }
}

/// Card-location ledger for every character in a game
///
/// Moves either fully apply or return an error without touching any bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardLedger {
    zones: Vec<(CharacterId, CharacterZones)>,
}

impl CardLedger {
    pub fn new() -> Self {
        CardLedger { zones: Vec::new() }
    }

    /// Register an owner with empty buckets
    pub fn add_owner(&mut self, owner: CharacterId) {
        if self.owner_zones(owner).is_none() {
            self.zones.push((owner, CharacterZones::new(owner)));
        }
    }

    pub fn owner_zones(&self, owner: CharacterId) -> Option<&CharacterZones> {
        self.zones
            .iter()
            .find(|(id, _)| *id == owner)
            .map(|(_, zones)| zones)
    }

    fn owner_zones_mut(&mut self, owner: CharacterId) -> Result<&mut CharacterZones> {
        self.zones
            .iter_mut()
            .find(|(id, _)| *id == owner)
            .map(|(_, zones)| zones)
            .ok_or(GameError::EntityNotFound(owner.as_u32()))
    }

    /// Cards of one bucket in position order
    pub fn cards(&self, owner: CharacterId, location: Location) -> &[CardId] {
        self.owner_zones(owner)
            .map(|zones| zones.get_zone(location).cards.as_slice())
            .unwrap_or(&[])
    }

    pub fn count(&self, owner: CharacterId, location: Location) -> usize {
        self.cards(owner, location).len()
    }

    pub fn position(&self, owner: CharacterId, location: Location, card: CardId) -> Option<usize> {
        self.owner_zones(owner)
            .and_then(|zones| zones.get_zone(location).position(card))
    }

    /// Put a brand-new card at the end of a bucket
    pub fn place(&mut self, owner: CharacterId, location: Location, card: CardId) -> Result<usize> {
        let zones = self.owner_zones_mut(owner)?;
        if Location::ALL.iter().any(|&loc| zones.get_zone(loc).contains(card)) {
            return Err(GameError::InvariantViolation(format!(
                "card {card} is already placed for owner {owner}"
            )));
        }
        Ok(zones.get_zone_mut(location).add(card))
    }

    /// Move one card, appending it to the destination and closing the gap
    /// in the source. Returns the new position.
    pub fn transfer(
        &mut self,
        owner: CharacterId,
        card: CardId,
        from: Location,
        to: Location,
    ) -> Result<usize> {
        let zones = self.owner_zones_mut(owner)?;
        if !zones.get_zone_mut(from).remove(card) {
            return Err(GameError::InvariantViolation(format!(
                "card {card} not found in {from} of owner {owner}"
            )));
        }
        Ok(zones.get_zone_mut(to).add(card))
    }

    /// Move several cards of one owner; all are checked before any moves
    pub fn transfer_many(
        &mut self,
        owner: CharacterId,
        cards: &[CardId],
        from: Location,
        to: Location,
    ) -> Result<()> {
        let zones = self.owner_zones_mut(owner)?;
        let source = zones.get_zone(from);
        for (i, card) in cards.iter().enumerate() {
            if !source.contains(*card) || cards[..i].contains(card) {
                return Err(GameError::InvariantViolation(format!(
                    "card {card} not movable from {from} of owner {owner}"
                )));
            }
        }
        for &card in cards {
            zones.get_zone_mut(from).remove(card);
            zones.get_zone_mut(to).add(card);
        }
        Ok(())
    }

    /// Shuffle one bucket in place
    pub fn shuffle(&mut self, owner: CharacterId, location: Location, rng: &mut impl rand::Rng) -> Result<()> {
        self.owner_zones_mut(owner)?.get_zone_mut(location).shuffle(rng);
        Ok(())
    }
}

impl Location {
    pub const ALL: [Location; 4] = [Location::Deck, Location::Hand, Location::Discard, Location::Table];
}
