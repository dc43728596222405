//! Card instances

use crate::core::{CharacterId, EntityId, GameEntity, Template, TemplateId, TemplateName, TargetingParams};
use crate::zones::Location;
use serde::{Deserialize, Serialize};

pub type CardId = EntityId<Card>;

/// An instance of a template owned by exactly one character
///
/// Many cards can share the same template. Targeting parameters are copied
/// at creation so later catalog edits don't alter cards already dealt.
/// The card's position inside its location is owned by the ledger
/// (`zones::CardLedger`), which keeps positions contiguous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    /// Unique ID for this card instance
    pub id: CardId,

    /// Template this card was dealt from
    pub template: TemplateId,

    /// Template name, kept for display
    pub name: TemplateName,

    /// Owning character
    pub owner: CharacterId,

    /// Current location (deck, hand, discard, table)
    pub location: Location,

    /// Targeting parameters captured from the template
    pub targeting: TargetingParams,
}

impl Card {
    pub fn new(id: CardId, template: &Template, owner: CharacterId, location: Location) -> Self {
        Card {
            id,
            template: template.id,
            name: template.name.clone(),
            owner,
            location,
            targeting: template.targeting,
        }
    }
}

impl GameEntity<Card> for Card {
    fn id(&self) -> CardId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}
