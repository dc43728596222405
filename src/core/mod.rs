//! Core game types and entities

pub mod action;
pub mod behavior;
pub mod card;
pub mod character;
pub mod entity;
pub mod template;
pub mod types;

pub use action::{Action, ActionId, ActionPhase, ActionTarget};
pub use behavior::{Declarability, TickCondition, TickEffect};
pub use card::{Card, CardId};
pub use character::{Character, CharacterId, DEFAULT_ACTIONS, DEFAULT_REACTIONS};
pub use entity::{EntityId, EntityStore, GameEntity};
pub use template::{
    ResolutionTiming, TargetCondition, TargetType, TargetingParams, Template, TemplateId,
};
pub use types::{normalize_name, CharacterName, TemplateName};
