//! Catalog templates: the immutable definition behind every card

use crate::core::{Declarability, EntityId, GameEntity, TemplateName, TickCondition, TickEffect};
use crate::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type TemplateId = EntityId<Template>;

/// Whether a reaction resolves before or after the action it reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTiming {
    Before,
    After,
}

impl FromStr for ResolutionTiming {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "before" => Ok(ResolutionTiming::Before),
            "after" => Ok(ResolutionTiming::After),
            other => Err(GameError::InvalidTemplateFormat(format!(
                "unknown resolution timing '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ResolutionTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionTiming::Before => f.write_str("before"),
            ResolutionTiming::After => f.write_str("after"),
        }
    }
}

/// What kind of thing a card targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Enemy,
    Ally,
    #[serde(rename = "self")]
    Myself,
    Card,
    NextDraw,
}

impl TargetType {
    /// Whether targets of this type are characters (as opposed to cards)
    pub fn targets_characters(&self) -> bool {
        matches!(self, TargetType::Enemy | TargetType::Ally | TargetType::Myself)
    }
}

impl FromStr for TargetType {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "enemy" => Ok(TargetType::Enemy),
            "ally" => Ok(TargetType::Ally),
            "self" => Ok(TargetType::Myself),
            "card" => Ok(TargetType::Card),
            "next_draw" => Ok(TargetType::NextDraw),
            other => Err(GameError::InvalidTemplateFormat(format!(
                "unknown target type '{other}'"
            ))),
        }
    }
}

/// Extra condition every target must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetCondition {
    None,
    IsAlive,
}

impl FromStr for TargetCondition {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" | "none" => Ok(TargetCondition::None),
            "is_alive" => Ok(TargetCondition::IsAlive),
            other => Err(GameError::UnknownBehavior {
                kind: "target condition",
                key: other.to_string(),
            }),
        }
    }
}

/// Targeting parameters; copied onto each card when it is dealt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingParams {
    pub target_type: TargetType,
    pub count_min: u32,
    pub count_max: u32,
    pub condition: TargetCondition,
}

impl Default for TargetingParams {
    fn default() -> Self {
        TargetingParams {
            target_type: TargetType::Enemy,
            count_min: 0,
            count_max: 1,
            condition: TargetCondition::None,
        }
    }
}

/// Immutable catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: TemplateName,
    pub description: String,
    pub resolution_timing: ResolutionTiming,
    pub is_free: bool,
    pub declarability: Declarability,
    pub tick_condition: TickCondition,
    pub tick_effect: TickEffect,
    /// Tick budget, also used as effect magnitude
    pub max_tick_count: u32,
    pub targeting: TargetingParams,
}

impl Template {
    /// The always-available no-op card
    pub fn is_pass(&self) -> bool {
        self.tick_effect == TickEffect::Pass
    }
}

impl GameEntity<Template> for Template {
    fn id(&self) -> TemplateId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}
