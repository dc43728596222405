//! Behavior keys bound to templates
//!
//! Content refers to behaviors by string key. Keys are parsed into these
//! closed enums when a catalog is loaded, so a typo in content data is a
//! configuration error at load time and every behavior is dispatched by an
//! exhaustive match (see `game::behavior` for the implementations).

use crate::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rule deciding whether an action may be declared at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Declarability {
    /// Always declarable
    Always,
    /// Some targeted character is below maximum health
    IfTargetIsDamaged,
    /// The trigger action targets the declaring character
    IfTriggerTargetsSelf,
    /// The trigger action has `after` resolution timing
    IfTriggerIsAfterTiming,
    /// The declaring character is below 25% of maximum health
    IfSelfHealthBelowQuarter,
}

/// Rule deciding whether an action may tick (again)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickCondition {
    /// Not terminal, and an `after` reaction's trigger has resolved
    Default,
    /// Default, plus every targeted character is still alive
    IfTargetStillAlive,
    /// Default, plus the trigger action is neither resolved nor failed
    IfTriggerPending,
}

/// Side effect applied each time an action ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickEffect {
    /// Does nothing
    Noop,
    /// Does nothing; marks the always-available no-op card
    Pass,
    /// Deal `max_tick_count` damage to each targeted character
    DamageTargets,
    /// Deal `max_tick_count` damage to each target and 1 to the source
    DamageTargetsAndSource,
    /// Point the trigger action at its own source
    RedirectTriggerToItsSource,
    /// Deal `max_tick_count` damage to the trigger action's source
    DamageTriggerSource,
    /// Return the trigger action's card to its owner's hand and fail it
    ReturnTriggerCardToHand,
    /// Change the trigger action's timing from `after` to `before`
    ChangeTriggerTimingToBefore,
}

/// Implements key <-> enum conversion for a behavior enum
macro_rules! behavior_keys {
    ($ty:ident, $kind:literal, { $($variant:ident => $key:literal),+ $(,)? }) => {
        impl $ty {
            /// The content key for this behavior
            pub fn key(&self) -> &'static str {
                match self {
                    $($ty::$variant => $key),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = GameError;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim() {
                    $($key => Ok($ty::$variant),)+
                    other => Err(GameError::UnknownBehavior {
                        kind: $kind,
                        key: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }
    };
}

behavior_keys!(Declarability, "declarability", {
    Always => "default_declarability",
    IfTargetIsDamaged => "declarable_if_target_is_damaged",
    IfTriggerTargetsSelf => "declarable_if_trigger_targets_self",
    IfTriggerIsAfterTiming => "declarable_if_trigger_is_after_timing",
    IfSelfHealthBelowQuarter => "declarable_if_self_health_below_percentage",
});

behavior_keys!(TickCondition, "tick condition", {
    Default => "default_tick_condition",
    IfTargetStillAlive => "tick_if_target_still_alive",
    IfTriggerPending => "declarable_if_trigger_action_not_resolved_or_failed",
});

behavior_keys!(TickEffect, "tick effect", {
    Noop => "default_tick_effect",
    Pass => "pass_effect",
    DamageTargets => "deal_direct_damage_based_on_template",
    DamageTargetsAndSource => "deal_variadic_damage_to_targets_and_fixed_to_source",
    RedirectTriggerToItsSource => "redirect_trigger_action_to_its_source",
    DamageTriggerSource => "deal_damage_to_trigger_source_from_max_tick_count",
    ReturnTriggerCardToHand => "return_trigger_card_to_hand",
    ChangeTriggerTimingToBefore => "change_trigger_timing_to_before",
});

impl TickEffect {
    /// Effects whose magnitude is the whole tick budget; they finish in one tick
    pub fn consumes_budget(&self) -> bool {
        !matches!(self, TickEffect::Noop | TickEffect::Pass)
    }
}
