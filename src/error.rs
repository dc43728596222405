//! Error types for the causality engine
//!
//! `GameError` covers configuration errors (bad catalog content) and
//! invariant violations. A declaration that fails validation is not an
//! error: it comes back as a [`Rejection`] carrying user-facing reasons.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Entity not found: {0}")]
    EntityNotFound(u32),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Unknown {kind} behavior key: '{key}'")]
    UnknownBehavior { kind: &'static str, key: String },

    #[error("Invalid template format: {0}")]
    InvalidTemplateFormat(String),

    #[error("Invalid game action: {0}")]
    InvalidAction(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, GameError>;

/// Why a declaration (or an explicit pass) was turned down
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    #[error("Source character not found.")]
    SourceNotFound,

    #[error("Source character is not alive.")]
    SourceNotAlive,

    #[error("Card not found for character.")]
    CardNotFound,

    #[error("Card not in player's hand.")]
    CardNotInHand,

    #[error("Trigger action not found or already finished.")]
    TriggerNotPending,

    #[error("Character cannot afford this action.")]
    CannotAfford,

    #[error("Action cannot be declared at this time (preconditions failed).")]
    NotDeclarable,

    #[error("Invalid targets: {0}")]
    InvalidTargets(String),

    #[error("Character has already responded to this action.")]
    AlreadyResponded,
}

/// A declaration that failed validation; nothing was mutated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reasons: Vec<RejectionReason>,
}

impl Rejection {
    pub fn new(reason: RejectionReason) -> Self {
        Rejection {
            reasons: vec![reason],
        }
    }

    /// All reasons joined for display to the player
    pub fn message(&self) -> String {
        self.reasons
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to declare action: {}", self.message())
    }
}

impl From<RejectionReason> for Rejection {
    fn from(reason: RejectionReason) -> Self {
        Rejection::new(reason)
    }
}
