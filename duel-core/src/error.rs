//! Error types for duel resolution

use thiserror::Error;

/// Errors raised before a duel is simulated
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DuelError {
    #[error("invalid combatant: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, DuelError>;
