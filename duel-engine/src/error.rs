//! Engine error taxonomy

use thiserror::Error;
use uuid::Uuid;

use crate::model::MatchStatus;
use crate::repository::RepositoryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("match {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: MatchStatus,
        to: MatchStatus,
    },

    #[error("dependency failure: {0}")]
    Dependency(#[from] RepositoryError),
}

impl From<duel_core::DuelError> for EngineError {
    fn from(err: duel_core::DuelError) -> Self {
        match err {
            duel_core::DuelError::Validation(msg) => EngineError::Validation(msg),
        }
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
