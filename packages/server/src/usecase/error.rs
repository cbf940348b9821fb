//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{GameError, RepositoryError, SessionError};

/// Errors returned when joining a session
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinError {
    /// No live session uses the code
    #[error("Session '{0}' not found")]
    SessionNotFound(String),
}

/// Errors returned by in-game actions (start, submissions, leave)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// No live session uses the code
    #[error("Session '{0}' not found")]
    SessionNotFound(String),

    /// The game refused the action; the session is unchanged
    #[error(transparent)]
    Rejected(#[from] GameError),
}

impl From<RepositoryError> for JoinError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::SessionNotFound(code) => JoinError::SessionNotFound(code),
        }
    }
}

impl From<RepositoryError> for ActionError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::SessionNotFound(code) => ActionError::SessionNotFound(code),
        }
    }
}

impl ActionError {
    /// Map a session-level failure, naming the session for `Closed`.
    pub(crate) fn from_session(code: &str, err: SessionError) -> Self {
        match err {
            SessionError::Closed => ActionError::SessionNotFound(code.to_string()),
            SessionError::Game(game) => ActionError::Rejected(game),
        }
    }
}
