//! Domain layer error definitions.

use thiserror::Error;

use super::phase::Phase;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// PlayerId validation error
    #[error("PlayerId cannot be empty")]
    PlayerIdEmpty,

    /// PlayerId too long error
    #[error("PlayerId cannot exceed {max} characters (got {actual})")]
    PlayerIdTooLong { max: usize, actual: usize },

    /// SessionCode has the wrong length
    #[error("SessionCode must be exactly {expected} characters (got {actual})")]
    SessionCodeInvalidLength { expected: usize, actual: usize },

    /// SessionCode contains a character outside the code alphabet
    #[error("SessionCode contains an invalid character: {0:?}")]
    SessionCodeInvalidCharacter(char),

    /// PlayerName validation error
    #[error("PlayerName cannot be empty")]
    PlayerNameEmpty,

    /// PlayerName too long error
    #[error("PlayerName cannot exceed {max} characters (got {actual})")]
    PlayerNameTooLong { max: usize, actual: usize },

    /// TeamName validation error
    #[error("TeamName cannot be empty")]
    TeamNameEmpty,

    /// TeamName too long error
    #[error("TeamName cannot exceed {max} characters (got {actual})")]
    TeamNameTooLong { max: usize, actual: usize },

    /// Prompt validation error
    #[error("Prompt cannot be empty")]
    PromptEmpty,

    /// Drawing validation error
    #[error("Drawing cannot be empty")]
    DrawingEmpty,

    /// Drawing too large error
    #[error("Drawing cannot exceed {max} bytes (got {actual})")]
    DrawingTooLarge { max: usize, actual: usize },
}

/// Errors raised by the game state machine.
///
/// None of these is fatal: each is scoped to the single request that caused it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Start requested with too few players
    #[error("At least {required} players are needed to start (current: {current})")]
    InsufficientPlayers { required: usize, current: usize },

    /// Request arrived while the session was in another phase
    #[error("Expected phase {expected} but session is in {actual}")]
    PhaseMismatch { expected: Phase, actual: Phase },

    /// Action from a player not registered in the session
    #[error("Player '{0}' is not part of this session")]
    UnknownPlayer(String),

    /// Drawing submitted by a player that holds no prompt this round
    #[error("Player '{0}' has no prompt this round")]
    NoPromptAssigned(String),
}

/// Errors returned by the session repository
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No live session uses the given code
    #[error("Session '{0}' not found")]
    SessionNotFound(String),
}

/// Errors returned when the registry cannot open another session
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CreateSessionError {
    /// The registry already holds its maximum number of sessions
    #[error("Session limit of {0} reached")]
    LimitReached(usize),

    /// Every drawn code collided with a live session
    #[error("No free session code after {0} attempts")]
    CodesExhausted(usize),
}

/// Errors from operations on a live session
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session was destroyed after the caller looked it up
    #[error("Session is closed")]
    Closed,

    #[error(transparent)]
    Game(#[from] GameError),
}
