//! Domain layer for the game server.
//!
//! Game rules, scoring and per-session state. Independent of wire formats
//! and transport.

pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod game;
pub mod phase;
pub mod prompt;
pub mod repository;
pub mod round;
pub mod scoring;
pub mod session;
pub mod value_object;

pub use entity::{Player, Roster, ScoreBoard, Team};
pub use error::{
    CreateSessionError, GameError, RepositoryError, SessionError, ValueObjectError,
};
pub use event::{
    Audience, GameEvent, GuessCandidate, Notification, PhaseStarted, RosterSnapshot, ScoreLine,
    VoteCandidate,
};
pub use factory::SessionCodeFactory;
pub use game::{Game, GameConfig, PhaseChange, Step};
pub use phase::Phase;
pub use prompt::PromptBank;
pub use repository::SessionRepository;
pub use round::{RoundState, Winner};
pub use session::{EventSender, PhaseTimer, Session, SessionSnapshot, SessionState};
pub use value_object::{
    Drawing, PlayerId, PlayerName, Prompt, SessionCode, TeamName, Timestamp,
};
