//! Notifications the game emits for the gateway to deliver.

use serde::{Deserialize, Serialize};

use super::{
    entity::{Player, Team},
    phase::Phase,
    round::Winner,
    value_object::{Drawing, PlayerId, PlayerName, Prompt, TeamName},
};

/// Who a notification is for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Every player in the session
    All,
    /// A single player
    Player(PlayerId),
}

/// An event together with its recipients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub audience: Audience,
    pub event: GameEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Full player list and team grouping after a join or leave
    RosterChanged(RosterSnapshot),
    /// A new phase began
    PhaseStarted(PhaseStarted),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
}

/// Data handed out at the start of each phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseStarted {
    Waiting,
    /// Sent to each player separately: the prompt is secret
    Drawing { prompt: Prompt, seconds: u64 },
    Voting {
        candidates: Vec<VoteCandidate>,
        seconds: u64,
    },
    Guessing {
        candidates: Vec<GuessCandidate>,
        seconds: u64,
    },
    Results {
        scores: Vec<ScoreLine>,
        roster: RosterSnapshot,
        /// The winning drawings with their true prompts
        reveals: Vec<Winner>,
        seconds: u64,
    },
}

impl PhaseStarted {
    pub fn phase(&self) -> Phase {
        match self {
            PhaseStarted::Waiting => Phase::Waiting,
            PhaseStarted::Drawing { .. } => Phase::Drawing,
            PhaseStarted::Voting { .. } => Phase::Voting,
            PhaseStarted::Guessing { .. } => Phase::Guessing,
            PhaseStarted::Results { .. } => Phase::Results,
        }
    }
}

/// A drawing up for the best-drawing vote; its prompt is shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCandidate {
    pub owner: PlayerId,
    pub prompt: Prompt,
    pub drawing: Drawing,
}

/// A winning drawing whose prompt players must guess
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessCandidate {
    pub owner: PlayerId,
    pub drawing: Drawing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub player: PlayerId,
    pub name: PlayerName,
    pub team: TeamName,
    pub score: u32,
}
