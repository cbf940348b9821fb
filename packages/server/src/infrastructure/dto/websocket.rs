//! WebSocket message DTOs.
//!
//! Every message is a JSON object tagged by a kebab-case `type` field.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{self, GameEvent, PhaseStarted, RosterSnapshot};

/// Messages a client sends to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    CreateSession,
    JoinSession {
        code: String,
        player_name: String,
        team_name: String,
    },
    StartGame,
    SubmitDrawing {
        drawing: String,
    },
    SubmitVotes {
        owners: Vec<String>,
    },
    SubmitGuesses {
        /// drawing owner -> guessed prompt
        guesses: HashMap<String, String>,
    },
}

/// Messages the server sends to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    SessionCreated {
        code: String,
    },
    Joined {
        code: String,
        player_id: String,
    },
    Error {
        reason: ErrorReason,
        message: String,
    },
    RosterChanged(RosterDto),
    PhaseStarted(PhaseStartedDto),
}

/// Machine-readable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorReason {
    SessionNotFound,
    InvalidMessage,
    NotInSession,
    /// The server cannot open another session right now
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDto {
    pub id: String,
    pub name: String,
    pub team: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDto {
    pub name: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterDto {
    pub players: Vec<PlayerDto>,
    pub teams: Vec<TeamDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDto {
    pub owner: String,
    /// Present while voting, hidden while guessing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub drawing: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDto {
    pub player_id: String,
    pub name: String,
    pub team: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealDto {
    pub owner: String,
    pub prompt: String,
    pub votes: usize,
}

/// Payload of `phase-started`, tagged by `phase`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "kebab-case")]
pub enum PhaseStartedDto {
    Waiting,
    Drawing {
        prompt: String,
        seconds: u64,
    },
    Voting {
        candidates: Vec<CandidateDto>,
        seconds: u64,
    },
    Guessing {
        candidates: Vec<CandidateDto>,
        seconds: u64,
    },
    Results {
        scores: Vec<ScoreDto>,
        roster: RosterDto,
        reveals: Vec<RevealDto>,
        seconds: u64,
    },
}

impl From<&RosterSnapshot> for RosterDto {
    fn from(roster: &RosterSnapshot) -> Self {
        Self {
            players: roster
                .players
                .iter()
                .map(|p| PlayerDto {
                    id: p.id.to_string(),
                    name: p.name.to_string(),
                    team: p.team.to_string(),
                })
                .collect(),
            teams: roster
                .teams
                .iter()
                .map(|t| TeamDto {
                    name: t.name.to_string(),
                    members: t.members.iter().map(|m| m.to_string()).collect(),
                })
                .collect(),
        }
    }
}

impl From<&domain::ScoreLine> for ScoreDto {
    fn from(line: &domain::ScoreLine) -> Self {
        Self {
            player_id: line.player.to_string(),
            name: line.name.to_string(),
            team: line.team.to_string(),
            score: line.score,
        }
    }
}

impl From<PhaseStarted> for PhaseStartedDto {
    fn from(started: PhaseStarted) -> Self {
        match started {
            PhaseStarted::Waiting => PhaseStartedDto::Waiting,
            PhaseStarted::Drawing { prompt, seconds } => PhaseStartedDto::Drawing {
                prompt: prompt.to_string(),
                seconds,
            },
            PhaseStarted::Voting { candidates, seconds } => PhaseStartedDto::Voting {
                candidates: candidates
                    .into_iter()
                    .map(|c| CandidateDto {
                        owner: c.owner.into_string(),
                        prompt: Some(c.prompt.to_string()),
                        drawing: c.drawing.as_str().to_string(),
                    })
                    .collect(),
                seconds,
            },
            PhaseStarted::Guessing { candidates, seconds } => PhaseStartedDto::Guessing {
                candidates: candidates
                    .into_iter()
                    .map(|c| CandidateDto {
                        owner: c.owner.into_string(),
                        prompt: None,
                        drawing: c.drawing.as_str().to_string(),
                    })
                    .collect(),
                seconds,
            },
            PhaseStarted::Results {
                scores,
                roster,
                reveals,
                seconds,
            } => PhaseStartedDto::Results {
                scores: scores.iter().map(ScoreDto::from).collect(),
                roster: RosterDto::from(&roster),
                reveals: reveals
                    .into_iter()
                    .map(|w| RevealDto {
                        owner: w.owner.into_string(),
                        prompt: w.prompt.to_string(),
                        votes: w.votes,
                    })
                    .collect(),
                seconds,
            },
        }
    }
}

impl From<GameEvent> for ServerMessage {
    fn from(event: GameEvent) -> Self {
        match event {
            GameEvent::RosterChanged(roster) => ServerMessage::RosterChanged(RosterDto::from(&roster)),
            GameEvent::PhaseStarted(started) => ServerMessage::PhaseStarted(started.into()),
        }
    }
}
