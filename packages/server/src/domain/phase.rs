//! Game phases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a session. Exactly one is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Lobby: players join and wait for someone to start
    #[default]
    Waiting,
    /// Every player draws their secret prompt
    Drawing,
    /// Players vote for the best drawing per prompt
    Voting,
    /// Players guess the prompt behind each winning drawing
    Guessing,
    /// Scores are shown before returning to the lobby
    Results,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Waiting => "waiting",
            Phase::Drawing => "drawing",
            Phase::Voting => "voting",
            Phase::Guessing => "guessing",
            Phase::Results => "results",
        }
    }

    /// Phases that close when every player has responded.
    pub fn collects_submissions(&self) -> bool {
        matches!(self, Phase::Drawing | Phase::Voting | Phase::Guessing)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
