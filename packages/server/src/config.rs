//! Command-line configuration.

use std::time::Duration;

use clap::Parser;

use crate::{
    domain::{
        GameConfig,
        game::{
            DEFAULT_DRAWING_DURATION, DEFAULT_GUESSING_DURATION, DEFAULT_MIN_PLAYERS,
            DEFAULT_RESULTS_DURATION, DEFAULT_VOTING_DURATION,
        },
    },
    infrastructure::repository::{
        RegistryConfig,
        inmemory::session::{DEFAULT_EMPTY_SESSION_GRACE, DEFAULT_MAX_SESSIONS},
    },
};

/// Sketchbluff game server
#[derive(Debug, Clone, Parser)]
#[command(name = "sketchbluff-server", version, about)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Seconds allowed for drawing
    #[arg(long, default_value_t = DEFAULT_DRAWING_DURATION.as_secs())]
    pub drawing_secs: u64,

    /// Seconds allowed for voting
    #[arg(long, default_value_t = DEFAULT_VOTING_DURATION.as_secs())]
    pub voting_secs: u64,

    /// Seconds allowed for guessing
    #[arg(long, default_value_t = DEFAULT_GUESSING_DURATION.as_secs())]
    pub guessing_secs: u64,

    /// Seconds the results stay on screen before the next round
    #[arg(long, default_value_t = DEFAULT_RESULTS_DURATION.as_secs())]
    pub results_secs: u64,

    /// Maximum number of live sessions
    #[arg(long, default_value_t = DEFAULT_MAX_SESSIONS)]
    pub max_sessions: usize,

    /// Seconds a session nobody joined is kept before it is destroyed
    #[arg(long, default_value_t = DEFAULT_EMPTY_SESSION_GRACE.as_secs())]
    pub empty_session_secs: u64,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    /// `host:port` to bind the listener on
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            drawing: Duration::from_secs(self.drawing_secs),
            voting: Duration::from_secs(self.voting_secs),
            guessing: Duration::from_secs(self.guessing_secs),
            results: Duration::from_secs(self.results_secs),
            min_players: DEFAULT_MIN_PLAYERS,
        }
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            max_sessions: self.max_sessions,
            empty_session_grace: Duration::from_secs(self.empty_session_secs),
        }
    }
}
