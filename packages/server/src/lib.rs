//! Sketchbluff game server library.
//!
//! A multiplayer drawing-and-bluffing party game served over WebSocket, with a small HTTP API
//! for inspecting live sessions.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ServerConfig;
pub use ui::run as run_server;
