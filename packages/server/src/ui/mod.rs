//! WebSocket + HTTP gateway for the game server.

mod handler;
mod runner;
mod signal;
pub mod state;

pub use runner::{build_router, run};
