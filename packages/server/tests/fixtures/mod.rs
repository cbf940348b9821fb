//! Test fixtures for integration tests.

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use sketchbluff_server::{
    domain::{GameConfig, PromptBank},
    infrastructure::repository::InMemorySessionRepository,
    ui::{build_router, state::AppState},
};
use tokio::{net::TcpListener, task::JoinHandle};

/// A server running in a background task on a fixed local port.
///
/// The task is aborted when the fixture is dropped.
pub struct TestServer {
    port: u16,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start with the built-in prompts and default phase durations.
    pub async fn start(port: u16) -> Self {
        Self::start_with(port, PromptBank::default(), GameConfig::default()).await
    }

    pub async fn start_with(port: u16, prompts: PromptBank, config: GameConfig) -> Self {
        let repository = Arc::new(InMemorySessionRepository::new(Arc::new(prompts), config));
        let app = build_router(Arc::new(AppState::new(repository)));

        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .expect("Failed to bind test port");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self { port, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Phase durations long enough that only quorum moves a test game forward.
pub fn slow_config() -> GameConfig {
    GameConfig {
        drawing: Duration::from_secs(600),
        voting: Duration::from_secs(600),
        guessing: Duration::from_secs(600),
        results: Duration::from_secs(600),
        min_players: 2,
    }
}
