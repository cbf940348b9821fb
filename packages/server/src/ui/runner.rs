//! Router construction and server startup.

use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::PromptBank,
    infrastructure::repository::InMemorySessionRepository,
    ui::{
        handler::{create_session, get_session_detail, get_sessions, health_check, websocket_handler},
        signal::shutdown_signal,
        state::AppState,
    },
};

/// Build the application router over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/sessions", get(get_sessions).post(create_session))
        .route("/api/sessions/{code}", get(get_session_detail))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the game server until Ctrl-C / SIGTERM.
pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let repository = Arc::new(
        InMemorySessionRepository::new(Arc::new(PromptBank::default()), config.game_config())
            .with_limits(config.registry_config()),
    );
    let app = build_router(Arc::new(AppState::new(repository)));

    let address = config.address();
    let listener = TcpListener::bind(&address).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
