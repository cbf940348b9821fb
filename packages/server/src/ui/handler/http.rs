//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sketchbluff_shared::time::timestamp_to_jst_rfc3339;

use crate::{
    domain::{SessionCode, SessionSnapshot},
    infrastructure::dto::{
        http::{SessionCreatedDto, SessionDetailDto, SessionSummaryDto},
        websocket::{RosterDto, ScoreDto},
    },
    ui::state::AppState,
    usecase::CreateSessionUseCase,
};

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let sessions = state.repository.count_sessions().await;
    Json(serde_json::json!({"status": "ok", "sessions": sessions}))
}

/// Create a session and return its code
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionCreatedDto>), StatusCode> {
    let usecase = CreateSessionUseCase::new(state.repository.clone());
    let code = usecase
        .execute()
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;

    Ok((
        StatusCode::CREATED,
        Json(SessionCreatedDto {
            code: code.to_string(),
        }),
    ))
}

/// Get list of live sessions
pub async fn get_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionSummaryDto>> {
    let sessions = state.repository.list_sessions().await;

    let mut summaries = Vec::with_capacity(sessions.len());
    for session in sessions {
        let snapshot = session.snapshot().await;
        summaries.push(SessionSummaryDto {
            code: snapshot.code.to_string(),
            phase: snapshot.phase.as_str().to_string(),
            players: snapshot.roster.players.len(),
            created_at: timestamp_to_jst_rfc3339(snapshot.created_at.value()),
        });
    }

    Json(summaries)
}

/// Get session detail by code
pub async fn get_session_detail(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<SessionDetailDto>, StatusCode> {
    // A malformed code can never name a live session
    let code = SessionCode::new(code).map_err(|_| StatusCode::NOT_FOUND)?;
    let session = state
        .repository
        .find_session(&code)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;

    Ok(Json(detail_dto(session.snapshot().await)))
}

fn detail_dto(snapshot: SessionSnapshot) -> SessionDetailDto {
    SessionDetailDto {
        code: snapshot.code.to_string(),
        phase: snapshot.phase.as_str().to_string(),
        roster: RosterDto::from(&snapshot.roster),
        scores: snapshot.scores.iter().map(ScoreDto::from).collect(),
        created_at: timestamp_to_jst_rfc3339(snapshot.created_at.value()),
    }
}
