//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::{RosterDto, ScoreDto};

/// Response of session creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreatedDto {
    pub code: String,
}

/// Session summary for list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummaryDto {
    pub code: String,
    pub phase: String,
    pub players: usize,
    pub created_at: String, // ISO 8601
}

/// Session detail for detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetailDto {
    pub code: String,
    pub phase: String,
    pub roster: RosterDto,
    pub scores: Vec<ScoreDto>,
    pub created_at: String, // ISO 8601
}
