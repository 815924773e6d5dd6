use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::db::dialects::supported_dialects;
use crate::db::SessionManager;

pub struct HealthState {
    pub sessions: Arc<SessionManager>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub session: Option<SessionInfo>,
    pub dialects: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub dialect: &'static str,
}

pub async fn health_check(State(state): State<Arc<HealthState>>) -> Json<HealthResponse> {
    let session = state.sessions.current().await.map(|s| SessionInfo {
        dialect: s.dialect.name(),
    });

    Json(HealthResponse {
        status: "healthy",
        session,
        dialects: supported_dialects(),
    })
}

pub async fn keep_alive() -> &'static str {
    "Bot is running"
}
