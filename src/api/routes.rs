use axum::{routing::get, Router};
use std::sync::Arc;

use crate::db::SessionManager;

use super::health::{health_check, keep_alive, HealthState};

pub fn create_router(sessions: Arc<SessionManager>) -> Router {
    let health_state = Arc::new(HealthState { sessions });

    let health_routes = Router::new()
        .route("/health", get(health_check))
        .with_state(health_state);

    Router::new()
        .route("/", get(keep_alive))
        .merge(health_routes)
}
