//! Health Route
//!
//! Reports the integrations wired at startup. No liveness probing: the
//! response is computed once at bootstrap and identical on every call.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    services: Vec<String>,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        services: state.services.as_ref().clone(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
