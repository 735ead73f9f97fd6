//! Ask Route - agent invocation
//!
//! Forwards one message to the agent engine and relays its result. Any
//! failure collapses to a 500 with the error text; nothing is retried.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use bubo::MemoryRecord;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub response: Value,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, (StatusCode, Json<ErrorBody>)> {
    match state.agent.generate(&payload.message).await {
        Ok(response) => {
            // The exchange log is best-effort; a failed append never fails
            // the request.
            let record = MemoryRecord::exchange(&payload.message, &response);
            if let Err(e) = state.memory.append(record).await {
                tracing::warn!("failed to append exchange to memory log: {}", e);
            }
            Ok(Json(AskResponse { response }))
        }
        Err(e) => {
            tracing::error!("agent error: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/ask", post(ask))
}
