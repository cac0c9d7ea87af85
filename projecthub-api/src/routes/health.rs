/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "ok",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```
///
/// `status` is `"degraded"` when the database doesn't answer.

use crate::app::AppState;
use axum::{extract::State, Json};
use projecthub_shared::db::pool;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok" or "degraded"
    pub status: String,

    /// Application version
    pub version: String,

    /// "connected" or "disconnected"
    pub database: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match pool::health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            false
        }
    };

    Json(HealthResponse {
        status: if connected { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
    })
}
