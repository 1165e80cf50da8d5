//! Health endpoint.

use axum::extract::State;
use tracing::warn;

use crate::AppState;
use crate::extractors::Json;
use crate::models::HealthResponse;

/// `GET /health` — liveness plus a database connectivity probe.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_connected = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => true,
        Err(e) => {
            warn!("database probe failed: {e}");
            false
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: helpdesk_core::version().to_string(),
        db_connected,
    })
}
