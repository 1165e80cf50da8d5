//! Request handlers.

pub mod chats;
pub mod health;
pub mod users;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Fallback for routes hit with a method outside their allow-list.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        axum::Json(json!({"error": "Method not allowed"})),
    )
        .into_response()
}
