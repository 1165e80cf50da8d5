//! User surface request handlers.

use axum::extract::State;

use helpdesk_core::users;

use crate::AppState;
use crate::error::AppResult;
use crate::extractors::Json;
use crate::models::{
    CreateUserRequest, OkResponse, UpdateUserRequest, UserCreatedResponse, UserListResponse,
    UserView,
};

/// `GET /users` — list all employee accounts, ordered by id.
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<UserListResponse>> {
    let records = users::list_users(&state.pool).await?;
    Ok(Json(UserListResponse {
        users: records.into_iter().map(UserView::from).collect(),
    }))
}

/// `POST /users` — create an employee account.
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> AppResult<Json<UserCreatedResponse>> {
    let id = users::create_user(&state.pool, &body.username, &body.password, &body.role).await?;
    tracing::info!(id, username = %body.username, "user created");
    Ok(Json(UserCreatedResponse { success: true, id }))
}

/// `PUT /users` — update an employee's status. A missing or empty `status`
/// performs no write and still reports success.
pub async fn update_user(
    State(state): State<AppState>,
    Json(body): Json<UpdateUserRequest>,
) -> AppResult<Json<OkResponse>> {
    if let Some(status) = body.status.filter(|s| !s.is_empty()) {
        users::set_status(&state.pool, body.id, &status).await?;
    }
    Ok(Json(OkResponse { success: true }))
}
