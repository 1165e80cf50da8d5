//! # helpdesk_api
//!
//! HTTP API library for Helpdesk.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, Method, header};
use axum::routing::get;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::handlers::{chats, health, users};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
}

/// Run embedded database migrations.
///
/// Delegates to `helpdesk_core::migrate::migrate()` which owns the migration
/// files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    helpdesk_core::migrate::migrate(pool).await
}

/// CORS policy for one surface: wildcard origin, an explicit method
/// allow-list, the `Content-Type` / `X-User-Id` headers, 24h max-age.
fn cors_for<const N: usize>(methods: [Method; N]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(methods)
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-user-id")])
        .max_age(Duration::from_secs(86400))
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    // The user surface advertises DELETE in preflight although no delete
    // route exists; unrouted methods land on the 405 fallback.
    let chat_routes = Router::new()
        .route("/chats", get(chats::chats_index).post(chats::chat_action))
        .layer(cors_for([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ]));

    let user_routes = Router::new()
        .route(
            "/users",
            get(users::list_users)
                .post(users::create_user)
                .put(users::update_user),
        )
        .layer(cors_for([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]));

    Router::new()
        .route("/health", get(health::health))
        .merge(chat_routes)
        .merge(user_routes)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(state)
}
