//! Shared integration-test harness: ephemeral PostgreSQL plus the app
//! router, driven in-process through `tower::ServiceExt`.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use tower::ServiceExt;

use helpdesk_api::{AppState, config::ApiConfig};
use helpdesk_core::db::{DbError, LocalDb};

/// Ephemeral database plus a ready router, or `None` when PostgreSQL
/// tooling is absent from the environment.
pub async fn test_app() -> Option<(LocalDb, Router)> {
    let mut db = match LocalDb::ephemeral().await {
        Ok(db) => db,
        Err(DbError::PgConfigNotFound) => {
            eprintln!("skipping: pg_config not on PATH");
            return None;
        }
        Err(e) => panic!("ephemeral database: {e}"),
    };
    db.setup().await.expect("db setup");
    db.start().await.expect("db start");

    let pool = sqlx::PgPool::connect(&db.connection_url())
        .await
        .expect("connect to ephemeral PG");
    helpdesk_api::migrate(&pool).await.expect("migrate");

    let state = AppState {
        pool,
        config: ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            pg_connection_url: db.connection_url(),
        },
    };
    Some((db, helpdesk_api::router(state)))
}

/// Send a request with an optional JSON body; returns the status and the
/// parsed JSON body (`null` when the body is empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };

    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse JSON body")
    };
    (status, json)
}
