//! Chat surface integration tests against an ephemeral PostgreSQL.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

use common::{send, test_app};

async fn create_online_operator(app: &Router, username: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/users",
        Some(json!({"username": username, "password": "pw"})),
    )
    .await;
    assert_eq!(StatusCode::OK, status);
    let id = body["id"].as_i64().expect("user id");

    let (status, _) = send(
        app,
        Method::PUT,
        "/users",
        Some(json!({"id": id, "status": "online"})),
    )
    .await;
    assert_eq!(StatusCode::OK, status);
    id
}

#[tokio::test]
async fn chat_without_online_operator_waits() {
    let Some((mut db, app)) = test_app().await else {
        return;
    };

    let (status, body) = send(
        &app,
        Method::POST,
        "/chats",
        Some(json!({"action": "create_chat", "client_name": "Jane"})),
    )
    .await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(json!(true), body["success"]);
    assert_eq!(json!(null), body["operator_id"]);
    let chat_id = body["chat_id"].as_i64().expect("chat id");

    let (status, body) = send(&app, Method::GET, &format!("/chats?chat_id={chat_id}"), None).await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(json!("waiting"), body["chat"]["status"]);
    assert_eq!(json!("Jane"), body["chat"]["client_name"]);
    assert_eq!(json!(null), body["chat"]["operator_name"]);
    assert_eq!(0, body["messages"].as_array().expect("messages").len());
    assert_eq!(0, body["comments"].as_array().expect("comments").len());

    // Missing chats resolve to a null chat, not a 404.
    let (status, body) = send(&app, Method::GET, "/chats?chat_id=999999", None).await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(json!(null), body["chat"]);

    db.stop().await.expect("db stop");
}

#[tokio::test]
async fn online_operator_is_assigned_at_creation() {
    let Some((mut db, app)) = test_app().await else {
        return;
    };

    let operator_id = create_online_operator(&app, "bob").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/chats",
        Some(json!({"action": "create_chat"})),
    )
    .await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(json!(operator_id), body["operator_id"]);
    let chat_id = body["chat_id"].as_i64().expect("chat id");

    let (status, body) = send(&app, Method::GET, &format!("/chats?chat_id={chat_id}"), None).await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(json!("active"), body["chat"]["status"]);
    assert_eq!(json!("Anonymous"), body["chat"]["client_name"]);
    assert_eq!(json!(operator_id), body["chat"]["assigned_operator_id"]);
    assert_eq!(json!("bob"), body["chat"]["operator_name"]);

    // The operator's work queue sees the chat; other operators don't.
    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/chats?operator_id={operator_id}"),
        None,
    )
    .await;
    let assigned = body["chats"].as_array().expect("chats");
    assert_eq!(1, assigned.len());
    assert_eq!(json!(chat_id), assigned[0]["id"]);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/chats?operator_id={}", operator_id + 1),
        None,
    )
    .await;
    assert_eq!(0, body["chats"].as_array().expect("chats").len());

    db.stop().await.expect("db stop");
}

#[tokio::test]
async fn messages_and_comments_are_ordered_and_echoed() {
    let Some((mut db, app)) = test_app().await else {
        return;
    };

    let operator_id = create_online_operator(&app, "eve").await;
    let (_, body) = send(
        &app,
        Method::POST,
        "/chats",
        Some(json!({"action": "create_chat", "client_name": "Ann"})),
    )
    .await;
    let chat_id = body["chat_id"].as_i64().expect("chat id");

    let (status, body) = send(
        &app,
        Method::POST,
        "/chats",
        Some(json!({"action": "send_message", "chat_id": chat_id, "message": "hello"})),
    )
    .await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(json!(true), body["success"]);
    assert!(body["message_id"].is_i64());

    let (status, _) = send(
        &app,
        Method::POST,
        "/chats",
        Some(json!({
            "action": "send_message",
            "chat_id": chat_id,
            "message": "how can I help?",
            "sender_type": "operator",
            "sender_id": operator_id,
        })),
    )
    .await;
    assert_eq!(StatusCode::OK, status);

    let (status, body) = send(
        &app,
        Method::POST,
        "/chats",
        Some(json!({
            "action": "add_comment",
            "chat_id": chat_id,
            "user_id": operator_id,
            "comment": "angry customer, handle with care",
        })),
    )
    .await;
    assert_eq!(StatusCode::OK, status);
    assert!(body["comment_id"].is_i64());

    let (_, body) = send(&app, Method::GET, &format!("/chats?chat_id={chat_id}"), None).await;
    let messages = body["messages"].as_array().expect("messages");
    assert_eq!(2, messages.len());
    assert_eq!(json!("hello"), messages[0]["message"]);
    assert_eq!(json!("client"), messages[0]["sender_type"]);
    assert_eq!(json!(null), messages[0]["sender_id"]);
    assert_eq!(json!("how can I help?"), messages[1]["message"]);
    assert_eq!(json!("operator"), messages[1]["sender_type"]);
    assert_eq!(json!(operator_id), messages[1]["sender_id"]);
    let first = messages[0]["created_at"].as_str().expect("timestamp");
    let second = messages[1]["created_at"].as_str().expect("timestamp");
    assert!(first <= second, "messages out of order: {first} > {second}");

    let comments = body["comments"].as_array().expect("comments");
    assert_eq!(1, comments.len());
    assert_eq!(
        json!("angry customer, handle with care"),
        comments[0]["comment"]
    );
    assert_eq!(json!("eve"), comments[0]["username"]);

    // A message aimed at a nonexistent chat trips the foreign key.
    let (status, body) = send(
        &app,
        Method::POST,
        "/chats",
        Some(json!({"action": "send_message", "chat_id": 999999, "message": "void"})),
    )
    .await;
    assert_eq!(StatusCode::CONFLICT, status);
    assert_eq!(json!("constraint_violation"), body["error"]);

    db.stop().await.expect("db stop");
}

#[tokio::test]
async fn closing_archives_the_chat() {
    let Some((mut db, app)) = test_app().await else {
        return;
    };

    let (_, body) = send(
        &app,
        Method::POST,
        "/chats",
        Some(json!({"action": "create_chat", "client_name": "first"})),
    )
    .await;
    let first_chat = body["chat_id"].as_i64().expect("chat id");

    let (_, body) = send(
        &app,
        Method::POST,
        "/chats",
        Some(json!({"action": "create_chat", "client_name": "second"})),
    )
    .await;
    let second_chat = body["chat_id"].as_i64().expect("chat id");

    let (status, body) = send(
        &app,
        Method::POST,
        "/chats",
        Some(json!({"action": "close_chat", "chat_id": first_chat, "resolution": "escalated"})),
    )
    .await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(json!(true), body["success"]);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/chats?chat_id={first_chat}"),
        None,
    )
    .await;
    assert_eq!(json!("closed"), body["chat"]["status"]);
    assert_eq!(json!("escalated"), body["chat"]["resolution"]);
    assert!(body["chat"]["closed_at"].is_string());

    // Closed chats leave the default listing but stay in the archive.
    let (_, body) = send(&app, Method::GET, "/chats", None).await;
    let open = body["chats"].as_array().expect("chats");
    assert_eq!(1, open.len());
    assert_eq!(json!(second_chat), open[0]["id"]);

    let (_, body) = send(&app, Method::GET, "/chats?show_archive=true", None).await;
    let all = body["chats"].as_array().expect("chats");
    assert_eq!(2, all.len());
    // Newest first.
    assert_eq!(json!(second_chat), all[0]["id"]);
    assert_eq!(json!(first_chat), all[1]["id"]);

    // Omitted resolution falls back to "resolved".
    let (_, _) = send(
        &app,
        Method::POST,
        "/chats",
        Some(json!({"action": "close_chat", "chat_id": second_chat})),
    )
    .await;
    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/chats?chat_id={second_chat}"),
        None,
    )
    .await;
    assert_eq!(json!("resolved"), body["chat"]["resolution"]);

    db.stop().await.expect("db stop");
}

#[tokio::test]
async fn malformed_bodies_are_validation_errors() {
    let Some((mut db, app)) = test_app().await else {
        return;
    };

    // Required field missing: no silent default.
    let (status, body) = send(
        &app,
        Method::POST,
        "/chats",
        Some(json!({"action": "send_message", "message": "hi"})),
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status);
    assert_eq!(json!("validation_error"), body["error"]);

    // Unknown action.
    let (status, body) = send(
        &app,
        Method::POST,
        "/chats",
        Some(json!({"action": "reopen_chat", "chat_id": 1})),
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status);
    assert_eq!(json!("validation_error"), body["error"]);

    // Malformed JSON.
    let request = Request::builder()
        .method(Method::POST)
        .uri("/chats")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("build request");
    let response = app.clone().oneshot(request).await.expect("request");
    assert_eq!(StatusCode::BAD_REQUEST, response.status());

    db.stop().await.expect("db stop");
}

#[tokio::test]
async fn unsupported_method_is_405() {
    let Some((mut db, app)) = test_app().await else {
        return;
    };

    let (status, body) = send(&app, Method::DELETE, "/chats", None).await;
    assert_eq!(StatusCode::METHOD_NOT_ALLOWED, status);
    assert_eq!(json!("Method not allowed"), body["error"]);

    db.stop().await.expect("db stop");
}

#[tokio::test]
async fn preflight_is_answered_uniformly() {
    let Some((mut db, app)) = test_app().await else {
        return;
    };

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/chats")
        .header(header::ORIGIN, "http://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .expect("build request");
    let response = app.clone().oneshot(request).await.expect("request");

    assert_eq!(StatusCode::OK, response.status());
    let headers = response.headers();
    assert_eq!(
        "*",
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .expect("allow-origin")
            .to_str()
            .expect("ascii header")
    );
    assert_eq!(
        "86400",
        headers
            .get(header::ACCESS_CONTROL_MAX_AGE)
            .expect("max-age")
            .to_str()
            .expect("ascii header")
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    assert!(bytes.is_empty());

    db.stop().await.expect("db stop");
}

#[tokio::test]
async fn health_reports_database_connectivity() {
    let Some((mut db, app)) = test_app().await else {
        return;
    };

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(json!("ok"), body["status"]);
    assert_eq!(json!(true), body["db_connected"]);
    assert!(body["version"].is_string());

    db.stop().await.expect("db stop");
}
