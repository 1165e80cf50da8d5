//! API request and response models.
//!
//! Wire shapes are distinct from the domain records in `helpdesk_core`:
//! timestamps serialize as ISO-8601 strings (or `null` for nullable
//! columns), and every mutation reply carries the `success` envelope.

use serde::{Deserialize, Serialize};

use helpdesk_core::models::chat::{ChatDetail, ChatRecord, CommentRecord, MessageRecord};
use helpdesk_core::models::user::UserRecord;

/// Error envelope returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Query parameters accepted by `GET /chats`.
///
/// `chat_id` wins over the list filters; only the literal string `"true"`
/// turns on `show_archive`.
#[derive(Debug, Default, Deserialize)]
pub struct ChatListQuery {
    pub chat_id: Option<i32>,
    pub operator_id: Option<i32>,
    pub show_archive: Option<String>,
}

/// Actions accepted by `POST /chats`, dispatched on the `action` field.
///
/// Required fields missing from the body reject with a validation error
/// instead of being silently defaulted.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ChatAction {
    CreateChat {
        #[serde(default = "default_client_name")]
        client_name: String,
        #[serde(default)]
        client_email: String,
    },
    SendMessage {
        chat_id: i32,
        message: String,
        #[serde(default = "default_sender_type")]
        sender_type: String,
        #[serde(default)]
        sender_id: Option<i32>,
    },
    CloseChat {
        chat_id: i32,
        #[serde(default = "default_resolution")]
        resolution: String,
    },
    AddComment {
        chat_id: i32,
        user_id: i32,
        comment: String,
    },
}

fn default_client_name() -> String {
    "Anonymous".to_string()
}

fn default_sender_type() -> String {
    "client".to_string()
}

fn default_resolution() -> String {
    "resolved".to_string()
}

/// Chat row in list responses.
#[derive(Debug, Serialize)]
pub struct ChatView {
    pub id: i32,
    pub client_name: String,
    pub client_email: String,
    pub status: String,
    pub assigned_operator_id: Option<i32>,
    pub created_at: String,
    pub resolution: Option<String>,
}

impl From<ChatRecord> for ChatView {
    fn from(r: ChatRecord) -> Self {
        Self {
            id: r.id,
            client_name: r.client_name,
            client_email: r.client_email,
            status: r.status,
            assigned_operator_id: r.assigned_operator_id,
            created_at: r.created_at.to_rfc3339(),
            resolution: r.resolution,
        }
    }
}

/// Chat row in the detail response, joined to its operator's username.
#[derive(Debug, Serialize)]
pub struct ChatDetailView {
    pub id: i32,
    pub client_name: String,
    pub client_email: String,
    pub status: String,
    pub assigned_operator_id: Option<i32>,
    pub created_at: String,
    pub operator_name: Option<String>,
    pub resolution: Option<String>,
    pub closed_at: Option<String>,
}

impl From<ChatDetail> for ChatDetailView {
    fn from(r: ChatDetail) -> Self {
        Self {
            id: r.id,
            client_name: r.client_name,
            client_email: r.client_email,
            status: r.status,
            assigned_operator_id: r.assigned_operator_id,
            created_at: r.created_at.to_rfc3339(),
            operator_name: r.operator_name,
            resolution: r.resolution,
            closed_at: r.closed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Message row in the detail response.
#[derive(Debug, Serialize)]
pub struct MessageView {
    pub id: i32,
    pub sender_type: String,
    pub sender_id: Option<i32>,
    pub message: String,
    pub created_at: String,
}

impl From<MessageRecord> for MessageView {
    fn from(r: MessageRecord) -> Self {
        Self {
            id: r.id,
            sender_type: r.sender_type,
            sender_id: r.sender_id,
            message: r.message,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Internal comment row in the detail response.
#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: i32,
    pub comment: String,
    pub created_at: String,
    pub username: Option<String>,
}

impl From<CommentRecord> for CommentView {
    fn from(r: CommentRecord) -> Self {
        Self {
            id: r.id,
            comment: r.comment,
            created_at: r.created_at.to_rfc3339(),
            username: r.username,
        }
    }
}

/// `GET /chats?chat_id=N` response. `chat` is `null` when no row matches.
#[derive(Debug, Serialize)]
pub struct ChatDetailResponse {
    pub chat: Option<ChatDetailView>,
    pub messages: Vec<MessageView>,
    pub comments: Vec<CommentView>,
}

/// `GET /chats` list response.
#[derive(Debug, Serialize)]
pub struct ChatListResponse {
    pub chats: Vec<ChatView>,
}

/// `create_chat` response. `operator_id` serializes as `null` when no
/// online operator existed.
#[derive(Debug, Serialize)]
pub struct ChatCreatedResponse {
    pub success: bool,
    pub chat_id: i32,
    pub operator_id: Option<i32>,
}

/// `send_message` response.
#[derive(Debug, Serialize)]
pub struct MessageSentResponse {
    pub success: bool,
    pub message_id: i32,
}

/// `add_comment` response.
#[derive(Debug, Serialize)]
pub struct CommentAddedResponse {
    pub success: bool,
    pub comment_id: i32,
}

/// Bare success envelope (`close_chat`, `PUT /users`).
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub success: bool,
}

/// User row in the list response.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub status: String,
    pub created_at: String,
}

impl From<UserRecord> for UserView {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id,
            username: r.username,
            role: r.role,
            status: r.status,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// `GET /users` response.
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserView>,
}

/// `POST /users` request body.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "operator".to_string()
}

/// `PUT /users` request body. Only the status column is updatable.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub id: i32,
    #[serde(default)]
    pub status: Option<String>,
}

/// `POST /users` response.
#[derive(Debug, Serialize)]
pub struct UserCreatedResponse {
    pub success: bool,
    pub id: i32,
}

/// `GET /health` response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub db_connected: bool,
}
