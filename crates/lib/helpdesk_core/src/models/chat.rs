//! Chat domain models.
//!
//! A chat belongs to a client and is optionally assigned to one operator at
//! creation time. Messages and internal comments each belong to exactly one
//! chat and are immutable once written.

use chrono::{DateTime, Utc};

/// Chat row as returned by the list queries.
#[derive(Debug, Clone)]
pub struct ChatRecord {
    pub id: i32,
    pub client_name: String,
    pub client_email: String,
    pub status: String,
    pub assigned_operator_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub resolution: Option<String>,
}

/// Chat row joined to its operator's username, for the detail view.
#[derive(Debug, Clone)]
pub struct ChatDetail {
    pub id: i32,
    pub client_name: String,
    pub client_email: String,
    pub status: String,
    pub assigned_operator_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub operator_name: Option<String>,
    pub resolution: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Message row.
///
/// `sender_id` is set when `sender_type` is `operator`, null for clients.
#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub id: i32,
    pub sender_type: String,
    pub sender_id: Option<i32>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Internal comment row joined to its author's username.
///
/// Comments are operator-only annotations and never reach the client side.
#[derive(Debug, Clone)]
pub struct CommentRecord {
    pub id: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub username: Option<String>,
}

/// Outcome of creating a chat: the new row id plus the operator that was
/// assigned, if any online operator existed at that instant.
#[derive(Debug, Clone, Copy)]
pub struct NewChat {
    pub chat_id: i32,
    pub operator_id: Option<i32>,
}
