//! Chat-related database queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::ChatError;
use crate::models::chat::{ChatDetail, ChatRecord, CommentRecord, MessageRecord};

type ChatRow = (
    i32,
    String,
    String,
    String,
    Option<i32>,
    DateTime<Utc>,
    Option<String>,
);

fn chat_from_row(row: ChatRow) -> ChatRecord {
    let (id, client_name, client_email, status, assigned_operator_id, created_at, resolution) =
        row;
    ChatRecord {
        id,
        client_name,
        client_email,
        status,
        assigned_operator_id,
        created_at,
        resolution,
    }
}

/// Pick one online operator uniformly at random.
///
/// No row lock is taken, so two concurrent callers can both select the same
/// operator.
pub async fn pick_online_operator(pool: &PgPool) -> Result<Option<i32>, ChatError> {
    let operator_id = sqlx::query_scalar::<_, i32>(
        "SELECT id FROM users \
         WHERE role = 'operator' AND status = 'online' \
         ORDER BY RANDOM() \
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;
    Ok(operator_id)
}

/// Insert a chat, returning the new chat id.
pub async fn insert_chat(
    pool: &PgPool,
    client_name: &str,
    client_email: &str,
    assigned_operator_id: Option<i32>,
    status: &str,
) -> Result<i32, ChatError> {
    let chat_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO chats (client_name, client_email, assigned_operator_id, status) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(client_name)
    .bind(client_email)
    .bind(assigned_operator_id)
    .bind(status)
    .fetch_one(pool)
    .await?;
    Ok(chat_id)
}

/// Fetch one chat left-joined to its operator's username.
pub async fn get_chat(pool: &PgPool, chat_id: i32) -> Result<Option<ChatDetail>, ChatError> {
    let row = sqlx::query_as::<
        _,
        (
            i32,
            String,
            String,
            String,
            Option<i32>,
            DateTime<Utc>,
            Option<String>,
            Option<String>,
            Option<DateTime<Utc>>,
        ),
    >(
        "SELECT c.id, c.client_name, c.client_email, c.status, c.assigned_operator_id, \
                c.created_at, u.username, c.resolution, c.closed_at \
         FROM chats c \
         LEFT JOIN users u ON c.assigned_operator_id = u.id \
         WHERE c.id = $1",
    )
    .bind(chat_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(
        |(
            id,
            client_name,
            client_email,
            status,
            assigned_operator_id,
            created_at,
            operator_name,
            resolution,
            closed_at,
        )| ChatDetail {
            id,
            client_name,
            client_email,
            status,
            assigned_operator_id,
            created_at,
            operator_name,
            resolution,
            closed_at,
        },
    ))
}

/// Messages for a chat, oldest first.
pub async fn list_messages(pool: &PgPool, chat_id: i32) -> Result<Vec<MessageRecord>, ChatError> {
    let rows = sqlx::query_as::<_, (i32, String, Option<i32>, String, DateTime<Utc>)>(
        "SELECT id, sender_type, sender_id, message, created_at \
         FROM messages \
         WHERE chat_id = $1 \
         ORDER BY created_at ASC",
    )
    .bind(chat_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(id, sender_type, sender_id, message, created_at)| MessageRecord {
                id,
                sender_type,
                sender_id,
                message,
                created_at,
            },
        )
        .collect())
}

/// Internal comments for a chat joined to their authors, oldest first.
pub async fn list_comments(pool: &PgPool, chat_id: i32) -> Result<Vec<CommentRecord>, ChatError> {
    let rows = sqlx::query_as::<_, (i32, String, DateTime<Utc>, Option<String>)>(
        "SELECT cc.id, cc.comment, cc.created_at, u.username \
         FROM chat_comments cc \
         LEFT JOIN users u ON cc.user_id = u.id \
         WHERE cc.chat_id = $1 \
         ORDER BY cc.created_at ASC",
    )
    .bind(chat_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, comment, created_at, username)| CommentRecord {
            id,
            comment,
            created_at,
            username,
        })
        .collect())
}

/// All non-closed chats, newest first.
pub async fn list_open_chats(pool: &PgPool) -> Result<Vec<ChatRecord>, ChatError> {
    let rows = sqlx::query_as::<_, ChatRow>(
        "SELECT id, client_name, client_email, status, assigned_operator_id, \
                created_at, resolution \
         FROM chats \
         WHERE status != 'closed' \
         ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(chat_from_row).collect())
}

/// Every chat regardless of status, newest first.
pub async fn list_all_chats(pool: &PgPool) -> Result<Vec<ChatRecord>, ChatError> {
    let rows = sqlx::query_as::<_, ChatRow>(
        "SELECT id, client_name, client_email, status, assigned_operator_id, \
                created_at, resolution \
         FROM chats \
         ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(chat_from_row).collect())
}

/// Non-closed chats assigned to one operator, newest first.
pub async fn list_operator_chats(
    pool: &PgPool,
    operator_id: i32,
) -> Result<Vec<ChatRecord>, ChatError> {
    let rows = sqlx::query_as::<_, ChatRow>(
        "SELECT id, client_name, client_email, status, assigned_operator_id, \
                created_at, resolution \
         FROM chats \
         WHERE assigned_operator_id = $1 AND status != 'closed' \
         ORDER BY created_at DESC",
    )
    .bind(operator_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(chat_from_row).collect())
}

/// Insert a message row, returning the new message id.
pub async fn insert_message(
    pool: &PgPool,
    chat_id: i32,
    sender_type: &str,
    sender_id: Option<i32>,
    message: &str,
) -> Result<i32, ChatError> {
    let message_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO messages (chat_id, sender_type, sender_id, message) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(chat_id)
    .bind(sender_type)
    .bind(sender_id)
    .bind(message)
    .fetch_one(pool)
    .await?;
    Ok(message_id)
}

/// Mark a chat closed with a resolution. Unconditional write: the row is
/// rewritten even when the chat is already closed, and a missing chat id is
/// not an error.
pub async fn close_chat(pool: &PgPool, chat_id: i32, resolution: &str) -> Result<(), ChatError> {
    sqlx::query(
        "UPDATE chats \
         SET status = 'closed', resolution = $1, closed_at = now() \
         WHERE id = $2",
    )
    .bind(resolution)
    .bind(chat_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Insert an internal comment row, returning the new comment id.
pub async fn insert_comment(
    pool: &PgPool,
    chat_id: i32,
    user_id: i32,
    comment: &str,
) -> Result<i32, ChatError> {
    let comment_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO chat_comments (chat_id, user_id, comment) \
         VALUES ($1, $2, $3) \
         RETURNING id",
    )
    .bind(chat_id)
    .bind(user_id)
    .bind(comment)
    .fetch_one(pool)
    .await?;
    Ok(comment_id)
}
