//! Chat lifecycle, message exchange, and internal comments.

pub mod queries;

use sqlx::PgPool;
use thiserror::Error;

use crate::models::chat::{ChatDetail, ChatRecord, CommentRecord, MessageRecord, NewChat};

/// Errors from chat operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Create a chat, auto-assigning a random online operator when one exists.
///
/// The new chat starts `active` when an operator was assigned, `waiting`
/// otherwise. The operator pick and the insert are two sequential statements
/// with no row lock: concurrent calls may assign the same operator.
pub async fn create_chat(
    pool: &PgPool,
    client_name: &str,
    client_email: &str,
) -> Result<NewChat, ChatError> {
    let operator_id = queries::pick_online_operator(pool).await?;
    let status = if operator_id.is_some() {
        "active"
    } else {
        "waiting"
    };
    let chat_id =
        queries::insert_chat(pool, client_name, client_email, operator_id, status).await?;
    Ok(NewChat {
        chat_id,
        operator_id,
    })
}

/// Append a message to a chat. Returns the new message id.
pub async fn send_message(
    pool: &PgPool,
    chat_id: i32,
    sender_type: &str,
    sender_id: Option<i32>,
    message: &str,
) -> Result<i32, ChatError> {
    let message_id =
        queries::insert_message(pool, chat_id, sender_type, sender_id, message).await?;
    Ok(message_id)
}

/// Close a chat: status becomes `closed`, the resolution text and close time
/// are recorded. Re-closing an already-closed chat rewrites the same fields;
/// there is no reopen operation.
pub async fn close_chat(pool: &PgPool, chat_id: i32, resolution: &str) -> Result<(), ChatError> {
    queries::close_chat(pool, chat_id, resolution).await
}

/// Attach an internal comment to a chat. Returns the new comment id.
pub async fn add_comment(
    pool: &PgPool,
    chat_id: i32,
    user_id: i32,
    comment: &str,
) -> Result<i32, ChatError> {
    let comment_id = queries::insert_comment(pool, chat_id, user_id, comment).await?;
    Ok(comment_id)
}

/// Fetch one chat with its messages and comments, both ordered ascending by
/// creation time. The chat is `None` when no row matches; the message and
/// comment lists are empty in that case.
pub async fn chat_detail(
    pool: &PgPool,
    chat_id: i32,
) -> Result<(Option<ChatDetail>, Vec<MessageRecord>, Vec<CommentRecord>), ChatError> {
    let chat = queries::get_chat(pool, chat_id).await?;
    let messages = queries::list_messages(pool, chat_id).await?;
    let comments = queries::list_comments(pool, chat_id).await?;
    Ok((chat, messages, comments))
}

/// All non-closed chats, newest first.
pub async fn open_chats(pool: &PgPool) -> Result<Vec<ChatRecord>, ChatError> {
    queries::list_open_chats(pool).await
}

/// Every chat regardless of status, newest first. This is the archive view.
pub async fn all_chats(pool: &PgPool) -> Result<Vec<ChatRecord>, ChatError> {
    queries::list_all_chats(pool).await
}

/// Non-closed chats assigned to one operator, newest first.
pub async fn operator_chats(
    pool: &PgPool,
    operator_id: i32,
) -> Result<Vec<ChatRecord>, ChatError> {
    queries::list_operator_chats(pool, operator_id).await
}
