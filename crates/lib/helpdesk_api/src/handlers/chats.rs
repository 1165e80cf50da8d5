//! Chat surface request handlers.

use axum::extract::State;
use axum::response::{IntoResponse, Response};

use helpdesk_core::chats;

use crate::AppState;
use crate::error::AppResult;
use crate::extractors::{Json, Query};
use crate::models::{
    ChatAction, ChatCreatedResponse, ChatDetailResponse, ChatDetailView, ChatListQuery,
    ChatListResponse, ChatView, CommentAddedResponse, CommentView, MessageSentResponse,
    MessageView, OkResponse,
};

/// `GET /chats` — chat detail when `chat_id` is given, otherwise a listing:
/// one operator's open chats (`operator_id`), the full archive
/// (`show_archive=true`), or all open chats.
pub async fn chats_index(
    State(state): State<AppState>,
    Query(query): Query<ChatListQuery>,
) -> AppResult<Response> {
    if let Some(chat_id) = query.chat_id {
        let (chat, messages, comments) = chats::chat_detail(&state.pool, chat_id).await?;
        let resp = ChatDetailResponse {
            chat: chat.map(ChatDetailView::from),
            messages: messages.into_iter().map(MessageView::from).collect(),
            comments: comments.into_iter().map(CommentView::from).collect(),
        };
        return Ok(Json(resp).into_response());
    }

    let records = if let Some(operator_id) = query.operator_id {
        chats::operator_chats(&state.pool, operator_id).await?
    } else if query.show_archive.as_deref() == Some("true") {
        chats::all_chats(&state.pool).await?
    } else {
        chats::open_chats(&state.pool).await?
    };

    let resp = ChatListResponse {
        chats: records.into_iter().map(ChatView::from).collect(),
    };
    Ok(Json(resp).into_response())
}

/// `POST /chats` — dispatch on the `action` field of the body.
pub async fn chat_action(
    State(state): State<AppState>,
    Json(action): Json<ChatAction>,
) -> AppResult<Response> {
    match action {
        ChatAction::CreateChat {
            client_name,
            client_email,
        } => {
            let new_chat = chats::create_chat(&state.pool, &client_name, &client_email).await?;
            tracing::info!(
                chat_id = new_chat.chat_id,
                operator_id = new_chat.operator_id,
                "chat created"
            );
            Ok(Json(ChatCreatedResponse {
                success: true,
                chat_id: new_chat.chat_id,
                operator_id: new_chat.operator_id,
            })
            .into_response())
        }
        ChatAction::SendMessage {
            chat_id,
            message,
            sender_type,
            sender_id,
        } => {
            let message_id =
                chats::send_message(&state.pool, chat_id, &sender_type, sender_id, &message)
                    .await?;
            Ok(Json(MessageSentResponse {
                success: true,
                message_id,
            })
            .into_response())
        }
        ChatAction::CloseChat {
            chat_id,
            resolution,
        } => {
            chats::close_chat(&state.pool, chat_id, &resolution).await?;
            tracing::info!(chat_id, "chat closed");
            Ok(Json(OkResponse { success: true }).into_response())
        }
        ChatAction::AddComment {
            chat_id,
            user_id,
            comment,
        } => {
            let comment_id = chats::add_comment(&state.pool, chat_id, user_id, &comment).await?;
            Ok(Json(CommentAddedResponse {
                success: true,
                comment_id,
            })
            .into_response())
        }
    }
}
