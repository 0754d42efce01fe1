use axum::{debug_handler, extract::{Path, State}, Json};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tokio::sync::broadcast;

use crate::{db::ChatMessage, AppError, AppResult, AppState};

use super::store;

#[derive(Serialize)]
pub(crate) struct Messages {
    messages: Vec<ChatMessage>,
}

/// Unknown rooms read as empty rather than as an error.
#[debug_handler]
pub(crate) async fn room_messages(
    State(db_pool): State<SqlitePool>,
    Path(room_id): Path<String>,
) -> AppResult<Json<Messages>> {
    let messages = match store::messages(&db_pool, &room_id).await? {
        Some(messages) => messages,
        None => {
            tracing::debug!(%room_id, "history requested for unknown room");
            Vec::new()
        }
    };
    Ok(Json(Messages { messages }))
}

#[derive(Deserialize)]
pub(crate) struct PostMessageBody {
    /// sender id
    #[serde(alias = "sender_id")]
    id: Option<String>,
    content: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct PostedMessage {
    message: ChatMessage,
    status: &'static str,
}

#[debug_handler(state = AppState)]
pub(crate) async fn post_message(
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<ChatMessage>>,
    Path(room_id): Path<String>,
    Json(PostMessageBody { id, content }): Json<PostMessageBody>,
) -> AppResult<Json<PostedMessage>> {
    let (Some(sender_id), Some(content)) = (id.filter(|s| !s.is_empty()), content.filter(|s| !s.is_empty())) else {
        return Err(AppError::bad_request("Missing fields"));
    };

    let message = ChatMessage {
        roomid: room_id,
        sender_id,
        content,
        timestamp: OffsetDateTime::now_utc(),
    };

    if !store::append_message(&db_pool, &message).await? {
        return Err(AppError::not_found(format!("Room {} not found", message.roomid)));
    }
    // no subscribers is fine
    let _ = tx.send(message.clone());

    Ok(Json(PostedMessage { message, status: "success" }))
}
