use std::collections::HashSet;

use axum::{
    debug_handler,
    extract::{ws::{Message, WebSocket}, State, WebSocketUpgrade},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::{db::ChatMessage, AppState};

use super::store;

/// `{"event": "...", "data": {...}}` frames sent by the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom(RoomRef),
    LeaveRoom(RoomRef),
    SendMessage(NewMessage),
    ReconnectRooms {
        #[serde(rename = "userId", default)]
        user_id: Option<String>,
        rooms: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomRef {
    pub roomid: String,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub roomid: String,
    #[serde(alias = "id")]
    pub sender_id: String,
    pub content: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ReceiveMessage(ChatMessage),
    Error { message: String },
}

#[derive(Debug, thiserror::Error)]
enum SocketError {
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("room {0} does not exist")]
    UnknownRoom(String),
    #[error("failed to save message: {0}")]
    Persist(#[from] sqlx::Error),
}

#[debug_handler(state = AppState)]
pub(crate) async fn socket(
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<ChatMessage>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(async move |socket| serve(socket, db_pool, tx).await)
}

async fn serve(mut socket: WebSocket, db_pool: SqlitePool, tx: broadcast::Sender<ChatMessage>) {
    let conn_id = Uuid::now_v7();
    tracing::info!(%conn_id, "socket connected");

    let mut rx = tx.subscribe();
    let mut rooms = HashSet::new();

    let reason = loop {
        tokio::select! {
            incoming = socket.recv() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break "closed by client",
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => {
                        tracing::debug!(%conn_id, error = %err, "socket read failed");
                        break "read error";
                    }
                };

                if let Err(err) = handle_event(text.as_str(), &mut rooms, &db_pool, &tx).await {
                    tracing::warn!(%conn_id, error = %err, "socket event failed");
                    let event = ServerEvent::Error { message: err.to_string() };
                    if send_event(&mut socket, &event).await.is_err() {
                        break "write error";
                    }
                }
            }
            delivered = rx.recv() => match delivered {
                Ok(message) if rooms.contains(&message.roomid) => {
                    if send_event(&mut socket, &ServerEvent::ReceiveMessage(message)).await.is_err() {
                        break "write error";
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(%conn_id, skipped, "socket fell behind, messages dropped");
                }
                Err(RecvError::Closed) => break "server shutting down",
            }
        }
    };

    tracing::info!(%conn_id, reason, "socket disconnected");
}

async fn handle_event(
    text: &str,
    rooms: &mut HashSet<String>,
    db_pool: &SqlitePool,
    tx: &broadcast::Sender<ChatMessage>,
) -> Result<(), SocketError> {
    match serde_json::from_str(text)? {
        ClientEvent::JoinRoom(RoomRef { roomid, .. }) => {
            rooms.insert(roomid);
        }
        ClientEvent::LeaveRoom(RoomRef { roomid, .. }) => {
            rooms.remove(&roomid);
        }
        ClientEvent::ReconnectRooms { rooms: rejoin, .. } => {
            rooms.extend(rejoin);
        }
        ClientEvent::SendMessage(NewMessage { roomid, sender_id, content, timestamp }) => {
            let message = ChatMessage {
                roomid,
                sender_id,
                content,
                timestamp: timestamp.unwrap_or_else(OffsetDateTime::now_utc),
            };
            if !store::append_message(db_pool, &message).await? {
                return Err(SocketError::UnknownRoom(message.roomid));
            }
            let _ = tx.send(message);
        }
    }
    Ok(())
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}
