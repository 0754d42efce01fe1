mod history;
mod messages;
pub mod store;
mod ws;

use axum::{routing::get, Router};

use crate::AppState;

pub use ws::{ClientEvent, ServerEvent};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chats/user/{user_id}", get(history::rooms_for_user))
        .route("/chats/{room_id}", get(messages::room_messages))
        .route("/chats/{room_id}/messages", get(messages::room_messages).post(messages::post_message))
        .route("/chats/{room_id}/{user_id}", get(history::counterpart))
        .route("/socket", get(ws::socket))
}
