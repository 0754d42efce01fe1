mod create;
mod list;
mod respond;

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat-requests", get(list::pending).post(create::create_request).patch(respond::respond))
        .route("/chat-requests/past", get(list::past))
}
