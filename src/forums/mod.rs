mod posts;

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/forums", get(posts::posts).post(posts::create_post).patch(posts::reply))
}
