mod profile;

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/students", get(profile::student).patch(profile::update_student))
}
