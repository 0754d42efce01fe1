use axum::{debug_handler, Json};
use serde::Serialize;
use tower_sessions::Session;

use crate::{db::Role, session::{ROLE, USER_ID}, AppError, AppResult};

#[derive(Serialize)]
pub(crate) struct Me {
    user_id: String,
    role: Role,
}

#[debug_handler]
pub(crate) async fn me(session: Session) -> AppResult<Json<Me>> {
    let (Some(user_id), Some(role)) = (session.get::<String>(USER_ID).await?, session.get::<Role>(ROLE).await?) else {
        return Err(AppError::Unauthorized);
    };
    Ok(Json(Me { user_id, role }))
}
