use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{db::Role, AppError, AppResult, AppState};

use super::{sync_user, SyncedUser, UserCache};

#[derive(Deserialize)]
pub(crate) struct UserSyncBody {
    email: Option<String>,
    name: Option<String>,
    role: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn user_sync(
    State(db_pool): State<SqlitePool>,
    State(cache): State<UserCache>,
    Json(UserSyncBody { email, name, role }): Json<UserSyncBody>,
) -> AppResult<Json<SyncedUser>> {
    let (Some(email), Some(name)) = (email.filter(|s| !s.is_empty()), name.filter(|s| !s.is_empty())) else {
        return Err(AppError::bad_request("Email and name are required"));
    };

    let key = UserCache::key(&email, role.as_deref().unwrap_or_default());
    if let Some(user) = cache.get(&key) {
        return Ok(Json(user));
    }

    let role = match role.as_deref() {
        None | Some("") | Some("student") => Role::Student,
        Some("alumnus") => Role::Alumnus,
        Some(_) => {
            return Err(AppError::bad_request(r#"Invalid role. Must be either "student" or "alumnus""#));
        }
    };

    let user = sync_user(&db_pool, &email, &name, role).await?;
    cache.insert(key, user.clone());

    Ok(Json(user))
}
