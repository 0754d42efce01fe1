use axum::{debug_handler, extract::State, Json};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    appresult::OrNotFound,
    chats::store,
    db::RequestStatus,
    mail::{self, templates, SharedMailer},
    AppError, AppResult, AppState,
};

#[derive(Deserialize)]
pub(crate) struct RespondBody {
    id: Option<String>,
    status: Option<String>,
    alumnus_id: Option<String>,
    student_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Responded {
    message: String,
    chat_room_id: Option<String>,
}

/// Accepts or declines a request. Acceptance opens (or reuses) the chat room
/// for the pair. The status update, room creation and email are independent
/// steps; a later failure does not undo an earlier one.
#[debug_handler(state = AppState)]
pub(crate) async fn respond(
    State(db_pool): State<SqlitePool>,
    State(mailer): State<SharedMailer>,
    Json(RespondBody { id, status, alumnus_id, student_id }): Json<RespondBody>,
) -> AppResult<Json<Responded>> {
    let status = match status.as_deref() {
        Some("accepted") => Some(RequestStatus::Accepted),
        Some("declined") => Some(RequestStatus::Declined),
        _ => None,
    };
    let (Some(id), Some(status), Some(alumnus_id)) = (
        id.filter(|s| !s.is_empty()),
        status,
        alumnus_id.filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::bad_request("Invalid request data"));
    };
    let accepted = status == RequestStatus::Accepted;
    let student_id = student_id.filter(|s| !s.is_empty());
    if accepted && student_id.is_none() {
        return Err(AppError::bad_request("Student ID is missing"));
    }

    let (subject, request_student_id): (String, String) =
        sqlx::query_as("UPDATE requests SET status=? WHERE id=? RETURNING subject,student_id")
            .bind(status)
            .bind(&id)
            .fetch_optional(&db_pool)
            .await
            .or_not_found(|| format!("Request {id} not found"))?;

    let student_id = student_id.unwrap_or(request_student_id);

    let chat_room_id = if accepted {
        Some(store::find_or_create_room(&db_pool, &student_id, &alumnus_id).await?)
    } else {
        None
    };

    tracing::info!(%id, ?status, room = ?chat_room_id, "mentorship request answered");

    let student_email: Option<(String,)> = sqlx::query_as("SELECT email FROM students WHERE id=?")
        .bind(&student_id)
        .fetch_optional(&db_pool)
        .await?;
    let alumnus_name: Option<(String,)> = sqlx::query_as("SELECT name FROM alumni WHERE id=?")
        .bind(&alumnus_id)
        .fetch_optional(&db_pool)
        .await?;
    if let (Some((student_email,)), Some((alumnus_name,))) = (student_email, alumnus_name) {
        mail::notify(
            mailer.as_ref(),
            templates::request_answered(student_email, accepted, &alumnus_name, &subject),
        ).await;
    }

    let status = if accepted { "accepted" } else { "declined" };
    Ok(Json(Responded {
        message: format!("Request {id} updated to {status}"),
        chat_room_id,
    }))
}
