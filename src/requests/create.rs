use axum::{debug_handler, extract::State, Json};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::{db::{new_id, MentorshipRequest, RequestStatus}, mail::{self, templates, SharedMailer}, AppError, AppResult, AppState};

#[derive(Deserialize)]
pub(crate) struct NewRequestBody {
    student_id: Option<String>,
    alumnus_id: Option<String>,
    subject: Option<String>,
    details: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct CreatedRequest {
    message: &'static str,
    request: MentorshipRequest,
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_request(
    State(db_pool): State<SqlitePool>,
    State(mailer): State<SharedMailer>,
    Json(body): Json<NewRequestBody>,
) -> AppResult<Json<CreatedRequest>> {
    let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(student_id), Some(alumnus_id), Some(subject), Some(details)) = (
        present(body.student_id),
        present(body.alumnus_id),
        present(body.subject),
        present(body.details),
    ) else {
        return Err(AppError::bad_request("Missing required fields"));
    };

    let request = sqlx::query_as::<_, MentorshipRequest>(
        "INSERT INTO requests (id,student_id,alumnus_id,subject,details,status,created_at)
         VALUES (?,?,?,?,?,?,?) RETURNING *",
    )
        .bind(new_id())
        .bind(&student_id)
        .bind(&alumnus_id)
        .bind(&subject)
        .bind(&details)
        .bind(RequestStatus::Pending)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&db_pool)
        .await?;

    tracing::info!(id = %request.id, %student_id, %alumnus_id, "mentorship request created");

    let alumnus_email: Option<(String,)> = sqlx::query_as("SELECT email FROM alumni WHERE id=?")
        .bind(&alumnus_id)
        .fetch_optional(&db_pool)
        .await?;
    if let Some((alumnus_email,)) = alumnus_email {
        let student_name: Option<(String,)> = sqlx::query_as("SELECT name FROM students WHERE id=?")
            .bind(&student_id)
            .fetch_optional(&db_pool)
            .await?;
        let student_name = student_name.map(|(n,)| n).unwrap_or_else(|| "A student".to_owned());

        mail::notify(
            mailer.as_ref(),
            templates::new_request(alumnus_email, &student_name, &subject, &details),
        ).await;
    }

    Ok(Json(CreatedRequest {
        message: "Request created successfully",
        request,
    }))
}
