use axum::{debug_handler, extract::{Query, State}, Json};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use time::OffsetDateTime;

use crate::{db::RequestStatus, humanize, AppError, AppResult};

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: String,
    student_id: String,
    alumnus_id: String,
    subject: String,
    details: String,
    status: RequestStatus,
    created_at: OffsetDateTime,
    name: Option<String>,
    identifier: Option<String>,
    cgpa: Option<f64>,
}

/// A request joined with the requesting student's profile.
#[derive(Serialize)]
pub(crate) struct RequestView {
    id: String,
    student_id: String,
    alumnus_id: String,
    subject: String,
    details: String,
    status: RequestStatus,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(rename = "relativeTime")]
    relative_time: String,
    name: Option<String>,
    identifier: Option<String>,
    cgpa: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RequestList {
    requests: Vec<RequestView>,
    total_requests: usize,
}

async fn load(
    db_pool: &SqlitePool,
    alumnus_id: Option<String>,
    statuses: &[RequestStatus],
) -> AppResult<RequestList> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT r.id, r.student_id, r.alumnus_id, r.subject, r.details, r.status, r.created_at,
                s.name, s.identifier, s.cgpa
         FROM requests r LEFT JOIN students s ON s.id = r.student_id
         WHERE r.status IN (",
    );
    let mut in_list = qb.separated(", ");
    for status in statuses {
        in_list.push_bind(*status);
    }
    qb.push(")");
    if let Some(alumnus_id) = alumnus_id {
        qb.push(" AND r.alumnus_id = ").push_bind(alumnus_id);
    }
    qb.push(" ORDER BY r.created_at DESC");

    let rows: Vec<RequestRow> = qb.build_query_as().fetch_all(db_pool).await?;

    let now = OffsetDateTime::now_utc();
    let requests: Vec<RequestView> = rows
        .into_iter()
        .map(|row| RequestView {
            relative_time: humanize::relative_time(row.created_at, now),
            id: row.id,
            student_id: row.student_id,
            alumnus_id: row.alumnus_id,
            subject: row.subject,
            details: row.details,
            status: row.status,
            created_at: row.created_at,
            name: row.name,
            identifier: row.identifier,
            cgpa: row.cgpa,
        })
        .collect();

    Ok(RequestList { total_requests: requests.len(), requests })
}

#[derive(Deserialize)]
pub(crate) struct AlumnusFilter {
    #[serde(alias = "consultant_id")]
    alumnus_id: Option<String>,
}

#[debug_handler]
pub(crate) async fn pending(
    State(db_pool): State<SqlitePool>,
    Query(AlumnusFilter { alumnus_id }): Query<AlumnusFilter>,
) -> AppResult<Json<RequestList>> {
    let alumnus_id = alumnus_id.filter(|id| !id.is_empty());
    Ok(Json(load(&db_pool, alumnus_id, &[RequestStatus::Pending]).await?))
}

#[debug_handler]
pub(crate) async fn past(
    State(db_pool): State<SqlitePool>,
    Query(AlumnusFilter { alumnus_id }): Query<AlumnusFilter>,
) -> AppResult<Json<RequestList>> {
    let Some(alumnus_id) = alumnus_id.filter(|id| !id.is_empty()) else {
        return Err(AppError::bad_request("Missing alumnus_id"));
    };
    Ok(Json(load(&db_pool, Some(alumnus_id), &[RequestStatus::Accepted, RequestStatus::Declined]).await?))
}
