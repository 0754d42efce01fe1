use axum::{debug_handler, extract::{Query, State}, response::{IntoResponse, Response}, Json};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json as SqlJson, QueryBuilder, Sqlite, SqlitePool};
use time::OffsetDateTime;

use crate::{appresult::OrNotFound, db::{new_id, Alumnus}, AppError, AppResult};

use super::{filter_value, push_has_expertise};

#[derive(Deserialize)]
pub(crate) struct AlumniQuery {
    id: Option<String>,
    domain: Option<String>,
    role: Option<String>,
}

#[debug_handler]
pub(crate) async fn alumni(
    State(db_pool): State<SqlitePool>,
    Query(AlumniQuery { id, domain, role }): Query<AlumniQuery>,
) -> AppResult<Response> {
    if let Some(id) = id {
        let alumnus = sqlx::query_as::<_, Alumnus>("SELECT * FROM alumni WHERE id=?")
            .bind(&id)
            .fetch_optional(&db_pool)
            .await
            .or_not_found(|| format!("Alumnus with id {id} not found."))?;
        return Ok(Json(alumnus).into_response());
    }

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM alumni WHERE 1=1");
    if let Some(domain) = filter_value(domain) {
        push_has_expertise(&mut qb, domain);
    }
    if let Some(role) = filter_value(role) {
        qb.push(" AND job_title = ").push_bind(role);
    }
    qb.push(" ORDER BY name");

    let alumni: Vec<Alumnus> = qb.build_query_as().fetch_all(&db_pool).await?;
    Ok(Json(alumni).into_response())
}

/// Accepts both the `job_title`/`areas_of_expertise` and the older
/// `role`/`domain` field names.
#[derive(Deserialize)]
pub(crate) struct AlumnusBody {
    id: Option<String>,
    name: Option<String>,
    email: Option<String>,
    company: Option<String>,
    #[serde(alias = "role")]
    job_title: Option<String>,
    domain: Option<String>,
    areas_of_expertise: Option<Vec<String>>,
    graduation_year: Option<i64>,
    linkedin_profile_url: Option<String>,
}

impl AlumnusBody {
    fn expertise(&mut self) -> Option<Vec<String>> {
        let tags = match (self.areas_of_expertise.take(), self.domain.take()) {
            (Some(tags), _) => tags,
            (None, Some(domain)) => vec![domain],
            (None, None) => return None,
        };
        Some(
            tags.into_iter()
                .map(|t| t.trim().to_owned())
                .filter(|t| !t.is_empty())
                .collect(),
        )
    }
}

#[derive(Serialize)]
pub(crate) struct AlumnusResponse {
    message: &'static str,
    alumni: Alumnus,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[debug_handler]
pub(crate) async fn create_alumnus(
    State(db_pool): State<SqlitePool>,
    Json(mut body): Json<AlumnusBody>,
) -> AppResult<Json<AlumnusResponse>> {
    let expertise = body.expertise().unwrap_or_default();
    let (Some(name), Some(email)) = (non_empty(body.name), non_empty(body.email)) else {
        return Err(AppError::bad_request("Name and email are required"));
    };

    let alumnus = sqlx::query_as::<_, Alumnus>(
        "INSERT INTO alumni (id,email,name,company,job_title,areas_of_expertise,graduation_year,linkedin_profile_url,created_at)
         VALUES (?,?,?,?,?,?,?,?,?) RETURNING *",
    )
        .bind(new_id())
        .bind(&email)
        .bind(&name)
        .bind(non_empty(body.company))
        .bind(non_empty(body.job_title))
        .bind(SqlJson(expertise))
        .bind(body.graduation_year)
        .bind(non_empty(body.linkedin_profile_url))
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&db_pool)
        .await?;

    tracing::info!(id = %alumnus.id, %email, "alumni profile created");

    Ok(Json(AlumnusResponse {
        message: "Alumni profile created successfully",
        alumni: alumnus,
    }))
}

#[debug_handler]
pub(crate) async fn update_alumnus(
    State(db_pool): State<SqlitePool>,
    Json(mut body): Json<AlumnusBody>,
) -> AppResult<Json<AlumnusResponse>> {
    let expertise = body.expertise().filter(|tags| !tags.is_empty());
    let Some(id) = non_empty(body.id) else {
        return Err(AppError::bad_request("Alumni ID is required"));
    };

    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE alumni SET ");
    let mut fields = qb.separated(", ");
    // keeps the statement valid when nothing else is set
    fields.push("id = id");
    if let Some(name) = non_empty(body.name) {
        fields.push("name = ").push_bind_unseparated(name);
    }
    if let Some(company) = non_empty(body.company) {
        fields.push("company = ").push_bind_unseparated(company);
    }
    if let Some(job_title) = non_empty(body.job_title) {
        fields.push("job_title = ").push_bind_unseparated(job_title);
    }
    if let Some(expertise) = expertise {
        fields.push("areas_of_expertise = ").push_bind_unseparated(SqlJson(expertise));
    }
    if let Some(year) = body.graduation_year.filter(|y| *y != 0) {
        fields.push("graduation_year = ").push_bind_unseparated(year);
    }
    if let Some(url) = non_empty(body.linkedin_profile_url) {
        fields.push("linkedin_profile_url = ").push_bind_unseparated(url);
    }
    qb.push(" WHERE id = ").push_bind(id.clone()).push(" RETURNING *");

    let alumnus = qb
        .build_query_as::<Alumnus>()
        .fetch_optional(&db_pool)
        .await
        .or_not_found(|| format!("Alumnus with id {id} not found."))?;

    tracing::info!(%id, "alumni profile updated");

    Ok(Json(AlumnusResponse {
        message: "Alumni profile updated successfully",
        alumni: alumnus,
    }))
}
