mod cache;
pub mod identifier;
mod sync;

use axum::{routing::post, Router};
use serde::Serialize;
use sqlx::{types::Json, SqlitePool};
use time::OffsetDateTime;

use crate::{db::{new_id, Role}, AppResult, AppState};

pub use cache::UserCache;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user-sync", post(sync::user_sync))
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncedStudent {
    pub id: String,
    pub identifier: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncedAlumnus {
    pub id: String,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub areas_of_expertise: Vec<String>,
    pub role: Role,
    #[serde(rename = "isNewUser")]
    pub is_new_user: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SyncedUser {
    Student(SyncedStudent),
    Alumnus(SyncedAlumnus),
}

impl SyncedUser {
    pub fn id(&self) -> &str {
        match self {
            SyncedUser::Student(s) => &s.id,
            SyncedUser::Alumnus(a) => &a.id,
        }
    }
}

/// Finds the user with this email in the table for `role`, creating them on
/// first sight.
pub async fn sync_user(db_pool: &SqlitePool, email: &str, name: &str, role: Role) -> AppResult<SyncedUser> {
    match role {
        Role::Student => sync_student(db_pool, email, name).await.map(SyncedUser::Student),
        Role::Alumnus => sync_alumnus(db_pool, email, name).await.map(SyncedUser::Alumnus),
    }
}

async fn sync_student(db_pool: &SqlitePool, email: &str, name: &str) -> AppResult<SyncedStudent> {
    let inserted = sqlx::query(
        "INSERT INTO students (id,email,name,identifier,created_at) VALUES (?,?,?,?,?)
         ON CONFLICT(email) DO NOTHING",
    )
        .bind(new_id())
        .bind(email)
        .bind(name)
        .bind(identifier::provisional_identifier(email))
        .bind(OffsetDateTime::now_utc())
        .execute(db_pool)
        .await?
        .rows_affected();

    let (id, identifier): (String, String) = sqlx::query_as("SELECT id,identifier FROM students WHERE email=?")
        .bind(email)
        .fetch_one(db_pool)
        .await?;

    if inserted > 0 {
        tracing::info!(%id, %email, "new student");
    }

    Ok(SyncedStudent { id, identifier, role: Role::Student })
}

async fn sync_alumnus(db_pool: &SqlitePool, email: &str, name: &str) -> AppResult<SyncedAlumnus> {
    let inserted = sqlx::query(
        "INSERT INTO alumni (id,email,name,created_at) VALUES (?,?,?,?)
         ON CONFLICT(email) DO NOTHING",
    )
        .bind(new_id())
        .bind(email)
        .bind(name)
        .bind(OffsetDateTime::now_utc())
        .execute(db_pool)
        .await?
        .rows_affected();

    let (id, company, job_title, Json(areas_of_expertise)): (String, Option<String>, Option<String>, Json<Vec<String>>) =
        sqlx::query_as("SELECT id,company,job_title,areas_of_expertise FROM alumni WHERE email=?")
            .bind(email)
            .fetch_one(db_pool)
            .await?;

    if inserted > 0 {
        tracing::info!(%id, %email, "new alumnus");
    }

    Ok(SyncedAlumnus {
        id,
        company,
        job_title,
        areas_of_expertise,
        role: Role::Alumnus,
        is_new_user: inserted > 0,
    })
}
