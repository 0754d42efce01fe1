use serde::{Deserialize, Serialize};
use sqlx::{migrate::Migrator, sqlite::SqlitePoolOptions, types::Json, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::settings::DatabaseSettings;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.url)
        .await?;
    MIGRATOR.run(&db_pool).await?;
    Ok(db_pool)
}

pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Alumnus,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Alumnus => "alumnus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Student {
    pub id: String,
    pub email: String,
    pub name: String,
    pub identifier: String,
    pub branch: Option<String>,
    pub cgpa: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Alumnus {
    pub id: String,
    pub email: String,
    pub name: String,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub areas_of_expertise: Json<Vec<String>>,
    pub graduation_year: Option<i64>,
    pub linkedin_profile_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MentorshipRequest {
    pub id: String,
    pub student_id: String,
    pub alumnus_id: String,
    pub subject: String,
    pub details: String,
    pub status: RequestStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// One entry of a room's append-only message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub roomid: String,
    /// sender; written as `id`, older logs used `sender_id`
    #[serde(rename = "id", alias = "sender_id")]
    pub sender_id: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ChatRoom {
    pub roomid: String,
    pub student_id: String,
    pub alumnus_id: String,
    pub messages: Json<Vec<ChatMessage>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ForumPost {
    pub id: String,
    pub name: String,
    pub identifier: String,
    pub title: String,
    pub query: String,
    pub tags: Json<Vec<String>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ForumReply {
    pub id: i64,
    pub post_id: String,
    pub name: String,
    pub identifier: Option<String>,
    pub answer: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}
