use sqlx::{types::Json, SqlitePool};
use time::OffsetDateTime;

use crate::db::{new_id, ChatMessage};

/// Returns the room shared by this student and alumnus, creating it if they
/// have none yet. The unique (student_id, alumnus_id) constraint keeps
/// concurrent acceptances from producing two rooms.
pub async fn find_or_create_room(
    db_pool: &SqlitePool,
    student_id: &str,
    alumnus_id: &str,
) -> Result<String, sqlx::Error> {
    let created = sqlx::query(
        "INSERT INTO chats (roomid,student_id,alumnus_id,messages,created_at) VALUES (?,?,?,'[]',?)
         ON CONFLICT(student_id,alumnus_id) DO NOTHING",
    )
        .bind(new_id())
        .bind(student_id)
        .bind(alumnus_id)
        .bind(OffsetDateTime::now_utc())
        .execute(db_pool)
        .await?
        .rows_affected();

    let (roomid,): (String,) = sqlx::query_as("SELECT roomid FROM chats WHERE student_id=? AND alumnus_id=?")
        .bind(student_id)
        .bind(alumnus_id)
        .fetch_one(db_pool)
        .await?;

    if created > 0 {
        tracing::info!(%roomid, %student_id, %alumnus_id, "chat room created");
    }

    Ok(roomid)
}

/// Appends to the room's message log in one statement. Returns false when
/// the room does not exist.
pub async fn append_message(db_pool: &SqlitePool, message: &ChatMessage) -> Result<bool, sqlx::Error> {
    let appended = sqlx::query("UPDATE chats SET messages = json_insert(messages, '$[#]', json(?)) WHERE roomid=?")
        .bind(Json(message))
        .bind(&message.roomid)
        .execute(db_pool)
        .await?
        .rows_affected();

    Ok(appended > 0)
}

/// The room's messages in append order, or `None` for an unknown room.
pub async fn messages(db_pool: &SqlitePool, roomid: &str) -> Result<Option<Vec<ChatMessage>>, sqlx::Error> {
    let messages: Option<(Json<Vec<ChatMessage>>,)> = sqlx::query_as("SELECT messages FROM chats WHERE roomid=?")
        .bind(roomid)
        .fetch_optional(db_pool)
        .await?;

    Ok(messages.map(|(Json(messages),)| messages))
}
