use axum::{debug_handler, extract::{Path, State}, Json};
use serde::Serialize;
use sqlx::{types::Json as SqlJson, SqlitePool};
use time::OffsetDateTime;

use crate::{appresult::OrNotFound, db::ChatMessage, AppResult};

#[derive(sqlx::FromRow)]
struct RoomRow {
    roomid: String,
    alumnus_id: String,
    student_id: String,
    messages: SqlJson<Vec<ChatMessage>>,
    created_at: OffsetDateTime,
    student_name: Option<String>,
    student_identifier: Option<String>,
    alumnus_name: Option<String>,
    alumnus_company: Option<String>,
}

/// A room as seen by one participant: `name`/`identifier` describe the
/// other side.
#[derive(Serialize)]
pub(crate) struct RoomSummary {
    roomid: String,
    alumnus_id: String,
    student_id: String,
    name: String,
    identifier: String,
    messages: Vec<ChatMessage>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

#[derive(Serialize)]
pub(crate) struct UserRooms {
    rooms: Vec<RoomSummary>,
}

#[debug_handler]
pub(crate) async fn rooms_for_user(
    State(db_pool): State<SqlitePool>,
    Path(user_id): Path<String>,
) -> AppResult<Json<UserRooms>> {
    let rows: Vec<RoomRow> = sqlx::query_as(
        "SELECT c.roomid, c.alumnus_id, c.student_id, c.messages, c.created_at,
                s.name AS student_name, s.identifier AS student_identifier,
                a.name AS alumnus_name, a.company AS alumnus_company
         FROM chats c
         LEFT JOIN students s ON s.id = c.student_id
         LEFT JOIN alumni a ON a.id = c.alumnus_id
         WHERE c.alumnus_id = ? OR c.student_id = ?
         ORDER BY c.created_at DESC",
    )
        .bind(&user_id)
        .bind(&user_id)
        .fetch_all(&db_pool)
        .await?;

    let rooms = rows
        .into_iter()
        .map(|row| {
            let (name, identifier) = if row.alumnus_id == user_id {
                (row.student_name, row.student_identifier)
            } else {
                (row.alumnus_name, row.alumnus_company)
            };
            RoomSummary {
                roomid: row.roomid,
                alumnus_id: row.alumnus_id,
                student_id: row.student_id,
                name: name.unwrap_or_else(|| "Unknown".to_owned()),
                identifier: identifier.unwrap_or_default(),
                messages: row.messages.0,
                created_at: row.created_at,
            }
        })
        .collect();

    Ok(Json(UserRooms { rooms }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Counterpart {
    user_name: String,
    info: Option<String>,
}

#[debug_handler]
pub(crate) async fn counterpart(
    State(db_pool): State<SqlitePool>,
    Path((room_id, user_id)): Path<(String, String)>,
) -> AppResult<Json<Counterpart>> {
    let (alumnus_id, student_id): (String, String) =
        sqlx::query_as("SELECT alumnus_id,student_id FROM chats WHERE roomid=?")
            .bind(&room_id)
            .fetch_optional(&db_pool)
            .await
            .or_not_found(|| "Room not found".to_owned())?;

    let (user_name, info): (String, Option<String>) = if user_id == alumnus_id {
        sqlx::query_as("SELECT name,identifier FROM students WHERE id=?")
            .bind(&student_id)
            .fetch_optional(&db_pool)
            .await
            .or_not_found(|| "User not found".to_owned())?
    } else {
        sqlx::query_as("SELECT name,company FROM alumni WHERE id=?")
            .bind(&alumnus_id)
            .fetch_optional(&db_pool)
            .await
            .or_not_found(|| "User not found".to_owned())?
    };

    Ok(Json(Counterpart { user_name, info }))
}
