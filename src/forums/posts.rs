use std::collections::HashMap;

use axum::{debug_handler, extract::State, http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{types::Json as SqlJson, SqlitePool};
use time::OffsetDateTime;

use crate::{db::{new_id, ForumPost, ForumReply}, AppResult};

/// Forum endpoints answer with `{success, data}` or `{success: false, error}`
/// rather than the plain error body used elsewhere.
fn failure(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({ "success": false, "error": error }))).into_response()
}

#[derive(Serialize)]
pub(crate) struct PostWithAnswers {
    #[serde(flatten)]
    post: ForumPost,
    answers: Vec<ForumReply>,
}

#[derive(Serialize)]
pub(crate) struct Posts {
    success: bool,
    data: Vec<PostWithAnswers>,
}

#[debug_handler]
pub(crate) async fn posts(State(db_pool): State<SqlitePool>) -> AppResult<Json<Posts>> {
    let posts: Vec<ForumPost> = sqlx::query_as("SELECT * FROM forum_posts ORDER BY created_at DESC, rowid DESC")
        .fetch_all(&db_pool)
        .await?;
    let replies: Vec<ForumReply> = sqlx::query_as("SELECT * FROM forum_replies ORDER BY id")
        .fetch_all(&db_pool)
        .await?;

    let mut answers: HashMap<String, Vec<ForumReply>> = HashMap::new();
    for reply in replies {
        answers.entry(reply.post_id.clone()).or_default().push(reply);
    }

    let data = posts
        .into_iter()
        .map(|post| PostWithAnswers {
            answers: answers.remove(&post.id).unwrap_or_default(),
            post,
        })
        .collect();

    Ok(Json(Posts { success: true, data }))
}

#[derive(Deserialize)]
pub(crate) struct NewPostBody {
    #[serde(default)]
    title: String,
    #[serde(default)]
    query: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    identifier: String,
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_owned())
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[debug_handler]
pub(crate) async fn create_post(
    State(db_pool): State<SqlitePool>,
    Json(NewPostBody { title, query, tags, name, identifier }): Json<NewPostBody>,
) -> AppResult<Response> {
    if title.trim().is_empty() || query.trim().is_empty() {
        return Ok(failure(StatusCode::BAD_REQUEST, "Title and query are required."));
    }

    let id = new_id();
    sqlx::query("INSERT INTO forum_posts (id,name,identifier,title,query,tags,created_at) VALUES (?,?,?,?,?,?,?)")
        .bind(&id)
        .bind(&name)
        .bind(&identifier)
        .bind(&title)
        .bind(&query)
        .bind(SqlJson(clean_tags(tags)))
        .bind(OffsetDateTime::now_utc())
        .execute(&db_pool)
        .await?;

    tracing::info!(%id, %name, "forum post created");

    Ok(Json(json!({ "success": true, "id": id })).into_response())
}

#[derive(Deserialize)]
pub(crate) struct ReplyBody {
    #[serde(default)]
    post_id: String,
    #[serde(default)]
    answer: String,
    #[serde(default)]
    name: String,
    identifier: Option<String>,
}

#[debug_handler]
pub(crate) async fn reply(
    State(db_pool): State<SqlitePool>,
    Json(ReplyBody { post_id, answer, name, identifier }): Json<ReplyBody>,
) -> AppResult<Response> {
    if answer.trim().is_empty() {
        return Ok(failure(StatusCode::BAD_REQUEST, "Reply text is required."));
    }

    let exists: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM forum_posts WHERE id=?")
        .bind(&post_id)
        .fetch_optional(&db_pool)
        .await?;
    if exists.is_none() {
        return Ok(failure(StatusCode::NOT_FOUND, "Post not found."));
    }

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO forum_replies (post_id,name,identifier,answer,timestamp) VALUES (?,?,?,?,?) RETURNING id",
    )
        .bind(&post_id)
        .bind(&name)
        .bind(identifier)
        .bind(&answer)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&db_pool)
        .await?;

    tracing::info!(%post_id, id, "forum reply added");

    Ok(Json(json!({ "success": true, "id": id })).into_response())
}
