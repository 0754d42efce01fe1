use axum::{debug_handler, extract::{Query, State}, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::{appresult::OrNotFound, db::Student, users::identifier, AppError, AppResult};

#[derive(Deserialize)]
pub(crate) struct StudentQuery {
    id: Option<String>,
}

#[debug_handler]
pub(crate) async fn student(
    State(db_pool): State<SqlitePool>,
    Query(StudentQuery { id }): Query<StudentQuery>,
) -> AppResult<Json<Student>> {
    let Some(id) = id else {
        return Err(AppError::bad_request("Student ID is required"));
    };

    let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id=?")
        .bind(&id)
        .fetch_optional(&db_pool)
        .await
        .or_not_found(|| format!("Student with id {id} not found."))?;

    Ok(Json(student))
}

#[derive(Deserialize)]
pub(crate) struct UpdateStudentBody {
    studentid: Option<String>,
    branch: Option<String>,
    cgpa: Option<Value>,
    batch: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatedStudent {
    message: &'static str,
    updated_student: Student,
}

/// CGPA arrives either as a JSON number or as a numeric string.
fn parse_cgpa(cgpa: &Value) -> Option<f64> {
    match cgpa {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
        _ => None,
    }
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[debug_handler]
pub(crate) async fn update_student(
    State(db_pool): State<SqlitePool>,
    Json(UpdateStudentBody { studentid, branch, cgpa, batch }): Json<UpdateStudentBody>,
) -> AppResult<Json<UpdatedStudent>> {
    let (Some(studentid), Some(branch), Some(cgpa), Some(batch)) = (
        studentid.filter(|s| !s.is_empty()),
        branch.filter(|s| !s.is_empty()),
        cgpa.filter(|v| !v.is_null()),
        batch.as_ref().and_then(value_to_text),
    ) else {
        return Err(AppError::bad_request("Missing required fields: studentid, branch, cgpa, batch"));
    };

    let Some(cgpa) = parse_cgpa(&cgpa) else {
        return Err(AppError::bad_request("Invalid CGPA format. Must be a number."));
    };

    let updated_student = sqlx::query_as::<_, Student>(
        "UPDATE students SET branch=?, cgpa=?, identifier=? WHERE id=? RETURNING *",
    )
        .bind(&branch)
        .bind(cgpa)
        .bind(identifier::identifier(&batch, &branch))
        .bind(&studentid)
        .fetch_optional(&db_pool)
        .await
        .or_not_found(|| format!("Student with id {studentid} not found."))?;

    tracing::info!(%studentid, "student profile updated");

    Ok(Json(UpdatedStudent {
        message: "Student data updated successfully",
        updated_student,
    }))
}
