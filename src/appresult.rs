use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Unauthorized,
    Internal(anyhow::Error),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(anyhow::Error::msg(msg.into()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(error) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": error })),
            ).into_response(),
            AppError::NotFound(error) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": error })),
            ).into_response(),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "not logged in" })),
            ).into_response(),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "request failed");
                tracing::debug!(backtrace = %err.backtrace());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error",
                        "details": err.to_string(),
                    })),
                ).into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}

/// Turns a missing row into a 404 with the given message, other errors into a 500.
pub trait OrNotFound<T> {
    fn or_not_found(self, what: impl FnOnce() -> String) -> AppResult<T>;
}

impl<T> OrNotFound<T> for Result<Option<T>, sqlx::Error> {
    fn or_not_found(self, what: impl FnOnce() -> String) -> AppResult<T> {
        match self {
            Ok(Some(x)) => Ok(x),
            Ok(None) | Err(sqlx::Error::RowNotFound) => Err(AppError::NotFound(what())),
            Err(e) => Err(e.into()),
        }
    }
}
