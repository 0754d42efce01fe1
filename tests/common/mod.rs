#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use askbitsians::{app, auth::Clients, db, mail::{Email, MailError, Mailer}, AppState};
use async_trait::async_trait;
use axum::{body::Body, http::{header, Method, Request, StatusCode}, response::Response, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tower::ServiceExt;

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Email>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

pub struct TestApp {
    pub router: Router,
    pub db_pool: SqlitePool,
    pub mailer: Arc<RecordingMailer>,
}

pub async fn test_pool() -> SqlitePool {
    // a single connection so every query sees the same in-memory database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    db::MIGRATOR.run(&db_pool).await.expect("Failed to migrate");
    db_pool
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(Clients::default()).await
}

pub async fn spawn_app_with(clients: Clients) -> TestApp {
    let db_pool = test_pool().await;
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(db_pool.clone(), clients, mailer.clone());

    TestApp {
        router: app(state, 5),
        db_pool,
        mailer,
    }
}

impl TestApp {
    /// Sends a prepared request and hands back the raw response, headers included.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    /// Signs up a student through user sync and returns their id.
    pub async fn student(&self, email: &str, name: &str) -> String {
        let (status, body) = self.post("/api/user-sync", json!({ "email": email, "name": name })).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["id"].as_str().unwrap().to_owned()
    }

    /// Creates an alumni profile and returns its id.
    pub async fn alumnus(&self, profile: Value) -> String {
        let (status, body) = self.post("/api/alumni", profile).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["alumni"]["id"].as_str().unwrap().to_owned()
    }

    /// A student, an alumnus and an accepted request between them; returns the room id.
    pub async fn room(&self) -> (String, String, String) {
        let student_id = self.student("f20210001@pilani.bits-pilani.ac.in", "Asha").await;
        let alumnus_id = self.alumnus(json!({
            "name": "Vikram", "email": "vikram@corp.com", "company": "Initech",
        })).await;

        let (_, created) = self.post("/api/chat-requests", json!({
            "student_id": student_id, "alumnus_id": alumnus_id,
            "subject": "Internships", "details": "How do I prepare?",
        })).await;
        let (status, accepted) = self.patch("/api/chat-requests", json!({
            "id": created["request"]["id"], "status": "accepted",
            "alumnus_id": alumnus_id, "student_id": student_id,
        })).await;
        assert_eq!(status, StatusCode::OK, "{accepted}");

        let roomid = accepted["chatRoomId"].as_str().unwrap().to_owned();
        (roomid, student_id, alumnus_id)
    }
}
