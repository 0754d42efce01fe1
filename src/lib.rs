pub mod alumni;
pub mod appresult;
pub mod auth;
pub mod chats;
pub mod db;
pub mod forums;
pub mod humanize;
pub mod mail;
pub mod markdown;
pub mod requests;
pub mod res;
pub mod session;
pub mod settings;
pub mod students;
pub mod telemetry;
pub mod users;

use axum::{extract::FromRef, Router};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use appresult::{AppError, AppResult};

use db::ChatMessage;
use mail::SharedMailer;
use users::UserCache;

/// Buffered chat messages per socket before it starts dropping.
const CHAT_BACKLOG: usize = 256;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub clients: auth::Clients,
    pub tx: broadcast::Sender<ChatMessage>,
    pub mailer: SharedMailer,
    pub user_cache: UserCache,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, clients: auth::Clients, mailer: SharedMailer) -> Self {
        AppState {
            db_pool,
            clients,
            tx: broadcast::channel(CHAT_BACKLOG).0,
            mailer,
            user_cache: UserCache::default(),
        }
    }
}

pub fn app(app_state: AppState, session_minutes: i64) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(session_minutes)));

    let api = Router::new()
        .merge(auth::api_router())
        .merge(users::router())
        .merge(students::router())
        .merge(alumni::router())
        .merge(requests::router())
        .merge(chats::router())
        .merge(forums::router());

    Router::new()
        .merge(auth::router())
        .nest("/api", api)
        .with_state(app_state)
        .layer(session_layer)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub trait GetField {
    fn get_str_field(&self, field: &str) -> AppResult<String>;
}

impl GetField for serde_json::Value {
    fn get_str_field(&self, field: &str) -> AppResult<String> {
        Ok(
            self.get(field)
            .ok_or_else(|| AppError::internal(format!("expected {field} in {self}")))?
            .as_str()
            .ok_or_else(|| AppError::internal(format!("expected {field} in {self} to be string")))?
            .to_owned()
        )
    }
}
