mod clients;
mod lockin;
mod login;
mod logout;
mod me;

use axum::{routing::get, Router};

use crate::AppState;

pub use clients::{ClientProvider, Clients};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login::login_page))
        .route("/login/{provider}", get(login::login))
        .route("/lockin/{provider}", get(lockin::lockin))
        .route("/logout", get(logout::logout))
}

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me::me))
}

/// Where to send the browser after login or logout. Only paths on this site
/// are followed; anything else goes to `/`.
pub(crate) fn local_redirect(return_url: Option<String>) -> String {
    return_url
        .filter(|url| url.starts_with('/') && !url.starts_with("//") && !url.starts_with("/\\"))
        .unwrap_or_else(|| "/".to_owned())
}
