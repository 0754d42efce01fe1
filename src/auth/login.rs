use axum::{debug_handler, extract::{Path, Query, State}, response::{IntoResponse, Redirect, Response}, Json};
use oauth2::{CsrfToken, PkceCodeChallenge, Scope};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::{db::Role, session::{CSRF_STATE, LOGIN_ROLE, PKCE_VERIFIER, RETURN_URL}, AppResult};

use super::{clients::ClientProvider, Clients};

#[derive(Serialize)]
pub(crate) struct LoginOptions {
    providers: Vec<ClientProvider>,
}

#[debug_handler]
pub(crate) async fn login_page(State(clients): State<Clients>) -> Json<LoginOptions> {
    Json(LoginOptions { providers: clients.providers() })
}

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    pub(crate) return_url: Option<String>,
    pub(crate) role: Option<Role>,
}

#[debug_handler]
pub(crate) async fn login(
    Path(provider): Path<ClientProvider>,
    Query(LoginQuery { return_url, role }): Query<LoginQuery>,
    State(clients): State<Clients>,
    session: Session,
) -> AppResult<Response> {
    let client = clients.get_client(provider)?;

    let (pkce_code_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

    let (authorize_url, csrf_state) = client.authorize_url(CsrfToken::new_random)
        .add_scopes(provider.scopes().iter().map(|s| Scope::new(s.to_string())))
        .set_pkce_challenge(pkce_code_challenge)
        .url();

    session.insert(CSRF_STATE, csrf_state.secret()).await?;
    session.insert(PKCE_VERIFIER, pkce_verifier.secret()).await?;
    session.insert(LOGIN_ROLE, role.unwrap_or(Role::Student)).await?;
    if let Some(return_url) = return_url {
        session.insert(RETURN_URL, return_url).await?;
    }

    tracing::debug!(%provider, "redirecting to provider");

    Ok(Redirect::to(authorize_url.as_str()).into_response())
}
