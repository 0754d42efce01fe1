use axum::{debug_handler, extract::{Path, Query, State}, http::header::USER_AGENT, response::{IntoResponse, Redirect}};
use oauth2::{AuthorizationCode, CsrfToken, PkceCodeVerifier, TokenResponse};
use serde::Deserialize;
use serde_json::Value;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db::Role, session::{CSRF_STATE, LOGIN_ROLE, PKCE_VERIFIER, RETURN_URL, ROLE, USER_ID}, users, AppError, AppResult, AppState, GetField};

use super::{clients::ClientProvider, local_redirect, Clients};

#[derive(Deserialize)]
pub struct LockinQuery {
    pub state: Option<String>,
    pub code: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn lockin(
    Path(provider): Path<ClientProvider>,
    Query(LockinQuery { state, code }): Query<LockinQuery>,
    State(db_pool): State<SqlitePool>,
    State(clients): State<Clients>,
    session: Session,
) -> AppResult<impl IntoResponse> {
    let state = CsrfToken::new(state.ok_or_else(|| AppError::bad_request("OAuth: without state"))?);
    let code = AuthorizationCode::new(code.ok_or_else(|| AppError::bad_request("OAuth: without code"))?);

    let Some(stored_state) = session.get::<String>(CSRF_STATE).await? else {
        return Err(AppError::bad_request("no csrf_state"));
    };

    if state.secret().as_str() != stored_state.as_str() {
        return Err(AppError::bad_request("csrf tokens don't match"));
    }

    let Some(pkce_verifier) = session.get::<String>(PKCE_VERIFIER).await? else {
        return Err(AppError::bad_request("no pkce_verifier"));
    };

    let client = clients.get_client(provider)?;
    let http_client = reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    let token_result = client
        .exchange_code(code)
        .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
        .request_async(&http_client)
        .await?;

    let access_token = token_result.access_token().secret();
    let (email, name) = fetch_identity(&http_client, provider, access_token).await?;

    let role = session.get::<Role>(LOGIN_ROLE).await?.unwrap_or(Role::Student);
    let user = users::sync_user(&db_pool, &email, &name, role).await?;

    session.remove::<String>(CSRF_STATE).await?;
    session.remove::<String>(PKCE_VERIFIER).await?;
    session.insert(USER_ID, user.id()).await?;
    session.insert(ROLE, role).await?;

    tracing::info!(user_id = user.id(), role = role.as_str(), %provider, "welcome");

    let return_url = local_redirect(session.remove::<String>(RETURN_URL).await?);
    Ok(Redirect::to(&return_url))
}

/// Email and display name from the provider's profile endpoint.
async fn fetch_identity(
    http_client: &reqwest::Client,
    provider: ClientProvider,
    access_token: &str,
) -> AppResult<(String, String)> {
    let body: Value = http_client.get(provider.userinfo_url())
        .bearer_auth(access_token)
        .header(USER_AGENT, "askbitsians")
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let email = match body.get("email").and_then(Value::as_str) {
        Some(email) => email.to_owned(),
        // github hides the address unless it is public
        None if provider == ClientProvider::Github => primary_github_email(http_client, access_token).await?,
        None => body.get_str_field("email")?,
    };
    let name = body.get("name")
        .and_then(Value::as_str)
        .or_else(|| body.get("login").and_then(Value::as_str))
        .unwrap_or("Unknown")
        .to_owned();

    Ok((email, name))
}

async fn primary_github_email(http_client: &reqwest::Client, access_token: &str) -> AppResult<String> {
    let emails: Vec<Value> = http_client.get("https://api.github.com/user/emails")
        .bearer_auth(access_token)
        .header(USER_AGENT, "askbitsians")
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    emails.iter()
        .find(|e| e.get("primary").and_then(Value::as_bool).unwrap_or(false))
        .or_else(|| emails.first())
        .map(|e| e.get_str_field("email"))
        .unwrap_or_else(|| Err(AppError::bad_request("github account has no email")))
}
