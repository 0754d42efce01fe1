mod common;

use askbitsians::{auth::Clients, settings::{OAuthSettings, ProviderSettings}};
use axum::{body::Body, http::{header, Request, StatusCode}, response::Response};
use http_body_util::BodyExt;
use serde_json::Value;

use common::{spawn_app, spawn_app_with, TestApp};

async fn with_github() -> TestApp {
    let oauth = OAuthSettings {
        google: None,
        github: Some(ProviderSettings {
            client_id: "client".into(),
            client_secret: "secret".into(),
        }),
    };
    spawn_app_with(Clients::from_settings(&oauth, "http://localhost:8080").unwrap()).await
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

async fn error_of(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    body["error"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn no_providers_without_keys() {
    let app = spawn_app().await;
    let (status, body) = app.get("/login").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["providers"], serde_json::json!([]));

    let (_, body) = with_github().await.get("/login").await;
    assert_eq!(body["providers"], serde_json::json!(["github"]));
}

#[tokio::test]
async fn unconfigured_provider_is_not_found() {
    let app = spawn_app().await;
    let (status, _) = app.get("/login/google").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn callback_without_login_has_no_state() {
    let app = with_github().await;

    let response = app.send(get("/lockin/github?state=x&code=y", None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "no csrf_state");

    let response = app.send(get("/lockin/github?state=x", None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "OAuth: without code");
}

#[tokio::test]
async fn callback_rejects_mismatched_state() {
    let app = with_github().await;

    let response = app.send(get("/login/github?role=alumnus", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let authorize = location(&response);
    assert!(authorize.starts_with("https://github.com/login/oauth/authorize"), "{authorize}");
    assert!(authorize.contains("code_challenge="));
    assert!(authorize.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Flockin%2Fgithub"));

    let cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned();

    let response = app.send(get("/lockin/github?state=forged&code=y", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "csrf tokens don't match");
}

#[tokio::test]
async fn me_requires_a_session() {
    let app = spawn_app().await;
    let (status, _) = app.get("/api/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_only_redirects_within_the_site() {
    let app = spawn_app().await;

    let response = app.send(get("/logout?return_url=/forums", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/forums");

    for target in ["https://evil.example", "//evil.example"] {
        let response = app.send(get(&format!("/logout?return_url={target}"), None)).await;
        assert_eq!(location(&response), "/", "{target}");
    }
}
