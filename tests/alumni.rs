mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{spawn_app, TestApp};

async fn directory() -> TestApp {
    let app = spawn_app().await;
    app.alumnus(json!({
        "name": "Priya", "email": "priya@x.com", "company": "Google",
        "job_title": "SDE", "areas_of_expertise": ["Backend", "Distributed Systems"],
        "graduation_year": 2015,
    })).await;
    app.alumnus(json!({
        "name": "arjun", "email": "arjun@x.com", "company": "Goldman Sachs",
        "role": "Analyst", "domain": "Finance", "graduation_year": 2019,
    })).await;
    app.alumnus(json!({
        "name": "Zoya", "email": "zoya@x.com", "company": "Microsoft",
        "job_title": "SDE", "areas_of_expertise": ["Backend"],
    })).await;
    app
}

#[tokio::test]
async fn create_requires_name_and_email() {
    let app = spawn_app().await;
    let (status, body) = app.post("/api/alumni", json!({ "name": "No Mail" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name and email are required");
}

#[tokio::test]
async fn create_accepts_legacy_role_and_domain() {
    let app = spawn_app().await;
    let (status, body) = app.post("/api/alumni", json!({
        "name": "Old", "email": "old@x.com", "role": "PM", "domain": "Product",
    })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Alumni profile created successfully");
    assert_eq!(body["alumni"]["job_title"], "PM");
    assert_eq!(body["alumni"]["areas_of_expertise"], json!(["Product"]));
}

#[tokio::test]
async fn fetch_by_id_and_filter() {
    let app = directory().await;

    let (_, all) = app.get("/api/alumni").await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, backend) = app.get("/api/alumni?domain=Backend").await;
    let names: Vec<_> = backend.as_array().unwrap().iter().map(|a| a["name"].clone()).collect();
    assert_eq!(names, vec![json!("Priya"), json!("Zoya")]);

    let (_, analysts) = app.get("/api/alumni?role=Analyst").await;
    assert_eq!(analysts.as_array().unwrap().len(), 1);

    let id = all[0]["id"].as_str().unwrap();
    let (status, one) = app.get(&format!("/api/alumni?id={id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["id"], id);

    let (status, _) = app.get("/api/alumni?id=unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_only_touches_given_fields() {
    let app = spawn_app().await;
    let id = app.alumnus(json!({
        "name": "Priya", "email": "priya@x.com", "company": "Google", "job_title": "SDE",
    })).await;

    let (status, body) = app.patch("/api/alumni", json!({ "id": id, "company": "Stripe", "name": "" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Alumni profile updated successfully");
    assert_eq!(body["alumni"]["company"], "Stripe");
    assert_eq!(body["alumni"]["name"], "Priya");
    assert_eq!(body["alumni"]["job_title"], "SDE");

    let (status, _) = app.patch("/api/alumni", json!({ "company": "Stripe" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.patch("/api/alumni", json!({ "id": "ghost", "company": "Stripe" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn showcase_filters_searches_and_sorts() {
    let app = directory().await;

    let (status, body) = app.get("/api/alumni/showcase").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["filters"]["roles"], json!(["Analyst", "SDE"]));
    assert_eq!(body["filters"]["companies"], json!(["Goldman Sachs", "Google", "Microsoft"]));
    assert_eq!(body["applied_filters"]["sortBy"], "name");

    let (_, body) = app.get("/api/alumni/showcase?search=GO").await;
    assert_eq!(body["total"], 2);

    let (_, body) = app.get("/api/alumni/showcase?role=SDE&company=all").await;
    assert_eq!(body["total"], 2);
    assert!(body["applied_filters"]["company"].is_null());

    let (_, body) = app.get("/api/alumni/showcase?sortBy=graduation_year&sortOrder=desc").await;
    let names: Vec<_> = body["alumni"].as_array().unwrap().iter().map(|a| a["name"].clone()).collect();
    // no graduation year sorts last
    assert_eq!(names, vec![json!("arjun"), json!("Priya"), json!("Zoya")]);
}

#[tokio::test]
async fn showcase_tolerates_unknown_sorting() {
    let app = directory().await;

    for query in ["sortBy=", "sortBy=bogus", "sortBy=role&sortOrder="] {
        let (status, body) = app.get(&format!("/api/alumni/showcase?{query}")).await;
        assert_eq!(status, StatusCode::OK, "{query}: {body}");
        assert_eq!(body["applied_filters"]["sortBy"], "name");
        assert_eq!(body["applied_filters"]["sortOrder"], "asc");
        assert_eq!(body["total"], 3);
    }

    let (status, body) = app.get("/api/alumni/showcase?sortBy=graduation_year&sortOrder=DESC").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied_filters"]["sortOrder"], "desc");
    assert_eq!(body["alumni"][0]["name"], "arjun");
}

#[tokio::test]
async fn showcase_search_for_all_is_a_real_search() {
    let app = directory().await;
    let (_, body) = app.get("/api/alumni/showcase?search=all").await;
    assert_eq!(body["applied_filters"]["search"], "all");
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn consultants_match_expertise_and_company_substring() {
    let app = directory().await;

    let (_, body) = app.get("/api/consultants?expertise=Distributed%20Systems").await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/consultants?company=soft").await;
    assert_eq!(body[0]["name"], "Zoya");
}

#[tokio::test]
async fn categories_and_departments() {
    let app = directory().await;

    let (status, body) = app.get("/api/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["domains"], json!(["Backend", "Distributed Systems", "Finance"]));
    assert_eq!(body["graduationYears"], json!([2019, 2015]));
    assert_eq!(body["roles"], json!(["Analyst", "SDE"]));

    let (_, body) = app.get("/api/departments").await;
    assert_eq!(body["domains"], json!(["Backend", "Distributed Systems", "Finance"]));
    assert_eq!(body["roles"], json!(["Analyst", "SDE"]));
}
