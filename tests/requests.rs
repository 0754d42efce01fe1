mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{spawn_app, TestApp};

async fn pair(app: &TestApp) -> (String, String) {
    let student_id = app.student("f20230011@goa.bits-pilani.ac.in", "Kabir").await;
    let alumnus_id = app.alumnus(json!({
        "name": "Dr. Rao", "email": "rao@uni.edu", "company": "IISc",
    })).await;
    (student_id, alumnus_id)
}

async fn send_request(app: &TestApp, student_id: &str, alumnus_id: &str, subject: &str) -> Value {
    let (status, body) = app.post("/api/chat-requests", json!({
        "student_id": student_id, "alumnus_id": alumnus_id,
        "subject": subject, "details": "Could we talk?",
    })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

#[tokio::test]
async fn create_lists_as_pending_and_emails_alumnus() {
    let app = spawn_app().await;
    let (student_id, alumnus_id) = pair(&app).await;

    let body = send_request(&app, &student_id, &alumnus_id, "Research").await;
    assert_eq!(body["message"], "Request created successfully");
    assert_eq!(body["request"]["status"], "pending");

    let (status, list) = app.get(&format!("/api/chat-requests?alumnus_id={alumnus_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["totalRequests"], 1);
    let request = &list["requests"][0];
    assert_eq!(request["name"], "Kabir");
    assert_eq!(request["identifier"], "2023XXXH");
    assert_eq!(request["relativeTime"], "less than a minute ago");

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "rao@uni.edu");
    assert!(sent[0].html.contains("Kabir has reached out"));
}

#[tokio::test]
async fn create_requires_all_fields() {
    let app = spawn_app().await;
    let (status, body) = app.post("/api/chat-requests", json!({ "student_id": "a", "alumnus_id": "b" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn accepting_twice_reuses_the_room() {
    let app = spawn_app().await;
    let (student_id, alumnus_id) = pair(&app).await;

    let first = send_request(&app, &student_id, &alumnus_id, "One").await;
    let second = send_request(&app, &student_id, &alumnus_id, "Two").await;

    let mut rooms = Vec::new();
    for request in [&first, &second] {
        let (status, body) = app.patch("/api/chat-requests", json!({
            "id": request["request"]["id"], "status": "accepted",
            "alumnus_id": alumnus_id, "student_id": student_id,
        })).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        rooms.push(body["chatRoomId"].as_str().unwrap().to_owned());
    }
    assert_eq!(rooms[0], rooms[1]);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chats")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let last = app.mailer.sent().pop().unwrap();
    assert_eq!(last.to, "f20230011@goa.bits-pilani.ac.in");
    assert_eq!(last.subject, "Your Query was Accepted - AskBITSians");
}

#[tokio::test]
async fn declining_opens_no_room_and_moves_to_past() {
    let app = spawn_app().await;
    let (student_id, alumnus_id) = pair(&app).await;
    let created = send_request(&app, &student_id, &alumnus_id, "Research").await;
    let id = created["request"]["id"].as_str().unwrap();

    let (status, body) = app.patch("/api/chat-requests", json!({
        "id": id, "status": "declined", "alumnus_id": alumnus_id,
    })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("Request {id} updated to declined"));
    assert!(body["chatRoomId"].is_null());

    let (_, pending) = app.get(&format!("/api/chat-requests?alumnus_id={alumnus_id}")).await;
    assert_eq!(pending["totalRequests"], 0);

    let (_, past) = app.get(&format!("/api/chat-requests/past?consultant_id={alumnus_id}")).await;
    assert_eq!(past["totalRequests"], 1);
    assert_eq!(past["requests"][0]["status"], "declined");

    let last = app.mailer.sent().pop().unwrap();
    assert_eq!(last.subject, "Your Query was Declined - AskBITSians");
}

#[tokio::test]
async fn respond_validation() {
    let app = spawn_app().await;
    let (student_id, alumnus_id) = pair(&app).await;
    let created = send_request(&app, &student_id, &alumnus_id, "Research").await;
    let id = created["request"]["id"].clone();

    let (status, _) = app.patch("/api/chat-requests", json!({
        "id": id, "status": "maybe", "alumnus_id": alumnus_id,
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.patch("/api/chat-requests", json!({
        "id": id, "status": "accepted", "alumnus_id": alumnus_id,
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Student ID is missing");

    let (status, _) = app.patch("/api/chat-requests", json!({
        "id": "nope", "status": "declined", "alumnus_id": alumnus_id,
    })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/chat-requests/past").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
