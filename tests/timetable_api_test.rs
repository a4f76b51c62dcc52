use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use campus_timetable::api::{OWNER_HEADER, router};
use campus_timetable::db;
use campus_timetable::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn test_app() -> Router {
    let pool = db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to create database");
    router(AppState::new(pool))
}

async fn send(app: &Router, method: &str, uri: &str, owner: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(owner) = owner {
        builder = builder.header(OWNER_HEADER, owner);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn entry_body(day: &str, start: &str, end: &str, course: &str, room: &str, kind: &str) -> Value {
    json!({
        "day": day,
        "start_time": start,
        "end_time": end,
        "course_id": course,
        "room": room,
        "type": kind,
    })
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let (status, _) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_owner_is_unauthorized() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/timetable", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].as_str().unwrap().contains(OWNER_HEADER));

    let (status, _) = send(&app, "GET", "/timetable", Some("  "), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_timetable_scenarios() {
    let app = test_app().await;
    let owner = Some("student-1");

    let (status, _) = send(&app, "GET", "/timetable", owner, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "POST",
        "/timetable/entries",
        owner,
        Some(entry_body("Monday", "09:00", "10:00", "CS101", "Room101", "lecture")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("clashes").is_none());
    let first_id = body["entry"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["timetable"]["entries"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "POST",
        "/timetable/entries",
        owner,
        Some(entry_body("Monday", "09:30", "10:30", "CS102", "Room102", "lecture")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let second_id = body["entry"]["id"].as_str().unwrap().to_string();
    let clashes = body["clashes"].as_array().unwrap();
    assert_eq!(clashes.len(), 1);
    assert_eq!(clashes[0]["day"], "Monday");
    assert_eq!(clashes[0]["overlap_start"], "09:30");
    assert_eq!(clashes[0]["overlap_end"], "10:00");
    let mut ids = vec![first_id.clone(), second_id.clone()];
    ids.sort();
    assert_eq!(clashes[0]["entry_ids"], json!(ids));

    let (_, snapshot) = send(&app, "GET", "/timetable/clashes", owner, None).await;
    assert_eq!(snapshot, body["clashes"]);

    let (status, _) = send(
        &app,
        "POST",
        "/timetable/entries",
        owner,
        Some(entry_body("Tuesday", "09:00", "10:00", "CS103", "Room103", "lab")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, after_tuesday) = send(&app, "GET", "/timetable/clashes", owner, None).await;
    assert_eq!(after_tuesday, snapshot);

    let (status, body) = send(&app, "DELETE", &format!("/timetable/entries/{}", first_id), owner, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"].as_array().unwrap().len(), 2);
    let (_, clashes) = send(&app, "GET", "/timetable/clashes", owner, None).await;
    assert_eq!(clashes, json!([]));

    let (status, body) = send(
        &app,
        "POST",
        "/timetable/entries",
        owner,
        Some(entry_body("Monday", "10:00", "09:00", "CS101", "Room101", "lecture")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "end_time");

    let (status, _) = send(&app, "DELETE", "/timetable/entries/does-not-exist", owner, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, timetable) = send(&app, "GET", "/timetable", owner, None).await;
    assert_eq!(timetable["owner"], "student-1");
    assert_eq!(timetable["entries"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_and_unknown_fields_are_validation_errors() {
    let app = test_app().await;
    let owner = Some("student-2");

    let (status, body) = send(&app, "POST", "/timetable/entries", owner, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "day");

    let (status, body) = send(
        &app,
        "POST",
        "/timetable/entries",
        owner,
        Some(entry_body("Monday", "09:00", "10:00", "CS101", "", "lecture")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "room");

    let (status, body) = send(
        &app,
        "POST",
        "/timetable/entries",
        owner,
        Some(entry_body("Monday", "09:00", "10:00", "CS101", "R1", "party")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "type");

    let (status, _) = send(&app, "GET", "/timetable", owner, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_owners_are_isolated() {
    let app = test_app().await;

    send(
        &app,
        "POST",
        "/timetable/entries",
        Some("alice"),
        Some(entry_body("Monday", "09:00", "10:00", "CS101", "R1", "lecture")),
    )
    .await;
    let (_, body) = send(
        &app,
        "POST",
        "/timetable/entries",
        Some("bob"),
        Some(entry_body("Monday", "09:00", "10:00", "CS101", "R1", "lecture")),
    )
    .await;
    assert!(body.get("clashes").is_none());

    let (status, _) = send(&app, "GET", "/timetable/clashes", Some("carol"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_day_and_week_views() {
    let app = test_app().await;
    let owner = Some("student-3");
    for (day, start, end) in [("Wednesday", "14:00", "15:00"), ("Wednesday", "09:00", "10:00"), ("Friday", "11:00", "12:00")] {
        let (status, _) = send(
            &app,
            "POST",
            "/timetable/entries",
            owner,
            Some(entry_body(day, start, end, "CS200", "Lab 2", "lab")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", "/timetable/days/wednesday", owner, None).await;
    assert_eq!(status, StatusCode::OK);
    let starts: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["start_time"].as_str().unwrap())
        .collect();
    assert_eq!(starts, vec!["14:00", "09:00"]);

    let (status, body) = send(&app, "GET", "/timetable/days/Sunday", owner, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "day");

    let (_, week) = send(&app, "GET", "/timetable/week", owner, None).await;
    let week = week.as_array().unwrap();
    assert_eq!(week.len(), 2);
    assert_eq!(week[0]["day"], "Wednesday");
    assert_eq!(week[0]["entries"][0]["start_time"], "09:00");
    assert_eq!(week[1]["day"], "Friday");
}

#[tokio::test]
async fn test_course_directory_resolves_entry_display() {
    let app = test_app().await;

    let (status, _) = send(&app, "POST", "/courses", None, Some(json!({ "code": " ", "title": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, course) = send(
        &app,
        "POST",
        "/courses",
        None,
        Some(json!({ "code": "MA101", "title": "Calculus I", "instructor": "Dr. Noether" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let course_id = course["id"].as_str().unwrap();

    let (_, courses) = send(&app, "GET", "/courses", None, None).await;
    assert_eq!(courses.as_array().unwrap().len(), 1);

    let (_, body) = send(
        &app,
        "POST",
        "/timetable/entries",
        Some("student-4"),
        Some(entry_body("Thursday", "10:00", "11:30", course_id, "Hall A", "tutorial")),
    )
    .await;
    assert_eq!(body["entry"]["course"]["code"], "MA101");
    assert_eq!(body["entry"]["course"]["title"], "Calculus I");
    assert_eq!(body["entry"]["type"], "tutorial");
}

#[tokio::test]
async fn test_malformed_json_uses_error_body() {
    let app = test_app().await;

    let mut body = entry_body("Monday", "09:00", "10:00", "CS101", "R1", "lecture");
    body["room"] = Value::Null;
    let (status, body) = send(&app, "POST", "/timetable/entries", Some("student-5"), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "400 Bad Request");
    assert!(body["message"].as_str().unwrap().contains("room"));
    assert!(body.get("field").is_none());

    let (status, body) = send(&app, "POST", "/courses", None, Some(json!({ "code": 7, "title": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, _) = send(&app, "GET", "/timetable", Some("student-5"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
