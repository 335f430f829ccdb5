mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{CLASS, SCHOOL, TestApp, YEAR, entry_body};
use timetabler::timetabler_models::dto::CreateTimetableEntryDto;
use timetabler::timetabler_scheduling::EntryStore;

const MATH_TEACHER: &str = "00000000-0000-0000-0000-00000000000a";
const ART_TEACHER: &str = "00000000-0000-0000-0000-00000000000b";

fn generate_body(day_start: &str, day_end: &str) -> Value {
    json!({
        "school_id": SCHOOL,
        "academic_year": YEAR,
        "grade_level": "10",
        "class_id": CLASS,
        "subjects": [{
            "subject_id": "00000000-0000-0000-0000-000000000031",
            "subject_name": "Math",
            "teacher_id": MATH_TEACHER,
            "teacher_name": "Ada",
            "periods_per_week": 3,
            "duration_minutes": 60
        }],
        "constraints": {
            "day_start": day_start,
            "day_end": day_end,
            "working_days": ["monday", "tuesday", "wednesday", "thursday", "friday"]
        }
    })
}

#[tokio::test]
async fn test_create_then_conflicting_create_is_rejected() {
    let app = TestApp::new();

    let (status, created) = app
        .post(
            "/api/timetable/entries",
            entry_body("Math", MATH_TEACHER, "monday", "09:00", "10:00"),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "draft");
    assert_eq!(created["duration_minutes"], 60);
    assert_eq!(created["has_conflicts"], false);

    // Same teacher, other class, overlapping by half an hour.
    let mut clash = entry_body("Math", MATH_TEACHER, "monday", "09:30", "10:30");
    clash["class_id"] = json!("00000000-0000-0000-0000-000000000099");
    clash["grade_level"] = json!("11");
    let (status, body) = app.post("/api/timetable/entries", clash).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"][0]["type"], "teacher_conflict");
    assert_eq!(body["details"][0]["severity"], "high");
    assert_eq!(body["details"][0]["conflicting_entry_id"], created["id"]);
    assert_eq!(app.store.len().await, 1);

    // Touching intervals do not conflict.
    let (status, _) = app
        .post(
            "/api/timetable/entries",
            entry_body("Math", MATH_TEACHER, "monday", "10:00", "11:00"),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_invalid_input_statuses() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/timetable/entries",
            entry_body("Math", MATH_TEACHER, "monday", "9am", "10:00"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("9am"));

    let (status, _) = app
        .post(
            "/api/timetable/entries",
            entry_body("Math", MATH_TEACHER, "monday", "10:00", "10:00"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/timetable/entries",
            entry_body("", MATH_TEACHER, "monday", "09:00", "10:00"),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app
        .post("/api/timetable/entries", json!({ "school_id": SCHOOL }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().ends_with("is required"));

    let mut no_subjects = generate_body("08:00", "15:00");
    no_subjects["subjects"] = json!([]);
    let (status, _) = app.post("/api/timetable/generate", no_subjects).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_generate_fills_first_working_days() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/timetable/generate", generate_body("08:00", "09:00"))
        .await;
    assert_eq!(status, StatusCode::OK);

    let created = body["created"].as_array().unwrap();
    assert_eq!(created.len(), 3);
    let days: Vec<&str> = created
        .iter()
        .map(|e| e["day_of_week"].as_str().unwrap())
        .collect();
    assert_eq!(days, ["monday", "tuesday", "wednesday"]);
    for entry in created {
        assert_eq!(entry["start_time"], "08:00");
        assert_eq!(entry["end_time"], "09:00");
        assert_eq!(entry["subject_name"], "Math");
    }
    assert_eq!(body["shortfalls"], json!([]));
}

#[tokio::test]
async fn test_generate_reports_shortfall_when_nothing_fits() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/timetable/generate", generate_body("08:00", "08:30"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], json!([]));
    assert_eq!(
        body["shortfalls"],
        json!([{ "subject_name": "Math", "scheduled": 0, "required": 3 }])
    );
}

#[tokio::test]
async fn test_lifecycle_and_delete_guard() {
    let app = TestApp::new();
    let (_, created) = app
        .post(
            "/api/timetable/entries",
            entry_body("Art", ART_TEACHER, "friday", "13:00", "14:00"),
        )
        .await;
    let id = created["id"].as_str().unwrap();
    let path = |action: &str| format!("/api/timetable/entries/{}/{}", id, action);

    let (status, _) = app.post(&path("activate"), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.post(&path("publish"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "published");

    let (status, body) = app.post(&path("activate"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");

    let entry_path = format!("/api/timetable/entries/{}", id);
    let (status, _) = app.delete(&entry_path).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.post(&path("archive"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "archived");

    let (status, _) = app
        .put(&entry_path, json!({ "start_time": "14:00", "end_time": "15:00" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete(&entry_path).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&entry_path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancel_frees_the_slot() {
    let app = TestApp::new();
    let (_, created) = app
        .post(
            "/api/timetable/entries",
            entry_body("Art", ART_TEACHER, "tuesday", "09:00", "10:00"),
        )
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = app
        .post(
            &format!("/api/timetable/entries/{}/cancel", id),
            json!({ "reason": "Teacher on leave" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["is_cancelled"], true);
    assert_eq!(body["cancellation_reason"], "Teacher on leave");

    let mut candidate = entry_body("Art", ART_TEACHER, "tuesday", "09:30", "10:30");
    candidate["class_id"] = json!("00000000-0000-0000-0000-000000000099");
    let (status, body) = app.post("/api/timetable/conflicts/check", candidate).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_conflicts"], false);

    // The same class can book the exact start again.
    let (status, replacement) = app
        .post(
            "/api/timetable/entries",
            entry_body("Art", ART_TEACHER, "tuesday", "09:00", "10:00"),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(replacement["id"], created["id"]);
}

#[tokio::test]
async fn test_update_rechecks_conflicts_excluding_itself() {
    let app = TestApp::new();
    let (_, first) = app
        .post(
            "/api/timetable/entries",
            entry_body("Math", MATH_TEACHER, "monday", "08:00", "09:00"),
        )
        .await;
    app.post(
        "/api/timetable/entries",
        entry_body("Art", ART_TEACHER, "monday", "10:00", "11:00"),
    )
    .await;
    let entry_path = format!("/api/timetable/entries/{}", first["id"].as_str().unwrap());

    // Overlapping its own old slot is fine.
    let (status, body) = app
        .put(&entry_path, json!({ "start_time": "08:30", "end_time": "09:15" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duration_minutes"], 45);

    // Moving into the Art period collides on the class axis.
    let (status, body) = app
        .put(&entry_path, json!({ "start_time": "10:30", "end_time": "11:30" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"][0]["type"], "class_conflict");
}

#[tokio::test]
async fn test_refresh_and_resolve_conflicts() {
    let app = TestApp::new();
    let (_, created) = app
        .post(
            "/api/timetable/entries",
            entry_body("Math", MATH_TEACHER, "thursday", "09:00", "10:00"),
        )
        .await;
    let id = created["id"].as_str().unwrap();

    // A clashing entry written straight to the store, as a concurrent writer would.
    let mut clash = entry_body("Math", MATH_TEACHER, "thursday", "09:30", "10:30");
    clash["class_id"] = json!("00000000-0000-0000-0000-000000000099");
    let dto: CreateTimetableEntryDto = serde_json::from_value(clash).unwrap();
    app.store.create(dto.into_draft().unwrap()).await.unwrap();

    let (status, body) = app
        .post(
            &format!("/api/timetable/entries/{}/conflicts/refresh", id),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_conflicts"], true);
    assert_eq!(body["conflict_details"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .post(
            &format!("/api/timetable/entries/{}/conflicts/5/resolve", id),
            json!({ "resolution": "Accepted" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            &format!("/api/timetable/entries/{}/conflicts/0/resolve", id),
            json!({ "resolution": "Accepted" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_conflicts"], false);
    assert_eq!(body["conflict_details"][0]["resolution"], "Accepted");
}

#[tokio::test]
async fn test_list_statistics_and_available_slots() {
    let app = TestApp::new();
    app.post("/api/timetable/generate", generate_body("08:00", "09:00"))
        .await;

    let scope = format!(
        "school_id={}&academic_year={}&grade_level=10",
        SCHOOL, YEAR
    );

    let (status, body) = app
        .get(&format!("/api/timetable/entries?{}&limit=2", scope))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(body["meta"]["has_more"], true);

    let (_, body) = app
        .get(&format!(
            "/api/timetable/entries?{}&day_of_week=tuesday",
            scope
        ))
        .await;
    assert_eq!(body["meta"]["total"], 1);

    let (status, stats) = app
        .get(&format!("/api/timetable/statistics?{}", scope))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_entries"], 3);
    assert_eq!(stats["teacher_workload"]["Ada"], 3);
    assert_eq!(stats["periods_by_day"]["monday"], 1);
    assert_eq!(stats["conflicts_count"], 0);
    assert!((stats["utilization_rate"].as_f64().unwrap() - 7.5).abs() < 1e-9);

    let (status, slots) = app
        .get(&format!(
            "/api/timetable/available-slots?class_id={}&academic_year={}&day_of_week=monday&duration_minutes=60&break_duration_minutes=0&day_end=11:00",
            CLASS, YEAR
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slots["day_of_week"], "monday");
    assert_eq!(slots["slots"][0]["start"], "09:00");
    assert_eq!(slots["slots"][0]["end"], "10:00");
}

#[tokio::test]
async fn test_health_and_docs() {
    let app = TestApp::new();

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, doc) = app.get("/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/timetable/generate"].is_object());
}
