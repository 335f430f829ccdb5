use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use timetabler::router::init_router;
use timetabler::state::AppState;
use timetabler::timetabler_config::{CorsConfig, SchedulingConfig};
use timetabler::timetabler_scheduling::{GenerationLocks, InMemoryEntryStore};

pub const SCHOOL: &str = "00000000-0000-0000-0000-000000000001";
pub const CLASS: &str = "00000000-0000-0000-0000-000000000002";
pub const YEAR: &str = "2024-2025";

/// Router over a fresh in-memory store, with the store kept for direct inspection.
pub struct TestApp {
    pub store: Arc<InMemoryEntryStore>,
    router: Router,
}

#[allow(dead_code)]
impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryEntryStore::new());
        let state = AppState {
            store: store.clone(),
            scheduling: SchedulingConfig::default(),
            cors_config: CorsConfig::default(),
            locks: GenerationLocks::new(),
        };

        Self {
            store,
            router: init_router(state),
        }
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, None).await
    }
}

/// Create-entry body for grade 10 of the shared test class.
pub fn entry_body(subject: &str, teacher_id: &str, day: &str, start: &str, end: &str) -> Value {
    json!({
        "school_id": SCHOOL,
        "academic_year": YEAR,
        "grade_level": "10",
        "class_id": CLASS,
        "subject_id": "00000000-0000-0000-0000-000000000030",
        "subject_name": subject,
        "teacher_id": teacher_id,
        "teacher_name": format!("Teacher of {}", subject),
        "day_of_week": day,
        "start_time": start,
        "end_time": end
    })
}
