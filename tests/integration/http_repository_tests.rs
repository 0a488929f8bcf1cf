//! `HttpRequestRepository` against a fake REST backend.
//!
//! The backend is an axum router bound to an ephemeral port. Each handler
//! records what it received and answers with one of the envelope shapes
//! the real API is known to produce.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};

use pinnacle_review::api::http::HttpRequestRepository;
use pinnacle_review::api::RequestRepository;
use pinnacle_review::config::ApiConfig;
use pinnacle_review::models::decision::{ApprovePayload, RejectPayload};
use pinnacle_review::models::request::{RequestStatus, RequestType};
use pinnacle_review::AppError;

#[derive(Default)]
struct Recorded {
    queries: Vec<HashMap<String, String>>,
    auth: Vec<Option<String>>,
    bodies: Vec<(String, Value)>,
}

type Shared = Arc<Mutex<Recorded>>;

fn record_headers(recorded: &Shared, headers: &HeaderMap) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    recorded.lock().unwrap().auth.push(auth);
}

async fn list_staff(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    record_headers(&recorded, &headers);
    recorded.lock().unwrap().queries.push(query);
    Json(json!({
        "success": true,
        "data": [
            {"id": 42, "requestType": "RESCHEDULE", "status": "PENDING", "sessionId": 500, "newDate": null},
            {"id": 43, "requestType": "SWAP", "status": "PENDING", "replacementTeacherId": 99}
        ]
    }))
}

async fn get_one(Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
    match id {
        43 => (
            StatusCode::OK,
            Json(json!({"success": true, "data": {"id": 43, "requestType": "SWAP", "status": "PENDING", "replacementTeacher": {"id": 99}}})),
        ),
        44 => (
            StatusCode::OK,
            Json(json!({"id": 44, "requestType": "MODALITY_CHANGE", "status": "APPROVED"})),
        ),
        401 => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "token expired"})),
        ),
        500 => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "errorCode": "INTERNAL", "message": "java.lang.NullPointerException"})),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": "Request not found"})),
        ),
    }
}

async fn swap_candidates(Path(id): Path<i64>) -> Json<Value> {
    assert_eq!(id, 43);
    Json(json!([
        {"teacherId": 12, "fullName": "Zoe Tran", "matchScore": 64},
        {"teacherId": 99, "fullName": "Binh Do", "matchScore": 92}
    ]))
}

async fn modality_resources(Path(id): Path<i64>) -> Json<Value> {
    assert_eq!(id, 44);
    Json(json!({"data": {"content": [{"id": 204, "name": "Room 204", "capacity": 20}], "totalElements": 1}}))
}

async fn reschedule_resources(
    State(recorded): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    recorded.lock().unwrap().queries.push(query);
    Json(json!({"success": true, "data": null}))
}

async fn approve(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_headers(&recorded, &headers);
    recorded
        .lock()
        .unwrap()
        .bodies
        .push((format!("approve:{id}"), body));
    (StatusCode::OK, Json(json!({"success": true, "data": null})))
}

async fn reject(
    State(recorded): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    recorded
        .lock()
        .unwrap()
        .bodies
        .push((format!("reject:{id}"), body));
    if id == 43 {
        return (StatusCode::OK, String::new());
    }
    (
        StatusCode::CONFLICT,
        json!({"success": false, "errorCode": "REQUEST_ALREADY_PROCESSED", "message": "Request already processed"})
            .to_string(),
    )
}

/// Start the fake backend, returning a repository pointed at it.
async fn spawn_backend(token: &str) -> (HttpRequestRepository, Shared) {
    let recorded: Shared = Arc::default();
    let app = Router::new()
        .route("/api/v1/teacher-requests/staff", get(list_staff))
        .route(
            "/api/v1/teacher-requests/reschedule/resources",
            get(reschedule_resources),
        )
        .route("/api/v1/teacher-requests/{id}", get(get_one))
        .route(
            "/api/v1/teacher-requests/{id}/swap/candidates",
            get(swap_candidates),
        )
        .route(
            "/api/v1/teacher-requests/{id}/modality/resources",
            get(modality_resources),
        )
        .route("/api/v1/teacher-requests/{id}/approve", post(approve))
        .route("/api/v1/teacher-requests/{id}/reject", post(reject))
        .with_state(Arc::clone(&recorded));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake backend");
    });

    let config = ApiConfig {
        base_url: format!("http://{addr}"),
        timeout_seconds: 5,
        token: token.to_owned(),
    };
    let repo = HttpRequestRepository::new(&config).expect("client builds");
    (repo, recorded)
}

// ── Reads ────────────────────────────────────────────────────

#[tokio::test]
async fn list_sends_status_filter_and_bearer_token() {
    let (repo, recorded) = spawn_backend("secret-token").await;

    let requests = repo
        .list_requests(Some(RequestStatus::Pending))
        .await
        .expect("list loads");

    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].request_type, RequestType::Reschedule);
    assert_eq!(requests[1].existing_replacement_teacher_id(), Some(99));

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.queries[0].get("status").map(String::as_str), Some("PENDING"));
    assert_eq!(recorded.auth[0].as_deref(), Some("Bearer secret-token"));
}

#[tokio::test]
async fn list_without_filter_sends_no_status_and_no_token() {
    let (repo, recorded) = spawn_backend("").await;

    repo.list_requests(None).await.expect("list loads");

    let recorded = recorded.lock().unwrap();
    assert!(recorded.queries[0].is_empty());
    assert_eq!(recorded.auth[0], None);
}

#[tokio::test]
async fn detail_accepts_wrapped_and_bare_objects() {
    let (repo, _) = spawn_backend("t").await;

    let wrapped = repo.get_request(43).await.expect("wrapped detail");
    assert_eq!(wrapped.existing_replacement_teacher_id(), Some(99));

    let bare = repo.get_request(44).await.expect("bare detail");
    assert_eq!(bare.status, RequestStatus::Approved);
}

#[tokio::test]
async fn failure_statuses_map_to_error_kinds() {
    let (repo, _) = spawn_backend("t").await;

    match repo.get_request(7).await {
        Err(AppError::NotFound(msg)) => assert_eq!(msg, "Request not found"),
        other => panic!("expected not found, got {other:?}"),
    }
    assert!(matches!(
        repo.get_request(401).await,
        Err(AppError::Unauthorized(_))
    ));
    match repo.get_request(500).await {
        Err(AppError::Api(failure)) => {
            assert_eq!(failure.status, Some(500));
            assert_eq!(failure.code.as_deref(), Some("INTERNAL"));
        }
        other => panic!("expected api failure, got {other:?}"),
    }
}

#[tokio::test]
async fn eligibility_endpoints_unwrap_every_shape() {
    let (repo, recorded) = spawn_backend("t").await;

    let candidates = repo.swap_candidates(43).await.expect("candidates load");
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[1].match_score, 92);

    let resources = repo.modality_resources(44).await.expect("resources load");
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0].name, "Room 204");
    assert_eq!(resources[0].capacity, Some(20));

    let date = NaiveDate::from_ymd_opt(2026, 11, 9).unwrap();
    let none = repo
        .reschedule_resources(500, date, 4)
        .await
        .expect("empty resources load");
    assert!(none.is_empty());

    let recorded = recorded.lock().unwrap();
    let query = recorded.queries.last().unwrap();
    assert_eq!(query.get("sessionId").map(String::as_str), Some("500"));
    assert_eq!(query.get("date").map(String::as_str), Some("2026-11-09"));
    assert_eq!(query.get("timeSlotId").map(String::as_str), Some("4"));
}

// ── Decisions ────────────────────────────────────────────────

#[tokio::test]
async fn approve_posts_only_present_fields() {
    let (repo, recorded) = spawn_backend("t").await;

    repo.approve(
        43,
        ApprovePayload {
            replacement_teacher_id: Some(99),
            ..ApprovePayload::default()
        },
    )
    .await
    .expect("approve accepted");

    let recorded = recorded.lock().unwrap();
    assert_eq!(
        recorded.bodies,
        vec![("approve:43".to_owned(), json!({"replacementTeacherId": 99}))]
    );
    assert_eq!(recorded.auth[0].as_deref(), Some("Bearer t"));
}

#[tokio::test]
async fn reject_accepts_empty_body_and_reports_conflicts() {
    let (repo, recorded) = spawn_backend("t").await;
    let payload = RejectPayload {
        reason: "not enough seats available".into(),
    };

    repo.reject(43, payload.clone())
        .await
        .expect("empty success body accepted");

    match repo.reject(42, payload).await {
        Err(AppError::Api(failure)) => {
            assert_eq!(failure.status, Some(409));
            assert_eq!(failure.code.as_deref(), Some("REQUEST_ALREADY_PROCESSED"));
            assert_eq!(failure.message, "Request already processed");
        }
        other => panic!("expected api failure, got {other:?}"),
    }

    let recorded = recorded.lock().unwrap();
    assert_eq!(
        recorded.bodies[0].1,
        json!({"reason": "not enough seats available"})
    );
}

#[tokio::test]
async fn unreachable_backend_is_an_http_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let repo = HttpRequestRepository::new(&ApiConfig {
        base_url: format!("http://{addr}"),
        timeout_seconds: 2,
        token: String::new(),
    })
    .unwrap();

    assert!(matches!(repo.list_requests(None).await, Err(AppError::Http(_))));
}
