use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use shared_config::AppConfig;
use shared_database::{AppState, MemoryStore};
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};
use therapist_cell::router::therapist_routes;

struct TestApp {
    router: Router,
    config: AppConfig,
}

impl TestApp {
    fn new() -> Self {
        let config = TestConfig::default().to_app_config();
        let state = AppState::new(config.clone(), Arc::new(MemoryStore::new()));
        Self {
            router: therapist_routes(state),
            config,
        }
    }

    async fn send(&self, method: &str, uri: &str, user: Option<&TestUser>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, JwtTestUtils::bearer(user, &self.config));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

async fn seed(app: &TestApp, admin: &TestUser, expert: &TestUser) -> String {
    let (status, _) = app
        .send(
            "PUT",
            "/timeslots/2025-06-10",
            Some(admin),
            Some(json!({"slots": [{"from": "09:00", "to": "10:00"}, {"from": "10:00", "to": "11:00"}]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, therapist) = app
        .send(
            "POST",
            "/therapists",
            Some(expert),
            Some(json!({
                "name": "Therapist X",
                "expertise": ["Speech Therapy"],
                "supported_modes": ["ONLINE"]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let therapist_id = therapist["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            "PUT",
            &format!("/therapists/{}/availability/2025-06-10", therapist_id),
            Some(expert),
            Some(json!({"slots": [{"from": "09:00", "to": "11:00"}]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    therapist_id
}

#[tokio::test]
async fn test_timeslots_are_annotated_for_mode_and_therapy() {
    let app = TestApp::new();
    seed(&app, &TestUser::admin("admin@example.com"), &TestUser::expert("x@example.com")).await;

    let (status, body) = app
        .send("GET", "/timeslots?date=2025-06-10&mode=ONLINE&therapies=Speech%20Therapy", None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["slots"],
        json!([
            {"from": "09:00", "to": "10:00", "has_expert": true},
            {"from": "10:00", "to": "11:00", "has_expert": true}
        ])
    );

    let (_, body) = app
        .send("GET", "/timeslots?date=2025-06-10&mode=OFFLINE&therapies=Speech%20Therapy", None, None)
        .await;
    assert_eq!(body["slots"][0]["has_expert"], false);
}

#[tokio::test]
async fn test_browse_timeslots_without_filters() {
    let app = TestApp::new();
    seed(&app, &TestUser::admin("admin@example.com"), &TestUser::expert("x@example.com")).await;

    let (status, body) = app.send("GET", "/timeslots?date=2025-06-10", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slots"][0], json!({"from": "09:00", "to": "10:00"}));

    let (status, body) = app.send("GET", "/timeslots?date=2031-01-01", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slots"], json!([]));
}

#[tokio::test]
async fn test_timeslot_query_validation() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/timeslots", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "date is required");

    let (status, _) = app.send("GET", "/timeslots?date=10-06-2025", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send("GET", "/timeslots?date=2025-06-10&mode=CARRIER_PIGEON", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_catalog_writes_require_admin() {
    let app = TestApp::new();
    let body = json!({"slots": [{"from": "09:00", "to": "10:00"}]});

    let (status, _) = app.send("PUT", "/timeslots/2025-06-10", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let client = TestUser::general("client@example.com");
    let (status, _) = app.send("PUT", "/timeslots/2025-06-10", Some(&client), Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_catalog_window_is_rejected() {
    let app = TestApp::new();
    let admin = TestUser::admin("admin@example.com");

    let (status, _) = app
        .send(
            "PUT",
            "/timeslots/2025-06-10",
            Some(&admin),
            Some(json!({"slots": [{"from": "11:00", "to": "10:00"}]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_copy_and_recurring_catalog_endpoints() {
    let app = TestApp::new();
    let admin = TestUser::admin("admin@example.com");
    seed(&app, &admin, &TestUser::expert("x@example.com")).await;

    let (status, body) = app
        .send(
            "POST",
            "/timeslots/2025-06-10/copy",
            Some(&admin),
            Some(json!({"target_dates": ["2025-06-17", "2025-06-24"]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dates_updated"], 2);

    let (_, body) = app.send("GET", "/timeslots?date=2025-06-17", None, None).await;
    assert_eq!(body["slots"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .send(
            "POST",
            "/timeslots/2025-06-10/recurring",
            Some(&admin),
            Some(json!({"weekdays": ["Someday"]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            "POST",
            "/timeslots/2025-06-10/recurring",
            Some(&admin),
            Some(json!({"weekdays": ["Saturday", "Sunday"]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["dates_updated"].as_u64().unwrap() >= 104);
}

#[tokio::test]
async fn test_candidate_search_for_admin() {
    let app = TestApp::new();
    let admin = TestUser::admin("admin@example.com");
    let therapist_id = seed(&app, &admin, &TestUser::expert("x@example.com")).await;

    let request = json!({
        "date": "2025-06-10",
        "mode": "ONLINE",
        "window": {"from": "10:00", "to": "11:00"},
        "therapy_names": ["Speech Therapy"]
    });

    let (status, body) = app.send("POST", "/timeslots/candidates", Some(&admin), Some(request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["therapists"][0]["id"], therapist_id.as_str());

    let client = TestUser::general("client@example.com");
    let (status, _) = app.send("POST", "/timeslots/candidates", Some(&client), Some(request)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_only_owner_or_admin_edits_therapist() {
    let app = TestApp::new();
    let admin = TestUser::admin("admin@example.com");
    let owner = TestUser::expert("x@example.com");
    let therapist_id = seed(&app, &admin, &owner).await;
    let uri = format!("/therapists/{}", therapist_id);

    let other = TestUser::expert("y@example.com");
    let (status, _) = app
        .send("PUT", &uri, Some(&other), Some(json!({"supported_modes": ["OFFLINE"]})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send("PUT", &uri, Some(&owner), Some(json!({"supported_modes": ["ONLINE", "OFFLINE"]})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["supported_modes"], json!(["ONLINE", "OFFLINE"]));

    let (status, _) = app
        .send("PUT", &uri, Some(&admin), Some(json!({"about": "Certified speech therapist"})))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_general_user_cannot_create_therapist() {
    let app = TestApp::new();
    let client = TestUser::general("client@example.com");

    let (status, _) = app
        .send("POST", "/therapists", Some(&client), Some(json!({"name": "Not an expert"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_therapist_availability_copy() {
    let app = TestApp::new();
    let expert = TestUser::expert("x@example.com");
    let therapist_id = seed(&app, &TestUser::admin("admin@example.com"), &expert).await;

    let (status, _) = app
        .send(
            "POST",
            &format!("/therapists/{}/availability/2025-06-10/copy", therapist_id),
            Some(&expert),
            Some(json!({"target_dates": ["2025-06-11"]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send("GET", &format!("/therapists/{}/availability/2025-06-11", therapist_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slots"], json!([{"from": "09:00", "to": "11:00"}]));

    let (_, body) = app
        .send("GET", &format!("/therapists/{}/availability/2025-06-12", therapist_id), None, None)
        .await;
    assert_eq!(body["slots"], json!([]));
}

#[tokio::test]
async fn test_unknown_therapist_is_not_found() {
    let app = TestApp::new();

    let (status, _) = app
        .send("GET", "/therapists/6f1f8a8e-9a0b-4c1e-8f57-6f6ad4f2c001", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("GET", "/therapists/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_candidate_search_body_is_bad_request() {
    let app = TestApp::new();
    let admin = TestUser::admin("admin@example.com");

    let (status, body) = app
        .send(
            "POST",
            "/timeslots/candidates",
            Some(&admin),
            Some(json!({"date": "2025-06-10", "mode": "online", "therapy_names": []})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("window"));

    let (status, _) = app
        .send(
            "POST",
            "/timeslots/candidates",
            Some(&admin),
            Some(json!({
                "date": "2025-06-10",
                "mode": "CARRIER_PIGEON",
                "window": {"from": "10:00", "to": "11:00"},
                "therapy_names": []
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
