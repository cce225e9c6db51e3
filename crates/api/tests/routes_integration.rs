//! Integration tests for the HTTP routes.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{
    create_test_app, lazy_pool, parse_response_body, request_with_auth, test_pool, token_for,
    CRON_SECRET,
};
use domain::services::MockNotificationService;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

// ============================================================================
// Authentication (no database needed)
// ============================================================================

#[tokio::test]
async fn test_routes_require_identity_token() {
    let app = create_test_app(lazy_pool(), MockNotificationService::new());

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/groups")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = request_with_auth(Method::GET, "/api/v1/groups", "not-a-token", None);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_cron_requires_shared_secret() {
    let app = create_test_app(lazy_pool(), MockNotificationService::new());

    for uri in ["/api/v1/cron/expire-overdue", "/api/v1/cron/send-reminders"] {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let request = request_with_auth(Method::POST, uri, "wrong-secret", None);
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = create_test_app(lazy_pool(), MockNotificationService::new());
    let request = Request::builder()
        .uri("/api/health/live")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_invalid_requests_rejected_before_storage() {
    let app = create_test_app(lazy_pool(), MockNotificationService::new());
    let token = token_for(Uuid::new_v4());

    let request = request_with_auth(
        Method::POST,
        "/api/v1/groups",
        &token,
        Some(json!({ "name": "   " })),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = request_with_auth(
        Method::POST,
        "/api/v1/push/subscriptions",
        &token,
        Some(json!({ "endpoint": "ftp://push.example.com", "p256dh": "k", "auth": "a" })),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "validation_error");
}

// ============================================================================
// Full flow (database)
// ============================================================================

#[tokio::test]
async fn test_group_task_shop_flow() {
    let Some(pool) = test_pool().await else { return };
    let app = create_test_app(pool.clone(), MockNotificationService::new());
    let owner = Uuid::new_v4();
    let friend = Uuid::new_v4();
    let owner_token = token_for(owner);
    let friend_token = token_for(friend);

    // Create a group and invite a friend
    let request = request_with_auth(
        Method::POST,
        "/api/v1/groups",
        &owner_token,
        Some(json!({ "name": "Study buddies" })),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let group = parse_response_body(response).await;
    let group_id = group["id"].as_str().unwrap().to_string();

    let request = request_with_auth(
        Method::POST,
        &format!("/api/v1/groups/{}/members", group_id),
        &owner_token,
        Some(json!({ "user_id": friend })),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // A learning task shows up in the friend's list for today
    let request = request_with_auth(
        Method::POST,
        &format!("/api/v1/groups/{}/tasks", group_id),
        &owner_token,
        Some(json!({ "text": "Irregular verbs", "max_repetitions": 2, "intervals": [1] })),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let task = parse_response_body(response).await;
    assert_eq!(task["kind"], "learning");

    let request = request_with_auth(
        Method::GET,
        &format!("/api/v1/groups/{}/tasks/today", group_id),
        &friend_token,
        None,
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let today = parse_response_body(response).await;
    assert_eq!(today["count"], 1);
    let user_task_id = today["data"][0]["user_task_id"].as_str().unwrap().to_string();

    // Only the assignee may complete it
    let complete_uri = format!("/api/v1/user-tasks/{}/complete", user_task_id);
    let request = request_with_auth(Method::POST, &complete_uri, &owner_token, None);
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = request_with_auth(Method::POST, &complete_uri, &friend_token, None);
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let completed = parse_response_body(response).await;
    assert_eq!(completed["coins_earned"], 10);
    assert_eq!(completed["current_repetition"], 2);

    // Shop task the friend cannot afford
    let request = request_with_auth(
        Method::POST,
        &format!("/api/v1/groups/{}/tasks", group_id),
        &owner_token,
        Some(json!({
            "text": "Wash the car",
            "max_repetitions": 1,
            "intervals": [1],
            "cost_coins": 500
        })),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    let shop_task = parse_response_body(response).await;
    let shop_task_id = shop_task["id"].as_str().unwrap().to_string();

    let request = request_with_auth(
        Method::GET,
        &format!("/api/v1/groups/{}/shop", group_id),
        &friend_token,
        None,
    );
    let response = app.clone().oneshot(request).await.unwrap();
    let shop = parse_response_body(response).await;
    assert_eq!(shop["count"], 1);
    assert_eq!(shop["data"][0]["can_afford"], false);

    let request = request_with_auth(
        Method::POST,
        &format!("/api/v1/groups/{}/shop/{}/buy", group_id, shop_task_id),
        &friend_token,
        Some(json!({ "assign_to_user_id": owner })),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "insufficient_funds");
    assert_eq!(body["details"]["balance"], 110);
    assert_eq!(body["details"]["required"], 500);

    // Outsiders cannot see the group
    let request = request_with_auth(
        Method::GET,
        &format!("/api/v1/groups/{}", group_id),
        &token_for(Uuid::new_v4()),
        None,
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // History of the completed repetition
    let request = request_with_auth(
        Method::GET,
        &format!("/api/v1/user-tasks/{}/history", user_task_id),
        &friend_token,
        None,
    );
    let response = app.oneshot(request).await.unwrap();
    let history = parse_response_body(response).await;
    assert_eq!(history["count"], 1);
    assert_eq!(history["data"][0]["outcome"], "completed");
}

#[tokio::test]
async fn test_cron_endpoints_with_secret() {
    let Some(pool) = test_pool().await else { return };
    let app = create_test_app(pool, MockNotificationService::new());

    let request = request_with_auth(
        Method::POST,
        "/api/v1/cron/expire-overdue",
        CRON_SECRET,
        None,
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert!(body["failed_count"].is_u64());
    assert!(body["deadline"].is_string());

    let request = request_with_auth(
        Method::POST,
        "/api/v1/cron/send-reminders",
        CRON_SECRET,
        None,
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert!(body["sent"].is_u64());
}
