//! Router-level tests for authentication, role gating, and request
//! validation. These exercise everything that runs before the first
//! database query; the business rules behind the gateway are covered by
//! unit tests next to their implementations.

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use common::{get, patch_json, post_json, test_app, test_app_with_rate_limit, test_token};

// ─── Authentication ─────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = test_app();
    let (status, body) = get(&app, "/api/cases", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "No token provided");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = test_app();
    let (status, body) = get(&app, "/api/cases", Some("not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn expired_token_reports_expiry() {
    let app = test_app();
    let token = common::expired_token(1, "exec");

    let (status, body) = get(&app, "/api/cases", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token expired");
}

#[tokio::test]
async fn unknown_role_claim_is_unauthorized() {
    let app = test_app();
    let token = test_token(1, "wizard");
    let (status, _) = get(&app, "/api/cases", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_requires_credentials() {
    let app = test_app();
    let (status, body) = post_json(&app, "/api/auth/login", "{}", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username and password required");

    let (status, _) =
        post_json(&app, "/api/auth/login", r#"{"username":"amira"}"#, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Role gating ────────────────────────────────────────────────────────────

#[tokio::test]
async fn officer_cannot_reach_the_exec_desk() {
    let app = test_app();
    let token = test_token(2, "officer");
    let (status, body) = get(&app, "/api/cases", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Insufficient permissions");
}

#[tokio::test]
async fn exec_cannot_reach_the_senior_desk() {
    let app = test_app();
    let token = test_token(2, "exec");

    let (status, _) = get(&app, "/api/statistics", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get(&app, "/api/close-requests/review", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = patch_json(
        &app,
        "/api/close-requests/6a3bbf0a-8f74-4c0a-90c5-0ad4a563f81a",
        r#"{"status":"approved","senior_remark":"ok"}"#,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn senior_cannot_log_incoming_reports() {
    let app = test_app();
    let token = test_token(3, "senior");
    let (status, _) = post_json(&app, "/api/rpp-cases", "{}", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn exec_cannot_manage_users() {
    let app = test_app();
    let token = test_token(2, "exec");
    let (status, _) = get(&app, "/api/admin/users", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn superadmin_passes_every_role_gate() {
    let app = test_app();
    let token = test_token(1, "superadmin");

    // The gate passes and the request proceeds into field validation.
    let (status, body) = post_json(&app, "/api/cases", "{}", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    let (status, body) = post_json(&app, "/api/rpp-cases", "{}", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BMID and Source Type are required");
}

// ─── Request validation ─────────────────────────────────────────────────────

#[tokio::test]
async fn create_case_requires_mandatory_fields() {
    let app = test_app();
    let token = test_token(2, "exec");

    let (status, body) = post_json(
        &app,
        "/api/cases",
        r#"{"case_id":"C-1001","customer_name":"Tan Mei Ling"}"#,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");
}

#[tokio::test]
async fn create_case_rejects_unknown_classification() {
    let app = test_app();
    let token = test_token(2, "exec");

    let (status, body) = post_json(
        &app,
        "/api/cases",
        r#"{
            "case_id": "C-1001",
            "ic_number": "900101-14-5678",
            "customer_name": "Tan Mei Ling",
            "classification": "Suspicious",
            "case_type": "ATO",
            "mo": "Phishing",
            "branch_code": "B012",
            "date_escalated": "2024-01-01",
            "pic": 7
        }"#,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Classification must be Fraud, Scam, or Non-Fraud");
}

#[tokio::test]
async fn rpp_create_rejects_unknown_source_type() {
    let app = test_app();
    let token = test_token(4, "officer");

    let (status, body) = post_json(
        &app,
        "/api/rpp-cases",
        r#"{"bmid":"B1","source_type":"Phone"}"#,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Source Type must be \"Email\" or \"RPP Portal\"");
}

#[tokio::test]
async fn raise_close_request_requires_case_reference() {
    let app = test_app();
    let token = test_token(2, "exec");

    let (status, body) = post_json(&app, "/api/close-requests", "{}", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Case reference is required");
}

#[tokio::test]
async fn review_rejects_invalid_decision() {
    let app = test_app();
    let token = test_token(3, "senior");

    let (status, body) = patch_json(
        &app,
        "/api/close-requests/6a3bbf0a-8f74-4c0a-90c5-0ad4a563f81a",
        r#"{"status":"maybe","senior_remark":"looks fine"}"#,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid status. Use \"approved\" or \"rejected\"");
}

#[tokio::test]
async fn review_requires_a_senior_remark() {
    let app = test_app();
    let token = test_token(3, "senior");

    for body_json in [
        r#"{"status":"approved"}"#,
        r#"{"status":"approved","senior_remark":""}"#,
        r#"{"status":"rejected","senior_remark":"   "}"#,
    ] {
        let (status, body) = patch_json(
            &app,
            "/api/close-requests/6a3bbf0a-8f74-4c0a-90c5-0ad4a563f81a",
            body_json,
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body_json}");
        assert_eq!(body["error"], "Senior remark is mandatory for approval/rejection");
    }
}

#[tokio::test]
async fn malformed_uuid_is_a_bad_request() {
    let app = test_app();
    let token = test_token(3, "senior");

    let (status, body) = patch_json(
        &app,
        "/api/close-requests/not-a-uuid",
        r#"{"status":"approved","senior_remark":"ok"}"#,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid UUID format");
}

// ─── Fallback & rate limiting ───────────────────────────────────────────────

#[tokio::test]
async fn unknown_endpoint_is_a_json_404() {
    let app = test_app();
    let (status, body) = get(&app, "/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");
}

#[tokio::test]
async fn global_rate_limit_kicks_in() {
    let app = test_app_with_rate_limit(3, 100);
    let token = test_token(2, "officer");

    for _ in 0..3 {
        let (status, _) = get(&app, "/api/rpp-cases/review", Some(&token)).await;
        // Gate fails (officer on a senior route) but the request counted.
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (status, body) = get(&app, "/api/rpp-cases/review", Some(&token)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many requests, please try again later.");
}

#[tokio::test]
async fn auth_routes_have_a_stricter_limit() {
    let app = test_app_with_rate_limit(100, 2);

    for _ in 0..2 {
        let (status, _) = post_json(&app, "/api/auth/login", "{}", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = post_json(&app, "/api/auth/login", "{}", None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}
