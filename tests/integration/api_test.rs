//! HTTP API Integration Tests
//!
//! Requests go through the full router with `tower::ServiceExt::oneshot`.

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use strengths_coach::models::report::fallback_report;

use crate::support::{
    call, call_json, quota_error, router, state_with, state_without_credential, stream, Script,
};

fn chat_body() -> serde_json::Value {
    json!({
        "messages": [
            {"role": "assistant", "content": "どちらの事業所でどのような業務をしてきましたか？"},
            {"role": "user", "content": "特養で介護職をしています"}
        ],
        "mbtiType": "ENTP",
        "userName": "佐藤"
    })
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = router(state_without_credential());
    let (status, body) = call_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "strengths-coach");
    assert_eq!(body["provider"], "gemini");
    assert_eq!(body["credentialConfigured"], false);
}

// ============================================================================
// Compatibility endpoints
// ============================================================================

#[tokio::test]
async fn test_missing_credential_is_500_before_body_checks() {
    let app = router(state_without_credential());
    for uri in ["/api/chat", "/api/report"] {
        let (status, body) = call_json(&app, "POST", uri, Some(json!({"messages": "bad"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Missing GEMINI_API_KEY"}));
    }
}

#[tokio::test]
async fn test_invalid_messages_is_400() {
    let app = router(state_with(vec![], vec![]));
    for body in [
        json!({"messages": "hello"}),
        json!({"messages": []}),
        json!({"mbtiType": "ENTP"}),
        json!({"messages": [{"role": "human", "content": "はじめまして"}]}),
    ] {
        for uri in ["/api/chat", "/api/report"] {
            let (status, response) = call_json(&app, "POST", uri, Some(body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response, json!({"error": "Invalid messages"}));
        }
    }
}

#[tokio::test]
async fn test_chat_streams_raw_text() {
    let app = router(state_with(
        vec![stream(&["こんにちは", "！", ":::STATE:::", "{\"role\":true}"])],
        vec![],
    ));

    // Headers are checked on the raw response, so build the request by hand
    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(chat_body().to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    assert_eq!(response.headers()["cache-control"], "no-cache");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(
        String::from_utf8(bytes.to_vec()).unwrap(),
        "こんにちは！:::STATE:::{\"role\":true}"
    );
}

#[tokio::test]
async fn test_chat_failure_before_text_is_500() {
    let app = router(state_with(vec![Script::Fail(quota_error())], vec![]));
    let (status, body) = call_json(&app, "POST", "/api/chat", Some(chat_body())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal Server Error"}));
}

#[tokio::test]
async fn test_chat_failure_after_text_ends_body_early() {
    let app = router(state_with(
        vec![Script::StreamThenFail(
            vec!["途中".to_string()],
            quota_error(),
        )],
        vec![],
    ));
    let (status, text) = call(&app, "POST", "/api/chat", Some(chat_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "途中");
}

#[tokio::test]
async fn test_report_success_returns_raw_json() {
    let report = json!({
        "focusArea": ["現場の支え手"],
        "strengthMap": {"practical": 70, "empathy": 90, "collaboration": 60, "resilience": 75},
        "message": "佐藤さん",
        "identifiedSkills": []
    });
    let app = router(state_with(vec![], vec![Script::Text(report.to_string())]));
    let (status, body) = call_json(&app, "POST", "/api/report", Some(chat_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, report);
}

#[tokio::test]
async fn test_report_failure_is_503_with_mock_data() {
    let app = router(state_with(vec![], vec![Script::Fail(quota_error())]));
    let (status, body) = call_json(&app, "POST", "/api/report", Some(chat_body())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "API_LIMIT_REACHED");
    assert_eq!(
        body["message"],
        "現在アクセスが集中しているか、API制限に達しました。"
    );
    assert_eq!(body["mockData"], serde_json::to_value(fallback_report()).unwrap());
}

// ============================================================================
// Session API
// ============================================================================

#[tokio::test]
async fn test_session_api_flow() {
    let report = json!({
        "focusArea": ["現場の支え手"],
        "strengthMap": {"practical": 70, "empathy": 90, "collaboration": 60, "resilience": 75},
        "message": "佐藤さん",
        "identifiedSkills": [{"type": "普遍", "skillName": "観察力", "description": "気づく"}]
    });
    let app = router(state_with(
        vec![
            stream(&["こんにちは！", ":::STATE:::{\"officeHistory\":true}"]),
            stream(&["どの場面ですか？:::CHOICES:::[\"朝\",\"夜勤\"]"]),
        ],
        vec![Script::Text(report.to_string())],
    ));

    let (status, created) =
        call_json(&app, "POST", "/api/sessions", Some(json!({"userName": "佐藤"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["success"], true);
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let base = format!("/api/sessions/{}", id);

    let (status, profile) = call_json(
        &app,
        "PUT",
        &format!("{}/profile", base),
        Some(json!({"ei": -50, "sn": 30, "tf": -10, "jp": 60})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["data"]["typeCode"], "ENTP");

    let (status, text) = call(&app, "POST", &format!("{}/greeting", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "こんにちは！:::STATE:::{\"officeHistory\":true}");

    call_json(
        &app,
        "PUT",
        &format!("{}/input", base),
        Some(json!({"text": "特養です"})),
    )
    .await;
    let (status, _) = call(&app, "POST", &format!("{}/messages", base), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, view) = call_json(&app, "GET", &base, None).await;
    let data = &view["data"];
    assert_eq!(data["phase"], "idle");
    assert_eq!(data["turns"][0]["content"], "こんにちは！");
    assert_eq!(data["turns"][1]["content"], "特養です");
    assert_eq!(data["turns"][2]["content"], "どの場面ですか？");
    assert_eq!(data["turns"][2]["choices"], json!(["朝", "夜勤"]));
    assert_eq!(data["understanding"]["officeHistory"], true);
    assert_eq!(data["progress"], 10);
    assert_eq!(data["input"], "");
    assert_eq!(data["reportAvailable"], true);

    let (status, stored) = call_json(&app, "POST", &format!("{}/report", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["data"]["isSample"], false);
    assert_eq!(stored["data"]["data"]["identifiedSkills"][0]["skillName"], "観察力");

    let (status, conflict) = call_json(&app, "POST", &format!("{}/report", base), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(conflict["success"], false);

    let (status, _) = call_json(&app, "DELETE", &base, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, missing) = call_json(&app, "GET", &base, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["success"], false);
}

#[tokio::test]
async fn test_session_report_fallback_is_sample() {
    let app = router(state_with(
        vec![stream(&["はい"]), stream(&["なるほど"])],
        vec![Script::Fail(quota_error())],
    ));
    let (_, created) = call_json(&app, "POST", "/api/sessions", None).await;
    let base = format!("/api/sessions/{}", created["data"]["id"].as_str().unwrap());

    for content in ["一つ目", "二つ目"] {
        let (status, _) = call(
            &app,
            "POST",
            &format!("{}/messages", base),
            Some(json!({"content": content})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, stored) = call_json(&app, "POST", &format!("{}/report", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["data"]["isSample"], true);
    assert_eq!(
        stored["data"]["data"],
        serde_json::to_value(fallback_report()).unwrap()
    );
}

#[tokio::test]
async fn test_session_errors() {
    let app = router(state_with(vec![], vec![]));
    let (_, created) = call_json(&app, "POST", "/api/sessions", None).await;
    let base = format!("/api/sessions/{}", created["data"]["id"].as_str().unwrap());

    let (status, body) = call_json(
        &app,
        "PUT",
        &format!("{}/profile", base),
        Some(json!({"ei": 500, "sn": 0, "tf": 0, "jp": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = call_json(
        &app,
        "POST",
        &format!("{}/messages", base),
        Some(json!({"content": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call_json(&app, "POST", &format!("{}/report", base), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let unknown = format!("/api/sessions/{}", uuid::Uuid::new_v4());
    let (status, _) = call_json(&app, "GET", &unknown, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_messages_without_credential() {
    let app = router(state_without_credential());
    let (_, created) = call_json(&app, "POST", "/api/sessions", None).await;
    let base = format!("/api/sessions/{}", created["data"]["id"].as_str().unwrap());

    let (status, body) = call_json(
        &app,
        "POST",
        &format!("{}/messages", base),
        Some(json!({"content": "こんにちは"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Missing GEMINI_API_KEY");

    // Nothing was appended
    let (_, view) = call_json(&app, "GET", &base, None).await;
    assert_eq!(view["data"]["turns"], json!([]));
}
