//! Report Pipeline Integration Tests
//!
//! Report generation through the session store: generated reports are shape
//! checked, failures are stored as the sample report.

use serde_json::json;
use tokio_stream::StreamExt;
use uuid::Uuid;

use strengths_coach::models::report::fallback_report;
use strengths_coach::services::session::SessionPhase;
use strengths_coach::state::AppState;
use strengths_coach::AppError;

use crate::support::{quota_error, state_with, stream, Script};

/// Create a session with two completed exchanges (four turns).
async fn session_ready_for_report(state: &AppState) -> Uuid {
    let store = state.sessions();
    let coach = state.coach().unwrap();
    let id = store.create(Some("佐藤")).await.id;
    for text in ["特養で介護職をしています", "夜勤のときの申し送りです"] {
        let request = store.begin_send(id, Some(text.to_string())).await.unwrap();
        let mut events = coach.send(&request.turns, &request.profile).unwrap();
        while let Some(event) = events.next().await {
            store.apply_chat_event(id, &event).await.unwrap();
        }
    }
    id
}

fn chat_scripts() -> Vec<Script> {
    vec![
        stream(&["どんな場面で力を発揮していますか？"]),
        stream(&["具体的に教えてください。"]),
    ]
}

fn valid_report() -> serde_json::Value {
    json!({
        "focusArea": ["現場の支え手", "チームの調整役"],
        "strengthMap": {"practical": 80, "empathy": "92", "collaboration": 70, "resilience": 65},
        "message": "佐藤さん、夜勤の申し送りを丁寧に続けてきたことが...",
        "identifiedSkills": [
            {"type": "実務", "skillName": "申し送りの精度", "description": "夜勤帯の変化を漏れなく伝える"},
            {"type": "普遍", "skillName": "観察力", "description": "小さな変化に気づく"}
        ]
    })
}

#[tokio::test]
async fn test_report_unavailable_before_enough_turns() {
    let state = state_with(vec![], vec![]);
    let store = state.sessions();
    let id = store.create(None).await.id;

    assert!(!store.get(id).await.unwrap().report_available);
    assert!(matches!(
        store.begin_report(id).await,
        Err(AppError::Busy(_))
    ));
}

#[tokio::test]
async fn test_generated_report_is_stored() {
    let state = state_with(chat_scripts(), vec![Script::Text(valid_report().to_string())]);
    let id = session_ready_for_report(&state).await;
    let store = state.sessions();
    assert!(store.get(id).await.unwrap().report_available);

    let request = store.begin_report(id).await.unwrap();
    assert_eq!(request.conversation.len(), 4);
    let outcome = state
        .reporter()
        .unwrap()
        .generate(&request.conversation, &request.profile)
        .await;
    let stored = store.complete_report(id, outcome).await.unwrap();

    assert!(!stored.is_sample);
    assert_eq!(stored.data, valid_report());
    assert_eq!(stored.data["strengthMap"]["empathy"], "92");

    let view = store.get(id).await.unwrap();
    assert_eq!(view.report, Some(stored));
    assert!(!view.report_available);
}

#[tokio::test]
async fn test_shape_valid_report_is_stored_as_received() {
    let body = json!({
        "focusArea": ["支え手", 7],
        "strengthMap": {"practical": 150, "empathy": "high", "collaboration": 70, "resilience": 65},
        "message": "佐藤さん",
        "identifiedSkills": [
            {"type": "普遍", "skillName": "観察力", "description": "小さな変化に気づく"},
            "stray"
        ]
    });
    let state = state_with(chat_scripts(), vec![Script::Text(body.to_string())]);
    let id = session_ready_for_report(&state).await;
    let store = state.sessions();

    let request = store.begin_report(id).await.unwrap();
    let outcome = state
        .reporter()
        .unwrap()
        .generate(&request.conversation, &request.profile)
        .await;
    let stored = store.complete_report(id, outcome).await.unwrap();

    assert_eq!(serde_json::to_value(&stored.data).unwrap(), body);
    assert_eq!(store.get(id).await.unwrap().report.map(|r| r.data), Some(body));
}

#[tokio::test]
async fn test_quota_failure_stores_sample_report() {
    let state = state_with(chat_scripts(), vec![Script::Fail(quota_error())]);
    let id = session_ready_for_report(&state).await;
    let store = state.sessions();

    let request = store.begin_report(id).await.unwrap();
    let outcome = state
        .reporter()
        .unwrap()
        .generate(&request.conversation, &request.profile)
        .await;
    assert!(outcome.is_fallback());

    let stored = store.complete_report(id, outcome).await.unwrap();
    let fallback = serde_json::to_value(fallback_report()).unwrap();
    assert!(stored.is_sample);
    assert_eq!(stored.data, fallback);
    assert_eq!(
        store.get(id).await.unwrap().report.map(|r| r.data),
        Some(fallback)
    );
}

#[tokio::test]
async fn test_report_missing_skills_is_rejected() {
    let mut body = valid_report();
    body.as_object_mut().unwrap().remove("identifiedSkills");
    let state = state_with(chat_scripts(), vec![Script::Text(body.to_string())]);
    let id = session_ready_for_report(&state).await;
    let store = state.sessions();

    let request = store.begin_report(id).await.unwrap();
    let outcome = state
        .reporter()
        .unwrap()
        .generate(&request.conversation, &request.profile)
        .await;
    assert!(!outcome.is_fallback());

    let err = store.complete_report(id, outcome).await.unwrap_err();
    assert!(matches!(err, AppError::MalformedReport(_)));

    let view = store.get(id).await.unwrap();
    assert!(view.report.is_none());
    assert_eq!(view.phase, SessionPhase::Idle);
    assert!(view.report_available);
}

#[tokio::test]
async fn test_report_prompt_carries_transcript() {
    let state = state_with(chat_scripts(), vec![Script::Text(valid_report().to_string())]);
    let id = session_ready_for_report(&state).await;
    let store = state.sessions();

    let request = store.begin_report(id).await.unwrap();
    let transcript = request.conversation.transcript_text();
    assert!(transcript.contains("user: 特養で介護職をしています"));
    assert!(transcript.contains("assistant: どんな場面で力を発揮していますか？"));
}
