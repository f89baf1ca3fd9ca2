//! Session Flow Integration Tests
//!
//! Drive the orchestrator against a scripted provider and fold its events
//! through the session store, the way the HTTP layer does.

use tokio_stream::StreamExt;
use uuid::Uuid;

use strengths_coach::models::profile::ProfileScores;
use strengths_coach::services::coach::ChatEventStream;
use strengths_coach::services::persona::fallback_greeting;
use strengths_coach::services::session::{SessionPhase, SessionStore};
use strengths_coach::AppError;
use strengths_coach_llm::LlmError;

use crate::support::{state_with, stream, Script};

async fn fold(store: &SessionStore, id: Uuid, mut events: ChatEventStream) {
    while let Some(event) = events.next().await {
        store.apply_chat_event(id, &event).await.unwrap();
    }
}

// ============================================================================
// Streaming fold
// ============================================================================

#[tokio::test]
async fn test_end_to_end_send_updates_transcript_and_understanding() {
    let state = state_with(
        vec![stream(&[
            "こんにちは",
            "！",
            ":::STATE:::",
            r#"{"officeHistory":true,"role":false,"duties":false,"episode":false,"strengths":false,"episodeCount":0,"strengthsCount":0,"rotationStatus":"unknown"}"#,
        ])],
        vec![],
    );
    let store = state.sessions();
    let coach = state.coach().unwrap();

    let id = store.create(Some("佐藤")).await.id;
    let view = store
        .set_profile(id, ProfileScores::new(-50, 30, -10, 60), None)
        .await
        .unwrap();
    assert_eq!(view.type_code, "ENTP");

    let request = store
        .begin_send(id, Some("よろしくお願いします".to_string()))
        .await
        .unwrap();
    assert_eq!(store.get(id).await.unwrap().phase, SessionPhase::Sending);

    let events = coach.send(&request.turns, &request.profile).unwrap();
    fold(store, id, events).await;

    let view = store.get(id).await.unwrap();
    assert_eq!(view.phase, SessionPhase::Idle);
    assert_eq!(view.turns.len(), 2);
    assert_eq!(view.turns[0].content, "よろしくお願いします");
    assert_eq!(view.turns[1].content, "こんにちは！");
    assert!(view.understanding.office_history);
    assert_eq!(view.progress, 10);
}

#[tokio::test]
async fn test_mid_stream_failure_keeps_partial_content() {
    let state = state_with(
        vec![Script::StreamThenFail(
            vec!["特養での".to_string(), "お仕事".to_string()],
            LlmError::NetworkError {
                message: "connection reset".to_string(),
            },
        )],
        vec![],
    );
    let store = state.sessions();
    let id = store.create(None).await.id;

    let request = store
        .begin_send(id, Some("特養です".to_string()))
        .await
        .unwrap();
    let events = state
        .coach()
        .unwrap()
        .send(&request.turns, &request.profile)
        .unwrap();
    fold(store, id, events).await;

    let view = store.get(id).await.unwrap();
    assert_eq!(view.phase, SessionPhase::Idle);
    assert_eq!(view.turns[1].content, "特養でのお仕事");

    // The session accepts the next message after a failure
    assert!(store.begin_send(id, Some("続き".to_string())).await.is_ok());
}

#[tokio::test]
async fn test_send_while_sending_is_rejected() {
    let state = state_with(vec![], vec![]);
    let store = state.sessions();
    let id = store.create(None).await.id;

    store.begin_send(id, Some("一つ目".to_string())).await.unwrap();
    let err = store
        .begin_send(id, Some("二つ目".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Busy(_)));
    assert_eq!(store.get(id).await.unwrap().turns.len(), 1);
}

#[tokio::test]
async fn test_state_survives_turn_without_payload() {
    let state = state_with(
        vec![
            stream(&["はい:::STATE:::{\"duties\":true,\"episodeCount\":1}"]),
            stream(&["なるほど、詳しく教えてください"]),
        ],
        vec![],
    );
    let store = state.sessions();
    let coach = state.coach().unwrap();
    let id = store.create(None).await.id;

    for text in ["一つ目", "二つ目"] {
        let request = store.begin_send(id, Some(text.to_string())).await.unwrap();
        let events = coach.send(&request.turns, &request.profile).unwrap();
        fold(store, id, events).await;
    }

    let view = store.get(id).await.unwrap();
    assert!(view.understanding.duties);
    assert_eq!(view.understanding.episode_count, 1);
    assert_eq!(view.progress, 23);
}

// ============================================================================
// Greeting
// ============================================================================

#[tokio::test]
async fn test_greeting_is_first_turn() {
    let state = state_with(vec![stream(&["こんにちは、", "コーチです。"])], vec![]);
    let store = state.sessions();
    let id = store.create(None).await.id;

    let profile = store.begin_greeting(id).await.unwrap();
    let events = state.coach().unwrap().greeting(&profile).unwrap();
    fold(store, id, events).await;

    let view = store.get(id).await.unwrap();
    assert_eq!(view.turns.len(), 1);
    assert_eq!(view.turns[0].content, "こんにちは、コーチです。");
    assert!(matches!(
        store.begin_greeting(id).await,
        Err(AppError::Busy(_))
    ));
}

#[tokio::test]
async fn test_failed_greeting_uses_local_fallback() {
    let state = state_with(
        vec![Script::Fail(LlmError::ServerError {
            message: "unavailable".to_string(),
            status: Some(503),
        })],
        vec![],
    );
    let store = state.sessions();
    let id = store.create(None).await.id;
    store
        .set_profile(id, ProfileScores::new(-50, 30, -10, 60), None)
        .await
        .unwrap();

    let profile = store.begin_greeting(id).await.unwrap();
    let events = state.coach().unwrap().greeting(&profile).unwrap();
    fold(store, id, events).await;

    let view = store.get(id).await.unwrap();
    assert_eq!(view.phase, SessionPhase::Idle);
    assert_eq!(view.turns[0].content, fallback_greeting("ENTP"));
}

#[tokio::test]
async fn test_profile_locked_once_conversation_begins() {
    let state = state_with(vec![], vec![]);
    let store = state.sessions();
    let id = store.create(None).await.id;

    let err = store
        .set_profile(id, ProfileScores::new(0, 0, 0, 150), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    store.begin_send(id, Some("a".to_string())).await.unwrap();
    store.settle_send(id).await.unwrap();
    let err = store
        .set_profile(id, ProfileScores::new(10, 10, 10, 10), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Busy(_)));
}
