//! Session Store
//!
//! Registry of independent sessions keyed by id. Every operation takes the
//! lock briefly; provider calls always happen outside it.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::session::{ChatRequest, ReportPolicy, ReportRequest, Session, SessionView};
use crate::models::profile::{ProfileContext, ProfileScores};
use crate::models::report::StoredReport;
use crate::services::coach::ChatEvent;
use crate::services::report::ReportOutcome;
use crate::utils::error::{AppError, AppResult};

/// Thread-safe session registry. Designed to be wrapped in `Arc`.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    policy: ReportPolicy,
}

impl SessionStore {
    pub fn new(policy: ReportPolicy) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            policy,
        }
    }

    pub fn policy(&self) -> &ReportPolicy {
        &self.policy
    }

    async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session, &ReportPolicy) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("session {}", id)))?;
        f(session, &self.policy)
    }

    pub async fn create(&self, user_name: Option<&str>) -> SessionView {
        let session = Session::new(user_name);
        let view = session.view(&self.policy);
        tracing::info!(session_id = %session.id, "session created");
        self.sessions.write().await.insert(session.id, session);
        view
    }

    pub async fn get(&self, id: Uuid) -> AppResult<SessionView> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .map(|s| s.view(&self.policy))
            .ok_or_else(|| AppError::not_found(format!("session {}", id)))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn set_profile(
        &self,
        id: Uuid,
        scores: ProfileScores,
        user_name: Option<&str>,
    ) -> AppResult<SessionView> {
        self.with_session(id, |session, policy| {
            session.set_profile(scores, user_name).inspect_err(|e| {
                tracing::info!(session_id = %id, error = %e, "profile update rejected");
            })?;
            Ok(session.view(policy))
        })
        .await
    }

    pub async fn set_input(&self, id: Uuid, text: String) -> AppResult<SessionView> {
        self.with_session(id, |session, policy| {
            session.set_input(text);
            Ok(session.view(policy))
        })
        .await
    }

    pub async fn begin_send(&self, id: Uuid, text: Option<String>) -> AppResult<ChatRequest> {
        self.with_session(id, |session, _| {
            session.begin_send(text).inspect_err(|e| {
                tracing::info!(session_id = %id, error = %e, "send rejected");
            })
        })
        .await
    }

    pub async fn begin_greeting(&self, id: Uuid) -> AppResult<ProfileContext> {
        self.with_session(id, |session, _| {
            session.begin_greeting().inspect_err(|e| {
                tracing::info!(session_id = %id, error = %e, "greeting rejected");
            })
        })
        .await
    }

    pub async fn apply_chat_event(&self, id: Uuid, event: &ChatEvent) -> AppResult<()> {
        self.with_session(id, |session, _| {
            session.apply_chat_event(event);
            Ok(())
        })
        .await
    }

    pub async fn settle_send(&self, id: Uuid) -> AppResult<()> {
        self.with_session(id, |session, _| {
            session.settle_send();
            Ok(())
        })
        .await
    }

    pub async fn begin_report(&self, id: Uuid) -> AppResult<ReportRequest> {
        self.with_session(id, |session, policy| {
            session.begin_report(policy).inspect_err(|e| {
                tracing::info!(session_id = %id, error = %e, "report request rejected");
            })
        })
        .await
    }

    pub async fn complete_report(
        &self,
        id: Uuid,
        outcome: ReportOutcome,
    ) -> AppResult<StoredReport> {
        self.with_session(id, |session, _| {
            session.complete_report(outcome).inspect_err(|e| {
                tracing::warn!(session_id = %id, error = %e, "report not stored");
            })
        })
        .await
    }

    pub async fn reset(&self, id: Uuid) -> AppResult<SessionView> {
        self.with_session(id, |session, policy| {
            session.reset();
            tracing::info!(session_id = %id, "session reset");
            Ok(session.view(policy))
        })
        .await
    }

    pub async fn remove(&self, id: Uuid) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| tracing::info!(session_id = %id, "session removed"))
            .ok_or_else(|| AppError::not_found(format!("session {}", id)))
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(ReportPolicy::default())
    }
}
