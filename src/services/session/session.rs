//! Session
//!
//! Per-session state: profile, transcript, understanding record, stored
//! report and the single-flight phase machine. Chat events are folded in
//! here; nothing else mutates the transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::conversation::{Conversation, Turn, TurnRole};
use crate::models::profile::{ProfileContext, ProfileScores};
use crate::models::report::StoredReport;
use crate::models::understanding::UnderstandingState;
use crate::services::coach::ChatEvent;
use crate::services::extraction::{extract_choices, latest_state, visible_text};
use crate::services::persona::fallback_greeting;
use crate::services::progress::progress_percent;
use crate::services::report::ReportOutcome;
use crate::utils::error::{AppError, AppResult};

/// Single-flight phase. The loading flag is `phase != Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    #[default]
    Idle,
    Sending,
    GeneratingReport,
}

/// When a report may be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPolicy {
    pub min_turns: usize,
    pub min_progress: u8,
}

impl Default for ReportPolicy {
    fn default() -> Self {
        Self {
            min_turns: 3,
            min_progress: 0,
        }
    }
}

/// What the orchestrator needs to answer the newest turn.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub turns: Vec<Turn>,
    pub profile: ProfileContext,
}

/// What the report generator needs.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub conversation: Conversation,
    pub profile: ProfileContext,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    user_name: String,
    scores: ProfileScores,
    conversation: Conversation,
    understanding: UnderstandingState,
    phase: SessionPhase,
    report: Option<StoredReport>,
    /// Assistant turn currently receiving fragments
    active_turn: Option<Uuid>,
    /// The in-flight reply is the opening greeting
    greeting: bool,
}

impl Session {
    pub fn new(user_name: Option<&str>) -> Self {
        Self::with_id(Uuid::new_v4(), user_name)
    }

    fn with_id(id: Uuid, user_name: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            updated_at: now,
            user_name: user_name.map(str::trim).unwrap_or_default().to_string(),
            scores: ProfileScores::default(),
            conversation: Conversation::new(),
            understanding: UnderstandingState::default(),
            phase: SessionPhase::Idle,
            report: None,
            active_turn: None,
            greeting: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase != SessionPhase::Idle
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn understanding(&self) -> &UnderstandingState {
        &self.understanding
    }

    pub fn report(&self) -> Option<&StoredReport> {
        self.report.as_ref()
    }

    pub fn scores(&self) -> ProfileScores {
        self.scores
    }

    pub fn profile_context(&self) -> ProfileContext {
        ProfileContext::new(Some(&self.user_name), self.scores.type_code())
    }

    pub fn progress(&self) -> u8 {
        progress_percent(&self.understanding)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn require_idle(&self, action: &str) -> AppResult<()> {
        if self.phase == SessionPhase::Idle {
            Ok(())
        } else {
            Err(AppError::busy(format!(
                "cannot {} while the session is {:?}",
                action, self.phase
            )))
        }
    }

    /// Update slider values and, if given, the display name. Locked once
    /// the conversation has begun.
    pub fn set_profile(&mut self, scores: ProfileScores, user_name: Option<&str>) -> AppResult<()> {
        scores.validate()?;
        self.require_idle("change the profile")?;
        if !self.conversation.is_empty() {
            return Err(AppError::busy(
                "the profile is read-only once the conversation has begun",
            ));
        }
        self.scores = scores;
        if let Some(name) = user_name {
            self.user_name = name.trim().to_string();
        }
        self.touch();
        Ok(())
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.conversation.set_input(text);
        self.touch();
    }

    /// Append a user turn and enter `Sending`.
    ///
    /// Uses `text` when given, otherwise the buffered input. Blank text is
    /// rejected and leaves the buffer untouched.
    pub fn begin_send(&mut self, text: Option<String>) -> AppResult<ChatRequest> {
        self.require_idle("send a message")?;

        let content = match text {
            Some(text) => text,
            None => self.conversation.input().to_string(),
        };
        if content.trim().is_empty() {
            return Err(AppError::invalid_input("message must not be blank"));
        }

        self.conversation.take_input();
        self.conversation.push(Turn::user(content));
        self.phase = SessionPhase::Sending;
        self.greeting = false;
        self.touch();

        Ok(ChatRequest {
            turns: self.conversation.turns().to_vec(),
            profile: self.profile_context(),
        })
    }

    /// Enter `Sending` for the opening greeting. Only valid on an empty
    /// transcript.
    pub fn begin_greeting(&mut self) -> AppResult<ProfileContext> {
        self.require_idle("request a greeting")?;
        if !self.conversation.is_empty() {
            return Err(AppError::busy("the conversation has already begun"));
        }
        self.phase = SessionPhase::Sending;
        self.greeting = true;
        self.touch();
        Ok(self.profile_context())
    }

    /// Fold one chat event into the transcript.
    ///
    /// Events for a turn other than the one in flight are ignored, so a
    /// reply that outlives a reset cannot write into the new session.
    pub fn apply_chat_event(&mut self, event: &ChatEvent) {
        match event {
            ChatEvent::Started { turn_id } => {
                if self.phase != SessionPhase::Sending || self.active_turn.is_some() {
                    tracing::debug!(session_id = %self.id, turn_id = %turn_id, "ignoring unexpected start");
                    return;
                }
                self.conversation.push(Turn {
                    id: *turn_id,
                    role: TurnRole::Assistant,
                    content: String::new(),
                });
                self.active_turn = Some(*turn_id);
            }
            ChatEvent::Fragment { turn_id, text } => {
                if self.active_turn != Some(*turn_id) {
                    return;
                }
                self.conversation.append_to(*turn_id, text);
                if let Some(snapshot) = latest_state(self.conversation.turns()) {
                    self.understanding.merge(snapshot);
                }
            }
            ChatEvent::Finished { turn_id } | ChatEvent::Failed { turn_id, .. } => {
                if self.active_turn != Some(*turn_id) {
                    return;
                }
                self.finish_reply();
            }
        }
        self.touch();
    }

    /// Return to `Idle` after a reply stream ended, with or without a
    /// terminal event.
    pub fn settle_send(&mut self) {
        if self.phase == SessionPhase::Sending {
            self.finish_reply();
            self.touch();
        }
    }

    fn finish_reply(&mut self) {
        if self.greeting {
            let fallback = fallback_greeting(&self.scores.type_code());
            match self.active_turn.and_then(|id| self.conversation.turn_mut(id)) {
                Some(turn) if turn.content.trim().is_empty() => turn.content = fallback,
                Some(_) => {}
                None => {
                    self.conversation.push(Turn::assistant(fallback));
                }
            }
        }
        self.active_turn = None;
        self.greeting = false;
        self.phase = SessionPhase::Idle;
    }

    pub fn report_available(&self, policy: &ReportPolicy) -> bool {
        self.phase == SessionPhase::Idle
            && self.report.is_none()
            && self.conversation.len() >= policy.min_turns
            && self.progress() >= policy.min_progress
    }

    /// Enter `GeneratingReport`.
    pub fn begin_report(&mut self, policy: &ReportPolicy) -> AppResult<ReportRequest> {
        self.require_idle("generate a report")?;
        if !self.report_available(policy) {
            return Err(AppError::busy("a report is not available yet"));
        }
        self.phase = SessionPhase::GeneratingReport;
        self.touch();
        Ok(ReportRequest {
            conversation: self.conversation.clone(),
            profile: self.profile_context(),
        })
    }

    /// Store the outcome of report generation and return to `Idle`.
    ///
    /// A generated report that fails the shape check is not stored.
    pub fn complete_report(&mut self, outcome: ReportOutcome) -> AppResult<StoredReport> {
        if self.phase != SessionPhase::GeneratingReport {
            return Err(AppError::busy("no report generation is in progress"));
        }
        self.phase = SessionPhase::Idle;
        self.touch();

        let stored = match outcome {
            ReportOutcome::Generated(value) => StoredReport::generated(value).ok_or_else(|| {
                AppError::malformed_report(
                    "strengthMap must be an object and identifiedSkills an array",
                )
            })?,
            ReportOutcome::Fallback { notice, report, .. } => {
                StoredReport::sample(&report, notice)?
            }
        };
        self.report = Some(stored.clone());
        Ok(stored)
    }

    /// Start over under the same id.
    pub fn reset(&mut self) {
        *self = Self::with_id(self.id, None);
    }

    pub fn view(&self, policy: &ReportPolicy) -> SessionView {
        let profile = self.profile_context();
        SessionView {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            user_name: self.user_name.clone(),
            call_name: profile.call_name(),
            type_code: profile.type_code,
            profile: self.scores,
            turns: self.conversation.turns().iter().map(TurnView::from).collect(),
            input: self.conversation.input().to_string(),
            understanding: self.understanding,
            progress: self.progress(),
            report_available: self.report_available(policy),
            report: self.report.clone(),
            phase: self.phase,
        }
    }
}

/// A turn as shown to the person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnView {
    pub id: Uuid,
    pub role: TurnRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl From<&Turn> for TurnView {
    fn from(turn: &Turn) -> Self {
        let (content, choices) = match turn.role {
            TurnRole::Assistant => (
                visible_text(&turn.content).to_string(),
                extract_choices(&turn.content),
            ),
            TurnRole::User => (turn.content.clone(), Vec::new()),
        };
        Self {
            id: turn.id,
            role: turn.role,
            content,
            choices,
        }
    }
}

/// Snapshot of a session for the HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_name: String,
    pub call_name: String,
    pub type_code: String,
    pub profile: ProfileScores,
    pub turns: Vec<TurnView>,
    pub input: String,
    pub understanding: UnderstandingState,
    pub progress: u8,
    pub report_available: bool,
    pub report: Option<StoredReport>,
    pub phase: SessionPhase,
}
