//! Chat Orchestrator
//!
//! Sends a transcript and profile context to the chat provider and turns the
//! provider's incremental output into [`ChatEvent`]s bound to one new
//! assistant turn. The orchestrator never touches session state; consumers
//! fold the events themselves.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::Stream;
use serde::{Deserialize, Serialize};
use strengths_coach_core::streaming::UnifiedStreamEvent;
use strengths_coach_llm::{LlmProvider, LlmRequestOptions, Message};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::models::conversation::Turn;
use crate::models::profile::ProfileContext;
use crate::models::settings::OrganizationContext;
use crate::services::persona::{
    build_coach_system_prompt, Persona, PersonaRegistry, PersonaRole, GREETING_KICKOFF,
};
use crate::utils::error::{AppError, AppResult};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events produced for one assistant reply.
///
/// Always `Started`, then any number of `Fragment`s, then exactly one of
/// `Finished` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChatEvent {
    #[serde(rename_all = "camelCase")]
    Started { turn_id: Uuid },
    #[serde(rename_all = "camelCase")]
    Fragment { turn_id: Uuid, text: String },
    #[serde(rename_all = "camelCase")]
    Finished { turn_id: Uuid },
    #[serde(rename_all = "camelCase")]
    Failed { turn_id: Uuid, message: String },
}

impl ChatEvent {
    pub fn turn_id(&self) -> Uuid {
        match self {
            ChatEvent::Started { turn_id }
            | ChatEvent::Fragment { turn_id, .. }
            | ChatEvent::Finished { turn_id }
            | ChatEvent::Failed { turn_id, .. } => *turn_id,
        }
    }

    /// Whether this event ends the reply.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::Finished { .. } | ChatEvent::Failed { .. })
    }
}

/// Lazy, finite, non-restartable sequence of chat events.
pub type ChatEventStream = Pin<Box<dyn Stream<Item = ChatEvent> + Send>>;

/// Streams coach replies from the chat provider.
pub struct ChatOrchestrator {
    provider: Arc<dyn LlmProvider>,
    persona: Persona,
    organization: OrganizationContext,
}

impl ChatOrchestrator {
    pub fn new(provider: Arc<dyn LlmProvider>, organization: OrganizationContext) -> Self {
        Self {
            provider,
            persona: PersonaRegistry::get(PersonaRole::CareerCoach),
            organization,
        }
    }

    /// Start streaming the reply to the newest turn of `turns`.
    ///
    /// The newest turn must be user-authored; everything before it is
    /// history. Must be called from within a tokio runtime.
    pub fn send(&self, turns: &[Turn], profile: &ProfileContext) -> AppResult<ChatEventStream> {
        let newest = turns
            .last()
            .ok_or_else(|| AppError::invalid_input("transcript is empty"))?;
        if newest.is_assistant() {
            return Err(AppError::invalid_input(
                "the newest turn must be user-authored",
            ));
        }

        let messages: Vec<Message> = turns.iter().map(Turn::to_message).collect();
        let system = build_coach_system_prompt(&self.persona, &self.organization, profile);

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let provider = Arc::clone(&self.provider);
        tokio::spawn(run_reply(provider, messages, system, tx));

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    /// Stream the opening greeting. The kickoff turn is sent to the
    /// provider only and never appears in any transcript.
    pub fn greeting(&self, profile: &ProfileContext) -> AppResult<ChatEventStream> {
        self.send(&[Turn::user(GREETING_KICKOFF)], profile)
    }
}

async fn run_reply(
    provider: Arc<dyn LlmProvider>,
    messages: Vec<Message>,
    system: String,
    tx: mpsc::Sender<ChatEvent>,
) {
    let turn_id = Uuid::new_v4();
    if tx.send(ChatEvent::Started { turn_id }).await.is_err() {
        return;
    }

    let (llm_tx, mut llm_rx) = mpsc::channel::<UnifiedStreamEvent>(EVENT_CHANNEL_CAPACITY);
    let request = provider.stream_message(
        messages,
        Some(system),
        llm_tx,
        LlmRequestOptions::default(),
    );

    let fragment_tx = tx.clone();
    let forward = async move {
        let mut fragments = 0usize;
        while let Some(event) = llm_rx.recv().await {
            let Some(text) = event.text() else {
                continue;
            };
            let fragment = ChatEvent::Fragment {
                turn_id,
                text: text.to_string(),
            };
            if fragment_tx.send(fragment).await.is_err() {
                break;
            }
            fragments += 1;
        }
        fragments
    };

    let (result, fragments) = tokio::join!(request, forward);

    let terminal = match result {
        Ok(response) => {
            tracing::debug!(
                turn_id = %turn_id,
                provider = provider.name(),
                model = %response.model,
                fragments,
                output_tokens = response.usage.output_tokens,
                "chat reply finished"
            );
            ChatEvent::Finished { turn_id }
        }
        Err(e) => {
            tracing::warn!(
                turn_id = %turn_id,
                provider = provider.name(),
                model = provider.model(),
                fragments,
                error = %e,
                "chat reply failed"
            );
            ChatEvent::Failed {
                turn_id,
                message: e.to_string(),
            }
        }
    };
    let _ = tx.send(terminal).await;
}
