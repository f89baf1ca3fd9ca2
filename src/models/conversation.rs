//! Conversation Models
//!
//! The ordered turn log of a session plus its pending input buffer.

use serde::{Deserialize, Serialize};
use strengths_coach_llm::{Message, MessageRole};
use uuid::Uuid;

use crate::utils::error::{AppError, AppResult};

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

impl From<TurnRole> for MessageRole {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => MessageRole::User,
            TurnRole::Assistant => MessageRole::Assistant,
        }
    }
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == TurnRole::Assistant
    }

    pub fn to_message(&self) -> Message {
        Message::text(self.role.into(), self.content.clone())
    }
}

/// Parse the loosely typed `messages` field of a compatibility request.
///
/// The wire form of a turn is `{ role, content }`.
///
/// The value must be a non-empty array of objects with string `content`
/// and a `role` of `"user"` or `"assistant"`.
pub fn parse_wire_messages(value: &serde_json::Value) -> AppResult<Vec<Turn>> {
    let items = value
        .as_array()
        .filter(|items| !items.is_empty())
        .ok_or_else(|| AppError::invalid_input("messages must be a non-empty array"))?;

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let content = item
                .get("content")
                .and_then(|c| c.as_str())
                .ok_or_else(|| {
                    AppError::invalid_input(format!("messages[{}].content must be a string", idx))
                })?;
            match item.get("role").and_then(|r| r.as_str()) {
                Some("user") => Ok(Turn::user(content)),
                Some("assistant") => Ok(Turn::assistant(content)),
                other => Err(AppError::invalid_input(format!(
                    "messages[{}].role must be \"user\" or \"assistant\", got {:?}",
                    idx, other
                ))),
            }
        })
        .collect()
}

/// Ordered, append-only turn log with the pending input buffer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
    input: String,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self {
            turns,
            input: String::new(),
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Take the buffered input, leaving the buffer empty.
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    /// Append a turn and return its id.
    pub fn push(&mut self, turn: Turn) -> Uuid {
        let id = turn.id;
        self.turns.push(turn);
        id
    }

    /// Append text to the turn with `turn_id`. Returns false if no such turn.
    pub fn append_to(&mut self, turn_id: Uuid, text: &str) -> bool {
        match self.turns.iter_mut().rev().find(|t| t.id == turn_id) {
            Some(turn) => {
                turn.content.push_str(text);
                true
            }
            None => false,
        }
    }

    pub fn turn_mut(&mut self, turn_id: Uuid) -> Option<&mut Turn> {
        self.turns.iter_mut().rev().find(|t| t.id == turn_id)
    }

    /// `role: content` per line, as embedded in the report prompt.
    pub fn transcript_text(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{}: {}", t.role.as_str(), t.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
