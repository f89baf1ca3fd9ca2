//! Coach Conversation
//!
//! Streamed coach replies as turn-bound fragment events.

pub mod orchestrator;

pub use orchestrator::{ChatEvent, ChatEventStream, ChatOrchestrator};
