//! Strengths Coach Core
//!
//! Foundational types shared by the provider crate and the application crate.
//! This crate has no dependency on HTTP, providers or session state.
//!
//! ## Module Organization
//!
//! - `streaming` - Unified stream event types and adapter trait

pub mod streaming;

// ── Streaming Types ────────────────────────────────────────────────────
pub use streaming::{AdapterError, StreamAdapter, UnifiedStreamEvent};
