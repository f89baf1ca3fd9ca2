//! Strengths Coach LLM
//!
//! Provides a unified interface for the text-generation capability the coach
//! relies on:
//! - Google Gemini (default)
//! - OpenAI-compatible chat completions
//!
//! Also includes provider-specific streaming adapters, the HTTP client factory
//! and the provider factory.

pub mod factory;
pub mod gemini;
pub mod http_client;
pub mod openai;
pub mod provider;
pub mod streaming_adapters;
pub mod types;

// Re-export main types
pub use factory::create_provider;
pub use gemini::GeminiProvider;
pub use http_client::build_http_client;
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use types::*;

// Re-export streaming adapters
pub use streaming_adapters::{GeminiAdapter, OpenAIAdapter};
