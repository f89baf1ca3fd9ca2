//! Provider Factory

use std::sync::Arc;

use crate::gemini::GeminiProvider;
use crate::openai::OpenAIProvider;
use crate::provider::LlmProvider;
use crate::types::{LlmResult, ProviderConfig, ProviderType};

/// Create an LLM provider from a ProviderConfig.
///
/// Maps ProviderType to the concrete provider implementation.
pub fn create_provider(config: ProviderConfig) -> LlmResult<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match config.provider {
        ProviderType::Gemini => Arc::new(GeminiProvider::new(config)?),
        ProviderType::OpenAI => Arc::new(OpenAIProvider::new(config)?),
    };
    Ok(provider)
}
