//! Settings Models
//!
//! Application configuration stored in config.json.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use strengths_coach_llm::{ProviderConfig, ProviderType};

/// Organization the coach works for; injected into every prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationContext {
    /// Name as it should appear in prompts
    pub name: String,
    /// Free-form background (values, career paths, office structure)
    #[serde(default)]
    pub description: String,
}

impl Default for OrganizationContext {
    fn default() -> Self {
        Self {
            name: "社会福祉法人 南山城学園".to_string(),
            description: "\
- 高齢・障害・児童など複数の事業所を運営する社会福祉法人。
- 若手職員は「スーパーローテーション」で複数の事業所を経験することがある。
- 行動指針として「7つの誓い」を掲げている。
- キャリアパスは マネジメント / エキスパート / シニア の3つ。"
                .to_string(),
        }
    }
}

/// Application configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM provider backing chat and report generation
    #[serde(default)]
    pub provider: ProviderType,
    /// API key; when absent it is read from `api_key_env`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Base URL override for the provider API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model used for the streamed coach conversation
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Output token cap for chat replies
    #[serde(default = "default_chat_max_tokens")]
    pub chat_max_tokens: u32,
    /// Model used for the structured report
    #[serde(default = "default_report_model")]
    pub report_model: String,
    /// Output token cap for the report
    #[serde(default = "default_report_max_tokens")]
    pub report_max_tokens: u32,
    /// Sampling temperature (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Whole-request timeout for provider calls, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Organization context injected into prompts
    #[serde(default)]
    pub organization: OrganizationContext,
    /// Minimum transcript length before a report can be requested
    #[serde(default = "default_min_report_turns")]
    pub min_report_turns: usize,
    /// Minimum progress gauge value before a report can be requested
    #[serde(default)]
    pub min_report_progress: u8,
}

fn default_api_key_env() -> String {
    ProviderType::Gemini.default_api_key_env().to_string()
}

fn default_chat_model() -> String {
    "gemini-flash-latest".to_string()
}

fn default_chat_max_tokens() -> u32 {
    1000
}

fn default_report_model() -> String {
    "gemini-pro-latest".to_string()
}

fn default_report_max_tokens() -> u32 {
    8192
}

fn default_temperature() -> f32 {
    0.7
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_bind_address() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_min_report_turns() -> usize {
    3
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderType::Gemini,
            api_key: None,
            api_key_env: default_api_key_env(),
            base_url: None,
            chat_model: default_chat_model(),
            chat_max_tokens: default_chat_max_tokens(),
            report_model: default_report_model(),
            report_max_tokens: default_report_max_tokens(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            bind_address: default_bind_address(),
            organization: OrganizationContext::default(),
            min_report_turns: default_min_report_turns(),
            min_report_progress: 0,
        }
    }
}

impl AppConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "Invalid temperature: {}. Must be between 0.0 and 2.0",
                self.temperature
            ));
        }

        if self.chat_max_tokens == 0 || self.report_max_tokens == 0 {
            return Err("chat_max_tokens and report_max_tokens must be greater than 0".to_string());
        }

        if self.chat_model.trim().is_empty() || self.report_model.trim().is_empty() {
            return Err("chat_model and report_model must not be empty".to_string());
        }

        if self.api_key_env.trim().is_empty() {
            return Err("api_key_env must not be empty".to_string());
        }

        if self.bind_address.parse::<SocketAddr>().is_err() {
            return Err(format!("Invalid bind_address: {}", self.bind_address));
        }

        if self.min_report_progress > 100 {
            return Err("min_report_progress cannot exceed 100".to_string());
        }

        Ok(())
    }

    /// Resolve the API key from the config file, then the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| {
                std::env::var(&self.api_key_env)
                    .ok()
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
            })
    }

    /// Provider settings for the streamed coach conversation.
    pub fn chat_provider_config(&self, api_key: Option<String>) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider,
            api_key,
            base_url: self.base_url.clone(),
            model: self.chat_model.clone(),
            max_tokens: self.chat_max_tokens,
            temperature: self.temperature,
            timeout_secs: self.request_timeout_secs,
        }
    }

    /// Provider settings for report generation.
    pub fn report_provider_config(&self, api_key: Option<String>) -> ProviderConfig {
        self.chat_provider_config(api_key)
            .with_model(&self.report_model, self.report_max_tokens)
    }
}
