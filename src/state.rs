//! Application State
//!
//! Shared state handed to every HTTP handler: configuration, the session
//! registry and the two provider-backed services.

use std::sync::Arc;

use strengths_coach_llm::{create_provider, LlmProvider};

use crate::models::response::HealthResponse;
use crate::models::settings::AppConfig;
use crate::services::coach::ChatOrchestrator;
use crate::services::report::ReportGenerator;
use crate::services::session::{ReportPolicy, SessionStore};
use crate::utils::error::{AppError, AppResult};

/// Application state shared by the router
pub struct AppState {
    config: AppConfig,
    sessions: Arc<SessionStore>,
    /// Absent when no credential is provisioned
    coach: Option<Arc<ChatOrchestrator>>,
    /// Absent when no credential is provisioned
    reporter: Option<Arc<ReportGenerator>>,
}

impl AppState {
    /// Build state from configuration, resolving the credential from the
    /// config file or the environment.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let api_key = config.resolve_api_key();
        Self::with_api_key(config, api_key)
    }

    /// Build state with an explicit credential. `None` leaves the AI
    /// endpoints answering with a missing-credential error.
    pub fn with_api_key(config: AppConfig, api_key: Option<String>) -> AppResult<Self> {
        let Some(api_key) = api_key else {
            tracing::warn!(
                env_var = %config.api_key_env,
                "no provider credential configured, AI endpoints are disabled"
            );
            return Ok(Self::assemble(config, None));
        };

        let chat = create_provider(config.chat_provider_config(Some(api_key.clone())))?;
        let report = create_provider(config.report_provider_config(Some(api_key)))?;
        tracing::info!(
            provider = %config.provider,
            chat_model = %config.chat_model,
            report_model = %config.report_model,
            "providers ready"
        );
        Ok(Self::assemble(config, Some((chat, report))))
    }

    /// Build state around already constructed providers.
    pub fn with_providers(
        config: AppConfig,
        chat: Arc<dyn LlmProvider>,
        report: Arc<dyn LlmProvider>,
    ) -> Self {
        Self::assemble(config, Some((chat, report)))
    }

    fn assemble(
        config: AppConfig,
        providers: Option<(Arc<dyn LlmProvider>, Arc<dyn LlmProvider>)>,
    ) -> Self {
        let policy = ReportPolicy {
            min_turns: config.min_report_turns,
            min_progress: config.min_report_progress,
        };
        let (coach, reporter) = match providers {
            Some((chat, report)) => (
                Some(Arc::new(ChatOrchestrator::new(
                    chat,
                    config.organization.clone(),
                ))),
                Some(Arc::new(ReportGenerator::new(
                    report,
                    config.organization.clone(),
                ))),
            ),
            None => (None, None),
        };
        Self {
            sessions: Arc::new(SessionStore::new(policy)),
            coach,
            reporter,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn credential_configured(&self) -> bool {
        self.coach.is_some()
    }

    fn missing_credential(&self) -> AppError {
        AppError::missing_credential(self.config.api_key_env.clone())
    }

    /// The chat orchestrator, or the missing-credential error.
    pub fn coach(&self) -> AppResult<Arc<ChatOrchestrator>> {
        self.coach.clone().ok_or_else(|| self.missing_credential())
    }

    /// The report generator, or the missing-credential error.
    pub fn reporter(&self) -> AppResult<Arc<ReportGenerator>> {
        self.reporter.clone().ok_or_else(|| self.missing_credential())
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            provider: self.config.provider.to_string(),
            credential_configured: self.credential_configured(),
            ..Default::default()
        }
    }
}
