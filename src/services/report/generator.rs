//! Report Generator
//!
//! One non-streamed, JSON-mode call that turns a finished transcript into a
//! strengths portfolio. Every failure collapses into the sample-report
//! fallback.

use std::sync::Arc;

use serde_json::Value;
use strengths_coach_llm::{LlmProvider, LlmRequestOptions, Message};

use crate::models::conversation::Conversation;
use crate::models::profile::ProfileContext;
use crate::models::report::{fallback_report, ReportData, FALLBACK_CODE, FALLBACK_NOTICE};
use crate::models::settings::OrganizationContext;
use crate::services::persona::{build_report_prompt, Persona, PersonaRegistry, PersonaRole};
use crate::utils::error::{AppError, AppResult};

/// Result of a report request.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// Parsed model output, returned verbatim. Shape is checked by the consumer.
    Generated(Value),
    /// Generation failed; carries the canned sample.
    Fallback {
        code: &'static str,
        notice: String,
        report: ReportData,
    },
}

impl ReportOutcome {
    pub fn fallback() -> Self {
        ReportOutcome::Fallback {
            code: FALLBACK_CODE,
            notice: FALLBACK_NOTICE.to_string(),
            report: fallback_report(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ReportOutcome::Fallback { .. })
    }
}

/// Generates the strengths portfolio from a transcript.
pub struct ReportGenerator {
    provider: Arc<dyn LlmProvider>,
    persona: Persona,
    organization: OrganizationContext,
}

impl ReportGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, organization: OrganizationContext) -> Self {
        Self {
            provider,
            persona: PersonaRegistry::get(PersonaRole::PortfolioAnalyst),
            organization,
        }
    }

    /// Generate a report, falling back to the sample on any failure.
    pub async fn generate(
        &self,
        conversation: &Conversation,
        profile: &ProfileContext,
    ) -> ReportOutcome {
        match self.try_generate(conversation, profile).await {
            Ok(value) => {
                tracing::info!(
                    provider = self.provider.name(),
                    model = self.provider.model(),
                    turns = conversation.len(),
                    "report generated"
                );
                ReportOutcome::Generated(value)
            }
            Err(e) => {
                let quota_exhausted = matches!(&e, AppError::Llm(llm) if llm.is_quota_exhausted());
                tracing::error!(
                    provider = self.provider.name(),
                    model = self.provider.model(),
                    quota_exhausted,
                    error = %e,
                    "report generation failed, serving sample report"
                );
                ReportOutcome::fallback()
            }
        }
    }

    async fn try_generate(
        &self,
        conversation: &Conversation,
        profile: &ProfileContext,
    ) -> AppResult<Value> {
        let prompt = build_report_prompt(
            &self.persona,
            &self.organization,
            profile,
            &conversation.transcript_text(),
        );

        let response = self
            .provider
            .send_message(vec![Message::user(prompt)], None, LlmRequestOptions::json())
            .await?;

        let text = response
            .text()
            .ok_or_else(|| AppError::malformed_report("report output was empty"))?;

        let body = report_body(text)
            .ok_or_else(|| AppError::malformed_report("report output has no JSON object"))?;
        Ok(serde_json::from_str(body)?)
    }
}

/// The `{...}` span of a report response.
///
/// JSON mode normally returns a bare object, but some models still wrap it
/// in a code fence or a short lead-in sentence. The span runs from the first
/// `{` to the last `}`; a parsed span is therefore always an object.
fn report_body(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
