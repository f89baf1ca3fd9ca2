//! Persona Types
//!
//! Core types for the AI persona system. Each generation pass is voiced by
//! a persona with its own identity and rule sections.

use serde::{Deserialize, Serialize};

/// AI persona roles, one per generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaRole {
    /// In-house career coach: the streamed conversation
    CareerCoach,
    /// Career advisor: the structured portfolio report
    PortfolioAnalyst,
}

impl PersonaRole {
    /// Human-readable display name for the persona.
    pub fn display_name(&self) -> &'static str {
        match self {
            PersonaRole::CareerCoach => "Career Coach",
            PersonaRole::PortfolioAnalyst => "Portfolio Analyst",
        }
    }

    /// Short identifier for the persona (used in logs).
    pub fn id(&self) -> &'static str {
        match self {
            PersonaRole::CareerCoach => "career_coach",
            PersonaRole::PortfolioAnalyst => "portfolio_analyst",
        }
    }
}

impl std::fmt::Display for PersonaRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A titled list of rules rendered into the system prompt.
///
/// Items may contain `{call_name}`, replaced when the prompt is built.
#[derive(Debug, Clone)]
pub struct PromptSection {
    pub title: String,
    pub items: Vec<String>,
    /// Render as `1.`, `2.`, ... instead of `-`
    pub numbered: bool,
}

impl PromptSection {
    pub fn numbered(title: &str, items: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
            numbered: true,
        }
    }

    pub fn bulleted(title: &str, items: &[&str]) -> Self {
        Self {
            numbered: false,
            ..Self::numbered(title, items)
        }
    }
}

/// A persona definition.
#[derive(Debug, Clone)]
pub struct Persona {
    /// The persona role
    pub role: PersonaRole,
    /// Who the persona is, completed with the organization name
    pub identity_prompt: String,
    /// What the persona is trying to achieve
    pub mission: String,
    /// Rule sections in prompt order
    pub sections: Vec<PromptSection>,
}
