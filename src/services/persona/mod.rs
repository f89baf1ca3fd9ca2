//! Persona Module
//!
//! AI personas for the two generation passes:
//!
//! | Role | Pass |
//! |------|------|
//! | CareerCoach | Streamed conversation |
//! | PortfolioAnalyst | Structured report |

pub mod prompt_builder;
pub mod registry;
pub mod types;

pub use prompt_builder::{
    build_coach_system_prompt, build_report_prompt, fallback_greeting, GREETING_KICKOFF,
};
pub use registry::PersonaRegistry;
pub use types::{Persona, PersonaRole, PromptSection};
