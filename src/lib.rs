//! Strengths Coach
//!
//! Backend for a guided strengths self-assessment. It includes:
//! - A streamed coach conversation with in-band understanding state
//! - Schema-constrained portfolio report generation with a sample fallback
//! - An explicit per-session registry with a single-flight phase machine
//! - The axum HTTP surface and JSON configuration

pub mod commands;
pub mod models;
pub mod server;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::response::*;
pub use models::settings::AppConfig;
pub use server::{build_router, run};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
