//! Report Generation
//!
//! Schema-constrained portfolio generation with a sample-report fallback.

pub mod generator;

pub use generator::{ReportGenerator, ReportOutcome};
