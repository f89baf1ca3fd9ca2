//! Storage Layer
//!
//! JSON config file handling. Sessions are in-memory only.

pub mod config;

pub use config::ConfigService;
