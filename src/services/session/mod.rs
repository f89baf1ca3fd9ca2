//! Sessions
//!
//! Explicit per-session context objects and the registry that owns them.

#[allow(clippy::module_inception)]
pub mod session;
pub mod store;

pub use session::{
    ChatRequest, ReportPolicy, ReportRequest, Session, SessionPhase, SessionView, TurnView,
};
pub use store::SessionStore;
