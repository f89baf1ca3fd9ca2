//! Services
//!
//! Business logic called by the HTTP commands.

pub mod coach;
pub mod extraction;
pub mod persona;
pub mod progress;
pub mod report;
pub mod session;

pub use coach::{ChatEvent, ChatOrchestrator};
pub use report::{ReportGenerator, ReportOutcome};
pub use session::{Session, SessionStore};
