//! Data Models
//!
//! Domain records shared by the services and the HTTP layer.

pub mod conversation;
pub mod profile;
pub mod report;
pub mod response;
pub mod settings;
pub mod understanding;

pub use conversation::{Conversation, Turn, TurnRole};
pub use profile::{ProfileContext, ProfileScores};
pub use report::{ReportData, StoredReport};
pub use response::{CommandResponse, HealthResponse};
pub use settings::AppConfig;
pub use understanding::{RotationStatus, UnderstandingState};
