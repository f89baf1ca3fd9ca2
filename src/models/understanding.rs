//! Understanding State
//!
//! What the coach has confirmed so far: the checklist flags, the two
//! counters and the rotation status. Drives the progress gauge.

use serde::{Deserialize, Serialize};

/// Upper bound of `episode_count` and `strengths_count`.
pub const MAX_COUNT: u8 = 3;

/// Whether the person rotated across offices during their first years.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationStatus {
    Experienced,
    Partial,
    None,
    #[default]
    Unknown,
}

impl RotationStatus {
    /// Parse a tag; anything outside the four known tags is `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "experienced" => RotationStatus::Experienced,
            "partial" => RotationStatus::Partial,
            "none" => RotationStatus::None,
            _ => RotationStatus::Unknown,
        }
    }
}

/// Running understanding record for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderstandingState {
    pub office_history: bool,
    pub role: bool,
    pub duties: bool,
    pub episode: bool,
    pub strengths: bool,
    pub episode_count: u8,
    pub strengths_count: u8,
    pub rotation_status: RotationStatus,
}

impl UnderstandingState {
    /// Replace this state with the latest snapshot. Counts are clamped.
    pub fn merge(&mut self, snapshot: UnderstandingState) {
        *self = UnderstandingState {
            episode_count: snapshot.episode_count.min(MAX_COUNT),
            strengths_count: snapshot.strengths_count.min(MAX_COUNT),
            ..snapshot
        };
    }
}
