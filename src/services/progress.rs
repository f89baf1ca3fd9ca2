//! Progress Gauge
//!
//! Pure mapping from the understanding record to a 0-100 percentage.

use crate::models::understanding::{UnderstandingState, MAX_COUNT};

const FLAG_WEIGHT: f64 = 10.0;
const EPISODE_WEIGHT: f64 = 40.0;
const STRENGTHS_WEIGHT: f64 = 30.0;

/// `10·officeHistory + 10·role + 10·duties + 40·episodes/3 + 30·strengths/3`,
/// rounded.
pub fn progress_percent(state: &UnderstandingState) -> u8 {
    let flags = [state.office_history, state.role, state.duties]
        .iter()
        .filter(|f| **f)
        .count() as f64;
    let max = f64::from(MAX_COUNT);
    let episodes = f64::from(state.episode_count.min(MAX_COUNT)) / max;
    let strengths = f64::from(state.strengths_count.min(MAX_COUNT)) / max;

    let score = FLAG_WEIGHT * flags + EPISODE_WEIGHT * episodes + STRENGTHS_WEIGHT * strengths;
    score.round().clamp(0.0, 100.0) as u8
}
