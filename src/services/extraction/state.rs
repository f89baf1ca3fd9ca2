//! Embedded-State Extractor
//!
//! Parses the trailing `:::STATE:::{...}` payload of an assistant reply into
//! an [`UnderstandingState`] snapshot.

use serde_json::{Map, Value};

use super::STATE_DELIMITER;
use crate::models::conversation::Turn;
use crate::models::understanding::{RotationStatus, UnderstandingState, MAX_COUNT};

/// Extract the understanding snapshot embedded in one assistant reply.
///
/// Returns `None` when the delimiter is absent or repeated, when the payload
/// is empty, not valid JSON, or not an object.
pub fn extract_state(content: &str) -> Option<UnderstandingState> {
    let mut pieces = content.split(STATE_DELIMITER);
    pieces.next()?;
    let payload = pieces.next()?;
    if pieces.next().is_some() {
        return None;
    }

    let payload = payload.trim();
    if payload.is_empty() {
        return None;
    }

    // Anchor on the first brace when the payload looks complete.
    let candidate = if payload.ends_with('}') {
        payload.find('{').map_or(payload, |start| &payload[start..])
    } else {
        payload
    };

    let parsed: Value = serde_json::from_str(candidate).ok()?;
    let object = parsed.as_object()?;
    Some(normalize(object))
}

/// Scan assistant turns newest-first and return the first extractable state.
pub fn latest_state(turns: &[Turn]) -> Option<UnderstandingState> {
    turns
        .iter()
        .rev()
        .filter(|t| t.is_assistant())
        .find_map(|t| extract_state(&t.content))
}

/// First non-null value under the canonical key or its snake_case alias.
fn field<'a>(object: &'a Map<String, Value>, canonical: &str, alias: Option<&str>) -> Option<&'a Value> {
    object
        .get(canonical)
        .filter(|v| !v.is_null())
        .or_else(|| alias.and_then(|a| object.get(a)).filter(|v| !v.is_null()))
}

fn flag(object: &Map<String, Value>, canonical: &str, alias: Option<&str>) -> bool {
    matches!(field(object, canonical, alias), Some(Value::Bool(true)))
}

/// Explicit numbers are clamped then rounded; otherwise the flag decides 1 or 0.
fn count(value: Option<&Value>, fallback_flag: bool) -> u8 {
    match value.and_then(Value::as_f64).filter(|n| n.is_finite()) {
        Some(n) => n.clamp(0.0, f64::from(MAX_COUNT)).round() as u8,
        None => u8::from(fallback_flag),
    }
}

fn normalize(object: &Map<String, Value>) -> UnderstandingState {
    let episode = flag(object, "episode", None);
    let strengths = flag(object, "strengths", None);

    UnderstandingState {
        office_history: flag(object, "officeHistory", Some("office_history")),
        role: flag(object, "role", None),
        duties: flag(object, "duties", None),
        episode,
        strengths,
        episode_count: count(field(object, "episodeCount", Some("episode_count")), episode),
        strengths_count: count(
            field(object, "strengthsCount", Some("strengths_count")),
            strengths,
        ),
        rotation_status: field(object, "rotationStatus", Some("rotation_status"))
            .and_then(Value::as_str)
            .map(RotationStatus::from_tag)
            .unwrap_or_default(),
    }
}
