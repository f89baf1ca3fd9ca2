//! Choice-Suggestion Extractor

use super::{strip_state, CHOICES_DELIMITER};

/// Reply suggestions carried by an assistant reply.
///
/// Only attempted once the captured text ends with `]`; anything that is not
/// a JSON array of strings yields no suggestions.
pub fn extract_choices(content: &str) -> Vec<String> {
    let mut pieces = strip_state(content).split(CHOICES_DELIMITER);
    pieces.next();
    let Some(captured) = pieces.next().map(str::trim) else {
        return Vec::new();
    };
    if !captured.ends_with(']') {
        return Vec::new();
    }
    serde_json::from_str::<Vec<String>>(captured).unwrap_or_default()
}
