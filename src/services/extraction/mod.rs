//! In-band Protocol Extraction
//!
//! Assistant replies carry plain prose, optionally followed by
//! `:::CHOICES:::` and a JSON array of reply suggestions, optionally followed
//! by `:::STATE:::` and a JSON object describing what the coach has
//! understood so far. The state block is last and never shown.
//!
//! Every parser here is tolerant: streaming, partial or malformed input
//! yields "nothing extracted", never an error.

pub mod choices;
pub mod state;

pub use choices::extract_choices;
pub use state::{extract_state, latest_state};

/// Delimiter introducing the understanding-state payload.
pub const STATE_DELIMITER: &str = ":::STATE:::";

/// Delimiter introducing the reply-suggestion array.
pub const CHOICES_DELIMITER: &str = ":::CHOICES:::";

/// Text before the first state delimiter, trimmed.
pub fn strip_state(content: &str) -> &str {
    content
        .split(STATE_DELIMITER)
        .next()
        .unwrap_or_default()
        .trim()
}

/// Rendered form of an assistant reply: cut at the state block, then at the
/// choices block.
pub fn visible_text(content: &str) -> &str {
    strip_state(content)
        .split(CHOICES_DELIMITER)
        .next()
        .unwrap_or_default()
        .trim()
}
