//! Profile Models
//!
//! Four bipolar slider values and the type code derived from them.

use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, AppResult};

/// Slider bound; each axis accepts values in `[-SCORE_LIMIT, SCORE_LIMIT]`.
pub const SCORE_LIMIT: i32 = 100;

/// Call name used when no display name was given.
pub const ANONYMOUS_CALL_NAME: &str = "あなた";

/// Four bipolar slider values.
///
/// Each axis runs from the first letter of its pair (negative) to the second
/// (positive): E/I, S/N, T/F, J/P.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileScores {
    pub ei: i32,
    pub sn: i32,
    pub tf: i32,
    pub jp: i32,
}

impl ProfileScores {
    pub fn new(ei: i32, sn: i32, tf: i32, jp: i32) -> Self {
        Self { ei, sn, tf, jp }
    }

    /// Reject values outside the slider range.
    pub fn validate(&self) -> AppResult<()> {
        for (axis, value) in [
            ("ei", self.ei),
            ("sn", self.sn),
            ("tf", self.tf),
            ("jp", self.jp),
        ] {
            if !(-SCORE_LIMIT..=SCORE_LIMIT).contains(&value) {
                return Err(AppError::invalid_input(format!(
                    "{} must be within [-{}, {}], got {}",
                    axis, SCORE_LIMIT, SCORE_LIMIT, value
                )));
            }
        }
        Ok(())
    }

    /// Four-letter type code. A value of exactly 0 resolves to the negative side.
    pub fn type_code(&self) -> String {
        let pick = |value: i32, negative: char, positive: char| {
            if value <= 0 {
                negative
            } else {
                positive
            }
        };
        [
            pick(self.ei, 'E', 'I'),
            pick(self.sn, 'S', 'N'),
            pick(self.tf, 'T', 'F'),
            pick(self.jp, 'J', 'P'),
        ]
        .iter()
        .collect()
    }
}

/// The profile facts injected into coach and report prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileContext {
    /// Trimmed display name; empty when not given
    pub display_name: String,
    pub type_code: String,
}

impl ProfileContext {
    pub fn new(display_name: Option<&str>, type_code: impl Into<String>) -> Self {
        Self {
            display_name: display_name.map(str::trim).unwrap_or_default().to_string(),
            type_code: type_code.into(),
        }
    }

    /// `<name>さん`, or `あなた` without a name.
    pub fn call_name(&self) -> String {
        if self.display_name.is_empty() {
            ANONYMOUS_CALL_NAME.to_string()
        } else {
            format!("{}さん", self.display_name)
        }
    }
}
