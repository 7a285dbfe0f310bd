//! Parsing of free-form session results.
//!
//! Results arrive as whatever the student typed: `"38.2s"`, `"Completed"`, `"Top 3"`,
//! or anything else. Every string is mapped onto a [`ResultKind`] here so the
//! classifier never has to pattern-match raw text.

use once_cell::sync::Lazy;
use regex::Regex;

static TIMED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)[sS]$").expect("valid timed result regex"));

const SUCCESS_MARKERS: [&str; 2] = ["completed", "top"];
const NON_SUCCESS_MARKERS: [&str; 4] = ["incomplete", "failed", "dnf", "skipped"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultKind {
    /// Elapsed seconds, lower is better. Always finite and positive.
    Timed(f64),
    Qualitative { success: bool },
    Unrecognized,
}

impl ResultKind {
    pub fn seconds(&self) -> Option<f64> {
        match self {
            ResultKind::Timed(seconds) => Some(*seconds),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResultKind::Qualitative { success: true })
    }
}

pub fn parse_result(raw: &str) -> ResultKind {
    let trimmed = raw.trim();

    if let Some(captures) = TIMED.captures(trimmed) {
        // Zero-length times would make the percentage change undefined.
        return match captures[1].parse::<f64>() {
            Ok(seconds) if seconds.is_finite() && seconds > 0.0 => ResultKind::Timed(seconds),
            _ => ResultKind::Unrecognized,
        };
    }

    let lowered = trimmed.to_lowercase();
    if SUCCESS_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        return ResultKind::Qualitative { success: true };
    }
    if NON_SUCCESS_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        return ResultKind::Qualitative { success: false };
    }

    ResultKind::Unrecognized
}
