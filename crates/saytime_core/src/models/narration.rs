//! The result reported to the caller after a successful narration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::segments::RenderedSegment;

/// One spoken sentence and how long it lasts in the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationPart {
    pub sentence: String,
    pub duration: f64,
}

/// Output path plus per-sentence durations, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationResult {
    /// Where the assembled audio file was written.
    pub output: PathBuf,
    /// One entry per sentence, ordered as in the input text.
    pub parts: Vec<NarrationPart>,
}

impl NarrationResult {
    /// Build a result from rendered segments.
    ///
    /// Internal file paths are dropped; the segment order is kept as given.
    pub fn from_rendered(output: impl Into<PathBuf>, rendered: &[RenderedSegment]) -> Self {
        Self {
            output: output.into(),
            parts: rendered
                .iter()
                .map(|r| NarrationPart {
                    sentence: r.text.clone(),
                    duration: r.duration,
                })
                .collect(),
        }
    }

    /// Total length of the assembled file.
    ///
    /// Every part is followed by one gap of `gap_secs`, including the last.
    pub fn total_duration(&self, gap_secs: f64) -> f64 {
        self.parts
            .iter()
            .map(|p| p.duration + gap_secs)
            .sum()
    }

    /// Serialize as `{"output": ..., "parts": [{"sentence": ..., "duration": ...}]}`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
