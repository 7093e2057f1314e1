//! Segment types shared by the splitter, renderer and playlist builder.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One sentence of input text at a fixed position in the original order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    /// Zero-based position in the input text.
    pub index: usize,
    /// Trimmed sentence text.
    pub text: String,
}

impl TextSegment {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// A segment after synthesis: the audio artifact plus its probed duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedSegment {
    /// Index of the `TextSegment` this was rendered from.
    pub index: usize,
    /// Path of the per-segment audio file inside the workspace.
    pub file_path: PathBuf,
    /// Duration in seconds, as reported by the media probe.
    pub duration: f64,
    /// Sentence text that was spoken.
    pub text: String,
}

impl RenderedSegment {
    /// Build a rendered segment for `segment`.
    pub fn from_segment(segment: &TextSegment, file_path: PathBuf, duration: f64) -> Self {
        Self {
            index: segment.index,
            file_path,
            duration,
            text: segment.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_segment_keeps_index_and_text() {
        let segment = TextSegment::new(3, "Hello there.");
        let rendered = RenderedSegment::from_segment(&segment, PathBuf::from("/tmp/x/3.wav"), 1.25);

        assert_eq!(rendered.index, 3);
        assert_eq!(rendered.text, "Hello there.");
        assert_eq!(rendered.duration, 1.25);
    }
}
