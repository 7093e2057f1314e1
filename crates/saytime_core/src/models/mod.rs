//! Data models for saytime.
//!
//! This module contains the values that flow between pipeline stages:
//! - Text segments produced by the splitter
//! - Rendered segments produced by the synthesis pool
//! - The narration result reported to the caller
//! - The PCM format shared by segments and the silence gap

mod audio;
mod narration;
mod segments;

pub use audio::AudioFormat;
pub use narration::{NarrationPart, NarrationResult};
pub use segments::{RenderedSegment, TextSegment};
