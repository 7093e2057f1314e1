//! Text handling: splitting input into sentence segments.

mod splitter;

pub use splitter::{split_sentences, split_text, SplitOptions, SENTENCE_TERMINATORS};
