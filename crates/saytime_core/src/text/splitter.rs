//! Sentence splitter.
//!
//! A sentence is a run of non-terminator characters followed by exactly one
//! terminator (`.`, `!`, `?` or newline), plus a closing parenthesis if one
//! directly follows the terminator. Matches are trimmed and empty ones are
//! discarded. Text after the last terminator is dropped unless
//! [`SplitOptions::keep_trailing_fragment`] is set.

use crate::models::TextSegment;

/// Characters that end a sentence.
pub const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?', '\n'];

/// Options controlling how text is split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitOptions {
    /// Keep an unterminated fragment at the end of the text as the last segment.
    pub keep_trailing_fragment: bool,
}

fn is_terminator(c: char) -> bool {
    SENTENCE_TERMINATORS.contains(&c)
}

/// Split text into ordered, non-empty sentence segments.
pub fn split_text(text: &str, options: SplitOptions) -> Vec<TextSegment> {
    split_sentences(text, options)
        .into_iter()
        .enumerate()
        .map(|(index, sentence)| TextSegment::new(index, sentence))
        .collect()
}

/// Split text into trimmed sentence strings.
pub fn split_sentences(text: &str, options: SplitOptions) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start: Option<usize> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_terminator(c) {
            if start.is_none() {
                start = Some(i);
            }
            continue;
        }

        // A terminator with nothing before it starts no sentence.
        let Some(s) = start.take() else {
            continue;
        };

        let mut end = i + c.len_utf8();
        if let Some(&(j, ')')) = chars.peek() {
            end = j + 1;
            chars.next();
        }
        push_trimmed(&mut sentences, &text[s..end]);
    }

    if options.keep_trailing_fragment {
        if let Some(s) = start {
            push_trimmed(&mut sentences, &text[s..]);
        }
    }

    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}
