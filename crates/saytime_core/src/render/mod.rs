//! Bounded-concurrency synthesis of text segments.

mod pool;

pub use pool::{RenderPool, DEFAULT_CONCURRENCY};
