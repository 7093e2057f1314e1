//! saytime core - text to narrated audio.
//!
//! Splits text into sentences, synthesizes each one with an external speech
//! tool, and joins the results with a short silence after every sentence
//! into a single audio file. The caller gets the output path and each
//! sentence's duration, in input order.
//!
//! ```no_run
//! use saytime_core::{narrate, NarrateOptions};
//!
//! narrate("Hello world. How are you?", &NarrateOptions::default(), |result| match result {
//!     Ok(narration) => println!("{}", narration.to_json().unwrap_or_default()),
//!     Err(e) => eprintln!("{}", e),
//! });
//! ```

pub mod config;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod playlist;
pub mod render;
pub mod text;
pub mod tools;
pub mod workspace;

pub use config::Settings;
pub use models::{NarrationPart, NarrationResult};
pub use orchestrator::{NarrateOptions, Narrator, PipelineError, PipelineResult};

/// Narrate `text` with default settings and pass the outcome to `callback`.
///
/// `callback` is invoked exactly once, with either the result or the first
/// error. The temporary workspace is gone by the time it runs.
pub fn narrate<F>(text: &str, options: &NarrateOptions, callback: F)
where
    F: FnOnce(PipelineResult<NarrationResult>),
{
    Narrator::new(Settings::default()).narrate(text, options, callback);
}

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
