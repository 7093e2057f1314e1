//! Synthesis worker pool.
//!
//! Each segment is synthesized to its own file and then probed for its
//! duration. At most `limit` segments are in flight at once. Results are
//! placed into a slot per input position, so the returned order is the
//! input order no matter which worker finishes first.
//!
//! After the first failure no further segment is started; segments already
//! running are allowed to finish, and the first error is returned.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use parking_lot::Mutex;

use crate::models::{RenderedSegment, TextSegment};
use crate::orchestrator::{StepError, StepResult};
use crate::tools::{MediaTool, Synthesizer};

/// Default number of synthesis processes running at once.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Renders segments with a fixed upper bound on parallel work.
pub struct RenderPool<'a> {
    synthesizer: &'a dyn Synthesizer,
    media: &'a dyn MediaTool,
    limit: usize,
}

impl<'a> RenderPool<'a> {
    pub fn new(synthesizer: &'a dyn Synthesizer, media: &'a dyn MediaTool) -> Self {
        Self {
            synthesizer,
            media,
            limit: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the concurrency limit (at least one).
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Render every segment.
    ///
    /// `path_for` maps a segment index to its output file. `on_rendered` is
    /// called from the worker thread after each segment completes, with the
    /// number of segments completed so far.
    pub fn render<P, F>(
        &self,
        segments: &[TextSegment],
        path_for: P,
        on_rendered: F,
    ) -> StepResult<Vec<RenderedSegment>>
    where
        P: Fn(usize) -> PathBuf + Sync,
        F: Fn(&RenderedSegment, usize) + Sync,
    {
        let total = segments.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let workers = self.limit.min(total);
        let next = AtomicUsize::new(0);
        let completed = AtomicUsize::new(0);
        let failed = AtomicBool::new(false);
        let first_error: Mutex<Option<StepError>> = Mutex::new(None);
        let slots: Mutex<Vec<Option<RenderedSegment>>> = Mutex::new(vec![None; total]);

        tracing::debug!("Rendering {} segments with {} workers", total, workers);

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    if failed.load(Ordering::SeqCst) {
                        break;
                    }
                    let position = next.fetch_add(1, Ordering::SeqCst);
                    if position >= total {
                        break;
                    }

                    let segment = &segments[position];
                    match self.render_one(segment, path_for(segment.index)) {
                        Ok(rendered) => {
                            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                            on_rendered(&rendered, done);
                            slots.lock()[position] = Some(rendered);
                        }
                        Err(e) => {
                            failed.store(true, Ordering::SeqCst);
                            let mut slot = first_error.lock();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            break;
                        }
                    }
                });
            }
        });

        if let Some(e) = first_error.into_inner() {
            return Err(e);
        }

        slots
            .into_inner()
            .into_iter()
            .enumerate()
            .map(|(position, slot)| {
                slot.ok_or_else(|| {
                    StepError::invalid_output(format!(
                        "segment at position {} was not rendered",
                        position
                    ))
                })
            })
            .collect()
    }

    /// Synthesize and probe a single segment.
    fn render_one(&self, segment: &TextSegment, output_path: PathBuf) -> StepResult<RenderedSegment> {
        self.synthesizer
            .synthesize(&segment.text, &output_path)
            .map_err(|e| StepError::Synthesis {
                index: segment.index,
                exit_code: e.exit_code(),
                message: e.detail(),
            })?;

        let duration = self
            .media
            .probe_duration(&output_path)
            .map_err(|e| StepError::DurationProbe {
                index: segment.index,
                exit_code: e.exit_code(),
                message: e.detail(),
            })?;

        Ok(RenderedSegment::from_segment(segment, output_path, duration))
    }
}
