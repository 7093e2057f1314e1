//! Run controller: owns the workspace around one pipeline run.
//!
//! A run creates its workspace, executes the standard pipeline inside it and
//! removes the workspace before returning, whatever the outcome. If a step
//! failed, that error is returned and a cleanup failure is only logged. A
//! cleanup failure after a successful run is returned as
//! [`StepError::Cleanup`]; the output file stays at its destination.

use std::path::PathBuf;
use std::sync::Arc;

use rand::Rng;

use super::errors::{PipelineError, PipelineResult, StepError};
use super::pipeline::CancelHandle;
use super::types::{Context, JobState, PipelineStage, ProgressCallback};
use super::create_standard_pipeline;
use crate::config::Settings;
use crate::logging::{JobLogger, LogCallback};
use crate::models::NarrationResult;
use crate::tools::{CommandSynthesizer, FfmpegTool, MediaTool, Synthesizer};
use crate::workspace::Workspace;

/// Length of the random part of a default output filename.
const DEFAULT_NAME_LEN: usize = 8;

/// Per-call options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NarrateOptions {
    /// Destination of the narrated file. `None` picks a random name in the
    /// current directory.
    pub out: Option<PathBuf>,
}

impl NarrateOptions {
    /// Write the output to `path`.
    pub fn with_out(path: impl Into<PathBuf>) -> Self {
        Self {
            out: Some(path.into()),
        }
    }
}

/// `<8 random alphanumerics>.wav`, relative to the current directory.
pub fn default_output_path() -> PathBuf {
    let name: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(DEFAULT_NAME_LEN)
        .map(char::from)
        .collect();
    PathBuf::from(format!("{}.wav", name))
}

fn new_job_name() -> String {
    format!(
        "narration-{}",
        chrono::Local::now().format("%Y%m%d-%H%M%S%.3f")
    )
}

/// Turns text into narrated audio files.
///
/// # Example
///
/// ```no_run
/// use saytime_core::config::Settings;
/// use saytime_core::orchestrator::{NarrateOptions, Narrator};
///
/// let narrator = Narrator::new(Settings::default());
/// let result = narrator.run("Hello world. How are you?", &NarrateOptions::with_out("hello.wav"))?;
/// for part in &result.parts {
///     println!("{:.3}s  {}", part.duration, part.sentence);
/// }
/// # Ok::<(), saytime_core::orchestrator::PipelineError>(())
/// ```
pub struct Narrator {
    settings: Settings,
    synthesizer: Arc<dyn Synthesizer>,
    media: Arc<dyn MediaTool>,
    log_callback: Option<Arc<dyn Fn(&str) + Send + Sync>>,
    progress_callback: Option<ProgressCallback>,
    cancel: CancelHandle,
}

impl Narrator {
    /// Narrator using the external tools named in `settings`.
    pub fn new(settings: Settings) -> Self {
        let synthesizer = Arc::new(CommandSynthesizer::from_settings(&settings.synthesis));
        let media = Arc::new(FfmpegTool::from_settings(&settings.tools, &settings.gap));
        Self {
            settings,
            synthesizer,
            media,
            log_callback: None,
            progress_callback: None,
            cancel: CancelHandle::new(),
        }
    }

    /// Replace the speech synthesizer.
    pub fn with_synthesizer(mut self, synthesizer: impl Synthesizer + 'static) -> Self {
        self.synthesizer = Arc::new(synthesizer);
        self
    }

    /// Replace the media tool.
    pub fn with_media_tool(mut self, media: impl MediaTool + 'static) -> Self {
        self.media = Arc::new(media);
        self
    }

    /// Receive every formatted log line of each run.
    pub fn with_log_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.log_callback = Some(Arc::new(callback));
        self
    }

    /// Receive `(step, percent, message)` progress updates.
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, u32, &str) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Handle that stops the current (and any later) run at the next step
    /// boundary.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Narrate `text` and hand the outcome to `callback`, exactly once.
    pub fn narrate<F>(&self, text: &str, options: &NarrateOptions, callback: F)
    where
        F: FnOnce(PipelineResult<NarrationResult>),
    {
        callback(self.run(text, options));
    }

    /// Narrate `text`, returning the result.
    pub fn run(&self, text: &str, options: &NarrateOptions) -> PipelineResult<NarrationResult> {
        self.run_with_state(text, options).0
    }

    /// Narrate `text`, also returning the final job state.
    pub fn run_with_state(
        &self,
        text: &str,
        options: &NarrateOptions,
    ) -> (PipelineResult<NarrationResult>, JobState) {
        let job_name = new_job_name();
        let logger = Arc::new(self.create_logger(&job_name));
        let mut state = JobState::new(&job_name);
        let destination = options.out.clone().unwrap_or_else(default_output_path);

        logger.phase("Workspace");
        let temp_root = self.settings.paths.temp_root_dir();
        let workspace = match Workspace::create(&temp_root) {
            Ok(workspace) => workspace,
            Err(e) => {
                logger.error(&e.to_string());
                state.mark_failed();
                // Nothing was created, so there is nothing to remove
                let _ = state.transition(PipelineStage::CleanedUp);
                logger.close();
                return (Err(PipelineError::step_failed(&job_name, "Workspace", e)), state);
            }
        };
        logger.debug(&format!("Workspace: {}", workspace.root().display()));

        let outcome = self.run_in_workspace(text, &job_name, &workspace, destination, &logger, &mut state);
        if outcome.is_err() {
            state.mark_failed();
        }

        logger.phase("Cleanup");
        let cleanup = workspace.destroy();
        if cleanup.is_ok() {
            // Finalized or Failed both lead to CleanedUp
            let _ = state.transition(PipelineStage::CleanedUp);
        }

        let result = match (outcome, cleanup) {
            (Ok(result), Ok(())) => {
                logger.success(&format!(
                    "Narrated {} sentence(s) to {}",
                    result.parts.len(),
                    result.output.display()
                ));
                Ok(result)
            }
            (Ok(_), Err(e)) => {
                logger.error(&e.to_string());
                state.mark_failed();
                Err(PipelineError::step_failed(&job_name, "Cleanup", e))
            }
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup_err)) => {
                logger.warn(&format!("Workspace cleanup also failed: {}", cleanup_err));
                Err(e)
            }
        };

        logger.close();
        (result, state)
    }

    fn run_in_workspace(
        &self,
        text: &str,
        job_name: &str,
        workspace: &Workspace,
        destination: PathBuf,
        logger: &Arc<JobLogger>,
        state: &mut JobState,
    ) -> PipelineResult<NarrationResult> {
        state
            .transition(PipelineStage::WorkspaceReady)
            .map_err(|e| PipelineError::step_failed(job_name, "Workspace", e))?;

        let mut ctx = Context::new(
            text,
            &self.settings,
            job_name,
            workspace,
            destination,
            self.synthesizer.as_ref(),
            self.media.as_ref(),
            Arc::clone(logger),
        );
        if let Some(ref callback) = self.progress_callback {
            ctx = ctx.with_progress_callback(Arc::clone(callback));
        }

        create_standard_pipeline()
            .with_cancel_handle(self.cancel.clone())
            .run(&ctx, state)?;

        state.result.clone().ok_or_else(|| {
            PipelineError::step_failed(
                job_name,
                "Finalize",
                StepError::invalid_output("no result recorded"),
            )
        })
    }

    fn callback_sink(&self) -> Option<LogCallback> {
        self.log_callback.as_ref().map(|callback| {
            let callback = Arc::clone(callback);
            Box::new(move |line: &str| callback(line)) as LogCallback
        })
    }

    /// Logger for one run, with a log file when job logs are enabled.
    fn create_logger(&self, job_name: &str) -> JobLogger {
        let config = self.settings.logging.to_log_config();

        if self.settings.paths.write_job_logs {
            let dir = PathBuf::from(&self.settings.paths.logs_folder);
            match JobLogger::new(job_name, Some(&dir), config.clone(), self.callback_sink()) {
                Ok(logger) => return logger,
                Err(e) => tracing::warn!(
                    "Could not open job log in {}: {}; logging without a file",
                    dir.display(),
                    e
                ),
            }
        }

        match JobLogger::new(job_name, None, config.clone(), self.callback_sink()) {
            Ok(logger) => logger,
            Err(_) => JobLogger::detached(job_name, config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::test_support::{FakeMedia, FakeSynth, FAKE_RATE};
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Narrator with fakes, workspaces created under a scratch temp root.
    fn fake_narrator(temp_root: &TempDir) -> Narrator {
        crate::logging::init_test_tracing();
        let mut settings = Settings::default();
        settings.paths.temp_root = temp_root.path().display().to_string();
        Narrator::new(settings)
            .with_synthesizer(FakeSynth::default())
            .with_media_tool(FakeMedia::default())
    }

    fn workspace_left(temp_root: &TempDir) -> bool {
        fs::read_dir(temp_root.path()).unwrap().next().is_some()
    }

    #[test]
    fn narrates_two_sentences() {
        let temp_root = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let out = out_dir.path().join("hello.wav");

        let (result, state) = fake_narrator(&temp_root)
            .run_with_state("Hello world. How are you?", &NarrateOptions::with_out(&out));
        let result = result.unwrap();

        assert_eq!(result.output, out);
        assert_eq!(result.parts.len(), 2);
        assert_eq!(result.parts[0].sentence, "Hello world.");
        assert_eq!(result.parts[1].sentence, "How are you?");
        assert!(result.parts.iter().all(|p| p.duration > 0.0));

        // Each sentence followed by 0.5s of gap
        let bytes = fs::read(&out).unwrap();
        let expected = format!("Hello world.{0}How are you?{0}", "~".repeat(50));
        assert_eq!(bytes, expected.as_bytes());
        assert!((result.total_duration(0.5) - bytes.len() as f64 / FAKE_RATE).abs() < 1e-9);

        assert_eq!(state.stage, PipelineStage::CleanedUp);
        assert!(!workspace_left(&temp_root));
    }

    #[test]
    fn keeps_input_order_for_many_sentences() {
        let temp_root = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let text: String = (0..25).map(|i| format!("Sentence number {}. ", i)).collect();

        let result = fake_narrator(&temp_root)
            .run(&text, &NarrateOptions::with_out(out_dir.path().join("long.wav")))
            .unwrap();

        assert_eq!(result.parts.len(), 25);
        for (i, part) in result.parts.iter().enumerate() {
            assert_eq!(part.sentence, format!("Sentence number {}.", i));
        }
    }

    #[test]
    fn synthesis_failure_leaves_nothing_behind() {
        let temp_root = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let out = out_dir.path().join("broken.wav");
        let narrator = fake_narrator(&temp_root).with_synthesizer(FakeSynth::failing_on("Second."));

        let (result, state) =
            narrator.run_with_state("First. Second. Third.", &NarrateOptions::with_out(&out));
        let err = result.unwrap_err();

        assert_eq!(err.step_name(), Some("Render"));
        assert!(matches!(err.step_error(), Some(StepError::Synthesis { index: 1, .. })));
        assert!(!out.exists());
        assert!(!workspace_left(&temp_root));
        assert_eq!(state.stage, PipelineStage::CleanedUp);
        assert!(state.result.is_none());
        assert!(state.rendered.is_none());
    }

    #[test]
    fn assembly_failure_is_reported() {
        let temp_root = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let narrator = fake_narrator(&temp_root).with_media_tool(FakeMedia {
            fail_concat: true,
            ..Default::default()
        });

        let err = narrator
            .run("One.", &NarrateOptions::with_out(out_dir.path().join("x.wav")))
            .unwrap_err();

        assert!(matches!(err.step_error(), Some(StepError::Assembly { .. })));
        assert!(!workspace_left(&temp_root));
    }

    #[test]
    fn text_without_sentences_fails_at_split() {
        let temp_root = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();

        let err = fake_narrator(&temp_root)
            .run("...", &NarrateOptions::with_out(out_dir.path().join("x.wav")))
            .unwrap_err();

        assert_eq!(err.step_name(), Some("Split"));
        assert!(!workspace_left(&temp_root));
    }

    #[test]
    fn unwritable_temp_root_is_workspace_error() {
        let scratch = tempfile::tempdir().unwrap();
        let blocker = scratch.path().join("file");
        fs::write(&blocker, b"").unwrap();

        let mut settings = Settings::default();
        settings.paths.temp_root = blocker.join("nested").display().to_string();
        let narrator = Narrator::new(settings)
            .with_synthesizer(FakeSynth::default())
            .with_media_tool(FakeMedia::default());

        let (result, state) = narrator.run_with_state("Hi.", &NarrateOptions::default());
        let err = result.unwrap_err();

        assert!(matches!(err.step_error(), Some(StepError::WorkspaceCreation { .. })));
        assert_eq!(state.stage, PipelineStage::CleanedUp);
    }

    #[test]
    fn cancelled_run_still_cleans_up() {
        let temp_root = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let narrator = fake_narrator(&temp_root);
        narrator.cancel_handle().cancel();

        let (result, state) = narrator
            .run_with_state("Hi.", &NarrateOptions::with_out(out_dir.path().join("x.wav")));

        assert!(matches!(result, Err(PipelineError::Cancelled { .. })));
        assert_eq!(state.stage, PipelineStage::CleanedUp);
        assert!(!workspace_left(&temp_root));
    }

    #[test]
    fn callback_invoked_once_with_result() {
        let temp_root = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let out = out_dir.path().join("cb.wav");
        let mut calls = 0;

        fake_narrator(&temp_root).narrate("A. B.", &NarrateOptions::with_out(&out), |result| {
            calls += 1;
            assert_eq!(result.unwrap().parts.len(), 2);
        });

        assert_eq!(calls, 1);
    }

    #[test]
    fn log_and_progress_callbacks_receive_updates() {
        let temp_root = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let lines = Arc::new(Mutex::new(Vec::new()));
        let steps = Arc::new(Mutex::new(Vec::new()));
        let line_sink = Arc::clone(&lines);
        let step_sink = Arc::clone(&steps);

        fake_narrator(&temp_root)
            .with_log_callback(move |line| line_sink.lock().unwrap().push(line.to_string()))
            .with_progress_callback(move |step, percent, _| {
                step_sink.lock().unwrap().push((step.to_string(), percent))
            })
            .run("A. B.", &NarrateOptions::with_out(out_dir.path().join("p.wav")))
            .unwrap();

        let lines = lines.lock().unwrap();
        assert!(lines.iter().any(|l| l.contains("Synthesize sentences")));
        let steps = steps.lock().unwrap();
        assert_eq!(steps.first().map(|(s, _)| s.as_str()), Some("Gap"));
        assert_eq!(steps.last(), Some(&("Complete".to_string(), 100)));
    }

    #[test]
    fn default_output_name_is_random_wav() {
        let a = default_output_path();
        let b = default_output_path();

        let name = a.to_str().unwrap();
        assert_eq!(name.len(), DEFAULT_NAME_LEN + 4);
        assert!(name.ends_with(".wav"));
        assert!(name[..DEFAULT_NAME_LEN].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    #[ignore = "needs say and ffmpeg on PATH"]
    fn narrates_with_real_tools() {
        let out_dir = tempfile::tempdir().unwrap();
        let out = out_dir.path().join("real.wav");

        let result = Narrator::new(Settings::default())
            .run("Hello world. How are you?", &NarrateOptions::with_out(&out))
            .unwrap();

        assert_eq!(result.parts.len(), 2);
        assert!(result.parts.iter().all(|p| p.duration > 0.0));
        assert!(fs::metadata(&out).unwrap().len() > 0);
    }
}
