//! Speech synthesis adapters.

use std::ffi::OsString;
use std::path::Path;

use super::command::{run_tool, ToolResult};
use crate::config::{SynthesisEngine, SynthesisSettings};

/// Renders one sentence to an audio file.
///
/// Implementations are called from several worker threads at once.
pub trait Synthesizer: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Speak `text` into a WAV file at `output_path`.
    fn synthesize(&self, text: &str, output_path: &Path) -> ToolResult<()>;
}

/// Synthesizer backed by a speech command (`say` or `espeak-ng`).
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    engine: SynthesisEngine,
    program: String,
    data_format: String,
}

impl CommandSynthesizer {
    pub fn new(engine: SynthesisEngine) -> Self {
        Self {
            engine,
            program: engine.default_program().to_string(),
            data_format: SynthesisSettings::default().data_format,
        }
    }

    /// Build from the `[synthesis]` settings section.
    pub fn from_settings(settings: &SynthesisSettings) -> Self {
        Self {
            engine: settings.engine,
            program: settings.program().to_string(),
            data_format: settings.data_format.clone(),
        }
    }

    /// Use a custom path to the synthesis executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments for one synthesis call.
    ///
    /// Options come first and the text follows `--`, so a sentence starting
    /// with `-` is never read as an option.
    fn args(&self, text: &str, output_path: &Path) -> Vec<OsString> {
        match self.engine {
            // say -o <path> --data-format LEF32@16000 -- <text>
            SynthesisEngine::Say => vec![
                "-o".into(),
                output_path.into(),
                "--data-format".into(),
                self.data_format.as_str().into(),
                "--".into(),
                text.into(),
            ],
            // espeak-ng -w <path> -- <text>
            SynthesisEngine::EspeakNg => {
                vec!["-w".into(), output_path.into(), "--".into(), text.into()]
            }
        }
    }
}

impl Synthesizer for CommandSynthesizer {
    fn name(&self) -> &str {
        &self.program
    }

    fn synthesize(&self, text: &str, output_path: &Path) -> ToolResult<()> {
        run_tool(&self.program, self.args(text, output_path))?;
        tracing::debug!("Synthesized {} chars to {}", text.len(), output_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn say_arguments() {
        let synth = CommandSynthesizer::new(SynthesisEngine::Say);
        let args = synth.args("Hello.", Path::new("/tmp/ws/0.wav"));

        assert_eq!(
            args,
            vec!["-o", "/tmp/ws/0.wav", "--data-format", "LEF32@16000", "--", "Hello."]
                .into_iter()
                .map(OsString::from)
                .collect::<Vec<_>>()
        );
        assert_eq!(synth.name(), "say");
    }

    #[test]
    fn espeak_arguments() {
        let settings = SynthesisSettings {
            engine: SynthesisEngine::EspeakNg,
            ..Default::default()
        };
        let synth = CommandSynthesizer::from_settings(&settings);
        let args = synth.args("Hi!", Path::new("/tmp/ws/1.wav"));

        assert_eq!(args[0], OsString::from("-w"));
        assert_eq!(args[2], OsString::from("--"));
        assert_eq!(args[3], OsString::from("Hi!"));
        assert_eq!(synth.name(), "espeak-ng");
    }

    #[test]
    fn leading_dash_text_follows_option_terminator() {
        for engine in [SynthesisEngine::Say, SynthesisEngine::EspeakNg] {
            let synth = CommandSynthesizer::new(engine);
            let args = synth.args("-5 degrees outside.", Path::new("/tmp/ws/2.wav"));

            let text_at = args
                .iter()
                .position(|a| a == "-5 degrees outside.")
                .unwrap();
            assert_eq!(text_at, args.len() - 1);
            assert_eq!(args[text_at - 1], OsString::from("--"));
        }
    }

    #[test]
    fn custom_program_overrides_engine_default() {
        let synth = CommandSynthesizer::new(SynthesisEngine::Say).with_program("/opt/bin/say");
        assert_eq!(synth.name(), "/opt/bin/say");
    }
}
