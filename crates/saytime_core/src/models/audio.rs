//! PCM layout of synthesized audio.

use serde::{Deserialize, Serialize};

/// Codec and sample rate shared by every file in one concat list.
///
/// The silence gap must be written in the synthesizer's format so the
/// assembler can join the files without re-encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// ffmpeg PCM codec name (e.g. `pcm_f32le`).
    pub codec: String,
    /// Samples per second.
    pub sample_rate: u32,
}

impl AudioFormat {
    pub fn new(codec: impl Into<String>, sample_rate: u32) -> Self {
        Self {
            codec: codec.into(),
            sample_rate,
        }
    }

    /// Parse a `say --data-format` spec such as `LEF32@16000` or `BEI16@22050`.
    ///
    /// Returns `None` when the spec has no sample rate or names a sample
    /// type ffmpeg has no PCM codec for.
    pub fn from_say_data_format(spec: &str) -> Option<Self> {
        let (sample, rate) = spec.trim().split_once('@')?;
        let sample_rate: u32 = rate.parse().ok().filter(|r| *r > 0)?;

        let (endian, sample) = match sample.get(..2) {
            Some("LE") => ("le", &sample[2..]),
            Some("BE") => ("be", &sample[2..]),
            _ => ("le", sample),
        };
        let (kind, bits) = if let Some(bits) = sample.strip_prefix("UI") {
            ("u", bits)
        } else if let Some(bits) = sample.strip_prefix('I') {
            ("s", bits)
        } else if let Some(bits) = sample.strip_prefix('F') {
            ("f", bits)
        } else {
            return None;
        };

        let codec = match (kind, bits) {
            ("u", "8") => "pcm_u8".to_string(),
            ("s", "8") => "pcm_s8".to_string(),
            ("s" | "u", "16" | "24" | "32") | ("f", "32" | "64") => {
                format!("pcm_{}{}{}", kind, bits, endian)
            }
            _ => return None,
        };

        Some(Self::new(codec, sample_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_say_data_formats() {
        assert_eq!(
            AudioFormat::from_say_data_format("LEF32@16000"),
            Some(AudioFormat::new("pcm_f32le", 16000))
        );
        assert_eq!(
            AudioFormat::from_say_data_format("BEI16@22050"),
            Some(AudioFormat::new("pcm_s16be", 22050))
        );
        assert_eq!(
            AudioFormat::from_say_data_format("UI8@8000"),
            Some(AudioFormat::new("pcm_u8", 8000))
        );
    }

    #[test]
    fn rejects_incomplete_formats() {
        assert_eq!(AudioFormat::from_say_data_format("LEF32"), None);
        assert_eq!(AudioFormat::from_say_data_format("LEF32@0"), None);
        assert_eq!(AudioFormat::from_say_data_format("LEF16@16000"), None);
        assert_eq!(AudioFormat::from_say_data_format("aac@44100"), None);
    }
}
