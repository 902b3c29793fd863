//! # droid-tts
//!
//! A Rust library that renders text as droid speech: the message is reduced
//! to its consonants, grouped into beeps, whistles and tones, and every group
//! is matched to a pre-recorded clip from a sound bank.
//!
//! ## Features
//!
//! - **Droid engine**: Longest-match chunking over a directory tree of clips
//! - **Emotion aware**: Each sentence picks clips from its own emotion folder
//! - **Reproducible**: Seedable clip selection for stable output in tests
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! droid-tts = "2026.10"
//! ```
//!
//! ```ignore
//! use std::path::PathBuf;
//! use droid_tts::{engines::droid::DroidEngine, SynthesisEngine};
//!
//! let mut engine = DroidEngine::new();
//! engine.load_bank(&PathBuf::from("sounds"))?;
//!
//! let result = engine.synthesize("Salut BD-1 !", None)?;
//! result.write_wav(&PathBuf::from("output.wav"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod engines;

use std::io::Cursor;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Sample rate of every buffer produced by this crate.
pub const OUTPUT_SAMPLE_RATE: u32 = 44_100;

/// Container format for encoded output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioOutput {
    /// RIFF/WAVE container around the PCM data.
    #[default]
    Wav,
    /// Bare little-endian PCM.
    Raw,
}

impl AudioOutput {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioOutput::Wav => "wav",
            AudioOutput::Raw => "raw",
        }
    }
}

/// The result of a synthesis (text-to-speech) operation.
///
/// Contains mono 16-bit PCM samples and the sample rate of the output audio.
#[derive(Debug, Clone, Default)]
pub struct SynthesisResult {
    /// Raw audio samples
    pub samples: Vec<i16>,
    /// Sample rate of the audio (44100 for the droid engine)
    pub sample_rate: u32,
}

impl SynthesisResult {
    fn wav_spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    /// Write the audio to a 16-bit PCM WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let mut writer = hound::WavWriter::create(path, self.wav_spec())?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Encode the audio as an in-memory WAV file.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, hound::Error> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, self.wav_spec())?;
            for &sample in &self.samples {
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }

    /// Little-endian PCM bytes without any container.
    pub fn to_raw_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    /// Encode into the requested container, returning the format tag with the bytes.
    pub fn encode(&self, output: AudioOutput) -> Result<(AudioOutput, Vec<u8>), hound::Error> {
        let bytes = match output {
            AudioOutput::Wav => self.to_wav_bytes()?,
            AudioOutput::Raw => self.to_raw_bytes(),
        };
        Ok((output, bytes))
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Common interface for text-to-speech synthesis engines.
///
/// This trait defines the standard operations that all synthesis engines must support.
/// Each engine may have different parameter types for bank loading and synthesis.
pub trait SynthesisEngine {
    /// Parameters for configuring synthesis behavior (emotion, chunking, etc.)
    type SynthesisParams;
    /// Parameters for configuring sound bank loading
    type BankParams: Default;

    /// Load a sound bank from the specified path using default parameters.
    fn load_bank(&mut self, bank_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        self.load_bank_with_params(bank_path, Self::BankParams::default())
    }

    /// Load a sound bank from the specified path with custom parameters.
    fn load_bank_with_params(
        &mut self,
        bank_path: &Path,
        params: Self::BankParams,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Unload the current sound bank.
    fn unload_bank(&mut self);

    /// Synthesize speech from the given text.
    fn synthesize(
        &mut self,
        text: &str,
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error>>;

    /// Synthesize speech from the given text and write to a WAV file.
    ///
    /// Default implementation calls `synthesize()` then `SynthesisResult::write_wav()`.
    fn synthesize_to_file(
        &mut self,
        text: &str,
        wav_path: &Path,
        params: Option<Self::SynthesisParams>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.synthesize(text, params)?.write_wav(wav_path)
    }
}
