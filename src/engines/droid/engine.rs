use std::path::{Path, PathBuf};

use derive_builder::Builder;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{AudioOutput, SynthesisEngine, SynthesisResult};

use super::assembler::Utterance;
use super::bank::SoundBank;
use super::config::DroidConfig;
use super::emotion::Emotion;
use super::model::{DroidError, DroidModel};
use super::resolver::DEFAULT_MAX_CHUNK;

/// Parameters for configuring sound bank loading.
#[derive(Debug, Clone, Default)]
pub struct DroidBankParams {
    /// Settings file to use instead of the bank's own `droid.json`.
    pub config_path: Option<PathBuf>,
}

/// Parameters for configuring a droid synthesis request.
///
/// ```rust
/// use droid_tts::engines::droid::{DroidInferenceParamsBuilder, Emotion};
///
/// let params = DroidInferenceParamsBuilder::default()
///     .emotion(Emotion::Surprise)
///     .seed(42)
///     .build()
///     .unwrap();
/// assert_eq!(params.max_chunk, 4);
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(default, build_fn(validate = "Self::validate"))]
pub struct DroidInferenceParams {
    /// Emotion for every phrase. `None` = detect per phrase.
    #[builder(setter(strip_option))]
    pub emotion: Option<Emotion>,
    /// Longest composite chunk to try. Must be at least 1.
    pub max_chunk: usize,
    /// Seed for clip selection. `None` = fresh entropy on every call.
    #[builder(setter(strip_option))]
    pub seed: Option<u64>,
    /// Container returned by [`DroidEngine::generate`].
    pub audio_output: AudioOutput,
    /// Samples of overlap between consecutive clips.
    pub crossfade_samples: usize,
}

impl Default for DroidInferenceParams {
    fn default() -> Self {
        Self {
            emotion: None,
            max_chunk: DEFAULT_MAX_CHUNK,
            seed: None,
            audio_output: AudioOutput::Wav,
            crossfade_samples: 0,
        }
    }
}

impl DroidInferenceParamsBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.max_chunk {
            Some(0) => Err("max_chunk must be at least 1".to_string()),
            _ => Ok(()),
        }
    }
}

/// Droid speech engine.
///
/// Turns text into a chain of clips picked from a sound bank directory.
///
/// # Quick Start
///
/// ```rust,no_run
/// use droid_tts::{SynthesisEngine, engines::droid::DroidEngine};
/// use std::path::PathBuf;
///
/// let mut engine = DroidEngine::new();
/// engine.load_bank(&PathBuf::from("sounds"))?;
/// let result = engine.synthesize("Salut BD-1 !", None)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct DroidEngine {
    model: Option<DroidModel>,
    bank_path: Option<PathBuf>,
}

impl Default for DroidEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DroidEngine {
    /// Create an engine with no sound bank loaded.
    pub fn new() -> Self {
        Self {
            model: None,
            bank_path: None,
        }
    }

    /// Create an engine around an already built sound bank, e.g. a
    /// [`MemorySoundBank`](super::bank::MemorySoundBank).
    pub fn with_bank<B>(bank: B, config: DroidConfig) -> Self
    where
        B: SoundBank + Send + Sync + 'static,
    {
        Self {
            model: Some(DroidModel::with_bank(bank, config)),
            bank_path: None,
        }
    }

    /// Directory of the loaded sound bank, if it came from disk.
    pub fn bank_path(&self) -> Option<&Path> {
        self.bank_path.as_deref()
    }

    /// Synthesize `text` and return the audio with its alignment trace.
    pub fn synthesize_detailed(
        &self,
        text: &str,
        params: &DroidInferenceParams,
    ) -> Result<Utterance, DroidError> {
        let model = self.model.as_ref().ok_or(DroidError::BankNotLoaded)?;
        if params.max_chunk == 0 {
            return Err(DroidError::InvalidParams(
                "max_chunk must be at least 1".to_string(),
            ));
        }

        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(model.synthesize_text(
            text,
            params.emotion,
            params.max_chunk,
            params.crossfade_samples,
            &mut rng,
        ))
    }

    /// Synthesize `text` and encode it in the container selected by
    /// `params.audio_output`, returning the format tag with the bytes.
    pub fn generate(
        &self,
        text: &str,
        params: &DroidInferenceParams,
    ) -> Result<(AudioOutput, Vec<u8>), DroidError> {
        let utterance = self.synthesize_detailed(text, params)?;
        Ok(utterance.into_result().encode(params.audio_output)?)
    }
}

impl SynthesisEngine for DroidEngine {
    type SynthesisParams = DroidInferenceParams;
    type BankParams = DroidBankParams;

    fn load_bank_with_params(
        &mut self,
        bank_path: &Path,
        params: Self::BankParams,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let model = DroidModel::load(bank_path, params.config_path.as_deref())?;
        self.model = Some(model);
        self.bank_path = Some(bank_path.to_path_buf());
        Ok(())
    }

    fn unload_bank(&mut self) {
        self.model = None;
        self.bank_path = None;
    }

    fn synthesize(
        &mut self,
        text: &str,
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error>> {
        let p = params.unwrap_or_default();
        let utterance = self.synthesize_detailed(text, &p)?;
        Ok(utterance.into_result())
    }
}
