use std::path::{Path, PathBuf};

use rand::Rng;

use super::assembler::{assemble, Utterance};
use super::bank::{FsSoundBank, SoundBank};
use super::config::{load_bank_config, load_config, DroidConfig};
use super::emotion::Emotion;
use super::normalizer::split_phrases;
use super::reducer::display_symbols;
use super::resolver::ChunkResolver;

#[derive(thiserror::Error, Debug)]
pub enum DroidError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("Invalid droid.json: {0}")]
    Config(String),
    #[error("Sound bank not loaded. Call load_bank() first.")]
    BankNotLoaded,
    #[error("Sound bank directory not found: {}", .0.display())]
    BankNotFound(PathBuf),
    #[error("Cannot decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

/// A sound bank together with the text settings used to drive it.
pub struct DroidModel {
    bank: Box<dyn SoundBank + Send + Sync>,
    config: DroidConfig,
}

impl DroidModel {
    /// Open a sound bank directory.
    ///
    /// Settings come from `config_path` when given, else from the bank's own
    /// `droid.json`, else from the built-in defaults.
    pub fn load(bank_dir: &Path, config_path: Option<&Path>) -> Result<Self, DroidError> {
        let bank = FsSoundBank::open(bank_dir)?;
        let config = match config_path {
            Some(path) => load_config(path)?,
            None => load_bank_config(bank_dir)?,
        };
        Ok(Self::with_bank(bank, config))
    }

    pub fn with_bank<B>(bank: B, config: DroidConfig) -> Self
    where
        B: SoundBank + Send + Sync + 'static,
    {
        Self {
            bank: Box::new(bank),
            config,
        }
    }

    pub fn config(&self) -> &DroidConfig {
        &self.config
    }

    /// Run the whole pipeline on `text`.
    ///
    /// Every phrase is resolved in its own pass with a fresh set of used
    /// assets; the chunks of all phrases are then assembled in order.
    ///
    /// No clip repeats within a phrase. The same clip may appear again in a
    /// later phrase, so the returned trace can list it more than once.
    pub fn synthesize_text<R: Rng + ?Sized>(
        &self,
        text: &str,
        emotion_override: Option<Emotion>,
        max_chunk: usize,
        crossfade_samples: usize,
        rng: &mut R,
    ) -> Utterance {
        let phrases = split_phrases(text, &self.config.cues, self.config.precedence);
        if phrases.is_empty() {
            log::warn!("No phrase to speak in {text:?}");
        }

        let resolver = ChunkResolver::new(self.bank.as_ref(), max_chunk)
            .allow_mixed_patterns(self.config.allow_mixed_patterns);

        let mut chunks = Vec::new();
        for phrase in &phrases {
            let emotion = emotion_override.unwrap_or(phrase.emotion);
            let symbols = self.config.reducer.reduce(&phrase.text);
            let tags = self.config.groups.map_symbols(&symbols);
            log::debug!(
                "{:?} [{emotion}] -> {}",
                phrase.raw,
                display_symbols(&symbols)
            );
            chunks.extend(resolver.resolve(&symbols, &tags, emotion, rng));
        }

        assemble(self.bank.as_ref(), &chunks, crossfade_samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::droid::assembler::TraceStatus;
    use crate::engines::droid::bank::{AssetLocation, Clip, MemorySoundBank};
    use crate::engines::droid::groups::Category;
    use crate::engines::droid::reducer::{ReducerConfig, ReducerPolicy};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn clip(len: usize) -> Clip {
        Clip {
            samples: vec![7; len],
            sample_rate: 44_100,
        }
    }

    fn retain_all_config() -> DroidConfig {
        DroidConfig {
            reducer: ReducerConfig {
                policy: ReducerPolicy::RetainAll,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn each_phrase_uses_its_own_emotion() {
        let mut bank = MemorySoundBank::new();
        bank.insert(&AssetLocation::Emotion(Emotion::Question), "t.wav", clip(10));
        bank.insert(&AssetLocation::Emotion(Emotion::Positive), "t.wav", clip(20));
        let model = DroidModel::with_bank(bank, retain_all_config());

        let mut rng = StdRng::seed_from_u64(5);
        let utterance = model.synthesize_text("Tu? Top merci.", None, 4, 0, &mut rng);
        let emotions: Vec<Emotion> = utterance.trace.iter().map(|e| e.emotion).collect();
        // "tu" -> t, "top merci" -> t, then m (gap)
        assert_eq!(
            emotions,
            vec![Emotion::Question, Emotion::Positive, Emotion::Positive]
        );
        assert_eq!(utterance.samples.len(), 30);
        assert_eq!(utterance.trace[2].status, TraceStatus::Missing);
    }

    #[test]
    fn used_assets_reset_between_phrases() {
        let mut bank = MemorySoundBank::new();
        let only = bank.insert(&AssetLocation::Consonants, "t.wav", clip(10));
        let model = DroidModel::with_bank(bank, retain_all_config());

        let mut rng = StdRng::seed_from_u64(5);
        let utterance = model.synthesize_text("Tu. Ta.", None, 4, 0, &mut rng);
        assert_eq!(utterance.trace.len(), 2);
        assert!(utterance.trace.iter().all(|e| e.asset.as_ref() == Some(&only)));
    }

    #[test]
    fn emotion_override_applies_to_every_phrase() {
        let mut bank = MemorySoundBank::new();
        let sad = bank.insert(&AssetLocation::Emotion(Emotion::Negative), "s.wav", clip(10));
        let model = DroidModel::with_bank(bank, retain_all_config());

        let mut rng = StdRng::seed_from_u64(5);
        let utterance =
            model.synthesize_text("Salut!", Some(Emotion::Negative), 4, 0, &mut rng);
        assert_eq!(utterance.trace[0].asset, Some(sad));
        assert_eq!(utterance.trace[0].emotion, Emotion::Negative);
    }

    #[test]
    fn composite_used_for_uniform_word() {
        let mut bank = MemorySoundBank::new();
        let location = AssetLocation::Composite {
            pattern: vec![Category::Whistle, Category::Whistle],
            emotion: Emotion::Neutral,
        };
        let hiss = bank.insert(&location, "SS_long.wav", clip(30));
        bank.insert(&AssetLocation::Consonants, "s.wav", clip(10));
        let model = DroidModel::with_bank(bank, retain_all_config());

        let mut rng = StdRng::seed_from_u64(5);
        let utterance = model.synthesize_text("fais", None, 4, 0, &mut rng);
        assert_eq!(utterance.trace.len(), 1);
        assert_eq!(utterance.trace[0].asset, Some(hiss));
        assert_eq!(utterance.trace[0].source, "fs");
    }

    #[test]
    fn empty_message_is_silent() {
        let model = DroidModel::with_bank(MemorySoundBank::new(), DroidConfig::default());
        let mut rng = StdRng::seed_from_u64(5);
        let utterance = model.synthesize_text("", None, 4, 0, &mut rng);
        assert!(utterance.samples.is_empty());
        assert!(utterance.trace.is_empty());
    }

    #[test]
    fn missing_bank_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = DroidModel::load(&dir.path().join("missing"), None);
        assert!(matches!(result, Err(DroidError::BankNotFound(_))));
    }
}
