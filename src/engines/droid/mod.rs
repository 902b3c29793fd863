//! Droid speech engine implementation.
//!
//! This module turns text into a chain of short pre-recorded clips (beeps,
//! whistles and tones). Nothing is pronounced: consonants pick the sounds and
//! the punctuation and wording of each sentence pick their emotion.
//!
//! # Pipeline
//!
//! 1. **Normalize**: split the message into phrases on `.`, `!`, `?`, fold
//!    accents, lowercase, detect the emotion of each phrase.
//! 2. **Reduce**: keep the consonants that carry sound, with word separators.
//! 3. **Map**: classify each consonant as Beep, Whistle or Tone.
//! 4. **Resolve**: per word, match the longest run of one category to a
//!    composite clip, or fall back to a clip for the first letter.
//! 5. **Assemble**: concatenate the clips into mono 16-bit 44.1 kHz PCM.
//!
//! # Sound Bank Layout
//!
//! ```text
//! sounds/
//! ├── droid.json                       # optional settings
//! ├── emotions/
//! │   ├── positif/b.wav, b1.wav, ...   # single letters, per emotion
//! │   └── ...
//! ├── consonnes/b.wav, s.wav, ...      # single letters, neutral
//! └── compositions/
//!     └── 3_caracteres/
//!         └── Beep Beep Beep/
//!             ├── neutre/BBB.wav
//!             └── surprise/BBB_2.wav
//! ```
//!
//! A clip matches a label when its file name starts with the label
//! (case-insensitive) and ends in `.wav`.
//!
//! # Emotion Folders
//!
//! | Emotion | Folder | Detected by |
//! |---|---|---|
//! | question | `question` | `?` in the phrase |
//! | negative | `negatif` | a negative cue word (`non`, `triste`, `pas`) |
//! | positive | `positif` | a positive cue word (`oui`, `super`, `merci`) |
//! | surprise | `surprise` | `!` in the phrase |
//! | neutral | `neutre` | anything else |
//!
//! # Examples
//!
//! ```rust
//! use droid_tts::engines::droid::{
//!     AssetLocation, Clip, DroidConfig, DroidEngine, DroidInferenceParams, MemorySoundBank,
//! };
//!
//! let mut bank = MemorySoundBank::new();
//! bank.insert(
//!     &AssetLocation::Consonants,
//!     "s.wav",
//!     Clip { samples: vec![0; 4410], sample_rate: 44_100 },
//! );
//!
//! let engine = DroidEngine::with_bank(bank, DroidConfig::default());
//! let params = DroidInferenceParams { seed: Some(7), ..Default::default() };
//! let utterance = engine.synthesize_detailed("Salut !", &params)?;
//! assert_eq!(utterance.samples.len(), 4410);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assembler;
pub mod bank;
pub mod config;
pub mod curation;
pub mod emotion;
pub mod engine;
pub mod groups;
pub mod model;
pub mod normalizer;
pub mod reducer;
pub mod resolver;

pub use assembler::{TraceEntry, TraceStatus, Utterance};
pub use bank::{AssetLocation, AssetRef, Clip, FsSoundBank, MemorySoundBank, SoundBank};
pub use config::DroidConfig;
pub use emotion::{Emotion, EmotionPrecedence};
pub use engine::{
    DroidBankParams, DroidEngine, DroidInferenceParams, DroidInferenceParamsBuilder,
};
pub use groups::Category;
pub use model::DroidError;
pub use reducer::ReducerPolicy;
