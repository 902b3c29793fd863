//! Speech synthesis engines.
//!
//! This module contains implementations of text-to-speech engines.
//!
//! # Available Engines
//!
//! Enable engines via Cargo features:
//! - `droid` - Droid speech from a bank of beeps, whistles and tones (default)

#[cfg(feature = "droid")]
pub mod droid;
