use std::path::Path;

use serde::{Deserialize, Serialize};

use super::emotion::{EmotionCues, EmotionPrecedence};
use super::groups::{GroupSets, GroupTable};
use super::model::DroidError;
use super::normalizer::normalize_text;
use super::reducer::ReducerConfig;

/// Name of the optional configuration file at the root of a sound bank.
pub const CONFIG_FILE: &str = "droid.json";

/// On-disk form of [`DroidConfig`]. Every field may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    groups: GroupSets,
    reducer: ReducerConfig,
    cues: EmotionCues,
    precedence: EmotionPrecedence,
    allow_mixed_patterns: bool,
}

/// Text-processing settings of a sound bank.
#[derive(Debug, Clone, Default)]
pub struct DroidConfig {
    pub groups: GroupTable,
    pub reducer: ReducerConfig,
    pub cues: EmotionCues,
    pub precedence: EmotionPrecedence,
    pub allow_mixed_patterns: bool,
}

impl DroidConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(content: &str) -> Result<Self, DroidError> {
        let file: ConfigFile = serde_json::from_str(content)
            .map_err(|e| DroidError::Config(format!("Failed to parse JSON: {e}")))?;

        if file.reducer.vowels.is_empty() {
            return Err(DroidError::Config("'reducer.vowels' must not be empty".to_string()));
        }
        let groups = GroupTable::from_sets(&file.groups)?;
        if let Some(vowel) = file
            .reducer
            .vowels
            .chars()
            .find(|&v| groups.classify(v).is_some())
        {
            return Err(DroidError::Config(format!(
                "vowel {vowel:?} is also listed in a sound group"
            )));
        }

        Ok(Self {
            groups,
            reducer: file.reducer,
            cues: normalize_cues(file.cues),
            precedence: file.precedence,
            allow_mixed_patterns: file.allow_mixed_patterns,
        })
    }
}

/// Cue words are compared with normalized phrase text, so they get the same
/// folding. Entries that normalize to nothing are dropped.
fn normalize_cues(cues: EmotionCues) -> EmotionCues {
    let fold = |words: Vec<String>| -> Vec<String> {
        words
            .iter()
            .map(|w| normalize_text(w))
            .filter(|w| !w.is_empty())
            .collect()
    };
    EmotionCues {
        positive: fold(cues.positive),
        negative: fold(cues.negative),
    }
}

/// Load the configuration from a `droid.json` file.
pub fn load_config(config_path: &Path) -> Result<DroidConfig, DroidError> {
    let content = std::fs::read_to_string(config_path)?;
    DroidConfig::from_json(&content)
}

/// Load `droid.json` from the bank root, or the built-in defaults when the
/// bank has none.
pub fn load_bank_config(bank_root: &Path) -> Result<DroidConfig, DroidError> {
    let config_path = bank_root.join(CONFIG_FILE);
    if config_path.exists() {
        log::info!("Loading settings from {}", config_path.display());
        load_config(&config_path)
    } else {
        log::warn!("{CONFIG_FILE} not found, using built-in settings");
        Ok(DroidConfig::default())
    }
}
