use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::model::DroidError;

/// Emotional tone of a phrase. Selects the clip folder used for every sound
/// of that phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Question,
    Surprise,
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Emotion {
    pub const fn all() -> &'static [Emotion] {
        &[
            Emotion::Question,
            Emotion::Surprise,
            Emotion::Positive,
            Emotion::Negative,
            Emotion::Neutral,
        ]
    }

    /// Folder name used for this emotion inside a sound bank.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Emotion::Question => "question",
            Emotion::Surprise => "surprise",
            Emotion::Positive => "positif",
            Emotion::Negative => "negatif",
            Emotion::Neutral => "neutre",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Question => "question",
            Emotion::Surprise => "surprise",
            Emotion::Positive => "positive",
            Emotion::Negative => "negative",
            Emotion::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = DroidError;

    /// Accepts both the English labels and the bank folder names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Emotion::all()
            .iter()
            .copied()
            .find(|e| e.as_str() == wanted || e.dir_name() == wanted)
            .ok_or_else(|| DroidError::InvalidParams(format!("unknown emotion {s:?}")))
    }
}

/// Order in which the emotion cues of a phrase are checked.
///
/// Both orders agree on plain phrases and disagree when a phrase carries
/// both a cue word and a `!`: `"Oui!"` is positive under `CueFirst` and a
/// surprise under `PunctuationFirst`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionPrecedence {
    /// `?` → negative word → positive word → `!` → neutral
    #[default]
    CueFirst,
    /// `?` → `!` → positive word → negative word → neutral
    PunctuationFirst,
}

/// Cue words, matched against whole normalized words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionCues {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl Default for EmotionCues {
    fn default() -> Self {
        Self {
            positive: ["oui", "super", "merci"].map(String::from).to_vec(),
            negative: ["non", "triste", "pas"].map(String::from).to_vec(),
        }
    }
}

impl EmotionCues {
    fn any_in(list: &[String], words: &[&str]) -> bool {
        list.iter().any(|cue| words.contains(&cue.as_str()))
    }

    /// Detect the emotion of one phrase.
    ///
    /// `raw` is the phrase with its punctuation intact; `normalized` is the
    /// lowercase, accent-free form used for cue-word lookup.
    pub fn detect(&self, raw: &str, normalized: &str, precedence: EmotionPrecedence) -> Emotion {
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let positive = Self::any_in(&self.positive, &words);
        let negative = Self::any_in(&self.negative, &words);

        if raw.contains('?') {
            return Emotion::Question;
        }
        match precedence {
            EmotionPrecedence::CueFirst => {
                if negative {
                    Emotion::Negative
                } else if positive {
                    Emotion::Positive
                } else if raw.contains('!') {
                    Emotion::Surprise
                } else {
                    Emotion::Neutral
                }
            }
            EmotionPrecedence::PunctuationFirst => {
                if raw.contains('!') {
                    Emotion::Surprise
                } else if positive {
                    Emotion::Positive
                } else if negative {
                    Emotion::Negative
                } else {
                    Emotion::Neutral
                }
            }
        }
    }
}
