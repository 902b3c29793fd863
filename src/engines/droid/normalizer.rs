use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::emotion::{Emotion, EmotionCues, EmotionPrecedence};

/// One sentence of the input message with its detected emotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    /// The sentence as written, terminal punctuation included.
    pub raw: String,
    /// Lowercase, accent-free, punctuation replaced by single spaces.
    pub text: String,
    pub emotion: Emotion,
}

/// Split a message into phrases on `.`, `!` and `?`, keeping the delimiter
/// with the preceding phrase.
///
/// Phrases that are empty once trimmed, or that normalize to nothing, are
/// dropped.
pub fn split_phrases(
    message: &str,
    cues: &EmotionCues,
    precedence: EmotionPrecedence,
) -> Vec<Phrase> {
    let mut phrases = Vec::new();
    let mut current = String::new();

    for ch in message.chars() {
        if matches!(ch, '.' | '!' | '?') {
            if !current.trim().is_empty() {
                current.push(ch);
                flush_phrase(&mut phrases, &current, cues, precedence);
            }
            current.clear();
            continue;
        }
        current.push(ch);
    }

    flush_phrase(&mut phrases, &current, cues, precedence);
    phrases
}

fn flush_phrase(
    phrases: &mut Vec<Phrase>,
    current: &str,
    cues: &EmotionCues,
    precedence: EmotionPrecedence,
) {
    let raw = current.trim();
    if raw.is_empty() {
        return;
    }
    let text = normalize_text(raw);
    if text.is_empty() {
        return;
    }
    let emotion = cues.detect(raw, &text, precedence);
    log::debug!("Phrase {raw:?} -> {emotion}");
    phrases.push(Phrase {
        raw: raw.to_string(),
        text,
        emotion,
    });
}

/// Remove combining marks after canonical decomposition (`é` → `e`).
pub fn fold_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Fold accents, lowercase, and turn every run of non-alphanumeric
/// characters (apostrophes, hyphens, punctuation, whitespace) into a single
/// space. The result has no leading or trailing space.
///
/// Normalizing an already normalized string returns it unchanged.
pub fn normalize_text(text: &str) -> String {
    let folded = fold_diacritics(text).to_lowercase();
    let mut out = String::with_capacity(folded.len());

    for ch in folded.chars() {
        if ch.is_alphanumeric() {
            out.push(ch);
        } else if !out.is_empty() && !out.ends_with(' ') {
            out.push(' ');
        }
    }

    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out
}
