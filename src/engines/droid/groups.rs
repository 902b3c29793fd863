use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::model::DroidError;
use super::reducer::Symbol;

/// Acoustic family a consonant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Beep,
    Whistle,
    Tone,
}

impl Category {
    /// Letter used in composite clip file names (`BSP.wav`).
    pub fn letter(&self) -> char {
        match self {
            Category::Beep => 'B',
            Category::Whistle => 'S',
            Category::Tone => 'P',
        }
    }

    /// Name used for this category in composite folder names.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Beep => "Beep",
            Category::Whistle => "Sifflement",
            Category::Tone => "Piano",
        }
    }
}

/// File name prefix of a composite clip, e.g. `BBS`.
pub fn pattern_label(pattern: &[Category]) -> String {
    pattern.iter().map(|c| c.letter()).collect()
}

/// Folder name of a composite pattern, e.g. `Beep Beep Sifflement`.
pub fn pattern_dir(pattern: &[Category]) -> String {
    pattern
        .iter()
        .map(|c| c.dir_name())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Mapped form of one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Group(Category),
    Literal(char),
    Separator,
}

/// Letters of each category as written in `droid.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSets {
    pub beep: String,
    pub whistle: String,
    pub tone: String,
}

impl Default for GroupSets {
    fn default() -> Self {
        Self {
            beep: "bpdtkgq".to_string(),
            whistle: "szfvjxh".to_string(),
            tone: "lmnr".to_string(),
        }
    }
}

/// Closed partition of consonants into categories. Letters outside the
/// table stay literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTable {
    map: HashMap<char, Category>,
}

impl Default for GroupTable {
    fn default() -> Self {
        let sets = GroupSets::default();
        let mut map = HashMap::new();
        for (category, letters) in [
            (Category::Beep, sets.beep),
            (Category::Whistle, sets.whistle),
            (Category::Tone, sets.tone),
        ] {
            map.extend(letters.chars().map(|c| (c, category)));
        }
        Self { map }
    }
}

impl GroupTable {
    pub fn from_sets(sets: &GroupSets) -> Result<Self, DroidError> {
        let mut map = HashMap::new();
        let entries = [
            (Category::Beep, &sets.beep),
            (Category::Whistle, &sets.whistle),
            (Category::Tone, &sets.tone),
        ];
        for (category, letters) in entries {
            for ch in letters.chars().filter(|c| !c.is_whitespace() && *c != ',') {
                if !ch.is_alphabetic() {
                    return Err(DroidError::Config(format!(
                        "group {:?} contains non-letter {ch:?}",
                        category
                    )));
                }
                let ch = ch.to_lowercase().next().unwrap_or(ch);
                if let Some(previous) = map.insert(ch, category) {
                    if previous != category {
                        return Err(DroidError::Config(format!(
                            "letter {ch:?} is in both {previous:?} and {category:?}"
                        )));
                    }
                }
            }
        }
        Ok(Self { map })
    }

    /// Case-insensitive category lookup.
    pub fn classify(&self, ch: char) -> Option<Category> {
        let lower = ch.to_lowercase().next().unwrap_or(ch);
        self.map.get(&lower).copied()
    }

    pub fn tag(&self, symbol: Symbol) -> Tag {
        match symbol {
            Symbol::Separator => Tag::Separator,
            Symbol::Char(c) => match self.classify(c) {
                Some(category) => Tag::Group(category),
                None => Tag::Literal(c.to_lowercase().next().unwrap_or(c)),
            },
        }
    }

    /// Tag every symbol; the output is parallel to the input.
    pub fn map_symbols(&self, symbols: &[Symbol]) -> Vec<Tag> {
        symbols.iter().map(|&s| self.tag(s)).collect()
    }
}
