use serde::{Deserialize, Serialize};

/// One element of a reduced phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Char(char),
    /// Word boundary. Never matched, but no chunk may span it.
    Separator,
}

impl Symbol {
    pub fn as_char(&self) -> Option<char> {
        match self {
            Symbol::Char(c) => Some(*c),
            Symbol::Separator => None,
        }
    }
}

/// Which characters of a phrase are kept as sound-bearing symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReducerPolicy {
    /// Consonant runs directly followed by a vowel, inside words longer
    /// than `min_word_len` or listed in `keep_words`.
    #[default]
    Adjacency,
    /// Every alphabetic character that is not a vowel.
    RetainAll,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReducerConfig {
    pub policy: ReducerPolicy,
    /// Words with at most this many characters are dropped by the adjacency policy.
    pub min_word_len: usize,
    /// Short words that are kept anyway.
    pub keep_words: Vec<String>,
    pub vowels: String,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            policy: ReducerPolicy::Adjacency,
            min_word_len: 2,
            keep_words: ["je", "tu", "il", "on", "yo"].map(String::from).to_vec(),
            vowels: "aeiouy".to_string(),
        }
    }
}

impl ReducerConfig {
    fn is_vowel(&self, c: char) -> bool {
        self.vowels.contains(c)
    }

    fn is_consonant(&self, c: char) -> bool {
        c.is_alphabetic() && !self.is_vowel(c)
    }

    /// Reduce a normalized phrase to its symbol stream.
    ///
    /// Under the adjacency policy an empty result is retried with no
    /// minimum word length, then with the retain-all policy.
    pub fn reduce(&self, phrase: &str) -> Vec<Symbol> {
        match self.policy {
            ReducerPolicy::RetainAll => self.retain_all(phrase),
            ReducerPolicy::Adjacency => {
                let symbols = self.adjacency(phrase, self.min_word_len);
                if !symbols.is_empty() {
                    return symbols;
                }
                if self.min_word_len > 0 {
                    let symbols = self.adjacency(phrase, 0);
                    if !symbols.is_empty() {
                        log::debug!("Reducer retried {phrase:?} without word length limit");
                        return symbols;
                    }
                }
                log::debug!("Reducer fell back to retain-all for {phrase:?}");
                self.retain_all(phrase)
            }
        }
    }

    fn adjacency(&self, phrase: &str, min_word_len: usize) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        for word in phrase.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            if chars.len() <= min_word_len && !self.keep_words.iter().any(|k| k == word) {
                continue;
            }

            let mut kept = Vec::new();
            let mut run_start = None;
            for (i, &c) in chars.iter().enumerate() {
                if self.is_consonant(c) {
                    if run_start.is_none() {
                        run_start = Some(i);
                    }
                    continue;
                }
                if let Some(start) = run_start.take() {
                    if self.is_vowel(c) {
                        kept.extend_from_slice(&chars[start..i]);
                    }
                }
            }
            push_word(&mut symbols, &kept);
        }
        symbols
    }

    fn retain_all(&self, phrase: &str) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        for word in phrase.split_whitespace() {
            let kept: Vec<char> = word.chars().filter(|&c| self.is_consonant(c)).collect();
            push_word(&mut symbols, &kept);
        }
        symbols
    }
}

fn push_word(symbols: &mut Vec<Symbol>, kept: &[char]) {
    if kept.is_empty() {
        return;
    }
    if !symbols.is_empty() {
        symbols.push(Symbol::Separator);
    }
    symbols.extend(kept.iter().map(|&c| Symbol::Char(c)));
}

/// Render a stream for logs, with `_` for separators.
pub fn display_symbols(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(|s| s.as_char().unwrap_or('_'))
        .collect()
}
