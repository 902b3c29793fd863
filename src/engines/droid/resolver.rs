use rand::Rng;

use super::bank::{composite_chain, letter_chain, select_asset, AssetRef, SoundBank, UsedAssets};
use super::emotion::Emotion;
use super::groups::{pattern_label, Category, Tag};
use super::reducer::Symbol;

/// Longest composite pattern tried by default.
pub const DEFAULT_MAX_CHUNK: usize = 4;

/// One entry of a resolution trace, in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChunk {
    /// `None` when no clip exists for this chunk.
    pub asset: Option<AssetRef>,
    /// Emotion of the folder the clip came from.
    pub emotion: Emotion,
    /// Number of symbols covered.
    pub len: usize,
    /// The symbols covered, as characters.
    pub source: String,
}

/// Greedy longest-match resolver over a tagged symbol stream.
///
/// Each word produces exactly one chunk: the longest uniform run starting at
/// the word's first symbol that has a composite clip, or else a clip for the
/// first symbol alone. The rest of the word is skipped.
pub struct ChunkResolver<'a, B: SoundBank + ?Sized> {
    bank: &'a B,
    max_chunk: usize,
    allow_mixed: bool,
}

impl<'a, B: SoundBank + ?Sized> ChunkResolver<'a, B> {
    pub fn new(bank: &'a B, max_chunk: usize) -> Self {
        Self {
            bank,
            max_chunk: max_chunk.max(1),
            allow_mixed: false,
        }
    }

    /// Accept composites mixing several categories (`BSP`) instead of only
    /// uniform runs (`BBB`).
    pub fn allow_mixed_patterns(mut self, allow: bool) -> Self {
        self.allow_mixed = allow;
        self
    }

    /// Resolve one phrase. `tags` must be parallel to `symbols`.
    ///
    /// The set of used assets is local to this call.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        symbols: &[Symbol],
        tags: &[Tag],
        emotion: Emotion,
        rng: &mut R,
    ) -> Vec<ResolvedChunk> {
        debug_assert_eq!(symbols.len(), tags.len());
        let len = symbols.len().min(tags.len());
        let mut used = UsedAssets::default();
        let mut chunks = Vec::new();
        let mut i = 0;

        while i < len {
            if matches!(symbols[i], Symbol::Separator) {
                i += 1;
                continue;
            }
            let word_end = (i..len)
                .find(|&j| matches!(symbols[j], Symbol::Separator))
                .unwrap_or(len);
            let longest = self.max_chunk.min(word_end - i);

            let chunk = (2..=longest)
                .rev()
                .find_map(|n| {
                    let (run, run_tags) = (&symbols[i..i + n], &tags[i..i + n]);
                    self.resolve_composite(run, run_tags, emotion, &mut used, rng)
                })
                .unwrap_or_else(|| self.resolve_letter(symbols[i], emotion, &mut used, rng));

            chunks.push(chunk);
            i = word_end;
        }

        chunks
    }

    fn pattern(&self, tags: &[Tag]) -> Option<Vec<Category>> {
        let pattern: Vec<Category> = tags
            .iter()
            .map(|tag| match tag {
                Tag::Group(category) => Some(*category),
                _ => None,
            })
            .collect::<Option<Vec<Category>>>()?;
        let uniform = pattern.windows(2).all(|w| w[0] == w[1]);
        (self.allow_mixed || uniform).then_some(pattern)
    }

    fn resolve_composite<R: Rng + ?Sized>(
        &self,
        symbols: &[Symbol],
        tags: &[Tag],
        emotion: Emotion,
        used: &mut UsedAssets,
        rng: &mut R,
    ) -> Option<ResolvedChunk> {
        let pattern = self.pattern(tags)?;
        let label = pattern_label(&pattern);
        let selection = select_asset(
            self.bank,
            &label,
            &composite_chain(&pattern, emotion),
            used,
            rng,
        )?;
        log::debug!("Chunk {label} -> {}", selection.asset.path.display());
        Some(ResolvedChunk {
            asset: Some(selection.asset),
            emotion: selection.emotion,
            len: symbols.len(),
            source: symbols.iter().filter_map(Symbol::as_char).collect(),
        })
    }

    fn resolve_letter<R: Rng + ?Sized>(
        &self,
        symbol: Symbol,
        emotion: Emotion,
        used: &mut UsedAssets,
        rng: &mut R,
    ) -> ResolvedChunk {
        let letter = symbol
            .as_char()
            .map(|c| c.to_lowercase().collect::<String>())
            .unwrap_or_default();
        match select_asset(self.bank, &letter, &letter_chain(emotion), used, rng) {
            Some(selection) => {
                log::debug!("Letter {letter} -> {}", selection.asset.path.display());
                ResolvedChunk {
                    asset: Some(selection.asset),
                    emotion: selection.emotion,
                    len: 1,
                    source: letter,
                }
            }
            None => {
                log::warn!("No clip found for {letter:?} ({emotion})");
                ResolvedChunk {
                    asset: None,
                    emotion,
                    len: 1,
                    source: letter,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::droid::bank::{AssetLocation, Clip, MemorySoundBank};
    use crate::engines::droid::groups::GroupTable;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn clip() -> Clip {
        Clip {
            samples: vec![1; 4],
            sample_rate: 44_100,
        }
    }

    fn symbols(text: &str) -> Vec<Symbol> {
        text.chars()
            .map(|c| if c == '_' { Symbol::Separator } else { Symbol::Char(c) })
            .collect()
    }

    fn composite(pattern: &[Category], emotion: Emotion) -> AssetLocation {
        AssetLocation::Composite {
            pattern: pattern.to_vec(),
            emotion,
        }
    }

    fn run(
        bank: &MemorySoundBank,
        text: &str,
        emotion: Emotion,
        max_chunk: usize,
    ) -> Vec<ResolvedChunk> {
        let symbols = symbols(text);
        let tags = GroupTable::default().map_symbols(&symbols);
        let mut rng = StdRng::seed_from_u64(11);
        ChunkResolver::new(bank, max_chunk).resolve(&symbols, &tags, emotion, &mut rng)
    }

    #[test]
    fn prefers_the_longest_composite() {
        use Category::Beep;
        let mut bank = MemorySoundBank::new();
        bank.insert(&composite(&[Beep, Beep], Emotion::Neutral), "BB.wav", clip());
        let full = bank.insert(&composite(&[Beep, Beep, Beep], Emotion::Neutral), "BBB.wav", clip());
        bank.insert(&AssetLocation::Consonants, "b.wav", clip());

        let chunks = run(&bank, "bdt", Emotion::Neutral, 4);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].asset, Some(full));
        assert_eq!(chunks[0].len, 3);
        assert_eq!(chunks[0].source, "bdt");
    }

    #[test]
    fn shorter_composite_when_longest_is_missing() {
        use Category::Beep;
        let mut bank = MemorySoundBank::new();
        let pair = bank.insert(&composite(&[Beep, Beep], Emotion::Neutral), "BB.wav", clip());

        let chunks = run(&bank, "bdt", Emotion::Neutral, 4);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].asset, Some(pair));
        assert_eq!(chunks[0].len, 2);
    }

    #[test]
    fn chunks_never_cross_words_or_exceed_max() {
        use Category::Beep;
        let mut bank = MemorySoundBank::new();
        for n in 2..=4 {
            let pattern = vec![Beep; n];
            let name = format!("{}.wav", pattern_label(&pattern));
            bank.insert(&composite(&pattern, Emotion::Neutral), &name, clip());
        }

        let chunks = run(&bank, "bdtk_pg", Emotion::Neutral, 3);
        let lens: Vec<usize> = chunks.iter().map(|c| c.len).collect();
        assert_eq!(lens, vec![3, 2]);
        assert_eq!(chunks[1].source, "pg");
    }

    #[test]
    fn mixed_runs_fall_back_to_first_letter() {
        use Category::{Beep, Whistle};
        let mut bank = MemorySoundBank::new();
        bank.insert(&composite(&[Beep, Whistle], Emotion::Neutral), "BS.wav", clip());
        let letter = bank.insert(&AssetLocation::Consonants, "b.wav", clip());

        let chunks = run(&bank, "bs", Emotion::Neutral, 4);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].asset, Some(letter));
        assert_eq!(chunks[0].source, "b");
    }

    #[test]
    fn mixed_runs_match_when_allowed() {
        use Category::{Beep, Whistle};
        let mut bank = MemorySoundBank::new();
        let mixed = bank.insert(&composite(&[Beep, Whistle], Emotion::Neutral), "BS.wav", clip());

        let symbols = symbols("bs");
        let tags = GroupTable::default().map_symbols(&symbols);
        let mut rng = StdRng::seed_from_u64(1);
        let chunks = ChunkResolver::new(&bank, 4)
            .allow_mixed_patterns(true)
            .resolve(&symbols, &tags, Emotion::Neutral, &mut rng);
        assert_eq!(chunks[0].asset, Some(mixed));
    }

    #[test]
    fn literal_letters_resolve_by_character() {
        let mut bank = MemorySoundBank::new();
        let c = bank.insert(&AssetLocation::Emotion(Emotion::Surprise), "c.wav", clip());

        let chunks = run(&bank, "cb", Emotion::Surprise, 4);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].asset, Some(c));
        assert_eq!(chunks[0].emotion, Emotion::Surprise);
    }

    #[test]
    fn missing_clips_leave_a_gap_and_continue() {
        let mut bank = MemorySoundBank::new();
        let m = bank.insert(&AssetLocation::Consonants, "m.wav", clip());

        let chunks = run(&bank, "w_m", Emotion::Question, 4);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].asset, None);
        assert_eq!(chunks[0].source, "w");
        assert_eq!(chunks[0].emotion, Emotion::Question);
        assert_eq!(chunks[1].asset, Some(m));
        assert_eq!(chunks[1].emotion, Emotion::Neutral);
    }

    #[test]
    fn composite_falls_back_to_neutral_folder() {
        use Category::Tone;
        let mut bank = MemorySoundBank::new();
        let neutral = bank.insert(&composite(&[Tone, Tone], Emotion::Neutral), "PP.wav", clip());

        let chunks = run(&bank, "lm", Emotion::Negative, 4);
        assert_eq!(chunks[0].asset, Some(neutral));
        assert_eq!(chunks[0].emotion, Emotion::Neutral);
    }

    #[test]
    fn no_asset_repeats_within_a_pass() {
        use Category::Beep;
        let mut bank = MemorySoundBank::new();
        bank.insert(&composite(&[Beep, Beep], Emotion::Neutral), "BB.wav", clip());
        bank.insert(&composite(&[Beep, Beep], Emotion::Neutral), "BB2.wav", clip());
        bank.insert(&AssetLocation::Consonants, "b.wav", clip());

        let chunks = run(&bank, "bd_bd_bd_bd", Emotion::Neutral, 4);
        assert_eq!(chunks.len(), 4);
        let assets: Vec<&AssetRef> = chunks.iter().filter_map(|c| c.asset.as_ref()).collect();
        assert_eq!(assets.len(), 3);
        let unique: std::collections::HashSet<_> = assets.iter().collect();
        assert_eq!(unique.len(), assets.len());
        assert_eq!(chunks[3].asset, None);
    }

    #[test]
    fn output_follows_word_order() {
        let mut bank = MemorySoundBank::new();
        for letter in ["s", "l", "t"] {
            bank.insert(&AssetLocation::Consonants, &format!("{letter}.wav"), clip());
        }
        let chunks = run(&bank, "s_l_t", Emotion::Neutral, 4);
        let sources: Vec<&str> = chunks.iter().map(|c| c.source.as_str()).collect();
        assert_eq!(sources, vec!["s", "l", "t"]);
    }

    #[test]
    fn empty_stream_resolves_to_nothing() {
        let bank = MemorySoundBank::new();
        assert!(run(&bank, "", Emotion::Neutral, 4).is_empty());
        assert!(run(&bank, "__", Emotion::Neutral, 4).is_empty());
    }
}
