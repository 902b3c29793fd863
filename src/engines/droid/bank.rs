use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;

use super::emotion::Emotion;
use super::groups::{pattern_dir, Category};
use super::model::DroidError;

pub const EMOTIONS_DIR: &str = "emotions";
pub const CONSONANTS_DIR: &str = "consonnes";
pub const COMPOSITIONS_DIR: &str = "compositions";

/// A folder of a sound bank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetLocation {
    /// `emotions/<emotion>/`, single-letter clips for one emotion.
    Emotion(Emotion),
    /// `consonnes/`, neutral single-letter clips.
    Consonants,
    /// `compositions/<N>_caracteres/<Pattern>/<emotion>/`
    Composite {
        pattern: Vec<Category>,
        emotion: Emotion,
    },
}

impl AssetLocation {
    /// Path of the folder relative to the bank root.
    pub fn relative_dir(&self) -> PathBuf {
        match self {
            AssetLocation::Emotion(emotion) => Path::new(EMOTIONS_DIR).join(emotion.dir_name()),
            AssetLocation::Consonants => PathBuf::from(CONSONANTS_DIR),
            AssetLocation::Composite { pattern, emotion } => Path::new(COMPOSITIONS_DIR)
                .join(format!("{}_caracteres", pattern.len()))
                .join(pattern_dir(pattern))
                .join(emotion.dir_name()),
        }
    }
}

/// Identity of one clip. Two refs are the same asset iff their paths are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetRef {
    pub path: PathBuf,
}

impl AssetRef {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Decoded mono 16-bit audio of one clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl Clip {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Storage of labeled clips.
pub trait SoundBank {
    /// Clips in `location` whose file name starts with `label`
    /// (case-insensitive) and ends in `.wav`, in a stable order.
    ///
    /// A missing folder yields no candidates.
    fn candidates(&self, location: &AssetLocation, label: &str) -> Vec<AssetRef>;

    /// Decode one clip.
    fn load(&self, asset: &AssetRef) -> Result<Clip, DroidError>;
}

/// File name convention: label prefix, optional suffix, `.wav` extension.
pub fn label_matches(file_name: &str, label: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower.ends_with(".wav") && lower.starts_with(&label.to_lowercase())
}

/// Sound bank backed by a directory tree. Folders are listed on every lookup.
#[derive(Debug, Clone)]
pub struct FsSoundBank {
    root: PathBuf,
}

impl FsSoundBank {
    pub fn open(root: &Path) -> Result<Self, DroidError> {
        if !root.is_dir() {
            return Err(DroidError::BankNotFound(root.to_path_buf()));
        }
        log::info!("Using sound bank at {}", root.display());
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SoundBank for FsSoundBank {
    fn candidates(&self, location: &AssetLocation, label: &str) -> Vec<AssetRef> {
        let dir = self.root.join(location.relative_dir());
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    log::debug!("Folder not found: {}", dir.display());
                } else {
                    log::warn!("Cannot list {}: {e}", dir.display());
                }
                return Vec::new();
            }
        };

        let mut found: Vec<AssetRef> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter(|entry| label_matches(&entry.file_name().to_string_lossy(), label))
            .map(|entry| AssetRef { path: entry.path() })
            .collect();
        found.sort();
        found
    }

    fn load(&self, asset: &AssetRef) -> Result<Clip, DroidError> {
        read_wav_file(&asset.path)
    }
}

/// Decode a WAV file into a mono 16-bit clip.
pub fn read_wav_file(path: &Path) -> Result<Clip, DroidError> {
    let reader = hound::WavReader::open(path).map_err(|e| DroidError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    decode_wav(reader).map_err(|e| DroidError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Convert any PCM layout hound can read to mono 16-bit, keeping the rate.
pub fn decode_wav<R: Read>(mut reader: hound::WavReader<R>) -> Result<Clip, hound::Error> {
    let spec = reader.spec();
    let interleaved: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => reader.samples::<i16>().collect::<Result<_, _>>()?,
        (hound::SampleFormat::Int, bits) => {
            let shift = i32::from(bits) - 16;
            reader
                .samples::<i32>()
                .map(|s| {
                    s.map(|v| {
                        let scaled = if shift >= 0 { v >> shift } else { v << -shift };
                        scaled.clamp(i16::MIN as i32, i16::MAX as i32) as i16
                    })
                })
                .collect::<Result<_, _>>()?
        }
        (hound::SampleFormat::Float, _) => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<Result<_, _>>()?,
    };

    let channels = usize::from(spec.channels.max(1));
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
                (sum / frame.len() as i32) as i16
            })
            .collect()
    };

    Ok(Clip {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Sound bank held in memory, laid out like [`FsSoundBank`].
///
/// A clip inserted with [`MemorySoundBank::insert_undecodable`] is listed
/// but fails to load.
#[derive(Debug, Clone, Default)]
pub struct MemorySoundBank {
    dirs: HashMap<PathBuf, Vec<(String, Option<Clip>)>>,
}

impl MemorySoundBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location: &AssetLocation, file_name: &str, clip: Clip) -> AssetRef {
        self.insert_entry(location, file_name, Some(clip))
    }

    pub fn insert_undecodable(&mut self, location: &AssetLocation, file_name: &str) -> AssetRef {
        self.insert_entry(location, file_name, None)
    }

    fn insert_entry(
        &mut self,
        location: &AssetLocation,
        file_name: &str,
        clip: Option<Clip>,
    ) -> AssetRef {
        let dir = location.relative_dir();
        let entries = self.dirs.entry(dir.clone()).or_default();
        entries.retain(|(name, _)| name != file_name);
        entries.push((file_name.to_string(), clip));
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        AssetRef {
            path: dir.join(file_name),
        }
    }
}

impl SoundBank for MemorySoundBank {
    fn candidates(&self, location: &AssetLocation, label: &str) -> Vec<AssetRef> {
        let dir = location.relative_dir();
        self.dirs
            .get(&dir)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(name, _)| label_matches(name, label))
                    .map(|(name, _)| AssetRef {
                        path: dir.join(name),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn load(&self, asset: &AssetRef) -> Result<Clip, DroidError> {
        let not_decodable = |reason: &str| DroidError::Decode {
            path: asset.path.clone(),
            reason: reason.to_string(),
        };
        let dir = asset.path.parent().unwrap_or(Path::new(""));
        let name = asset.file_name();
        let entry = self
            .dirs
            .get(dir)
            .and_then(|entries| entries.iter().find(|(n, _)| *n == name))
            .ok_or_else(|| not_decodable("not in bank"))?;
        entry
            .1
            .clone()
            .ok_or_else(|| not_decodable("invalid audio data"))
    }
}

/// Assets already emitted during one resolver pass.
#[derive(Debug, Clone, Default)]
pub struct UsedAssets {
    seen: HashSet<AssetRef>,
}

impl UsedAssets {
    pub fn contains(&self, asset: &AssetRef) -> bool {
        self.seen.contains(asset)
    }

    pub fn insert(&mut self, asset: AssetRef) -> bool {
        self.seen.insert(asset)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// A chosen asset and the emotion of the folder it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub asset: AssetRef,
    pub emotion: Emotion,
}

/// Folders tried for one single-letter label.
pub fn letter_chain(emotion: Emotion) -> Vec<(AssetLocation, Emotion)> {
    vec![
        (AssetLocation::Emotion(emotion), emotion),
        (AssetLocation::Consonants, Emotion::Neutral),
    ]
}

/// Folders tried for one composite pattern.
pub fn composite_chain(pattern: &[Category], emotion: Emotion) -> Vec<(AssetLocation, Emotion)> {
    let at = |emotion| AssetLocation::Composite {
        pattern: pattern.to_vec(),
        emotion,
    };
    let mut chain = vec![(at(emotion), emotion)];
    if emotion != Emotion::Neutral {
        chain.push((at(Emotion::Neutral), Emotion::Neutral));
    }
    chain
}

/// Pick a random unused asset for `label`, trying each folder of `chain`
/// in order. The chosen asset is recorded in `used` before returning.
pub fn select_asset<B, R>(
    bank: &B,
    label: &str,
    chain: &[(AssetLocation, Emotion)],
    used: &mut UsedAssets,
    rng: &mut R,
) -> Option<Selection>
where
    B: SoundBank + ?Sized,
    R: Rng + ?Sized,
{
    for (location, emotion) in chain {
        let fresh: Vec<AssetRef> = bank
            .candidates(location, label)
            .into_iter()
            .filter(|asset| !used.contains(asset))
            .collect();

        if let Some(asset) = fresh.choose(rng) {
            used.insert(asset.clone());
            return Some(Selection {
                asset: asset.clone(),
                emotion: *emotion,
            });
        }
        log::debug!(
            "No unused clip for {label:?} in {}",
            location.relative_dir().display()
        );
    }
    None
}
