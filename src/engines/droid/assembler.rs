use std::fmt;

use crate::{SynthesisResult, OUTPUT_SAMPLE_RATE};

use super::bank::{AssetRef, SoundBank};
use super::emotion::Emotion;
use super::resolver::ResolvedChunk;

/// What happened to one chunk during assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceStatus {
    Played,
    /// No clip was found for the chunk.
    Missing,
    /// A clip was selected but could not be decoded.
    Undecodable(String),
}

/// One row of the alignment trace: symbols → clip → emotion → path.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub source: String,
    pub asset: Option<AssetRef>,
    pub emotion: Emotion,
    pub len: usize,
    pub duration_secs: f64,
    pub status: TraceStatus,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (file, path) = match (&self.status, &self.asset) {
            (TraceStatus::Played, Some(asset)) => {
                (asset.file_name(), asset.path.display().to_string())
            }
            (TraceStatus::Undecodable(reason), Some(asset)) => (
                format!("{} (unreadable)", asset.file_name()),
                reason.clone(),
            ),
            _ => ("-".to_string(), "no clip found".to_string()),
        };
        write!(
            f,
            "| {:<8} | {:<24} | {:<9} | {:>6.2}s | {}",
            self.source, file, self.emotion, self.duration_secs, path
        )
    }
}

/// Assembled audio of a whole message with its alignment trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    /// Sum of the durations of every played clip.
    pub total_duration_secs: f64,
    pub trace: Vec<TraceEntry>,
}

impl Utterance {
    /// Human-readable alignment table, one row per chunk.
    pub fn alignment_table(&self) -> String {
        let mut out = String::from("| Symbols  | Clip                     | Emotion   | Length  | Path\n");
        for entry in &self.trace {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out.push_str(&format!("Total: {:.2}s", self.total_duration_secs));
        out
    }

    pub fn into_result(self) -> SynthesisResult {
        SynthesisResult {
            samples: self.samples,
            sample_rate: self.sample_rate,
        }
    }
}

/// Concatenate the clips of `chunks` in order.
///
/// Chunks without a clip, and clips that fail to decode, leave a gap in the
/// trace and contribute no audio. `crossfade_samples` overlaps consecutive
/// clips; zero gives plain concatenation.
pub fn assemble<B: SoundBank + ?Sized>(
    bank: &B,
    chunks: &[ResolvedChunk],
    crossfade_samples: usize,
) -> Utterance {
    let mut samples = Vec::new();
    let mut total_duration_secs = 0.0;
    let mut trace = Vec::with_capacity(chunks.len());

    for chunk in chunks {
        let mut entry = TraceEntry {
            source: chunk.source.clone(),
            asset: chunk.asset.clone(),
            emotion: chunk.emotion,
            len: chunk.len,
            duration_secs: 0.0,
            status: TraceStatus::Missing,
        };

        if let Some(asset) = &chunk.asset {
            match bank.load(asset) {
                Ok(clip) => {
                    if clip.sample_rate != OUTPUT_SAMPLE_RATE {
                        log::warn!(
                            "{} is {} Hz, output is {} Hz",
                            asset.path.display(),
                            clip.sample_rate,
                            OUTPUT_SAMPLE_RATE
                        );
                    }
                    entry.duration_secs = clip.duration_secs();
                    entry.status = TraceStatus::Played;
                    total_duration_secs += entry.duration_secs;
                    if samples.is_empty() {
                        samples.extend_from_slice(&clip.samples);
                    } else {
                        append_with_crossfade(&mut samples, &clip.samples, crossfade_samples);
                    }
                }
                Err(e) => {
                    log::warn!("Skipping {}: {e}", asset.path.display());
                    entry.status = TraceStatus::Undecodable(e.to_string());
                }
            }
        }

        trace.push(entry);
    }

    let utterance = Utterance {
        samples,
        sample_rate: OUTPUT_SAMPLE_RATE,
        total_duration_secs,
        trace,
    };
    log::debug!("Alignment:\n{}", utterance.alignment_table());
    log::info!(
        "Assembled {} chunks into {:.2}s of audio",
        chunks.len(),
        utterance.total_duration_secs
    );
    utterance
}

fn append_with_crossfade(dst: &mut Vec<i16>, src: &[i16], crossfade_samples: usize) {
    let overlap = crossfade_samples.min(dst.len()).min(src.len());
    if overlap == 0 {
        dst.extend_from_slice(src);
        return;
    }

    let dst_start = dst.len() - overlap;
    for i in 0..overlap {
        let t = (i + 1) as f32 / (overlap as f32 + 1.0);
        let left = f32::from(dst[dst_start + i]) * (1.0 - t);
        let right = f32::from(src[i]) * t;
        dst[dst_start + i] = (left + right).round() as i16;
    }

    dst.extend_from_slice(&src[overlap..]);
}
