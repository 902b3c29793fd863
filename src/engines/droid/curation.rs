//! Maintenance helpers for sound bank folders: spotting duplicate clips and
//! tagging files with their duration.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::bank::{read_wav_file, Clip};
use super::model::DroidError;

/// Clips whose lengths differ by less than this are compared further.
pub const DUPLICATE_TOLERANCE_SECS: f64 = 0.05;

/// Leading PCM bytes compared between two clips.
pub const DUPLICATE_PREFIX_BYTES: usize = 1000;

fn pcm_prefix(clip: &Clip) -> &[i16] {
    let n = (DUPLICATE_PREFIX_BYTES / 2).min(clip.samples.len());
    &clip.samples[..n]
}

/// Two clips are duplicates when their durations are within
/// [`DUPLICATE_TOLERANCE_SECS`] and their first [`DUPLICATE_PREFIX_BYTES`]
/// bytes of PCM are identical.
pub fn is_duplicate(a: &Clip, b: &Clip) -> bool {
    (a.duration_secs() - b.duration_secs()).abs() < DUPLICATE_TOLERANCE_SECS
        && pcm_prefix(a) == pcm_prefix(b)
}

/// Assign new names to a set of clips, in file-name order.
///
/// The k-th distinct clip becomes `k.wav`; later duplicates of it become
/// `k.1.wav`, `k.2.wav`, ... Returns `(old name, new name)` pairs.
pub fn plan_deduplication(clips: &[(String, Clip)]) -> Vec<(String, String)> {
    let mut order: Vec<&(String, Clip)> = clips.iter().collect();
    order.sort_by(|a, b| a.0.cmp(&b.0));

    let mut unique: Vec<&Clip> = Vec::new();
    let mut copies: HashMap<usize, usize> = HashMap::new();
    let mut plan = Vec::with_capacity(order.len());

    for (name, clip) in order {
        let new_name = match unique.iter().position(|u| is_duplicate(clip, u)) {
            Some(pos) => {
                let k = pos + 1;
                let n = copies.entry(k).or_insert(0);
                *n += 1;
                format!("{k}.{n}.wav")
            }
            None => {
                unique.push(clip);
                format!("{}.wav", unique.len())
            }
        };
        plan.push((name.clone(), new_name));
    }

    plan
}

fn wav_files(dir: &Path) -> Result<Vec<String>, DroidError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.path().is_file() && name.to_lowercase().ends_with(".wav") {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Copy every clip of `src` into a freshly recreated `dst` under its
/// deduplicated name.
///
/// Every source clip is decoded before `dst` is touched. `dst` may not be
/// `src` itself or one of its parents.
pub fn deduplicate_dir(src: &Path, dst: &Path) -> Result<Vec<(String, String)>, DroidError> {
    let src_root = src.canonicalize()?;
    if dst.exists() && src_root.starts_with(dst.canonicalize()?) {
        return Err(DroidError::InvalidParams(format!(
            "{} would be wiped by writing into {}",
            src.display(),
            dst.display()
        )));
    }

    let mut clips = Vec::new();
    for name in wav_files(&src_root)? {
        let clip = read_wav_file(&src_root.join(&name))?;
        clips.push((name, clip));
    }
    let plan = plan_deduplication(&clips);

    if dst.exists() {
        log::info!("Removing previous {}", dst.display());
        fs::remove_dir_all(dst)?;
    }
    fs::create_dir_all(dst)?;

    for (old, new) in &plan {
        fs::copy(src_root.join(old), dst.join(new))?;
        log::info!("{old} -> {new}");
    }
    Ok(plan)
}

/// `"{seconds}s - {name}"`, with the duration rounded to two decimals and
/// written without trailing zeros (`0.5s`, `1.0s`, `0.25s`).
pub fn duration_prefixed_name(name: &str, clip: &Clip) -> String {
    let secs = (clip.duration_secs() * 100.0).round() / 100.0;
    if secs.fract() == 0.0 {
        format!("{secs:.1}s - {name}")
    } else {
        format!("{secs}s - {name}")
    }
}

/// Prefix every clip of `dir` with its duration.
///
/// Unreadable files and files whose new name is already taken are left alone.
pub fn rename_by_duration(dir: &Path) -> Result<Vec<(String, String)>, DroidError> {
    let mut renamed = Vec::new();
    for name in wav_files(dir)? {
        let path = dir.join(&name);
        let clip = match read_wav_file(&path) {
            Ok(clip) => clip,
            Err(e) => {
                log::warn!("{e}");
                continue;
            }
        };
        let new_name = duration_prefixed_name(&name, &clip);
        let new_path = dir.join(&new_name);
        if new_path.exists() {
            log::warn!("Already renamed: {new_name}");
            continue;
        }
        fs::rename(&path, &new_path)?;
        renamed.push((name, new_name));
    }
    log::info!("Renamed {} files in {}", renamed.len(), dir.display());
    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(samples: Vec<i16>) -> Clip {
        Clip {
            samples,
            sample_rate: 44_100,
        }
    }

    fn write(path: &Path, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn duplicates_share_prefix_and_length() {
        let base: Vec<i16> = (0..2000).map(|i| (i % 100) as i16).collect();
        let mut tail_changed = base.clone();
        tail_changed[1500] = 42;
        let mut head_changed = base.clone();
        head_changed[10] = -1;
        let longer: Vec<i16> = base.iter().copied().chain(vec![0; 4410]).collect();

        assert!(is_duplicate(&clip(base.clone()), &clip(tail_changed)));
        assert!(!is_duplicate(&clip(base.clone()), &clip(head_changed)));
        assert!(!is_duplicate(&clip(base), &clip(longer)));
    }

    #[test]
    fn plan_numbers_unique_clips_and_their_copies() {
        let a = clip(vec![1; 600]);
        let b = clip(vec![2; 600]);
        let clips = vec![
            ("c.wav".to_string(), a.clone()),
            ("a.wav".to_string(), a.clone()),
            ("b.wav".to_string(), b),
            ("d.wav".to_string(), a),
        ];
        let plan = plan_deduplication(&clips);
        assert_eq!(
            plan,
            vec![
                ("a.wav".to_string(), "1.wav".to_string()),
                ("b.wav".to_string(), "2.wav".to_string()),
                ("c.wav".to_string(), "1.1.wav".to_string()),
                ("d.wav".to_string(), "1.2.wav".to_string()),
            ]
        );
    }

    #[test]
    fn deduplicates_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("compressed");
        let dst = dir.path().join("unique");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("stale.wav"), b"old").unwrap();
        write(&src.join("x.wav"), &[5; 300]);
        write(&src.join("y.wav"), &[5; 300]);

        let plan = deduplicate_dir(&src, &dst).unwrap();
        assert_eq!(plan.len(), 2);
        assert!(dst.join("1.wav").exists());
        assert!(dst.join("1.1.wav").exists());
        assert!(!dst.join("stale.wav").exists());
    }

    #[test]
    fn refuses_to_overwrite_its_own_source() {
        let dir = tempfile::tempdir().unwrap();
        let bank = dir.path().join("bank");
        fs::create_dir_all(&bank).unwrap();
        write(&bank.join("x.wav"), &[5; 300]);

        let err = deduplicate_dir(&bank, &bank).unwrap_err();
        assert!(matches!(err, DroidError::InvalidParams(_)));
        assert!(bank.join("x.wav").exists());

        let err = deduplicate_dir(&bank, dir.path()).unwrap_err();
        assert!(matches!(err, DroidError::InvalidParams(_)));
        assert!(bank.join("x.wav").exists());
    }

    #[test]
    fn unreadable_source_leaves_destination_alone() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("compressed");
        let dst = dir.path().join("unique");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("1.wav"), b"previous run").unwrap();
        write(&src.join("a.wav"), &[5; 300]);
        fs::write(src.join("b.wav"), b"nope").unwrap();

        assert!(matches!(
            deduplicate_dir(&src, &dst),
            Err(DroidError::Decode { .. })
        ));
        assert!(dst.join("1.wav").exists());
    }

    #[test]
    fn duration_names_drop_trailing_zeros() {
        assert_eq!(duration_prefixed_name("a.wav", &clip(vec![0; 44_100])), "1.0s - a.wav");
        assert_eq!(duration_prefixed_name("a.wav", &clip(vec![0; 11_025])), "0.25s - a.wav");
        assert_eq!(duration_prefixed_name("a.wav", &clip(vec![0; 13_230])), "0.3s - a.wav");
    }

    #[test]
    fn renames_with_duration_prefix() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("beep.wav"), &[0; 22_050]);
        fs::write(dir.path().join("broken.wav"), b"nope").unwrap();

        let renamed = rename_by_duration(dir.path()).unwrap();
        assert_eq!(
            renamed,
            vec![("beep.wav".to_string(), "0.5s - beep.wav".to_string())]
        );
        assert!(dir.path().join("0.5s - beep.wav").exists());
        assert!(dir.path().join("broken.wav").exists());
    }
}
