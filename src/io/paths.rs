//! Output path derivation

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ConversionError;

/// Marker appended to the input stem for the wavetable file
pub const OUTPUT_SUFFIX: &str = "_mw";

/// Extension used for the thumbnail image
pub const THUMBNAIL_EXTENSION: &str = "png";

/// Sibling path for the converted wavetable
///
/// `drums/loop.wav` becomes `drums/loop_mw.wav`. WAV is the only container
/// written, so other inputs carry their extension into the stem:
/// `drums/loop.flac` becomes `drums/loop_flac_mw.wav`. Inputs that share a
/// stem therefore never share an output.
pub fn output_path(input: &Path) -> PathBuf {
    match input_extension(input) {
        Some(ext) if is_wav(ext) => {
            input.with_file_name(format!("{}{}.{}", base_name(input), OUTPUT_SUFFIX, ext))
        }
        _ => input.with_file_name(format!("{}{}.wav", base_name(input), OUTPUT_SUFFIX)),
    }
}

/// Sibling path for the thumbnail
///
/// `drums/loop.wav` becomes `drums/loop.png`, `drums/loop.flac` becomes
/// `drums/loop_flac.png`.
pub fn thumbnail_path(input: &Path) -> PathBuf {
    input.with_file_name(format!("{}.{}", base_name(input), THUMBNAIL_EXTENSION))
}

/// Hidden sibling a file is written to before being renamed into place
pub fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.partial", name))
}

/// Every file converting `input` will create
pub fn planned_outputs(input: &Path, thumbnail: bool) -> Vec<PathBuf> {
    let mut paths = vec![output_path(input)];
    if thumbnail {
        paths.push(thumbnail_path(input));
    }
    paths
}

/// Check a batch of inputs for outputs that would overwrite each other
///
/// # Returns
///
/// One entry per input, in order: `Ok(())` if the input may be converted, or
/// `ConversionError::OutputCollision` naming the earlier input that already
/// claims one of its outputs (or is the same path).
pub fn check_collisions(inputs: &[PathBuf], thumbnail: bool) -> Vec<Result<(), ConversionError>> {
    let mut claimed: HashMap<PathBuf, &PathBuf> = HashMap::new();
    inputs
        .iter()
        .map(|input| {
            let paths = planned_outputs(input, thumbnail);
            let earlier = std::iter::once(input)
                .chain(paths.iter())
                .find_map(|p| claimed.get(p).copied());
            if let Some(earlier) = earlier {
                log::warn!(
                    "{} would overwrite output of {}",
                    input.display(),
                    earlier.display()
                );
                return Err(ConversionError::OutputCollision {
                    input: input.clone(),
                    earlier: earlier.clone(),
                });
            }
            claimed.insert(input.clone(), input);
            for path in paths {
                claimed.insert(path, input);
            }
            Ok(())
        })
        .collect()
}

fn input_extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

fn is_wav(ext: &str) -> bool {
    ext.eq_ignore_ascii_case("wav") || ext.eq_ignore_ascii_case("wave")
}

/// File stem, plus the extension for containers other than WAV
fn base_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "wavetable".to_string());
    match input_extension(path) {
        Some(ext) if !is_wav(ext) => format!("{}_{}", stem, ext),
        _ => stem,
    }
}
