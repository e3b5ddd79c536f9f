//! Wavetable encoding using hound
//!
//! The target device accepts two cycle formats: 32-bit float and 16-bit
//! linear PCM. Both are written as mono WAV.
//!
//! Files are written to a hidden sibling first and renamed into place once
//! complete, so a failed write never leaves a truncated wavetable behind.

use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use serde::{Deserialize, Serialize};

use crate::error::ConversionError;
use crate::io::paths::partial_path;

/// Sample encoding of the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// IEEE 754 32-bit float samples
    #[default]
    Float32,
    /// 16-bit signed integer samples
    Int16,
}

impl OutputFormat {
    fn wav_spec(&self, sample_rate: u32) -> WavSpec {
        let (bits_per_sample, sample_format) = match self {
            OutputFormat::Float32 => (32, SampleFormat::Float),
            OutputFormat::Int16 => (16, SampleFormat::Int),
        };
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample,
            sample_format,
        }
    }
}

/// Convert a normalized sample to 16-bit PCM
fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

/// Write mono samples to a WAV file
///
/// # Arguments
///
/// * `path` - Destination path
/// * `samples` - Mono samples, expected in [-1.0, 1.0]
/// * `sample_rate` - Sample rate label written to the header
/// * `format` - Sample encoding
///
/// # Errors
///
/// Returns `ConversionError::EncodingError` or `ConversionError::Io` if the
/// file cannot be written. No file is left at `path` on failure.
pub fn encode_wavetable(
    path: &Path,
    samples: &[f32],
    sample_rate: u32,
    format: OutputFormat,
) -> Result<(), ConversionError> {
    log::debug!(
        "Encoding {} samples as {:?} at {} Hz to {}",
        samples.len(),
        format,
        sample_rate,
        path.display()
    );

    let partial = partial_path(path);
    let result = write_wav(&partial, samples, sample_rate, format)
        .and_then(|()| fs::rename(&partial, path).map_err(ConversionError::from));

    if result.is_err() && partial.exists() {
        if let Err(e) = fs::remove_file(&partial) {
            log::warn!("Could not remove {}: {}", partial.display(), e);
        }
    }
    result
}

fn write_wav(
    path: &Path,
    samples: &[f32],
    sample_rate: u32,
    format: OutputFormat,
) -> Result<(), ConversionError> {
    let mut writer = WavWriter::create(path, format.wav_spec(sample_rate))?;
    match format {
        OutputFormat::Float32 => {
            for &sample in samples {
                writer.write_sample(sample)?;
            }
        }
        OutputFormat::Int16 => {
            for &sample in samples {
                writer.write_sample(to_i16(sample))?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}
