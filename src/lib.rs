//! # Stratum Wavetable
//!
//! Converts arbitrary audio into fixed-geometry wavetables for hardware
//! synthesizers that store up to 64 single-cycle waves of a fixed length.
//!
//! ## Features
//!
//! - **Decoding**: any format Symphonia reads, any channel count (summed to mono)
//! - **Reduction**: stride, average, or crop down to 64 waves
//! - **Normalization**: per-wave (local) or whole-table (global) peak scaling
//! - **Output**: 32-bit float or 16-bit WAV, plus an optional PNG wireframe
//!
//! ## Quick Start
//!
//! ```no_run
//! use stratum_wavetable::{convert_samples, ConversionConfig};
//!
//! // 256 waves of 2048 samples, e.g. a wavetable exported by a soft synth
//! let samples: Vec<f32> = vec![0.5; 256 * 2048];
//!
//! let wavetable = convert_samples(samples, &ConversionConfig::default())?;
//!
//! println!("{} waves, factor {:?}", wavetable.metadata.waves_out, wavetable.metadata.reduction_factor);
//! # Ok::<(), stratum_wavetable::ConversionError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Decode → Channel Merge → Segment → Reduce → Flip → Normalize → Encode / Thumbnail
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod io;
pub mod preprocessing;
pub mod render;
pub mod result;
pub mod wavetable;

use std::path::Path;
use std::time::Instant;

// Re-export main types
pub use config::ConversionConfig;
pub use error::ConversionError;
pub use io::encoder::OutputFormat;
pub use result::{ConversionMetadata, ConversionResult, Wavetable};
pub use wavetable::normalization::{NormalizationMode, NormalizationScale, NormalizedTable};
pub use wavetable::reduction::ReductionMode;
pub use wavetable::{WaveMatrix, MAX_WAVES};

/// Run the wavetable pipeline on mono samples
///
/// Segments the buffer into waves, reduces the wave count to at most 64,
/// optionally reverses wave order, and normalizes amplitudes.
///
/// # Arguments
///
/// * `samples` - Mono audio samples (any amplitude)
/// * `config` - Conversion configuration
///
/// # Returns
///
/// `Wavetable` holding the normalized waves and pipeline statistics
///
/// # Errors
///
/// * `ConversionError::InvalidConfig` for a zero wavelength
/// * `ConversionError::InsufficientSamples` if `samples` cannot fill one wave
/// * `ConversionError::SilentInput` if a normalization scale is zero
///
/// # Example
///
/// ```
/// use stratum_wavetable::{convert_samples, ConversionConfig};
///
/// let samples: Vec<f32> = (0..32 * 64).map(|i| ((i % 64) as f32 - 31.5) / 32.0).collect();
/// let config = ConversionConfig { wavelength: 64, ..Default::default() };
/// let wavetable = convert_samples(samples, &config)?;
/// assert_eq!(wavetable.metadata.waves_out, 32);
/// # Ok::<(), stratum_wavetable::ConversionError>(())
/// ```
pub fn convert_samples(
    samples: Vec<f32>,
    config: &ConversionConfig,
) -> Result<Wavetable, ConversionError> {
    config.validate()?;

    let input_samples = samples.len();
    let peak_excursion = wavetable::peak_abs(&samples);

    log::debug!(
        "Converting {} samples (peak {:.4}) with {:?}",
        input_samples,
        peak_excursion,
        config
    );

    let segmentation = wavetable::segmenter::segment(samples, config.wavelength)?;
    let waves_in = segmentation.matrix.wave_count();

    let reduction = config.reduction.reduce(segmentation.matrix);
    let flipped = wavetable::order::apply_flip(reduction.matrix, config.flip);
    let table = config.normalization.normalize(flipped)?;

    let metadata = ConversionMetadata {
        input_samples,
        peak_excursion,
        wavelength: config.wavelength,
        truncated_samples: segmentation.truncated_samples,
        waves_in,
        waves_out: table.matrix.wave_count(),
        reduction_factor: reduction.factor,
        dropped_waves: reduction.dropped_waves,
        reduction: config.reduction,
        normalization: config.normalization,
        flipped: config.flip,
    };

    Ok(Wavetable { table, metadata })
}

/// Convert an audio file into a wavetable file next to it
///
/// Writes `<stem>_mw.wav` (see [`io::paths::output_path`]) and, when
/// `config.thumbnail` is set, `<stem>.png`. The thumbnail is rasterized
/// before anything is written, and the wavetable is removed again if the PNG
/// cannot be written, so a failed conversion leaves no output behind.
///
/// # Errors
///
/// * `ConversionError::InputNotFound` if `input` is not an existing file
/// * Any error from decoding, [`convert_samples`], encoding, or rendering
pub fn convert_file(
    input: &Path,
    config: &ConversionConfig,
) -> Result<ConversionResult, ConversionError> {
    let start_time = Instant::now();
    config.validate()?;

    let decoded = io::decoder::decode_audio(input)?;
    let sample_rate = decoded.sample_rate;
    let channels = decoded.channel_count();
    let source_peak = decoded.peak();
    let mono = decoded.into_mono();

    log::info!(
        "{}: {} samples at {} Hz, {} channel(s), peak {:.4}",
        input.display(),
        mono.len(),
        sample_rate,
        channels,
        source_peak
    );

    let wavetable = convert_samples(mono, config)?;

    let canvas = if config.thumbnail {
        Some(render::thumbnail::ThumbnailRenderer::default().rasterize(&wavetable.table.matrix)?)
    } else {
        None
    };

    let output = io::paths::output_path(input);
    io::encoder::encode_wavetable(
        &output,
        wavetable.table.samples(),
        config.output_sample_rate,
        config.output_format,
    )?;

    let thumbnail = match canvas {
        Some(canvas) => {
            let path = io::paths::thumbnail_path(input);
            if let Err(e) = canvas.write_png(&path) {
                if let Err(rm) = std::fs::remove_file(&output) {
                    log::warn!("Could not remove {}: {}", output.display(), rm);
                }
                return Err(e);
            }
            log::debug!("Wrote thumbnail {}", path.display());
            Some(path)
        }
        None => None,
    };

    log::info!(
        "{}: reduced by factor {} to {} waves",
        output.display(),
        wavetable.metadata.reduction_factor.unwrap_or(1),
        wavetable.metadata.waves_out
    );

    Ok(ConversionResult {
        input: input.to_path_buf(),
        output,
        thumbnail,
        sample_rate,
        channels,
        source_peak,
        output_format: config.output_format,
        metadata: wavetable.metadata,
        processing_time_ms: start_time.elapsed().as_secs_f32() * 1000.0,
    })
}
