//! Wave segmentation
//!
//! Cuts a mono sample buffer into consecutive fixed-length waves. Trailing
//! samples that do not fill a whole wave are dropped.

use super::WaveMatrix;
use crate::error::ConversionError;

/// Result of segmenting a buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    /// Waves in original temporal order
    pub matrix: WaveMatrix,
    /// Trailing samples dropped to reach a whole number of waves
    pub truncated_samples: usize,
}

/// Segment mono samples into waves of `wavelength` samples
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `wavelength` - Samples per wave (typically 2048)
///
/// # Returns
///
/// `Segmentation` holding `floor(len / wavelength)` waves and the number of
/// truncated trailing samples
///
/// # Errors
///
/// * `ConversionError::InvalidConfig` if `wavelength` is zero
/// * `ConversionError::InsufficientSamples` if fewer than `wavelength` samples
///   are available
///
/// # Example
///
/// ```
/// use stratum_wavetable::wavetable::segmenter::segment;
///
/// let samples = vec![0.0f32; 2048 * 3 + 100];
/// let seg = segment(samples, 2048)?;
/// assert_eq!(seg.matrix.wave_count(), 3);
/// assert_eq!(seg.truncated_samples, 100);
/// # Ok::<(), stratum_wavetable::ConversionError>(())
/// ```
pub fn segment(mut samples: Vec<f32>, wavelength: usize) -> Result<Segmentation, ConversionError> {
    if wavelength == 0 {
        return Err(ConversionError::InvalidConfig(
            "Wavelength must be > 0".to_string(),
        ));
    }

    if samples.len() < wavelength {
        return Err(ConversionError::InsufficientSamples {
            samples: samples.len(),
            wavelength,
        });
    }

    let wave_count = samples.len() / wavelength;
    let kept = wave_count * wavelength;
    let truncated_samples = samples.len() - kept;

    if truncated_samples > 0 {
        log::warn!(
            "Dropping {} trailing samples that do not fill a {}-sample wave",
            truncated_samples,
            wavelength
        );
    }
    samples.truncate(kept);

    log::debug!(
        "Segmented {} samples into {} waves of {} samples",
        kept,
        wave_count,
        wavelength
    );

    Ok(Segmentation {
        matrix: WaveMatrix::from_samples(samples, wavelength)?,
        truncated_samples,
    })
}
