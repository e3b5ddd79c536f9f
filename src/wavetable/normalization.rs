//! Wavetable amplitude normalization
//!
//! Supports two normalization policies:
//! - Local: every wave is scaled to a peak of 1.0 independently
//! - Global: the whole table is scaled by its loudest sample, preserving
//!   relative amplitudes between waves
//!
//! A zero scale is rejected instead of producing NaN or infinite samples.
//!
//! # Example
//!
//! ```
//! use stratum_wavetable::wavetable::WaveMatrix;
//! use stratum_wavetable::wavetable::normalization::NormalizationMode;
//!
//! let matrix = WaveMatrix::from_rows(&[vec![0.5, -0.25], vec![0.1, 0.2]])?;
//! let table = NormalizationMode::Local.normalize(matrix)?;
//! assert_eq!(table.matrix.wave_peaks(), vec![1.0, 1.0]);
//! # Ok::<(), stratum_wavetable::ConversionError>(())
//! ```

use serde::{Deserialize, Serialize};

use super::{peak_abs, WaveMatrix};
use crate::error::ConversionError;

/// Normalization policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMode {
    /// Per-wave peak normalization
    #[default]
    Local,
    /// Whole-table peak normalization
    Global,
}

impl NormalizationMode {
    /// Short lowercase name, as used in reports
    pub fn name(&self) -> &'static str {
        match self {
            NormalizationMode::Local => "local",
            NormalizationMode::Global => "global",
        }
    }

    /// Normalize `matrix` into the [-1.0, 1.0] range
    ///
    /// # Errors
    ///
    /// * `ConversionError::SilentInput` if a wave (local) or the whole table
    ///   (global) has a peak of zero
    /// * `ConversionError::NumericalError` if the input holds NaN or infinite
    ///   samples
    pub fn normalize(&self, matrix: WaveMatrix) -> Result<NormalizedTable, ConversionError> {
        match self {
            NormalizationMode::Local => normalize_local(matrix),
            NormalizationMode::Global => normalize_global(matrix),
        }
    }
}

/// Scale(s) a table was divided by
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationScale {
    /// One scale for every wave
    Global(f32),
    /// One scale per wave, in wave order
    Local(Vec<f32>),
}

/// Normalized wavetable
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    /// Normalized waves, for rendering
    pub matrix: WaveMatrix,
    /// Scale(s) the original amplitudes were divided by
    pub scale: NormalizationScale,
}

impl NormalizedTable {
    /// Flattened row-major samples, for file output
    pub fn samples(&self) -> &[f32] {
        self.matrix.samples()
    }
}

fn check_scale(scale: f32, what: impl FnOnce() -> String) -> Result<(), ConversionError> {
    if !scale.is_finite() {
        return Err(ConversionError::NumericalError(format!(
            "{} contains non-finite samples",
            what()
        )));
    }
    if scale <= 0.0 {
        return Err(ConversionError::SilentInput(format!(
            "{} is silent, cannot normalize",
            what()
        )));
    }
    Ok(())
}

fn normalize_local(mut matrix: WaveMatrix) -> Result<NormalizedTable, ConversionError> {
    let scales = matrix.wave_peaks();
    for (index, &scale) in scales.iter().enumerate() {
        check_scale(scale, || format!("wave {}", index))?;
    }

    for (wave, &scale) in matrix.waves_mut().zip(&scales) {
        for sample in wave.iter_mut() {
            *sample /= scale;
        }
    }

    log::debug!(
        "Local normalization of {} waves: scales {:.4}..{:.4}",
        scales.len(),
        scales.iter().copied().fold(f32::INFINITY, f32::min),
        scales.iter().copied().fold(0.0f32, f32::max)
    );

    Ok(NormalizedTable {
        matrix,
        scale: NormalizationScale::Local(scales),
    })
}

fn normalize_global(mut matrix: WaveMatrix) -> Result<NormalizedTable, ConversionError> {
    let scale = peak_abs(matrix.samples());
    check_scale(scale, || "wavetable".to_string())?;

    for wave in matrix.waves_mut() {
        for sample in wave.iter_mut() {
            *sample /= scale;
        }
    }

    log::debug!(
        "Global normalization of {} waves: scale {:.4}",
        matrix.wave_count(),
        scale
    );

    Ok(NormalizedTable {
        matrix,
        scale: NormalizationScale::Global(scale),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-6;

    /// Sine waves with amplitude `amps[i]` for wave `i`
    fn sine_matrix(amps: &[f32], wavelength: usize) -> WaveMatrix {
        let rows: Vec<Vec<f32>> = amps
            .iter()
            .map(|&a| {
                (0..wavelength)
                    .map(|n| {
                        a * (2.0 * std::f32::consts::PI * n as f32 / wavelength as f32).sin()
                    })
                    .collect()
            })
            .collect();
        WaveMatrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_local_peaks_are_one() {
        let table = NormalizationMode::Local
            .normalize(sine_matrix(&[0.1, 0.5, 2.0, 4.0], 64))
            .unwrap();
        for (i, peak) in table.matrix.wave_peaks().into_iter().enumerate() {
            assert!(
                (peak - 1.0).abs() < TOLERANCE,
                "wave {} peak should be 1.0, got {}",
                i,
                peak
            );
        }
        match table.scale {
            NormalizationScale::Local(scales) => assert_eq!(scales.len(), 4),
            other => panic!("expected local scales, got {:?}", other),
        }
    }

    #[test]
    fn test_global_preserves_ratios() {
        let source = sine_matrix(&[0.2, 0.8, 0.4], 64);
        let before = source.wave_peaks();
        let table = NormalizationMode::Global.normalize(source).unwrap();
        let after = table.matrix.wave_peaks();

        assert!((peak_abs(table.samples()) - 1.0).abs() < TOLERANCE);
        for i in 0..3 {
            for j in 0..3 {
                let ratio_before = before[i] / before[j];
                let ratio_after = after[i] / after[j];
                assert!(
                    (ratio_before - ratio_after).abs() < 1e-5,
                    "ratio of waves {} and {} changed: {} -> {}",
                    i,
                    j,
                    ratio_before,
                    ratio_after
                );
            }
        }
        assert!(matches!(table.scale, NormalizationScale::Global(s) if (s - 0.8).abs() < 1e-3));
    }

    #[test]
    fn test_local_silent_wave_errors() {
        let matrix = WaveMatrix::from_rows(&[vec![0.5, -0.5], vec![0.0, 0.0]]).unwrap();
        let err = NormalizationMode::Local.normalize(matrix).unwrap_err();
        match err {
            ConversionError::SilentInput(msg) => assert!(msg.contains("wave 1"), "{}", msg),
            other => panic!("expected SilentInput, got {:?}", other),
        }
    }

    #[test]
    fn test_global_tolerates_single_silent_wave() {
        let matrix = WaveMatrix::from_rows(&[vec![0.5, -0.25], vec![0.0, 0.0]]).unwrap();
        let table = NormalizationMode::Global.normalize(matrix).unwrap();
        assert_eq!(table.samples(), &[1.0, -0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_global_silent_table_errors() {
        let matrix = WaveMatrix::from_samples(vec![0.0; 16], 4).unwrap();
        assert!(matches!(
            NormalizationMode::Global.normalize(matrix),
            Err(ConversionError::SilentInput(_))
        ));
    }

    #[test]
    fn test_non_finite_input_errors() {
        let matrix = WaveMatrix::from_rows(&[vec![f32::NAN, 0.5]]).unwrap();
        assert!(matches!(
            NormalizationMode::Local.normalize(matrix.clone()),
            Err(ConversionError::NumericalError(_))
        ));
        assert!(matches!(
            NormalizationMode::Global.normalize(matrix),
            Err(ConversionError::NumericalError(_))
        ));
    }

    #[test]
    fn test_output_is_finite() {
        let table = NormalizationMode::Local
            .normalize(sine_matrix(&[1e-6, 3.0], 32))
            .unwrap();
        assert!(table.samples().iter().all(|x| x.is_finite()));
    }
}
