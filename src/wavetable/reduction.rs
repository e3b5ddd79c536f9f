//! Wave-count reduction
//!
//! Maps an oversized wave sequence down to at most [`MAX_WAVES`] waves.
//!
//! Algorithm (stride and average):
//! 1. `factor = floor(wave_count / 64)`
//! 2. Drop trailing waves beyond `factor * 64`
//! 3. Group consecutive waves in groups of `factor`
//! 4. Keep the first wave of each group (stride) or the elementwise sum of
//!    the group (average)
//!
//! Tables with fewer than 64 waves pass through unchanged.
//!
//! # Example
//!
//! ```
//! use stratum_wavetable::wavetable::WaveMatrix;
//! use stratum_wavetable::wavetable::reduction::ReductionMode;
//!
//! let matrix = WaveMatrix::from_samples(vec![0.5f32; 256 * 8], 8)?;
//! let reduction = ReductionMode::Stride.reduce(matrix);
//! assert_eq!(reduction.matrix.wave_count(), 64);
//! assert_eq!(reduction.factor, Some(4));
//! # Ok::<(), stratum_wavetable::ConversionError>(())
//! ```

use serde::{Deserialize, Serialize};

use super::{WaveMatrix, MAX_WAVES};

/// Wave-count reduction policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReductionMode {
    /// Keep the first 64 waves, discard the rest
    Crop,
    /// Keep every `factor`-th wave (nearest-neighbour downsampling)
    #[default]
    Stride,
    /// Sum each group of `factor` consecutive waves
    Average,
}

impl ReductionMode {
    /// Pick the mode from mutually exclusive flags; crop wins over average
    pub fn from_flags(crop: bool, average: bool) -> Self {
        if crop {
            ReductionMode::Crop
        } else if average {
            ReductionMode::Average
        } else {
            ReductionMode::Stride
        }
    }

    /// Short lowercase name, as used on the command line and in reports
    pub fn name(&self) -> &'static str {
        match self {
            ReductionMode::Crop => "crop",
            ReductionMode::Stride => "stride",
            ReductionMode::Average => "average",
        }
    }

    /// Reduce `matrix` to at most [`MAX_WAVES`] waves
    pub fn reduce(&self, matrix: WaveMatrix) -> Reduction {
        match self {
            ReductionMode::Crop => crop(matrix),
            ReductionMode::Stride => grouped(matrix, GroupKind::First),
            ReductionMode::Average => grouped(matrix, GroupKind::Sum),
        }
    }
}

/// Output of a reduction
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    /// Reduced matrix (`wave_count <= 64`)
    pub matrix: WaveMatrix,
    /// Source waves collapsed per output wave; `None` when no grouping happened
    pub factor: Option<usize>,
    /// Trailing source waves discarded
    pub dropped_waves: usize,
}

/// Reduction factor for a table of `wave_count` waves
///
/// Returns `None` when the table already fits the device.
pub fn reduction_factor(wave_count: usize) -> Option<usize> {
    if wave_count >= MAX_WAVES {
        Some(wave_count / MAX_WAVES)
    } else {
        None
    }
}

fn crop(matrix: WaveMatrix) -> Reduction {
    let wave_count = matrix.wave_count();
    if wave_count <= MAX_WAVES {
        log::debug!("Crop: {} waves fit, nothing to crop", wave_count);
        return Reduction {
            matrix,
            factor: None,
            dropped_waves: 0,
        };
    }

    let dropped_waves = wave_count - MAX_WAVES;
    log::warn!(
        "Crop: keeping first {} of {} waves, dropping {}",
        MAX_WAVES,
        wave_count,
        dropped_waves
    );

    let wavelength = matrix.wavelength();
    let mut data = matrix.into_samples();
    data.truncate(MAX_WAVES * wavelength);

    Reduction {
        matrix: rebuild(data, wavelength),
        factor: None,
        dropped_waves,
    }
}

#[derive(Debug, Clone, Copy)]
enum GroupKind {
    First,
    Sum,
}

fn grouped(matrix: WaveMatrix, kind: GroupKind) -> Reduction {
    let wave_count = matrix.wave_count();
    let Some(factor) = reduction_factor(wave_count) else {
        log::debug!(
            "{} waves is below the {}-wave limit, no reduction",
            wave_count,
            MAX_WAVES
        );
        return Reduction {
            matrix,
            factor: None,
            dropped_waves: 0,
        };
    };

    let kept = factor * MAX_WAVES;
    let dropped_waves = wave_count - kept;
    if dropped_waves > 0 {
        log::warn!(
            "{} waves is not a multiple of {}: dropping {} trailing waves",
            wave_count,
            MAX_WAVES,
            dropped_waves
        );
    }

    let wavelength = matrix.wavelength();
    let mut data = Vec::with_capacity(MAX_WAVES * wavelength);

    for group in matrix.samples()[..kept * wavelength].chunks_exact(factor * wavelength) {
        match kind {
            GroupKind::First => data.extend_from_slice(&group[..wavelength]),
            GroupKind::Sum => {
                let mut acc = vec![0.0f32; wavelength];
                for wave in group.chunks_exact(wavelength) {
                    for (a, &x) in acc.iter_mut().zip(wave) {
                        *a += x;
                    }
                }
                data.extend_from_slice(&acc);
            }
        }
    }

    log::debug!(
        "Reduced {} waves by factor {} ({:?}) to {} waves",
        wave_count,
        factor,
        kind,
        MAX_WAVES
    );

    Reduction {
        matrix: rebuild(data, wavelength),
        factor: Some(factor),
        dropped_waves,
    }
}

fn rebuild(data: Vec<f32>, wavelength: usize) -> WaveMatrix {
    // Shape is preserved by construction: whole waves of an already valid matrix
    WaveMatrix { data, wavelength }
}
