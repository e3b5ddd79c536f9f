//! Wavetable construction modules
//!
//! This module contains the numeric core of the converter:
//! - Segmentation of a mono buffer into fixed-length waves
//! - Wave-count reduction (stride, average, crop)
//! - Wave order flipping
//! - Amplitude normalization (local, global)

pub mod normalization;
pub mod order;
pub mod reduction;
pub mod segmenter;

use crate::error::ConversionError;

/// Maximum number of waves the target device stores per table
pub const MAX_WAVES: usize = 64;

/// Rectangular table of single-cycle waves
///
/// Rows are waves, columns are samples within a wave. Data is stored row-major
/// in one contiguous buffer, so flattening for file output is free.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveMatrix {
    /// Row-major samples, `wave_count * wavelength` long
    data: Vec<f32>,
    /// Samples per wave
    wavelength: usize,
}

impl WaveMatrix {
    /// Build a matrix from row-major samples
    ///
    /// # Errors
    ///
    /// Returns `ConversionError::InvalidConfig` if `wavelength` is zero or
    /// `data.len()` is not a multiple of `wavelength`.
    pub fn from_samples(data: Vec<f32>, wavelength: usize) -> Result<Self, ConversionError> {
        if wavelength == 0 {
            return Err(ConversionError::InvalidConfig(
                "Wavelength must be > 0".to_string(),
            ));
        }
        if data.len() % wavelength != 0 {
            return Err(ConversionError::InvalidConfig(format!(
                "{} samples is not a whole number of {}-sample waves",
                data.len(),
                wavelength
            )));
        }
        Ok(Self { data, wavelength })
    }

    /// Build a matrix from a list of equally sized waves
    ///
    /// # Errors
    ///
    /// Returns `ConversionError::InvalidConfig` if the list is empty or the
    /// waves differ in length.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, ConversionError> {
        let wavelength = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|row| row.len() != wavelength) {
            return Err(ConversionError::InvalidConfig(
                "All waves must have the same length".to_string(),
            ));
        }
        Self::from_samples(rows.concat(), wavelength)
    }

    /// Number of waves (rows)
    pub fn wave_count(&self) -> usize {
        self.data.len() / self.wavelength
    }

    /// Samples per wave (columns)
    pub fn wavelength(&self) -> usize {
        self.wavelength
    }

    /// True when the matrix holds no waves
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow wave `index`, if present
    pub fn wave(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.wavelength)?;
        self.data.get(start..start + self.wavelength)
    }

    /// Iterate over waves in order
    pub fn waves(&self) -> std::slice::ChunksExact<'_, f32> {
        self.data.chunks_exact(self.wavelength)
    }

    /// Iterate mutably over waves in order
    pub fn waves_mut(&mut self) -> std::slice::ChunksExactMut<'_, f32> {
        self.data.chunks_exact_mut(self.wavelength)
    }

    /// Flattened row-major samples
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// Consume the matrix, returning its flattened row-major samples
    pub fn into_samples(self) -> Vec<f32> {
        self.data
    }

    /// Maximum absolute amplitude over the whole matrix
    pub fn peak(&self) -> f32 {
        peak_abs(&self.data)
    }

    /// Maximum absolute amplitude of each wave
    pub fn wave_peaks(&self) -> Vec<f32> {
        self.waves().map(peak_abs).collect()
    }
}

/// Maximum absolute value of a slice (0.0 for an empty slice)
///
/// NaN samples propagate so that callers can reject them.
pub fn peak_abs(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &x| {
        let a = x.abs();
        if a.is_nan() || acc.is_nan() {
            f32::NAN
        } else {
            acc.max(a)
        }
    })
}
