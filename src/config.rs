//! Configuration parameters for wavetable conversion

use serde::{Deserialize, Serialize};

use crate::error::ConversionError;
use crate::io::encoder::OutputFormat;
use crate::wavetable::normalization::NormalizationMode;
use crate::wavetable::reduction::ReductionMode;

/// Default number of samples per wave
pub const DEFAULT_WAVELENGTH: usize = 2048;

/// Sample rate written to the output file header.
///
/// Wavetable playback rate is set by the target device, so this is a label only.
pub const DEFAULT_OUTPUT_SAMPLE_RATE: u32 = 44100;

/// Conversion configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Samples per wave (default: 2048)
    pub wavelength: usize,

    /// Wave-count reduction policy (default: Stride)
    pub reduction: ReductionMode,

    /// Amplitude normalization policy (default: Local)
    pub normalization: NormalizationMode,

    /// Reverse wave order before normalization (default: false)
    pub flip: bool,

    /// Sample encoding of the output file (default: Float32)
    pub output_format: OutputFormat,

    /// Sample rate label of the output file (default: 44100)
    pub output_sample_rate: u32,

    /// Render a PNG thumbnail next to the output (default: true)
    pub thumbnail: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            wavelength: DEFAULT_WAVELENGTH,
            reduction: ReductionMode::default(),
            normalization: NormalizationMode::default(),
            flip: false,
            output_format: OutputFormat::default(),
            output_sample_rate: DEFAULT_OUTPUT_SAMPLE_RATE,
            thumbnail: true,
        }
    }
}

impl ConversionConfig {
    /// Check parameters that would make the pipeline meaningless
    pub fn validate(&self) -> Result<(), ConversionError> {
        if self.wavelength == 0 {
            return Err(ConversionError::InvalidConfig(
                "Wavelength must be > 0".to_string(),
            ));
        }
        if self.output_sample_rate == 0 {
            return Err(ConversionError::InvalidConfig(
                "Output sample rate must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
