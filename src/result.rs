//! Conversion result types

use std::path::PathBuf;

use serde::Serialize;

use crate::io::encoder::OutputFormat;
use crate::wavetable::normalization::{NormalizationMode, NormalizedTable};
use crate::wavetable::reduction::ReductionMode;

/// Numbers describing one run of the wavetable pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionMetadata {
    /// Mono samples entering the pipeline
    pub input_samples: usize,

    /// Maximum absolute amplitude of the mono input
    pub peak_excursion: f32,

    /// Samples per wave
    pub wavelength: usize,

    /// Trailing samples dropped by segmentation
    pub truncated_samples: usize,

    /// Waves after segmentation
    pub waves_in: usize,

    /// Waves in the finished table
    pub waves_out: usize,

    /// Source waves per output wave (`None` when no grouping happened)
    pub reduction_factor: Option<usize>,

    /// Source waves discarded by reduction
    pub dropped_waves: usize,

    /// Reduction policy applied
    pub reduction: ReductionMode,

    /// Normalization policy applied
    pub normalization: NormalizationMode,

    /// Whether wave order was reversed
    pub flipped: bool,
}

/// Finished in-memory wavetable
#[derive(Debug, Clone, PartialEq)]
pub struct Wavetable {
    /// Normalized waves and the scales used
    pub table: NormalizedTable,
    /// Pipeline statistics
    pub metadata: ConversionMetadata,
}

/// Outcome of converting one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    /// Source file
    pub input: PathBuf,

    /// Written wavetable
    pub output: PathBuf,

    /// Written thumbnail, if rendered
    pub thumbnail: Option<PathBuf>,

    /// Source sample rate in Hz
    pub sample_rate: u32,

    /// Source channel count
    pub channels: usize,

    /// Largest absolute sample of the decoded channels, before summing
    pub source_peak: f32,

    /// Sample encoding of the written file
    pub output_format: OutputFormat,

    /// Pipeline statistics
    pub metadata: ConversionMetadata,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: f32,
}
