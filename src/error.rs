//! Error types for the wavetable conversion pipeline

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while converting audio into a wavetable
#[derive(Error, Debug)]
pub enum ConversionError {
    /// Input path does not resolve to a readable file
    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Decoded buffer is shorter than one wavelength
    #[error("Insufficient samples: {samples} samples cannot fill one wave of {wavelength} samples")]
    InsufficientSamples {
        /// Number of samples available
        samples: usize,
        /// Requested wavelength
        wavelength: usize,
    },

    /// A normalization scale of zero (silent wave or silent table)
    #[error("Silent input: {0}")]
    SilentInput(String),

    /// Invalid configuration parameters
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Audio decoding error
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// Audio encoding error
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// Thumbnail rendering error
    #[error("Render error: {0}")]
    RenderError(String),

    /// Numerical error (NaN or infinite values)
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Two inputs in one batch would write the same output file
    #[error("Output collision: {} would overwrite the output of {}", .input.display(), .earlier.display())]
    OutputCollision {
        /// Input that was skipped
        input: PathBuf,
        /// Earlier input that owns the output
        earlier: PathBuf,
    },

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<hound::Error> for ConversionError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => ConversionError::Io(e),
            other => ConversionError::EncodingError(other.to_string()),
        }
    }
}

impl From<symphonia::core::errors::Error> for ConversionError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        ConversionError::DecodingError(err.to_string())
    }
}

impl From<png::EncodingError> for ConversionError {
    fn from(err: png::EncodingError) -> Self {
        ConversionError::RenderError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_samples_message() {
        let err = ConversionError::InsufficientSamples {
            samples: 100,
            wavelength: 2048,
        };
        let msg = err.to_string();
        assert!(msg.contains("100"), "message should name sample count: {}", msg);
        assert!(msg.contains("2048"), "message should name wavelength: {}", msg);
    }

    #[test]
    fn test_input_not_found_names_path() {
        let err = ConversionError::InputNotFound(PathBuf::from("/tmp/missing.wav"));
        assert!(err.to_string().contains("missing.wav"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ConversionError = io.into();
        assert!(matches!(err, ConversionError::Io(_)));
    }
}
