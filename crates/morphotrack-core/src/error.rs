//! Error types for morphotrack-core
//!
//! Provides a unified error type for all operations in the core crate.
//! Each variant captures enough context for diagnostics without exposing
//! internal implementation details.

use thiserror::Error;

/// Morphotrack core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid volume dimensions (no axes, a zero-length axis, or overflow)
    #[error("invalid volume dimensions: {dims:?}")]
    InvalidDimension { dims: Vec<usize> },

    /// Two volumes that must share a shape do not
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Coordinates outside the volume extent
    #[error("coordinates {coords:?} out of bounds for dimensions {dims:?}")]
    CoordinatesOutOfBounds { coords: Vec<usize>, dims: Vec<usize> },

    /// Calibration has the wrong length or a non-positive entry
    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No half-maximum bin above the histogram mode
    #[error("degenerate histogram: no half-maximum bin above mode bin {mode_bin} of {bins}")]
    DegenerateHistogram { mode_bin: usize, bins: usize },
}

/// Result type alias for morphotrack core operations
pub type Result<T> = std::result::Result<T, Error>;
