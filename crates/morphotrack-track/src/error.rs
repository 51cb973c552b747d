//! Error types for morphotrack-track
//!
//! Configuration and shape errors abort a run and name the failing frame.
//! Empty frames and missing central regions are not errors.

use morphotrack_region::RegionError;
use thiserror::Error;

/// Errors that abort a segmentation or tracking run
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackError {
    /// Configuration rejected before or while processing a frame
    #[error("invalid configuration{}: {reason}", at_frame(.frame))]
    InvalidConfiguration {
        frame: Option<usize>,
        reason: String,
    },

    /// A frame's shape differs from the series
    #[error("frame {frame}: dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        frame: usize,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Region processing failed on a frame
    #[error("frame {frame}: {source}")]
    Region {
        frame: usize,
        #[source]
        source: RegionError,
    },

    /// Core operation failed on a frame
    #[error("frame {frame}: {source}")]
    Core {
        frame: usize,
        #[source]
        source: morphotrack_core::Error,
    },
}

fn at_frame(frame: &Option<usize>) -> String {
    frame.map(|f| format!(" at frame {f}")).unwrap_or_default()
}

impl TrackError {
    /// Index of the frame the error belongs to, if any
    pub fn frame(&self) -> Option<usize> {
        match self {
            TrackError::InvalidConfiguration { frame, .. } => *frame,
            TrackError::DimensionMismatch { frame, .. }
            | TrackError::Region { frame, .. }
            | TrackError::Core { frame, .. } => Some(*frame),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        TrackError::InvalidConfiguration {
            frame: None,
            reason: reason.into(),
        }
    }

    pub(crate) fn region(frame: usize) -> impl FnOnce(RegionError) -> Self {
        move |source| TrackError::Region { frame, source }
    }

    pub(crate) fn core(frame: usize) -> impl FnOnce(morphotrack_core::Error) -> Self {
        move |source| TrackError::Core { frame, source }
    }
}

/// Result type for tracking operations
pub type TrackResult<T> = Result<T, TrackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_frame() {
        let e = TrackError::InvalidConfiguration {
            frame: Some(4),
            reason: "radius too small".into(),
        };
        assert_eq!(e.to_string(), "invalid configuration at frame 4: radius too small");
        assert_eq!(e.frame(), Some(4));

        let e = TrackError::config("bad threshold");
        assert_eq!(e.to_string(), "invalid configuration: bad threshold");
        assert_eq!(e.frame(), None);

        let e = TrackError::DimensionMismatch {
            frame: 2,
            expected: vec![4, 4],
            actual: vec![4, 5],
        };
        assert!(e.to_string().starts_with("frame 2:"));
    }
}
