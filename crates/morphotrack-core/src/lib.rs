//! morphotrack-core - n-dimensional volumes for segmentation and tracking
//!
//! This crate provides the data structures and leaf operations the rest of
//! the workspace builds on:
//!
//! - [`Volume`] - n-dimensional sample grid with per-axis calibration, and
//!   its aliases [`Mask`], [`LabelVolume`] and [`DistanceMap`]
//! - [`Connectivity`] / [`Neighbors`] - adjacency and hypersphere
//!   neighborhoods
//! - [`create_mask`] - thresholding a scalar volume
//! - [`IntensityHistogram`] - background peak and half-maximum analysis
//! - [`BoundingBox`] - per-axis voxel bounds
//! - [`DiagnosticSink`] - run-scoped diagnostics
//!
//! # Examples
//!
//! ```
//! use morphotrack_core::{IntensityHistogram, Volume, create_mask};
//!
//! let data: Vec<u16> = (0..64).map(|i| if i % 8 == 3 { 90 } else { 10 }).collect();
//! let vol = Volume::from_data(&[8, 8], data).unwrap();
//!
//! let hist = IntensityHistogram::from_volume(&vol, 100.0, 5.0).unwrap();
//! let threshold = hist.background_peak_threshold(4.0).unwrap();
//! let mask = create_mask(&vol, threshold).unwrap();
//! assert_eq!(mask.count_foreground(), 8);
//! ```

pub mod bbox;
pub mod diagnostics;
pub mod error;
pub mod histogram;
pub mod volume;

pub use bbox::BoundingBox;
pub use diagnostics::{
    CollectingSink, Diagnostic, DiagnosticSink, LOG_TARGET, LogSink, NullSink, Severity, report,
};
pub use error::{Error, Result};
pub use histogram::{
    HistogramPeak, IntensityHistogram, MAX_HISTOGRAM_BINS, histogram_bin_count,
};
pub use volume::draw::DrawStats;
pub use volume::mask::{create_mask, max_value};
pub use volume::neighbors::{Connectivity, Neighbors, ball_offsets, connectivity_offsets};
pub use volume::{
    DistanceMap, LabelVolume, Mask, Volume, advance_coords, validate_calibration,
};
