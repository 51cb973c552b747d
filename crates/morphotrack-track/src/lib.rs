//! morphotrack-track - Segmentation and identity tracking over time
//!
//! This crate ties the per-frame stages of `morphotrack-region` into a
//! time-series pipeline:
//!
//! - **Configuration** - [`SegmentationConfig`] in physical units
//! - **Segmenter** - threshold, cleanup, watershed splitting and central
//!   region selection for one frame
//! - **Overlap tracker** - persistent ids by maximal voxel overlap with the
//!   previous frame
//! - **Pipeline** - sequential frame loop with cooperative cancellation
//!
//! # Examples
//!
//! ```
//! use morphotrack_core::{NullSink, Volume};
//! use morphotrack_track::{CancellationToken, Pipeline, SegmentationConfig, ThresholdMode};
//!
//! // a bright square drifting one voxel per frame
//! let frames: Vec<Volume<u8>> = (0..3)
//!     .map(|t| {
//!         let mut vol = Volume::new_with_value(&[12, 12], 0u8).unwrap();
//!         for i in 0..vol.len() {
//!             let c = vol.coords_of(i);
//!             if (2 + t..6 + t).contains(&c[0]) && (2..6).contains(&c[1]) {
//!                 vol.data_mut()[i] = 200;
//!             }
//!         }
//!         vol
//!     })
//!     .collect();
//!
//! let config = SegmentationConfig::new().with_threshold(ThresholdMode::Fixed(100.0));
//! let mut pipeline = Pipeline::new(config).unwrap();
//! let series = pipeline.run(&frames, &CancellationToken::new(), &NullSink).unwrap();
//! assert!(series.frames.iter().all(|f| f.tracked.ids() == vec![1]));
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod segment;
pub mod tracker;

pub use morphotrack_region;

pub use cancel::CancellationToken;
pub use config::{SegmentationConfig, ThresholdMode, WatershedConfig};
pub use error::{TrackError, TrackResult};
pub use pipeline::{FrameResult, Pipeline, SeriesResult, track_mask_series};
pub use segment::{FrameSegmentation, Segmenter};
pub use tracker::{IdAssignment, IdOrigin, OverlapTracker, TrackedFrame};
