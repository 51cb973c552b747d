//! Morphotrack - Volumetric segmentation and object tracking for Rust
//!
//! Turns a sequence of intensity volumes into labeled objects with ids
//! that persist from frame to frame.
//!
//! # Overview
//!
//! - Thresholding, including automatic background-peak analysis
//! - Small-object removal and slice-wise hole filling
//! - Exact squared Euclidean distance transform
//! - Seeded watershed splitting of touching objects
//! - Central region selection
//! - Identity tracking by maximal voxel overlap
//!
//! # Example
//!
//! ```
//! use morphotrack::{Volume, create_mask};
//!
//! // Threshold a 3-D volume
//! let vol = Volume::from_data(&[2, 2, 2], vec![0u16, 9, 3, 12, 0, 0, 7, 1]).unwrap();
//! let mask = create_mask(&vol, 5.0).unwrap();
//! assert_eq!(mask.count_foreground(), 3);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use morphotrack_core::*;

// Re-export processing crates as modules to avoid name conflicts
pub use morphotrack_region as region;
pub use morphotrack_track as track;
