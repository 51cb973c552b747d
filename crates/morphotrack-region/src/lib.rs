//! morphotrack-region - Region processing for morphotrack
//!
//! This crate provides the per-frame segmentation stages:
//!
//! - **Connected component analysis** - union-find labeling in any number
//!   of dimensions
//! - **Cleanup** - small-object removal and slice-wise hole filling
//! - **Distance transform** - exact squared Euclidean distance
//! - **Seeds and watershed** - splitting touching objects at distance-map
//!   valleys
//! - **Central region** - picking the object at the volume center
//!
//! # Examples
//!
//! ## Splitting two touching blobs
//!
//! ```
//! use morphotrack_core::{Connectivity, Volume};
//! use morphotrack_region::{
//!     BoundaryCondition, SeedOptions, WatershedOptions, create_watershed_seeds,
//!     distance_transform, label_connected_components, watershed_from_seeds,
//! };
//!
//! // two 5 x 5 squares joined by a one-voxel bridge
//! let mut mask = Volume::new_with_value(&[11, 5], false).unwrap();
//! for i in 0..mask.len() {
//!     let c = mask.coords_of(i);
//!     mask.data_mut()[i] = c[0] != 5 || c[1] == 2;
//! }
//! assert_eq!(label_connected_components(&mask, Connectivity::Face).count, 1);
//!
//! let dist = distance_transform(&mask, BoundaryCondition::Background).unwrap();
//! let seeds = create_watershed_seeds(&dist, &SeedOptions::new(2)).unwrap();
//! assert_eq!(seeds.count, 2);
//!
//! let labels =
//!     watershed_from_seeds(&mask, &dist, &seeds.labels, &WatershedOptions::new()).unwrap();
//! assert_eq!(labels.distinct_labels(), vec![1, 2]);
//! ```

pub mod central;
pub mod cleanup;
pub mod conncomp;
pub mod distance;
pub mod error;
pub mod label;
pub mod seedfill;
pub mod seeds;
pub mod watershed;

// Re-export core types
pub use morphotrack_core;

// Re-export error types
pub use error::{RegionError, RegionResult};

pub use central::{central_label, select_central_region};
pub use cleanup::{SizeFilterResult, remove_small_objects};
pub use conncomp::{
    ComponentLabeling, ConnectedComponent, component_sizes, count_components,
    find_connected_components, label_connected_components, relabel_components,
};
pub use distance::{
    BoundaryCondition, distance_at_least, distance_transform, distance_transform_calibrated,
    max_distance,
};
pub use label::{Region, collect_regions, region_of_label};
pub use seedfill::{fill_holes, fill_holes_in_slices};
pub use seeds::{MIN_SEED_RADIUS, SeedOptions, create_watershed_seeds};
pub use watershed::{WatershedOptions, watershed_from_seeds};
