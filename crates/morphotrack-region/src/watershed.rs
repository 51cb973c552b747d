//! Seeded watershed over a distance map
//!
//! Floods outward from seed regions with a priority queue: the unclaimed
//! foreground voxel with the largest distance value is claimed next, which
//! is the same as flooding the inverted distance map from its minima.
//! Each voxel keeps the label of the first front that reaches it. The flood
//! never leaves the mask, and the result is intersected with the mask
//! before it is returned.

use crate::error::RegionResult;
use morphotrack_core::{Connectivity, DistanceMap, LabelVolume, Mask, Neighbors, Volume};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Options for watershed flooding
#[derive(Debug, Clone, Default)]
pub struct WatershedOptions {
    /// Connectivity type for finding neighbors
    pub connectivity: Connectivity,
}

impl WatershedOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connectivity type
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }
}

/// Queue entry; the max-heap pops the largest distance first, then the
/// lowest seed label, then the earliest insertion.
#[derive(Debug, Clone, Copy)]
struct FloodEntry {
    distance: f64,
    label: u32,
    order: u64,
    index: usize,
}

impl Ord for FloodEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| other.label.cmp(&self.label))
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for FloodEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FloodEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloodEntry {}

/// Flood `seeds` over `distance`, constrained to `mask`
///
/// # Arguments
///
/// * `mask` - Foreground to split
/// * `distance` - Squared distance map of `mask`
/// * `seeds` - Seed labels; 0 is not a seed, seed voxels outside the mask
///   are ignored
/// * `options` - Flood connectivity
///
/// # Returns
///
/// A label volume carrying the seed labels. Foreground not connected to
/// any seed stays 0.
///
/// # Errors
///
/// Returns an error if the three volumes differ in shape.
pub fn watershed_from_seeds(
    mask: &Mask,
    distance: &DistanceMap,
    seeds: &LabelVolume,
    options: &WatershedOptions,
) -> RegionResult<LabelVolume> {
    mask.check_same_shape(distance)?;
    mask.check_same_shape(seeds)?;

    let neighbors = Neighbors::new(mask, options.connectivity);
    let inside = mask.data();
    let dist = distance.data();
    let mut labels: LabelVolume = Volume::new_like(mask, 0);
    let mut heap = BinaryHeap::new();
    let mut order = 0u64;

    for (i, &seed) in seeds.data().iter().enumerate() {
        if seed != 0 && inside[i] {
            labels.data_mut()[i] = seed;
            heap.push(FloodEntry {
                distance: dist[i],
                label: seed,
                order,
                index: i,
            });
            order += 1;
        }
    }

    let mut coords = vec![0usize; mask.ndim()];
    while let Some(entry) = heap.pop() {
        mask.unravel(entry.index, &mut coords);
        neighbors.for_each(&coords, entry.index, |n| {
            if inside[n] && labels.data()[n] == 0 {
                labels.data_mut()[n] = entry.label;
                heap.push(FloodEntry {
                    distance: dist[n],
                    label: entry.label,
                    order,
                    index: n,
                });
                order += 1;
            }
        });
    }

    labels.apply_mask(mask)?;
    Ok(labels)
}
