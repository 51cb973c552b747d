//! Maximal-overlap identity tracking
//!
//! Each frame is labeled afresh, then every fresh region votes for the
//! previous frame's id it overlaps most. Regions with no overlap found a
//! new id. The vote of one region never looks at the others, so several
//! regions may inherit the same id when an object splits.
//!
//! State lives in [`OverlapTracker`] and is replaced only after a frame has
//! been fully assigned; an error leaves the previous state intact.

use crate::error::{TrackError, TrackResult};
use morphotrack_core::{Connectivity, LOG_TARGET, LabelVolume, Mask};
use morphotrack_region::{ComponentLabeling, label_connected_components, relabel_components};
use std::collections::BTreeMap;

/// How a region obtained its id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdOrigin {
    /// Issued from the id counter
    Founded,
    /// Taken over from the previous frame
    Inherited,
}

/// One row of a frame's mapping table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdAssignment {
    /// Per-frame label, `1..=n` in raster order of first voxel
    pub fresh_label: u32,
    /// Tracked id written to the output volume
    pub id: u32,
    /// Voxels shared with the inherited id; 0 when founded
    pub overlap_voxels: usize,
    pub origin: IdOrigin,
}

/// Tracking result for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedFrame {
    pub frame_index: usize,
    /// Label volume carrying tracked ids
    pub labels: LabelVolume,
    /// Ordered by fresh label
    pub assignments: Vec<IdAssignment>,
}

impl TrackedFrame {
    /// Distinct ids present in this frame, ascending
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.assignments.iter().map(|a| a.id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Tracked id of a fresh label
    pub fn id_of(&self, fresh_label: u32) -> Option<u32> {
        self.assignments
            .iter()
            .find(|a| a.fresh_label == fresh_label)
            .map(|a| a.id)
    }

    pub fn region_count(&self) -> usize {
        self.assignments.len()
    }
}

/// Assigns persistent ids across a sequence of frames
#[derive(Debug, Clone)]
pub struct OverlapTracker {
    connectivity: Connectivity,
    next_id: u32,
    previous: Option<LabelVolume>,
    frames_seen: usize,
}

impl Default for OverlapTracker {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::Face,
            next_id: 1,
            previous: None,
            frames_seen: 0,
        }
    }
}

impl OverlapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connectivity of fresh labeling
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Id the next founded region will receive
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn frames_seen(&self) -> usize {
        self.frames_seen
    }

    /// Tracked labels of the last committed frame
    pub fn previous_labels(&self) -> Option<&LabelVolume> {
        self.previous.as_ref()
    }

    /// Forget all state and start a new series
    pub fn reset(&mut self) {
        self.next_id = 1;
        self.previous = None;
        self.frames_seen = 0;
    }

    /// Track a foreground mask; regions are its connected components
    ///
    /// # Errors
    ///
    /// Returns `TrackError::DimensionMismatch` if `mask` differs in shape
    /// from the previous frame.
    pub fn track_mask(&mut self, mask: &Mask) -> TrackResult<TrackedFrame> {
        self.check_shape(mask.dims())?;
        let fresh = label_connected_components(mask, self.connectivity);
        Ok(self.assign(fresh))
    }

    /// Track a label volume; regions are its connected same-label
    /// components, so touching objects with different labels stay apart
    ///
    /// # Errors
    ///
    /// Returns `TrackError::DimensionMismatch` if `labels` differs in shape
    /// from the previous frame.
    pub fn track_labels(&mut self, labels: &LabelVolume) -> TrackResult<TrackedFrame> {
        self.check_shape(labels.dims())?;
        let fresh = relabel_components(labels, self.connectivity);
        Ok(self.assign(fresh))
    }

    pub(crate) fn check_shape(&self, dims: &[usize]) -> TrackResult<()> {
        match &self.previous {
            Some(prev) if prev.dims() != dims => Err(TrackError::DimensionMismatch {
                frame: self.frames_seen,
                expected: prev.dims().to_vec(),
                actual: dims.to_vec(),
            }),
            _ => Ok(()),
        }
    }

    fn assign(&mut self, fresh: ComponentLabeling) -> TrackedFrame {
        let frame_index = self.frames_seen;
        let mut next_id = self.next_id;
        let assignments: Vec<IdAssignment> = match &self.previous {
            None => (1..=fresh.count)
                .map(|label| IdAssignment {
                    fresh_label: label,
                    id: label,
                    overlap_voxels: 0,
                    origin: IdOrigin::Founded,
                })
                .collect(),
            Some(previous) => {
                let votes = overlap_votes(&fresh, previous);
                votes
                    .into_iter()
                    .enumerate()
                    .map(|(i, counts)| {
                        let fresh_label = i as u32 + 1;
                        match best_overlap(&counts) {
                            Some((id, overlap_voxels)) => IdAssignment {
                                fresh_label,
                                id,
                                overlap_voxels,
                                origin: IdOrigin::Inherited,
                            },
                            None => {
                                let id = next_id;
                                next_id += 1;
                                IdAssignment {
                                    fresh_label,
                                    id,
                                    overlap_voxels: 0,
                                    origin: IdOrigin::Founded,
                                }
                            }
                        }
                    })
                    .collect()
            }
        };
        if self.previous.is_none() {
            next_id = fresh.count + 1;
        }

        let mut table = vec![0u32; fresh.count as usize + 1];
        for a in &assignments {
            table[a.fresh_label as usize] = a.id;
        }
        let labels = fresh.labels.map(|&l| table[l as usize]);

        let founded = assignments
            .iter()
            .filter(|a| a.origin == IdOrigin::Founded)
            .count();
        log::debug!(
            target: LOG_TARGET,
            "frame {frame_index}: {} regions, {founded} new ids, next id {next_id}",
            assignments.len()
        );

        self.previous = Some(labels.clone());
        self.next_id = next_id;
        self.frames_seen += 1;
        TrackedFrame {
            frame_index,
            labels,
            assignments,
        }
    }
}

/// Per fresh region, voxel counts of every previous id underneath it
fn overlap_votes(fresh: &ComponentLabeling, previous: &LabelVolume) -> Vec<BTreeMap<u32, usize>> {
    let mut votes = vec![BTreeMap::new(); fresh.count as usize];
    for (&f, &p) in fresh.labels.data().iter().zip(previous.data()) {
        if f != 0 && p != 0 {
            *votes[f as usize - 1].entry(p).or_insert(0) += 1;
        }
    }
    votes
}

/// Largest count, ties to the lowest id
fn best_overlap(counts: &BTreeMap<u32, usize>) -> Option<(u32, usize)> {
    let mut best: Option<(u32, usize)> = None;
    for (&id, &n) in counts {
        if best.is_none_or(|(_, b)| n > b) {
            best = Some((id, n));
        }
    }
    best
}
