//! Regions of a label volume
//!
//! A [`Region`] is the set of voxels carrying one label within one frame,
//! with its derived bounding box and centroid. Regions are rebuilt fresh
//! from each label volume; the regions of one frame live in a `Vec`
//! ordered by label.

use morphotrack_core::{BoundingBox, DrawStats, LabelVolume, Mask, Volume};

/// Voxels of one label within a frame
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub label: u32,
    /// Linear voxel indices, ascending
    pub voxels: Vec<usize>,
    pub bounds: BoundingBox,
    /// Mean voxel coordinates, in voxel units
    pub centroid: Vec<f64>,
}

impl Region {
    pub fn voxel_count(&self) -> usize {
        self.voxels.len()
    }

    /// Voxel count times the physical volume of one voxel
    pub fn physical_size(&self, calibration: &[f64]) -> f64 {
        self.voxels.len() as f64 * calibration.iter().product::<f64>()
    }

    /// Centroid scaled by the per-axis voxel size
    pub fn physical_centroid(&self, calibration: &[f64]) -> Vec<f64> {
        self.centroid
            .iter()
            .zip(calibration)
            .map(|(c, s)| c * s)
            .collect()
    }

    /// Mask of this region with the shape and calibration of `like`
    pub fn to_mask<T>(&self, like: &Volume<T>) -> Mask {
        let mut mask: Mask = Volume::new_like(like, false);
        mask.draw_indices(&self.voxels, true);
        mask
    }

    /// Write `id` into every voxel of this region
    ///
    /// Indices past the end of `labels` are skipped and counted.
    pub fn paint(&self, labels: &mut LabelVolume, id: u32) -> DrawStats {
        labels.draw_indices(&self.voxels, id)
    }
}

struct RegionBuilder {
    voxels: Vec<usize>,
    bounds: BoundingBox,
    sums: Vec<f64>,
}

impl RegionBuilder {
    fn new(index: usize, coords: &[usize]) -> Self {
        RegionBuilder {
            voxels: vec![index],
            bounds: BoundingBox::from_point(coords),
            sums: coords.iter().map(|&c| c as f64).collect(),
        }
    }

    fn add(&mut self, index: usize, coords: &[usize]) {
        self.voxels.push(index);
        self.bounds.include(coords);
        for (s, &c) in self.sums.iter_mut().zip(coords) {
            *s += c as f64;
        }
    }

    fn finish(self, label: u32) -> Region {
        let n = self.voxels.len() as f64;
        Region {
            label,
            centroid: self.sums.iter().map(|s| s / n).collect(),
            voxels: self.voxels,
            bounds: self.bounds,
        }
    }
}

/// Collect every region of a label volume, ordered by label
///
/// Labels that do not occur produce no entry.
pub fn collect_regions(labels: &LabelVolume) -> Vec<Region> {
    let mut builders: Vec<Option<RegionBuilder>> = Vec::new();
    builders.resize_with(labels.max_label() as usize + 1, || None);
    let mut coords = vec![0usize; labels.ndim()];
    for (i, &label) in labels.data().iter().enumerate() {
        if label == 0 {
            continue;
        }
        labels.unravel(i, &mut coords);
        let slot = &mut builders[label as usize];
        if let Some(b) = slot.as_mut() {
            b.add(i, &coords);
        } else {
            *slot = Some(RegionBuilder::new(i, &coords));
        }
    }
    builders
        .into_iter()
        .enumerate()
        .filter_map(|(label, b)| b.map(|b| b.finish(label as u32)))
        .collect()
}

/// The region carrying `label`, or `None` if the label does not occur
pub fn region_of_label(labels: &LabelVolume, label: u32) -> Option<Region> {
    if label == 0 {
        return None;
    }
    let mut builder: Option<RegionBuilder> = None;
    let mut coords = vec![0usize; labels.ndim()];
    for (i, &l) in labels.data().iter().enumerate() {
        if l != label {
            continue;
        }
        labels.unravel(i, &mut coords);
        if let Some(b) = builder.as_mut() {
            b.add(i, &coords);
        } else {
            builder = Some(RegionBuilder::new(i, &coords));
        }
    }
    builder.map(|b| b.finish(label))
}
