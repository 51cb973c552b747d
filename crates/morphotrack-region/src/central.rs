//! Central region selection
//!
//! Picks the region at the geometric center of a label volume, searching
//! outward within a tolerance when the center itself is background. Not
//! finding a region is a normal outcome and is reported as `None`.

use crate::error::{RegionError, RegionResult};
use crate::label::{Region, region_of_label};
use morphotrack_core::{LabelVolume, ball_offsets};

/// Label found at or near the center of `labels`
///
/// The center is `(dim - 1) / 2` on every axis. If it is background and
/// `tolerance` is positive, voxels within `tolerance` voxels of the center
/// are probed in order of increasing distance, ties in raster order, and
/// the first nonzero label wins.
///
/// # Errors
///
/// Returns `RegionError::InvalidParameters` if `tolerance` is negative or
/// not finite.
pub fn central_label(labels: &LabelVolume, tolerance: f64) -> RegionResult<Option<u32>> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(RegionError::InvalidParameters(format!(
            "central region tolerance must be non-negative, got {tolerance}"
        )));
    }

    let mid = labels.center();
    let center: Vec<i64> = mid.iter().map(|&c| c as i64).collect();
    if let Some(i) = labels.index_of_signed(&center) {
        let label = labels.data()[i];
        if label != 0 {
            return Ok(Some(label));
        }
    }
    if tolerance == 0.0 {
        return Ok(None);
    }

    let t2 = tolerance * tolerance;
    let strides = labels.strides();
    // no offset past the farthest corner can land inside the volume
    let reach = labels
        .dims()
        .iter()
        .zip(&mid)
        .map(|(&dim, &c)| {
            let far = c.max(dim - 1 - c) as f64;
            far * far
        })
        .sum::<f64>()
        .sqrt()
        .ceil();
    let radius = tolerance.ceil().min(reach) as usize;
    let mut probes: Vec<(i64, i64, Vec<i64>)> = ball_offsets(labels.ndim(), radius)
        .into_iter()
        .map(|offset| {
            let d2: i64 = offset.iter().map(|&o| (o * o) as i64).sum();
            let linear: i64 = offset
                .iter()
                .zip(strides)
                .map(|(&o, &s)| o as i64 * s as i64)
                .sum();
            let target = offset
                .iter()
                .zip(&center)
                .map(|(&o, &c)| c + o as i64)
                .collect();
            (d2, linear, target)
        })
        .filter(|(d2, _, _)| *d2 as f64 <= t2)
        .collect();
    probes.sort_by_key(|(d2, linear, _)| (*d2, *linear));

    for (_, _, target) in &probes {
        if let Some(i) = labels.index_of_signed(target) {
            let label = labels.data()[i];
            if label != 0 {
                return Ok(Some(label));
            }
        }
    }
    Ok(None)
}

/// Region at or near the center of `labels`
///
/// See [`central_label`] for the search order.
pub fn select_central_region(
    labels: &LabelVolume,
    tolerance: f64,
) -> RegionResult<Option<Region>> {
    Ok(central_label(labels, tolerance)?.and_then(|label| region_of_label(labels, label)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphotrack_core::Volume;

    #[test]
    fn test_label_at_center() {
        let mut labels: LabelVolume = Volume::new(&[5, 5]).unwrap();
        labels.set(&[2, 2], 4).unwrap();
        labels.set(&[0, 0], 1).unwrap();
        let region = select_central_region(&labels, 0.0).unwrap().unwrap();
        assert_eq!(region.label, 4);
        assert_eq!(region.voxel_count(), 1);
    }

    #[test]
    fn test_search_prefers_nearest_then_raster_order() {
        let mut labels: LabelVolume = Volume::new(&[7, 7]).unwrap();
        // both at distance 1 from (3, 3); (3, 2) comes first in raster order
        labels.set(&[4, 3], 2).unwrap();
        labels.set(&[3, 2], 5).unwrap();
        // farther away
        labels.set(&[3, 5], 9).unwrap();
        assert_eq!(central_label(&labels, 2.0).unwrap(), Some(5));
    }

    #[test]
    fn test_nothing_within_tolerance() {
        let mut labels: LabelVolume = Volume::new(&[9, 9]).unwrap();
        labels.set(&[0, 0], 3).unwrap();
        assert_eq!(select_central_region(&labels, 2.5).unwrap(), None);
        assert_eq!(central_label(&labels, 0.0).unwrap(), None);
    }

    #[test]
    fn test_tolerance_beyond_volume() {
        let mut labels: LabelVolume = Volume::new(&[9, 9]).unwrap();
        assert_eq!(central_label(&labels, 3000.0).unwrap(), None);
        assert_eq!(central_label(&labels, 1e300).unwrap(), None);
        labels.set(&[8, 0], 6).unwrap();
        assert_eq!(central_label(&labels, 1e300).unwrap(), Some(6));
        let region = select_central_region(&labels, 3000.0).unwrap().unwrap();
        assert_eq!(region.label, 6);
    }

    #[test]
    fn test_even_dims_center() {
        // center of a 4 x 4 volume is (1, 1)
        let mut labels: LabelVolume = Volume::new(&[4, 4]).unwrap();
        labels.set(&[1, 1], 7).unwrap();
        assert_eq!(central_label(&labels, 0.0).unwrap(), Some(7));
    }

    #[test]
    fn test_negative_tolerance() {
        let labels: LabelVolume = Volume::new(&[3, 3]).unwrap();
        assert!(central_label(&labels, -1.0).is_err());
    }
}
