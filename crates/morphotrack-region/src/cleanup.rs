//! Small-object removal
//!
//! Components are measured in physical units: voxel count times the
//! product of the mask's calibration.

use crate::conncomp::{component_sizes, label_connected_components};
use crate::error::{RegionError, RegionResult};
use morphotrack_core::{Connectivity, Mask};

/// Outcome of [`remove_small_objects`]
#[derive(Debug, Clone, PartialEq)]
pub struct SizeFilterResult {
    pub mask: Mask,
    /// Components kept
    pub kept: usize,
    /// Components erased
    pub removed: usize,
}

/// Erase every connected component whose physical size is below `min_size`
///
/// # Arguments
///
/// * `mask` - Input mask; its calibration defines the voxel volume
/// * `min_size` - Minimum physical size to keep; 0 keeps everything
/// * `connectivity` - Adjacency used to form components
///
/// # Errors
///
/// Returns `RegionError::InvalidParameters` if `min_size` is negative or
/// not finite.
pub fn remove_small_objects(
    mask: &Mask,
    min_size: f64,
    connectivity: Connectivity,
) -> RegionResult<SizeFilterResult> {
    if !min_size.is_finite() || min_size < 0.0 {
        return Err(RegionError::InvalidParameters(format!(
            "minimum object size must be non-negative, got {min_size}"
        )));
    }

    let labeling = label_connected_components(mask, connectivity);
    let voxel_size = mask.voxel_size();
    let keep: Vec<bool> = component_sizes(&labeling.labels)
        .iter()
        .enumerate()
        .map(|(label, &n)| label != 0 && n as f64 * voxel_size >= min_size)
        .collect();
    let kept = keep.iter().filter(|&&k| k).count();

    let mut out = mask.clone();
    for (o, &l) in out.data_mut().iter_mut().zip(labeling.labels.data()) {
        *o = keep[l as usize];
    }

    Ok(SizeFilterResult {
        mask: out,
        kept,
        removed: labeling.count as usize - kept,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphotrack_core::Volume;

    fn mask() -> Mask {
        // ##..#
        // ##...
        Volume::from_data(
            &[5, 2],
            vec![true, true, false, false, true, true, true, false, false, false],
        )
        .unwrap()
    }

    #[test]
    fn test_remove_small_objects() {
        let result = remove_small_objects(&mask(), 2.0, Connectivity::Face).unwrap();
        assert_eq!(result.kept, 1);
        assert_eq!(result.removed, 1);
        assert_eq!(result.mask.count_foreground(), 4);
        assert!(!result.mask.data()[4]);
    }

    #[test]
    fn test_calibration_scales_size() {
        let m = mask().with_calibration(&[2.0, 2.0]).unwrap();
        // single voxel now measures 4.0
        let result = remove_small_objects(&m, 4.0, Connectivity::Face).unwrap();
        assert_eq!(result.kept, 2);
        let result = remove_small_objects(&m, 4.5, Connectivity::Face).unwrap();
        assert_eq!(result.kept, 1);
    }

    #[test]
    fn test_zero_min_size_keeps_everything() {
        let result = remove_small_objects(&mask(), 0.0, Connectivity::Face).unwrap();
        assert_eq!(result.mask, mask());
        assert_eq!(result.removed, 0);
    }

    #[test]
    fn test_negative_size_rejected() {
        assert!(remove_small_objects(&mask(), -1.0, Connectivity::Face).is_err());
    }
}
