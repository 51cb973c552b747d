//! Mask construction and label/mask conversions

use super::{Mask, Volume};
use crate::error::{Error, Result};
use num_traits::AsPrimitive;

/// Threshold a scalar volume into a mask.
///
/// A voxel is foreground iff its sample is strictly greater than
/// `threshold`. Dimensions and calibration are preserved.
///
/// # Errors
///
/// Returns `Error::InvalidParameter` if `threshold` is NaN.
///
/// # Examples
///
/// ```
/// use morphotrack_core::{Volume, create_mask};
///
/// let vol = Volume::from_data(&[4], vec![1u8, 5, 10, 3]).unwrap();
/// let mask = create_mask(&vol, 3.0).unwrap();
/// assert_eq!(mask.data(), &[false, true, true, false]);
/// ```
pub fn create_mask<T>(volume: &Volume<T>, threshold: f64) -> Result<Mask>
where
    T: AsPrimitive<f64>,
{
    if threshold.is_nan() {
        return Err(Error::InvalidParameter(
            "threshold must not be NaN".to_string(),
        ));
    }
    Ok(volume.map(|v| v.as_() > threshold))
}

/// Largest sample value of a scalar volume as `f64`
pub fn max_value<T>(volume: &Volume<T>) -> f64
where
    T: AsPrimitive<f64>,
{
    volume
        .data()
        .iter()
        .map(|v| v.as_())
        .filter(|v: &f64| !v.is_nan())
        .fold(f64::NEG_INFINITY, f64::max)
}

impl Volume<bool> {
    /// Number of foreground voxels
    pub fn count_foreground(&self) -> usize {
        self.data().iter().filter(|&&v| v).count()
    }

    /// Swap foreground and background
    pub fn invert(&self) -> Mask {
        self.map(|&v| !v)
    }

    /// Voxel-wise AND of two masks of equal shape
    pub fn and(&self, other: &Mask) -> Result<Mask> {
        self.check_same_shape(other)?;
        let mut out = self.clone();
        for (o, &b) in out.data_mut().iter_mut().zip(other.data()) {
            *o = *o && b;
        }
        Ok(out)
    }
}

impl Volume<u32> {
    /// Largest label present (0 for an all-background volume)
    pub fn max_label(&self) -> u32 {
        self.data().iter().copied().max().unwrap_or(0)
    }

    /// Foreground wherever the label is nonzero
    pub fn to_mask(&self) -> Mask {
        self.map(|&l| l != 0)
    }

    /// Foreground wherever the label equals `label`
    pub fn mask_of_label(&self, label: u32) -> Mask {
        self.map(|&l| l == label)
    }

    /// Force every voxel outside `mask` to background.
    ///
    /// Returns the number of labeled voxels that were cleared.
    pub fn apply_mask(&mut self, mask: &Mask) -> Result<usize> {
        self.check_same_shape(mask)?;
        let mut cleared = 0;
        for (l, &m) in self.data_mut().iter_mut().zip(mask.data()) {
            if !m && *l != 0 {
                *l = 0;
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    /// Sorted list of distinct nonzero labels
    pub fn distinct_labels(&self) -> Vec<u32> {
        let mut labels: Vec<u32> = self.data().iter().copied().filter(|&l| l != 0).collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mask_strictly_greater() {
        let vol = Volume::from_data(&[2, 2], vec![0.5f32, 1.0, 1.5, 2.0]).unwrap();
        let mask = create_mask(&vol, 1.0).unwrap();
        assert_eq!(mask.data(), &[false, false, true, true]);
        assert_eq!(mask.dims(), vol.dims());
    }

    #[test]
    fn test_create_mask_keeps_calibration() {
        let vol = Volume::from_data(&[2, 1], vec![3u16, 9])
            .unwrap()
            .with_calibration(&[0.2, 0.4])
            .unwrap();
        let mask = create_mask(&vol, 5.0).unwrap();
        assert_eq!(mask.calibration(), &[0.2, 0.4]);
    }

    #[test]
    fn test_create_mask_nan_threshold() {
        let vol: Volume<u8> = Volume::new(&[2]).unwrap();
        assert!(create_mask(&vol, f64::NAN).is_err());
    }

    #[test]
    fn test_max_value() {
        let vol = Volume::from_data(&[3], vec![2.0f64, f64::NAN, 7.5]).unwrap();
        assert_eq!(max_value(&vol), 7.5);
    }

    #[test]
    fn test_apply_mask() {
        let mut labels = Volume::from_data(&[4], vec![1u32, 1, 2, 0]).unwrap();
        let mask = Volume::from_data(&[4], vec![true, false, true, true]).unwrap();
        let cleared = labels.apply_mask(&mask).unwrap();
        assert_eq!(cleared, 1);
        assert_eq!(labels.data(), &[1, 0, 2, 0]);
    }

    #[test]
    fn test_label_helpers() {
        let labels = Volume::from_data(&[5], vec![3u32, 0, 1, 3, 0]).unwrap();
        assert_eq!(labels.max_label(), 3);
        assert_eq!(labels.distinct_labels(), vec![1, 3]);
        assert_eq!(labels.to_mask().count_foreground(), 3);
        assert_eq!(labels.mask_of_label(3).count_foreground(), 2);
    }
}
