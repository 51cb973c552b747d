//! Bounds-checked drawing into volumes
//!
//! Writes that would land outside the volume are skipped and counted
//! instead of failing, so callers can mark interest points near the
//! border without pre-clipping.

use super::Volume;
use super::neighbors::ball_offsets;
use crate::error::{Error, Result};

/// Outcome of a drawing operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawStats {
    /// Voxels written
    pub written: usize,
    /// Positions skipped because they fell outside the volume
    pub skipped: usize,
}

impl DrawStats {
    fn record(&mut self, inside: bool) {
        if inside {
            self.written += 1;
        } else {
            self.skipped += 1;
        }
    }
}

impl<T: Clone> Volume<T> {
    /// Write `value` at each signed position, skipping positions outside
    /// the volume.
    pub fn draw_points(&mut self, points: &[Vec<i64>], value: T) -> DrawStats {
        let mut stats = DrawStats::default();
        for p in points {
            let index = self.index_of_signed(p);
            if let Some(i) = index {
                self.data_mut()[i] = value.clone();
            }
            stats.record(index.is_some());
        }
        stats
    }

    /// Write `value` at each linear index, skipping indices past the end
    pub fn draw_indices(&mut self, indices: &[usize], value: T) -> DrawStats {
        let mut stats = DrawStats::default();
        let len = self.len();
        for &i in indices {
            if i < len {
                self.data_mut()[i] = value.clone();
            }
            stats.record(i < len);
        }
        stats
    }

    /// Draw a voxel-grid ball of `radius` voxels around `center`.
    ///
    /// `center` is rounded to the nearest voxel. Parts of the ball outside
    /// the volume are skipped.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if `center` has the wrong number of
    /// coordinates or a non-finite entry.
    pub fn draw_ball(&mut self, center: &[f64], radius: usize, value: T) -> Result<DrawStats> {
        if center.len() != self.ndim() || center.iter().any(|c| !c.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "ball center {:?} does not address a {}-D volume",
                center,
                self.ndim()
            )));
        }
        let origin: Vec<i64> = center.iter().map(|c| c.round() as i64).collect();
        let points: Vec<Vec<i64>> = ball_offsets(self.ndim(), radius)
            .into_iter()
            .map(|o| {
                o.iter()
                    .zip(&origin)
                    .map(|(&d, &c)| c + d as i64)
                    .collect()
            })
            .collect();
        Ok(self.draw_points(&points, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_ball_inside() {
        let mut vol: Volume<u8> = Volume::new(&[7, 7]).unwrap();
        let stats = vol.draw_ball(&[3.0, 3.0], 1, 200).unwrap();
        assert_eq!(stats, DrawStats { written: 5, skipped: 0 });
        assert_eq!(vol.value(&[3, 2]), Some(200));
        assert_eq!(vol.value(&[2, 2]), Some(0));
    }

    #[test]
    fn test_draw_ball_at_corner_counts_skips() {
        let mut vol: Volume<u8> = Volume::new(&[5, 5]).unwrap();
        let stats = vol.draw_ball(&[0.0, 0.0], 1, 9).unwrap();
        // center, +x, +y inside; -x, -y outside
        assert_eq!(stats, DrawStats { written: 3, skipped: 2 });
    }

    #[test]
    fn test_draw_ball_bad_center() {
        let mut vol: Volume<u8> = Volume::new(&[5, 5]).unwrap();
        assert!(vol.draw_ball(&[1.0], 1, 1).is_err());
        assert!(vol.draw_ball(&[f64::NAN, 1.0], 1, 1).is_err());
    }

    #[test]
    fn test_draw_indices() {
        let mut vol: Volume<u32> = Volume::new(&[2, 2]).unwrap();
        let stats = vol.draw_indices(&[0, 3, 4], 7);
        assert_eq!(stats, DrawStats { written: 2, skipped: 1 });
        assert_eq!(vol.data(), &[7, 0, 0, 7]);
    }
}
