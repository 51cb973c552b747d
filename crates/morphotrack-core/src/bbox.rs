//! BoundingBox - axis-aligned voxel bounds
//!
//! The n-dimensional counterpart of a 2-D box: inclusive minimum and
//! maximum coordinates per axis.

/// Inclusive per-axis voxel bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    pub min: Vec<usize>,
    pub max: Vec<usize>,
}

impl BoundingBox {
    /// Degenerate box covering a single voxel
    pub fn from_point(coords: &[usize]) -> Self {
        BoundingBox {
            min: coords.to_vec(),
            max: coords.to_vec(),
        }
    }

    /// Grow the box to include `coords`
    pub fn include(&mut self, coords: &[usize]) {
        for ((lo, hi), &c) in self.min.iter_mut().zip(self.max.iter_mut()).zip(coords) {
            *lo = (*lo).min(c);
            *hi = (*hi).max(c);
        }
    }

    /// Number of voxels covered along `axis`
    pub fn extent(&self, axis: usize) -> usize {
        self.max[axis] - self.min[axis] + 1
    }

    /// Per-axis extents
    pub fn extents(&self) -> Vec<usize> {
        (0..self.min.len()).map(|d| self.extent(d)).collect()
    }

    pub fn contains(&self, coords: &[usize]) -> bool {
        coords.len() == self.min.len()
            && coords
                .iter()
                .zip(self.min.iter().zip(&self.max))
                .all(|(&c, (&lo, &hi))| c >= lo && c <= hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_and_extent() {
        let mut b = BoundingBox::from_point(&[2, 5]);
        b.include(&[4, 3]);
        assert_eq!(b.min, vec![2, 3]);
        assert_eq!(b.max, vec![4, 5]);
        assert_eq!(b.extents(), vec![3, 3]);
        assert!(b.contains(&[3, 4]));
        assert!(!b.contains(&[1, 4]));
    }
}
