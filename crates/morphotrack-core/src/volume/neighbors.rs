//! Neighborhood enumeration for n-dimensional volumes
//!
//! A [`Neighbors`] value holds a fixed set of coordinate offsets and maps
//! them onto linear indices of one volume shape, skipping offsets that fall
//! outside the volume.

use super::Volume;

/// Connectivity type for component analysis and flooding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Connectivity {
    /// Face adjacency: 2n neighbors (4-way in 2-D, 6-way in 3-D)
    #[default]
    Face,
    /// Face, edge and corner adjacency: 3^n - 1 neighbors
    Full,
}

/// Offsets within the radius-`radius` hypersphere, center included,
/// in raster order of the offset coordinates.
pub fn ball_offsets(ndim: usize, radius: usize) -> Vec<Vec<isize>> {
    let r = radius as isize;
    let r2 = r * r;
    let side = vec![2 * radius + 1; ndim];
    let mut coords = vec![0usize; ndim];
    let mut offsets = Vec::new();
    loop {
        let offset: Vec<isize> = coords.iter().map(|&c| c as isize - r).collect();
        if offset.iter().map(|o| o * o).sum::<isize>() <= r2 {
            offsets.push(offset);
        }
        if !super::advance_coords(&mut coords, &side) {
            break;
        }
    }
    offsets
}

/// Offsets for a connectivity type, center excluded
pub fn connectivity_offsets(ndim: usize, connectivity: Connectivity) -> Vec<Vec<isize>> {
    match connectivity {
        Connectivity::Face => {
            let mut offsets = Vec::with_capacity(2 * ndim);
            for d in 0..ndim {
                for step in [-1isize, 1] {
                    let mut offset = vec![0isize; ndim];
                    offset[d] = step;
                    offsets.push(offset);
                }
            }
            offsets
        }
        Connectivity::Full => {
            let side = vec![3usize; ndim];
            let mut coords = vec![0usize; ndim];
            let mut offsets = Vec::new();
            loop {
                let offset: Vec<isize> = coords.iter().map(|&c| c as isize - 1).collect();
                if offset.iter().any(|&o| o != 0) {
                    offsets.push(offset);
                }
                if !super::advance_coords(&mut coords, &side) {
                    break;
                }
            }
            offsets
        }
    }
}

/// Offset set bound to one volume shape
#[derive(Debug, Clone)]
pub struct Neighbors {
    dims: Vec<usize>,
    offsets: Vec<Vec<isize>>,
    linear: Vec<isize>,
}

impl Neighbors {
    /// Bind `offsets` to the shape of `volume`
    pub fn from_offsets<T>(volume: &Volume<T>, offsets: Vec<Vec<isize>>) -> Self {
        let strides = volume.strides();
        let linear = offsets
            .iter()
            .map(|o| {
                o.iter()
                    .zip(strides)
                    .map(|(&d, &s)| d * s as isize)
                    .sum()
            })
            .collect();
        Neighbors {
            dims: volume.dims().to_vec(),
            offsets,
            linear,
        }
    }

    /// All neighbors for a connectivity type
    pub fn new<T>(volume: &Volume<T>, connectivity: Connectivity) -> Self {
        Self::from_offsets(volume, connectivity_offsets(volume.ndim(), connectivity))
    }

    /// Only the neighbors already visited by a raster scan
    pub fn backward<T>(volume: &Volume<T>, connectivity: Connectivity) -> Self {
        let all = Self::new(volume, connectivity);
        let (offsets, _): (Vec<_>, Vec<_>) = all
            .offsets
            .into_iter()
            .zip(all.linear)
            .filter(|(_, l)| *l < 0)
            .unzip();
        Self::from_offsets(volume, offsets)
    }

    /// Hypersphere of `radius` voxels, center included
    pub fn ball<T>(volume: &Volume<T>, radius: usize) -> Self {
        Self::from_offsets(volume, ball_offsets(volume.ndim(), radius))
    }

    pub fn offsets(&self) -> &[Vec<isize>] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Call `f` with the linear index of every in-bounds neighbor of the
    /// voxel at `coords` / `index`.
    #[inline]
    pub fn for_each<F>(&self, coords: &[usize], index: usize, mut f: F)
    where
        F: FnMut(usize),
    {
        'offsets: for (offset, &lin) in self.offsets.iter().zip(&self.linear) {
            for ((&c, &o), &d) in coords.iter().zip(offset).zip(&self.dims) {
                let n = c as isize + o;
                if n < 0 || n >= d as isize {
                    continue 'offsets;
                }
            }
            f((index as isize + lin) as usize);
        }
    }
}
