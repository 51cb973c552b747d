//! Volume - n-dimensional sample grid
//!
//! `Volume<T>` is the container every stage of the pipeline reads and
//! produces: intensity frames, boolean masks, label volumes and distance
//! maps all share this layout.
//!
//! See [`neighbors`] for adjacency enumeration, [`mask`] for thresholding
//! and label/mask conversions, and [`draw`] for bounds-checked writes.
//!
//! # Memory Layout
//!
//! Data is stored with axis 0 varying fastest and no padding. The voxel at
//! `coords` is at index `Σ coords[d] * strides[d]`, with `strides[0] == 1`.
//!
//! # Examples
//!
//! ```
//! use morphotrack_core::Volume;
//!
//! let mut vol: Volume<u16> = Volume::new(&[4, 3, 2]).unwrap();
//! vol.set(&[1, 2, 1], 500).unwrap();
//! assert_eq!(vol.value(&[1, 2, 1]), Some(500));
//! assert_eq!(vol.len(), 24);
//! ```

pub mod draw;
pub mod mask;
pub mod neighbors;

use crate::error::{Error, Result};

/// Boolean foreground/background volume
pub type Mask = Volume<bool>;

/// Label volume: 0 is background, every positive value names one region
pub type LabelVolume = Volume<u32>;

/// Squared distance map produced by the distance transform
pub type DistanceMap = Volume<f64>;

/// n-dimensional grid of samples with a physical voxel size per axis
#[derive(Debug, Clone, PartialEq)]
pub struct Volume<T> {
    dims: Vec<usize>,
    strides: Vec<usize>,
    data: Vec<T>,
    calibration: Vec<f64>,
}

/// Validate dimensions and return the total voxel count
fn voxel_count(dims: &[usize]) -> Result<usize> {
    if dims.is_empty() || dims.contains(&0) {
        return Err(Error::InvalidDimension {
            dims: dims.to_vec(),
        });
    }
    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| Error::InvalidDimension {
            dims: dims.to_vec(),
        })
}

fn strides_for(dims: &[usize]) -> Vec<usize> {
    let mut strides = Vec::with_capacity(dims.len());
    let mut acc = 1usize;
    for &d in dims {
        strides.push(acc);
        acc *= d;
    }
    strides
}

/// Validate a calibration vector against a dimensionality
pub fn validate_calibration(calibration: &[f64], ndim: usize) -> Result<()> {
    if calibration.len() != ndim {
        return Err(Error::InvalidCalibration(format!(
            "expected {} entries, got {}",
            ndim,
            calibration.len()
        )));
    }
    if let Some(bad) = calibration.iter().find(|c| !c.is_finite() || **c <= 0.0) {
        return Err(Error::InvalidCalibration(format!(
            "voxel sizes must be positive and finite, got {bad}"
        )));
    }
    Ok(())
}

/// Advance `coords` to the next position in raster order.
///
/// Returns `false` once every position has been visited (coords wrap to 0).
pub fn advance_coords(coords: &mut [usize], dims: &[usize]) -> bool {
    for (c, &d) in coords.iter_mut().zip(dims) {
        *c += 1;
        if *c < d {
            return true;
        }
        *c = 0;
    }
    false
}

impl<T: Clone> Volume<T> {
    /// Create a new volume with every voxel set to `value`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if `dims` is empty or contains 0.
    pub fn new_with_value(dims: &[usize], value: T) -> Result<Self> {
        let len = voxel_count(dims)?;
        Ok(Volume {
            dims: dims.to_vec(),
            strides: strides_for(dims),
            data: vec![value; len],
            calibration: vec![1.0; dims.len()],
        })
    }

    /// Create a volume of the same shape and calibration filled with `value`
    pub fn new_like<U>(other: &Volume<U>, value: T) -> Self {
        Volume {
            dims: other.dims.clone(),
            strides: other.strides.clone(),
            data: vec![value; other.data.len()],
            calibration: other.calibration.clone(),
        }
    }
}

impl<T: Clone + Default> Volume<T> {
    /// Create a new volume with every voxel set to `T::default()`
    pub fn new(dims: &[usize]) -> Result<Self> {
        Self::new_with_value(dims, T::default())
    }
}

impl<T> Volume<T> {
    /// Create a volume from raw data in raster order
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are invalid or the data length
    /// doesn't match.
    pub fn from_data(dims: &[usize], data: Vec<T>) -> Result<Self> {
        let len = voxel_count(dims)?;
        if data.len() != len {
            return Err(Error::InvalidParameter(format!(
                "data length {} doesn't match {:?} = {}",
                data.len(),
                dims,
                len
            )));
        }
        Ok(Volume {
            dims: dims.to_vec(),
            strides: strides_for(dims),
            data,
            calibration: vec![1.0; dims.len()],
        })
    }

    /// Builder-style calibration setter
    pub fn with_calibration(mut self, calibration: &[f64]) -> Result<Self> {
        self.set_calibration(calibration)?;
        Ok(self)
    }

    /// Set the physical voxel size per axis
    pub fn set_calibration(&mut self, calibration: &[f64]) -> Result<()> {
        validate_calibration(calibration, self.dims.len())?;
        self.calibration = calibration.to_vec();
        Ok(())
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Total number of voxels
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; volumes have at least one voxel
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn calibration(&self) -> &[f64] {
        &self.calibration
    }

    /// Physical size of one voxel (product of the calibration)
    pub fn voxel_size(&self) -> f64 {
        self.calibration.iter().product()
    }

    /// Smallest per-axis voxel size
    pub fn finest_resolution(&self) -> f64 {
        self.calibration
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    /// Whether all axes share the same voxel size (relative tolerance 1e-9)
    pub fn is_isotropic(&self) -> bool {
        let finest = self.finest_resolution();
        self.calibration
            .iter()
            .all(|c| (c - finest).abs() <= 1e-9 * finest)
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Linear index of `coords`, or `None` if outside the volume
    pub fn index_of(&self, coords: &[usize]) -> Option<usize> {
        if coords.len() != self.dims.len() {
            return None;
        }
        let mut index = 0;
        for ((&c, &d), &s) in coords.iter().zip(&self.dims).zip(&self.strides) {
            if c >= d {
                return None;
            }
            index += c * s;
        }
        Some(index)
    }

    /// Linear index of signed `coords`, or `None` if outside the volume
    pub fn index_of_signed(&self, coords: &[i64]) -> Option<usize> {
        if coords.len() != self.dims.len() {
            return None;
        }
        let mut index = 0;
        for ((&c, &d), &s) in coords.iter().zip(&self.dims).zip(&self.strides) {
            if c < 0 || c as u64 >= d as u64 {
                return None;
            }
            index += c as usize * s;
        }
        Some(index)
    }

    /// Write the coordinates of linear `index` into `out`
    pub fn unravel(&self, index: usize, out: &mut [usize]) {
        let mut rem = index;
        for (o, &d) in out.iter_mut().zip(&self.dims) {
            *o = rem % d;
            rem /= d;
        }
    }

    /// Coordinates of linear `index`
    pub fn coords_of(&self, index: usize) -> Vec<usize> {
        let mut out = vec![0; self.dims.len()];
        self.unravel(index, &mut out);
        out
    }

    /// Integer geometric center, `(dim - 1) / 2` on every axis
    pub fn center(&self) -> Vec<usize> {
        self.dims.iter().map(|&d| (d - 1) / 2).collect()
    }

    pub fn get(&self, coords: &[usize]) -> Option<&T> {
        self.index_of(coords).map(|i| &self.data[i])
    }

    /// Set the voxel at `coords`
    ///
    /// # Errors
    ///
    /// Returns `Error::CoordinatesOutOfBounds` if `coords` is outside the volume.
    pub fn set(&mut self, coords: &[usize], value: T) -> Result<()> {
        match self.index_of(coords) {
            Some(i) => {
                self.data[i] = value;
                Ok(())
            }
            None => Err(Error::CoordinatesOutOfBounds {
                coords: coords.to_vec(),
                dims: self.dims.clone(),
            }),
        }
    }

    pub fn same_shape<U>(&self, other: &Volume<U>) -> bool {
        self.dims == other.dims
    }

    /// Fail with `Error::DimensionMismatch` unless `other` has this shape
    pub fn check_same_shape<U>(&self, other: &Volume<U>) -> Result<()> {
        if self.same_shape(other) {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                expected: self.dims.clone(),
                actual: other.dims.clone(),
            })
        }
    }

    /// Apply `f` to every voxel, keeping shape and calibration
    pub fn map<U, F>(&self, f: F) -> Volume<U>
    where
        F: Fn(&T) -> U,
    {
        Volume {
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            data: self.data.iter().map(f).collect(),
            calibration: self.calibration.clone(),
        }
    }

    /// Linear indices of every position whose coordinates are 0 along all
    /// of `axes`.
    ///
    /// For a single axis these are the starts of the 1-D lines along that
    /// axis; for two axes they are the origins of the 2-D planes they span.
    pub fn origins_excluding(&self, axes: &[usize]) -> Vec<usize> {
        let mut reduced = self.dims.clone();
        for &a in axes {
            if a < reduced.len() {
                reduced[a] = 1;
            }
        }
        let count: usize = reduced.iter().product();
        let mut origins = Vec::with_capacity(count);
        let mut coords = vec![0usize; reduced.len()];
        loop {
            origins.push(
                coords
                    .iter()
                    .zip(&self.strides)
                    .map(|(c, s)| c * s)
                    .sum(),
            );
            if !advance_coords(&mut coords, &reduced) {
                break;
            }
        }
        origins
    }
}

impl<T: Copy> Volume<T> {
    /// Value at `coords`, or `None` if outside the volume
    pub fn value(&self, coords: &[usize]) -> Option<T> {
        self.get(coords).copied()
    }

    /// Values along the 1-D line starting at `start` in direction `axis`
    pub fn line(&self, start: usize, axis: usize) -> Vec<T> {
        let stride = self.strides[axis];
        (0..self.dims[axis])
            .map(|k| self.data[start + k * stride])
            .collect()
    }
}
