//! Squared Euclidean distance transform
//!
//! Exact separable transform after Felzenszwalb and Huttenlocher: the
//! lower envelope of parabolas is computed along each axis in turn, so the
//! result is the exact squared distance from every foreground voxel to the
//! nearest background voxel. Background voxels map to 0.
//!
//! Values are `f64` throughout, which represents squared extents far
//! beyond any realistic volume size without overflow.

use crate::error::RegionResult;
use morphotrack_core::{DistanceMap, Mask, Volume};
use rayon::prelude::*;

/// How voxels outside the volume are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryCondition {
    /// Outside counts as background; a voxel on the border is at squared
    /// distance `w²` from the nearest background along that axis.
    #[default]
    Background,
    /// Outside is ignored. A mask with no background at all gets the
    /// finite cap `Σ (dims[d] · w_d)²` everywhere.
    Foreground,
}

/// Squared distance in voxel units
///
/// # Examples
///
/// ```
/// use morphotrack_core::Volume;
/// use morphotrack_region::{BoundaryCondition, distance_transform};
///
/// let row = Volume::from_data(&[5], vec![true; 5]).unwrap();
/// let dist = distance_transform(&row, BoundaryCondition::Background).unwrap();
/// assert_eq!(dist.data(), &[1.0, 4.0, 9.0, 4.0, 1.0]);
/// ```
pub fn distance_transform(mask: &Mask, boundary: BoundaryCondition) -> RegionResult<DistanceMap> {
    let weights = vec![1.0; mask.ndim()];
    Ok(transform(mask, &weights, boundary))
}

/// Squared distance in physical units, weighting each axis by the mask's
/// calibration
pub fn distance_transform_calibrated(
    mask: &Mask,
    boundary: BoundaryCondition,
) -> RegionResult<DistanceMap> {
    let weights = mask.calibration().to_vec();
    Ok(transform(mask, &weights, boundary))
}

fn transform(mask: &Mask, weights: &[f64], boundary: BoundaryCondition) -> DistanceMap {
    let mut dist: DistanceMap = mask.map(|&m| if m { f64::INFINITY } else { 0.0 });

    for (axis, &w) in weights.iter().enumerate() {
        let n = dist.dims()[axis];
        let stride = dist.strides()[axis];
        let w2 = w * w;
        let origins = dist.origins_excluding(&[axis]);
        let lines: Vec<Vec<f64>> = origins
            .par_iter()
            .map(|&start| {
                let line = dist.line(start, axis);
                let mut out = vec![0.0; n];
                transform_line(&line, w2, boundary, &mut out);
                out
            })
            .collect();
        let data = dist.data_mut();
        for (&start, line) in origins.iter().zip(lines) {
            for (k, v) in line.into_iter().enumerate() {
                data[start + k * stride] = v;
            }
        }
    }

    if boundary == BoundaryCondition::Foreground {
        let cap: f64 = dist
            .dims()
            .iter()
            .zip(weights)
            .map(|(&d, &w)| (d as f64 * w).powi(2))
            .sum();
        for v in dist.data_mut() {
            if v.is_infinite() {
                *v = cap;
            }
        }
    }

    dist
}

/// One-dimensional pass: `out[p] = min_q (w2 · (p - q)² + f[q])`
fn transform_line(f: &[f64], w2: f64, boundary: BoundaryCondition, out: &mut [f64]) {
    let n = f.len();
    let mut sites: Vec<(f64, f64)> = Vec::with_capacity(n + 2);
    if boundary == BoundaryCondition::Background {
        sites.push((-1.0, 0.0));
    }
    sites.extend(
        f.iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(q, &v)| (q as f64, v)),
    );
    if boundary == BoundaryCondition::Background {
        sites.push((n as f64, 0.0));
    }
    lower_envelope(&sites, w2, out);
}

/// Evaluate the lower envelope of parabolas rooted at `sites`
/// (`(position, value)`, positions strictly ascending) at 0..out.len().
fn lower_envelope(sites: &[(f64, f64)], w2: f64, out: &mut [f64]) {
    if sites.is_empty() {
        out.fill(f64::INFINITY);
        return;
    }

    let intersect = |a: (f64, f64), b: (f64, f64)| {
        ((b.1 + w2 * b.0 * b.0) - (a.1 + w2 * a.0 * a.0)) / (2.0 * w2 * (b.0 - a.0))
    };

    let m = sites.len();
    let mut v = vec![0usize; m];
    let mut z = vec![0.0f64; m + 1];
    let mut k = 0usize;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..m {
        let mut s = intersect(sites[v[k]], sites[q]);
        while s <= z[k] {
            k -= 1;
            s = intersect(sites[v[k]], sites[q]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (p, o) in out.iter_mut().enumerate() {
        let x = p as f64;
        while z[k + 1] < x {
            k += 1;
        }
        let (pos, val) = sites[v[k]];
        *o = w2 * (x - pos) * (x - pos) + val;
    }
}

/// Largest value of a distance map, 0 for an empty one
pub fn max_distance(dist: &DistanceMap) -> f64 {
    dist.data().iter().copied().fold(0.0, f64::max)
}

/// Foreground voxels whose squared distance is at least `min_squared`
pub fn distance_at_least(dist: &DistanceMap, min_squared: f64) -> Mask {
    let mut mask: Mask = Volume::new_like(dist, false);
    for (m, &d) in mask.data_mut().iter_mut().zip(dist.data()) {
        *m = d > 0.0 && d >= min_squared;
    }
    mask
}
