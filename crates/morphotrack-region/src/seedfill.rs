//! Hole filling
//!
//! A hole is background that cannot be reached from the volume border
//! through background voxels. [`fill_holes`] works on the whole volume at
//! once; [`fill_holes_in_slices`] fills every 2-D plane independently,
//! which closes cavities that are enclosed within a plane even when they
//! open to the outside through another plane.
//!
//! Slice-wise filling does not close a 3-D cavity that is open in some
//! plane along every axis pair.

use crate::error::RegionResult;
use morphotrack_core::{Connectivity, Mask, Neighbors, advance_coords};
use rayon::prelude::*;
use std::collections::VecDeque;

/// Fill every background region that does not touch the volume border
///
/// # Arguments
///
/// * `mask` - Input mask
/// * `connectivity` - Adjacency used to flood the background
///
/// # Returns
///
/// A new mask with all enclosed background set to foreground.
pub fn fill_holes(mask: &Mask, connectivity: Connectivity) -> RegionResult<Mask> {
    let neighbors = Neighbors::new(mask, connectivity);
    let dims = mask.dims();
    let data = mask.data();
    let mut reached = vec![false; mask.len()];
    let mut queue = VecDeque::new();

    let mut coords = vec![0usize; mask.ndim()];
    for i in 0..mask.len() {
        if i > 0 {
            advance_coords(&mut coords, dims);
        }
        let on_border = coords.iter().zip(dims).any(|(&c, &d)| c == 0 || c + 1 == d);
        if on_border && !data[i] {
            reached[i] = true;
            queue.push_back(i);
        }
    }

    while let Some(i) = queue.pop_front() {
        mask.unravel(i, &mut coords);
        neighbors.for_each(&coords, i, |n| {
            if !data[n] && !reached[n] {
                reached[n] = true;
                queue.push_back(n);
            }
        });
    }

    let mut out = mask.clone();
    for (o, &r) in out.data_mut().iter_mut().zip(&reached) {
        *o = !r;
    }
    Ok(out)
}

/// Fill holes plane by plane
///
/// For volumes with three or more axes, every 2-D plane spanned by each
/// axis pair `(a, b)` with `a < b` is filled independently with a
/// face-connected background flood from the plane border. Axis pairs are
/// processed in ascending order, each on the result of the previous one.
/// Volumes with at most two axes are filled whole with face connectivity.
pub fn fill_holes_in_slices(mask: &Mask) -> RegionResult<Mask> {
    if mask.ndim() <= 2 {
        return fill_holes(mask, Connectivity::Face);
    }

    let mut current = mask.clone();
    for a in 0..mask.ndim() {
        for b in a + 1..mask.ndim() {
            let origins = current.origins_excluding(&[a, b]);
            let plane = PlaneGeometry {
                dims: [current.dims()[a], current.dims()[b]],
                strides: [current.strides()[a], current.strides()[b]],
            };
            let fills: Vec<Vec<usize>> = origins
                .par_iter()
                .map(|&origin| plane.holes(current.data(), origin))
                .collect();
            let data = current.data_mut();
            for i in fills.into_iter().flatten() {
                data[i] = true;
            }
        }
    }
    Ok(current)
}

/// Shape of one 2-D plane within a larger volume
struct PlaneGeometry {
    dims: [usize; 2],
    strides: [usize; 2],
}

impl PlaneGeometry {
    fn volume_index(&self, origin: usize, u: usize, v: usize) -> usize {
        origin + u * self.strides[0] + v * self.strides[1]
    }

    /// Volume indices of enclosed background in the plane at `origin`
    fn holes(&self, data: &[bool], origin: usize) -> Vec<usize> {
        let [nu, nv] = self.dims;
        let mut reached = vec![false; nu * nv];
        let mut queue = VecDeque::new();

        let seed =
            |u: usize, v: usize, reached: &mut [bool], queue: &mut VecDeque<(usize, usize)>| {
                let p = u + v * nu;
                if !reached[p] && !data[self.volume_index(origin, u, v)] {
                    reached[p] = true;
                    queue.push_back((u, v));
                }
            };
        for u in 0..nu {
            seed(u, 0, &mut reached, &mut queue);
            seed(u, nv - 1, &mut reached, &mut queue);
        }
        for v in 0..nv {
            seed(0, v, &mut reached, &mut queue);
            seed(nu - 1, v, &mut reached, &mut queue);
        }

        while let Some((u, v)) = queue.pop_front() {
            let mut candidates = Vec::with_capacity(4);
            if u > 0 {
                candidates.push((u - 1, v));
            }
            if u + 1 < nu {
                candidates.push((u + 1, v));
            }
            if v > 0 {
                candidates.push((u, v - 1));
            }
            if v + 1 < nv {
                candidates.push((u, v + 1));
            }
            for (cu, cv) in candidates {
                seed(cu, cv, &mut reached, &mut queue);
            }
        }

        let mut holes = Vec::new();
        for v in 0..nv {
            for u in 0..nu {
                let i = self.volume_index(origin, u, v);
                if !data[i] && !reached[u + v * nu] {
                    holes.push(i);
                }
            }
        }
        holes
    }
}
