//! Connected component analysis
//!
//! Two-pass labeling over a raster scan with a union-find (disjoint set)
//! structure, generalized to any number of dimensions. Final labels are
//! consecutive from 1 and ascend in raster order of each component's first
//! voxel, so the numbering is deterministic.

use crate::error::RegionResult;
use morphotrack_core::{BoundingBox, Connectivity, LabelVolume, Mask, Neighbors, Volume};

/// Result of a labeling pass
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentLabeling {
    /// Label volume, 0 for background
    pub labels: LabelVolume,
    /// Number of components; labels run from 1 to `count`
    pub count: u32,
}

/// A connected component of a mask
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedComponent {
    pub label: u32,
    /// Number of voxels in this component
    pub voxel_count: usize,
    pub bounds: BoundingBox,
}

/// Disjoint set over provisional labels; index 0 is unused
struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    fn new() -> Self {
        UnionFind { parent: vec![0] }
    }

    fn make_set(&mut self) -> u32 {
        let label = self.parent.len() as u32;
        self.parent.push(label);
        label
    }

    fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Merge two sets, keeping the smaller root
    fn union(&mut self, a: u32, b: u32) -> u32 {
        let ra = self.find(a);
        let rb = self.find(b);
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent[hi as usize] = lo;
        lo
    }
}

/// Label voxels where `foreground(i)` holds, joining neighbors for which
/// `joined(i, n)` holds.
fn label_with<T, F, J>(
    volume: &Volume<T>,
    connectivity: Connectivity,
    foreground: F,
    joined: J,
) -> ComponentLabeling
where
    F: Fn(usize) -> bool,
    J: Fn(usize, usize) -> bool,
{
    let backward = Neighbors::backward(volume, connectivity);
    let mut provisional: LabelVolume = Volume::new_like(volume, 0);
    let mut sets = UnionFind::new();
    let mut coords = vec![0usize; volume.ndim()];

    for i in 0..volume.len() {
        if i > 0 {
            morphotrack_core::advance_coords(&mut coords, volume.dims());
        }
        if !foreground(i) {
            continue;
        }
        let mut current = 0u32;
        backward.for_each(&coords, i, |n| {
            let label = provisional.data()[n];
            if label != 0 && joined(i, n) {
                current = if current == 0 {
                    sets.find(label)
                } else {
                    sets.union(current, label)
                };
            }
        });
        if current == 0 {
            current = sets.make_set();
        }
        provisional.data_mut()[i] = current;
    }

    // Roots are the provisional label of each component's first voxel, so
    // numbering by first appearance keeps raster order.
    let mut remap = vec![0u32; sets.parent.len()];
    let mut count = 0u32;
    for label in provisional.data_mut() {
        if *label == 0 {
            continue;
        }
        let root = sets.find(*label) as usize;
        if remap[root] == 0 {
            count += 1;
            remap[root] = count;
        }
        *label = remap[root];
    }

    ComponentLabeling {
        labels: provisional,
        count,
    }
}

/// Label all connected components of a mask
///
/// # Arguments
///
/// * `mask` - Input mask
/// * `connectivity` - Adjacency used to join voxels
///
/// # Returns
///
/// A label volume with the mask's shape and calibration, plus the number
/// of components found. An empty mask yields zero components.
pub fn label_connected_components(mask: &Mask, connectivity: Connectivity) -> ComponentLabeling {
    let data = mask.data();
    label_with(mask, connectivity, |i| data[i], |_, _| true)
}

/// Relabel a label volume so that every connected set of voxels sharing
/// one nonzero label gets its own fresh label.
///
/// Two disjoint pieces carrying the same input label come out with
/// different labels; touching regions with different input labels stay
/// apart.
pub fn relabel_components(labels: &LabelVolume, connectivity: Connectivity) -> ComponentLabeling {
    let data = labels.data();
    label_with(labels, connectivity, |i| data[i] != 0, |i, n| data[i] == data[n])
}

/// Per-label voxel counts, indexed by label (index 0 counts background)
pub fn component_sizes(labels: &LabelVolume) -> Vec<usize> {
    let mut sizes = vec![0usize; labels.max_label() as usize + 1];
    for &l in labels.data() {
        sizes[l as usize] += 1;
    }
    sizes
}

/// Find all connected components of a mask
///
/// Returns one entry per component in label order, each with its voxel
/// count and bounding box.
pub fn find_connected_components(
    mask: &Mask,
    connectivity: Connectivity,
) -> RegionResult<Vec<ConnectedComponent>> {
    let labeling = label_connected_components(mask, connectivity);
    let mut components: Vec<Option<ConnectedComponent>> = vec![None; labeling.count as usize];
    let mut coords = vec![0usize; mask.ndim()];
    for (i, &label) in labeling.labels.data().iter().enumerate() {
        if label == 0 {
            continue;
        }
        labeling.labels.unravel(i, &mut coords);
        let slot = &mut components[label as usize - 1];
        if let Some(c) = slot.as_mut() {
            c.voxel_count += 1;
            c.bounds.include(&coords);
        } else {
            *slot = Some(ConnectedComponent {
                label,
                voxel_count: 1,
                bounds: BoundingBox::from_point(&coords),
            });
        }
    }
    Ok(components.into_iter().flatten().collect())
}

/// Count the connected components of a mask
pub fn count_components(mask: &Mask, connectivity: Connectivity) -> u32 {
    label_connected_components(mask, connectivity).count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(dims: &[usize], bits: &[u8]) -> Mask {
        Volume::from_data(dims, bits.iter().map(|&b| b != 0).collect()).unwrap()
    }

    #[test]
    fn test_label_face_vs_full() {
        // 1 0 1
        // 0 1 0
        let m = mask(&[3, 2], &[1, 0, 1, 0, 1, 0]);
        let face = label_connected_components(&m, Connectivity::Face);
        assert_eq!(face.count, 3);
        assert_eq!(face.labels.data(), &[1, 0, 2, 0, 3, 0]);

        let full = label_connected_components(&m, Connectivity::Full);
        assert_eq!(full.count, 1);
    }

    #[test]
    fn test_u_shape_merges() {
        // 1 . 1
        // 1 . 1
        // 1 1 1
        let m = mask(&[3, 3], &[1, 0, 1, 1, 0, 1, 1, 1, 1]);
        let labeling = label_connected_components(&m, Connectivity::Face);
        assert_eq!(labeling.count, 1);
        assert!(labeling.labels.data().iter().all(|&l| l == 0 || l == 1));
    }

    #[test]
    fn test_raster_order_numbering() {
        // second component starts earlier in raster order on row 0
        let m = mask(&[4, 2], &[0, 0, 0, 1, 1, 0, 0, 1]);
        let labeling = label_connected_components(&m, Connectivity::Face);
        assert_eq!(labeling.labels.data(), &[0, 0, 0, 1, 2, 0, 0, 1]);
    }

    #[test]
    fn test_3d_components() {
        let mut m: Mask = Volume::new(&[3, 3, 3]).unwrap();
        m.set(&[0, 0, 0], true).unwrap();
        m.set(&[0, 0, 1], true).unwrap();
        m.set(&[2, 2, 2], true).unwrap();
        assert_eq!(count_components(&m, Connectivity::Face), 2);
        let comps = find_connected_components(&m, Connectivity::Face).unwrap();
        assert_eq!(comps[0].voxel_count, 2);
        assert_eq!(comps[0].bounds.max, vec![0, 0, 1]);
        assert_eq!(comps[1].voxel_count, 1);
    }

    #[test]
    fn test_empty_mask() {
        let m: Mask = Volume::new(&[4, 4]).unwrap();
        let labeling = label_connected_components(&m, Connectivity::Face);
        assert_eq!(labeling.count, 0);
        assert!(find_connected_components(&m, Connectivity::Face).unwrap().is_empty());
    }

    #[test]
    fn test_relabel_splits_disjoint_and_keeps_touching_apart() {
        let labels = Volume::from_data(&[5], vec![4u32, 4, 0, 4, 7]).unwrap();
        let relabeled = relabel_components(&labels, Connectivity::Face);
        assert_eq!(relabeled.count, 3);
        assert_eq!(relabeled.labels.data(), &[1, 1, 0, 2, 3]);
    }

    #[test]
    fn test_component_sizes() {
        let labels = Volume::from_data(&[5], vec![1u32, 1, 0, 2, 1]).unwrap();
        assert_eq!(component_sizes(&labels), vec![1, 3, 1]);
    }
}
