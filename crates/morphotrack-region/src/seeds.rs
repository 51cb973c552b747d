//! Watershed seeds from distance-map maxima
//!
//! A voxel is a seed candidate when its squared distance is positive,
//! reaches the global threshold, and no voxel inside the radius-`r`
//! hypersphere around it is strictly larger. Adjacent candidates form
//! plateaus that become one seed each. Plateaus are then visited from the
//! highest value down: one lying within `2r` of an already accepted seed
//! whose value differs from it by less than the local threshold squared is
//! dropped, so shallow secondary maxima do not split an object.

use crate::conncomp::{ComponentLabeling, label_connected_components};
use crate::error::{RegionError, RegionResult};
use morphotrack_core::{Connectivity, DistanceMap, LabelVolume, Mask, Neighbors, Volume};
use rayon::prelude::*;

/// Smallest neighborhood radius that avoids duplicate maxima on plateaus
pub const MIN_SEED_RADIUS: usize = 2;

/// Options for seed generation
#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Neighborhood radius in voxels
    pub radius: usize,
    /// Global threshold `g`; candidates need a squared distance of at
    /// least `g²`
    pub global_threshold: f64,
    /// Local threshold `l`; neighboring maxima closer than `l²` in value
    /// are merged
    pub local_threshold: f64,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            radius: MIN_SEED_RADIUS,
            global_threshold: 0.0,
            local_threshold: 0.0,
        }
    }
}

impl SeedOptions {
    /// Create new options with the given radius
    pub fn new(radius: usize) -> Self {
        Self {
            radius,
            ..Self::default()
        }
    }

    /// Set the global distance threshold
    pub fn with_global_threshold(mut self, threshold: f64) -> Self {
        self.global_threshold = threshold;
        self
    }

    /// Set the local distance threshold
    pub fn with_local_threshold(mut self, threshold: f64) -> Self {
        self.local_threshold = threshold;
        self
    }

    /// Check the radius and thresholds
    ///
    /// # Errors
    ///
    /// Returns `RegionError::InvalidParameters` for a radius below 2 or a
    /// negative or non-finite threshold.
    pub fn validate(&self) -> RegionResult<()> {
        if self.radius < MIN_SEED_RADIUS {
            return Err(RegionError::InvalidParameters(format!(
                "seed radius must be at least {MIN_SEED_RADIUS} voxels, got {}",
                self.radius
            )));
        }
        for (name, t) in [
            ("global", self.global_threshold),
            ("local", self.local_threshold),
        ] {
            if !t.is_finite() || t < 0.0 {
                return Err(RegionError::InvalidParameters(format!(
                    "{name} distance threshold must be non-negative, got {t}"
                )));
            }
        }
        Ok(())
    }
}

/// Candidate voxels: positive, above `g²`, and maximal in the ball
fn seed_candidates(distance: &DistanceMap, radius: usize, min_squared: f64) -> Mask {
    let ball = Neighbors::ball(distance, radius);
    let data = distance.data();
    let flags: Vec<bool> = (0..distance.len())
        .into_par_iter()
        .map(|i| {
            let d = data[i];
            if d <= 0.0 || d < min_squared {
                return false;
            }
            let coords = distance.coords_of(i);
            let mut maximal = true;
            ball.for_each(&coords, i, |n| {
                if data[n] > d {
                    maximal = false;
                }
            });
            maximal
        })
        .collect();
    let mut mask: Mask = Volume::new_like(distance, false);
    mask.data_mut().copy_from_slice(&flags);
    mask
}

/// A plateau of candidate voxels
struct Plateau {
    label: u32,
    /// First voxel in raster order
    representative: Vec<usize>,
    value: f64,
}

fn squared_separation(a: &[usize], b: &[usize]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| (x as f64 - y as f64).powi(2))
        .sum()
}

/// Build the seed label volume for a distance map
///
/// # Arguments
///
/// * `distance` - Squared distance map
/// * `options` - Radius and thresholds
///
/// # Returns
///
/// Seeds labeled `1..=count` in raster order of their first voxel; 0 is
/// not a seed. Each seed is one connected region.
pub fn create_watershed_seeds(
    distance: &DistanceMap,
    options: &SeedOptions,
) -> RegionResult<ComponentLabeling> {
    options.validate()?;
    let g2 = options.global_threshold * options.global_threshold;
    let l2 = options.local_threshold * options.local_threshold;

    let candidates = seed_candidates(distance, options.radius, g2);
    let groups = label_connected_components(&candidates, Connectivity::Full);

    let mut plateaus: Vec<Option<Plateau>> = Vec::new();
    plateaus.resize_with(groups.count as usize, || None);
    for (i, &label) in groups.labels.data().iter().enumerate() {
        if label == 0 {
            continue;
        }
        let slot = &mut plateaus[label as usize - 1];
        if slot.is_none() {
            *slot = Some(Plateau {
                label,
                representative: distance.coords_of(i),
                value: distance.data()[i],
            });
        }
    }
    let mut plateaus: Vec<Plateau> = plateaus.into_iter().flatten().collect();
    plateaus.sort_by(|a, b| b.value.total_cmp(&a.value).then(a.label.cmp(&b.label)));

    let reach2 = (2.0 * options.radius as f64).powi(2);
    let mut accepted: Vec<&Plateau> = Vec::new();
    for p in &plateaus {
        let suppressed = accepted.iter().any(|a| {
            squared_separation(&a.representative, &p.representative) <= reach2
                && (a.value - p.value).abs() < l2
        });
        if !suppressed {
            accepted.push(p);
        }
    }

    let mut remap = vec![0u32; groups.count as usize + 1];
    let mut kept: Vec<u32> = accepted.iter().map(|p| p.label).collect();
    kept.sort_unstable();
    for (rank, &label) in kept.iter().enumerate() {
        remap[label as usize] = rank as u32 + 1;
    }

    let labels: LabelVolume = groups.labels.map(|&l| remap[l as usize]);
    Ok(ComponentLabeling {
        labels,
        count: kept.len() as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(values: &[f64]) -> DistanceMap {
        Volume::from_data(&[values.len()], values.to_vec()).unwrap()
    }

    #[test]
    fn test_radius_below_two_rejected() {
        let d = profile(&[0.0, 1.0, 0.0]);
        assert!(create_watershed_seeds(&d, &SeedOptions::new(1)).is_err());
        let bad = SeedOptions::new(2).with_global_threshold(-1.0);
        assert!(create_watershed_seeds(&d, &bad).is_err());
    }

    #[test]
    fn test_two_separated_peaks() {
        let d = profile(&[0.0, 1.0, 4.0, 1.0, 0.0, 0.0, 1.0, 9.0, 1.0, 0.0]);
        let seeds = create_watershed_seeds(&d, &SeedOptions::new(2)).unwrap();
        assert_eq!(seeds.count, 2);
        assert_eq!(seeds.labels.data()[2], 1);
        assert_eq!(seeds.labels.data()[7], 2);
    }

    #[test]
    fn test_global_threshold_drops_low_peak() {
        let d = profile(&[0.0, 1.0, 4.0, 1.0, 0.0, 0.0, 1.0, 9.0, 1.0, 0.0]);
        let options = SeedOptions::new(2).with_global_threshold(2.5);
        let seeds = create_watershed_seeds(&d, &options).unwrap();
        assert_eq!(seeds.count, 1);
        assert_eq!(seeds.labels.data()[7], 1);
    }

    #[test]
    fn test_plateau_is_one_seed() {
        let d = profile(&[0.0, 1.0, 4.0, 4.0, 4.0, 1.0, 0.0]);
        let seeds = create_watershed_seeds(&d, &SeedOptions::new(2)).unwrap();
        assert_eq!(seeds.count, 1);
        assert_eq!(&seeds.labels.data()[2..5], &[1, 1, 1]);
    }

    #[test]
    fn test_local_threshold_suppresses_shallow_neighbor() {
        // peaks at 3 (value 16) and 6 (value 15) are 3 apart, within 2r = 4
        let d = profile(&[0.0, 4.0, 9.0, 16.0, 9.0, 4.0, 15.0, 4.0, 0.0]);
        let without = create_watershed_seeds(&d, &SeedOptions::new(2)).unwrap();
        assert_eq!(without.count, 2);

        let options = SeedOptions::new(2).with_local_threshold(1.5);
        let with = create_watershed_seeds(&d, &options).unwrap();
        assert_eq!(with.count, 1);
        assert_eq!(with.labels.data()[3], 1);
        assert_eq!(with.labels.data()[6], 0);
    }
}
