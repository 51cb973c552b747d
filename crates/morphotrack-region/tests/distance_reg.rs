//! Distance transform regression test
//!
//! Run with:
//! ```
//! cargo test -p morphotrack-region --test distance_reg
//! ```

use morphotrack_core::{Mask, Volume};
use morphotrack_region::{
    BoundaryCondition, distance_transform, distance_transform_calibrated, max_distance,
};
use morphotrack_test::{RegParams, fixtures};

#[test]
fn distance_reg() {
    let mut rp = RegParams::new("distance");

    // all background maps to zero
    let empty: Mask = Volume::new(&[6, 5, 4]).unwrap();
    let dist = distance_transform(&empty, BoundaryCondition::Background).unwrap();
    rp.compare_values(0.0, max_distance(&dist), 0.0);

    // a single filled row: ends at exactly 1, interior strictly positive
    for n in [1usize, 2, 5, 12] {
        let row: Mask = Volume::new_with_value(&[n], true).unwrap();
        let dist = distance_transform(&row, BoundaryCondition::Background).unwrap();
        rp.compare_values(1.0, dist.data()[0], 0.0);
        rp.compare_values(1.0, dist.data()[n - 1], 0.0);
        rp.check(dist.data().iter().all(|&d| d > 0.0), "row interior positive");
        let half = (n + 1) / 2;
        rp.compare_values((half * half) as f64, max_distance(&dist), 0.0);
    }

    // a row embedded in a larger 2-D mask sees background on both sides
    let mut strip: Mask = Volume::new(&[7, 3]).unwrap();
    fixtures::paint_box(&mut strip, &[0, 1], &[6, 1], true).unwrap();
    let dist = distance_transform(&strip, BoundaryCondition::Background).unwrap();
    rp.check(
        (0..7).all(|x| dist.value(&[x, 1]) == Some(1.0)),
        "one-voxel strip has distance 1",
    );

    // a ball of radius 5: the nearest background to the center is at
    // offset (5, 1, 0)
    let ball = fixtures::ball_mask(&[13, 13, 13], &[6.0, 6.0, 6.0], 5.0).unwrap();
    let dist = distance_transform(&ball, BoundaryCondition::Background).unwrap();
    rp.compare_values(26.0, dist.value(&[6, 6, 6]).unwrap(), 0.0);

    // calibration scales each axis
    let row = Volume::new_with_value(&[5], true)
        .unwrap()
        .with_calibration(&[0.5])
        .unwrap();
    let dist = distance_transform_calibrated(&row, BoundaryCondition::Background).unwrap();
    rp.compare_values(0.25, dist.data()[0], 1e-12);
    rp.compare_values(2.25, dist.data()[2], 1e-12);

    assert!(rp.cleanup());
}
