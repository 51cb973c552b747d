//! Synthetic volumes for tests
//!
//! 2-D fixtures are written as ASCII rows: each string is one row (axis 1)
//! and each character one column (axis 0).

use crate::error::{TestError, TestResult};
use morphotrack_core::{LabelVolume, Mask, Volume, advance_coords};

fn row_dims(rows: &[&str]) -> TestResult<[usize; 2]> {
    let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
    if width == 0 {
        return Err(TestError::MalformedFixture("no rows or empty first row".into()));
    }
    if let Some(bad) = rows.iter().position(|r| r.chars().count() != width) {
        return Err(TestError::MalformedFixture(format!(
            "row {bad} has a different length than row 0"
        )));
    }
    Ok([width, rows.len()])
}

/// Parse a 2-D mask; `#` or `1` is foreground, `.` or `0` background
pub fn mask_from_rows(rows: &[&str]) -> TestResult<Mask> {
    let dims = row_dims(rows)?;
    let mut data = Vec::with_capacity(dims[0] * dims[1]);
    for (row, line) in rows.iter().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            data.push(match ch {
                '#' | '1' => true,
                '.' | '0' => false,
                _ => return Err(TestError::UnexpectedChar { ch, row, col }),
            });
        }
    }
    Ok(Volume::from_data(&dims, data)?)
}

/// Parse a 2-D label volume; digits are labels, `.` is background
pub fn labels_from_rows(rows: &[&str]) -> TestResult<LabelVolume> {
    let dims = row_dims(rows)?;
    let mut data = Vec::with_capacity(dims[0] * dims[1]);
    for (row, line) in rows.iter().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            let label = match ch {
                '.' => 0,
                _ => ch
                    .to_digit(10)
                    .ok_or(TestError::UnexpectedChar { ch, row, col })?,
            };
            data.push(label);
        }
    }
    Ok(Volume::from_data(&dims, data)?)
}

/// Mask with the inclusive box `min..=max` set
pub fn filled_box(dims: &[usize], min: &[usize], max: &[usize]) -> TestResult<Mask> {
    let mut mask: Mask = Volume::new(dims)?;
    paint_box(&mut mask, min, max, true)?;
    Ok(mask)
}

/// Write `value` into the inclusive box `min..=max`
pub fn paint_box<T: Clone>(
    volume: &mut Volume<T>,
    min: &[usize],
    max: &[usize],
    value: T,
) -> TestResult<()> {
    if min.len() != volume.ndim() || max.len() != volume.ndim() {
        return Err(TestError::MalformedFixture(format!(
            "box corners {min:?}..{max:?} do not match {}-D volume",
            volume.ndim()
        )));
    }
    let extent: Vec<usize> = min
        .iter()
        .zip(max)
        .map(|(&lo, &hi)| hi.saturating_sub(lo) + 1)
        .collect();
    let mut offset = vec![0usize; extent.len()];
    let mut coords = vec![0usize; extent.len()];
    loop {
        for d in 0..coords.len() {
            coords[d] = min[d] + offset[d];
        }
        volume.set(&coords, value.clone())?;
        if !advance_coords(&mut offset, &extent) {
            break;
        }
    }
    Ok(())
}

/// Mask of a Euclidean ball of `radius` voxels around `center`
pub fn ball_mask(dims: &[usize], center: &[f64], radius: f64) -> TestResult<Mask> {
    let mut mask: Mask = Volume::new(dims)?;
    let r2 = radius * radius;
    for i in 0..mask.len() {
        let coords = mask.coords_of(i);
        let d2: f64 = coords
            .iter()
            .zip(center)
            .map(|(&c, &m)| (c as f64 - m).powi(2))
            .sum();
        mask.data_mut()[i] = d2 <= r2;
    }
    Ok(mask)
}

/// Union of two masks of equal shape
pub fn union(a: &Mask, b: &Mask) -> TestResult<Mask> {
    a.check_same_shape(b)?;
    let mut out = a.clone();
    for (o, &v) in out.data_mut().iter_mut().zip(b.data()) {
        *o = *o || v;
    }
    Ok(out)
}

/// Intensity volume with `background` outside and `foreground` inside the
/// mask
pub fn intensity_from_mask(mask: &Mask, background: u16, foreground: u16) -> Volume<u16> {
    mask.map(|&m| if m { foreground } else { background })
}

/// Stack equally sized 2-D masks along a new axis 2
pub fn stack_planes(planes: &[Mask]) -> TestResult<Mask> {
    let first = planes
        .first()
        .ok_or_else(|| TestError::MalformedFixture("no planes".into()))?;
    let mut data = Vec::with_capacity(first.len() * planes.len());
    for plane in planes {
        first.check_same_shape(plane)?;
        data.extend_from_slice(plane.data());
    }
    let mut dims = first.dims().to_vec();
    dims.push(planes.len());
    Ok(Volume::from_data(&dims, data)?)
}
