//! Intensity histogram and background-peak analysis
//!
//! The histogram spans `[0, max_value]` in bins of `bin_width`. Its mode is
//! taken as the background peak, and the first bin above the mode whose
//! count falls to half the peak gives the right-hand half maximum. Callers
//! derive an automatic threshold from the two positions.

use crate::error::{Error, Result};
use crate::volume::Volume;
use num_traits::AsPrimitive;
use rayon::prelude::*;

/// Samples per tile when accumulating in parallel
const TILE_SIZE: usize = 1 << 16;

/// Largest number of bins a histogram may have
pub const MAX_HISTOGRAM_BINS: usize = 1 << 24;

/// Number of bins for `[0, max_value]` at `bin_width`
///
/// # Errors
///
/// Returns `Error::InvalidParameter` unless both values are positive and
/// finite and the layout needs at most [`MAX_HISTOGRAM_BINS`] bins.
pub fn histogram_bin_count(max_value: f64, bin_width: f64) -> Result<usize> {
    if !max_value.is_finite() || max_value <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "histogram maximum must be positive, got {max_value}"
        )));
    }
    if !bin_width.is_finite() || bin_width <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "histogram bin width must be positive, got {bin_width}"
        )));
    }
    let bins = (max_value / bin_width).floor() + 1.0;
    if !bins.is_finite() || bins > MAX_HISTOGRAM_BINS as f64 {
        return Err(Error::InvalidParameter(format!(
            "histogram of [0, {max_value}] with bin width {bin_width} needs more than \
             {MAX_HISTOGRAM_BINS} bins"
        )));
    }
    Ok(bins as usize)
}

/// A histogram bin with its position and count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramPeak {
    /// Bin index
    pub bin: usize,
    /// Bin center in sample units
    pub position: f64,
    /// Number of samples in the bin
    pub count: u64,
}

/// Intensity histogram over `[0, max_value]`
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityHistogram {
    counts: Vec<u64>,
    bin_width: f64,
    max_value: f64,
}

impl IntensityHistogram {
    /// Create an empty histogram
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` unless both `max_value` and
    /// `bin_width` are positive and finite and the bin count stays within
    /// [`MAX_HISTOGRAM_BINS`].
    pub fn new(max_value: f64, bin_width: f64) -> Result<Self> {
        let bins = histogram_bin_count(max_value, bin_width)?;
        Ok(IntensityHistogram {
            counts: vec![0; bins],
            bin_width,
            max_value,
        })
    }

    /// Build the histogram of every sample in `volume`.
    ///
    /// Tiles of the sample array are accumulated in parallel and merged.
    pub fn from_volume<T>(volume: &Volume<T>, max_value: f64, bin_width: f64) -> Result<Self>
    where
        T: AsPrimitive<f64> + Send + Sync,
    {
        let empty = Self::new(max_value, bin_width)?;
        let merged = volume
            .data()
            .par_chunks(TILE_SIZE)
            .fold(
                || empty.clone(),
                |mut hist, tile| {
                    for v in tile {
                        hist.add(v.as_());
                    }
                    hist
                },
            )
            .reduce(
                || empty.clone(),
                |mut a, b| {
                    a.merge_counts(&b);
                    a
                },
            );
        Ok(merged)
    }

    /// Bin index of `value`; values outside the range clamp to the ends
    pub fn bin_of(&self, value: f64) -> usize {
        if value <= 0.0 {
            return 0;
        }
        let bin = (value / self.bin_width).floor();
        if bin >= self.counts.len() as f64 {
            self.counts.len() - 1
        } else {
            bin as usize
        }
    }

    /// Add one sample; NaN samples are ignored
    pub fn add(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        let bin = self.bin_of(value);
        self.counts[bin] += 1;
    }

    /// Add the counts of another histogram with the same layout.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if the bin layouts differ.
    pub fn merge(&mut self, other: &IntensityHistogram) -> Result<()> {
        if self.counts.len() != other.counts.len() || self.bin_width != other.bin_width {
            return Err(Error::InvalidParameter(format!(
                "cannot merge histograms with {} bins of width {} and {} bins of width {}",
                self.counts.len(),
                self.bin_width,
                other.counts.len(),
                other.bin_width
            )));
        }
        self.merge_counts(other);
        Ok(())
    }

    fn merge_counts(&mut self, other: &IntensityHistogram) {
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of samples counted
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Center of bin `bin` in sample units
    pub fn position(&self, bin: usize) -> f64 {
        (bin as f64 + 0.5) * self.bin_width
    }

    fn peak(&self, bin: usize) -> HistogramPeak {
        HistogramPeak {
            bin,
            position: self.position(bin),
            count: self.counts[bin],
        }
    }

    /// Bin with the highest count; ties go to the lowest bin
    pub fn mode(&self) -> HistogramPeak {
        let mut best = 0;
        for (i, &c) in self.counts.iter().enumerate() {
            if c > self.counts[best] {
                best = i;
            }
        }
        self.peak(best)
    }

    /// First bin at or above the mode whose count is at most half the
    /// mode's count.
    ///
    /// # Errors
    ///
    /// Returns `Error::DegenerateHistogram` if the histogram is empty or no
    /// such bin exists before the end.
    pub fn right_half_maximum(&self) -> Result<HistogramPeak> {
        let mode = self.mode();
        let degenerate = Error::DegenerateHistogram {
            mode_bin: mode.bin,
            bins: self.counts.len(),
        };
        if mode.count == 0 {
            return Err(degenerate);
        }
        self.counts[mode.bin..]
            .iter()
            .position(|&c| 2 * c <= mode.count)
            .map(|offset| self.peak(mode.bin + offset))
            .ok_or(degenerate)
    }

    /// `mode + k * (half_max - mode)` in sample units
    pub fn background_peak_threshold(&self, half_widths: f64) -> Result<f64> {
        let mode = self.mode();
        let half = self.right_half_maximum()?;
        Ok(mode.position + half_widths * (half.position - mode.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram_from(counts: &[u64]) -> IntensityHistogram {
        let mut h = IntensityHistogram::new((counts.len() - 1) as f64, 1.0).unwrap();
        h.counts.copy_from_slice(counts);
        h
    }

    #[test]
    fn test_bin_layout() {
        let h = IntensityHistogram::new(10.0, 2.0).unwrap();
        assert_eq!(h.len(), 6);
        assert_eq!(h.bin_of(-3.0), 0);
        assert_eq!(h.bin_of(3.9), 1);
        assert_eq!(h.bin_of(10.0), 5);
        assert_eq!(h.bin_of(1e9), 5);
        assert_eq!(h.position(1), 3.0);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(IntensityHistogram::new(0.0, 1.0).is_err());
        assert!(IntensityHistogram::new(10.0, 0.0).is_err());
        assert!(IntensityHistogram::new(10.0, f64::NAN).is_err());
    }

    #[test]
    fn test_bin_count_limit() {
        assert!(matches!(
            IntensityHistogram::new(65535.0, 1e-300),
            Err(Error::InvalidParameter(_))
        ));
        assert!(IntensityHistogram::new(65535.0, 1e-3).is_err());
        assert_eq!(histogram_bin_count(65535.0, 1.0).unwrap(), 65536);
        let limit = MAX_HISTOGRAM_BINS as f64;
        assert_eq!(
            histogram_bin_count(limit - 1.0, 1.0).unwrap(),
            MAX_HISTOGRAM_BINS
        );
        assert!(histogram_bin_count(limit, 1.0).is_err());
    }

    #[test]
    fn test_mode_ties_lowest_bin() {
        let h = histogram_from(&[1, 5, 2, 5, 0]);
        assert_eq!(h.mode().bin, 1);
        assert_eq!(h.mode().count, 5);
    }

    #[test]
    fn test_right_half_maximum() {
        let h = histogram_from(&[2, 10, 8, 6, 5, 1]);
        let half = h.right_half_maximum().unwrap();
        assert_eq!(half.bin, 4);
        // mode at 1.5, half max at 4.5, k = 2 -> 1.5 + 2 * 3
        assert_eq!(h.background_peak_threshold(2.0).unwrap(), 7.5);
    }

    #[test]
    fn test_degenerate_histogram() {
        let h = histogram_from(&[1, 4, 4, 3]);
        assert!(matches!(
            h.right_half_maximum(),
            Err(Error::DegenerateHistogram { mode_bin: 1, bins: 4 })
        ));
        let empty = IntensityHistogram::new(5.0, 1.0).unwrap();
        assert!(empty.right_half_maximum().is_err());
    }

    #[test]
    fn test_from_volume_and_merge() {
        let vol = Volume::from_data(&[6], vec![0u16, 0, 1, 3, 3, 3]).unwrap();
        let h = IntensityHistogram::from_volume(&vol, 3.0, 1.0).unwrap();
        assert_eq!(h.counts(), &[2, 1, 0, 3]);
        assert_eq!(h.total(), 6);

        let mut a = h.clone();
        a.merge(&h).unwrap();
        assert_eq!(a.counts(), &[4, 2, 0, 6]);

        let other = IntensityHistogram::new(3.0, 0.5).unwrap();
        assert!(a.merge(&other).is_err());
    }

    #[test]
    fn test_nan_ignored() {
        let vol = Volume::from_data(&[3], vec![f32::NAN, 1.0, 2.0]).unwrap();
        let h = IntensityHistogram::from_volume(&vol, 2.0, 1.0).unwrap();
        assert_eq!(h.total(), 2);
    }
}
