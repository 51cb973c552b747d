//! Segmentation configuration
//!
//! All lengths and sizes are physical units. They are converted to voxels
//! per frame using the finest axis of the frame's calibration.

use crate::error::{TrackError, TrackResult};
use morphotrack_core::{Connectivity, histogram_bin_count};

/// How the intensity threshold of a frame is chosen
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ThresholdMode {
    /// A fixed intensity; voxels strictly above it are foreground
    Fixed(f64),
    /// Background peak analysis: `mode + half_widths * (half_max - mode)`
    /// over a histogram of `[0, max_value]` with bins of `bin_width`
    BackgroundPeak {
        max_value: f64,
        bin_width: f64,
        half_widths: f64,
    },
    /// A fraction of the frame's maximum intensity
    FractionOfMaximum(f64),
}

impl Default for ThresholdMode {
    fn default() -> Self {
        ThresholdMode::BackgroundPeak {
            max_value: 65535.0,
            bin_width: 2.0,
            half_widths: 3.0,
        }
    }
}

/// Watershed splitting parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WatershedConfig {
    /// Radius of the local-maximum neighborhood; must convert to at least
    /// two voxels
    pub search_radius: f64,
    /// Seeds need a boundary distance of at least this much
    pub global_distance_threshold: f64,
    /// Neighboring maxima closer than this in distance are merged
    pub local_distance_threshold: f64,
}

impl WatershedConfig {
    pub fn new(search_radius: f64) -> Self {
        Self {
            search_radius,
            global_distance_threshold: 0.0,
            local_distance_threshold: 0.0,
        }
    }

    pub fn with_global_distance_threshold(mut self, threshold: f64) -> Self {
        self.global_distance_threshold = threshold;
        self
    }

    pub fn with_local_distance_threshold(mut self, threshold: f64) -> Self {
        self.local_distance_threshold = threshold;
        self
    }
}

/// Configuration of the per-frame segmentation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentationConfig {
    pub threshold: ThresholdMode,
    /// Components smaller than this physical volume are removed; 0 keeps
    /// everything
    pub min_object_size: f64,
    /// Fill enclosed holes plane by plane
    pub fill_holes: bool,
    /// Split touching objects; `None` labels connected components only
    pub watershed: Option<WatershedConfig>,
    /// Select the region nearest the volume center within this distance
    pub central_region_tolerance: Option<f64>,
    pub connectivity: Connectivity,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdMode::default(),
            min_object_size: 0.0,
            fill_holes: true,
            watershed: None,
            central_region_tolerance: None,
            connectivity: Connectivity::Face,
        }
    }
}

impl SegmentationConfig {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: ThresholdMode) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_min_object_size(mut self, size: f64) -> Self {
        self.min_object_size = size;
        self
    }

    pub fn with_fill_holes(mut self, fill: bool) -> Self {
        self.fill_holes = fill;
        self
    }

    pub fn with_watershed(mut self, watershed: WatershedConfig) -> Self {
        self.watershed = Some(watershed);
        self
    }

    pub fn with_central_region_tolerance(mut self, tolerance: f64) -> Self {
        self.central_region_tolerance = Some(tolerance);
        self
    }

    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Check every parameter that does not depend on a frame
    ///
    /// # Errors
    ///
    /// Returns `TrackError::InvalidConfiguration` naming the first bad
    /// parameter.
    pub fn validate(&self) -> TrackResult<()> {
        match self.threshold {
            ThresholdMode::Fixed(t) => positive("fixed threshold", t)?,
            ThresholdMode::BackgroundPeak {
                max_value,
                bin_width,
                half_widths,
            } => {
                positive("histogram maximum", max_value)?;
                positive("histogram bin width", bin_width)?;
                histogram_bin_count(max_value, bin_width)
                    .map_err(|e| TrackError::config(e.to_string()))?;
                non_negative("background peak half widths", half_widths)?;
            }
            ThresholdMode::FractionOfMaximum(f) => {
                if !(f > 0.0 && f <= 1.0) {
                    return Err(TrackError::config(format!(
                        "fraction of maximum must be in (0, 1], got {f}"
                    )));
                }
            }
        }
        non_negative("minimum object size", self.min_object_size)?;
        if let Some(w) = &self.watershed {
            positive("watershed search radius", w.search_radius)?;
            non_negative("global distance threshold", w.global_distance_threshold)?;
            non_negative("local distance threshold", w.local_distance_threshold)?;
        }
        if let Some(t) = self.central_region_tolerance {
            non_negative("central region tolerance", t)?;
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> TrackResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TrackError::config(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f64) -> TrackResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TrackError::config(format!(
            "{name} must be non-negative, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SegmentationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            SegmentationConfig::new().with_threshold(ThresholdMode::Fixed(0.0)),
            SegmentationConfig::new().with_threshold(ThresholdMode::Fixed(-3.0)),
            SegmentationConfig::new().with_threshold(ThresholdMode::FractionOfMaximum(1.5)),
            SegmentationConfig::new().with_threshold(ThresholdMode::BackgroundPeak {
                max_value: 255.0,
                bin_width: 0.0,
                half_widths: 2.0,
            }),
            SegmentationConfig::new().with_threshold(ThresholdMode::BackgroundPeak {
                max_value: 65535.0,
                bin_width: 1e-300,
                half_widths: 2.0,
            }),
            SegmentationConfig::new().with_min_object_size(-1.0),
            SegmentationConfig::new().with_watershed(WatershedConfig::new(-2.0)),
            SegmentationConfig::new()
                .with_watershed(WatershedConfig::new(2.0).with_local_distance_threshold(f64::NAN)),
            SegmentationConfig::new().with_central_region_tolerance(-0.5),
        ];
        for config in bad {
            assert!(
                matches!(
                    config.validate(),
                    Err(TrackError::InvalidConfiguration { frame: None, .. })
                ),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_builders() {
        let config = SegmentationConfig::new()
            .with_threshold(ThresholdMode::FractionOfMaximum(0.5))
            .with_fill_holes(false)
            .with_watershed(WatershedConfig::new(3.0).with_global_distance_threshold(1.0))
            .with_connectivity(Connectivity::Full);
        assert!(config.validate().is_ok());
        assert!(!config.fill_holes);
        assert_eq!(config.watershed.map(|w| w.global_distance_threshold), Some(1.0));
    }
}
