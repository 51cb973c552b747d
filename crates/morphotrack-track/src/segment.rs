//! Per-frame segmentation
//!
//! Runs the stages for one intensity volume in order:
//!
//! 1. threshold selection
//! 2. mask construction
//! 3. small-object removal and hole filling
//! 4. distance transform, seeds and watershed, or plain connected
//!    components when splitting is disabled
//! 5. optional central region selection
//!
//! Every stage reports to the caller's [`DiagnosticSink`]. Physical lengths
//! from the configuration are converted with the frame's finest axis.

use crate::config::{SegmentationConfig, ThresholdMode, WatershedConfig};
use crate::error::{TrackError, TrackResult};
use morphotrack_core::{
    DiagnosticSink, Error as CoreError, IntensityHistogram, LabelVolume, Mask, Severity, Volume,
    create_mask, max_value, report,
};
use morphotrack_region::{
    BoundaryCondition, MIN_SEED_RADIUS, Region, SeedOptions, WatershedOptions,
    create_watershed_seeds, distance_transform, fill_holes_in_slices, label_connected_components,
    remove_small_objects, select_central_region, watershed_from_seeds,
};
use num_traits::AsPrimitive;

/// Everything the segmenter produced for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSegmentation {
    /// Intensity threshold that built the mask
    pub threshold: f64,
    /// Labeled foreground: the cleaned mask minus any component the
    /// watershed left without a seed
    pub mask: Mask,
    /// Per-frame labels `1..=n`, numbered in raster order of each
    /// component's first voxel, or of the seeds when splitting
    pub labels: LabelVolume,
    /// Number of watershed seeds, `None` when splitting is disabled
    pub seed_count: Option<u32>,
    /// Region at the volume center, when selection is enabled and one
    /// was found
    pub central: Option<Region>,
}

impl FrameSegmentation {
    /// Number of labeled regions
    pub fn region_count(&self) -> u32 {
        self.labels.max_label()
    }
}

/// Segments single frames with a fixed configuration
#[derive(Debug, Clone)]
pub struct Segmenter {
    config: SegmentationConfig,
}

impl Segmenter {
    /// Create a segmenter after validating `config`
    ///
    /// # Errors
    ///
    /// Returns `TrackError::InvalidConfiguration` if any parameter is out
    /// of range.
    pub fn new(config: SegmentationConfig) -> TrackResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Segment one frame
    ///
    /// # Arguments
    ///
    /// * `frame` - Frame index used in diagnostics and errors
    /// * `volume` - Intensity volume with its calibration
    /// * `sink` - Receiver for stage diagnostics
    ///
    /// # Errors
    ///
    /// Returns `TrackError::InvalidConfiguration` if the watershed radius
    /// converts to fewer than two voxels for this frame's calibration, and
    /// wraps any region or core failure with the frame index. An empty
    /// mask is not an error.
    pub fn segment<T>(
        &self,
        frame: usize,
        volume: &Volume<T>,
        sink: &dyn DiagnosticSink,
    ) -> TrackResult<FrameSegmentation>
    where
        T: AsPrimitive<f64> + Send + Sync,
    {
        let at = Some(frame);
        let finest = volume.finest_resolution();
        if !volume.is_isotropic()
            && (self.config.watershed.is_some() || self.config.central_region_tolerance.is_some())
        {
            report(
                sink,
                at,
                "mask",
                Severity::Warning,
                format!(
                    "anisotropic calibration {:?}; lengths use the finest axis {finest}",
                    volume.calibration()
                ),
            );
        }

        let threshold = self.select_threshold(frame, volume, sink)?;
        let mut mask = create_mask(volume, threshold).map_err(TrackError::core(frame))?;
        report(
            sink,
            at,
            "mask",
            Severity::Debug,
            format!("{} foreground voxels", mask.count_foreground()),
        );

        if self.config.min_object_size > 0.0 {
            let filtered =
                remove_small_objects(&mask, self.config.min_object_size, self.config.connectivity)
                    .map_err(TrackError::region(frame))?;
            report(
                sink,
                at,
                "cleanup",
                Severity::Debug,
                format!(
                    "kept {} objects, removed {}",
                    filtered.kept, filtered.removed
                ),
            );
            mask = filtered.mask;
        }
        if self.config.fill_holes {
            mask = fill_holes_in_slices(&mask).map_err(TrackError::region(frame))?;
        }

        let (labels, seed_count) = match &self.config.watershed {
            Some(watershed) => {
                let (labels, seeds) = self.split(frame, &mask, watershed, finest, sink)?;
                let before = mask.count_foreground();
                mask = mask
                    .and(&labels.to_mask())
                    .map_err(TrackError::core(frame))?;
                let unseeded = before - mask.count_foreground();
                if unseeded > 0 {
                    report(
                        sink,
                        at,
                        "watershed",
                        Severity::Debug,
                        format!("dropped {unseeded} voxels without a seed"),
                    );
                }
                (labels, Some(seeds))
            }
            None => {
                let labeling = label_connected_components(&mask, self.config.connectivity);
                (labeling.labels, None)
            }
        };
        if mask.count_foreground() == 0 {
            report(sink, at, "mask", Severity::Info, "empty mask");
        }

        let central = match self.config.central_region_tolerance {
            Some(tolerance) => {
                let radius = tolerance / finest;
                let region =
                    select_central_region(&labels, radius).map_err(TrackError::region(frame))?;
                match &region {
                    Some(r) => report(
                        sink,
                        at,
                        "central",
                        Severity::Debug,
                        format!("selected label {} ({} voxels)", r.label, r.voxel_count()),
                    ),
                    None => report(
                        sink,
                        at,
                        "central",
                        Severity::Info,
                        format!("no region within {radius} voxels of the center"),
                    ),
                }
                region
            }
            None => None,
        };

        Ok(FrameSegmentation {
            threshold,
            mask,
            labels,
            seed_count,
            central,
        })
    }

    fn select_threshold<T>(
        &self,
        frame: usize,
        volume: &Volume<T>,
        sink: &dyn DiagnosticSink,
    ) -> TrackResult<f64>
    where
        T: AsPrimitive<f64> + Send + Sync,
    {
        let at = Some(frame);
        let threshold = match self.config.threshold {
            ThresholdMode::Fixed(t) => t,
            ThresholdMode::FractionOfMaximum(f) => f * max_value(volume),
            ThresholdMode::BackgroundPeak {
                max_value,
                bin_width,
                half_widths,
            } => {
                let histogram = IntensityHistogram::from_volume(volume, max_value, bin_width)
                    .map_err(TrackError::core(frame))?;
                let mode = histogram.mode();
                let half = match histogram.right_half_maximum() {
                    Ok(peak) => peak.position,
                    Err(e @ CoreError::DegenerateHistogram { .. }) => {
                        let fallback = mode.position + histogram.bin_width();
                        report(
                            sink,
                            at,
                            "threshold",
                            Severity::Warning,
                            format!("{e}; using half maximum at {fallback}"),
                        );
                        fallback
                    }
                    Err(e) => return Err(TrackError::core(frame)(e)),
                };
                mode.position + half_widths * (half - mode.position)
            }
        };
        report(
            sink,
            at,
            "threshold",
            Severity::Info,
            format!("threshold {threshold}"),
        );
        Ok(threshold)
    }

    fn split(
        &self,
        frame: usize,
        mask: &Mask,
        watershed: &WatershedConfig,
        finest: f64,
        sink: &dyn DiagnosticSink,
    ) -> TrackResult<(LabelVolume, u32)> {
        let at = Some(frame);
        let radius = (watershed.search_radius / finest).floor();
        if radius < MIN_SEED_RADIUS as f64 {
            return Err(TrackError::InvalidConfiguration {
                frame: at,
                reason: format!(
                    "watershed search radius {} is {radius} voxels at resolution {finest}, \
                     need at least {MIN_SEED_RADIUS}",
                    watershed.search_radius
                ),
            });
        }

        let distance = distance_transform(mask, BoundaryCondition::Background)
            .map_err(TrackError::region(frame))?;
        report(sink, at, "distance", Severity::Debug, "squared distance map ready");

        let options = SeedOptions::new(radius as usize)
            .with_global_threshold(watershed.global_distance_threshold / finest)
            .with_local_threshold(watershed.local_distance_threshold / finest);
        let seeds = create_watershed_seeds(&distance, &options).map_err(TrackError::region(frame))?;
        report(
            sink,
            at,
            "seeds",
            Severity::Debug,
            format!("{} seeds", seeds.count),
        );

        let ws_options = WatershedOptions::new().with_connectivity(self.config.connectivity);
        let labels = watershed_from_seeds(mask, &distance, &seeds.labels, &ws_options)
            .map_err(TrackError::region(frame))?;
        report(
            sink,
            at,
            "watershed",
            Severity::Debug,
            format!("{} labels", labels.max_label()),
        );
        Ok((labels, seeds.count))
    }
}
