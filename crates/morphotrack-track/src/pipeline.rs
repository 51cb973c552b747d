//! Time-series pipeline
//!
//! Segments frames one after another and feeds each frame's labels to the
//! overlap tracker. Frames are processed strictly in order because each
//! tracking step needs the sealed result of the one before. Cancellation
//! is checked between frames only.

use crate::cancel::CancellationToken;
use crate::config::SegmentationConfig;
use crate::error::TrackResult;
use crate::segment::{FrameSegmentation, Segmenter};
use crate::tracker::{OverlapTracker, TrackedFrame};
use morphotrack_core::{DiagnosticSink, Mask, Severity, Volume, report};
use num_traits::AsPrimitive;
use std::borrow::Borrow;

/// Segmentation and tracking of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameResult {
    pub segmentation: FrameSegmentation,
    pub tracked: TrackedFrame,
}

impl FrameResult {
    /// Tracked id of the central region, if one was selected
    pub fn central_id(&self) -> Option<u32> {
        let region = self.segmentation.central.as_ref()?;
        let &first = region.voxels.first()?;
        self.tracked.labels.data().get(first).copied()
    }
}

/// Outcome of [`Pipeline::run`]
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesResult {
    /// Completed frames in order
    pub frames: Vec<FrameResult>,
    /// The run stopped early on request
    pub cancelled: bool,
}

/// Segmenter plus tracker for one series
#[derive(Debug, Clone)]
pub struct Pipeline {
    segmenter: Segmenter,
    tracker: OverlapTracker,
}

impl Pipeline {
    /// Create a pipeline; the tracker uses the configured connectivity
    ///
    /// # Errors
    ///
    /// Returns `TrackError::InvalidConfiguration` if `config` is invalid.
    pub fn new(config: SegmentationConfig) -> TrackResult<Self> {
        let tracker = OverlapTracker::new().with_connectivity(config.connectivity);
        Ok(Self {
            segmenter: Segmenter::new(config)?,
            tracker,
        })
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    pub fn tracker(&self) -> &OverlapTracker {
        &self.tracker
    }

    /// Start a new series with the same configuration
    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    /// Segment and track the next frame of the series
    ///
    /// The frame index is the number of frames already tracked.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::DimensionMismatch` before any work if the frame
    /// differs in shape from the previous one, and propagates segmentation
    /// errors. The tracker is unchanged on error.
    pub fn process_frame<T>(
        &mut self,
        volume: &Volume<T>,
        sink: &dyn DiagnosticSink,
    ) -> TrackResult<FrameResult>
    where
        T: AsPrimitive<f64> + Send + Sync,
    {
        let frame = self.tracker.frames_seen();
        self.tracker.check_shape(volume.dims())?;
        let segmentation = self.segmenter.segment(frame, volume, sink)?;
        let tracked = self.tracker.track_labels(&segmentation.labels)?;
        report(
            sink,
            Some(frame),
            "tracking",
            Severity::Info,
            format!(
                "{} regions, ids {:?}, next id {}",
                tracked.region_count(),
                tracked.ids(),
                self.tracker.next_id()
            ),
        );
        Ok(FrameResult {
            segmentation,
            tracked,
        })
    }

    /// Process `frames` in order until they run out or `cancel` fires
    ///
    /// # Errors
    ///
    /// Aborts on the first configuration or dimension error; the error
    /// names the failing frame.
    pub fn run<'a, T, I>(
        &mut self,
        frames: I,
        cancel: &CancellationToken,
        sink: &dyn DiagnosticSink,
    ) -> TrackResult<SeriesResult>
    where
        T: AsPrimitive<f64> + Send + Sync + 'a,
        I: IntoIterator<Item = &'a Volume<T>>,
    {
        let mut results = Vec::new();
        for volume in frames {
            if cancel.is_cancelled() {
                report(
                    sink,
                    Some(self.tracker.frames_seen()),
                    "tracking",
                    Severity::Info,
                    "run cancelled",
                );
                return Ok(SeriesResult {
                    frames: results,
                    cancelled: true,
                });
            }
            results.push(self.process_frame(volume, sink)?);
        }
        Ok(SeriesResult {
            frames: results,
            cancelled: false,
        })
    }
}

/// Track externally segmented masks, continuing `tracker`'s series
///
/// Stops early, returning the frames done so far, once `cancel` fires.
///
/// # Errors
///
/// Returns `TrackError::DimensionMismatch` naming the first frame whose
/// shape differs from its predecessor.
pub fn track_mask_series<I>(
    masks: I,
    tracker: &mut OverlapTracker,
    cancel: &CancellationToken,
) -> TrackResult<Vec<TrackedFrame>>
where
    I: IntoIterator,
    I::Item: Borrow<Mask>,
{
    let mut frames = Vec::new();
    for mask in masks {
        if cancel.is_cancelled() {
            break;
        }
        frames.push(tracker.track_mask(mask.borrow())?);
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThresholdMode;
    use morphotrack_core::NullSink;

    fn blob_frame(offset: usize) -> Volume<u8> {
        let mut vol = Volume::new_with_value(&[10, 10], 0u8).unwrap();
        for i in 0..vol.len() {
            let c = vol.coords_of(i);
            if (offset..offset + 4).contains(&c[0]) && (3..7).contains(&c[1]) {
                vol.data_mut()[i] = 100;
            }
        }
        vol
    }

    #[test]
    fn test_run_keeps_identity() {
        let config = SegmentationConfig::new().with_threshold(ThresholdMode::Fixed(50.0));
        let mut pipeline = Pipeline::new(config).unwrap();
        let frames = vec![blob_frame(2), blob_frame(3), blob_frame(4)];
        let result = pipeline
            .run(&frames, &CancellationToken::new(), &NullSink)
            .unwrap();
        assert!(!result.cancelled);
        assert_eq!(result.frames.len(), 3);
        for frame in &result.frames {
            assert_eq!(frame.tracked.ids(), vec![1]);
        }
        assert_eq!(pipeline.tracker().frames_seen(), 3);
    }

    #[test]
    fn test_cancelled_before_start() {
        let mut pipeline = Pipeline::new(SegmentationConfig::default()).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = pipeline.run(&[blob_frame(2)], &cancel, &NullSink).unwrap();
        assert!(result.cancelled);
        assert!(result.frames.is_empty());
        assert_eq!(pipeline.tracker().frames_seen(), 0);
    }

    #[test]
    fn test_central_id() {
        let config = SegmentationConfig::new()
            .with_threshold(ThresholdMode::Fixed(50.0))
            .with_central_region_tolerance(2.0);
        let mut pipeline = Pipeline::new(config).unwrap();
        let result = pipeline.process_frame(&blob_frame(3), &NullSink).unwrap();
        assert_eq!(result.central_id(), Some(1));
    }
}
