//! Segmentation pipeline regression test
//!
//! Run with:
//! ```
//! cargo test -p morphotrack-track --test pipeline_reg
//! ```

use morphotrack_core::{
    CollectingSink, Diagnostic, DiagnosticSink, NullSink, Severity, Volume,
};
use morphotrack_test::{RegParams, fixtures};
use morphotrack_track::{
    CancellationToken, IdOrigin, Pipeline, SegmentationConfig, ThresholdMode, TrackError,
    WatershedConfig,
};

/// Two overlapping bright discs on a flat background
fn touching_discs() -> Volume<u16> {
    let a = fixtures::ball_mask(&[30, 17], &[8.0, 8.0], 7.0).unwrap();
    let b = fixtures::ball_mask(&[30, 17], &[21.0, 8.0], 7.0).unwrap();
    let mask = fixtures::union(&a, &b).unwrap();
    fixtures::intensity_from_mask(&mask, 10, 200)
}

/// Cancels its token once the given frame has been tracked
struct CancelAfter {
    token: CancellationToken,
    frame: usize,
}

impl DiagnosticSink for CancelAfter {
    fn emit(&self, diagnostic: Diagnostic) {
        if diagnostic.stage == "tracking" && diagnostic.frame == Some(self.frame) {
            self.token.cancel();
        }
    }
}

#[test]
fn pipeline_auto_threshold_reg() {
    let mut rp = RegParams::new("pipeline_auto_threshold");

    // flat background at 10: mode bin 5 (center 11), half maximum bin 6
    let ball = fixtures::ball_mask(&[25, 25], &[12.0, 12.0], 6.0).unwrap();
    let frame = fixtures::intensity_from_mask(&ball, 10, 400);

    let mut pipeline = Pipeline::new(SegmentationConfig::default()).unwrap();
    let sink = CollectingSink::new();
    let result = pipeline.process_frame(&frame, &sink).unwrap();
    rp.compare_values(17.0, result.segmentation.threshold, 1e-9);
    rp.compare_volumes(&ball, &result.segmentation.mask);
    rp.check(result.tracked.ids() == vec![1], "one object");
    rp.check(!sink.has_warning("threshold"), "no fallback needed");

    assert!(rp.cleanup());
}

#[test]
fn pipeline_degenerate_histogram_reg() {
    let mut rp = RegParams::new("pipeline_degenerate_histogram");

    // every sample in the last bin: no half maximum to the right of the mode
    let frame = Volume::new_with_value(&[8, 8], 255u8).unwrap();
    let config = SegmentationConfig::new().with_threshold(ThresholdMode::BackgroundPeak {
        max_value: 255.0,
        bin_width: 1.0,
        half_widths: 3.0,
    });
    let mut pipeline = Pipeline::new(config).unwrap();
    let sink = CollectingSink::new();
    let result = pipeline.process_frame(&frame, &sink).unwrap();

    rp.check(sink.has_warning("threshold"), "fallback reported");
    // mode center 255.5 plus three bin widths
    rp.compare_values(258.5, result.segmentation.threshold, 1e-9);
    rp.compare_values(0.0, result.tracked.region_count() as f64, 0.0);
    let warnings = sink.at_least(Severity::Warning);
    rp.check(
        warnings.iter().all(|d| d.frame == Some(0)),
        "warning names the frame",
    );

    assert!(rp.cleanup());
}

#[test]
fn pipeline_watershed_reg() {
    let mut rp = RegParams::new("pipeline_watershed");

    let config = SegmentationConfig::new()
        .with_threshold(ThresholdMode::Fixed(100.0))
        .with_watershed(WatershedConfig::new(3.0).with_global_distance_threshold(2.0));
    let mut pipeline = Pipeline::new(config).unwrap();
    let frames = vec![touching_discs(), touching_discs()];
    let series = pipeline
        .run(&frames, &CancellationToken::new(), &NullSink)
        .unwrap();

    rp.compare_values(2.0, series.frames.len() as f64, 0.0);
    let first = &series.frames[0];
    rp.check(first.segmentation.seed_count == Some(2), "two seeds");
    rp.check(first.tracked.ids() == vec![1, 2], "split objects tracked apart");
    rp.compare_values(1.0, first.tracked.labels.value(&[8, 8]).unwrap() as f64, 0.0);
    rp.compare_values(2.0, first.tracked.labels.value(&[21, 8]).unwrap() as f64, 0.0);

    let second = &series.frames[1];
    rp.compare_volumes(&first.tracked.labels, &second.tracked.labels);
    rp.check(
        second
            .tracked
            .assignments
            .iter()
            .all(|a| a.origin == IdOrigin::Inherited),
        "second frame inherits both ids",
    );

    assert!(rp.cleanup());
}

#[test]
fn pipeline_errors_reg() {
    let mut rp = RegParams::new("pipeline_errors");

    // radius 2.0 is two voxels at unit calibration but one voxel at 2.0
    let config = SegmentationConfig::new()
        .with_threshold(ThresholdMode::Fixed(100.0))
        .with_watershed(WatershedConfig::new(2.0));
    let mut pipeline = Pipeline::new(config.clone()).unwrap();
    let coarse = touching_discs().with_calibration(&[2.0, 2.0]).unwrap();
    let frames = vec![touching_discs(), coarse];
    match pipeline.run(&frames, &CancellationToken::new(), &NullSink) {
        Err(e @ TrackError::InvalidConfiguration { .. }) => {
            rp.check(e.frame() == Some(1), "error names frame 1");
        }
        other => {
            rp.check(false, &format!("expected invalid configuration, got {other:?}"));
        }
    }
    rp.compare_values(1.0, pipeline.tracker().frames_seen() as f64, 0.0);

    // a frame of another shape is rejected before segmentation
    pipeline.reset();
    let small = Volume::new_with_value(&[10, 10], 10u16).unwrap();
    let frames = vec![touching_discs(), small];
    let err = pipeline
        .run(&frames, &CancellationToken::new(), &NullSink)
        .unwrap_err();
    rp.check(
        matches!(err, TrackError::DimensionMismatch { frame: 1, .. }),
        "dimension mismatch at frame 1",
    );

    // configuration errors surface at construction
    let bad = config.with_threshold(ThresholdMode::Fixed(-1.0));
    rp.check(
        matches!(
            Pipeline::new(bad),
            Err(TrackError::InvalidConfiguration { frame: None, .. })
        ),
        "negative threshold rejected",
    );

    assert!(rp.cleanup());
}

#[test]
fn pipeline_cancel_reg() {
    let mut rp = RegParams::new("pipeline_cancel");

    let config = SegmentationConfig::new().with_threshold(ThresholdMode::Fixed(100.0));
    let mut pipeline = Pipeline::new(config).unwrap();
    let frames = vec![touching_discs(), touching_discs(), touching_discs()];
    let cancel = CancellationToken::new();
    let sink = CancelAfter {
        token: cancel.clone(),
        frame: 0,
    };
    let series = pipeline.run(&frames, &cancel, &sink).unwrap();

    rp.check(series.cancelled, "run reports cancellation");
    rp.compare_values(1.0, series.frames.len() as f64, 0.0);
    rp.compare_values(1.0, pipeline.tracker().frames_seen() as f64, 0.0);
    rp.compare_values(2.0, pipeline.tracker().next_id() as f64, 0.0);

    assert!(rp.cleanup());
}

#[test]
fn pipeline_central_region_reg() {
    let mut rp = RegParams::new("pipeline_central_region");

    // small off-center blob plus one covering the center
    let center = fixtures::ball_mask(&[21, 21], &[10.0, 10.0], 4.0).unwrap();
    let corner = fixtures::filled_box(&[21, 21], &[0, 0], &[2, 2]).unwrap();
    let frame = fixtures::intensity_from_mask(&fixtures::union(&corner, &center).unwrap(), 0, 50);

    let config = SegmentationConfig::new()
        .with_threshold(ThresholdMode::Fixed(25.0))
        .with_central_region_tolerance(1.0);
    let mut pipeline = Pipeline::new(config).unwrap();
    let result = pipeline.process_frame(&frame, &NullSink).unwrap();

    let central = result.segmentation.central.as_ref().unwrap();
    rp.compare_values(2.0, central.label as f64, 0.0);
    rp.compare_values(
        center.count_foreground() as f64,
        central.voxel_count() as f64,
        0.0,
    );
    rp.check(result.central_id() == Some(2), "central id tracked");

    assert!(rp.cleanup());
}
