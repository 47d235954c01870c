//! Integration tests for the environment report step: publish gating,
//! payload format, and upload behaviour.

use parkbay::app::events::AppEvent;
use parkbay::app::ports::UploadError;
use parkbay::app::service::ControlLoop;
use parkbay::config::BayConfig;
use parkbay::error::{CommsError, Error};
use parkbay::model::EnvironmentSample;
use parkbay::reporter::{PublishOutcome, ReportOutcome, UploadOutcome};

use crate::mock_hw::{MockIo, Published, mock_io};

fn tick_with(sample: EnvironmentSample) -> (ReportOutcome, MockIo) {
    let mut app = ControlLoop::new(BayConfig::default());
    let mut io = mock_io();
    io.hw.environment = sample;
    app.start(&mut io);
    let summary = app.tick(&mut io);
    (summary.report, io)
}

#[test]
fn publishes_at_exact_minimums() {
    let (report, io) = tick_with(EnvironmentSample::new(25.0, 60.0));
    assert!(report.published());
    assert_eq!(
        io.telemetry.published,
        vec![
            Published {
                topic: "parkbay/temperature".into(),
                payload: "25.00".into(),
                retain: true,
            },
            Published {
                topic: "parkbay/humidity".into(),
                payload: "60.00".into(),
                retain: true,
            },
        ]
    );
}

#[test]
fn temperature_just_below_minimum_skips_publish() {
    let (report, io) = tick_with(EnvironmentSample::new(24.9, 60.0));
    assert!(matches!(
        report,
        ReportOutcome::Completed { publish: PublishOutcome::BelowThreshold, .. }
    ));
    assert!(io.telemetry.published.is_empty());
    assert_eq!(io.uploader.urls.len(), 1);
}

#[test]
fn humidity_just_below_minimum_skips_publish() {
    let (report, io) = tick_with(EnvironmentSample::new(25.0, 59.9));
    assert!(!report.published());
    assert!(io.telemetry.published.is_empty());
    assert_eq!(io.uploader.urls.len(), 1);
}

#[test]
fn nan_humidity_aborts_everything() {
    let (report, io) = tick_with(EnvironmentSample::new(30.0, f32::NAN));
    assert_eq!(report, ReportOutcome::InvalidSample);
    assert!(io.telemetry.published.is_empty());
    assert!(io.uploader.urls.is_empty());
}

#[test]
fn upload_query_carries_two_decimals() {
    let (_, io) = tick_with(EnvironmentSample::new(18.456, 41.0));
    assert_eq!(
        io.uploader.urls[0],
        "http://192.168.1.100/parking/update?temperature=18.46&humidity=41.00\
         &gas=0&ir1=Empty&ir2=Empty&ir3=Empty"
    );
}

#[test]
fn rejected_publish_is_absorbed() {
    let mut app = ControlLoop::new(BayConfig::default());
    let mut io = mock_io();
    io.telemetry.reject_publish = true;
    io.hw.environment = EnvironmentSample::new(26.0, 66.0);
    app.start(&mut io);

    let summary = app.tick(&mut io);
    assert!(matches!(
        summary.report,
        ReportOutcome::Completed { publish: PublishOutcome::Failed, upload: UploadOutcome::Accepted, .. }
    ));
    assert_eq!(app.metrics().publish_failures, 1);
}

#[test]
fn transport_error_is_reported_as_failed_upload() {
    let mut app = ControlLoop::new(BayConfig::default());
    let mut io = mock_io();
    io.uploader.response = Err(UploadError::Transport);
    app.start(&mut io);

    let summary = app.tick(&mut io);
    assert!(matches!(
        summary.report,
        ReportOutcome::Completed { upload: UploadOutcome::Failed(UploadError::Transport), .. }
    ));
}

#[test]
fn session_lost_between_readings_reports_partial_publish() {
    let mut app = ControlLoop::new(BayConfig::default());
    let mut io = mock_io();
    io.telemetry.drop_after_publishes = Some(1);
    io.hw.environment = EnvironmentSample::new(27.0, 70.0);
    app.start(&mut io);

    let summary = app.tick(&mut io);

    assert!(matches!(
        summary.report,
        ReportOutcome::Completed { publish: PublishOutcome::Partial, upload: UploadOutcome::Accepted, .. }
    ));
    assert_eq!(io.telemetry.published.len(), 1);
    assert_eq!(io.telemetry.published[0].topic, "parkbay/temperature");
    assert!(io.sink.events.contains(&AppEvent::Diagnostic(Error::Comms(
        CommsError::PublishIncomplete
    ))));
    assert_eq!(app.metrics().publish_failures, 1);
}
