//! Integration tests for the ControlLoop tick pipeline:
//! link → gas/relay → slots/indicators → display → report.

use parkbay::app::events::AppEvent;
use parkbay::app::service::ControlLoop;
use parkbay::config::BayConfig;
use parkbay::error::{CommsError, Error};
use parkbay::model::{EnvironmentSample, RelayState, SlotId, SlotState};
use parkbay::reporter::{PublishOutcome, ReportOutcome, UploadOutcome};

use crate::mock_hw::{HwCall, MockIo, mock_io};

fn started() -> (ControlLoop, MockIo) {
    let mut app = ControlLoop::new(BayConfig::default());
    let mut io = mock_io();
    app.start(&mut io);
    (app, io)
}

#[test]
fn start_forces_relay_off() {
    let (_app, io) = started();
    assert_eq!(io.hw.calls.first(), Some(&HwCall::SetRelay(RelayState::Off)));
    assert_eq!(io.sink.events[0], AppEvent::Started { relay: RelayState::Off });
}

#[test]
fn occupied_free_occupied_with_high_gas() {
    let (mut app, mut io) = started();
    io.hw.slots = [SlotState::Occupied, SlotState::Empty, SlotState::Occupied];
    io.hw.gas = 1200;
    io.hw.environment = EnvironmentSample::new(26.0, 65.0);

    let summary = app.tick(&mut io);

    assert_eq!(summary.relay, RelayState::On);
    assert_eq!(io.hw.relay(), Some(RelayState::On));
    assert_eq!(summary.occupancy.available_count(), 1);
    assert_eq!(io.hw.indicators(), [Some(false), Some(true), Some(false)]);
    assert_eq!(io.display.shown.len(), 1);
    assert_eq!(io.display.shown[0].available_count(), 1);

    assert_eq!(io.uploader.urls.len(), 1);
    let url = &io.uploader.urls[0];
    assert!(url.contains("gas=1200"), "{url}");
    assert!(url.contains("ir1=Occupied"), "{url}");
    assert!(url.contains("ir2=Empty"), "{url}");
    assert!(url.contains("ir3=Occupied"), "{url}");
    assert!(summary.report.published());
}

#[test]
fn gas_and_relay_run_before_slot_reads() {
    let (mut app, mut io) = started();
    io.hw.calls.clear();
    io.hw.gas = 4000;

    app.tick(&mut io);

    let gas = io.hw.position(&HwCall::ReadGas).unwrap();
    let relay = io.hw.position(&HwCall::SetRelay(RelayState::On)).unwrap();
    let first_slot = io.hw.position(&HwCall::ReadSlot(SlotId::ALL[0])).unwrap();
    let env = io.hw.position(&HwCall::ReadEnvironment).unwrap();
    assert!(gas < relay && relay < first_slot && first_slot < env);
}

#[test]
fn slots_are_scanned_in_physical_order() {
    let (mut app, mut io) = started();
    io.hw.calls.clear();
    app.tick(&mut io);

    let reads: Vec<SlotId> = io
        .hw
        .calls
        .iter()
        .filter_map(|c| match c {
            HwCall::ReadSlot(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(reads, SlotId::ALL.to_vec());
}

#[test]
fn threshold_sample_keeps_relay_off() {
    let (mut app, mut io) = started();
    io.hw.gas = 1000;
    assert_eq!(app.tick(&mut io).relay, RelayState::Off);
    io.hw.gas = 1001;
    assert_eq!(app.tick(&mut io).relay, RelayState::On);
}

#[test]
fn relay_change_is_reported_once() {
    let (mut app, mut io) = started();
    io.hw.gas = 2000;
    app.tick(&mut io);
    app.tick(&mut io);
    io.hw.gas = 10;
    app.tick(&mut io);

    let changes: Vec<&AppEvent> = io
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::RelayChanged { .. }))
        .collect();
    assert_eq!(
        changes,
        vec![
            &AppEvent::RelayChanged { from: RelayState::Off, to: RelayState::On },
            &AppEvent::RelayChanged { from: RelayState::On, to: RelayState::Off },
        ]
    );
}

#[test]
fn identical_inputs_give_identical_ticks() {
    let (mut app, mut io) = started();
    io.hw.slots = [SlotState::Empty, SlotState::Occupied, SlotState::Empty];
    io.hw.gas = 700;
    io.hw.environment = EnvironmentSample::new(27.5, 70.25);

    let first = app.tick(&mut io);
    let second = app.tick(&mut io);

    assert_eq!(first.relay, second.relay);
    assert_eq!(first.occupancy, second.occupancy);
    assert_eq!(first.report, second.report);
    assert_eq!(io.uploader.urls[0], io.uploader.urls[1]);
    assert_eq!(io.telemetry.published[0..2], io.telemetry.published[2..4]);
    assert_eq!(second.tick, first.tick + 1);
}

#[test]
fn nan_sample_still_drives_relay_and_indicators() {
    let (mut app, mut io) = started();
    io.hw.gas = 1500;
    io.hw.slots = [SlotState::Occupied; 3];
    io.hw.environment = EnvironmentSample::new(f32::NAN, 55.0);

    let summary = app.tick(&mut io);

    assert_eq!(summary.report, ReportOutcome::InvalidSample);
    assert_eq!(summary.relay, RelayState::On);
    assert_eq!(io.hw.indicators(), [Some(false); 3]);
    assert!(io.telemetry.published.is_empty());
    assert!(io.uploader.urls.is_empty());
    assert_eq!(io.sink.count(|e| matches!(e, AppEvent::Diagnostic(_))), 1);
}

#[test]
fn upload_failure_does_not_stop_the_loop() {
    let (mut app, mut io) = started();
    io.uploader.response = Ok(500);

    let first = app.tick(&mut io);
    let second = app.tick(&mut io);

    assert!(matches!(
        first.report,
        ReportOutcome::Completed { upload: UploadOutcome::Rejected(500), .. }
    ));
    assert_eq!(second.tick, 2);
    assert_eq!(io.sink.count(|e| matches!(e, AppEvent::Diagnostic(_))), 2);
    assert_eq!(app.metrics().upload_failures, 2);
}

#[test]
fn broker_down_skips_publish_but_uploads() {
    let mut app = ControlLoop::new(BayConfig::default());
    let mut io = mock_io();
    io.telemetry = crate::mock_hw::MockBroker::offline();
    io.hw.environment = EnvironmentSample::new(30.0, 80.0);
    app.start(&mut io);

    let summary = app.tick(&mut io);

    assert!(!summary.link_up);
    assert!(matches!(
        summary.report,
        ReportOutcome::Completed { publish: PublishOutcome::Unavailable, upload: UploadOutcome::Accepted, .. }
    ));
    assert_eq!(io.uploader.urls.len(), 1);
    assert!(io.telemetry.published.is_empty());
    assert!(io.clock.slept.is_empty(), "degraded link must not block the tick");
}

#[test]
fn overrun_is_reported_and_not_slept() {
    let (mut app, mut io) = started();
    io.clock.step_ms = 2500;

    app.tick(&mut io);
    app.wait_for_next_tick(&mut io);

    assert!(io.clock.slept.is_empty());
    assert!(io.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::TickOverrun { elapsed_ms: 2500, period_ms: 2000 }
    )));
    assert_eq!(app.metrics().tick_overruns, 1);
}

#[test]
fn wait_sleeps_remaining_period() {
    let (mut app, mut io) = started();
    io.clock.step_ms = 300;

    app.tick(&mut io);
    app.wait_for_next_tick(&mut io);

    assert_eq!(io.clock.slept, vec![1700]);
}

#[test]
fn metrics_snapshot_emitted_on_schedule() {
    let config = BayConfig {
        metrics_every_ticks: 3,
        ..BayConfig::default()
    };
    let mut app = ControlLoop::new(config);
    let mut io = mock_io();
    app.start(&mut io);

    for _ in 0..7 {
        app.tick(&mut io);
    }

    let snapshots: Vec<u64> = io
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Metrics(m) => Some(m.ticks),
            _ => None,
        })
        .collect();
    assert_eq!(snapshots, vec![3, 6]);
}

#[test]
fn each_failed_report_step_emits_its_own_diagnostic() {
    let mut app = ControlLoop::new(BayConfig::default());
    let mut io = mock_io();
    io.telemetry = crate::mock_hw::MockBroker::offline();
    io.uploader.response = Ok(503);
    io.hw.environment = EnvironmentSample::new(30.0, 80.0);
    app.start(&mut io);
    io.sink.events.clear();

    app.tick(&mut io);

    let diagnostics: Vec<Error> = io
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Diagnostic(err) => Some(*err),
            _ => None,
        })
        .collect();
    assert_eq!(
        diagnostics,
        vec![
            Error::Comms(CommsError::TelemetryUnavailable),
            Error::Comms(CommsError::UploadRejected(503)),
        ]
    );
}
