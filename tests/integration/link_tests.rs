//! Integration tests for telemetry link supervision inside the tick.

use parkbay::app::events::AppEvent;
use parkbay::app::service::ControlLoop;
use parkbay::config::{BayConfig, ReconnectPolicy};
use parkbay::model::{EnvironmentSample, RelayState};

use crate::mock_hw::{HwCall, MockBroker, mock_io};

#[test]
fn degraded_link_recovers_and_publishing_resumes() {
    let mut app = ControlLoop::new(BayConfig::default());
    let mut io = mock_io();
    io.telemetry = MockBroker { accept_after: 3, ..MockBroker::offline() };
    io.hw.environment = EnvironmentSample::new(28.0, 75.0);
    app.start(&mut io); // attempt 1 fails

    assert!(!app.tick(&mut io).link_up); // attempt 2 fails, cooldown 1 follows
    assert!(!app.tick(&mut io).link_up); // cooling down
    let summary = app.tick(&mut io); // attempt 3 succeeds
    assert!(summary.link_up);
    assert!(summary.report.published());

    assert_eq!(io.telemetry.attempts, 3);
    assert_eq!(io.uploader.urls.len(), 3, "uploads continue while the link is down");
    assert!(io.sink.events.contains(&AppEvent::LinkUp { failed_attempts: 2 }));
    assert_eq!(app.metrics().reconnect_attempts, 3);
}

#[test]
fn gas_check_keeps_running_while_link_is_down() {
    let mut app = ControlLoop::new(BayConfig::default());
    let mut io = mock_io();
    io.telemetry = MockBroker::offline();
    app.start(&mut io);

    io.hw.gas = 3000;
    assert_eq!(app.tick(&mut io).relay, RelayState::On);
    io.hw.gas = 0;
    assert_eq!(app.tick(&mut io).relay, RelayState::Off);
}

#[test]
fn blocking_policy_holds_the_tick_until_connected() {
    let config = BayConfig {
        reconnect_policy: ReconnectPolicy::BlockUntilConnected,
        ..BayConfig::default()
    };
    let mut app = ControlLoop::new(config);
    let mut io = mock_io();
    io.telemetry = MockBroker { accept_after: 3, ..MockBroker::offline() };
    app.start(&mut io);

    // start() blocked through two failures before connecting.
    assert_eq!(io.clock.slept, vec![5000, 5000]);
    assert!(io.telemetry.connected);

    io.telemetry.connected = false;
    io.telemetry.accept_after = 5;
    io.hw.calls.clear();
    app.tick(&mut io);

    // attempt 4 failed, attempt 5 connected, then the gas read ran.
    assert_eq!(io.clock.slept, vec![5000, 5000, 5000]);
    assert_eq!(io.hw.calls.first(), Some(&HwCall::ReadGas));
    assert!(io.sink.events.contains(&AppEvent::LinkLost));
}
