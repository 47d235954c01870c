//! Mock adapters for integration tests.
//!
//! Every port call is recorded in order so tests can assert on the full
//! command history without touching GPIO registers or sockets.

use std::cell::Cell;

use parkbay::app::events::AppEvent;
use parkbay::app::ports::{
    ActuatorPort, ClockPort, DisplayPort, EventSink, LinkError, PublishError, SensorPort,
    TelemetryPort, UploadError, UploadPort,
};
use parkbay::app::service::BayIo;
use parkbay::model::{
    EnvironmentSample, GasReading, OccupancyReport, RelayState, SLOT_COUNT, SlotId, SlotState,
};

// ── Hardware call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    ReadGas,
    ReadSlot(SlotId),
    ReadEnvironment,
    SetRelay(RelayState),
    SetIndicator(SlotId, bool),
}

// ── MockBay (SensorPort + ActuatorPort) ───────────────────────

pub struct MockBay {
    pub slots: [SlotState; SLOT_COUNT],
    pub gas: u16,
    pub environment: EnvironmentSample,
    pub calls: Vec<HwCall>,
}

#[allow(dead_code)]
impl MockBay {
    pub fn new() -> Self {
        Self {
            slots: [SlotState::Empty; SLOT_COUNT],
            gas: 0,
            environment: EnvironmentSample::new(22.0, 45.0),
            calls: Vec::new(),
        }
    }

    pub fn relay(&self) -> Option<RelayState> {
        self.calls.iter().rev().find_map(|c| match c {
            HwCall::SetRelay(s) => Some(*s),
            _ => None,
        })
    }

    /// Last commanded level of every indicator, in slot order.
    pub fn indicators(&self) -> [Option<bool>; SLOT_COUNT] {
        let mut out = [None; SLOT_COUNT];
        for call in &self.calls {
            if let HwCall::SetIndicator(slot, lit) = call {
                out[slot.index()] = Some(*lit);
            }
        }
        out
    }

    pub fn position(&self, call: &HwCall) -> Option<usize> {
        self.calls.iter().position(|c| c == call)
    }
}

impl SensorPort for MockBay {
    fn read_slot(&mut self, slot: SlotId) -> SlotState {
        self.calls.push(HwCall::ReadSlot(slot));
        self.slots[slot.index()]
    }

    fn read_gas(&mut self) -> GasReading {
        self.calls.push(HwCall::ReadGas);
        GasReading(self.gas)
    }

    fn read_environment(&mut self) -> EnvironmentSample {
        self.calls.push(HwCall::ReadEnvironment);
        self.environment
    }
}

impl ActuatorPort for MockBay {
    fn set_relay(&mut self, state: RelayState) {
        self.calls.push(HwCall::SetRelay(state));
    }

    fn set_indicator(&mut self, slot: SlotId, lit: bool) {
        self.calls.push(HwCall::SetIndicator(slot, lit));
    }
}

// ── MockBroker (TelemetryPort) ────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

pub struct MockBroker {
    pub connected: bool,
    /// Refuse sessions until this many attempts have been made.
    pub accept_after: u32,
    pub attempts: u32,
    pub reject_publish: bool,
    /// Drop the session once this many messages have gone out.
    pub drop_after_publishes: Option<usize>,
    pub published: Vec<Published>,
}

#[allow(dead_code)]
impl MockBroker {
    pub fn online() -> Self {
        Self {
            connected: true,
            accept_after: 0,
            attempts: 0,
            reject_publish: false,
            drop_after_publishes: None,
            published: Vec::new(),
        }
    }

    pub fn offline() -> Self {
        Self {
            connected: false,
            accept_after: u32::MAX,
            ..Self::online()
        }
    }
}

impl TelemetryPort for MockBroker {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn try_connect(&mut self) -> Result<(), LinkError> {
        self.attempts += 1;
        if self.attempts >= self.accept_after {
            self.connected = true;
            Ok(())
        } else {
            Err(LinkError::Unreachable)
        }
    }

    fn publish(&mut self, topic: &str, payload: &str, retain: bool) -> Result<(), PublishError> {
        if self.drop_after_publishes.is_some_and(|n| self.published.len() >= n) {
            self.connected = false;
        }
        if !self.connected {
            return Err(PublishError::NotConnected);
        }
        if self.reject_publish {
            return Err(PublishError::Rejected);
        }
        self.published.push(Published {
            topic: topic.to_owned(),
            payload: payload.to_owned(),
            retain,
        });
        Ok(())
    }
}

// ── MockCollector (UploadPort) ────────────────────────────────

pub struct MockCollector {
    pub response: Result<u16, UploadError>,
    pub urls: Vec<String>,
}

impl MockCollector {
    pub fn new() -> Self {
        Self {
            response: Ok(200),
            urls: Vec::new(),
        }
    }
}

impl UploadPort for MockCollector {
    fn get(&mut self, url: &str) -> Result<u16, UploadError> {
        self.urls.push(url.to_owned());
        self.response
    }
}

// ── MockDisplay ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockDisplay {
    pub shown: Vec<OccupancyReport>,
}

impl DisplayPort for MockDisplay {
    fn show_occupancy(&mut self, report: &OccupancyReport) {
        self.shown.push(*report);
    }
}

// ── FakeClock ─────────────────────────────────────────────────

/// Clock that advances by `step_ms` on every `now_ms` call and by the
/// requested amount on every sleep.
#[derive(Default)]
pub struct FakeClock {
    pub now: Cell<u64>,
    pub step_ms: u64,
    pub slept: Vec<u64>,
}

impl ClockPort for FakeClock {
    fn now_ms(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + self.step_ms);
        now
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.slept.push(ms);
        self.now.set(self.now.get() + ms);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Bundle ────────────────────────────────────────────────────

pub type MockIo = BayIo<MockBay, MockBroker, MockCollector, MockDisplay, FakeClock, RecordingSink>;

pub fn mock_io() -> MockIo {
    BayIo {
        hw: MockBay::new(),
        telemetry: MockBroker::online(),
        uploader: MockCollector::new(),
        display: MockDisplay::default(),
        clock: FakeClock::default(),
        sink: RecordingSink::default(),
    }
}
