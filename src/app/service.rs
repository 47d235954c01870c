//! Control loop: the hexagonal core.
//!
//! [`ControlLoop`] owns the per-tick policy objects (gas safety, link
//! supervisor, reporter, scheduler, diagnostics).  All I/O flows through
//! the port traits bundled in [`BayIo`], making the whole loop testable
//! with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                  │        ControlLoop        │
//! ActuatorPort ◀── │ link · gas · slots · LCD │ ──▶ DisplayPort
//!                  │        · report           │
//! TelemetryPort ◀─▶└──────────────────────────┘ ──▶ UploadPort
//! ```
//!
//! Order inside one tick is fixed:
//!
//! 1. telemetry link supervision (bounded, per policy)
//! 2. gas sample → fan relay
//! 3. slot scan → indicators → occupancy report
//! 4. display refresh
//! 5. environment report (publish + upload)

use log::info;

use crate::config::BayConfig;
use crate::diagnostics::{Diagnostics, RuntimeMetrics};
use crate::model::{RelayState, TelemetryPayload};
use crate::monitor;
use crate::reporter::EnvironmentReporter;
use crate::safety::GasSafetyController;
use crate::scheduler::{TickScheduler, TickWait};

use super::events::{AppEvent, TickSummary};
use super::link::LinkSupervisor;
use super::ports::{
    ActuatorPort, ClockPort, DisplayPort, EventSink, SensorPort, TelemetryPort, UploadPort,
};

/// Every adapter the control loop talks to.
///
/// `hw` satisfies **both** [`SensorPort`] and [`ActuatorPort`]; the slot
/// scan reads a sensor and drives an indicator in the same pass.
pub struct BayIo<H, T, U, D, C, E> {
    pub hw: H,
    pub telemetry: T,
    pub uploader: U,
    pub display: D,
    pub clock: C,
    pub sink: E,
}

pub struct ControlLoop {
    config: BayConfig,
    safety: GasSafetyController,
    reporter: EnvironmentReporter,
    link: LinkSupervisor,
    scheduler: TickScheduler,
    diagnostics: Diagnostics,
    last_relay: Option<RelayState>,
    tick_count: u64,
}

impl ControlLoop {
    /// Build the loop from a validated configuration.
    ///
    /// Does **not** touch any hardware; call [`start`](Self::start) next.
    pub fn new(config: BayConfig) -> Self {
        Self {
            safety: GasSafetyController::new(&config),
            reporter: EnvironmentReporter::new(&config),
            link: LinkSupervisor::new(&config),
            scheduler: TickScheduler::new(u64::from(config.tick_interval_ms)),
            diagnostics: Diagnostics::new(),
            last_relay: None,
            tick_count: 0,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Force the relay off and make the first link attempt.
    pub fn start<H, T, U, D, C, E>(&mut self, io: &mut BayIo<H, T, U, D, C, E>)
    where
        H: SensorPort + ActuatorPort,
        T: TelemetryPort,
        C: ClockPort,
        E: EventSink,
    {
        io.hw.set_relay(RelayState::Off);
        self.last_relay = Some(RelayState::Off);
        io.sink.emit(&AppEvent::Started { relay: RelayState::Off });
        info!(
            "ControlLoop started: tick={} ms, gas threshold={}",
            self.config.tick_interval_ms,
            self.safety.threshold()
        );
        self.link.ensure(&mut io.telemetry, &mut io.clock, &mut io.sink);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full tick.
    pub fn tick<H, T, U, D, C, E>(&mut self, io: &mut BayIo<H, T, U, D, C, E>) -> TickSummary
    where
        H: SensorPort + ActuatorPort,
        T: TelemetryPort,
        U: UploadPort,
        D: DisplayPort,
        C: ClockPort,
        E: EventSink,
    {
        self.tick_count += 1;
        self.scheduler.begin_tick(io.clock.now_ms());

        // 1. Link supervision
        let link_up = self.link.ensure(&mut io.telemetry, &mut io.clock, &mut io.sink);

        // 2. Gas → relay
        let gas = io.hw.read_gas();
        let relay = self.safety.apply(gas, &mut io.hw);
        if let Some(from) = self.last_relay.filter(|&from| from != relay) {
            io.sink.emit(&AppEvent::RelayChanged { from, to: relay });
        }
        self.last_relay = Some(relay);

        // 3. Slots → indicators → aggregate
        let occupancy = monitor::scan(&mut io.hw);

        // 4. Display
        io.display.show_occupancy(&occupancy);

        // 5. Environment report
        let payload = TelemetryPayload {
            environment: io.hw.read_environment(),
            gas,
            occupancy,
        };
        let report = self.reporter.report(&payload, &mut io.telemetry, &mut io.uploader);
        for e in report.errors() {
            io.sink.emit(&AppEvent::Diagnostic(e));
        }

        let summary = TickSummary {
            tick: self.tick_count,
            gas,
            relay,
            occupancy,
            link_up,
            report,
        };
        self.diagnostics.record_tick(&summary);
        io.sink.emit(&AppEvent::Tick(summary));

        let every = u64::from(self.config.metrics_every_ticks);
        if every > 0 && self.tick_count % every == 0 {
            io.sink.emit(&AppEvent::Metrics(self.metrics()));
        }

        summary
    }

    /// Block until the next tick is due.
    pub fn wait_for_next_tick<H, T, U, D, C, E>(&mut self, io: &mut BayIo<H, T, U, D, C, E>)
    where
        C: ClockPort,
        E: EventSink,
    {
        if let TickWait::Overrun { elapsed_ms } = self.scheduler.wait_next(&mut io.clock) {
            io.sink.emit(&AppEvent::TickOverrun {
                elapsed_ms,
                period_ms: self.scheduler.period_ms(),
            });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &BayConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn metrics(&mut self) -> RuntimeMetrics {
        self.diagnostics.set_reconnect_attempts(self.link.attempts_total());
        self.diagnostics.set_tick_overruns(self.scheduler.overruns());
        self.diagnostics.snapshot()
    }
}
