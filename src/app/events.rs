//! Outbound application events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log today).

use crate::diagnostics::RuntimeMetrics;
use crate::error::Error;
use crate::model::{GasReading, OccupancyReport, RelayState};
use crate::reporter::ReportOutcome;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The control loop has started; the relay has been forced to this state.
    Started { relay: RelayState },

    /// One tick completed.
    Tick(TickSummary),

    /// The relay command differs from the previous tick's.
    RelayChanged { from: RelayState, to: RelayState },

    /// A reporting step failed in a way the tick absorbed.
    Diagnostic(Error),

    /// The telemetry link was up last tick and is gone now.
    LinkLost,

    /// A reconnect round failed.  The next attempt is `retry_in_ticks` away.
    LinkDown { consecutive_failures: u32, retry_in_ticks: u32 },

    /// The telemetry link (re)connected after `failed_attempts` single
    /// connect attempts failed, whatever the policy.
    LinkUp { failed_attempts: u32 },

    /// The tick body ran longer than the period; the next tick starts late.
    TickOverrun { elapsed_ms: u64, period_ms: u64 },

    /// Periodic counters snapshot.
    Metrics(RuntimeMetrics),
}

/// Everything one tick produced.  Also the return value of
/// [`ControlLoop::tick`](super::service::ControlLoop::tick).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummary {
    /// 1-based tick counter.
    pub tick: u64,
    pub gas: GasReading,
    pub relay: RelayState,
    pub occupancy: OccupancyReport,
    /// Telemetry link state after the reconnect step.
    pub link_up: bool,
    pub report: ReportOutcome,
}
