//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, telemetry, upload, display, clock,
//! event sinks) implement these traits.  The
//! [`ControlLoop`](super::service::ControlLoop) consumes them via generics,
//! so the domain core never touches hardware or sockets directly.

use core::fmt;

use crate::model::{EnvironmentSample, GasReading, OccupancyReport, RelayState, SlotId, SlotState};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Debounced presence read for one slot.
    fn read_slot(&mut self, slot: SlotId) -> SlotState;

    /// One raw gas sample.
    fn read_gas(&mut self) -> GasReading;

    /// Latest temperature / humidity pair.  Fields may be NaN.
    fn read_environment(&mut self) -> EnvironmentSample;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Drive the exhaust-fan relay.
    fn set_relay(&mut self, state: RelayState);

    /// Light (available) or dim (occupied) one slot's indicator.
    fn set_indicator(&mut self, slot: SlotId, lit: bool);
}

// ───────────────────────────────────────────────────────────────
// Display port (collaborator: rendering primitives live outside)
// ───────────────────────────────────────────────────────────────

pub trait DisplayPort {
    /// Present the tick's occupancy summary.
    fn show_occupancy(&mut self, report: &OccupancyReport);
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (collaborator: MQTT session lives outside)
// ───────────────────────────────────────────────────────────────

/// Publish/subscribe channel.
///
/// `try_connect` must make **one** bounded attempt and return; any
/// retry policy belongs to the caller.
pub trait TelemetryPort {
    fn is_connected(&self) -> bool;

    fn try_connect(&mut self) -> Result<(), LinkError>;

    fn publish(&mut self, topic: &str, payload: &str, retain: bool) -> Result<(), PublishError>;
}

// ───────────────────────────────────────────────────────────────
// Upload port (collaborator: HTTP transport lives outside)
// ───────────────────────────────────────────────────────────────

/// HTTP status code meaning the collector accepted the upload.
pub const HTTP_OK: u16 = 200;

pub trait UploadPort {
    /// Issue one GET to `url` and return the response status code.
    fn get(&mut self, url: &str) -> Result<u16, UploadError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: monotonic time + blocking wait)
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Milliseconds since boot (monotonic).
    fn now_ms(&self) -> u64;

    /// Block the control loop for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u64);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`TelemetryPort::try_connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// Broker did not accept the session this attempt.
    Unreachable,
    /// Client could not be created (bad URL, out of memory).
    ClientInit,
}

/// Errors from [`TelemetryPort::publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    NotConnected,
    Rejected,
}

/// Errors from [`UploadPort::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadError {
    /// Request URL did not fit the fixed buffer.
    UrlTooLong,
    /// Connection, send, or response read failed.
    Transport,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => write!(f, "broker unreachable"),
            Self::ClientInit => write!(f, "client init failed"),
        }
    }
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::Rejected => write!(f, "publish rejected"),
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UrlTooLong => write!(f, "URL too long"),
            Self::Transport => write!(f, "transport error"),
        }
    }
}
