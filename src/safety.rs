//! Gas safety controller.
//!
//! Runs **first** in every tick, before any slot read or network work,
//! so the exhaust fan reacts to the current gas sample even when the
//! telemetry link is down or the climate sensor is failing.
//!
//! The rule is a single threshold with no hysteresis and no latching:
//! each tick's relay command depends only on that tick's sample.
//!
//! ```text
//!   sample > threshold  ──▶ RelayState::On
//!   sample ≤ threshold  ──▶ RelayState::Off
//! ```

use crate::app::ports::ActuatorPort;
use crate::config::BayConfig;
use crate::model::{GasReading, RelayState};

/// Relay command for one gas sample against `threshold`.
pub const fn relay_for(sample: GasReading, threshold: u16) -> RelayState {
    if sample.raw() > threshold { RelayState::On } else { RelayState::Off }
}

/// Gas-to-relay controller.
pub struct GasSafetyController {
    threshold: u16,
}

impl GasSafetyController {
    pub fn new(config: &BayConfig) -> Self {
        Self {
            threshold: config.gas_threshold,
        }
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Pure decision for one sample.
    pub fn evaluate(&self, sample: GasReading) -> RelayState {
        relay_for(sample, self.threshold)
    }

    /// Decide and drive the relay.  Returns the command that was applied.
    pub fn apply(&self, sample: GasReading, hw: &mut impl ActuatorPort) -> RelayState {
        let state = self.evaluate(sample);
        hw.set_relay(state);
        state
    }
}
