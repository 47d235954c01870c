//! Exhaust-fan relay driver.
//!
//! One digital output drives the relay coil (through a transistor stage).
//! The driver is a dumb actuator: the gas safety controller decides, this
//! module only translates [`RelayState`] into a pin level.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real GPIO via hw_init.
//! On host/test: writes the simulated GPIO bank.

use log::warn;

use crate::config::ActiveLevel;
use crate::drivers::hw_init;
use crate::model::RelayState;

pub struct FanRelay {
    gpio: i32,
    active: ActiveLevel,
    state: RelayState,
}

impl FanRelay {
    /// Build the driver and immediately release the relay.
    pub fn new(gpio: i32, active: ActiveLevel) -> Self {
        let mut relay = Self {
            gpio,
            active,
            state: RelayState::Off,
        };
        relay.write_hw(RelayState::Off);
        relay
    }

    pub fn set(&mut self, state: RelayState) {
        self.write_hw(state);
        self.state = state;
    }

    pub fn off(&mut self) {
        self.set(RelayState::Off);
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    fn write_hw(&self, state: RelayState) {
        let level = self.active.output_level(state.is_on());
        if let Err(e) = hw_init::gpio_write(self.gpio, level) {
            warn!("Fan relay: GPIO {} write failed: {}", self.gpio, e);
        }
    }
}
