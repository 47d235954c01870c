//! Per-slot indicator LED driver.
//!
//! Lit = slot available.  One digital output per slot.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real GPIO via hw_init.
//! On host/test: writes the simulated GPIO bank.

use log::warn;

use crate::config::ActiveLevel;
use crate::drivers::hw_init;

pub struct SlotIndicator {
    gpio: i32,
    active: ActiveLevel,
    lit: bool,
}

impl SlotIndicator {
    pub fn new(gpio: i32, active: ActiveLevel) -> Self {
        Self {
            gpio,
            active,
            lit: false,
        }
    }

    pub fn set_lit(&mut self, lit: bool) {
        if let Err(e) = hw_init::gpio_write(self.gpio, self.active.output_level(lit)) {
            warn!("Indicator: GPIO {} write failed: {}", self.gpio, e);
        }
        self.lit = lit;
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
