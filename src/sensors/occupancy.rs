//! Slot presence sensor with single-sample debounce.
//!
//! A slot reads Occupied only when the sensor is active on two reads
//! separated by the settle interval.  Reflections or noise shorter than
//! the settle interval read Empty.  Every Occupied determination costs one
//! settle interval of latency.
//!
//! The reader is generic over [`embedded_hal`] pin and delay traits so the
//! same code runs against ESP-IDF GPIO, the host simulation, and test mocks.

use core::convert::Infallible;
use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin};
use log::warn;

use crate::config::ActiveLevel;
use crate::drivers::hw_init;
use crate::model::{SlotId, SlotState};

/// Debounced read of one presence sensor.
///
/// A pin read error counts as "not active" for that sample.
pub fn read_slot<P, D>(pin: &mut P, active: ActiveLevel, settle: Duration, delay: &mut D) -> SlotState
where
    P: InputPin,
    D: DelayNs,
{
    if !is_active(pin, active) {
        return SlotState::Empty;
    }
    delay.delay_us(settle.as_micros().min(u128::from(u32::MAX)) as u32);
    if is_active(pin, active) {
        SlotState::Occupied
    } else {
        SlotState::Empty
    }
}

fn is_active<P: InputPin>(pin: &mut P, active: ActiveLevel) -> bool {
    match pin.is_high() {
        Ok(high) => active.is_active(high),
        Err(e) => {
            warn!("Occupancy: pin read failed ({:?}), treating as inactive", e);
            false
        }
    }
}

/// Raw GPIO input addressed by pin number, backed by `hw_init`.
///
/// On ESP-IDF this reads the configured input register; on the host it
/// reads the simulated GPIO bank.
#[derive(Debug, Clone, Copy)]
pub struct GpioInput {
    gpio: i32,
}

impl GpioInput {
    pub const fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl ErrorType for GpioInput {
    type Error = Infallible;
}

impl InputPin for GpioInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(hw_init::gpio_read(self.gpio))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!hw_init::gpio_read(self.gpio))
    }
}

/// One slot's sensor: its id, input pin, and active level.
pub struct SlotSensor<P> {
    slot: SlotId,
    pin: P,
    active: ActiveLevel,
}

impl<P: InputPin> SlotSensor<P> {
    pub fn new(slot: SlotId, pin: P, active: ActiveLevel) -> Self {
        Self { slot, pin, active }
    }

    pub fn slot(&self) -> SlotId {
        self.slot
    }

    pub fn read(&mut self, settle: Duration, delay: &mut impl DelayNs) -> SlotState {
        read_slot(&mut self.pin, self.active, settle, delay)
    }
}
