//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver plus the delay provider used for the
//! presence-sensor settle interval.

pub mod climate;
pub mod gas;
pub mod occupancy;

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

use crate::model::{EnvironmentSample, GasReading, SLOT_COUNT, SlotId, SlotState};
use climate::ClimateSensor;
use gas::GasSensor;
use occupancy::SlotSensor;

/// Aggregates all sensor drivers.
pub struct SensorHub<P, D> {
    slots: [SlotSensor<P>; SLOT_COUNT],
    pub gas: GasSensor,
    pub climate: ClimateSensor,
    delay: D,
    settle: Duration,
}

impl<P: InputPin, D: DelayNs> SensorHub<P, D> {
    /// Construct a new hub.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(
        slots: [SlotSensor<P>; SLOT_COUNT],
        gas: GasSensor,
        climate: ClimateSensor,
        delay: D,
        settle: Duration,
    ) -> Self {
        Self {
            slots,
            gas,
            climate,
            delay,
            settle,
        }
    }

    /// Debounced presence read.  Blocks for the settle interval when the
    /// first sample is active.
    pub fn read_slot(&mut self, slot: SlotId) -> SlotState {
        let sensor = &mut self.slots[slot.index()];
        debug_assert_eq!(sensor.slot(), slot);
        sensor.read(self.settle, &mut self.delay)
    }

    pub fn read_gas(&mut self) -> GasReading {
        self.gas.read()
    }

    pub fn read_environment(&self) -> EnvironmentSample {
        self.climate.read()
    }
}
