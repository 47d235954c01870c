//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and all actuator drivers, exposing them
//! through [`SensorPort`] and [`ActuatorPort`].  This is the only
//! module in the system that touches actual hardware.  On non-espidf
//! targets, the underlying drivers use cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::config::BayConfig;
use crate::drivers::indicator::SlotIndicator;
use crate::drivers::relay::FanRelay;
use crate::error::{Error, Result};
use crate::model::{EnvironmentSample, GasReading, RelayState, SlotId, SlotState};
use crate::pins;
use crate::sensors::SensorHub;
use crate::sensors::climate::ClimateSensor;
use crate::sensors::gas::GasSensor;
use crate::sensors::occupancy::{GpioInput, SlotSensor};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P, D> {
    sensor_hub: SensorHub<P, D>,
    relay: FanRelay,
    indicators: [SlotIndicator; 3],
}

impl<P: InputPin, D: DelayNs> HardwareAdapter<P, D> {
    pub fn new(sensor_hub: SensorHub<P, D>, relay: FanRelay, indicators: [SlotIndicator; 3]) -> Self {
        Self {
            sensor_hub,
            relay,
            indicators,
        }
    }

    pub fn relay_state(&self) -> RelayState {
        self.relay.state()
    }

    pub fn indicator_lit(&self, slot: SlotId) -> bool {
        self.indicators[slot.index()].is_lit()
    }
}

impl<D: DelayNs> HardwareAdapter<GpioInput, D> {
    /// Wire every driver from the configured pin map.  The relay is
    /// released as part of construction.
    pub fn from_config(config: &BayConfig, delay: D) -> Result<Self> {
        let adc_channel = pins::adc1_channel(config.gas_adc_gpio)
            .ok_or(Error::Config("gas_adc_gpio has no ADC1 channel"))?;

        let slots = SlotId::ALL.map(|slot| {
            let wiring = config.slots[slot.index()];
            SlotSensor::new(slot, GpioInput::new(wiring.sensor_gpio), config.sensor_active)
        });
        let indicators = config
            .slots
            .map(|wiring| SlotIndicator::new(wiring.indicator_gpio, config.indicator_active));

        let hub = SensorHub::new(
            slots,
            GasSensor::new(adc_channel),
            ClimateSensor::new(config.climate_gpio),
            delay,
            config.settle_interval(),
        );
        let relay = FanRelay::new(config.relay_gpio, config.relay_active);

        Ok(Self::new(hub, relay, indicators))
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P: InputPin, D: DelayNs> SensorPort for HardwareAdapter<P, D> {
    fn read_slot(&mut self, slot: SlotId) -> SlotState {
        self.sensor_hub.read_slot(slot)
    }

    fn read_gas(&mut self) -> GasReading {
        self.sensor_hub.read_gas()
    }

    fn read_environment(&mut self) -> EnvironmentSample {
        self.sensor_hub.read_environment()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<P: InputPin, D: DelayNs> ActuatorPort for HardwareAdapter<P, D> {
    fn set_relay(&mut self, state: RelayState) {
        self.relay.set(state);
    }

    fn set_indicator(&mut self, slot: SlotId, lit: bool) {
        self.indicators[slot.index()].set_lit(lit);
    }
}
