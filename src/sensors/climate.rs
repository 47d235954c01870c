//! Temperature / humidity sensor hand-off.
//!
//! The single-wire sensor driver (bit timing, checksum, unit conversion)
//! runs outside the control loop.  It posts each decoded reading (or NaN
//! for a field it could not decode) through [`set_climate_from_driver`].
//! The control loop takes the latest pair once per tick.
//!
//! Lock-free: both fields are stored as `f32` bit patterns in atomics, so
//! the driver may post from any task.

use core::sync::atomic::{AtomicU32, Ordering};

use log::info;

use crate::model::EnvironmentSample;

/// Bit pattern of the canonical `f32::NAN`: "no reading yet".
const NAN_BITS: u32 = 0x7FC0_0000;

static TEMPERATURE_BITS: AtomicU32 = AtomicU32::new(NAN_BITS);
static HUMIDITY_BITS: AtomicU32 = AtomicU32::new(NAN_BITS);

/// Post the driver's latest decoded reading.  Pass `f32::NAN` for a field
/// the driver failed to produce.
pub fn set_climate_from_driver(temperature_c: f32, humidity_pct: f32) {
    TEMPERATURE_BITS.store(temperature_c.to_bits(), Ordering::Release);
    HUMIDITY_BITS.store(humidity_pct.to_bits(), Ordering::Release);
}

/// Control-loop side of the hand-off.
pub struct ClimateSensor;

impl ClimateSensor {
    /// `data_gpio` is owned by the external driver; it is only logged here.
    pub fn new(data_gpio: i32) -> Self {
        info!("Climate: readings posted by driver on GPIO {}", data_gpio);
        Self
    }

    /// Latest posted pair.  Either field may be NaN.
    pub fn read(&self) -> EnvironmentSample {
        EnvironmentSample {
            temperature_c: f32::from_bits(TEMPERATURE_BITS.load(Ordering::Acquire)),
            humidity_pct: f32::from_bits(HUMIDITY_BITS.load(Ordering::Acquire)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posted_reading_is_visible_to_control_loop() {
        assert!(f32::from_bits(NAN_BITS).is_nan());
        let sensor = ClimateSensor::new(15);
        set_climate_from_driver(26.5, 61.0);
        let s = sensor.read();
        assert!((s.temperature_c - 26.5).abs() < f32::EPSILON);
        assert!((s.humidity_pct - 61.0).abs() < f32::EPSILON);
        set_climate_from_driver(f32::NAN, 61.0);
        assert!(!sensor.read().is_valid());
    }
}
