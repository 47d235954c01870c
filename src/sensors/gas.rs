//! MQ-series gas sensor driver.
//!
//! Reads the analog output through an ADC1 channel and returns raw counts.
//! No calibration or unit conversion: the safety threshold is expressed in
//! the same raw counts.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the oneshot ADC channel configured by hw_init.
//! On host/test: reads the simulated ADC (`hw_init::sim_set_gas_adc`).

use log::warn;

use crate::drivers::hw_init;
use crate::model::GasReading;

pub struct GasSensor {
    adc_channel: u32,
    last: GasReading,
}

impl GasSensor {
    pub fn new(adc_channel: u32) -> Self {
        Self {
            adc_channel,
            last: GasReading::default(),
        }
    }

    /// Take one sample.
    ///
    /// A failed conversion returns the previous good sample so one glitch
    /// neither trips nor releases the fan on its own.
    pub fn read(&mut self) -> GasReading {
        match hw_init::adc1_read(self.adc_channel) {
            Some(raw) => {
                self.last = GasReading(raw);
            }
            None => {
                warn!("Gas: ADC1 CH{} read failed, reusing {}", self.adc_channel, self.last);
            }
        }
        self.last
    }
}
