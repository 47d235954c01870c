//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod hw_init;
pub mod indicator;
pub mod relay;
pub mod watchdog;
