//! ParkBay controller library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod monitor;
pub mod pins;
pub mod reporter;
pub mod safety;
pub mod scheduler;

// Hardware-facing modules compile on the host against cfg-gated
// simulation stubs inside each file.
pub mod adapters;
pub mod drivers;
pub mod sensors;
