//! Application layer: port traits, outbound events, link supervision,
//! and the [`ControlLoop`](service::ControlLoop) that ties them together.

pub mod events;
pub mod link;
pub mod ports;
pub mod service;
