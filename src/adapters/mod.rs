//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                 |
//! |------------|--------------------|-----------------------------|
//! | `hardware` | SensorPort         | ESP32 ADC, GPIO             |
//! |            | ActuatorPort       | ESP32 GPIO                  |
//! | `mqtt`     | TelemetryPort      | ESP-IDF MQTT client         |
//! | `http`     | UploadPort         | ESP-IDF HTTP client         |
//! | `display`  | DisplayPort        | 16x2 character LCD          |
//! | `log_sink` | EventSink          | Serial log output           |
//! | `time`     | ClockPort, DelayNs | ESP32 system timer          |
//! | `wifi`     | ConnectivityPort   | ESP-IDF WiFi STA            |

pub mod display;
pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub(super) mod utils;
pub mod wifi;
