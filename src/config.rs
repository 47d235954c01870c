//! System configuration parameters
//!
//! All tunable parameters for the ParkBay controller, built once at startup
//! and handed to every component by reference.  Nothing reads or writes
//! configuration after [`ControlLoop::new`](crate::app::service::ControlLoop::new).

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::SLOT_COUNT;
use crate::pins;

/// Longest status-upload base URL + path accepted by [`BayConfig::validate`].
/// Leaves room for the query string inside the fixed upload buffer.
pub const MAX_UPLOAD_PREFIX_LEN: usize = 160;

/// How long one telemetry connect attempt may wait for the session.
pub const LINK_ATTEMPT_WAIT_MS: u32 = 1000;

/// Electrical level that means "asserted" on a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveLevel {
    High,
    Low,
}

impl ActiveLevel {
    /// Interpret a raw input level.
    pub const fn is_active(self, high: bool) -> bool {
        match self {
            Self::High => high,
            Self::Low => !high,
        }
    }

    /// Raw output level that asserts (`on = true`) or releases the line.
    pub const fn output_level(self, on: bool) -> bool {
        match self {
            Self::High => on,
            Self::Low => !on,
        }
    }
}

/// Wiring of one parking position: its presence sensor and indicator LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotConfig {
    pub sensor_gpio: i32,
    pub indicator_gpio: i32,
}

/// What the control loop does while the telemetry broker is unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconnectPolicy {
    /// Bounded attempts per tick with backoff; ticks keep running and
    /// publishing is skipped until the link returns.
    Degrade,
    /// Retry until connected before any further tick logic runs.
    BlockUntilConnected,
}

/// Network identifiers: Wi-Fi, MQTT broker, topics, upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub wifi_ssid: String,
    pub wifi_password: String,
    /// Broker URL, e.g. `mqtt://broker.local:1883`.
    pub mqtt_url: String,
    pub mqtt_client_id: String,
    pub topic_temperature: String,
    pub topic_humidity: String,
    /// Collection endpoint, e.g. `http://collector.local`.
    pub upload_base_url: String,
    /// Path appended to the base, e.g. `/parking/status`.
    pub upload_path: String,
    /// HTTP request timeout (milliseconds).
    pub upload_timeout_ms: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: String::from("ParkBay"),
            wifi_password: String::new(),
            mqtt_url: String::from("mqtt://broker.hivemq.com:1883"),
            mqtt_client_id: String::from("parkbay-controller"),
            topic_temperature: String::from("parkbay/temperature"),
            topic_humidity: String::from("parkbay/humidity"),
            upload_base_url: String::from("http://192.168.1.100"),
            upload_path: String::from("/parking/update"),
            upload_timeout_ms: 5000,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BayConfig {
    // --- Slots ---
    /// One record per parking position, in physical order.
    pub slots: [SlotConfig; SLOT_COUNT],
    /// Level the presence sensors drive when a vehicle is detected.
    pub sensor_active: ActiveLevel,
    /// Level that lights an indicator LED.
    pub indicator_active: ActiveLevel,

    // --- Gas / fan ---
    pub gas_adc_gpio: i32,
    /// Raw ADC counts above which the fan relay closes.
    pub gas_threshold: u16,
    pub relay_gpio: i32,
    pub relay_active: ActiveLevel,

    // --- Environment ---
    pub climate_gpio: i32,
    /// Publish only at or above this temperature (°C) ...
    pub publish_min_temperature_c: f32,
    /// ... and at or above this relative humidity (%).
    pub publish_min_humidity_pct: f32,

    // --- Timing ---
    /// Debounce settle interval between the two presence reads (milliseconds).
    pub settle_interval_ms: u32,
    /// Control loop period (milliseconds).
    pub tick_interval_ms: u32,

    // --- Telemetry link ---
    pub reconnect_policy: ReconnectPolicy,
    /// Connect attempts allowed inside one tick (Degrade policy).
    pub reconnect_attempts_per_tick: u8,
    /// Upper bound on ticks skipped between failed reconnect rounds.
    pub reconnect_backoff_max_ticks: u32,
    /// Wait between attempts under `BlockUntilConnected` (milliseconds).
    pub reconnect_retry_ms: u32,

    // --- Diagnostics ---
    /// Emit a metrics snapshot every N ticks (0 = never).
    pub metrics_every_ticks: u32,

    pub network: NetworkConfig,
}

impl Default for BayConfig {
    fn default() -> Self {
        Self {
            // Slots
            slots: [
                SlotConfig {
                    sensor_gpio: pins::SLOT_1_SENSOR_GPIO,
                    indicator_gpio: pins::SLOT_1_INDICATOR_GPIO,
                },
                SlotConfig {
                    sensor_gpio: pins::SLOT_2_SENSOR_GPIO,
                    indicator_gpio: pins::SLOT_2_INDICATOR_GPIO,
                },
                SlotConfig {
                    sensor_gpio: pins::SLOT_3_SENSOR_GPIO,
                    indicator_gpio: pins::SLOT_3_INDICATOR_GPIO,
                },
            ],
            sensor_active: ActiveLevel::Low,
            indicator_active: ActiveLevel::High,

            // Gas / fan
            gas_adc_gpio: pins::GAS_ADC_GPIO,
            gas_threshold: 1000,
            relay_gpio: pins::FAN_RELAY_GPIO,
            relay_active: ActiveLevel::High,

            // Environment
            climate_gpio: pins::CLIMATE_DATA_GPIO,
            publish_min_temperature_c: 25.0,
            publish_min_humidity_pct: 60.0,

            // Timing
            settle_interval_ms: 50,
            tick_interval_ms: 2000,

            // Link
            reconnect_policy: ReconnectPolicy::Degrade,
            reconnect_attempts_per_tick: 1,
            reconnect_backoff_max_ticks: 30, // ~1 min at 2 s ticks
            reconnect_retry_ms: 5000,

            metrics_every_ticks: 30,

            network: NetworkConfig::default(),
        }
    }
}

/// Errors from configuration loading / validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The JSON document did not parse into a [`BayConfig`].
    Malformed,
    /// A field failed range validation.  The string names the field.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Malformed => write!(f, "config JSON malformed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl BayConfig {
    /// Parse a (possibly partial) JSON document over the defaults and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            log::warn!("config: JSON parse error: {}", e);
            ConfigError::Malformed
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.settle_interval_ms))
    }

    /// Longest one loop iteration can take when every bounded wait runs to
    /// its limit: the period, every settle delay, a full Degrade reconnect
    /// round and an upload timeout.  `BlockUntilConnected` is unbounded.
    pub fn worst_case_tick_ms(&self) -> u32 {
        let settle = self.settle_interval_ms.saturating_mul(SLOT_COUNT as u32);
        let link = u32::from(self.reconnect_attempts_per_tick).saturating_mul(LINK_ATTEMPT_WAIT_MS);
        self.tick_interval_ms
            .saturating_add(settle)
            .saturating_add(link)
            .saturating_add(self.network.upload_timeout_ms)
    }

    /// Reject values the control loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_interval_ms must be > 0"));
        }
        if self.settle_interval_ms >= self.tick_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "settle_interval_ms must be shorter than tick_interval_ms",
            ));
        }
        if !self.publish_min_temperature_c.is_finite() || !self.publish_min_humidity_pct.is_finite() {
            return Err(ConfigError::ValidationFailed("publish thresholds must be finite"));
        }
        if self.reconnect_attempts_per_tick == 0 {
            return Err(ConfigError::ValidationFailed("reconnect_attempts_per_tick must be > 0"));
        }
        if pins::adc1_channel(self.gas_adc_gpio).is_none() {
            return Err(ConfigError::ValidationFailed("gas_adc_gpio has no ADC1 channel"));
        }
        if self.network.topic_temperature.is_empty() || self.network.topic_humidity.is_empty() {
            return Err(ConfigError::ValidationFailed("telemetry topics must not be empty"));
        }
        if self.network.upload_base_url.is_empty() {
            return Err(ConfigError::ValidationFailed("upload_base_url must not be empty"));
        }
        if self.network.upload_base_url.len() + self.network.upload_path.len() > MAX_UPLOAD_PREFIX_LEN {
            return Err(ConfigError::ValidationFailed("upload URL too long"));
        }

        let mut used = heapless::Vec::<i32, { 2 * SLOT_COUNT + 3 }>::new();
        let all_pins = self
            .slots
            .iter()
            .flat_map(|s| [s.sensor_gpio, s.indicator_gpio])
            .chain([self.gas_adc_gpio, self.relay_gpio, self.climate_gpio]);
        for pin in all_pins {
            if !(0..=pins::MAX_GPIO).contains(&pin) {
                return Err(ConfigError::ValidationFailed("GPIO number out of range"));
            }
            if used.contains(&pin) {
                return Err(ConfigError::ValidationFailed("GPIO assigned twice"));
            }
            // Capacity equals the pin count, so push cannot fail.
            let _ = used.push(pin);
        }
        Ok(())
    }
}
