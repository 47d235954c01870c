//! GPIO / peripheral pin assignments for the ParkBay controller board.
//!
//! Single source of truth: the default [`BayConfig`](crate::config::BayConfig)
//! and `hw_init` reference this module rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Slot presence sensors (IR obstacle modules, LOW = object detected)
// ---------------------------------------------------------------------------

pub const SLOT_1_SENSOR_GPIO: i32 = 32;
pub const SLOT_2_SENSOR_GPIO: i32 = 33;
pub const SLOT_3_SENSOR_GPIO: i32 = 25;

// ---------------------------------------------------------------------------
// Slot indicator LEDs (lit = slot available)
// ---------------------------------------------------------------------------

pub const SLOT_1_INDICATOR_GPIO: i32 = 26;
pub const SLOT_2_INDICATOR_GPIO: i32 = 27;
pub const SLOT_3_INDICATOR_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// Gas sensing and exhaust fan
// ---------------------------------------------------------------------------

/// MQ-series gas sensor analog output.  ADC1 channel 6 (GPIO 34, input-only).
pub const GAS_ADC_GPIO: i32 = 34;

/// Exhaust-fan relay coil driver.
pub const FAN_RELAY_GPIO: i32 = 23;

// ---------------------------------------------------------------------------
// Climate sensor (single-wire temperature/humidity)
// ---------------------------------------------------------------------------

pub const CLIMATE_DATA_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// I²C bus (character display)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// 7-bit address of the PCF8574 backpack on the 16x2 display.
pub const DISPLAY_I2C_ADDR: u8 = 0x27;

/// Highest GPIO number on the ESP32 package.
pub const MAX_GPIO: i32 = 39;

/// ADC1 channel wired to `gpio`, or `None` if the pin has no ADC1 input.
/// ADC2 is unusable while Wi-Fi is active.
pub const fn adc1_channel(gpio: i32) -> Option<u32> {
    match gpio {
        36 => Some(0),
        37 => Some(1),
        38 => Some(2),
        39 => Some(3),
        32 => Some(4),
        33 => Some(5),
        34 => Some(6),
        35 => Some(7),
        _ => None,
    }
}
