//! One-shot hardware peripheral initialization and raw pin access.
//!
//! Configures GPIO directions and the gas-sensor ADC channel using raw
//! ESP-IDF sys calls.  Called once from `main()` before the control loop
//! starts.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: register-level GPIO / ADC access.
//! On host/test: a simulated GPIO bank and ADC, injectable through the
//! `sim_*` functions.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::config::BayConfig;
use crate::error::ActuatorError;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc)    => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
pub fn init_peripherals(config: &BayConfig) -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc(config)?;
        init_gpio_inputs(config)?;
        init_gpio_outputs(config)?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(config: &BayConfig) -> Result<(), HwInitError> {
    log::info!(
        "hw_init(sim): peripheral init skipped ({} slots, relay GPIO {})",
        config.slots.len(),
        config.relay_gpio
    );
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// control-loop ADC read path.  `init_adc()` completes before the loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc(config: &BayConfig) -> Result<(), HwInitError> {
    let channel = crate::pins::adc1_channel(config.gas_adc_gpio)
        .ok_or(HwInitError::AdcInitFailed(ESP_ERR_INVALID_ARG as i32))?;

    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    info!("hw_init: ADC1 configured (CH{}=gas)", channel);
    Ok(())
}

/// Raw 12-bit sample, or `None` if the driver reported an error.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Option<u16> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract: single-threaded control-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return None;
    }
    Some(raw.max(0) as u16)
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> Option<u16> {
    Some(sim::ADC_GAS.load(core::sync::atomic::Ordering::Relaxed))
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs(config: &BayConfig) -> Result<(), HwInitError> {
    for slot in &config.slots {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << slot.sensor_gpio,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    }

    info!("hw_init: slot sensor inputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    sim::level(pin)
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs(config: &BayConfig) -> Result<(), HwInitError> {
    let indicator_pins = config.slots.iter().map(|s| s.indicator_gpio);

    for pin in indicator_pins.chain(core::iter::once(config.relay_gpio)) {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    }

    // Relay released before anything else can run.
    let released = config.relay_active.output_level(false);
    unsafe { gpio_set_level(config.relay_gpio, u32::from(released)) };

    info!("hw_init: indicator + relay outputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), ActuatorError> {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_gpio_outputs(). Main-loop only.
    let ret = unsafe { gpio_set_level(pin, u32::from(high)) };
    if ret != ESP_OK as i32 {
        return Err(ActuatorError::GpioWriteFailed);
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), ActuatorError> {
    if !(0..sim::GPIO_COUNT as i32).contains(&pin) {
        return Err(ActuatorError::GpioWriteFailed);
    }
    sim::set_level(pin, high);
    Ok(())
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

    pub const GPIO_COUNT: usize = crate::pins::MAX_GPIO as usize + 1;

    /// Inputs idle HIGH (pull-ups enabled on the board).
    pub static LEVELS: [AtomicBool; GPIO_COUNT] = [const { AtomicBool::new(true) }; GPIO_COUNT];
    pub static ADC_GAS: AtomicU16 = AtomicU16::new(0);

    pub fn level(pin: i32) -> bool {
        usize::try_from(pin)
            .ok()
            .and_then(|i| LEVELS.get(i))
            .is_some_and(|l| l.load(Ordering::Relaxed))
    }

    pub fn set_level(pin: i32, high: bool) {
        if let Some(l) = usize::try_from(pin).ok().and_then(|i| LEVELS.get(i)) {
            l.store(high, Ordering::Relaxed);
        }
    }
}

/// Drive a simulated input pin (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_gpio_level(pin: i32, high: bool) {
    sim::set_level(pin, high);
}

/// Current simulated level of any pin, inputs or outputs (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_gpio_level(pin: i32) -> bool {
    sim::level(pin)
}

/// Inject the next gas ADC sample (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_gas_adc(raw: u16) {
    sim::ADC_GAS.store(raw, core::sync::atomic::Ordering::Relaxed);
}
