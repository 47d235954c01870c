//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the control loop stops ticking, e.g. when a
//! collaborator hangs past its own timeout.  The timeout is derived from
//! [`BayConfig::worst_case_tick_ms`] so an iteration in which every bounded
//! wait runs to its limit never trips it.
//!
//! Arm it after the boot-time network join; the main loop must call
//! `feed()` once per tick.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

use crate::config::BayConfig;

/// Worst-case iterations that may elapse without a feed before the TWDT fires.
const MISSED_TICKS_BEFORE_RESET: u32 = 3;

/// Lower bound on the TWDT timeout.
const MIN_TIMEOUT_MS: u32 = 10_000;

pub struct Watchdog {
    timeout_ms: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Initialise and subscribe the current task to the TWDT.
    pub fn new(config: &BayConfig) -> Self {
        let timeout_ms = Self::timeout_for(config);

        #[cfg(target_os = "espidf")]
        {
            // SAFETY: TWDT calls are made once from the main task at boot.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK as i32 {
                    log::warn!("TWDT reconfigure returned {} (may already be configured)", ret);
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK as i32;
                if subscribed {
                    info!("Watchdog: subscribed ({} ms timeout, panic on trigger)", timeout_ms);
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self { timeout_ms, subscribed }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("Watchdog(sim): no-op ({} ms timeout)", timeout_ms);
            Self { timeout_ms }
        }
    }

    pub fn timeout_for(config: &BayConfig) -> u32 {
        config
            .worst_case_tick_ms()
            .saturating_mul(MISSED_TICKS_BEFORE_RESET)
            .max(MIN_TIMEOUT_MS)
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Feed the watchdog.  Must be called at least once per timeout.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                // SAFETY: resets the TWDT counter for the subscribed main task.
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn timeout_outlasts_slowest_iteration() {
        let config = BayConfig::default();
        // 2000 ms tick + 3 x 50 ms settle + 1 x 1000 ms link + 5000 ms upload.
        assert_eq!(config.worst_case_tick_ms(), 8150);
        let wd = Watchdog::new(&config);
        assert_eq!(wd.timeout_ms(), 24_450);
        assert!(wd.timeout_ms() > config.worst_case_tick_ms());
    }

    #[test]
    fn timeout_grows_with_reconnect_budget_and_has_floor() {
        let mut config = BayConfig {
            reconnect_attempts_per_tick: 4,
            ..BayConfig::default()
        };
        config.network.upload_timeout_ms = 20_000;
        let worst = config.worst_case_tick_ms();
        assert_eq!(worst, 2000 + 150 + 4000 + 20_000);
        assert!(Watchdog::timeout_for(&config) >= worst);

        let mut quick = BayConfig::default();
        quick.tick_interval_ms = 100;
        quick.settle_interval_ms = 10;
        quick.network.upload_timeout_ms = 500;
        assert_eq!(Watchdog::timeout_for(&quick), 10_000);
    }
}
