//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the boundary for network connectivity.
//! `main` joins the network once (blocking) before the control loop and the
//! watchdog start, then calls [`poll`](ConnectivityPort::poll) once per tick.
//! `poll` never waits on the driver: a reconnect only *requests*
//! association and later polls check whether the interface came up.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via
//!   `esp_idf_svc::wifi::BlockingWifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! On disconnect the adapter waits an exponential number of polls
//! (1 → 2 → 4 … capped at [`MAX_BACKOFF_POLLS`]) between attempts.  An
//! attempt that has not brought the interface up within
//! [`ASSOCIATE_TIMEOUT_POLLS`] polls counts as failed.

use core::fmt;
use log::{error, info, warn};

use super::utils::is_printable_ascii;

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl std::error::Error for ConnectivityError {}

pub trait ConnectivityPort {
    /// Blocking join.  Boot only, before the watchdog is armed.
    fn connect(&mut self) -> Result<(), ConnectivityError>;
    fn is_connected(&self) -> bool;
    /// Non-blocking supervision step; call once per tick.
    fn poll(&mut self);
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError>;
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected,
    /// Waiting `wait_polls` more polls before attempt number `attempt`.
    Reconnecting { attempt: u32, wait_polls: u32 },
    /// Attempt `attempt` requested; `polls_left` checks remain before it
    /// counts as failed.
    Associating { attempt: u32, polls_left: u32 },
}

pub const MAX_BACKOFF_POLLS: u32 = 30;

/// Polls an association request may take before it is abandoned.
pub const ASSOCIATE_TIMEOUT_POLLS: u32 = 5;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
type WifiDriver = esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>;

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    backoff_polls: u32,
    #[cfg(target_os = "espidf")]
    driver: Option<WifiDriver>,
}

impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl WifiAdapter {
    pub fn new() -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff_polls: 1,
            #[cfg(target_os = "espidf")]
            driver: None,
        }
    }

    /// Hand over the station driver built in `main` from the modem peripheral.
    #[cfg(target_os = "espidf")]
    pub fn with_driver(mut self, driver: WifiDriver) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    fn enter_reconnect(&mut self, attempt: u32) {
        self.state = WifiState::Reconnecting {
            attempt,
            wait_polls: self.backoff_polls,
        };
        self.backoff_polls = (self.backoff_polls * 2).min(MAX_BACKOFF_POLLS);
    }

    fn on_connected(&mut self) {
        self.state = WifiState::Connected;
        self.backoff_polls = 1;
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        self.platform_begin_connect()?;
        let driver = self.driver.as_mut().ok_or(ConnectivityError::ConnectionFailed)?;
        driver.wait_netif_up().map_err(|e| {
            warn!("WiFi: netif did not come up: {:?}", e);
            ConnectivityError::ConnectionFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        self.platform_begin_connect()?;
        if !self.platform_link_up() {
            warn!("WiFi(sim): AP '{}' not reachable", self.ssid);
            return Err(ConnectivityError::ConnectionFailed);
        }
        Ok(())
    }

    /// Configure the station and request association without waiting for it.
    #[cfg(target_os = "espidf")]
    fn platform_begin_connect(&mut self) -> Result<(), ConnectivityError> {
        use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPAWPA2Personal
        };
        let configuration = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.as_str().try_into().map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        let driver = self.driver.as_mut().ok_or(ConnectivityError::ConnectionFailed)?;
        let fail = |e: esp_idf_svc::sys::EspError| {
            warn!("WiFi: driver error {:?}", e);
            ConnectivityError::ConnectionFailed
        };
        let wifi = driver.wifi_mut();
        wifi.set_configuration(&configuration).map_err(fail)?;
        if !wifi.is_started().map_err(fail)? {
            wifi.start().map_err(fail)?;
        }
        // EspWifi::connect only issues the request; completion is observed
        // through `platform_link_up`.
        wifi.connect().map_err(fail)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin_connect(&mut self) -> Result<(), ConnectivityError> {
        info!("WiFi(sim): association requested for '{}'", self.ssid);
        Ok(())
    }

    /// Associated and the netif has an address.
    #[cfg(target_os = "espidf")]
    fn platform_link_up(&self) -> bool {
        self.driver
            .as_ref()
            .is_some_and(|d| d.wifi().is_up().unwrap_or(false))
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_link_up(&self) -> bool {
        sim::AP_REACHABLE.load(core::sync::atomic::Ordering::Relaxed)
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.driver
            .as_ref()
            .is_some_and(|d| d.is_connected().unwrap_or(false))
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.state == WifiState::Connected && sim::AP_REACHABLE.load(core::sync::atomic::Ordering::Relaxed)
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.state == WifiState::Connected {
            return Ok(());
        }

        info!("WiFi: connecting to '{}'", self.ssid);
        match self.platform_connect() {
            Ok(()) => {
                self.on_connected();
                info!("WiFi: connected");
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed: {}", e);
                self.enter_reconnect(1);
                Err(e)
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    fn poll(&mut self) {
        match self.state {
            WifiState::Reconnecting { attempt, wait_polls } if wait_polls > 1 => {
                self.state = WifiState::Reconnecting {
                    attempt,
                    wait_polls: wait_polls - 1,
                };
            }
            WifiState::Reconnecting { attempt, .. } => {
                info!("WiFi: reconnect attempt {}", attempt);
                match self.platform_begin_connect() {
                    Ok(()) => {
                        self.state = WifiState::Associating {
                            attempt,
                            polls_left: ASSOCIATE_TIMEOUT_POLLS,
                        };
                    }
                    Err(_) => self.enter_reconnect(attempt + 1),
                }
            }
            WifiState::Associating { attempt, polls_left } => {
                if self.platform_link_up() {
                    self.on_connected();
                    info!("WiFi: reconnected on attempt {}", attempt);
                } else if polls_left <= 1 {
                    warn!("WiFi: attempt {} timed out", attempt);
                    self.enter_reconnect(attempt + 1);
                } else {
                    self.state = WifiState::Associating {
                        attempt,
                        polls_left: polls_left - 1,
                    };
                }
            }
            WifiState::Connected => {
                if !self.platform_is_connected() {
                    warn!("WiFi: connection lost, entering reconnect");
                    self.enter_reconnect(1);
                }
            }
            WifiState::Disconnected => {}
        }
    }

    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::AtomicBool;

    pub static AP_REACHABLE: AtomicBool = AtomicBool::new(true);
}

/// Make the simulated access point reachable or not (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_ap_reachable(reachable: bool) {
    sim::AP_REACHABLE.store(reachable, core::sync::atomic::Ordering::Relaxed);
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_ssid() {
        let mut w = WifiAdapter::new();
        assert_eq!(w.set_credentials("", "password123"), Err(ConnectivityError::InvalidSsid));
    }

    #[test]
    fn rejects_short_password() {
        let mut w = WifiAdapter::new();
        assert_eq!(w.set_credentials("ParkBay", "short"), Err(ConnectivityError::InvalidPassword));
    }

    #[test]
    fn accepts_open_network() {
        let mut w = WifiAdapter::new();
        assert!(w.set_credentials("ParkBay", "").is_ok());
    }

    #[test]
    fn connect_without_credentials_fails() {
        let mut w = WifiAdapter::new();
        assert_eq!(w.connect(), Err(ConnectivityError::NoCredentials));
    }

    // The only test in this binary that flips AP_REACHABLE.
    #[test]
    fn reconnect_is_spread_over_polls() {
        let mut w = WifiAdapter::new();
        w.set_credentials("ParkBay", "password123").unwrap();
        w.connect().unwrap();
        assert_eq!(w.connect(), Ok(()));

        sim_set_ap_reachable(false);
        w.poll();
        assert_eq!(w.state(), WifiState::Reconnecting { attempt: 1, wait_polls: 1 });
        w.poll(); // attempt 1 requested, returns without waiting
        assert_eq!(
            w.state(),
            WifiState::Associating { attempt: 1, polls_left: ASSOCIATE_TIMEOUT_POLLS }
        );
        for _ in 0..ASSOCIATE_TIMEOUT_POLLS {
            w.poll();
        }
        assert_eq!(w.state(), WifiState::Reconnecting { attempt: 2, wait_polls: 2 });
        w.poll(); // waiting
        assert_eq!(w.state(), WifiState::Reconnecting { attempt: 2, wait_polls: 1 });
        w.poll(); // attempt 2 requested
        assert!(matches!(w.state(), WifiState::Associating { attempt: 2, .. }));

        sim_set_ap_reachable(true);
        w.poll(); // interface came up
        assert_eq!(w.state(), WifiState::Connected);
        assert!(w.is_connected());
    }
}
