//! ParkBay Controller: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   MqttTelemetry   HttpUploader   TextDisplay  │
//! │  (Sensor+Actuator) (Telemetry)     (Upload)       (Display)    │
//! │  SystemClock       LogEventSink    WifiAdapter                 │
//! │  (Clock+Delay)     (EventSink)     (Connectivity)              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  Link · Gas safety · Occupancy · Reporter              │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  TickScheduler (fixed period) · Watchdog (fed per tick)        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use parkbay::adapters::display::TextDisplay;
use parkbay::adapters::hardware::HardwareAdapter;
use parkbay::adapters::http::HttpUploader;
use parkbay::adapters::log_sink::LogEventSink;
use parkbay::adapters::mqtt::MqttTelemetry;
use parkbay::adapters::time::SystemClock;
use parkbay::adapters::wifi::{ConnectivityPort, WifiAdapter};
use parkbay::app::service::{BayIo, ControlLoop};
use parkbay::config::BayConfig;
use parkbay::drivers::{hw_init, watchdog::Watchdog};
use parkbay::pins;

/// Optional JSON overrides baked in at build time.
const CONFIG_OVERRIDES: Option<&str> = option_env!("PARKBAY_CONFIG");

fn load_config() -> BayConfig {
    match CONFIG_OVERRIDES {
        Some(json) => match BayConfig::from_json(json) {
            Ok(cfg) => {
                info!("Config: build-time overrides applied");
                cfg
            }
            Err(e) => {
                warn!("Config: overrides rejected ({}), using defaults", e);
                BayConfig::default()
            }
        },
        None => BayConfig::default(),
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  ParkBay v{}                         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = load_config();

    // ── 2. Peripherals: relay released before anything else ───
    if let Err(e) = hw_init::init_peripherals(&config) {
        // Without the relay output there is no safe way to run.
        error!("HAL init failed: {}, halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 3. Network join ───────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let esp_wifi = EspWifi::new(peripherals.modem, sys_loop.clone(), Some(nvs))?;
    let driver = BlockingWifi::wrap(esp_wifi, sys_loop)?;

    let mut wifi = WifiAdapter::new().with_driver(driver);
    wifi.set_credentials(&config.network.wifi_ssid, &config.network.wifi_password)?;
    if let Err(e) = wifi.connect() {
        // The control loop still runs offline; poll() keeps retrying.
        warn!("WiFi join failed ({}), continuing offline", e);
    }

    // Armed after the blocking join; from here on every wait is bounded.
    let watchdog = Watchdog::new(&config);

    // ── 4. Adapters ───────────────────────────────────────────
    let hw = HardwareAdapter::from_config(&config, SystemClock::new())?;
    let mut io = BayIo {
        hw,
        telemetry: MqttTelemetry::new(&config.network),
        uploader: HttpUploader::new(&config.network),
        display: TextDisplay::new(pins::DISPLAY_I2C_ADDR),
        clock: SystemClock::new(),
        sink: LogEventSink::new(),
    };

    // ── 5. Control loop ───────────────────────────────────────
    let mut app = ControlLoop::new(config);
    app.start(&mut io);

    loop {
        app.tick(&mut io);
        wifi.poll();
        watchdog.feed();
        app.wait_for_next_tick(&mut io);
    }
}
