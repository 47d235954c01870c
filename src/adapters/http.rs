//! HTTP status upload adapter.
//!
//! Implements [`UploadPort`] with one plain GET per call.  The status is
//! returned as-is; deciding what counts as success is the reporter's job.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `embedded_svc` HTTP client over
//!   `esp_idf_svc::http::client::EspHttpConnection`.
//! - **all other targets**: logs the URL and answers with a status set by
//!   [`sim_set_upload_status`] (0 simulates a transport failure).

use log::{info, warn};

use crate::app::ports::{UploadError, UploadPort};
use crate::config::NetworkConfig;

pub struct HttpUploader {
    timeout_ms: u32,
}

impl HttpUploader {
    pub fn new(network: &NetworkConfig) -> Self {
        Self {
            timeout_ms: network.upload_timeout_ms,
        }
    }
}

#[cfg(target_os = "espidf")]
impl UploadPort for HttpUploader {
    fn get(&mut self, url: &str) -> Result<u16, UploadError> {
        use core::time::Duration;

        use embedded_svc::http::Method;
        use embedded_svc::http::Status;
        use embedded_svc::http::client::Client as HttpClient;
        use esp_idf_svc::http::client::{Configuration as HttpClientConfiguration, EspHttpConnection};

        let conf = HttpClientConfiguration {
            timeout: Some(Duration::from_millis(u64::from(self.timeout_ms))),
            ..Default::default()
        };
        let conn = EspHttpConnection::new(&conf).map_err(|e| {
            warn!("HTTP | connection init failed: {:?}", e);
            UploadError::Transport
        })?;
        let mut client = HttpClient::wrap(conn);
        let request = client.request(Method::Get, url, &[]).map_err(|e| {
            warn!("HTTP | request to {} failed: {:?}", url, e);
            UploadError::Transport
        })?;
        let response = request.submit().map_err(|e| {
            warn!("HTTP | submit to {} failed: {:?}", url, e);
            UploadError::Transport
        })?;

        let status = response.status();
        info!("HTTP | GET {} -> {}", url, status);
        Ok(status)
    }
}

#[cfg(not(target_os = "espidf"))]
static SIM_STATUS: core::sync::atomic::AtomicU16 = core::sync::atomic::AtomicU16::new(200);

/// Status the simulated collector answers with; 0 = transport failure (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_upload_status(status: u16) {
    SIM_STATUS.store(status, core::sync::atomic::Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
impl UploadPort for HttpUploader {
    fn get(&mut self, url: &str) -> Result<u16, UploadError> {
        match SIM_STATUS.load(core::sync::atomic::Ordering::Relaxed) {
            0 => {
                warn!("HTTP(sim): GET {} timed out after {} ms", url, self.timeout_ms);
                Err(UploadError::Transport)
            }
            status => {
                info!("HTTP(sim): GET {} -> {}", url, status);
                Ok(status)
            }
        }
    }
}
