//! Environment reporter.
//!
//! Last step of every tick.  Takes the tick's [`TelemetryPayload`] and:
//!
//! 1. aborts the whole step if either climate field is NaN (no publish, no upload);
//! 2. publishes temperature and humidity (retained) when **both** are at or
//!    above the configured minimums and the telemetry link is up;
//! 3. uploads the full status record as a GET query, unconditionally.
//!
//! Publish and upload failures are absorbed here: they are logged,
//! reflected in the returned [`ReportOutcome`], and never stop the tick.

use core::fmt::Write;

use log::{info, warn};

use crate::app::ports::{HTTP_OK, PublishError, TelemetryPort, UploadError, UploadPort};
use crate::config::BayConfig;
use crate::error::{CommsError, Error, SensorError};
use crate::model::{EnvironmentSample, TelemetryPayload};

/// Capacity of the status upload URL buffer.
pub const MAX_URL_LEN: usize = 256;

/// Capacity of one formatted MQTT payload (`-40.00`, `100.00`, ...).
const PAYLOAD_LEN: usize = 16;

/// Result of the publish half of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Both readings went out.
    Published,
    /// Sample below at least one minimum; nothing sent.
    BelowThreshold,
    /// Link down before the first message; nothing sent.
    Unavailable,
    /// Temperature went out (retained) but the humidity message did not.
    /// The retained pair on the broker is inconsistent until the next publish.
    Partial,
    /// The broker refused the first message.
    Failed,
}

impl PublishOutcome {
    fn error(self) -> Option<Error> {
        match self {
            Self::Published | Self::BelowThreshold => None,
            Self::Unavailable => Some(PublishError::NotConnected.into()),
            Self::Partial => Some(CommsError::PublishIncomplete.into()),
            Self::Failed => Some(PublishError::Rejected.into()),
        }
    }
}

/// Result of the upload half of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Accepted,
    /// Collector answered with a non-OK status.
    Rejected(u16),
    Failed(UploadError),
}

impl UploadOutcome {
    fn error(self) -> Option<Error> {
        match self {
            Self::Accepted => None,
            Self::Rejected(code) => Some(CommsError::UploadRejected(code).into()),
            Self::Failed(e) => Some(e.into()),
        }
    }
}

/// What one report step did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportOutcome {
    /// Climate sample had a NaN field; nothing was sent anywhere.
    InvalidSample,
    Completed {
        sample: EnvironmentSample,
        publish: PublishOutcome,
        upload: UploadOutcome,
    },
}

impl ReportOutcome {
    pub fn published(&self) -> bool {
        matches!(self, Self::Completed { publish: PublishOutcome::Published, .. })
    }

    pub fn upload_attempted(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Every failure this step absorbed: publish first, then upload.
    pub fn errors(&self) -> impl Iterator<Item = Error> {
        let (publish, upload) = match *self {
            Self::InvalidSample => (Some(SensorError::InvalidSample.into()), None),
            Self::Completed { publish, upload, .. } => (publish.error(), upload.error()),
        };
        publish.into_iter().chain(upload)
    }
}

/// Publish/upload policy, fixed at construction.
pub struct EnvironmentReporter {
    min_temperature_c: f32,
    min_humidity_pct: f32,
    topic_temperature: String,
    topic_humidity: String,
    /// `base_url + path`, validated to fit inside [`MAX_URL_LEN`].
    upload_prefix: String,
}

impl EnvironmentReporter {
    pub fn new(config: &BayConfig) -> Self {
        let net = &config.network;
        Self {
            min_temperature_c: config.publish_min_temperature_c,
            min_humidity_pct: config.publish_min_humidity_pct,
            topic_temperature: net.topic_temperature.clone(),
            topic_humidity: net.topic_humidity.clone(),
            upload_prefix: format!("{}{}", net.upload_base_url, net.upload_path),
        }
    }

    /// Both fields at or above their minimums.  Inclusive on both bounds.
    pub fn is_publish_worthy(&self, sample: &EnvironmentSample) -> bool {
        sample.temperature_c >= self.min_temperature_c
            && sample.humidity_pct >= self.min_humidity_pct
    }

    /// Build the status upload URL:
    /// `{prefix}?temperature=T&humidity=H&gas=G&ir1=..&ir2=..&ir3=..`
    pub fn status_url(
        &self,
        payload: &TelemetryPayload,
    ) -> Result<heapless::String<MAX_URL_LEN>, UploadError> {
        let env = &payload.environment;
        let mut url = heapless::String::new();
        write!(
            url,
            "{}?temperature={:.2}&humidity={:.2}&gas={}",
            self.upload_prefix,
            env.temperature_c,
            env.humidity_pct,
            payload.gas.raw()
        )
        .map_err(|_| UploadError::UrlTooLong)?;
        for reading in payload.occupancy.readings() {
            write!(url, "&ir{}={}", reading.slot.number(), reading.state)
                .map_err(|_| UploadError::UrlTooLong)?;
        }
        Ok(url)
    }

    /// Run one report step over this tick's payload.
    pub fn report(
        &self,
        payload: &TelemetryPayload,
        telemetry: &mut impl TelemetryPort,
        uploader: &mut impl UploadPort,
    ) -> ReportOutcome {
        let sample = payload.environment;
        if !sample.is_valid() {
            warn!("REPORT | climate sample invalid, skipping publish and upload");
            return ReportOutcome::InvalidSample;
        }

        let publish = self.publish(&sample, telemetry);
        let upload = self.upload(payload, uploader);

        ReportOutcome::Completed { sample, publish, upload }
    }

    fn publish(&self, sample: &EnvironmentSample, telemetry: &mut impl TelemetryPort) -> PublishOutcome {
        if !self.is_publish_worthy(sample) {
            return PublishOutcome::BelowThreshold;
        }
        if !telemetry.is_connected() {
            warn!("REPORT | telemetry link down, publish skipped");
            return PublishOutcome::Unavailable;
        }

        let messages = [
            (self.topic_temperature.as_str(), sample.temperature_c),
            (self.topic_humidity.as_str(), sample.humidity_pct),
        ];
        for (sent, (topic, value)) in messages.into_iter().enumerate() {
            let mut payload: heapless::String<PAYLOAD_LEN> = heapless::String::new();
            if write!(payload, "{:.2}", value).is_err() {
                warn!("REPORT | payload for {} does not fit", topic);
                return PublishOutcome::Failed;
            }
            if let Err(e) = telemetry.publish(topic, &payload, true) {
                warn!("REPORT | publish to {} failed: {}", topic, e);
                return match (sent, e) {
                    (0, PublishError::NotConnected) => PublishOutcome::Unavailable,
                    (0, PublishError::Rejected) => PublishOutcome::Failed,
                    _ => {
                        warn!("REPORT | retained pair incomplete until the next publish");
                        PublishOutcome::Partial
                    }
                };
            }
        }
        info!(
            "REPORT | published T={:.2}\u{00b0}C H={:.2}%",
            sample.temperature_c, sample.humidity_pct
        );
        PublishOutcome::Published
    }

    fn upload(&self, payload: &TelemetryPayload, uploader: &mut impl UploadPort) -> UploadOutcome {
        let url = match self.status_url(payload) {
            Ok(url) => url,
            Err(e) => {
                warn!("UPLOAD | {}", e);
                return UploadOutcome::Failed(e);
            }
        };

        match uploader.get(&url) {
            Ok(HTTP_OK) => UploadOutcome::Accepted,
            Ok(code) => {
                warn!("UPLOAD | collector answered HTTP {}", code);
                UploadOutcome::Rejected(code)
            }
            Err(e) => {
                warn!("UPLOAD | request failed: {}", e);
                UploadOutcome::Failed(e)
            }
        }
    }
}
