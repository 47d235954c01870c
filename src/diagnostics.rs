//! Runtime diagnostics counters.
//!
//! The control loop records every tick's outcome here.  A snapshot
//! ([`RuntimeMetrics`]) is emitted as an event every
//! `metrics_every_ticks` ticks and can be pulled at any time.

use serde::Serialize;

use crate::app::events::TickSummary;
use crate::error::Error;
use crate::model::RelayState;
use crate::reporter::{PublishOutcome, ReportOutcome, UploadOutcome};

/// Point-in-time counters since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RuntimeMetrics {
    pub ticks: u64,
    /// Ticks on which the fan relay was commanded on.
    pub relay_on_ticks: u64,
    pub invalid_samples: u32,
    pub publishes: u32,
    pub publish_skipped_link_down: u32,
    pub publish_failures: u32,
    pub uploads_ok: u32,
    pub upload_failures: u32,
    pub reconnect_attempts: u32,
    pub tick_overruns: u32,
    #[serde(skip)]
    pub last_error: Option<Error>,
}

#[derive(Default)]
pub struct Diagnostics {
    metrics: RuntimeMetrics,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tick(&mut self, summary: &TickSummary) {
        let m = &mut self.metrics;
        m.ticks = summary.tick;
        if summary.relay == RelayState::On {
            m.relay_on_ticks += 1;
        }

        match summary.report {
            ReportOutcome::InvalidSample => m.invalid_samples += 1,
            ReportOutcome::Completed { publish, upload, .. } => {
                match publish {
                    PublishOutcome::Published => m.publishes += 1,
                    PublishOutcome::Unavailable => m.publish_skipped_link_down += 1,
                    PublishOutcome::Failed | PublishOutcome::Partial => m.publish_failures += 1,
                    PublishOutcome::BelowThreshold => {}
                }
                match upload {
                    UploadOutcome::Accepted => m.uploads_ok += 1,
                    UploadOutcome::Rejected(_) | UploadOutcome::Failed(_) => {
                        m.upload_failures += 1;
                    }
                }
            }
        }

        if let Some(e) = summary.report.errors().last() {
            m.last_error = Some(e);
        }
    }

    pub fn set_reconnect_attempts(&mut self, attempts: u32) {
        self.metrics.reconnect_attempts = attempts;
    }

    pub fn set_tick_overruns(&mut self, overruns: u32) {
        self.metrics.tick_overruns = overruns;
    }

    pub fn snapshot(&self) -> RuntimeMetrics {
        self.metrics
    }
}
