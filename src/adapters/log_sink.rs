//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::reporter::ReportOutcome;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { relay } => {
                info!("START | relay={:?}", relay);
            }
            AppEvent::Tick(t) => {
                let s = t.occupancy.states();
                let report = match t.report {
                    ReportOutcome::InvalidSample => "invalid-sample",
                    ReportOutcome::Completed { .. } if t.report.published() => "published+uploaded",
                    ReportOutcome::Completed { .. } => "uploaded",
                };
                info!(
                    "TICK | #{} | gas={} relay={:?} | free={}/{} [{} {} {}] | link={} | {}",
                    t.tick,
                    t.gas,
                    t.relay,
                    t.occupancy.available_count(),
                    t.occupancy.total(),
                    s[0],
                    s[1],
                    s[2],
                    if t.link_up { "up" } else { "down" },
                    report,
                );
            }
            AppEvent::RelayChanged { from, to } => {
                info!("RELAY | {:?} -> {:?}", from, to);
            }
            AppEvent::Diagnostic(e) => {
                warn!("DIAG | {}", e);
            }
            AppEvent::LinkLost => {
                warn!("LINK | lost");
            }
            AppEvent::LinkDown { consecutive_failures, retry_in_ticks } => {
                warn!(
                    "LINK | down, {} failed round(s), next try in {} tick(s)",
                    consecutive_failures, retry_in_ticks
                );
            }
            AppEvent::LinkUp { failed_attempts } => {
                info!("LINK | up (after {} failed attempt(s))", failed_attempts);
            }
            AppEvent::TickOverrun { elapsed_ms, period_ms } => {
                warn!("SCHED | overrun {} ms > {} ms", elapsed_ms, period_ms);
            }
            AppEvent::Metrics(m) => {
                info!(
                    "METRICS | ticks={} relay_on={} invalid={} pub={} pub_skip={} pub_fail={} \
                     up_ok={} up_fail={} reconnects={} overruns={}",
                    m.ticks,
                    m.relay_on_ticks,
                    m.invalid_samples,
                    m.publishes,
                    m.publish_skipped_link_down,
                    m.publish_failures,
                    m.uploads_ok,
                    m.upload_failures,
                    m.reconnect_attempts,
                    m.tick_overruns,
                );
            }
        }
    }
}
