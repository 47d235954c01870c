//! Telemetry link supervisor.
//!
//! Runs at the start of every tick and decides whether to spend time
//! reconnecting the telemetry channel.  Two policies:
//!
//! - [`ReconnectPolicy::Degrade`]: at most `reconnect_attempts_per_tick`
//!   attempts, then back off for a doubling number of ticks (capped).
//!   The tick always continues; publishing is skipped while down.
//! - [`ReconnectPolicy::BlockUntilConnected`]: retry with a fixed wait
//!   until the broker accepts.  Nothing else in the tick runs meanwhile,
//!   including the gas check.

use log::{info, warn};

use crate::config::{BayConfig, ReconnectPolicy};

use super::events::AppEvent;
use super::ports::{ClockPort, EventSink, TelemetryPort};

pub struct LinkSupervisor {
    policy: ReconnectPolicy,
    attempts_per_tick: u8,
    max_backoff_ticks: u32,
    retry_ms: u64,
    /// Length of the next cooldown after a failed round.
    backoff_ticks: u32,
    /// Ticks left before the next round is allowed.
    cooldown_ticks: u32,
    /// Failed Degrade rounds since the link was last up.
    consecutive_failures: u32,
    /// Failed single attempts since the link was last up, under either policy.
    failed_attempts: u32,
    attempts_total: u32,
    was_up: bool,
}

impl LinkSupervisor {
    pub fn new(config: &BayConfig) -> Self {
        Self {
            policy: config.reconnect_policy,
            attempts_per_tick: config.reconnect_attempts_per_tick.max(1),
            max_backoff_ticks: config.reconnect_backoff_max_ticks,
            retry_ms: u64::from(config.reconnect_retry_ms),
            backoff_ticks: 0,
            cooldown_ticks: 0,
            consecutive_failures: 0,
            failed_attempts: 0,
            attempts_total: 0,
            was_up: false,
        }
    }

    /// Connect attempts made since boot.
    pub fn attempts_total(&self) -> u32 {
        self.attempts_total
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Make sure the link is up, per policy.  Returns the link state.
    pub fn ensure(
        &mut self,
        link: &mut impl TelemetryPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> bool {
        if link.is_connected() {
            self.mark_up(sink);
            return true;
        }

        if self.was_up {
            self.was_up = false;
            warn!("LINK | telemetry connection lost");
            sink.emit(&AppEvent::LinkLost);
        }

        match self.policy {
            ReconnectPolicy::Degrade => self.bounded_round(link, sink),
            ReconnectPolicy::BlockUntilConnected => self.block_until_up(link, clock, sink),
        }
    }

    fn bounded_round(&mut self, link: &mut impl TelemetryPort, sink: &mut impl EventSink) -> bool {
        if self.cooldown_ticks > 0 {
            self.cooldown_ticks -= 1;
            return false;
        }

        for _ in 0..self.attempts_per_tick {
            self.attempts_total = self.attempts_total.saturating_add(1);
            match link.try_connect() {
                Ok(()) => {
                    self.mark_up(sink);
                    return true;
                }
                Err(e) => {
                    self.failed_attempts = self.failed_attempts.saturating_add(1);
                    warn!("LINK | connect attempt failed: {}", e);
                }
            }
        }

        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.cooldown_ticks = self.backoff_ticks;
        let next = if self.backoff_ticks == 0 { 1 } else { self.backoff_ticks.saturating_mul(2) };
        self.backoff_ticks = next.min(self.max_backoff_ticks);

        sink.emit(&AppEvent::LinkDown {
            consecutive_failures: self.consecutive_failures,
            retry_in_ticks: self.cooldown_ticks,
        });
        false
    }

    fn block_until_up(
        &mut self,
        link: &mut impl TelemetryPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> bool {
        loop {
            self.attempts_total = self.attempts_total.saturating_add(1);
            match link.try_connect() {
                Ok(()) => {
                    self.mark_up(sink);
                    return true;
                }
                Err(e) => {
                    self.failed_attempts = self.failed_attempts.saturating_add(1);
                    warn!(
                        "LINK | connect failed ({}), retrying in {} ms",
                        e, self.retry_ms
                    );
                    clock.sleep_ms(self.retry_ms);
                }
            }
        }
    }

    fn mark_up(&mut self, sink: &mut impl EventSink) {
        if !self.was_up {
            info!("LINK | telemetry connected after {} failed attempt(s)", self.failed_attempts);
            sink.emit(&AppEvent::LinkUp {
                failed_attempts: self.failed_attempts,
            });
        }
        self.was_up = true;
        self.consecutive_failures = 0;
        self.failed_attempts = 0;
        self.backoff_ticks = 0;
        self.cooldown_ticks = 0;
    }
}
