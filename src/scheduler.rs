//! Fixed-period tick scheduler.
//!
//! The control loop runs one tick per period.  The scheduler measures how
//! long the tick body took and sleeps for the remainder, so the period is
//! measured start-to-start rather than end-to-start.
//!
//! ```text
//!   |<────────── period ──────────>|<────────── period ──────────>|
//!   | tick body |      sleep       | tick body |      sleep       |
//! ```
//!
//! A body that runs past the period is an **overrun**: the next tick
//! starts immediately.  Ticks are never skipped or merged.

use log::warn;

use crate::app::ports::ClockPort;

/// What [`TickScheduler::wait_next`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickWait {
    /// Slept this many milliseconds before returning.
    Slept(u64),
    /// The tick body already used the whole period.
    Overrun { elapsed_ms: u64 },
}

pub struct TickScheduler {
    period_ms: u64,
    tick_started_ms: Option<u64>,
    overruns: u32,
}

impl TickScheduler {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            tick_started_ms: None,
            overruns: 0,
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Ticks whose body ran past the period.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    /// Mark the start of a tick body.
    pub fn begin_tick(&mut self, now_ms: u64) {
        self.tick_started_ms = Some(now_ms);
    }

    /// Block until the next tick is due.
    ///
    /// Without a preceding [`begin_tick`](Self::begin_tick) this sleeps a
    /// full period.
    pub fn wait_next(&mut self, clock: &mut impl ClockPort) -> TickWait {
        let elapsed_ms = match self.tick_started_ms.take() {
            Some(start) => clock.now_ms().saturating_sub(start),
            None => 0,
        };

        if elapsed_ms >= self.period_ms && self.period_ms > 0 {
            self.overruns = self.overruns.saturating_add(1);
            warn!(
                "SCHED | tick took {} ms, period is {} ms",
                elapsed_ms, self.period_ms
            );
            return TickWait::Overrun { elapsed_ms };
        }

        let remaining = self.period_ms.saturating_sub(elapsed_ms);
        clock.sleep_ms(remaining);
        TickWait::Slept(remaining)
    }
}
