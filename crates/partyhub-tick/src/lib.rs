//! Fixed-period tick scheduler for partyhub.
//!
//! A game session owns one [`TickScheduler`] and awaits
//! [`TickScheduler::wait_for_tick`] in its timer loop. Ticks fire on a
//! fixed cadence; when the task wakes up late the configured
//! [`TickPolicy`] decides how the next deadline is computed.
//!
//! # Integration
//!
//! The scheduler is designed to sit inside a session's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         _ = stop.closed() => break,
//!         info = scheduler.wait_for_tick() => { /* advance countdown */ }
//!     }
//! }
//! ```
//!
//! `wait_for_tick` is cancel-safe: the scheduler only mutates its state
//! after the sleep completes, so a cancelled wait leaves the next deadline
//! untouched.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when a tick fires later than scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Skip the missed tick(s) and schedule the next one a full period
    /// from now. Prevents a burst of back-to-back ticks after a stall.
    #[default]
    Skip,
    /// Keep the original cadence. After a stall the missed ticks fire
    /// immediately, one per `wait_for_tick` call.
    Drop,
}

/// Configuration for the tick scheduler.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between two ticks.
    pub period: Duration,
    /// Overrun handling policy.
    pub policy: TickPolicy,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(500),
            policy: TickPolicy::default(),
        }
    }
}

impl TickConfig {
    /// Shortest period the scheduler accepts.
    pub const MIN_PERIOD: Duration = Duration::from_millis(1);

    /// Create a config with the given period and the default policy.
    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`TickScheduler::new`]. A zero period would
    /// turn the timer loop into a busy loop, so it is raised to
    /// [`Self::MIN_PERIOD`].
    pub fn validated(mut self) -> Self {
        if self.period < Self::MIN_PERIOD {
            warn!(
                period_us = self.period.as_micros() as u64,
                "tick period below minimum, clamping"
            );
            self.period = Self::MIN_PERIOD;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Information about a fired tick, returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// The fixed period. Countdown logic uses this, not wall-clock
    /// elapsed time.
    pub dt: Duration,
    /// `true` if this tick fired more than 10% of a period late.
    pub overrun: bool,
    /// How many ticks were skipped because of the overrun.
    pub ticks_skipped: u64,
}

/// Counters kept across the scheduler's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickMetrics {
    pub total_ticks: u64,
    pub total_overruns: u64,
    pub total_skipped: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-period tick scheduler. One per running game session.
#[derive(Debug)]
pub struct TickScheduler {
    config: TickConfig,
    tick_count: u64,
    /// When the next tick should fire.
    next_tick: Instant,
    metrics: TickMetrics,
}

impl TickScheduler {
    /// Create a new scheduler. The first tick fires one period from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        debug!(
            period_ms = config.period.as_secs_f64() * 1000.0,
            policy = ?config.policy,
            "tick scheduler created"
        );
        Self {
            next_tick: Instant::now() + config.period,
            config,
            tick_count: 0,
            metrics: TickMetrics::default(),
        }
    }

    /// Create a scheduler with the given period and default policy.
    pub fn with_period(period: Duration) -> Self {
        Self::new(TickConfig::with_period(period))
    }

    /// Wait until the next tick is due and return its [`TickInfo`].
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let next = self.next_tick;
        let period = self.config.period;

        time::sleep_until(next).await;

        let now = Instant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > period / 10;
        let mut ticks_skipped = 0u64;

        self.next_tick = match self.config.policy {
            TickPolicy::Skip => {
                if overrun {
                    ticks_skipped = (late_by.as_nanos() / period.as_nanos()) as u64;
                    if ticks_skipped > 0 {
                        warn!(
                            tick = self.tick_count,
                            skipped = ticks_skipped,
                            late_ms = late_by.as_secs_f64() * 1000.0,
                            "tick overrun, skipping ahead"
                        );
                    }
                }
                now + period
            }
            TickPolicy::Drop => {
                if overrun {
                    warn!(
                        tick = self.tick_count,
                        late_ms = late_by.as_secs_f64() * 1000.0,
                        "tick overrun, keeping original schedule"
                    );
                }
                next + period
            }
        };

        if overrun {
            self.metrics.total_overruns += 1;
        }
        self.metrics.total_skipped += ticks_skipped;
        self.metrics.total_ticks += 1;

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt: period,
            overrun,
            ticks_skipped,
        }
    }

    /// Number of ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Lifetime counters.
    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    /// The configured period.
    pub fn period(&self) -> Duration {
        self.config.period
    }

    pub fn policy(&self) -> TickPolicy {
        self.config.policy
    }
}
