//! Displayed-position tracking
//!
//! While playing, the engine only reports position at state changes. The
//! tracker anchors the last reported position and extrapolates from it on
//! a fixed-period tick so consumers can render a moving position. The value
//! is for display only and never feeds a control decision.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::{self, Instant};

/// Last authoritative position report
#[derive(Debug, Clone, Copy)]
struct Anchor {
    reported_ms: i64,
    at: Instant,
    wall_clock: DateTime<Utc>,
}

/// Position anchor plus the deadline of the next refresh tick
///
/// A deadline exists exactly while an anchor does. Only `tick()` touches the
/// timer driver, so anchoring works without a running runtime.
#[derive(Debug)]
pub struct PositionTracker {
    period: Duration,
    anchor: Option<Anchor>,
    next_tick: Option<Instant>,
}

impl PositionTracker {
    /// `period` must be non-zero
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            anchor: None,
            next_tick: None,
        }
    }

    /// Anchor on a reported position and (re)start the timer
    ///
    /// The first tick fires one full period after the anchor.
    pub fn start(&mut self, reported_ms: i64, wall_clock: DateTime<Utc>) {
        let now = Instant::now();
        self.anchor = Some(Anchor {
            reported_ms,
            at: now,
            wall_clock,
        });
        self.next_tick = Some(now + self.period);
    }

    /// Drop the anchor and stop the timer
    pub fn stop(&mut self) {
        self.anchor = None;
        self.next_tick = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Wall-clock instant of the current anchor
    pub fn anchor_timestamp(&self) -> Option<DateTime<Utc>> {
        self.anchor.map(|a| a.wall_clock)
    }

    /// Reported position plus elapsed time, clamped to a known duration
    ///
    /// Returns `None` when no anchor is set.
    pub fn extrapolate(&self, duration_ms: i64) -> Option<i64> {
        let anchor = self.anchor?;
        let elapsed_ms = i64::try_from(anchor.at.elapsed().as_millis()).unwrap_or(i64::MAX);
        let position = anchor.reported_ms.saturating_add(elapsed_ms);

        if duration_ms >= 0 && anchor.reported_ms <= duration_ms {
            Some(position.min(duration_ms))
        } else {
            Some(position)
        }
    }

    /// Wait for the next refresh tick
    ///
    /// Never completes while the timer is stopped, so it can sit in a
    /// `select!` next to the event queue. Cancel safe.
    pub async fn tick(&mut self) {
        match self.next_tick {
            Some(deadline) => {
                time::sleep_until(deadline).await;
                self.next_tick = Some(self.following_tick(deadline, Instant::now()));
            }
            None => std::future::pending::<()>().await,
        }
    }

    /// Next deadline after `deadline`, skipping ticks already missed
    fn following_tick(&self, deadline: Instant, now: Instant) -> Instant {
        let missed = now.saturating_duration_since(deadline).as_nanos() / self.period.as_nanos();
        let periods = u32::try_from(missed + 1).unwrap_or(u32::MAX);
        deadline + self.period.saturating_mul(periods)
    }
}
