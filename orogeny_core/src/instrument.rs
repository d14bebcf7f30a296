// Copyright 2026 the Orogeny Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame counters and host-time-fed stopwatches.
//!
//! Both types are owned by the
//! [`CompositorContext`](crate::compositor::CompositorContext) instance, not
//! stored globally, so the core stays free of hidden shared mutable state.
//! A [`Stopwatch`] never reads a clock: the host (or the controller's
//! begin/end hooks) feeds [`HostTime`] samples in.

use crate::time::{Duration, HostTime};

/// A monotonically increasing event counter.
#[derive(Clone, Copy, Debug, Default)]
pub struct Counter {
    count: u64,
}

impl Counter {
    /// Creates a counter at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Returns the current count.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Increments the counter.
    #[inline]
    pub fn increment(&mut self) {
        self.count += 1;
    }

    /// Resets the counter to zero.
    pub fn reset(&mut self) {
        self.count = 0;
    }
}

/// A lap stopwatch driven by externally supplied [`HostTime`] samples.
///
/// A lap runs from [`start`](Self::start) to [`stop`](Self::stop). Stopping
/// without a pending start, or starting twice, replaces the pending state
/// rather than erroring; instrumentation must never abort a frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stopwatch {
    pending: Option<HostTime>,
    last_lap: Duration,
    max_lap: Duration,
    total: Duration,
    laps: u64,
}

impl Stopwatch {
    /// Creates an idle stopwatch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: None,
            last_lap: Duration::ZERO,
            max_lap: Duration::ZERO,
            total: Duration::ZERO,
            laps: 0,
        }
    }

    /// Begins a lap at `now`.
    pub fn start(&mut self, now: HostTime) {
        self.pending = Some(now);
    }

    /// Ends the pending lap at `now` and records it.
    ///
    /// Returns the lap duration, or [`Duration::ZERO`] if no lap was pending.
    pub fn stop(&mut self, now: HostTime) -> Duration {
        let Some(start) = self.pending.take() else {
            return Duration::ZERO;
        };
        let lap = now.saturating_duration_since(start);
        self.last_lap = lap;
        if lap > self.max_lap {
            self.max_lap = lap;
        }
        self.total = self.total.saturating_add(lap);
        self.laps += 1;
        lap
    }

    /// Discards a pending lap without recording it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Returns `true` if a lap is in progress.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the most recently recorded lap.
    #[must_use]
    pub const fn last_lap(&self) -> Duration {
        self.last_lap
    }

    /// Returns the longest recorded lap.
    #[must_use]
    pub const fn max_lap(&self) -> Duration {
        self.max_lap
    }

    /// Returns the sum of all recorded laps.
    #[must_use]
    pub const fn total(&self) -> Duration {
        self.total
    }

    /// Returns the number of recorded laps.
    #[must_use]
    pub const fn laps(&self) -> u64 {
        self.laps
    }

    /// Clears all recorded laps and any pending start.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
