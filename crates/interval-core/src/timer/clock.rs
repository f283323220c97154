//! Monotonic time sources.
//!
//! The engine only ever sees a `Duration` since some host-chosen origin.
//! Hosts pick a source: [`InstantSource`] for real time, [`ManualSource`] for
//! tests and simulations that feed synthetic timestamps.

use std::time::{Duration, Instant};

pub trait MonotonicSource {
    /// Time elapsed since the source's origin. Never decreases.
    fn now(&self) -> Duration;
}

/// Real monotonic time, anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct InstantSource {
    origin: Instant,
}

impl InstantSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicSource for InstantSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualSource {
    now: Duration,
}

impl ManualSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward. Going backwards is ignored.
    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    pub fn advance(&mut self, by: Duration) {
        self.now = self.now.saturating_add(by);
    }
}

impl MonotonicSource for ManualSource {
    fn now(&self) -> Duration {
        self.now
    }
}
