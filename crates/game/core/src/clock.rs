//! Simulation time.
//!
//! The encounter advances in fixed ticks. Every wait is expressed as a
//! [`Stopwatch`] that accumulates tick durations, so behaviour depends on
//! elapsed time rather than on how many ticks happened.

use std::fmt;
use std::time::Duration;

/// Number of simulation ticks since some origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub<Tick> for Tick {
    type Output = u64;
    fn sub(self, rhs: Tick) -> u64 {
        self.0.saturating_sub(rhs.0)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Duration of one tick at `rate` ticks per second.
///
/// A rate of zero is treated as one tick per second.
pub fn tick_duration(rate: u32) -> Duration {
    Duration::from_secs(1) / rate.max(1)
}

/// Accumulated simulation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Stopwatch {
    elapsed: Duration,
}

impl Stopwatch {
    pub const fn new() -> Self {
        Self {
            elapsed: Duration::ZERO,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    /// Removes `amount` from the accumulated time, stopping at zero.
    pub fn rewind(&mut self, amount: Duration) {
        self.elapsed = self.elapsed.saturating_sub(amount);
    }

    pub fn has_reached(&self, target: Duration) -> bool {
        self.elapsed >= target
    }

    /// Number of whole `interval`s contained in the elapsed time.
    ///
    /// A zero interval yields zero.
    pub fn intervals(&self, interval: Duration) -> u32 {
        if interval.is_zero() {
            return 0;
        }
        let count = self.elapsed.as_nanos() / interval.as_nanos();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}
