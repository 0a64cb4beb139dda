//! Simulated time.

use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

/// A point in simulated time, measured in nanoseconds from simulation start.
///
/// `SimTime::MAX` is the unbounded sentinel: an interface with no horizon
/// reports it, and a disabled pacer returns it as the external time. All
/// arithmetic saturates so the sentinel survives offset math instead of
/// wrapping into a bogus finite time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimTime(i64);

impl SimTime {
    /// Simulation start.
    pub const ZERO: Self = SimTime(0);

    /// Unbounded sentinel ("never" / "no limit").
    pub const MAX: Self = SimTime(i64::MAX);

    /// Construct from raw nanoseconds.
    pub const fn from_nanos(nanos: i64) -> Self {
        SimTime(nanos)
    }

    /// Construct from microseconds.
    pub const fn from_micros(micros: i64) -> Self {
        SimTime(micros * 1_000)
    }

    /// Construct from milliseconds.
    pub const fn from_millis(millis: i64) -> Self {
        SimTime(millis * 1_000_000)
    }

    /// Construct from whole seconds.
    pub const fn from_secs(secs: i64) -> Self {
        SimTime(secs * 1_000_000_000)
    }

    /// Construct from fractional seconds, rounding to the nearest nanosecond.
    pub fn from_secs_f64(secs: f64) -> Self {
        SimTime((secs * 1e9).round() as i64)
    }

    /// Raw nanosecond count.
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Value in fractional seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1e9
    }

    /// Whether this is the unbounded sentinel.
    pub const fn is_unbounded(self) -> bool {
        self.0 == i64::MAX
    }

    /// Saturating addition; `MAX` absorbs any offset.
    pub const fn saturating_add(self, other: SimTime) -> Self {
        SimTime(self.0.saturating_add(other.0))
    }

    /// Saturating subtraction, floored at `ZERO`.
    pub const fn saturating_sub(self, other: SimTime) -> Self {
        let diff = self.0.saturating_sub(other.0);
        SimTime(if diff < 0 { 0 } else { diff })
    }

    /// Convert to a wall-clock duration. The sentinel maps to `Duration::MAX`.
    pub fn to_duration(self) -> Duration {
        if self.is_unbounded() {
            Duration::MAX
        } else {
            Duration::from_nanos(self.0.max(0) as u64)
        }
    }
}

impl From<Duration> for SimTime {
    fn from(d: Duration) -> Self {
        SimTime(d.as_nanos().min(i64::MAX as u128) as i64)
    }
}

impl Add for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> SimTime {
        self.saturating_add(rhs)
    }
}

impl Sub for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: SimTime) -> SimTime {
        self.saturating_sub(rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            write!(f, "unbounded")
        } else {
            write!(f, "{:.9}s", self.as_secs_f64())
        }
    }
}
