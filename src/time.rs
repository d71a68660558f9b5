//! Simulation time for the packet-forwarding engine.
//!
//! Represents a point on the simulated clock, measured in abstract
//! seconds. There is no dependency on `std::time`: the clock advances
//! only when the scheduler dispatches an event.

use std::cmp::Ordering;

use crate::error::NetSimError;

/// A finite, non-negative timestamp on the simulation clock.
///
/// Latencies and processing delays are real-valued, so the clock is an
/// `f64`. Construction rejects NaN, infinities and negative values,
/// which makes the ordering below total.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "f64", into = "f64")
)]
pub struct SimTime(f64);

impl SimTime {
    /// The zero-point of simulation time.
    pub const ZERO: SimTime = SimTime(0.0);

    /// Create a timestamp. Returns `None` for negative or non-finite input.
    #[inline]
    pub fn new(secs: f64) -> Option<Self> {
        if secs.is_finite() && secs >= 0.0 {
            // Normalise -0.0 so equal timestamps hash and compare alike.
            Some(SimTime(secs + 0.0))
        } else {
            None
        }
    }

    /// Return the raw value in seconds.
    #[inline]
    pub fn as_secs(self) -> f64 {
        self.0
    }

    /// The timestamp `delay` seconds after `self`.
    ///
    /// Returns `None` if `delay` is negative or the sum is not finite.
    #[inline]
    pub fn plus(self, delay: f64) -> Option<SimTime> {
        if delay < 0.0 {
            return None;
        }
        SimTime::new(self.0 + delay)
    }

    /// Returns `true` if `self` is strictly before `other`.
    #[inline]
    pub fn is_before(self, other: SimTime) -> bool {
        self < other
    }

    /// Seconds elapsed between `other` and `self`, or `None` if
    /// `other` is later.
    #[inline]
    pub fn duration_since(self, other: SimTime) -> Option<f64> {
        if self < other {
            None
        } else {
            Some(self.0 - other.0)
        }
    }
}

impl Default for SimTime {
    fn default() -> Self {
        SimTime::ZERO
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TryFrom<f64> for SimTime {
    type Error = NetSimError;

    fn try_from(secs: f64) -> Result<Self, Self::Error> {
        SimTime::new(secs).ok_or(NetSimError::InvalidTime(secs))
    }
}

impl From<SimTime> for f64 {
    fn from(t: SimTime) -> f64 {
        t.0
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T={}", self.0)
    }
}
