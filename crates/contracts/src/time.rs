//! Time model
//!
//! Message stamps are integer nanoseconds so the exact policy can compare
//! them bit for bit. Seconds as `f64` are only used at the edges (logs,
//! metrics, config).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::FrameId;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Capture timestamp in nanoseconds
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Zero stamp (unset header)
    pub const ZERO: Timestamp = Timestamp(0);

    #[inline]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Build from a seconds + nanoseconds pair (ROS-style stamp)
    #[inline]
    pub const fn from_parts(secs: u32, nanos: u32) -> Self {
        Self(secs as u64 * NANOS_PER_SEC + nanos as u64)
    }

    /// Build from floating point seconds, rounding to the nearest nanosecond.
    /// Negative and non-finite inputs clamp to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return Self::ZERO;
        }
        Self((secs * NANOS_PER_SEC as f64).round() as u64)
    }

    #[inline]
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / NANOS_PER_SEC as f64
    }

    /// Absolute distance to another stamp in nanoseconds
    #[inline]
    pub fn abs_diff(self, other: Timestamp) -> u64 {
        self.0.abs_diff(other.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:09}",
            self.0 / NANOS_PER_SEC,
            self.0 % NANOS_PER_SEC
        )
    }
}

/// Message header: capture stamp and the frame the data is expressed in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub stamp: Timestamp,
    pub frame_id: FrameId,
}

impl Header {
    pub fn new(stamp: Timestamp, frame_id: impl Into<FrameId>) -> Self {
        Self {
            stamp,
            frame_id: frame_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_round_trip() {
        let t = Timestamp::from_secs_f64(1.25);
        assert_eq!(t.as_nanos(), 1_250_000_000);
        assert!((t.as_secs_f64() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_from_parts_and_display() {
        let t = Timestamp::from_parts(12, 5);
        assert_eq!(t.as_nanos(), 12_000_000_005);
        assert_eq!(t.to_string(), "12.000000005");
    }

    #[test]
    fn test_invalid_seconds_clamp_to_zero() {
        assert_eq!(Timestamp::from_secs_f64(-1.0), Timestamp::ZERO);
        assert_eq!(Timestamp::from_secs_f64(f64::NAN), Timestamp::ZERO);
    }

    #[test]
    fn test_ordering_and_diff() {
        let a = Timestamp::from_nanos(100);
        let b = Timestamp::from_nanos(250);
        assert!(a < b);
        assert_eq!(a.max(b), b);
        assert_eq!(a.abs_diff(b), 150);
        assert_eq!(b.abs_diff(a), 150);
    }
}
