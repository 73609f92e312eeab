//! Opentime collaborator value types
//!
//! Rational time, time range, and time transform are opaque to the core: they
//! carry their own equality and round-trip through the JSON adapter under
//! their own schema tags. Only the minimal arithmetic the interchange layer
//! needs lives here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in time as a rational count of samples at a given rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RationalTime {
    pub value: f64,
    pub rate: f64,
}

impl RationalTime {
    pub fn new(value: f64, rate: f64) -> Self {
        Self { value, rate }
    }

    pub fn to_seconds(&self) -> f64 {
        self.value / self.rate
    }

    /// The same point in time expressed at another rate
    pub fn rescaled_to(&self, rate: f64) -> Self {
        Self::new(self.value * (rate / self.rate), rate)
    }
}

impl Default for RationalTime {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl fmt::Display for RationalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.rate)
    }
}

/// A half-open range: start time plus duration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_time: RationalTime,
    pub duration: RationalTime,
}

impl TimeRange {
    pub fn new(start_time: RationalTime, duration: RationalTime) -> Self {
        Self {
            start_time,
            duration,
        }
    }

    pub fn end_time_exclusive(&self) -> RationalTime {
        let duration = self.duration.rescaled_to(self.start_time.rate);
        RationalTime::new(self.start_time.value + duration.value, self.start_time.rate)
    }
}

/// An affine transform on rational times
///
/// A rate of `-1.0` means "leave the input rate unchanged".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeTransform {
    pub offset: RationalTime,
    pub scale: f64,
    pub rate: f64,
}

impl TimeTransform {
    pub fn new(offset: RationalTime, scale: f64, rate: f64) -> Self {
        Self {
            offset,
            scale,
            rate,
        }
    }

    pub fn applied_to(&self, time: RationalTime) -> RationalTime {
        let scaled = RationalTime::new(time.value * self.scale, time.rate);
        let offset = self.offset.rescaled_to(scaled.rate);
        let result = RationalTime::new(scaled.value + offset.value, scaled.rate);
        if self.rate > 0.0 {
            result.rescaled_to(self.rate)
        } else {
            result
        }
    }
}

impl Default for TimeTransform {
    fn default() -> Self {
        Self {
            offset: RationalTime::default(),
            scale: 1.0,
            rate: -1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescale() {
        let rt = RationalTime::new(15.0, 24.0);
        let at_48 = rt.rescaled_to(48.0);
        assert_eq!(at_48, RationalTime::new(30.0, 48.0));
        assert_eq!(rt.to_seconds(), at_48.to_seconds());
    }

    #[test]
    fn test_range_end() {
        let tr = TimeRange::new(RationalTime::new(10.0, 24.0), RationalTime::new(5.0, 24.0));
        assert_eq!(tr.end_time_exclusive(), RationalTime::new(15.0, 24.0));
    }

    #[test]
    fn test_transform_applied() {
        let xform = TimeTransform::new(RationalTime::new(2.0, 24.0), 2.0, -1.0);
        let out = xform.applied_to(RationalTime::new(5.0, 24.0));
        assert_eq!(out, RationalTime::new(12.0, 24.0));
    }
}
