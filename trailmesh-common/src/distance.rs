//! `Distance` — a small newtype so length-bound arithmetic can't silently
//! mix metres, kilometres and miles the way raw `f64` would let it.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A non-negative physical distance, stored internally in metres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distance {
    metres: f64,
}

impl Distance {
    pub const ZERO: Distance = Distance { metres: 0.0 };

    pub fn m(metres: f64) -> Self {
        Distance { metres }
    }

    pub fn km(km: f64) -> Self {
        Distance { metres: km * 1000.0 }
    }

    pub fn mi(miles: f64) -> Self {
        Distance {
            metres: miles * 1609.344,
        }
    }

    pub fn as_m(self) -> f64 {
        self.metres
    }

    pub fn as_km(self) -> f64 {
        self.metres / 1000.0
    }

    pub fn min(self, other: Distance) -> Distance {
        Distance::m(self.metres.min(other.metres))
    }

    pub fn max(self, other: Distance) -> Distance {
        Distance::m(self.metres.max(other.metres))
    }

    /// Clamp to `[lo, hi]`.
    pub fn clamp(self, lo: Distance, hi: Distance) -> Distance {
        Distance::m(self.metres.clamp(lo.metres, hi.metres))
    }
}

impl Add for Distance {
    type Output = Distance;
    fn add(self, rhs: Distance) -> Distance {
        Distance::m(self.metres + rhs.metres)
    }
}

impl Sub for Distance {
    type Output = Distance;
    fn sub(self, rhs: Distance) -> Distance {
        Distance::m(self.metres - rhs.metres)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_roundtrip() {
        assert!((Distance::km(1.0).as_m() - 1000.0).abs() < 1e-9);
        assert!((Distance::mi(1.0).as_m() - 1609.344).abs() < 1e-9);
    }

    #[test]
    fn clamp_matches_stdlib_semantics() {
        let d = Distance::km(25.0).clamp(Distance::km(1.0), Distance::km(20.0));
        assert_eq!(d.as_km(), 20.0);
    }
}
