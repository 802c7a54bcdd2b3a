//! Capsule sizes used for edge fitting.

use serde::{Deserialize, Serialize};

/// A vertical collision capsule.
///
/// `height` is the half-height measured from the capsule center, so a
/// capsule at `p` spans `p.z - height ..= p.z + height`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CapsuleSize {
    /// Horizontal radius.
    pub radius: f32,
    /// Half-height.
    pub height: f32,
}

impl CapsuleSize {
    /// A zero-size capsule (line traces, proscribed stubs).
    pub const ZERO: Self = Self {
        radius: 0.0,
        height: 0.0,
    };

    /// Create a new capsule size.
    #[inline]
    pub const fn new(radius: f32, height: f32) -> Self {
        Self { radius, height }
    }

    /// True if this capsule is at least as large as `other` on both axes.
    #[inline]
    pub fn supports(&self, other: &CapsuleSize) -> bool {
        self.radius >= other.radius && self.height >= other.height
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, other: CapsuleSize) -> Self {
        Self::new(self.radius.min(other.radius), self.height.min(other.height))
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: CapsuleSize) -> Self {
        Self::new(self.radius.max(other.radius), self.height.max(other.height))
    }

    /// True if both dimensions are zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.radius <= 0.0 && self.height <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports() {
        let big = CapsuleSize::new(72.0, 100.0);
        let small = CapsuleSize::new(34.0, 88.0);
        assert!(big.supports(&small));
        assert!(!small.supports(&big));
        assert!(small.supports(&small));
    }

    #[test]
    fn test_min_is_componentwise() {
        let a = CapsuleSize::new(72.0, 60.0);
        let b = CapsuleSize::new(34.0, 88.0);
        assert_eq!(a.min(b), CapsuleSize::new(34.0, 60.0));
        assert_eq!(a.max(b), CapsuleSize::new(72.0, 88.0));
    }
}
