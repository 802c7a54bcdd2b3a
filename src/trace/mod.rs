//! Trace collaborator interface.
//!
//! The graph and cover builders never touch collision geometry directly.
//! Every visibility, capsule-fit and ground probe goes through a
//! [`TraceCollaborator`], which the host engine implements. [`BoxWorld`]
//! is a small axis-aligned-box implementation used by the CLI and tests.
//!
//! # Example
//!
//! ```rust
//! use glam::Vec3;
//! use marga_nav::core::CapsuleSize;
//! use marga_nav::trace::{Aabb, BoxWorld, TraceCollaborator};
//!
//! let mut world = BoxWorld::new();
//! world.add_blocker(Aabb::new(Vec3::new(40.0, -50.0, 0.0), Vec3::new(60.0, 50.0, 200.0)));
//!
//! let hit = world.trace_segment(Vec3::new(0.0, 0.0, 50.0), Vec3::new(100.0, 0.0, 50.0), CapsuleSize::ZERO);
//! assert!(hit.blocked);
//! ```

mod box_world;

pub use box_world::{Aabb, BoxWorld};

use glam::Vec3;

use crate::core::CapsuleSize;

/// Opaque reference to a walkable surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

/// Result of a ground probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundBase {
    /// Surface the point rests on.
    pub surface: SurfaceId,
    /// Point on the surface directly below the probe.
    pub point: Vec3,
}

/// Result of a segment trace.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceHit {
    /// True if the swept capsule hit something before reaching the end.
    pub blocked: bool,
    /// First contact point, or the segment end when clear.
    pub hit_point: Vec3,
    /// Surface normal at the contact, zero when clear.
    pub hit_normal: Vec3,
}

impl TraceHit {
    /// A clear trace ending at `end`.
    #[inline]
    pub fn clear(end: Vec3) -> Self {
        Self {
            blocked: false,
            hit_point: end,
            hit_normal: Vec3::ZERO,
        }
    }

    /// A blocked trace.
    #[inline]
    pub fn hit(point: Vec3, normal: Vec3) -> Self {
        Self {
            blocked: true,
            hit_point: point,
            hit_normal: normal,
        }
    }
}

/// Collision queries consumed by the builders.
///
/// Implementations must tolerate many sequential calls during a build.
pub trait TraceCollaborator {
    /// Sweep a capsule of `size` from `from` to `to`.
    ///
    /// A zero size performs a line trace.
    fn trace_segment(&self, from: Vec3, to: Vec3, size: CapsuleSize) -> TraceHit;

    /// Find the walkable surface under `point`, if any.
    fn find_ground_base(&self, point: Vec3) -> Option<GroundBase>;

    /// Convenience wrapper: true if the sweep reaches `to` unobstructed.
    #[inline]
    fn is_clear(&self, from: Vec3, to: Vec3, size: CapsuleSize) -> bool {
        !self.trace_segment(from, to, size).blocked
    }
}
