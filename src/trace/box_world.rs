//! Axis-aligned box world.
//!
//! Blockers obstruct traces; floors only answer ground probes. Capsule
//! sweeps are approximated by expanding every blocker by the capsule's
//! radius horizontally and half-height vertically, then tracing a line.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::CapsuleSize;

use super::{GroundBase, SurfaceId, TraceCollaborator, TraceHit};

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create a box from two corners (any order).
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create a box from its center and half extents.
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Grow the box by `by` on every side.
    #[inline]
    pub fn expanded(&self, by: Vec3) -> Self {
        Self {
            min: self.min - by,
            max: self.max + by,
        }
    }

    /// True if the XY footprint contains the point.
    #[inline]
    pub fn contains_xy(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Slab test of the segment `from + t * (to - from)`, `t` in `[0, 1]`.
    ///
    /// Returns the entry parameter and the face normal. Points on a face are
    /// outside, so grazing segments are not hits.
    pub fn segment_hit(&self, from: Vec3, to: Vec3) -> Option<(f32, Vec3)> {
        let d = to - from;
        let mut t_enter = 0.0_f32;
        let mut t_exit = 1.0_f32;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let (o, dv, lo, hi) = (from[axis], d[axis], self.min[axis], self.max[axis]);
            if dv.abs() < 1e-8 {
                if o <= lo || o >= hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dv;
            let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
            let mut sign = -1.0;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
                sign = 1.0;
            }
            if t0 > t_enter {
                t_enter = t0;
                normal = Vec3::ZERO;
                normal[axis] = sign;
            }
            t_exit = t_exit.min(t1);
            if t_enter >= t_exit {
                return None;
            }
        }

        if normal == Vec3::ZERO {
            // Started inside the box.
            normal = -d.normalize_or_zero();
        }
        Some((t_enter, normal))
    }
}

/// Reference [`TraceCollaborator`] over axis-aligned boxes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoxWorld {
    /// Boxes that obstruct traces.
    #[serde(default)]
    pub blockers: Vec<Aabb>,
    /// Boxes whose top faces are walkable.
    #[serde(default)]
    pub floors: Vec<Aabb>,
    /// How far below a point the ground may be.
    #[serde(default = "default_max_ground_drop")]
    pub max_ground_drop: f32,
}

fn default_max_ground_drop() -> f32 {
    256.0
}

impl Default for BoxWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxWorld {
    /// Create an empty (fully open, groundless) world.
    pub fn new() -> Self {
        Self {
            blockers: Vec::new(),
            floors: Vec::new(),
            max_ground_drop: default_max_ground_drop(),
        }
    }

    /// Add an obstruction.
    pub fn add_blocker(&mut self, aabb: Aabb) {
        self.blockers.push(aabb);
    }

    /// Add a walkable floor.
    pub fn add_floor(&mut self, aabb: Aabb) {
        self.floors.push(aabb);
    }

    /// Builder-style variant of [`BoxWorld::add_blocker`].
    pub fn with_blocker(mut self, aabb: Aabb) -> Self {
        self.add_blocker(aabb);
        self
    }

    /// Builder-style variant of [`BoxWorld::add_floor`].
    pub fn with_floor(mut self, aabb: Aabb) -> Self {
        self.add_floor(aabb);
        self
    }
}

impl TraceCollaborator for BoxWorld {
    fn trace_segment(&self, from: Vec3, to: Vec3, size: CapsuleSize) -> TraceHit {
        let grow = Vec3::new(size.radius, size.radius, size.height);
        let nearest = self
            .blockers
            .iter()
            .filter_map(|b| b.expanded(grow).segment_hit(from, to))
            .min_by(|a, b| a.0.total_cmp(&b.0));

        match nearest {
            Some((t, normal)) => TraceHit::hit(from + (to - from) * t, normal),
            None => TraceHit::clear(to),
        }
    }

    fn find_ground_base(&self, point: Vec3) -> Option<GroundBase> {
        self.floors
            .iter()
            .enumerate()
            .filter(|(_, f)| f.contains_xy(point))
            .filter(|(_, f)| f.max.z <= point.z && point.z - f.max.z <= self.max_ground_drop)
            .max_by(|a, b| a.1.max.z.total_cmp(&b.1.max.z))
            .map(|(i, f)| GroundBase {
                surface: SurfaceId(i as u32),
                point: Vec3::new(point.x, point.y, f.max.z),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wall() -> Aabb {
        Aabb::new(Vec3::new(40.0, -50.0, 0.0), Vec3::new(60.0, 50.0, 200.0))
    }

    #[test]
    fn test_open_world_is_clear() {
        let world = BoxWorld::new();
        let hit = world.trace_segment(Vec3::ZERO, Vec3::new(500.0, 0.0, 0.0), CapsuleSize::new(34.0, 88.0));
        assert!(!hit.blocked);
        assert_eq!(hit.hit_point, Vec3::new(500.0, 0.0, 0.0));
    }

    #[test]
    fn test_line_hits_wall_face() {
        let world = BoxWorld::new().with_blocker(wall());
        let hit = world.trace_segment(
            Vec3::new(0.0, 0.0, 50.0),
            Vec3::new(100.0, 0.0, 50.0),
            CapsuleSize::ZERO,
        );
        assert!(hit.blocked);
        assert_relative_eq!(hit.hit_point.x, 40.0, epsilon = 1e-4);
        assert_eq!(hit.hit_normal, Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_capsule_radius_widens_blocker() {
        let world = BoxWorld::new().with_blocker(wall());
        // Passes 20 units beside the wall: clear for a line, blocked for r=34.
        let from = Vec3::new(0.0, 70.0, 50.0);
        let to = Vec3::new(100.0, 70.0, 50.0);
        assert!(world.is_clear(from, to, CapsuleSize::ZERO));
        assert!(!world.is_clear(from, to, CapsuleSize::new(34.0, 10.0)));
    }

    #[test]
    fn test_ground_probe_picks_highest_floor_below() {
        let world = BoxWorld::new()
            .with_floor(Aabb::new(Vec3::new(-100.0, -100.0, -10.0), Vec3::new(100.0, 100.0, 0.0)))
            .with_floor(Aabb::new(Vec3::new(-10.0, -10.0, 0.0), Vec3::new(10.0, 10.0, 30.0)));

        let base = world.find_ground_base(Vec3::new(0.0, 0.0, 100.0)).unwrap();
        assert_eq!(base.surface, SurfaceId(1));
        assert_relative_eq!(base.point.z, 30.0);

        let base = world.find_ground_base(Vec3::new(50.0, 0.0, 100.0)).unwrap();
        assert_eq!(base.surface, SurfaceId(0));

        assert!(world.find_ground_base(Vec3::new(500.0, 0.0, 100.0)).is_none());
    }
}
