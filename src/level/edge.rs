//! Reach edges between waypoints.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::CapsuleSize;

use super::waypoint::WaypointId;

/// Movement capabilities an edge requires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachFlags {
    pub flying: bool,
    pub swimming: bool,
    pub jumping: bool,
}

impl ReachFlags {
    /// Walking only.
    pub const WALK: Self = Self {
        flying: false,
        swimming: false,
        jumping: false,
    };

    /// True if every capability `other` requires is also required here.
    #[inline]
    pub fn contains(&self, other: &ReachFlags) -> bool {
        (self.flying || !other.flying)
            && (self.swimming || !other.swimming)
            && (self.jumping || !other.jumping)
    }
}

/// How an edge came to exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Capsule-fitted straight connection.
    Standard,
    /// Author-declared, bypasses capsule fitting.
    Forced,
    /// Author-declared "never connect" stub.
    Proscribed,
    /// Connection beyond the standard length limit.
    LongRange,
    /// Between markers of the same ladder.
    Ladder,
    /// Teleporter to its destination.
    Teleport,
    /// Between a lift center and its exits.
    Lift,
    /// Jump between jump points.
    Leap,
}

impl EdgeKind {
    /// Only geometric edges are candidates for pruning.
    #[inline]
    pub fn is_prunable(self) -> bool {
        matches!(self, EdgeKind::Standard | EdgeKind::LongRange)
    }
}

/// A directed, weighted connection annotated with its required capsule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReachEdge {
    pub start: WaypointId,
    pub end: WaypointId,
    /// Travel length (straight or terrain-adjusted).
    pub distance: f32,
    /// Unit direction from start to end.
    pub direction: Vec3,
    /// Largest capsule that fits along the edge.
    pub size: CapsuleSize,
    pub flags: ReachFlags,
    pub kind: EdgeKind,
    /// Marked redundant; removed by the next cleanup.
    pub pruned: bool,
    /// Never consider this edge for pruning.
    pub skip_prune: bool,
}

impl ReachEdge {
    /// Create an edge between two positions.
    pub fn between(
        start: (WaypointId, Vec3),
        end: (WaypointId, Vec3),
        kind: EdgeKind,
        size: CapsuleSize,
    ) -> Self {
        let delta = end.1 - start.1;
        Self {
            start: start.0,
            end: end.0,
            distance: delta.length(),
            direction: delta.normalize_or_zero(),
            size,
            flags: ReachFlags::WALK,
            kind,
            pruned: false,
            skip_prune: false,
        }
    }

    /// Builder-style setter for distance.
    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = distance;
        self
    }

    /// Builder-style setter for movement flags.
    pub fn with_flags(mut self, flags: ReachFlags) -> Self {
        self.flags = flags;
        self
    }

    #[inline]
    pub fn is_proscribed(&self) -> bool {
        self.kind == EdgeKind::Proscribed
    }

    #[inline]
    pub fn is_forced(&self) -> bool {
        self.kind == EdgeKind::Forced
    }

    /// Eligible to be removed by a pruner.
    #[inline]
    pub fn is_prunable(&self) -> bool {
        self.kind.is_prunable() && !self.skip_prune
    }

    /// Usable for traversal and reachability.
    #[inline]
    pub fn is_traversable(&self) -> bool {
        !self.pruned && !self.is_proscribed()
    }

    /// True if this edge can stand in for `other` on an alternate route:
    /// unpruned, at least as large, and requiring no extra capability.
    #[inline]
    pub fn may_prune(&self, other: &ReachEdge) -> bool {
        self.is_traversable() && self.size.supports(&other.size) && other.flags.contains(&self.flags)
    }

    /// True if the two edges have an endpoint in common.
    #[inline]
    pub fn shares_endpoint(&self, other: &ReachEdge) -> bool {
        self.start == other.start
            || self.start == other.end
            || self.end == other.start
            || self.end == other.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(size: CapsuleSize) -> ReachEdge {
        ReachEdge::between(
            (WaypointId(0), Vec3::ZERO),
            (WaypointId(1), Vec3::new(300.0, 400.0, 0.0)),
            EdgeKind::Standard,
            size,
        )
    }

    #[test]
    fn test_between_computes_geometry() {
        let e = edge(CapsuleSize::new(34.0, 88.0));
        assert_eq!(e.distance, 500.0);
        assert!((e.direction.length() - 1.0).abs() < 1e-6);
        assert!(e.is_prunable());
        assert!(e.is_traversable());
    }

    #[test]
    fn test_may_prune_requires_size_and_flags() {
        let small = edge(CapsuleSize::new(34.0, 88.0));
        let big = edge(CapsuleSize::new(64.0, 100.0));
        assert!(big.may_prune(&small));
        assert!(!small.may_prune(&big));

        let jumping = big.clone().with_flags(ReachFlags {
            jumping: true,
            ..ReachFlags::WALK
        });
        assert!(!jumping.may_prune(&small));
        assert!(big.may_prune(&jumping));

        let mut pruned = big.clone();
        pruned.pruned = true;
        assert!(!pruned.may_prune(&small));
    }

    #[test]
    fn test_kind_prunability() {
        assert!(EdgeKind::LongRange.is_prunable());
        assert!(!EdgeKind::Forced.is_prunable());
        assert!(!EdgeKind::Proscribed.is_prunable());
        assert!(!EdgeKind::Ladder.is_prunable());
        let mut e = edge(CapsuleSize::ZERO);
        e.skip_prune = true;
        assert!(!e.is_prunable());
    }
}
