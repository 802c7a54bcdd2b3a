//! Basic edge pruner.
//!
//! An edge S→T is redundant when S can already reach T through other
//! edges that head the same way, are at least as large, and add up to no
//! more than `path_pruning` times its length. Forced, proscribed and
//! special edges are never pruned.

use log::{debug, trace};

use crate::config::PruneSection;
use crate::core::CapsuleSize;
use crate::level::{Level, ReachEdge, WaypointId};

use super::reach::{MIN_EDGE_DISTANCE, VisitedWeights};

/// Removes edges that have an aligned alternate route within tolerance.
pub struct BasicPruner<'a> {
    config: &'a PruneSection,
}

impl<'a> BasicPruner<'a> {
    pub fn new(config: &'a PruneSection) -> Self {
        Self { config }
    }

    /// Mark redundant edges, then remove them. Returns the number pruned.
    pub fn prune(&self, level: &mut Level) -> usize {
        let mut visited = VisitedWeights::for_level(level);
        let mut pruned = 0;

        for src in level.waypoint_ids() {
            for i in 0..level.edges_from(src).len() {
                let edge = level.edges_from(src)[i].clone();
                if edge.pruned || !edge.is_prunable() {
                    continue;
                }
                visited.reset(level.capacity());
                if self.has_alternate_route(level, &edge, &mut visited) {
                    trace!("[Prune] {} -> {} d={:.1}", edge.start, edge.end, edge.distance);
                    mark_pruned(level, src, i);
                    pruned += 1;
                }
            }
        }

        cleanup_pruned(level);
        debug!("[Prune] Basic pass removed {} edges", pruned);
        pruned
    }

    /// True if some other outgoing edge of `edge.start` begins an
    /// acceptable alternate route to `edge.end`.
    pub fn has_alternate_route(
        &self,
        level: &Level,
        edge: &ReachEdge,
        visited: &mut VisitedWeights,
    ) -> bool {
        level.edges_from(edge.start).iter().any(|first| {
            first.end != edge.end
                && first.distance > MIN_EDGE_DISTANCE
                && first.may_prune(edge)
                && first.direction.dot(edge.direction) >= 0.0
                && self.find_alternate_path(level, first.end, edge, first.distance, visited)
        })
    }

    /// Bounded depth-first search from `node` toward `edge.end`.
    ///
    /// `acc` is the distance already travelled from `edge.start`. A waypoint
    /// is only expanded again when reached with a strictly shorter `acc`.
    fn find_alternate_path(
        &self,
        level: &Level,
        node: WaypointId,
        edge: &ReachEdge,
        acc: f32,
        visited: &mut VisitedWeights,
    ) -> bool {
        let Some(wp) = level.waypoint(node) else {
            return false;
        };
        if wp.flags.blocked || visited.get(node) <= acc {
            return false;
        }
        visited.set(node, acc);

        let limit = self.config.path_pruning * edge.distance;

        if let Some(direct) = wp.edges.iter().find(|k| k.end == edge.end && k.is_traversable()) {
            return acc + direct.distance <= limit
                && direct.direction.dot(edge.direction) >= 0.0
                && direct.may_prune(edge);
        }

        wp.edges.iter().any(|next| {
            next.end != edge.start
                && next.distance > MIN_EDGE_DISTANCE
                && acc + next.distance < limit
                && next.may_prune(edge)
                && next.direction.dot(edge.direction) >= 0.0
                && self.find_alternate_path(level, next.end, edge, acc + next.distance, visited)
        })
    }
}

pub(crate) fn mark_pruned(level: &mut Level, src: WaypointId, index: usize) {
    if let Some(edge) = level.waypoint_mut(src).and_then(|w| w.edges.get_mut(index)) {
        edge.pruned = true;
    }
}

/// Remove pruned edges, clamp extra costs and recompute the largest
/// capsule each waypoint supports.
pub fn cleanup_pruned(level: &mut Level) {
    for wp in level.waypoints_mut() {
        wp.edges.retain(|e| !e.pruned);
        wp.extra_cost = wp.extra_cost.max(0);
        wp.max_path_size = wp
            .edges
            .iter()
            .filter(|e| e.is_traversable())
            .map(|e| e.size)
            .fold(CapsuleSize::ZERO, CapsuleSize::max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{EdgeKind, Waypoint};
    use glam::Vec3;

    const HUMAN: CapsuleSize = CapsuleSize::new(34.0, 88.0);

    fn add(level: &mut Level, x: f32, y: f32) -> WaypointId {
        level.add_waypoint(Waypoint::path_node(Vec3::new(x, y, 0.0)))
    }

    fn connect(level: &mut Level, a: WaypointId, b: WaypointId, size: CapsuleSize) {
        let pa = level.waypoint(a).unwrap().position;
        let pb = level.waypoint(b).unwrap().position;
        let edge = ReachEdge::between((a, pa), (b, pb), EdgeKind::Standard, size);
        level.waypoint_mut(a).unwrap().edges.push(edge);
    }

    fn all_pairs(level: &mut Level, ids: &[WaypointId]) {
        for &a in ids {
            for &b in ids {
                if a != b {
                    connect(level, a, b, HUMAN);
                }
            }
        }
    }

    #[test]
    fn test_colinear_prunes_long_edge() {
        let mut level = Level::new();
        let ids: Vec<_> = (0..3).map(|i| add(&mut level, i as f32 * 100.0, 0.0)).collect();
        all_pairs(&mut level, &ids);

        let config = PruneSection::default();
        let pruned = BasicPruner::new(&config).prune(&mut level);

        assert_eq!(pruned, 2);
        assert!(level.edge(ids[0], ids[2]).is_none());
        assert!(level.edge(ids[2], ids[0]).is_none());
        assert!(level.edge(ids[0], ids[1]).is_some());
        assert!(level.edge(ids[1], ids[2]).is_some());
        assert!(level.can_reach(ids[0], ids[2], 200.0));
    }

    #[test]
    fn test_detour_beyond_tolerance_is_kept() {
        let mut level = Level::new();
        let a = add(&mut level, 0.0, 0.0);
        let b = add(&mut level, 100.0, 100.0);
        let c = add(&mut level, 200.0, 0.0);
        all_pairs(&mut level, &[a, b, c]);

        // 2 * 141.4 = 282.8 > 1.2 * 200
        let config = PruneSection::default();
        assert_eq!(BasicPruner::new(&config).prune(&mut level), 0);
        assert!(level.edge(a, c).is_some());
    }

    #[test]
    fn test_smaller_route_cannot_prune_larger_edge() {
        let mut level = Level::new();
        let ids: Vec<_> = (0..3).map(|i| add(&mut level, i as f32 * 100.0, 0.0)).collect();
        let big = CapsuleSize::new(96.0, 120.0);
        connect(&mut level, ids[0], ids[1], HUMAN);
        connect(&mut level, ids[1], ids[2], HUMAN);
        connect(&mut level, ids[0], ids[2], big);

        let config = PruneSection::default();
        assert_eq!(BasicPruner::new(&config).prune(&mut level), 0);
        assert_eq!(level.waypoint(ids[0]).unwrap().max_path_size, big);
    }

    #[test]
    fn test_blocked_intermediate_prevents_pruning() {
        let mut level = Level::new();
        let ids: Vec<_> = (0..3).map(|i| add(&mut level, i as f32 * 100.0, 0.0)).collect();
        all_pairs(&mut level, &ids);
        level.waypoint_mut(ids[1]).unwrap().flags.blocked = true;

        let config = PruneSection::default();
        BasicPruner::new(&config).prune(&mut level);
        assert!(level.edge(ids[0], ids[2]).is_some());
    }

    #[test]
    fn test_forced_edges_survive() {
        let mut level = Level::new();
        let ids: Vec<_> = (0..3).map(|i| add(&mut level, i as f32 * 100.0, 0.0)).collect();
        all_pairs(&mut level, &ids);
        level
            .waypoint_mut(ids[0])
            .unwrap()
            .edge_to_mut(ids[2])
            .unwrap()
            .kind = EdgeKind::Forced;

        let config = PruneSection::default();
        BasicPruner::new(&config).prune(&mut level);
        assert!(level.edge(ids[0], ids[2]).is_some());
    }

    #[test]
    fn test_cleanup_clamps_extra_cost() {
        let mut level = Level::new();
        let a = level.add_waypoint(Waypoint::path_node(Vec3::ZERO).with_extra_cost(-20));
        cleanup_pruned(&mut level);
        assert_eq!(level.waypoint(a).unwrap().extra_cost, 0);
    }
}
