//! Aggressive edge pruner.
//!
//! Basic pruning leaves redundant edges in open areas where many waypoints
//! see each other. Two further passes thin the graph toward a
//! visibility-minimal one:
//!
//! 1. **Intersection**: of two edges whose segments (nearly) cross, remove
//!    the longer one
//! 2. **Angular**: of two edges leaving the same waypoint in nearly the same
//!    direction, remove the longer one
//!
//! An edge is only removed when its start can still reach its end through
//! surviving edges within the edge length plus a budget, so no previously
//! connected pair is disconnected.

use std::cmp::Ordering;

use log::{debug, trace};

use crate::config::PruneSection;
use crate::core::closest_points_segments;
use crate::level::{Level, ReachEdge, WaypointId};

use super::prune::{cleanup_pruned, mark_pruned};
use super::reach::{MIN_EDGE_DISTANCE, VisitedWeights};

/// Position of an edge: start waypoint and index in its edge list.
type EdgeRef = (WaypointId, usize);

/// Counts of edges removed by each pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AggressiveResult {
    pub intersect: usize,
    pub angular: usize,
}

/// Removes the longer of intersecting or near-parallel edge pairs.
pub struct AggressivePruner<'a> {
    config: &'a PruneSection,
    /// Radius for gathering competing edges.
    search_radius: f32,
}

impl<'a> AggressivePruner<'a> {
    pub fn new(config: &'a PruneSection, search_radius: f32) -> Self {
        Self {
            config,
            search_radius,
        }
    }

    /// Run both passes, cleaning up after each.
    pub fn prune(&self, level: &mut Level) -> AggressiveResult {
        let intersect = self.intersection_pass(level);
        cleanup_pruned(level);
        let angular = self.angular_pass(level);
        cleanup_pruned(level);

        debug!(
            "[Prune] Aggressive passes removed {} intersecting, {} near-parallel edges",
            intersect, angular
        );
        AggressiveResult { intersect, angular }
    }

    /// Geometric intersection pass. Returns the number of edges pruned.
    pub fn intersection_pass(&self, level: &mut Level) -> usize {
        let mut visited = VisitedWeights::for_level(level);
        let mut pruned = 0;

        for src in level.waypoint_ids() {
            for i in 0..level.edges_from(src).len() {
                let edge = level.edges_from(src)[i].clone();
                if edge.pruned || !edge.is_prunable() {
                    continue;
                }

                let mut competitors = self.competitors(level, &edge);
                competitors.sort_by(|a, b| {
                    b.2.total_cmp(&a.2)
                        .then_with(|| a.0.cmp(&b.0))
                        .then_with(|| a.1.cmp(&b.1))
                });

                for (start, index, _) in competitors {
                    if is_pruned(level, (src, i)) {
                        break;
                    }
                    let Some(other) = edge_at(level, (start, index)) else {
                        continue;
                    };
                    if other.pruned {
                        continue;
                    }
                    let budget = self.config.intersect_budget(edge.distance.min(other.distance));
                    pruned += prune_longer(level, (src, i), (start, index), budget, &mut visited);
                }
            }
        }
        pruned
    }

    /// Angular de-duplication pass. Returns the number of edges pruned.
    pub fn angular_pass(&self, level: &mut Level) -> usize {
        let mut visited = VisitedWeights::for_level(level);
        let mut pruned = 0;

        for src in level.waypoint_ids() {
            let count = level.edges_from(src).len();
            for i in 0..count {
                for j in 0..count {
                    if i == j {
                        continue;
                    }
                    let edges = level.edges_from(src);
                    let (edge, other) = (&edges[i], &edges[j]);
                    if edge.pruned || !edge.is_prunable() {
                        break;
                    }
                    if other.pruned
                        || !other.is_prunable()
                        || edge.direction.dot(other.direction) < self.config.angular_dot
                    {
                        continue;
                    }
                    let budget = self.config.path_pruning * edge.distance;
                    pruned += prune_longer(level, (src, i), (src, j), budget, &mut visited);
                }
            }
        }
        pruned
    }

    /// Edges near `edge` whose segments pass within tolerance of it.
    fn competitors(&self, level: &Level, edge: &ReachEdge) -> Vec<(WaypointId, usize, f32)> {
        let Some((p1, q1)) = segment(level, edge) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        for near in level.waypoints_within(p1, self.search_radius) {
            for (index, other) in level.edges_from(near).iter().enumerate() {
                if other.pruned
                    || !other.is_prunable()
                    || other.shares_endpoint(edge)
                    || !other.may_prune(edge)
                {
                    continue;
                }
                let Some((p2, q2)) = segment(level, other) else {
                    continue;
                };
                let (a, b) = closest_points_segments(p1, q1, p2, q2);
                let horizontal = (a - b).truncate().length();
                if horizontal < self.config.intersect_tolerance
                    && (a.z - b.z).abs() < self.config.intersect_height_tolerance
                {
                    found.push((near, index, other.distance));
                }
            }
        }
        found
    }
}

fn segment(level: &Level, edge: &ReachEdge) -> Option<(glam::Vec3, glam::Vec3)> {
    Some((
        level.waypoint(edge.start)?.position,
        level.waypoint(edge.end)?.position,
    ))
}

fn edge_at(level: &Level, (start, index): EdgeRef) -> Option<&ReachEdge> {
    level.edges_from(start).get(index)
}

fn is_pruned(level: &Level, at: EdgeRef) -> bool {
    edge_at(level, at).is_none_or(|e| e.pruned)
}

/// Prune the longer of two edges (and its reverse) if connectivity allows.
///
/// Ties prune `a`. Returns the number of edges pruned.
fn prune_longer(
    level: &mut Level,
    a: EdgeRef,
    b: EdgeRef,
    budget: f32,
    visited: &mut VisitedWeights,
) -> usize {
    let (Some(ea), Some(eb)) = (edge_at(level, a), edge_at(level, b)) else {
        return 0;
    };
    let (at, longer) = match ea.distance.partial_cmp(&eb.distance) {
        Some(Ordering::Less) => (b, eb.clone()),
        _ => (a, ea.clone()),
    };
    if longer.pruned || !longer.is_prunable() {
        return 0;
    }

    visited.reset(level.capacity());
    if !has_shortish_alternate_route(level, &longer, longer.distance + budget, visited) {
        return 0;
    }
    trace!(
        "[Prune] Aggressive {} -> {} d={:.1} budget={:.1}",
        longer.start, longer.end, longer.distance, budget
    );
    mark_pruned(level, at.0, at.1);
    let mut pruned = 1;

    let reverse = level
        .waypoint(longer.end)
        .and_then(|w| w.edges.iter().position(|e| e.end == longer.start))
        .map(|index| (longer.end, index));
    if let Some(rev_at) = reverse {
        if let Some(rev) = edge_at(level, rev_at).filter(|e| !e.pruned && e.is_prunable()).cloned() {
            visited.reset(level.capacity());
            if has_shortish_alternate_route(level, &rev, rev.distance + budget, visited) {
                mark_pruned(level, rev_at.0, rev_at.1);
                pruned += 1;
            }
        }
    }
    pruned
}

/// True if `edge.start` reaches `edge.end` without using `edge`, over
/// edges that may stand in for it, within `max_distance`.
pub fn has_shortish_alternate_route(
    level: &Level,
    edge: &ReachEdge,
    max_distance: f32,
    visited: &mut VisitedWeights,
) -> bool {
    visit(level, edge.start, edge, 0.0, max_distance, visited)
}

fn visit(
    level: &Level,
    node: WaypointId,
    excluded: &ReachEdge,
    traveled: f32,
    max_distance: f32,
    visited: &mut VisitedWeights,
) -> bool {
    if traveled > max_distance {
        return false;
    }
    if node == excluded.end {
        return true;
    }
    if visited.get(node) <= traveled {
        return false;
    }
    visited.set(node, traveled);

    let Some(wp) = level.waypoint(node) else {
        return false;
    };
    if wp.flags.blocked && node != excluded.start {
        return false;
    }

    wp.edges.iter().any(|next| {
        !(next.start == excluded.start && next.end == excluded.end)
            && next.distance > MIN_EDGE_DISTANCE
            && next.may_prune(excluded)
            && visit(level, next.end, excluded, traveled + next.distance, max_distance, visited)
    })
}
