//! Reachability oracle.
//!
//! - [`can_reach`]: bounded, label-correcting weighted flood
//! - [`build_network_ids`]: connected-component labelling
//! - [`find_route`]: Dijkstra shortest route for runtime queries
//!
//! Searches record the best distance seen per waypoint in an explicit
//! [`VisitedWeights`] table instead of on the waypoints themselves, so a
//! search never mutates the level and can be run in isolation.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, trace};

use crate::level::{Level, ReachEdge, WaypointId};

/// Edges shorter than this are ignored by searches.
pub(crate) const MIN_EDGE_DISTANCE: f32 = 1e-3;

/// Best accumulated distance per waypoint during a search.
#[derive(Clone, Debug)]
pub struct VisitedWeights {
    weights: Vec<f32>,
}

impl VisitedWeights {
    /// Table sized for a level arena of `capacity` waypoints, all unvisited.
    pub fn new(capacity: usize) -> Self {
        Self {
            weights: vec![f32::INFINITY; capacity],
        }
    }

    /// Table sized for `level`.
    pub fn for_level(level: &Level) -> Self {
        Self::new(level.capacity())
    }

    /// Mark every waypoint unvisited, growing the table if the level grew.
    pub fn reset(&mut self, capacity: usize) {
        self.weights.clear();
        self.weights.resize(capacity, f32::INFINITY);
    }

    #[inline]
    pub fn get(&self, id: WaypointId) -> f32 {
        self.weights.get(id.index()).copied().unwrap_or(f32::INFINITY)
    }

    #[inline]
    pub fn set(&mut self, id: WaypointId, weight: f32) {
        if let Some(w) = self.weights.get_mut(id.index()) {
            *w = weight;
        }
    }
}

/// Search options.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReachOptions {
    /// Ignore edges that require flying.
    pub skip_flying: bool,
}

/// True if `to` is reachable from `from` within `budget` travel distance.
///
/// Expands a waypoint again only when a strictly shorter distance to it is
/// found; this is not a shortest-path search and may stop at the first
/// route inside the budget. Proscribed and pruned edges, and blocked
/// intermediate waypoints, are never traversed. Callers must reset
/// `visited` before each query.
pub fn can_reach(
    level: &Level,
    from: WaypointId,
    to: WaypointId,
    budget: f32,
    visited: &mut VisitedWeights,
    options: ReachOptions,
) -> bool {
    if budget < 1.0 || !level.contains(from) || !level.contains(to) {
        return false;
    }
    if from == to {
        return true;
    }

    visited.set(from, 0.0);
    let mut stack = vec![(from, 0.0_f32)];

    while let Some((node, acc)) = stack.pop() {
        if acc > visited.get(node) {
            continue;
        }
        for edge in level.edges_from(node) {
            if !traversable(edge, options) {
                continue;
            }
            let next = acc + edge.distance;
            if next > budget {
                continue;
            }
            if edge.end == to {
                return true;
            }
            if next >= visited.get(edge.end) {
                continue;
            }
            match level.waypoint(edge.end) {
                Some(end) if !end.flags.blocked => {
                    visited.set(edge.end, next);
                    stack.push((edge.end, next));
                }
                _ => {}
            }
        }
    }
    false
}

#[inline]
fn traversable(edge: &ReachEdge, options: ReachOptions) -> bool {
    edge.is_traversable()
        && edge.distance > MIN_EDGE_DISTANCE
        && !(options.skip_flying && edge.flags.flying)
}

/// True if `from` already has an acceptable route to `to`: a direct edge,
/// or a path within `slack + distance * pruning`.
///
/// Flying edges only count when either endpoint prefers flying.
pub fn has_satisfactory_route(
    level: &Level,
    from: WaypointId,
    to: WaypointId,
    distance: f32,
    slack: f32,
    pruning: f32,
    visited: &mut VisitedWeights,
) -> bool {
    if level.edge(from, to).is_some_and(ReachEdge::is_traversable) {
        return true;
    }
    let flying = [from, to]
        .iter()
        .any(|&id| level.waypoint(id).is_some_and(|w| w.flags.flying_preferred));
    visited.reset(level.capacity());
    can_reach(
        level,
        from,
        to,
        slack + distance * pruning,
        visited,
        ReachOptions {
            skip_flying: !flying,
        },
    )
}

/// Label every waypoint with a connected-component id.
///
/// Waypoints are visited in id order; an unseen waypoint starts a new
/// network and its surviving edges pull their endpoints into it. When an
/// edge joins two different networks, the one with the larger id is
/// repainted into the smaller. Ids are finally compacted to `0..n` in
/// order of first appearance. Returns the number of networks.
pub fn build_network_ids(level: &mut Level) -> usize {
    let capacity = level.capacity();
    let mut ids = vec![-1_i32; capacity];
    let mut next = 0;

    for id in level.waypoint_ids() {
        if ids[id.index()] == -1 {
            ids[id.index()] = next;
            next += 1;
        }
        for edge in level.edges_from(id) {
            if !edge.is_traversable() || !level.contains(edge.end) {
                continue;
            }
            let current = ids[id.index()];
            let neighbour = ids[edge.end.index()];
            if neighbour == -1 {
                ids[edge.end.index()] = current;
            } else if neighbour != current {
                let (keep, repaint) = (current.min(neighbour), current.max(neighbour));
                trace!("[Reach] Merging network {} into {}", repaint, keep);
                for v in ids.iter_mut().filter(|v| **v == repaint) {
                    *v = keep;
                }
            }
        }
    }

    // Compact
    let mut remap: Vec<i32> = vec![-1; next.max(0) as usize];
    let mut count = 0;
    for id in level.waypoint_ids() {
        let raw = ids[id.index()] as usize;
        if remap[raw] == -1 {
            remap[raw] = count;
            count += 1;
        }
        ids[id.index()] = remap[raw];
    }

    for wp in level.waypoints_mut() {
        wp.network_id = ids[wp.id.index()];
    }

    debug!("[Reach] {} networks over {} waypoints", count, level.len());
    count as usize
}

/// State for the route priority queue.
#[derive(Clone, Copy, Debug)]
struct RouteState {
    cost: f32,
    node: WaypointId,
}

impl PartialEq for RouteState {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl Eq for RouteState {}

impl Ord for RouteState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for RouteState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A route through the waypoint graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    /// Waypoints from start to goal, inclusive.
    pub waypoints: Vec<WaypointId>,
    /// Total cost (distances plus extra costs).
    pub cost: f32,
}

/// Cheapest route from `start` to `goal`.
///
/// Edge cost is its distance plus the end waypoint's extra cost.
pub fn find_route(level: &Level, start: WaypointId, goal: WaypointId) -> Option<Route> {
    if !level.contains(start) || !level.contains(goal) {
        return None;
    }
    if start == goal {
        return Some(Route {
            waypoints: vec![start],
            cost: 0.0,
        });
    }

    let n = level.capacity();
    let mut dist = vec![f32::INFINITY; n];
    let mut prev: Vec<Option<WaypointId>> = vec![None; n];
    dist[start.index()] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(RouteState {
        cost: 0.0,
        node: start,
    });

    while let Some(RouteState { cost, node }) = heap.pop() {
        if cost > dist[node.index()] {
            continue;
        }
        if node == goal {
            break;
        }
        for edge in level.edges_from(node) {
            if !traversable(edge, ReachOptions::default()) {
                continue;
            }
            let Some(end) = level.waypoint(edge.end) else {
                continue;
            };
            if end.flags.blocked && end.id != goal {
                continue;
            }
            let new_cost = cost + edge.distance + end.extra_cost.max(0) as f32;
            if new_cost < dist[end.id.index()] {
                dist[end.id.index()] = new_cost;
                prev[end.id.index()] = Some(node);
                heap.push(RouteState {
                    cost: new_cost,
                    node: end.id,
                });
            }
        }
    }

    prev[goal.index()]?;

    let mut waypoints = vec![goal];
    let mut current = goal;
    while let Some(p) = prev[current.index()] {
        waypoints.push(p);
        current = p;
    }
    waypoints.reverse();

    Some(Route {
        waypoints,
        cost: dist[goal.index()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CapsuleSize;
    use crate::level::{EdgeKind, Waypoint};
    use glam::Vec3;

    fn add(level: &mut Level, x: f32, y: f32) -> WaypointId {
        level.add_waypoint(Waypoint::path_node(Vec3::new(x, y, 0.0)))
    }

    fn connect(level: &mut Level, a: WaypointId, b: WaypointId, kind: EdgeKind) {
        let pa = level.waypoint(a).unwrap().position;
        let pb = level.waypoint(b).unwrap().position;
        let edge = ReachEdge::between((a, pa), (b, pb), kind, CapsuleSize::new(34.0, 88.0));
        level.waypoint_mut(a).unwrap().edges.push(edge);
    }

    fn both(level: &mut Level, a: WaypointId, b: WaypointId) {
        connect(level, a, b, EdgeKind::Standard);
        connect(level, b, a, EdgeKind::Standard);
    }

    /// a - b - c chain, 100 units apart
    fn chain() -> (Level, [WaypointId; 3]) {
        let mut level = Level::new();
        let a = add(&mut level, 0.0, 0.0);
        let b = add(&mut level, 100.0, 0.0);
        let c = add(&mut level, 200.0, 0.0);
        both(&mut level, a, b);
        both(&mut level, b, c);
        (level, [a, b, c])
    }

    #[test]
    fn test_can_reach_respects_budget() {
        let (level, [a, _, c]) = chain();
        assert!(level.can_reach(a, c, 200.0));
        assert!(!level.can_reach(a, c, 199.0));
        assert!(level.can_reach(a, a, 5.0));
        assert!(!level.can_reach(a, a, 0.5));
    }

    #[test]
    fn test_can_reach_skips_proscribed_and_pruned() {
        let (mut level, [a, b, c]) = chain();
        level.waypoint_mut(b).unwrap().edge_to_mut(c).unwrap().pruned = true;
        assert!(!level.can_reach(a, c, 1e6));

        let (mut level, [a, b, c]) = chain();
        level.waypoint_mut(b).unwrap().edge_to_mut(c).unwrap().kind = EdgeKind::Proscribed;
        assert!(!level.can_reach(a, c, 1e6));
        assert!(level.can_reach(c, a, 1e6));
    }

    #[test]
    fn test_can_reach_avoids_blocked_waypoints() {
        let (mut level, [a, b, c]) = chain();
        level.waypoint_mut(b).unwrap().flags.blocked = true;
        assert!(!level.can_reach(a, c, 1e6));
        // A blocked destination is still reachable.
        assert!(level.can_reach(a, b, 1e6));
    }

    #[test]
    fn test_can_reach_skip_flying() {
        let (mut level, [a, b, c]) = chain();
        level.waypoint_mut(a).unwrap().edge_to_mut(b).unwrap().flags.flying = true;
        let mut visited = VisitedWeights::for_level(&level);
        let options = ReachOptions { skip_flying: true };
        assert!(!can_reach(&level, a, c, 1e6, &mut visited, options));
        visited.reset(level.capacity());
        assert!(can_reach(&level, a, c, 1e6, &mut visited, ReachOptions::default()));
    }

    #[test]
    fn test_network_ids_merge_and_compact() {
        let mut level = Level::new();
        let a = add(&mut level, 0.0, 0.0);
        let b = add(&mut level, 100.0, 0.0);
        let c = add(&mut level, 200.0, 0.0);
        let lone = add(&mut level, 5000.0, 0.0);
        // c is seen before the edge c -> b links it back to a's network
        connect(&mut level, a, b, EdgeKind::Standard);
        connect(&mut level, c, b, EdgeKind::Standard);

        let count = build_network_ids(&mut level);
        assert_eq!(count, 2);
        let id = |w| level.waypoint(w).unwrap().network_id;
        assert_eq!(id(a), 0);
        assert_eq!(id(b), 0);
        assert_eq!(id(c), 0);
        assert_eq!(id(lone), 1);
    }

    #[test]
    fn test_find_route_prefers_cheaper() {
        let mut level = Level::new();
        let a = add(&mut level, 0.0, 0.0);
        let b = add(&mut level, 100.0, 100.0);
        let c = add(&mut level, 100.0, -100.0);
        let d = add(&mut level, 200.0, 0.0);
        both(&mut level, a, b);
        both(&mut level, b, d);
        both(&mut level, a, c);
        both(&mut level, c, d);
        level.waypoint_mut(b).unwrap().extra_cost = 50;

        let route = find_route(&level, a, d).unwrap();
        assert_eq!(route.waypoints, vec![a, c, d]);
        assert!((route.cost - 2.0 * 141.42136).abs() < 1e-2);

        assert!(find_route(&level, d, WaypointId(99)).is_none());
    }
}
