//! Edge builder.
//!
//! Synthesizes reach edges between waypoint pairs:
//!
//! - **Standard**: straight segments probed with the trace collaborator at
//!   a descending list of capsule sizes; the first size that fits wins
//! - **Proscribed**: author-declared "never connect" stubs
//! - **Forced**: author-declared, no capsule fitting
//! - **Long-range**: beyond the standard length, only where no
//!   satisfactory route exists yet
//! - **Special**: per-kind edges from the [`kinds`](super::kinds) table
//!
//! Finding no edge between a pair is normal and never reported.

use glam::Vec3;
use log::{debug, trace};

use crate::config::{NavConfig, PathSection};
use crate::core::CapsuleSize;
use crate::level::{EdgeKind, Level, ReachEdge, ReachFlags, WaypointId};
use crate::trace::TraceCollaborator;

use super::diagnostics::{BuildReport, Diagnostic, DiagnosticKind};
use super::kinds;
use super::reach::{VisitedWeights, has_satisfactory_route};

/// Builds reach edges for a level.
pub struct EdgeBuilder<'a> {
    config: &'a NavConfig,
    trace: &'a dyn TraceCollaborator,
}

impl<'a> EdgeBuilder<'a> {
    pub fn new(config: &'a NavConfig, trace: &'a dyn TraceCollaborator) -> Self {
        Self { config, trace }
    }

    #[inline]
    pub fn paths(&self) -> &PathSection {
        &self.config.paths
    }

    #[inline]
    pub fn trace(&self) -> &dyn TraceCollaborator {
        self.trace
    }

    /// Policy pre-filter for an automatic edge from `src` to `dest`.
    pub fn can_connect_to(
        &self,
        level: &Level,
        src: WaypointId,
        dest: WaypointId,
        check_distance: bool,
    ) -> bool {
        if src == dest {
            return false;
        }
        let (Some(s), Some(d)) = (level.waypoint(src), level.waypoint(dest)) else {
            return false;
        };
        if d.flags.no_auto_connect || d.flags.source_only {
            return false;
        }
        let delta = d.position - s.position;
        if s.flags.one_way && delta.dot(s.forward()) <= 0.0 {
            return false;
        }
        let max = self.paths().max_path_distance;
        !(check_distance && delta.length_squared() > max * max)
    }

    /// Probe `from -> to` with each configured capsule, largest first.
    pub fn fit_capsule(&self, from: Vec3, to: Vec3) -> Option<CapsuleSize> {
        self.paths()
            .capsule_sizes
            .iter()
            .copied()
            .find(|&size| self.trace.is_clear(from, to, size))
    }

    /// Travel length between two positions.
    ///
    /// Straight-line, unless the elevation change exceeds the terrain
    /// tolerance; then the ground is sampled along the way and the piecewise
    /// length is used. Falls back to straight-line if any sample finds no
    /// ground.
    pub fn travel_distance(&self, from: Vec3, to: Vec3) -> f32 {
        let straight = from.distance(to);
        let paths = self.paths();
        if (to.z - from.z).abs() <= paths.terrain_tolerance || paths.terrain_sample_step <= 0.0 {
            return straight;
        }

        let horizontal = Vec3::new(to.x - from.x, to.y - from.y, 0.0).length();
        let samples = ((horizontal / paths.terrain_sample_step).ceil() as usize).max(1);
        let lift = Vec3::Z * (to.z - from.z).abs();

        let mut points = Vec::with_capacity(samples + 1);
        points.push(from);
        for i in 1..samples {
            let p = from.lerp(to, i as f32 / samples as f32);
            match self.trace.find_ground_base(p + lift) {
                Some(ground) => points.push(ground.point),
                None => return straight,
            }
        }
        points.push(to);

        let along: f32 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
        along.max(straight)
    }

    /// Build a capsule-fitted edge, or `None` if no capsule fits.
    pub fn define_edge(
        &self,
        level: &Level,
        src: WaypointId,
        dest: WaypointId,
        kind: EdgeKind,
    ) -> Option<ReachEdge> {
        let s = level.waypoint(src)?;
        let d = level.waypoint(dest)?;
        let size = self.fit_capsule(s.position, d.position)?;

        let flags = ReachFlags {
            flying: s.flags.flying_preferred || d.flags.flying_preferred,
            swimming: s.flags.in_water || d.flags.in_water,
            jumping: d.position.z - s.position.z > self.paths().max_step_height,
        };
        let distance = self.travel_distance(s.position, d.position);

        trace!(
            "[EdgeBuilder] {} -> {} {:?} d={:.1} r={:.0} h={:.0}",
            src, dest, kind, distance, size.radius, size.height
        );
        Some(
            ReachEdge::between((src, s.position), (dest, d.position), kind, size)
                .with_distance(distance)
                .with_flags(flags),
        )
    }

    /// Snap every waypoint to its ground.
    pub fn assign_ground_bases(&self, level: &mut Level) {
        for wp in level.waypoints_mut() {
            wp.ground_base = self.trace.find_ground_base(wp.position);
        }
    }

    /// Add proscribed stubs, standard edges and forced edges for `src`.
    pub fn add_reach_edges(&self, level: &mut Level, src: WaypointId, report: &mut BuildReport) {
        let Some(s) = level.waypoint(src) else {
            return;
        };
        let (position, flags) = (s.position, s.flags);
        let proscribed = s.proscribed.clone();
        let forced = s.forced.clone();
        let stats = &mut report.stats;

        let mut new_edges: Vec<ReachEdge> = Vec::new();

        for &p in &proscribed {
            if let Some(d) = level.waypoint(p) {
                new_edges.push(ReachEdge::between(
                    (src, position),
                    (p, d.position),
                    EdgeKind::Proscribed,
                    CapsuleSize::ZERO,
                ));
                stats.proscribed_stubs += 1;
            }
        }

        let mut too_close = Vec::new();
        for dest in level.waypoints_within(position, self.paths().max_path_distance) {
            if dest == src {
                continue;
            }
            let Some(d) = level.waypoint(dest) else {
                continue;
            };
            let distance = position.distance(d.position);
            if distance < self.paths().min_separation && src < dest {
                too_close.push((dest, distance));
            }
            if proscribed.contains(&dest) || forced.contains(&dest) {
                continue;
            }
            if flags.destination_only || flags.no_auto_connect {
                continue;
            }
            if !self.can_connect_to(level, src, dest, true) {
                continue;
            }
            if let Some(edge) = self.define_edge(level, src, dest, EdgeKind::Standard) {
                new_edges.push(edge);
                stats.standard_edges += 1;
            }
        }

        let forward = level.waypoint(src).map(|w| w.forward()).unwrap_or(Vec3::X);
        for &f in &forced {
            if proscribed.contains(&f) {
                continue;
            }
            let Some(d) = level.waypoint(f) else {
                continue;
            };
            if flags.one_way && (d.position - position).dot(forward) < 0.0 {
                continue;
            }
            new_edges.push(ReachEdge::between(
                (src, position),
                (f, d.position),
                EdgeKind::Forced,
                self.paths().max_capsule(),
            ));
            stats.forced_edges += 1;
        }

        for (dest, distance) in too_close {
            report.push(
                Diagnostic::warning(
                    DiagnosticKind::TooClose,
                    format!("{} is only {:.1} units from {}", src, distance, dest),
                )
                .at(src),
            );
        }

        if let Some(s) = level.waypoint_mut(src) {
            s.edges.extend(new_edges);
        }
    }

    /// Add per-kind special edges for `src`.
    ///
    /// A special edge replaces an existing automatic edge to the same
    /// destination but never a proscribed stub or a forced edge.
    pub fn add_special_edges(&self, level: &mut Level, src: WaypointId, report: &mut BuildReport) {
        let Some(kind) = level.waypoint(src).map(|w| w.kind.clone()) else {
            return;
        };
        let edges = (kinds::strategy(&kind).special_edges)(self, level, src);
        let Some(s) = level.waypoint_mut(src) else {
            return;
        };
        for edge in edges {
            match s.edge_to_mut(edge.end) {
                Some(existing) if existing.is_proscribed() || existing.is_forced() => {}
                Some(existing) => *existing = edge,
                None => {
                    s.edges.push(edge);
                    report.stats.special_edges += 1;
                }
            }
        }
    }

    /// Connect waypoints further apart than the standard limit where the
    /// graph offers no satisfactory route yet. Returns the number added.
    pub fn add_long_edges(&self, level: &mut Level) -> usize {
        let paths = self.paths();
        if !paths.long_paths {
            return 0;
        }

        let mut visited = VisitedWeights::for_level(level);
        let max_sq = paths.max_path_distance * paths.max_path_distance;
        let mut added = 0;

        for src in level.waypoint_ids() {
            let Some(s) = level.waypoint(src) else {
                continue;
            };
            if s.flags.destination_only || s.flags.no_auto_connect {
                continue;
            }
            let position = s.position;

            for dest in level.waypoints_within(position, paths.long_path_max_distance) {
                if !self.can_connect_to(level, src, dest, false) || level.edge(src, dest).is_some() {
                    continue;
                }
                let Some(d) = level.waypoint(dest) else {
                    continue;
                };
                let dist_sq = position.distance_squared(d.position);
                if dist_sq <= max_sq {
                    continue;
                }
                if !self.trace.is_clear(position, d.position, CapsuleSize::ZERO) {
                    continue;
                }
                if has_satisfactory_route(
                    level,
                    src,
                    dest,
                    dist_sq.sqrt(),
                    paths.test_move_size,
                    self.config.pruning.path_pruning,
                    &mut visited,
                ) {
                    continue;
                }
                if let Some(edge) = self.define_edge(level, src, dest, EdgeKind::LongRange) {
                    if let Some(s) = level.waypoint_mut(src) {
                        s.edges.push(edge);
                        added += 1;
                    }
                }
            }
        }

        debug!("[EdgeBuilder] Added {} long-range edges", added);
        added
    }
}

/// Narrow opposite-direction edges to the smaller capsule of the pair.
///
/// Forced and proscribed edges keep their sizes.
pub fn reconcile_symmetric_sizes(level: &mut Level) {
    let mut pairs: Vec<(WaypointId, WaypointId, CapsuleSize)> = Vec::new();
    for wp in level.waypoints() {
        for edge in wp.edges.iter().filter(|e| reconcilable(e) && e.start < e.end) {
            if let Some(reverse) = level.edge(edge.end, edge.start).filter(|r| reconcilable(r)) {
                pairs.push((edge.start, edge.end, edge.size.min(reverse.size)));
            }
        }
    }

    for (a, b, size) in pairs {
        for (from, to) in [(a, b), (b, a)] {
            if let Some(edge) = level.waypoint_mut(from).and_then(|w| w.edge_to_mut(to)) {
                edge.size = size;
            }
        }
    }
}

#[inline]
fn reconcilable(edge: &ReachEdge) -> bool {
    !edge.is_forced() && !edge.is_proscribed()
}
