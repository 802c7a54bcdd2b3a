//! Path review.
//!
//! Validation-only checks on a single waypoint. Reviewing never mutates
//! the level; it reads the results of the last build.

use log::trace;

use crate::config::NavConfig;
use crate::level::{Level, WaypointId, WaypointKind};

use super::diagnostics::{Diagnostic, DiagnosticKind, Severity};
use super::kinds;
use super::reach::{MIN_EDGE_DISTANCE, ReachOptions, VisitedWeights, can_reach};

/// Diagnose one waypoint.
///
/// - zero-length edges (error)
/// - missing ground base (warning)
/// - isolated path nodes (warning)
/// - must-be-reachable waypoints that some other waypoint cannot reach
///   (error, capped; a summary reports the rest)
/// - kind-specific checks from the strategy table
pub fn review_path(level: &Level, id: WaypointId, config: &NavConfig) -> Vec<Diagnostic> {
    let Some(wp) = level.waypoint(id) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let strategy = kinds::strategy(&wp.kind);

    for edge in wp.edges.iter().filter(|e| !e.is_proscribed()) {
        if edge.distance <= MIN_EDGE_DISTANCE {
            out.push(
                Diagnostic::error(
                    DiagnosticKind::ZeroLengthEdge,
                    format!("{} has a zero-length edge to {}", wp.label(), edge.end),
                )
                .at(id),
            );
        }
    }

    if wp.ground_base.is_none()
        && strategy.needs_ground
        && !wp.flags.flying_preferred
        && !wp.flags.in_water
    {
        out.push(
            Diagnostic::warning(
                DiagnosticKind::MissingGroundBase,
                format!("{} has no ground beneath it", wp.label()),
            )
            .at(id),
        );
    }

    if wp.kind == WaypointKind::PathNode
        && !wp.edges.iter().any(|e| e.is_traversable())
        && !level.edges().any(|e| e.end == id && e.is_traversable())
    {
        out.push(
            Diagnostic::warning(
                DiagnosticKind::IsolatedWaypoint,
                format!("{} is not connected to anything", wp.label()),
            )
            .at(id),
        );
    }

    if wp.flags.must_be_reachable {
        review_reachability(level, id, config, &mut out);
    }

    out.extend((strategy.review)(level, wp));

    trace!("[Review] {} -> {} diagnostics", id, out.len());
    out
}

fn review_reachability(level: &Level, id: WaypointId, config: &NavConfig, out: &mut Vec<Diagnostic>) {
    let cap = config.review.max_unreachable_reports;
    let mut visited = VisitedWeights::for_level(level);
    let mut failures = 0;

    for other in level.waypoints() {
        if other.id == id || other.flags.destination_only || other.flags.blocked {
            continue;
        }
        visited.reset(level.capacity());
        if can_reach(level, other.id, id, f32::INFINITY, &mut visited, ReachOptions::default()) {
            continue;
        }
        failures += 1;
        if failures <= cap {
            out.push(
                Diagnostic::error(
                    DiagnosticKind::Unreachable,
                    format!("{} cannot reach {}", other.label(), id),
                )
                .at(id),
            );
        }
    }

    if failures > cap {
        out.push(
            Diagnostic::new(
                Severity::Error,
                DiagnosticKind::UnreachableOmitted,
                format!("{} more waypoints cannot reach {}", failures - cap, id),
            )
            .at(id),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CapsuleSize;
    use crate::level::{EdgeKind, ReachEdge, Waypoint, WaypointFlags};
    use glam::Vec3;

    fn flagged_target(level: &mut Level) -> WaypointId {
        let flags = WaypointFlags {
            must_be_reachable: true,
            flying_preferred: true,
            ..Default::default()
        };
        level.add_waypoint(Waypoint::new(WaypointKind::JumpPoint, Vec3::ZERO).with_flags(flags))
    }

    #[test]
    fn test_unreachable_reports_are_capped() {
        let mut level = Level::new();
        let target = flagged_target(&mut level);
        for i in 0..12 {
            let flags = WaypointFlags {
                flying_preferred: true,
                ..Default::default()
            };
            level.add_waypoint(
                Waypoint::new(WaypointKind::JumpPoint, Vec3::new(1000.0 * (i + 1) as f32, 0.0, 0.0))
                    .with_flags(flags),
            );
        }

        let diags = review_path(&level, target, &NavConfig::default());
        assert_eq!(diags.iter().filter(|d| d.kind == DiagnosticKind::Unreachable).count(), 8);
        let omitted: Vec<_> = diags
            .iter()
            .filter(|d| d.kind == DiagnosticKind::UnreachableOmitted)
            .collect();
        assert_eq!(omitted.len(), 1);
        assert!(omitted[0].message.starts_with("4 more"));
    }

    #[test]
    fn test_zero_length_edge_is_error() {
        let mut level = Level::new();
        let a = level.add_waypoint(Waypoint::path_node(Vec3::ZERO));
        let b = level.add_waypoint(Waypoint::path_node(Vec3::ZERO));
        let edge = ReachEdge::between((a, Vec3::ZERO), (b, Vec3::ZERO), EdgeKind::Standard, CapsuleSize::ZERO);
        level.waypoint_mut(a).unwrap().edges.push(edge);

        let diags = review_path(&level, a, &NavConfig::default());
        assert!(diags.iter().any(|d| d.kind == DiagnosticKind::ZeroLengthEdge && d.is_error()));
        // No ground in an empty level
        assert!(diags.iter().any(|d| d.kind == DiagnosticKind::MissingGroundBase));
    }

    #[test]
    fn test_isolated_path_node_warns() {
        let mut level = Level::new();
        let a = level.add_waypoint(Waypoint::path_node(Vec3::ZERO));
        let diags = review_path(&level, a, &NavConfig::default());
        assert!(diags.iter().any(|d| d.kind == DiagnosticKind::IsolatedWaypoint));
    }
}
