//! Per-kind strategies.
//!
//! Every [`WaypointKind`] maps to a [`KindStrategy`]: a table of functions
//! for the edges only that kind creates and the checks only that kind
//! needs during review.

use crate::core::CapsuleSize;
use crate::cover::CoverRef;
use crate::level::{EdgeKind, Level, ReachEdge, ReachFlags, Waypoint, WaypointId, WaypointKind};

use super::diagnostics::{Diagnostic, DiagnosticKind};
use super::edges::EdgeBuilder;

/// Builds the special edges of one waypoint.
pub type SpecialEdgeFn = fn(&EdgeBuilder<'_>, &Level, WaypointId) -> Vec<ReachEdge>;

/// Kind-specific review checks.
pub type ReviewFn = fn(&Level, &Waypoint) -> Vec<Diagnostic>;

/// Function table for one waypoint kind.
pub struct KindStrategy {
    pub special_edges: SpecialEdgeFn,
    pub review: ReviewFn,
    /// Missing ground beneath the waypoint is worth a warning.
    pub needs_ground: bool,
}

static PATH_NODE: KindStrategy = KindStrategy {
    special_edges: no_special_edges,
    review: no_review,
    needs_ground: true,
};

static LADDER: KindStrategy = KindStrategy {
    special_edges: ladder_edges,
    review: review_ladder,
    needs_ground: false,
};

static TELEPORTER: KindStrategy = KindStrategy {
    special_edges: teleporter_edges,
    review: review_teleporter,
    needs_ground: true,
};

static LIFT_CENTER: KindStrategy = KindStrategy {
    special_edges: lift_edges,
    review: review_lift_center,
    needs_ground: false,
};

static LIFT_EXIT: KindStrategy = KindStrategy {
    special_edges: lift_edges,
    review: review_lift_exit,
    needs_ground: true,
};

static DOOR: KindStrategy = KindStrategy {
    special_edges: no_special_edges,
    review: review_door,
    needs_ground: true,
};

static PLAYER_START: KindStrategy = KindStrategy {
    special_edges: no_special_edges,
    review: review_player_start,
    needs_ground: true,
};

static JUMP_POINT: KindStrategy = KindStrategy {
    special_edges: leap_edges,
    review: no_review,
    needs_ground: true,
};

static COVER_SLOT: KindStrategy = KindStrategy {
    special_edges: no_special_edges,
    review: review_slot_marker,
    needs_ground: true,
};

/// Strategy table entry for a kind.
pub fn strategy(kind: &WaypointKind) -> &'static KindStrategy {
    match kind {
        WaypointKind::PathNode => &PATH_NODE,
        WaypointKind::Ladder { .. } => &LADDER,
        WaypointKind::Teleporter { .. } => &TELEPORTER,
        WaypointKind::LiftCenter { .. } => &LIFT_CENTER,
        WaypointKind::LiftExit { .. } => &LIFT_EXIT,
        WaypointKind::Door { .. } => &DOOR,
        WaypointKind::PlayerStart => &PLAYER_START,
        WaypointKind::JumpPoint => &JUMP_POINT,
        WaypointKind::CoverSlot { .. } => &COVER_SLOT,
    }
}

fn no_special_edges(_: &EdgeBuilder<'_>, _: &Level, _: WaypointId) -> Vec<ReachEdge> {
    Vec::new()
}

fn no_review(_: &Level, _: &Waypoint) -> Vec<Diagnostic> {
    Vec::new()
}

/// Edge from `src` to `dest` without capsule fitting.
fn special_edge(level: &Level, src: WaypointId, dest: WaypointId, kind: EdgeKind, size: CapsuleSize) -> Option<ReachEdge> {
    let s = level.waypoint(src)?;
    let d = level.waypoint(dest)?;
    Some(ReachEdge::between((src, s.position), (dest, d.position), kind, size))
}

/// Other waypoints matching `pred`, in id order.
fn others(level: &Level, src: WaypointId, pred: impl Fn(&Waypoint) -> bool) -> Vec<WaypointId> {
    level
        .waypoints()
        .filter(|w| w.id != src && pred(w))
        .map(|w| w.id)
        .collect()
}

// ----------------------------------------------------------------------
// Ladders
// ----------------------------------------------------------------------

fn ladder_of(w: &Waypoint) -> Option<u32> {
    match w.kind {
        WaypointKind::Ladder { ladder } => Some(ladder),
        _ => None,
    }
}

fn ladder_edges(builder: &EdgeBuilder<'_>, level: &Level, src: WaypointId) -> Vec<ReachEdge> {
    let Some(ladder) = level.waypoint(src).and_then(ladder_of) else {
        return Vec::new();
    };
    let size = builder.paths().min_capsule();
    others(level, src, |w| ladder_of(w) == Some(ladder))
        .into_iter()
        .filter_map(|dest| special_edge(level, src, dest, EdgeKind::Ladder, size))
        .collect()
}

fn review_ladder(level: &Level, wp: &Waypoint) -> Vec<Diagnostic> {
    let Some(ladder) = ladder_of(wp) else {
        return Vec::new();
    };
    if others(level, wp.id, |w| ladder_of(w) == Some(ladder)).is_empty() {
        vec![Diagnostic::warning(
            DiagnosticKind::LoneLadder,
            format!("{} is the only marker on ladder {}", wp.label(), ladder),
        )
        .at(wp.id)]
    } else {
        Vec::new()
    }
}

// ----------------------------------------------------------------------
// Teleporters
// ----------------------------------------------------------------------

fn teleporter_tag(w: &Waypoint) -> Option<&str> {
    match &w.kind {
        WaypointKind::Teleporter { tag, .. } => Some(tag.as_str()),
        _ => None,
    }
}

fn teleporter_url(w: &Waypoint) -> Option<&str> {
    match &w.kind {
        WaypointKind::Teleporter { url, .. } => url.as_deref(),
        _ => None,
    }
}

fn teleporter_edges(builder: &EdgeBuilder<'_>, level: &Level, src: WaypointId) -> Vec<ReachEdge> {
    let Some(url) = level.waypoint(src).and_then(teleporter_url) else {
        return Vec::new();
    };
    let size = builder.paths().max_capsule();
    let distance = builder.paths().teleport_distance;
    others(level, src, |w| teleporter_tag(w) == Some(url))
        .into_iter()
        .filter_map(|dest| special_edge(level, src, dest, EdgeKind::Teleport, size))
        .map(|edge| edge.with_distance(distance))
        .collect()
}

fn review_teleporter(level: &Level, wp: &Waypoint) -> Vec<Diagnostic> {
    match teleporter_url(wp) {
        Some(url) if others(level, wp.id, |w| teleporter_tag(w) == Some(url)).is_empty() => {
            vec![Diagnostic::error(
                DiagnosticKind::MissingCounterpart,
                format!("{} points at missing teleporter '{}'", wp.label(), url),
            )
            .at(wp.id)]
        }
        _ => Vec::new(),
    }
}

// ----------------------------------------------------------------------
// Lifts
// ----------------------------------------------------------------------

fn lift_of(w: &Waypoint) -> Option<(&str, bool)> {
    match &w.kind {
        WaypointKind::LiftCenter { lift: Some(l) } => Some((l.as_str(), true)),
        WaypointKind::LiftExit { lift: Some(l) } => Some((l.as_str(), false)),
        _ => None,
    }
}

/// Centers connect to their exits and exits to their center.
fn lift_edges(builder: &EdgeBuilder<'_>, level: &Level, src: WaypointId) -> Vec<ReachEdge> {
    let Some((lift, is_center)) = level.waypoint(src).and_then(lift_of) else {
        return Vec::new();
    };
    let size = builder.paths().max_capsule();
    others(level, src, |w| lift_of(w) == Some((lift, !is_center)))
        .into_iter()
        .filter_map(|dest| special_edge(level, src, dest, EdgeKind::Lift, size))
        .collect()
}

fn review_lift_center(level: &Level, wp: &Waypoint) -> Vec<Diagnostic> {
    match lift_of(wp) {
        Some((lift, _)) if level.has_mover(lift) => Vec::new(),
        Some((lift, _)) => vec![missing(wp, format!("lift platform '{}'", lift))],
        None => vec![missing(wp, "lift platform".to_string())],
    }
}

fn review_lift_exit(level: &Level, wp: &Waypoint) -> Vec<Diagnostic> {
    match lift_of(wp) {
        Some((lift, _)) if !others(level, wp.id, |w| lift_of(w) == Some((lift, true))).is_empty() => {
            Vec::new()
        }
        Some((lift, _)) => vec![missing(wp, format!("center of lift '{}'", lift))],
        None => vec![missing(wp, "lift center".to_string())],
    }
}

// ----------------------------------------------------------------------
// Doors, player starts, slot markers
// ----------------------------------------------------------------------

fn review_door(level: &Level, wp: &Waypoint) -> Vec<Diagnostic> {
    match &wp.kind {
        WaypointKind::Door { door: Some(door) } if level.has_mover(door) => Vec::new(),
        WaypointKind::Door { door: Some(door) } => vec![missing(wp, format!("door '{}'", door))],
        _ => vec![missing(wp, "door".to_string())],
    }
}

fn review_player_start(_: &Level, wp: &Waypoint) -> Vec<Diagnostic> {
    if wp.edges.iter().any(ReachEdge::is_traversable) {
        return Vec::new();
    }
    vec![Diagnostic::warning(
        DiagnosticKind::DisconnectedPlayerStart,
        format!("{} has no way into the level", wp.label()),
    )
    .at(wp.id)]
}

fn review_slot_marker(level: &Level, wp: &Waypoint) -> Vec<Diagnostic> {
    let WaypointKind::CoverSlot { link, slot } = wp.kind else {
        return Vec::new();
    };
    let slot_ref = CoverRef::new(link, slot);
    match level.slot(slot_ref) {
        Some(s) if s.marker == Some(wp.id) => Vec::new(),
        _ => vec![Diagnostic::error(
            DiagnosticKind::OrphanSlotMarker,
            format!("{} does not belong to {}", wp.label(), slot_ref),
        )
        .at(wp.id)],
    }
}

fn missing(wp: &Waypoint, what: String) -> Diagnostic {
    Diagnostic::error(
        DiagnosticKind::MissingCounterpart,
        format!("{} is missing its {}", wp.label(), what),
    )
    .at(wp.id)
}

// ----------------------------------------------------------------------
// Jump points
// ----------------------------------------------------------------------

fn leap_edges(builder: &EdgeBuilder<'_>, level: &Level, src: WaypointId) -> Vec<ReachEdge> {
    let Some(s) = level.waypoint(src) else {
        return Vec::new();
    };
    let size = builder.paths().min_capsule();
    let flags = ReachFlags {
        jumping: true,
        ..ReachFlags::WALK
    };
    level
        .waypoints_within(s.position, builder.paths().leap_distance)
        .into_iter()
        .filter(|&id| id != src)
        .filter_map(|id| level.waypoint(id))
        .filter(|w| w.kind == WaypointKind::JumpPoint)
        .filter(|w| builder.trace().is_clear(s.position, w.position, size))
        .filter_map(|w| special_edge(level, src, w.id, EdgeKind::Leap, size))
        .map(|edge| edge.with_flags(flags))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::diagnostics::BuildReport;
    use crate::config::NavConfig;
    use crate::trace::BoxWorld;
    use glam::Vec3;

    fn build_special(level: &mut Level) {
        let config = NavConfig::default();
        let world = BoxWorld::new();
        let builder = EdgeBuilder::new(&config, &world);
        let mut report = BuildReport::default();
        for id in level.waypoint_ids() {
            builder.add_special_edges(level, id, &mut report);
        }
    }

    #[test]
    fn test_ladder_markers_connect() {
        let mut level = Level::new();
        let bottom = level.add_waypoint(Waypoint::new(WaypointKind::Ladder { ladder: 1 }, Vec3::ZERO));
        let top = level.add_waypoint(Waypoint::new(
            WaypointKind::Ladder { ladder: 1 },
            Vec3::new(0.0, 0.0, 400.0),
        ));
        let other = level.add_waypoint(Waypoint::new(
            WaypointKind::Ladder { ladder: 2 },
            Vec3::new(50.0, 0.0, 0.0),
        ));
        build_special(&mut level);

        assert_eq!(level.edge(bottom, top).unwrap().kind, EdgeKind::Ladder);
        assert_eq!(level.edge(top, bottom).unwrap().kind, EdgeKind::Ladder);
        assert!(level.edge(bottom, other).is_none());
        assert_eq!(review_ladder(&level, level.waypoint(other).unwrap()).len(), 1);
    }

    #[test]
    fn test_teleporter_uses_fixed_distance() {
        let mut level = Level::new();
        let a = level.add_waypoint(Waypoint::new(
            WaypointKind::Teleporter {
                tag: "a".into(),
                url: Some("b".into()),
            },
            Vec3::ZERO,
        ));
        let b = level.add_waypoint(Waypoint::new(
            WaypointKind::Teleporter {
                tag: "b".into(),
                url: Some("nowhere".into()),
            },
            Vec3::new(9000.0, 0.0, 0.0),
        ));
        build_special(&mut level);

        let edge = level.edge(a, b).unwrap();
        assert_eq!(edge.kind, EdgeKind::Teleport);
        assert_eq!(edge.distance, 100.0);
        assert!(level.edge(b, a).is_none());
        assert!(review_teleporter(&level, level.waypoint(a).unwrap()).is_empty());
        assert_eq!(review_teleporter(&level, level.waypoint(b).unwrap()).len(), 1);
    }

    #[test]
    fn test_lift_edges_and_review() {
        let mut level = Level::new();
        let center = level.add_waypoint(Waypoint::new(
            WaypointKind::LiftCenter {
                lift: Some("lift1".into()),
            },
            Vec3::ZERO,
        ));
        let exit = level.add_waypoint(Waypoint::new(
            WaypointKind::LiftExit {
                lift: Some("lift1".into()),
            },
            Vec3::new(0.0, 150.0, 0.0),
        ));
        build_special(&mut level);

        assert_eq!(level.edge(center, exit).unwrap().kind, EdgeKind::Lift);
        assert_eq!(level.edge(exit, center).unwrap().kind, EdgeKind::Lift);

        // No platform registered yet
        let diags = review_lift_center(&level, level.waypoint(center).unwrap());
        assert_eq!(diags[0].kind, DiagnosticKind::MissingCounterpart);
        level.add_mover("lift1");
        assert!(review_lift_center(&level, level.waypoint(center).unwrap()).is_empty());
        assert!(review_lift_exit(&level, level.waypoint(exit).unwrap()).is_empty());
    }

    #[test]
    fn test_leap_edges_require_jumping() {
        let mut level = Level::new();
        let a = level.add_waypoint(Waypoint::new(WaypointKind::JumpPoint, Vec3::ZERO));
        let b = level.add_waypoint(Waypoint::new(WaypointKind::JumpPoint, Vec3::new(600.0, 0.0, 0.0)));
        let far = level.add_waypoint(Waypoint::new(WaypointKind::JumpPoint, Vec3::new(3000.0, 0.0, 0.0)));
        build_special(&mut level);

        let edge = level.edge(a, b).unwrap();
        assert_eq!(edge.kind, EdgeKind::Leap);
        assert!(edge.flags.jumping);
        assert!(level.edge(a, far).is_none());
    }

    #[test]
    fn test_door_without_mover_is_error() {
        let mut level = Level::new();
        let door = level.add_waypoint(Waypoint::new(WaypointKind::Door { door: None }, Vec3::ZERO));
        let diags = review_door(&level, level.waypoint(door).unwrap());
        assert!(diags[0].is_error());
    }
}
