//! Graph and cover invariants that hold for any build.

mod common;

use std::f32::consts::TAU;

use marga_nav::config::NavConfig;
use marga_nav::cover::CoverType;
use marga_nav::level::{EdgeKind, Level, WaypointId};
use marga_nav::trace::{BoxWorld, TraceCollaborator};

use common::*;

/// `n` x `n` grid of path nodes, `spacing` apart.
fn grid(level: &mut Level, n: usize, spacing: f32) -> Vec<WaypointId> {
    let mut ids = Vec::new();
    for i in 0..n {
        for j in 0..n {
            ids.push(node(level, i as f32 * spacing, j as f32 * spacing));
        }
    }
    ids
}

/// Fire link targets, exposures and danger links of every slot, in order.
fn cover_summary(level: &Level) -> Vec<String> {
    let mut out = Vec::new();
    for link in level.cover_links() {
        for (idx, slot) in link.slots.iter().enumerate() {
            for f in &slot.fire_links {
                out.push(format!("{}/{} fire {} {}", link.id.0, idx, f.target, f.items.len()));
            }
            for e in &slot.exposed_fire_links {
                out.push(format!("{}/{} exposed {} {:.4}", link.id.0, idx, e.source, e.exposure));
            }
            for d in &slot.danger_links {
                out.push(format!("{}/{} danger {} {:.2}", link.id.0, idx, d.waypoint, d.danger_cost));
            }
        }
    }
    out
}

/// A yard with a partial wall and a pillar so edges get different sizes.
fn cluttered_world() -> BoxWorld {
    ground_world()
        .with_blocker(wall(430.0, -100.0, 470.0, 500.0))
        .with_blocker(wall(130.0, 730.0, 170.0, 770.0))
}

#[test]
fn test_pruned_pairs_stay_reachable() {
    let mut level = Level::new();
    let ids = grid(&mut level, 4, 300.0);
    let world = cluttered_world();
    let config = NavConfig::default();

    let report = build_with(&mut level, &world, config.clone());
    assert!(report.stats.pruned_basic + report.stats.pruned_intersect + report.stats.pruned_angular > 0);

    let min = config.paths.min_capsule();
    for &a in &ids {
        for &b in &ids {
            if a == b {
                continue;
            }
            let (pa, pb) = (level.waypoint(a).unwrap().position, level.waypoint(b).unwrap().position);
            if pa.distance(pb) > config.paths.max_path_distance || !world.is_clear(pa, pb, min) {
                continue;
            }
            assert!(level.can_reach(a, b, f32::INFINITY), "{} cannot reach {}", a, b);
        }
    }
}

#[test]
fn test_rebuild_is_idempotent() {
    let mut level = Level::new();
    grid(&mut level, 3, 400.0);
    single_slot(&mut level, 200.0, -300.0, TAU / 4.0, CoverType::Standing);
    single_slot(&mut level, 600.0, 1100.0, -TAU / 4.0, CoverType::MidLevel);
    let world = cluttered_world();

    let first = build(&mut level, &world);
    let edges = edge_summary(&level);
    let cover = cover_summary(&level);
    assert!(cover.iter().any(|line| line.contains("danger")));
    let networks: Vec<i32> = level.waypoints().map(|w| w.network_id).collect();

    let second = build(&mut level, &world);
    assert_eq!(edge_summary(&level), edges);
    assert_eq!(cover_summary(&level), cover);
    assert_eq!(level.waypoints().map(|w| w.network_id).collect::<Vec<_>>(), networks);
    assert_eq!(first.stats.surviving_edges, second.stats.surviving_edges);
    assert_eq!(first.stats.fire_links, second.stats.fire_links);
    assert_eq!(first.stats.danger_links, second.stats.danger_links);
    assert_eq!(first.diagnostics.len(), second.diagnostics.len());
}

#[test]
fn test_opposite_edges_share_size() {
    let mut level = Level::new();
    grid(&mut level, 4, 300.0);
    build(&mut level, &cluttered_world());

    let geometric = |k: EdgeKind| matches!(k, EdgeKind::Standard | EdgeKind::LongRange);
    for edge in level.edges().filter(|e| geometric(e.kind)) {
        if let Some(reverse) = level.edge(edge.end, edge.start).filter(|r| geometric(r.kind)) {
            assert_eq!(edge.size, reverse.size);
        }
    }
}

#[test]
fn test_extra_cost_is_never_negative() {
    let mut level = Level::new();
    let ids = grid(&mut level, 2, 300.0);
    level.waypoint_mut(ids[0]).unwrap().extra_cost = -25;

    build(&mut level, &ground_world());

    assert!(level.waypoints().all(|w| w.extra_cost >= 0));
}

#[test]
fn test_network_ids_follow_edges() {
    let mut level = Level::new();
    grid(&mut level, 4, 300.0);
    // Splits the grid into two sealed halves
    let world = ground_world().with_blocker(wall(430.0, -5000.0, 470.0, 5000.0));

    let report = build(&mut level, &world);

    assert_eq!(report.stats.networks, 2);
    assert!(level.waypoints().all(|w| w.network_id >= 0));
    for edge in level.edges().filter(|e| e.is_traversable()) {
        let start = level.waypoint(edge.start).unwrap().network_id;
        let end = level.waypoint(edge.end).unwrap().network_id;
        assert_eq!(start, end);
    }
}

#[test]
fn test_exposure_stays_in_unit_range() {
    let mut level = Level::new();
    for i in 0..8 {
        let angle = i as f32 * TAU / 8.0;
        // Facings skewed away from the center by varying amounts
        let yaw = angle + TAU / 2.0 + (i as f32 - 4.0) * 0.3;
        let cover = if i % 2 == 0 { CoverType::Standing } else { CoverType::MidLevel };
        single_slot(&mut level, 600.0 * angle.cos(), 600.0 * angle.sin(), yaw, cover);
    }

    let report = build(&mut level, &ground_world());
    assert!(report.stats.exposed_fire_links > 0);

    for link in level.cover_links() {
        for slot in &link.slots {
            for exposed in &slot.exposed_fire_links {
                assert!(exposed.exposure > 0.0 && exposed.exposure <= 1.0);
            }
        }
    }
}
