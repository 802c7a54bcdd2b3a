//! Shared fixtures for integration tests.

#![allow(dead_code)]

use glam::Vec3;
use marga_nav::build::{BuildReport, PathBuilder};
use marga_nav::config::NavConfig;
use marga_nav::cover::{CoverLink, CoverRef, CoverSlot, CoverType};
use marga_nav::level::{Level, Waypoint, WaypointId};
use marga_nav::trace::{Aabb, BoxWorld};

/// Waypoint and slot centers stand this high above the ground.
pub const EYE: f32 = 88.0;

/// Open world with a large walkable floor at z = 0.
pub fn ground_world() -> BoxWorld {
    BoxWorld::new().with_floor(Aabb::new(
        Vec3::new(-5000.0, -5000.0, -20.0),
        Vec3::new(5000.0, 5000.0, 0.0),
    ))
}

/// Full-height wall spanning the given XY rectangle.
pub fn wall(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Aabb {
    Aabb::new(Vec3::new(min_x, min_y, 0.0), Vec3::new(max_x, max_y, 400.0))
}

pub fn node(level: &mut Level, x: f32, y: f32) -> WaypointId {
    level.add_waypoint(Waypoint::path_node(Vec3::new(x, y, EYE)))
}

/// Cover link with a single slot at its origin.
pub fn single_slot(level: &mut Level, x: f32, y: f32, yaw: f32, cover_type: CoverType) -> CoverRef {
    let link = CoverLink::new(
        Vec3::new(x, y, EYE),
        yaw,
        vec![CoverSlot::new(Vec3::ZERO, cover_type)],
    );
    CoverRef::new(level.add_cover_link(link), 0)
}

pub fn build(level: &mut Level, world: &BoxWorld) -> BuildReport {
    build_with(level, world, NavConfig::default())
}

pub fn build_with(level: &mut Level, world: &BoxWorld, config: NavConfig) -> BuildReport {
    env_logger::try_init().ok();
    PathBuilder::new(config).build_paths(level, world)
}

/// (start, end, kind, radius, height, distance) of every edge, in order.
pub fn edge_summary(level: &Level) -> Vec<(u32, u32, String, f32, f32, f32)> {
    level
        .edges()
        .map(|e| {
            (
                e.start.0,
                e.end.0,
                format!("{:?}", e.kind),
                e.size.radius,
                e.size.height,
                e.distance,
            )
        })
        .collect()
}
