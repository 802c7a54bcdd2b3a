//! Core geometric types shared by the graph and cover builders.
//!
//! This module provides:
//! - [`CapsuleSize`]: the collision capsule a traversal requires
//! - [`math`]: yaw axes, segment distances and other small helpers
//!
//! ## Coordinate Frame
//!
//! - X-forward, Y-left, Z-up
//! - Yaw is counter-clockwise positive, in radians
//! - Waypoint and slot positions are capsule centers

mod capsule;
pub mod math;

pub use capsule::CapsuleSize;
pub use math::{
    closest_points_segments, forward_from_yaw, left_from_yaw, normalize_angle,
    point_line_distance, yaw_from_direction,
};
