//! Mathematical utilities for angles and geometry.
//!
//! All angles are in radians. Z is up; yaw rotates counter-clockwise
//! around Z starting from +X.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

/// Normalize angle to [-π, π).
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a >= PI {
        a -= TAU;
    } else if a < -PI {
        a += TAU;
    }
    a
}

/// Unit forward axis for a yaw.
#[inline]
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), yaw.sin(), 0.0)
}

/// Unit left axis for a yaw (forward rotated +90° around Z).
#[inline]
pub fn left_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), yaw.cos(), 0.0)
}

/// Yaw of a direction projected onto the XY plane.
#[inline]
pub fn yaw_from_direction(dir: Vec3) -> f32 {
    dir.y.atan2(dir.x)
}

/// Distance from `point` to the infinite line through `origin` along `dir`.
///
/// `dir` does not need to be normalized; a zero direction yields the
/// distance to `origin`.
pub fn point_line_distance(point: Vec3, origin: Vec3, dir: Vec3) -> f32 {
    let dir = dir.normalize_or_zero();
    let rel = point - origin;
    (rel - dir * rel.dot(dir)).length()
}

/// Closest points between segments `p1-q1` and `p2-q2`.
///
/// Returns `(c1, c2)` where `c1` lies on the first segment and `c2` on the
/// second. Degenerate (zero length) segments are treated as points.
pub fn closest_points_segments(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    const EPS: f32 = 1e-6;

    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    let (s, t) = if a <= EPS && e <= EPS {
        (0.0, 0.0)
    } else if a <= EPS {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= EPS {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let mut s = if denom > EPS {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    (p1 + d1 * s, p2 + d2 * t)
}
