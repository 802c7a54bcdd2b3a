//! Default value functions for serde deserialization.

use crate::core::CapsuleSize;

pub fn enabled() -> bool {
    true
}

// Paths

pub fn max_path_distance() -> f32 {
    1200.0
}

pub fn min_separation() -> f32 {
    32.0
}

pub fn capsule_sizes() -> Vec<CapsuleSize> {
    vec![
        CapsuleSize::new(96.0, 120.0),
        CapsuleSize::new(64.0, 100.0),
        CapsuleSize::new(34.0, 88.0),
    ]
}

pub fn terrain_tolerance() -> f32 {
    48.0
}

pub fn terrain_sample_step() -> f32 {
    64.0
}

pub fn max_step_height() -> f32 {
    35.0
}

pub fn long_path_max_distance() -> f32 {
    4096.0
}

pub fn test_move_size() -> f32 {
    200.0
}

pub fn teleport_distance() -> f32 {
    100.0
}

pub fn leap_distance() -> f32 {
    1024.0
}

// Pruning

pub fn path_pruning() -> f32 {
    1.2
}

pub fn intersect_tolerance() -> f32 {
    25.0
}

pub fn intersect_height_tolerance() -> f32 {
    88.0
}

pub fn intersect_budget_scale() -> f32 {
    0.6
}

pub fn intersect_budget_floor() -> f32 {
    512.0
}

pub fn angular_dot() -> f32 {
    0.807
}

// Cover

pub fn human_radius() -> f32 {
    34.0
}

pub fn human_height() -> f32 {
    88.0
}

pub fn align_distance() -> f32 {
    96.0
}

pub fn align_offset() -> f32 {
    40.0
}

pub fn max_fire_link_dist() -> f32 {
    2048.0
}

pub fn min_fire_link_dot() -> f32 {
    0.45
}

pub fn desired_min_fire_link_dot() -> f32 {
    0.65
}

pub fn min_fire_angle_dist() -> f32 {
    128.0
}

pub fn exposure_dot() -> f32 {
    0.4
}

pub fn edge_exposure_dot() -> f32 {
    0.85
}

pub fn edge_check_dot() -> f32 {
    0.25
}

pub fn danger_dist() -> f32 {
    1536.0
}

pub fn invalidate_distance() -> f32 {
    32.0
}

pub fn popup_forward_dist() -> f32 {
    48.0
}

pub fn mantle_dist() -> f32 {
    256.0
}

pub fn mantle_forward_dot() -> f32 {
    0.95
}

pub fn mantle_facing_dot() -> f32 {
    -0.8
}

pub fn mantle_min_depth() -> f32 {
    32.0
}

pub fn mantle_max_depth() -> f32 {
    180.0
}

pub fn swat_turn_dist() -> f32 {
    512.0
}

pub fn swat_cover_dot() -> f32 {
    0.80
}

pub fn swat_lateral_dot() -> f32 {
    0.90
}

pub fn slip_dist() -> f32 {
    128.0
}

pub fn slip_target_radius() -> f32 {
    64.0
}

// Review

pub fn max_unreachable_reports() -> usize {
    8
}
