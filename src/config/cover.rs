//! Cover network configuration section.

use serde::{Deserialize, Serialize};

use crate::core::CapsuleSize;

use super::defaults;

/// Cover network settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoverSection {
    /// Radius of the character taking cover
    #[serde(default = "defaults::human_radius")]
    pub human_radius: f32,

    /// Half-height of the character taking cover
    #[serde(default = "defaults::human_height")]
    pub human_height: f32,

    /// How far forward a slot looks for a surface to align against
    #[serde(default = "defaults::align_distance")]
    pub align_distance: f32,

    /// Distance kept from the surface after alignment
    #[serde(default = "defaults::align_offset")]
    pub align_offset: f32,

    /// Maximum fire link range
    #[serde(default = "defaults::max_fire_link_dist")]
    pub max_fire_link_dist: f32,

    /// Facing dot required for slots that lean out
    #[serde(default = "defaults::min_fire_link_dot")]
    pub min_fire_link_dot: f32,

    /// Facing dot required otherwise; links below it are fallbacks
    #[serde(default = "defaults::desired_min_fire_link_dot")]
    pub desired_min_fire_link_dot: f32,

    /// Minimum forward-projected distance to a fire link target
    #[serde(default = "defaults::min_fire_angle_dist")]
    pub min_fire_angle_dist: f32,

    /// Facing dot below which a defender is exposed
    #[serde(default = "defaults::exposure_dot")]
    pub exposure_dot: f32,

    /// Wider exposure dot for an edge slot whose lean side faces the shooter
    #[serde(default = "defaults::edge_exposure_dot")]
    pub edge_exposure_dot: f32,

    /// Lateral dot past which a shooter counts as on the lean side
    #[serde(default = "defaults::edge_check_dot")]
    pub edge_check_dot: f32,

    /// Range of danger links to waypoints
    #[serde(default = "defaults::danger_dist")]
    pub danger_dist: f32,

    /// Movement that invalidates links of dynamic cover
    #[serde(default = "defaults::invalidate_distance")]
    pub invalidate_distance: f32,

    /// Forward trace length from the pop-up viewpoint
    #[serde(default = "defaults::popup_forward_dist")]
    pub popup_forward_dist: f32,

    /// Mantle search radius
    #[serde(default = "defaults::mantle_dist")]
    pub mantle_dist: f32,

    /// Direction to the mantle target vs slot facing
    #[serde(default = "defaults::mantle_forward_dot")]
    pub mantle_forward_dot: f32,

    /// Facing of the mantle target vs slot facing (must oppose)
    #[serde(default = "defaults::mantle_facing_dot")]
    pub mantle_facing_dot: f32,

    /// Minimum depth of the cover being mantled over
    #[serde(default = "defaults::mantle_min_depth")]
    pub mantle_min_depth: f32,

    /// Maximum depth of the cover being mantled over
    #[serde(default = "defaults::mantle_max_depth")]
    pub mantle_max_depth: f32,

    /// Swat turn search radius
    #[serde(default = "defaults::swat_turn_dist")]
    pub swat_turn_dist: f32,

    /// Facing alignment between swat turn slots
    #[serde(default = "defaults::swat_cover_dot")]
    pub swat_cover_dot: f32,

    /// Lateral alignment toward the swat turn target
    #[serde(default = "defaults::swat_lateral_dot")]
    pub swat_lateral_dot: f32,

    /// Forward travel of a cover slip
    #[serde(default = "defaults::slip_dist")]
    pub slip_dist: f32,

    /// Search radius for a slot at the end of a slip
    #[serde(default = "defaults::slip_target_radius")]
    pub slip_target_radius: f32,

    /// Viewpoint offsets per action
    #[serde(default)]
    pub view: ViewOffsets,
}

/// Offsets from a slot location to where an occupant looks from.
///
/// Forward and lateral offsets are in the slot's frame; heights are
/// relative to the slot location.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOffsets {
    pub stand_height: f32,
    pub crouch_height: f32,
    pub lean_forward: f32,
    pub lean_lateral: f32,
    pub stand_lean_height: f32,
    pub crouch_lean_height: f32,
    pub popup_forward: f32,
    pub popup_height: f32,
    /// Height of the mantle clearance trace
    pub mantle_height: f32,
}

impl Default for ViewOffsets {
    fn default() -> Self {
        Self {
            stand_height: 60.0,
            crouch_height: 20.0,
            lean_forward: 16.0,
            lean_lateral: 64.0,
            stand_lean_height: 60.0,
            crouch_lean_height: 20.0,
            popup_forward: 24.0,
            popup_height: 60.0,
            mantle_height: 20.0,
        }
    }
}

impl Default for CoverSection {
    fn default() -> Self {
        Self {
            human_radius: 34.0,
            human_height: 88.0,
            align_distance: 96.0,
            align_offset: 40.0,
            max_fire_link_dist: 2048.0,
            min_fire_link_dot: 0.45,
            desired_min_fire_link_dot: 0.65,
            min_fire_angle_dist: 128.0,
            exposure_dot: 0.4,
            edge_exposure_dot: 0.85,
            edge_check_dot: 0.25,
            danger_dist: 1536.0,
            invalidate_distance: 32.0,
            popup_forward_dist: 48.0,
            mantle_dist: 256.0,
            mantle_forward_dot: 0.95,
            mantle_facing_dot: -0.8,
            mantle_min_depth: 32.0,
            mantle_max_depth: 180.0,
            swat_turn_dist: 512.0,
            swat_cover_dot: 0.80,
            swat_lateral_dot: 0.90,
            slip_dist: 128.0,
            slip_target_radius: 64.0,
            view: ViewOffsets::default(),
        }
    }
}

impl CoverSection {
    /// Capsule of the character taking cover.
    #[inline]
    pub fn human(&self) -> CapsuleSize {
        CapsuleSize::new(self.human_radius, self.human_height)
    }

    /// Builder-style setter for fire link range.
    pub fn with_max_fire_link_dist(mut self, dist: f32) -> Self {
        self.max_fire_link_dist = dist;
        self
    }

    /// Builder-style setter for danger link range.
    pub fn with_danger_dist(mut self, dist: f32) -> Self {
        self.danger_dist = dist;
        self
    }

    /// Builder-style setter for dynamic link invalidation distance.
    pub fn with_invalidate_distance(mut self, dist: f32) -> Self {
        self.invalidate_distance = dist;
        self
    }
}
