//! Edge building configuration section.

use serde::{Deserialize, Serialize};

use crate::core::CapsuleSize;

use super::defaults;

/// Edge building settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PathSection {
    /// Maximum length of a short (standard) edge
    #[serde(default = "defaults::max_path_distance")]
    pub max_path_distance: f32,

    /// Waypoints closer than this raise a warning
    #[serde(default = "defaults::min_separation")]
    pub min_separation: f32,

    /// Capsule sizes probed for standard edges, largest first
    #[serde(default = "defaults::capsule_sizes")]
    pub capsule_sizes: Vec<CapsuleSize>,

    /// Elevation change above which edge length follows the ground
    #[serde(default = "defaults::terrain_tolerance")]
    pub terrain_tolerance: f32,

    /// Ground sample spacing for terrain-adjusted lengths
    #[serde(default = "defaults::terrain_sample_step")]
    pub terrain_sample_step: f32,

    /// Rise above which an edge requires jumping
    #[serde(default = "defaults::max_step_height")]
    pub max_step_height: f32,

    /// Build long-range edges beyond `max_path_distance`
    #[serde(default = "defaults::enabled")]
    pub long_paths: bool,

    /// Upper bound for long-range edges
    #[serde(default = "defaults::long_path_max_distance")]
    pub long_path_max_distance: f32,

    /// Slack added to the satisfactory-route budget
    #[serde(default = "defaults::test_move_size")]
    pub test_move_size: f32,

    /// Nominal length of teleporter edges
    #[serde(default = "defaults::teleport_distance")]
    pub teleport_distance: f32,

    /// Maximum length of jump-point leap edges
    #[serde(default = "defaults::leap_distance")]
    pub leap_distance: f32,
}

impl Default for PathSection {
    fn default() -> Self {
        Self {
            max_path_distance: 1200.0,
            min_separation: 32.0,
            capsule_sizes: defaults::capsule_sizes(),
            terrain_tolerance: 48.0,
            terrain_sample_step: 64.0,
            max_step_height: 35.0,
            long_paths: true,
            long_path_max_distance: 4096.0,
            test_move_size: 200.0, // slack for short detours
            teleport_distance: 100.0,
            leap_distance: 1024.0,
        }
    }
}

impl PathSection {
    /// Largest configured capsule.
    pub fn max_capsule(&self) -> CapsuleSize {
        self.capsule_sizes
            .iter()
            .copied()
            .fold(CapsuleSize::ZERO, CapsuleSize::max)
    }

    /// Smallest configured capsule.
    pub fn min_capsule(&self) -> CapsuleSize {
        self.capsule_sizes
            .iter()
            .copied()
            .reduce(CapsuleSize::min)
            .unwrap_or(CapsuleSize::ZERO)
    }

    /// Builder-style setter for the short edge limit.
    pub fn with_max_path_distance(mut self, distance: f32) -> Self {
        self.max_path_distance = distance;
        self
    }

    /// Builder-style setter for probed capsule sizes. Sizes are stored
    /// largest first.
    pub fn with_capsule_sizes(mut self, sizes: Vec<CapsuleSize>) -> Self {
        self.capsule_sizes = sizes;
        self.sort_capsule_sizes();
        self
    }

    /// Order capsule sizes largest first: by radius, then height.
    pub fn sort_capsule_sizes(&mut self) {
        self.capsule_sizes.sort_by(|a, b| {
            b.radius
                .total_cmp(&a.radius)
                .then(b.height.total_cmp(&a.height))
        });
    }

    /// True if capsule sizes are stored largest first.
    pub fn capsule_sizes_sorted(&self) -> bool {
        self.capsule_sizes
            .windows(2)
            .all(|w| (w[0].radius, w[0].height) >= (w[1].radius, w[1].height))
    }

    /// Builder-style toggle for long-range edges.
    pub fn with_long_paths(mut self, enabled: bool) -> Self {
        self.long_paths = enabled;
        self
    }

    /// Builder-style setter for the long-range upper bound.
    pub fn with_long_path_max_distance(mut self, distance: f32) -> Self {
        self.long_path_max_distance = distance;
        self
    }
}
