//! Pruning configuration section.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Basic and aggressive pruning settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PruneSection {
    /// Alternate routes up to this multiple of the edge length make it redundant
    #[serde(default = "defaults::path_pruning")]
    pub path_pruning: f32,

    /// Run the aggressive intersection and angular passes
    #[serde(default = "defaults::enabled")]
    pub aggressive: bool,

    /// Horizontal distance under which two edges count as intersecting
    #[serde(default = "defaults::intersect_tolerance")]
    pub intersect_tolerance: f32,

    /// Vertical separation under which two edges count as intersecting
    #[serde(default = "defaults::intersect_height_tolerance")]
    pub intersect_height_tolerance: f32,

    /// Intersection pass budget, as a fraction of the shorter edge
    #[serde(default = "defaults::intersect_budget_scale")]
    pub intersect_budget_scale: f32,

    /// Intersection pass budget lower bound
    #[serde(default = "defaults::intersect_budget_floor")]
    pub intersect_budget_floor: f32,

    /// Direction dot above which co-originating edges are duplicates (~35°)
    #[serde(default = "defaults::angular_dot")]
    pub angular_dot: f32,
}

impl Default for PruneSection {
    fn default() -> Self {
        Self {
            path_pruning: 1.2,
            aggressive: true,
            intersect_tolerance: 25.0,
            intersect_height_tolerance: 88.0,
            intersect_budget_scale: 0.6,
            intersect_budget_floor: 512.0,
            angular_dot: 0.807, // cos(~36°)
        }
    }
}

impl PruneSection {
    /// Budget for the intersection pass given the shorter edge's length.
    #[inline]
    pub fn intersect_budget(&self, shorter: f32) -> f32 {
        (self.intersect_budget_scale * shorter).max(self.intersect_budget_floor)
    }

    /// Builder-style toggle for the aggressive passes.
    pub fn with_aggressive(mut self, enabled: bool) -> Self {
        self.aggressive = enabled;
        self
    }

    /// Builder-style setter for the pruning tolerance.
    pub fn with_path_pruning(mut self, factor: f32) -> Self {
        self.path_pruning = factor;
        self
    }

    /// Builder-style setter for the intersection budget floor.
    pub fn with_intersect_budget_floor(mut self, floor: f32) -> Self {
        self.intersect_budget_floor = floor;
        self
    }
}
