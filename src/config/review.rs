//! Review configuration section.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Review/diagnostic settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewSection {
    /// Unreachable-source errors reported per must-be-reachable waypoint
    #[serde(default = "defaults::max_unreachable_reports")]
    pub max_unreachable_reports: usize,

    /// Review every waypoint at the end of a build
    #[serde(default = "defaults::enabled")]
    pub review_after_build: bool,
}

impl Default for ReviewSection {
    fn default() -> Self {
        Self {
            max_unreachable_reports: 8,
            review_after_build: true,
        }
    }
}
