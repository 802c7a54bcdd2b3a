//! YAML level descriptions.
//!
//! A level file names its waypoints and refers to them by name:
//!
//! ```yaml
//! name: courtyard
//! world:
//!   floors:
//!     - { min: [-1000, -1000, -10], max: [1000, 1000, 0] }
//!   blockers:
//!     - { min: [200, -50, 0], max: [240, 50, 200] }
//! movers: [gate]
//! waypoints:
//!   - name: a
//!     position: [0, 0, 88]
//!     forced: [b]
//!   - name: b
//!     kind: { type: door, door: gate }
//!     position: [500, 0, 88]
//! cover_links:
//!   - position: [0, 300, 88]
//!     slots:
//!       - { offset: [0, 0, 0], cover_type: standing }
//! ```

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::CapsuleSize;
use crate::cover::CoverLink;
use crate::error::{NavError, Result};
use crate::level::{Level, Waypoint, WaypointFlags, WaypointKind};
use crate::trace::BoxWorld;

/// A waypoint as authored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WaypointDescription {
    pub name: String,
    #[serde(default = "path_node")]
    pub kind: WaypointKind,
    pub position: Vec3,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub collision: Option<CapsuleSize>,
    #[serde(default)]
    pub flags: WaypointFlags,
    #[serde(default)]
    pub extra_cost: i32,
    /// Names of waypoints that always get an edge from this one.
    #[serde(default)]
    pub forced: Vec<String>,
    /// Names of waypoints that never get an edge from this one.
    #[serde(default)]
    pub proscribed: Vec<String>,
}

fn path_node() -> WaypointKind {
    WaypointKind::PathNode
}

/// A whole level: geometry, movers, waypoints and cover.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LevelDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub world: BoxWorld,
    #[serde(default)]
    pub movers: Vec<String>,
    #[serde(default)]
    pub waypoints: Vec<WaypointDescription>,
    #[serde(default)]
    pub cover_links: Vec<CoverLink>,
}

impl LevelDescription {
    /// Load a level description from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Populate a [`Level`] and return it with the geometry.
    ///
    /// Waypoint names must be unique; forced and proscribed declarations
    /// must name existing waypoints.
    pub fn into_level(self) -> Result<(Level, BoxWorld)> {
        let mut level = Level::new();
        for mover in self.movers {
            level.add_mover(mover);
        }

        for desc in &self.waypoints {
            if level.find_by_name(&desc.name).is_some() {
                return Err(NavError::LevelFormat(format!(
                    "duplicate waypoint name '{}'",
                    desc.name
                )));
            }
            let mut wp = Waypoint::new(desc.kind.clone(), desc.position)
                .with_name(desc.name.clone())
                .with_yaw(desc.yaw)
                .with_flags(desc.flags)
                .with_extra_cost(desc.extra_cost);
            if let Some(collision) = desc.collision {
                wp = wp.with_collision(collision);
            }
            level.add_waypoint(wp);
        }

        let lookup = |level: &Level, name: &str| {
            level
                .find_by_name(name)
                .ok_or_else(|| NavError::UnknownName(name.to_string()))
        };
        for desc in &self.waypoints {
            let from = lookup(&level, &desc.name)?;
            for name in &desc.forced {
                let to = lookup(&level, name)?;
                level.declare_forced(from, to)?;
            }
            for name in &desc.proscribed {
                let to = lookup(&level, name)?;
                level.declare_proscribed(from, to)?;
            }
        }

        for link in self.cover_links {
            level.add_cover_link(link);
        }

        Ok((level, self.world))
    }
}

/// Load a level file into a [`Level`] and its geometry.
pub fn load_level(path: &Path) -> Result<(Level, BoxWorld)> {
    LevelDescription::load(path)?.into_level()
}
