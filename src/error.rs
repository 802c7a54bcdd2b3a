//! Error types for marga-nav.
//!
//! Build problems are reported as [`Diagnostic`](crate::build::Diagnostic)s,
//! not errors; these cover loading inputs and misuse of the registry.

use thiserror::Error;

use crate::config::ConfigLoadError;
use crate::level::WaypointId;

/// marga-nav error type
#[derive(Error, Debug)]
pub enum NavError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("Level format error: {0}")]
    LevelFormat(String),

    #[error("Unknown waypoint {0}")]
    UnknownWaypoint(WaypointId),

    #[error("Unknown waypoint name '{0}'")]
    UnknownName(String),
}

impl From<serde_yaml::Error> for NavError {
    fn from(e: serde_yaml::Error) -> Self {
        NavError::LevelFormat(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
