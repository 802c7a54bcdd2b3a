//! Configuration loading errors.

use thiserror::Error;

/// Error raised while loading a [`NavConfig`](super::NavConfig).
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("Failed to read config: {0}")]
    Io(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}
