//! Unified configuration loading for the navigation builder.
//!
//! Loads all configuration from a single YAML file. Every key is optional;
//! missing keys fall back to the values in [`defaults`](self).

mod cover;
mod defaults;
mod error;
mod nav;
mod paths;
mod pruning;
mod review;

// Re-export main types
pub use error::ConfigLoadError;
pub use nav::NavConfig;

// Re-export section types
pub use cover::{CoverSection, ViewOffsets};
pub use paths::PathSection;
pub use pruning::PruneSection;
pub use review::ReviewSection;
