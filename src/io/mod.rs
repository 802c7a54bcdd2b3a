//! Level description files.

mod level_file;

pub use level_file::{LevelDescription, WaypointDescription, load_level};
