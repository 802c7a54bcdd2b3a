//! Level state: waypoints, reach edges, cover links and the spatial index.
//!
//! - [`Waypoint`] and [`WaypointKind`]: placed navigation nodes
//! - [`ReachEdge`]: directed, sized connections between waypoints
//! - [`Level`]: the arena owning every waypoint and cover link
//! - [`SpatialIndex`]: radius queries over waypoint positions

mod edge;
mod registry;
mod spatial;
mod waypoint;

pub use edge::{EdgeKind, ReachEdge, ReachFlags};
pub use registry::Level;
pub use spatial::SpatialIndex;
pub use waypoint::{Waypoint, WaypointFlags, WaypointId, WaypointKind};
