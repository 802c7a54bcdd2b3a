//! # Marga-Nav: Waypoint Graph and Cover Network Builder
//!
//! Builds the navigation data AI agents path over: a directed graph of
//! reach edges between authored waypoints, pruned of redundant edges and
//! labelled with connected networks, plus a tactical cover network of
//! fire, exposure, danger and movement links between cover slots.
//!
//! ## Quick Start
//!
//! ```rust
//! use glam::Vec3;
//! use marga_nav::build::PathBuilder;
//! use marga_nav::config::NavConfig;
//! use marga_nav::level::{Level, Waypoint};
//! use marga_nav::trace::BoxWorld;
//!
//! let mut level = Level::new();
//! let a = level.add_waypoint(Waypoint::path_node(Vec3::new(0.0, 0.0, 88.0)));
//! let b = level.add_waypoint(Waypoint::path_node(Vec3::new(400.0, 0.0, 88.0)));
//!
//! let builder = PathBuilder::new(NavConfig::default());
//! let report = builder.build_paths(&mut level, &BoxWorld::new());
//!
//! assert!(level.edge(a, b).is_some());
//! assert!(level.can_reach(b, a, f32::INFINITY));
//! println!("{} edges survive", report.stats.surviving_edges);
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: capsule sizes and yaw/segment math
//! - [`config`]: YAML configuration
//! - [`trace`]: the collision queries the builders consume, and a box world
//! - [`level`]: waypoints, reach edges, the registry and spatial index
//! - [`build`]: edge building, pruning, reachability and review
//! - [`cover`]: cover links, slots and the cover network
//! - [`io`]: YAML level descriptions
//!
//! ## Data Flow
//!
//! ```text
//!      ┌─────────────────┐         ┌──────────────────────┐
//!      │ Level file/API  │         │  TraceCollaborator   │
//!      │ waypoints+cover │         │ (host engine / Box)  │
//!      └────────┬────────┘         └──────────┬───────────┘
//!               │                             │ traces, ground probes
//!               ▼                             ▼
//!      ┌──────────────────────────────────────────────────┐
//!      │                   PathBuilder                    │
//!      │  edges ─► prune ─► long edges ─► aggressive      │
//!      │  ─► network ids ─► cover network ─► review       │
//!      └────────┬─────────────────────────────┬───────────┘
//!               │                             │
//!               ▼                             ▼
//!      ┌─────────────────┐         ┌──────────────────────┐
//!      │  Level (graph,  │         │     BuildReport      │
//!      │  cover links)   │         │ diagnostics + stats  │
//!      └────────┬────────┘         └──────────────────────┘
//!               │
//!               ├──► can_reach / find_route
//!               └──► fire_link / exposure / transitions / claims
//! ```

pub mod build;
pub mod config;
pub mod core;
pub mod cover;
pub mod error;
pub mod io;
pub mod level;
pub mod trace;

pub use build::{BuildReport, Diagnostic, PathBuilder, Severity, review_path};
pub use config::NavConfig;
pub use error::{NavError, Result};
pub use level::{Level, Waypoint, WaypointId};
