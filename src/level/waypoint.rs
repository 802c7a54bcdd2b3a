//! Waypoint types.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::{CapsuleSize, forward_from_yaw};
use crate::cover::CoverLinkId;
use crate::trace::GroundBase;

use super::edge::ReachEdge;

/// Stable index of a waypoint in its [`Level`](super::Level).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaypointId(pub u32);

impl WaypointId {
    /// Arena slot of this id.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for WaypointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Authoring and state flags of a waypoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaypointFlags {
    /// Temporarily impassable.
    pub blocked: bool,
    /// Receives edges but never creates standard ones.
    pub destination_only: bool,
    /// Creates edges but never receives automatic ones.
    pub source_only: bool,
    /// Excluded from automatic connection in both directions.
    pub no_auto_connect: bool,
    /// Prefer flying movement; edges touching it require flight.
    pub flying_preferred: bool,
    /// Every other waypoint must be able to reach this one.
    pub must_be_reachable: bool,
    /// Outgoing edges only along the facing direction.
    pub one_way: bool,
    /// Submerged; edges touching it require swimming.
    pub in_water: bool,
}

/// Waypoint subtype. Each kind has its own edge and review strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WaypointKind {
    PathNode,
    /// Marker on a ladder; markers sharing `ladder` connect to each other.
    Ladder { ladder: u32 },
    /// Teleports to the teleporter whose `tag` equals `url`.
    Teleporter {
        tag: String,
        #[serde(default)]
        url: Option<String>,
    },
    /// Center of the lift platform named `lift`.
    LiftCenter {
        #[serde(default)]
        lift: Option<String>,
    },
    /// Exit of the lift named `lift`.
    LiftExit {
        #[serde(default)]
        lift: Option<String>,
    },
    /// Waypoint in a doorway, tied to the door mover named `door`.
    Door {
        #[serde(default)]
        door: Option<String>,
    },
    PlayerStart,
    /// Launch/landing spot for leap edges.
    JumpPoint,
    /// Marker of a cover slot.
    CoverSlot { link: CoverLinkId, slot: usize },
}

impl WaypointKind {
    /// Short name used in logs and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            WaypointKind::PathNode => "PathNode",
            WaypointKind::Ladder { .. } => "Ladder",
            WaypointKind::Teleporter { .. } => "Teleporter",
            WaypointKind::LiftCenter { .. } => "LiftCenter",
            WaypointKind::LiftExit { .. } => "LiftExit",
            WaypointKind::Door { .. } => "Door",
            WaypointKind::PlayerStart => "PlayerStart",
            WaypointKind::JumpPoint => "JumpPoint",
            WaypointKind::CoverSlot { .. } => "CoverSlot",
        }
    }
}

/// A placed navigation-graph node.
#[derive(Clone, Debug)]
pub struct Waypoint {
    pub id: WaypointId,
    /// Optional authoring name.
    pub name: Option<String>,
    pub kind: WaypointKind,
    /// Capsule center.
    pub position: Vec3,
    /// Facing, radians.
    pub yaw: f32,
    /// Capsule occupying the waypoint.
    pub collision: CapsuleSize,
    pub flags: WaypointFlags,
    /// Author-declared targets that always get an edge.
    pub forced: Vec<WaypointId>,
    /// Author-declared targets that never get an edge.
    pub proscribed: Vec<WaypointId>,
    /// Outgoing edges.
    pub edges: Vec<ReachEdge>,
    pub ground_base: Option<GroundBase>,
    /// Largest capsule supported by any surviving outgoing edge.
    pub max_path_size: CapsuleSize,
    /// Additional traversal cost.
    pub extra_cost: i32,
    /// Connected component label, -1 when unassigned.
    pub network_id: i32,
}

impl Waypoint {
    /// Create a waypoint. The id is assigned when added to a level.
    pub fn new(kind: WaypointKind, position: Vec3) -> Self {
        Self {
            id: WaypointId(u32::MAX),
            name: None,
            kind,
            position,
            yaw: 0.0,
            collision: CapsuleSize::new(34.0, 88.0),
            flags: WaypointFlags::default(),
            forced: Vec::new(),
            proscribed: Vec::new(),
            edges: Vec::new(),
            ground_base: None,
            max_path_size: CapsuleSize::ZERO,
            extra_cost: 0,
            network_id: -1,
        }
    }

    /// Plain path node.
    pub fn path_node(position: Vec3) -> Self {
        Self::new(WaypointKind::PathNode, position)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn with_flags(mut self, flags: WaypointFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_collision(mut self, collision: CapsuleSize) -> Self {
        self.collision = collision;
        self
    }

    pub fn with_extra_cost(mut self, cost: i32) -> Self {
        self.extra_cost = cost;
        self
    }

    /// Unit facing direction.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        forward_from_yaw(self.yaw)
    }

    /// Outgoing edge to `end`, if any.
    pub fn edge_to(&self, end: WaypointId) -> Option<&ReachEdge> {
        self.edges.iter().find(|e| e.end == end)
    }

    pub fn edge_to_mut(&mut self, end: WaypointId) -> Option<&mut ReachEdge> {
        self.edges.iter_mut().find(|e| e.end == end)
    }

    /// True if an outgoing edge (of any kind) targets `end`.
    #[inline]
    pub fn has_edge_to(&self, end: WaypointId) -> bool {
        self.edge_to(end).is_some()
    }

    /// Label used in diagnostics: the authoring name or the id.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", name, self.id),
            None => format!("{} {}", self.kind.name(), self.id),
        }
    }

    /// Reset everything the build pass derives.
    pub fn clear_build_state(&mut self) {
        self.edges.clear();
        self.ground_base = None;
        self.max_path_size = CapsuleSize::ZERO;
        self.network_id = -1;
    }
}
