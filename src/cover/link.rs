//! Cover link and slot types.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::{forward_from_yaw, left_from_yaw, normalize_angle};
use crate::level::WaypointId;

/// Stable index of a cover link in its level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoverLinkId(pub u32);

impl CoverLinkId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Weak reference to one slot of one cover link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoverRef {
    pub link: CoverLinkId,
    pub slot: usize,
}

impl CoverRef {
    #[inline]
    pub const fn new(link: CoverLinkId, slot: usize) -> Self {
        Self { link, slot }
    }
}

impl fmt::Display for CoverRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cover {}:{}", self.link.0, self.slot)
    }
}

/// Height of the cover at a slot. Ordered from lowest to highest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverType {
    #[default]
    None,
    MidLevel,
    Standing,
}

/// What an occupant does to see past its cover.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverAction {
    /// Stays in cover.
    Default,
    LeanLeft,
    LeanRight,
    /// Rises over mid-level cover.
    PopUp,
}

/// One viable (stance, action) pair on each end of a fire link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireLinkItem {
    pub src_type: CoverType,
    pub src_action: CoverAction,
    pub dest_type: CoverType,
    pub dest_action: CoverAction,
}

/// Line-of-fire relation from a slot to a target slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FireLink {
    pub target: CoverRef,
    pub target_marker: WaypointId,
    /// Viable combinations; never empty.
    pub items: Vec<FireLinkItem>,
    /// Source slot location when the link was built.
    pub src_position: Vec3,
    /// Target slot location when the link was built.
    pub dest_position: Vec3,
    /// Built with the looser facing threshold only.
    pub fallback: bool,
    /// Touches a movable cover link.
    pub dynamic: bool,
}

/// Back-reference on a target slot: who can shoot it and how exposed it is.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExposedFireLink {
    pub source: CoverRef,
    /// 0 = fully protected, 1 = fully exposed.
    pub exposure: f32,
}

/// A waypoint threatened from a slot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DangerLink {
    pub waypoint: WaypointId,
    pub danger_cost: f32,
}

/// Authoring permissions of a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotPermissions {
    pub lean_left: bool,
    pub lean_right: bool,
    pub pop_up: bool,
    pub mantle: bool,
    pub climb_up: bool,
    pub cover_slip: bool,
    pub swat_turn: bool,
}

impl Default for SlotPermissions {
    fn default() -> Self {
        Self {
            lean_left: true,
            lean_right: true,
            pop_up: true,
            mantle: true,
            climb_up: true,
            cover_slip: true,
            swat_turn: true,
        }
    }
}

/// Capabilities computed by the cover builder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCapabilities {
    pub left_edge: bool,
    pub right_edge: bool,
    pub lean_left: bool,
    pub lean_right: bool,
    pub pop_up: bool,
    pub mantle: bool,
    pub climb_up: bool,
    pub slip_left: bool,
    pub slip_right: bool,
    pub swat_turn_left: bool,
    pub swat_turn_right: bool,
}

/// A single lean-and-shoot position within a cover link.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoverSlot {
    /// Location in the link's frame.
    pub offset: Vec3,
    /// Facing relative to the link.
    #[serde(default)]
    pub yaw_offset: f32,
    #[serde(default)]
    pub cover_type: CoverType,
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub permissions: SlotPermissions,

    #[serde(skip)]
    pub caps: SlotCapabilities,
    #[serde(skip)]
    pub mantle_target: Option<CoverRef>,
    #[serde(skip)]
    pub slip_target_left: Option<CoverRef>,
    #[serde(skip)]
    pub slip_target_right: Option<CoverRef>,
    #[serde(skip)]
    pub turn_target_left: Option<CoverRef>,
    #[serde(skip)]
    pub turn_target_right: Option<CoverRef>,
    #[serde(skip)]
    pub fire_links: Vec<FireLink>,
    #[serde(skip)]
    pub exposed_fire_links: Vec<ExposedFireLink>,
    #[serde(skip)]
    pub danger_links: Vec<DangerLink>,
    /// Slot marker in the waypoint graph.
    #[serde(skip)]
    pub marker: Option<WaypointId>,
    /// Runtime occupant.
    #[serde(skip)]
    pub claimed_by: Option<u32>,
}

fn enabled() -> bool {
    true
}

impl CoverSlot {
    /// Create an enabled slot at `offset` in the link frame.
    pub fn new(offset: Vec3, cover_type: CoverType) -> Self {
        Self {
            offset,
            yaw_offset: 0.0,
            cover_type,
            enabled: true,
            permissions: SlotPermissions::default(),
            caps: SlotCapabilities::default(),
            mantle_target: None,
            slip_target_left: None,
            slip_target_right: None,
            turn_target_left: None,
            turn_target_right: None,
            fire_links: Vec::new(),
            exposed_fire_links: Vec::new(),
            danger_links: Vec::new(),
            marker: None,
            claimed_by: None,
        }
    }

    pub fn with_permissions(mut self, permissions: SlotPermissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_yaw_offset(mut self, yaw: f32) -> Self {
        self.yaw_offset = yaw;
        self
    }

    /// Drop every derived link and capability.
    pub fn clear_links(&mut self) {
        self.caps = SlotCapabilities::default();
        self.mantle_target = None;
        self.slip_target_left = None;
        self.slip_target_right = None;
        self.turn_target_left = None;
        self.turn_target_right = None;
        self.fire_links.clear();
        self.exposed_fire_links.clear();
        self.danger_links.clear();
    }

    /// Scrub references into a removed link.
    pub fn forget_link(&mut self, link: CoverLinkId) {
        let keep = |r: &Option<CoverRef>| r.filter(|r| r.link != link);
        self.mantle_target = keep(&self.mantle_target);
        self.slip_target_left = keep(&self.slip_target_left);
        self.slip_target_right = keep(&self.slip_target_right);
        self.turn_target_left = keep(&self.turn_target_left);
        self.turn_target_right = keep(&self.turn_target_right);
        self.fire_links.retain(|f| f.target.link != link);
        self.exposed_fire_links.retain(|e| e.source.link != link);
    }

    /// True if the slot can lean out either side.
    #[inline]
    pub fn can_lean(&self) -> bool {
        self.caps.lean_left || self.caps.lean_right
    }
}

/// A group of cover slots along one piece of cover.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoverLink {
    #[serde(skip, default = "unassigned")]
    pub id: CoverLinkId,
    #[serde(default)]
    pub name: Option<String>,
    pub position: Vec3,
    #[serde(default)]
    pub yaw: f32,
    pub slots: Vec<CoverSlot>,
    /// Last slot wraps around to the first.
    #[serde(default)]
    pub circular: bool,
    /// Slots form a closed loop; no edge slots.
    #[serde(default)]
    pub looped: bool,
    /// Order slots left to right before building.
    #[serde(default)]
    pub auto_sort: bool,
    /// Align slots against the nearest cover surface.
    #[serde(default)]
    pub auto_adjust: bool,
    /// May move at runtime; its fire links can go stale.
    #[serde(default)]
    pub dynamic: bool,
    #[serde(default)]
    pub disabled: bool,
}

fn unassigned() -> CoverLinkId {
    CoverLinkId(u32::MAX)
}

impl CoverLink {
    /// Create a link. The id is assigned when added to a level.
    pub fn new(position: Vec3, yaw: f32, slots: Vec<CoverSlot>) -> Self {
        Self {
            id: unassigned(),
            name: None,
            position,
            yaw,
            slots,
            circular: false,
            looped: false,
            auto_sort: false,
            auto_adjust: false,
            dynamic: false,
            disabled: false,
        }
    }

    pub fn with_dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    pub fn with_auto_adjust(mut self, auto_adjust: bool) -> Self {
        self.auto_adjust = auto_adjust;
        self
    }

    pub fn with_circular(mut self, circular: bool) -> Self {
        self.circular = circular;
        self
    }

    /// World location of a slot.
    pub fn slot_location(&self, idx: usize) -> Vec3 {
        let offset = self.slots.get(idx).map(|s| s.offset).unwrap_or(Vec3::ZERO);
        self.position + forward_from_yaw(self.yaw) * offset.x + left_from_yaw(self.yaw) * offset.y
            + Vec3::Z * offset.z
    }

    /// World yaw of a slot.
    pub fn slot_yaw(&self, idx: usize) -> f32 {
        let rel = self.slots.get(idx).map(|s| s.yaw_offset).unwrap_or(0.0);
        normalize_angle(self.yaw + rel)
    }

    #[inline]
    pub fn slot_forward(&self, idx: usize) -> Vec3 {
        forward_from_yaw(self.slot_yaw(idx))
    }

    #[inline]
    pub fn slot_left(&self, idx: usize) -> Vec3 {
        left_from_yaw(self.slot_yaw(idx))
    }

    /// Place a slot at a world location and yaw.
    pub fn set_slot_world(&mut self, idx: usize, location: Vec3, yaw: f32) {
        let rel = location - self.position;
        let (fwd, left) = (forward_from_yaw(self.yaw), left_from_yaw(self.yaw));
        let link_yaw = self.yaw;
        if let Some(slot) = self.slots.get_mut(idx) {
            slot.offset = Vec3::new(rel.dot(fwd), rel.dot(left), rel.z);
            slot.yaw_offset = normalize_angle(yaw - link_yaw);
        }
    }

    /// True if the slot ends the cover on its left (`left`) or right side.
    ///
    /// Looped and circular links have no edges. Otherwise a slot is an edge
    /// when it is the first/last slot, or its neighbour on that side is
    /// disabled or offers higher cover.
    pub fn is_edge_slot(&self, idx: usize, left: bool) -> bool {
        if self.looped || self.circular || idx >= self.slots.len() {
            return false;
        }
        let neighbour = if left {
            idx.checked_sub(1)
        } else {
            Some(idx + 1).filter(|&n| n < self.slots.len())
        };
        match neighbour {
            None => true,
            Some(n) => {
                let (this, other) = (&self.slots[idx], &self.slots[n]);
                !other.enabled || other.cover_type > this.cover_type
            }
        }
    }

    /// Sort slots from right to left along the link's lateral axis, so the
    /// first slot is the leftmost when facing the cover.
    pub fn sort_slots(&mut self) {
        self.slots.sort_by(|a, b| b.offset.y.total_cmp(&a.offset.y));
    }
}
