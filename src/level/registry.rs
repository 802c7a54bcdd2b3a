//! Waypoint registry.
//!
//! [`Level`] owns every waypoint and cover link in arenas indexed by stable
//! ids. Edges and cover transitions refer to each other by id, never by
//! pointer, so removing an entity only has to scrub those ids.

use std::collections::BTreeSet;

use glam::Vec3;
use log::debug;

use crate::build::reach::{ReachOptions, VisitedWeights, can_reach};
use crate::cover::{CoverLink, CoverLinkId, CoverRef, CoverSlot};
use crate::error::{NavError, Result};

use super::edge::ReachEdge;
use super::spatial::SpatialIndex;
use super::waypoint::{Waypoint, WaypointId};

/// All navigation state of one level.
#[derive(Clone, Debug, Default)]
pub struct Level {
    waypoints: Vec<Option<Waypoint>>,
    cover_links: Vec<Option<CoverLink>>,
    /// Named dynamic geometry (lift platforms, doors).
    movers: BTreeSet<String>,
    spatial: SpatialIndex,
}

impl Level {
    /// Create an empty level.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Waypoints
    // ------------------------------------------------------------------

    /// Add a waypoint and index it. Returns its id.
    pub fn add_waypoint(&mut self, mut waypoint: Waypoint) -> WaypointId {
        let id = WaypointId(self.waypoints.len() as u32);
        waypoint.id = id;
        self.spatial.insert(id, waypoint.position);
        self.waypoints.push(Some(waypoint));
        id
    }

    /// Destroy a waypoint: drop it from the spatial index and delete every
    /// edge, declaration and cover reference pointing at it.
    pub fn remove_waypoint(&mut self, id: WaypointId) -> Option<Waypoint> {
        let removed = self.waypoints.get_mut(id.index())?.take()?;
        self.spatial.remove(id, removed.position);

        for wp in self.waypoints.iter_mut().flatten() {
            wp.edges.retain(|e| e.end != id);
            wp.forced.retain(|&f| f != id);
            wp.proscribed.retain(|&p| p != id);
        }
        for link in self.cover_links.iter_mut().flatten() {
            for slot in &mut link.slots {
                if slot.marker == Some(id) {
                    slot.marker = None;
                }
                slot.fire_links.retain(|f| f.target_marker != id);
                slot.danger_links.retain(|d| d.waypoint != id);
            }
        }

        debug!("[Level] Removed waypoint {}", removed.label());
        Some(removed)
    }

    pub fn waypoint(&self, id: WaypointId) -> Option<&Waypoint> {
        self.waypoints.get(id.index()).and_then(Option::as_ref)
    }

    pub fn waypoint_mut(&mut self, id: WaypointId) -> Option<&mut Waypoint> {
        self.waypoints.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Like [`Level::waypoint`] but reports unknown ids as errors.
    pub fn try_waypoint(&self, id: WaypointId) -> Result<&Waypoint> {
        self.waypoint(id).ok_or(NavError::UnknownWaypoint(id))
    }

    /// True if `id` names a live waypoint.
    #[inline]
    pub fn contains(&self, id: WaypointId) -> bool {
        self.waypoint(id).is_some()
    }

    /// Live waypoints in id order.
    pub fn waypoints(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter().flatten()
    }

    pub fn waypoints_mut(&mut self) -> impl Iterator<Item = &mut Waypoint> {
        self.waypoints.iter_mut().flatten()
    }

    /// Ids of live waypoints in order.
    pub fn waypoint_ids(&self) -> Vec<WaypointId> {
        self.waypoints().map(|w| w.id).collect()
    }

    /// Number of live waypoints.
    pub fn len(&self) -> usize {
        self.waypoints().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Arena size; every id index is below this.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.waypoints.len()
    }

    /// Find a waypoint by authoring name.
    pub fn find_by_name(&self, name: &str) -> Option<WaypointId> {
        self.waypoints()
            .find(|w| w.name.as_deref() == Some(name))
            .map(|w| w.id)
    }

    /// Move a waypoint, keeping the spatial index in sync.
    pub fn set_position(&mut self, id: WaypointId, position: Vec3) -> Result<()> {
        let wp = self.waypoint_mut(id).ok_or(NavError::UnknownWaypoint(id))?;
        let old = std::mem::replace(&mut wp.position, position);
        self.spatial.remove(id, old);
        self.spatial.insert(id, position);
        Ok(())
    }

    /// Declare an edge that must always exist from `from` to `to`.
    pub fn declare_forced(&mut self, from: WaypointId, to: WaypointId) -> Result<()> {
        self.try_waypoint(to)?;
        let wp = self.waypoint_mut(from).ok_or(NavError::UnknownWaypoint(from))?;
        if !wp.forced.contains(&to) {
            wp.forced.push(to);
        }
        Ok(())
    }

    /// Declare that `from` must never connect to `to`.
    pub fn declare_proscribed(&mut self, from: WaypointId, to: WaypointId) -> Result<()> {
        self.try_waypoint(to)?;
        let wp = self.waypoint_mut(from).ok_or(NavError::UnknownWaypoint(from))?;
        if !wp.proscribed.contains(&to) {
            wp.proscribed.push(to);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// Outgoing edges of `id` (empty for unknown ids).
    pub fn edges_from(&self, id: WaypointId) -> &[ReachEdge] {
        self.waypoint(id).map(|w| w.edges.as_slice()).unwrap_or(&[])
    }

    /// Edge from `from` to `to`, if any.
    pub fn edge(&self, from: WaypointId, to: WaypointId) -> Option<&ReachEdge> {
        self.waypoint(from).and_then(|w| w.edge_to(to))
    }

    /// Every edge in the level, grouped by start waypoint.
    pub fn edges(&self) -> impl Iterator<Item = &ReachEdge> {
        self.waypoints().flat_map(|w| w.edges.iter())
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Reachability query with fresh visited weights.
    pub fn can_reach(&self, from: WaypointId, to: WaypointId, budget: f32) -> bool {
        let mut visited = VisitedWeights::new(self.capacity());
        can_reach(self, from, to, budget, &mut visited, ReachOptions::default())
    }

    // ------------------------------------------------------------------
    // Spatial queries
    // ------------------------------------------------------------------

    /// Waypoints within `radius` of `center`, sorted by id.
    pub fn waypoints_within(&self, center: Vec3, radius: f32) -> Vec<WaypointId> {
        self.spatial.within_radius(center, radius)
    }

    /// Nearest waypoint to `point`.
    pub fn nearest_waypoint(&self, point: Vec3) -> Option<WaypointId> {
        self.spatial.nearest(point)
    }

    /// Rebuild the spatial index from current positions.
    pub fn rebuild_spatial_index(&mut self) {
        let points: Vec<(WaypointId, Vec3)> = self.waypoints().map(|w| (w.id, w.position)).collect();
        self.spatial = SpatialIndex::from_points(points);
    }

    // ------------------------------------------------------------------
    // Movers
    // ------------------------------------------------------------------

    /// Register named dynamic geometry (lift platform, door).
    pub fn add_mover(&mut self, name: impl Into<String>) {
        self.movers.insert(name.into());
    }

    pub fn has_mover(&self, name: &str) -> bool {
        self.movers.contains(name)
    }

    // ------------------------------------------------------------------
    // Cover
    // ------------------------------------------------------------------

    /// Add a cover link. Its slot markers are created by the cover builder.
    pub fn add_cover_link(&mut self, mut link: CoverLink) -> CoverLinkId {
        let id = CoverLinkId(self.cover_links.len() as u32);
        link.id = id;
        self.cover_links.push(Some(link));
        id
    }

    /// Remove a cover link together with its slot markers.
    pub fn remove_cover_link(&mut self, id: CoverLinkId) -> Option<CoverLink> {
        let link = self.cover_links.get_mut(id.index())?.take()?;
        for marker in link.slots.iter().filter_map(|s| s.marker) {
            self.remove_waypoint(marker);
        }
        for other in self.cover_links.iter_mut().flatten() {
            for slot in &mut other.slots {
                slot.forget_link(id);
            }
        }
        Some(link)
    }

    pub fn cover_link(&self, id: CoverLinkId) -> Option<&CoverLink> {
        self.cover_links.get(id.index()).and_then(Option::as_ref)
    }

    pub fn cover_link_mut(&mut self, id: CoverLinkId) -> Option<&mut CoverLink> {
        self.cover_links.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Live cover links in id order.
    pub fn cover_links(&self) -> impl Iterator<Item = &CoverLink> {
        self.cover_links.iter().flatten()
    }

    pub fn cover_links_mut(&mut self) -> impl Iterator<Item = &mut CoverLink> {
        self.cover_links.iter_mut().flatten()
    }

    /// Ids of live cover links in order.
    pub fn cover_link_ids(&self) -> Vec<CoverLinkId> {
        self.cover_links().map(|l| l.id).collect()
    }

    /// Every slot reference in link/slot order.
    pub fn slot_refs(&self) -> Vec<CoverRef> {
        self.cover_links()
            .flat_map(|l| (0..l.slots.len()).map(move |slot| CoverRef::new(l.id, slot)))
            .collect()
    }

    pub fn slot(&self, r: CoverRef) -> Option<&CoverSlot> {
        self.cover_link(r.link).and_then(|l| l.slots.get(r.slot))
    }

    pub fn slot_mut(&mut self, r: CoverRef) -> Option<&mut CoverSlot> {
        self.cover_link_mut(r.link).and_then(|l| l.slots.get_mut(r.slot))
    }
}
