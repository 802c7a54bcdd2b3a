//! Cover network.
//!
//! Cover links group slots along a piece of cover. The
//! [`CoverNetworkBuilder`] derives everything an occupant needs from the
//! slot layout and the trace collaborator:
//!
//! ```text
//!   CoverLink ──► adjust (sort, align, markers)
//!                    │
//!                    ▼
//!               slot info (edges, lean, pop-up, mantle, swat, slip)
//!                    │
//!                    ▼
//!               fire links ──► exposed fire links on targets
//!                    │
//!                    ▼
//!               danger links to nearby waypoints
//! ```
//!
//! Runtime lookups on the built network live in [`query`].

mod fire;
mod link;
pub mod query;
mod transitions;

pub use fire::view_point;
pub use link::{
    CoverAction, CoverLink, CoverLinkId, CoverRef, CoverSlot, CoverType, DangerLink,
    ExposedFireLink, FireLink, FireLinkItem, SlotCapabilities, SlotPermissions,
};

use log::{debug, info, trace, warn};

use crate::build::{BuildReport, Diagnostic, DiagnosticKind};
use crate::config::CoverSection;
use crate::core::{CapsuleSize, yaw_from_direction};
use crate::level::{Level, Waypoint, WaypointKind};
use crate::trace::TraceCollaborator;

/// Builds the cover network of a level.
pub struct CoverNetworkBuilder<'a> {
    config: &'a CoverSection,
    trace: &'a dyn TraceCollaborator,
}

impl<'a> CoverNetworkBuilder<'a> {
    pub fn new(config: &'a CoverSection, trace: &'a dyn TraceCollaborator) -> Self {
        Self { config, trace }
    }

    /// Drop every derived link on every slot.
    pub fn clear(&self, level: &mut Level) {
        for link in level.cover_links_mut() {
            for slot in &mut link.slots {
                slot.clear_links();
            }
        }
    }

    /// Sort and align slots, then create or move their markers.
    pub fn adjust(&self, level: &mut Level, report: &mut BuildReport) {
        for id in level.cover_link_ids() {
            let Some(link) = level.cover_link_mut(id) else {
                continue;
            };
            if link.auto_sort {
                link.sort_slots();
            }
            if link.auto_adjust && !link.disabled {
                for idx in 0..link.slots.len() {
                    if !self.align_slot(link, idx) {
                        report.push(
                            Diagnostic::warning(
                                DiagnosticKind::SlotAlignmentFailed,
                                format!("{} failed surface auto-alignment", CoverRef::new(id, idx)),
                            )
                            .at_slot(CoverRef::new(id, idx)),
                        );
                    }
                }
            }
            self.update_markers(level, id);
        }
    }

    /// Trace forward for a cover surface and face into it. Returns false
    /// when no usable surface was found; the slot keeps its placement.
    fn align_slot(&self, link: &mut CoverLink, idx: usize) -> bool {
        let location = link.slot_location(idx);
        let forward = link.slot_forward(idx);
        let probe = location + forward * self.config.align_distance;
        let hit = self.trace.trace_segment(location, probe, CapsuleSize::ZERO);
        if !hit.blocked {
            return false;
        }
        let normal = hit.hit_normal.truncate().extend(0.0);
        if normal.length_squared() < 0.25 {
            return false;
        }
        let normal = normal.normalize();
        let mut aligned = hit.hit_point + normal * self.config.align_offset;
        aligned.z = location.z;
        link.set_slot_world(idx, aligned, yaw_from_direction(-normal));
        trace!("[Cover] Aligned slot {} of link {} to {:?}", idx, link.id.0, aligned);
        true
    }

    /// Keep exactly one marker per enabled slot of an enabled link.
    fn update_markers(&self, level: &mut Level, id: CoverLinkId) {
        let Some(link) = level.cover_link(id) else {
            return;
        };
        let active = !link.disabled;
        let wanted: Vec<_> = (0..link.slots.len())
            .map(|idx| {
                let slot = &link.slots[idx];
                let place = (link.slot_location(idx), link.slot_yaw(idx));
                (slot.marker, (active && slot.enabled).then_some(place))
            })
            .collect();

        for (idx, (marker, place)) in wanted.into_iter().enumerate() {
            let kind = WaypointKind::CoverSlot { link: id, slot: idx };
            let marker = marker.filter(|&m| level.contains(m));
            let new_marker = match (marker, place) {
                (Some(m), Some((location, yaw))) => {
                    if let Some(wp) = level.waypoint_mut(m) {
                        wp.kind = kind;
                        wp.yaw = yaw;
                    }
                    // Moves go through the registry to keep the index current
                    if let Err(e) = level.set_position(m, location) {
                        warn!("[Cover] Failed to move marker {}: {}", m, e);
                    }
                    Some(m)
                }
                (None, Some((location, yaw))) => {
                    Some(level.add_waypoint(Waypoint::new(kind, location).with_yaw(yaw)))
                }
                (Some(m), None) => {
                    level.remove_waypoint(m);
                    None
                }
                (None, None) => None,
            };
            if let Some(slot) = level.slot_mut(CoverRef::new(id, idx)) {
                slot.marker = new_marker;
            }
        }
    }

    /// Compute slot info, fire links and danger links. Slots must already
    /// be adjusted and the waypoint graph built.
    pub fn build(&self, level: &mut Level, report: &mut BuildReport) {
        self.clear(level);
        transitions::build_slot_info(level, self.trace, self.config);

        let mut fire_links = 0;
        let mut exposed = 0;
        for r in active_slots(level) {
            let (f, e) = fire::build_fire_links(level, self.trace, self.config, r);
            fire_links += f;
            exposed += e;
        }
        let mut danger = 0;
        for r in active_slots(level) {
            danger += fire::build_danger_links(level, self.trace, self.config, r);
        }

        report.stats.fire_links = fire_links;
        report.stats.exposed_fire_links = exposed;
        report.stats.danger_links = danger;
        info!(
            "[Cover] {} fire links, {} exposed, {} danger links",
            fire_links, exposed, danger
        );
    }

    /// Rebuild the fire links of `r` if any of them went stale. Returns
    /// true if the slot was rebuilt.
    pub fn refresh_slot(&self, level: &mut Level, r: CoverRef) -> bool {
        let Some(slot) = level.slot(r) else {
            return false;
        };
        let stale = slot
            .fire_links
            .iter()
            .any(|f| !query::is_fire_link_valid(level, r, f, self.config.invalidate_distance));
        if !stale {
            return false;
        }

        for link in level.cover_links_mut() {
            for slot in &mut link.slots {
                slot.exposed_fire_links.retain(|e| e.source != r);
            }
        }
        if let Some(slot) = level.slot_mut(r) {
            slot.fire_links.clear();
        }
        sync_marker_positions(level);
        let (f, _) = fire::build_fire_links(level, self.trace, self.config, r);
        debug!("[Cover] Refreshed {}: {} fire links", r, f);
        true
    }
}

/// Move existing markers to where their slots are now.
fn sync_marker_positions(level: &mut Level) {
    let placements: Vec<_> = level
        .cover_links()
        .flat_map(|l| {
            l.slots.iter().enumerate().filter_map(move |(idx, s)| {
                s.marker.map(|m| (m, l.slot_location(idx), l.slot_yaw(idx)))
            })
        })
        .collect();

    for (m, location, yaw) in placements {
        let moved = match level.waypoint_mut(m) {
            Some(wp) => {
                wp.yaw = yaw;
                wp.position != location
            }
            None => continue,
        };
        if moved {
            if let Err(e) = level.set_position(m, location) {
                warn!("[Cover] Failed to move marker {}: {}", m, e);
            }
        }
    }
}

/// Enabled slots of enabled links that have a live marker.
pub(crate) fn active_slots(level: &Level) -> Vec<CoverRef> {
    level
        .cover_links()
        .filter(|l| !l.disabled)
        .flat_map(|l| {
            l.slots
                .iter()
                .enumerate()
                .filter(|(_, s)| s.enabled && s.marker.is_some_and(|m| level.contains(m)))
                .map(move |(idx, _)| CoverRef::new(l.id, idx))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{Aabb, BoxWorld};
    use glam::Vec3;
    use std::f32::consts::PI;

    fn single(position: Vec3, yaw: f32) -> CoverLink {
        CoverLink::new(position, yaw, vec![CoverSlot::new(Vec3::ZERO, CoverType::Standing)])
    }

    #[test]
    fn test_markers_created_and_moved() {
        let world = BoxWorld::new();
        let config = CoverSection::default();
        let builder = CoverNetworkBuilder::new(&config, &world);
        let mut level = Level::new();
        let id = level.add_cover_link(single(Vec3::new(0.0, 0.0, 88.0), 0.0));

        let mut report = BuildReport::default();
        builder.adjust(&mut level, &mut report);
        let marker = level.slot(CoverRef::new(id, 0)).unwrap().marker.unwrap();
        assert_eq!(level.len(), 1);

        level.cover_link_mut(id).unwrap().position = Vec3::new(50.0, 0.0, 88.0);
        builder.adjust(&mut level, &mut report);
        assert_eq!(level.slot(CoverRef::new(id, 0)).unwrap().marker, Some(marker));
        assert_eq!(level.waypoint(marker).unwrap().position, Vec3::new(50.0, 0.0, 88.0));
        assert_eq!(level.nearest_waypoint(Vec3::new(50.0, 0.0, 88.0)), Some(marker));
    }

    #[test]
    fn test_disabled_slot_loses_marker() {
        let world = BoxWorld::new();
        let config = CoverSection::default();
        let builder = CoverNetworkBuilder::new(&config, &world);
        let mut level = Level::new();
        let id = level.add_cover_link(single(Vec3::ZERO, 0.0));
        let mut report = BuildReport::default();
        builder.adjust(&mut level, &mut report);
        assert_eq!(level.len(), 1);

        level.slot_mut(CoverRef::new(id, 0)).unwrap().enabled = false;
        builder.adjust(&mut level, &mut report);
        assert!(level.is_empty());
        assert!(level.slot(CoverRef::new(id, 0)).unwrap().marker.is_none());
    }

    #[test]
    fn test_auto_align_faces_surface() {
        let mut world = BoxWorld::new();
        world.add_blocker(Aabb::new(Vec3::new(60.0, -100.0, 0.0), Vec3::new(80.0, 100.0, 200.0)));
        let config = CoverSection::default();
        let builder = CoverNetworkBuilder::new(&config, &world);
        let mut level = Level::new();
        // Slightly off-axis facing still finds the wall
        let id = level.add_cover_link(single(Vec3::new(0.0, 0.0, 88.0), 0.2).with_auto_adjust(true));

        let mut report = BuildReport::default();
        builder.adjust(&mut level, &mut report);
        assert!(report.diagnostics.is_empty());
        let link = level.cover_link(id).unwrap();
        let location = link.slot_location(0);
        approx::assert_relative_eq!(location.x, 20.0, epsilon = 1e-3);
        approx::assert_relative_eq!(link.slot_yaw(0), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_auto_align_failure_warns() {
        let world = BoxWorld::new();
        let config = CoverSection::default();
        let builder = CoverNetworkBuilder::new(&config, &world);
        let mut level = Level::new();
        let id = level.add_cover_link(single(Vec3::ZERO, 0.0).with_auto_adjust(true));

        let mut report = BuildReport::default();
        builder.adjust(&mut level, &mut report);
        assert_eq!(report.of_kind(DiagnosticKind::SlotAlignmentFailed).count(), 1);
        // Still usable
        assert!(level.slot(CoverRef::new(id, 0)).unwrap().marker.is_some());
    }

    #[test]
    fn test_facing_slots_on_one_link_fire_at_each_other() {
        let world = BoxWorld::new();
        let config = CoverSection::default();
        let builder = CoverNetworkBuilder::new(&config, &world);
        let mut level = Level::new();
        let slots = vec![
            CoverSlot::new(Vec3::ZERO, CoverType::Standing),
            CoverSlot::new(Vec3::new(300.0, 0.0, 0.0), CoverType::Standing).with_yaw_offset(PI),
        ];
        let id = level.add_cover_link(CoverLink::new(Vec3::new(0.0, 0.0, 88.0), 0.0, slots));

        let mut report = BuildReport::default();
        builder.adjust(&mut level, &mut report);
        builder.build(&mut level, &mut report);

        let (a, b) = (CoverRef::new(id, 0), CoverRef::new(id, 1));
        assert!(query::fire_link(&level, a, b).is_some());
        assert!(query::fire_link(&level, b, a).is_some());
        assert!(query::fire_link(&level, a, a).is_none());
        assert_eq!(report.stats.fire_links, 2);
    }

    #[test]
    fn test_refresh_finds_targets_near_new_position() {
        let world = BoxWorld::new();
        let config = CoverSection::default();
        let builder = CoverNetworkBuilder::new(&config, &world);
        let mut level = Level::new();
        let src = level.add_cover_link(single(Vec3::new(0.0, 0.0, 88.0), 0.0));
        let near = level.add_cover_link(single(Vec3::new(500.0, 0.0, 88.0), PI).with_dynamic(true));
        let far = level.add_cover_link(single(Vec3::new(3000.0, 0.0, 88.0), PI).with_dynamic(true));

        let mut report = BuildReport::default();
        builder.adjust(&mut level, &mut report);
        let r = CoverRef::new(src, 0);
        level.slot_mut(r).unwrap().caps.lean_left = true;
        assert_eq!(fire::build_fire_links(&mut level, &world, &config, r).0, 1);

        // Both dynamic links move; markers are left where they were
        level.cover_link_mut(near).unwrap().position = Vec3::new(600.0, 100.0, 88.0);
        level.cover_link_mut(far).unwrap().position = Vec3::new(900.0, -100.0, 88.0);

        assert!(builder.refresh_slot(&mut level, r));
        assert!(query::fire_link(&level, r, CoverRef::new(near, 0)).is_some());
        assert!(query::fire_link(&level, r, CoverRef::new(far, 0)).is_some());
        let marker = level.slot(CoverRef::new(far, 0)).unwrap().marker.unwrap();
        assert_eq!(level.waypoint(marker).unwrap().position, Vec3::new(900.0, -100.0, 88.0));
    }
}
