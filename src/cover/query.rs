//! Runtime queries on a built cover network.

use crate::level::{Level, WaypointId, WaypointKind};

use super::link::{CoverRef, DangerLink, FireLink};

/// True while a fire link still describes the current geometry.
///
/// Links between static cover never go stale. Links touching a dynamic
/// link hold while both slots stay within `invalidate_distance` of where
/// they were when the link was built.
pub fn is_fire_link_valid(level: &Level, src: CoverRef, link: &FireLink, invalidate_distance: f32) -> bool {
    if !link.dynamic {
        return true;
    }
    let location = |r: CoverRef| level.cover_link(r.link).map(|l| l.slot_location(r.slot));
    match (location(src), location(link.target)) {
        (Some(s), Some(t)) => {
            s.distance(link.src_position) <= invalidate_distance
                && t.distance(link.dest_position) <= invalidate_distance
        }
        _ => false,
    }
}

/// Fire link from `src` to `target`, if any.
pub fn fire_link(level: &Level, src: CoverRef, target: CoverRef) -> Option<&FireLink> {
    level.slot(src)?.fire_links.iter().find(|f| f.target == target)
}

/// Fire link from `src` to `target` that is still valid.
pub fn valid_fire_link(
    level: &Level,
    src: CoverRef,
    target: CoverRef,
    invalidate_distance: f32,
) -> Option<&FireLink> {
    fire_link(level, src, target).filter(|f| is_fire_link_valid(level, src, f, invalidate_distance))
}

/// How exposed `target` is to a shooter in `source`, in `[0, 1]`.
///
/// `None` means the source has no line of fire or the target's cover
/// fully protects it.
pub fn exposure(level: &Level, target: CoverRef, source: CoverRef) -> Option<f32> {
    level
        .slot(target)?
        .exposed_fire_links
        .iter()
        .find(|e| e.source == source)
        .map(|e| e.exposure)
}

pub fn mantle_target(level: &Level, r: CoverRef) -> Option<CoverRef> {
    level.slot(r)?.mantle_target
}

pub fn slip_target(level: &Level, r: CoverRef, left: bool) -> Option<CoverRef> {
    let slot = level.slot(r)?;
    if left {
        slot.slip_target_left
    } else {
        slot.slip_target_right
    }
}

pub fn swat_turn_target(level: &Level, r: CoverRef, left: bool) -> Option<CoverRef> {
    let slot = level.slot(r)?;
    if left {
        slot.turn_target_left
    } else {
        slot.turn_target_right
    }
}

pub fn danger_links(level: &Level, r: CoverRef) -> &[DangerLink] {
    level.slot(r).map(|s| s.danger_links.as_slice()).unwrap_or(&[])
}

/// Slot a marker waypoint stands for.
pub fn slot_for_marker(level: &Level, marker: WaypointId) -> Option<CoverRef> {
    match level.waypoint(marker)?.kind {
        WaypointKind::CoverSlot { link, slot } => Some(CoverRef::new(link, slot)),
        _ => None,
    }
}

/// Claim a free, enabled slot for `claimant`. Claiming a slot the
/// claimant already holds succeeds.
pub fn claim_slot(level: &mut Level, r: CoverRef, claimant: u32) -> bool {
    let disabled = level.cover_link(r.link).is_none_or(|l| l.disabled);
    let Some(slot) = level.slot_mut(r).filter(|s| s.enabled && !disabled) else {
        return false;
    };
    match slot.claimed_by {
        Some(holder) => holder == claimant,
        None => {
            slot.claimed_by = Some(claimant);
            true
        }
    }
}

/// Release a slot held by `claimant`. Returns false if someone else holds it.
pub fn release_slot(level: &mut Level, r: CoverRef, claimant: u32) -> bool {
    match level.slot_mut(r) {
        Some(slot) if slot.claimed_by == Some(claimant) => {
            slot.claimed_by = None;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::{CoverLink, CoverSlot, CoverType};
    use glam::Vec3;

    fn level_with_slot() -> (Level, CoverRef) {
        let mut level = Level::new();
        let id = level.add_cover_link(CoverLink::new(
            Vec3::ZERO,
            0.0,
            vec![CoverSlot::new(Vec3::ZERO, CoverType::Standing)],
        ));
        (level, CoverRef::new(id, 0))
    }

    #[test]
    fn test_claims_are_exclusive() {
        let (mut level, r) = level_with_slot();
        assert!(claim_slot(&mut level, r, 1));
        assert!(claim_slot(&mut level, r, 1));
        assert!(!claim_slot(&mut level, r, 2));
        assert!(!release_slot(&mut level, r, 2));
        assert!(release_slot(&mut level, r, 1));
        assert!(claim_slot(&mut level, r, 2));
    }

    #[test]
    fn test_disabled_slot_cannot_be_claimed() {
        let (mut level, r) = level_with_slot();
        level.slot_mut(r).unwrap().enabled = false;
        assert!(!claim_slot(&mut level, r, 1));
        assert!(!claim_slot(&mut level, CoverRef::new(r.link, 5), 1));
    }

    #[test]
    fn test_static_links_never_go_stale() {
        let (level, r) = level_with_slot();
        let link = FireLink {
            target: r,
            target_marker: WaypointId(0),
            items: Vec::new(),
            src_position: Vec3::new(1000.0, 0.0, 0.0),
            dest_position: Vec3::ZERO,
            fallback: false,
            dynamic: false,
        };
        assert!(is_fire_link_valid(&level, r, &link, 32.0));
        let moving = FireLink { dynamic: true, ..link };
        assert!(!is_fire_link_valid(&level, r, &moving, 32.0));
    }
}
