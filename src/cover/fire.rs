//! Fire links, exposure and danger links.

use glam::Vec3;
use log::trace;

use crate::config::{CoverSection, ViewOffsets};
use crate::core::CapsuleSize;
use crate::level::{Level, WaypointKind};
use crate::trace::TraceCollaborator;

use super::link::{
    CoverAction, CoverLink, CoverRef, CoverType, DangerLink, ExposedFireLink, FireLink,
    FireLinkItem, SlotCapabilities,
};

/// Eye position of an occupant of slot `idx` performing `action`.
pub fn view_point(link: &CoverLink, idx: usize, action: CoverAction, view: &ViewOffsets) -> Vec3 {
    let location = link.slot_location(idx);
    let forward = link.slot_forward(idx);
    let left = link.slot_left(idx);
    let standing = link
        .slots
        .get(idx)
        .is_some_and(|s| s.cover_type == CoverType::Standing);
    let lean_height = if standing {
        view.stand_lean_height
    } else {
        view.crouch_lean_height
    };

    match action {
        CoverAction::Default => {
            let height = if standing { view.stand_height } else { view.crouch_height };
            location + Vec3::Z * height
        }
        CoverAction::LeanLeft => {
            location + forward * view.lean_forward + left * view.lean_lateral + Vec3::Z * lean_height
        }
        CoverAction::LeanRight => {
            location + forward * view.lean_forward - left * view.lean_lateral + Vec3::Z * lean_height
        }
        CoverAction::PopUp => location + forward * view.popup_forward + Vec3::Z * view.popup_height,
    }
}

fn source_actions(caps: &SlotCapabilities) -> Vec<CoverAction> {
    let mut actions = Vec::with_capacity(3);
    if caps.lean_left {
        actions.push(CoverAction::LeanLeft);
    }
    if caps.lean_right {
        actions.push(CoverAction::LeanRight);
    }
    if caps.pop_up {
        actions.push(CoverAction::PopUp);
    }
    actions
}

fn target_actions(caps: &SlotCapabilities) -> Vec<CoverAction> {
    let mut actions = vec![CoverAction::Default];
    actions.extend(source_actions(caps));
    actions
}

/// Candidate target slots near `center`, found through their markers.
fn slots_near(level: &Level, center: Vec3, radius: f32) -> Vec<CoverRef> {
    let mut refs: Vec<CoverRef> = level
        .waypoints_within(center, radius)
        .into_iter()
        .filter_map(|id| match level.waypoint(id).map(|w| &w.kind) {
            Some(&WaypointKind::CoverSlot { link, slot }) => Some(CoverRef::new(link, slot)),
            _ => None,
        })
        .collect();
    refs.sort();
    refs.dedup();
    refs
}

/// How exposed target `t_link[t_idx]` is to a shooter at `source`.
///
/// Returns `None` when the target's cover faces the shooter closely enough
/// to protect it completely. An edge slot that leans out toward the
/// shooter's side is judged against the wider `edge_exposure_dot`.
pub(crate) fn exposure_from(
    t_link: &CoverLink,
    t_idx: usize,
    source: Vec3,
    config: &CoverSection,
) -> Option<f32> {
    let target = t_link.slot_location(t_idx);
    let delta = source - target;
    let dist = delta.length();
    if dist <= f32::EPSILON {
        return None;
    }
    let dir = delta / dist;
    let lateral = t_link.slot_left(t_idx).dot(dir);
    let leans_toward = t_link.slots.get(t_idx).is_some_and(|s| {
        (s.caps.lean_left && lateral > config.edge_check_dot)
            || (s.caps.lean_right && lateral < -config.edge_check_dot)
    });
    let test_dot = if leans_toward {
        config.edge_exposure_dot
    } else {
        config.exposure_dot
    };

    let x = t_link.slot_forward(t_idx).dot(dir);
    if x > test_dot {
        return None;
    }
    let mut scale = if x > 0.0 { 1.0 - x / test_dot } else { 1.0 };
    let half = config.max_fire_link_dist * 0.5;
    if dist > half && half > 0.0 {
        scale *= 1.0 - (dist - half) / half;
    }
    let scale = scale.clamp(0.0, 1.0);
    (scale > 0.0).then_some(scale)
}

/// Compute the fire links from `src` and the matching exposed links on
/// each target. Returns (fire links, exposed links) added.
pub(crate) fn build_fire_links(
    level: &mut Level,
    trace: &dyn TraceCollaborator,
    config: &CoverSection,
    src: CoverRef,
) -> (usize, usize) {
    let Some(s_link) = level.cover_link(src.link) else {
        return (0, 0);
    };
    let Some(s_slot) = s_link.slots.get(src.slot) else {
        return (0, 0);
    };
    let s_loc = s_link.slot_location(src.slot);
    let s_fwd = s_link.slot_forward(src.slot);
    let s_actions = source_actions(&s_slot.caps);
    let min_dot = if s_slot.can_lean() {
        config.min_fire_link_dot
    } else {
        config.desired_min_fire_link_dot
    };

    let mut links = Vec::new();
    let mut exposed = Vec::new();

    for t in slots_near(level, s_loc, config.max_fire_link_dist) {
        if t == src {
            continue;
        }
        let Some(t_link) = level.cover_link(t.link).filter(|l| !l.disabled) else {
            continue;
        };
        let Some(t_slot) = t_link.slots.get(t.slot).filter(|s| s.enabled) else {
            continue;
        };
        let Some(target_marker) = t_slot.marker else {
            continue;
        };

        let t_loc = t_link.slot_location(t.slot);
        let delta = t_loc - s_loc;
        let dist = delta.length();
        if dist <= f32::EPSILON || dist > config.max_fire_link_dist {
            continue;
        }
        let dot = s_fwd.dot(delta / dist);
        if dot < min_dot || delta.dot(s_fwd) < config.min_fire_angle_dist {
            continue;
        }

        let mut items = Vec::new();
        for &src_action in &s_actions {
            let from = view_point(s_link, src.slot, src_action, &config.view);
            for dest_action in target_actions(&t_slot.caps) {
                let to = view_point(t_link, t.slot, dest_action, &config.view);
                if trace.is_clear(from, to, CapsuleSize::ZERO) {
                    items.push(FireLinkItem {
                        src_type: s_slot.cover_type,
                        src_action,
                        dest_type: t_slot.cover_type,
                        dest_action,
                    });
                }
            }
        }
        if items.is_empty() {
            continue;
        }

        trace!("[Cover] {} -> {}: {} combinations", src, t, items.len());
        if let Some(exposure) = exposure_from(t_link, t.slot, s_loc, config) {
            exposed.push((t, ExposedFireLink { source: src, exposure }));
        }
        links.push(FireLink {
            target: t,
            target_marker,
            items,
            src_position: s_loc,
            dest_position: t_loc,
            fallback: dot < config.desired_min_fire_link_dot,
            dynamic: s_link.dynamic || t_link.dynamic,
        });
    }

    let counts = (links.len(), exposed.len());
    if let Some(slot) = level.slot_mut(src) {
        slot.fire_links = links;
    }
    for (t, link) in exposed {
        if let Some(slot) = level.slot_mut(t) {
            slot.exposed_fire_links.push(link);
        }
    }
    counts
}

/// Compute the danger links of `src`. Returns the number added.
pub(crate) fn build_danger_links(
    level: &mut Level,
    trace: &dyn TraceCollaborator,
    config: &CoverSection,
    src: CoverRef,
) -> usize {
    let Some(link) = level.cover_link(src.link) else {
        return 0;
    };
    let Some(slot) = link.slots.get(src.slot) else {
        return 0;
    };
    let location = link.slot_location(src.slot);
    let forward = link.slot_forward(src.slot);
    let eye = view_point(link, src.slot, CoverAction::Default, &config.view);

    let mut danger = Vec::new();
    for id in level.waypoints_within(location, config.danger_dist) {
        if Some(id) == slot.marker {
            continue;
        }
        let Some(wp) = level.waypoint(id) else {
            continue;
        };
        let delta = wp.position - location;
        if delta.dot(forward) < 0.0 {
            continue;
        }
        let dist = delta.length();
        if dist > config.danger_dist || !trace.is_clear(eye, wp.position, CapsuleSize::ZERO) {
            continue;
        }
        danger.push(DangerLink {
            waypoint: id,
            danger_cost: config.danger_dist * (1.0 - dist / config.danger_dist),
        });
    }

    let count = danger.len();
    if let Some(slot) = level.slot_mut(src) {
        slot.danger_links = danger;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::CoverSlot;
    use crate::level::Waypoint;
    use crate::trace::BoxWorld;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    fn link_at(position: Vec3, yaw: f32) -> CoverLink {
        CoverLink::new(position, yaw, vec![CoverSlot::new(Vec3::ZERO, CoverType::Standing)])
    }

    #[test]
    fn test_view_points() {
        let link = link_at(Vec3::new(0.0, 0.0, 88.0), 0.0);
        let view = ViewOffsets::default();
        assert_eq!(
            view_point(&link, 0, CoverAction::Default, &view),
            Vec3::new(0.0, 0.0, 88.0 + view.stand_height)
        );
        let left = view_point(&link, 0, CoverAction::LeanLeft, &view);
        let right = view_point(&link, 0, CoverAction::LeanRight, &view);
        assert_relative_eq!(left.y, view.lean_lateral, epsilon = 1e-4);
        assert_relative_eq!(right.y, -view.lean_lateral, epsilon = 1e-4);
        assert_relative_eq!(left.x, view.lean_forward, epsilon = 1e-4);
    }

    #[test]
    fn test_exposure_facing_shooter_is_protected() {
        let config = CoverSection::default();
        let target = link_at(Vec3::ZERO, 0.0);
        assert!(exposure_from(&target, 0, Vec3::new(500.0, 0.0, 0.0), &config).is_none());
    }

    #[test]
    fn test_exposure_flank_and_rear() {
        let config = CoverSection::default();
        let target = link_at(Vec3::ZERO, 0.0);
        // Shooter directly to the side: fully exposed
        let side = exposure_from(&target, 0, Vec3::new(0.0, 300.0, 0.0), &config).unwrap();
        assert_relative_eq!(side, 1.0, epsilon = 1e-5);
        // Shooter partly in front
        let dir = Vec3::new(0.2, (1.0f32 - 0.04).sqrt(), 0.0);
        let partial = exposure_from(&target, 0, dir * 300.0, &config).unwrap();
        assert_relative_eq!(partial, 0.5, epsilon = 1e-4);
        // Far away falls off
        let far = exposure_from(&target, 0, Vec3::new(-1536.0, 0.0, 0.0), &config).unwrap();
        assert_relative_eq!(far, 0.5, epsilon = 1e-4);
        // Facing away entirely
        let behind = link_at(Vec3::ZERO, PI);
        let rear = exposure_from(&behind, 0, Vec3::new(400.0, 0.0, 0.0), &config).unwrap();
        assert_relative_eq!(rear, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_edge_slot_exposed_on_lean_side() {
        let config = CoverSection::default();
        // Shooter ahead and to the left: x = 0.6, lateral = 0.8
        let shooter = Vec3::new(0.6, 0.8, 0.0) * 300.0;

        let mut plain = link_at(Vec3::ZERO, 0.0);
        assert!(exposure_from(&plain, 0, shooter, &config).is_none());

        plain.slots[0].caps.lean_right = true;
        assert!(exposure_from(&plain, 0, shooter, &config).is_none());

        let mut left_edge = link_at(Vec3::ZERO, 0.0);
        left_edge.slots[0].caps.lean_left = true;
        let scale = exposure_from(&left_edge, 0, shooter, &config).unwrap();
        assert_relative_eq!(scale, 1.0 - 0.6 / config.edge_exposure_dot, epsilon = 1e-4);

        // Within the check dot the narrow threshold still applies
        let ahead = Vec3::new(0.98, 0.2, 0.0).normalize() * 300.0;
        assert!(exposure_from(&left_edge, 0, ahead, &config).is_none());
    }

    #[test]
    fn test_exposure_vanishes_at_max_distance() {
        let config = CoverSection::default();
        let target = link_at(Vec3::ZERO, 0.0);
        assert!(exposure_from(&target, 0, Vec3::new(-2048.0, 0.0, 0.0), &config).is_none());
    }

    #[test]
    fn test_danger_links_in_front_only() {
        let config = CoverSection::default();
        let world = BoxWorld::new();
        let mut level = Level::new();
        let id = level.add_cover_link(link_at(Vec3::new(0.0, 0.0, 88.0), 0.0));
        let front = level.add_waypoint(Waypoint::path_node(Vec3::new(500.0, 0.0, 88.0)));
        level.add_waypoint(Waypoint::path_node(Vec3::new(-500.0, 0.0, 88.0)));
        level.add_waypoint(Waypoint::path_node(Vec3::new(1600.0, 0.0, 88.0)));

        let r = CoverRef::new(id, 0);
        assert_eq!(build_danger_links(&mut level, &world, &config, r), 1);

        let danger = &level.slot(r).unwrap().danger_links;
        assert_eq!(danger[0].waypoint, front);
        let expected = config.danger_dist * (1.0 - 500.0 / config.danger_dist);
        assert_relative_eq!(danger[0].danger_cost, expected, epsilon = 1e-3);
    }
}
