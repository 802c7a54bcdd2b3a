//! Slot capabilities and movement transitions.
//!
//! Runs in two phases. First each slot's own capabilities (edges, lean,
//! pop-up, slip) are derived from its link and the trace collaborator.
//! Then cross-slot targets (mantle, swat turn, slip) are searched, since
//! they depend on the capabilities of the candidates.

use glam::Vec3;
use log::{debug, trace};

use crate::config::CoverSection;
use crate::core::{CapsuleSize, point_line_distance};
use crate::level::Level;
use crate::trace::TraceCollaborator;

use super::fire::view_point;
use super::link::{CoverAction, CoverLink, CoverRef, CoverType, SlotCapabilities};

/// Targets found for one slot.
#[derive(Default)]
struct Targets {
    mantle: Option<CoverRef>,
    slip_left: Option<CoverRef>,
    slip_right: Option<CoverRef>,
    turn_left: Option<CoverRef>,
    turn_right: Option<CoverRef>,
}

/// Derive capabilities and transition targets for every active slot.
pub(crate) fn build_slot_info(level: &mut Level, trace: &dyn TraceCollaborator, config: &CoverSection) {
    let slots = super::active_slots(level);

    let caps: Vec<(CoverRef, SlotCapabilities)> = slots
        .iter()
        .filter_map(|&r| {
            let link = level.cover_link(r.link)?;
            Some((r, local_caps(link, r.slot, trace, config)))
        })
        .collect();
    for (r, c) in caps {
        if let Some(slot) = level.slot_mut(r) {
            slot.caps = c;
        }
    }

    let targets: Vec<(CoverRef, Targets)> = slots
        .iter()
        .map(|&r| (r, find_targets(level, &slots, r, trace, config)))
        .collect();

    let mut transitions = 0;
    for (r, t) in targets {
        let Some(slot) = level.slot_mut(r) else {
            continue;
        };
        slot.caps.mantle = t.mantle.is_some();
        // Derived from pop-up rather than an authored climb marker: a slot
        // can climb onto its cover when there is nothing to mantle to
        slot.caps.climb_up = slot.caps.pop_up && slot.permissions.climb_up && t.mantle.is_none();
        slot.caps.swat_turn_left = t.turn_left.is_some();
        slot.caps.swat_turn_right = t.turn_right.is_some();
        transitions += [t.mantle, t.slip_left, t.slip_right, t.turn_left, t.turn_right]
            .iter()
            .flatten()
            .count();
        slot.mantle_target = t.mantle;
        slot.slip_target_left = t.slip_left;
        slot.slip_target_right = t.slip_right;
        slot.turn_target_left = t.turn_left;
        slot.turn_target_right = t.turn_right;
    }
    debug!("[Cover] Slot info for {} slots, {} transitions", slots.len(), transitions);
}

fn local_caps(
    link: &CoverLink,
    idx: usize,
    trace: &dyn TraceCollaborator,
    config: &CoverSection,
) -> SlotCapabilities {
    let Some(slot) = link.slots.get(idx) else {
        return SlotCapabilities::default();
    };
    let perms = slot.permissions;
    let has_cover = slot.cover_type != CoverType::None;

    let left_edge = link.is_edge_slot(idx, true);
    let right_edge = link.is_edge_slot(idx, false);
    let lean_left = has_cover && perms.lean_left && left_edge;
    let lean_right = has_cover && perms.lean_right && right_edge;

    let pop_up = slot.cover_type == CoverType::MidLevel && perms.pop_up && {
        let location = link.slot_location(idx);
        let popup = view_point(link, idx, CoverAction::PopUp, &config.view);
        let ahead = popup + link.slot_forward(idx) * config.popup_forward_dist;
        trace.is_clear(location, popup, CapsuleSize::ZERO)
            && trace.is_clear(popup, ahead, CapsuleSize::ZERO)
    };

    let slip_left = perms.cover_slip && lean_left && slip_endpoint(link, idx, true, trace, config).is_some();
    let slip_right =
        perms.cover_slip && lean_right && slip_endpoint(link, idx, false, trace, config).is_some();

    trace!(
        "[Cover] link {} slot {}: lean {}/{} pop-up {} slip {}/{}",
        link.id.0, idx, lean_left, lean_right, pop_up, slip_left, slip_right
    );

    SlotCapabilities {
        left_edge,
        right_edge,
        lean_left,
        lean_right,
        pop_up,
        slip_left,
        slip_right,
        ..SlotCapabilities::default()
    }
}

/// Where a slip out of the slot's side ends, if the way is clear and
/// there is ground to land on.
fn slip_endpoint(
    link: &CoverLink,
    idx: usize,
    left: bool,
    trace: &dyn TraceCollaborator,
    config: &CoverSection,
) -> Option<Vec3> {
    let human = config.human();
    let location = link.slot_location(idx);
    let forward = link.slot_forward(idx);
    let side_dir = if left { link.slot_left(idx) } else { -link.slot_left(idx) };

    let side = location + side_dir * (3.0 * human.radius);
    if !trace.is_clear(location, side, human) {
        return None;
    }
    let end = side + forward * config.slip_dist;
    if !trace.is_clear(side, end, human) {
        return None;
    }
    trace.find_ground_base(side + forward * (0.9 * config.slip_dist))?;
    Some(end)
}

/// Pick the nearest candidate, ties broken by slot reference.
fn nearest(candidates: impl Iterator<Item = (f32, CoverRef)>) -> Option<CoverRef> {
    candidates
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, r)| r)
}

fn find_targets(
    level: &Level,
    slots: &[CoverRef],
    r: CoverRef,
    trace: &dyn TraceCollaborator,
    config: &CoverSection,
) -> Targets {
    let Some(link) = level.cover_link(r.link) else {
        return Targets::default();
    };
    let Some(slot) = link.slots.get(r.slot) else {
        return Targets::default();
    };

    let mut targets = Targets::default();
    if slot.caps.pop_up && slot.permissions.mantle {
        targets.mantle = mantle_target(level, slots, link, r, trace, config);
    }
    if !link.circular && slot.permissions.swat_turn {
        if r.slot == 0 && slot.caps.lean_left {
            targets.turn_left = swat_target(level, slots, link, r, true, trace, config);
        }
        if r.slot + 1 == link.slots.len() && slot.caps.lean_right {
            targets.turn_right = swat_target(level, slots, link, r, false, trace, config);
        }
    }
    if slot.caps.slip_left {
        targets.slip_left = slip_target(level, slots, link, r, true, trace, config);
    }
    if slot.caps.slip_right {
        targets.slip_right = slip_target(level, slots, link, r, false, trace, config);
    }
    targets
}

fn mantle_target(
    level: &Level,
    slots: &[CoverRef],
    link: &CoverLink,
    r: CoverRef,
    trace: &dyn TraceCollaborator,
    config: &CoverSection,
) -> Option<CoverRef> {
    let location = link.slot_location(r.slot);
    let forward = link.slot_forward(r.slot);
    let left = link.slot_left(r.slot);
    let lift = Vec3::Z * config.view.mantle_height;

    nearest(slots.iter().filter(|&&t| t != r).filter_map(|&t| {
        let t_link = level.cover_link(t.link)?;
        let t_loc = t_link.slot_location(t.slot);
        let delta = t_loc - location;
        let dist = delta.length();
        if dist <= f32::EPSILON || dist >= config.mantle_dist {
            return None;
        }
        if (delta / dist).dot(forward) <= config.mantle_forward_dot {
            return None;
        }
        if t_link.slot_forward(t.slot).dot(forward) >= config.mantle_facing_dot {
            return None;
        }
        let depth = point_line_distance(t_loc, location, left);
        if depth <= config.mantle_min_depth || depth >= config.mantle_max_depth {
            return None;
        }
        trace
            .is_clear(location + lift, t_loc + lift, CapsuleSize::ZERO)
            .then_some((dist, t))
    }))
}

fn swat_target(
    level: &Level,
    slots: &[CoverRef],
    link: &CoverLink,
    r: CoverRef,
    left: bool,
    trace: &dyn TraceCollaborator,
    config: &CoverSection,
) -> Option<CoverRef> {
    let location = link.slot_location(r.slot);
    let forward = link.slot_forward(r.slot);
    let side = if left { link.slot_left(r.slot) } else { -link.slot_left(r.slot) };
    let human = config.human();

    nearest(slots.iter().filter(|t| t.link != r.link).filter_map(|&t| {
        let t_link = level.cover_link(t.link).filter(|l| !l.circular)?;
        let t_slot = t_link.slots.get(t.slot)?;
        // Turning left lands on the target's right edge
        let opposite = if left { t_slot.caps.lean_right } else { t_slot.caps.lean_left };
        if !opposite {
            return None;
        }
        let t_loc = t_link.slot_location(t.slot);
        let delta = t_loc - location;
        let dist = delta.length();
        if dist <= f32::EPSILON || dist > config.swat_turn_dist {
            return None;
        }
        if t_link.slot_forward(t.slot).dot(forward) < config.swat_cover_dot {
            return None;
        }
        if (delta / dist).dot(side) < config.swat_lateral_dot {
            return None;
        }
        trace.is_clear(location, t_loc, human).then_some((dist, t))
    }))
}

fn slip_target(
    level: &Level,
    slots: &[CoverRef],
    link: &CoverLink,
    r: CoverRef,
    left: bool,
    trace: &dyn TraceCollaborator,
    config: &CoverSection,
) -> Option<CoverRef> {
    let end = slip_endpoint(link, r.slot, left, trace, config)?;
    let location = link.slot_location(r.slot);
    let forward = link.slot_forward(r.slot);

    nearest(slots.iter().filter(|&&t| t != r).filter_map(|&t| {
        let t_loc = level.cover_link(t.link)?.slot_location(t.slot);
        let dist = t_loc.distance(end);
        if dist > config.slip_target_radius || (t_loc - location).dot(forward) <= 0.0 {
            return None;
        }
        trace.is_clear(end, t_loc, CapsuleSize::ZERO).then_some((dist, t))
    }))
}
