//! Map zone effects.
//!
//! Each tick: portal cooldowns tick down, every local head inside a zone
//! gets that zone's effect, then zone buffs age out.

use rand::Rng;

use crate::game::constants::{world, zone};
use crate::game::state::{AbilityType, EntityId, GameState, MapZone, Worm, ZoneType};
use crate::game::systems::abilities::buff_multiplier;

pub fn update<R: Rng>(state: &mut GameState, rng: &mut R) {
    for z in state.zones.iter_mut() {
        z.portal_cooldown = z.portal_cooldown.saturating_sub(1);
    }

    let map_size = state.map_size;
    let GameState { worms, zones, .. } = state;
    for worm in worms.iter_mut().filter(|w| !w.is_remote() && !w.is_empty()) {
        apply_zones(worm, zones, map_size, rng);
        expire_buff(worm);
    }
}

fn apply_zones<R: Rng>(worm: &mut Worm, zones: &mut [MapZone], map_size: f32, rng: &mut R) {
    for i in 0..zones.len() {
        let head = worm.segments[0];
        if !zones[i].contains(head) {
            continue;
        }
        match zones[i].zone_type {
            ZoneType::Speed => set_buff(worm, ZoneType::Speed),
            ZoneType::Mass => {
                set_buff(worm, ZoneType::Mass);
                if rng.gen_bool(zone::MASS_CHANCE) {
                    worm.grow(zone::MASS_BONUS);
                }
            }
            ZoneType::Blackhole => {
                set_buff(worm, ZoneType::Blackhole);
                pull_toward(worm, &zones[i], map_size);
            }
            ZoneType::Toxic => {
                set_buff(worm, ZoneType::Toxic);
                if rng.gen_bool(zone::TOXIC_SHRINK_CHANCE) {
                    worm.shed_tail(world::INITIAL_SEGMENTS);
                }
            }
            ZoneType::Portal => {
                if try_teleport(worm, zones, i, map_size) {
                    // Landed inside the partner; don't bounce straight back
                    break;
                }
            }
        }
    }
}

/// Overwrite the worm's zone buff with `zone_type`. The speed multiplier
/// follows the buff unless a dash is running.
fn set_buff(worm: &mut Worm, zone_type: ZoneType) {
    worm.buff_type = Some(zone_type);
    worm.buff_timer = zone::BUFF_DURATION;
    if !worm.ability_active(AbilityType::Dash) {
        worm.speed_multiplier = buff_multiplier(worm);
    }
}

fn expire_buff(worm: &mut Worm) {
    if worm.buff_timer == 0 {
        return;
    }
    worm.buff_timer -= 1;
    if worm.buff_timer == 0 {
        worm.buff_type = None;
        if !worm.ability_active(AbilityType::Dash) {
            worm.speed_multiplier = 1.0;
        }
    }
}

/// Pull strength grows linearly toward the center
fn pull_toward(worm: &mut Worm, z: &MapZone, map_size: f32) {
    let head = worm.segments[0];
    let to_center = z.position - head;
    let dist = to_center.length();
    if dist <= f32::EPSILON {
        return;
    }
    let strength = zone::BLACKHOLE_PULL_FORCE * (1.0 - dist / z.radius) * zone::BLACKHOLE_PULL_SCALE;
    let step = to_center * (strength.min(dist) / dist);
    worm.segments[0] = (head + step).clamp_each(
        world::BOUNDARY_INSET,
        map_size - world::BOUNDARY_INSET,
    );
}

/// Jump through portal `index` if it and its partner are both open.
/// The body keeps its shape and the head keeps its offset from the center.
fn try_teleport(worm: &mut Worm, zones: &mut [MapZone], index: usize, map_size: f32) -> bool {
    let Some(partner) = partner_index(zones, index) else {
        return false;
    };
    if zones[index].portal_cooldown > 0 || zones[partner].portal_cooldown > 0 {
        return false;
    }

    let head = worm.segments[0];
    let landing = zones[partner].position + (head - zones[index].position);
    let shift = landing.clamp_each(world::BOUNDARY_INSET, map_size - world::BOUNDARY_INSET) - head;
    for segment in worm.segments.iter_mut() {
        *segment += shift;
    }

    zones[index].portal_cooldown = zone::PORTAL_COOLDOWN;
    zones[partner].portal_cooldown = zone::PORTAL_COOLDOWN;
    tracing::debug!(worm = %worm.id, from = zones[index].id, to = zones[partner].id, "Portal jump");
    true
}

fn partner_index(zones: &[MapZone], index: usize) -> Option<usize> {
    let linked: EntityId = zones[index].linked_portal_id?;
    zones.iter().position(|z| z.id == linked)
}
