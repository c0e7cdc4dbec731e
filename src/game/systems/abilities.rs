//! Ability timers and the derived combat flags.
//!
//! Only the local player carries ability slots; bots and remote mirrors
//! have an empty `abilities` list and are skipped.

use smallvec::SmallVec;

use crate::game::constants::{ability, zone};
use crate::game::state::{AbilityType, GameState, Worm, ZoneType};
use crate::util::vec2::Vec2;

/// Trigger ability slot `index` on `worm`. Out-of-range slots and abilities
/// that are active or cooling down are ignored.
pub fn activate(worm: &mut Worm, index: usize) -> bool {
    match worm.abilities.get_mut(index) {
        Some(slot) => slot.trigger(),
        None => false,
    }
}

/// Tick every ability slot and recompute the flags they drive
pub fn update(state: &mut GameState) {
    for worm in state.worms.iter_mut().filter(|w| !w.abilities.is_empty()) {
        for slot in &mut worm.abilities {
            slot.tick();
        }
        refresh_flags(worm);
    }
}

/// Derive visibility, ghost, shield and speed multiplier from the active
/// slots. Dash wins over any zone speed buff.
pub fn refresh_flags(worm: &mut Worm) {
    worm.is_invisible = worm.ability_active(AbilityType::Invisible);
    worm.is_ghost = worm.ability_active(AbilityType::Ghost);
    worm.has_shield = worm.ability_active(AbilityType::Shield);
    worm.speed_multiplier = if worm.ability_active(AbilityType::Dash) {
        ability::DASH_SPEED_MULTIPLIER
    } else {
        buff_multiplier(worm)
    };
}

/// Multiplier granted by the current zone buff alone
pub fn buff_multiplier(worm: &Worm) -> f32 {
    if worm.buff_timer > 0 && worm.buff_type == Some(ZoneType::Speed) {
        zone::SPEED_MULTIPLIER
    } else {
        1.0
    }
}

/// Push every other local head away from active shields.
/// The push fades linearly to zero at the repel radius.
pub fn apply_shield_repel(state: &mut GameState) {
    let shields: SmallVec<[(usize, Vec2); 2]> = state
        .worms
        .iter()
        .enumerate()
        .filter(|(_, w)| w.has_shield)
        .filter_map(|(i, w)| w.head().map(|h| (i, h)))
        .collect();
    if shields.is_empty() {
        return;
    }

    let radius = ability::SHIELD_REPEL_RADIUS;
    let bound = state.map_size - crate::game::constants::world::BOUNDARY_INSET;
    for (i, worm) in state.worms.iter_mut().enumerate() {
        if worm.is_remote() {
            continue;
        }
        for &(shield_index, center) in &shields {
            if shield_index == i {
                continue;
            }
            let Some(head) = worm.segments.first_mut() else {
                break;
            };
            let away = *head - center;
            let dist = away.length();
            if dist >= radius {
                continue;
            }
            // Coincident heads get pushed along +x
            let dir = if dist > 0.0 { away * (1.0 / dist) } else { Vec2::new(1.0, 0.0) };
            let push = ability::SHIELD_REPEL_FORCE * (1.0 - dist / radius);
            *head = (*head + dir * push)
                .clamp_each(crate::game::constants::world::BOUNDARY_INSET, bound);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::factory::create_worm;
    use crate::game::constants::world;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state_with_player() -> GameState {
        let mut rng = StdRng::seed_from_u64(5);
        let mut state = GameState::new(world::MAP_SIZE);
        state.worms.push(create_worm(true, 0, None, world::MAP_SIZE, &mut rng));
        state.worms.push(create_worm(false, 1, None, world::MAP_SIZE, &mut rng));
        state
    }

    fn place(worm: &mut Worm, head: Vec2) {
        for (i, s) in worm.segments.iter_mut().enumerate() {
            *s = Vec2::new(head.x - i as f32 * world::SEGMENT_DISTANCE, head.y);
        }
    }

    #[test]
    fn test_activate_out_of_range_is_noop() {
        let mut state = state_with_player();
        assert!(!activate(&mut state.worms[0], 4));
        assert!(!activate(&mut state.worms[0], usize::MAX));
        // Bots have no slots at all
        assert!(!activate(&mut state.worms[1], 0));
    }

    #[test]
    fn test_dash_sets_multiplier_then_expires() {
        let mut state = state_with_player();
        assert!(activate(&mut state.worms[0], 0));
        update(&mut state);
        assert_eq!(state.worms[0].speed_multiplier, ability::DASH_SPEED_MULTIPLIER);

        for _ in 0..ability::DASH_DURATION {
            update(&mut state);
        }
        assert_eq!(state.worms[0].speed_multiplier, 1.0);
        assert!(!state.worms[0].abilities[0].active);
        assert!(state.worms[0].abilities[0].cooldown > 0);
    }

    #[test]
    fn test_dash_expiry_falls_back_to_zone_buff() {
        let mut state = state_with_player();
        activate(&mut state.worms[0], 0);
        state.worms[0].buff_type = Some(ZoneType::Speed);
        state.worms[0].buff_timer = 1_000;
        for _ in 0..=ability::DASH_DURATION {
            update(&mut state);
        }
        assert_eq!(state.worms[0].speed_multiplier, zone::SPEED_MULTIPLIER);
    }

    #[test]
    fn test_flags_follow_active_slots() {
        let mut state = state_with_player();
        activate(&mut state.worms[0], 1);
        activate(&mut state.worms[0], 2);
        activate(&mut state.worms[0], 3);
        update(&mut state);
        let p = &state.worms[0];
        assert!(p.is_invisible && p.is_ghost && p.has_shield);

        for _ in 0..ability::GHOST_DURATION {
            update(&mut state);
        }
        let p = &state.worms[0];
        assert!(!p.is_ghost);
        assert!(p.is_invisible && p.has_shield);
    }

    #[test]
    fn test_shield_repels_nearby_heads() {
        let mut state = state_with_player();
        place(&mut state.worms[0], Vec2::new(1000.0, 1000.0));
        place(&mut state.worms[1], Vec2::new(1050.0, 1000.0));
        state.worms[0].has_shield = true;

        apply_shield_repel(&mut state);

        let pushed = state.worms[1].head().unwrap();
        assert!(pushed.x > 1050.0);
        assert!((pushed.y - 1000.0).abs() < 1e-4);
        // The shield holder itself does not move
        assert_eq!(state.worms[0].head().unwrap(), Vec2::new(1000.0, 1000.0));
    }

    #[test]
    fn test_shield_ignores_heads_outside_radius() {
        let mut state = state_with_player();
        place(&mut state.worms[0], Vec2::new(1000.0, 1000.0));
        place(&mut state.worms[1], Vec2::new(1000.0 + ability::SHIELD_REPEL_RADIUS + 1.0, 1000.0));
        state.worms[0].has_shield = true;
        let before = state.worms[1].head().unwrap();
        apply_shield_repel(&mut state);
        assert_eq!(state.worms[1].head().unwrap(), before);
    }
}
