//! Candy pickup and worm-vs-worm collision.
//!
//! Brute-force over all pairs; the arena holds a few dozen worms at most.

use rand::Rng;

use crate::game::factory::create_worm;
use crate::game::state::{Candy, GameState, Worm, WormId};
use crate::game::systems::candy::drop_remains;

/// Segments at the front of a body that never count as an obstacle
const HEAD_GUARD: usize = 3;

/// A worm that died this tick
#[derive(Debug, Clone, PartialEq)]
pub struct Death {
    pub worm_id: WormId,
    pub name: String,
    pub was_player: bool,
    pub length: usize,
}

#[inline]
pub fn candy_hit(worm: &Worm, candy: &Candy) -> bool {
    match worm.head() {
        Some(head) => head.distance_to(candy.position) < worm.radius() + candy.size,
        None => false,
    }
}

/// True if `a`'s head touches any of `b`'s body segments past the guard
pub fn worm_hit(a: &Worm, b: &Worm) -> bool {
    if a.id == b.id {
        return false;
    }
    let Some(head) = a.head() else {
        return false;
    };
    let reach = a.radius() + b.radius() * 0.8 - 4.0;
    b.segments
        .iter()
        .skip(HEAD_GUARD)
        .any(|s| head.distance_to(*s) < reach)
}

/// Let every worm eat the candies under its head. A candy is consumed by
/// the first worm that reaches it and only once. Remote mirrors take the
/// candy off the map without scoring or growing; their owner reports that.
pub fn collect_candies(state: &mut GameState) -> usize {
    let GameState { worms, candies, .. } = state;
    let mut eaten = 0;
    for worm in worms.iter_mut().filter(|w| !w.is_empty()) {
        let mut gained = 0u32;
        candies.retain(|c| {
            if candy_hit(worm, c) {
                gained += c.value;
                false
            } else {
                true
            }
        });
        if gained == 0 {
            continue;
        }
        eaten += 1;
        if !worm.is_remote() {
            worm.score += gained;
            worm.grow(gained as usize);
        }
    }
    eaten
}

/// Kill every local worm whose head ran into another worm's body.
///
/// Ghosts neither die nor kill, shields make their holder immune and
/// remote mirrors are never killed locally. Dead worms leave remains on
/// every other segment. A dead bot is replaced in its slot by a fresh one;
/// a dead player ends the game.
pub fn resolve_worm_collisions<R: Rng>(state: &mut GameState, rng: &mut R) -> Vec<Death> {
    let mut deaths = Vec::new();
    for i in 0..state.worms.len() {
        let victim = &state.worms[i];
        if victim.is_empty() || victim.is_remote() || victim.is_ghost || victim.has_shield {
            continue;
        }
        let hit = state
            .worms
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && !other.is_empty() && !other.is_ghost && worm_hit(victim, other));
        if !hit {
            continue;
        }

        let victim = &state.worms[i];
        let death = Death {
            worm_id: victim.id.clone(),
            name: victim.name.clone(),
            was_player: victim.is_player(),
            length: victim.len(),
        };
        let color = victim.color.clone();
        let segments = victim.segments.clone();
        drop_remains(state, &segments, &color, rng);

        if death.was_player {
            state.game_over = true;
        } else {
            let map_size = state.map_size;
            state.worms[i] = create_worm(false, i, None, map_size, rng);
            tracing::debug!(slot = i, died = %death.name, "Bot respawned");
        }
        deaths.push(death);
    }
    deaths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::{candy, world};
    use crate::game::state::WormKind;
    use crate::util::vec2::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn worm_at(rng: &mut StdRng, is_player: bool, index: usize, head: Vec2, dir: Vec2) -> Worm {
        let mut worm = create_worm(is_player, index, None, world::MAP_SIZE, rng);
        for (i, s) in worm.segments.iter_mut().enumerate() {
            *s = head - dir * (i as f32 * world::SEGMENT_DISTANCE);
        }
        worm
    }

    /// Player heading into a bot's mid-body, bot running north-south
    fn crash_setup() -> (GameState, StdRng) {
        let mut rng = StdRng::seed_from_u64(77);
        let mut state = GameState::new(world::MAP_SIZE);
        let bot = worm_at(&mut rng, false, 1, Vec2::new(1000.0, 1000.0), Vec2::new(0.0, -1.0));
        let crash_point = bot.segments[6];
        let player = worm_at(&mut rng, true, 0, crash_point + Vec2::new(-2.0, 0.0), Vec2::new(1.0, 0.0));
        state.worms.push(player);
        state.worms.push(bot);
        (state, rng)
    }

    fn place_candy(state: &mut GameState, at: Vec2, size: f32, value: u32) {
        state.add_candy(at, "#fff", size, value);
    }

    #[test]
    fn test_candy_pickup_scores_and_grows() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = GameState::new(world::MAP_SIZE);
        let player = worm_at(&mut rng, true, 0, Vec2::new(500.0, 500.0), Vec2::new(1.0, 0.0));
        state.worms.push(player);
        place_candy(&mut state, Vec2::new(505.0, 500.0), 6.0, 3);

        assert_eq!(collect_candies(&mut state), 1);
        assert_eq!(state.worms[0].score, 3);
        assert_eq!(state.worms[0].len(), 13);
        assert!(state.candies.is_empty());
    }

    #[test]
    fn test_candy_consumed_exactly_once() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut state = GameState::new(world::MAP_SIZE);
        // Two heads on top of the same candy
        state.worms.push(worm_at(&mut rng, true, 0, Vec2::new(500.0, 500.0), Vec2::new(1.0, 0.0)));
        state.worms.push(worm_at(&mut rng, false, 1, Vec2::new(502.0, 500.0), Vec2::new(-1.0, 0.0)));
        place_candy(&mut state, Vec2::new(501.0, 500.0), 6.0, 4);

        collect_candies(&mut state);
        let total: u32 = state.worms.iter().map(|w| w.score).sum();
        assert_eq!(total, 4);
        assert_eq!(state.worms[0].score, 4);
        assert_eq!(state.worms[1].len(), world::INITIAL_SEGMENTS);
    }

    #[test]
    fn test_candy_out_of_reach() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = GameState::new(world::MAP_SIZE);
        state.worms.push(worm_at(&mut rng, true, 0, Vec2::new(500.0, 500.0), Vec2::new(1.0, 0.0)));
        let reach = state.worms[0].radius() + 6.0;
        place_candy(&mut state, Vec2::new(500.0, 500.0 - reach - 0.1), 6.0, 3);
        assert_eq!(collect_candies(&mut state), 0);
        assert_eq!(state.candies.len(), 1);
    }

    #[test]
    fn test_remote_consumes_without_growing() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut state = GameState::new(world::MAP_SIZE);
        let mut mirror = worm_at(&mut rng, false, 1, Vec2::new(500.0, 500.0), Vec2::new(1.0, 0.0));
        mirror.kind = WormKind::Remote;
        state.worms.push(mirror);
        place_candy(&mut state, Vec2::new(500.0, 500.0), 6.0, 3);

        collect_candies(&mut state);
        assert!(state.candies.is_empty());
        assert_eq!(state.worms[0].score, 0);
        assert_eq!(state.worms[0].len(), world::INITIAL_SEGMENTS);
    }

    #[test]
    fn test_head_guard_ignores_first_segments() {
        let mut rng = StdRng::seed_from_u64(5);
        let b = worm_at(&mut rng, false, 1, Vec2::new(1000.0, 1000.0), Vec2::new(0.0, -1.0));
        let a = worm_at(&mut rng, false, 2, b.segments[0], Vec2::new(1.0, 0.0));
        assert!(!worm_hit(&a, &b));
        let c = worm_at(&mut rng, false, 3, b.segments[HEAD_GUARD], Vec2::new(1.0, 0.0));
        assert!(worm_hit(&c, &b));
    }

    #[test]
    fn test_player_dies_into_bot_body() {
        let (mut state, mut rng) = crash_setup();
        let deaths = resolve_worm_collisions(&mut state, &mut rng);
        assert_eq!(deaths.len(), 1);
        assert!(deaths[0].was_player);
        assert!(state.game_over);
        // Ten segments leave five remains worth two each
        assert_eq!(state.candies.len(), 5);
        assert!(state.candies.iter().all(|c| c.value == candy::REMAINS_VALUE));
    }

    #[test]
    fn test_shield_prevents_death() {
        let (mut state, mut rng) = crash_setup();
        state.worms[0].has_shield = true;
        assert!(resolve_worm_collisions(&mut state, &mut rng).is_empty());
        assert!(!state.game_over);
        assert!(state.candies.is_empty());
    }

    #[test]
    fn test_ghost_neither_dies_nor_kills() {
        let (mut state, mut rng) = crash_setup();
        state.worms[0].is_ghost = true;
        assert!(resolve_worm_collisions(&mut state, &mut rng).is_empty());

        // Ghost body is no obstacle either: swap roles
        let (mut state, mut rng) = crash_setup();
        state.worms.swap(0, 1);
        state.worms[0].is_ghost = true;
        assert!(resolve_worm_collisions(&mut state, &mut rng).is_empty());
    }

    #[test]
    fn test_bot_respawns_in_place() {
        let (mut state, mut rng) = crash_setup();
        state.worms[0].kind = WormKind::Bot;
        let old_id = state.worms[0].id.clone();
        let deaths = resolve_worm_collisions(&mut state, &mut rng);
        assert_eq!(deaths.len(), 1);
        assert!(!deaths[0].was_player);
        assert!(!state.game_over);
        assert_eq!(state.worms.len(), 2);
        assert_ne!(state.worms[0].id, old_id);
        assert!(state.worms[0].is_bot());
        assert_eq!(state.worms[0].len(), world::INITIAL_SEGMENTS);
    }

    #[test]
    fn test_remote_never_dies_locally() {
        let (mut state, mut rng) = crash_setup();
        state.worms[0].kind = WormKind::Remote;
        assert!(resolve_worm_collisions(&mut state, &mut rng).is_empty());
    }

    #[test]
    fn test_local_worm_dies_on_remote_body() {
        let (mut state, mut rng) = crash_setup();
        state.worms[1].kind = WormKind::Remote;
        let deaths = resolve_worm_collisions(&mut state, &mut rng);
        assert_eq!(deaths.len(), 1);
        assert!(state.game_over);
    }
}
