//! Candy population upkeep.

use rand::Rng;

use crate::game::constants::candy;
use crate::game::factory::create_candy;
use crate::game::state::GameState;
use crate::util::vec2::Vec2;

/// Fill the map with `target` candies at once (session start)
pub fn populate<R: Rng>(state: &mut GameState, target: usize, rng: &mut R) {
    while state.candies.len() < target {
        let id = state.next_entity_id();
        let map_size = state.map_size;
        state.candies.push(create_candy(id, map_size, rng));
    }
}

/// Below `target`, add at most one candy per tick with `RESPAWN_RATE` odds
pub fn respawn<R: Rng>(state: &mut GameState, target: usize, rng: &mut R) -> bool {
    if state.candies.len() >= target || !rng.gen_bool(candy::RESPAWN_RATE) {
        return false;
    }
    let id = state.next_entity_id();
    let map_size = state.map_size;
    state.candies.push(create_candy(id, map_size, rng));
    true
}

/// Turn every even-indexed segment into a jittered value-2 candy
pub fn drop_remains<R: Rng>(state: &mut GameState, segments: &[Vec2], color: &str, rng: &mut R) {
    let jitter = candy::REMAINS_JITTER;
    for segment in segments.iter().step_by(2) {
        let offset = Vec2::new(
            (rng.gen::<f32>() - 0.5) * jitter,
            (rng.gen::<f32>() - 0.5) * jitter,
        );
        state.add_candy(*segment + offset, color, candy::REMAINS_SIZE, candy::REMAINS_VALUE);
    }
}
