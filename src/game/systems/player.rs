//! Local player steering: pointer heading, boost and boost shedding.

use rand::Rng;

use crate::game::constants::{candy, movement, world};
use crate::game::state::GameState;
use crate::util::vec2::Vec2;

/// Cached pointer intent, applied on the next tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerInput {
    /// Pointer position in viewport (screen) space
    pub position: Vec2,
    /// Primary button held (boost)
    pub pressed: bool,
}

/// Steer the player toward the pointer and apply boost.
///
/// The heading is measured from the head's screen position, which is the
/// head minus the camera offset.
pub fn update<R: Rng>(state: &mut GameState, input: &PointerInput, rng: &mut R) {
    let camera = state.camera;
    let Some(player) = state.player_mut() else {
        return;
    };
    let Some(head) = player.head() else {
        return;
    };

    let screen_head = head - camera;
    player.target_angle = screen_head.angle_to_point(input.position);

    player.is_boosting = input.pressed && player.len() > world::INITIAL_SEGMENTS;
    let base = if player.is_boosting {
        movement::BOOST_SPEED
    } else {
        movement::BASE_SPEED
    };
    player.speed = base * player.speed_multiplier;

    if !player.is_boosting || !rng.gen_bool(movement::PLAYER_SHED_CHANCE) {
        return;
    }
    if let Some(tail) = player.shed_tail(world::INITIAL_SEGMENTS) {
        let color = player.color.clone();
        state.add_candy(tail, &color, candy::PLAYER_SHED_SIZE, candy::SHED_VALUE);
    }
}
