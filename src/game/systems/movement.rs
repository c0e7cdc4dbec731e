//! Movement integration: heading smoothing, head advance and body relaxation.
//!
//! Remote mirrors skip physical integration and are eased toward their last
//! network snapshot instead (see `remote`).

use hashbrown::HashMap;

use crate::game::constants::{movement, world};
use crate::game::state::{GameState, Worm, WormId};
use crate::game::systems::remote;
use crate::net::protocol::RemotePlayerState;
use crate::util::math::{lerp_angle, normalize_angle};
use crate::util::vec2::Vec2;

pub fn update(state: &mut GameState, remote_targets: &HashMap<WormId, RemotePlayerState>) {
    let map_size = state.map_size;
    for worm in state.worms.iter_mut().filter(|w| !w.is_empty()) {
        if worm.is_remote() {
            // No target means the peer went quiet; freeze in place
            if let Some(target) = remote_targets.get(&worm.id) {
                remote::interpolate(worm, target);
            }
        } else {
            integrate(worm, map_size);
        }
    }
}

/// Turn toward the target heading, move the head by `speed` and pull the
/// body along behind it
pub fn integrate(worm: &mut Worm, map_size: f32) {
    worm.angle = normalize_angle(lerp_angle(worm.angle, worm.target_angle, movement::TURN_LERP));

    let head = worm.segments[0] + Vec2::from_angle(worm.angle) * worm.speed;
    worm.segments[0] = head.clamp_each(
        world::BOUNDARY_INSET,
        map_size - world::BOUNDARY_INSET,
    );

    relax_body(&mut worm.segments);
}

/// Single front-to-back relaxation pass: any segment farther than
/// `SEGMENT_DISTANCE` from its predecessor is pulled to exactly that
/// distance. Closer segments stay put.
pub fn relax_body(segments: &mut [Vec2]) {
    for i in 1..segments.len() {
        let leader = segments[i - 1];
        let current = segments[i];
        let offset = leader - current;
        let dist = offset.length();
        if dist > world::SEGMENT_DISTANCE {
            segments[i] = current + offset * ((dist - world::SEGMENT_DISTANCE) / dist);
        }
    }
}
