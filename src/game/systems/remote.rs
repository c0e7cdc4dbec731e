//! Remote mirrors: local stand-ins for peer worms.
//!
//! Roster snapshots only replace cosmetic fields directly. Position and
//! heading are eased toward the last snapshot during movement so discrete
//! network updates do not show up as jumps.

use hashbrown::HashMap;

use crate::game::constants::{movement, net, palette, world};
use crate::game::state::{GameState, Worm, WormId, WormKind};
use crate::net::protocol::RemotePlayerState;
use crate::util::math::{lerp_angle, normalize_angle};

/// Local worm id for a peer
pub fn mirror_id(peer_id: &str) -> WormId {
    format!("{}{}", net::REMOTE_ID_PREFIX, peer_id)
}

/// Make the set of mirrored worms match `targets` (keyed by mirror id):
/// drop mirrors whose peer is gone, refresh metadata on the rest and spawn
/// mirrors for peers seen for the first time.
pub fn sync_mirrors(state: &mut GameState, targets: &HashMap<WormId, RemotePlayerState>) {
    state
        .worms
        .retain(|w| !w.is_remote() || targets.contains_key(&w.id));

    for worm in state.worms.iter_mut().filter(|w| w.is_remote()) {
        if let Some(target) = targets.get(&worm.id) {
            apply_metadata(worm, target);
        }
    }

    let mut fresh: Vec<(&WormId, &RemotePlayerState)> = targets
        .iter()
        .filter(|(id, _)| state.worm(id).is_none())
        .collect();
    // Stable slot order regardless of map iteration order
    fresh.sort_by(|a, b| a.0.cmp(b.0));
    for (id, target) in fresh {
        tracing::debug!(mirror = %id, name = %target.name, "Spawning remote mirror");
        let worm = mirror_from_snapshot(id.clone(), target);
        state.worms.push(worm);
    }
}

fn apply_metadata(worm: &mut Worm, target: &RemotePlayerState) {
    worm.is_boosting = target.is_boosting;
    worm.score = target.score;
    if !target.color.is_empty() {
        worm.color = target.color.clone();
    }
    if !target.glow_color.is_empty() {
        worm.glow_color = target.glow_color.clone();
    }
    if !target.name.is_empty() {
        worm.name = target.name.clone();
    }
}

/// New mirror placed exactly at the snapshot, with no abilities or flags
pub fn mirror_from_snapshot(id: WormId, target: &RemotePlayerState) -> Worm {
    let (default_color, default_glow) = palette::WORM_COLORS[0];
    let mut segments = target.target_segments();
    segments.truncate(world::MAX_SEGMENTS);
    let angle = normalize_angle(target.angle);

    Worm {
        id,
        name: if target.name.is_empty() {
            "Player".to_string()
        } else {
            target.name.clone()
        },
        segments,
        color: if target.color.is_empty() {
            default_color.to_string()
        } else {
            target.color.clone()
        },
        glow_color: if target.glow_color.is_empty() {
            default_glow.to_string()
        } else {
            target.glow_color.clone()
        },
        angle,
        target_angle: angle,
        speed: 0.0,
        is_boosting: target.is_boosting,
        score: target.score,
        kind: WormKind::Remote,
        ai_timer: 0,
        abilities: Vec::new(),
        is_invisible: false,
        is_ghost: false,
        has_shield: false,
        speed_multiplier: 1.0,
        buff_timer: 0,
        buff_type: None,
    }
}

/// Ease a mirror one tick toward its snapshot: segments by a fixed
/// fraction, heading along the shorter arc, then match the length (grow
/// by tail clones, truncate only past the slack).
pub fn interpolate(worm: &mut Worm, target: &RemotePlayerState) {
    let targets = target.target_segments();

    for (segment, goal) in worm.segments.iter_mut().zip(targets.iter()) {
        *segment = segment.lerp(*goal, movement::REMOTE_SEGMENT_LERP);
    }
    worm.angle = normalize_angle(lerp_angle(
        worm.angle,
        target.angle,
        movement::REMOTE_TURN_LERP,
    ));
    worm.target_angle = normalize_angle(target.angle);

    let want = targets.len().min(world::MAX_SEGMENTS);
    if worm.len() < want {
        worm.grow(want - worm.len());
    } else if worm.len() > want + movement::REMOTE_TRUNCATE_SLACK {
        worm.segments.truncate(want.max(1));
    }
}
