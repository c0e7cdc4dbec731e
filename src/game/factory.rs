//! Entity factory: worms, candies and map zones with randomized initial state.
//!
//! Every function draws from the caller's `Rng`, so a seeded generator gives
//! reproducible worlds in tests. Production engines seed from entropy.

use rand::Rng;
use std::f32::consts::TAU;
use uuid::Uuid;

use crate::game::constants::{candy, net, palette, world, zone};
use crate::game::state::{
    AbilityState, AbilityType, Candy, EntityId, MapZone, Worm, WormId, WormKind, ZoneType,
};
use crate::util::vec2::Vec2;

/// Fresh random identity for a local worm
pub fn generate_worm_id() -> WormId {
    Uuid::new_v4().simple().to_string()
}

/// Trim a human display name to at most `MAX_NAME_LEN` characters
pub fn sanitize_name(name: &str) -> String {
    let truncated: String = name.trim().chars().take(net::MAX_NAME_LEN).collect();
    let trimmed = truncated.trim_end();
    if trimmed.is_empty() {
        "Player".to_string()
    } else {
        trimmed.to_string()
    }
}

fn bot_name(index: usize) -> String {
    let names = &palette::BOT_NAMES;
    names[index.saturating_sub(1) % names.len()].to_string()
}

/// Build a worm at a random spawn point with its tail laid out straight
/// behind the heading. Colors come from the palette by `index`; only the
/// player gets ability slots.
pub fn create_worm<R: Rng>(
    is_player: bool,
    index: usize,
    name: Option<&str>,
    map_size: f32,
    rng: &mut R,
) -> Worm {
    let (color, glow_color) = palette::WORM_COLORS[index % palette::WORM_COLORS.len()];
    let lo = world::SPAWN_MARGIN.min(map_size / 2.0);
    let hi = (map_size - world::SPAWN_MARGIN).max(lo + f32::EPSILON);
    let start = Vec2::new(rng.gen_range(lo..hi), rng.gen_range(lo..hi));
    let start_angle = rng.gen_range(0.0..TAU);

    let back = Vec2::from_angle(start_angle);
    let segments = (0..world::INITIAL_SEGMENTS)
        .map(|i| start - back * (i as f32 * world::SEGMENT_DISTANCE))
        .collect();

    let name = match (name, is_player) {
        (Some(n), _) => sanitize_name(n),
        (None, true) => "You".to_string(),
        (None, false) => bot_name(index),
    };

    let abilities = if is_player {
        AbilityType::ALL.iter().map(|&t| AbilityState::new(t)).collect()
    } else {
        Vec::new()
    };

    Worm {
        id: generate_worm_id(),
        name,
        segments,
        color: color.to_string(),
        glow_color: glow_color.to_string(),
        angle: crate::util::math::normalize_angle(start_angle),
        target_angle: crate::util::math::normalize_angle(start_angle),
        speed: crate::game::constants::movement::BASE_SPEED,
        is_boosting: false,
        score: 0,
        kind: if is_player { WormKind::Player } else { WormKind::Bot },
        ai_timer: 0,
        abilities,
        is_invisible: false,
        is_ghost: false,
        has_shield: false,
        speed_multiplier: 1.0,
        buff_timer: 0,
        buff_type: None,
    }
}

/// Random candy somewhere on the map. Value is half the size, rounded down.
pub fn create_candy<R: Rng>(id: EntityId, map_size: f32, rng: &mut R) -> Candy {
    let lo = candy::SPAWN_MARGIN.min(map_size / 2.0);
    let hi = (map_size - candy::SPAWN_MARGIN).max(lo + f32::EPSILON);
    let size = rng.gen_range(candy::MIN_SIZE..candy::MAX_SIZE);
    let color = palette::CANDY_COLORS[rng.gen_range(0..palette::CANDY_COLORS.len())];

    Candy {
        id,
        position: Vec2::new(rng.gen_range(lo..hi), rng.gen_range(lo..hi)),
        color: color.to_string(),
        size,
        value: (size / 2.0).floor() as u32,
    }
}

fn random_position<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> Vec2 {
    Vec2::new(rng.gen_range(lo..hi), rng.gen_range(lo..hi))
}

/// The session's zone set: `count()` zones per kind, portals as linked pairs
pub fn create_map_zones<R, F>(map_size: f32, rng: &mut R, mut next_id: F) -> Vec<MapZone>
where
    R: Rng,
    F: FnMut() -> EntityId,
{
    let lo = zone::EDGE_MARGIN.min(map_size / 2.0);
    let hi = (map_size - zone::EDGE_MARGIN).max(lo + f32::EPSILON);

    let mut zones = Vec::with_capacity(ZoneType::ALL.iter().map(|t| t.count()).sum());
    for zone_type in ZoneType::ALL {
        if zone_type == ZoneType::Portal {
            for _ in 0..zone_type.count() / 2 {
                let mut a = MapZone::new(next_id(), random_position(rng, lo, hi), zone_type, rng.gen_range(0.0..TAU));
                let mut b = MapZone::new(next_id(), random_position(rng, lo, hi), zone_type, rng.gen_range(0.0..TAU));
                a.linked_portal_id = Some(b.id);
                b.linked_portal_id = Some(a.id);
                zones.push(a);
                zones.push(b);
            }
        } else {
            for _ in 0..zone_type.count() {
                zones.push(MapZone::new(
                    next_id(),
                    random_position(rng, lo, hi),
                    zone_type,
                    rng.gen_range(0.0..TAU),
                ));
            }
        }
    }
    zones
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_create_player_worm() {
        let mut rng = StdRng::seed_from_u64(7);
        let worm = create_worm(true, 0, Some("Ana"), world::MAP_SIZE, &mut rng);
        assert_eq!(worm.len(), world::INITIAL_SEGMENTS);
        assert!(worm.is_player());
        assert_eq!(worm.abilities.len(), 4);
        assert_eq!(worm.name, "Ana");
        assert_eq!(worm.color, palette::WORM_COLORS[0].0);
    }

    #[test]
    fn test_create_bot_worm_has_no_abilities() {
        let mut rng = StdRng::seed_from_u64(7);
        let worm = create_worm(false, 3, None, world::MAP_SIZE, &mut rng);
        assert!(worm.is_bot());
        assert!(worm.abilities.is_empty());
        assert_eq!(worm.color, palette::WORM_COLORS[3].0);
        assert!(!worm.name.is_empty());
    }

    #[test]
    fn test_color_wraps_palette() {
        let mut rng = StdRng::seed_from_u64(1);
        let n = palette::WORM_COLORS.len();
        let a = create_worm(false, 2, None, world::MAP_SIZE, &mut rng);
        let b = create_worm(false, 2 + n, None, world::MAP_SIZE, &mut rng);
        assert_eq!(a.color, b.color);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_worm_spawns_inside_margin_with_straight_tail() {
        let mut rng = StdRng::seed_from_u64(99);
        for i in 0..50 {
            let worm = create_worm(false, i, None, world::MAP_SIZE, &mut rng);
            let head = worm.head().unwrap();
            assert!(head.x >= world::SPAWN_MARGIN && head.x <= world::MAP_SIZE - world::SPAWN_MARGIN);
            assert!(head.y >= world::SPAWN_MARGIN && head.y <= world::MAP_SIZE - world::SPAWN_MARGIN);
            for pair in worm.segments.windows(2) {
                let d = pair[0].distance_to(pair[1]);
                assert!((d - world::SEGMENT_DISTANCE).abs() < 0.01);
            }
            // Tail trails behind the heading
            let behind = head - Vec2::from_angle(worm.angle) * world::SEGMENT_DISTANCE;
            assert!(worm.segments[1].approx_eq(behind, 0.01));
        }
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("  Bob  "), "Bob");
        assert_eq!(sanitize_name("abcdefghijklmnopqrstuvwxyz").chars().count(), 15);
        assert_eq!(sanitize_name("   "), "Player");
    }

    #[test]
    fn test_create_candy_value_is_half_size() {
        let mut rng = StdRng::seed_from_u64(3);
        for id in 0..200 {
            let c = create_candy(id, world::MAP_SIZE, &mut rng);
            assert!(c.size >= candy::MIN_SIZE && c.size < candy::MAX_SIZE);
            assert_eq!(c.value, (c.size / 2.0).floor() as u32);
            assert!(c.position.x >= candy::SPAWN_MARGIN);
            assert!(c.position.y <= world::MAP_SIZE - candy::SPAWN_MARGIN);
        }
    }

    #[test]
    fn test_map_zones_composition() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut id = 0;
        let zones = create_map_zones(world::MAP_SIZE, &mut rng, || {
            id += 1;
            id
        });
        for kind in ZoneType::ALL {
            assert_eq!(zones.iter().filter(|z| z.zone_type == kind).count(), kind.count());
        }
        for z in &zones {
            assert!(z.position.x >= zone::EDGE_MARGIN && z.position.x <= world::MAP_SIZE - zone::EDGE_MARGIN);
        }
    }

    #[test]
    fn test_portals_are_linked_pairs() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut id = 100;
        let zones = create_map_zones(world::MAP_SIZE, &mut rng, || {
            id += 1;
            id
        });
        for z in &zones {
            match z.zone_type {
                ZoneType::Portal => {
                    let partner_id = z.linked_portal_id.expect("portal without partner");
                    let partner = zones.iter().find(|p| p.id == partner_id).unwrap();
                    assert_eq!(partner.linked_portal_id, Some(z.id));
                    assert_ne!(partner.id, z.id);
                }
                _ => assert!(z.linked_portal_id.is_none()),
            }
        }
    }
}
