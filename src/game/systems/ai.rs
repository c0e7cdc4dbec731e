use rand::Rng;
use std::f32::consts::PI;

use crate::game::constants::ai::*;
use crate::game::constants::{candy, movement, world};
use crate::game::state::{Candy, GameState, Worm};
use crate::util::math::normalize_angle;
use crate::util::vec2::Vec2;

/// What a bot decided to steer toward this round
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AiDecision {
    /// Too close to the edge, head back to the middle
    ReturnToCenter,
    /// Chase a candy at this position
    Chase(Vec2),
    /// Drift off in a slightly different direction
    Wander,
}

/// Update every local bot: heading decisions, boost bursts and shedding.
/// The player and remote mirrors are never touched.
pub fn update<R: Rng>(state: &mut GameState, rng: &mut R) {
    let map_size = state.map_size;
    for i in 0..state.worms.len() {
        let worm = &mut state.worms[i];
        if !worm.is_bot() || worm.is_empty() {
            continue;
        }
        worm.ai_timer += 1;

        let head = state.worms[i].segments[0];
        let near_boundary = is_near_boundary(head, map_size);
        if state.worms[i].ai_timer >= DIRECTION_CHANGE_INTERVAL || near_boundary {
            let decision = decide(head, near_boundary, &state.candies, rng);
            let worm = &mut state.worms[i];
            worm.ai_timer = 0;
            worm.target_angle = heading_for(worm, head, decision, map_size, rng);
        }

        if let Some(tail) = boost(&mut state.worms[i], rng) {
            let color = state.worms[i].color.clone();
            state.add_candy(tail, &color, candy::BOT_SHED_SIZE, candy::SHED_VALUE);
        }
    }
}

fn is_near_boundary(head: Vec2, map_size: f32) -> bool {
    head.x < BOUNDARY_MARGIN
        || head.x > map_size - BOUNDARY_MARGIN
        || head.y < BOUNDARY_MARGIN
        || head.y > map_size - BOUNDARY_MARGIN
}

fn decide<R: Rng>(head: Vec2, near_boundary: bool, candies: &[Candy], rng: &mut R) -> AiDecision {
    if near_boundary {
        return AiDecision::ReturnToCenter;
    }
    match find_nearest_candy(candies, head, CANDY_SEARCH_RADIUS) {
        Some(target) if rng.gen_bool(CHASE_CHANCE) => AiDecision::Chase(target.position),
        _ => AiDecision::Wander,
    }
}

fn heading_for<R: Rng>(worm: &Worm, head: Vec2, decision: AiDecision, map_size: f32, rng: &mut R) -> f32 {
    match decision {
        AiDecision::ReturnToCenter => {
            let center = Vec2::new(map_size / 2.0, map_size / 2.0);
            head.angle_to_point(center)
        }
        AiDecision::Chase(target) => head.angle_to_point(target),
        AiDecision::Wander => {
            let offset = (rng.gen::<f32>() - 0.5) * PI * 0.5;
            normalize_angle(worm.angle + offset)
        }
    }
}

/// Roll a boost burst for this tick and set speed. Returns the shed tail
/// position when the burst cost a segment.
fn boost<R: Rng>(worm: &mut Worm, rng: &mut R) -> Option<Vec2> {
    worm.is_boosting =
        rng.gen_bool(BOOST_CHANCE) && worm.len() > world::INITIAL_SEGMENTS + BOOST_MIN_EXTRA;
    let base = if worm.is_boosting {
        movement::BOOST_SPEED
    } else {
        movement::BASE_SPEED
    };
    worm.speed = base * worm.speed_multiplier;

    if worm.is_boosting && rng.gen_bool(SHED_CHANCE) {
        worm.shed_tail(world::INITIAL_SEGMENTS)
    } else {
        None
    }
}

/// Closest candy strictly within `max_distance` of `position`
pub fn find_nearest_candy(candies: &[Candy], position: Vec2, max_distance: f32) -> Option<&Candy> {
    candies
        .iter()
        .map(|c| (c, c.position.distance_sq_to(position)))
        .filter(|(_, d)| *d < max_distance * max_distance)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(c, _)| c)
}
