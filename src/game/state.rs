//! Game state definitions and structures
//!
//! Contains every simulated entity (worms, candies, map zones) and the root
//! aggregate the engine owns.

use serde::{Deserialize, Serialize};

use crate::game::constants::{ability, world, zone, worm_radius};
use crate::util::vec2::Vec2;

/// Worm identifier. Local worms get a random uuid, remote mirrors
/// `remote_<peer id>`.
pub type WormId = String;

/// Identifier for candies and zones
pub type EntityId = u64;

/// Who drives a worm
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WormKind {
    /// The locally controlled worm (exactly one)
    Player,
    /// Local AI worm occupying a fixed slot
    Bot,
    /// Stand-in for a peer's worm, driven by network snapshots
    Remote,
}

/// Player-only timed abilities
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AbilityType {
    Dash,
    Invisible,
    Ghost,
    Shield,
}

impl AbilityType {
    /// Slot order of the player's ability bar
    pub const ALL: [AbilityType; 4] = [
        AbilityType::Dash,
        AbilityType::Invisible,
        AbilityType::Ghost,
        AbilityType::Shield,
    ];

    /// (cooldown, duration) in ticks
    pub fn timings(&self) -> (u32, u32) {
        match self {
            AbilityType::Dash => (ability::DASH_COOLDOWN, ability::DASH_DURATION),
            AbilityType::Invisible => (ability::INVISIBLE_COOLDOWN, ability::INVISIBLE_DURATION),
            AbilityType::Ghost => (ability::GHOST_COOLDOWN, ability::GHOST_DURATION),
            AbilityType::Shield => (ability::SHIELD_COOLDOWN, ability::SHIELD_DURATION),
        }
    }

    /// Keyboard key bound to the slot
    pub fn key(&self) -> char {
        match self {
            AbilityType::Dash => '1',
            AbilityType::Invisible => '2',
            AbilityType::Ghost => '3',
            AbilityType::Shield => '4',
        }
    }
}

/// One ability slot.
///
/// `idle (cooldown = 0) -> active (duration counts down) -> cooling down
/// (cooldown counts down) -> idle`. Triggering is refused while active or
/// cooling down.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AbilityState {
    pub ability_type: AbilityType,
    pub cooldown: u32,
    pub max_cooldown: u32,
    pub duration: u32,
    pub max_duration: u32,
    pub active: bool,
    pub key: char,
}

impl AbilityState {
    pub fn new(ability_type: AbilityType) -> Self {
        let (max_cooldown, max_duration) = ability_type.timings();
        Self {
            ability_type,
            cooldown: 0,
            max_cooldown,
            duration: 0,
            max_duration,
            active: false,
            key: ability_type.key(),
        }
    }

    pub fn is_ready(&self) -> bool {
        !self.active && self.cooldown == 0
    }

    /// Arm the ability. Returns false (and changes nothing) if not ready.
    pub fn trigger(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.active = true;
        self.duration = self.max_duration;
        self.cooldown = self.max_cooldown;
        true
    }

    /// Advance one tick: burn duration while active, cooldown afterwards
    pub fn tick(&mut self) {
        if self.active {
            self.duration = self.duration.saturating_sub(1);
            if self.duration == 0 {
                self.active = false;
            }
        } else if self.cooldown > 0 {
            self.cooldown -= 1;
        }
    }
}

/// Map zone kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    Speed,
    Mass,
    Blackhole,
    Toxic,
    Portal,
}

impl ZoneType {
    pub const ALL: [ZoneType; 5] = [
        ZoneType::Speed,
        ZoneType::Mass,
        ZoneType::Blackhole,
        ZoneType::Toxic,
        ZoneType::Portal,
    ];

    pub fn radius(&self) -> f32 {
        match self {
            ZoneType::Speed => zone::SPEED_RADIUS,
            ZoneType::Mass => zone::MASS_RADIUS,
            ZoneType::Blackhole => zone::BLACKHOLE_RADIUS,
            ZoneType::Toxic => zone::TOXIC_RADIUS,
            ZoneType::Portal => zone::PORTAL_RADIUS,
        }
    }

    /// Zones of this kind per map
    pub fn count(&self) -> usize {
        match self {
            ZoneType::Speed => zone::SPEED_COUNT,
            ZoneType::Mass => zone::MASS_COUNT,
            ZoneType::Blackhole => zone::BLACKHOLE_COUNT,
            ZoneType::Toxic => zone::TOXIC_COUNT,
            ZoneType::Portal => zone::PORTAL_COUNT,
        }
    }
}

/// Static circular region with a per-tick effect on heads inside it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapZone {
    pub id: EntityId,
    pub position: Vec2,
    pub radius: f32,
    pub zone_type: ZoneType,
    /// Partner of a portal; always set for portals, never for other kinds
    pub linked_portal_id: Option<EntityId>,
    /// Animation phase for the renderer
    pub pulse_phase: f32,
    /// Ticks until a portal can be used again (shared with its partner)
    pub portal_cooldown: u32,
}

impl MapZone {
    pub fn new(id: EntityId, position: Vec2, zone_type: ZoneType, pulse_phase: f32) -> Self {
        Self {
            id,
            position,
            radius: zone_type.radius(),
            zone_type,
            linked_portal_id: None,
            pulse_phase,
            portal_cooldown: 0,
        }
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        self.position.distance_sq_to(point) < self.radius * self.radius
    }
}

/// Collectible food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candy {
    pub id: EntityId,
    pub position: Vec2,
    pub color: String,
    pub size: f32,
    pub value: u32,
}

/// A segmented worm. `segments[0]` is the head.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worm {
    pub id: WormId,
    pub name: String,
    pub segments: Vec<Vec2>,
    pub color: String,
    pub glow_color: String,
    /// Current heading, radians in (-PI, PI]
    pub angle: f32,
    /// Heading the worm is turning toward
    pub target_angle: f32,
    /// Head displacement per tick
    pub speed: f32,
    pub is_boosting: bool,
    pub score: u32,
    pub kind: WormKind,
    /// Ticks since the last AI heading decision
    #[serde(default)]
    pub ai_timer: u32,
    /// Empty for everything except the local player
    pub abilities: Vec<AbilityState>,
    pub is_invisible: bool,
    pub is_ghost: bool,
    pub has_shield: bool,
    pub speed_multiplier: f32,
    /// Remaining ticks of the zone buff
    pub buff_timer: u32,
    /// Zone kind that granted the current buff
    pub buff_type: Option<ZoneType>,
}

impl Worm {
    #[inline]
    pub fn head(&self) -> Option<Vec2> {
        self.segments.first().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        self.kind == WormKind::Player
    }

    #[inline]
    pub fn is_bot(&self) -> bool {
        self.kind == WormKind::Bot
    }

    #[inline]
    pub fn is_remote(&self) -> bool {
        self.kind == WormKind::Remote
    }

    /// Collision radius, grows with length
    pub fn radius(&self) -> f32 {
        worm_radius(self.segments.len())
    }

    pub fn ability_active(&self, ability_type: AbilityType) -> bool {
        self.abilities
            .iter()
            .any(|a| a.active && a.ability_type == ability_type)
    }

    /// Append up to `count` copies of the tail, never past `MAX_SEGMENTS`.
    /// Returns how many were added.
    pub fn grow(&mut self, count: usize) -> usize {
        let Some(tail) = self.segments.last().copied() else {
            return 0;
        };
        let added = count.min(world::MAX_SEGMENTS.saturating_sub(self.segments.len()));
        self.segments.extend(std::iter::repeat(tail).take(added));
        added
    }

    /// Remove the tail segment if the body is longer than `floor`
    pub fn shed_tail(&mut self, floor: usize) -> Option<Vec2> {
        if self.segments.len() > floor.max(1) {
            self.segments.pop()
        } else {
            None
        }
    }
}

/// Complete game state. Owned and mutated only by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub tick: u64,
    /// Slot 0 is the player, then bot slots, then remote mirrors
    pub worms: Vec<Worm>,
    pub candies: Vec<Candy>,
    pub zones: Vec<MapZone>,
    /// Top-left corner of the viewport in world space
    pub camera: Vec2,
    pub map_size: f32,
    pub game_over: bool,
    /// 1-based position of the player by length
    pub player_rank: usize,
    next_entity_id: EntityId,
}

impl GameState {
    pub fn new(map_size: f32) -> Self {
        Self {
            tick: 0,
            worms: Vec::new(),
            candies: Vec::new(),
            zones: Vec::new(),
            camera: Vec2::ZERO,
            map_size,
            game_over: false,
            player_rank: 1,
            next_entity_id: 1,
        }
    }

    /// Generate a new unique entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    pub fn player(&self) -> Option<&Worm> {
        self.worms.iter().find(|w| w.is_player())
    }

    pub fn player_mut(&mut self) -> Option<&mut Worm> {
        self.worms.iter_mut().find(|w| w.is_player())
    }

    pub fn worm(&self, id: &str) -> Option<&Worm> {
        self.worms.iter().find(|w| w.id == id)
    }

    pub fn zone(&self, id: EntityId) -> Option<&MapZone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Drop a candy into the world and return its id
    pub fn add_candy(&mut self, position: Vec2, color: &str, size: f32, value: u32) -> EntityId {
        let id = self.next_entity_id();
        self.candies.push(Candy {
            id,
            position,
            color: color.to_string(),
            size,
            value,
        });
        id
    }
}
