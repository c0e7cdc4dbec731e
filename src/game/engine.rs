//! The simulation engine.
//!
//! `GameEngine` owns the whole `GameState` and is the only thing that
//! mutates it. Hosts push input (pointer, abilities, viewport) and network
//! snapshots in, call `update` once per tick and read the state back out.
//! Every operation is synchronous and infallible; bad input is ignored.

use hashbrown::HashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::game::constants::movement;
use crate::game::factory::{create_map_zones, create_worm, sanitize_name};
use crate::game::state::{GameState, Worm, WormId};
use crate::game::systems::{
    abilities, ai, candy, collision, movement as movement_system, player, ranking, remote, zones,
};
use crate::game::systems::player::PointerInput;
use crate::game::systems::ranking::LeaderboardEntry;
use crate::net::protocol::RemotePlayerState;
use crate::util::vec2::Vec2;

/// Called once when the local player dies
pub type DeathCallback = Box<dyn FnMut() + Send>;

struct MultiplayerLink {
    /// Server-assigned id of the local player; never mirrored
    local_id: String,
    on_death: DeathCallback,
}

pub struct GameEngine {
    state: GameState,
    config: GameConfig,
    rng: StdRng,
    input: PointerInput,
    viewport: Vec2,
    player_name: Option<String>,
    multiplayer: Option<MultiplayerLink>,
    /// Latest snapshot per mirror id
    remote_targets: HashMap<WormId, RemotePlayerState>,
}

impl GameEngine {
    /// Engine with an entropy-seeded generator
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Engine whose whole world is reproducible from `seed`
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        let viewport = Vec2::new(config.viewport_width, config.viewport_height);
        let mut engine = Self {
            state: GameState::new(config.map_size),
            config,
            rng,
            input: PointerInput::default(),
            viewport,
            player_name: None,
            multiplayer: None,
            remote_targets: HashMap::new(),
        };
        engine.initialize();
        engine
    }

    fn local_worm_count(&self) -> usize {
        let count = if self.multiplayer.is_some() {
            self.config.multiplayer_worm_count
        } else {
            self.config.worm_count
        };
        count.max(1)
    }

    /// Build a fresh world: player in slot 0, bots after it, then mirrors
    fn initialize(&mut self) {
        let map_size = self.config.map_size;
        let mut state = GameState::new(map_size);

        state.worms.push(create_worm(
            true,
            0,
            self.player_name.as_deref(),
            map_size,
            &mut self.rng,
        ));
        for i in 1..self.local_worm_count() {
            state.worms.push(create_worm(false, i, None, map_size, &mut self.rng));
        }

        state.zones = create_map_zones(map_size, &mut self.rng, || state.next_entity_id());
        candy::populate(&mut state, self.config.candy_count, &mut self.rng);

        if let Some(head) = state.player().and_then(|p| p.head()) {
            state.camera = head - self.viewport * 0.5;
        }
        remote::sync_mirrors(&mut state, &self.remote_targets);
        ranking::update(&mut state);

        self.state = state;
        self.input = PointerInput::default();
    }

    // --- Input ---

    /// Pointer position in viewport space
    pub fn set_mouse_position(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.input.position = Vec2::new(x, y);
        }
    }

    pub fn set_mouse_down(&mut self, down: bool) {
        self.input.pressed = down;
    }

    /// Trigger the player's ability in slot `index` (0..4). Ignored when
    /// the slot does not exist, is busy, or the game is over.
    pub fn activate_ability(&mut self, index: usize) -> bool {
        if self.state.game_over {
            return false;
        }
        match self.state.player_mut() {
            Some(player) => abilities::activate(player, index),
            None => false,
        }
    }

    pub fn update_viewport(&mut self, width: f32, height: f32) {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            self.viewport = Vec2::new(width, height);
        }
    }

    /// Display name for the player; applied now and on every reset
    pub fn set_player_name(&mut self, name: &str) {
        let name = sanitize_name(name);
        if let Some(player) = self.state.player_mut() {
            player.name = name.clone();
        }
        self.player_name = Some(name);
    }

    // --- Simulation ---

    /// Advance one tick. Does nothing once the game is over.
    pub fn update(&mut self) {
        if self.state.game_over {
            return;
        }
        let state = &mut self.state;
        let rng = &mut self.rng;
        state.tick += 1;

        abilities::update(state);
        player::update(state, &self.input, rng);
        ai::update(state, rng);
        movement_system::update(state, &self.remote_targets);
        zones::update(state, rng);
        abilities::apply_shield_repel(state);

        collision::collect_candies(state);
        let deaths = collision::resolve_worm_collisions(state, rng);

        update_camera(state, self.viewport);
        candy::respawn(state, self.config.candy_count, rng);
        ranking::update(state);

        for death in deaths.iter().filter(|d| d.was_player) {
            info!(
                "Player {} died at length {} (tick {})",
                death.name, death.length, self.state.tick
            );
            if let Some(link) = self.multiplayer.as_mut() {
                (link.on_death)();
            }
        }
    }

    /// Start over with a new world. Multiplayer wiring and the remote
    /// cache survive; mirrors are rebuilt from the cache.
    pub fn reset(&mut self) {
        self.initialize();
        info!(
            "Game reset: {} local worms, {} mirrors",
            self.local_worm_count(),
            self.remote_targets.len()
        );
    }

    // --- Multiplayer ---

    /// Switch to multiplayer sizing and remember which peer id is ours
    pub fn enable_multiplayer(&mut self, local_id: impl Into<String>, on_death: DeathCallback) {
        let local_id = local_id.into();
        self.remote_targets.remove(&remote::mirror_id(&local_id));
        self.multiplayer = Some(MultiplayerLink {
            local_id: local_id.clone(),
            on_death,
        });
        self.resize_local_worms();
        remote::sync_mirrors(&mut self.state, &self.remote_targets);
        info!("Multiplayer enabled as {}", local_id);
    }

    pub fn is_multiplayer(&self) -> bool {
        self.multiplayer.is_some()
    }

    pub fn local_id(&self) -> Option<&str> {
        self.multiplayer.as_ref().map(|m| m.local_id.as_str())
    }

    fn resize_local_worms(&mut self) {
        let target = self.local_worm_count();
        let map_size = self.state.map_size;
        let (mut local, mirrors): (Vec<Worm>, Vec<Worm>) = std::mem::take(&mut self.state.worms)
            .into_iter()
            .partition(|w| !w.is_remote());
        local.truncate(target);
        while local.len() < target {
            let slot = local.len();
            local.push(create_worm(false, slot, None, map_size, &mut self.rng));
        }
        local.extend(mirrors);
        self.state.worms = local;
        debug!("Local worm slots resized to {}", target);
    }

    /// Replace the remote cache with a roster snapshot. Dead peers and our
    /// own entry are skipped; mirrors are created or dropped to match.
    pub fn update_remote_players(&mut self, players: &[RemotePlayerState]) {
        let local_id = self.local_id().map(str::to_owned);
        self.remote_targets = players
            .iter()
            .filter(|p| p.alive && Some(p.id.as_str()) != local_id.as_deref())
            .map(|p| (remote::mirror_id(&p.id), p.clone()))
            .collect();
        remote::sync_mirrors(&mut self.state, &self.remote_targets);
    }

    /// Forget a peer right away (it left the room)
    pub fn remove_remote_player(&mut self, player_id: &str) {
        let id = remote::mirror_id(player_id);
        self.remote_targets.remove(&id);
        let before = self.state.worms.len();
        self.state.worms.retain(|w| w.id != id);
        if self.state.worms.len() != before {
            debug!("Removed remote mirror {}", id);
        }
    }

    /// A peer died: drop its mirror and leave its remains as candy
    pub fn drop_remote_remains(&mut self, player_id: &str, segments: &[Vec2], color: &str) {
        if self.local_id() == Some(player_id) {
            return;
        }
        self.remove_remote_player(player_id);
        candy::drop_remains(&mut self.state, segments, color, &mut self.rng);
    }

    // --- Queries ---

    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> Option<&Worm> {
        self.state.player()
    }

    pub fn is_game_over(&self) -> bool {
        self.state.game_over
    }

    pub fn tick(&self) -> u64 {
        self.state.tick
    }

    pub fn player_rank(&self) -> usize {
        self.state.player_rank
    }

    pub fn leaderboard(&self, n: usize) -> Vec<LeaderboardEntry> {
        ranking::leaderboard(&self.state, n)
    }
}

/// Ease the camera so the player's head drifts to the viewport center
fn update_camera(state: &mut GameState, viewport: Vec2) {
    let Some(head) = state.player().and_then(|p| p.head()) else {
        return;
    };
    let target = head - viewport * 0.5;
    state.camera = state.camera.lerp(target, movement::CAMERA_LERP);
}
