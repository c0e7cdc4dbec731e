use std::str::FromStr;

use crate::game::constants::{candy, net, world};

/// Simulation configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Side length of the square arena
    pub map_size: f32,
    /// Local worms (player plus bots) in single-player
    pub worm_count: usize,
    /// Local worms (player plus bots) once multiplayer is enabled
    pub multiplayer_worm_count: usize,
    /// Candy population the respawner tops up toward
    pub candy_count: usize,
    /// Viewport used to center the camera
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Ticks per second driven by the host loop
    pub tick_rate: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_size: world::MAP_SIZE,
            worm_count: world::WORM_COUNT,
            multiplayer_worm_count: world::MULTIPLAYER_WORM_COUNT,
            candy_count: candy::COUNT,
            viewport_width: 1280.0,
            viewport_height: 720.0,
            tick_rate: world::TICK_RATE,
        }
    }
}

/// Parse `key` from the environment if set and accepted by `valid`.
/// Invalid values are logged and leave `target` untouched.
fn env_override<T, F>(key: &str, target: &mut T, valid: F, rule: &str)
where
    T: FromStr,
    F: Fn(&T) -> bool,
{
    let Ok(raw) = std::env::var(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(parsed) if valid(&parsed) => *target = parsed,
        Ok(_) => tracing::warn!("{} must be {}, using default", key, rule),
        Err(_) => tracing::warn!("Invalid {} '{}', using default", key, raw),
    }
}

impl GameConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        env_override("MAP_SIZE", &mut config.map_size, |v: &f32| {
            v.is_finite() && *v >= 1000.0 && *v <= 20000.0
        }, "1000-20000");
        env_override("WORM_COUNT", &mut config.worm_count, |v: &usize| {
            *v >= 1 && *v <= 200
        }, "1-200");
        env_override("MULTIPLAYER_WORM_COUNT", &mut config.multiplayer_worm_count, |v: &usize| {
            *v >= 1 && *v <= 200
        }, "1-200");
        env_override("CANDY_COUNT", &mut config.candy_count, |v: &usize| *v <= 5000, "0-5000");
        env_override("VIEWPORT_WIDTH", &mut config.viewport_width, |v: &f32| {
            v.is_finite() && *v > 0.0
        }, "> 0");
        env_override("VIEWPORT_HEIGHT", &mut config.viewport_height, |v: &f32| {
            v.is_finite() && *v > 0.0
        }, "> 0");
        env_override("TICK_RATE", &mut config.tick_rate, |v: &u32| {
            *v >= 1 && *v <= 240
        }, "1-240");

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if !self.map_size.is_finite() || self.map_size <= 2.0 * world::SPAWN_MARGIN {
            return Err("map_size must leave room for the spawn margin".to_string());
        }
        if self.worm_count == 0 || self.multiplayer_worm_count == 0 {
            return Err("worm counts must include the player".to_string());
        }
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return Err("viewport must have a positive size".to_string());
        }
        if self.tick_rate == 0 {
            return Err("tick_rate must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Multiplayer link configuration
#[derive(Debug, Clone, PartialEq)]
pub struct NetConfig {
    /// http(s) or ws(s) base address; `None` plays offline
    pub server_url: Option<String>,
    pub room: String,
    pub player_name: Option<String>,
    pub max_reconnect_attempts: u32,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            room: net::DEFAULT_ROOM.to_string(),
            player_name: None,
            max_reconnect_attempts: net::MAX_RECONNECT_ATTEMPTS,
        }
    }
}

impl NetConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("SERVER_URL") {
            let url = url.trim();
            if !url.is_empty() {
                config.server_url = Some(url.to_string());
            }
        }

        if let Ok(room) = std::env::var("ROOM") {
            let room = room.trim();
            if !room.is_empty() {
                config.room = room.to_string();
            } else {
                tracing::warn!("ROOM is empty, using default");
            }
        }

        if let Ok(name) = std::env::var("PLAYER_NAME") {
            config.player_name = Some(crate::game::factory::sanitize_name(&name));
        }

        env_override(
            "MAX_RECONNECT_ATTEMPTS",
            &mut config.max_reconnect_attempts,
            |v: &u32| *v <= 100,
            "0-100",
        );

        config
    }

    pub fn is_multiplayer(&self) -> bool {
        self.server_url.is_some()
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if let Some(url) = &self.server_url {
            if crate::net::connection::room_url(url, &self.room).is_none() {
                return Err(format!("cannot build a room address from '{}' and '{}'", url, self.room));
            }
        }
        Ok(())
    }
}
