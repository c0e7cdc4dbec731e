/// World and body-chain constants
pub mod world {
    /// Side length of the square map
    pub const MAP_SIZE: f32 = 4000.0;
    /// Segments a worm spawns with (also the boost/toxic floor)
    pub const INITIAL_SEGMENTS: usize = 10;
    /// Hard cap on body length
    pub const MAX_SEGMENTS: usize = 200;
    /// Rest distance between consecutive segments
    pub const SEGMENT_DISTANCE: f32 = 8.0;
    /// Head radius of a fresh worm
    pub const WORM_BASE_RADIUS: f32 = 12.0;
    /// Local worms in single-player (player + bots)
    pub const WORM_COUNT: usize = 20;
    /// Local worms once a multiplayer room is joined (player + bots)
    pub const MULTIPLAYER_WORM_COUNT: usize = 8;
    /// Spawn positions keep this far from the map edge
    pub const SPAWN_MARGIN: f32 = 200.0;
    /// Heads are clamped this far inside the map edge
    pub const BOUNDARY_INSET: f32 = 10.0;
    /// Nominal ticks per second
    pub const TICK_RATE: u32 = 60;
}

/// Head movement constants
pub mod movement {
    pub const BASE_SPEED: f32 = 2.0;
    pub const BOOST_SPEED: f32 = 4.0;
    /// Heading smoothing for locally simulated worms
    pub const TURN_LERP: f32 = 0.08;
    /// Heading smoothing for remote mirrors
    pub const REMOTE_TURN_LERP: f32 = 0.15;
    /// Per-tick fraction a remote segment moves toward its network target
    pub const REMOTE_SEGMENT_LERP: f32 = 0.2;
    /// Remote bodies longer than target by more than this are cut back
    pub const REMOTE_TRUNCATE_SLACK: usize = 5;
    /// Camera follow smoothing
    pub const CAMERA_LERP: f32 = 0.1;
    /// Chance per tick that a boosting player sheds its tail
    pub const PLAYER_SHED_CHANCE: f64 = 0.05;
}

/// Ability tuning, in ticks at 60 Hz
pub mod ability {
    pub const DASH_COOLDOWN: u32 = 300;
    pub const DASH_DURATION: u32 = 12;
    pub const DASH_SPEED_MULTIPLIER: f32 = 5.0;

    pub const INVISIBLE_COOLDOWN: u32 = 600;
    pub const INVISIBLE_DURATION: u32 = 180;

    pub const GHOST_COOLDOWN: u32 = 480;
    pub const GHOST_DURATION: u32 = 60;

    pub const SHIELD_COOLDOWN: u32 = 720;
    pub const SHIELD_DURATION: u32 = 120;
    /// Other heads inside this radius get pushed away from a shield
    pub const SHIELD_REPEL_RADIUS: f32 = 120.0;
    /// Push distance per tick at point-blank range
    pub const SHIELD_REPEL_FORCE: f32 = 3.0;
}

/// Map zone tuning
pub mod zone {
    pub const SPEED_RADIUS: f32 = 120.0;
    pub const SPEED_MULTIPLIER: f32 = 1.6;
    pub const SPEED_COUNT: usize = 4;

    pub const MASS_RADIUS: f32 = 100.0;
    /// Segments added per successful mass roll
    pub const MASS_BONUS: usize = 2;
    pub const MASS_CHANCE: f64 = 0.05;
    pub const MASS_COUNT: usize = 3;

    pub const BLACKHOLE_RADIUS: f32 = 150.0;
    pub const BLACKHOLE_PULL_FORCE: f32 = 0.8;
    /// Pull at the center is `PULL_FORCE * PULL_SCALE` units per tick
    pub const BLACKHOLE_PULL_SCALE: f32 = 3.0;
    pub const BLACKHOLE_COUNT: usize = 2;

    pub const TOXIC_RADIUS: f32 = 130.0;
    /// Chance per tick of losing one tail segment
    pub const TOXIC_SHRINK_CHANCE: f64 = 0.03;
    pub const TOXIC_COUNT: usize = 3;

    pub const PORTAL_RADIUS: f32 = 60.0;
    /// Always even: portals are created in linked pairs
    pub const PORTAL_COUNT: usize = 4;
    /// Ticks both linked portals stay closed after a jump
    pub const PORTAL_COOLDOWN: u32 = 90;

    /// Ticks a zone buff lingers after the head leaves the zone
    pub const BUFF_DURATION: u32 = 60;
    /// Zones keep this far from the map edge
    pub const EDGE_MARGIN: f32 = 300.0;
}

/// Bot behavior constants
pub mod ai {
    /// Ticks between heading decisions
    pub const DIRECTION_CHANGE_INTERVAL: u32 = 60;
    /// Distance from the map edge that forces a turn toward center
    pub const BOUNDARY_MARGIN: f32 = 200.0;
    /// Candy farther than this is ignored
    pub const CANDY_SEARCH_RADIUS: f32 = 300.0;
    /// Chance of chasing a visible candy instead of wandering
    pub const CHASE_CHANCE: f64 = 0.7;
    /// Per-tick chance of a boost burst
    pub const BOOST_CHANCE: f64 = 0.01;
    /// Bots only boost above `INITIAL_SEGMENTS + BOOST_MIN_EXTRA`
    pub const BOOST_MIN_EXTRA: usize = 5;
    /// Chance per boosting tick of shedding the tail
    pub const SHED_CHANCE: f64 = 0.1;
}

/// Candy constants
pub mod candy {
    /// Target candy population
    pub const COUNT: usize = 300;
    /// Per-tick chance of topping the population up by one
    pub const RESPAWN_RATE: f64 = 0.02;
    pub const MIN_SIZE: f32 = 6.0;
    pub const MAX_SIZE: f32 = 12.0;
    /// Spawn positions keep this far from the map edge
    pub const SPAWN_MARGIN: f32 = 50.0;

    /// Tail shed by a boosting player
    pub const PLAYER_SHED_SIZE: f32 = 5.0;
    /// Tail shed by a boosting bot
    pub const BOT_SHED_SIZE: f32 = 4.0;
    pub const SHED_VALUE: u32 = 1;

    /// Remains of a dead worm
    pub const REMAINS_SIZE: f32 = 6.0;
    pub const REMAINS_VALUE: u32 = 2;
    /// Remains scatter up to half this distance on each axis
    pub const REMAINS_JITTER: f32 = 20.0;
}

/// Networking constants
pub mod net {
    /// `sendUpdate` calls per actual update message
    pub const UPDATE_EVERY_N_CALLS: u32 = 3;
    pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;
    pub const RECONNECT_BASE_DELAY_MS: u64 = 1_000;
    pub const RECONNECT_MAX_DELAY_MS: u64 = 10_000;
    /// Prefix that turns a peer id into a mirror worm id
    pub const REMOTE_ID_PREFIX: &str = "remote_";
    pub const DEFAULT_ROOM: &str = "default";
    /// Display names are cut to this many characters
    pub const MAX_NAME_LEN: usize = 15;
}

/// Worm and candy colors
pub mod palette {
    /// (body, glow) pairs; worms pick `index % len`
    pub const WORM_COLORS: [(&str, &str); 20] = [
        ("#FF6B6B", "#FF6B6B80"),
        ("#4ECDC4", "#4ECDC480"),
        ("#FFE66D", "#FFE66D80"),
        ("#95E1D3", "#95E1D380"),
        ("#F38181", "#F3818180"),
        ("#AA96DA", "#AA96DA80"),
        ("#FCBAD3", "#FCBAD380"),
        ("#A8D8EA", "#A8D8EA80"),
        ("#FF9F43", "#FF9F4380"),
        ("#6BCB77", "#6BCB7780"),
        ("#E056FD", "#E056FD80"),
        ("#686DE0", "#686DE080"),
        ("#F9CA24", "#F9CA2480"),
        ("#EB4D4B", "#EB4D4B80"),
        ("#7ED6DF", "#7ED6DF80"),
        ("#DDA0DD", "#DDA0DD80"),
        ("#98D8C8", "#98D8C880"),
        ("#F7DC6F", "#F7DC6F80"),
        ("#BB8FCE", "#BB8FCE80"),
        ("#F1948A", "#F1948A80"),
    ];

    pub const CANDY_COLORS: [&str; 10] = [
        "#FF6B6B", "#FFE66D", "#4ECDC4", "#95E1D3", "#F38181",
        "#AA96DA", "#FCBAD3", "#A8D8EA", "#FF9F43", "#6BCB77",
    ];

    pub const BOT_NAMES: [&str; 19] = [
        "Slinky", "Noodle", "Zigzag", "Wiggles", "Coil", "Squiggle", "Twister",
        "Spiral", "Ribbon", "Sprout", "Wobble", "Gummy", "Licorice", "Pretzel",
        "Zipper", "Rattle", "Mamba", "Comet", "Loop",
    ];
}

/// Visual/collision radius of a worm with `segment_count` segments.
/// Grows linearly up to three times the initial length.
#[inline]
pub fn worm_radius(segment_count: usize) -> f32 {
    let growth = (segment_count as f32 / world::INITIAL_SEGMENTS as f32).min(3.0);
    world::WORM_BASE_RADIUS * (0.8 + growth * 0.2)
}
