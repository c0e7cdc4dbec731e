//! Worm Arena
//!
//! Simulation engine and multiplayer client for a real-time worm arena:
//! worms steer, grow on candy, use timed abilities, get pushed around by
//! map zones and die on each other's bodies.
//!
//! # Features
//!
//! - `net` - WebSocket multiplayer client (enabled by default). The wire
//!   protocol and reconnect policy are always available.

pub mod config;
pub mod util;
pub mod game;
pub mod net;
