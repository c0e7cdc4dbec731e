//! Per-tick simulation stages, run in order by `GameEngine::update`

pub mod abilities;
pub mod player;
pub mod ai;
pub mod movement;
pub mod remote;
pub mod zones;
pub mod collision;
pub mod candy;
pub mod ranking;
