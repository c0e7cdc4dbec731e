pub mod constants;
pub mod state;
pub mod factory;
pub mod engine;
pub mod systems;

pub use engine::GameEngine;
