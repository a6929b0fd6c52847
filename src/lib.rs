pub mod components;
pub mod ecs;
pub mod grid;
pub mod input;
pub mod loader;
pub mod math;
pub mod misc;
pub mod scene;
pub mod sprite;
pub mod tilemap;

pub use ecs::EntityId;
pub use grid::{Grid, Ignored, Outcome};
pub use scene::Scene;
pub use sprite::SpriteStore;
pub use tilemap::{Location, TileMap, TileSpace};
