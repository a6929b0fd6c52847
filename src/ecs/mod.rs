#[allow(clippy::module_inception)]
mod ecs;
pub use ecs::*;
