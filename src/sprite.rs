use crate::components::Position;
use crate::ecs::{Ecs, EntityId};
use crate::math::PixelPos;

/// What a grid needs from the entity system that owns the sprites
///
/// The grid only ever holds `EntityId`s. It never keeps a sprite alive and never destroys one.
pub trait SpriteStore {
    fn is_destroyed(&self, id: EntityId) -> bool;

    /// Current pixel position, if the sprite has one
    fn position(&self, id: EntityId) -> Option<PixelPos>;

    /// Called by the grid when a sprite is placed, so the drawn position follows the cell
    fn place_at(&mut self, id: EntityId, position: PixelPos);
}

impl SpriteStore for Ecs {
    fn is_destroyed(&self, id: EntityId) -> bool {
        !self.is_alive(id)
    }

    fn position(&self, id: EntityId) -> Option<PixelPos> {
        self.component::<Position>(id).map(|p| p.0)
    }

    // Sprites without a position get one
    fn place_at(&mut self, id: EntityId, position: PixelPos) {
        if self.is_destroyed(id) {
            return;
        }
        if let Some(mut p) = self.component_mut::<Position>(id) {
            p.0 = position;
            return;
        }
        self.add_component(id, Position(position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_at_adds_missing_position() {
        let mut ecs = Ecs::new();
        let id = ecs.add_entity();
        assert_eq!(ecs.position(id), None);
        ecs.place_at(id, PixelPos::new(24., 8.));
        assert_eq!(ecs.position(id), Some(PixelPos::new(24., 8.)));
        ecs.place_at(id, PixelPos::new(8., 8.));
        assert_eq!(ecs.position(id), Some(PixelPos::new(8., 8.)));
    }

    #[test]
    fn destroyed_sprites_are_left_alone() {
        let mut ecs = Ecs::new();
        let id = ecs.add_entity();
        ecs.remove_entity(id);
        assert!(ecs.is_destroyed(id));
        ecs.place_at(id, PixelPos::new(1., 1.));
        assert_eq!(ecs.position(id), None);
    }
}
