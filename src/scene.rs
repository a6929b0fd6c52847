use crate::ecs::{Ecs, EntityId};
use crate::grid::{Grid, Outcome};
use crate::tilemap::{Location, TileMap};
use anyhow::anyhow;

/// Everything a running level needs: its tile map, its sprites, and the grid over them
///
/// The grid is built from the tile map the first time something asks for it and then lives as
/// long as the scene. Loading a different tile map afterwards doesn't resize it.
pub struct Scene {
    pub tilemap: Option<TileMap>,
    pub ecs: Ecs,
    grid: Option<Grid>,
}

impl Scene {
    pub fn new() -> Self {
        Self { tilemap: None, ecs: Ecs::new(), grid: None }
    }

    pub fn with_tilemap(tilemap: TileMap) -> Self {
        Self { tilemap: Some(tilemap), ..Self::new() }
    }

    pub fn set_tilemap(&mut self, tilemap: TileMap) {
        if self.grid.is_some() {
            log::warn!(
                "Tile map {} loaded after the grid was built; grid keeps its size",
                tilemap.name
            );
        }
        self.tilemap = Some(tilemap);
    }

    pub fn has_grid(&self) -> bool {
        self.grid.is_some()
    }

    /// The scene's grid, built on first use
    pub fn grid(&mut self) -> anyhow::Result<&mut Grid> {
        Ok(self.parts()?.0)
    }

    // Split borrow so grid operations can mutate the ecs alongside the grid
    fn parts(&mut self) -> anyhow::Result<(&mut Grid, &mut Ecs)> {
        let grid = match self.grid.take() {
            Some(grid) => grid,
            None => Grid::new(
                self.tilemap
                    .as_ref()
                    .ok_or_else(|| anyhow!("no tile map is loaded; cannot create the default grid"))?,
            ),
        };
        let grid = self.grid.insert(grid);
        Ok((grid, &mut self.ecs))
    }

    pub fn location(&mut self, col: i32, row: i32) -> anyhow::Result<Location> {
        Ok(self.grid()?.location(col, row))
    }

    pub fn place(&mut self, id: EntityId, location: Location) -> anyhow::Result<Outcome> {
        let (grid, ecs) = self.parts()?;
        Ok(grid.place(ecs, id, location))
    }

    pub fn remove(&mut self, id: EntityId) -> anyhow::Result<Outcome> {
        Ok(self.grid()?.remove(id))
    }

    pub fn move_by(&mut self, id: EntityId, cols: i32, rows: i32) -> anyhow::Result<Outcome> {
        let (grid, ecs) = self.parts()?;
        Ok(grid.move_by(ecs, id, cols, rows))
    }

    pub fn swap(&mut self, a: EntityId, b: EntityId) -> anyhow::Result<Outcome> {
        let (grid, ecs) = self.parts()?;
        Ok(grid.swap(ecs, a, b))
    }

    pub fn snap(&mut self, id: EntityId) -> anyhow::Result<Outcome> {
        let (grid, ecs) = self.parts()?;
        Ok(grid.snap(ecs, id))
    }

    pub fn location_of(&mut self, id: EntityId) -> anyhow::Result<Option<Location>> {
        let (grid, ecs) = self.parts()?;
        Ok(grid.location_of(ecs, id))
    }

    pub fn occupant_at(&mut self, location: Location) -> anyhow::Result<Option<EntityId>> {
        let (grid, ecs) = self.parts()?;
        Ok(grid.occupant_at(ecs, location))
    }

    pub fn all_sprites(&mut self) -> anyhow::Result<Vec<EntityId>> {
        let (grid, ecs) = self.parts()?;
        Ok(grid.all_sprites(ecs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_without_tilemap_is_an_error() {
        let mut scene = Scene::new();
        let err = scene.grid().err().expect("grid should not build");
        assert!(err.to_string().contains("no tile map"));
        assert!(!scene.has_grid());

        // A later tile map still allows the grid to be built
        scene.set_tilemap(TileMap::new("late", 64, 64, Some(4)));
        assert_eq!(scene.grid().unwrap().columns(), 4);
    }

    #[test]
    fn grid_is_built_once() {
        let mut scene = Scene::with_tilemap(TileMap::new("first", 64, 32, Some(4)));
        let id = scene.ecs.add_entity();
        let loc = scene.location(1, 1).unwrap();
        scene.place(id, loc).unwrap();

        scene.set_tilemap(TileMap::new("second", 256, 256, Some(4)));
        let grid = scene.grid().unwrap();
        assert_eq!((grid.columns(), grid.rows()), (4, 2));
        assert_eq!(scene.location_of(id).unwrap(), Some(loc));
    }

    #[test]
    fn wrappers_fail_only_on_bootstrap() {
        let mut scene = Scene::new();
        let id = scene.ecs.add_entity();
        assert!(scene.move_by(id, 1, 0).is_err());
        assert!(scene.all_sprites().is_err());

        scene.set_tilemap(TileMap::new("level", 64, 64, Some(4)));
        assert_eq!(scene.remove(id).unwrap(), Outcome::Ignored(crate::grid::Ignored::Unplaced));
        assert!(scene.all_sprites().unwrap().is_empty());
    }
}
