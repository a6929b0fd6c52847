use crate::ecs::EntityId;
use crate::math::CellPos;
use crate::sprite::SpriteStore;
use crate::tilemap::{DEFAULT_CELL_SHIFT, Location, TileSpace};
use itertools::iproduct;
use slotmap::SecondaryMap;

/// Why a grid operation did nothing
///
/// None of these are errors. They're the normal answers to asking for something the grid's
/// rules don't allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// The sprite has been destroyed
    Destroyed,
    /// The target cell is outside the grid, or there is no cell for it at all
    OutOfBounds,
    /// The sprite isn't on the grid, so it has nowhere to move or swap from
    Unplaced,
    /// Snap was asked to align a sprite that has no pixel position
    NoPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Placed,
    /// Placed, and the sprite that was on the target cell is now unplaced
    Evicted(EntityId),
    Removed,
    Swapped,
    Ignored(Ignored),
}

impl Outcome {
    pub fn applied(&self) -> bool {
        !matches!(self, Outcome::Ignored(_))
    }
}

/// One-sprite-per-cell index over a tile map
///
/// Cells hold sprite ids and each placed sprite has a stamp recording its cell. The two are
/// kept in step by every mutation. Sprites destroyed while on the grid are not reported to it;
/// they keep their slot and stamp until something touches them, and every read skips them.
pub struct Grid {
    columns: i32,
    rows: i32,
    shift: u32,
    // Column-major, `[column][row]`
    cells: Vec<Option<EntityId>>,
    stamps: SecondaryMap<EntityId, CellPos>,
}

impl Grid {
    /// Size the grid to cover the whole map. The map is assumed never to resize afterwards
    pub fn new<T>(tilemap: &T) -> Self
    where
        T: TileSpace + ?Sized,
    {
        if tilemap.scale().is_none() {
            log::warn!(
                once = true;
                "Tile map has no scale, assuming {}px cells", 1 << DEFAULT_CELL_SHIFT
            );
        }

        let shift = tilemap.cell_shift();
        let (columns, rows) = match (
            tilemap.area_width().checked_shr(shift),
            tilemap.area_height().checked_shr(shift),
        ) {
            (Some(columns), Some(rows)) => (columns.max(0), rows.max(0)),
            _ => {
                log::warn!("Tile map cell shift {shift} is too large, grid has no cells");
                (0, 0)
            }
        };
        log::debug!("Created {columns}x{rows} grid (cell shift {shift})");

        Self {
            columns,
            rows,
            shift,
            cells: vec![None; columns as usize * rows as usize],
            stamps: SecondaryMap::new(),
        }
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cell_shift(&self) -> u32 {
        self.shift
    }

    pub fn contains(&self, cell: CellPos) -> bool {
        cell.x >= 0 && cell.x < self.columns && cell.y >= 0 && cell.y < self.rows
    }

    /// Address of a cell in the tile map's terms. The cell may be off the grid
    pub fn location(&self, col: i32, row: i32) -> Location {
        Location::new(CellPos::new(col, row), self.shift)
    }

    fn index(&self, cell: CellPos) -> Option<usize> {
        self.contains(cell)
            .then(|| cell.x as usize * self.rows as usize + cell.y as usize)
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    /// Put a sprite on a cell, taking it off whatever cell it was on
    ///
    /// Whoever was on the target cell is evicted and left unplaced. The sprite's pixel
    /// position is moved to the center of the cell.
    pub fn place<S>(&mut self, sprites: &mut S, id: EntityId, location: Location) -> Outcome
    where
        S: SpriteStore + ?Sized,
    {
        if sprites.is_destroyed(id) {
            log::debug!("Not placing destroyed sprite {id:?}");
            return Outcome::Ignored(Ignored::Destroyed);
        }
        let cell = location.cell();
        let Some(index) = self.index(cell) else {
            log::debug!("Not placing {id:?} outside the grid at ({}, {})", cell.x, cell.y);
            return Outcome::Ignored(Ignored::OutOfBounds);
        };

        self.remove(id);

        let mut outcome = Outcome::Placed;
        if let Some(other) = self.cells[index].take() {
            self.stamps.remove(other);
            // A destroyed occupant was only holding the slot
            if !sprites.is_destroyed(other) {
                outcome = Outcome::Evicted(other);
            }
        }

        self.cells[index] = Some(id);
        self.stamps.insert(id, cell);
        sprites.place_at(id, location.center());
        outcome
    }

    /// Take a sprite off the grid. Doing it twice is the same as doing it once
    pub fn remove(&mut self, id: EntityId) -> Outcome {
        let Some(cell) = self.stamps.remove(id) else {
            return Outcome::Ignored(Ignored::Unplaced);
        };
        if let Some(index) = self.index(cell)
            && self.cells[index] == Some(id)
        {
            self.cells[index] = None;
        }
        Outcome::Removed
    }

    /// Place a sprite relative to its current cell. No wraparound at the edges
    pub fn move_by<S>(&mut self, sprites: &mut S, id: EntityId, cols: i32, rows: i32) -> Outcome
    where
        S: SpriteStore + ?Sized,
    {
        let Some(cell) = self.stamps.get(id).copied() else {
            return Outcome::Ignored(Ignored::Unplaced);
        };
        // A target past i32 is off the grid too
        let (Some(col), Some(row)) = (cell.x.checked_add(cols), cell.y.checked_add(rows)) else {
            return Outcome::Ignored(Ignored::OutOfBounds);
        };
        self.place(sprites, id, Location::new(CellPos::new(col, row), self.shift))
    }

    /// Exchange the cells of two placed sprites
    ///
    /// Does nothing unless both are on the grid.
    pub fn swap<S>(&mut self, sprites: &mut S, a: EntityId, b: EntityId) -> Outcome
    where
        S: SpriteStore + ?Sized,
    {
        let (Some(a_location), Some(b_location)) =
            (self.location_of(&*sprites, a), self.location_of(&*sprites, b))
        else {
            return Outcome::Ignored(Ignored::Unplaced);
        };
        if a == b {
            return Outcome::Swapped;
        }

        // Placing `a` evicts `b` and frees `a`'s old cell, so `b` lands on an empty cell
        self.place(sprites, a, b_location);
        self.place(sprites, b, a_location);
        Outcome::Swapped
    }

    /// Place a freely positioned sprite on the cell under its center
    pub fn snap<S>(&mut self, sprites: &mut S, id: EntityId) -> Outcome
    where
        S: SpriteStore + ?Sized,
    {
        if sprites.is_destroyed(id) {
            return Outcome::Ignored(Ignored::Destroyed);
        }
        let Some(position) = sprites.position(id) else {
            return Outcome::Ignored(Ignored::NoPosition);
        };
        let Some(cell) = position.to_cell_units(self.shift) else {
            return Outcome::Ignored(Ignored::OutOfBounds);
        };
        self.place(sprites, id, Location::new(cell, self.shift))
    }

    /// Drop every slot and stamp held by a destroyed sprite. Returns how many slots were freed
    ///
    /// Reads already skip destroyed sprites, so this is only needed to reclaim the stamps of
    /// sprites that are never touched again.
    pub fn prune<S>(&mut self, sprites: &S) -> usize
    where
        S: SpriteStore + ?Sized,
    {
        let mut freed = 0;
        for slot in &mut self.cells {
            if slot.is_some_and(|id| sprites.is_destroyed(id)) {
                *slot = None;
                freed += 1;
            }
        }
        self.stamps.retain(|id, _| !sprites.is_destroyed(id));
        freed
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn location_of<S>(&self, sprites: &S, id: EntityId) -> Option<Location>
    where
        S: SpriteStore + ?Sized,
    {
        if sprites.is_destroyed(id) {
            return None;
        }
        self.stamps.get(id).map(|cell| Location::new(*cell, self.shift))
    }

    pub fn column_of<S>(&self, sprites: &S, id: EntityId) -> Option<i32>
    where
        S: SpriteStore + ?Sized,
    {
        self.location_of(sprites, id).map(|l| l.col())
    }

    pub fn row_of<S>(&self, sprites: &S, id: EntityId) -> Option<i32>
    where
        S: SpriteStore + ?Sized,
    {
        self.location_of(sprites, id).map(|l| l.row())
    }

    pub fn occupant_at<S>(&self, sprites: &S, location: Location) -> Option<EntityId>
    where
        S: SpriteStore + ?Sized,
    {
        self.occupant(sprites, location.cell())
    }

    fn occupant<S>(&self, sprites: &S, cell: CellPos) -> Option<EntityId>
    where
        S: SpriteStore + ?Sized,
    {
        self.index(cell)
            .and_then(|index| self.cells[index])
            .filter(|id| !sprites.is_destroyed(*id))
    }

    // ------------------------------------------------------------------
    // Enumeration
    // ------------------------------------------------------------------

    pub fn sprites_in_row<S>(&self, sprites: &S, row: i32) -> Vec<EntityId>
    where
        S: SpriteStore + ?Sized,
    {
        if row < 0 || row >= self.rows {
            return Vec::new();
        }
        (0..self.columns).filter_map(|col| self.occupant(sprites, CellPos::new(col, row))).collect()
    }

    pub fn sprites_in_column<S>(&self, sprites: &S, col: i32) -> Vec<EntityId>
    where
        S: SpriteStore + ?Sized,
    {
        if col < 0 || col >= self.columns {
            return Vec::new();
        }
        (0..self.rows).filter_map(|row| self.occupant(sprites, CellPos::new(col, row))).collect()
    }

    /// Every live sprite on the grid, column by column, top to bottom within a column
    pub fn all_sprites<S>(&self, sprites: &S) -> Vec<EntityId>
    where
        S: SpriteStore + ?Sized,
    {
        iproduct!(0..self.columns, 0..self.rows)
            .filter_map(|(col, row)| self.occupant(sprites, CellPos::new(col, row)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Ecs;
    use crate::math::PixelPos;
    use crate::tilemap::TileMap;

    fn setup() -> (Grid, Ecs) {
        // 10 columns, 8 rows of 16px cells
        (Grid::new(&TileMap::new("test", 160, 128, Some(4))), Ecs::new())
    }

    #[test]
    fn dimensions_come_from_area_and_scale() {
        let grid = Grid::new(&TileMap::new("odd", 100, 40, Some(3)));
        assert_eq!((grid.columns(), grid.rows()), (12, 5));
        assert_eq!(grid.cells.len(), 60);

        let unscaled = Grid::new(&TileMap::new("unscaled", 64, 32, None));
        assert_eq!((unscaled.columns(), unscaled.rows()), (4, 2));
        assert_eq!(unscaled.cell_shift(), DEFAULT_CELL_SHIFT);
    }

    #[test]
    fn oversized_scale_gives_empty_grid() {
        let mut grid = Grid::new(&TileMap::new("huge", 64, 64, Some(40)));
        let mut ecs = Ecs::new();
        let id = ecs.add_entity();
        assert_eq!((grid.columns(), grid.rows()), (0, 0));
        assert!(grid.cells.is_empty());
        let loc = grid.location(0, 0);
        assert_eq!(grid.place(&mut ecs, id, loc), Outcome::Ignored(Ignored::OutOfBounds));
    }

    #[test]
    fn negative_area_gives_empty_grid() {
        let mut grid = Grid::new(&TileMap::new("broken", -32, 64, Some(4)));
        let mut ecs = Ecs::new();
        let id = ecs.add_entity();
        assert_eq!(grid.columns(), 0);
        let loc = grid.location(0, 0);
        assert_eq!(grid.place(&mut ecs, id, loc), Outcome::Ignored(Ignored::OutOfBounds));
        assert!(grid.all_sprites(&ecs).is_empty());
    }

    #[test]
    fn cells_are_column_major() {
        let (mut grid, mut ecs) = setup();
        let id = ecs.add_entity();
        grid.place(&mut ecs, id, grid.location(2, 3));
        assert_eq!(grid.cells[2 * 8 + 3], Some(id));
        assert_eq!(grid.stamps.get(id), Some(&CellPos::new(2, 3)));
    }

    #[test]
    fn placing_moves_sprite_to_cell_center() {
        let (mut grid, mut ecs) = setup();
        let id = ecs.add_entity();
        assert_eq!(grid.place(&mut ecs, id, grid.location(1, 2)), Outcome::Placed);
        assert_eq!(ecs.position(id), Some(PixelPos::new(24., 40.)));
    }

    #[test]
    fn replacing_clears_old_cell() {
        let (mut grid, mut ecs) = setup();
        let id = ecs.add_entity();
        grid.place(&mut ecs, id, grid.location(0, 0));
        grid.place(&mut ecs, id, grid.location(4, 4));
        assert_eq!(grid.occupant_at(&ecs, grid.location(0, 0)), None);
        assert_eq!(grid.cells.iter().flatten().count(), 1);
    }

    #[test]
    fn destroyed_occupant_is_not_reported_as_evicted() {
        let (mut grid, mut ecs) = setup();
        let dead = ecs.add_entity();
        let live = ecs.add_entity();
        grid.place(&mut ecs, dead, grid.location(3, 3));
        ecs.remove_entity(dead);
        assert_eq!(grid.place(&mut ecs, live, grid.location(3, 3)), Outcome::Placed);
        assert!(grid.stamps.get(dead).is_none());
    }

    #[test]
    fn remove_keeps_a_newer_occupant() {
        let (mut grid, mut ecs) = setup();
        let a = ecs.add_entity();
        let b = ecs.add_entity();
        grid.place(&mut ecs, a, grid.location(1, 1));
        // Overwrite the slot behind the grid's back; remove must only clear its own entry
        let index = grid.index(CellPos::new(1, 1)).unwrap();
        grid.cells[index] = Some(b);
        assert_eq!(grid.remove(a), Outcome::Removed);
        assert_eq!(grid.cells[index], Some(b));
    }

    #[test]
    fn prune_reclaims_destroyed_sprites() {
        let (mut grid, mut ecs) = setup();
        let a = ecs.add_entity();
        let b = ecs.add_entity();
        grid.place(&mut ecs, a, grid.location(0, 0));
        grid.place(&mut ecs, b, grid.location(0, 1));
        ecs.remove_entity(a);

        assert_eq!(grid.prune(&ecs), 1);
        assert_eq!(grid.cells[0], None);
        assert!(grid.stamps.get(a).is_none());
        assert_eq!(grid.all_sprites(&ecs), vec![b]);
        assert_eq!(grid.prune(&ecs), 0);
    }

    #[test]
    fn snap_uses_cell_under_center() {
        let (mut grid, mut ecs) = setup();
        let id = ecs.add_entity();
        ecs.place_at(id, PixelPos::new(37.5, 70.));
        assert_eq!(grid.snap(&mut ecs, id), Outcome::Placed);
        assert_eq!(grid.location_of(&ecs, id), Some(grid.location(2, 4)));
        assert_eq!(ecs.position(id), Some(PixelPos::new(40., 72.)));
    }

    #[test]
    fn snap_needs_a_position() {
        let (mut grid, mut ecs) = setup();
        let id = ecs.add_entity();
        assert_eq!(grid.snap(&mut ecs, id), Outcome::Ignored(Ignored::NoPosition));
        ecs.remove_entity(id);
        assert_eq!(grid.snap(&mut ecs, id), Outcome::Ignored(Ignored::Destroyed));
    }

    #[test]
    fn snap_off_the_map_is_ignored() {
        let (mut grid, mut ecs) = setup();
        let id = ecs.add_entity();
        ecs.place_at(id, PixelPos::new(-3., 10.));
        assert_eq!(grid.snap(&mut ecs, id), Outcome::Ignored(Ignored::OutOfBounds));
        assert_eq!(ecs.position(id), Some(PixelPos::new(-3., 10.)));
    }

    #[test]
    fn snap_with_non_finite_position_is_ignored() {
        let (mut grid, mut ecs) = setup();
        let id = ecs.add_entity();
        ecs.place_at(id, PixelPos::new(f64::NAN, 8.));
        assert_eq!(grid.snap(&mut ecs, id), Outcome::Ignored(Ignored::OutOfBounds));
        assert_eq!(grid.location_of(&ecs, id), None);
        assert_eq!(grid.occupant_at(&ecs, grid.location(0, 0)), None);
    }

    #[test]
    fn swap_with_self_changes_nothing() {
        let (mut grid, mut ecs) = setup();
        let id = ecs.add_entity();
        grid.place(&mut ecs, id, grid.location(5, 5));
        assert_eq!(grid.swap(&mut ecs, id, id), Outcome::Swapped);
        assert_eq!(grid.location_of(&ecs, id), Some(grid.location(5, 5)));
    }

    #[test]
    fn column_and_row_of() {
        let (mut grid, mut ecs) = setup();
        let id = ecs.add_entity();
        assert_eq!(grid.column_of(&ecs, id), None);
        grid.place(&mut ecs, id, grid.location(6, 2));
        assert_eq!(grid.column_of(&ecs, id), Some(6));
        assert_eq!(grid.row_of(&ecs, id), Some(2));
    }
}
