use crate::math::{CellPos, PixelPos};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

/// Cell shift assumed when a tile map doesn't report its scale (16 pixel cells)
pub const DEFAULT_CELL_SHIFT: u32 = 4;

/// The coordinate system a grid is laid over
///
/// Only the pixel extent and the cell size are needed. Everything else about the map (tiles,
/// collision, layers) is the host's business.
pub trait TileSpace {
    /// Width of the map area in pixels
    fn area_width(&self) -> i32;

    /// Height of the map area in pixels
    fn area_height(&self) -> i32;

    /// log2 of the cell size in pixels, if the map exposes it
    fn scale(&self) -> Option<u32>;

    fn cell_shift(&self) -> u32 {
        self.scale().unwrap_or(DEFAULT_CELL_SHIFT)
    }

    fn location(&self, col: i32, row: i32) -> Location {
        Location::new(CellPos::new(col, row), self.cell_shift())
    }

    /// `None` for a non-finite position
    fn pixel_to_cell(&self, pixel: PixelPos) -> Option<CellPos> {
        pixel.to_cell_units(self.cell_shift())
    }
}

#[derive(SmartDefault, Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TileMap {
    #[default = "level"]
    pub name: String,
    pub area_width: i32,
    pub area_height: i32,
    pub scale: Option<u32>,
}

impl TileMap {
    pub fn new(name: &str, area_width: i32, area_height: i32, scale: Option<u32>) -> Self {
        Self { name: name.to_string(), area_width, area_height, scale }
    }
}

impl TileSpace for TileMap {
    fn area_width(&self) -> i32 {
        self.area_width
    }

    fn area_height(&self) -> i32 {
        self.area_height
    }

    fn scale(&self) -> Option<u32> {
        self.scale
    }
}

/// A cell address in a tile map's own terms
///
/// Carries the map's cell shift so it can say where on the map it is in pixels. Nothing
/// guarantees the cell is inside the map; grids check that themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    cell: CellPos,
    shift: u32,
}

impl Location {
    pub fn new(cell: CellPos, shift: u32) -> Self {
        Self { cell, shift }
    }

    pub fn cell(&self) -> CellPos {
        self.cell
    }

    pub fn col(&self) -> i32 {
        self.cell.x
    }

    pub fn row(&self) -> i32 {
        self.cell.y
    }

    pub fn center(&self) -> PixelPos {
        self.cell.to_pixel_units_center(self.shift)
    }
}
