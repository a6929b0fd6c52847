use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

pub struct CellUnits;
pub struct PixelUnits;

pub type CellPos = Vec2<i32, CellUnits>;
pub type PixelPos = Vec2<f64, PixelUnits>;

// Vec2

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct Vec2<T, U> {
    pub x: T,
    pub y: T,
    #[serde(skip)]
    _unit: PhantomData<U>,
}

impl<T, U> Vec2<T, U> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y, _unit: PhantomData }
    }
}

impl<T: Default, U> Default for Vec2<T, U> {
    fn default() -> Self {
        Self::new(T::default(), T::default())
    }
}

impl<T: Debug, U> Debug for Vec2<T, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vec2").field("x", &self.x).field("y", &self.y).finish()
    }
}

impl<T: Clone, U> Clone for Vec2<T, U> {
    fn clone(&self) -> Self {
        Self::new(self.x.clone(), self.y.clone())
    }
}

impl<T: Copy, U> Copy for Vec2<T, U> {}

// Derived PartialEq would require U: PartialEq, which the unit markers don't implement
impl<T: PartialEq, U> PartialEq for Vec2<T, U> {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl<T: Eq, U> Eq for Vec2<T, U> {}

impl<T: Add, U> Add for Vec2<T, U> {
    type Output = Vec2<T::Output, U>;

    fn add(self, rhs: Self) -> Self::Output {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: Add<Output = T> + Copy, U> AddAssign for Vec2<T, U> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<T: Sub, U> Sub for Vec2<T, U> {
    type Output = Vec2<T::Output, U>;

    fn sub(self, rhs: Self) -> Self::Output {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<T: Sub<Output = T> + Copy, U> SubAssign for Vec2<T, U> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<T: Mul + Copy, U> Mul<T> for Vec2<T, U> {
    type Output = Vec2<T::Output, U>;

    fn mul(self, rhs: T) -> Self::Output {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl<T: Mul<Output = T> + Copy, U> MulAssign<T> for Vec2<T, U> {
    fn mul_assign(&mut self, rhs: T) {
        *self = *self * rhs;
    }
}

impl<T: Div + Copy, U> Div<T> for Vec2<T, U> {
    type Output = Vec2<T::Output, U>;

    fn div(self, rhs: T) -> Self::Output {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl<T: Div<Output = T> + Copy, U> DivAssign<T> for Vec2<T, U> {
    fn div_assign(&mut self, rhs: T) {
        *self = *self / rhs;
    }
}

// Conversions
//
// A cell is 2^shift pixels on a side. The shift is the tile map's scale.

impl Vec2<f64, PixelUnits> {
    // Arithmetic shift floors, so pixels left of or above the origin land in negative cells
    // rather than collapsing into cell 0. Non-finite positions are in no cell at all
    pub fn to_cell_units(self, shift: u32) -> Option<Vec2<i32, CellUnits>> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return None;
        }
        let to_cell = |p: f64| {
            let p = p.floor() as i32;
            p.checked_shr(shift).unwrap_or(if p < 0 { -1 } else { 0 })
        };
        Some(Vec2::new(to_cell(self.x), to_cell(self.y)))
    }
}

impl Vec2<i32, CellUnits> {
    pub fn to_pixel_units(self, shift: u32) -> Vec2<f64, PixelUnits> {
        let size = f64::from(shift).exp2();
        Vec2::new(f64::from(self.x) * size, f64::from(self.y) * size)
    }

    // Sprites are anchored at their center, so this is where a sprite placed on the cell goes
    pub fn to_pixel_units_center(self, shift: u32) -> Vec2<f64, PixelUnits> {
        let half = (f64::from(shift).exp2() / 2.).floor();
        self.to_pixel_units(shift) + Vec2::new(half, half)
    }
}
