/// A single grid cell.
/// Wall geometry lives in `border`; everything else is a flag.

use super::direction::{self, Direction};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Cell {
    pub border: Direction,
    pub food: bool,
    pub exit: bool,        // tunnel to the opposite edge
    pub prison_exit: bool, // door of the pursuer pen, cosmetic only
    pub wall: bool,        // solid block; drawing only, movement reads `border`
}

impl Cell {
    pub fn is_border(&self, dir: Direction) -> bool {
        self.border.contains(dir)
    }

    pub fn set_border(&mut self, mask: Direction) {
        self.border = mask;
    }

    pub fn add_border(&mut self, dir: Direction) {
        self.border = direction::combine(self.border, dir);
    }

    pub fn remove_border(&mut self, dir: Direction) {
        self.border = direction::without(self.border, dir);
    }

    pub fn reset(&mut self) {
        *self = Cell::default();
    }
}
