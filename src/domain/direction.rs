/// Compass directions as a bitmask.
///
/// A single value is an actor heading (one of the four primaries or NONE).
/// Combinations only appear as cell border masks.

use rand::Rng;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Direction(u8);

impl Direction {
    pub const NONE: Direction = Direction(0);
    pub const UP: Direction = Direction(1);
    pub const LEFT: Direction = Direction(2);
    pub const DOWN: Direction = Direction(4);
    pub const RIGHT: Direction = Direction(8);
    pub const ALL: Direction = Direction(15);

    /// The four primary directions, in bit order.
    pub const PRIMARY: [Direction; 4] = [
        Direction::UP, Direction::LEFT, Direction::DOWN, Direction::RIGHT,
    ];

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Exactly one primary bit set.
    pub fn is_primary(self) -> bool {
        self.0 != 0 && self.0 & (self.0 - 1) == 0 && self.0 <= Direction::RIGHT.0
    }

    /// Does this mask include every bit of `other`?
    pub fn contains(self, other: Direction) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// Unit step `(dx, dy)` for a primary direction, `(0, 0)` otherwise.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::UP    => (0, -1),
            Direction::DOWN  => (0, 1),
            Direction::LEFT  => (-1, 0),
            Direction::RIGHT => (1, 0),
            _ => (0, 0),
        }
    }
}

pub fn is_vertical(d: Direction) -> bool {
    d == Direction::UP || d == Direction::DOWN
}

/// Reverse every bit of the mask. NONE stays NONE.
pub fn turn180(d: Direction) -> Direction {
    let mut out = 0;
    if d.0 & Direction::UP.0 != 0 { out |= Direction::DOWN.0; }
    if d.0 & Direction::DOWN.0 != 0 { out |= Direction::UP.0; }
    if d.0 & Direction::LEFT.0 != 0 { out |= Direction::RIGHT.0; }
    if d.0 & Direction::RIGHT.0 != 0 { out |= Direction::LEFT.0; }
    Direction(out)
}

pub fn combine(a: Direction, b: Direction) -> Direction {
    Direction(a.0 | b.0)
}

/// `a` with the bits of `b` cleared.
pub fn without(a: Direction, b: Direction) -> Direction {
    Direction(a.0 & !b.0)
}

/// Uniformly random primary direction.
pub fn random(rng: &mut impl Rng) -> Direction {
    Direction::PRIMARY[rng.gen_range(0..4u8) as usize]
}
