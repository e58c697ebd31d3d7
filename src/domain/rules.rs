/// Maze topology: pure rules over a read-only view of the grid.
///
/// A wall between two cells may be declared by either side. Setup
/// (`place_wall`) merges adjacent wall cells so a shared edge carries the
/// bit on one side only, which is why `can_move` checks both the current
/// cell and the neighbor's opposing side.
///
/// Leaving the grid is only legal from a cell flagged `exit`; the
/// resulting coordinate wraps to the opposite edge.

use super::cell::Cell;
use super::direction::{self, Direction};

/// Read-only view of the cell grid, indexed `cells[y][x]`.
pub struct MapView<'a> {
    pub cells: &'a [Vec<Cell>],
    pub width: usize,
    pub height: usize,
}

impl<'a> MapView<'a> {
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y][x]
        } else {
            Cell { border: Direction::ALL, ..Cell::default() }
        }
    }

    /// Can an actor standing on (x, y) step one cell in `dir`?
    pub fn can_move(&self, x: usize, y: usize, dir: Direction) -> bool {
        if !dir.is_primary() { return false; }
        if x >= self.width || y >= self.height { return false; }

        let here = self.cell(x, y);
        if here.is_border(dir) { return false; }

        let (w, h) = (self.width, self.height);
        match dir {
            Direction::RIGHT => {
                if x + 1 < w { !self.cell(x + 1, y).is_border(Direction::LEFT) } else { here.exit }
            }
            Direction::LEFT => {
                if x > 0 { !self.cell(x - 1, y).is_border(Direction::RIGHT) } else { here.exit }
            }
            Direction::DOWN => {
                if y + 1 < h { !self.cell(x, y + 1).is_border(Direction::UP) } else { here.exit }
            }
            Direction::UP => {
                if y > 0 { !self.cell(x, y - 1).is_border(Direction::DOWN) } else { here.exit }
            }
            _ => false,
        }
    }

    /// Coordinate after attempting a step in `dir`.
    /// Blocked moves return the input coordinate; legal ones wrap at the edges.
    pub fn destination(&self, x: usize, y: usize, dir: Direction) -> (usize, usize) {
        if !self.can_move(x, y, dir) { return (x, y); }
        let (dx, dy) = dir.offset();
        let w = self.width as isize;
        let h = self.height as isize;
        let nx = (x as isize + dx + w) % w;
        let ny = (y as isize + dy + h) % h;
        (nx as usize, ny as usize)
    }
}

// ── Setup-time border normalization ──

/// Turn (x, y) into a wall block, sharing edges with wall blocks
/// already placed to the left and above.
pub fn place_wall(cells: &mut [Vec<Cell>], x: usize, y: usize) {
    cells[y][x].wall = true;
    cells[y][x].set_border(direction::combine(Direction::RIGHT, Direction::DOWN));

    if x > 0 && cells[y][x - 1].is_border(Direction::RIGHT) {
        cells[y][x - 1].remove_border(Direction::RIGHT);
    } else {
        cells[y][x].add_border(Direction::LEFT);
    }

    if y > 0 && cells[y - 1][x].is_border(Direction::DOWN) {
        cells[y - 1][x].remove_border(Direction::DOWN);
    } else {
        cells[y][x].add_border(Direction::UP);
    }
}

/// Give a boundary cell its outward border unless it is a tunnel exit.
pub fn close_boundary(cells: &mut [Vec<Cell>], x: usize, y: usize, width: usize, height: usize) {
    let cell = &mut cells[y][x];
    if cell.exit { return; }
    if x == 0 { cell.add_border(Direction::LEFT); }
    if x + 1 == width { cell.add_border(Direction::RIGHT); }
    if y == 0 { cell.add_border(Direction::UP); }
    if y + 1 == height { cell.add_border(Direction::DOWN); }
}

// ══════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a grid from rows: '*' wall, 'E' exit, anything else open.
    fn map_from(rows: &[&str]) -> (Vec<Vec<Cell>>, usize, usize) {
        let h = rows.len();
        let w = rows[0].len();
        let mut cells = vec![vec![Cell::default(); w]; h];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                match ch {
                    '*' => place_wall(&mut cells, x, y),
                    'E' => cells[y][x].exit = true,
                    _ => {}
                }
                close_boundary(&mut cells, x, y, w, h);
            }
        }
        (cells, w, h)
    }

    fn mv(cells: &Vec<Vec<Cell>>, w: usize, h: usize) -> MapView<'_> {
        MapView { cells, width: w, height: h }
    }

    // ── Open floor ──

    #[test]
    fn open_floor_all_directions() {
        let (c, w, h) = map_from(&[
            "   ",
            "   ",
            "   ",
        ]);
        let m = mv(&c, w, h);
        for d in Direction::PRIMARY {
            assert!(m.can_move(1, 1, d), "{d:?}");
        }
    }

    #[test]
    fn none_and_masks_never_move() {
        let (c, w, h) = map_from(&["   ", "   ", "   "]);
        let m = mv(&c, w, h);
        assert!(!m.can_move(1, 1, Direction::NONE));
        assert!(!m.can_move(1, 1, Direction::ALL));
        assert!(!m.can_move(1, 1, direction::combine(Direction::UP, Direction::LEFT)));
    }

    // ── Walls ──

    #[test]
    fn blocked_by_wall_on_either_side() {
        let (c, w, h) = map_from(&[
            "   ",
            " * ",
            "   ",
        ]);
        let m = mv(&c, w, h);
        // Wall cell (1,1) declares all four borders itself
        assert!(!m.can_move(0, 1, Direction::RIGHT));
        assert!(!m.can_move(2, 1, Direction::LEFT));
        assert!(!m.can_move(1, 0, Direction::DOWN));
        assert!(!m.can_move(1, 2, Direction::UP));
        assert!(m.can_move(0, 1, Direction::UP));
    }

    #[test]
    fn adjacent_walls_share_edge() {
        let (c, w, h) = map_from(&[
            "    ",
            " ** ",
            "    ",
        ]);
        // Shared edge: left block lost RIGHT, right block never got LEFT
        assert!(!c[1][1].is_border(Direction::RIGHT));
        assert!(!c[1][2].is_border(Direction::LEFT));
        assert!(c[1][1].is_border(Direction::LEFT));
        assert!(c[1][2].is_border(Direction::RIGHT));
        assert!(c[1][1].wall && c[1][2].wall && !c[1][0].wall);
        let m = mv(&c, w, h);
        assert!(!m.can_move(0, 1, Direction::RIGHT));
        assert!(!m.can_move(3, 1, Direction::LEFT));
    }

    #[test]
    fn stacked_walls_share_edge() {
        let (c, w, h) = map_from(&[
            "   ",
            " * ",
            " * ",
            "   ",
        ]);
        assert!(!c[1][1].is_border(Direction::DOWN));
        assert!(!c[2][1].is_border(Direction::UP));
        let m = mv(&c, w, h);
        assert!(!m.can_move(1, 0, Direction::DOWN));
        assert!(!m.can_move(1, 3, Direction::UP));
    }

    #[test]
    fn neighbor_border_blocks_without_own_bit() {
        let mut cells = vec![vec![Cell::default(); 2]; 1];
        cells[0][1].add_border(Direction::LEFT);
        let m = mv(&cells, 2, 1);
        assert!(!cells[0][0].is_border(Direction::RIGHT));
        assert!(!m.can_move(0, 0, Direction::RIGHT));
    }

    // ── Boundary ──

    #[test]
    fn boundary_cells_block_outward() {
        let (c, w, h) = map_from(&[
            "    ",
            "    ",
            "    ",
        ]);
        let m = mv(&c, w, h);
        for x in 0..w {
            assert!(!m.can_move(x, 0, Direction::UP));
            assert!(!m.can_move(x, h - 1, Direction::DOWN));
        }
        for y in 0..h {
            assert!(!m.can_move(0, y, Direction::LEFT));
            assert!(!m.can_move(w - 1, y, Direction::RIGHT));
        }
    }

    #[test]
    fn tunnel_exit_allows_outward_and_wraps() {
        let (c, w, h) = map_from(&[
            "*****",
            "E   E",
            "*****",
        ]);
        let m = mv(&c, w, h);
        assert!(m.can_move(0, 1, Direction::LEFT));
        assert_eq!(m.destination(0, 1, Direction::LEFT), (4, 1));
        assert!(m.can_move(4, 1, Direction::RIGHT));
        assert_eq!(m.destination(4, 1, Direction::RIGHT), (0, 1));
    }

    #[test]
    fn vertical_tunnel_wraps() {
        let (c, w, h) = map_from(&[
            "*E*",
            "* *",
            "*E*",
        ]);
        let m = mv(&c, w, h);
        assert_eq!(m.destination(1, 0, Direction::UP), (1, 2));
        assert_eq!(m.destination(1, 2, Direction::DOWN), (1, 0));
    }

    #[test]
    fn exit_honors_interior_border() {
        let (mut c, w, h) = map_from(&[
            "E  ",
        ]);
        c[0][0].add_border(Direction::LEFT);
        let m = mv(&c, w, h);
        assert!(!m.can_move(0, 0, Direction::LEFT));
    }

    #[test]
    fn exit_on_corner_keeps_other_sides_open_only_by_flag() {
        let (c, w, h) = map_from(&[
            "E ",
            "  ",
        ]);
        // Exit cells skip boundary closing on every side
        let m = mv(&c, w, h);
        assert!(m.can_move(0, 0, Direction::UP));
        assert_eq!(m.destination(0, 0, Direction::UP), (0, 1));
    }

    // ── Destination ──

    #[test]
    fn blocked_destination_is_unchanged() {
        let (c, w, h) = map_from(&[
            " * ",
        ]);
        let m = mv(&c, w, h);
        assert_eq!(m.destination(0, 0, Direction::RIGHT), (0, 0));
        assert_eq!(m.destination(0, 0, Direction::LEFT), (0, 0));
    }

    #[test]
    fn out_of_range_origin_cannot_move() {
        let (c, w, h) = map_from(&["  "]);
        let m = mv(&c, w, h);
        assert!(!m.can_move(5, 0, Direction::LEFT));
        assert_eq!(m.cell(9, 9).border, Direction::ALL);
    }
}
