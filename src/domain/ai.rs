/// Pursuer AI: a biased random walk.
///
/// Two branches per decision:
///   1. **Deliberate**: turn toward a target, alternating axes.
///      Chances grow with `iq`: 1 in `(MAX_IQ - iq) / 10`.
///   2. **Wander**: random primary direction, never an immediate
///      reversal, retried until the maze allows it.
///
/// A vulnerable pursuer runs the deliberate branch backwards (flees).
///
/// Precondition: the pursuer's cell has at least one open side, or the
/// wander retry never ends. Shipped levels satisfy this.

use rand::Rng;

use super::direction::{self, Direction};
use super::entity::{Actor, LifeState};
use super::rules::MapView;

pub const IQ: u32 = 70;
pub const DEAD_IQ: u32 = 170;
pub const MAX_IQ: u32 = 190;

/// The `n` in "1 in n" for the deliberate branch.
pub fn deliberate_odds(state: LifeState) -> u32 {
    let iq = if state == LifeState::Dying { DEAD_IQ } else { IQ };
    ((MAX_IQ - iq) / 10).max(1)
}

/// Pick the next heading for a pursuer.
///
/// `target` is the player's cell for a live pursuer; dying pursuers head
/// for their own spawn regardless.
pub fn decide(
    map: &MapView,
    pursuer: &Actor,
    target: (usize, usize),
    harmless: bool,
    rng: &mut impl Rng,
) -> Direction {
    if rng.gen_range(0..deliberate_odds(pursuer.state)) == 0 {
        let (tx, ty) = if pursuer.state == LifeState::Alive {
            target
        } else {
            (pursuer.spawn_x, pursuer.spawn_y)
        };
        let dir = direction_to(pursuer.x, pursuer.y, pursuer.direction, tx, ty);
        if harmless { direction::turn180(dir) } else { dir }
    } else {
        wander(map, pursuer.x, pursuer.y, pursuer.direction, rng)
    }
}

// ── Deliberate branch ──

/// Axis-alternating step toward (tx, ty).
///
/// Moving vertically → pick LEFT/RIGHT; otherwise pick UP/DOWN.
/// Already aligned on that axis → keep the current heading.
pub fn direction_to(x: usize, y: usize, heading: Direction, tx: usize, ty: usize) -> Direction {
    if direction::is_vertical(heading) {
        if tx < x { return Direction::LEFT; }
        if tx > x { return Direction::RIGHT; }
    } else {
        if ty < y { return Direction::UP; }
        if ty > y { return Direction::DOWN; }
    }
    heading
}

// ── Wander branch ──

/// Random legal heading that is not the reverse of `heading`.
///
/// The reversal is only excluded from the first draw; if the maze blocks
/// the pick, the pursuer keeps its heading, and only when that is blocked
/// too does it draw again (which may then reverse at a dead end).
pub fn wander(map: &MapView, x: usize, y: usize, heading: Direction, rng: &mut impl Rng) -> Direction {
    let back = direction::turn180(heading);
    let mut pick = direction::random(rng);
    while pick == back {
        pick = direction::random(rng);
    }

    while !map.can_move(x, y, pick) {
        pick = if pick != heading { heading } else { direction::random(rng) };
    }
    pick
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cell::Cell;
    use crate::domain::entity::ActorKind;
    use crate::domain::rules::{close_boundary, place_wall};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn map_from(rows: &[&str]) -> (Vec<Vec<Cell>>, usize, usize) {
        let h = rows.len();
        let w = rows[0].len();
        let mut cells = vec![vec![Cell::default(); w]; h];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '*' { place_wall(&mut cells, x, y); }
                close_boundary(&mut cells, x, y, w, h);
            }
        }
        (cells, w, h)
    }

    fn pursuer_at(x: usize, y: usize, dir: Direction) -> Actor {
        let mut g = Actor::new(ActorKind::Pursuer, x, y, 10);
        g.direction = dir;
        g
    }

    // ── Odds ──

    #[test]
    fn odds_by_state() {
        assert_eq!(deliberate_odds(LifeState::Alive), 12);
        assert_eq!(deliberate_odds(LifeState::Dying), 2);
    }

    // ── direction_to ──

    #[test]
    fn vertical_heading_turns_horizontal() {
        assert_eq!(direction_to(5, 5, Direction::UP, 2, 9), Direction::LEFT);
        assert_eq!(direction_to(5, 5, Direction::DOWN, 8, 0), Direction::RIGHT);
    }

    #[test]
    fn horizontal_heading_turns_vertical() {
        assert_eq!(direction_to(5, 5, Direction::LEFT, 0, 1), Direction::UP);
        assert_eq!(direction_to(5, 5, Direction::RIGHT, 9, 7), Direction::DOWN);
    }

    #[test]
    fn none_heading_compares_rows() {
        assert_eq!(direction_to(5, 5, Direction::NONE, 5, 2), Direction::UP);
        assert_eq!(direction_to(5, 5, Direction::NONE, 9, 5), Direction::NONE);
    }

    #[test]
    fn aligned_keeps_heading() {
        assert_eq!(direction_to(5, 5, Direction::UP, 5, 0), Direction::UP);
        assert_eq!(direction_to(5, 5, Direction::RIGHT, 0, 5), Direction::RIGHT);
    }

    // ── wander ──

    #[test]
    fn wander_never_reverses_in_open_corridor() {
        let (c, w, h) = map_from(&[
            "*****",
            "     ",
            "*****",
        ]);
        let m = MapView { cells: &c, width: w, height: h };
        for seed in 0..500 {
            let mut rng = StdRng::seed_from_u64(seed);
            let d = wander(&m, 2, 1, Direction::RIGHT, &mut rng);
            assert_ne!(d, Direction::LEFT, "seed {seed}");
            assert_eq!(d, Direction::RIGHT, "seed {seed}");
        }
    }

    #[test]
    fn wander_at_junction_never_reverses() {
        let (c, w, h) = map_from(&[
            "     ",
            "     ",
            "     ",
        ]);
        let m = MapView { cells: &c, width: w, height: h };
        let mut seen = Direction::NONE;
        for seed in 0..500 {
            let mut rng = StdRng::seed_from_u64(seed);
            let d = wander(&m, 2, 1, Direction::RIGHT, &mut rng);
            assert_ne!(d, Direction::LEFT);
            seen = direction::combine(seen, d);
        }
        assert_eq!(seen, direction::combine(
            direction::combine(Direction::UP, Direction::DOWN), Direction::RIGHT,
        ));
    }

    #[test]
    fn wander_always_returns_legal_move() {
        let (c, w, h) = map_from(&[
            "*****",
            "*   *",
            "* * *",
            "*   *",
            "*****",
        ]);
        let m = MapView { cells: &c, width: w, height: h };
        let mut rng = StdRng::seed_from_u64(42);
        let mut x = 1;
        let mut y = 1;
        let mut heading = Direction::NONE;
        for _ in 0..300 {
            let d = wander(&m, x, y, heading, &mut rng);
            assert!(m.can_move(x, y, d));
            let (nx, ny) = m.destination(x, y, d);
            x = nx; y = ny; heading = d;
        }
    }

    #[test]
    fn wander_dead_end_turns_back() {
        let (c, w, h) = map_from(&[
            "****",
            "   *",
            "****",
        ]);
        let m = MapView { cells: &c, width: w, height: h };
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(wander(&m, 2, 1, Direction::RIGHT, &mut rng), Direction::LEFT);
    }

    // ── decide ──

    #[test]
    fn harmless_deliberate_flees() {
        // Corridor: wander can only continue RIGHT, so any LEFT is a flee
        let (c, w, h) = map_from(&[
            "*******",
            "       ",
            "*******",
        ]);
        let m = MapView { cells: &c, width: w, height: h };
        let g = pursuer_at(3, 1, Direction::RIGHT);

        for seed in 0..300 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(decide(&m, &g, (6, 1), false, &mut rng), Direction::RIGHT);
        }

        let fled = (0..300)
            .filter(|&seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                decide(&m, &g, (6, 1), true, &mut rng) == Direction::LEFT
            })
            .count();
        // Deliberate branch fires roughly 1 in 12
        assert!(fled > 0 && fled < 100, "fled {fled}");
    }

    #[test]
    fn dying_pursuer_targets_spawn() {
        // Single row: the only deliberate answer toward spawn is LEFT
        let (c, w, h) = map_from(&[
            "       ",
        ]);
        let m = MapView { cells: &c, width: w, height: h };
        let mut g = pursuer_at(0, 0, Direction::DOWN);
        g.spawn_x = 0;
        g.x = 5;
        g.state = LifeState::Dying;
        let mut toward_spawn = 0;
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            // Player on the far right must not matter
            if decide(&m, &g, (6, 0), false, &mut rng) == Direction::LEFT { toward_spawn += 1; }
        }
        // Deliberate (1 in 2) always says LEFT; wander adds more
        assert!(toward_spawn > 80);
    }
    #[test]
    fn dying_pursuer_reverses_while_harmless() {
        let (c, w, h) = map_from(&[
            "       ",
        ]);
        let m = MapView { cells: &c, width: w, height: h };
        let mut g = pursuer_at(5, 0, Direction::DOWN);
        g.spawn_x = 0;
        g.state = LifeState::Dying;
        let mut deliberate = 0;
        for seed in 0..100 {
            let mut gate = StdRng::seed_from_u64(seed);
            if gate.gen_range(0..deliberate_odds(LifeState::Dying)) != 0 { continue; }
            deliberate += 1;
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(decide(&m, &g, (6, 0), false, &mut rng), Direction::LEFT, "seed {seed}");
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(decide(&m, &g, (6, 0), true, &mut rng), Direction::RIGHT, "seed {seed}");
        }
        assert!(deliberate > 0);
    }
}
