/// Actors: the player, pursuers, and the two item kinds.
///
/// All four share one struct and differ by `kind`; per-tick behavior and
/// collision outcomes are dispatched on the tag in `sim::step`.

use super::direction::Direction;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActorKind {
    Player,
    Pursuer,
    Bonus,   // collected for points
    Power,   // makes pursuers vulnerable
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LifeState {
    Alive,
    Dying,
    Dead,
}

// ── Player mouth ──

pub const MOUTH_MIN: u32 = 0;
pub const MOUTH_MAX: u32 = 60;
pub const MOUTH_STEP: u32 = 10;
/// Dying ends once the mouth has opened all the way round.
pub const MOUTH_DEAD: u32 = 360;

/// Mouth opening in degrees. Doubles as the death animation timer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Mouth {
    pub angle: u32,
    pub opening: bool,
}

impl Mouth {
    pub fn new() -> Self {
        Mouth { angle: MOUTH_MAX, opening: false }
    }

    /// Chomp one step between MOUTH_MIN and MOUTH_MAX.
    pub fn chomp(&mut self) {
        if self.opening {
            self.angle += MOUTH_STEP;
            if self.angle >= MOUTH_MAX { self.angle = MOUTH_MAX; self.opening = false; }
        } else {
            self.angle = self.angle.saturating_sub(MOUTH_STEP);
            if self.angle <= MOUTH_MIN { self.angle = MOUTH_MIN; self.opening = true; }
        }
    }

    /// Advance the death animation. Returns true once it has finished.
    pub fn open_dying(&mut self) -> bool {
        self.angle += MOUTH_STEP;
        self.angle >= MOUTH_DEAD
    }
}

#[derive(Clone, Debug)]
pub struct Actor {
    pub kind: ActorKind,
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
    pub state: LifeState,
    /// Speed divisor: ticks accumulated before the actor acts.
    pub speed: u32,
    pub ticks: u32,
    pub spawn_x: usize,
    pub spawn_y: usize,
    pub mouth: Mouth,
}

impl Actor {
    pub fn new(kind: ActorKind, x: usize, y: usize, speed: u32) -> Self {
        Actor {
            kind,
            x, y,
            direction: Direction::NONE,
            state: LifeState::Alive,
            speed,
            ticks: 0,
            spawn_x: x,
            spawn_y: y,
            mouth: Mouth::new(),
        }
    }

    pub fn is_player(&self) -> bool {
        self.kind == ActorKind::Player
    }

    pub fn is_alive(&self) -> bool {
        self.state == LifeState::Alive
    }

    pub fn at(&self, x: usize, y: usize) -> bool {
        self.x == x && self.y == y
    }

    pub fn at_spawn(&self) -> bool {
        self.at(self.spawn_x, self.spawn_y)
    }

    /// Back to spawn, alive. The player also loses its heading and
    /// gets a fresh mouth; other actors keep their heading.
    pub fn reset(&mut self) {
        self.x = self.spawn_x;
        self.y = self.spawn_y;
        self.state = LifeState::Alive;
        if self.is_player() {
            self.direction = Direction::NONE;
            self.mouth = Mouth::new();
        }
    }

    /// Count one tick. Returns true when the actor may act this tick.
    pub fn gate(&mut self) -> bool {
        self.ticks += 1;
        if self.ticks >= self.speed {
            self.ticks = 0;
            true
        } else {
            false
        }
    }
}
