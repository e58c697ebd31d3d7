/// Events emitted during a simulation step.
/// The presentation layer and the log consume these.

use super::world::Phase;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    FoodEaten { x: usize, y: usize },
    PowerTaken { x: usize, y: usize },
    BonusTaken { x: usize, y: usize },
    PursuerEaten { id: usize, x: usize, y: usize },
    PursuerRevived { id: usize },
    PlayerCaught { by: usize },
    PlayerDied,
    LifeLost { remaining: u32 },
    HarmlessEnded,
    LevelCleared { level: usize },
    LevelStarted { level: usize },
    PhaseChanged { from: Phase, to: Phase },
}
