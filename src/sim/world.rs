/// WorldState: the complete snapshot of a running game.
///
/// ## Ownership
///
/// The world owns the grid and every actor. Actors live in one ordered
/// `Vec` in level reading order; the player is the index `player` into it.
/// Nothing else holds references across ticks.
///
/// ## Levels
///
/// Parsed layouts are kept in `levels` and copied in on load, so a level
/// always starts from its pristine state. Score and lives carry over.

use rand::rngs::StdRng;

use crate::config::{ScoringConfig, SpeedConfig};
use crate::domain::cell::Cell;
use crate::domain::entity::Actor;
use crate::domain::rules::MapView;
use super::level::{Layout, LevelError};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Starting,
    Playing,
    LevelOver,
    GameOver,
}

pub struct WorldState {
    // ── Grid ──
    /// `cells[y][x]`
    pub cells: Vec<Vec<Cell>>,
    pub width: usize,
    pub height: usize,

    // ── Actors ──
    pub actors: Vec<Actor>,
    pub player: usize,

    // ── Progress ──
    pub food: usize,
    pub score: u32,
    pub lives: u32,
    pub level: usize,
    pub level_name: String,
    pub tick: u64,

    // ── Phase machine ──
    pub phase: Phase,
    /// Countdown for Starting / LevelOver.
    pub phase_ticks: u32,

    // ── Vulnerability ──
    pub harmless: bool,
    pub harmless_ticks: u32,

    // ── Tuning ──
    pub speed: SpeedConfig,
    pub scoring: ScoringConfig,

    // ── Front-end ──
    pub paused: bool,

    pub rng: StdRng,
    levels: Vec<Layout>,
}

// ── Construction / level loading ──

impl WorldState {
    /// New game on the first level.
    pub fn new(
        levels: Vec<Layout>,
        speed: SpeedConfig,
        scoring: ScoringConfig,
        rng: StdRng,
    ) -> Result<Self, LevelError> {
        let first = levels.first().cloned().ok_or(LevelError::NoLevels)?;
        let lives = scoring.lives;
        let mut world = WorldState {
            cells: vec![],
            width: 0,
            height: 0,
            actors: vec![],
            player: 0,
            food: 0,
            score: 0,
            lives,
            level: 0,
            level_name: String::new(),
            tick: 0,
            phase: Phase::Starting,
            phase_ticks: 0,
            harmless: false,
            harmless_ticks: 0,
            speed,
            scoring,
            paused: false,
            rng,
            levels,
        };
        world.install(0, first);
        Ok(world)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Start over from the first level with a fresh score and full lives.
    pub fn new_game(&mut self) {
        self.score = 0;
        self.lives = self.scoring.lives;
        self.paused = false;
        self.load_level(0);
    }

    /// Load level `idx`. Returns false if there is no such level.
    pub fn load_level(&mut self, idx: usize) -> bool {
        match self.levels.get(idx).cloned() {
            Some(layout) => {
                self.install(idx, layout);
                true
            }
            None => false,
        }
    }

    /// Advance to the following level, if any.
    pub fn next_level(&mut self) -> bool {
        self.load_level(self.level + 1)
    }

    fn install(&mut self, idx: usize, layout: Layout) {
        self.cells = layout.cells;
        self.width = layout.width;
        self.height = layout.height;
        self.actors = layout.actors;
        self.player = layout.player;
        self.food = layout.food;
        self.level = idx;
        self.level_name = layout.name;
        self.harmless = false;
        self.harmless_ticks = 0;
        self.set_phase(Phase::Starting);
    }
}

// ── Queries / mutation helpers ──

impl WorldState {
    pub fn map(&self) -> MapView<'_> {
        MapView { cells: &self.cells, width: self.width, height: self.height }
    }

    pub fn player(&self) -> &Actor {
        &self.actors[self.player]
    }

    pub fn player_mut(&mut self) -> &mut Actor {
        &mut self.actors[self.player]
    }

    /// Switch phase; timed phases re-arm their countdown.
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.phase_ticks = match phase {
            Phase::Starting => self.speed.starting_ticks,
            Phase::LevelOver => self.speed.level_change_ticks,
            _ => 0,
        };
    }

    /// Make pursuers vulnerable for the configured duration.
    pub fn start_harmless(&mut self) {
        self.harmless = true;
        self.harmless_ticks = self.speed.harmless_ticks;
    }

    /// Vulnerability about to run out: last fifth of the timer.
    pub fn harmless_ending(&self) -> bool {
        self.harmless && self.harmless_ticks <= self.speed.harmless_ticks / 5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{ActorKind, LifeState};
    use crate::sim::level::{parse_layout, LevelDef};
    use rand::SeedableRng;

    fn layout(name: &str, rows: &[&str]) -> Layout {
        let def = LevelDef { name: name.into(), rows: rows.iter().map(|r| r.to_string()).collect() };
        parse_layout(&def, &SpeedConfig::default()).unwrap()
    }

    fn two_level_world() -> WorldState {
        WorldState::new(
            vec![layout("A", &["P..0"]), layout("B", &["..P."])],
            SpeedConfig::default(),
            ScoringConfig::default(),
            StdRng::seed_from_u64(1),
        ).unwrap()
    }

    #[test]
    fn new_world_starts_first_level() {
        let w = two_level_world();
        assert_eq!(w.level, 0);
        assert_eq!(w.level_name, "A");
        assert_eq!(w.phase, Phase::Starting);
        assert_eq!(w.phase_ticks, 70);
        assert_eq!(w.lives, 3);
        assert_eq!(w.food, 2);
        assert_eq!(w.player().kind, ActorKind::Player);
        assert_eq!(w.level_count(), 2);
    }

    #[test]
    fn no_levels_is_an_error() {
        let r = WorldState::new(vec![], SpeedConfig::default(), ScoringConfig::default(), StdRng::seed_from_u64(1));
        assert!(matches!(r, Err(LevelError::NoLevels)));
    }

    #[test]
    fn next_level_keeps_score_and_clears_harmless() {
        let mut w = two_level_world();
        w.score = 120;
        w.lives = 2;
        w.start_harmless();
        assert!(w.next_level());
        assert_eq!(w.level, 1);
        assert_eq!(w.player().x, 2);
        assert_eq!(w.score, 120);
        assert_eq!(w.lives, 2);
        assert!(!w.harmless);
        assert_eq!(w.phase, Phase::Starting);
        assert!(!w.next_level());
        assert_eq!(w.level, 1);
    }

    #[test]
    fn reload_restores_pristine_level() {
        let mut w = two_level_world();
        w.cells[0][1].food = false;
        w.food = 1;
        w.actors[1].state = LifeState::Dead;
        w.score = 40;
        w.new_game();
        assert!(w.cells[0][1].food);
        assert_eq!(w.food, 2);
        assert!(w.actors[1].is_alive());
        assert_eq!(w.score, 0);
        assert_eq!(w.lives, 3);
    }

    #[test]
    fn harmless_ending_is_last_fifth() {
        let mut w = two_level_world();
        assert!(!w.harmless_ending());
        w.start_harmless();
        assert_eq!(w.harmless_ticks, 250);
        assert!(!w.harmless_ending());
        w.harmless_ticks = 51;
        assert!(!w.harmless_ending());
        w.harmless_ticks = 50;
        assert!(w.harmless_ending());
    }

    #[test]
    fn harmless_ending_with_huge_duration() {
        let mut w = two_level_world();
        w.speed.harmless_ticks = u32::MAX;
        w.start_harmless();
        assert!(!w.harmless_ending());
        w.harmless_ticks = u32::MAX / 5 + 1;
        assert!(!w.harmless_ending());
        w.harmless_ticks = u32::MAX / 5;
        assert!(w.harmless_ending());
    }

    #[test]
    fn set_phase_rearms_countdown() {
        let mut w = two_level_world();
        w.phase_ticks = 3;
        w.set_phase(Phase::LevelOver);
        assert_eq!(w.phase_ticks, 70);
        w.set_phase(Phase::Playing);
        assert_eq!(w.phase_ticks, 0);
    }
}
