/// The step function: advances the world by one tick.
///
/// Phase machine:
///   Starting  ─countdown─▶ Playing
///   Playing   ─no food left─▶ LevelOver ─countdown─▶ Starting (next level) | GameOver
///   Playing   ─player dead─▶ Starting (lives left) | GameOver
///
/// Processing order while Playing:
///   1. Vulnerability timer
///   2. For each non-dead actor, in level reading order:
///        tick it, then resolve its collisions with the player
///   3. Level-cleared check
///   4. Player-death check (may override 3)
///
/// Only the player and pursuers act on their own; items exist so the
/// player can run into them.

use tracing::{debug, info};

use crate::domain::ai;
use crate::domain::direction::Direction;
use crate::domain::entity::{ActorKind, LifeState};
use crate::domain::rules::MapView;
use super::event::GameEvent;
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry points
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    if world.paused { return events; }
    world.tick += 1;

    match world.phase {
        Phase::Starting => {
            if countdown(world) { enter_phase(world, Phase::Playing, &mut events); }
        }
        Phase::Playing => {
            resolve_harmless_timer(world, &mut events);
            resolve_actors(world, &mut events);
            resolve_level_cleared(world, &mut events);
            resolve_player_death(world, &mut events);
        }
        Phase::LevelOver => {
            if countdown(world) { resolve_level_change(world, &mut events); }
        }
        Phase::GameOver => {}
    }

    events
}

/// Player steering. Honored only while Playing with a live player, and
/// only toward an open side; a blocked request leaves the heading as is.
/// Collisions are re-checked either way.
pub fn request_direction(world: &mut WorldState, dir: Direction) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    if world.paused || world.phase != Phase::Playing { return events; }
    if !world.player().is_alive() { return events; }

    let p = world.player();
    if !dir.is_none() && world.map().can_move(p.x, p.y, dir) {
        world.player_mut().direction = dir;
    }

    let player = world.player;
    resolve_collisions(world, player, &mut events);
    events
}

// ══════════════════════════════════════════════════════════════
// Phase machine
// ══════════════════════════════════════════════════════════════

/// Count down the current timed phase. True once it has run out.
fn countdown(world: &mut WorldState) -> bool {
    world.phase_ticks = world.phase_ticks.saturating_sub(1);
    world.phase_ticks == 0
}

fn enter_phase(world: &mut WorldState, to: Phase, events: &mut Vec<GameEvent>) {
    let from = world.phase;
    world.set_phase(to);
    info!(?from, ?to, score = world.score, lives = world.lives, "phase change");
    events.push(GameEvent::PhaseChanged { from, to });
}

fn resolve_level_change(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.next_level() {
        info!(level = world.level + 1, name = %world.level_name, "level started");
        events.push(GameEvent::LevelStarted { level: world.level });
        events.push(GameEvent::PhaseChanged { from: Phase::LevelOver, to: Phase::Starting });
    } else {
        enter_phase(world, Phase::GameOver, events);
    }
}

fn resolve_level_cleared(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.food > 0 { return; }
    events.push(GameEvent::LevelCleared { level: world.level });
    enter_phase(world, Phase::LevelOver, events);
}

fn resolve_player_death(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.player().state != LifeState::Dead { return; }

    world.lives = world.lives.saturating_sub(1);
    debug!(remaining = world.lives, "life lost");
    events.push(GameEvent::LifeLost { remaining: world.lives });
    if world.lives == 0 {
        enter_phase(world, Phase::GameOver, events);
        return;
    }

    // Eaten items stay eaten
    for a in world.actors.iter_mut() {
        if a.state != LifeState::Dead { a.reset(); }
    }
    world.player_mut().reset();
    enter_phase(world, Phase::Starting, events);
}

// ══════════════════════════════════════════════════════════════
// Vulnerability timer
// ══════════════════════════════════════════════════════════════

fn resolve_harmless_timer(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if !world.harmless { return; }
    world.harmless_ticks = world.harmless_ticks.saturating_sub(1);
    if world.harmless_ticks == 0 {
        world.harmless = false;
        debug!("pursuers dangerous again");
        events.push(GameEvent::HarmlessEnded);
    }
}

// ══════════════════════════════════════════════════════════════
// Actors
// ══════════════════════════════════════════════════════════════

fn resolve_actors(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    for i in 0..world.actors.len() {
        if world.actors[i].state == LifeState::Dead { continue; }
        match world.actors[i].kind {
            ActorKind::Player => tick_player(world, i, events),
            ActorKind::Pursuer => tick_pursuer(world, i, events),
            ActorKind::Bonus | ActorKind::Power => {}
        }
        resolve_collisions(world, i, events);
    }
}

fn tick_player(world: &mut WorldState, i: usize, events: &mut Vec<GameEvent>) {
    let p = &mut world.actors[i];
    match p.state {
        LifeState::Alive => {
            p.mouth.chomp();
            if p.gate() && !p.direction.is_none() {
                let dir = p.direction;
                move_actor(world, i, dir, events);
            }
        }
        LifeState::Dying => {
            if p.mouth.open_dying() {
                p.state = LifeState::Dead;
                debug!(x = p.x, y = p.y, "player died");
                events.push(GameEvent::PlayerDied);
            }
        }
        LifeState::Dead => {}
    }
}

fn tick_pursuer(world: &mut WorldState, i: usize, events: &mut Vec<GameEvent>) {
    let harmless = world.harmless;
    let g = &mut world.actors[i];
    g.speed = match g.state {
        LifeState::Dying => world.speed.pursuer_dying_speed,
        _ if harmless => world.speed.pursuer_harmless_speed,
        _ => world.speed.pursuer_speed,
    };
    if !g.gate() { return; }

    let target = {
        let p = &world.actors[world.player];
        (p.x, p.y)
    };
    let map = MapView { cells: &world.cells, width: world.width, height: world.height };
    let dir = ai::decide(&map, &world.actors[i], target, harmless, &mut world.rng);
    move_actor(world, i, dir, events);

    let g = &mut world.actors[i];
    if g.state == LifeState::Dying && g.at_spawn() {
        g.state = LifeState::Alive;
        debug!(id = i, "pursuer back on its feet");
        events.push(GameEvent::PursuerRevived { id: i });
    }
}

/// Step actor `i` one cell in `dir` (or stay put if blocked).
/// The heading is recorded either way. The player eats food it lands on.
pub(crate) fn move_actor(world: &mut WorldState, i: usize, dir: Direction, events: &mut Vec<GameEvent>) {
    let map = MapView { cells: &world.cells, width: world.width, height: world.height };
    let (x, y) = map.destination(world.actors[i].x, world.actors[i].y, dir);

    let a = &mut world.actors[i];
    a.x = x;
    a.y = y;
    a.direction = dir;
    if !a.is_player() { return; }

    let cell = &mut world.cells[y][x];
    if cell.food {
        cell.food = false;
        world.food = world.food.saturating_sub(1);
        world.score += world.scoring.dot;
        events.push(GameEvent::FoodEaten { x, y });
    }
}

// ══════════════════════════════════════════════════════════════
// Collisions
// ══════════════════════════════════════════════════════════════

/// Run the contact handlers between actor `i` and the player.
///
/// From the player's side every live actor on its cell is handled; from
/// any other side only that actor. Either way the outcome is the same, so
/// processing order cannot let a meeting slip through.
fn resolve_collisions(world: &mut WorldState, i: usize, events: &mut Vec<GameEvent>) {
    let player = world.player;
    if !world.actors[player].is_alive() { return; }
    let (px, py) = (world.actors[player].x, world.actors[player].y);

    if i != player {
        if world.actors[i].at(px, py) { collide(world, i, events); }
        return;
    }

    for j in 0..world.actors.len() {
        if j == player { continue; }
        let other = &world.actors[j];
        if other.is_alive() && other.at(px, py) { collide(world, j, events); }
    }
}

/// Contact between the player and actor `j`.
fn collide(world: &mut WorldState, j: usize, events: &mut Vec<GameEvent>) {
    let (x, y) = (world.actors[j].x, world.actors[j].y);
    match world.actors[j].kind {
        ActorKind::Pursuer => {
            if !world.actors[j].is_alive() { return; }
            if world.harmless {
                world.actors[j].state = LifeState::Dying;
                world.score += world.scoring.pursuer;
                debug!(id = j, x, y, score = world.score, "pursuer eaten");
                events.push(GameEvent::PursuerEaten { id: j, x, y });
            } else if world.player().is_alive() {
                world.player_mut().state = LifeState::Dying;
                debug!(by = j, x, y, "player caught");
                events.push(GameEvent::PlayerCaught { by: j });
            }
        }
        ActorKind::Power => {
            world.score += world.scoring.power;
            world.start_harmless();
            world.actors[j].state = LifeState::Dead;
            debug!(x, y, ticks = world.harmless_ticks, "power taken");
            events.push(GameEvent::PowerTaken { x, y });
        }
        ActorKind::Bonus => {
            world.score += world.scoring.bonus;
            world.actors[j].state = LifeState::Dead;
            debug!(x, y, "bonus taken");
            events.push(GameEvent::BonusTaken { x, y });
        }
        ActorKind::Player => {}
    }
}

// ══════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════
