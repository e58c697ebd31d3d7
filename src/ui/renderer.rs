/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Each maze cell is two terminal columns. Single glyphs sit in the left
/// column; the right column carries horizontal wall strokes.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::direction::Direction;
use crate::domain::entity::{Actor, ActorKind, LifeState, MOUTH_MAX};
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every terminal cell, so the gaps
    /// between rows match the cells on VTE-based terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color) -> Self {
        Cell { ch, fg, bg: Self::BASE_BG }
    }

    fn with_bg(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::with_bg(ch, fg, bg));
        }
    }
}

// ── Palette ──

const WALL: Color = Color::Rgb { r: 40, g: 60, b: 230 };
const DOOR: Color = Color::Rgb { r: 255, g: 170, b: 200 };
const FOOD: Color = Color::Rgb { r: 255, g: 200, b: 170 };
const PLAYER: Color = Color::Rgb { r: 255, g: 230, b: 0 };
const PURSUER: Color = Color::Rgb { r: 230, g: 30, b: 30 };
const HARMLESS: Color = Color::Rgb { r: 40, g: 60, b: 255 };
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };

// ── Renderer ──

const CELL_W: usize = 2;
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    frame: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            frame: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        self.fit_terminal()?;
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        self.frame = self.frame.wrapping_add(1);
        self.fit_terminal()?;

        // Level change or restart: start from a clean screen
        if self.last_phase != Some(world.phase) {
            if world.phase == Phase::Starting { self.invalidate()?; }
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        self.compose_hud(world);
        self.compose_maze(world);
        self.compose_actors(world);
        self.compose_overlay(world);
        self.compose_help(world);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    /// Track terminal size; a resize forces a full repaint.
    fn fit_terminal(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.invalidate()?;
        }
        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.back.cells.fill(Cell::INVALID);
        queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors; ResetColor would fall back to the terminal default
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) { continue; }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, w: &WorldState) {
        for x in 0..self.front.width {
            self.front.set(x, HUD_ROW, Cell::with_bg(' ', Color::White, HUD_BG));
        }
        let lives: String = std::iter::repeat('●').take(w.lives as usize).collect();
        let hud = format!(
            " LEVEL {}/{} {:<12} SCORE {:<7} LIVES {}",
            w.level + 1, w.level_count(), w.level_name, w.score, lives,
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn compose_maze(&mut self, w: &WorldState) {
        for y in 0..w.height {
            for x in 0..w.width {
                let cell = w.cells[y][x];
                let col = x * CELL_W;
                let row = MAP_ROW + y;
                if cell.wall {
                    let joins = Joins {
                        up: y > 0 && w.cells[y - 1][x].wall,
                        down: y + 1 < w.height && w.cells[y + 1][x].wall,
                        left: x > 0 && w.cells[y][x - 1].wall,
                        right: x + 1 < w.width && w.cells[y][x + 1].wall,
                    };
                    let (c0, c1) = wall_glyph(joins);
                    self.front.set(col, row, Cell::new(c0, WALL));
                    self.front.set(col + 1, row, Cell::new(c1, WALL));
                } else if cell.prison_exit {
                    self.front.set(col, row, Cell::new('━', DOOR));
                    self.front.set(col + 1, row, Cell::new('━', DOOR));
                } else if cell.food {
                    self.front.set(col, row, Cell::new('·', FOOD));
                }
            }
        }
    }

    fn compose_actors(&mut self, w: &WorldState) {
        // Items first so moving actors are drawn on top
        let items = w.actors.iter().filter(|a| matches!(a.kind, ActorKind::Bonus | ActorKind::Power));
        let movers = w.actors.iter().filter(|a| a.kind == ActorKind::Pursuer);
        for a in items.chain(movers).chain(std::iter::once(w.player())) {
            if a.state == LifeState::Dead { continue; }
            if w.phase == Phase::GameOver && a.is_player() { continue; }
            let (c0, c1, fg) = self.actor_glyph(w, a);
            let col = a.x * CELL_W;
            let row = MAP_ROW + a.y;
            self.front.set(col, row, Cell::new(c0, fg));
            if c1 != ' ' { self.front.set(col + 1, row, Cell::new(c1, fg)); }
        }
    }

    fn actor_glyph(&self, w: &WorldState, a: &Actor) -> (char, char, Color) {
        match a.kind {
            ActorKind::Player => (player_glyph(a), ' ', PLAYER),
            ActorKind::Pursuer => {
                if a.state == LifeState::Dying {
                    ('°', '°', Color::White)
                } else if w.harmless {
                    let flash = w.harmless_ending() && (w.harmless_ticks / 5) % 2 == 0;
                    ('ᗣ', ' ', if flash { Color::White } else { HARMLESS })
                } else {
                    ('ᗣ', ' ', PURSUER)
                }
            }
            ActorKind::Power => {
                // Slow pulse
                let ch = if (self.frame / 20) % 2 == 0 { '●' } else { '•' };
                (ch, ' ', FOOD)
            }
            ActorKind::Bonus => ('♣', ' ', Color::Rgb { r: 80, g: 220, b: 80 }),
        }
    }

    fn compose_overlay(&mut self, w: &WorldState) {
        let (text, fg) = if w.paused {
            let blink = (self.frame / 30) % 2 == 0;
            (if blink { "PAUSED" } else { "" }, Color::White)
        } else {
            match w.phase {
                Phase::Starting => ("READY!", PLAYER),
                Phase::LevelOver => ("LEVEL OVER!", Color::Rgb { r: 80, g: 255, b: 80 }),
                Phase::GameOver => ("GAME OVER", PURSUER),
                Phase::Playing => ("", Color::White),
            }
        };
        if text.is_empty() { return; }

        let map_cols = w.width * CELL_W;
        let row = MAP_ROW + (w.height / 2 + 2).min(w.height.saturating_sub(1));
        let x = map_cols.saturating_sub(text.chars().count()) / 2;
        self.front.put_str(x, row, text, fg, Cell::BASE_BG);
    }

    fn compose_help(&mut self, w: &WorldState) {
        let row = MAP_ROW + w.height + 1;
        let help = if w.phase == Phase::GameOver {
            format!(" Final score {}  ENTER: play again  Q/ESC: quit", w.score)
        } else {
            " ←↑↓→/WASD: move  P: pause  Q/ESC: quit".to_string()
        };
        self.front.put_str(0, row, &help, Color::DarkGrey, Cell::BASE_BG);
    }
}

// ── Glyph selection ──

/// Which neighbors a wall block connects to.
#[derive(Clone, Copy)]
struct Joins {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

/// Wall piece for a block joined to its wall neighbors. The left column
/// carries the junction, the right column continues a rightward stroke.
fn wall_glyph(j: Joins) -> (char, char) {
    let junction = match (j.up, j.down, j.left, j.right) {
        (false, false, false, false) => '▪',
        (true, false, false, false) => '╹',
        (false, true, false, false) => '╻',
        (false, false, true, false) => '╸',
        (false, false, false, true) => '╺',
        (true, true, false, false) => '┃',
        (false, false, true, true) => '━',
        (true, false, false, true) => '┗',
        (true, false, true, false) => '┛',
        (false, true, false, true) => '┏',
        (false, true, true, false) => '┓',
        (true, true, false, true) => '┣',
        (true, true, true, false) => '┫',
        (false, true, true, true) => '┳',
        (true, false, true, true) => '┻',
        (true, true, true, true) => '╋',
    };
    (junction, if j.right { '━' } else { ' ' })
}

/// Player glyph from heading and mouth angle. Dying shrinks it away.
fn player_glyph(p: &Actor) -> char {
    match p.state {
        LifeState::Dying => {
            const STAGES: [char; 4] = ['◕', '◑', '◔', '·'];
            let progress = p.mouth.angle.saturating_sub(MOUTH_MAX) as usize;
            STAGES[(progress * STAGES.len() / 301).min(STAGES.len() - 1)]
        }
        _ if p.mouth.angle < 20 => '●',
        _ => match p.direction {
            Direction::LEFT => 'ᗤ',
            Direction::UP => 'ᗢ',
            Direction::DOWN => 'ᗜ',
            _ => 'ᗧ',
        },
    }
}
