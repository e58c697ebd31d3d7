/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.txt` files, sorted by file name)
///   2. Built-in embedded levels
///
/// Files that fail to load are skipped with a warning. If none of them
/// load, the embedded set is used.
///
/// ## Level file format (`.txt`):
///   Line 1 (optional): `# Level Name`
///   Then 21 rows of 21 characters. Short rows are padded with spaces.
///
/// ## Cell legend:
///   '*' = Wall                   '#' = Pen wall
///   '.' = Food dot               'o' = Power item
///   'C' = Bonus item             'P' = Player spawn
///   '0'-'3' = Pursuer spawn      '-' = Pen door (no wall)
///   'E' = Tunnel exit            anything else = Empty

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{GameConfig, SpeedConfig};
use crate::domain::cell::Cell;
use crate::domain::entity::{Actor, ActorKind};
use crate::domain::rules;

pub const FIELD_WIDTH: usize = 21;
pub const FIELD_HEIGHT: usize = 21;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("could not read level {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("level '{name}' is {found_w}x{found_h}, expected {expected_w}x{expected_h}")]
    Dimensions {
        name: String,
        expected_w: usize,
        expected_h: usize,
        found_w: usize,
        found_h: usize,
    },
    #[error("level '{name}' has no player spawn")]
    MissingPlayer { name: String },
    #[error("no playable levels")]
    NoLevels,
}

/// Raw level text (owned strings, loaded from file or embedded).
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
}

/// A parsed level, ready to be copied into the world.
#[derive(Clone, Debug)]
pub struct Layout {
    pub name: String,
    pub cells: Vec<Vec<Cell>>,
    pub width: usize,
    pub height: usize,
    pub food: usize,
    pub actors: Vec<Actor>,
    /// Index of the player in `actors`.
    pub player: usize,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load every playable level for this configuration.
pub fn load_levels(config: &GameConfig) -> Result<Vec<Layout>, LevelError> {
    if config.levels_dir.is_dir() {
        let from_dir: Vec<Layout> = load_from_directory(&config.levels_dir)
            .into_iter()
            .filter_map(|(file, res)| {
                match res.and_then(|def| {
                    check_dimensions(&def)?;
                    parse_layout(&def, &config.speed)
                }) {
                    Ok(layout) => Some(layout),
                    Err(e) => {
                        warn!(file = %file, error = %e, "skipping level file");
                        None
                    }
                }
            })
            .collect();
        if !from_dir.is_empty() {
            info!(count = from_dir.len(), dir = %config.levels_dir.display(), "loaded levels from directory");
            return Ok(from_dir);
        }
    }

    let levels = embedded_levels()
        .iter()
        .map(|def| parse_layout(def, &config.speed))
        .collect::<Result<Vec<_>, _>>()?;
    if levels.is_empty() {
        return Err(LevelError::NoLevels);
    }
    info!(count = levels.len(), "using built-in levels");
    Ok(levels)
}

/// Build grid and actors from level text.
///
/// Walls are merged with walls already placed to their left and above,
/// then every boundary cell that is not a tunnel exit is closed off.
/// Unknown characters are empty cells. Only the first `P` spawns a player.
pub fn parse_layout(def: &LevelDef, speed: &SpeedConfig) -> Result<Layout, LevelError> {
    let height = def.rows.len();
    let width = def.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);

    let mut cells = vec![vec![Cell::default(); width]; height];
    let mut actors: Vec<Actor> = Vec::new();
    let mut player: Option<usize> = None;
    let mut food = 0;

    for y in 0..height {
        let mut row = def.rows[y].chars();
        for x in 0..width {
            let ch = row.next().unwrap_or(' ');
            cells[y][x].reset();
            match ch {
                '*' | '#' => rules::place_wall(&mut cells, x, y),
                '.' => {
                    cells[y][x].food = true;
                    food += 1;
                }
                '-' => cells[y][x].prison_exit = true,
                'E' => cells[y][x].exit = true,
                'P' => {
                    if player.is_none() {
                        player = Some(actors.len());
                        actors.push(Actor::new(ActorKind::Player, x, y, speed.player_speed));
                    } else {
                        warn!(level = %def.name, x, y, "extra player spawn ignored");
                    }
                }
                'C' => actors.push(Actor::new(ActorKind::Bonus, x, y, 1)),
                'o' => actors.push(Actor::new(ActorKind::Power, x, y, 1)),
                '0'..='3' => actors.push(Actor::new(ActorKind::Pursuer, x, y, speed.pursuer_speed)),
                _ => {}
            }
            rules::close_boundary(&mut cells, x, y, width, height);
        }
    }

    let player = player.ok_or_else(|| LevelError::MissingPlayer { name: def.name.clone() })?;

    Ok(Layout {
        name: def.name.clone(),
        cells,
        width,
        height,
        food,
        actors,
        player,
    })
}

// ══════════════════════════════════════════════════════════════
// Single-level file parsing
// ══════════════════════════════════════════════════════════════

/// Parse a single level from text content.
fn parse_level_file(content: &str, fallback_name: &str) -> LevelDef {
    let mut name = String::new();
    let mut rows = vec![];

    for (i, line) in content.lines().enumerate() {
        if i == 0 && line.starts_with('#') && is_name_line(line) {
            name = line[1..].trim().to_string();
        } else {
            rows.push(line.trim_end_matches('\r').to_string());
        }
    }

    // Blank rows inside the field are real; only drop the surplus.
    while rows.len() > FIELD_HEIGHT && rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }

    if name.is_empty() {
        name = fallback_name.to_string();
    }

    LevelDef { name, rows }
}

/// Distinguish `# Level Name` from a wall row starting with `#`.
/// A name line contains at least one letter after the hash.
fn is_name_line(line: &str) -> bool {
    line[1..].chars().any(|c| c.is_alphabetic())
}

/// Files must hold exactly one field; rows may be short (trailing spaces).
fn check_dimensions(def: &LevelDef) -> Result<(), LevelError> {
    let found_w = def.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    let found_h = def.rows.len();
    if found_h != FIELD_HEIGHT || found_w > FIELD_WIDTH {
        return Err(LevelError::Dimensions {
            name: def.name.clone(),
            expected_w: FIELD_WIDTH,
            expected_h: FIELD_HEIGHT,
            found_w,
            found_h,
        });
    }
    Ok(())
}

/// Pad every row to the full field width.
fn pad_rows(mut def: LevelDef) -> LevelDef {
    for row in &mut def.rows {
        let len = row.chars().count();
        if len < FIELD_WIDTH {
            row.extend(std::iter::repeat(' ').take(FIELD_WIDTH - len));
        }
    }
    def
}

// ══════════════════════════════════════════════════════════════
// Directory loading (individual .txt files)
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<(String, Result<LevelDef, LevelError>)> {
    let mut results = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "could not list levels directory");
            return results;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(false, |e| e == "txt") {
            let filename = path.file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let stem = path.file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let def = std::fs::read_to_string(&path)
                .map(|content| pad_rows(parse_level_file(&content, &stem)))
                .map_err(|source| LevelError::Io { path: path.clone(), source });
            results.push((filename, def));
        }
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("Level 1", &[
            ".....*.........*.....",
            "o***.*.*******.*.***o",
            "..........C..........",
            "**.*.****.*.****.*.**",
            " *.*.*....*.*....*.* ",
            "**.*.****.*.****.*.**",
            "E .*......*......*. E",
            "**.*** ******* ***.**",
            " *.               .* ",
            " *.*** ###-### ***.* ",
            " *.*   #01 23#   *.* ",
            "**.* * ###-### * *.**",
            "E .  *         *  . E",
            "**.****** * ******.**",
            ".*.....   *   .....*.",
            ".*.***.*******.***.*.",
            "..........P..........",
            ".***.****.*.****.***.",
            ".*.*.*....*....*.*.*.",
            "o*.*.*.*******.*.*.*o",
            ".....................",
        ]),
        make_embedded("Level 2", &[
            ".....................",
            ".*****.*******.*****.",
            "o*   *.*.....*.*   *o",
            ".*****.*.*.*.*.*****.",
            ".......*.*.*.*.......",
            "****.*.*..C..*.*.****",
            " *...*...*.*...*...* ",
            " *.***** *.* *****.* ",
            "**...*         *...**",
            "E  *.* ###-### *.*  E",
            "****.  #01 23#  .****",
            "E  *.* ###-### *.*  E",
            "**...*         *...**",
            " *.*.*** * * ***.*.* ",
            " *.*.....* *.....*.* ",
            "**.*** *.* *.* ***.**",
            ".......*..P..*.......",
            ".*** * ******* * ***.",
            "o*...*    C    *...*o",
            ".*.******.*.******.*.",
            "..........*..........",
        ]),
        make_embedded("Level 3", &[
            "          .          ",
            "                     ",
            "                     ",
            "                     ",
            "                     ",
            "                     ",
            "                     ",
            "                     ",
            "                     ",
            "       ###-###       ",
            "       #01 23#       ",
            "       ###-###       ",
            "                     ",
            "                     ",
            "                     ",
            "                     ",
            "                     ",
            "                     ",
            "                     ",
            "                     ",
            "          P          ",
        ]),
    ]
}

fn make_embedded(name: &str, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        rows: map.iter().map(|s| s.to_string()).collect(),
    }
}
