/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub scoring: ScoringConfig,
    pub levels_dir: PathBuf,
    pub seed: Option<u64>,
    pub log: LogConfig,
}

/// Tick rate and per-actor speed divisors. All durations are in ticks.
#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub player_speed: u32,
    pub pursuer_speed: u32,
    pub pursuer_harmless_speed: u32,
    pub pursuer_dying_speed: u32,
    pub harmless_ticks: u32,
    pub starting_ticks: u32,
    pub level_change_ticks: u32,
}

#[derive(Clone, Debug)]
pub struct ScoringConfig {
    pub dot: u32,
    pub pursuer: u32,
    pub bonus: u32,
    pub power: u32,
    pub lives: u32,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    pub level: String,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        TomlSpeed::default().into()
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        TomlScoring::default().into()
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    scoring: TomlScoring,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_player_speed")]
    player_speed: u32,
    #[serde(default = "default_pursuer_speed")]
    pursuer_speed: u32,
    #[serde(default = "default_pursuer_harmless_speed")]
    pursuer_harmless_speed: u32,
    #[serde(default = "default_pursuer_dying_speed")]
    pursuer_dying_speed: u32,
    #[serde(default = "default_harmless_ticks")]
    harmless_ticks: u32,
    #[serde(default = "default_starting_ticks")]
    starting_ticks: u32,
    #[serde(default = "default_level_change_ticks")]
    level_change_ticks: u32,
}

#[derive(Deserialize, Debug)]
struct TomlScoring {
    #[serde(default = "default_dot")]
    dot: u32,
    #[serde(default = "default_pursuer")]
    pursuer: u32,
    #[serde(default = "default_bonus")]
    bonus: u32,
    #[serde(default = "default_power")]
    power: u32,
    #[serde(default = "default_lives")]
    lives: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default)]
    file: Option<String>,
    #[serde(default = "default_log_level")]
    level: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }    // ~60 ticks per second
fn default_player_speed() -> u32 { 5 }
fn default_pursuer_speed() -> u32 { 10 }
fn default_pursuer_harmless_speed() -> u32 { 15 }
fn default_pursuer_dying_speed() -> u32 { 12 }
fn default_harmless_ticks() -> u32 { 250 }
fn default_starting_ticks() -> u32 { 70 }
fn default_level_change_ticks() -> u32 { 70 }

fn default_dot() -> u32 { 5 }
fn default_pursuer() -> u32 { 100 }
fn default_bonus() -> u32 { 50 }
fn default_power() -> u32 { 10 }
fn default_lives() -> u32 { 3 }

fn default_levels_dir() -> String { "levels".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            player_speed: default_player_speed(),
            pursuer_speed: default_pursuer_speed(),
            pursuer_harmless_speed: default_pursuer_harmless_speed(),
            pursuer_dying_speed: default_pursuer_dying_speed(),
            harmless_ticks: default_harmless_ticks(),
            starting_ticks: default_starting_ticks(),
            level_change_ticks: default_level_change_ticks(),
        }
    }
}

impl Default for TomlScoring {
    fn default() -> Self {
        TomlScoring {
            dot: default_dot(),
            pursuer: default_pursuer(),
            bonus: default_bonus(),
            power: default_power(),
            lives: default_lives(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            seed: None,
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            file: None,
            level: default_log_level(),
        }
    }
}

// Speed divisors of zero would never gate; clamp to 1.
impl From<TomlSpeed> for SpeedConfig {
    fn from(t: TomlSpeed) -> Self {
        SpeedConfig {
            tick_rate_ms: t.tick_rate_ms.max(1),
            player_speed: t.player_speed.max(1),
            pursuer_speed: t.pursuer_speed.max(1),
            pursuer_harmless_speed: t.pursuer_harmless_speed.max(1),
            pursuer_dying_speed: t.pursuer_dying_speed.max(1),
            harmless_ticks: t.harmless_ticks,
            starting_ticks: t.starting_ticks,
            level_change_ticks: t.level_change_ticks,
        }
    }
}

impl From<TomlScoring> for ScoringConfig {
    fn from(t: TomlScoring) -> Self {
        ScoringConfig {
            dot: t.dot,
            pursuer: t.pursuer,
            bonus: t.bonus,
            power: t.power,
            lives: t.lives.max(1),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    /// Parse config text directly (no file search). Relative paths stay relative.
    #[cfg(test)]
    fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::resolve(toml_cfg, &[]))
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve levels directory
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        GameConfig {
            speed: toml_cfg.speed.into(),
            scoring: toml_cfg.scoring.into(),
            levels_dir,
            seed: toml_cfg.general.seed,
            log: LogConfig {
                file: toml_cfg.log.file.map(PathBuf::from),
                level: toml_cfg.log.level,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/mazechase)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/mazechase");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
/// Runs before the log subscriber exists, so problems go to stderr.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
