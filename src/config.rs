/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub sim: SimConfig,
    pub timing: TimingConfig,
    pub gamepad: GamepadConfig,
    /// Fixed RNG seed; `None` draws a fresh one per run.
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
    /// Problems found while loading. Kept until the logger is up.
    pub warnings: Vec<String>,
}

/// Simulation tuning. Everything the tick and move resolvers read.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    pub map_width: usize,
    pub map_height: usize,      // visible rows; also the look-ahead buffer
    pub safe_rows: usize,       // leading rows forced empty at start
    pub bomb_chance: f64,
    pub sweetpotato_chance: f64,
    pub bomb_countdown: u32,
    pub bomb_radius: usize,     // Chebyshev blast radius
    pub bomb_activation_radius: usize,
    pub bomb_damage: u32,
    pub lava_damage: u32,
    pub sweetpotato_heal: u32,
    pub drill_base_power: u32,
    pub drill_power_per_level: u32,
    pub max_health: u32,
    pub xp_base: u64,
    pub xp_multiplier: u64,
    pub level_cap: u32,
    pub fall_rows_per_tick: usize,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    pub hop_ms: u64,    // delay between hop start and fall commit
    pub blink_ms: u64,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub pause: Vec<String>,
    pub restart: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    sim: TomlSim,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSim {
    #[serde(default = "default_map_width")]
    map_width: usize,
    #[serde(default = "default_map_height")]
    map_height: usize,
    #[serde(default = "default_safe_rows")]
    safe_rows: usize,
    #[serde(default = "default_bomb_chance")]
    bomb_chance: f64,
    #[serde(default = "default_sweetpotato_chance")]
    sweetpotato_chance: f64,
    #[serde(default = "default_bomb_countdown")]
    bomb_countdown: u32,
    #[serde(default = "default_bomb_radius")]
    bomb_radius: usize,
    #[serde(default = "default_bomb_activation")]
    bomb_activation_radius: usize,
    #[serde(default = "default_one")]
    bomb_damage: u32,
    #[serde(default = "default_one")]
    lava_damage: u32,
    #[serde(default = "default_one")]
    sweetpotato_heal: u32,
    #[serde(default = "default_one")]
    drill_base_power: u32,
    #[serde(default = "default_one")]
    drill_power_per_level: u32,
    #[serde(default = "default_max_health")]
    max_health: u32,
    #[serde(default = "default_xp_base")]
    xp_base: u64,
    #[serde(default = "default_xp_multiplier")]
    xp_multiplier: u64,
    #[serde(default = "default_level_cap")]
    level_cap: u32,
    #[serde(default = "default_fall_rows")]
    fall_rows_per_tick: usize,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_hop")]
    hop_ms: u64,
    #[serde(default = "default_blink")]
    blink_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_log_file")]
    log_file: Option<String>,
}

// ── Defaults ──

fn default_map_width() -> usize { 10 }
fn default_map_height() -> usize { 20 }
fn default_safe_rows() -> usize { 2 }
fn default_bomb_chance() -> f64 { 0.05 }
fn default_sweetpotato_chance() -> f64 { 0.01 }
fn default_bomb_countdown() -> u32 { 3 }
fn default_bomb_radius() -> usize { 2 }      // 5x5 blast
fn default_bomb_activation() -> usize { 3 }
fn default_one() -> u32 { 1 }
fn default_max_health() -> u32 { 3 }
fn default_xp_base() -> u64 { 10 }
fn default_xp_multiplier() -> u64 { 2 }
fn default_level_cap() -> u32 { 99 }
fn default_fall_rows() -> usize { 1 }

fn default_tick_rate() -> u64 { 500 }
fn default_hop() -> u64 { 100 }
fn default_blink() -> u64 { 200 }

fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_pause() -> Vec<String> { vec!["Select".into()] }
fn default_restart() -> Vec<String> { vec!["Y".into()] }
fn default_log_file() -> Option<String> { Some("kosooni.log".into()) }

impl Default for TomlSim {
    fn default() -> Self {
        TomlSim {
            map_width: default_map_width(),
            map_height: default_map_height(),
            safe_rows: default_safe_rows(),
            bomb_chance: default_bomb_chance(),
            sweetpotato_chance: default_sweetpotato_chance(),
            bomb_countdown: default_bomb_countdown(),
            bomb_radius: default_bomb_radius(),
            bomb_activation_radius: default_bomb_activation(),
            bomb_damage: default_one(),
            lava_damage: default_one(),
            sweetpotato_heal: default_one(),
            drill_base_power: default_one(),
            drill_power_per_level: default_one(),
            max_health: default_max_health(),
            xp_base: default_xp_base(),
            xp_multiplier: default_xp_multiplier(),
            level_cap: default_level_cap(),
            fall_rows_per_tick: default_fall_rows(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            hop_ms: default_hop(),
            blink_ms: default_blink(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            pause: default_pause(),
            restart: default_restart(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { seed: None, log_file: default_log_file() }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig::from_toml(TomlSim::default(), &mut Vec::new())
    }
}

impl SimConfig {
    /// Convert the raw schema, replacing values the simulation cannot run with.
    fn from_toml(t: TomlSim, warnings: &mut Vec<String>) -> Self {
        fn positive<T>(warnings: &mut Vec<String>, name: &str, v: T, fallback: T) -> T
        where
            T: PartialEq + Default + Copy + std::fmt::Display,
        {
            if v == T::default() {
                warnings.push(format!("sim.{name} must be positive, using {fallback}"));
                fallback
            } else {
                v
            }
        }
        fn probability(warnings: &mut Vec<String>, name: &str, v: f64, fallback: f64) -> f64 {
            if (0.0..=1.0).contains(&v) {
                v
            } else {
                warnings.push(format!("sim.{name}={v} outside [0, 1], using {fallback}"));
                fallback
            }
        }

        fn at_most(warnings: &mut Vec<String>, name: &str, v: usize, limit: usize) -> usize {
            if v > limit {
                warnings.push(format!("sim.{name}={v} exceeds the map, using {limit}"));
                limit
            } else {
                v
            }
        }

        let w = warnings;
        let map_width = positive(w, "map_width", t.map_width, default_map_width());
        let map_height = positive(w, "map_height", t.map_height, default_map_height());
        // A blast never needs to reach past the generated span.
        let reach = map_width.max(map_height.saturating_mul(2));
        SimConfig {
            map_width,
            map_height,
            // The spawn row must be generated empty.
            safe_rows: positive(w, "safe_rows", t.safe_rows, default_safe_rows()),
            bomb_chance: probability(w, "bomb_chance", t.bomb_chance, default_bomb_chance()),
            sweetpotato_chance: probability(
                w, "sweetpotato_chance", t.sweetpotato_chance, default_sweetpotato_chance(),
            ),
            bomb_countdown: t.bomb_countdown,
            bomb_radius: at_most(w, "bomb_radius", t.bomb_radius, reach),
            bomb_activation_radius: at_most(
                w, "bomb_activation_radius", t.bomb_activation_radius, reach,
            ),
            bomb_damage: t.bomb_damage,
            lava_damage: t.lava_damage,
            sweetpotato_heal: t.sweetpotato_heal,
            drill_base_power: positive(w, "drill_base_power", t.drill_base_power, default_one()),
            drill_power_per_level: t.drill_power_per_level,
            max_health: positive(w, "max_health", t.max_health, default_max_health()),
            xp_base: positive(w, "xp_base", t.xp_base, default_xp_base()),
            xp_multiplier: positive(w, "xp_multiplier", t.xp_multiplier, default_xp_multiplier()),
            level_cap: positive(w, "level_cap", t.level_cap, default_level_cap()),
            fall_rows_per_tick: positive(w, "fall_rows_per_tick", t.fall_rows_per_tick, default_fall_rows()),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let mut warnings = Vec::new();
        let toml_cfg = load_toml(&candidate_dirs(), &mut warnings);
        GameConfig::from_parsed(toml_cfg, warnings)
    }

    /// Parse a config document directly. Errors fall back to defaults.
    #[cfg(test)]
    pub fn from_str(text: &str) -> Self {
        let mut warnings = Vec::new();
        let parsed = toml::from_str::<TomlConfig>(text).unwrap_or_else(|e| {
            warnings.push(format!("config.toml parse error: {e}; using default settings"));
            TomlConfig::default()
        });
        GameConfig::from_parsed(parsed, warnings)
    }

    fn from_parsed(toml_cfg: TomlConfig, mut warnings: Vec<String>) -> Self {
        GameConfig {
            sim: SimConfig::from_toml(toml_cfg.sim, &mut warnings),
            timing: TimingConfig {
                tick_rate_ms: toml_cfg.timing.tick_rate_ms.max(1),
                hop_ms: toml_cfg.timing.hop_ms,
                blink_ms: toml_cfg.timing.blink_ms.max(1),
            },
            gamepad: GamepadConfig {
                confirm: toml_cfg.gamepad.confirm,
                pause: toml_cfg.gamepad.pause,
                restart: toml_cfg.gamepad.restart,
            },
            seed: toml_cfg.general.seed,
            log_file: toml_cfg.general.log_file
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            warnings,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() { continue; }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warnings.push(format!("{} parse error: {e}; using default settings", path.display()));
                    return TomlConfig::default();
                }
            },
            Err(e) => {
                warnings.push(format!("could not read {}: {e}", path.display()));
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::from_str("");
        assert_eq!(cfg.sim, SimConfig::default());
        assert_eq!(cfg.sim.map_width, 10);
        assert_eq!(cfg.sim.map_height, 20);
        assert_eq!(cfg.timing.tick_rate_ms, 500);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.log_file, Some(PathBuf::from("kosooni.log")));
        assert!(cfg.warnings.is_empty());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = GameConfig::from_str(
            "[sim]\nbomb_radius = 1\n[general]\nseed = 42\n",
        );
        assert_eq!(cfg.sim.bomb_radius, 1);
        assert_eq!(cfg.sim.bomb_countdown, 3);
        assert_eq!(cfg.seed, Some(42));
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = GameConfig::from_str(
            "[sim]\nmap_width = 0\nbomb_chance = 1.5\nxp_multiplier = 0\n",
        );
        assert_eq!(cfg.sim.map_width, 10);
        assert_eq!(cfg.sim.bomb_chance, 0.05);
        assert_eq!(cfg.sim.xp_multiplier, 2);
        assert_eq!(cfg.warnings.len(), 3);
    }

    #[test]
    fn zero_safe_rows_keeps_spawn_clear() {
        let cfg = GameConfig::from_str("[sim]\nsafe_rows = 0\n");
        assert_eq!(cfg.sim.safe_rows, 2);
        assert_eq!(cfg.warnings.len(), 1);

        let mut rng = rand_pcg::Pcg32::seed_from_u64(1);
        let s = crate::sim::step::Snapshot::new_game(&mut rng, &cfg.sim);
        let (x, y) = (s.player.x, s.player.y);
        assert!(s.map.get(x, y).is_some_and(|t| t.is_passable()));
    }

    #[test]
    fn huge_bomb_radii_are_capped_to_the_map() {
        let cfg = GameConfig::from_str(
            "[sim]\nmap_width = 8\nmap_height = 6\nbomb_radius = 4611686018427387904\nbomb_activation_radius = 13\n",
        );
        assert_eq!(cfg.sim.bomb_radius, 12);
        assert_eq!(cfg.sim.bomb_activation_radius, 12);
        assert_eq!(cfg.warnings.len(), 2);
    }

    #[test]
    fn radii_within_the_map_are_kept() {
        let cfg = GameConfig::from_str("[sim]\nbomb_radius = 5\nbomb_activation_radius = 40\n");
        assert_eq!(cfg.sim.bomb_radius, 5);
        assert_eq!(cfg.sim.bomb_activation_radius, 40);
        assert!(cfg.warnings.is_empty());
    }

    #[test]
    fn malformed_document_gives_defaults() {
        let cfg = GameConfig::from_str("[sim\nmap_width = ");
        assert_eq!(cfg.sim, SimConfig::default());
        assert_eq!(cfg.warnings.len(), 1);
    }

    #[test]
    fn empty_log_file_disables_file_logging() {
        let cfg = GameConfig::from_str("[general]\nlog_file = \"\"\n");
        assert!(cfg.log_file.is_none());
    }
}
