/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::consts::{BASE_TICKS_PER_SECOND, TARGET_FPS};

// ── Public Config Struct ──

#[derive(Clone, Debug, Default)]
pub struct GameConfig {
    pub tuning: Tuning,
}

/// Timing and balance values. Durations are in game ticks unless the
/// field name says frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tuning {
    pub target_fps: u32,
    pub time_adjustment_percent: u32,
    pub initial_lives: u32,
    pub attack_range_h: u32,
    pub attack_range_v: u32,
    pub fygar_fire_range: u32,
    pub fygar_fire_duration: u32,
    pub fygar_fire_cooldown: u32,
    pub rock_wobble_ticks: u32,
    pub rock_blink_count: u32,
    pub rock_blink_duration: u32,
    pub rock_kill_multiplier: u32,
    pub round_start_delay: u32, // frames
    pub level_clear_delay: u32, // frames
    pub respawn_delay: u32,     // frames
}

impl Tuning {
    /// Game ticks per gameplay second (the adjusted clock).
    pub fn ticks_per_second(&self) -> u32 {
        (self.target_fps * self.time_adjustment_percent / 100).max(1)
    }

    /// Frames a direction key must be held before it auto-repeats.
    pub fn hold_threshold(&self) -> u32 {
        (self.ticks_per_second() / 8).max(1)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        TomlGameplay::default().into_tuning(&TomlTiming::default())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error in {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    gameplay: TomlGameplay,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_target_fps")]
    target_fps: u32,
    #[serde(default = "default_time_adjustment")]
    time_adjustment_percent: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGameplay {
    #[serde(default = "default_initial_lives")]
    initial_lives: u32,
    #[serde(default = "default_attack_range_h")]
    attack_range_h: u32,
    #[serde(default = "default_attack_range_v")]
    attack_range_v: u32,
    #[serde(default = "default_fire_range")]
    fygar_fire_range: u32,
    #[serde(default = "default_fire_duration")]
    fygar_fire_duration: u32,
    #[serde(default = "default_fire_cooldown")]
    fygar_fire_cooldown: u32,
    #[serde(default = "default_wobble")]
    rock_wobble_ticks: u32,
    #[serde(default = "default_rock_blink_count")]
    rock_blink_count: u32,
    #[serde(default = "default_rock_blink_duration")]
    rock_blink_duration: u32,
    #[serde(default = "default_rock_kill_multiplier")]
    rock_kill_multiplier: u32,
    #[serde(default = "default_round_start_delay")]
    round_start_delay: u32,
    #[serde(default = "default_level_clear_delay")]
    level_clear_delay: u32,
    #[serde(default = "default_respawn_delay")]
    respawn_delay: u32,
}

// ── Defaults ──

fn default_target_fps() -> u32 { TARGET_FPS }
fn default_time_adjustment() -> u32 { 100 }

fn default_initial_lives() -> u32 { 3 }
fn default_attack_range_h() -> u32 { 4 }
fn default_attack_range_v() -> u32 { 3 }
fn default_fire_range() -> u32 { 2 }
fn default_fire_duration() -> u32 { 30 }   // 0.5s
fn default_fire_cooldown() -> u32 { 180 }  // 3s
fn default_wobble() -> u32 { 30 }
fn default_rock_blink_count() -> u32 { 4 }
fn default_rock_blink_duration() -> u32 { 6 }
fn default_rock_kill_multiplier() -> u32 { 2 }
fn default_round_start_delay() -> u32 { 120 }
fn default_level_clear_delay() -> u32 { 120 }
fn default_respawn_delay() -> u32 { 90 }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            target_fps: default_target_fps(),
            time_adjustment_percent: default_time_adjustment(),
        }
    }
}

impl Default for TomlGameplay {
    fn default() -> Self {
        TomlGameplay {
            initial_lives: default_initial_lives(),
            attack_range_h: default_attack_range_h(),
            attack_range_v: default_attack_range_v(),
            fygar_fire_range: default_fire_range(),
            fygar_fire_duration: default_fire_duration(),
            fygar_fire_cooldown: default_fire_cooldown(),
            rock_wobble_ticks: default_wobble(),
            rock_blink_count: default_rock_blink_count(),
            rock_blink_duration: default_rock_blink_duration(),
            rock_kill_multiplier: default_rock_kill_multiplier(),
            round_start_delay: default_round_start_delay(),
            level_clear_delay: default_level_clear_delay(),
            respawn_delay: default_respawn_delay(),
        }
    }
}

impl TomlGameplay {
    /// Convert to runtime tuning, clamping values that would stall the game.
    fn into_tuning(self, timing: &TomlTiming) -> Tuning {
        Tuning {
            target_fps: timing.target_fps.clamp(1, BASE_TICKS_PER_SECOND),
            time_adjustment_percent: timing.time_adjustment_percent.clamp(10, 1000),
            initial_lives: self.initial_lives.clamp(1, 9),
            attack_range_h: self.attack_range_h.max(1),
            attack_range_v: self.attack_range_v.max(1),
            fygar_fire_range: self.fygar_fire_range.max(1),
            fygar_fire_duration: self.fygar_fire_duration.max(1),
            fygar_fire_cooldown: self.fygar_fire_cooldown,
            rock_wobble_ticks: self.rock_wobble_ticks.max(1),
            rock_blink_count: self.rock_blink_count.max(1),
            rock_blink_duration: self.rock_blink_duration.max(1),
            rock_kill_multiplier: self.rock_kill_multiplier.max(1),
            round_start_delay: self.round_start_delay,
            level_clear_delay: self.level_clear_delay,
            respawn_delay: self.respawn_delay,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = match find_config(&candidate_dirs()) {
            Some(path) => match load_toml(&path) {
                Ok(cfg) => {
                    info!(path = %path.display(), "config_loaded");
                    cfg
                }
                Err(e) => {
                    warn!(error = %e, "config_rejected_using_defaults");
                    TomlConfig::default()
                }
            },
            None => TomlConfig::default(),
        };
        Self::from_toml(toml_cfg)
    }

    /// Parse a config from TOML text (missing keys take defaults).
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(Self::from_toml)
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        GameConfig { tuning: cfg.gameplay.into_tuning(&cfg.timing) }
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

fn find_config(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs.iter().map(|d| d.join("config.toml")).find(|p| p.exists())
}

fn load_toml(path: &Path) -> Result<TomlConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<TomlConfig>(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_derive_clocks() {
        let t = Tuning::default();
        assert_eq!(t.target_fps, 60);
        assert_eq!(t.ticks_per_second(), 60);
        assert_eq!(t.hold_threshold(), 7);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = GameConfig::from_toml_str("[gameplay]\ninitial_lives = 5\n").expect("parse");
        assert_eq!(cfg.tuning.initial_lives, 5);
        assert_eq!(cfg.tuning.fygar_fire_range, 2);
        assert_eq!(cfg.tuning.target_fps, 60);
    }

    #[test]
    fn time_adjustment_scales_game_seconds() {
        let cfg = GameConfig::from_toml_str("[timing]\ntime_adjustment_percent = 50\n").expect("parse");
        assert_eq!(cfg.tuning.ticks_per_second(), 30);
        // frame pacing stays on the raw clock
        assert_eq!(cfg.tuning.target_fps, 60);
    }

    #[test]
    fn zero_values_are_clamped() {
        let cfg = GameConfig::from_toml_str(
            "[timing]\ntarget_fps = 0\n[gameplay]\ninitial_lives = 0\nrock_blink_count = 0\n",
        )
        .expect("parse");
        assert_eq!(cfg.tuning.target_fps, 1);
        assert_eq!(cfg.tuning.initial_lives, 1);
        assert_eq!(cfg.tuning.rock_blink_count, 1);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(GameConfig::from_toml_str("[gameplay\ninitial_lives = ").is_err());
    }

    #[test]
    fn load_toml_reports_missing_file() {
        let err = load_toml(Path::new("/definitely/not/here/config.toml"));
        assert!(matches!(err, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let cfg = GameConfig::from_toml_str(include_str!("../config.toml")).expect("parse");
        assert_eq!(cfg.tuning, Tuning::default());
    }
}
