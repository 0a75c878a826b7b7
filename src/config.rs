use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::ghost::ModeSchedule;

const DEFAULT_TICK_HZ: u32 = 120;
const DEFAULT_RENDER_FPS: u64 = 60;
const CELL_W: usize = 2;

/// Top-level configuration, loaded from an optional TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameTuning,
    pub display: DisplayConfig,
    pub audio: AudioConfig,
    pub high_score_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

/// Simulation knobs. Speeds are in tiles per second, durations in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameTuning {
    pub tick_hz: u32,
    pub player_speed: f32,
    pub ghost_speed: f32,
    pub power_duration: f32,
    pub lives: u32,
    /// Post-death window in which ghost contact cannot cost another life.
    pub death_cooldown: f32,
    /// Squared tile distance under which the player touches a ghost.
    pub collision_radius_sq: f32,
    /// Frightened ghosts wander toward random tiles this close to the player.
    pub wander_radius: i32,
    /// Session countdown; `None` plays until lives or pellets run out.
    pub time_limit: Option<f32>,
    pub schedule: ModeSchedule,
    pub seed: Option<u64>,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            tick_hz: DEFAULT_TICK_HZ,
            player_speed: 6.0,
            ghost_speed: 5.5,
            power_duration: 6.0,
            lives: 3,
            death_cooldown: 1.5,
            collision_radius_sq: 0.25,
            wander_radius: 4,
            time_limit: None,
            schedule: ModeSchedule::default(),
            seed: None,
        }
    }
}

impl GameTuning {
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_hz.max(1) as f32
    }

    /// Replaces values the simulation cannot run with by their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = GameTuning::default();
        if self.tick_hz == 0 {
            self.tick_hz = defaults.tick_hz;
        }
        for (value, fallback) in [
            (&mut self.player_speed, defaults.player_speed),
            (&mut self.ghost_speed, defaults.ghost_speed),
            (&mut self.power_duration, defaults.power_duration),
            (&mut self.collision_radius_sq, defaults.collision_radius_sq),
        ] {
            if !value.is_finite() || *value <= 0.0 {
                *value = fallback;
            }
        }
        if !self.death_cooldown.is_finite() || self.death_cooldown < 0.0 {
            self.death_cooldown = defaults.death_cooldown;
        }
        if self.lives == 0 {
            self.lives = defaults.lives;
        }
        self.wander_radius = self.wander_radius.max(0);
        self.time_limit = self.time_limit.filter(|t| t.is_finite() && *t > 0.0);
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub render_fps: u64,
    /// Terminal columns per maze tile.
    pub cell_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            render_fps: DEFAULT_RENDER_FPS,
            cell_width: CELL_W,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("invalid config")
    }

    /// Reads `path` if given; without a path the defaults are used.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// `PACMAN_FPS` and `PACMAN_TICK_HZ`; zero or unparsable values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(fps) = positive::<u64>(lookup("PACMAN_FPS")) {
            self.display.render_fps = fps;
        }
        if let Some(hz) = positive::<u32>(lookup("PACMAN_TICK_HZ")) {
            self.game.tick_hz = hz;
        }
    }
}

fn positive<T>(raw: Option<String>) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    raw.and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| *v > T::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ghost::Mode;

    #[test]
    fn default_config_values() {
        let cfg = Config::default();
        assert_eq!(cfg.game.tick_hz, 120);
        assert_eq!(cfg.game.power_duration, 6.0);
        assert_eq!(cfg.game.lives, 3);
        assert_eq!(cfg.display.cell_width, 2);
        assert!(cfg.audio.enabled);
        assert!(cfg.high_score_file.is_none());
    }

    #[test]
    fn parse_partial_toml() {
        let cfg = Config::from_toml_str(
            r#"
            log_file = "pacman.log"

            [game]
            lives = 5
            time_limit = 90.0
            schedule = [5.0, 20.0]
            seed = 42

            [audio]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.game.lives, 5);
        assert_eq!(cfg.game.time_limit, Some(90.0));
        assert_eq!(cfg.game.seed, Some(42));
        assert_eq!(cfg.game.schedule.phase_at(6.0), Mode::Chase);
        assert_eq!(cfg.game.schedule.phase_at(25.0), Mode::Scatter);
        assert_eq!(cfg.game.player_speed, 6.0);
        assert!(!cfg.audio.enabled);
        assert_eq!(cfg.log_file.as_deref(), Some(Path::new("pacman.log")));
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(Config::from_toml_str("[game]\nlives = \"many\"").is_err());
    }

    #[test]
    fn env_overrides() {
        let mut cfg = Config::default();
        cfg.apply_overrides_from(|key| match key {
            "PACMAN_FPS" => Some("30".to_string()),
            "PACMAN_TICK_HZ" => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(cfg.display.render_fps, 30);
        assert_eq!(cfg.game.tick_hz, 120);
    }

    #[test]
    fn sanitize_restores_unusable_values() {
        let tuning = GameTuning {
            tick_hz: 0,
            player_speed: -1.0,
            ghost_speed: f32::NAN,
            lives: 0,
            time_limit: Some(-5.0),
            wander_radius: -2,
            ..GameTuning::default()
        }
        .sanitized();
        assert_eq!(tuning.tick_hz, 120);
        assert_eq!(tuning.player_speed, 6.0);
        assert_eq!(tuning.ghost_speed, 5.5);
        assert_eq!(tuning.lives, 3);
        assert_eq!(tuning.time_limit, None);
        assert_eq!(tuning.wander_radius, 0);
    }

    #[test]
    fn dt_matches_tick_rate() {
        let tuning = GameTuning::default();
        assert!((tuning.dt() - 1.0 / 120.0).abs() < 1e-9);
    }
}
