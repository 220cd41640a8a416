//! Tuning knobs for the simulation, loadable from TOML.

use std::time::Duration;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{duration_from_millis, CellCoord, Footprint};

/// Errors raised while loading configuration or catalog data.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed into the expected structure.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// Two templates shared the same identifier.
    #[error("template `{0}` is defined more than once")]
    DuplicateTemplate(String),
    /// The catalog provides no monster archetypes to spawn.
    #[error("catalog must define at least one monster archetype")]
    NoArchetypes,
    /// Archetype weights cannot drive a weighted draw.
    #[error("monster archetype weights must be finite, non-negative and not all zero")]
    InvalidWeights,
    /// The grid has no cells.
    #[error("grid must contain at least one column and one row")]
    EmptyGrid,
    /// The monster path has no length.
    #[error("path side length must be positive, got {0}")]
    DegeneratePath(f64),
}

/// Constants shared by the damage resolver and attack strategies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Fraction of a hit dealt by each laser tick.
    pub laser_damage_mult: f64,
    /// Critical damage multiplier used when a template sets none.
    pub crit_damage_mult: f64,
    /// Damage multiplier against vulnerable monsters.
    pub vulnerable_mult: f64,
    /// Radius searched for the next chain link.
    pub chain_jump_range: f64,
    /// Delay between chain links.
    pub chain_jump_delay_ms: f64,
    /// Bomb radius used when a template sets none.
    pub bomb_radius: f64,
    /// Mine radius used when a template sets none.
    pub trap_radius: f64,
    /// Flight time of a bomb.
    pub bomb_flight_ms: f64,
    /// Flight time of a random bomb.
    pub random_bomb_flight_ms: f64,
    /// Radius searched for the next ricochet bounce.
    pub ricochet_range: f64,
    /// Ricochet projectile speed in world units per second.
    pub ricochet_speed: f64,
    /// Shortest ricochet flight.
    pub ricochet_min_flight_ms: f64,
    /// Radius searched for pierce victims.
    pub pierce_range: f64,
    /// Largest angular deviation from the attack ray a pierce victim may have.
    pub pierce_angle_tolerance: f64,
    /// Fraction of the hit dealt to each pierce victim.
    pub pierce_damage_mult: f64,
    /// Distance plasma explosions push monsters back along the path.
    pub knockback_force: f64,
    /// Radius within which a satellite strikes a monster.
    pub orbit_hit_radius: f64,
    /// Radius within which a monster detonates a mine.
    pub mine_trigger_radius: f64,
    /// Random path points sampled when placing mines and random bombs.
    pub placement_samples: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            laser_damage_mult: 0.1,
            crit_damage_mult: 2.0,
            vulnerable_mult: 1.5,
            chain_jump_range: 200.0,
            chain_jump_delay_ms: 100.0,
            bomb_radius: 150.0,
            trap_radius: 120.0,
            bomb_flight_ms: 400.0,
            random_bomb_flight_ms: 600.0,
            ricochet_range: 250.0,
            ricochet_speed: 600.0,
            ricochet_min_flight_ms: 100.0,
            pierce_range: 150.0,
            pierce_angle_tolerance: 0.5,
            pierce_damage_mult: 0.5,
            knockback_force: 20.0,
            orbit_hit_radius: 25.0,
            mine_trigger_radius: 30.0,
            placement_samples: 10,
        }
    }
}

impl CombatConfig {
    /// Delay between chain links.
    #[must_use]
    pub fn chain_jump_delay(&self) -> Duration {
        duration_from_millis(self.chain_jump_delay_ms)
    }

    /// Flight time of a bomb.
    #[must_use]
    pub fn bomb_flight(&self) -> Duration {
        duration_from_millis(self.bomb_flight_ms)
    }

    /// Flight time of a random bomb.
    #[must_use]
    pub fn random_bomb_flight(&self) -> Duration {
        duration_from_millis(self.random_bomb_flight_ms)
    }

    /// Flight time of a ricochet projectile covering `distance`.
    #[must_use]
    pub fn ricochet_flight(&self, distance: f64) -> Duration {
        let travel = if self.ricochet_speed > 0.0 {
            distance / self.ricochet_speed * 1_000.0
        } else {
            0.0
        };
        duration_from_millis(travel.max(self.ricochet_min_flight_ms))
    }
}

/// Time-based difficulty curve and spawn cadence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Difficulty gained per game minute.
    pub hp_per_minute_rate: f64,
    /// Spawn interval at difficulty one.
    pub base_spawn_interval_ms: f64,
    /// Floor of the spawn interval.
    pub min_spawn_interval_ms: f64,
    /// How strongly difficulty compresses the spawn interval.
    pub spawn_decay_factor: f64,
    /// Length of a game minute.
    pub game_minute_ms: f64,
    /// Delay before the first spawn.
    pub initial_spawn_delay_ms: f64,
    /// Relative spread applied to each spawned monster's speed.
    pub speed_jitter: f64,
    /// How strongly difficulty scales the kill reward.
    pub reward_difficulty_weight: f64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            hp_per_minute_rate: 0.8,
            base_spawn_interval_ms: 2_500.0,
            min_spawn_interval_ms: 400.0,
            spawn_decay_factor: 0.6,
            game_minute_ms: 60_000.0,
            initial_spawn_delay_ms: 2_000.0,
            speed_jitter: 0.05,
            reward_difficulty_weight: 0.5,
        }
    }
}

/// Session-wide limits and rewards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Active monster count above which the run is overrun.
    pub max_monsters: usize,
    /// Gold granted per kill at difficulty one.
    pub monster_reward: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_monsters: 150,
            monster_reward: 10,
        }
    }
}

/// Board dimensions and the mapping from cells to world positions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
    /// Side length of one cell in world units.
    pub slot_size: f64,
    /// World position of the upper-left corner of the board.
    pub origin: DVec2,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 7,
            rows: 7,
            slot_size: 70.0,
            origin: DVec2::new(80.0, 80.0),
        }
    }
}

impl GridConfig {
    /// World position of the centre of a cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> DVec2 {
        let half = self.slot_size / 2.0;
        self.origin
            + DVec2::new(
                f64::from(cell.column()) * self.slot_size + half,
                f64::from(cell.row()) * self.slot_size + half,
            )
    }

    /// Average of the centres of the covered cells.
    #[must_use]
    pub fn visual_center(&self, footprint: &Footprint) -> DVec2 {
        if footprint.is_empty() {
            return self.origin;
        }
        let sum: DVec2 = footprint.cells().map(|cell| self.cell_center(cell)).sum();
        sum / footprint.len() as f64
    }
}

/// Geometry of the closed monster path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Side length of the square loop.
    pub side_length: f64,
    /// Centre of the square loop.
    pub center: DVec2,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            side_length: 600.0,
            center: DVec2::new(325.0, 325.0),
        }
    }
}

/// Aggregate configuration consumed by the world.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed of the single random stream.
    pub seed: u64,
    /// Combat constants.
    pub combat: CombatConfig,
    /// Difficulty curve.
    pub difficulty: DifficultyConfig,
    /// Session limits.
    pub game: GameConfig,
    /// Board geometry.
    pub grid: GridConfig,
    /// Monster path geometry.
    pub path: PathConfig,
}

impl SimulationConfig {
    /// Parses a configuration document; omitted fields keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the geometry describes a usable board and path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.columns == 0 || self.grid.rows == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if !(self.path.side_length > 0.0) {
            return Err(ConfigError::DegeneratePath(self.path.side_length));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = SimulationConfig::default();
        assert_eq!(config.combat.chain_jump_range, 200.0);
        assert_eq!(config.difficulty.min_spawn_interval_ms, 400.0);
        assert_eq!(config.game.max_monsters, 150);
        assert_eq!(config.grid.columns, 7);
    }

    #[test]
    fn partial_documents_keep_defaults() {
        let config = SimulationConfig::from_toml_str(
            "seed = 9\n[game]\nmax_monsters = 3\n[combat]\nbomb_radius = 90.0\n",
        )
        .expect("valid document");
        assert_eq!(config.seed, 9);
        assert_eq!(config.game.max_monsters, 3);
        assert_eq!(config.game.monster_reward, 10);
        assert_eq!(config.combat.bomb_radius, 90.0);
        assert_eq!(config.combat.vulnerable_mult, 1.5);
    }

    #[test]
    fn empty_grid_is_rejected() {
        let error = SimulationConfig::from_toml_str("[grid]\ncolumns = 0\n").unwrap_err();
        assert!(matches!(error, ConfigError::EmptyGrid));
    }

    #[test]
    fn malformed_documents_report_parse_errors() {
        let error = SimulationConfig::from_toml_str("seed = \"many\"").unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn cell_centres_follow_slot_size() {
        let grid = GridConfig::default();
        assert_eq!(grid.cell_center(CellCoord::new(0, 0)), DVec2::new(115.0, 115.0));
        assert_eq!(grid.cell_center(CellCoord::new(2, 1)), DVec2::new(255.0, 185.0));
    }

    #[test]
    fn ricochet_flight_has_a_floor() {
        let combat = CombatConfig::default();
        assert_eq!(combat.ricochet_flight(0.0), Duration::from_millis(100));
        assert_eq!(combat.ricochet_flight(300.0), Duration::from_millis(500));
    }
}
