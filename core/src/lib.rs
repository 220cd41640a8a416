#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Artifact Defence combat engine.
//!
//! This crate defines the message surface that connects the authoritative
//! world with the pure systems. Callers submit [`Command`] values describing
//! desired mutations, the world executes those commands via its `apply` entry
//! point, and then broadcasts [`Event`] values that a render or UI layer may
//! consume. The core never reads anything back from that layer.

use std::time::Duration;

use glam::DVec2;
use serde::{Deserialize, Serialize};

mod catalog;
mod config;
mod path;
mod shape;
mod synergy;
mod tower;

pub use catalog::{Catalog, MonsterArchetype};
pub use config::{
    CombatConfig, ConfigError, DifficultyConfig, GameConfig, GridConfig, PathConfig,
    SimulationConfig,
};
pub use path::{PathProvider, SquareLoop};
pub use shape::{Footprint, Shape, ShapeError};
pub use synergy::{default_synergies, SynergyDefinition, SynergyEffect, SynergyKey};
pub use tower::{
    AttackType, BuffKind, DebuffKind, DebuffTemplate, Element, FiringState, PieceKind, Role,
    TabletBuff, Tower, TowerRuntime, TowerStats, TowerTemplate,
};

/// Converts a millisecond quantity from template data into a [`Duration`].
///
/// Negative and non-finite inputs collapse to zero so timers never observe
/// undefined delays.
#[must_use]
pub fn duration_from_millis(millis: f64) -> Duration {
    if !millis.is_finite() || millis <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(millis / 1_000.0).unwrap_or(Duration::MAX)
}

/// Expresses a [`Duration`] as fractional milliseconds.
#[must_use]
pub fn millis_of(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests placement of a new piece built from a catalog template.
    PlaceTower {
        /// Catalog identifier of the template to instantiate.
        template: TemplateId,
        /// Upper-left cell of the piece's bounding box.
        origin: CellCoord,
    },
    /// Requests removal of an existing piece from the grid.
    RemoveTower {
        /// Identifier of the piece targeted for removal.
        tower: TowerId,
    },
    /// Requests a clockwise rotation of a placed piece around its origin.
    RotateTower {
        /// Identifier of the piece to rotate.
        tower: TowerId,
    },
    /// Requests that a placed piece be moved to a new origin cell.
    MoveTower {
        /// Identifier of the piece to move.
        tower: TowerId,
        /// Proposed upper-left cell of the piece's bounding box.
        origin: CellCoord,
    },
    /// Advances the simulation by the provided unscaled delta time.
    Tick {
        /// Wall-clock duration that elapsed since the previous tick.
        dt: Duration,
    },
    /// Rescales every simulation timer by the provided factor.
    SetTimeScale {
        /// Multiplier applied to each subsequent tick delta.
        factor: f64,
    },
}

/// Events broadcast by the world after processing commands.
///
/// Events are fire-and-forget notifications for a render or UI sink.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the scaled simulation clock advanced.
    TimeAdvanced {
        /// Scaled duration that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the time scale changed.
    TimeScaleChanged {
        /// Multiplier now applied to tick deltas.
        factor: f64,
    },
    /// Confirms that a piece was placed onto the grid.
    TowerPlaced {
        /// Identifier assigned to the piece by the world.
        tower: TowerId,
        /// Template the piece was built from.
        template: TemplateId,
        /// Upper-left cell of the piece's bounding box.
        origin: CellCoord,
    },
    /// Confirms that a piece was removed from the grid.
    TowerRemoved {
        /// Identifier of the removed piece.
        tower: TowerId,
    },
    /// Confirms that a piece rotated clockwise in place.
    TowerRotated {
        /// Identifier of the rotated piece.
        tower: TowerId,
    },
    /// Confirms that a piece moved to a new origin.
    TowerMoved {
        /// Identifier of the moved piece.
        tower: TowerId,
        /// Origin before the move.
        from: CellCoord,
        /// Origin after the move.
        to: CellCoord,
    },
    /// Reports that a placement request was refused.
    TowerPlacementRejected {
        /// Template requested for placement.
        template: TemplateId,
        /// Origin provided in the request.
        origin: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a rotation request was refused.
    TowerRotationRejected {
        /// Identifier of the piece targeted for rotation.
        tower: TowerId,
        /// Specific reason the rotation failed.
        reason: PlacementError,
    },
    /// Reports that a move request was refused.
    TowerMoveRejected {
        /// Identifier of the piece targeted for the move.
        tower: TowerId,
        /// Origin provided in the request.
        origin: CellCoord,
        /// Specific reason the move failed.
        reason: PlacementError,
    },
    /// Reports that a removal request was refused.
    TowerRemovalRejected {
        /// Identifier of the piece targeted for removal.
        tower: TowerId,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Publishes aggregate tower statistics after a synergy recompute.
    HudUpdated {
        /// Sum of per-artifact damage per second.
        dps: f64,
        /// Names of the synergies active on the board, each listed once.
        combos: Vec<String>,
    },
    /// Confirms that a monster entered the path.
    MonsterSpawned {
        /// Identifier assigned to the monster.
        monster: MonsterId,
        /// Archetype the monster was drawn from.
        archetype: String,
        /// Hit points granted at spawn time.
        hp: f64,
    },
    /// Reports the number of monsters currently alive.
    MonsterCountChanged {
        /// Active monster count.
        count: usize,
    },
    /// Publishes difficulty telemetry for the current tick.
    DifficultyUpdated {
        /// Current difficulty multiplier.
        difficulty: f64,
        /// Spawn interval implied by the difficulty.
        spawn_interval: Duration,
        /// Scaled time elapsed since the simulation started.
        elapsed: Duration,
    },
    /// Reports damage applied to a monster.
    DamageDealt {
        /// Monster that took the damage.
        monster: MonsterId,
        /// Amount of hit points removed.
        amount: f64,
        /// Indicates whether the hit was a critical strike.
        crit: bool,
        /// World position of the monster when hit.
        position: DVec2,
    },
    /// Marks a hit that received the execute bonus.
    ExecuteTriggered {
        /// Monster that was executed.
        monster: MonsterId,
        /// World position of the monster when hit.
        position: DVec2,
    },
    /// Confirms that a monster died.
    MonsterKilled {
        /// Identifier of the slain monster.
        monster: MonsterId,
        /// Gold granted for the kill.
        reward: u32,
    },
    /// Grants gold to the player.
    GoldAwarded {
        /// Amount of gold granted.
        amount: u32,
    },
    /// Reports an area explosion.
    Explosion {
        /// World position of the blast centre.
        center: DVec2,
        /// Blast radius in world units.
        radius: f64,
    },
    /// Reports that a trap tower armed a mine.
    TrapArmed {
        /// Tower that laid the mine.
        tower: TowerId,
        /// World position of the mine.
        position: DVec2,
    },
    /// Announces that the active monster count exceeded the configured cap.
    MonsterCapExceeded {
        /// Active monster count at the moment of overrun.
        count: usize,
        /// Configured cap.
        cap: usize,
    },
}

/// Unique identifier assigned to a placed piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(u32);

impl MonsterId {
    /// Creates a new monster identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Catalog key naming a tower or tablet template.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    /// Creates a template identifier from the provided string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Reasons a placement, rotation or move request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested footprint extends beyond the grid bounds.
    OutOfBounds,
    /// The requested footprint overlaps a cell held by another piece.
    Occupied,
    /// The catalog holds no template with the requested identifier.
    UnknownTemplate,
    /// No piece with the provided identifier exists.
    MissingTower,
}

/// Reasons a removal request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// No piece with the provided identifier exists.
    MissingTower,
}

#[cfg(test)]
mod tests {
    use super::{duration_from_millis, millis_of, CellCoord, MonsterId, PlacementError, TowerId};
    use serde::{de::DeserializeOwned, Serialize};
    use std::time::Duration;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&TowerId::new(42));
        assert_round_trip(&MonsterId::new(7));
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::Occupied);
    }

    #[test]
    fn millisecond_conversion_clamps_invalid_input() {
        assert_eq!(duration_from_millis(-5.0), Duration::ZERO);
        assert_eq!(duration_from_millis(f64::NAN), Duration::ZERO);
        assert_eq!(duration_from_millis(1_500.0), Duration::from_millis(1_500));
        assert!((millis_of(Duration::from_millis(250)) - 250.0).abs() < 1e-9);
    }
}
