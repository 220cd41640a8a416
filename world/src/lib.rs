#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Artifact Defence.
//!
//! The world owns the placement grid, the placed pieces, the wave system and
//! the combat resolver. Every mutation flows through [`apply`]; read access
//! goes through the [`query`] module.

use std::time::Duration;

use artifact_defence_core::{
    Catalog, CellCoord, Command, ConfigError, Event, PathProvider, PlacementError, RemovalError,
    Shape, SimulationConfig, SquareLoop, TemplateId, Tower, TowerId,
};
use artifact_defence_system_combat::{Combat, FrameTime};
use artifact_defence_system_synergy::SynergyEngine;
use artifact_defence_system_waves::Waves;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod grid;
mod towers;

use grid::OccupancyGrid;
use towers::TowerRegistry;

/// Represents the authoritative Artifact Defence world state.
#[derive(Debug)]
pub struct World {
    config: SimulationConfig,
    catalog: Catalog,
    path: Box<dyn PathProvider>,
    occupancy: OccupancyGrid,
    towers: TowerRegistry,
    synergy: SynergyEngine,
    active_combos: Vec<String>,
    waves: Waves,
    combat: Combat,
    rng: ChaCha8Rng,
    clock: Duration,
    time_scale: f64,
    overrun: bool,
}

impl World {
    /// Creates a world with the default configuration and built-in catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::build(SimulationConfig::default(), Catalog::default())
    }

    /// Creates a world from explicit configuration and shop content.
    pub fn from_config(config: SimulationConfig, catalog: Catalog) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, catalog))
    }

    fn build(config: SimulationConfig, catalog: Catalog) -> Self {
        let path = Box::new(SquareLoop::from_config(&config.path));
        let waves = Waves::new(
            config.difficulty.clone(),
            &config.game,
            catalog.archetypes().to_vec(),
        );
        tracing::debug!(
            seed = config.seed,
            columns = config.grid.columns,
            rows = config.grid.rows,
            "world created"
        );
        Self {
            occupancy: OccupancyGrid::new(config.grid.columns, config.grid.rows),
            towers: TowerRegistry::new(),
            synergy: SynergyEngine::default(),
            active_combos: Vec::new(),
            combat: Combat::new(config.combat.clone()),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            clock: Duration::ZERO,
            time_scale: 1.0,
            overrun: false,
            waves,
            path,
            catalog,
            config,
        }
    }

    fn place_tower(&mut self, template: TemplateId, origin: CellCoord, out_events: &mut Vec<Event>) {
        let Some(blueprint) = self.catalog.template(&template) else {
            tracing::debug!(template = template.as_str(), "placement rejected: unknown template");
            out_events.push(Event::TowerPlacementRejected {
                template,
                origin,
                reason: PlacementError::UnknownTemplate,
            });
            return;
        };

        if let Err(reason) = self.occupancy.can_place_shape(&blueprint.shape, origin, None) {
            tracing::debug!(template = template.as_str(), ?origin, ?reason, "placement rejected");
            out_events.push(Event::TowerPlacementRejected {
                template,
                origin,
                reason,
            });
            return;
        }

        let id = self.towers.allocate();
        let tower = Tower::new(id, blueprint.clone(), origin, &self.config.grid);
        self.occupancy.occupy(id, tower.footprint());
        self.towers.insert(tower);
        tracing::debug!(tower = id.get(), template = template.as_str(), ?origin, "piece placed");
        out_events.push(Event::TowerPlaced {
            tower: id,
            template,
            origin,
        });
        self.refresh_synergies(out_events);
    }

    fn remove_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let Some(mut removed) = self.towers.remove(tower) else {
            out_events.push(Event::TowerRemovalRejected {
                tower,
                reason: RemovalError::MissingTower,
            });
            return;
        };

        self.occupancy.vacate(removed.footprint());
        self.combat.remove_tower(&mut removed);
        tracing::debug!(tower = tower.get(), "piece removed");
        out_events.push(Event::TowerRemoved { tower });
        self.refresh_synergies(out_events);
    }

    fn rotate_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let Some((origin, shape)) = self
            .towers
            .get(tower)
            .map(|placed| (placed.origin(), placed.shape().rotated_clockwise()))
        else {
            out_events.push(Event::TowerRotationRejected {
                tower,
                reason: PlacementError::MissingTower,
            });
            return;
        };

        if let Err(reason) = self.occupancy.can_place_shape(&shape, origin, Some(tower)) {
            tracing::debug!(tower = tower.get(), ?reason, "rotation rejected");
            out_events.push(Event::TowerRotationRejected { tower, reason });
            return;
        }

        self.relocate(tower, origin, shape);
        out_events.push(Event::TowerRotated { tower });
        self.refresh_synergies(out_events);
    }

    fn move_tower(&mut self, tower: TowerId, origin: CellCoord, out_events: &mut Vec<Event>) {
        let Some((from, shape)) = self
            .towers
            .get(tower)
            .map(|placed| (placed.origin(), placed.shape().clone()))
        else {
            out_events.push(Event::TowerMoveRejected {
                tower,
                origin,
                reason: PlacementError::MissingTower,
            });
            return;
        };

        if let Err(reason) = self.occupancy.can_place_shape(&shape, origin, Some(tower)) {
            tracing::debug!(tower = tower.get(), ?origin, ?reason, "move rejected");
            out_events.push(Event::TowerMoveRejected {
                tower,
                origin,
                reason,
            });
            return;
        }

        self.relocate(tower, origin, shape);
        out_events.push(Event::TowerMoved {
            tower,
            from,
            to: origin,
        });
        self.refresh_synergies(out_events);
    }

    fn relocate(&mut self, tower: TowerId, origin: CellCoord, shape: Shape) {
        let Some(placed) = self.towers.get_mut(tower) else {
            return;
        };
        self.occupancy.vacate(placed.footprint());
        placed.relocate(origin, shape, &self.config.grid);
        self.occupancy.occupy(tower, placed.footprint());
    }

    fn refresh_synergies(&mut self, out_events: &mut Vec<Event>) {
        let report = self.synergy.recompute(self.towers.iter_mut());
        self.active_combos = report.active_combos;
        out_events.push(Event::HudUpdated {
            dps: self.dps(),
            combos: self.active_combos.clone(),
        });
    }

    fn dps(&self) -> f64 {
        self.towers
            .iter()
            .filter(|tower| tower.is_artifact() && tower.runtime.fire_rate > 0.0)
            .map(|tower| tower.runtime.atk * 1_000.0 / tower.runtime.fire_rate)
            .sum()
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.overrun {
            return;
        }

        let scaled = scale_duration(dt, self.time_scale);
        self.clock = self.clock.saturating_add(scaled);
        out_events.push(Event::TimeAdvanced { dt: scaled });

        self.waves
            .advance(scaled, self.path.as_ref(), &mut self.rng, out_events);
        self.combat.update(
            FrameTime {
                now: self.clock,
                dt: scaled,
            },
            self.towers.entries_mut(),
            &mut self.waves,
            self.path.as_ref(),
            &mut self.rng,
            out_events,
        );

        let count = self.waves.count();
        let cap = self.config.game.max_monsters;
        if count > cap {
            self.overrun = true;
            tracing::warn!(count, cap, "active monster cap exceeded");
            out_events.push(Event::MonsterCapExceeded { count, cap });
        }
    }

    fn set_time_scale(&mut self, factor: f64, out_events: &mut Vec<Event>) {
        if !factor.is_finite() || factor <= 0.0 {
            tracing::debug!(factor, "time scale rejected");
            return;
        }
        self.time_scale = factor;
        tracing::debug!(factor, "time scale changed");
        out_events.push(Event::TimeScaleChanged { factor });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn scale_duration(dt: Duration, factor: f64) -> Duration {
    Duration::try_from_secs_f64(dt.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceTower { template, origin } => world.place_tower(template, origin, out_events),
        Command::RemoveTower { tower } => world.remove_tower(tower, out_events),
        Command::RotateTower { tower } => world.rotate_tower(tower, out_events),
        Command::MoveTower { tower, origin } => world.move_tower(tower, origin, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SetTimeScale { factor } => world.set_time_scale(factor, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use artifact_defence_core::{Catalog, CellCoord, SimulationConfig, Tower, TowerId};
    use artifact_defence_system_waves::Monster;
    use glam::DVec2;

    use super::World;

    /// Configuration the world was built from.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }

    /// Shop content available for placement.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        &world.catalog
    }

    /// Iterates placed pieces ordered by identifier.
    pub fn towers(world: &World) -> impl Iterator<Item = &Tower> + '_ {
        world.towers.iter()
    }

    /// Looks up a placed piece.
    #[must_use]
    pub fn tower(world: &World, tower: TowerId) -> Option<&Tower> {
        world.towers.get(tower)
    }

    /// Piece covering the provided cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world.occupancy.occupant(cell)
    }

    /// Number of grid cells covered by pieces.
    #[must_use]
    pub fn occupied_cells(world: &World) -> usize {
        world.occupancy.occupied_cells()
    }

    /// Iterates live monsters ordered by identifier.
    pub fn monsters(world: &World) -> impl Iterator<Item = &Monster> + '_ {
        world.waves.monsters()
    }

    /// Number of live monsters.
    #[must_use]
    pub fn monster_count(world: &World) -> usize {
        world.waves.count()
    }

    /// Names of the synergies active after the last recompute.
    #[must_use]
    pub fn active_combos(world: &World) -> &[String] {
        &world.active_combos
    }

    /// Sum of per-artifact damage per second.
    #[must_use]
    pub fn dps(world: &World) -> f64 {
        world.dps()
    }

    /// Scaled simulation time.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Multiplier applied to every tick.
    #[must_use]
    pub fn time_scale(world: &World) -> f64 {
        world.time_scale
    }

    /// Current difficulty multiplier.
    #[must_use]
    pub fn difficulty(world: &World) -> f64 {
        world.waves.difficulty()
    }

    /// Reports whether the monster cap was exceeded and ticks are ignored.
    #[must_use]
    pub fn is_overrun(world: &World) -> bool {
        world.overrun
    }

    /// Positions of armed mines.
    pub fn mines(world: &World) -> impl Iterator<Item = DVec2> + '_ {
        world.combat.mines()
    }

    /// Deferred chain links, ricochets and bomb impacts awaiting their time.
    #[must_use]
    pub fn pending_tasks(world: &World) -> usize {
        world.combat.pending_tasks()
    }
}
