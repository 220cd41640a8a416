#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tower combat: attack strategies, the damage resolver, deferred effects
//! and armed mines.
//!
//! [`Combat::update`] runs once per simulation tick after the wave system
//! has moved monsters. It first drains deferred tasks that came due, then
//! checks mines, then lets every artifact run its attack strategy.

mod damage;
mod schedule;
mod strategies;
mod targeting;
mod traps;

use std::{collections::BTreeMap, time::Duration};

use artifact_defence_core::{CombatConfig, Event, MonsterId, PathProvider, Tower, TowerId};
use artifact_defence_system_waves::Waves;
use glam::DVec2;
use rand::RngCore;

use crate::{schedule::Scheduler, traps::TrapField};

pub use strategies::can_fire;

/// Scaled clock reading for one combat update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTime {
    /// Scaled time since the simulation started.
    pub now: Duration,
    /// Scaled time covered by this update.
    pub dt: Duration,
}

/// Last satellite strike per monster and tower.
pub(crate) type OrbitHits = BTreeMap<(MonsterId, TowerId), Duration>;

/// Everything a strategy may touch while resolving attacks.
pub(crate) struct CombatContext<'a> {
    pub(crate) now: Duration,
    pub(crate) dt: Duration,
    pub(crate) waves: &'a mut Waves,
    pub(crate) path: &'a dyn PathProvider,
    pub(crate) rng: &'a mut dyn RngCore,
    pub(crate) scheduler: &'a mut Scheduler,
    pub(crate) traps: &'a mut TrapField,
    pub(crate) orbit_hits: &'a mut OrbitHits,
    pub(crate) config: &'a CombatConfig,
    pub(crate) events: &'a mut Vec<Event>,
}

/// Combat system state shared by every tower.
#[derive(Debug)]
pub struct Combat {
    config: CombatConfig,
    scheduler: Scheduler,
    traps: TrapField,
    orbit_hits: OrbitHits,
}

impl Combat {
    /// Creates a combat system with empty queues.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        Self {
            config,
            scheduler: Scheduler::default(),
            traps: TrapField::default(),
            orbit_hits: OrbitHits::new(),
        }
    }

    /// Combat constants in use.
    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Resolves one tick of combat.
    pub fn update(
        &mut self,
        time: FrameTime,
        towers: &mut BTreeMap<TowerId, Tower>,
        waves: &mut Waves,
        path: &dyn PathProvider,
        rng: &mut dyn RngCore,
        out: &mut Vec<Event>,
    ) {
        self.orbit_hits
            .retain(|(monster, _), _| waves.monster(*monster).is_some());

        let mut ctx = CombatContext {
            now: time.now,
            dt: time.dt,
            waves,
            path,
            rng,
            scheduler: &mut self.scheduler,
            traps: &mut self.traps,
            orbit_hits: &mut self.orbit_hits,
            config: &self.config,
            events: out,
        };

        schedule::drain_due(towers, &mut ctx);
        traps::update(towers, &mut ctx);

        for tower in towers.values_mut() {
            if !tower.is_artifact() {
                continue;
            }
            strategies::strategy_for(tower.stats().attack_type).update(tower, &mut ctx);
        }

        schedule::drain_due(towers, &mut ctx);
    }

    /// Releases strategy state tied to a tower that leaves the grid.
    ///
    /// Armed mines and satellite cooldowns of the tower are discarded.
    /// Deferred tasks stay queued and become no-ops once they run.
    pub fn remove_tower(&mut self, tower: &mut Tower) {
        let id = tower.id();
        strategies::strategy_for(tower.stats().attack_type).cleanup(tower);
        let removed = self.traps.remove_tower(id);
        self.orbit_hits.retain(|(_, owner), _| *owner != id);
        tracing::debug!(tower = id.get(), mines = removed, "combat state released");
    }

    /// Number of deferred tasks waiting to run.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Positions of every armed mine.
    pub fn mines(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.traps.positions()
    }
}
