//! Stationary mines armed by trap towers.

use std::{collections::BTreeMap, time::Duration};

use artifact_defence_core::{Tower, TowerId};
use glam::DVec2;

use crate::{
    damage::{self, Hit},
    CombatContext,
};

/// Armed mine waiting for a monster to walk over it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Mine {
    pub(crate) tower: TowerId,
    pub(crate) position: DVec2,
    /// Damage rolled when the mine was armed.
    pub(crate) hit: Hit,
    pub(crate) radius: f64,
    pub(crate) armed_at: Duration,
    pub(crate) duration: Duration,
}

/// Every armed mine on the board.
#[derive(Debug, Default)]
pub(crate) struct TrapField {
    mines: Vec<Mine>,
}

impl TrapField {
    pub(crate) fn arm(&mut self, mine: Mine) {
        self.mines.push(mine);
    }

    /// Drops the mines of a tower, returning how many were armed.
    pub(crate) fn remove_tower(&mut self, tower: TowerId) -> usize {
        let before = self.mines.len();
        self.mines.retain(|mine| mine.tower != tower);
        before - self.mines.len()
    }

    pub(crate) fn positions(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.mines.iter().map(|mine| mine.position)
    }
}

/// Expires old mines and detonates the ones a monster walked onto.
///
/// Every mine that leaves the field frees a trap slot on its tower.
pub(crate) fn update(towers: &mut BTreeMap<TowerId, Tower>, ctx: &mut CombatContext<'_>) {
    let mines = std::mem::take(&mut ctx.traps.mines);
    let mut armed = Vec::with_capacity(mines.len());

    for mine in mines {
        let expired = ctx.now.saturating_sub(mine.armed_at) > mine.duration;
        let triggered = !expired
            && ctx.waves.monsters().any(|monster| {
                monster.position().distance(mine.position) < ctx.config.mine_trigger_radius
            });

        if !expired && !triggered {
            armed.push(mine);
            continue;
        }

        if let Some(tower) = towers.get_mut(&mine.tower) {
            if triggered {
                tracing::trace!(tower = mine.tower.get(), "mine triggered");
                damage::create_explosion(tower, mine.position, mine.radius, mine.hit, ctx);
            }
            tower.firing.active_traps = tower.firing.active_traps.saturating_sub(1);
        }
    }

    ctx.traps.mines = armed;
}
