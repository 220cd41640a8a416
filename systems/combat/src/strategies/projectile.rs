//! Single-target projectiles resolved on the firing tick.

use std::time::Duration;

use artifact_defence_core::{MonsterId, Tower};
use glam::DVec2;

use super::{can_fire, AttackStrategy};
use crate::{damage, targeting, CombatContext};

/// One shot at the nearest monster.
#[derive(Debug)]
pub(crate) struct Projectile;

impl AttackStrategy for Projectile {
    fn fire(&self, tower: &mut Tower, target: MonsterId, _: DVec2, ctx: &mut CombatContext<'_>) {
        tracing::trace!(tower = tower.id().get(), monster = target.get(), "projectile fired");
        let _ = damage::apply_tower_damage(tower, target, 1.0, ctx);
    }
}

/// Bursts of shots followed by a reload.
#[derive(Debug)]
pub(crate) struct Rapid;

impl AttackStrategy for Rapid {
    fn fire(&self, tower: &mut Tower, target: MonsterId, origin: DVec2, ctx: &mut CombatContext<'_>) {
        Projectile.fire(tower, target, origin, ctx);
    }

    fn post_fire(&self, tower: &mut Tower, now: Duration) {
        tower.firing.last_fire = now;
        tower.firing.burst_counter += 1;
        if tower.firing.burst_counter >= tower.stats().burst_count {
            tower.firing.is_reloading = true;
        }
    }
}

/// One shot at each of the closest monsters.
#[derive(Debug)]
pub(crate) struct Multi;

impl AttackStrategy for Multi {
    fn update(&self, tower: &mut Tower, ctx: &mut CombatContext<'_>) {
        if !can_fire(tower, ctx.now) {
            return;
        }
        let origin = tower.center();
        let count = tower.stats().projectile_count as usize;
        let targets = targeting::nearest_many(ctx.waves, origin, tower.runtime.range, count);
        if targets.is_empty() {
            return;
        }
        for target in targets {
            self.fire(tower, target, origin, ctx);
        }
        self.post_fire(tower, ctx.now);
    }

    fn fire(&self, tower: &mut Tower, target: MonsterId, origin: DVec2, ctx: &mut CombatContext<'_>) {
        Projectile.fire(tower, target, origin, ctx);
    }
}
