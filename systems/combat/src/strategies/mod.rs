//! Attack strategies keyed by attack type.
//!
//! Every strategy shares the cooldown gate in [`can_fire`] and the default
//! nearest-target flow of [`AttackStrategy::update`]; variants override only
//! the steps they change.

pub(crate) mod area;
pub(crate) mod chain;
pub(crate) mod orbit;
pub(crate) mod ordnance;
pub(crate) mod projectile;

use std::time::Duration;

use artifact_defence_core::{duration_from_millis, AttackType, MonsterId, Tower};
use glam::DVec2;

use crate::{targeting, CombatContext};

/// Reports whether the tower may fire at `now`, completing a pending
/// reload when its delay has elapsed.
///
/// A reloading tower waits for its template's reload time, every other
/// tower for its current fire rate. A reload that completes makes the tower
/// ready on the same tick.
pub fn can_fire(tower: &mut Tower, now: Duration) -> bool {
    let delay = if tower.firing.is_reloading {
        tower.stats().reload_time
    } else {
        tower.runtime.fire_rate
    };
    if now.saturating_sub(tower.firing.last_fire) < duration_from_millis(delay) {
        return false;
    }

    if tower.firing.is_reloading {
        tower.firing.is_reloading = false;
        tower.firing.burst_counter = 0;
    }
    true
}

pub(crate) trait AttackStrategy {
    /// Runs the strategy for one tick.
    fn update(&self, tower: &mut Tower, ctx: &mut CombatContext<'_>) {
        if !can_fire(tower, ctx.now) {
            return;
        }
        let origin = tower.center();
        if let Some(target) = self.find_target(tower, origin, ctx) {
            self.fire(tower, target, origin, ctx);
            self.post_fire(tower, ctx.now);
        }
    }

    fn find_target(
        &self,
        tower: &Tower,
        origin: DVec2,
        ctx: &CombatContext<'_>,
    ) -> Option<MonsterId> {
        targeting::nearest(ctx.waves, origin, tower.runtime.range, &[])
    }

    /// Resolves a shot at `target`. Strategies that override `update`
    /// without targeting keep this no-op.
    fn fire(
        &self,
        _tower: &mut Tower,
        _target: MonsterId,
        _origin: DVec2,
        _ctx: &mut CombatContext<'_>,
    ) {
    }

    fn post_fire(&self, tower: &mut Tower, now: Duration) {
        tower.firing.last_fire = now;
    }

    /// Releases per-tower strategy state when the tower leaves the board.
    fn cleanup(&self, _tower: &mut Tower) {}
}

pub(crate) fn strategy_for(kind: AttackType) -> &'static dyn AttackStrategy {
    match kind {
        AttackType::Normal => &projectile::Projectile,
        AttackType::Rapid => &projectile::Rapid,
        AttackType::Multi => &projectile::Multi,
        AttackType::Chain => &chain::Chain,
        AttackType::Ricochet => &chain::Ricochet,
        AttackType::Laser => &area::Laser,
        AttackType::Nova => &area::Nova,
        AttackType::Beam => &area::Beam,
        AttackType::Orbit => &orbit::Orbit,
        AttackType::Trap => &ordnance::Trap,
        AttackType::Bomb => &ordnance::Bomb,
        AttackType::RandomBomb => &ordnance::RandomBomb,
    }
}
