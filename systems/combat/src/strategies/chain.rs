//! Attacks that hop from monster to monster.

use artifact_defence_core::{MonsterId, Tower, TowerId};
use artifact_defence_system_waves::Monster;
use glam::DVec2;

use super::AttackStrategy;
use crate::{damage, schedule::Task, targeting, CombatContext};

/// Lightning that strikes its target, then jumps to the closest monster not
/// yet hit.
#[derive(Debug)]
pub(crate) struct Chain;

impl AttackStrategy for Chain {
    fn fire(&self, tower: &mut Tower, target: MonsterId, _: DVec2, ctx: &mut CombatContext<'_>) {
        let jumps = tower.stats().chain_count;
        if jumps == 0 {
            return;
        }
        link(tower, target, jumps, vec![target], ctx);
    }
}

/// Strikes one link of a chain and schedules the next jump.
pub(crate) fn link(
    tower: &Tower,
    target: MonsterId,
    jumps: u32,
    mut hit_list: Vec<MonsterId>,
    ctx: &mut CombatContext<'_>,
) {
    let Some(position) = ctx.waves.monster(target).map(Monster::position) else {
        return;
    };
    tracing::trace!(tower = tower.id().get(), monster = target.get(), jumps, "chain link");
    let _ = damage::apply_tower_damage(tower, target, 1.0, ctx);

    if jumps <= 1 {
        return;
    }
    let Some(next) = targeting::nearest(ctx.waves, position, ctx.config.chain_jump_range, &hit_list)
    else {
        return;
    };
    hit_list.push(next);
    let run_at = ctx.now.saturating_add(ctx.config.chain_jump_delay());
    ctx.scheduler.schedule(
        run_at,
        Task::ChainLink {
            tower: tower.id(),
            target: next,
            jumps: jumps - 1,
            hit_list,
        },
    );
}

/// Spinning projectile that bounces to the closest monster not yet hit.
#[derive(Debug)]
pub(crate) struct Ricochet;

impl AttackStrategy for Ricochet {
    fn fire(&self, tower: &mut Tower, target: MonsterId, origin: DVec2, ctx: &mut CombatContext<'_>) {
        let bounces = tower.stats().ricochet_count;
        launch(tower.id(), origin, target, bounces, vec![target], ctx);
    }
}

fn launch(
    tower: TowerId,
    from: DVec2,
    target: MonsterId,
    bounces: u32,
    hit_list: Vec<MonsterId>,
    ctx: &mut CombatContext<'_>,
) {
    let Some(position) = ctx.waves.monster(target).map(Monster::position) else {
        return;
    };
    let flight = ctx.config.ricochet_flight(from.distance(position));
    ctx.scheduler.schedule(
        ctx.now.saturating_add(flight),
        Task::RicochetArrival {
            tower,
            target,
            bounces,
            hit_list,
        },
    );
}

/// Resolves a ricochet projectile reaching its target.
///
/// A target that died in flight ends the bounce sequence.
pub(crate) fn ricochet_arrival(
    tower: &Tower,
    target: MonsterId,
    bounces: u32,
    mut hit_list: Vec<MonsterId>,
    ctx: &mut CombatContext<'_>,
) {
    let Some(position) = ctx.waves.monster(target).map(Monster::position) else {
        return;
    };
    let hit = damage::calculate_damage(tower, ctx);
    let _ = damage::apply_damage(tower, target, hit, ctx);

    if bounces == 0 {
        return;
    }
    let Some(next) = targeting::nearest(ctx.waves, position, ctx.config.ricochet_range, &hit_list)
    else {
        return;
    };
    hit_list.push(next);
    launch(tower.id(), position, next, bounces - 1, hit_list, ctx);
}
