//! Explosives: lobbed bombs, random bombardment and mines.

use std::f64::consts::TAU;

use artifact_defence_core::{duration_from_millis, Event, MonsterId, Tower};
use artifact_defence_system_waves::Monster;
use glam::DVec2;
use rand::Rng;

use super::{can_fire, AttackStrategy};
use crate::{
    damage::{self, blast_radius},
    schedule::Task,
    targeting,
    traps::Mine,
    CombatContext,
};

/// Bomb lobbed at the nearest monster, exploding on arrival.
#[derive(Debug)]
pub(crate) struct Bomb;

impl AttackStrategy for Bomb {
    fn fire(&self, tower: &mut Tower, target: MonsterId, _: DVec2, ctx: &mut CombatContext<'_>) {
        let Some(fallback) = ctx.waves.monster(target).map(Monster::position) else {
            return;
        };
        let run_at = ctx.now.saturating_add(ctx.config.bomb_flight());
        ctx.scheduler.schedule(
            run_at,
            Task::BombImpact {
                tower: tower.id(),
                target,
                fallback,
            },
        );
    }
}

/// Explodes a bomb on its target, or where the target stood when the bomb
/// was thrown if it died in flight.
pub(crate) fn bomb_impact(
    tower: &Tower,
    target: MonsterId,
    fallback: DVec2,
    ctx: &mut CombatContext<'_>,
) {
    let point = ctx
        .waves
        .monster(target)
        .map_or(fallback, Monster::position);
    let hit = damage::calculate_damage(tower, ctx);
    let radius = blast_radius(tower, ctx.config.bomb_radius);
    damage::create_explosion(tower, point, radius, hit, ctx);
}

/// Bomb dropped on a random stretch of path within range.
#[derive(Debug)]
pub(crate) struct RandomBomb;

impl AttackStrategy for RandomBomb {
    fn update(&self, tower: &mut Tower, ctx: &mut CombatContext<'_>) {
        if !can_fire(tower, ctx.now) {
            return;
        }
        let origin = tower.center();
        let range = tower.runtime.range;
        let point = match targeting::sample_path_point(origin, range, ctx) {
            Some(point) => point,
            None => {
                let distance = ctx.rng.gen::<f64>().sqrt() * range;
                let theta = ctx.rng.gen::<f64>() * TAU;
                origin + DVec2::new(theta.cos(), theta.sin()) * distance
            }
        };

        let run_at = ctx.now.saturating_add(ctx.config.random_bomb_flight());
        ctx.scheduler.schedule(
            run_at,
            Task::RandomBombImpact {
                tower: tower.id(),
                point,
            },
        );
        self.post_fire(tower, ctx.now);
    }
}

pub(crate) fn random_bomb_impact(tower: &Tower, point: DVec2, ctx: &mut CombatContext<'_>) {
    let hit = damage::calculate_damage(tower, ctx);
    let radius = blast_radius(tower, ctx.config.bomb_radius);
    damage::create_explosion(tower, point, radius, hit, ctx);
}

/// Mines laid on the path near the tower.
#[derive(Debug)]
pub(crate) struct Trap;

impl AttackStrategy for Trap {
    fn update(&self, tower: &mut Tower, ctx: &mut CombatContext<'_>) {
        if !can_fire(tower, ctx.now) {
            return;
        }
        if tower.firing.active_traps >= tower.stats().max_traps {
            return;
        }
        let Some(position) = targeting::sample_path_point(tower.center(), tower.runtime.range, ctx)
        else {
            return;
        };

        let mine = Mine {
            tower: tower.id(),
            position,
            hit: damage::calculate_damage(tower, ctx),
            radius: blast_radius(tower, ctx.config.trap_radius),
            armed_at: ctx.now,
            duration: duration_from_millis(tower.stats().trap_duration),
        };
        ctx.traps.arm(mine);
        tower.firing.active_traps += 1;
        ctx.events.push(Event::TrapArmed {
            tower: tower.id(),
            position,
        });
        tracing::trace!(tower = tower.id().get(), active = tower.firing.active_traps, "mine armed");
        self.post_fire(tower, ctx.now);
    }

    fn cleanup(&self, tower: &mut Tower) {
        tower.firing.active_traps = 0;
    }
}
