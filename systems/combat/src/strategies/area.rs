//! Continuous and area attacks centred on the tower.

use artifact_defence_core::{MonsterId, Tower};
use artifact_defence_system_waves::Monster;
use glam::DVec2;

use super::{can_fire, AttackStrategy};
use crate::{
    damage,
    targeting::{self, heading, wrap_angle},
    CombatContext,
};

/// Low-damage beam that ticks on the nearest monster every cycle.
#[derive(Debug)]
pub(crate) struct Laser;

impl AttackStrategy for Laser {
    fn fire(&self, tower: &mut Tower, target: MonsterId, _: DVec2, ctx: &mut CombatContext<'_>) {
        let _ = damage::apply_tower_damage(tower, target, ctx.config.laser_damage_mult, ctx);
    }
}

/// Pulse hitting every monster within range, with or without targets.
#[derive(Debug)]
pub(crate) struct Nova;

impl AttackStrategy for Nova {
    fn update(&self, tower: &mut Tower, ctx: &mut CombatContext<'_>) {
        if !can_fire(tower, ctx.now) {
            return;
        }
        let victims = targeting::within(ctx.waves, tower.center(), tower.runtime.range);
        tracing::trace!(tower = tower.id().get(), victims = victims.len(), "nova pulse");
        for target in victims {
            let _ = damage::apply_tower_damage(tower, target, 1.0, ctx);
        }
        self.post_fire(tower, ctx.now);
    }
}

/// Cone sweeping towards the nearest monster.
#[derive(Debug)]
pub(crate) struct Beam;

impl AttackStrategy for Beam {
    fn fire(&self, tower: &mut Tower, target: MonsterId, origin: DVec2, ctx: &mut CombatContext<'_>) {
        let Some(aim) = ctx.waves.monster(target).map(Monster::position) else {
            return;
        };
        let facing = heading(origin, aim);

        let half_cone = tower.stats().cone_angle / 2.0;
        let victims: Vec<MonsterId> = ctx
            .waves
            .monsters()
            .filter(|monster| {
                let position = monster.position();
                origin.distance(position) <= tower.runtime.range
                    && wrap_angle(facing - heading(origin, position)).abs() <= half_cone
            })
            .map(Monster::id)
            .collect();
        for victim in victims {
            let _ = damage::apply_tower_damage(tower, victim, 1.0, ctx);
        }
    }
}
