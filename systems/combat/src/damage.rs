//! Damage resolution shared by every attack strategy.

use artifact_defence_core::{DebuffKind, Element, Event, MonsterId, Tower};
use artifact_defence_system_waves::{DamageOutcome, Monster};
use glam::DVec2;
use rand::Rng;

use crate::{
    targeting::{heading, within, wrap_angle},
    CombatContext,
};

/// Rolled damage of a single shot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Hit {
    pub(crate) dmg: f64,
    pub(crate) crit: bool,
}

/// Rolls the tower's base hit, applying its crit multiplier on a crit.
pub(crate) fn calculate_damage(tower: &Tower, ctx: &mut CombatContext<'_>) -> Hit {
    let crit_chance = tower.runtime.crit_chance;
    let crit = crit_chance > 0.0 && ctx.rng.gen::<f64>() < crit_chance;
    let mut dmg = tower.runtime.atk;
    if crit {
        dmg *= tower
            .stats()
            .crit_dmg_mult
            .unwrap_or(ctx.config.crit_damage_mult);
    }
    Hit { dmg, crit }
}

/// Routes a hit through the wave system, then applies the tower's debuff
/// to a survivor.
pub(crate) fn apply_damage(
    tower: &Tower,
    target: MonsterId,
    hit: Hit,
    ctx: &mut CombatContext<'_>,
) -> DamageOutcome {
    let outcome = ctx.waves.take_damage(target, hit.dmg, hit.crit, ctx.events);
    if outcome == DamageOutcome::Survived {
        if let Some(debuff) = &tower.stats().debuff {
            let _ = ctx.waves.apply_debuff(
                target,
                debuff,
                tower.runtime.debuff_efficiency,
                tower.runtime.debuff_duration_mult,
                &mut *ctx.rng,
            );
        }
    }
    outcome
}

/// Full on-hit pipeline: vulnerable bonus, execute, the hit itself and the
/// pierce fan-out.
///
/// Returns the number of secondary pierce hits, which never exceeds the
/// tower's pierce count.
pub(crate) fn apply_tower_damage(
    tower: &Tower,
    target: MonsterId,
    multiplier: f64,
    ctx: &mut CombatContext<'_>,
) -> usize {
    let Some((position, fraction, vulnerable)) = ctx.waves.monster(target).map(|monster| {
        (
            monster.position(),
            monster.health_fraction(),
            monster.debuffs().has(DebuffKind::Vulnerable),
        )
    }) else {
        return 0;
    };

    let mut hit = calculate_damage(tower, ctx);
    hit.dmg *= multiplier;
    if vulnerable {
        hit.dmg *= ctx.config.vulnerable_mult;
    }

    let threshold = tower.runtime.execute_threshold;
    if threshold > 0.0 && fraction <= threshold {
        hit.dmg *= 2.0;
        ctx.events.push(Event::ExecuteTriggered {
            monster: target,
            position,
        });
    }

    let _ = apply_damage(tower, target, hit, ctx);

    let limit = tower.runtime.pierce_count as usize;
    if limit == 0 {
        return 0;
    }
    pierce(tower, target, position, hit, limit, ctx)
}

fn pierce(
    tower: &Tower,
    target: MonsterId,
    position: DVec2,
    hit: Hit,
    limit: usize,
    ctx: &mut CombatContext<'_>,
) -> usize {
    let ray = heading(tower.center(), position);
    let tolerance = ctx.config.pierce_angle_tolerance;
    let candidates: Vec<MonsterId> = within(ctx.waves, position, ctx.config.pierce_range)
        .into_iter()
        .filter(|id| *id != target)
        .filter(|id| {
            ctx.waves
                .monster(*id)
                .map(Monster::position)
                .is_some_and(|other| wrap_angle(ray - heading(position, other)).abs() < tolerance)
        })
        .take(limit)
        .collect();

    let secondary = Hit {
        dmg: hit.dmg * ctx.config.pierce_damage_mult,
        crit: hit.crit,
    };
    for id in &candidates {
        let _ = apply_damage(tower, *id, secondary, ctx);
    }
    tracing::trace!(tower = tower.id().get(), pierced = candidates.len(), "pierce resolved");
    candidates.len()
}

/// Area damage around `center`, knocking monsters back for plasma towers.
pub(crate) fn create_explosion(
    tower: &Tower,
    center: DVec2,
    radius: f64,
    hit: Hit,
    ctx: &mut CombatContext<'_>,
) {
    ctx.events.push(Event::Explosion { center, radius });
    let knockback = tower.template().element == Some(Element::Plasma);
    for id in within(ctx.waves, center, radius) {
        let _ = apply_damage(tower, id, hit, ctx);
        if knockback {
            let _ = ctx.waves.knockback(id, ctx.config.knockback_force, ctx.path);
        }
    }
}

/// Explosion radius of the tower, falling back to `default` when its stats
/// leave it unset.
pub(crate) fn blast_radius(tower: &Tower, default: f64) -> f64 {
    tower.stats().aoe_radius.unwrap_or(default) * tower.runtime.aoe_mult
}
