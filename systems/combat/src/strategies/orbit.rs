//! Satellites circling the tower.

use std::f64::consts::TAU;

use artifact_defence_core::{duration_from_millis, millis_of, Tower};
use glam::DVec2;

use super::AttackStrategy;
use crate::{damage, targeting, CombatContext};

/// Milliseconds per step of `orbit_speed`.
const ORBIT_FRAME_MS: f64 = 16.0;

/// Persistent satellites that strike whatever they pass over.
///
/// Satellites ignore the fire-rate gate; each monster is instead limited to
/// one strike per tower every `hit_cooldown`.
#[derive(Debug)]
pub(crate) struct Orbit;

impl AttackStrategy for Orbit {
    fn update(&self, tower: &mut Tower, ctx: &mut CombatContext<'_>) {
        let center = tower.center();
        let (count, speed, radius) = {
            let stats = tower.stats();
            (stats.orbit_count, stats.orbit_speed, stats.orbit_radius)
        };

        let firing = &mut tower.firing;
        if firing.satellites.len() != count as usize {
            firing.satellites = vec![center; count as usize];
        }
        if firing.satellites.is_empty() {
            return;
        }

        firing.orbit_angle += speed * millis_of(ctx.dt) / ORBIT_FRAME_MS;
        let angle = firing.orbit_angle;
        let step = TAU / firing.satellites.len() as f64;
        for (index, satellite) in firing.satellites.iter_mut().enumerate() {
            let theta = angle + index as f64 * step;
            *satellite = center + DVec2::new(theta.cos(), theta.sin()) * radius;
        }

        let positions = firing.satellites.clone();
        for position in positions {
            strike(tower, position, ctx);
        }
    }

    fn cleanup(&self, tower: &mut Tower) {
        tower.firing.satellites.clear();
    }
}

fn strike(tower: &Tower, satellite: DVec2, ctx: &mut CombatContext<'_>) {
    let cooldown = duration_from_millis(tower.stats().hit_cooldown);
    for target in targeting::within(ctx.waves, satellite, ctx.config.orbit_hit_radius) {
        let key = (target, tower.id());
        let last = ctx.orbit_hits.get(&key).copied().unwrap_or_default();
        if ctx.now.saturating_sub(last) <= cooldown {
            continue;
        }
        let _ = ctx.orbit_hits.insert(key, ctx.now);
        tracing::trace!(tower = tower.id().get(), monster = target.get(), "satellite strike");
        let hit = damage::calculate_damage(tower, ctx);
        let _ = damage::apply_damage(tower, target, hit, ctx);
    }
}
