//! Target queries over the live monster roster.

use std::f64::consts::{PI, TAU};

use artifact_defence_core::MonsterId;
use artifact_defence_system_waves::Waves;
use glam::DVec2;
use rand::Rng;

use crate::CombatContext;

/// Closest live monster strictly inside `range`, skipping `exclude`.
///
/// Ties keep the monster with the lower identifier.
pub(crate) fn nearest(
    waves: &Waves,
    from: DVec2,
    range: f64,
    exclude: &[MonsterId],
) -> Option<MonsterId> {
    let mut nearest = None;
    let mut best = range;
    for monster in waves.monsters() {
        if exclude.contains(&monster.id()) {
            continue;
        }
        let distance = from.distance(monster.position());
        if distance < best {
            best = distance;
            nearest = Some(monster.id());
        }
    }
    nearest
}

/// Up to `count` live monsters within `range`, closest first.
pub(crate) fn nearest_many(waves: &Waves, from: DVec2, range: f64, count: usize) -> Vec<MonsterId> {
    let mut found: Vec<(f64, MonsterId)> = waves
        .monsters()
        .filter_map(|monster| {
            let distance = from.distance(monster.position());
            (distance <= range).then_some((distance, monster.id()))
        })
        .collect();
    found.sort_by(|a, b| a.0.total_cmp(&b.0));
    found.truncate(count);
    found.into_iter().map(|(_, id)| id).collect()
}

/// Every live monster within `radius` of `center`, in identifier order.
pub(crate) fn within(waves: &Waves, center: DVec2, radius: f64) -> Vec<MonsterId> {
    waves
        .monsters()
        .filter(|monster| center.distance(monster.position()) <= radius)
        .map(|monster| monster.id())
        .collect()
}

/// Angle of the ray from `from` to `to` in radians.
pub(crate) fn heading(from: DVec2, to: DVec2) -> f64 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

/// Wraps an angle into `[-PI, PI)`.
pub(crate) fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Draws random points along the path and returns the first one within
/// `range` of `origin`.
pub(crate) fn sample_path_point(
    origin: DVec2,
    range: f64,
    ctx: &mut CombatContext<'_>,
) -> Option<DVec2> {
    for _ in 0..ctx.config.placement_samples {
        let point = ctx.path.point(ctx.rng.gen::<f64>());
        if origin.distance(point) <= range {
            return Some(point);
        }
    }
    None
}
