#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-monster status effects with merge rules and per-tick advancement.

use std::time::Duration;

use artifact_defence_core::{duration_from_millis, DebuffKind, DebuffTemplate};
use rand::Rng;

/// Interval between poison ticks.
pub const POISON_INTERVAL: Duration = Duration::from_millis(500);

/// Slow strength never drops below this speed multiplier.
pub const MIN_SLOW_VALUE: f64 = 0.1;

/// Timed status effect carried by a monster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Debuff {
    /// Kind of the effect.
    pub kind: DebuffKind,
    /// Strength of the effect.
    pub val: f64,
    /// Time left before the effect expires.
    pub remaining: Duration,
    /// Time left until the next poison tick.
    pub tick: Duration,
}

/// Result of attempting to apply a debuff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A new entry was inserted.
    Added,
    /// An existing entry of the same kind was refreshed.
    Refreshed,
    /// The chance roll failed and nothing changed.
    Resisted,
}

/// Aggregate effect of advancing a monster's debuffs by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebuffTick {
    /// Multiplier applied to the monster's movement this tick.
    pub speed_multiplier: f64,
    /// Poison damage dealt this tick.
    pub poison_damage: f64,
}

/// Debuffs carried by one monster; at most one entry per kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebuffList {
    entries: Vec<Debuff>,
}

impl DebuffList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a tower's debuff template.
    ///
    /// `efficiency` strengthens slows when above one and `duration_mult`
    /// scales the applied duration. Re-applying a kind refreshes its duration
    /// and keeps the more severe value.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        template: &DebuffTemplate,
        efficiency: f64,
        duration_mult: f64,
        rng: &mut R,
    ) -> ApplyOutcome {
        if let Some(chance) = template.chance {
            if chance > 0.0 && rng.gen::<f64>() > chance {
                return ApplyOutcome::Resisted;
            }
        }

        let mut val = template.val.unwrap_or_else(|| neutral_value(template.kind));
        if template.kind == DebuffKind::Slow && efficiency > 1.0 {
            val = (1.0 - (1.0 - val) * efficiency).max(MIN_SLOW_VALUE);
        }
        let remaining = duration_from_millis(template.duration * duration_mult);

        if let Some(existing) = self.entries.iter_mut().find(|entry| entry.kind == template.kind) {
            existing.remaining = remaining;
            match template.kind {
                DebuffKind::Slow if val < existing.val => existing.val = val,
                DebuffKind::Vulnerable if val > existing.val => existing.val = val,
                _ => {}
            }
            return ApplyOutcome::Refreshed;
        }

        self.entries.push(Debuff {
            kind: template.kind,
            val,
            remaining,
            tick: POISON_INTERVAL,
        });
        ApplyOutcome::Added
    }

    /// Advances every entry by `dt`, dropping the ones that expire.
    ///
    /// Entries still contribute during the tick in which they expire.
    pub fn advance(&mut self, dt: Duration) -> DebuffTick {
        let mut speed_multiplier = 1.0;
        let mut stunned = false;
        let mut poison_damage = 0.0;

        for entry in &mut self.entries {
            entry.remaining = entry.remaining.saturating_sub(dt);
            match entry.kind {
                DebuffKind::Slow => speed_multiplier *= entry.val,
                DebuffKind::Stun => stunned = true,
                DebuffKind::Poison => {
                    entry.tick = entry.tick.saturating_sub(dt);
                    if entry.tick.is_zero() {
                        poison_damage += entry.val;
                        entry.tick = POISON_INTERVAL;
                    }
                }
                DebuffKind::Vulnerable => {}
            }
        }

        self.entries.retain(|entry| !entry.remaining.is_zero());

        DebuffTick {
            speed_multiplier: if stunned { 0.0 } else { speed_multiplier },
            poison_damage,
        }
    }

    /// Reports whether an entry of the given kind is present.
    #[must_use]
    pub fn has(&self, kind: DebuffKind) -> bool {
        self.entries.iter().any(|entry| entry.kind == kind)
    }

    /// Returns the entry of the given kind.
    #[must_use]
    pub fn get(&self, kind: DebuffKind) -> Option<&Debuff> {
        self.entries.iter().find(|entry| entry.kind == kind)
    }

    /// Iterates the active entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Debuff> + '_ {
        self.entries.iter()
    }

    /// Number of active entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no entries are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn neutral_value(kind: DebuffKind) -> f64 {
    match kind {
        DebuffKind::Slow | DebuffKind::Vulnerable => 1.0,
        DebuffKind::Stun | DebuffKind::Poison => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn template(kind: DebuffKind, val: Option<f64>, duration: f64) -> DebuffTemplate {
        DebuffTemplate {
            kind,
            val,
            duration,
            chance: None,
        }
    }

    #[test]
    fn stronger_slow_wins_and_duration_refreshes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut list = DebuffList::new();

        let first = list.apply(&template(DebuffKind::Slow, Some(0.8), 4_000.0), 1.0, 1.0, &mut rng);
        let second = list.apply(&template(DebuffKind::Slow, Some(0.5), 1_000.0), 1.0, 1.0, &mut rng);

        assert_eq!(first, ApplyOutcome::Added);
        assert_eq!(second, ApplyOutcome::Refreshed);
        let slow = list.get(DebuffKind::Slow).expect("slow present");
        assert_eq!(slow.val, 0.5);
        assert_eq!(slow.remaining, Duration::from_millis(1_000));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn weaker_slow_only_refreshes_duration() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut list = DebuffList::new();
        let _ = list.apply(&template(DebuffKind::Slow, Some(0.5), 1_000.0), 1.0, 1.0, &mut rng);
        let _ = list.apply(&template(DebuffKind::Slow, Some(0.9), 3_000.0), 1.0, 1.0, &mut rng);

        let slow = list.get(DebuffKind::Slow).expect("slow present");
        assert_eq!(slow.val, 0.5);
        assert_eq!(slow.remaining, Duration::from_millis(3_000));
    }

    #[test]
    fn stronger_vulnerable_wins() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut list = DebuffList::new();
        let _ = list.apply(&template(DebuffKind::Vulnerable, Some(1.2), 1_000.0), 1.0, 1.0, &mut rng);
        let _ = list.apply(&template(DebuffKind::Vulnerable, Some(1.5), 1_000.0), 1.0, 1.0, &mut rng);
        let _ = list.apply(&template(DebuffKind::Vulnerable, Some(1.1), 1_000.0), 1.0, 1.0, &mut rng);

        assert_eq!(list.get(DebuffKind::Vulnerable).map(|debuff| debuff.val), Some(1.5));
    }

    #[test]
    fn efficiency_strengthens_slow_with_floor() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut list = DebuffList::new();
        let _ = list.apply(&template(DebuffKind::Slow, Some(0.6), 1_000.0), 1.25, 1.0, &mut rng);
        let slow = list.get(DebuffKind::Slow).expect("slow present");
        assert!((slow.val - 0.5).abs() < 1e-9);

        let mut floored = DebuffList::new();
        let _ = floored.apply(&template(DebuffKind::Slow, Some(0.1), 1_000.0), 3.0, 1.0, &mut rng);
        assert_eq!(floored.get(DebuffKind::Slow).map(|debuff| debuff.val), Some(MIN_SLOW_VALUE));
    }

    #[test]
    fn duration_multiplier_scales_applied_duration() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut list = DebuffList::new();
        let _ = list.apply(&template(DebuffKind::Stun, None, 1_000.0), 1.0, 1.5, &mut rng);
        assert_eq!(
            list.get(DebuffKind::Stun).map(|debuff| debuff.remaining),
            Some(Duration::from_millis(1_500))
        );
    }

    #[test]
    fn zero_chance_never_resists_and_certain_chance_always_lands() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for chance in [0.0, 1.0] {
            let mut list = DebuffList::new();
            let outcome = list.apply(
                &DebuffTemplate {
                    kind: DebuffKind::Stun,
                    val: None,
                    duration: 500.0,
                    chance: Some(chance),
                },
                1.0,
                1.0,
                &mut rng,
            );
            assert_eq!(outcome, ApplyOutcome::Added);
        }
    }

    #[test]
    fn stun_overrides_slow_and_entries_expire() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut list = DebuffList::new();
        let _ = list.apply(&template(DebuffKind::Slow, Some(0.5), 1_000.0), 1.0, 1.0, &mut rng);
        let _ = list.apply(&template(DebuffKind::Stun, None, 200.0), 1.0, 1.0, &mut rng);

        let tick = list.advance(Duration::from_millis(200));
        assert_eq!(tick.speed_multiplier, 0.0);
        assert!(!list.has(DebuffKind::Stun), "stun expired this tick");

        let tick = list.advance(Duration::from_millis(100));
        assert_eq!(tick.speed_multiplier, 0.5);
    }

    #[test]
    fn poison_ticks_every_interval_after_application() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut list = DebuffList::new();
        let _ = list.apply(&template(DebuffKind::Poison, Some(10.0), 1_200.0), 1.0, 1.0, &mut rng);

        let damage: Vec<f64> = (0..6)
            .map(|_| list.advance(Duration::from_millis(250)).poison_damage)
            .collect();

        assert_eq!(damage, vec![0.0, 10.0, 0.0, 10.0, 0.0, 0.0]);
        assert!(list.is_empty());
    }
}
