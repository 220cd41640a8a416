#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Monster roster, difficulty curve, weighted spawning and path movement.
//!
//! The wave system owns every monster. Damage from any source flows through
//! [`Waves::take_damage`] so kill and reward bookkeeping lives in one place.

use std::{collections::BTreeMap, time::Duration};

use artifact_defence_core::{
    duration_from_millis, millis_of, DebuffTemplate, DifficultyConfig, Event, GameConfig,
    MonsterArchetype, MonsterId, PathProvider,
};
use artifact_defence_system_debuffs::{ApplyOutcome, DebuffList};
use glam::DVec2;
use rand::{distributions::WeightedIndex, prelude::Distribution, Rng};

/// Milliseconds of simulation that advance a monster by its `speed`.
const MOVEMENT_FRAME_MS: f64 = 16.0;

/// Difficulty multiplier reached after `elapsed` scaled time.
#[must_use]
pub fn difficulty_at(config: &DifficultyConfig, elapsed: Duration) -> f64 {
    if config.game_minute_ms <= 0.0 {
        return 1.0;
    }
    1.0 + (millis_of(elapsed) / config.game_minute_ms) * config.hp_per_minute_rate
}

/// Spawn interval implied by a difficulty multiplier.
#[must_use]
pub fn spawn_interval(config: &DifficultyConfig, difficulty: f64) -> Duration {
    let compressed =
        config.base_spawn_interval_ms / (1.0 + (difficulty - 1.0) * config.spawn_decay_factor);
    duration_from_millis(compressed.max(config.min_spawn_interval_ms))
}

fn wrap_parameter(t: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    let wrapped = t.rem_euclid(1.0);
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Live monster walking the path.
#[derive(Clone, Debug, PartialEq)]
pub struct Monster {
    id: MonsterId,
    archetype: String,
    t: f64,
    position: DVec2,
    hp: f64,
    max_hp: f64,
    speed: f64,
    difficulty: f64,
    debuffs: DebuffList,
}

impl Monster {
    /// Identifier assigned at spawn.
    #[must_use]
    pub const fn id(&self) -> MonsterId {
        self.id
    }

    /// Archetype key the monster was drawn from.
    #[must_use]
    pub fn archetype(&self) -> &str {
        &self.archetype
    }

    /// Path parameter in `[0, 1)`.
    #[must_use]
    pub const fn t(&self) -> f64 {
        self.t
    }

    /// World position derived from the path parameter.
    #[must_use]
    pub const fn position(&self) -> DVec2 {
        self.position
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn hp(&self) -> f64 {
        self.hp
    }

    /// Hit points at spawn.
    #[must_use]
    pub const fn max_hp(&self) -> f64 {
        self.max_hp
    }

    /// Base path speed per 16ms.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Difficulty in effect when the monster spawned.
    #[must_use]
    pub const fn difficulty(&self) -> f64 {
        self.difficulty
    }

    /// Active status effects.
    #[must_use]
    pub const fn debuffs(&self) -> &DebuffList {
        &self.debuffs
    }

    /// Fraction of hit points remaining.
    #[must_use]
    pub fn health_fraction(&self) -> f64 {
        if self.max_hp > 0.0 {
            self.hp / self.max_hp
        } else {
            0.0
        }
    }
}

/// Result of routing damage to a monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// No live monster carries the identifier.
    Missing,
    /// The monster survived the hit.
    Survived,
    /// The hit killed the monster.
    Killed,
}

/// Wave system state.
#[derive(Debug)]
pub struct Waves {
    config: DifficultyConfig,
    monster_reward: u32,
    archetypes: Vec<MonsterArchetype>,
    weights: Option<WeightedIndex<f64>>,
    monsters: BTreeMap<MonsterId, Monster>,
    next_monster_id: u32,
    elapsed: Duration,
    spawn_timer: Duration,
    difficulty: f64,
}

impl Waves {
    /// Creates a wave system that spawns from the provided roster.
    #[must_use]
    pub fn new(
        config: DifficultyConfig,
        game: &GameConfig,
        archetypes: Vec<MonsterArchetype>,
    ) -> Self {
        let weights = WeightedIndex::new(archetypes.iter().map(|archetype| archetype.weight)).ok();
        let spawn_timer = duration_from_millis(config.initial_spawn_delay_ms);
        Self {
            config,
            monster_reward: game.monster_reward,
            archetypes,
            weights,
            monsters: BTreeMap::new(),
            next_monster_id: 0,
            elapsed: Duration::ZERO,
            spawn_timer,
            difficulty: 1.0,
        }
    }

    /// Advances difficulty, spawning, debuffs and movement by `dt`.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        dt: Duration,
        path: &dyn PathProvider,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.difficulty = difficulty_at(&self.config, self.elapsed);
        let interval = spawn_interval(&self.config, self.difficulty);

        self.spawn_timer = self.spawn_timer.saturating_sub(dt);
        if self.spawn_timer.is_zero() {
            self.spawn_random(path, rng, out);
            self.spawn_timer = interval;
        }

        out.push(Event::DifficultyUpdated {
            difficulty: self.difficulty,
            spawn_interval: interval,
            elapsed: self.elapsed,
        });

        let frames = millis_of(dt) / MOVEMENT_FRAME_MS;
        let mut poisoned = Vec::new();
        let mut dead = Vec::new();
        for monster in self.monsters.values_mut() {
            let tick = monster.debuffs.advance(dt);
            if tick.poison_damage > 0.0 {
                monster.hp -= tick.poison_damage;
                poisoned.push((monster.id, tick.poison_damage, monster.position));
            }
            if monster.hp <= 0.0 {
                dead.push(monster.id);
                continue;
            }

            monster.t += monster.speed * tick.speed_multiplier * frames;
            if monster.t >= 1.0 {
                monster.t = wrap_parameter(monster.t);
            }
            monster.position = path.point(monster.t);
        }

        for (monster, amount, position) in poisoned {
            out.push(Event::DamageDealt {
                monster,
                amount,
                crit: false,
                position,
            });
        }
        for monster in dead {
            self.kill(monster, out);
        }
    }

    /// Spawns a monster of the given archetype at path parameter `t`,
    /// scaling its hit points by the current difficulty.
    pub fn spawn_at(
        &mut self,
        archetype: &MonsterArchetype,
        t: f64,
        path: &dyn PathProvider,
        out: &mut Vec<Event>,
    ) -> MonsterId {
        self.insert(archetype, archetype.speed, wrap_parameter(t), path, out)
    }

    /// Routes damage to a monster and performs kill bookkeeping.
    pub fn take_damage(
        &mut self,
        id: MonsterId,
        amount: f64,
        crit: bool,
        out: &mut Vec<Event>,
    ) -> DamageOutcome {
        let Some(monster) = self.monsters.get_mut(&id) else {
            return DamageOutcome::Missing;
        };

        monster.hp -= amount;
        out.push(Event::DamageDealt {
            monster: id,
            amount,
            crit,
            position: monster.position,
        });

        if monster.hp <= 0.0 {
            self.kill(id, out);
            DamageOutcome::Killed
        } else {
            DamageOutcome::Survived
        }
    }

    /// Applies a debuff template to a live monster.
    pub fn apply_debuff<R: Rng + ?Sized>(
        &mut self,
        id: MonsterId,
        template: &DebuffTemplate,
        efficiency: f64,
        duration_mult: f64,
        rng: &mut R,
    ) -> Option<ApplyOutcome> {
        let monster = self.monsters.get_mut(&id)?;
        Some(monster.debuffs.apply(template, efficiency, duration_mult, rng))
    }

    /// Pushes a monster back along the path by `force` world units.
    ///
    /// The path parameter clamps at zero instead of wrapping backwards.
    pub fn knockback(&mut self, id: MonsterId, force: f64, path: &dyn PathProvider) -> bool {
        let Some(monster) = self.monsters.get_mut(&id) else {
            return false;
        };
        let length = path.length();
        if length > 0.0 {
            monster.t = (monster.t - force / length).max(0.0);
        }
        monster.position = path.point(monster.t);
        true
    }

    /// Looks up a live monster.
    #[must_use]
    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.get(&id)
    }

    /// Iterates live monsters ordered by identifier.
    pub fn monsters(&self) -> impl Iterator<Item = &Monster> + '_ {
        self.monsters.values()
    }

    /// Number of live monsters.
    #[must_use]
    pub fn count(&self) -> usize {
        self.monsters.len()
    }

    /// Current difficulty multiplier.
    #[must_use]
    pub const fn difficulty(&self) -> f64 {
        self.difficulty
    }

    /// Scaled time elapsed since the wave system started.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Gold granted for a kill at the current difficulty.
    #[must_use]
    pub fn kill_reward(&self) -> u32 {
        let scale = 1.0 + (self.difficulty - 1.0) * self.config.reward_difficulty_weight;
        (f64::from(self.monster_reward) * scale).floor().max(0.0) as u32
    }

    fn spawn_random<R: Rng + ?Sized>(
        &mut self,
        path: &dyn PathProvider,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) {
        let index = match &self.weights {
            Some(weights) => weights.sample(rng),
            None => 0,
        };
        let Some(archetype) = self.archetypes.get(index).cloned() else {
            tracing::warn!("spawn skipped: roster is empty");
            return;
        };

        let jitter = self.config.speed_jitter;
        let variation = rng.gen::<f64>() * jitter * 2.0 - jitter;
        let speed = archetype.speed * (1.0 + variation);
        let _ = self.insert(&archetype, speed, 0.0, path, out);
    }

    fn insert(
        &mut self,
        archetype: &MonsterArchetype,
        speed: f64,
        t: f64,
        path: &dyn PathProvider,
        out: &mut Vec<Event>,
    ) -> MonsterId {
        let id = MonsterId::new(self.next_monster_id);
        self.next_monster_id = self.next_monster_id.wrapping_add(1);

        let hp = (archetype.hp * self.difficulty).floor();
        let monster = Monster {
            id,
            archetype: archetype.id.clone(),
            t,
            position: path.point(t),
            hp,
            max_hp: hp,
            speed,
            difficulty: self.difficulty,
            debuffs: DebuffList::new(),
        };
        let _ = self.monsters.insert(id, monster);

        tracing::debug!(monster = id.get(), archetype = %archetype.id, hp, "monster spawned");
        out.push(Event::MonsterSpawned {
            monster: id,
            archetype: archetype.id.clone(),
            hp,
        });
        out.push(Event::MonsterCountChanged {
            count: self.monsters.len(),
        });
        id
    }

    fn kill(&mut self, id: MonsterId, out: &mut Vec<Event>) {
        if self.monsters.remove(&id).is_none() {
            return;
        }
        let reward = self.kill_reward();
        tracing::debug!(monster = id.get(), reward, "monster killed");
        out.push(Event::MonsterKilled { monster: id, reward });
        out.push(Event::GoldAwarded { amount: reward });
        out.push(Event::MonsterCountChanged {
            count: self.monsters.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artifact_defence_core::{DebuffKind, SquareLoop};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn slime() -> MonsterArchetype {
        MonsterArchetype {
            id: "slime".to_owned(),
            name: "Slime".to_owned(),
            hp: 80.0,
            speed: 0.001,
            weight: 1.0,
        }
    }

    fn waves() -> Waves {
        Waves::new(DifficultyConfig::default(), &GameConfig::default(), vec![slime()])
    }

    fn path() -> SquareLoop {
        SquareLoop::new(DVec2::new(325.0, 325.0), 600.0)
    }

    #[test]
    fn first_spawn_waits_for_initial_delay() {
        let mut waves = waves();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut out = Vec::new();

        waves.advance(Duration::from_millis(1_999), &path(), &mut rng, &mut out);
        assert_eq!(waves.count(), 0);

        waves.advance(Duration::from_millis(1), &path(), &mut rng, &mut out);
        assert_eq!(waves.count(), 1);
        assert!(out
            .iter()
            .any(|event| matches!(event, Event::MonsterSpawned { archetype, .. } if archetype == "slime")));
    }

    #[test]
    fn movement_scales_with_frames_and_wraps() {
        let mut waves = waves();
        let mut out = Vec::new();
        let id = waves.spawn_at(&slime(), 0.995, &path(), &mut out);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        waves.advance(Duration::from_millis(160), &path(), &mut rng, &mut out);

        let monster = waves.monster(id).expect("alive");
        assert!((monster.t() - 0.005).abs() < 1e-9, "t = {}", monster.t());
    }

    #[test]
    fn stun_freezes_movement() {
        let mut waves = waves();
        let mut out = Vec::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let id = waves.spawn_at(&slime(), 0.2, &path(), &mut out);
        let stun = DebuffTemplate {
            kind: DebuffKind::Stun,
            val: None,
            duration: 1_000.0,
            chance: None,
        };
        assert_eq!(
            waves.apply_debuff(id, &stun, 1.0, 1.0, &mut rng),
            Some(ApplyOutcome::Added)
        );

        waves.advance(Duration::from_millis(100), &path(), &mut rng, &mut out);
        assert_eq!(waves.monster(id).map(Monster::t), Some(0.2));
    }

    #[test]
    fn lethal_damage_awards_scaled_reward() {
        let mut waves = waves();
        let mut out = Vec::new();
        let id = waves.spawn_at(&slime(), 0.0, &path(), &mut out);
        out.clear();

        assert_eq!(waves.take_damage(id, 30.0, false, &mut out), DamageOutcome::Survived);
        assert_eq!(waves.take_damage(id, 60.0, true, &mut out), DamageOutcome::Killed);
        assert_eq!(waves.take_damage(id, 1.0, false, &mut out), DamageOutcome::Missing);

        assert!(out.contains(&Event::MonsterKilled { monster: id, reward: 10 }));
        assert!(out.contains(&Event::GoldAwarded { amount: 10 }));
        assert!(out.contains(&Event::MonsterCountChanged { count: 0 }));
    }

    #[test]
    fn reward_grows_with_difficulty() {
        let mut waves = waves();
        waves.difficulty = 2.6;
        assert_eq!(waves.kill_reward(), 18);
    }
}
