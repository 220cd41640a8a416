use std::{collections::BTreeMap, time::Duration};

use artifact_defence_core::{
    AttackType, CellCoord, CombatConfig, DifficultyConfig, Element, Event, GameConfig, GridConfig,
    MonsterArchetype, MonsterId, PieceKind, Shape, SquareLoop, TemplateId, Tower, TowerId,
    TowerStats, TowerTemplate,
};
use artifact_defence_system_combat::{Combat, FrameTime};
use artifact_defence_system_waves::{DamageOutcome, Waves};
use glam::DVec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Single artifact at cell (0, 0), centred on (115, 115), beside a square
/// loop whose top edge runs from (25, 25) to (625, 25).
struct Arena {
    combat: Combat,
    towers: BTreeMap<TowerId, Tower>,
    waves: Waves,
    path: SquareLoop,
    rng: ChaCha8Rng,
    clock: Duration,
    events: Vec<Event>,
}

impl Arena {
    fn new(stats: TowerStats) -> Self {
        Self::with_element(stats, None)
    }

    fn with_element(stats: TowerStats, element: Option<Element>) -> Self {
        let template = TowerTemplate {
            id: TemplateId::new("sentry"),
            name: "Sentry".to_owned(),
            kind: PieceKind::Artifact,
            element,
            role: None,
            shape: Shape::rect(1, 1),
            stats,
            buff: None,
        };
        let tower = Tower::new(TowerId::new(0), template, CellCoord::new(0, 0), &GridConfig::default());
        let mut towers = BTreeMap::new();
        let _ = towers.insert(tower.id(), tower);
        Self {
            combat: Combat::new(CombatConfig::default()),
            towers,
            waves: Waves::new(DifficultyConfig::default(), &GameConfig::default(), Vec::new()),
            path: SquareLoop::new(DVec2::new(325.0, 325.0), 600.0),
            rng: ChaCha8Rng::seed_from_u64(21),
            clock: Duration::ZERO,
            events: Vec::new(),
        }
    }

    /// Spawns a stationary monster `along` units from the top-left corner
    /// of the loop.
    fn spawn(&mut self, along: f64, hp: f64) -> MonsterId {
        let archetype = MonsterArchetype {
            id: "dummy".to_owned(),
            name: "Dummy".to_owned(),
            hp,
            speed: 0.0,
            weight: 1.0,
        };
        self.waves
            .spawn_at(&archetype, along / 2_400.0, &self.path, &mut self.events)
    }

    fn tick(&mut self, dt_ms: u64) {
        let dt = Duration::from_millis(dt_ms);
        self.clock += dt;
        self.combat.update(
            FrameTime { now: self.clock, dt },
            &mut self.towers,
            &mut self.waves,
            &self.path,
            &mut self.rng,
            &mut self.events,
        );
    }

    fn explosions(&self) -> Vec<(DVec2, f64)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Explosion { center, radius } => Some((*center, *radius)),
                _ => None,
            })
            .collect()
    }

    fn position(&self, monster: MonsterId) -> DVec2 {
        self.waves.monster(monster).expect("monster alive").position()
    }

    fn tower(&self) -> &Tower {
        &self.towers[&TowerId::new(0)]
    }

    fn hits(&self) -> Vec<(MonsterId, f64)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::DamageDealt { monster, amount, .. } => Some((*monster, *amount)),
                _ => None,
            })
            .collect()
    }
}

fn stats(attack_type: AttackType) -> TowerStats {
    TowerStats {
        atk: 10.0,
        fire_rate: 1_000.0,
        attack_type,
        ..TowerStats::default()
    }
}

#[test]
fn single_target_damage_accumulates_until_kill() {
    let mut arena = Arena::new(TowerStats {
        atk: 100.0,
        ..stats(AttackType::Normal)
    });
    let target = arena.spawn(0.0, 250.0);
    arena.events.clear();

    let mut cumulative = Vec::new();
    for _ in 0..3 {
        arena.tick(1_000);
        cumulative.push(arena.hits().iter().map(|(_, amount)| amount).sum::<f64>());
    }

    assert_eq!(cumulative, vec![100.0, 200.0, 300.0]);
    assert!(arena.waves.monster(target).is_none(), "target died on the third shot");
    let kills = arena
        .events
        .iter()
        .filter(|event| matches!(event, Event::MonsterKilled { monster, .. } if *monster == target))
        .count();
    assert_eq!(kills, 1);
}

#[test]
fn chain_never_revisits_a_monster() {
    let mut arena = Arena::new(TowerStats {
        chain_count: 3,
        ..stats(AttackType::Chain)
    });
    for along in [0.0, 24.0, 48.0, 72.0, 96.0] {
        let _ = arena.spawn(along, 10_000.0);
    }
    arena.events.clear();

    arena.tick(1_000);
    assert_eq!(arena.hits().len(), 1, "first link strikes immediately");
    assert_eq!(arena.combat.pending_tasks(), 1);
    for _ in 0..9 {
        arena.tick(100);
    }

    let hit: Vec<MonsterId> = arena.hits().into_iter().map(|(monster, _)| monster).collect();
    assert_eq!(hit.len(), 3);
    let mut unique = hit.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), hit.len(), "hits: {hit:?}");
    assert_eq!(arena.combat.pending_tasks(), 0);
}

#[test]
fn chain_stops_when_no_monster_is_within_jump_range() {
    let mut arena = Arena::new(stats(AttackType::Chain));
    let _ = arena.spawn(96.0, 10_000.0);
    let _ = arena.spawn(500.0, 10_000.0);
    arena.events.clear();

    arena.tick(1_000);
    for _ in 0..5 {
        arena.tick(100);
    }

    assert_eq!(arena.hits().len(), 1);
}

#[test]
fn bomb_explodes_after_flight_time() {
    let mut arena = Arena::new(stats(AttackType::Bomb));
    let near = arena.spawn(96.0, 1_000.0);
    let splash = arena.spawn(150.0, 1_000.0);
    let far = arena.spawn(400.0, 1_000.0);
    arena.events.clear();

    arena.tick(1_000);
    assert!(arena.hits().is_empty(), "bomb still in flight");
    assert_eq!(arena.combat.pending_tasks(), 1);

    arena.tick(399);
    assert!(arena.hits().is_empty());
    arena.tick(1);

    let hit: Vec<MonsterId> = arena.hits().into_iter().map(|(monster, _)| monster).collect();
    assert_eq!(hit, vec![near, splash]);
    assert!(!hit.contains(&far));
    assert!(arena
        .events
        .iter()
        .any(|event| matches!(event, Event::Explosion { radius, .. } if *radius == 150.0)));
}

#[test]
fn bomb_explodes_where_a_dead_target_stood() {
    let mut arena = Arena::new(stats(AttackType::Bomb));
    let target = arena.spawn(96.0, 1_000.0);
    let bystander = arena.spawn(150.0, 1_000.0);
    arena.tick(1_000);
    assert_eq!(arena.combat.pending_tasks(), 1);

    let outcome = arena
        .waves
        .take_damage(target, 5_000.0, false, &mut arena.events);
    assert_eq!(outcome, DamageOutcome::Killed);
    arena.events.clear();
    arena.tick(400);

    let explosions = arena.explosions();
    assert_eq!(explosions.len(), 1);
    assert!(explosions[0].0.distance(DVec2::new(121.0, 25.0)) < 1e-9);
    assert_eq!(arena.hits(), vec![(bystander, 10.0)]);
}

#[test]
fn plasma_explosions_knock_monsters_back() {
    let mut plain = Arena::new(stats(AttackType::Bomb));
    let mut plasma = Arena::with_element(stats(AttackType::Bomb), Some(Element::Plasma));
    let still = plain.spawn(96.0, 1_000.0);
    let pushed = plasma.spawn(96.0, 1_000.0);

    for arena in [&mut plain, &mut plasma] {
        arena.tick(1_000);
        arena.tick(400);
        assert_eq!(arena.explosions().len(), 1);
    }

    assert!(plain.position(still).distance(DVec2::new(121.0, 25.0)) < 1e-9);
    assert!(plasma.position(pushed).distance(DVec2::new(101.0, 25.0)) < 1e-9);
}

#[test]
fn random_bomb_fires_every_cycle_without_targets() {
    let mut arena = Arena::new(stats(AttackType::RandomBomb));

    arena.tick(1_000);
    assert_eq!(arena.combat.pending_tasks(), 1);
    arena.tick(599);
    assert!(arena.explosions().is_empty(), "bomb still falling");
    arena.tick(1);
    assert_eq!(arena.explosions().len(), 1);
    assert_eq!(arena.explosions()[0].1, 150.0);
    assert_eq!(arena.combat.pending_tasks(), 0);

    arena.tick(400);
    assert_eq!(arena.combat.pending_tasks(), 1, "second cycle fired");
    assert_eq!(arena.tower().firing.last_fire, Duration::from_millis(2_000));
}

#[test]
fn laser_deals_a_fraction_of_attack() {
    let mut arena = Arena::new(stats(AttackType::Laser));
    let target = arena.spawn(96.0, 1_000.0);
    arena.events.clear();

    arena.tick(1_000);

    let hits = arena.hits();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0, target);
    assert!((hits[0].1 - 1.0).abs() < 1e-9, "damage {}", hits[0].1);
}

#[test]
fn beam_hits_only_monsters_inside_the_cone() {
    let mut arena = Arena::new(stats(AttackType::Beam));
    // The tower looks straight up at (115, 25); the cone is 0.5 rad wide.
    let aimed = arena.spawn(90.0, 1_000.0);
    let inside = arena.spawn(105.0, 1_000.0);
    let outside = arena.spawn(200.0, 1_000.0);
    arena.events.clear();

    arena.tick(1_000);

    let hit: Vec<MonsterId> = arena.hits().into_iter().map(|(monster, _)| monster).collect();
    assert_eq!(hit, vec![aimed, inside]);
    assert!(!hit.contains(&outside));
}

#[test]
fn ricochet_bounces_to_a_new_monster() {
    let mut arena = Arena::new(TowerStats {
        ricochet_count: 1,
        ..stats(AttackType::Ricochet)
    });
    let first = arena.spawn(96.0, 1_000.0);
    let second = arena.spawn(0.0, 1_000.0);
    arena.events.clear();

    arena.tick(1_000);
    for _ in 0..10 {
        arena.tick(50);
    }

    let hit: Vec<MonsterId> = arena.hits().into_iter().map(|(monster, _)| monster).collect();
    assert_eq!(hit, vec![first, second]);
    assert_eq!(arena.combat.pending_tasks(), 0);
}

#[test]
fn nova_fires_without_targets() {
    let mut arena = Arena::new(stats(AttackType::Nova));

    arena.tick(1_000);

    assert_eq!(arena.tower().firing.last_fire, Duration::from_millis(1_000));
}

#[test]
fn multi_strikes_up_to_projectile_count() {
    let mut arena = Arena::new(TowerStats {
        projectile_count: 2,
        ..stats(AttackType::Multi)
    });
    for along in [0.0, 48.0, 96.0] {
        let _ = arena.spawn(along, 1_000.0);
    }
    arena.events.clear();

    arena.tick(1_000);

    assert_eq!(arena.hits().len(), 2);
}

#[test]
fn satellites_respect_hit_cooldown() {
    let mut arena = Arena::new(TowerStats {
        orbit_count: 4,
        orbit_speed: 0.0,
        hit_cooldown: 300.0,
        ..stats(AttackType::Orbit)
    });
    // Satellite at angle -PI/2 sits at (115, 35), ten units from the monster.
    let target = arena.spawn(90.0, 10_000.0);
    arena.events.clear();

    arena.tick(1_000);
    for _ in 0..4 {
        arena.tick(100);
    }

    let satellites = &arena.tower().firing.satellites;
    assert_eq!(satellites.len(), 4);
    assert!(satellites
        .iter()
        .any(|satellite| satellite.distance(DVec2::new(115.0, 35.0)) < 1e-9));
    assert_eq!(arena.hits(), vec![(target, 10.0), (target, 10.0)]);
}

#[test]
fn traps_respect_the_active_cap_and_expire() {
    let mut arena = Arena::new(TowerStats {
        fire_rate: 100.0,
        range: 10_000.0,
        max_traps: 1,
        trap_duration: 500.0,
        ..stats(AttackType::Trap)
    });

    arena.tick(1_000);
    for _ in 0..4 {
        arena.tick(100);
    }
    assert_eq!(arena.combat.mines().count(), 1);
    assert_eq!(arena.tower().firing.active_traps, 1);

    arena.tick(101);
    assert_eq!(arena.tower().firing.active_traps, 1, "expired slot is re-armed at once");
    let armed = arena
        .events
        .iter()
        .filter(|event| matches!(event, Event::TrapArmed { .. }))
        .count();
    assert_eq!(armed, 2);
}

#[test]
fn removing_a_tower_discards_its_mines() {
    let mut arena = Arena::new(TowerStats {
        range: 10_000.0,
        ..stats(AttackType::Trap)
    });
    arena.tick(1_000);
    assert_eq!(arena.combat.mines().count(), 1);

    let mut tower = arena
        .towers
        .remove(&TowerId::new(0))
        .expect("tower present");
    arena.combat.remove_tower(&mut tower);

    assert_eq!(arena.combat.mines().count(), 0);
    assert_eq!(tower.firing.active_traps, 0);
}

proptest! {
    #[test]
    fn shots_are_never_closer_than_the_fire_rate(
        fire_rate in 50u64..2_000,
        steps in proptest::collection::vec(1u64..400, 1..200),
    ) {
        let mut arena = Arena::new(TowerStats {
            fire_rate: fire_rate as f64,
            ..stats(AttackType::Normal)
        });
        let _ = arena.spawn(0.0, f64::MAX);
        arena.events.clear();

        let mut shots = Vec::new();
        for dt in steps {
            let before = arena.hits().len();
            arena.tick(dt);
            if arena.hits().len() > before {
                shots.push(arena.clock);
            }
        }

        for pair in shots.windows(2) {
            prop_assert!(pair[1] - pair[0] >= Duration::from_millis(fire_rate));
        }
    }
}
