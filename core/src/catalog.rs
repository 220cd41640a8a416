//! Shop content: piece templates and monster archetypes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    AttackType, BuffKind, ConfigError, DebuffKind, DebuffTemplate, Element, PieceKind, Role,
    Shape, TabletBuff, TemplateId, TowerStats, TowerTemplate,
};

/// Kind of monster the wave system may spawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonsterArchetype {
    /// Stable key of the archetype.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Hit points at difficulty one.
    pub hp: f64,
    /// Path parameter advanced per 16ms.
    pub speed: f64,
    /// Relative likelihood of being drawn.
    pub weight: f64,
}

/// Templates keyed by identifier plus the monster roster.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    templates: BTreeMap<TemplateId, TowerTemplate>,
    archetypes: Vec<MonsterArchetype>,
}

#[derive(Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    templates: Option<Vec<TowerTemplate>>,
    #[serde(default)]
    archetypes: Option<Vec<MonsterArchetype>>,
}

impl Catalog {
    /// Assembles a catalog, rejecting duplicate ids and unusable archetypes.
    pub fn from_parts(
        templates: Vec<TowerTemplate>,
        archetypes: Vec<MonsterArchetype>,
    ) -> Result<Self, ConfigError> {
        let mut keyed = BTreeMap::new();
        for template in templates {
            let id = template.id.clone();
            if keyed.insert(id.clone(), template).is_some() {
                return Err(ConfigError::DuplicateTemplate(id.as_str().to_owned()));
            }
        }

        if archetypes.is_empty() {
            return Err(ConfigError::NoArchetypes);
        }
        let weights_valid = archetypes
            .iter()
            .all(|archetype| archetype.weight.is_finite() && archetype.weight >= 0.0);
        if !weights_valid || archetypes.iter().all(|archetype| archetype.weight == 0.0) {
            return Err(ConfigError::InvalidWeights);
        }

        Ok(Self {
            templates: keyed,
            archetypes,
        })
    }

    /// Parses a catalog document. A missing `templates` or `archetypes`
    /// section falls back to the built-in content.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let document: CatalogDocument = toml::from_str(source)?;
        let templates = document.templates.unwrap_or_else(builtin_templates);
        let archetypes = document.archetypes.unwrap_or_else(builtin_archetypes);
        Self::from_parts(templates, archetypes)
    }

    /// Looks up a template by identifier.
    #[must_use]
    pub fn template(&self, id: &TemplateId) -> Option<&TowerTemplate> {
        self.templates.get(id)
    }

    /// Iterates templates ordered by identifier.
    pub fn templates(&self) -> impl Iterator<Item = &TowerTemplate> + '_ {
        self.templates.values()
    }

    /// Monster roster in declaration order.
    #[must_use]
    pub fn archetypes(&self) -> &[MonsterArchetype] {
        &self.archetypes
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let templates = builtin_templates()
            .into_iter()
            .map(|template| (template.id.clone(), template))
            .collect();
        Self {
            templates,
            archetypes: builtin_archetypes(),
        }
    }
}

fn builtin_archetypes() -> Vec<MonsterArchetype> {
    [
        ("slime", "Nano Swarm", 80.0, 0.001, 40.0),
        ("guardian", "Heavy Mech", 300.0, 0.0004, 20.0),
        ("spirit", "Phase Drifter", 120.0, 0.0012, 30.0),
        ("golem", "Siege Walker", 600.0, 0.0002, 10.0),
    ]
    .into_iter()
    .map(|(id, name, hp, speed, weight)| MonsterArchetype {
        id: id.to_owned(),
        name: name.to_owned(),
        hp,
        speed,
        weight,
    })
    .collect()
}

fn shape(rows: &[&[u8]]) -> Shape {
    Shape::from_rows(rows).unwrap_or_else(|_| Shape::rect(1, 1))
}

fn tablet(id: &str, name: &str, kind: BuffKind, val: f64, penalty: f64) -> TowerTemplate {
    TowerTemplate {
        id: TemplateId::new(id),
        name: name.to_owned(),
        kind: PieceKind::Tablet,
        element: None,
        role: None,
        shape: Shape::rect(1, 1),
        stats: TowerStats::default(),
        buff: Some(TabletBuff { kind, val, penalty }),
    }
}

fn artifact(
    id: &str,
    name: &str,
    rows: &[&[u8]],
    element: Element,
    role: Role,
    stats: TowerStats,
) -> TowerTemplate {
    TowerTemplate {
        id: TemplateId::new(id),
        name: name.to_owned(),
        kind: PieceKind::Artifact,
        element: Some(element),
        role: Some(role),
        shape: shape(rows),
        stats,
        buff: None,
    }
}

fn base(atk: f64, range: f64, fire_rate: f64, attack_type: AttackType) -> TowerStats {
    TowerStats {
        atk,
        range,
        fire_rate,
        attack_type,
        ..TowerStats::default()
    }
}

fn debuff(kind: DebuffKind, val: Option<f64>, duration: f64, chance: Option<f64>) -> DebuffTemplate {
    DebuffTemplate {
        kind,
        val,
        duration,
        chance,
    }
}

const VERTICAL: &[&[u8]] = &[&[1], &[1]];
const HORIZONTAL: &[&[u8]] = &[&[1, 1]];
const CORNER_RIGHT: &[&[u8]] = &[&[1, 1], &[1, 0]];
const CORNER_LEFT: &[&[u8]] = &[&[1, 0], &[1, 1]];
const HOOK: &[&[u8]] = &[&[1, 1], &[0, 1]];
const SQUARE: &[&[u8]] = &[&[1, 1], &[1, 1]];
const BAR: &[&[u8]] = &[&[1, 1, 1]];
const COLUMN: &[&[u8]] = &[&[1], &[1], &[1]];
const SINGLE: &[&[u8]] = &[&[1]];

fn builtin_templates() -> Vec<TowerTemplate> {
    use AttackType as A;
    use Element as E;

    vec![
        tablet("tablet_basic", "Amplifier", BuffKind::Atk, 15.0, 0.0),
        tablet("tablet_range", "Spyglass", BuffKind::Range, 20.0, 0.0),
        tablet("tablet_focus", "Overload", BuffKind::Focus, 30.0, 20.0),
        tablet("tablet_speed", "Accelerator", BuffKind::Speed, 20.0, 0.0),
        tablet("tablet_crit", "Precision Scope", BuffKind::Crit, 15.0, 0.0),
        tablet("tablet_area", "Expander", BuffKind::Area, 30.0, 0.0),
        artifact("thunder_rapier", "Thunder Rapier", VERTICAL, E::Thunder, Role::Assault, TowerStats {
            burst_count: 6,
            reload_time: 1_000.0,
            ..base(25.0, 280.0, 80.0, A::Rapid)
        }),
        artifact("thunder_heavy", "Storm Wedge", CORNER_RIGHT, E::Thunder, Role::Artillery, TowerStats {
            burst_count: 10,
            reload_time: 1_500.0,
            ..base(45.0, 320.0, 100.0, A::Rapid)
        }),
        artifact("fire_laser", "Solar Lance", BAR, E::Fire, Role::Sniper, base(18.0, 450.0, 50.0, A::Laser)),
        artifact("gem_laser", "Void Ray", HOOK, E::Gem, Role::Sniper, base(35.0, 550.0, 30.0, A::Laser)),
        artifact("ice_nova", "Frost Nova", HORIZONTAL, E::Ice, Role::Artillery, TowerStats {
            aoe_radius: Some(140.0),
            ..base(60.0, 250.0, 1_200.0, A::Nova)
        }),
        artifact("leaf_blast", "Wrath of the Earth", CORNER_LEFT, E::Leaf, Role::Artillery, TowerStats {
            aoe_radius: Some(180.0),
            ..base(80.0, 280.0, 1_800.0, A::Bomb)
        }),
        artifact("fire_cannon", "Ignis Cannon", HORIZONTAL, E::Fire, Role::Artillery, base(90.0, 300.0, 1_000.0, A::Normal)),
        artifact("leaf_bow", "Sylvan Bow", COLUMN, E::Leaf, Role::Sniper, base(45.0, 450.0, 600.0, A::Normal)),
        artifact("judgement_prism", "Judgement Prism", CORNER_LEFT, E::Gem, Role::Assault, TowerStats {
            chain_count: 4,
            ..base(40.0, 380.0, 1_100.0, A::Chain)
        }),
        artifact("chaos_orb", "Chaos Orb", CORNER_RIGHT, E::Fire, Role::Assault, TowerStats {
            projectile_count: 4,
            ..base(35.0, 320.0, 900.0, A::Multi)
        }),
        artifact("leaf_spore", "Venom Spray", HORIZONTAL, E::Leaf, Role::Support, TowerStats {
            debuff: Some(debuff(DebuffKind::Poison, Some(10.0), 5_000.0, None)),
            ..base(25.0, 280.0, 800.0, A::Normal)
        }),
        artifact("thunder_static", "Static Wand", VERTICAL, E::Thunder, Role::Support, TowerStats {
            chain_count: 3,
            debuff: Some(debuff(DebuffKind::Stun, None, 1_000.0, Some(0.6))),
            ..base(20.0, 320.0, 1_400.0, A::Chain)
        }),
        artifact("gem_curse", "Eye of Ruin", SQUARE, E::Gem, Role::Support, TowerStats {
            debuff: Some(debuff(DebuffKind::Vulnerable, Some(1.8), 4_000.0, None)),
            ..base(30.0, 480.0, 1_800.0, A::Laser)
        }),
        artifact("ice_shard", "Frost Shard", SINGLE, E::Ice, Role::Support, TowerStats {
            debuff: Some(debuff(DebuffKind::Slow, Some(0.5), 3_000.0, None)),
            ..base(30.0, 250.0, 900.0, A::Normal)
        }),
        artifact("ice_lens", "Glacier Lens", HORIZONTAL, E::Ice, Role::Artillery, TowerStats {
            cone_angle: 0.6,
            debuff: Some(debuff(DebuffKind::Slow, Some(0.7), 1_500.0, None)),
            ..base(30.0, 300.0, 400.0, A::Beam)
        }),
        artifact("shadow_dagger", "Phantom Blade", VERTICAL, E::Shadow, Role::Assault, TowerStats {
            burst_count: 3,
            reload_time: 800.0,
            ..base(40.0, 240.0, 400.0, A::Rapid)
        }),
        artifact("shadow_orb", "Dark Matter", HORIZONTAL, E::Shadow, Role::Sniper, base(65.0, 420.0, 1_100.0, A::Normal)),
        artifact("shadow_scythe", "Soul Reaper", HORIZONTAL, E::Shadow, Role::Assault, TowerStats {
            chain_count: 5,
            ..base(90.0, 320.0, 1_600.0, A::Chain)
        }),
        artifact("shadow_snare", "Shade Snare", SINGLE, E::Shadow, Role::Support, TowerStats {
            max_traps: 4,
            trap_duration: 12_000.0,
            aoe_radius: Some(100.0),
            ..base(120.0, 300.0, 2_500.0, A::Trap)
        }),
        artifact("gem_halo", "Shard Halo", CORNER_LEFT, E::Gem, Role::Assault, TowerStats {
            orbit_count: 3,
            orbit_radius: 80.0,
            hit_cooldown: 300.0,
            ..base(30.0, 120.0, 1_000.0, A::Orbit)
        }),
        artifact("thunder_disc", "Arc Disc", HORIZONTAL, E::Thunder, Role::Assault, TowerStats {
            ricochet_count: 3,
            ..base(40.0, 350.0, 1_000.0, A::Ricochet)
        }),
        artifact("plasma_launcher", "Plasma Cannon", HORIZONTAL, E::Plasma, Role::Artillery, TowerStats {
            aoe_radius: Some(180.0),
            ..base(110.0, 420.0, 1_800.0, A::Bomb)
        }),
        artifact("plasma_flux", "Flux Rifle", VERTICAL, E::Plasma, Role::Assault, TowerStats {
            projectile_count: 4,
            ..base(40.0, 320.0, 450.0, A::Multi)
        }),
        artifact("plasma_core", "Nuclear Core", HORIZONTAL, E::Plasma, Role::Artillery, TowerStats {
            aoe_radius: Some(300.0),
            ..base(250.0, 280.0, 2_500.0, A::Nova)
        }),
        artifact("plasma_mortar", "Scatter Mortar", CORNER_RIGHT, E::Plasma, Role::Artillery, TowerStats {
            aoe_radius: Some(120.0),
            ..base(70.0, 350.0, 1_500.0, A::RandomBomb)
        }),
        artifact("mystic_bolt", "Arcane Bolt", VERTICAL, E::Mystic, Role::Sniper, base(55.0, 480.0, 1_000.0, A::Normal)),
        artifact("mystic_prism", "Starfall Prism", VERTICAL, E::Mystic, Role::Assault, TowerStats {
            projectile_count: 4,
            ..base(35.0, 420.0, 1_300.0, A::Multi)
        }),
        artifact("mystic_scroll", "Ancient Codex", HORIZONTAL, E::Mystic, Role::Sniper, base(85.0, 550.0, 1_800.0, A::Laser)),
    ]
}
