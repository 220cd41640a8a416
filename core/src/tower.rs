//! Tower templates, recomputed runtime stats and per-tower firing state.

use std::time::Duration;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::{CellCoord, Footprint, GridConfig, Shape, TemplateId, TowerId};

/// Element key used for element synergies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    /// Fire element.
    Fire,
    /// Ice element.
    Ice,
    /// Thunder element.
    Thunder,
    /// Leaf element.
    Leaf,
    /// Gem element.
    Gem,
    /// Shadow element.
    Shadow,
    /// Plasma element.
    Plasma,
    /// Mystic element.
    Mystic,
    /// Element without a dedicated synergy.
    Normal,
}

/// Role key used for role synergies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Long-range single target damage.
    Sniper,
    /// Area damage.
    Artillery,
    /// Sustained close-range damage.
    Assault,
    /// Debuff application.
    Support,
}

/// Distinguishes attacking pieces from buff-only pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    /// Attacking tower.
    Artifact,
    /// Passive piece that buffs adjacent artifacts.
    Tablet,
}

/// Firing pattern selected for an artifact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    /// Single projectile at the nearest monster.
    #[default]
    Normal,
    /// Burst of projectiles followed by a reload.
    Rapid,
    /// Simultaneous projectiles at several nearest monsters.
    Multi,
    /// Lightning that jumps between monsters.
    Chain,
    /// Continuous low-damage ray.
    Laser,
    /// Burst centred on the tower.
    Nova,
    /// Directional cone sweep.
    Beam,
    /// Satellites rotating around the tower.
    Orbit,
    /// Projectile bouncing between monsters.
    Ricochet,
    /// Stationary mines laid along the path.
    Trap,
    /// Projectile exploding at its target.
    Bomb,
    /// Shells dropped on random points of the path.
    RandomBomb,
}

/// Stat adjusted by a tablet buff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuffKind {
    /// Multiplies attack.
    Atk,
    /// Multiplies range.
    Range,
    /// Multiplies attack while penalising range.
    Focus,
    /// Shortens the fire interval.
    Speed,
    /// Adds critical strike chance.
    Crit,
    /// Multiplies explosion radii.
    Area,
}

/// Buff carried by a tablet and applied to adjacent artifacts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TabletBuff {
    /// Stat affected by the buff.
    #[serde(rename = "type")]
    pub kind: BuffKind,
    /// Strength of the buff in percent.
    pub val: f64,
    /// Range penalty in percent, used by focus buffs.
    #[serde(default)]
    pub penalty: f64,
}

/// Kinds of timed status effects a monster can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebuffKind {
    /// Multiplies movement speed by its value.
    Slow,
    /// Stops movement entirely.
    Stun,
    /// Deals its value as damage on a fixed interval.
    Poison,
    /// Amplifies incoming tower damage.
    Vulnerable,
}

/// Debuff configured on a tower template.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebuffTemplate {
    /// Kind of debuff applied on hit.
    #[serde(rename = "type")]
    pub kind: DebuffKind,
    /// Strength of the debuff; meaning depends on the kind.
    #[serde(default)]
    pub val: Option<f64>,
    /// Duration of the debuff in milliseconds.
    pub duration: f64,
    /// Probability in `[0, 1]` that the debuff lands.
    #[serde(default)]
    pub chance: Option<f64>,
}

/// Base stats of an artifact template. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerStats {
    /// Damage per hit.
    pub atk: f64,
    /// Targeting radius in world units.
    pub range: f64,
    /// Milliseconds between shots.
    pub fire_rate: f64,
    /// Firing pattern.
    pub attack_type: AttackType,
    /// Shots fired before a rapid tower reloads.
    pub burst_count: u32,
    /// Milliseconds spent reloading after a burst.
    pub reload_time: f64,
    /// Monsters struck by one chain.
    pub chain_count: u32,
    /// Targets engaged by one multi volley.
    pub projectile_count: u32,
    /// Explosion radius; falls back to the configured bomb or trap radius.
    pub aoe_radius: Option<f64>,
    /// Satellites maintained by an orbit tower.
    pub orbit_count: u32,
    /// Radians advanced per 16ms of simulation.
    pub orbit_speed: f64,
    /// Distance between satellites and the tower centre.
    pub orbit_radius: f64,
    /// Milliseconds before a satellite may strike the same monster again.
    pub hit_cooldown: f64,
    /// Bounces performed after the first ricochet hit.
    pub ricochet_count: u32,
    /// Mines a trap tower may keep armed concurrently.
    pub max_traps: u32,
    /// Milliseconds a mine stays armed.
    pub trap_duration: f64,
    /// Width of a beam cone in radians.
    pub cone_angle: f64,
    /// Critical damage multiplier; falls back to the combat configuration.
    pub crit_dmg_mult: Option<f64>,
    /// Debuff applied on hit.
    pub debuff: Option<DebuffTemplate>,
}

impl Default for TowerStats {
    fn default() -> Self {
        Self {
            atk: 0.0,
            range: 250.0,
            fire_rate: 1_000.0,
            attack_type: AttackType::Normal,
            burst_count: 5,
            reload_time: 1_500.0,
            chain_count: 3,
            projectile_count: 3,
            aoe_radius: None,
            orbit_count: 3,
            orbit_speed: 0.05,
            orbit_radius: 80.0,
            hit_cooldown: 300.0,
            ricochet_count: 3,
            max_traps: 5,
            trap_duration: 15_000.0,
            cone_angle: 0.5,
            crit_dmg_mult: None,
            debuff: None,
        }
    }
}

/// Immutable catalog entry from which pieces are built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerTemplate {
    /// Catalog key of the template.
    pub id: TemplateId,
    /// Display name.
    pub name: String,
    /// Whether the piece attacks or buffs.
    #[serde(rename = "type")]
    pub kind: PieceKind,
    /// Element synergy key.
    #[serde(default)]
    pub element: Option<Element>,
    /// Role synergy key.
    #[serde(default)]
    pub role: Option<Role>,
    /// Cells covered by the piece before rotation.
    pub shape: Shape,
    /// Base stats.
    #[serde(default)]
    pub stats: TowerStats,
    /// Buff granted to adjacent artifacts when the piece is a tablet.
    #[serde(default)]
    pub buff: Option<TabletBuff>,
}

impl TowerTemplate {
    /// Reports whether the template describes an attacking piece.
    #[must_use]
    pub fn is_artifact(&self) -> bool {
        self.kind == PieceKind::Artifact
    }
}

/// Stats recomputed from scratch on every synergy pass.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerRuntime {
    /// Effective damage per hit.
    pub atk: f64,
    /// Effective milliseconds between shots.
    pub fire_rate: f64,
    /// Effective targeting radius.
    pub range: f64,
    /// Probability of a critical strike.
    pub crit_chance: f64,
    /// Multiplier on slow strength.
    pub debuff_efficiency: f64,
    /// Multiplier on explosion radii.
    pub aoe_mult: f64,
    /// Additional monsters struck along the attack ray.
    pub pierce_count: u32,
    /// Health fraction at or below which hits deal double damage.
    pub execute_threshold: f64,
    /// Multiplier on applied debuff durations.
    pub debuff_duration_mult: f64,
    /// Whether any synergy is active on the piece.
    pub is_synergetic: bool,
    /// Name of the synergy displayed for the piece.
    pub active_synergy: Option<String>,
}

impl TowerRuntime {
    /// Builds the runtime view of untouched base stats.
    #[must_use]
    pub fn from_stats(stats: &TowerStats) -> Self {
        Self {
            atk: stats.atk,
            fire_rate: stats.fire_rate,
            range: stats.range,
            crit_chance: 0.0,
            debuff_efficiency: 1.0,
            aoe_mult: 1.0,
            pierce_count: 0,
            execute_threshold: 0.0,
            debuff_duration_mult: 1.0,
            is_synergetic: false,
            active_synergy: None,
        }
    }
}

/// Mutable firing bookkeeping owned by the attack strategies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FiringState {
    /// Scaled clock reading of the last shot.
    pub last_fire: Duration,
    /// Whether the tower is waiting out its reload.
    pub is_reloading: bool,
    /// Shots fired in the current burst.
    pub burst_counter: u32,
    /// Mines currently armed by the tower.
    pub active_traps: u32,
    /// Current satellite angle in radians.
    pub orbit_angle: f64,
    /// World positions of the satellites currently orbiting the tower.
    pub satellites: Vec<DVec2>,
}

/// Piece placed on the grid.
#[derive(Clone, Debug)]
pub struct Tower {
    id: TowerId,
    template: TowerTemplate,
    origin: CellCoord,
    shape: Shape,
    footprint: Footprint,
    center: DVec2,
    /// Stats produced by the most recent synergy pass.
    pub runtime: TowerRuntime,
    /// Strategy-owned firing state.
    pub firing: FiringState,
}

impl Tower {
    /// Builds a piece from its template with the bounding box at `origin`.
    #[must_use]
    pub fn new(id: TowerId, template: TowerTemplate, origin: CellCoord, grid: &GridConfig) -> Self {
        let shape = template.shape.clone();
        let footprint = shape.footprint(origin);
        let center = grid.visual_center(&footprint);
        let runtime = TowerRuntime::from_stats(&template.stats);
        Self {
            id,
            template,
            origin,
            shape,
            footprint,
            center,
            runtime,
            firing: FiringState::default(),
        }
    }

    /// Moves the piece to a new origin and shape, refreshing its footprint.
    pub fn relocate(&mut self, origin: CellCoord, shape: Shape, grid: &GridConfig) {
        self.footprint = shape.footprint(origin);
        self.center = grid.visual_center(&self.footprint);
        self.origin = origin;
        self.shape = shape;
    }

    /// Identifier assigned by the world.
    #[must_use]
    pub const fn id(&self) -> TowerId {
        self.id
    }

    /// Template the piece was built from.
    #[must_use]
    pub const fn template(&self) -> &TowerTemplate {
        &self.template
    }

    /// Base stats of the template.
    #[must_use]
    pub const fn stats(&self) -> &TowerStats {
        &self.template.stats
    }

    /// Upper-left cell of the bounding box.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Shape in its current rotation.
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Cells currently covered.
    #[must_use]
    pub const fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    /// World position attacks originate from.
    #[must_use]
    pub const fn center(&self) -> DVec2 {
        self.center
    }

    /// Reports whether the piece attacks.
    #[must_use]
    pub fn is_artifact(&self) -> bool {
        self.template.is_artifact()
    }
}
