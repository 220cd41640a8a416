//! Static synergy definitions.

use serde::{Deserialize, Serialize};

use crate::{Element, Role};

/// Grouping key a synergy matches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynergyKey {
    /// Matches artifacts sharing an element.
    Element(Element),
    /// Matches artifacts sharing a role.
    Role(Role),
}

/// Stat change applied to every member of an active group.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynergyEffect {
    /// Multiplies attack.
    AtkMult(f64),
    /// Multiplies the fire interval.
    FireRateMult(f64),
    /// Multiplies range.
    RangeMult(f64),
    /// Adds critical strike chance.
    CritAdd(f64),
    /// Sets the execute threshold.
    ExecuteThreshold(f64),
    /// Multiplies explosion radii.
    AoeMult(f64),
    /// Adds pierce targets.
    PierceAdd(u32),
    /// Multiplies slow strength.
    DebuffEfficiencyMult(f64),
    /// Adds flat range and critical strike chance.
    RangeAndCritAdd {
        /// Flat range bonus.
        range: f64,
        /// Critical strike chance bonus.
        crit: f64,
    },
    /// Sets the debuff duration multiplier.
    DebuffDurationMult(f64),
}

/// Bonus unlocked by a connected group of matching artifacts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SynergyDefinition {
    /// Stable key of the definition.
    pub id: String,
    /// Display name recorded in the active combo list.
    pub name: String,
    /// Key an artifact must carry to join the group.
    pub key: SynergyKey,
    /// Minimum group size.
    pub req: usize,
    /// Change applied to each member.
    pub effect: SynergyEffect,
}

impl SynergyDefinition {
    /// Reports whether the definition groups artifacts by element.
    #[must_use]
    pub fn is_element(&self) -> bool {
        matches!(self.key, SynergyKey::Element(_))
    }
}

/// Built-in synergy table.
#[must_use]
pub fn default_synergies() -> Vec<SynergyDefinition> {
    use SynergyEffect as E;
    use SynergyKey::{Element as El, Role as Ro};

    let table = [
        ("fire_power", "Blazing Synergy", El(Element::Fire), E::AtkMult(1.2)),
        ("ice_freeze", "Frost Synergy", El(Element::Ice), E::DebuffEfficiencyMult(1.25)),
        ("thunder_rapid", "Storm Synergy", El(Element::Thunder), E::FireRateMult(0.7)),
        ("leaf_regen", "Grove Synergy", El(Element::Leaf), E::RangeMult(1.15)),
        ("gem_legend", "Gem Synergy", El(Element::Gem), E::CritAdd(0.1)),
        ("shadow_curse", "Shadow Synergy", El(Element::Shadow), E::ExecuteThreshold(0.3)),
        ("plasma_boom", "Plasma Synergy", El(Element::Plasma), E::AoeMult(1.5)),
        ("mystic_pierce", "Mystic Synergy", El(Element::Mystic), E::PierceAdd(1)),
        (
            "role_sniper",
            "Sniper Formation",
            Ro(Role::Sniper),
            E::RangeAndCritAdd {
                range: 100.0,
                crit: 0.1,
            },
        ),
        ("role_artillery", "Artillery Formation", Ro(Role::Artillery), E::AoeMult(1.3)),
        ("role_assault", "Assault Formation", Ro(Role::Assault), E::FireRateMult(0.8)),
        ("role_support", "Support Formation", Ro(Role::Support), E::DebuffDurationMult(1.5)),
    ];

    table
        .into_iter()
        .map(|(id, name, key, effect)| SynergyDefinition {
            id: id.to_owned(),
            name: name.to_owned(),
            key,
            req: 2,
            effect,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_every_element_and_role() {
        let table = default_synergies();
        assert_eq!(table.len(), 12);
        assert_eq!(table.iter().filter(|definition| definition.is_element()).count(), 8);
        assert!(table.iter().all(|definition| definition.req == 2));
    }

    #[test]
    fn keys_deserialize_from_tables() {
        #[derive(Deserialize)]
        struct Holder {
            key: SynergyKey,
        }
        let holder: Holder = toml::from_str("key = { role = \"sniper\" }").expect("parse");
        assert_eq!(holder.key, SynergyKey::Role(Role::Sniper));
    }
}
